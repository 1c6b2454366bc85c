// ============================================================================
// reelscope-core/src/processing/imaging.rs
// ============================================================================
//
// IMAGING: Pixel-Level Primitives Used by the Metric Engines
//
// Grayscale conversion, intensity statistics, the 3x3 Laplacian, Canny edge
// detection, HSV statistics and integral images. The definitions follow the
// conventional 8-bit computer vision formulas (fixed-point luma weights,
// reflect-101 border for the Laplacian, replicate border for Sobel, L1
// gradient magnitude for Canny) so scores stay comparable across frames.
//
// KEY COMPONENTS:
// - to_gray / mean_intensity / std_intensity
// - laplacian_variance: sharpness measure
// - mean_abs_diff: frame-difference measure
// - canny / edge_density / region_edge_density
// - hsv_saturation_value_stats: vibrancy inputs
// - IntegralImage: summed-area tables for window statistics

use image::{GrayImage, Luma, RgbImage};

/// Converts an RGB frame to 8-bit luma using fixed-point BT.601 weights.
#[must_use]
pub fn to_gray(frame: &RgbImage) -> GrayImage {
    let (width, height) = frame.dimensions();
    let mut gray = Vec::with_capacity(width as usize * height as usize);
    for px in frame.as_raw().chunks_exact(3) {
        let (r, g, b) = (u32::from(px[0]), u32::from(px[1]), u32::from(px[2]));
        gray.push(((r * 4899 + g * 9617 + b * 1868 + 8192) >> 14) as u8);
    }
    GrayImage::from_raw(width, height, gray).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Mean pixel value, 0.0 for an empty image.
#[must_use]
pub fn mean_intensity(gray: &GrayImage) -> f64 {
    let raw = gray.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    let sum: u64 = raw.iter().map(|&v| u64::from(v)).sum();
    sum as f64 / raw.len() as f64
}

/// Population standard deviation of pixel values, 0.0 for an empty image.
#[must_use]
pub fn std_intensity(gray: &GrayImage) -> f64 {
    std_of(gray.as_raw().iter().map(|&v| f64::from(v)))
}

fn std_of(values: impl Iterator<Item = f64>) -> f64 {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for v in values {
        count += 1;
        sum += v;
        sum_sq += v * v;
    }
    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    (sum_sq / count as f64 - mean * mean).max(0.0).sqrt()
}

/// Reflect-101 index mapping (`gfedcb|abcdefgh|gfedcba`).
fn reflect_101(i: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    let mut i = i;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as usize
}

/// Variance of the 3x3 Laplacian (kernel `[0 1 0; 1 -4 1; 0 1 0]`).
///
/// Higher values mean more high-frequency detail. Always >= 0.
#[must_use]
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }
    let (w, h) = (i64::from(width), i64::from(height));
    let raw = gray.as_raw();
    let at = |x: i64, y: i64| -> f64 {
        f64::from(raw[reflect_101(y, h) * width as usize + reflect_101(x, w)])
    };

    let mut responses = Vec::with_capacity(raw.len());
    for y in 0..h {
        for x in 0..w {
            let value =
                at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4.0 * at(x, y);
            responses.push(value);
        }
    }
    let sd = std_of(responses.into_iter());
    sd * sd
}

/// Mean absolute per-pixel difference of two grayscale frames.
///
/// Frames of different dimensions are not comparable and yield 0.0.
#[must_use]
pub fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.dimensions() != b.dimensions() || a.as_raw().is_empty() {
        return 0.0;
    }
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| u64::from(x.abs_diff(y)))
        .sum();
    total as f64 / a.as_raw().len() as f64
}

/// Canny edge map (255 = edge, 0 = background) with a 3x3 Sobel aperture
/// and L1 gradient magnitude.
#[must_use]
pub fn canny(gray: &GrayImage, low_threshold: f64, high_threshold: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return GrayImage::new(width, height);
    }

    let (low, high) = if low_threshold > high_threshold {
        (high_threshold.floor() as i32, low_threshold.floor() as i32)
    } else {
        (low_threshold.floor() as i32, high_threshold.floor() as i32)
    };

    let raw = gray.as_raw();
    let px = |x: isize, y: isize| -> i32 {
        let xc = x.clamp(0, w as isize - 1) as usize;
        let yc = y.clamp(0, h as isize - 1) as usize;
        i32::from(raw[yc * w + xc])
    };

    let mut dx = vec![0i32; w * h];
    let mut dy = vec![0i32; w * h];
    let mut mag = vec![0i32; w * h];
    for y in 0..h as isize {
        for x in 0..w as isize {
            let gx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            let gy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
            let idx = y as usize * w + x as usize;
            dx[idx] = gx;
            dy[idx] = gy;
            mag[idx] = gx.abs() + gy.abs();
        }
    }

    // Magnitude outside the frame counts as zero.
    let mag_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            mag[y as usize * w + x as usize]
        }
    };

    // 0 = weak candidate, 1 = suppressed, 2 = strong edge
    const TG22: i64 = 13573; // tan(22.5deg) in Q15
    let mut map = vec![1u8; w * h];
    let mut stack: Vec<usize> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= low {
                continue;
            }
            let (xs, ys) = (i64::from(dx[idx]), i64::from(dy[idx]));
            let ax = xs.abs();
            let ay = ys.abs() << 15;
            let tg22x = ax * TG22;
            let (xi, yi) = (x as isize, y as isize);

            let is_max = if ay < tg22x {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else {
                let tg67x = tg22x + (ax << 16);
                if ay > tg67x {
                    m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
                } else {
                    let s: isize = if (xs ^ ys) < 0 { -1 } else { 1 };
                    m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
                }
            };

            if is_max {
                if m > high {
                    map[idx] = 2;
                    stack.push(idx);
                } else {
                    map[idx] = 0;
                }
            }
        }
    }

    while let Some(idx) = stack.pop() {
        let (x, y) = ((idx % w) as isize, (idx / w) as isize);
        for ny in (y - 1)..=(y + 1) {
            for nx in (x - 1)..=(x + 1) {
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if map[n] == 0 {
                    map[n] = 2;
                    stack.push(n);
                }
            }
        }
    }

    let edges = map.into_iter().map(|v| if v == 2 { 255 } else { 0 }).collect();
    GrayImage::from_raw(width, height, edges).unwrap_or_else(|| GrayImage::new(width, height))
}

/// Fraction of edge pixels in an edge map, 0.0 for an empty map.
#[must_use]
pub fn edge_density(edges: &GrayImage) -> f64 {
    let raw = edges.as_raw();
    if raw.is_empty() {
        return 0.0;
    }
    raw.iter().filter(|&&v| v > 0).count() as f64 / raw.len() as f64
}

/// Edge density inside `[x0, x1) x [y0, y1)`, clamped to the frame.
/// A region with no pixels has density 0.0.
#[must_use]
pub fn region_edge_density(edges: &GrayImage, x0: i64, y0: i64, x1: i64, y1: i64) -> f64 {
    let (width, height) = edges.dimensions();
    let x0 = x0.clamp(0, i64::from(width)) as u32;
    let x1 = x1.clamp(0, i64::from(width)) as u32;
    let y0 = y0.clamp(0, i64::from(height)) as u32;
    let y1 = y1.clamp(0, i64::from(height)) as u32;
    if x1 <= x0 || y1 <= y0 {
        return 0.0;
    }

    let mut count = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let Luma([v]) = *edges.get_pixel(x, y);
            if v > 0 {
                count += 1;
            }
        }
    }
    count as f64 / (f64::from(x1 - x0) * f64::from(y1 - y0))
}

/// Mean HSV saturation and standard deviation of HSV value, both on the
/// 0-255 scale.
#[must_use]
pub fn hsv_saturation_value_stats(frame: &RgbImage) -> (f64, f64) {
    let raw = frame.as_raw();
    if raw.is_empty() {
        return (0.0, 0.0);
    }
    let mut sat_sum = 0.0;
    let mut values = Vec::with_capacity(raw.len() / 3);
    for px in raw.chunks_exact(3) {
        let max = px[0].max(px[1]).max(px[2]);
        let min = px[0].min(px[1]).min(px[2]);
        let saturation = if max == 0 {
            0.0
        } else {
            (255.0 * f64::from(max - min) / f64::from(max)).round()
        };
        sat_sum += saturation;
        values.push(f64::from(max));
    }
    let mean_saturation = sat_sum / values.len() as f64;
    (mean_saturation, std_of(values.into_iter()))
}

/// Summed-area tables of pixel values and squared pixel values.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sq_sum: Vec<u64>,
}

impl IntegralImage {
    #[must_use]
    pub fn new(gray: &GrayImage) -> Self {
        let (width, height) = (gray.width() as usize, gray.height() as usize);
        let stride = width + 1;
        let mut sum = vec![0u64; stride * (height + 1)];
        let mut sq_sum = vec![0u64; stride * (height + 1)];
        let raw = gray.as_raw();

        for y in 0..height {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..width {
                let v = u64::from(raw[y * width + x]);
                row += v;
                row_sq += v * v;
                sum[(y + 1) * stride + x + 1] = sum[y * stride + x + 1] + row;
                sq_sum[(y + 1) * stride + x + 1] = sq_sum[y * stride + x + 1] + row_sq;
            }
        }

        Self {
            width,
            height,
            sum,
            sq_sum,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn rect(table: &[u64], stride: usize, x: usize, y: usize, w: usize, h: usize) -> u64 {
        let a = table[y * stride + x];
        let b = table[y * stride + x + w];
        let c = table[(y + h) * stride + x];
        let d = table[(y + h) * stride + x + w];
        (d + a) - (b + c)
    }

    /// Sum of pixels in the rectangle. The rectangle must lie inside the image.
    #[must_use]
    pub fn rect_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        Self::rect(&self.sum, self.width + 1, x, y, w, h)
    }

    /// Sum of squared pixels in the rectangle.
    #[must_use]
    pub fn rect_sq_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        Self::rect(&self.sq_sum, self.width + 1, x, y, w, h)
    }
}
