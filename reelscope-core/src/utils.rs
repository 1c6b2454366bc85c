//! Small numeric and parsing helpers shared across the analysis modules.

/// Parses an ffprobe rate string such as "30000/1001" or "25".
///
/// Returns 0.0 for "0/0", malformed input, and non-finite results so that
/// every duration derived from the rate degrades to zero.
#[must_use]
pub fn parse_frame_rate(rate: &str) -> f64 {
    let rate = rate.trim();
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().unwrap_or(0.0);
            let den = den.trim().parse::<f64>().unwrap_or(0.0);
            if den == 0.0 { 0.0 } else { num / den }
        }
        None => rate.parse::<f64>().unwrap_or(0.0),
    };

    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// Divides two quantities, yielding 0.0 when the divisor is not positive.
#[must_use]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && denominator.is_finite() {
        let value = numerator / denominator;
        if value.is_finite() { value } else { 0.0 }
    } else {
        0.0
    }
}

/// Rounds to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Formats seconds as M:SS.s for terminal output (e.g., 75.3 -> "1:15.3").
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "?:??".to_string();
    }
    // Round first so 59.96 carries into the next minute.
    let tenths = (seconds * 10.0).round() as u64;
    let (minutes, rest) = (tenths / 600, tenths % 600);
    format!("{minutes}:{:02}.{}", rest / 10, rest % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30000/1001") - 29.970_029_97).abs() < 1e-6);
        assert_eq!(parse_frame_rate("25/1"), 25.0);
        assert_eq!(parse_frame_rate("24"), 24.0);
        assert_eq!(parse_frame_rate("0/0"), 0.0);
        assert_eq!(parse_frame_rate(""), 0.0);
        assert_eq!(parse_frame_rate("abc"), 0.0);
        assert_eq!(parse_frame_rate("-30/1"), 0.0);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(300.0, 30.0), 10.0);
        assert_eq!(safe_div(300.0, 0.0), 0.0);
        assert_eq!(safe_div(300.0, -1.0), 0.0);
        assert_eq!(safe_div(1.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(87.456, 1), 87.5);
        assert_eq!(round_to(87.44, 1), 87.4);
        assert_eq!(round_to(3.0, 2), 3.0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00.0");
        assert_eq!(format_timestamp(75.3), "1:15.3");
        assert_eq!(format_timestamp(59.96), "1:00.0");
        assert_eq!(format_timestamp(119.94), "1:59.9");
        assert_eq!(format_timestamp(-1.0), "?:??");
    }
}
