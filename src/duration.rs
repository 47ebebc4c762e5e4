/// Converts a pit-stop duration field into seconds.
///
/// Accepts either a bare number (`"23.456"`) or `MM:SS.sss` (`"1:23.456"`).
/// Returns `None` for empty or unparsable input, for anything that does not
/// split into exactly two parts around `:`, and for non-finite values.
pub fn parse_duration(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let seconds = if raw.contains(':') {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 2 {
            return None;
        }
        let minutes: f64 = parts[0].trim().parse().ok()?;
        let secs: f64 = parts[1].trim().parse().ok()?;
        minutes * 60.0 + secs
    } else {
        raw.parse::<f64>().ok()?
    };

    seconds.is_finite().then_some(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a parsed duration");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_plain_seconds() {
        assert_close(parse_duration("23.456"), 23.456);
        assert_close(parse_duration(" 21 "), 21.0);
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_close(parse_duration("1:23.456"), 83.456);
        assert_close(parse_duration("0:05.5"), 5.5);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("   "), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("1:23:45"), None);
        assert_eq!(parse_duration("1:"), None);
        assert_eq!(parse_duration(":12.0"), None);
        assert_eq!(parse_duration("NaN"), None);
        assert_eq!(parse_duration("inf"), None);
    }
}
