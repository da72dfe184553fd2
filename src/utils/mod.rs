/// Text cell for the format table; missing or empty values show `-`.
pub fn text_or_dash(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "-".to_string(),
    }
}

/// Numeric cell for the format table; missing or zero values show `-`.
///
/// Whole numbers drop their fraction so `30.0` fps reads as `30`.
pub fn number_or_dash(value: Option<f64>) -> String {
    match value {
        Some(number) if number != 0.0 && number.is_finite() => {
            if number.fract() == 0.0 && number.abs() < 1e15 {
                format!("{}", number as i64)
            } else {
                format!("{}", number)
            }
        }
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_or_dash() {
        assert_eq!(text_or_dash(Some("mp4")), "mp4");
        assert_eq!(text_or_dash(Some("")), "-");
        assert_eq!(text_or_dash(None), "-");
    }

    #[test]
    fn test_number_or_dash() {
        assert_eq!(number_or_dash(Some(30.0)), "30");
        assert_eq!(number_or_dash(Some(29.97)), "29.97");
        assert_eq!(number_or_dash(Some(1326.512)), "1326.512");
        assert_eq!(number_or_dash(Some(0.0)), "-");
        assert_eq!(number_or_dash(Some(f64::NAN)), "-");
        assert_eq!(number_or_dash(None), "-");
    }
}
