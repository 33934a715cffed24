/// Split a duration in milliseconds into zero-padded `(minutes, seconds)`.
///
/// Sub-second remainders are dropped. Minutes are not wrapped into hours, so
/// an hour reads `60:00`.
pub fn elapsed_parts(ms: u64) -> (String, String) {
    let total_secs = ms / 1000;
    (
        format!("{:02}", total_secs / 60),
        format!("{:02}", total_secs % 60),
    )
}

/// Format a duration in milliseconds as `MM:SS`
pub fn format_elapsed(ms: u64) -> String {
    let (m, s) = elapsed_parts(ms);
    format!("{}:{}", m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(59_999), "00:59");
        assert_eq!(format_elapsed(60_000), "01:00");
        assert_eq!(format_elapsed(3_599_999), "59:59");
    }

    #[test]
    fn parts_are_zero_padded() {
        assert_eq!(elapsed_parts(61_000), ("01".to_string(), "01".to_string()));
    }

    #[test]
    fn minutes_keep_counting_past_an_hour() {
        assert_eq!(format_elapsed(3_600_000), "60:00");
        assert_eq!(format_elapsed(6_000_000), "100:00");
    }
}
