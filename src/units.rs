pub mod rounding {
    /// Nearest whole unit, halves rounded toward positive infinity (-2.5 -> -2, 2.5 -> 3).
    pub fn nearest(value: f64) -> i64 {
        (value + 0.5).floor() as i64
    }

    #[test]
    fn test_nearest() {
        assert_eq!(nearest(23.4), 23);
        assert_eq!(nearest(23.5), 24);
        assert_eq!(nearest(-0.4), 0);
        assert_eq!(nearest(-2.5), -2);
        assert_eq!(nearest(-2.6), -3);
    }
}

pub mod time {
    use chrono::NaiveDateTime;

    /// Hour-of-day on a 12 hour clock, e.g. "12 AM" or "3 PM".
    pub fn hour_label(time: &NaiveDateTime) -> String {
        time.format("%-I %p").to_string()
    }

    /// Parses the local ISO timestamps Open-Meteo returns ("2024-07-01T15:00").
    pub fn parse_local(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
    }

    #[test]
    fn test_hour_label() {
        let midnight = parse_local("2024-07-01T00:00").unwrap();
        let afternoon = parse_local("2024-07-01T15:00").unwrap();
        let noon = parse_local("2024-07-01T12:00").unwrap();
        assert_eq!(hour_label(&midnight), "12 AM");
        assert_eq!(hour_label(&afternoon), "3 PM");
        assert_eq!(hour_label(&noon), "12 PM");
    }

    #[test]
    fn test_parse_local_rejects_garbage() {
        assert!(parse_local("yesterday").is_err());
    }
}
