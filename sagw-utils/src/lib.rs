//! Shared utility functions for SA groundwater crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Date format of well attribute columns: "YYYY-MM-DD"
    pub const ISO_FORMAT: &str = "%Y-%m-%d";

    /// Date format of bulk download columns: "DD/MM/YYYY"
    pub const DMY_FORMAT: &str = "%d/%m/%Y";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(ISO_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), ISO_FORMAT)?)
    }

    /// Parse a date string in "DD/MM/YYYY" format (bulk download format)
    pub fn parse_date_dmy(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DMY_FORMAT)?)
    }

    /// Parse a well attribute date.
    ///
    /// The service sometimes appends a time ("2001-03-04T00:00:00"), only the
    /// leading date is kept. Empty strings yield `None`.
    pub fn parse_attribute_date(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let head = s.get(..10).unwrap_or(s);
        parse_date(head).ok()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_parse_date_dmy() {
            let parsed = parse_date_dmy("04/03/2001").unwrap();
            assert_eq!(parsed, NaiveDate::from_ymd_opt(2001, 3, 4).unwrap());
            assert!(parse_date_dmy("2001-03-04").is_err());
        }

        #[test]
        fn test_parse_attribute_date() {
            let expected = NaiveDate::from_ymd_opt(1985, 11, 2).unwrap();
            assert_eq!(parse_attribute_date("1985-11-02"), Some(expected));
            assert_eq!(parse_attribute_date("1985-11-02T00:00:00"), Some(expected));
            assert_eq!(parse_attribute_date(""), None);
            assert_eq!(parse_attribute_date("  "), None);
            assert_eq!(parse_attribute_date("not a date"), None);
        }
    }
}
