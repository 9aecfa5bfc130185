//! Text to typed value coercions shared by field parsing, table cells and
//! validation. None of these fail loudly: callers decide whether a `None`
//! is an error, a warning, or a value to keep as raw text.

use chrono::NaiveDate;
use url::Url;

/// A finite number. `inf` and `NaN` are rejected.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

pub(crate) fn parse_year(text: &str) -> Option<i32> {
    text.trim().parse::<i32>().ok()
}

/// An ISO `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // chrono accepts unpadded fields; the ISO spelling is exactly ten chars.
    if text.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// An absolute `http` or `https` URL with a host.
pub(crate) fn is_http_url(text: &str) -> bool {
    Url::parse(text.trim()).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(parse_number(" 42.5 "), Some(42.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn test_years_and_dates() {
        assert_eq!(parse_year("2024"), Some(2024));
        assert_eq!(parse_year("20.24"), None);
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("2024-1-5").is_none());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_urls() {
        assert!(is_http_url("https://example.com/path?q=1"));
        assert!(is_http_url("http://localhost:8080"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
        assert!(!is_http_url("mailto:someone@example.com"));
    }
}
