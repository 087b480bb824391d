//! Stationboard query URL building
//!
//! Percent-encoding follows the RFC 3986 unreserved set: alphanumerics and
//! `-`, `_`, `.`, `~` pass through, everything else is hex-escaped.

use core::fmt::Write;

use heapless::String;

/// Maximum built URL length
pub const MAX_URL_LEN: usize = 256;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Append `input` percent-encoded to `out`
pub fn percent_encode<const N: usize>(out: &mut String<N>, input: &str) {
    for &b in input.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            let _ = out.push(b as char);
        } else {
            let _ = out.push('%');
            let _ = out.push(HEX[(b >> 4) as usize] as char);
            let _ = out.push(HEX[(b & 0xF) as usize] as char);
        }
    }
}

/// Build the stationboard query URL
///
/// `datetime` is the minute-precision local time ("YYYY-MM-DD HH:MM") the
/// board should be anchored at; `None` (clock not yet synced) omits the
/// parameter and lets the API default to now.
pub fn stationboard_url(
    base: &str,
    station_id: &str,
    limit: u8,
    datetime: Option<&str>,
) -> String<MAX_URL_LEN> {
    let mut url = String::new();
    let _ = url.push_str(base);
    let _ = url.push_str("?id=");
    percent_encode(&mut url, station_id);
    let _ = write!(url, "&limit={}", limit);
    if let Some(datetime) = datetime {
        let _ = url.push_str("&datetime=");
        percent_encode(&mut url, datetime);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://transport.opendata.ch/v1/stationboard";

    #[test]
    fn test_unreserved_set_passes_through() {
        let mut out = String::<64>::new();
        percent_encode(&mut out, "AZaz09-_.~");
        assert_eq!(out, "AZaz09-_.~");
    }

    #[test]
    fn test_reserved_and_utf8_are_escaped() {
        let mut out = String::<64>::new();
        percent_encode(&mut out, "Zürich, Bahnhof");
        assert_eq!(out, "Z%C3%BCrich%2C%20Bahnhof");
    }

    #[test]
    fn test_full_url() {
        let url = stationboard_url(BASE, "Luzern", 8, Some("2024-03-01 18:05"));
        assert_eq!(
            url,
            "http://transport.opendata.ch/v1/stationboard?id=Luzern&limit=8&datetime=2024-03-01%2018%3A05"
        );
    }

    #[test]
    fn test_datetime_omitted_before_time_sync() {
        let url = stationboard_url(BASE, "Zug", 8, None);
        assert_eq!(url, "http://transport.opendata.ch/v1/stationboard?id=Zug&limit=8");
    }
}
