//! Interchange codecs for cookie records.
//!
//! Three independent parse/format pairs over an ordered sequence of
//! [`CookieRecord`]s, with no shared mutable state:
//!
//! - **JSON** ([`JsonCodec`](json::JsonCodec)): full-fidelity array of
//!   cookie objects, the canonical export format
//! - **Header-String** ([`HeaderCodec`](header::HeaderCodec)): the
//!   `name=value;name2=value2` subset used in a `Cookie:` request header,
//!   lossy by design
//! - **Netscape** ([`NetscapeCodec`](netscape::NetscapeCodec)): the
//!   tab-separated cookies.txt format understood by curl and wget
//!
//! [`import_any`] implements the fixed-order fallback chain consumers use
//! when the input format is unknown.

pub mod header;
pub mod json;
pub mod netscape;

use crate::base::error::CookieError;
use crate::cookies::record::CookieRecord;

/// A parse/format pair for one interchange text format.
///
/// `parse` failures are always recoverable and never partial: either the
/// whole input yields a complete record sequence, or nothing is produced.
pub trait Codec {
    /// Decode an ordered sequence of cookie records from text.
    fn parse(&self, text: &str) -> Result<Vec<CookieRecord>, CookieError>;

    /// Encode records into this codec's text format.
    fn format(&self, records: &[CookieRecord]) -> Result<String, CookieError>;
}

/// Try JSON, then Header-String, then Netscape, in that fixed order, and
/// return the first successful parse.
///
/// Returns [`CookieError::UnrecognizedFormat`] only when all three fail.
pub fn import_any(text: &str) -> Result<Vec<CookieRecord>, CookieError> {
    let codecs: [(&str, &dyn Codec); 3] = [
        ("json", &json::JsonCodec),
        ("header", &header::HeaderCodec),
        ("netscape", &netscape::NetscapeCodec),
    ];

    for (label, codec) in codecs {
        match codec.parse(text) {
            Ok(records) => {
                tracing::debug!(codec = label, count = records.len(), "import succeeded");
                return Ok(records);
            }
            Err(err) => {
                tracing::debug!(codec = label, error = %err, "import attempt failed");
            }
        }
    }

    Err(CookieError::UnrecognizedFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_selects_json_first() {
        let text = r#"[{"name": "sid", "value": "abc", "domain": "example.com"}]"#;
        let records = import_any(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].domain, "example.com");
    }

    #[test]
    fn test_fallback_selects_header_for_pairs() {
        let records = import_any("a=1; b=2").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.domain.is_empty()));
    }

    #[test]
    fn test_fallback_selects_netscape() {
        // Not JSON, and no `=` anywhere, so the header codec refuses too.
        let text = ".example.com\tTRUE\t/\tTRUE\t1735689600\tsid\tabc123";
        let records = import_any(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "sid");
        assert_eq!(records[0].value, "abc123");
    }

    #[test]
    fn test_fallback_exhausted() {
        let err = import_any("complete nonsense").unwrap_err();
        assert_eq!(err, CookieError::UnrecognizedFormat);
    }
}
