//! `Cookie:` header-string codec.
//!
//! The header format is a one-way projection: only `name=value` pairs
//! survive. Parsing tolerates sloppy input the way browsers do — segments
//! that do not contain a `=` are skipped (and logged) instead of failing
//! the whole parse; the parse fails only when nothing valid remains.

use crate::base::error::CookieError;
use crate::codec::Codec;
use crate::cookies::record::CookieRecord;
use cookie::Cookie;

pub struct HeaderCodec;

impl Codec for HeaderCodec {
    fn parse(&self, text: &str) -> Result<Vec<CookieRecord>, CookieError> {
        let mut records = Vec::new();

        for segment in text.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            match Cookie::parse(segment.to_string()) {
                Ok(parsed) => {
                    records.push(CookieRecord::name_value(parsed.name(), parsed.value()));
                }
                Err(err) => {
                    tracing::debug!(segment = %segment, error = %err, "skipping header segment");
                }
            }
        }

        if records.is_empty() {
            return Err(CookieError::NoCookiesFound);
        }
        Ok(records)
    }

    /// Lossy by contract: every field except name and value is dropped.
    fn format(&self, records: &[CookieRecord]) -> Result<String, CookieError> {
        let pairs: Vec<String> = records
            .iter()
            .map(|r| format!("{}={}", r.name, r.value))
            .collect();
        Ok(pairs.join(";"))
    }
}
