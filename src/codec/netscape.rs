//! Netscape cookies.txt codec.
//!
//! Line-oriented tabular format understood by curl and wget. Each data
//! line carries exactly seven tab-separated columns:
//!
//! `domain \t include_subdomains \t path \t secure \t expiry \t name \t value`
//!
//! Comments (`#`) and blank lines are ignored on parse. Expiry is integer
//! epoch seconds, `0` meaning a session cookie.

use crate::base::error::CookieError;
use crate::codec::Codec;
use crate::cookies::record::CookieRecord;

const COLUMNS: usize = 7;

pub struct NetscapeCodec;

impl Codec for NetscapeCodec {
    fn parse(&self, text: &str) -> Result<Vec<CookieRecord>, CookieError> {
        let mut records = Vec::new();

        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() != COLUMNS {
                return Err(CookieError::malformed_input(format!(
                    "line {}: expected {} tab-separated columns, found {}",
                    index + 1,
                    COLUMNS,
                    columns.len()
                )));
            }

            let expiry: i64 = columns[4].trim().parse().map_err(|_| {
                CookieError::malformed_input(format!(
                    "line {}: expiry is not an integer: {:?}",
                    index + 1,
                    columns[4]
                ))
            })?;

            let mut record = CookieRecord::name_value(columns[5], columns[6]);
            record.domain = columns[0].trim_start_matches('.').to_string();
            record.host_only = columns[1].eq_ignore_ascii_case("FALSE");
            record.path = columns[2].to_string();
            record.secure = columns[3].eq_ignore_ascii_case("TRUE");
            record.expiration_date = if expiry > 0 { Some(expiry as f64) } else { None };

            records.push(record);
        }

        Ok(records)
    }

    fn format(&self, records: &[CookieRecord]) -> Result<String, CookieError> {
        let mut lines = vec![
            "# Netscape HTTP Cookie File".to_string(),
            "# https://curl.se/docs/http-cookies.html".to_string(),
            "# This file was generated by cookiescope".to_string(),
            String::new(),
        ];

        for record in records {
            let include_subdomains = if record.host_only { "FALSE" } else { "TRUE" };
            let secure = if record.secure { "TRUE" } else { "FALSE" };
            let expiry = record.expiration_date.map(|t| t as i64).unwrap_or(0);

            // Non-host-only domains conventionally carry the leading dot.
            let domain = if !record.host_only && !record.domain.starts_with('.') {
                format!(".{}", record.domain)
            } else {
                record.domain.clone()
            };

            lines.push(format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                domain, include_subdomains, record.path, secure, expiry, record.name, record.value
            ));
        }

        Ok(lines.join("\n"))
    }
}
