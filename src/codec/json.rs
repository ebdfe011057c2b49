//! JSON interchange codec.
//!
//! Parses and formats the full-fidelity export format: a top-level array of
//! cookie-shaped objects with camelCase fields. Formatting normalizes two
//! fields that must not travel between profiles:
//!
//! - `storeId` becomes `null` (partition identifiers are local to a profile)
//! - an `unspecified` sameSite value becomes `null`

use crate::base::error::CookieError;
use crate::codec::Codec;
use crate::cookies::record::{CookieRecord, SameSite};
use serde::{Deserialize, Serialize};

/// Wire representation of one exported cookie object.
///
/// Separate from [`CookieRecord`] so the export normalization never leaks
/// into the in-memory model.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct JsonCookie {
    name: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    expiration_date: Option<f64>,
    #[serde(default)]
    same_site: Option<SameSite>,
    #[serde(default)]
    host_only: bool,
    #[serde(default)]
    secure: bool,
    #[serde(default)]
    http_only: bool,
    #[serde(default)]
    store_id: Option<String>,
}

impl From<JsonCookie> for CookieRecord {
    fn from(wire: JsonCookie) -> Self {
        CookieRecord {
            name: wire.name,
            value: wire.value,
            domain: wire.domain,
            path: wire.path,
            expiration_date: wire.expiration_date,
            same_site: wire.same_site.unwrap_or(SameSite::Unspecified),
            host_only: wire.host_only,
            secure: wire.secure,
            http_only: wire.http_only,
            store_id: wire.store_id.unwrap_or_default(),
        }
    }
}

impl From<&CookieRecord> for JsonCookie {
    fn from(record: &CookieRecord) -> Self {
        JsonCookie {
            name: record.name.clone(),
            value: record.value.clone(),
            domain: record.domain.clone(),
            path: record.path.clone(),
            expiration_date: record.expiration_date,
            same_site: match record.same_site {
                SameSite::Unspecified => None,
                other => Some(other),
            },
            host_only: record.host_only,
            secure: record.secure,
            http_only: record.http_only,
            // Partition ids are not portable across profiles.
            store_id: None,
        }
    }
}

pub struct JsonCodec;

impl Codec for JsonCodec {
    fn parse(&self, text: &str) -> Result<Vec<CookieRecord>, CookieError> {
        let wire: Vec<JsonCookie> = serde_json::from_str(text)
            .map_err(|e| CookieError::malformed_input(format!("JSON decode failed: {e}")))?;
        Ok(wire.into_iter().map(CookieRecord::from).collect())
    }

    fn format(&self, records: &[CookieRecord]) -> Result<String, CookieError> {
        let wire: Vec<JsonCookie> = records.iter().map(JsonCookie::from).collect();
        Ok(serde_json::to_string_pretty(&wire)?)
    }
}
