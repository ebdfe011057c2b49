use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single cookie as observed through the external store capability.
///
/// Field names on the wire are camelCase to match the interchange JSON
/// format; `expiration_date` is fractional epoch seconds because stores
/// report sub-second expiries and round-tripping must not truncate them.
/// A record without `expiration_date` is a session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
    #[serde(default)]
    pub same_site: SameSite,
    #[serde(default)]
    pub host_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub store_id: String,
}

/// SameSite enforcement level, wire-compatible with store notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    #[default]
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

impl CookieRecord {
    /// Minimal record carrying only a name and value, every other field at
    /// its default. This is what the header-string codec produces.
    pub fn name_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: String::new(),
            expiration_date: None,
            same_site: SameSite::Unspecified,
            host_only: false,
            secure: false,
            http_only: false,
            store_id: String::new(),
        }
    }

    /// True when the record has no expiry and lives only for the session.
    pub fn is_session(&self) -> bool {
        self.expiration_date.is_none()
    }

    /// Expiry as an [`OffsetDateTime`], if the record carries one.
    ///
    /// Sub-second precision is dropped; expiry comparison at whole-second
    /// granularity is what the interchange formats can represent anyway.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expiration_date
            .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs as i64).ok())
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        match self.expires_at() {
            Some(expiry) => expiry < now,
            None => false,
        }
    }
}
