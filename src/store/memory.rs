//! In-memory cookie store: the capability-direct transport.
//!
//! Backs the contract tests and any embedding that keeps its cookies
//! in-process. Write validation follows browser behavior: cookies may not
//! be set on public suffixes, and an explicit domain must cover the target
//! URL's host. A successful overwrite emits the delete-then-recreate
//! notification pair real stores produce, so reconciliation sees the same
//! event shapes either way.

use crate::base::error::CookieError;
use crate::cookies::record::CookieRecord;
use crate::cookies::relevance::domain_matches;
use crate::store::{
    CookieStore, Deleting, Listing, MutationCause, StoreNotification, StoreScope, Writing,
};
use dashmap::DashMap;
use psl::{List, Psl};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Storage key: one cookie per `(partition, domain, path, name)`.
type StoreKey = (String, String, String, String);

#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<StoreKey, CookieRecord>>,
    events: broadcast::Sender<StoreNotification>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Arc::new(DashMap::new()),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if a domain is a public suffix (e.g. "com", "co.uk").
    fn is_public_suffix(domain: &str) -> bool {
        let lower = domain.to_lowercase();
        match List.suffix(lower.as_bytes()) {
            Some(suffix) => suffix.as_bytes() == lower.as_bytes(),
            None => false,
        }
    }

    /// Validate an explicit cookie domain against the target URL host.
    /// Rejects public suffixes (supercookies) and domains that do not cover
    /// the host.
    fn valid_write_domain(domain: &str, host: &str) -> bool {
        !Self::is_public_suffix(domain) && domain_matches(domain, host)
    }

    /// Apply store-side normalization and validation to a record about to
    /// be written.
    fn normalize(scope: &StoreScope, mut record: CookieRecord) -> Result<CookieRecord, CookieError> {
        if record.name.is_empty() {
            return Err(CookieError::write_rejected("cookie name is empty"));
        }

        let host = match scope.host() {
            Some(h) => h.to_lowercase(),
            None => {
                return Err(CookieError::write_rejected(format!(
                    "target URL {} has no host",
                    scope.url
                )));
            }
        };

        if record.domain.is_empty() {
            // No domain attribute: host-only cookie on the URL host.
            record.domain = host;
            record.host_only = true;
        } else {
            let domain = record.domain.trim_start_matches('.').to_lowercase();
            if !Self::valid_write_domain(&domain, &host) {
                return Err(CookieError::write_rejected(format!(
                    "domain {:?} is not valid for target host {:?}",
                    record.domain, host
                )));
            }
            record.domain = domain;
            record.host_only = false;
        }

        if record.path.is_empty() {
            record.path = "/".to_string();
        }
        if record.store_id.is_empty() {
            record.store_id = scope.store_id.clone();
        }

        Ok(record)
    }

    fn key_of(record: &CookieRecord) -> StoreKey {
        (
            record.store_id.clone(),
            record.domain.clone(),
            record.path.clone(),
            record.name.clone(),
        )
    }

    fn notify(&self, cookie: CookieRecord, removed: bool, cause: MutationCause) {
        // No subscribers is fine; the send result only reports that.
        let _ = self.events.send(StoreNotification {
            cookie,
            removed,
            cause,
        });
    }
}

impl CookieStore for MemoryStore {
    fn list(&self, scope: &StoreScope) -> Listing {
        let entries = Arc::clone(&self.entries);
        let scope = scope.clone();
        Box::pin(async move {
            let host = scope.host().map(|h| h.to_lowercase()).unwrap_or_default();
            let now = OffsetDateTime::now_utc();

            let mut records: Vec<CookieRecord> = entries
                .iter()
                .map(|entry| entry.value().clone())
                .filter(|record| record.store_id == scope.store_id)
                .filter(|record| !record.is_expired(now))
                .filter(|record| domain_matches(&record.domain, &host))
                .collect();

            // Deterministic listing order for callers that diff results.
            records.sort_by(|a, b| {
                a.domain
                    .cmp(&b.domain)
                    .then_with(|| a.path.cmp(&b.path))
                    .then_with(|| a.name.cmp(&b.name))
            });
            Ok(records)
        })
    }

    fn write(&self, scope: &StoreScope, record: CookieRecord) -> Writing {
        let store = self.clone();
        let scope = scope.clone();
        Box::pin(async move {
            let record = Self::normalize(&scope, record)?;
            let key = Self::key_of(&record);

            let previous = store.entries.insert(key, record.clone());
            if let Some(old) = previous {
                // Logical update: stores surface it as remove(overwrite)
                // followed by a fresh set.
                store.notify(old, true, MutationCause::Overwrite);
            }
            store.notify(record.clone(), false, MutationCause::Explicit);

            tracing::debug!(name = %record.name, domain = %record.domain, "cookie written");
            Ok(record)
        })
    }

    fn delete(&self, scope: &StoreScope, name: &str) -> Deleting {
        let store = self.clone();
        let scope = scope.clone();
        let name = name.to_string();
        Box::pin(async move {
            let host = scope.host().map(|h| h.to_lowercase()).unwrap_or_default();

            let victims: Vec<StoreKey> = store
                .entries
                .iter()
                .filter(|entry| {
                    let record = entry.value();
                    record.name == name
                        && record.store_id == scope.store_id
                        && domain_matches(&record.domain, &host)
                })
                .map(|entry| entry.key().clone())
                .collect();

            let mut found = false;
            for key in victims {
                if let Some((_, record)) = store.entries.remove(&key) {
                    found = true;
                    store.notify(record, true, MutationCause::Explicit);
                }
            }

            tracing::debug!(name = %name, found, "cookie delete");
            Ok(found)
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreNotification> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(url: &str) -> StoreScope {
        StoreScope::new(url.parse().unwrap(), "0")
    }

    fn record(name: &str, value: &str, domain: &str) -> CookieRecord {
        let mut r = CookieRecord::name_value(name, value);
        r.domain = domain.to_string();
        r
    }

    #[tokio::test]
    async fn test_write_then_list() {
        let store = MemoryStore::new();
        let scope = scope("https://a.example.com/");

        store
            .write(&scope, record("sid", "abc", "example.com"))
            .await
            .unwrap();

        let listed = store.list(&scope).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "sid");
        assert!(!listed[0].host_only);
    }

    #[tokio::test]
    async fn test_write_without_domain_is_host_only() {
        let store = MemoryStore::new();
        let scope = scope("https://a.example.com/");

        let written = store
            .write(&scope, record("sid", "abc", ""))
            .await
            .unwrap();
        assert!(written.host_only);
        assert_eq!(written.domain, "a.example.com");
        assert_eq!(written.path, "/");
        assert_eq!(written.store_id, "0");
    }

    #[tokio::test]
    async fn test_write_rejects_public_suffix() {
        let store = MemoryStore::new();
        let scope = scope("https://example.com/");

        let err = store
            .write(&scope, record("evil", "1", "com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CookieError::WriteRejected { .. }));
    }

    #[tokio::test]
    async fn test_write_rejects_foreign_domain() {
        let store = MemoryStore::new();
        let scope = scope("https://example.com/");

        let err = store
            .write(&scope, record("sid", "1", "other.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, CookieError::WriteRejected { .. }));
    }

    #[tokio::test]
    async fn test_overwrite_emits_pair() {
        let store = MemoryStore::new();
        let scope = scope("https://example.com/");
        let mut events = store.subscribe();

        store
            .write(&scope, record("sid", "v1", "example.com"))
            .await
            .unwrap();
        store
            .write(&scope, record("sid", "v2", "example.com"))
            .await
            .unwrap();

        // First write: single set notification.
        let first = events.recv().await.unwrap();
        assert!(!first.removed);
        assert_eq!(first.cause, MutationCause::Explicit);

        // Second write: remove(overwrite) then set(explicit).
        let removed = events.recv().await.unwrap();
        assert!(removed.removed);
        assert_eq!(removed.cause, MutationCause::Overwrite);
        assert_eq!(removed.cookie.value, "v1");

        let set = events.recv().await.unwrap();
        assert!(!set.removed);
        assert_eq!(set.cause, MutationCause::Explicit);
        assert_eq!(set.cookie.value, "v2");
    }

    #[tokio::test]
    async fn test_delete_missing_reports_not_found() {
        let store = MemoryStore::new();
        let scope = scope("https://example.com/");

        let found = store.delete(&scope, "ghost").await.unwrap();
        assert!(!found);
    }

    #[tokio::test]
    async fn test_list_filters_partition_and_domain() {
        let store = MemoryStore::new();
        let a = scope("https://a.example.com/");
        let other_partition = StoreScope::new("https://a.example.com/".parse().unwrap(), "1");

        store
            .write(&a, record("shared", "1", "example.com"))
            .await
            .unwrap();
        store
            .write(&other_partition, record("partitioned", "2", "example.com"))
            .await
            .unwrap();
        store
            .write(
                &scope("https://unrelated.org/"),
                record("foreign", "3", "unrelated.org"),
            )
            .await
            .unwrap();

        let listed = store.list(&a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "shared");
    }

    #[tokio::test]
    async fn test_list_skips_expired() {
        let store = MemoryStore::new();
        let scope = scope("https://example.com/");

        let mut stale = record("stale", "1", "example.com");
        stale.expiration_date = Some(1_000_000.0);
        store.write(&scope, stale).await.unwrap();

        let listed = store.list(&scope).await.unwrap();
        assert!(listed.is_empty());
    }
}
