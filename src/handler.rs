//! Operation façade over a store transport.
//!
//! [`CookieHandler`] is the surface consumers (and the reconciliation
//! engine) use to reach the external store. The transport — capability
//! direct or relayed — is chosen once at construction; the façade itself
//! only adds the normalization and idempotency rules the raw capability
//! does not guarantee.

use crate::base::error::CookieError;
use crate::cookies::record::{CookieRecord, SameSite};
use crate::store::{CookieStore, StoreNotification, StoreScope};
use std::sync::Arc;
use tokio::sync::broadcast;
use url::Url;

#[derive(Clone)]
pub struct CookieHandler {
    store: Arc<dyn CookieStore>,
}

impl CookieHandler {
    /// Wrap a store transport. This is the only place the transport choice
    /// is made; nothing downstream inspects which one it got.
    pub fn new(store: Arc<dyn CookieStore>) -> Self {
        Self { store }
    }

    /// Subscribe to raw store mutation notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreNotification> {
        self.store.subscribe()
    }

    /// List the cookies visible in the given scope.
    ///
    /// Any failure of the underlying capability call is reported as
    /// `StoreUnavailable`; callers must not see transport details.
    pub async fn list(&self, scope: &StoreScope) -> Result<Vec<CookieRecord>, CookieError> {
        self.store.list(scope).await.map_err(|err| match err {
            already @ CookieError::StoreUnavailable { .. } => already,
            other => CookieError::store_unavailable(other.to_string()),
        })
    }

    /// Normalize and persist a record against `target_url`.
    ///
    /// Normalization before the write:
    /// - a host-only record must not carry a domain override; it is cleared
    ///   and the store re-derives the host domain
    /// - `SameSite=None` (cross-site unrestricted) requires `Secure`
    /// - an empty partition id defaults to the active context's
    pub async fn save(
        &self,
        mut record: CookieRecord,
        target_url: &Url,
        default_store_id: &str,
    ) -> Result<CookieRecord, CookieError> {
        if record.host_only {
            record.domain.clear();
        }
        if record.same_site == SameSite::NoRestriction && !record.secure {
            tracing::debug!(name = %record.name, "forcing Secure for SameSite=None cookie");
            record.secure = true;
        }
        if record.store_id.is_empty() {
            record.store_id = default_store_id.to_string();
        }

        let scope = StoreScope::new(target_url.clone(), record.store_id.clone());
        self.store.write(&scope, record).await
    }

    /// Delete by name, scoped to the given partition. Deleting a cookie
    /// that does not exist is success: the end state is the same.
    pub async fn remove(
        &self,
        name: &str,
        target_url: &Url,
        store_id: &str,
    ) -> Result<(), CookieError> {
        let scope = StoreScope::new(target_url.clone(), store_id.to_string());
        match self.store.delete(&scope, name).await {
            Ok(found) => {
                if !found {
                    tracing::debug!(name = %name, "delete target absent; treating as success");
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
