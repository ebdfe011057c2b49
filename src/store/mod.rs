//! External cookie-store capability.
//!
//! The crate does not implement cookie storage; it synchronizes against a
//! store reached through the [`CookieStore`] trait. Two transports
//! implement it, selected explicitly at construction time:
//!
//! - [`MemoryStore`](memory::MemoryStore): capability-direct, in-process
//! - [`RelayStore`](relay::RelayStore): operations relayed over channels to
//!   an intermediary that owns the real store
//!
//! Both present the same Result-bearing contract; transports that deliver
//! errors out-of-band (callback-style capabilities, lost channels) normalize
//! them into [`CookieError`] before they cross this seam.

pub mod memory;
pub mod relay;

use crate::base::error::CookieError;
use crate::cookies::record::CookieRecord;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio::sync::broadcast;
use url::Url;

/// The slice of the store a call operates on: a target URL plus the storage
/// partition it lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreScope {
    pub url: Url,
    pub store_id: String,
}

impl StoreScope {
    pub fn new(url: Url, store_id: impl Into<String>) -> Self {
        Self {
            url,
            store_id: store_id.into(),
        }
    }

    /// Host component of the scope URL, if it has one.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

/// Why a store reported a mutation.
///
/// `Overwrite` marks the removal half of the delete-then-recreate pair some
/// stores emit for a single logical update; reconciliation coalesces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationCause {
    Explicit,
    Overwrite,
    Expired,
    Evicted,
}

/// One store mutation as delivered by the subscription primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreNotification {
    pub cookie: CookieRecord,
    pub removed: bool,
    pub cause: MutationCause,
}

/// Alias for the `Future` returned by [`CookieStore::list`].
pub type Listing = Pin<Box<dyn Future<Output = Result<Vec<CookieRecord>, CookieError>> + Send>>;

/// Alias for the `Future` returned by [`CookieStore::write`].
pub type Writing = Pin<Box<dyn Future<Output = Result<CookieRecord, CookieError>> + Send>>;

/// Alias for the `Future` returned by [`CookieStore::delete`]; resolves to
/// whether anything matched.
pub type Deleting = Pin<Box<dyn Future<Output = Result<bool, CookieError>> + Send>>;

/// The consumed store capability.
///
/// # Design Notes
///
/// - Uses `&self` so one transport handle serves concurrent callers.
/// - Returns boxed futures for trait object compatibility.
/// - `delete` resolves to `false` (not an error) when nothing matched;
///   idempotency policy belongs to the handler façade.
pub trait CookieStore: Send + Sync {
    /// List the cookies visible in the given scope.
    fn list(&self, scope: &StoreScope) -> Listing;

    /// Create or overwrite a cookie. The returned record is the store's own
    /// normalized view of what was written.
    fn write(&self, scope: &StoreScope, record: CookieRecord) -> Writing;

    /// Delete the cookies with the given name in scope.
    fn delete(&self, scope: &StoreScope, name: &str) -> Deleting;

    /// Subscribe to mutation notifications. Dropping the receiver
    /// unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<StoreNotification>;
}

/// Blanket implementation for Arc-wrapped stores.
impl<S: CookieStore + ?Sized> CookieStore for Arc<S> {
    fn list(&self, scope: &StoreScope) -> Listing {
        (**self).list(scope)
    }

    fn write(&self, scope: &StoreScope, record: CookieRecord) -> Writing {
        (**self).write(scope, record)
    }

    fn delete(&self, scope: &StoreScope, name: &str) -> Deleting {
        (**self).delete(scope, name)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreNotification> {
        (**self).subscribe()
    }
}
