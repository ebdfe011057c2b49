//! Active-context tracking.
//!
//! The context is the browsing target (tab-like) whose cookies are being
//! inspected: an id, a URL and a storage partition. The tracker classifies
//! every reported context into the transition kind the reconciliation
//! engine keys its reload decisions on.

use crate::base::error::CookieError;
use crate::store::StoreScope;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio::sync::mpsc;
use url::Url;

/// The browsing context currently under inspection.
///
/// Replaced wholesale (never mutated in place) on every transition, so a
/// continuation holding an `Arc` can never observe a half-updated context.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveContext {
    pub id: u64,
    pub url: Url,
    pub store_id: String,
}

impl ActiveContext {
    pub fn new(id: u64, url: Url, store_id: impl Into<String>) -> Self {
        Self {
            id,
            url,
            store_id: store_id.into(),
        }
    }

    /// Store scope covering this context.
    pub fn scope(&self) -> StoreScope {
        StoreScope::new(self.url.clone(), self.store_id.clone())
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

/// How a newly reported context relates to the tracked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same id, URL and partition; nothing to do.
    None,
    /// Same id, new URL or partition: in-place navigation. The
    /// cookie-relevant domain may have changed, so the jar reloads.
    Navigated,
    /// Different id (or first acquisition): switched to another context.
    Activated,
}

/// Holds the active context and classifies updates.
#[derive(Debug, Default)]
pub struct ContextTracker {
    current: Option<Arc<ActiveContext>>,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Arc<ActiveContext>> {
        self.current.as_ref()
    }

    /// Record a reported context and return the transition kind. The
    /// stored context is only replaced when something actually changed.
    pub fn update(&mut self, next: ActiveContext) -> Transition {
        let transition = match self.current.as_deref() {
            None => Transition::Activated,
            Some(current) if current.id != next.id => Transition::Activated,
            Some(current) if current.url != next.url || current.store_id != next.store_id => {
                Transition::Navigated
            }
            Some(_) => Transition::None,
        };

        if transition != Transition::None {
            tracing::debug!(
                id = next.id,
                url = %next.url,
                kind = ?transition,
                "context transition"
            );
            self.current = Some(Arc::new(next));
        }
        transition
    }
}

/// Alias for the `Future` returned by [`ContextSource::current`].
pub type ContextQuery = Pin<Box<dyn Future<Output = Result<ActiveContext, CookieError>> + Send>>;

/// The consumed context interface: a point query plus a subscription for
/// navigation/activation events, each normalized into
/// [`ContextTracker::update`] calls by the reconciler.
pub trait ContextSource: Send + Sync {
    fn current(&self) -> ContextQuery;

    /// Subscribe to context changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ActiveContext>;
}
