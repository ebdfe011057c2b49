//! Relayed store transport.
//!
//! When the surface inspecting cookies cannot reach the store capability
//! directly, operations are forwarded over a channel to an intermediary
//! that can. [`RelayStore`] is the client half: it implements
//! [`CookieStore`] by shipping [`RelayRequest`]s and awaiting oneshot
//! replies. [`RelayEndpoint::serve`] is the peer half: it answers requests
//! against a real store and pumps that store's mutation notifications back
//! to the client.
//!
//! Channel loss anywhere on the path surfaces as
//! [`CookieError::StoreUnavailable`]; there is no retry at this layer.

use crate::base::error::CookieError;
use crate::cookies::record::CookieRecord;
use crate::store::{
    CookieStore, Deleting, Listing, StoreNotification, StoreScope, Writing,
};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

const EVENT_CAPACITY: usize = 64;

/// One forwarded store operation, carrying its reply channel.
pub enum RelayRequest {
    List {
        scope: StoreScope,
        reply: oneshot::Sender<Result<Vec<CookieRecord>, CookieError>>,
    },
    Write {
        scope: StoreScope,
        record: CookieRecord,
        reply: oneshot::Sender<Result<CookieRecord, CookieError>>,
    },
    Delete {
        scope: StoreScope,
        name: String,
        reply: oneshot::Sender<Result<bool, CookieError>>,
    },
}

/// Client half of a relay connection. Cheap to clone; all clones share the
/// same underlying channel pair.
#[derive(Clone)]
pub struct RelayStore {
    requests: mpsc::UnboundedSender<RelayRequest>,
    events: broadcast::Sender<StoreNotification>,
}

/// Peer half of a relay connection: owns the request receiver and the
/// notification sender feeding the client.
pub struct RelayEndpoint {
    requests: mpsc::UnboundedReceiver<RelayRequest>,
    events: broadcast::Sender<StoreNotification>,
}

impl RelayStore {
    /// Create an unconnected client/endpoint pair. The endpoint must be
    /// driven by [`RelayEndpoint::serve`]; dropping it instead makes every
    /// client operation fail `StoreUnavailable`.
    pub fn connect() -> (RelayStore, RelayEndpoint) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let client = RelayStore {
            requests: tx,
            events: events.clone(),
        };
        let endpoint = RelayEndpoint {
            requests: rx,
            events,
        };
        (client, endpoint)
    }

    /// Connect to a store and serve it on a background task.
    pub fn spawn(store: Arc<dyn CookieStore>) -> RelayStore {
        let (client, endpoint) = Self::connect();
        tokio::spawn(endpoint.serve(store));
        client
    }

    fn unavailable(context: &str) -> CookieError {
        CookieError::store_unavailable(format!("relay {context}"))
    }

    fn send(&self, request: RelayRequest) -> Result<(), CookieError> {
        self.requests
            .send(request)
            .map_err(|_| Self::unavailable("channel closed"))
    }
}

impl CookieStore for RelayStore {
    fn list(&self, scope: &StoreScope) -> Listing {
        let store = self.clone();
        let scope = scope.clone();
        Box::pin(async move {
            let (reply, response) = oneshot::channel();
            store.send(RelayRequest::List { scope, reply })?;
            response
                .await
                .map_err(|_| Self::unavailable("peer dropped reply"))?
        })
    }

    fn write(&self, scope: &StoreScope, record: CookieRecord) -> Writing {
        let store = self.clone();
        let scope = scope.clone();
        Box::pin(async move {
            let (reply, response) = oneshot::channel();
            store.send(RelayRequest::Write {
                scope,
                record,
                reply,
            })?;
            response
                .await
                .map_err(|_| Self::unavailable("peer dropped reply"))?
        })
    }

    fn delete(&self, scope: &StoreScope, name: &str) -> Deleting {
        let store = self.clone();
        let scope = scope.clone();
        let name = name.to_string();
        Box::pin(async move {
            let (reply, response) = oneshot::channel();
            store.send(RelayRequest::Delete { scope, name, reply })?;
            response
                .await
                .map_err(|_| Self::unavailable("peer dropped reply"))?
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreNotification> {
        self.events.subscribe()
    }
}

impl RelayEndpoint {
    /// Answer requests against `store` and forward its notifications until
    /// the client goes away.
    pub async fn serve(mut self, store: Arc<dyn CookieStore>) {
        let mut notifications = store.subscribe();

        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => Self::handle(&store, request).await,
                    None => {
                        tracing::debug!("relay client disconnected; endpoint stopping");
                        break;
                    }
                },
                note = notifications.recv() => match note {
                    Ok(note) => {
                        let _ = self.events.send(note);
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "relay notification pump lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("store notification channel closed; endpoint stopping");
                        break;
                    }
                },
            }
        }
    }

    async fn handle(store: &Arc<dyn CookieStore>, request: RelayRequest) {
        match request {
            RelayRequest::List { scope, reply } => {
                let _ = reply.send(store.list(&scope).await);
            }
            RelayRequest::Write {
                scope,
                record,
                reply,
            } => {
                let _ = reply.send(store.write(&scope, record).await);
            }
            RelayRequest::Delete { scope, name, reply } => {
                let _ = reply.send(store.delete(&scope, &name).await);
            }
        }
    }
}

/// Explicit context-id to relay-connection table.
///
/// Owned by the transport layer: entries are registered when a context's
/// relay attaches and removed on disconnect, so a lost connection is
/// observed as `StoreUnavailable` rather than a stale channel handle.
#[derive(Default)]
pub struct RelayRegistry {
    connections: DashMap<u64, RelayStore>,
}

impl RelayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, context_id: u64, store: RelayStore) {
        tracing::debug!(context_id, "relay registered");
        self.connections.insert(context_id, store);
    }

    pub fn get(&self, context_id: u64) -> Option<RelayStore> {
        self.connections
            .get(&context_id)
            .map(|entry| entry.value().clone())
    }

    /// Remove a connection. Returns whether one was registered.
    pub fn disconnect(&self, context_id: u64) -> bool {
        let removed = self.connections.remove(&context_id).is_some();
        if removed {
            tracing::debug!(context_id, "relay disconnected");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
