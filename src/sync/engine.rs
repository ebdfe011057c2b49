//! Change reconciliation between the jar and the external store.
//!
//! The engine owns the jar and the context tracker, listens to two
//! independent asynchronous event sources (store mutations, context
//! changes) and keeps the jar locally consistent:
//!
//! - a context transition triggers a full, generation-stamped reload
//! - a store mutation is filtered for relevance and patched in
//!   incrementally
//!
//! All mutation happens on the engine's single logical thread of execution
//! between suspension points; the invariant preserved throughout is that a
//! completed reload only touches the jar when its originating generation is
//! still current (stale-response suppression). There is no explicit
//! cancellation of in-flight store calls.

use crate::base::error::CookieError;
use crate::cookies::identity::CookieId;
use crate::cookies::jar::{Jar, UpsertOutcome};
use crate::cookies::record::CookieRecord;
use crate::cookies::relevance::domain_matches;
use crate::handler::CookieHandler;
use crate::store::{MutationCause, StoreNotification, StoreScope};
use crate::sync::context::{ActiveContext, ContextSource, ContextTracker, Transition};
use crate::sync::events::{ChangeKind, EventBus, JarDelta, JarEvent};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Reconciliation state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No context acquired yet; the jar is empty and meaningless.
    Uninitialized,
    /// A full reload is outstanding; mutations are queued.
    Loading,
    /// The jar reflects the last completed reload plus incremental patches.
    Ready,
}

/// Whether the jar content could be determined at all.
///
/// Distinguishes "the context genuinely has no cookies" from "the store
/// could not be reached"; a failed reload retains the last-known-good jar
/// and reports `NoAccess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JarAccess {
    /// No load has completed yet.
    Unknown,
    Accessible,
    NoAccess,
}

/// A reload the engine asked for: scope to list plus the generation stamp
/// used to detect staleness on completion.
#[derive(Debug, Clone)]
pub struct ReloadRequest {
    pub generation: u64,
    pub scope: StoreScope,
}

/// The reconciliation engine. Owns the [`Jar`] and the [`ContextTracker`];
/// everything consumers see goes through [`snapshot`](Self::snapshot) and
/// the event bus.
pub struct Reconciler {
    jar: Jar,
    tracker: ContextTracker,
    handler: CookieHandler,
    events: EventBus,
    state: EngineState,
    access: JarAccess,
    generation: u64,
    ready_emitted: bool,
    queued: VecDeque<StoreNotification>,
}

impl Reconciler {
    pub fn new(handler: CookieHandler) -> Self {
        Self {
            jar: Jar::new(),
            tracker: ContextTracker::new(),
            handler,
            events: EventBus::default(),
            state: EngineState::Uninitialized,
            access: JarAccess::Unknown,
            generation: 0,
            ready_emitted: false,
            queued: VecDeque::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn access(&self) -> JarAccess {
        self.access
    }

    pub fn context(&self) -> Option<&Arc<ActiveContext>> {
        self.tracker.current()
    }

    pub fn handler(&self) -> &CookieHandler {
        &self.handler
    }

    /// Ordered read-only copy of the jar for display.
    pub fn snapshot(&self) -> Vec<CookieRecord> {
        self.jar.snapshot()
    }

    /// Subscribe to [`JarEvent`]s. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<JarEvent> {
        self.events.subscribe()
    }

    /// Feed a reported context. Returns the reload the caller must issue
    /// when the transition warrants one.
    pub fn observe_context(&mut self, ctx: ActiveContext) -> Option<ReloadRequest> {
        match self.tracker.update(ctx) {
            Transition::None => None,
            Transition::Navigated | Transition::Activated => {
                let scope = match self.tracker.current() {
                    Some(current) => current.scope(),
                    None => return None,
                };
                self.generation += 1;
                self.state = EngineState::Loading;
                Some(ReloadRequest {
                    generation: self.generation,
                    scope,
                })
            }
        }
    }

    /// Deliver the result of a previously requested reload.
    ///
    /// A completion whose generation no longer matches the engine's is the
    /// result of a superseded request: it is discarded outright, never
    /// merged.
    pub fn complete_reload(
        &mut self,
        request: &ReloadRequest,
        result: Result<Vec<CookieRecord>, CookieError>,
    ) {
        if request.generation != self.generation {
            tracing::debug!(
                stale = request.generation,
                current = self.generation,
                "discarding stale reload result"
            );
            return;
        }

        match result {
            Ok(records) => {
                tracing::debug!(count = records.len(), "jar reloaded");
                self.jar.reload(records);
                self.state = EngineState::Ready;
                self.access = JarAccess::Accessible;

                if !self.ready_emitted {
                    self.ready_emitted = true;
                    self.events.emit(JarEvent::Ready);
                }
                self.events.emit(JarEvent::Changed(None));

                // Mutations that raced the reload describe deltas against
                // the state we just established; replay them in order.
                let queued: Vec<StoreNotification> = self.queued.drain(..).collect();
                for note in queued {
                    self.apply_mutation(note);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "jar reload failed; keeping last-known-good content");
                self.state = EngineState::Ready;
                self.access = JarAccess::NoAccess;
                // Queued deltas are relative to a load that never happened.
                self.queued.clear();
            }
        }
    }

    /// Feed a store mutation notification.
    pub fn observe_mutation(&mut self, note: StoreNotification) {
        match self.state {
            EngineState::Uninitialized => {
                tracing::trace!("mutation before first context; ignored");
            }
            EngineState::Loading => {
                self.queued.push_back(note);
            }
            EngineState::Ready => {
                self.apply_mutation(note);
            }
        }
    }

    fn apply_mutation(&mut self, note: StoreNotification) {
        if note.cause == MutationCause::Overwrite {
            // The removal half of a delete-then-recreate pair; the
            // follow-up set carries the real change.
            tracing::trace!(name = %note.cookie.name, "overwrite notification coalesced");
            return;
        }

        let (store_id, host) = match self.tracker.current() {
            Some(ctx) => match ctx.url.host_str() {
                Some(host) => (ctx.store_id.clone(), host.to_string()),
                None => return,
            },
            None => return,
        };

        if note.cookie.store_id != store_id {
            tracing::trace!(
                cookie_store = %note.cookie.store_id,
                context_store = %store_id,
                "mutation for foreign partition ignored"
            );
            return;
        }
        if !domain_matches(&note.cookie.domain, &host) {
            tracing::trace!(
                domain = %note.cookie.domain,
                host = %host,
                "mutation irrelevant to active context"
            );
            return;
        }

        let id = CookieId::of(&note.cookie);
        if note.removed {
            if self.jar.remove(id) {
                self.events.emit(JarEvent::Changed(Some(JarDelta {
                    kind: ChangeKind::Removed,
                    id,
                    record: note.cookie,
                })));
            }
        } else {
            let kind = match self.jar.upsert(note.cookie.clone()) {
                UpsertOutcome::Inserted => ChangeKind::Added,
                UpsertOutcome::Updated => ChangeKind::Updated,
            };
            self.events.emit(JarEvent::Changed(Some(JarDelta {
                kind,
                id,
                record: note.cookie,
            })));
        }
    }

    /// Drive the engine from explicit channels until both close.
    pub async fn run(
        self,
        contexts: mpsc::UnboundedReceiver<ActiveContext>,
        mutations: mpsc::UnboundedReceiver<StoreNotification>,
    ) {
        self.drive(contexts, mutations, FuturesUnordered::new())
            .await;
    }

    /// Drive the engine from a [`ContextSource`]: bootstrap from its
    /// `current()` query, then follow its subscription.
    pub async fn run_with_source(
        mut self,
        source: Arc<dyn ContextSource>,
        mutations: mpsc::UnboundedReceiver<StoreNotification>,
    ) {
        let contexts = source.subscribe();
        let reloads = FuturesUnordered::new();

        match source.current().await {
            Ok(ctx) => {
                if let Some(request) = self.observe_context(ctx) {
                    reloads.push(self.issue(request));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "initial context query failed");
            }
        }

        self.drive(contexts, mutations, reloads).await;
    }

    fn issue(&self, request: ReloadRequest) -> ReloadInFlight {
        let handler = self.handler.clone();
        Box::pin(async move {
            let result = handler.list(&request.scope).await;
            (request, result)
        })
    }

    async fn drive(
        mut self,
        mut contexts: mpsc::UnboundedReceiver<ActiveContext>,
        mut mutations: mpsc::UnboundedReceiver<StoreNotification>,
        mut reloads: FuturesUnordered<ReloadInFlight>,
    ) {
        loop {
            tokio::select! {
                maybe_ctx = contexts.recv() => match maybe_ctx {
                    Some(ctx) => {
                        if let Some(request) = self.observe_context(ctx) {
                            reloads.push(self.issue(request));
                        }
                    }
                    None => break,
                },
                maybe_note = mutations.recv() => match maybe_note {
                    Some(note) => self.observe_mutation(note),
                    None => break,
                },
                Some((request, result)) = reloads.next(), if !reloads.is_empty() => {
                    self.complete_reload(&request, result);
                }
            }
        }
    }
}

type ReloadInFlight =
    BoxFuture<'static, (ReloadRequest, Result<Vec<CookieRecord>, CookieError>)>;
