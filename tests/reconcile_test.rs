use cookiescope::base::error::CookieError;
use cookiescope::cookies::identity::CookieId;
use cookiescope::cookies::record::CookieRecord;
use cookiescope::handler::CookieHandler;
use cookiescope::store::memory::MemoryStore;
use cookiescope::store::{CookieStore, MutationCause, StoreNotification};
use cookiescope::sync::context::{ActiveContext, ContextQuery, ContextSource};
use cookiescope::sync::engine::{EngineState, JarAccess, Reconciler};
use cookiescope::sync::events::{ChangeKind, JarEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use url::Url;

fn ctx(id: u64, url: &str) -> ActiveContext {
    ActiveContext::new(id, Url::parse(url).unwrap(), "0")
}

fn mutation(name: &str, domain: &str, removed: bool, cause: MutationCause) -> StoreNotification {
    let mut cookie = CookieRecord::name_value(name, "v");
    cookie.domain = domain.to_string();
    cookie.store_id = "0".to_string();
    StoreNotification {
        cookie,
        removed,
        cause,
    }
}

fn engine() -> (Reconciler, MemoryStore) {
    let store = MemoryStore::new();
    let handler = CookieHandler::new(Arc::new(store.clone()));
    (Reconciler::new(handler), store)
}

async fn load(engine: &mut Reconciler, context: ActiveContext) {
    let request = engine.observe_context(context).unwrap();
    let result = engine.handler().list(&request.scope).await;
    engine.complete_reload(&request, result);
}

#[tokio::test]
async fn test_explicit_set_mutation_patches_jar_and_emits_add() {
    let (mut engine, _store) = engine();
    load(&mut engine, ctx(1, "https://a.example/")).await;
    let mut events = engine.subscribe();

    engine.observe_mutation(mutation("s", ".a.example", false, MutationCause::Explicit));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(
        CookieId::of(&snapshot[0]),
        CookieId::from_parts("s", ".a.example")
    );

    match events.recv().await.unwrap() {
        JarEvent::Changed(Some(delta)) => {
            assert_eq!(delta.kind, ChangeKind::Added);
            assert_eq!(delta.id, CookieId::from_parts("s", ".a.example"));
        }
        other => panic!("expected add delta, got {other:?}"),
    }
}

#[tokio::test]
async fn test_overwrite_mutation_is_inert() {
    let (mut engine, _store) = engine();
    load(&mut engine, ctx(1, "https://a.example/")).await;
    let mut events = engine.subscribe();

    engine.observe_mutation(mutation("s", ".a.example", false, MutationCause::Overwrite));

    assert!(engine.snapshot().is_empty());
    assert!(events.try_recv().is_err(), "no changed event may be emitted");
}

#[tokio::test]
async fn test_stale_list_result_never_populates_jar() {
    let (mut engine, store) = engine();

    // Cookies exist for both contexts.
    for (host, name) in [("a.example", "from_a"), ("b.example", "from_b")] {
        let scope = ctx(1, &format!("https://{host}/")).scope();
        let mut record = CookieRecord::name_value(name, "v");
        record.domain = host.to_string();
        store.write(&scope, record).await.unwrap();
    }

    // Reload for context 1 requested but not yet completed.
    let stale = engine.observe_context(ctx(1, "https://a.example/")).unwrap();
    // Context 2 activates while that list call is still pending.
    let fresh = engine.observe_context(ctx(2, "https://b.example/")).unwrap();

    let fresh_result = engine.handler().list(&fresh.scope).await;
    let stale_result = engine.handler().list(&stale.scope).await;

    // Completion order inverted on purpose: the stale result arrives last.
    engine.complete_reload(&fresh, fresh_result);
    engine.complete_reload(&stale, stale_result);

    let names: Vec<String> = engine.snapshot().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["from_b".to_string()]);
    assert_eq!(engine.state(), EngineState::Ready);
}

#[tokio::test]
async fn test_mutations_during_reload_are_deferred_then_replayed() {
    let (mut engine, _store) = engine();
    load(&mut engine, ctx(1, "https://a.example/")).await;

    let request = engine
        .observe_context(ctx(1, "https://a.example/spa-route"))
        .unwrap();
    assert_eq!(engine.state(), EngineState::Loading);

    engine.observe_mutation(mutation("s", ".a.example", false, MutationCause::Explicit));
    assert!(
        engine.snapshot().is_empty(),
        "delta must wait for the reload it is relative to"
    );

    engine.complete_reload(&request, Ok(Vec::new()));
    assert_eq!(engine.snapshot().len(), 1);
}

#[tokio::test]
async fn test_failed_reload_reports_no_access_and_keeps_jar() {
    let (mut engine, _store) = engine();
    load(&mut engine, ctx(1, "https://a.example/")).await;
    engine.observe_mutation(mutation("s", ".a.example", false, MutationCause::Explicit));

    let request = engine.observe_context(ctx(2, "https://b.example/")).unwrap();
    engine.complete_reload(&request, Err(CookieError::store_unavailable("denied")));

    assert_eq!(engine.access(), JarAccess::NoAccess);
    assert_eq!(engine.snapshot().len(), 1, "last-known-good content stands");
}

#[tokio::test]
async fn test_run_loop_end_to_end() {
    let store = MemoryStore::new();
    let handler = CookieHandler::new(Arc::new(store.clone()));
    let engine = Reconciler::new(handler.clone());
    let mut events = engine.subscribe();

    let (ctx_tx, ctx_rx) = mpsc::unbounded_channel();
    let (note_tx, note_rx) = mpsc::unbounded_channel();

    // Pump raw store notifications into the engine's mutation feed.
    let mut store_events = store.subscribe();
    tokio::spawn(async move {
        while let Ok(note) = store_events.recv().await {
            if note_tx.send(note).is_err() {
                break;
            }
        }
    });

    let driver = tokio::spawn(engine.run(ctx_rx, note_rx));

    ctx_tx.send(ctx(1, "https://a.example/")).unwrap();

    let ready = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
    assert_eq!(ready.unwrap(), JarEvent::Ready);
    let refresh = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
    assert_eq!(refresh.unwrap(), JarEvent::Changed(None));

    // A write through the handler flows back around as an add delta.
    let mut record = CookieRecord::name_value("live", "1");
    record.domain = "a.example".to_string();
    handler
        .save(record, &Url::parse("https://a.example/").unwrap(), "0")
        .await
        .unwrap();

    let delta = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
    match delta.unwrap() {
        JarEvent::Changed(Some(delta)) => {
            assert_eq!(delta.kind, ChangeKind::Added);
            assert_eq!(delta.record.name, "live");
        }
        other => panic!("expected add delta, got {other:?}"),
    }

    // Closing the feeds shuts the driver down.
    drop(ctx_tx);
    timeout(Duration::from_secs(5), driver).await.unwrap().unwrap();
}

/// Context source that answers the bootstrap query with a fixed context and
/// then streams whatever the test feeds it.
struct ScriptedSource {
    initial: ActiveContext,
    feed: std::sync::Mutex<Option<mpsc::UnboundedReceiver<ActiveContext>>>,
}

impl ContextSource for ScriptedSource {
    fn current(&self) -> ContextQuery {
        let initial = self.initial.clone();
        Box::pin(async move { Ok(initial) })
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ActiveContext> {
        self.feed
            .lock()
            .expect("subscribe called once")
            .take()
            .expect("subscribe called once")
    }
}

#[tokio::test]
async fn test_run_with_source_bootstraps_from_current() {
    let store = MemoryStore::new();
    let handler = CookieHandler::new(Arc::new(store.clone()));
    let engine = Reconciler::new(handler);
    let mut events = engine.subscribe();

    let (ctx_tx, ctx_rx) = mpsc::unbounded_channel();
    let source = Arc::new(ScriptedSource {
        initial: ctx(1, "https://a.example/"),
        feed: std::sync::Mutex::new(Some(ctx_rx)),
    });

    let (_note_tx, note_rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(engine.run_with_source(source, note_rx));

    // No context was ever pushed; the bootstrap query alone must get the
    // jar ready.
    let ready = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
    assert_eq!(ready.unwrap(), JarEvent::Ready);

    drop(ctx_tx);
    timeout(Duration::from_secs(5), driver).await.unwrap().unwrap();
}
