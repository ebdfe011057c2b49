//! # cookiescope
//!
//! A live cookie-jar synchronization library for Rust.
//!
//! `cookiescope` maintains a locally consistent view — the jar — of the
//! cookies belonging to whichever browsing context is currently being
//! inspected, and converts that view to and from the common interchange
//! text formats without silent data loss.
//!
//! ## Features
//!
//! - **Reconciliation**: generation-stamped reloads with stale-response
//!   suppression, incremental patching from store mutations
//! - **Context Tracking**: navigation vs. activation transition detection
//! - **Codecs**: JSON, `Cookie:` header-string and Netscape cookies.txt,
//!   with a fixed-order import fallback chain
//! - **Transports**: capability-direct and channel-relayed store access
//!   behind one trait, selected at construction
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookiescope::handler::CookieHandler;
//! use cookiescope::store::memory::MemoryStore;
//! use cookiescope::sync::context::ActiveContext;
//! use cookiescope::sync::engine::Reconciler;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = CookieHandler::new(Arc::new(MemoryStore::new()));
//!     let mut engine = Reconciler::new(handler);
//!     let mut events = engine.subscribe();
//!
//!     let context = ActiveContext::new(1, "https://example.com/".parse().unwrap(), "0");
//!     if let Some(request) = engine.observe_context(context) {
//!         let result = engine.handler().list(&request.scope).await;
//!         engine.complete_reload(&request, result);
//!     }
//!     println!("{} cookies", engine.snapshot().len());
//!     let _ = events;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error taxonomy shared by every layer
//! - [`cookies`] - Record model, identity derivation, jar cache, relevance
//! - [`codec`] - Interchange parse/format pairs and the fallback chain
//! - [`store`] - External store capability trait and its two transports
//! - [`sync`] - Context tracking, event bus, reconciliation engine
//! - [`handler`] - Operation façade consumers call
//!
//! ## Consistency
//!
//! All jar mutation happens on the reconciler's single logical thread of
//! execution between suspension points. A reload that completes after its
//! target context stopped being current is discarded, never merged; store
//! mutations that race a reload are queued and replayed against the fresh
//! jar.

pub mod base;
pub mod codec;
pub mod cookies;
pub mod handler;
pub mod store;
pub mod sync;
