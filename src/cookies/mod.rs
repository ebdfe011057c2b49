//! Cookie data model and jar cache.
//!
//! This module provides the passive data layer under the reconciliation
//! engine:
//!
//! - **Record**: the cookie representation shared by the store capability,
//!   the jar and the codecs ([`CookieRecord`](record::CookieRecord))
//! - **Identity**: restart-stable cache key derived from `(name, domain)`
//!   ([`CookieId`](identity::CookieId))
//! - **Jar**: the in-memory cache of cookies believed to apply to the
//!   active context ([`Jar`](jar::Jar))
//! - **Relevance**: the documented domain-matching predicate used to filter
//!   store mutations ([`domain_matches`](relevance::domain_matches))
//!
//! Nothing here performs IO or emits events; ownership and mutation
//! discipline live in [`crate::sync`].

pub mod identity;
pub mod jar;
pub mod record;
pub mod relevance;
