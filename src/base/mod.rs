//! Base types and error handling.
//!
//! Provides the foundational error taxonomy shared by every layer:
//! - [`CookieError`](error::CookieError): store, façade and codec failures

pub mod error;
