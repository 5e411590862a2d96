//! Networking for the todo client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` wraps the backend endpoints on top of the session pipeline, `types`
//! defines the wire schema, and `browser` (hydrate only) is the `fetch`
//! transport the pipeline dispatches through.

pub mod api;
#[cfg(feature = "hydrate")]
pub mod browser;
pub mod types;
