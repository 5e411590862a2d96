//! Client-side application state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `router` gates views on the session store and `todos` holds the list
//! view's data. Both react to session transitions on their own, so a refresh
//! failure deep in the pipeline reaches the UI without any caller wiring.

pub mod router;
pub mod todos;
