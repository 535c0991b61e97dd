//! Session state for the mini app.
//!
//! The [`SessionStore`] is the single source of truth for the auth token and
//! the current user profile. It is an explicit, cloneable handle passed to
//! every component that needs it.

pub mod store;

pub use store::*;
