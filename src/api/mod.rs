//! Typed backend endpoints
//!
//! Thin wrappers over [`crate::http::ApiClient`]: each builds an
//! [`crate::http::ApiRequest`] for one route of the backend and decodes its
//! response. Paths are relative to the configured API prefix.

pub mod admin;
pub mod auth;
pub mod dicts;
pub mod homework;
pub mod profile;
pub mod schedule;

pub use homework::{HomeworkQuery, HomeworkStatus, WeekFilter};
pub use schedule::SearchTarget;
