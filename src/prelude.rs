//! Schedule Mini App prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use schedule_miniapp::prelude::*;
//! ```

pub use crate::api::{HomeworkQuery, HomeworkStatus, SearchTarget, WeekFilter};
pub use crate::app::{MiniApp, View};
pub use crate::bootstrap::{
    Bootstrap, BootstrapState, ColorScheme, LaunchContext, LaunchParams, ThemeSink,
};
pub use crate::config::ClientConfig;
pub use crate::errors::{ClientError, Result};
pub use crate::gate::Screen;
pub use crate::http::{ApiClient, ApiRequest, Middleware};
pub use crate::models::{Page, User};
pub use crate::query::{QueryCache, QueryKey};
pub use crate::screens::{Feedback, ScreenState, SearchKind};
pub use crate::session::SessionStore;
pub use crate::storage::{FilePersistence, MemoryPersistence, SessionPersistence};
