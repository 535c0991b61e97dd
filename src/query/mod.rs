//! Client-side query plumbing: response cache, incremental pagination and
//! input debouncing.

pub mod cache;
pub mod debounce;
pub mod pagination;

pub use cache::{QueryCache, QueryKey};
pub use debounce::{DebounceInput, Debounced};
pub use pagination::InfiniteQuery;
