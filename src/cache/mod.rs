//! Tiered result cache for Forge CORE.
//!
//! A primary shared store (optional, may be unavailable) backed by an
//! in-process fallback. The cache is an optimization only: every failure
//! degrades to a miss.

mod error;
mod key;
mod layer;
mod local;

pub use error::CacheError;
pub use key::generation_key;
pub use layer::{CacheLayer, CacheStore};
pub use local::{LocalCache, LocalCacheConfig};
