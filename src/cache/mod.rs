//! Content-addressed variant cache
//!
//! Artifacts live on the filesystem under the configured cache root,
//! named by [`CacheKey`]. There is no explicit invalidation: the key
//! encodes every invalidating factor (path, parameters, source mtime).

pub mod key;
pub mod store;

pub use key::CacheKey;
pub use store::CacheStore;
