//! Result cache
//!
//! Translation results are addressed by a digest of the raw source content
//! and the requested target languages, so unchanged content is never sent to
//! the provider twice.

/// Cache key derivation
mod key;
/// Cache storage backends
mod store;

pub use key::{
    CacheKey,
    derive_key,
    storage_file_name,
};
pub use store::{
    CacheError,
    FileCache,
    MemoryCache,
    ResultCache,
};
