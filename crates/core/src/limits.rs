//! Reference limits
//!
//! Defaults for the tunables in `SearchConfig` and for the in-memory
//! store. Real deployments override them through `recdex.toml`; the store
//! limit must match whatever the backing document store enforces.

/// Minimum token length eligible for indexing, and minimum term length
/// that is pushed to the store as a membership predicate.
pub const DEFAULT_MIN_PREFIX_LEN: usize = 3;

/// Maximum operations in one atomic multi-record write
pub const MAX_BATCH_WRITES: usize = 500;

/// Page size used when a request does not name one
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Largest page a single request may ask for
pub const MAX_PAGE_SIZE: usize = 500;

/// Seconds a cached first page stays valid
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
