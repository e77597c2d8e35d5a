//! Testing utilities for store failure handling
//!
//! - **FaultyStore**: wraps any [`DocumentStore`](crate::DocumentStore) and
//!   injects `StoreUnavailable` failures on chosen calls
//!
//! # Example
//!
//! ```ignore
//! use recdex_storage::testing::FaultyStore;
//! use recdex_storage::MemoryStore;
//!
//! let store = FaultyStore::new(MemoryStore::new());
//! store.fail_batch(2); // second batch_write call fails
//! ```

mod faulty;

pub use faulty::FaultyStore;
