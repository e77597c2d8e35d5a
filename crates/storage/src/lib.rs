//! Storage layer for recdex
//!
//! This crate defines the document store capability surface and ships:
//! - DocumentStore: trait every backend implements
//! - WriteOp: single-record mutation, applied alone or in atomic batches
//! - MemoryStore: BTreeMap-based reference backend with RwLock
//! - testing::FaultyStore: failure injection for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod testing;
pub mod traits;

pub use memory::{MemoryStore, StoreStats};
pub use traits::{validate_query, DocumentStore, WriteOp};
