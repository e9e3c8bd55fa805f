//! In-memory storage backend.

mod memory_store;
mod repositories;
mod violation;

pub use memory_store::{MemoryConnection, MemoryStore};
