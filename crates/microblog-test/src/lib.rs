#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod mock;

pub use mock::{MemoryConnection, MemoryStore};

/// Tracing target for the in-memory store.
pub const TRACING_TARGET_MEMORY: &str = "microblog_test::memory";
