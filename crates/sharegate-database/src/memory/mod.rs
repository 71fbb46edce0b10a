//! In-memory share store for single-process deployments and tests.

mod share;

pub use share::MemoryShareStore;
