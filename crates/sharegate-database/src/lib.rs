//! # sharegate-database
//!
//! The durable share record store. [`ShareStore`] is the contract the
//! sharing core relies on; [`MemoryShareStore`] serves single-process
//! deployments and tests, and [`PgShareStore`] persists to PostgreSQL.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::{DatabasePool, mask_password};
pub use memory::MemoryShareStore;
pub use repositories::share::PgShareStore;
pub use store::ShareStore;
