//! # sharegate-core
//!
//! Core crate for Sharegate. Contains the collaborator traits (clock,
//! randomness, activity sink, file server, rate-limit store), configuration
//! schemas, typed identifiers, domain events, pagination types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Sharegate crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
