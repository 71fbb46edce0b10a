//! # sharegate-cache
//!
//! Process-local abuse control for Sharegate. Counters live in memory and
//! are lost on restart, which fails open to "not yet limited".
//!
//! - **memory**: fixed-window counter store on a sharded concurrent map
//! - **limiter**: the named policy registry and the check/enforce calls
//! - **identity**: client identity derivation (user, address, unknown)
//! - **headers**: `X-RateLimit-*` response headers
//! - **sweeper**: background compaction of expired windows

pub mod headers;
pub mod identity;
pub mod keys;
pub mod limiter;
pub mod memory;
pub mod sweeper;

pub use identity::ClientIdentity;
pub use limiter::RateLimiter;
pub use memory::MemoryRateLimitStore;
pub use sweeper::RateLimitSweeper;
