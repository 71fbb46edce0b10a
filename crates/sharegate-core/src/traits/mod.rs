//! Collaborator traits defined in `sharegate-core` and implemented by
//! other crates or by the embedding application.

pub mod activity;
pub mod clock;
pub mod random;
pub mod rate_limit;
pub mod storage;

pub use activity::{ActivitySink, TracingActivitySink};
pub use clock::{Clock, ManualClock, SystemClock};
pub use random::{OsRandom, RandomSource};
pub use rate_limit::RateLimitStore;
pub use storage::{FileMetadata, FileServer};
