//! Share code generation.

use std::sync::Arc;

use sharegate_core::traits::random::RandomSource;
use sharegate_entity::share::ShareCode;
use sharegate_entity::share::code::SHARE_CODE_BYTES;

/// Generates share codes from secure randomness.
///
/// Uniqueness is not checked here; the store's unique index rejects
/// collisions and the caller retries.
#[derive(Debug, Clone)]
pub struct ShareCodeGenerator {
    random: Arc<dyn RandomSource>,
}

impl ShareCodeGenerator {
    /// Creates a generator over `random`.
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// A fresh 16-character uppercase hex code.
    pub fn generate(&self) -> ShareCode {
        let mut bytes = [0u8; SHARE_CODE_BYTES];
        self.random.fill_bytes(&mut bytes);
        ShareCode::from_bytes(bytes)
    }
}
