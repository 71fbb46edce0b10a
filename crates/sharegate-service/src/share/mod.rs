//! Share management: minting, credential resolution and usage recording.

pub mod credential;
pub mod link;
pub mod registry;
pub mod resolution;

pub use credential::Credential;
pub use link::LinkService;
pub use registry::ShareRegistry;
pub use resolution::ResolutionService;
