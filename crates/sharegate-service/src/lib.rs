//! # sharegate-service
//!
//! Sharing use cases for Sharegate. Services orchestrate the share store,
//! the capability codec, the file-storage collaborator and the activity
//! sink.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod activity;
pub mod context;
pub mod services;
pub mod share;

pub use activity::ActivityLogger;
pub use context::{ClientContext, RequestContext};
pub use services::{Collaborators, Services};
pub use share::{
    Credential, LinkService, ResolutionService, ShareRegistry,
    link::{CapabilityLink, CapabilityLinkRequest},
    registry::CreateShareRequest,
    resolution::{Authorization, Delivery, Resolution, ResolveOutcome},
};
