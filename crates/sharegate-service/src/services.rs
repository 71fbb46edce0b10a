//! Service wiring from configuration.

use std::sync::Arc;

use tracing::info;

use sharegate_auth::{CapabilitySigner, CapabilityVerifier, ShareCodeGenerator};
use sharegate_cache::{MemoryRateLimitStore, RateLimitSweeper, RateLimiter};
use sharegate_core::config::AppConfig;
use sharegate_core::result::AppResult;
use sharegate_core::traits::activity::{ActivitySink, TracingActivitySink};
use sharegate_core::traits::clock::{Clock, SystemClock};
use sharegate_core::traits::random::{OsRandom, RandomSource};
use sharegate_core::traits::rate_limit::RateLimitStore;
use sharegate_core::traits::storage::FileServer;
use sharegate_database::ShareStore;

use crate::activity::ActivityLogger;
use crate::share::{LinkService, ResolutionService, ShareRegistry};

/// Process-level collaborators shared by every service.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Secure randomness for codes and nonces.
    pub random: Arc<dyn RandomSource>,
    /// Activity event sink.
    pub activity: Arc<dyn ActivitySink>,
    /// Rate-limit counter store.
    pub rate_limits: Arc<dyn RateLimitStore>,
}

impl Collaborators {
    /// Wall clock, OS randomness, tracing sink and in-memory counters.
    pub fn system() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            random: Arc::new(OsRandom),
            activity: Arc::new(TracingActivitySink),
            rate_limits: Arc::new(MemoryRateLimitStore::new()),
        }
    }
}

/// Every sharing service, wired together.
#[derive(Debug, Clone)]
pub struct Services {
    /// Share records.
    pub registry: Arc<ShareRegistry>,
    /// Link minting.
    pub links: LinkService,
    /// Credential resolution.
    pub resolution: ResolutionService,
    /// Upload rate limiting.
    pub limiter: RateLimiter,
    /// Compaction for the limiter's counters; spawn it to start sweeping.
    pub sweeper: RateLimitSweeper,
}

impl Services {
    /// Build the services from validated configuration.
    pub fn build(
        config: &AppConfig,
        store: Arc<dyn ShareStore>,
        files: Arc<dyn FileServer>,
        collaborators: Collaborators,
    ) -> AppResult<Self> {
        config.validate()?;

        let Collaborators {
            clock,
            random,
            activity,
            rate_limits,
        } = collaborators;
        let logger = ActivityLogger::new(Arc::clone(&activity));

        let registry = Arc::new(ShareRegistry::new(
            store,
            ShareCodeGenerator::new(Arc::clone(&random)),
            Arc::clone(&clock),
            logger.clone(),
            config.share.clone(),
        ));
        let links = LinkService::new(
            Arc::clone(&registry),
            CapabilitySigner::from_config(&config.auth, random)?,
            Arc::clone(&clock),
            &config.auth.public_base_url,
        )?;
        let resolution = ResolutionService::new(
            Arc::clone(&registry),
            CapabilityVerifier::from_config(&config.auth)?,
            files,
            Arc::clone(&clock),
            logger,
        );
        let limiter = RateLimiter::new(
            &config.rate_limit,
            Arc::clone(&rate_limits),
            Arc::clone(&clock),
            activity,
        )?;
        let sweeper = RateLimitSweeper::new(rate_limits, clock);

        info!(
            policies = config.rate_limit.policies.len(),
            public_base_url = %config.auth.public_base_url,
            "Sharing services initialized"
        );

        Ok(Self {
            registry,
            links,
            resolution,
            limiter,
            sweeper,
        })
    }
}
