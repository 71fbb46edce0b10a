//! Named-policy rate limiter.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use sharegate_core::config::RateLimitConfig;
use sharegate_core::error::AppError;
use sharegate_core::events::{DomainEvent, RateLimitEvent};
use sharegate_core::result::AppResult;
use sharegate_core::traits::activity::ActivitySink;
use sharegate_core::traits::clock::Clock;
use sharegate_core::traits::rate_limit::RateLimitStore;
use sharegate_core::types::rate_limit::{RateLimitDecision, RateLimitPolicy};

use crate::identity::ClientIdentity;
use crate::keys;

/// Fixed-window rate limiter over a static set of named policies.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    policies: Arc<HashMap<String, RateLimitPolicy>>,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    activity: Arc<dyn ActivitySink>,
}

impl RateLimiter {
    /// Build a limiter from configuration.
    ///
    /// Rejects an empty policy set and policies with a zero window or limit.
    pub fn new(
        config: &RateLimitConfig,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
        activity: Arc<dyn ActivitySink>,
    ) -> AppResult<Self> {
        if config.policies.is_empty() {
            return Err(AppError::configuration(
                "At least one rate limit policy is required",
            ));
        }

        let mut policies = HashMap::with_capacity(config.policies.len());
        for (name, entry) in &config.policies {
            if entry.window_ms == 0 || entry.max_requests == 0 {
                return Err(AppError::configuration(format!(
                    "Rate limit policy '{name}' needs a positive window and limit"
                )));
            }
            policies.insert(name.clone(), RateLimitPolicy::from_config(name, entry));
        }

        Ok(Self {
            policies: Arc::new(policies),
            store,
            clock,
            activity,
        })
    }

    /// Look up a configured policy.
    pub fn policy(&self, name: &str) -> AppResult<&RateLimitPolicy> {
        self.policies
            .get(name)
            .ok_or_else(|| AppError::configuration(format!("Unknown rate limit policy '{name}'")))
    }

    /// Names of every configured policy.
    pub fn policy_names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Count one request from `identity` against `policy`.
    pub async fn check(
        &self,
        identity: &ClientIdentity,
        policy: &str,
    ) -> AppResult<RateLimitDecision> {
        let policy = self.policy(policy)?;
        let key = keys::rate_limit(&policy.name, identity);
        let decision = self.store.hit(&key, policy, self.clock.now()).await?;

        debug!(
            key = %key,
            allowed = decision.allowed,
            remaining = decision.remaining,
            "Rate limit checked"
        );

        Ok(decision)
    }

    /// Like [`check`](Self::check), but a denial becomes a `RateLimited`
    /// error and is reported to the activity sink.
    pub async fn enforce(
        &self,
        identity: &ClientIdentity,
        policy: &str,
    ) -> AppResult<RateLimitDecision> {
        let decision = self.check(identity, policy).await?;
        if decision.allowed {
            return Ok(decision);
        }

        let now = self.clock.now();
        let retry_after = decision.retry_after_seconds(now);
        warn!(
            policy,
            identity = %identity,
            retry_after,
            "Rate limit exceeded"
        );

        let event = DomainEvent::new(
            match identity {
                ClientIdentity::User(id) => Some(*id),
                _ => None,
            },
            RateLimitEvent::Exceeded {
                policy: policy.to_string(),
                identity: identity.to_string(),
                reset_at: decision.reset_at,
            }
            .into(),
            now,
        );
        let sink = Arc::clone(&self.activity);
        tokio::spawn(async move {
            if let Err(e) = sink.record(event).await {
                warn!(error = %e, "Failed to record rate limit event");
            }
        });

        Err(AppError::rate_limited(format!(
            "Too many requests, retry in {retry_after} seconds"
        )))
    }

    /// The underlying counter store.
    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeDelta, Utc};

    use sharegate_core::config::PolicyConfig;
    use sharegate_core::error::ErrorKind;
    use sharegate_core::events::EventPayload;
    use sharegate_core::traits::clock::ManualClock;
    use sharegate_core::types::id::UserId;

    use crate::memory::MemoryRateLimitStore;

    #[derive(Debug, Default)]
    struct RecordingSink(Mutex<Vec<DomainEvent>>);

    #[async_trait]
    impl ActivitySink for RecordingSink {
        async fn record(&self, event: DomainEvent) -> AppResult<()> {
            self.0.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn config(window_ms: u64, max_requests: u32) -> RateLimitConfig {
        let mut policies = BTreeMap::new();
        policies.insert(
            "upload".to_string(),
            PolicyConfig {
                window_ms,
                max_requests,
            },
        );
        policies.insert(
            "upload_burst".to_string(),
            PolicyConfig {
                window_ms: 60_000,
                max_requests: 1,
            },
        );
        RateLimitConfig {
            sweep_interval_seconds: 60,
            policies,
        }
    }

    fn limiter(
        window_ms: u64,
        max_requests: u32,
    ) -> (RateLimiter, Arc<ManualClock>, Arc<RecordingSink>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let sink = Arc::new(RecordingSink::default());
        let limiter = RateLimiter::new(
            &config(window_ms, max_requests),
            Arc::new(MemoryRateLimitStore::new()),
            clock.clone(),
            sink.clone(),
        )
        .unwrap();
        (limiter, clock, sink)
    }

    #[tokio::test]
    async fn test_window_resets_after_elapsed() {
        let (limiter, clock, _) = limiter(1000, 3);
        let who = ClientIdentity::User(UserId::new());

        for expected in [2, 1, 0] {
            let d = limiter.check(&who, "upload").await.unwrap();
            assert!(d.allowed);
            assert_eq!(d.remaining, expected);
        }
        assert!(!limiter.check(&who, "upload").await.unwrap().allowed);

        clock.advance(TimeDelta::milliseconds(1000));
        let d = limiter.check(&who, "upload").await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, 2);
    }

    #[tokio::test]
    async fn test_policies_count_separately() {
        let (limiter, _, _) = limiter(1000, 3);
        let who = ClientIdentity::Unknown;

        assert!(limiter.check(&who, "upload_burst").await.unwrap().allowed);
        assert!(!limiter.check(&who, "upload_burst").await.unwrap().allowed);
        assert!(limiter.check(&who, "upload").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_unknown_policy_is_configuration_error() {
        let (limiter, _, _) = limiter(1000, 3);
        let err = limiter
            .check(&ClientIdentity::Unknown, "login")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_enforce_reports_denial() {
        let (limiter, _, sink) = limiter(1000, 1);
        let who: ClientIdentity = ClientIdentity::Address("192.0.2.10".parse().unwrap());

        limiter.enforce(&who, "upload").await.unwrap();
        let err = limiter.enforce(&who, "upload").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);

        // The sink runs on a spawned task.
        for _ in 0..50 {
            if !sink.0.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0].payload {
            EventPayload::RateLimit(RateLimitEvent::Exceeded {
                policy, identity, ..
            }) => {
                assert_eq!(policy, "upload");
                assert_eq!(identity, "ip:192.0.2.10");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_rejects_zero_limit() {
        let err = RateLimiter::new(
            &config(1000, 0),
            Arc::new(MemoryRateLimitStore::new()),
            Arc::new(ManualClock::default()),
            Arc::new(RecordingSink::default()),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_empty_policy_set() {
        let config = RateLimitConfig {
            sweep_interval_seconds: 60,
            policies: BTreeMap::new(),
        };
        let err = RateLimiter::new(
            &config,
            Arc::new(MemoryRateLimitStore::new()),
            Arc::new(ManualClock::default()),
            Arc::new(RecordingSink::default()),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
