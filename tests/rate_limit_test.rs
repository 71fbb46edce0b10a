//! Upload rate limiting through the wired services.

mod helpers;

use std::net::{IpAddr, Ipv4Addr};

use chrono::TimeDelta;

use sharegate_cache::ClientIdentity;
use sharegate_cache::headers::rate_limit_headers;
use sharegate_core::config::rate_limit::{UPLOAD_BURST_POLICY, UPLOAD_POLICY};
use sharegate_core::error::ErrorKind;
use sharegate_core::events::{EventPayload, RateLimitEvent};
use sharegate_core::traits::clock::Clock;
use sharegate_core::traits::rate_limit::RateLimitStore;
use sharegate_core::types::id::UserId;

use helpers::{TestApp, visitor};

#[tokio::test]
async fn test_burst_policy_denies_eleventh_upload() {
    let app = TestApp::new();
    let identity = visitor().identity();
    assert_eq!(identity.to_string(), "ip:203.0.113.7");

    for expected_remaining in (0..10).rev() {
        let decision = app
            .services
            .limiter
            .enforce(&identity, UPLOAD_BURST_POLICY)
            .await
            .unwrap();
        assert_eq!(decision.remaining, expected_remaining);
        assert_eq!(decision.total, 10);
    }

    let err = app
        .services
        .limiter
        .enforce(&identity, UPLOAD_BURST_POLICY)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);

    let events = app.events.wait_for(1).await;
    match &events[0].payload {
        EventPayload::RateLimit(RateLimitEvent::Exceeded {
            policy, identity, ..
        }) => {
            assert_eq!(policy, UPLOAD_BURST_POLICY);
            assert_eq!(identity, "ip:203.0.113.7");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_window_resets_after_it_passes() {
    let app = TestApp::new();
    let identity = ClientIdentity::User(UserId::new());

    for _ in 0..10 {
        app.services
            .limiter
            .enforce(&identity, UPLOAD_BURST_POLICY)
            .await
            .unwrap();
    }
    let denied = app
        .services
        .limiter
        .check(&identity, UPLOAD_BURST_POLICY)
        .await
        .unwrap();
    assert!(!denied.allowed);

    app.clock.advance(TimeDelta::seconds(60));
    let fresh = app
        .services
        .limiter
        .check(&identity, UPLOAD_BURST_POLICY)
        .await
        .unwrap();
    assert!(fresh.allowed);
    assert_eq!(fresh.remaining, 9);
}

#[tokio::test]
async fn test_identities_and_policies_are_independent() {
    let app = TestApp::new();
    let first = visitor().identity();
    let second = ClientIdentity::Address(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1)));

    for _ in 0..10 {
        app.services
            .limiter
            .enforce(&first, UPLOAD_BURST_POLICY)
            .await
            .unwrap();
    }

    assert!(
        app.services
            .limiter
            .enforce(&second, UPLOAD_BURST_POLICY)
            .await
            .is_ok()
    );
    let upload = app
        .services
        .limiter
        .enforce(&first, UPLOAD_POLICY)
        .await
        .unwrap();
    assert_eq!(upload.remaining, 99);
}

#[tokio::test]
async fn test_unknown_policy_is_a_configuration_error() {
    let app = TestApp::new();
    let err = app
        .services
        .limiter
        .check(&ClientIdentity::Unknown, "downloads")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_denied_decision_headers_carry_retry_after() {
    let app = TestApp::new();
    let identity = ClientIdentity::Unknown;
    for _ in 0..10 {
        app.services
            .limiter
            .check(&identity, UPLOAD_BURST_POLICY)
            .await
            .unwrap();
    }
    app.clock.advance(TimeDelta::seconds(15));
    let decision = app
        .services
        .limiter
        .check(&identity, UPLOAD_BURST_POLICY)
        .await
        .unwrap();

    let headers = rate_limit_headers(&decision, app.clock.now());
    assert_eq!(headers["x-ratelimit-limit"], "10");
    assert_eq!(headers["x-ratelimit-remaining"], "0");
    assert_eq!(headers["retry-after"], "45");
}

#[tokio::test]
async fn test_sweeper_compacts_expired_windows() {
    let app = TestApp::new();
    app.services
        .limiter
        .check(&visitor().identity(), UPLOAD_BURST_POLICY)
        .await
        .unwrap();
    app.services
        .limiter
        .check(&visitor().identity(), UPLOAD_POLICY)
        .await
        .unwrap();
    assert_eq!(app.rate_limits.len().await.unwrap(), 2);

    app.clock.advance(TimeDelta::minutes(2));
    assert_eq!(app.services.sweeper.sweep().await, 1);
    assert_eq!(app.rate_limits.len().await.unwrap(), 1);
}
