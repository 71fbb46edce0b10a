//! Share code allocation and collision handling.

mod helpers;

use sharegate_core::error::ErrorKind;
use sharegate_entity::share::SharePermission;
use sharegate_service::CreateShareRequest;

use helpers::{SECRET_ONE, TestApp, test_config};

const CHUNK: [u8; 8] = [0xAB; 8];

fn request(app: &TestApp) -> CreateShareRequest {
    CreateShareRequest {
        file_id: app.file_id,
        permissions: SharePermission::View,
        expires_in_hours: 1,
        max_downloads: None,
    }
}

#[tokio::test]
async fn test_collision_is_retried_with_a_fresh_code() {
    let app = TestApp::new();
    app.random.push(&CHUNK, 2);

    let first = app
        .services
        .registry
        .create_share(&app.owner, request(&app))
        .await
        .unwrap();
    assert_eq!(first.share_code.as_str(), "ABABABABABABABAB");

    let second = app
        .services
        .registry
        .create_share(&app.owner, request(&app))
        .await
        .unwrap();
    assert_ne!(second.share_code, first.share_code);
    assert_eq!(
        app.services
            .registry
            .get_by_code(&second.share_code)
            .await
            .unwrap()
            .id,
        second.id
    );
}

#[tokio::test]
async fn test_exhausted_attempts_surface_conflict() {
    let mut config = test_config(SECRET_ONE);
    config.share.code_generation_attempts = 3;
    let app = TestApp::with_config(config);
    app.random.push(&CHUNK, 1 + 3);

    app.services
        .registry
        .create_share(&app.owner, request(&app))
        .await
        .unwrap();
    let err = app
        .services
        .registry
        .create_share(&app.owner, request(&app))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let shares = app
        .services
        .registry
        .get_active_shares(app.file_id)
        .await
        .unwrap();
    assert_eq!(shares.len(), 1);
}

#[tokio::test]
async fn test_generated_codes_are_well_formed_and_distinct() {
    let app = TestApp::new();
    let mut codes = std::collections::HashSet::new();
    for _ in 0..50 {
        let share = app
            .services
            .registry
            .create_share(&app.owner, request(&app))
            .await
            .unwrap();
        assert!(
            share
                .share_code
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
        assert!(codes.insert(share.share_code));
    }
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected_at_build() {
    let config = test_config("too-short");
    let result = sharegate_service::Services::build(
        &config,
        std::sync::Arc::new(sharegate_database::MemoryShareStore::new()),
        std::sync::Arc::new(helpers::MemoryFiles::default()),
        sharegate_service::Collaborators::system(),
    );
    assert_eq!(result.unwrap_err().kind, ErrorKind::Configuration);
}
