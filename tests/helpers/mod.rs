//! Shared test helpers for integration tests.
//!
//! Builds the full service graph through `Services::build` with in-memory
//! stores, a manual clock and recording fakes for the outer collaborators.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use sharegate_cache::MemoryRateLimitStore;
use sharegate_core::config::AppConfig;
use sharegate_core::error::AppError;
use sharegate_core::events::DomainEvent;
use sharegate_core::result::AppResult;
use sharegate_core::traits::activity::ActivitySink;
use sharegate_core::traits::clock::ManualClock;
use sharegate_core::traits::random::{OsRandom, RandomSource};
use sharegate_core::traits::storage::{FileMetadata, FileServer};
use sharegate_core::types::id::{FileId, UserId};
use sharegate_core::config::DatabaseConfig;
use sharegate_database::{DatabasePool, MemoryShareStore, PgShareStore, ShareStore, migration};
use sharegate_entity::share::{Share, SharePermission};
use sharegate_service::{
    ClientContext, Collaborators, CreateShareRequest, RequestContext, Services,
};

/// Primary signing secret used by most tests.
pub const SECRET_ONE: &str = "integration-secret-one-0123456789abcdef";
/// A second, unrelated signing secret.
pub const SECRET_TWO: &str = "integration-secret-two-fedcba9876543210";

/// File contents served for every registered file.
pub const CONTENT: &[u8] = b"quarterly numbers, final draft";

/// Configuration with a valid secret and default bounds.
pub fn test_config(secret: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.share_signing_secret = secret.to_string();
    config.auth.public_base_url = "https://files.example.com".to_string();
    config
}

/// In-memory file server.
#[derive(Debug, Default)]
pub struct MemoryFiles(Mutex<HashMap<FileId, (String, Bytes)>>);

impl MemoryFiles {
    /// Register a file and return its id.
    pub fn add(&self, name: &str, content: &'static [u8]) -> FileId {
        let file_id = FileId::new();
        self.0
            .lock()
            .unwrap()
            .insert(file_id, (name.to_string(), Bytes::from_static(content)));
        file_id
    }
}

#[async_trait]
impl FileServer for MemoryFiles {
    async fn metadata(&self, file_id: FileId) -> AppResult<FileMetadata> {
        let files = self.0.lock().unwrap();
        let (name, content) = files
            .get(&file_id)
            .ok_or_else(|| AppError::not_found("File not found"))?;
        Ok(FileMetadata {
            file_id,
            name: name.clone(),
            mime_type: None,
            size_bytes: content.len() as u64,
        })
    }

    async fn read(&self, file_id: FileId) -> AppResult<Bytes> {
        self.0
            .lock()
            .unwrap()
            .get(&file_id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| AppError::not_found("File not found"))
    }
}

/// Activity sink that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingSink(Mutex<Vec<DomainEvent>>);

impl RecordingSink {
    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Wait until at least `count` events arrived, or give up after a second.
    pub async fn wait_for(&self, count: usize) -> Vec<DomainEvent> {
        let _ = tokio::time::timeout(Duration::from_secs(1), async {
            while self.0.lock().unwrap().len() < count {
                tokio::task::yield_now().await;
            }
        })
        .await;
        self.events()
    }

    /// Names of the recorded events, in arrival order.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().iter().map(DomainEvent::name).collect()
    }
}

#[async_trait]
impl ActivitySink for RecordingSink {
    async fn record(&self, event: DomainEvent) -> AppResult<()> {
        self.0.lock().unwrap().push(event);
        Ok(())
    }
}

/// Randomness that replays scripted chunks before falling back to the OS.
///
/// A chunk is only consumed by a request of exactly its length, so scripted
/// share codes never leak into token nonces.
#[derive(Debug, Default)]
pub struct ScriptedRandom(Mutex<VecDeque<Vec<u8>>>);

impl ScriptedRandom {
    /// Queue `chunk` to be returned `times` times.
    pub fn push(&self, chunk: &[u8], times: usize) {
        let mut queue = self.0.lock().unwrap();
        for _ in 0..times {
            queue.push_back(chunk.to_vec());
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        let mut queue = self.0.lock().unwrap();
        match queue.front() {
            Some(chunk) if chunk.len() == dest.len() => {
                dest.copy_from_slice(chunk);
                queue.pop_front();
            }
            _ => OsRandom.fill_bytes(dest),
        }
    }
}

/// Test application context
pub struct TestApp {
    /// Wired services
    pub services: Services,
    /// Shared manual clock
    pub clock: Arc<ManualClock>,
    /// Recorded activity
    pub events: Arc<RecordingSink>,
    /// Served files
    pub files: Arc<MemoryFiles>,
    /// Scripted randomness
    pub random: Arc<ScriptedRandom>,
    /// Rate-limit counters
    pub rate_limits: Arc<MemoryRateLimitStore>,
    /// A file registered at startup
    pub file_id: FileId,
    /// The owner of `file_id`
    pub owner: RequestContext,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config(SECRET_ONE))
    }

    /// Create a test application from explicit configuration
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryShareStore::new()))
    }

    /// Create a test application over an explicit share store
    pub fn with_store(config: AppConfig, store: Arc<dyn ShareStore>) -> Self {
        let clock = Arc::new(ManualClock::default());
        let events = Arc::new(RecordingSink::default());
        let files = Arc::new(MemoryFiles::default());
        let random = Arc::new(ScriptedRandom::default());
        let rate_limits = Arc::new(MemoryRateLimitStore::new());
        let file_id = files.add("report.txt", CONTENT);

        let services = Services::build(
            &config,
            store,
            files.clone(),
            Collaborators {
                clock: clock.clone(),
                random: random.clone(),
                activity: events.clone(),
                rate_limits: rate_limits.clone(),
            },
        )
        .expect("test configuration must build");

        Self {
            services,
            clock,
            events,
            files,
            random,
            rate_limits,
            file_id,
            owner: RequestContext::new(UserId::new()),
        }
    }

    /// Mint a share of `file_id` owned by `owner`
    pub async fn share(&self, permissions: SharePermission, max_downloads: Option<u32>) -> Share {
        self.services
            .registry
            .create_share(
                &self.owner,
                CreateShareRequest {
                    file_id: self.file_id,
                    permissions,
                    expires_in_hours: 24,
                    max_downloads,
                },
            )
            .await
            .expect("share creation must succeed")
    }
}

/// Environment variable naming the PostgreSQL database used by store tests.
pub const TEST_DATABASE_URL_VAR: &str = "SHAREGATE_TEST_DATABASE_URL";

/// Connect to the test database and apply migrations.
///
/// Returns `None` when no test database is configured, so callers can skip.
/// Tests keep to their own freshly generated file and owner ids instead of
/// cleaning tables.
pub async fn pg_store() -> Option<Arc<PgShareStore>> {
    let url = std::env::var(TEST_DATABASE_URL_VAR).ok()?;
    let config = DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    };
    let pool = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    migration::run_migrations(pool.pool())
        .await
        .expect("Failed to run migrations");
    Some(Arc::new(PgShareStore::new(pool.into_pool())))
}

/// An anonymous visitor at a fixed address.
pub fn visitor() -> ClientContext {
    ClientContext::anonymous(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)))
}
