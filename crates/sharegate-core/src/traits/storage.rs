//! File-storage collaborator used to serve shared files.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::FileId;

/// Metadata about a stored file, returned for `view` access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// The file ID.
    pub file_id: FileId,
    /// Original file name.
    pub name: String,
    /// MIME type (if known).
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Serves stored files by ID.
///
/// Implementations live with the storage layer; this core only asks for
/// metadata (view) or content (download) after authorization succeeded.
#[async_trait]
pub trait FileServer: Send + Sync + std::fmt::Debug + 'static {
    /// Look up a file's metadata.
    async fn metadata(&self, file_id: FileId) -> AppResult<FileMetadata>;

    /// Read a file's full content.
    async fn read(&self, file_id: FileId) -> AppResult<Bytes>;
}
