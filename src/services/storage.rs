// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload storage.
//!
//! Uploads are addressed by a slash-separated key. Keys written through the
//! API are always namespaced under the uploader's user id, so one user can
//! never overwrite another user's files.

use crate::error::AppError;
use async_trait::async_trait;
use std::path::PathBuf;

const MAX_KEY_LEN: usize = 512;

/// Pluggable blob store.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &StorageKey, bytes: &[u8]) -> Result<(), AppError>;

    /// Fetch the object under `key`, or `None` if absent.
    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, AppError>;
}

/// A validated storage key: one or more segments of `[A-Za-z0-9._-]`,
/// none of which is `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let invalid = |why: &str| AppError::BadRequest(format!("Invalid upload key: {why}"));

        if raw.is_empty() || raw.len() > MAX_KEY_LEN {
            return Err(invalid("length"));
        }

        for segment in raw.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(invalid("empty or relative segment"));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            {
                return Err(invalid("unsupported character"));
            }
        }

        Ok(Self(raw.to_string()))
    }

    /// Key `raw` placed under `owner_id`'s namespace.
    pub fn for_owner(owner_id: i64, raw: &str) -> Result<Self, AppError> {
        Self::parse(&format!("{owner_id}/{}", raw.trim_start_matches('/')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Best-effort content type from the file extension.
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .0
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "gpx" => "application/gpx+xml",
            _ => "application/octet-stream",
        }
    }
}

/// Stores uploads as files under a root directory.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        key.as_str()
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

#[async_trait]
impl StorageAdapter for DiskStorage {
    async fn put(&self, key: &StorageKey, bytes: &[u8]) -> Result<(), AppError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {}", path.display(), e)))?;

        tracing::debug!(key = key.as_str(), size = bytes.len(), "Stored upload");
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("read {}: {}", path.display(), e))),
        }
    }
}
