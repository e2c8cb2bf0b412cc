//! Cache test fixtures
//!
//! A durable cache in a temporary directory, removed when the fixture drops.

use cms_client::client::LocalCache;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test cache fixture
pub struct TestCache {
    dir: TempDir,
}

impl TestCache {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Path of the cache database inside the fixture directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("nested").join("cache.db")
    }

    /// Open (or reopen) the cache file
    pub async fn open(&self) -> LocalCache {
        LocalCache::open(self.path())
            .await
            .expect("Failed to open test cache")
    }
}

impl Default for TestCache {
    fn default() -> Self {
        Self::new()
    }
}
