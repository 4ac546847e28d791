//! Filesystem-backed response cache

use super::{is_fresh, CacheError, CacheKey, CacheKind, CacheResult, ResponseCache};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Response cache storing one file per key below a root directory
///
/// Layout:
///
/// | Key kind | Path |
/// |----------|------|
/// | Index | `<root>/archiv-text.html` |
/// | Issue | `<root>/archiv_text/<YYYY-MM-DD>` |
/// | Article | `<root>/archiv_text_articles/<id>` |
///
/// An entry's age is the age of its file's modification time.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Creates a cache rooted at `root`; directories are created on first store
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        match key.kind {
            CacheKind::Index => self.root.join("archiv-text.html"),
            CacheKind::Issue => self.root.join("archiv_text").join(&key.id),
            CacheKind::Article => self.root.join("archiv_text_articles").join(&key.id),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl ResponseCache for DiskCache {
    fn lookup(&self, key: &CacheKey, ttl: Option<Duration>) -> CacheResult<Option<String>> {
        let path = self.path_for(key);

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        if ttl.is_some() {
            let modified = metadata.modified().map_err(|e| io_error(&path, e))?;
            // A modification time in the future counts as brand new
            let age = SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO);
            if !is_fresh(age, ttl) {
                tracing::debug!("Cache entry {} expired ({:?} old)", path.display(), age);
                return Ok(None);
            }
        }

        let body = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        Ok(Some(body))
    }

    fn store(&mut self, key: &CacheKey, body: &str) -> CacheResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        fs::write(&path, body).map_err(|e| io_error(&path, e))
    }
}
