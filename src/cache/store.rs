//! Versioned on-disk snapshots, one JSON file per (year, language)

use crate::error::{VolbyError, VolbyResult};
use crate::model::Dataset;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Schema version of the snapshot envelope; other versions read as absent
pub const CACHE_VERSION: u32 = 1;

/// A snapshot as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub version: u32,
    pub etag: Option<String>,
    /// Unix seconds of the last successful fetch or revalidation
    pub checked_at: f64,
    pub data: Dataset,
}

/// Envelope read before the dataset itself, so an old schema is rejected
/// by its version rather than by a decoding error
#[derive(Deserialize)]
struct RawEntry {
    version: u32,
    #[serde(default)]
    etag: Option<String>,
    #[serde(default)]
    checked_at: f64,
    data: Value,
}

/// One file found in the cache directory
#[derive(Debug, Clone)]
pub struct CachedFile {
    pub path: PathBuf,
    pub size: u64,
    /// `None` when the file is unreadable or from another schema version
    pub entry: Option<CacheEntry>,
}

/// Disk cache rooted at one directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot path for a (year, language) pair
    pub fn path(&self, year: i32, lang: &str) -> PathBuf {
        self.dir
            .join(format!("ps{}_{}.json", year, lang.to_lowercase()))
    }

    /// Load the snapshot for (year, lang).
    ///
    /// Missing, malformed and wrong-version files all read as `None`.
    pub fn load(&self, year: i32, lang: &str) -> Option<CacheEntry> {
        read_entry(&self.path(year, lang))
    }

    /// Write a snapshot, replacing any previous one.
    ///
    /// The read-time cache annotation is stripped before writing. The file is
    /// written to a temporary sibling and renamed into place.
    pub fn store(
        &self,
        year: i32,
        lang: &str,
        dataset: &Dataset,
        etag: Option<&str>,
        checked_at: f64,
    ) -> VolbyResult<PathBuf> {
        let path = self.path(year, lang);
        let entry = CacheEntry {
            version: CACHE_VERSION,
            etag: etag.map(str::to_string),
            checked_at,
            data: dataset.without_cache_info(),
        };
        let bytes = serde_json::to_vec(&entry)?;
        write_atomic(&path, &bytes)?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Every snapshot file in the cache directory, sorted by name
    pub fn list(&self) -> VolbyResult<Vec<CachedFile>> {
        let mut files: Vec<CachedFile> = self
            .snapshot_paths()?
            .into_iter()
            .map(|path| {
                let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                let entry = read_entry(&path);
                CachedFile { path, size, entry }
            })
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Remove every snapshot file, returning how many were removed
    pub fn clear(&self) -> VolbyResult<usize> {
        let paths = self.snapshot_paths()?;
        for path in &paths {
            fs::remove_file(path)
                .map_err(|e| VolbyError::io(format!("removing {}", path.display()), e))?;
        }
        info!("Removed {} cache files from {}", paths.len(), self.dir.display());
        Ok(paths.len())
    }

    fn snapshot_paths(&self) -> VolbyResult<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| VolbyError::io(format!("reading {}", self.dir.display()), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| VolbyError::io(format!("reading {}", self.dir.display()), e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if is_snapshot_name(&name) && entry.path().is_file() {
                paths.push(entry.path());
            }
        }
        Ok(paths)
    }
}

fn is_snapshot_name(name: &str) -> bool {
    name.starts_with("ps") && name.ends_with(".json") && name.contains('_')
}

fn read_entry(path: &Path) -> Option<CacheEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("No cache at {}: {}", path.display(), e);
            return None;
        }
    };

    let raw: RawEntry = match serde_json::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Ignoring malformed cache file {}: {}", path.display(), e);
            return None;
        }
    };
    if raw.version != CACHE_VERSION {
        debug!(
            "Ignoring cache file {} with version {} (current {})",
            path.display(),
            raw.version,
            CACHE_VERSION
        );
        return None;
    }

    match serde_json::from_value::<Dataset>(raw.data) {
        Ok(data) => Some(CacheEntry {
            version: raw.version,
            etag: raw.etag,
            checked_at: raw.checked_at,
            data,
        }),
        Err(e) => {
            warn!("Ignoring cache file {} with unreadable data: {}", path.display(), e);
            None
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> VolbyResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| VolbyError::User(format!("cache path {} has no parent", path.display())))?;
    fs::create_dir_all(parent)
        .map_err(|e| VolbyError::io(format!("creating cache directory {}", parent.display()), e))?;

    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("snapshot"),
        std::process::id()
    ));
    let written = write_temp(&tmp, bytes).and_then(|()| {
        fs::rename(&tmp, path)
            .map_err(|e| VolbyError::io(format!("replacing {}", path.display()), e))
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

fn write_temp(tmp: &Path, bytes: &[u8]) -> VolbyResult<()> {
    let mut file = fs::File::create(tmp)
        .map_err(|e| VolbyError::io(format!("creating {}", tmp.display()), e))?;
    file.write_all(bytes)
        .map_err(|e| VolbyError::io(format!("writing {}", tmp.display()), e))?;
    file.sync_all()
        .map_err(|e| VolbyError::io(format!("syncing {}", tmp.display()), e))
}
