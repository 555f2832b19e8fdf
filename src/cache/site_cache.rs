// On-disk cache of extracted site text.
//
// One file per site, named `site-<prefix>.txt`. The presence of that file is
// the only signal the crawler consults: if it exists the site is not fetched
// again. Writes go through `atomic::write_atomic`, so a file that exists is
// always complete.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::atomic::{write_atomic, TEMP_SUFFIX};
use crate::error::{PulseError, PulseResult};
use crate::site::Site;

const FILE_PREFIX: &str = "site-";
const FILE_EXTENSION: &str = ".txt";

/// A cached site corpus as seen on disk.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Sanitized host prefix the file is named after.
    pub prefix: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Filesystem-backed site text cache.
#[derive(Debug, Clone)]
pub struct SiteCache {
    dir: PathBuf,
}

impl SiteCache {
    /// Open (and create if needed) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> PulseResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| PulseError::cache_io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for `site`.
    pub fn path_for(&self, site: &Site) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{}{FILE_EXTENSION}", site.file_prefix()))
    }

    /// Whether a complete corpus is cached for `site`.
    pub fn has(&self, site: &Site) -> bool {
        self.path_for(site).is_file()
    }

    /// Read the cached corpus for `site`.
    pub fn load(&self, site: &Site) -> PulseResult<String> {
        let path = self.path_for(site);
        fs::read_to_string(&path).map_err(|e| PulseError::cache_io(path, e))
    }

    /// Persist `text` as the corpus for `site`, atomically.
    pub fn store(&self, site: &Site, text: &str) -> PulseResult<()> {
        let path = self.path_for(site);
        write_atomic(&path, text.as_bytes())?;
        info!(site = %site, path = %path.display(), bytes = text.len(), "Cached site text");
        Ok(())
    }

    /// Drop the cached corpus for `site`. Returns whether anything was removed.
    pub fn remove(&self, site: &Site) -> PulseResult<bool> {
        let path = self.path_for(site);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(site = %site, "Removed cache entry");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PulseError::cache_io(path, e)),
        }
    }

    /// All complete cache entries, sorted by prefix.
    pub fn entries(&self) -> PulseResult<Vec<CacheEntry>> {
        let read_dir = fs::read_dir(&self.dir).map_err(|e| PulseError::cache_io(&self.dir, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| PulseError::cache_io(&self.dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            let Some(prefix) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_EXTENSION))
            else {
                continue;
            };
            let bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            entries.push(CacheEntry {
                prefix: prefix.to_string(),
                path: entry.path(),
                bytes,
            });
        }

        entries.sort_by(|a, b| a.prefix.cmp(&b.prefix));
        Ok(entries)
    }
}
