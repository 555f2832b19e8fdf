// Write-then-rename file replacement.
//
// A reader never observes a half-written file: bytes go to a hidden sibling
// first and only a successful, synced write is renamed over the target.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PulseError, PulseResult};

/// Suffix marking in-progress writes. Directory listings skip these.
pub const TEMP_SUFFIX: &str = ".partial";

fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}{TEMP_SUFFIX}", std::process::id()))
}

/// Atomically replace `target` with `bytes`.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> PulseResult<()> {
    let tmp = temp_path(target);

    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, target)
    })();

    if let Err(e) = result {
        // Leave nothing behind that could be mistaken for output
        let _ = fs::remove_file(&tmp);
        return Err(PulseError::cache_io(target, e));
    }
    Ok(())
}

/// Atomically write `value` as pretty-printed JSON.
pub fn write_json_atomic<T: Serialize + ?Sized>(target: &Path, value: &T) -> PulseResult<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| PulseError::cache_io(target, std::io::Error::other(e)))?;
    write_atomic(target, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("site-example_com.txt");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(TEMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_atomic_missing_dir_is_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.txt");
        let err = write_atomic(&target, b"x").unwrap_err();
        assert!(matches!(err, PulseError::CacheIo { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn test_write_json_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");
        write_json_atomic(&target, &vec![1, 2, 3]).unwrap();
        let back: Vec<i32> = serde_json::from_slice(&fs::read(&target).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
