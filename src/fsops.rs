//! File system operations with unified error handling
//!
//! All copies are content-aware: a copy whose destination already holds
//! identical bytes is reported as unchanged, which is what makes re-running
//! the installer a no-op.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{self, Result};

/// Hash a file's contents
fn hash_file(path: &Path) -> Result<blake3::Hash> {
    let bytes = fs::read(path).map_err(|e| error::read_failed(path, e))?;
    Ok(blake3::hash(&bytes))
}

/// Whether two files exist and hold identical bytes
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    if !a.is_file() || !b.is_file() {
        return Ok(false);
    }
    Ok(hash_file(a)? == hash_file(b)?)
}

/// Whether every file under `src` has an identical counterpart under `dst`
pub fn dir_up_to_date(src: &Path, dst: &Path) -> Result<bool> {
    if !dst.is_dir() {
        return Ok(false);
    }
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| error::read_failed(src, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| entry.path());
        if !files_identical(entry.path(), &dst.join(rel))? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| error::write_failed(path, e))
}

/// Copy a single file, replacing any symlink at the destination
///
/// Returns false when the destination was already identical.
pub fn copy_file(src: &Path, dst: &Path) -> Result<bool> {
    if !src.is_file() {
        return Err(error::source_not_found(src));
    }

    if files_identical(src, dst)? {
        return Ok(false);
    }

    // A symlinked destination must become a regular file
    if dst.symlink_metadata().is_ok_and(|m| m.is_symlink()) {
        fs::remove_file(dst).map_err(|e| error::write_failed(dst, e))?;
    }

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).map_err(|e| error::copy_failed(src, dst, e))?;
    Ok(true)
}

/// Copy a directory tree file by file
///
/// Returns false when every destination file was already identical.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<bool> {
    if !src.is_dir() {
        return Err(error::source_dir_not_found(src));
    }

    let mut changed = false;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| error::read_failed(src, e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .unwrap_or_else(|_| entry.path());
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            changed |= copy_file(entry.path(), &target)?;
        }
    }
    Ok(changed)
}

/// Install a file via copy-to-temp plus atomic rename, mode 0755
///
/// Avoids "text file busy" when replacing a binary that may be running.
pub fn install_executable_atomic(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_file() {
        return Err(error::source_not_found(src));
    }

    let parent = dst.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| error::write_failed(parent, e))?;
    fs::copy(src, temp.path()).map_err(|e| error::copy_failed(src, temp.path(), e))?;
    fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o755))
        .map_err(|e| error::write_failed(temp.path(), e))?;
    temp.persist(dst)
        .map_err(|e| error::write_failed(dst, e.error))?;
    Ok(())
}

/// Mark a file executable (mode 0755)
pub fn set_executable(path: &Path) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| error::write_failed(path, e))
}

/// Read a text file, mapping a missing file to a patch-target error
pub fn read_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(error::patch_target_missing(path));
    }
    fs::read_to_string(path).map_err(|e| error::read_failed(path, e))
}

/// Write a text file
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, content).map_err(|e| error::write_failed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_reports_changed_then_unchanged() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.cfg");
        let dst = temp.path().join("dst.cfg");
        fs::write(&src, "[printer]\n").unwrap();

        assert!(copy_file(&src, &dst).unwrap());
        assert!(!copy_file(&src, &dst).unwrap());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "[printer]\n");
    }

    #[test]
    fn test_copy_file_missing_source() {
        let temp = TempDir::new().unwrap();
        let result = copy_file(&temp.path().join("missing"), &temp.path().join("dst"));
        assert!(result.is_err());
    }

    #[test]
    fn test_copy_file_replaces_symlink() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.cfg");
        let other = temp.path().join("other.cfg");
        let dst = temp.path().join("dst.cfg");
        fs::write(&src, "new").unwrap();
        fs::write(&other, "old").unwrap();
        std::os::unix::fs::symlink(&other, &dst).unwrap();

        assert!(copy_file(&src, &dst).unwrap());
        assert!(!dst.symlink_metadata().unwrap().is_symlink());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
        // The symlink target stays untouched
        assert_eq!(fs::read_to_string(&other).unwrap(), "old");
    }

    #[test]
    fn test_copy_dir_recursive_and_idempotent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("KAMP");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.cfg"), "a").unwrap();
        fs::write(src.join("nested/b.cfg"), "b").unwrap();
        let dst = temp.path().join("out/KAMP");

        assert!(copy_dir(&src, &dst).unwrap());
        assert_eq!(fs::read_to_string(dst.join("nested/b.cfg")).unwrap(), "b");
        assert!(dir_up_to_date(&src, &dst).unwrap());
        assert!(!copy_dir(&src, &dst).unwrap());
    }

    #[test]
    fn test_install_executable_atomic_sets_mode() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("ustreamer");
        fs::write(&src, "#!/bin/sh\nexit 0\n").unwrap();
        let dst = temp.path().join("bin/ustreamer");

        install_executable_atomic(&src, &dst).unwrap();
        let mode = dst.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_read_text_missing_is_patch_target_error() {
        let temp = TempDir::new().unwrap();
        let err = read_text(&temp.path().join("printer.cfg")).unwrap_err();
        assert!(err.to_string().contains("Patch target not found"));
    }
}
