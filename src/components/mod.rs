//! Unit install routines, one module per component
//!
//! Each routine is idempotent: re-running with unchanged inputs makes no
//! further changes and reports success. Under dry-run a routine logs what
//! it would do and returns without touching the filesystem; that contract
//! is honored here, not enforced by the orchestrator.

pub mod bed_mesh;
pub mod cleanup;
pub mod kamp;
pub mod mainsail;
pub mod overrides;
pub mod resonance;
pub mod timelapse;
pub mod ustreamer;

use std::path::Path;

use crate::context::InstallContext;
use crate::error::{self, Result};
use crate::fsops;
use crate::orchestrator::StepOutcome;

/// Copy one payload file into place, dry-run aware
///
/// Returns true when the destination changed (or would change).
pub(crate) fn copy_file_step(ctx: &InstallContext, src: &Path, dst: &Path) -> Result<bool> {
    if !src.is_file() {
        return Err(error::source_not_found(src));
    }

    if fsops::files_identical(src, dst)? {
        ctx.log_verbose(&format!("{} already up to date", dst.display()));
        return Ok(false);
    }

    if ctx.dry_run {
        ctx.log(&format!(
            "Would copy {} to {}",
            src.display(),
            dst.display()
        ));
        return Ok(true);
    }

    fsops::copy_file(src, dst)?;
    ctx.log(&format!("Copied {} to {}", src.display(), dst.display()));
    Ok(true)
}

/// Copy one payload directory into place, dry-run aware
pub(crate) fn copy_dir_step(ctx: &InstallContext, src: &Path, dst: &Path) -> Result<bool> {
    if !src.is_dir() {
        return Err(error::source_dir_not_found(src));
    }

    if fsops::dir_up_to_date(src, dst)? {
        ctx.log_verbose(&format!("{} already up to date", dst.display()));
        return Ok(false);
    }

    if ctx.dry_run {
        ctx.log(&format!(
            "Would copy directory {} to {}",
            src.display(),
            dst.display()
        ));
        return Ok(true);
    }

    fsops::copy_dir(src, dst)?;
    ctx.log(&format!(
        "Copied directory {} to {}",
        src.display(),
        dst.display()
    ));
    Ok(true)
}

/// Apply a pure text patch to a file, dry-run aware
///
/// `edit` returns `Some(new_content)` when a change is needed. The target
/// file must already exist.
pub(crate) fn patch_file_step<F>(
    ctx: &InstallContext,
    path: &Path,
    description: &str,
    edit: F,
) -> Result<bool>
where
    F: FnOnce(&str) -> Option<String>,
{
    let content = fsops::read_text(path)?;
    match edit(&content) {
        None => {
            ctx.log_verbose(&format!("{description}: already in place"));
            Ok(false)
        }
        Some(new_content) => {
            if ctx.dry_run {
                ctx.log(&format!("Would update {}: {description}", path.display()));
            } else {
                fsops::write_text(path, &new_content)?;
                ctx.log(&format!("Updated {}: {description}", path.display()));
            }
            Ok(true)
        }
    }
}

/// Map a changed/unchanged flag to the routine's outcome
pub(crate) fn outcome(changed: bool) -> StepOutcome {
    if changed {
        StepOutcome::Changed("installed".to_string())
    } else {
        StepOutcome::Unchanged("already present".to_string())
    }
}

/// Verification helper: a required file must exist
pub(crate) fn check_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(crate::error::PrintkitError::PatchTargetMissing {
            path: format!("{what}: {}", path.display()),
        })
    }
}

/// Verification helper: a required directory must exist
pub(crate) fn check_dir(path: &Path, what: &str) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(crate::error::PrintkitError::PatchTargetMissing {
            path: format!("{what}: {}", path.display()),
        })
    }
}

/// Verification helper: a file must contain the given needle
pub(crate) fn check_contains(path: &Path, needle: &str, what: &str) -> Result<()> {
    let content = fsops::read_text(path)?;
    if content.contains(needle) {
        Ok(())
    } else {
        Err(crate::error::PrintkitError::PatternNotFound {
            path: format!("{what}: {}", path.display()),
        })
    }
}

pub(crate) fn verified() -> StepOutcome {
    StepOutcome::Unchanged("verified".to_string())
}
