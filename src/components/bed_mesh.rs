//! bed_mesh.py minval patch
//!
//! Lowers the `move_check_distance` option's minval from 3 to 1 in the
//! stock Klipper bed_mesh.py. A `.bak` copy of the file is written before
//! the first modification; an already-patched file reports success without
//! touching anything.

use std::path::Path;

use crate::context::InstallContext;
use crate::error::{self, PrintkitError, Result};
use crate::fsops;
use crate::orchestrator::StepOutcome;
use crate::patch::{self, MinvalPatch};

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    let target = ctx.paths.klipper_extras_dir.join("bed_mesh.py");
    let content = fsops::read_text(&target)?;

    match patch::set_move_check_minval(&content) {
        MinvalPatch::AlreadyApplied => {
            ctx.log_verbose("bed_mesh.py already has minval=1");
            Ok(StepOutcome::Unchanged("already patched".to_string()))
        }
        MinvalPatch::PatternNotFound => Err(PrintkitError::PatternNotFound {
            path: target.display().to_string(),
        }),
        MinvalPatch::Patched(new_content) => {
            if ctx.dry_run {
                ctx.log("Would patch bed_mesh.py: move_check_distance minval 3 -> 1");
            } else {
                backup_once(&target)?;
                fsops::write_text(&target, &new_content)?;
                ctx.log("Patched bed_mesh.py: move_check_distance minval 3 -> 1");
            }
            Ok(StepOutcome::Changed("patched".to_string()))
        }
    }
}

/// Keep a pristine copy next to the target; never overwrite an existing one
fn backup_once(target: &Path) -> Result<()> {
    let backup = target.with_extension("py.bak");
    if backup.exists() {
        return Ok(());
    }
    std::fs::copy(target, &backup).map_err(|e| error::copy_failed(target, &backup, e))?;
    Ok(())
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    let target = ctx.paths.klipper_extras_dir.join("bed_mesh.py");
    let content = fsops::read_text(&target)?;
    match patch::set_move_check_minval(&content) {
        MinvalPatch::AlreadyApplied => Ok(super::verified()),
        _ => Err(PrintkitError::PatternNotFound {
            path: target.display().to_string(),
        }),
    }
}
