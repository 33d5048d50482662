//! Static ustreamer binary install
//!
//! Replaces the binary via copy-to-temp plus atomic rename so a running
//! instance never sees a half-written file. The old service is stopped
//! first (best effort) and the new binary is smoke-tested with `--help`.

use crate::context::InstallContext;
use crate::error::{self, PrintkitError, Result};
use crate::fsops;
use crate::orchestrator::StepOutcome;

const BINARY_ASSET: &str = "ustreamer_static_arm32";

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    let src = ctx.assets.binaries().join(BINARY_ASSET);
    if !src.is_file() {
        return Err(error::source_not_found(&src));
    }

    let dst = &ctx.paths.ustreamer_bin;
    if fsops::files_identical(&src, dst)? {
        ctx.log_verbose("ustreamer binary already up to date");
        return Ok(StepOutcome::Unchanged("already present".to_string()));
    }

    if ctx.dry_run {
        ctx.log(&format!(
            "Would install ustreamer binary to {}",
            dst.display()
        ));
        return Ok(StepOutcome::Changed("would install".to_string()));
    }

    ctx.stop_service_best_effort("ustreamer");
    fsops::install_executable_atomic(&src, dst)?;
    ctx.log(&format!("Installed ustreamer binary to {}", dst.display()));

    // Smoke test: the binary must at least answer --help
    ctx.run_command(dst, &["--help"], None)
        .map_err(|e| PrintkitError::CommandFailed {
            command: format!("{} --help", dst.display()),
            reason: format!("binary test failed: {e}"),
        })?;

    Ok(StepOutcome::Changed("installed".to_string()))
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    super::check_file(&ctx.paths.ustreamer_bin, "ustreamer binary")?;
    Ok(super::verified())
}
