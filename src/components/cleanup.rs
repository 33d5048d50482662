//! Backup cleanup service
//!
//! Installs the `cleanup_printer_backups` init script and registers it in
//! `moonraker.asvc` so Moonraker is allowed to manage it.

use crate::context::InstallContext;
use crate::error::Result;
use crate::fsops;
use crate::orchestrator::StepOutcome;
use crate::patch;

const SERVICE_NAME: &str = "cleanup_printer_backups";

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    let service_dst = ctx.paths.init_d_dir.join(SERVICE_NAME);
    let mut changed = super::copy_file_step(
        ctx,
        &ctx.assets.services().join(SERVICE_NAME),
        &service_dst,
    )?;

    if !ctx.dry_run {
        fsops::set_executable(&service_dst)?;
    }

    changed |= super::patch_file_step(
        ctx,
        &ctx.paths.moonraker_asvc,
        "register cleanup service in moonraker.asvc",
        |content| patch::ensure_line_present(content, SERVICE_NAME),
    )?;

    Ok(super::outcome(changed))
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    super::check_file(&ctx.paths.init_d_dir.join(SERVICE_NAME), "service script")?;
    super::check_contains(&ctx.paths.moonraker_asvc, SERVICE_NAME, "moonraker.asvc entry")?;
    Ok(super::verified())
}
