//! KAMP adaptive meshing configuration
//!
//! Copies the `KAMP/` config directory and `KAMP_Settings.cfg` into the
//! printer config dir, then makes sure printer.cfg includes the settings
//! file. The include line goes right after the last existing include so the
//! stock config keeps its load order.

use crate::context::InstallContext;
use crate::error::Result;
use crate::orchestrator::StepOutcome;
use crate::patch;

const INCLUDE_LINE: &str = "[include KAMP_Settings.cfg]";

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    let mut changed = false;

    changed |= super::copy_dir_step(
        ctx,
        &ctx.assets.configs().join("KAMP"),
        &ctx.paths.config_dir.join("KAMP"),
    )?;

    changed |= super::copy_file_step(
        ctx,
        &ctx.assets.configs().join("KAMP_Settings.cfg"),
        &ctx.paths.config_dir.join("KAMP_Settings.cfg"),
    )?;

    changed |= super::patch_file_step(
        ctx,
        &ctx.paths.printer_cfg(),
        "include KAMP_Settings.cfg",
        |content| patch::ensure_include_after_last(content, INCLUDE_LINE),
    )?;

    Ok(super::outcome(changed))
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    super::check_dir(&ctx.paths.config_dir.join("KAMP"), "KAMP directory")?;
    super::check_file(
        &ctx.paths.config_dir.join("KAMP_Settings.cfg"),
        "KAMP_Settings.cfg",
    )?;
    super::check_contains(&ctx.paths.printer_cfg(), INCLUDE_LINE, "printer.cfg include")?;
    Ok(super::verified())
}
