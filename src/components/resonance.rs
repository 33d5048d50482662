//! Patched resonance tester for Klipper

use crate::context::InstallContext;
use crate::error::Result;
use crate::orchestrator::StepOutcome;

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    let changed = super::copy_file_step(
        ctx,
        &ctx.assets.patches().join("resonance_tester.py"),
        &ctx.paths.klipper_extras_dir.join("resonance_tester.py"),
    )?;
    Ok(super::outcome(changed))
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    super::check_file(
        &ctx.paths.klipper_extras_dir.join("resonance_tester.py"),
        "resonance_tester.py",
    )?;
    Ok(super::verified())
}
