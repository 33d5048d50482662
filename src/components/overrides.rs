//! Custom config overlay: macros, start_print and overrides
//!
//! Copies the three user config files into the `custom/` directory and
//! rewrites `custom/main.cfg` so it ends with exactly one ordered include
//! block. Stray occurrences of those includes elsewhere in main.cfg are
//! deduplicated into the block.

use crate::context::InstallContext;
use crate::error::Result;
use crate::fsops;
use crate::orchestrator::StepOutcome;
use crate::patch;

const CUSTOM_FILES: [&str; 3] = ["macros.cfg", "start_print.cfg", "overrides.cfg"];

const INCLUDE_BLOCK: [&str; 3] = [
    "[include macros.cfg]",
    "[include start_print.cfg]",
    "[include overrides.cfg]",
];

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    let custom_dir = &ctx.paths.custom_config_dir;
    if !ctx.dry_run {
        fsops::ensure_dir(custom_dir)?;
    }

    let mut changed = false;
    for name in CUSTOM_FILES {
        changed |= super::copy_file_step(
            ctx,
            &ctx.assets.configs().join(name),
            &custom_dir.join(name),
        )?;
    }

    // main.cfg is created when missing; the stock firmware ships one, but a
    // factory-reset board may not have it yet
    let main_cfg = ctx.paths.custom_main_cfg();
    let content = if main_cfg.is_file() {
        fsops::read_text(&main_cfg)?
    } else {
        String::new()
    };

    match patch::ensure_ordered_block(&content, &INCLUDE_BLOCK) {
        None => ctx.log_verbose("main.cfg already contains the ordered include block"),
        Some(new_content) => {
            if ctx.dry_run {
                ctx.log("Would update custom/main.cfg with the ordered include block");
            } else {
                fsops::write_text(&main_cfg, &new_content)?;
                ctx.log("Updated custom/main.cfg with the ordered include block");
            }
            changed = true;
        }
    }

    Ok(super::outcome(changed))
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    for name in CUSTOM_FILES {
        super::check_file(&ctx.paths.custom_config_dir.join(name), name)?;
    }
    let main_cfg = ctx.paths.custom_main_cfg();
    for line in INCLUDE_BLOCK {
        super::check_contains(&main_cfg, line, "main.cfg include")?;
    }
    Ok(super::verified())
}
