//! Install command implementation
//!
//! 1. Check privilege (root, unless dry-run)
//! 2. Check the payload assets directory exists
//! 3. Run the orchestrator over the selected components
//! 4. Render the summary and report overall success

use crate::cli::InstallArgs;
use crate::context::{self, InstallContext};
use crate::error::{PrintkitError, Result};
use crate::orchestrator::{self, RunMode};
use crate::registry::Registry;
use crate::ui;

/// Run the install command; Ok(true) means every attempted component succeeded
pub fn run(verbose: bool, args: InstallArgs) -> Result<bool> {
    if !args.dry_run {
        context::require_root()?;
    }

    let ctx = InstallContext::from_env(args.dry_run, verbose, args.encoder);
    if !ctx.assets.root.is_dir() {
        return Err(PrintkitError::AssetsNotFound {
            path: ctx.assets.root.display().to_string(),
        });
    }

    let registry = Registry::builtin();
    let report = orchestrator::run(&registry, &args.components, &ctx, RunMode::Install)?;

    if args.json {
        ui::render_summary_json(&report)?;
    } else {
        ui::render_summary(&report);
    }

    Ok(report.all_succeeded())
}
