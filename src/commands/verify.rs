//! Verify command implementation
//!
//! Read-only pass over the selected components checking that installed
//! files, includes and patches are in place. No privilege requirement:
//! verification only reads.

use crate::cli::{Encoder, VerifyArgs};
use crate::context::InstallContext;
use crate::error::Result;
use crate::orchestrator::{self, RunMode};
use crate::registry::Registry;
use crate::ui;

/// Run the verify command; Ok(true) means every check passed
pub fn run(verbose: bool, args: VerifyArgs) -> Result<bool> {
    let ctx = InstallContext::from_env(false, verbose, Encoder::Mjpeg);

    let registry = Registry::builtin();
    let report = orchestrator::run(&registry, &args.components, &ctx, RunMode::Verify)?;

    if args.json {
        ui::render_summary_json(&report)?;
    } else {
        ui::render_summary(&report);
    }

    Ok(report.all_succeeded())
}
