//! Installation orchestrator
//!
//! Runs each selected component's routine exactly once, in registry order,
//! behind a uniform error boundary: a routine failure becomes a FAILURE
//! outcome and the run continues with the next component. The routines
//! themselves never abort the run.

use serde::Serialize;

use crate::context::InstallContext;
use crate::error::Result;
use crate::progress::ProgressDisplay;
use crate::registry::Registry;

/// What a routine reports back on success
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// State was changed (or would be, under dry-run)
    Changed(String),
    /// Everything was already in the desired state
    Unchanged(String),
}

impl StepOutcome {
    pub fn detail(&self) -> &str {
        match self {
            Self::Changed(detail) | Self::Unchanged(detail) => detail,
        }
    }
}

/// Per-component status in the final summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
    Skipped,
}

/// One record per attempted component, in registry order
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub component: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Collected outcomes of one run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<OutcomeRecord>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.status != Status::Failure)
    }
}

/// Which routine of each component to run
#[derive(Debug, Clone, Copy)]
pub enum RunMode {
    Install,
    Verify,
}

/// Run the selected components sequentially and collect their outcomes
///
/// Fails fast only on configuration errors (unknown component name, empty
/// selection); per-component errors are converted to outcome records.
pub fn run(
    registry: &Registry,
    requested: &[String],
    ctx: &InstallContext,
    mode: RunMode,
) -> Result<RunReport> {
    let selected = registry.select(requested)?;

    let progress = ProgressDisplay::new(selected.len() as u64);
    let mut outcomes = Vec::with_capacity(selected.len());

    for (index, spec) in selected.iter().enumerate() {
        progress.update_component(spec.name, index + 1, selected.len());

        let verb = match mode {
            RunMode::Install => "Installing",
            RunMode::Verify => "Verifying",
        };
        ctx.log(&format!("{verb} {}...", spec.name));

        let routine = match mode {
            RunMode::Install => spec.install,
            RunMode::Verify => spec.verify,
        };

        let record = match routine(ctx) {
            Ok(outcome) => {
                let status = if ctx.dry_run && matches!(mode, RunMode::Install) {
                    Status::Skipped
                } else {
                    Status::Success
                };
                OutcomeRecord {
                    component: spec.name.to_string(),
                    status,
                    detail: Some(outcome.detail().to_string()),
                }
            }
            Err(e) => OutcomeRecord {
                component: spec.name.to_string(),
                status: Status::Failure,
                detail: Some(e.to_string()),
            },
        };
        outcomes.push(record);
        progress.inc();
    }

    progress.finish();
    Ok(RunReport { outcomes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Encoder;
    use crate::context::{AssetPaths, TargetPaths};
    use crate::error::PrintkitError;
    use crate::registry::ComponentSpec;
    use std::path::PathBuf;

    fn test_ctx(dry_run: bool) -> InstallContext {
        InstallContext {
            paths: TargetPaths::default(),
            assets: AssetPaths {
                root: PathBuf::from("assets"),
            },
            dry_run,
            verbose: false,
            encoder: Encoder::Mjpeg,
            timelapse_source: None,
        }
    }

    fn ok_routine(_ctx: &InstallContext) -> crate::error::Result<StepOutcome> {
        Ok(StepOutcome::Changed("installed".to_string()))
    }

    fn unchanged_routine(_ctx: &InstallContext) -> crate::error::Result<StepOutcome> {
        Ok(StepOutcome::Unchanged("already present".to_string()))
    }

    fn failing_routine(_ctx: &InstallContext) -> crate::error::Result<StepOutcome> {
        Err(PrintkitError::PatchTargetMissing {
            path: "/etc/missing".to_string(),
        })
    }

    fn fake_registry() -> Registry {
        Registry::from_components(vec![
            ComponentSpec {
                name: "alpha",
                description: "first",
                install: ok_routine,
                verify: ok_routine,
            },
            ComponentSpec {
                name: "beta",
                description: "second",
                install: failing_routine,
                verify: failing_routine,
            },
            ComponentSpec {
                name: "gamma",
                description: "third",
                install: unchanged_routine,
                verify: ok_routine,
            },
        ])
    }

    #[test]
    fn test_one_record_per_component_in_order() {
        let registry = fake_registry();
        let report = run(&registry, &[], &test_ctx(false), RunMode::Install).unwrap();
        let names: Vec<&str> = report.outcomes.iter().map(|o| o.component.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_failure_does_not_abort_siblings() {
        let registry = fake_registry();
        let report = run(&registry, &[], &test_ctx(false), RunMode::Install).unwrap();
        assert_eq!(report.outcomes[0].status, Status::Success);
        assert_eq!(report.outcomes[1].status, Status::Failure);
        assert_eq!(report.outcomes[2].status, Status::Success);
        assert!(!report.all_succeeded());
        assert!(
            report.outcomes[1]
                .detail
                .as_deref()
                .unwrap()
                .contains("/etc/missing")
        );
    }

    #[test]
    fn test_all_succeeded_without_failures() {
        let registry = fake_registry();
        let requested = vec!["alpha".to_string(), "gamma".to_string()];
        let report = run(&registry, &requested, &test_ctx(false), RunMode::Install).unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.all_succeeded());
    }

    #[test]
    fn test_dry_run_maps_success_to_skipped() {
        let registry = fake_registry();
        let requested = vec!["alpha".to_string()];
        let report = run(&registry, &requested, &test_ctx(true), RunMode::Install).unwrap();
        assert_eq!(report.outcomes[0].status, Status::Skipped);
    }

    #[test]
    fn test_unknown_component_attempts_nothing() {
        let registry = fake_registry();
        let requested = vec!["alpha".to_string(), "delta".to_string()];
        let err = run(&registry, &requested, &test_ctx(false), RunMode::Install).unwrap_err();
        assert!(matches!(err, PrintkitError::UnknownComponent { .. }));
    }

    #[test]
    fn test_verify_mode_uses_verify_routine() {
        let registry = fake_registry();
        let requested = vec!["gamma".to_string()];
        let report = run(&registry, &requested, &test_ctx(false), RunMode::Verify).unwrap();
        // gamma's verify routine reports "installed", not "already present"
        assert_eq!(report.outcomes[0].detail.as_deref(), Some("installed"));
    }
}
