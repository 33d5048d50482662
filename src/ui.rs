//! Summary rendering for install and verify runs

use console::Style;

use crate::error::Result;
use crate::orchestrator::{RunReport, Status};

/// Print the per-component summary table and the overall result line
pub fn render_summary(report: &RunReport) {
    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("{}", Style::new().bold().apply_to("SUMMARY"));
    println!("{rule}");

    for outcome in &report.outcomes {
        let status = match outcome.status {
            Status::Success => Style::new().green().bold().apply_to("SUCCESS"),
            Status::Failure => Style::new().red().bold().apply_to("FAILURE"),
            Status::Skipped => Style::new().yellow().bold().apply_to("SKIPPED"),
        };
        let detail = outcome.detail.as_deref().unwrap_or("");
        println!("{:<12} : {status:<7}  {detail}", outcome.component);
    }

    println!();
    if report.all_succeeded() {
        println!(
            "{}",
            Style::new()
                .green()
                .apply_to("All components completed successfully")
        );
    } else {
        println!(
            "{}",
            Style::new()
                .red()
                .apply_to("Some components failed; check the log above and re-run")
        );
    }
}

/// Print the summary as JSON
pub fn render_summary_json(report: &RunReport) -> Result<()> {
    let rendered = serde_json::to_string_pretty(report).map_err(|e| {
        crate::error::PrintkitError::FileWriteFailed {
            path: "<stdout>".to_string(),
            reason: e.to_string(),
        }
    })?;
    println!("{rendered}");
    Ok(())
}
