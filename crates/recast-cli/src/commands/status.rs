//! `recast status`: compare a project to its recorded baseline.

use tracing::instrument;

use recast_core::{application::StatusReport, domain::FileStatus};

use crate::{
    cli::StatusArgs,
    commands::service,
    error::CliResult,
    output::{OutputManager, Tone},
};

#[instrument(skip_all, fields(project = %args.project.display()))]
pub fn execute(args: StatusArgs, output: OutputManager) -> CliResult<()> {
    // Read-only: no lock, no prompts.
    let report = service(false).status(&args.project)?;
    render(&report, &output)
}

fn render(report: &StatusReport, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        output.json(report)?;
        return Ok(());
    }

    output.header(&format!("{} {}", report.template, report.version))?;

    for file in report
        .files
        .iter()
        .filter(|f| f.status != FileStatus::Unchanged)
    {
        let tone = match file.status {
            FileStatus::Deleted => Tone::Bad,
            _ => Tone::Attention,
        };
        output.entry(file.status.as_str(), &file.path, tone)?;
    }
    for rej in &report.pending_rej {
        output.entry("unresolved", rej, Tone::Bad)?;
    }

    if report.is_clean() {
        output.success("No local changes to generated files")?;
    } else if !report.pending_rej.is_empty() {
        output.warning("Resolve and delete the .rej files before the next update")?;
    }
    Ok(())
}
