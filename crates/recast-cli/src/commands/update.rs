//! `recast update`: bring a generated project up to date.

use tracing::{info, instrument};

use recast_adapters::ProjectLock;
use recast_core::application::{UpdateOptions, UpdateReport};

use crate::{
    cli::UpdateArgs,
    commands::{parse_data, service, should_prompt},
    config::AppConfig,
    error::CliResult,
    output::{OutputManager, Tone},
};

#[instrument(skip_all, fields(project = %args.project.display()))]
pub fn execute(args: UpdateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let data = parse_data(&args.answers.data)?;
    let options = UpdateOptions {
        source: args.source,
        use_defaults: args.answers.defaults || config.generate.use_defaults,
        strict: args.answers.strict || config.generate.strict,
        conflict: args
            .conflict
            .map(Into::into)
            .unwrap_or(config.update.conflict),
        pretend: args.pretend,
    };

    let _lock = if options.pretend {
        None
    } else {
        Some(ProjectLock::acquire(&args.project)?)
    };

    let report = service(should_prompt(options.use_defaults)).update(&args.project, &data, &options)?;
    info!(
        updated = report.count("updated"),
        preserved = report.advisories.len(),
        "Update finished"
    );

    render(&report, &output)
}

fn tone(action: &str) -> Tone {
    match action {
        "updated" | "created" | "adopted" => Tone::Good,
        "removed" => Tone::Bad,
        "preserved" => Tone::Attention,
        _ => Tone::Neutral,
    }
}

fn render(report: &UpdateReport, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        output.json(report)?;
        return Ok(());
    }

    output.header(&format!(
        "{} {} -> {}",
        report.template, report.from_version, report.to_version
    ))?;

    for file in report.files.iter().filter(|f| f.action != "identical") {
        output.entry(file.action, &file.path, tone(file.action))?;
    }

    for advisory in &report.advisories {
        let msg = match &advisory.rej {
            Some(rej) => format!(
                "{} was {}; the template's version is in {rej}",
                advisory.path, advisory.reason
            ),
            None => format!("{} was {}; left as is", advisory.path, advisory.reason),
        };
        output.warning(&msg)?;
    }

    let changed = report.files.iter().filter(|f| f.action != "identical").count();
    if report.pretend {
        output.info("Pretend mode: nothing was written")?;
    } else if changed == 0 && !report.provenance_changed {
        output.success("Already up to date")?;
    } else {
        output.success(&format!(
            "Updated to {} {} ({} updated, {} created, {} removed)",
            report.template,
            report.to_version,
            report.count("updated"),
            report.count("created"),
            report.count("removed"),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones() {
        assert_eq!(tone("updated"), Tone::Good);
        assert_eq!(tone("removed"), Tone::Bad);
        assert_eq!(tone("preserved"), Tone::Attention);
        assert_eq!(tone("identical"), Tone::Neutral);
    }
}
