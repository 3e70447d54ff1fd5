//! `recast generate`: render a template into a new project.

use tracing::{info, instrument};

use recast_adapters::ProjectLock;
use recast_core::application::{GenerateOptions, GenerateReport, WriteAction};

use crate::{
    cli::GenerateArgs,
    commands::{parse_data, service, should_prompt},
    config::AppConfig,
    error::CliResult,
    output::{OutputManager, Tone},
};

#[instrument(skip_all, fields(source = %args.source.display(), destination = %args.destination.display()))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let data = parse_data(&args.answers.data)?;
    let options = GenerateOptions {
        use_defaults: args.answers.defaults || config.generate.use_defaults,
        force: args.force,
        pretend: args.pretend,
        strict: args.answers.strict || config.generate.strict,
    };

    // Pretend never writes, so it needs no lock.
    let _lock = if options.pretend {
        None
    } else {
        Some(ProjectLock::acquire(&args.destination)?)
    };

    let report = service(should_prompt(options.use_defaults)).generate(
        &args.source,
        &args.destination,
        &data,
        &options,
    )?;
    info!(files = report.files.len(), "Generate finished");

    render(&report, &output)
}

fn render(report: &GenerateReport, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        output.json(report)?;
        return Ok(());
    }

    let verb = if report.pretend {
        "Would generate"
    } else {
        "Generating"
    };
    output.header(&format!(
        "{verb} {} {} in {}",
        report.template,
        report.version,
        report.destination.display()
    ))?;

    for file in &report.files {
        let (tag, tone) = match file.action {
            WriteAction::Created => ("create", Tone::Good),
            WriteAction::Overwritten => ("overwrite", Tone::Attention),
            WriteAction::Identical => ("identical", Tone::Neutral),
        };
        output.entry(tag, &file.path, tone)?;
    }

    if report.pretend {
        output.info("Pretend mode: nothing was written")?;
    } else {
        output.success(&format!(
            "Generated {} files in {}",
            report.files.len(),
            report.destination.display()
        ))?;
    }
    Ok(())
}
