//! Command handlers, one module per subcommand.
//!
//! Handlers turn parsed arguments plus [`AppConfig`](crate::config::AppConfig)
//! into service options, call [`ProjectService`], and hand the report to the
//! [`OutputManager`](crate::output::OutputManager).

use std::io::IsTerminal as _;

use tracing::debug;

use recast_adapters::{FilesystemTemplateLoader, HandlebarsRenderer, LocalFilesystem};
use recast_core::{application::ProjectService, domain::DataContext};

use crate::error::{CliError, CliResult};

pub mod completions;
pub mod config;
pub mod generate;
pub mod status;
pub mod update;

/// Service wired to the real adapters; a prompter is attached when `prompt`.
fn service(prompt: bool) -> ProjectService {
    let service = ProjectService::new(
        Box::new(FilesystemTemplateLoader::new()),
        Box::new(HandlebarsRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );
    attach_prompter(service, prompt)
}

#[cfg(feature = "interactive")]
fn attach_prompter(service: ProjectService, prompt: bool) -> ProjectService {
    if prompt {
        service.with_prompter(Box::new(crate::prompt::DialoguerPrompter::new()))
    } else {
        service
    }
}

#[cfg(not(feature = "interactive"))]
fn attach_prompter(service: ProjectService, _prompt: bool) -> ProjectService {
    service
}

/// Prompt only when asked to and someone is there to answer.
fn should_prompt(use_defaults: bool) -> bool {
    let prompt = !use_defaults && std::io::stdin().is_terminal();
    debug!(prompt, "Answer mode");
    prompt
}

/// Parse repeated `-d KEY=VALUE` arguments.
fn parse_data(pairs: &[String]) -> CliResult<DataContext> {
    DataContext::parse_pairs(pairs).map_err(|message| CliError::InvalidInput { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::domain::DataValue;

    #[test]
    fn parses_data_pairs() {
        let data = parse_data(&["project_name=My Lib".into(), "x==y".into()]).unwrap();
        assert_eq!(data.get("project_name"), Some(&DataValue::from("My Lib")));
        assert_eq!(data.get("x"), Some(&DataValue::from("=y")));
    }

    #[test]
    fn malformed_pair_is_invalid_input() {
        let err = parse_data(&["novalue".into()]).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn defaults_never_prompt() {
        assert!(!should_prompt(true));
    }
}
