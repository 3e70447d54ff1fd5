//! Interactive answers through `dialoguer`.
//!
//! Only compiled with the `interactive` feature.  Booleans get a yes/no
//! confirm, variables with `choices` a select list, secrets a hidden input,
//! everything else a text input pre-filled with the default.

use std::io;

use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use recast_core::{
    application::{ApplicationError, ports::Prompter},
    domain::{DataValue, VariableSpec, VariableType},
    error::{RecastError, RecastResult},
};

pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&self, spec: &VariableSpec, default: Option<DataValue>) -> RecastResult<DataValue> {
        let prompt = prompt_text(spec);

        if !spec.choices.is_empty() {
            let labels: Vec<String> = spec.choices.iter().map(ToString::to_string).collect();
            let initial = default
                .as_ref()
                .and_then(|d| spec.choices.iter().position(|c| c == d))
                .unwrap_or(0);
            let picked = Select::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(&labels)
                .default(initial)
                .interact()
                .map_err(prompt_error)?;
            return Ok(spec.choices[picked].clone());
        }

        if spec.ty == VariableType::Bool {
            let initial = default.as_ref().is_some_and(DataValue::is_truthy);
            let answer = Confirm::with_theme(&self.theme)
                .with_prompt(prompt)
                .default(initial)
                .interact()
                .map_err(prompt_error)?;
            return Ok(DataValue::Bool(answer));
        }

        if spec.secret {
            let answer = Password::with_theme(&self.theme)
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_error)?;
            // Keep the default when nothing was typed.
            return Ok(match default {
                Some(d) if answer.is_empty() => d,
                _ => DataValue::Str(answer),
            });
        }

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(d) = &default {
            input = input.default(d.to_string());
        }
        let answer = input.interact_text().map_err(prompt_error)?;
        // The service coerces to the declared type.
        Ok(DataValue::Str(answer))
    }
}

fn prompt_text(spec: &VariableSpec) -> String {
    match &spec.help {
        Some(help) => format!("{} ({})", help, spec.name),
        None => spec.name.clone(),
    }
}

fn prompt_error(err: dialoguer::Error) -> RecastError {
    let io_err = io::Error::from(err);
    match io_err.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof => {
            ApplicationError::Cancelled.into()
        }
        _ => RecastError::Internal {
            message: format!("prompt failed: {io_err}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_text_prefers_help() {
        let spec = VariableSpec::new("project_name", VariableType::Str)
            .with_help("Human-readable project name");
        assert_eq!(
            prompt_text(&spec),
            "Human-readable project name (project_name)"
        );
        let bare = VariableSpec::new("author_name", VariableType::Str);
        assert_eq!(prompt_text(&bare), "author_name");
    }

    #[test]
    fn interrupted_prompt_is_cancelled() {
        let err = prompt_error(dialoguer::Error::IO(io::Error::from(
            io::ErrorKind::Interrupted,
        )));
        assert_eq!(err.kind(), recast_core::error::ErrorKind::Cancelled);
    }
}
