//! Answer resolution: supplied data, recorded answers, prompts, defaults.
//!
//! Variables resolve in declaration order so that a default like
//! `{{snake_case project_name}}` sees the answers before it. For each
//! variable the first source that has a value wins:
//!
//! 1. data supplied on this invocation
//! 2. the answer recorded in provenance (update only)
//! 3. the prompter, when one is installed and `use_defaults` is off
//! 4. the rendered default
//!
//! A variable whose `when` condition is false is never prompted.

use tracing::{debug, instrument};

use crate::{
    application::services::ProjectService,
    domain::{DataContext, DataValue, DomainError, Template, VariableSpec, VariableType},
    error::RecastResult,
};

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct AnswerOptions {
    pub use_defaults: bool,
    pub strict: bool,
}

impl ProjectService {
    #[instrument(skip_all, fields(template = %template.id))]
    pub(super) fn resolve_answers(
        &self,
        template: &Template,
        recorded: &DataContext,
        supplied: &DataContext,
        options: AnswerOptions,
    ) -> RecastResult<DataContext> {
        if options.strict {
            if let Some(unknown) = supplied.keys().find(|k| template.variable(k).is_none()) {
                return Err(DomainError::InvalidDataContext {
                    variable: unknown.clone(),
                    reason: format!("not declared by template '{}'", template.id.name()),
                }
                .into());
            }
        }

        let mut answers = DataContext::new();

        for spec in &template.variables {
            let ctx = Self::render_context(template, &answers);

            let active = match &spec.when {
                Some(cond) => self.renderer.evaluate(cond, &ctx)?,
                None => true,
            };

            let default = match &spec.default {
                Some(DataValue::Str(raw)) => {
                    let rendered = self.renderer.render_str(
                        &format!("default of '{}'", spec.name),
                        raw,
                        &ctx,
                    )?;
                    Some(spec.accept(&DataValue::Str(rendered))?)
                }
                Some(other) => Some(spec.accept(other)?),
                None => None,
            };

            let value = if let Some(raw) = supplied.get(&spec.name) {
                spec.accept(raw)?
            } else if let Some(raw) = recorded.get(&spec.name) {
                spec.accept(raw)?
            } else if !active {
                default.unwrap_or_else(|| zero_value(spec.ty))
            } else {
                match (&self.prompter, options.use_defaults) {
                    (Some(prompter), false) => spec.accept(&prompter.ask(spec, default)?)?,
                    _ => default.ok_or_else(|| DomainError::MissingVariable {
                        variable: spec.name.clone(),
                    })?,
                }
            };

            self.check_validator(template, spec, &answers, &value)?;

            debug!(variable = %spec.name, active, "Resolved");
            answers.insert(spec.name.clone(), value);
        }

        Ok(answers)
    }

    fn check_validator(
        &self,
        template: &Template,
        spec: &VariableSpec,
        answers: &DataContext,
        value: &DataValue,
    ) -> RecastResult<()> {
        let Some(expr) = &spec.validator else {
            return Ok(());
        };

        let ctx = Self::render_context(template, answers).with_variable(&spec.name, value.clone());
        let message = self
            .renderer
            .render_str(&format!("validator of '{}'", spec.name), expr, &ctx)?;

        let message = message.trim();
        if message.is_empty() {
            Ok(())
        } else {
            Err(DomainError::InvalidDataContext {
                variable: spec.name.clone(),
                reason: message.to_string(),
            }
            .into())
        }
    }
}

fn zero_value(ty: VariableType) -> DataValue {
    match ty {
        VariableType::Str => DataValue::Str(String::new()),
        VariableType::Bool => DataValue::Bool(false),
        VariableType::Int => DataValue::Int(0),
        VariableType::Float => DataValue::Float(0.0),
    }
}
