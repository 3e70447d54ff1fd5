//! Handlebars-based renderer.
//!
//! Strict mode is on: a placeholder naming a variable that is not in the
//! render context is an error rather than an empty string. HTML escaping is
//! off since the output is source code and config files, not HTML.
//!
//! Besides the built-in `eq`/`ne`/`and`/`or`/`not` helpers, templates get
//! the case helpers `snake_case`, `kebab_case`, `pascal_case` and `slugify`.

use handlebars::{Handlebars, handlebars_helper, no_escape};
use tracing::{instrument, trace};

use recast_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{Condition, RenderContext, naming},
    error::RecastResult,
};

handlebars_helper!(snake_case_helper: |s: str| naming::snake_case(s));
handlebars_helper!(kebab_case_helper: |s: str| naming::kebab_case(s));
handlebars_helper!(pascal_case_helper: |s: str| naming::pascal_case(s));
handlebars_helper!(slugify_helper: |s: str| naming::slugify(s));

/// Renderer owning one Handlebars registry.
pub struct HandlebarsRenderer {
    hbs: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(no_escape);
        hbs.register_helper("snake_case", Box::new(snake_case_helper));
        hbs.register_helper("kebab_case", Box::new(kebab_case_helper));
        hbs.register_helper("pascal_case", Box::new(pascal_case_helper));
        hbs.register_helper("slugify", Box::new(slugify_helper));
        Self { hbs }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    #[instrument(skip(self, template, context))]
    fn render_str(
        &self,
        name: &str,
        template: &str,
        context: &RenderContext,
    ) -> RecastResult<String> {
        self.hbs.render_template(template, context).map_err(|e| {
            ApplicationError::RenderingFailed {
                item: name.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn evaluate(&self, condition: &Condition, context: &RenderContext) -> RecastResult<bool> {
        let expr = condition.expr().trim();
        // `eq a "b"` reads naturally in a manifest; `#if` needs it as a subexpression.
        let expr = if expr.contains(char::is_whitespace) && !expr.starts_with('(') {
            format!("({expr})")
        } else {
            expr.to_string()
        };

        let wrapped = format!("{{{{#if {expr}}}}}true{{{{/if}}}}");
        let out = self.render_str(&format!("condition '{}'", condition.expr()), &wrapped, context)?;
        let result = out.trim() == "true";
        trace!(condition = %condition, result, "Evaluated");
        Ok(result)
    }
}
