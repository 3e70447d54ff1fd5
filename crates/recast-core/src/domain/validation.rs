use crate::domain::{
    entities::common::RelativePath,
    error::DomainError,
};

/// Centralized domain validation.
///
/// Checks that run on rendered output rather than on the template itself.
pub struct DomainValidator;

impl DomainValidator {
    /// Turn a rendered path into a [`RelativePath`].
    ///
    /// Every placeholder must be gone by now; a leftover `{{` means the
    /// engine produced template syntax rather than a value.
    pub fn validate_rendered_path(rendered: &str) -> Result<RelativePath, DomainError> {
        if rendered.contains("{{") || rendered.contains("}}") {
            return Err(DomainError::InvalidTemplate(format!(
                "unrendered placeholder in path '{rendered}'"
            )));
        }
        RelativePath::try_new(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_path_must_be_fully_substituted() {
        assert!(DomainValidator::validate_rendered_path("src/pkg/__init__.py").is_ok());
        assert!(DomainValidator::validate_rendered_path("src/{{x}}/a.py").is_err());
    }

    #[test]
    fn rendered_path_cannot_escape() {
        assert!(matches!(
            DomainValidator::validate_rendered_path("../outside.txt"),
            Err(DomainError::PathEscapesRoot { .. })
        ));
    }
}
