//! The answers file written into every generated project.
//!
//! ```toml
//! [template]
//! id = "python-package"
//! version = "1.0.0"
//! source = "/home/me/templates/python-package"
//! fingerprint = "9f86d0…"
//!
//! [answers]
//! include_docs = true
//! project_name = "Test Project"
//!
//! [files]
//! "README.md" = "2cf24d…"
//! "pyproject.toml" = "486ea4…"
//! ```
//!
//! Serialization is deterministic: keys are sorted and nothing time-based is
//! recorded, so regenerating with the same inputs yields the same bytes.

use std::collections::BTreeMap;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::domain::entities::common::RelativePath;
use crate::domain::entities::data_context::DataContext;
use crate::domain::entities::template::{Template, TemplateId};
use crate::domain::error::DomainError;
use crate::domain::value_objects::ContentHash;

/// File name of the record, at the project root.
pub const PROVENANCE_FILE: &str = ".recast-answers.toml";

const HEADER: &str = "# Written by recast. Changes here affect `recast update`.\n\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub template: TemplateRef,
    #[serde(default)]
    pub answers: DataContext,
    /// Baseline hash of every file as last rendered.
    #[serde(default)]
    pub files: BTreeMap<RelativePath, ContentHash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub id: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub fingerprint: ContentHash,
}

impl ProvenanceRecord {
    /// Record for `template` rendered with `answers`.
    ///
    /// Secret variables are dropped here, not by callers.
    pub fn new(
        template: &Template,
        answers: &DataContext,
        files: BTreeMap<RelativePath, ContentHash>,
    ) -> Self {
        let answers = answers
            .iter()
            .filter(|(name, _)| !template.variable(name).is_some_and(|v| v.secret))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            template: TemplateRef {
                id: template.id.name().to_string(),
                version: template.id.version().clone(),
                source: template
                    .source
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                fingerprint: template.fingerprint,
            },
            answers,
            files,
        }
    }

    pub fn template_id(&self) -> Result<TemplateId, DomainError> {
        TemplateId::new(self.template.id.clone(), self.template.version.clone())
    }

    pub fn baseline(&self, path: &RelativePath) -> Option<&ContentHash> {
        self.files.get(path)
    }

    pub fn to_toml(&self) -> Result<String, DomainError> {
        let body = toml::to_string(self)
            .map_err(|e| DomainError::InvalidProvenance(format!("serialize: {e}")))?;
        Ok(format!("{HEADER}{body}"))
    }

    pub fn from_toml(s: &str) -> Result<Self, DomainError> {
        toml::from_str(s).map_err(|e| DomainError::InvalidProvenance(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::template::{FileSpec, TemplateContent, TemplateNode, VariableSpec};
    use crate::domain::value_objects::{DataValue, VariableType};

    fn template() -> Template {
        Template::builder()
            .id(TemplateId::parse("demo@1.0.0").unwrap())
            .variable(VariableSpec::new("name", VariableType::Str))
            .variable(VariableSpec::new("token", VariableType::Str).secret())
            .add_node(TemplateNode::File(FileSpec::new(
                RelativePath::try_new("README.md").unwrap(),
                TemplateContent::Parameterized("{{name}}".into()),
            )))
            .source("/templates/demo")
            .build()
            .unwrap()
    }

    fn record() -> ProvenanceRecord {
        let answers = DataContext::new()
            .with("name", "Demo")
            .with("token", "s3cret")
            .with("docs", true)
            .with("count", 3i64);
        let mut files = BTreeMap::new();
        files.insert(
            RelativePath::try_new("src/pkg/__init__.py").unwrap(),
            ContentHash::of(b""),
        );
        files.insert(
            RelativePath::try_new("README.md").unwrap(),
            ContentHash::of(b"Demo"),
        );
        ProvenanceRecord::new(&template(), &answers, files)
    }

    #[test]
    fn secrets_are_not_recorded() {
        let rec = record();
        assert!(rec.answers.get("token").is_none());
        assert_eq!(rec.answers.get("name"), Some(&DataValue::from("Demo")));
    }

    #[test]
    fn toml_round_trip_preserves_types() {
        let rec = record();
        let text = rec.to_toml().unwrap();
        let back = ProvenanceRecord::from_toml(&text).unwrap();
        assert_eq!(back, rec);
        assert_eq!(back.answers.get("docs"), Some(&DataValue::Bool(true)));
        assert_eq!(back.answers.get("count"), Some(&DataValue::Int(3)));
    }

    #[test]
    fn serialization_is_deterministic() {
        assert_eq!(record().to_toml().unwrap(), record().to_toml().unwrap());
    }

    #[test]
    fn layout_is_human_readable() {
        let text = record().to_toml().unwrap();
        assert!(text.starts_with("# Written by recast"));
        assert!(text.contains("[template]"));
        assert!(text.contains("id = \"demo\""));
        assert!(text.contains("version = \"1.0.0\""));
        assert!(text.contains("[answers]"));
        assert!(text.contains("[files]"));
        assert!(text.contains("src/pkg/__init__.py"));
        assert!(text.find("README.md").unwrap() < text.find("src/pkg").unwrap());
    }

    #[test]
    fn garbage_is_invalid_provenance() {
        assert!(matches!(
            ProvenanceRecord::from_toml("not = [valid"),
            Err(DomainError::InvalidProvenance(_))
        ));
        assert!(ProvenanceRecord::from_toml("[template]\nid = \"x\"\n").is_err());
    }

    #[test]
    fn rejects_escaping_paths() {
        let text = format!(
            "[template]\nid = \"x\"\nversion = \"1.0.0\"\nfingerprint = \"{}\"\n\n[files]\n\"../evil\" = \"{}\"\n",
            ContentHash::of(b""),
            ContentHash::of(b"")
        );
        assert!(ProvenanceRecord::from_toml(&text).is_err());
    }
}
