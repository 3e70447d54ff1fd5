//! Template domain aggregate.
//!
//! A [`Template`] is what a loader produces from a template source directory:
//! identity and version, declared variables, and an ordered tree of file and
//! directory nodes whose paths and bodies may contain placeholders.
//!
//! ```text
//! Template (aggregate root)
//! ├── TemplateId         name + SemVer version
//! ├── TemplateMetadata   human-readable info
//! ├── Vec<VariableSpec>  declared inputs, in declaration order
//! └── TemplateTree
//!      └── Vec<TemplateNode>
//!           ├── FileSpec       (path, content, permissions, conditions)
//!           └── DirectorySpec  (path, conditions)
//! ```
//!
//! Nothing here renders. Evaluating placeholders and conditions is the
//! renderer port's job; the application layer drives it.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use semver::Version;

use crate::domain::entities::common::{Permissions, RelativePath};
use crate::domain::error::DomainError;
use crate::domain::value_objects::{ContentHash, DataValue, VariableType};

/// Manifest schema this build understands.
pub const SUPPORTED_SCHEMA: u32 = 1;

/// Files ending in this suffix are rendered and the suffix stripped.
pub const DEFAULT_TEMPLATES_SUFFIX: &str = ".hbs";

/// Name of the manifest at the root of a template source.
pub const MANIFEST_FILE: &str = "template.toml";

// ============================================================================
// Template Identity
// ============================================================================

/// Identity of a template: `name@version`.
///
/// Two templates with the same name are the same template at different
/// points in time; the updater refuses to move a project across names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateId {
    name: String,
    version: Version,
}

impl TemplateId {
    pub fn new(name: impl Into<String>, version: Version) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "template.id" });
        }
        if name.contains('@') {
            return Err(DomainError::InvalidTemplate(format!(
                "template id cannot contain '@': {name}"
            )));
        }
        Ok(Self { name, version })
    }

    /// Parse `name@version`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (name, version) = s.split_once('@').ok_or_else(|| {
            DomainError::InvalidTemplate(format!("expected name@version, got '{s}'"))
        })?;
        let version = Version::parse(version).map_err(|e| {
            DomainError::InvalidTemplate(format!("bad version in '{s}': {e}"))
        })?;
        Self::new(name, version)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

// ============================================================================
// Core Template Aggregate
// ============================================================================

#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateId,
    pub schema: u32,
    /// Oldest recast able to render this template.
    pub min_version: Option<Version>,
    pub metadata: TemplateMetadata,
    pub variables: Vec<VariableSpec>,
    pub tree: TemplateTree,
    /// Hash over every source file, in walk order.
    pub fingerprint: ContentHash,
    /// Where the template was loaded from, when it came from disk.
    pub source: Option<PathBuf>,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Can this build render the template at all?
    pub fn check_compatibility(&self, engine: &Version) -> Result<(), DomainError> {
        if self.schema != SUPPORTED_SCHEMA {
            return Err(DomainError::UnsupportedSchema {
                found: self.schema,
                supported: SUPPORTED_SCHEMA,
            });
        }
        if let Some(min) = &self.min_version {
            if min > engine {
                return Err(DomainError::VersionIncompatible {
                    template: self.id.to_string(),
                    reason: format!("requires recast >= {min}, this is {engine}"),
                });
            }
        }
        Ok(())
    }

    /// Can a project generated from `recorded` move to this template?
    ///
    /// Same name, and never backwards.
    pub fn check_upgrade_from(&self, recorded: &TemplateId) -> Result<(), DomainError> {
        if self.id.name() != recorded.name() {
            return Err(DomainError::TemplateMismatch {
                recorded: recorded.name().to_string(),
                found: self.id.name().to_string(),
            });
        }
        if self.id.version() < recorded.version() {
            return Err(DomainError::VersionIncompatible {
                template: self.id.to_string(),
                reason: format!(
                    "project was generated from {recorded}; refusing to downgrade"
                ),
            });
        }
        Ok(())
    }

    /// Structural checks that don't need a renderer.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.tree.is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "template '{}' has no files",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for node in &self.tree.nodes {
            if !seen.insert(node.path().as_str()) {
                return Err(DomainError::DuplicatePath {
                    path: node.path().to_string(),
                });
            }
        }

        let mut names = HashSet::new();
        for var in &self.variables {
            var.validate()?;
            if !names.insert(var.name.as_str()) {
                return Err(DomainError::InvalidTemplate(format!(
                    "variable '{}' declared twice",
                    var.name
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`Template`].
///
/// Loaders use it; tests use it to assemble templates in memory.
#[derive(Default)]
pub struct TemplateBuilder {
    id: Option<TemplateId>,
    schema: Option<u32>,
    min_version: Option<Version>,
    metadata: Option<TemplateMetadata>,
    variables: Vec<VariableSpec>,
    tree: TemplateTree,
    fingerprint: Option<ContentHash>,
    source: Option<PathBuf>,
}

impl TemplateBuilder {
    pub fn id(mut self, id: TemplateId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn schema(mut self, schema: u32) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn min_version(mut self, version: Version) -> Self {
        self.min_version = Some(version);
        self
    }

    pub fn metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn variable(mut self, spec: VariableSpec) -> Self {
        self.variables.push(spec);
        self
    }

    pub fn tree(mut self, tree: TemplateTree) -> Self {
        self.tree = tree;
        self
    }

    pub fn add_node(mut self, node: TemplateNode) -> Self {
        self.tree.push(node);
        self
    }

    pub fn fingerprint(mut self, fingerprint: ContentHash) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Build and validate.
    ///
    /// Without an explicit fingerprint one is derived from the tree's
    /// paths, which is enough for in-memory templates.
    pub fn build(self) -> Result<Template, DomainError> {
        let id = self
            .id
            .ok_or(DomainError::MissingRequiredField { field: "template.id" })?;
        let metadata = self
            .metadata
            .unwrap_or_else(|| TemplateMetadata::new(id.name()));
        let fingerprint = self.fingerprint.unwrap_or_else(|| {
            let mut fp = crate::domain::value_objects::Fingerprint::new();
            fp.add(&id.to_string(), &[]);
            for node in &self.tree.nodes {
                let body: &[u8] = match node {
                    TemplateNode::File(f) => f.content.as_bytes(),
                    TemplateNode::Directory(_) => &[],
                };
                fp.add(node.path().as_str(), body);
            }
            fp.finish()
        });

        let template = Template {
            id,
            schema: self.schema.unwrap_or(SUPPORTED_SCHEMA),
            min_version: self.min_version,
            metadata,
            variables: self.variables,
            tree: self.tree,
            fingerprint,
            source: self.source,
        };
        template.validate()?;
        Ok(template)
    }
}

// ============================================================================
// Template Metadata
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateMetadata {
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
}

impl TemplateMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

// ============================================================================
// Variables
// ============================================================================

/// A template expression that decides inclusion (`include_docs`,
/// `(eq license "MIT")`). Evaluated by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition(String);

impl Condition {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into().trim().to_string())
    }

    pub fn expr(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared input variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub name: String,
    pub ty: VariableType,
    /// Strings may contain placeholders over earlier answers.
    pub default: Option<DataValue>,
    pub help: Option<String>,
    pub choices: Vec<DataValue>,
    /// Expression whose non-empty render is an error message.
    pub validator: Option<String>,
    /// When false the variable is not asked and takes its default.
    pub when: Option<Condition>,
    /// Kept out of provenance.
    pub secret: bool,
}

impl VariableSpec {
    pub fn new(name: impl Into<String>, ty: VariableType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            help: None,
            choices: Vec::new(),
            validator: None,
            when: None,
            secret: false,
        }
    }

    pub fn with_default(mut self, default: impl Into<DataValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_choices(mut self, choices: Vec<DataValue>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_validator(mut self, expr: impl Into<String>) -> Self {
        self.validator = Some(expr.into());
        self
    }

    pub fn with_when(mut self, cond: Condition) -> Self {
        self.when = Some(cond);
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// No default means the user must answer.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Coerce a raw answer to the declared type and check `choices`.
    pub fn accept(&self, raw: &DataValue) -> Result<DataValue, DomainError> {
        let value = raw
            .coerce(self.ty)
            .map_err(|reason| DomainError::InvalidDataContext {
                variable: self.name.clone(),
                reason,
            })?;

        if !self.choices.is_empty() && !self.choices.contains(&value) {
            let allowed = self
                .choices
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(DomainError::InvalidDataContext {
                variable: self.name.clone(),
                reason: format!("'{value}' is not one of: {allowed}"),
            });
        }

        Ok(value)
    }

    fn validate(&self) -> Result<(), DomainError> {
        let valid_name = !self.name.is_empty()
            && !self.name.starts_with('_')
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(DomainError::InvalidTemplate(format!(
                "invalid variable name '{}' (use letters, digits, '_'; no leading '_')",
                self.name
            )));
        }

        for choice in &self.choices {
            choice
                .coerce(self.ty)
                .map_err(|e| DomainError::InvalidTemplate(format!("{}: {e}", self.name)))?;
        }

        // String defaults are rendered first and checked at resolution time.
        if let Some(default) = &self.default {
            if default.type_of() != VariableType::Str {
                default.coerce(self.ty).map_err(|e| {
                    DomainError::InvalidTemplate(format!("default for {}: {e}", self.name))
                })?;
            }
        }

        Ok(())
    }
}

// ============================================================================
// Template Tree
// ============================================================================

/// Ordered list of nodes. Loaders emit them in sorted walk order so
/// rendering is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TemplateTree {
    pub nodes: Vec<TemplateNode>,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TemplateNode) {
        self.nodes.push(node);
    }

    pub fn with_node(mut self, node: TemplateNode) -> Self {
        self.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn files(&self) -> impl Iterator<Item = &FileSpec> {
        self.nodes.iter().filter_map(|n| match n {
            TemplateNode::File(f) => Some(f),
            TemplateNode::Directory(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum TemplateNode {
    File(FileSpec),
    Directory(DirectorySpec),
}

impl TemplateNode {
    /// Unrendered path (placeholders intact, template suffix stripped).
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        match self {
            Self::File(f) => &f.conditions,
            Self::Directory(d) => &d.conditions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSpec {
    pub path: RelativePath,
    pub content: TemplateContent,
    pub permissions: Permissions,
    /// All must hold for the file to be emitted.
    pub conditions: Vec<Condition>,
}

impl FileSpec {
    pub fn new(path: RelativePath, content: TemplateContent) -> Self {
        Self {
            path,
            content,
            permissions: Permissions::read_write(),
            conditions: Vec::new(),
        }
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }

    pub fn when(mut self, cond: Condition) -> Self {
        self.conditions.push(cond);
        self
    }
}

/// A directory that exists in the template even when empty.
#[derive(Debug, Clone)]
pub struct DirectorySpec {
    pub path: RelativePath,
    pub conditions: Vec<Condition>,
}

impl DirectorySpec {
    pub fn new(path: RelativePath) -> Self {
        Self {
            path,
            conditions: Vec::new(),
        }
    }

    pub fn when(mut self, cond: Condition) -> Self {
        self.conditions.push(cond);
        self
    }
}

// ============================================================================
// Content Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateContent {
    /// Copied byte for byte.
    Literal(Vec<u8>),
    /// Rendered against the data context.
    Parameterized(String),
}

impl TemplateContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Literal(b) => b,
            Self::Parameterized(s) => s.as_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> RelativePath {
        RelativePath::try_new(s).unwrap()
    }

    fn minimal() -> TemplateBuilder {
        Template::builder()
            .id(TemplateId::parse("demo@1.2.0").unwrap())
            .add_node(TemplateNode::File(FileSpec::new(
                path("README.md"),
                TemplateContent::Parameterized("# {{name}}".into()),
            )))
    }

    #[test]
    fn template_id_parsing() {
        let id = TemplateId::parse("python-package@2.0.0").unwrap();
        assert_eq!(id.name(), "python-package");
        assert_eq!(id.version(), &Version::new(2, 0, 0));
        assert_eq!(id.to_string(), "python-package@2.0.0");

        assert!(TemplateId::parse("no-version").is_err());
        assert!(TemplateId::parse("x@notsemver").is_err());
        assert!(TemplateId::parse("@1.0.0").is_err());
    }

    #[test]
    fn builder_rejects_empty_tree() {
        let result = Template::builder()
            .id(TemplateId::parse("demo@1.0.0").unwrap())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_duplicate_paths() {
        let result = minimal()
            .add_node(TemplateNode::File(FileSpec::new(
                path("README.md"),
                TemplateContent::Literal(b"x".to_vec()),
            )))
            .build();
        assert!(matches!(result, Err(DomainError::DuplicatePath { .. })));
    }

    #[test]
    fn builder_rejects_duplicate_variables() {
        let result = minimal()
            .variable(VariableSpec::new("name", VariableType::Str))
            .variable(VariableSpec::new("name", VariableType::Bool))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn variable_names_must_be_identifiers() {
        let result = minimal()
            .variable(VariableSpec::new("bad-name", VariableType::Str))
            .build();
        assert!(result.is_err());

        let result = minimal()
            .variable(VariableSpec::new("_reserved", VariableType::Str))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn choices_must_match_declared_type() {
        let result = minimal()
            .variable(
                VariableSpec::new("n", VariableType::Int)
                    .with_choices(vec!["one".into()]),
            )
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn accept_coerces_and_checks_choices() {
        let spec = VariableSpec::new("python_version", VariableType::Str)
            .with_choices(vec!["3.11".into(), "3.12".into()]);
        assert_eq!(spec.accept(&"3.12".into()).unwrap(), DataValue::from("3.12"));
        assert!(matches!(
            spec.accept(&"2.7".into()),
            Err(DomainError::InvalidDataContext { .. })
        ));

        let flag = VariableSpec::new("include_docs", VariableType::Bool);
        assert_eq!(flag.accept(&"true".into()).unwrap(), DataValue::Bool(true));
        assert!(flag.accept(&"sometimes".into()).is_err());
    }

    #[test]
    fn schema_and_min_version_compatibility() {
        let engine = Version::new(0, 1, 0);

        let t = minimal().build().unwrap();
        assert!(t.check_compatibility(&engine).is_ok());

        let t = minimal().schema(2).build().unwrap();
        assert!(matches!(
            t.check_compatibility(&engine),
            Err(DomainError::UnsupportedSchema { found: 2, .. })
        ));

        let t = minimal().min_version(Version::new(9, 0, 0)).build().unwrap();
        assert!(matches!(
            t.check_compatibility(&engine),
            Err(DomainError::VersionIncompatible { .. })
        ));
    }

    #[test]
    fn upgrade_rules() {
        let t = minimal().build().unwrap();

        assert!(t.check_upgrade_from(&TemplateId::parse("demo@1.0.0").unwrap()).is_ok());
        assert!(t.check_upgrade_from(&TemplateId::parse("demo@1.2.0").unwrap()).is_ok());
        assert!(matches!(
            t.check_upgrade_from(&TemplateId::parse("demo@2.0.0").unwrap()),
            Err(DomainError::VersionIncompatible { .. })
        ));
        assert!(matches!(
            t.check_upgrade_from(&TemplateId::parse("other@1.0.0").unwrap()),
            Err(DomainError::TemplateMismatch { .. })
        ));
    }

    #[test]
    fn derived_fingerprint_tracks_content() {
        let a = minimal().build().unwrap();
        let b = minimal().build().unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);

        let c = Template::builder()
            .id(TemplateId::parse("demo@1.2.0").unwrap())
            .add_node(TemplateNode::File(FileSpec::new(
                path("README.md"),
                TemplateContent::Parameterized("# {{other}}".into()),
            )))
            .build()
            .unwrap();
        assert_ne!(a.fingerprint, c.fingerprint);
    }
}
