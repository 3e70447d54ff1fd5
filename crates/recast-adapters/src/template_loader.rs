//! Filesystem-based template loader.
//!
//! Reads one template source directory: its `template.toml` manifest plus
//! every file beneath it, turned into a domain [`Template`].
//!
//! # Directory layout expected
//!
//! ```text
//! python-package/
//! ├── template.toml                       ← manifest (required)
//! ├── README.md.hbs                       ← rendered, written as README.md
//! ├── src/
//! │   └── {{project_slug}}/
//! │       └── __init__.py.hbs
//! └── .github/workflows/ci.yml            ← copied byte for byte
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! id               = "python-package"
//! version          = "1.2.0"
//! schema           = 1
//! templates_suffix = ".hbs"        # optional, this is the default
//! exclude          = ["hooks"]     # optional path prefixes to skip
//! min_version      = "0.1.0"       # optional, oldest recast that can render it
//!
//! [metadata]
//! name        = "Python package"
//! description = "A src-layout Python package."   # optional
//! author      = "recast"                          # optional
//! tags        = ["python"]                        # optional
//!
//! # Variables are asked in declaration order.
//! [variables.project_name]
//! type = "str"
//! help = "Human readable project name"
//!
//! [variables.project_slug]
//! type    = "str"
//! default = "{{snake_case project_name}}"
//!
//! # Optional per-path rules. `path` matches a file or a directory prefix.
//! [[files]]
//! path = "docs"
//! when = "include_docs"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use semver::Version;
use serde::Deserialize;
use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

use recast_core::{
    application::{ApplicationError, ports::TemplateLoader},
    domain::{
        Condition, ContentHash, DEFAULT_TEMPLATES_SUFFIX, DataValue, DirectorySpec, FileSpec,
        Fingerprint, MANIFEST_FILE, PROVENANCE_FILE, RelativePath, SUPPORTED_SCHEMA, Template,
        TemplateContent, TemplateId, TemplateMetadata, TemplateNode, VariableSpec, VariableType,
    },
    error::{RecastError, RecastResult},
};

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateManifest {
    pub template: TemplateSection,
    pub metadata: Option<MetadataSection>,
    /// `[variables.<name>]` tables, in file order.
    #[serde(default)]
    pub variables: toml::Table,
    #[serde(default)]
    pub files: Vec<FileRule>,
}

/// `[template]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    pub id: String,
    /// SemVer string, e.g. `"1.0.0"`.
    pub version: String,
    #[serde(default = "default_schema")]
    pub schema: u32,
    pub templates_suffix: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub min_version: Option<String>,
}

fn default_schema() -> u32 {
    SUPPORTED_SCHEMA
}

/// `[metadata]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataSection {
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// One `[variables.<name>]` table.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct VariableEntry {
    #[serde(rename = "type", default)]
    pub ty: Option<VariableType>,
    pub default: Option<DataValue>,
    pub help: Option<String>,
    #[serde(default)]
    pub choices: Vec<DataValue>,
    pub validator: Option<String>,
    pub when: Option<String>,
    #[serde(default)]
    pub secret: bool,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileRule {
    /// File or directory prefix, relative to the template root.
    pub path: String,
    /// Overrides suffix detection.
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,
    pub when: Option<String>,
}

/// Controls how a file's content is treated during generation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Copied verbatim.
    Literal,
    /// Rendered against the data context.
    Parameterized,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads a [`Template`] from a directory with a `template.toml`.
///
/// Stateless; each call re-reads the source so an update always sees the
/// template as it is now.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemTemplateLoader;

impl FilesystemTemplateLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a manifest without walking the tree.
    pub fn read_manifest(source: &Path) -> RecastResult<TemplateManifest> {
        let manifest_path = source.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(ApplicationError::TemplateNotFound {
                path: source.to_path_buf(),
                reason: format!("no {MANIFEST_FILE}"),
            }
            .into());
        }

        let raw = fs::read_to_string(&manifest_path).map_err(|e| load_error(&manifest_path, e))?;
        toml::from_str(&raw).map_err(|e| load_error(&manifest_path, e))
    }

    fn build(&self, source: &Path, manifest: TemplateManifest) -> RecastResult<Template> {
        let version = Version::parse(&manifest.template.version)
            .map_err(|e| load_error(source, format!("template.version: {e}")))?;
        let id = TemplateId::new(&manifest.template.id, version)?;

        let min_version = manifest
            .template
            .min_version
            .as_deref()
            .map(Version::parse)
            .transpose()
            .map_err(|e| load_error(source, format!("template.min_version: {e}")))?;

        let metadata = match &manifest.metadata {
            Some(m) => {
                let mut meta =
                    TemplateMetadata::new(&m.name).tags(m.tags.clone().unwrap_or_default());
                if let Some(description) = &m.description {
                    meta = meta.description(description);
                }
                if let Some(author) = &m.author {
                    meta = meta.author(author);
                }
                meta
            }
            None => TemplateMetadata::new(id.name()),
        };

        let variables = parse_variables(source, &manifest.variables)?;
        let rules = parse_rules(&manifest.files)?;
        let (nodes, fingerprint) = walk_tree(source, &manifest, &rules)?;

        let mut builder = Template::builder()
            .id(id)
            .schema(manifest.template.schema)
            .metadata(metadata)
            .fingerprint(fingerprint)
            .source(source);
        if let Some(min) = min_version {
            builder = builder.min_version(min);
        }
        for var in variables {
            builder = builder.variable(var);
        }
        for node in nodes {
            builder = builder.add_node(node);
        }

        Ok(builder.build()?)
    }
}

impl TemplateLoader for FilesystemTemplateLoader {
    #[instrument(skip(self), fields(source = %source.display()))]
    fn load(&self, source: &Path) -> RecastResult<Template> {
        if !source.is_dir() {
            return Err(ApplicationError::TemplateNotFound {
                path: source.to_path_buf(),
                reason: "not a directory".into(),
            }
            .into());
        }

        // Recorded in provenance, so make it independent of the cwd.
        let source = source
            .canonicalize()
            .map_err(|e| load_error(source, e))?;

        let manifest = Self::read_manifest(&source)?;
        let template = self.build(&source, manifest)?;

        debug!(
            id = %template.id,
            files = template.tree.len(),
            variables = template.variables.len(),
            "Loaded template"
        );
        Ok(template)
    }
}

// ── Manifest parsing ──────────────────────────────────────────────────────────

fn parse_variables(source: &Path, table: &toml::Table) -> RecastResult<Vec<VariableSpec>> {
    let mut specs = Vec::with_capacity(table.len());

    for (name, value) in table {
        let entry: VariableEntry = value
            .clone()
            .try_into()
            .map_err(|e| load_error(source, format!("variables.{name}: {e}")))?;

        let mut spec = VariableSpec::new(name.clone(), entry.ty.unwrap_or(VariableType::Str))
            .with_choices(entry.choices);
        if let Some(default) = entry.default {
            spec = spec.with_default(default);
        }
        if let Some(help) = entry.help {
            spec = spec.with_help(help);
        }
        if let Some(validator) = entry.validator {
            spec = spec.with_validator(validator);
        }
        if let Some(when) = entry.when {
            spec = spec.with_when(Condition::new(when));
        }
        if entry.secret {
            spec = spec.secret();
        }
        specs.push(spec);
    }

    Ok(specs)
}

/// A `[[files]]` entry with its path validated.
struct Rule {
    prefix: RelativePath,
    file_type: Option<FileType>,
    when: Option<Condition>,
}

fn parse_rules(rules: &[FileRule]) -> RecastResult<Vec<Rule>> {
    rules
        .iter()
        .map(|r| {
            Ok(Rule {
                prefix: RelativePath::try_new(&r.path)?,
                file_type: r.file_type,
                when: r.when.clone().map(Condition::new),
            })
        })
        .collect()
}

/// Rules that apply to a path, matched against both its source form and
/// its output form (suffix stripped).
/// Rules whose prefix covers either path. The result borrows only `rules`.
fn matching_rules<'a>(
    rules: &'a [Rule],
    source_path: &RelativePath,
    output_path: &RelativePath,
) -> Vec<&'a Rule> {
    rules
        .iter()
        .filter(|r| source_path.starts_with(&r.prefix) || output_path.starts_with(&r.prefix))
        .collect()
}

// ── Tree walk ─────────────────────────────────────────────────────────────────

fn walk_tree(
    source: &Path,
    manifest: &TemplateManifest,
    rules: &[Rule],
) -> RecastResult<(Vec<TemplateNode>, ContentHash)> {
    let suffix = manifest
        .template
        .templates_suffix
        .as_deref()
        .unwrap_or(DEFAULT_TEMPLATES_SUFFIX);
    let excluded = manifest
        .template
        .exclude
        .iter()
        .map(RelativePath::try_new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut nodes = Vec::new();
    let mut fingerprint = Fingerprint::new();

    let manifest_path = source.join(MANIFEST_FILE);
    let manifest_bytes = fs::read(&manifest_path).map_err(|e| load_error(&manifest_path, e))?;
    fingerprint.add(MANIFEST_FILE, &manifest_bytes);

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| load_error(source, format!("directory walk error: {e}")))?;
        let abs_path = entry.path();
        let rel_raw = abs_path
            .strip_prefix(source)
            .map_err(|e| load_error(abs_path, e))?;
        let rel = RelativePath::from_path(rel_raw)?;

        if rel.as_str() == MANIFEST_FILE || rel.as_str() == PROVENANCE_FILE {
            continue;
        }
        if excluded.iter().any(|prefix| rel.starts_with(prefix)) {
            trace!(path = %rel, "Excluded by manifest");
            continue;
        }

        if entry.file_type().is_dir() {
            // Only empty directories need a node; others come with their files.
            let empty = fs::read_dir(abs_path)
                .map_err(|e| load_error(abs_path, e))?
                .next()
                .is_none();
            if empty {
                let mut spec = DirectorySpec::new(rel.clone());
                for rule in matching_rules(rules, &rel, &rel) {
                    if let Some(when) = &rule.when {
                        spec = spec.when(when.clone());
                    }
                }
                nodes.push(TemplateNode::Directory(spec));
            }
            continue;
        }

        if !entry.file_type().is_file() {
            continue; // Symlinks and special files are not template content.
        }

        let bytes = fs::read(abs_path).map_err(|e| load_error(abs_path, e))?;
        fingerprint.add(rel.as_str(), &bytes);

        let (output, has_suffix) = match rel.as_str().strip_suffix(suffix) {
            Some(stripped)
                if !suffix.is_empty() && !stripped.is_empty() && !stripped.ends_with('/') =>
            {
                (RelativePath::try_new(stripped)?, true)
            }
            _ => (rel.clone(), false),
        };

        let applicable = matching_rules(rules, &rel, &output);
        let file_type = applicable
            .iter()
            .rev()
            .find_map(|r| r.file_type)
            .unwrap_or(if has_suffix {
                FileType::Parameterized
            } else {
                FileType::Literal
            });

        let content = match file_type {
            FileType::Literal => TemplateContent::Literal(bytes),
            FileType::Parameterized => TemplateContent::Parameterized(
                String::from_utf8(bytes)
                    .map_err(|_| load_error(abs_path, "templated file is not valid UTF-8"))?,
            ),
        };

        let mut spec = FileSpec::new(output, content);
        if is_executable(abs_path) {
            spec = spec.executable();
        }
        for rule in applicable {
            if let Some(when) = &rule.when {
                spec = spec.when(when.clone());
            }
        }
        nodes.push(TemplateNode::File(spec));
    }

    Ok((nodes, fingerprint.finish()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

fn load_error(path: &Path, reason: impl ToString) -> RecastError {
    ApplicationError::TemplateLoad {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
    .into()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
