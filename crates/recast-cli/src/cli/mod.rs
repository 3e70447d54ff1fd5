//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use recast_core::domain::ConflictMode;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "recast",
    bin_name = "recast",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate projects from templates and keep them up to date",
    long_about = "recast renders a template directory into a new project and records \
                  how it did so.  Later, `recast update` brings the project up to the \
                  current template while leaving your own edits alone.",
    after_help = "EXAMPLES:\n\
        \x20 recast generate ./templates/python-package my-lib -d project_name=\"My Lib\"\n\
        \x20 recast update my-lib --defaults\n\
        \x20 recast status my-lib\n\
        \x20 recast completions bash > /usr/share/bash-completion/completions/recast",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a template into a new project.
    #[command(
        visible_alias = "copy",
        about = "Generate a project from a template",
        after_help = "EXAMPLES:\n\
            \x20 recast generate ./tpl my-project\n\
            \x20 recast generate ./tpl my-project -d project_name=\"My Project\" -d include_docs=true\n\
            \x20 recast generate ./tpl my-project --defaults --pretend"
    )]
    Generate(GenerateArgs),

    /// Bring a generated project up to date with its template.
    #[command(
        about = "Update a generated project",
        after_help = "EXAMPLES:\n\
            \x20 recast update                    # project in the current directory\n\
            \x20 recast update my-project --defaults\n\
            \x20 recast update my-project -d include_docs=false --conflict skip"
    )]
    Update(UpdateArgs),

    /// Show which generated files were changed locally.
    #[command(
        about = "Show local changes to generated files",
        after_help = "EXAMPLES:\n\
            \x20 recast status\n\
            \x20 recast status my-project --output-format json"
    )]
    Status(StatusArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 recast completions bash > ~/.local/share/bash-completion/completions/recast\n\
            \x20 recast completions zsh  > ~/.zfunc/_recast\n\
            \x20 recast completions fish > ~/.config/fish/completions/recast.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the recast configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 recast config get update.conflict\n\
            \x20 recast config list\n\
            \x20 recast config path"
    )]
    Config(ConfigCommands),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// How answers are supplied; shared by `generate` and `update`.
#[derive(Debug, Args)]
pub struct AnswerArgs {
    /// Answers as `KEY=VALUE`; repeatable.
    #[arg(
        short = 'd',
        long = "data",
        value_name = "KEY=VALUE",
        help = "Answer for a template variable (repeatable)"
    )]
    pub data: Vec<String>,

    /// Never prompt; unanswered variables take their defaults.
    #[arg(long = "defaults", help = "Use defaults instead of prompting")]
    pub defaults: bool,

    /// Reject `--data` keys the template does not declare.
    #[arg(long = "strict", help = "Fail on data keys the template does not declare")]
    pub strict: bool,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `recast generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Template directory (contains `template.toml`).
    #[arg(value_name = "SOURCE", help = "Template directory")]
    pub source: PathBuf,

    /// Where the project is created.
    #[arg(value_name = "DESTINATION", help = "Destination directory")]
    pub destination: PathBuf,

    #[command(flatten)]
    pub answers: AnswerArgs,

    /// Overwrite existing files, including a previous provenance record.
    #[arg(long = "force", help = "Overwrite existing files")]
    pub force: bool,

    /// Show what would be written without touching the disk.
    #[arg(
        long = "pretend",
        visible_alias = "dry-run",
        help = "Show what would be generated without writing"
    )]
    pub pretend: bool,
}

// ── update ────────────────────────────────────────────────────────────────────

/// Arguments for `recast update`.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Project directory (contains `.recast-answers.toml`).
    #[arg(
        value_name = "PROJECT_DIR",
        default_value = ".",
        help = "Generated project to update"
    )]
    pub project: PathBuf,

    #[command(flatten)]
    pub answers: AnswerArgs,

    /// Template to update from instead of the recorded source.
    #[arg(
        long = "source",
        value_name = "PATH",
        help = "Template directory (defaults to the recorded source)"
    )]
    pub source: Option<PathBuf>,

    /// What to do with template changes to files you edited.
    #[arg(
        long = "conflict",
        value_enum,
        value_name = "MODE",
        help = "How to surface changes to edited files"
    )]
    pub conflict: Option<ConflictArg>,

    /// Show what would change without touching the disk.
    #[arg(
        long = "pretend",
        visible_alias = "dry-run",
        help = "Show what would change without writing"
    )]
    pub pretend: bool,
}

/// `--conflict` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictArg {
    /// Write the template's version next to the file as `<path>.rej`.
    Rej,
    /// Keep your file and only report it.
    Skip,
}

impl From<ConflictArg> for ConflictMode {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Rej => ConflictMode::Rej,
            ConflictArg::Skip => ConflictMode::Skip,
        }
    }
}

// ── status ────────────────────────────────────────────────────────────────────

/// Arguments for `recast status`.
#[derive(Debug, Args)]
pub struct StatusArgs {
    #[arg(value_name = "PROJECT_DIR", default_value = ".", help = "Generated project")]
    pub project: PathBuf,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `recast completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `recast config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `update.conflict`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_collects_repeated_data() {
        let cli = Cli::parse_from([
            "recast",
            "generate",
            "tpl",
            "out",
            "-d",
            "project_name=Demo",
            "--data",
            "include_docs=true",
            "--defaults",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.source, PathBuf::from("tpl"));
        assert_eq!(args.destination, PathBuf::from("out"));
        assert_eq!(
            args.answers.data,
            vec!["project_name=Demo", "include_docs=true"]
        );
        assert!(args.answers.defaults);
        assert!(!args.force);
    }

    #[test]
    fn copy_is_an_alias_for_generate() {
        let cli = Cli::parse_from(["recast", "copy", "tpl", "out", "--pretend"]);
        assert!(matches!(cli.command, Commands::Generate(ref a) if a.pretend));
    }

    #[test]
    fn update_defaults_to_current_directory() {
        let cli = Cli::parse_from(["recast", "update"]);
        let Commands::Update(args) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.project, PathBuf::from("."));
        assert!(args.conflict.is_none());
        assert!(args.source.is_none());
    }

    #[test]
    fn update_conflict_mode() {
        let cli = Cli::parse_from(["recast", "update", "p", "--conflict", "skip"]);
        let Commands::Update(args) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.conflict.map(ConflictMode::from), Some(ConflictMode::Skip));
    }

    #[test]
    fn unknown_conflict_mode_is_rejected() {
        assert!(Cli::try_parse_from(["recast", "update", "--conflict", "merge"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["recast", "-q", "-v", "status"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["recast", "status", "p", "-vv", "--output-format", "json"]);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.output_format, OutputFormat::Json);
    }
}
