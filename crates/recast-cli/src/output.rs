//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Colour of a per-file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Neutral,
    Attention,
    Bad,
}

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // The flag wins over config; Auto then resolves on the terminal.
        let requested = match args.output_format {
            OutputFormat::Auto => OutputFormat::from_config(&config.output.format),
            explicit => explicit,
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// One file line: `  <tag> <path>`, tag padded so paths line up.
    pub fn entry(&self, tag: &str, path: &str, tone: Tone) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let tag = format!("{tag:>11}");
        let line = if self.no_color {
            format!("  {tag} {path}")
        } else {
            let tag = match tone {
                Tone::Good => tag.green().to_string(),
                Tone::Neutral => tag.dimmed().to_string(),
                Tone::Attention => tag.yellow().to_string(),
                Tone::Bad => tag.red().to_string(),
            };
            format!("  {tag} {path}")
        };
        self.term.write_line(&line)
    }

    /// Pretty JSON document on stdout.  Written even in quiet mode: it is
    /// the result, not commentary.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// `true` when results go out as JSON.
    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager(format: OutputFormat, no_color: bool, config: &AppConfig) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color,
            config: None,
            output_format: format,
        };
        OutputManager::new(&args, config)
    }

    #[test]
    fn explicit_format_is_kept() {
        let out = make_manager(OutputFormat::Plain, false, &AppConfig::default());
        assert_eq!(out.format(), OutputFormat::Plain);
        assert!(!out.is_json());
    }

    #[test]
    fn config_format_applies_when_flag_is_auto() {
        let mut config = AppConfig::default();
        config.output.format = "json".into();
        let out = make_manager(OutputFormat::Auto, false, &config);
        assert!(out.is_json());
    }

    #[test]
    fn flag_beats_config_format() {
        let mut config = AppConfig::default();
        config.output.format = "json".into();
        let out = make_manager(OutputFormat::Human, false, &config);
        assert_eq!(out.format(), OutputFormat::Human);
    }

    #[test]
    fn color_follows_flag_and_config() {
        let config = AppConfig::default();
        assert!(make_manager(OutputFormat::Human, false, &config).supports_color());
        assert!(!make_manager(OutputFormat::Human, true, &config).supports_color());
        assert!(!make_manager(OutputFormat::Plain, false, &config).supports_color());

        let mut config = AppConfig::default();
        config.output.no_color = true;
        assert!(!make_manager(OutputFormat::Human, false, &config).supports_color());
    }

    #[test]
    fn writes_do_not_fail_without_a_terminal() {
        let out = make_manager(OutputFormat::Plain, true, &AppConfig::default());
        assert!(out.entry("created", "README.md", Tone::Good).is_ok());
        assert!(out.json(&serde_json::json!({ "ok": true })).is_ok());
    }
}
