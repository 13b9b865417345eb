//! Output management and formatting.

use std::{
    io::{self, IsTerminal},
    time::Duration,
};

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};

/// Manages CLI output based on the global flags.
#[derive(Clone)]
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs) -> Self {
        // Auto becomes Human on a TTY, Plain when piped.
        let resolved_format = if args.output_format == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            args.output_format
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.color_disabled() || resolved_format == OutputFormat::Plain,
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

    /// Data the user asked for (`config --get`, `--format json`, ...).
    /// Never suppressed.
    pub fn data(&self, msg: &str) -> io::Result<()> {
        self.term.write_line(msg)
    }

    /// Pretty JSON for a serialisable value. Never suppressed.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> io::Result<()> {
        let rendered = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&rendered)
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

    /// Dimmed secondary text, e.g. hints under a result.
    pub fn hint(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.dimmed().to_string()
        };
        self.term.write_line(&line)
    }

    /// `  label: value` with the label padded to `width`.
    pub fn field(&self, label: &str, value: &str, width: usize) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let label = format!("{label}:");
        let line = if self.no_color {
            format!("  {label:<width$} {value}", width = width + 1)
        } else {
            format!("  {:<width$} {value}", label.bold(), width = width + 1)
        };
        self.term.write_line(&line)
    }

    /// Left-aligned columns sized to the widest cell.
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        for line in render_table(headers, rows, !self.no_color) {
            self.term.write_line(&line)?;
        }
        Ok(())
    }

    /// CSV with a header line. Never suppressed.
    pub fn csv(&self, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
        self.term.write_line(&csv_line(headers.iter().copied()))?;
        for row in rows {
            self.term.write_line(&csv_line(row.iter().map(String::as_str)))?;
        }
        Ok(())
    }

    /// A spinner on stderr for a long step; hidden when quiet, not on a
    /// terminal, or producing JSON.
    pub fn spinner(&self, msg: impl Into<String>) -> Spinner {
        let visible = !self.quiet
            && self.resolved_format == OutputFormat::Human
            && io::stderr().is_terminal();
        Spinner::new(msg.into(), visible, self.no_color)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>], color: bool) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let header = pad_row(headers.iter().copied(), &widths);
    let rule = widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("  ");
    let mut lines = vec![
        if color { header.bold().to_string() } else { header },
        rule,
    ];
    for row in rows {
        lines.push(pad_row(row.iter().map(String::as_str), &widths));
    }
    lines
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn csv_line<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells
        .map(|cell| {
            if cell.contains([',', '"', '\n']) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

// ── Spinner ───────────────────────────────────────────────────────────────────

pub struct Spinner {
    bar: ProgressBar,
    no_color: bool,
}

impl Spinner {
    fn new(msg: String, visible: bool, no_color: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(msg);
        Self { bar, no_color }
    }

    /// Stop and leave a `✓` line behind (visible spinners only).
    pub fn succeed(self, msg: &str) {
        let line = if self.no_color {
            format!("\u{2713} {msg}")
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg)
        };
        self.bar.finish_with_message(line);
    }

    /// Stop and remove the spinner line.
    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager(quiet: bool, no_color: bool) -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
            output_format: OutputFormat::Human,
            yes: false,
        };
        OutputManager::new(&args)
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, true);
        assert!(out.print("hello").is_ok());
        assert!(out.quiet);
    }

    #[test]
    fn no_color_flag_reported() {
        assert!(!make_manager(false, false).no_color);
        assert!(make_manager(false, true).no_color);
    }

    #[test]
    fn json_format_disables_color() {
        let args = GlobalArgs {
            verbose: 0,
            quiet: false,
            no_color: false,
            config: None,
            output_format: OutputFormat::Json,
            yes: false,
        };
        let out = OutputManager::new(&args);
        assert_eq!(out.format(), OutputFormat::Json);
        assert!(out.no_color);
    }

    #[test]
    fn table_columns_align_to_widest_cell() {
        let lines = render_table(
            &["ID", "NAME"],
            &[
                vec!["react".into(), "React Element".into()],
                vec!["vanilla".into(), "Vanilla JS".into()],
            ],
            false,
        );
        assert_eq!(lines[0], "ID       NAME");
        assert_eq!(lines[1], "───────  ─────────────");
        assert_eq!(lines[2], "react    React Element");
        assert_eq!(lines[3], "vanilla  Vanilla JS");
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let line = csv_line(["react", "React, TSX", "say \"hi\""].into_iter());
        assert_eq!(line, "react,\"React, TSX\",\"say \"\"hi\"\"\"");
    }

    #[test]
    fn hidden_spinner_finishes_quietly() {
        let out = make_manager(true, true);
        let spinner = out.spinner("Installing dependencies...");
        spinner.succeed("Dependencies installed");
    }
}
