use crate::document::{Document, TextBuffer};
use crate::SpellError;
use anyhow::Result;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// A spelling error located for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedError {
    pub line: usize,
    pub column: usize,
    pub word: String,
    pub suggestions: Vec<String>,
    pub context: String,
}

impl ReportedError {
    pub fn locate(document: &Document, error: &SpellError) -> Self {
        let (line, column) = document.line_col(error.range.start());
        let line_range = document.line_extent(error.range);
        let context = document
            .current_text(line_range)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        Self {
            line,
            column,
            word: error.word.clone(),
            suggestions: error.suggestions.clone(),
            context,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub errors: Vec<ReportedError>,
    /// Corrections written back with `--fix`.
    pub fixed: usize,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    files_checked: usize,
    total_errors: usize,
    files: &'a [FileReport],
}

pub fn print_reports(reports: &[FileReport], colored_output: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for report in reports {
                print_text_errors(&report.file, &report.errors, colored_output);
            }
        }
        OutputFormat::Json => println!("{}", render_json(reports)?),
    }
    Ok(())
}

pub fn render_json(reports: &[FileReport]) -> Result<String> {
    let output = JsonOutput {
        files_checked: reports.len(),
        total_errors: reports.iter().map(|r| r.errors.len()).sum(),
        files: reports,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn print_text_errors(file_path: &Path, errors: &[ReportedError], colored_output: bool) {
    if errors.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for error in errors {
        let line_info = format!("{}:{}", error.line, error.column);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                error.word.red().bold(),
                format_context(&error.context, &error.word, colored_output)
            );

            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .take(5)
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {} {}", line_info, error.word, &error.context);

            if !error.suggestions.is_empty() {
                println!("    → {}", error.suggestions.iter().take(5).cloned().collect::<Vec<_>>().join(", "));
            }
        }
    }
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

pub fn print_check_summary(total_errors: usize, files: usize, colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
        return;
    }

    let error_word = plural(total_errors, "error", "errors");
    let file_word = plural(files, "file", "files");
    if colored {
        println!(
            "{} {} {} found in {} {}",
            "✗".red().bold(),
            total_errors.to_string().red().bold(),
            error_word,
            files,
            file_word
        );
    } else {
        println!("✗ {} {} found in {} {}", total_errors, error_word, files, file_word);
    }
}

pub fn print_fix_summary(total_fixed: usize, files: usize, colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
        return;
    }

    let fix_word = plural(total_fixed, "correction", "corrections");
    let file_word = plural(files, "file", "files");
    if colored {
        println!(
            "{} {} {} applied to {} {}",
            "✓".green().bold(),
            total_fixed.to_string().green().bold(),
            fix_word,
            files,
            file_word
        );
    } else {
        println!("✓ {} {} applied to {} {}", total_fixed, fix_word, files, file_word);
    }
}
