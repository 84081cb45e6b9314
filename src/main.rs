use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use livespell::cli::output::{self, FileReport, OutputFormat, ReportedError};
use livespell::{dict, Config, DictionarySpellProvider, FileType, Workspace};
use rayon::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn, Level};
use walkdir::WalkDir;

/// Extensions picked up when walking a directory.
const CHECKED_EXTENSIONS: &[&str] = &[
    "md", "mdx", "markdown", "txt", "rs", "js", "mjs", "cjs", "ts", "mts", "cts", "jsx", "tsx",
    "py", "pyw", "go", "java", "c", "h", "cpp", "cc", "cxx", "hpp", "hh",
];

#[derive(Parser, Debug)]
#[command(name = "livespell")]
#[command(version, about = "Spell-check the comments, strings and prose of your files", long_about = None)]
struct Cli {
    /// Files or directories to check
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Fix misspellings in place (auto-apply top suggestion)
    #[arg(short, long)]
    fix: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Language/dictionary to use (e.g., en_US, en_GB); overrides config files
    #[arg(short, long)]
    language: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Add words to personal dictionary
    #[arg(long)]
    add_to_dict: Vec<String>,

    /// Pattern to ignore (regex)
    #[arg(long)]
    ignore_pattern: Vec<String>,

    /// Personal dictionary file
    #[arg(long)]
    personal_dict: Option<PathBuf>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Log engine activity to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Build a dictionary from a word list, one word per line
    Build {
        /// Language code (e.g., en_US, en_GB, fr_FR)
        language: String,
        /// Word list file
        wordlist: PathBuf,
    },
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "livespell", &mut io::stdout());
        return Ok(());
    }

    if let Some(command) = cli.command {
        return handle_command(command);
    }

    let config = Config::load(
        cli.language.clone(),
        cli.personal_dict.clone(),
        cli.ignore_pattern.clone(),
    )?;

    if !cli.add_to_dict.is_empty() {
        let path = config
            .personal_dictionary
            .as_deref()
            .context("No personal dictionary configured")?;
        append_words(path, &cli.add_to_dict)?;
        println!("Added {} word(s) to {}", cli.add_to_dict.len(), path.display());
        if cli.files.is_empty() {
            return Ok(());
        }
    }

    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let files = collect_files(&cli.files);
    debug!(files = files.len(), "checking files");

    let speller = DictionarySpellProvider::new(&config)?;
    let workspace = Workspace::new(Arc::new(speller), config);

    let reports: Vec<FileReport> = files
        .par_iter()
        .filter_map(|path| match check_file(&workspace, path, cli.fix) {
            Ok(report) => Some(report),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                None
            }
        })
        .collect();

    let colored = !cli.no_color;
    output::print_reports(&reports, colored, cli.format)?;

    let total_errors: usize = reports.iter().map(|r| r.errors.len()).sum();
    let total_fixed: usize = reports.iter().map(|r| r.fixed).sum();
    if cli.format == OutputFormat::Text {
        if cli.fix {
            output::print_fix_summary(total_fixed, reports.len(), colored);
        } else {
            output::print_check_summary(total_errors, reports.len(), colored);
        }
    }

    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_dictionaries()?;
            }
            DictCommands::Build { language, wordlist } => {
                dict::manager::build_dictionary(&language, &wordlist)?;
            }
            DictCommands::Info { language } => {
                dict::manager::show_info(&language)?;
            }
        },
    }
    Ok(())
}

/// Expand directories into the checkable files below them. Explicit file
/// arguments are kept whatever their extension.
fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            eprintln!("Error: File not found: {}", input.display());
            continue;
        }

        let walker = WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden_or_build_dir(e.path()));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && has_checked_extension(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "skipping unreadable entry"),
            }
        }
    }
    files
}

fn is_hidden_or_build_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.starts_with('.') || (path.is_dir() && matches!(name, "target" | "node_modules"))
}

fn has_checked_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CHECKED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Open `path` in the workspace, run one pass and report what it found. With
/// `fix`, every error with a suggestion is replaced and the file rewritten.
fn check_file(workspace: &Workspace, path: &Path, fix: bool) -> Result<FileReport> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let id = path.display().to_string();
    let session = workspace.open(id.clone(), text, FileType::from_path(path));
    session.reconcile_now();

    let errors = session.all_errors();
    let reported = errors
        .iter()
        .map(|e| ReportedError::locate(session.document(), e))
        .collect();

    let mut fixed = 0;
    if fix {
        let mut pending: Vec<_> = errors.iter().filter(|e| !e.suggestions.is_empty()).collect();
        pending.sort_by(|a, b| b.range.start().cmp(&a.range.start()));
        for error in pending {
            match session.apply_suggestion(error, &error.suggestions[0]) {
                Ok(_) => fixed += 1,
                Err(e) => warn!(word = %error.word, error = %e, "correction skipped"),
            }
        }
        if fixed > 0 {
            fs::write(path, session.document().text())
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
    }

    workspace.close(&id);
    Ok(FileReport {
        file: path.to_path_buf(),
        errors: reported,
        fixed,
    })
}

fn append_words(path: &Path, words: &[String]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open personal dictionary: {}", path.display()))?;
    for word in words {
        writeln!(file, "{}", word.trim())?;
    }
    Ok(())
}
