use crate::checker::dictionary::Dictionary;
use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub word_count: usize,
    pub size_bytes: u64,
}

impl DictionaryInfo {
    pub fn read(language: &str) -> Result<Option<Self>> {
        let path = Dictionary::installed_path(language)?;
        if !path.exists() {
            return Ok(None);
        }
        let size_bytes = fs::metadata(&path)?.len();
        let word_count = Dictionary::read(&path)?.len();
        Ok(Some(Self {
            language: language.to_string(),
            path,
            word_count,
            size_bytes,
        }))
    }
}

/// Installed dictionaries as (language, path), sorted by language.
pub fn installed() -> Result<Vec<(String, PathBuf)>> {
    let data_dir = Config::data_dir().context("Failed to get data directory")?;
    if !data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(&data_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dict") {
            continue;
        }
        if let Some(language) = path.file_stem().and_then(|s| s.to_str()) {
            found.push((language.to_string(), path.clone()));
        }
    }
    found.sort();
    Ok(found)
}

pub fn list_dictionaries() -> Result<()> {
    let dictionaries = installed()?;

    if dictionaries.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to build one from a word list.",
            "livespell dict build en_US words.txt".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    for (language, path) in &dictionaries {
        let size_kb = fs::metadata(path)?.len() / 1024;
        println!(
            "  {} {} ({})",
            "✓".green(),
            language.cyan().bold(),
            format!("{}KB", size_kb).dimmed()
        );
    }

    if let Some(data_dir) = Config::data_dir() {
        println!();
        println!("Data directory: {}", data_dir.display().to_string().dimmed());
    }

    Ok(())
}

/// Read a word list (one word per line) into lowercase words of two or more characters.
pub fn read_wordlist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read word list: {}", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && line.chars().count() > 1)
        .collect())
}

/// Build `<data dir>/<language>.dict` from the word list at `wordlist`.
pub fn build_dictionary(language: &str, wordlist: &Path) -> Result<PathBuf> {
    println!(
        "{} dictionary for {} from {}...",
        "Building".cyan().bold(),
        language.yellow(),
        wordlist.display().to_string().dimmed()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Reading word list...");

    let words = read_wordlist(wordlist)?;
    if words.is_empty() {
        pb.finish_and_clear();
        anyhow::bail!("Word list {} contains no words", wordlist.display());
    }

    pb.set_message(format!("Indexing {} words...", words.len()));
    let dictionary = Dictionary::from_words(words.as_slice())?;
    let dict_path = Dictionary::installed_path(language)?;
    dictionary.write(&dict_path)?;
    pb.finish_with_message(format!("Indexed {} unique words", dictionary.len()));

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );

    Ok(dict_path)
}

pub fn show_info(language: &str) -> Result<()> {
    let Some(info) = DictionaryInfo::read(language)? else {
        println!(
            "{} Dictionary for {} not found, the embedded word list is used.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to install one.",
            format!("livespell dict build {} <WORDLIST>", language).cyan()
        );
        return Ok(());
    };

    println!("{}", format!("Dictionary: {}", info.language).bold());
    println!("  Path: {}", info.path.display());
    println!("  Size: {} KB", info.size_bytes / 1024);
    println!("  Words: {}", info.word_count.to_string().yellow());
    println!("  Format: FST (Finite State Transducer)");

    Ok(())
}
