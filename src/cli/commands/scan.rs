use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::Output;
use crate::config::{FanmergeConfig, Settings};
use crate::scanner::{Book, BookParser, ParseResult, Sentence, SentenceMatcher};

#[derive(Args)]
pub struct ScanArgs {
    /// Text files to scan; each file is split into pages
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Keep only the first sentence of each page (collected in delivery
    /// order, printed sorted by page)
    #[arg(long, conflicts_with = "by_page")]
    pub first_only: bool,

    /// Keep only the first sentence of each page, in page order
    #[arg(long)]
    pub by_page: bool,

    /// Maximum results buffered between page tasks and the collector
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Maximum worker threads running page tasks (0 = auto-detect)
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Lines per page
    #[arg(long)]
    pub page_lines: Option<usize>,

    /// Sentence regex (repeatable); replaces the built-in pattern
    #[arg(long = "pattern", value_name = "REGEX")]
    pub patterns: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON format
    Json,
}

#[derive(Clone, Copy, Debug)]
enum ScanMode {
    All,
    FirstPerPage,
    FirstPerPageOrdered,
}

/// Per-file scan outcome
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub pages: usize,
    pub sentences: Vec<Sentence>,
    pub delivered: usize,
    pub peak_buffered: usize,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    files: Vec<FileReport>,
    total_sentences: usize,
    elapsed_ms: u128,
}

pub async fn execute(args: ScanArgs, config_path: Option<&Path>, output: &Output) -> Result<()> {
    // CLI flags are the highest-priority config layer
    let overrides = serde_json::json!({
        "group": { "max_in_flight": args.max_in_flight, "max_workers": args.max_workers },
        "scanner": { "page_lines": args.page_lines, "patterns": args.patterns },
    });
    let settings = FanmergeConfig::load_with(config_path, Some(&overrides))?.settings()?;

    let mode = if args.first_only {
        ScanMode::FirstPerPage
    } else if args.by_page {
        ScanMode::FirstPerPageOrdered
    } else {
        ScanMode::All
    };

    output.verbose(&format!(
        "Scanning {} file(s) with max_in_flight={} max_workers={} page_lines={}",
        args.paths.len(),
        settings.group.max_in_flight,
        settings.group.max_workers,
        settings.scanner.page_lines
    ));

    let start_time = Instant::now();
    let paths = args.paths;
    // The engine blocks on scoped threads, so keep it off the async runtime
    let files = tokio::task::spawn_blocking(move || scan_files(&paths, &settings, mode))
        .await
        .context("Scan task failed")??;

    let report = ScanReport {
        total_sentences: files.iter().map(|f| f.sentences.len()).sum(),
        files,
        elapsed_ms: start_time.elapsed().as_millis(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report, output),
    }
    Ok(())
}

fn scan_files(paths: &[PathBuf], settings: &Settings, mode: ScanMode) -> Result<Vec<FileReport>> {
    let matcher = SentenceMatcher::new(&settings.scanner.patterns)?;
    let parser = BookParser::new(settings.group, matcher);

    paths
        .iter()
        .map(|path| {
            let book = Book::from_file(path, settings.scanner.page_lines)?;
            let ParseResult { mut sentences, summary } = match mode {
                ScanMode::All => parser.parse_book(&book),
                ScanMode::FirstPerPage => parser.parse_first_sentences(&book),
                ScanMode::FirstPerPageOrdered => parser.parse_first_sentences_by_page(&book),
            }
            .with_context(|| format!("Failed to scan {}", path.display()))?;

            // Delivery order is arbitrary; present matches in reading order
            // unless page order was requested explicitly.
            if !matches!(mode, ScanMode::FirstPerPageOrdered) {
                sentences.sort();
            }

            Ok(FileReport {
                path: path.display().to_string(),
                pages: book.len(),
                sentences,
                delivered: summary.delivered,
                peak_buffered: summary.peak_buffered,
            })
        })
        .collect()
}

fn print_text(report: &ScanReport, output: &Output) {
    for file in &report.files {
        output.section_header(&file.path);
        if file.sentences.is_empty() {
            output.info("No matching sentences");
        }
        for sentence in &file.sentences {
            output.sentence(sentence.page, &sentence.text);
        }
        output.verbose(&format!(
            "{} pages, {} results delivered, peak buffer {}",
            file.pages, file.delivered, file.peak_buffered
        ));
    }

    output.section_header("Summary");
    output.summary_stats("Files", report.files.len());
    output.summary_stats("Sentences", report.total_sentences);
    output.summary_stats("Elapsed (ms)", report.elapsed_ms as usize);
    if report.total_sentences > 0 {
        output.success(&format!("Found {} matching sentences", report.total_sentences));
    } else {
        output.warning("No matching sentences found");
    }
}
