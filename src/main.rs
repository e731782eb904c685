#![forbid(unsafe_code)]
//! # arxiv_topics CLI
//!
//! Runs the topic-modeling stages over an arXiv metadata snapshot.
//!
//! ## Example
//! ```bash
//! arxiv_topics subset arxiv-metadata-oai-snapshot.json subset.json
//! arxiv_topics clean subset.json frame.json
//! arxiv_topics search frame.json --method nmf --ranks 5,10,15,20 --export-format csv
//! arxiv_topics topics frame.json --method nmf --rank 10
//! ```
//!
//! Set `RUST_LOG=info` to follow progress.

use std::path::{Path, PathBuf};
use std::process;

use arxiv_topics::topics::DEFAULT_TOP_N;
use arxiv_topics::{
    CategoryMap, ExportFormat, Method, SearchOptions, SelectionMode, Tokenizer, build_matrix,
    clean_file, coherence, export, extract_topics, frame, group_file, search, search_ranks,
    subset_file, topics,
};
use clap::{Parser, Subcommand};
use log::{error, info};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Keep the records of the study categories
    Subset {
        /// NDJSON metadata snapshot
        input: PathBuf,
        /// NDJSON output
        output: PathBuf,
        /// Accept records whose tags include several study categories
        #[arg(long, default_value_t = false, requires = "allow_multi_cat")]
        allow_multi_spec: bool,
        /// Also accept records with tags outside the study categories
        #[arg(long, default_value_t = false)]
        allow_multi_cat: bool,
        /// Restrict to these codes instead of the study categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    /// Index every record under each of its category tags
    Group { input: PathBuf, output: PathBuf },
    /// Clean and tokenize abstracts into a JSON frame
    Clean { input: PathBuf, output: PathBuf },
    /// Reconstruction error at several ranks
    Search {
        /// Frame written by `clean`
        frame: PathBuf,
        #[arg(long, value_enum, default_value = "nmf")]
        method: Method,
        /// Comma-separated ranks, evaluated in the given order
        #[arg(long, value_delimiter = ',', required = true)]
        ranks: Vec<usize>,
        #[arg(long, default_value_t = 1000)]
        max_iter: usize,
        #[arg(long, default_value_t = 1e-4)]
        tol: f64,
        /// Persist each rank's factor matrices to this directory
        #[arg(long)]
        serialize: Option<PathBuf>,
        /// Output format for the summary table (txt, csv, tsv, json)
        #[arg(long, value_enum, default_value = "csv")]
        export_format: ExportFormat,
        /// Directory for the summary table
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Top terms per topic at one rank
    Topics {
        frame: PathBuf,
        #[arg(long, value_enum, default_value = "nmf")]
        method: Method,
        #[arg(long)]
        rank: usize,
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
        #[arg(long, default_value_t = 1000)]
        max_iter: usize,
        /// Also score each topic's NPMI coherence (slow on large corpora)
        #[arg(long, default_value_t = false)]
        coherence: bool,
        #[arg(long, value_enum, default_value = "txt")]
        export_format: ExportFormat,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        error!("Error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(command: Command) -> arxiv_topics::Result<()> {
    match command {
        Command::Subset {
            input,
            output,
            allow_multi_spec,
            allow_multi_cat,
            categories,
        } => {
            let accepted = if categories.is_empty() {
                CategoryMap::study_default()
            } else {
                categories.iter().map(|c| (c.as_str(), c.as_str())).collect()
            };
            let mode = SelectionMode::from_flags(!allow_multi_cat, !allow_multi_spec);
            let written = subset_file(&input, &output, &accepted, mode)?;
            println!("{written} records written to {}", output.display());
        }
        Command::Group { input, output } => {
            let n = group_file(&input, &output)?;
            println!("{n} categories written to {}", output.display());
        }
        Command::Clean { input, output } => {
            let tokenizer = Tokenizer::english();
            let rows = clean_file(&input, &output, &tokenizer)?;
            println!("{} documents written to {}", rows.len(), output.display());
        }
        Command::Search {
            frame: frame_path,
            method,
            ranks,
            max_iter,
            tol,
            serialize,
            export_format,
            out,
        } => {
            let rows = frame::read_frame(&frame_path)?;
            let (_, _, matrix) = build_matrix(&rows)?;
            if let Some(dir) = &serialize {
                std::fs::create_dir_all(dir)?;
            }
            let opts = SearchOptions {
                max_iter,
                tol,
                serialize_dir: serialize,
            };
            let results = search_ranks(&matrix, method, &ranks, &opts)?;
            println!("{}", export::render_text(&results));
            let path = search::write_summary(&results, &out, &stem(&frame_path, method), export_format)?;
            info!("summary at {}", path.display());
        }
        Command::Topics {
            frame: frame_path,
            method,
            rank,
            top_n,
            max_iter,
            coherence: with_coherence,
            export_format,
            out,
        } => {
            let rows = frame::read_frame(&frame_path)?;
            let (_, terms, matrix) = build_matrix(&rows)?;
            let opts = SearchOptions {
                max_iter,
                ..SearchOptions::default()
            };
            let found = extract_topics(&matrix, &terms, method, rank, top_n, &opts)?;
            for topic in &found {
                println!("Topic {}: {}", topic.topic, topic.terms.join(" "));
            }
            if with_coherence {
                let docs: Vec<Vec<String>> = rows.into_iter().map(|r| r.tokens).collect();
                let report = coherence::npmi(&topics::term_lists(&found), &docs, top_n);
                println!("Mean NPMI coherence: {:.4}", report.mean);
            }
            let path = export::timestamped_path(&out, &stem(&frame_path, method), "topics", export_format);
            export::write_table(&path, &found, export_format)?;
            info!("topics at {}", path.display());
        }
    }
    Ok(())
}

/// `{frame file stem}_{method}`
fn stem(frame_path: &Path, method: Method) -> String {
    let base = frame_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    format!("{base}_{}", method.name())
}
