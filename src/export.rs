//! Table export in the formats the CLI offers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

/// A row that can be written as delimited text as well as JSON.
pub trait Tabular: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// `{dir}/{stem}_{YYYYMMDD_HHMMSS}_{suffix}.{ext}`
pub fn timestamped_path(dir: &Path, stem: &str, suffix: &str, format: ExportFormat) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{stem}_{stamp}_{suffix}.{}", format.extension()))
}

pub fn write_table<T: Tabular>(path: &Path, rows: &[T], format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv => write_delimited(path, rows, b','),
        ExportFormat::Tsv => write_delimited(path, rows, b'\t'),
        ExportFormat::Json => {
            let mut out = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut out, rows)?;
            out.flush()?;
            Ok(())
        }
        ExportFormat::Txt => {
            let mut out = BufWriter::new(File::create(path)?);
            out.write_all(render_text(rows).as_bytes())?;
            out.flush()?;
            Ok(())
        }
    }
}

fn write_delimited<T: Tabular>(path: &Path, rows: &[T], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    wtr.write_record(T::headers())?;
    for row in rows {
        wtr.write_record(row.cells())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Left-aligned columns padded to the widest cell.
pub fn render_text<T: Tabular>(rows: &[T]) -> String {
    let headers = T::headers();
    let body: Vec<Vec<String>> = rows.iter().map(T::cells).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (w, c) in widths.iter_mut().zip(cells) {
            *w = (*w).max(c.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = line(headers.to_vec());
    out.push('\n');
    for cells in &body {
        out.push_str(&line(cells.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}
