//! Rank sweeps over NMF and truncated SVD.
//!
//! `evaluate_*_rank` handles one rank and is the unit to hand to a worker. The `*_k_search`
//! drivers run the requested ranks in order and return one row per rank, unsorted and
//! without deduplication.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::Serialize;

use crate::artifact;
use crate::error::Result;
use crate::export::{ExportFormat, Tabular, timestamped_path, write_table};
use crate::nmf::Nmf;
use crate::svd::{SvdFactors, full_svd, truncated_recon_err};

/// One row of the sweep table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankResult {
    pub k: usize,
    pub reconstruction_err: f64,
    pub n_iter: usize,
    pub converged: bool,
    pub elapsed_secs: f64,
}

/// Solver settings shared by every rank of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_iter: usize,
    pub tol: f64,
    /// Persist each rank's factors here when set.
    pub serialize_dir: Option<PathBuf>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-4,
            serialize_dir: None,
        }
    }
}

/// Fit NMF at rank `k`.
pub fn evaluate_nmf_rank(x: &DMatrix<f64>, k: usize, opts: &SearchOptions) -> Result<RankResult> {
    let started = Instant::now();
    let factors = Nmf::new(k)
        .with_max_iter(opts.max_iter)
        .with_tol(opts.tol)
        .fit(x)?;
    let elapsed_secs = started.elapsed().as_secs_f64();

    if let Some(dir) = &opts.serialize_dir {
        artifact::write_nmf(dir, k, &factors)?;
    }
    Ok(RankResult {
        k,
        reconstruction_err: factors.reconstruction_err,
        n_iter: factors.n_iter,
        converged: factors.converged,
        elapsed_secs,
    })
}

/// Truncate an already ordered decomposition at rank `k`.
///
/// No iterations are involved, so `n_iter` is 0 and `converged` is true.
pub fn evaluate_svd_rank(factors: &SvdFactors, k: usize, serialize_dir: Option<&Path>) -> Result<RankResult> {
    let started = Instant::now();
    let truncated = factors.truncate(k)?;
    let reconstruction_err = truncated_recon_err(factors.sigma.as_slice(), k);
    if let Some(dir) = serialize_dir {
        artifact::write_svd(dir, k, &truncated)?;
    }
    Ok(RankResult {
        k,
        reconstruction_err,
        n_iter: 0,
        converged: true,
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

pub fn nmf_k_search(x: &DMatrix<f64>, ranks: &[usize], opts: &SearchOptions) -> Result<Vec<RankResult>> {
    let mut results = Vec::with_capacity(ranks.len());
    for &k in ranks {
        info!("fitting NMF for k={k}");
        let row = evaluate_nmf_rank(x, k, opts)?;
        log_row("nmf", &row);
        results.push(row);
    }
    Ok(results)
}

/// Same rows as [`nmf_k_search`], with ranks fitted concurrently on the rayon pool.
pub fn par_nmf_k_search(x: &DMatrix<f64>, ranks: &[usize], opts: &SearchOptions) -> Result<Vec<RankResult>> {
    let results: Vec<RankResult> = ranks
        .par_iter()
        .map(|&k| evaluate_nmf_rank(x, k, opts))
        .collect::<Result<_>>()?;
    for row in &results {
        log_row("nmf", row);
    }
    Ok(results)
}

/// Decompose once, then read every rank's error off the spectrum.
///
/// Each row's `elapsed_secs` includes the shared decomposition time.
pub fn svd_k_search(x: &DMatrix<f64>, ranks: &[usize], serialize_dir: Option<&Path>) -> Result<Vec<RankResult>> {
    let started = Instant::now();
    let factors = full_svd(x)?;
    let decomposition_secs = started.elapsed().as_secs_f64();
    info!(
        "full SVD of {}x{} in {:.3}s",
        x.nrows(),
        x.ncols(),
        decomposition_secs
    );

    let mut results = Vec::with_capacity(ranks.len());
    for &k in ranks {
        let mut row = evaluate_svd_rank(&factors, k, serialize_dir)?;
        row.elapsed_secs += decomposition_secs;
        log_row("svd", &row);
        results.push(row);
    }
    Ok(results)
}

fn log_row(method: &str, row: &RankResult) {
    info!(
        "{method} k={} err={:.6} iter={} time={:.3}s",
        row.k, row.reconstruction_err, row.n_iter, row.elapsed_secs
    );
    if !row.converged {
        warn!("{method} k={} did not converge within the iteration cap", row.k);
    }
}

impl Tabular for RankResult {
    fn headers() -> &'static [&'static str] {
        &["k", "reconstruction_err", "n_iter", "converged", "elapsed_secs"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.k.to_string(),
            format!("{:.6}", self.reconstruction_err),
            self.n_iter.to_string(),
            self.converged.to_string(),
            format!("{:.3}", self.elapsed_secs),
        ]
    }
}

/// Write the sweep table to `{dir}/{stem}_{timestamp}_ksearch.{ext}` and return the path.
pub fn write_summary(results: &[RankResult], dir: &Path, stem: &str, format: ExportFormat) -> Result<PathBuf> {
    let path = timestamped_path(dir, stem, "ksearch", format);
    write_table(&path, results, format)?;
    info!("wrote {}", path.display());
    Ok(path)
}
