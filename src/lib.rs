//! # arxiv_topics
//!
//! Topic modeling of arXiv abstracts, one stage at a time:
//!
//! 1. [`subset_file`]: keep the records of selected categories from the NDJSON snapshot
//! 2. [`clean_file`]: normalize and lemmatize each abstract into a tokenized frame
//! 3. [`build_matrix`]: fit TF-IDF over the frame
//! 4. [`search_ranks`]: NMF or truncated SVD at several ranks, one result row per rank
//! 5. [`extract_topics`]: top terms per topic at a chosen rank
//!
//! Each stage reads the previous stage's output from disk, so they can be rerun
//! independently from the `arxiv_topics` binary.

use std::path::Path;

use log::info;

pub mod article;
pub mod artifact;
pub mod clean;
pub mod coherence;
pub mod error;
pub mod export;
pub mod filter;
pub mod frame;
pub mod nmf;
pub mod search;
pub mod svd;
pub mod tfidf;
pub mod topics;
pub mod vocab;

pub use article::{Article, CategoryMap};
pub use clean::Tokenizer;
pub use error::{Error, Result};
pub use export::ExportFormat;
pub use filter::SelectionMode;
pub use frame::FrameRow;
pub use search::{RankResult, SearchOptions};
pub use tfidf::{TfidfMatrix, TfidfModel};
pub use topics::Topic;
pub use vocab::{DocIndex, TermIndex};

/// Factorization used by [`search_ranks`] and [`extract_topics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Method {
    Nmf,
    Svd,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Nmf => "nmf",
            Method::Svd => "svd",
        }
    }
}

/// Filter `input` by `categories` and write the survivors to `output` as NDJSON.
/// Returns the number of records written.
pub fn subset_file(input: &Path, output: &Path, categories: &CategoryMap, mode: SelectionMode) -> Result<usize> {
    let kept = filter::subset_file(input, categories, mode)?;
    article::write_ndjson(output, &kept)
}

/// Group every record of `input` under each of its tags and write the map as JSON.
pub fn group_file(input: &Path, output: &Path) -> Result<usize> {
    let articles = article::read_ndjson(input)?.collect::<Result<Vec<_>>>()?;
    let groups = filter::group_by_category(articles)?;
    let file = std::io::BufWriter::new(std::fs::File::create(output)?);
    serde_json::to_writer(file, &groups)?;
    info!("grouped records into {} categories", groups.len());
    Ok(groups.len())
}

/// Clean and tokenize every abstract of an NDJSON file into a frame on disk.
pub fn clean_file(input: &Path, output: &Path, tokenizer: &Tokenizer) -> Result<Vec<FrameRow>> {
    let articles = article::read_ndjson(input)?.collect::<Result<Vec<_>>>()?;
    let rows = frame::build_frame(articles, tokenizer);
    frame::write_frame(output, &rows)?;
    Ok(rows)
}

/// Fit TF-IDF on a frame and transform the same frame.
pub fn build_matrix(rows: &[FrameRow]) -> Result<(TfidfModel, TermIndex, TfidfMatrix)> {
    let (model, terms) = TfidfModel::fit(rows.iter().map(|r| r.tokens.as_slice()))?;
    let matrix = model.transform(frame::token_docs(rows))?;
    Ok((model, terms, matrix))
}

/// Run a rank sweep on a TF-IDF matrix.
pub fn search_ranks(matrix: &TfidfMatrix, method: Method, ranks: &[usize], opts: &SearchOptions) -> Result<Vec<RankResult>> {
    let dense = matrix.to_dense();
    info!(
        "{} rank search over {} documents x {} terms, ranks {:?}",
        method.name(),
        matrix.n_docs(),
        matrix.n_terms(),
        ranks
    );
    match method {
        Method::Nmf => search::nmf_k_search(&dense, ranks, opts),
        Method::Svd => search::svd_k_search(&dense, ranks, opts.serialize_dir.as_deref()),
    }
}

/// Factor at rank `k` and return the top `top_n` terms of every topic.
///
/// SVD topics use the rows of `Vᵀ`, whose signs are arbitrary; NMF topics use `H`.
pub fn extract_topics(
    matrix: &TfidfMatrix,
    terms: &TermIndex,
    method: Method,
    k: usize,
    top_n: usize,
    opts: &SearchOptions,
) -> Result<Vec<Topic>> {
    matrix.check_terms(terms)?;
    let dense = matrix.to_dense();
    let components = match method {
        Method::Nmf => {
            nmf::Nmf::new(k)
                .with_max_iter(opts.max_iter)
                .with_tol(opts.tol)
                .fit(&dense)?
                .h
        }
        Method::Svd => svd::full_svd(&dense)?.truncate(k)?.v_t,
    };
    topics::topics_from_components(&components, terms, top_n)
}
