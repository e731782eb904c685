//! The cleaned, tokenized table persisted between the `clean` and `search` stages.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::clean::Tokenizer;
use crate::error::Result;

/// One article with its normalized text and lemma sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRow {
    pub id: String,
    pub authors: String,
    pub title: String,
    pub categories: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub clean: String,
    pub tokens: Vec<String>,
}

impl FrameRow {
    pub fn from_article(article: Article, tokenizer: &Tokenizer) -> Self {
        let (clean, tokens) = tokenizer.clean_and_tokenize(&article.abstract_text);
        Self {
            id: article.id,
            authors: article.authors,
            title: article.title,
            categories: article.categories,
            abstract_text: article.abstract_text,
            clean,
            tokens,
        }
    }
}

/// Clean and tokenize every article. Rows come back in input order.
pub fn build_frame(articles: Vec<Article>, tokenizer: &Tokenizer) -> Vec<FrameRow> {
    let rows: Vec<FrameRow> = articles
        .into_par_iter()
        .map(|a| FrameRow::from_article(a, tokenizer))
        .collect();
    info!("tokenized {} abstracts", rows.len());
    rows
}

/// `(doc_id, tokens)` view used by the TF-IDF stage.
pub fn token_docs(rows: &[FrameRow]) -> impl Iterator<Item = (&str, &[String])> {
    rows.iter().map(|r| (r.id.as_str(), r.tokens.as_slice()))
}

pub fn write_frame(path: &Path, rows: &[FrameRow]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, rows)?;
    out.flush()?;
    Ok(())
}

pub fn read_frame(path: &Path) -> Result<Vec<FrameRow>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
