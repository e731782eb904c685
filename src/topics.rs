//! Top-weighted terms per topic.

use log::info;
use nalgebra::DMatrix;
use serde::Serialize;

use crate::error::Result;
use crate::export::Tabular;
use crate::vocab::TermIndex;

pub const DEFAULT_TOP_N: usize = 15;

/// One topic's leading terms, highest weight first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub topic: usize,
    pub terms: Vec<String>,
    pub weights: Vec<f64>,
}

/// Top `n` `(term, weight)` pairs of one topic row.
///
/// Ties keep column order.
///
/// # Example
/// ```
/// use arxiv_topics::topics::top_terms;
/// use arxiv_topics::vocab::TermIndex;
/// let terms = TermIndex::from_terms(vec!["a".into(), "b".into(), "c".into()]);
/// let top = top_terms(&[0.1, 0.9, 0.3], &terms, 2).unwrap();
/// let words: Vec<&str> = top.iter().map(|(t, _)| t.as_str()).collect();
/// assert_eq!(words, ["b", "c"]);
/// ```
pub fn top_terms(row: &[f64], terms: &TermIndex, n: usize) -> Result<Vec<(String, f64)>> {
    terms.check_width(row.len())?;
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[b].total_cmp(&row[a]));
    Ok(order
        .into_iter()
        .take(n)
        .filter_map(|i| terms.term(i).map(|t| (t.to_string(), row[i])))
        .collect())
}

/// Every row of a topics × terms matrix (NMF `H`, SVD `Vᵀ`), each handled on its own.
pub fn topics_from_components(components: &DMatrix<f64>, terms: &TermIndex, n: usize) -> Result<Vec<Topic>> {
    terms.check_width(components.ncols())?;
    let mut topics = Vec::with_capacity(components.nrows());
    for (idx, row) in components.row_iter().enumerate() {
        let row: Vec<f64> = row.iter().copied().collect();
        let (words, weights): (Vec<String>, Vec<f64>) = top_terms(&row, terms, n)?.into_iter().unzip();
        topics.push(Topic {
            topic: idx,
            terms: words,
            weights,
        });
    }
    info!("extracted {} topics", topics.len());
    Ok(topics)
}

/// Term lists only, as consumed by [`crate::coherence`].
pub fn term_lists(topics: &[Topic]) -> Vec<Vec<String>> {
    topics.iter().map(|t| t.terms.clone()).collect()
}

impl Tabular for Topic {
    fn headers() -> &'static [&'static str] {
        &["topic", "terms", "weights"]
    }

    fn cells(&self) -> Vec<String> {
        let weights: Vec<String> = self.weights.iter().map(|w| format!("{w:.4}")).collect();
        vec![self.topic.to_string(), self.terms.join(" "), weights.join(" ")]
    }
}
