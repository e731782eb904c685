//! TF-IDF weighting over pre-tokenized documents.
//!
//! Counts are raw term frequencies, idf is smoothed (`ln((1 + n) / (1 + df)) + 1`), and
//! every row is L2-normalized. The vocabulary is sorted so column order is reproducible.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::info;
use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};

use crate::error::{Error, Result};
use crate::vocab::{DocIndex, TermIndex};

/// Fitted document-frequency statistics for a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    terms: TermIndex,
    idf: Vec<f64>,
    n_docs: usize,
}

/// Documents × terms weights, the row labels, and the vocabulary that labels the columns.
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub matrix: CsMat<f64>,
    pub docs: DocIndex,
    terms: TermIndex,
}

impl TfidfModel {
    /// Learn the vocabulary and idf weights. The returned [`TermIndex`] labels the columns of
    /// every matrix this model produces.
    pub fn fit<'a, I>(corpus: I) -> Result<(Self, TermIndex)>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut n_docs = 0usize;
        for doc in corpus {
            n_docs += 1;
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        if n_docs == 0 {
            return Err(Error::EmptyCorpus);
        }

        let sorted: BTreeSet<&str> = df.keys().copied().collect();
        let n = n_docs as f64;
        let idf = sorted
            .iter()
            .map(|t| ((1.0 + n) / (1.0 + df[t] as f64)).ln() + 1.0)
            .collect();
        let terms = TermIndex::from_terms(sorted.into_iter().map(str::to_string).collect());

        info!("fitted tf-idf: {} documents, {} terms", n_docs, terms.len());
        let model = Self {
            terms: terms.clone(),
            idf,
            n_docs,
        };
        Ok((model, terms))
    }

    pub fn terms(&self) -> &TermIndex {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_docs(&self) -> usize {
        self.n_docs
    }

    /// Project `(doc_id, tokens)` pairs into the fitted vocabulary.
    ///
    /// Unknown tokens are ignored; a document with no known token becomes an all-zero row.
    pub fn transform<'a, I>(&self, docs: I) -> Result<TfidfMatrix>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut ids = Vec::new();
        let mut rows: Vec<Vec<(usize, f64)>> = Vec::new();
        for (id, tokens) in docs {
            ids.push(id);
            rows.push(self.weigh(tokens));
        }
        let docs = DocIndex::from_ids(ids)?;

        let mut tri = TriMat::new((rows.len(), self.terms.len()));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, v) in row {
                tri.add_triplet(r, c, v);
            }
        }
        let matrix: CsMat<f64> = tri.to_csr();
        Ok(TfidfMatrix {
            matrix,
            docs,
            terms: self.terms.clone(),
        })
    }

    fn weigh(&self, tokens: &[String]) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for tok in tokens {
            if let Some(c) = self.terms.index(tok) {
                *counts.entry(c).or_insert(0) += 1;
            }
        }
        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(c, count)| (c, count as f64 * self.idf[c]))
            .collect();
        row.sort_by_key(|(c, _)| *c);

        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in row.iter_mut() {
                *v /= norm;
            }
        }
        row
    }
}

impl TfidfMatrix {
    pub fn n_docs(&self) -> usize {
        self.matrix.rows()
    }

    pub fn n_terms(&self) -> usize {
        self.matrix.cols()
    }

    /// Vocabulary of the model that produced this matrix.
    pub fn terms(&self) -> &TermIndex {
        &self.terms
    }

    /// Fails unless `terms` is the exact vocabulary this matrix was built with.
    /// Width alone is not enough: a same-size foreign index would mislabel every column.
    pub fn check_terms(&self, terms: &TermIndex) -> Result<()> {
        if terms != &self.terms {
            return Err(Error::VocabularyMismatch {
                expected: self.terms.len(),
                found: terms.len(),
            });
        }
        Ok(())
    }

    /// Dense copy for the factorization routines.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.matrix.rows(), self.matrix.cols());
        for (&v, (r, c)) in self.matrix.iter() {
            dense[(r, c)] = v;
        }
        dense
    }

    /// L2 norm of each row.
    pub fn row_norms(&self) -> Vec<f64> {
        self.matrix
            .outer_iterator()
            .map(|row| row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt())
            .collect()
    }
}
