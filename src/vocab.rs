//! Bidirectional index ↔ label mappings.
//!
//! Both directions are built in one pass and never mutated afterwards, so a lookup in
//! one direction always round-trips through the other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Column index ↔ term. Built once when a TF-IDF model is fitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TermIndex {
    terms: Vec<String>,
    positions: HashMap<String, usize>,
}

impl TermIndex {
    /// Build from a list of distinct terms; column `i` is `terms[i]`.
    /// Repeated terms keep their first position.
    pub fn from_terms(terms: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(terms.len());
        let mut unique = Vec::with_capacity(terms.len());
        for term in terms {
            if !positions.contains_key(&term) {
                positions.insert(term.clone(), unique.len());
                unique.push(term);
            }
        }
        Self {
            terms: unique,
            positions,
        }
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn index(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Fails unless a vector of `width` entries can be labeled by this index.
    pub fn check_width(&self, width: usize) -> Result<()> {
        if width != self.terms.len() {
            return Err(Error::VocabularyMismatch {
                expected: self.terms.len(),
                found: width,
            });
        }
        Ok(())
    }
}

impl From<Vec<String>> for TermIndex {
    fn from(terms: Vec<String>) -> Self {
        Self::from_terms(terms)
    }
}

impl From<TermIndex> for Vec<String> {
    fn from(index: TermIndex) -> Self {
        index.terms
    }
}

/// Row index ↔ document id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocIndex {
    ids: Vec<String>,
    rows: HashMap<String, usize>,
}

impl DocIndex {
    /// Fails on a repeated id, since two rows cannot share one id.
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = DocIndex::default();
        for id in ids {
            let id = id.into();
            if index.rows.contains_key(&id) {
                return Err(Error::DuplicateDocId(id));
            }
            index.rows.insert(id.clone(), index.ids.len());
            index.ids.push(id);
        }
        Ok(index)
    }

    pub fn doc_id(&self, row: usize) -> Option<&str> {
        self.ids.get(row).map(String::as_str)
    }

    pub fn row(&self, doc_id: &str) -> Option<usize> {
        self.rows.get(doc_id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
