//! Category-based subsetting of article records.

use std::collections::BTreeMap;
use std::path::Path;

use log::info;

use crate::article::{Article, CategoryMap, read_ndjson};
use crate::error::Result;

/// How multi-category records are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Reject any record tagged with more than one category.
    SingleCategoryOnly,
    /// Accept multi-category records as long as at most one tag is an accepted category.
    SingleSpecifiedCategory,
    /// Accept any record with at least one accepted tag.
    Unrestricted,
}

impl SelectionMode {
    /// `single_cat_only` wins when both flags are set.
    pub fn from_flags(single_cat_only: bool, single_spec_cat: bool) -> Self {
        match (single_cat_only, single_spec_cat) {
            (true, _) => SelectionMode::SingleCategoryOnly,
            (false, true) => SelectionMode::SingleSpecifiedCategory,
            (false, false) => SelectionMode::Unrestricted,
        }
    }
}

/// Decide whether one record belongs to the subset.
///
/// In every mode the record needs at least one accepted tag; a lone tag outside the
/// accepted set is rejected.
pub fn accepts(article: &Article, accepted: &CategoryMap, mode: SelectionMode) -> Result<bool> {
    let tags = article.category_set()?;
    let hits = tags.iter().filter(|t| accepted.contains(t)).count();
    let keep = match mode {
        SelectionMode::SingleCategoryOnly => tags.len() == 1 && hits == 1,
        SelectionMode::SingleSpecifiedCategory => hits == 1,
        SelectionMode::Unrestricted => hits >= 1,
    };
    Ok(keep)
}

/// Filter an in-memory stream, preserving input order. Fails on the first malformed record.
pub fn filter_records<I>(articles: I, accepted: &CategoryMap, mode: SelectionMode) -> Result<Vec<Article>>
where
    I: IntoIterator<Item = Article>,
{
    let mut kept = Vec::new();
    for article in articles {
        if accepts(&article, accepted, mode)? {
            kept.push(article);
        }
    }
    Ok(kept)
}

/// Stream an NDJSON snapshot and keep the records matching `mode`.
pub fn subset_file(input: &Path, accepted: &CategoryMap, mode: SelectionMode) -> Result<Vec<Article>> {
    let mut kept = Vec::new();
    let mut seen = 0usize;
    for article in read_ndjson(input)? {
        let article = article?;
        seen += 1;
        if accepts(&article, accepted, mode)? {
            kept.push(article);
        }
    }
    info!(
        "subset {}: kept {} of {} records ({:?})",
        input.display(),
        kept.len(),
        seen,
        mode
    );
    Ok(kept)
}

/// Index every record under each of its tags. A record with three tags appears three times.
pub fn group_by_category<I>(articles: I) -> Result<BTreeMap<String, Vec<Article>>>
where
    I: IntoIterator<Item = Article>,
{
    let mut groups: BTreeMap<String, Vec<Article>> = BTreeMap::new();
    for article in articles {
        let tags: Vec<String> = article
            .category_set()?
            .into_iter()
            .map(str::to_string)
            .collect();
        for tag in tags {
            groups.entry(tag).or_default().push(article.clone());
        }
    }
    Ok(groups)
}
