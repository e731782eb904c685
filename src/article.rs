//! Raw arXiv metadata records and the category reference map.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One line of the arXiv metadata snapshot.
///
/// Only the fields the pipeline needs are decoded; anything else on the line is ignored.
/// A missing field fails the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub authors: String,
    pub title: String,
    /// Space-separated category codes, e.g. `"cs.AI cs.LG"`.
    pub categories: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub update_date: String,
}

impl Article {
    /// Distinct category codes of this record.
    ///
    /// Fails when the category string holds no code at all.
    pub fn category_set(&self) -> Result<BTreeSet<&str>> {
        let tags: BTreeSet<&str> = self.categories.split_whitespace().collect();
        if tags.is_empty() {
            return Err(Error::MalformedCategories {
                id: self.id.clone(),
            });
        }
        Ok(tags)
    }
}

/// Static mapping from category code to a human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    labels: BTreeMap<String, String>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight categories the abstract study was run on.
    pub fn study_default() -> Self {
        [
            ("cs.AI", "Artificial Intelligence"),
            ("cs.CY", "Computers and Society"),
            ("cs.DM", "Discrete Mathematics"),
            ("q-bio.TO", "Tissues and Organs"),
            ("econ.TH", "Theoretical Economics"),
            ("eess.AS", "Audio and Speech Processing"),
            ("q-bio.NC", "Neurons and Cognition"),
            ("q-bio.PE", "Populations and Evolution"),
        ]
        .into_iter()
        .collect()
    }

    /// Codes are trimmed so stray whitespace cannot make a category unmatchable.
    pub fn insert(&mut self, code: &str, label: &str) {
        self.labels
            .insert(code.trim().to_string(), label.trim().to_string());
    }

    pub fn contains(&self, code: &str) -> bool {
        self.labels.contains_key(code)
    }

    pub fn label(&self, code: &str) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut map = CategoryMap::new();
        for (code, label) in iter {
            map.insert(code, label);
        }
        map
    }
}

/// Decode one NDJSON line. `line` is 1-based and only used for error reporting.
pub fn parse_line(raw: &str, line: usize) -> Result<Article> {
    serde_json::from_str(raw).map_err(|source| Error::Record { line, source })
}

/// Lazily iterate the records of an NDJSON file, skipping blank lines.
pub fn read_ndjson(path: &Path) -> Result<impl Iterator<Item = Result<Article>>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Ok(l) if l.trim().is_empty() => None,
            Ok(l) => Some(parse_line(&l, idx + 1)),
            Err(e) => Some(Err(Error::Io(e))),
        }))
}

/// Write records back out as NDJSON, one object per line.
pub fn write_ndjson<'a, I>(path: &Path, articles: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Article>,
{
    let mut out = BufWriter::new(File::create(path)?);
    let mut written = 0;
    for article in articles {
        serde_json::to_writer(&mut out, article)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snapshot_line_and_ignores_extra_fields() {
        let raw = r#"{"id":"0704.0001","submitter":"X","authors":"A. B","title":"T","categories":"cs.AI cs.LG","abstract":"Some text.","update_date":"2008-11-13","versions":[]}"#;
        let a = parse_line(raw, 1).unwrap();
        assert_eq!(a.id, "0704.0001");
        assert_eq!(a.abstract_text, "Some text.");
        let cats: Vec<&str> = a.category_set().unwrap().into_iter().collect();
        assert_eq!(cats, vec!["cs.AI", "cs.LG"]);
    }

    #[test]
    fn missing_field_fails_with_line_number() {
        let raw = r#"{"id":"1","authors":"","title":"","categories":"cs.AI","update_date":""}"#;
        match parse_line(raw, 7) {
            Err(Error::Record { line, .. }) => assert_eq!(line, 7),
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn empty_category_string_is_malformed() {
        let raw = r#"{"id":"9","authors":"","title":"","categories":"   ","abstract":"","update_date":""}"#;
        let a = parse_line(raw, 1).unwrap();
        assert!(matches!(
            a.category_set(),
            Err(Error::MalformedCategories { id }) if id == "9"
        ));
    }

    #[test]
    fn study_default_codes_are_trimmed() {
        let map = CategoryMap::study_default();
        assert_eq!(map.len(), 8);
        assert!(map.contains("q-bio.PE"));
        assert_eq!(map.label("cs.AI"), Some("Artificial Intelligence"));
    }
}
