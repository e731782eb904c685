//! Topic coherence as mean normalized PMI over document co-occurrence.
//!
//! This is plain NPMI with whole-document windows, not the sliding-window `C_V` measure,
//! so the numbers are not comparable with `C_V` scores. Every document is one boolean
//! window. Scoring touches every document once per topic, so expect it to be slow on a
//! full corpus.

use std::collections::HashSet;

use serde::Serialize;

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoherenceReport {
    pub per_topic: Vec<f64>,
    pub mean: f64,
}

/// Score the first `top_n` terms of each topic against `docs`.
///
/// Scores lie in `[-1, 1]`. Topics with fewer than two terms score 0.
pub fn npmi(topics: &[Vec<String>], docs: &[Vec<String>], top_n: usize) -> CoherenceReport {
    let doc_sets: Vec<HashSet<&str>> = docs
        .iter()
        .map(|d| d.iter().map(String::as_str).collect())
        .collect();
    let n = doc_sets.len() as f64;

    let per_topic: Vec<f64> = topics
        .iter()
        .map(|topic| {
            let terms: Vec<&str> = topic.iter().take(top_n).map(String::as_str).collect();
            topic_npmi(&terms, &doc_sets, n)
        })
        .collect();

    let mean = if per_topic.is_empty() {
        0.0
    } else {
        per_topic.iter().sum::<f64>() / per_topic.len() as f64
    };
    CoherenceReport { per_topic, mean }
}

fn topic_npmi(terms: &[&str], doc_sets: &[HashSet<&str>], n: f64) -> f64 {
    if terms.len() < 2 || n == 0.0 {
        return 0.0;
    }
    let k = terms.len();
    let mut single = vec![0usize; k];
    let mut joint = vec![vec![0usize; k]; k];
    for doc in doc_sets {
        let present: Vec<usize> = (0..k).filter(|&i| doc.contains(terms[i])).collect();
        for (a, &i) in present.iter().enumerate() {
            single[i] += 1;
            for &j in &present[a + 1..] {
                joint[i][j] += 1;
            }
        }
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..k {
        for j in i + 1..k {
            total += pair_npmi(
                single[i] as f64 / n,
                single[j] as f64 / n,
                joint[i][j] as f64 / n,
            );
            pairs += 1;
        }
    }
    total / pairs as f64
}

fn pair_npmi(p_i: f64, p_j: f64, p_ij: f64) -> f64 {
    if p_ij >= 1.0 {
        return 1.0;
    }
    if p_i == 0.0 || p_j == 0.0 {
        return -1.0;
    }
    let pmi = ((p_ij + EPSILON) / (p_i * p_j)).ln();
    pmi / -(p_ij + EPSILON).ln()
}
