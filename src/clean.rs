//! Abstract normalization and lemma tokenization.
//!
//! [`clean`] is a pure string transform. [`Tokenizer`] owns the stop-word list and the
//! lemmatizer; build it once and hand it to every stage that needs it.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use stop_words::LANGUAGE;

/// Replacement for every digit run.
pub const NUMBER_SENTINEL: &str = "number";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Normalize raw abstract text.
///
/// 1. runs of non-word characters become one space
/// 2. digit runs become [`NUMBER_SENTINEL`]
/// 3. lowercase, then trim
///
/// # Example
/// ```
/// use arxiv_topics::clean::clean;
/// assert_eq!(clean("  GPT-4 beats 2 baselines!"), "gpt number beats number baselines");
/// ```
pub fn clean(text: &str) -> String {
    let spaced = NON_WORD.replace_all(text, " ");
    let numbered = DIGITS.replace_all(&spaced, NUMBER_SENTINEL);
    numbered.to_lowercase().trim().to_string()
}

/// Maps a surface token to its dictionary form.
pub trait Lemmatizer {
    fn lemma(&self, token: &str) -> String;
}

/// Snowball stemmer standing in for a full lemmatizer.
pub struct SnowballLemmatizer {
    stemmer: Stemmer,
}

impl SnowballLemmatizer {
    pub fn english() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Lemmatizer for SnowballLemmatizer {
    fn lemma(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }
}

/// Leaves tokens untouched.
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemma(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Splits cleaned text, drops noise tokens, and lemmatizes what is left.
pub struct Tokenizer {
    stopwords: HashSet<String>,
    lemmatizer: Box<dyn Lemmatizer + Send + Sync>,
}

impl Tokenizer {
    /// English stop words and the Snowball English stemmer.
    pub fn english() -> Self {
        let words = stop_words::get(LANGUAGE::English)
            .iter()
            .map(|w| w.to_lowercase());
        Self::with_stopwords(words, Box::new(SnowballLemmatizer::english()))
    }

    /// Custom stop words; the digit sentinel is never treated as one.
    pub fn with_stopwords<I, S>(stopwords: I, lemmatizer: Box<dyn Lemmatizer + Send + Sync>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stopwords: HashSet<String> = stopwords.into_iter().map(Into::into).collect();
        stopwords.remove(NUMBER_SENTINEL);
        Self {
            stopwords,
            lemmatizer,
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Lemmas of `clean_text` in order. Expects output of [`clean`].
    pub fn tokenize(&self, clean_text: &str) -> Vec<String> {
        clean_text
            .split_whitespace()
            .filter(|tok| tok.chars().all(char::is_alphabetic))
            .filter(|tok| tok.chars().count() > 1)
            .filter(|tok| !self.is_stopword(tok))
            .map(|tok| self.lemmatizer.lemma(tok))
            .collect()
    }

    /// [`clean`] followed by [`Tokenizer::tokenize`].
    pub fn clean_and_tokenize(&self, raw: &str) -> (String, Vec<String>) {
        let cleaned = clean(raw);
        let tokens = self.tokenize(&cleaned);
        (cleaned, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_punctuation_and_digits() {
        assert_eq!(clean("Neural networks learn 3 tasks."), "neural networks learn number tasks");
        assert_eq!(clean("(a) 10,000 -- b"), "a number number b");
        assert_eq!(clean("   "), "");
    }

    #[test]
    fn underscores_survive_cleaning_but_not_tokenizing() {
        let t = Tokenizer::with_stopwords(Vec::<String>::new(), Box::new(IdentityLemmatizer));
        let cleaned = clean("snake_case word");
        assert_eq!(cleaned, "snake_case word");
        assert_eq!(t.tokenize(&cleaned), vec!["word"]);
    }

    #[test]
    fn drops_short_and_stop_tokens() {
        let t = Tokenizer::with_stopwords(["the", "of"], Box::new(IdentityLemmatizer));
        assert_eq!(
            t.tokenize("the x theory of graphs"),
            vec!["theory", "graphs"]
        );
    }

    #[test]
    fn sentinel_is_never_a_stopword() {
        let t = Tokenizer::with_stopwords(["number", "the"], Box::new(IdentityLemmatizer));
        assert!(!t.is_stopword(NUMBER_SENTINEL));
        assert_eq!(t.tokenize("the number"), vec!["number"]);
    }

    #[test]
    fn english_pipeline_end_to_end() {
        let t = Tokenizer::english();
        let (cleaned, tokens) = t.clean_and_tokenize("Neural networks learn 3 tasks.");
        assert_eq!(cleaned, "neural networks learn number tasks");
        assert!(tokens.contains(&"number".to_string()));
        assert!(tokens.contains(&"network".to_string()));
        assert!(tokens.contains(&"task".to_string()));
        assert!(!tokens.iter().any(|t| t.chars().any(|c| c.is_ascii_digit())));
    }

    #[test]
    fn english_stopwords_removed() {
        let t = Tokenizer::english();
        let tokens = t.tokenize("the model and the data");
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"and".to_string()));
    }
}
