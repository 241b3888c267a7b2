//! Token pipeline: lowercase, stopword filter, English stemmer

use crate::config::StopwordsConfig;
use crate::index::stopwords::{builtin_stopwords, load_stopwords};
use crate::index::IndexResult;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Turns extracted words into index terms
pub struct Analyzer {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
}

impl Analyzer {
    pub fn new(stopwords: impl IntoIterator<Item = String>) -> Self {
        Self {
            stopwords: stopwords.into_iter().collect(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Analyzer with the built-in English stopword list
    pub fn english() -> Self {
        Self::new(builtin_stopwords())
    }

    /// Builds the analyzer from config, loading the list file if one is set
    pub fn from_config(config: &StopwordsConfig) -> IndexResult<Self> {
        match &config.path {
            Some(path) => {
                let words = load_stopwords(Path::new(path))?;
                tracing::info!("Loaded {} stopwords from {}", words.len(), path);
                Ok(Self::new(words))
            }
            None => Ok(Self::english()),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// Runs one word through the pipeline; `None` if it is filtered out
    pub fn analyze_word(&self, word: &str) -> Option<String> {
        let lower = word.to_lowercase();
        if lower.is_empty() || self.stopwords.contains(&lower) {
            return None;
        }
        let stem = self.stemmer.stem(&lower);
        if stem.is_empty() {
            None
        } else {
            Some(stem.into_owned())
        }
    }

    /// Runs every word through the pipeline, keeping order
    pub fn analyze<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        words
            .iter()
            .filter_map(|word| self.analyze_word(word.as_ref()))
            .collect()
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

/// Normalizes a query the same way indexed words are: trim, lowercase, stem
///
/// Stopwords are not removed from queries; a stopword simply has no postings.
/// Returns `None` for blank queries or when stemming leaves nothing.
pub fn stem_query(query: &str) -> Option<String> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return None;
    }
    let stem = Stemmer::create(Algorithm::English).stem(&term).into_owned();
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}
