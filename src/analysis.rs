//! Word-frequency analysis over translated headlines.
//!
//! Titles are lowercased and split into `\w+` tokens (Unicode word
//! characters). Counts keep the order in which each word was first seen, and
//! that is also the order [`WordFrequencyReport::repeated`] reports in.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Words must appear strictly more often than this to be reported.
pub const REPEAT_THRESHOLD: usize = 2;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WordFrequencyReport {
    counts: IndexMap<String, usize>,
}

impl WordFrequencyReport {
    pub fn analyze<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = IndexMap::new();
        for title in titles {
            let lowered = title.as_ref().to_lowercase();
            for word in WORD.find_iter(&lowered) {
                *counts.entry(word.as_str().to_string()).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Every word seen, in first-seen order.
    pub fn counts(&self) -> &IndexMap<String, usize> {
        &self.counts
    }

    /// Words seen more than [`REPEAT_THRESHOLD`] times, in first-seen order.
    pub fn repeated(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.counts
            .iter()
            .filter(|(_, count)| **count > REPEAT_THRESHOLD)
            .map(|(word, count)| (word.as_str(), *count))
    }

    pub fn repeated_map(&self) -> IndexMap<String, usize> {
        self.repeated()
            .map(|(word, count)| (word.to_string(), count))
            .collect()
    }
}
