use std::path::Path;

use super::FrequencyList;
use crate::core::{
    WaniWordsError,
    WordList,
};

/// The head of the frequency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopWords {
    pub words: WordList,
    /// Fewer words were available than requested.
    pub truncated: bool,
}

pub struct FrequencyListReader {
    list: FrequencyList,
}

impl FrequencyListReader {
    pub fn open(path: &Path) -> Result<Self, WaniWordsError> {
        let list = FrequencyList::load(path)?;
        tracing::debug!("Loaded frequency list with {} words", list.len());
        Ok(Self { list })
    }

    pub fn from_list(list: FrequencyList) -> Self {
        Self { list }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn top_words(&self, n: usize) -> TopWords {
        let available = self.list.len();
        if available < n {
            tracing::warn!(
                "Frequency list doesn't contain {} words. Could only retrieve {}.",
                n,
                available
            );
        }

        TopWords { words: self.list.words().iter().take(n).cloned().collect(), truncated: available < n }
    }
}
