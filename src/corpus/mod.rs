use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::WaniWordsError,
    persistence::{
        load_json,
        save_json,
    },
};

pub mod builder;
pub mod reader;

pub use builder::{
    ColumnMap,
    CorpusBuilder,
    CorpusConfig,
    CorpusSource,
};
pub use reader::{
    FrequencyListReader,
    TopWords,
};

/// Deduplicated corpus words, most frequent first. Stored on disk as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyList {
    words: Vec<String>,
}

impl FrequencyList {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), WaniWordsError> {
        save_json(self, path)?;
        tracing::info!("Wrote {} words to {}", self.words.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, WaniWordsError> {
        load_json(path)?.ok_or_else(|| {
            WaniWordsError::Config(format!(
                "Frequency list {} not found. Run build-corpus first.",
                path.display()
            ))
        })
    }
}
