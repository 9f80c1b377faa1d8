use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// Words in frequency order (most frequent first). Filtering only ever removes entries.
pub type WordList = Vec<String>;

/// One spelling of one vocabulary entry on jpdb. Serialized as `[vid, sid]`.
///
/// Alternate spellings of the same word share a `vid` but carry different `sid`s, so the
/// pair (not the surface string) decides whether two items are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VocabularyId(pub u64, pub u64);

impl VocabularyId {
    pub fn vid(&self) -> u64 {
        self.0
    }

    pub fn sid(&self) -> u64 {
        self.1
    }
}

impl fmt::Display for VocabularyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub name: String,
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_id_wire_format() {
        let id = VocabularyId(1_234_560, 3_000_001);
        assert_eq!(serde_json::to_string(&id).unwrap(), "[1234560,3000001]");

        let parsed: Vec<VocabularyId> = serde_json::from_str("[[1,2],[1,3]]").unwrap();
        assert_eq!(parsed, vec![VocabularyId(1, 2), VocabularyId(1, 3)]);
        assert_ne!(parsed[0], parsed[1]); // Same vocabulary, different spelling
        assert_eq!(parsed[1].vid(), 1);
        assert_eq!(parsed[1].sid(), 3);
    }
}
