use std::collections::HashSet;

use wana_kana::ConvertJapanese;

/// Characters that every learner can already read.
const DEFAULT_KANA: &str = concat!(
    "ぁあぃいぅうゔぇえぉおゕかがきぎくぐゖけげこごさざしじすずせぜそぞただちぢっつづてでとど",
    "なにぬねのはばぱひびぴふぶぷへべぺほぼぽまみむめもゃやゅゆょよらりるれろゎわゐゑをん",
    "ァアィイゥウヴェエォオヵカガキギクグヶケゲコゴサザシジスズセゼソゾタダチヂッツヅテデトド",
    "ナニヌネノハバパヒビピフブプベペホボポマミムメモャヤュユョヨラリルレロヮワヷヰヸヱヹヲヺン",
    "・ー",
);

/// The set of kana characters treated as always known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanaTable {
    characters: HashSet<char>,
}

impl KanaTable {
    pub fn new(characters: impl IntoIterator<Item = char>) -> Self {
        Self { characters: characters.into_iter().collect() }
    }

    pub fn contains(&self, c: char) -> bool {
        self.characters.contains(&c)
    }

    /// True when every character of `word` is in the table. Vacuously true for "".
    pub fn is_kana_only(&self, word: &str) -> bool {
        word.chars().all(|c| self.contains(c))
    }

    pub fn characters(&self) -> &HashSet<char> {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl Default for KanaTable {
    fn default() -> Self {
        Self::new(DEFAULT_KANA.chars())
    }
}

/// Corpora disagree on whether readings are written in hiragana or katakana.
pub fn normalize_reading(reading: &str) -> String {
    reading.trim().to_hiragana()
}
