use std::fmt;

use crate::{
    core::WordList,
    wanikani::KnowledgeStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    KnownVocabulary,
    UnknownKanji,
    KanaOnly,
}

/// One filter and whether its keep/drop decision is flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterStep {
    pub kind: FilterKind,
    pub invert: bool,
}

impl FilterStep {
    pub fn new(kind: FilterKind) -> Self {
        Self { kind, invert: false }
    }

    pub fn inverted(kind: FilterKind) -> Self {
        Self { kind, invert: true }
    }

    /// Known vocabulary, then unknown kanji, then kana-only words.
    pub fn canonical() -> Vec<FilterStep> {
        vec![
            FilterStep::new(FilterKind::KnownVocabulary),
            FilterStep::new(FilterKind::UnknownKanji),
            FilterStep::new(FilterKind::KanaOnly),
        ]
    }

    pub fn apply(&self, words: &[String], knowledge: &KnowledgeStore) -> WordList {
        match self.kind {
            FilterKind::KnownVocabulary => remove_known_vocabulary(words, knowledge, self.invert),
            FilterKind::UnknownKanji => remove_unknown_kanji(words, knowledge, self.invert),
            FilterKind::KanaOnly => remove_kana_only(words, knowledge, self.invert),
        }
    }
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            FilterKind::KnownVocabulary => "known vocabulary",
            FilterKind::UnknownKanji => "unknown kanji",
            FilterKind::KanaOnly => "kana-only words",
        };
        if self.invert {
            write!(f, "keep only {}", name)
        } else {
            write!(f, "remove {}", name)
        }
    }
}

/// Drops words the learner has already started studying.
pub fn remove_known_vocabulary(
    words: &[String],
    knowledge: &KnowledgeStore,
    invert: bool,
) -> WordList {
    let known_vocabulary = knowledge.known_vocabulary();
    retain(words, |word| !known_vocabulary.contains(word), invert)
}

/// Drops words containing a character that is neither kana nor a known kanji.
pub fn remove_unknown_kanji(words: &[String], knowledge: &KnowledgeStore, invert: bool) -> WordList {
    let known_characters = knowledge.known_characters();
    retain(words, |word| word.chars().all(|c| known_characters.contains(&c)), invert)
}

/// Drops words written entirely in kana.
pub fn remove_kana_only(words: &[String], knowledge: &KnowledgeStore, invert: bool) -> WordList {
    let kana = knowledge.kana();
    retain(words, |word| !kana.is_kana_only(word), invert)
}

/// Runs `steps` in order and reports how many words survived each one.
pub fn apply_filters(
    words: WordList,
    steps: &[FilterStep],
    knowledge: &KnowledgeStore,
) -> (WordList, Vec<(FilterStep, usize)>) {
    let mut counts = Vec::with_capacity(steps.len());
    let words = steps.iter().fold(words, |words, step| {
        let filtered = step.apply(&words, knowledge);
        tracing::info!("Filter '{}': {} -> {} words", step, words.len(), filtered.len());
        counts.push((*step, filtered.len()));
        filtered
    });
    (words, counts)
}

fn retain(words: &[String], keep: impl Fn(&str) -> bool, invert: bool) -> WordList {
    words.iter().filter(|word| keep(word) ^ invert).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wanikani::state::tests::store_knowing;

    fn words(list: &[&str]) -> WordList {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_remove_unknown_kanji() {
        let store = store_knowing(&["猫"], &[]);
        let input = words(&["は", "猫", "犬", "ネコ"]);

        assert_eq!(remove_unknown_kanji(&input, &store, false), words(&["は", "猫", "ネコ"]));
        assert_eq!(remove_unknown_kanji(&input, &store, true), words(&["犬"]));
    }

    #[test]
    fn test_remove_known_vocabulary() {
        let store = store_knowing(&[], &["猫"]);
        let input = words(&["は", "猫", "犬"]);

        assert_eq!(remove_known_vocabulary(&input, &store, false), words(&["は", "犬"]));
        assert_eq!(remove_known_vocabulary(&input, &store, true), words(&["猫"]));
    }

    #[test]
    fn test_remove_kana_only() {
        let store = store_knowing(&[], &[]);
        let input = words(&["は", "猫", "お茶", "ネコ", "ラーメン"]);

        assert_eq!(remove_kana_only(&input, &store, false), words(&["猫", "お茶"]));
        assert_eq!(remove_kana_only(&input, &store, true), words(&["は", "ネコ", "ラーメン"]));
    }

    #[test]
    fn test_filters_are_idempotent() {
        let store = store_knowing(&["猫", "子"], &["子猫"]);
        let input = words(&["は", "猫", "子猫", "犬", "ネコ", "子", "お茶"]);

        for step in FilterStep::canonical() {
            for invert in [false, true] {
                let step = FilterStep { invert, ..step };
                let once = step.apply(&input, &store);
                assert_eq!(step.apply(&once, &store), once, "{} not idempotent", step);
            }
        }
    }

    #[test]
    fn test_invert_partitions_and_preserves_order() {
        let store = store_knowing(&["猫", "子"], &["子猫", "は"]);
        let input = words(&["は", "猫", "子猫", "犬", "ネコ", "子", "お茶"]);

        for kind in [FilterKind::KnownVocabulary, FilterKind::UnknownKanji, FilterKind::KanaOnly] {
            let kept = FilterStep::new(kind).apply(&input, &store);
            let dropped = FilterStep::inverted(kind).apply(&input, &store);

            assert_eq!(kept.len() + dropped.len(), input.len());
            assert!(kept.iter().all(|w| !dropped.contains(w)));

            // Both halves are subsequences of the input
            for half in [&kept, &dropped] {
                let mut remaining = input.iter();
                assert!(half.iter().all(|w| remaining.any(|i| i == w)));
            }
        }
    }

    #[test]
    fn test_apply_filters_canonical_order() {
        let store = store_knowing(&["猫", "子"], &["猫"]);
        let input = words(&["は", "猫", "犬", "子猫", "ネコ", "子供"]);

        let (result, counts) = apply_filters(input, &FilterStep::canonical(), &store);

        assert_eq!(result, words(&["子猫"]));
        assert_eq!(
            counts,
            vec![
                (FilterStep::new(FilterKind::KnownVocabulary), 5),
                (FilterStep::new(FilterKind::UnknownKanji), 3),
                (FilterStep::new(FilterKind::KanaOnly), 1),
            ]
        );
    }

    #[test]
    fn test_filters_do_not_touch_knowledge() {
        let store = store_knowing(&["猫"], &["猫"]);
        let before = store.cache().clone();
        let input = words(&["猫", "犬"]);

        apply_filters(input, &FilterStep::canonical(), &store);
        assert_eq!(store.cache(), &before);
    }
}
