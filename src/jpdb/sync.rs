use std::collections::HashSet;

use super::api::DeckService;
use crate::core::{
    Deck,
    VocabularyId,
    WaniWordsError,
};

pub const DEFAULT_DECK_NAME: &str = "WaniWords";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Also delete vocabulary that is no longer in the target list. Off by default: obsolete
    /// items are only reported.
    pub remove_obsolete: bool,
    /// Look up spellings of added and obsolete items for display.
    pub report_spellings: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { remove_obsolete: false, report_spellings: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub deck: Deck,
    pub created: bool,
    pub added: Vec<VocabularyId>,
    /// In the deck but not in the target list.
    pub obsolete: Vec<VocabularyId>,
    /// Whether `obsolete` was actually deleted from the deck.
    pub removed_obsolete: bool,
    pub added_spellings: Vec<String>,
    pub obsolete_spellings: Vec<String>,
}

impl SyncReport {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn removed_count(&self) -> usize {
        self.obsolete.len()
    }
}

pub struct DeckSynchronizer<'a, D: DeckService + ?Sized> {
    service: &'a D,
    options: SyncOptions,
}

impl<'a, D: DeckService + ?Sized> DeckSynchronizer<'a, D> {
    pub fn new(service: &'a D, options: SyncOptions) -> Self {
        Self { service, options }
    }

    /// Makes the deck named `deck_name` hold the vocabulary of `words`, creating the deck
    /// when needed. Only the missing items are sent, so running it twice is a no-op.
    pub fn sync(&self, words: &[String], deck_name: &str) -> Result<SyncReport, WaniWordsError> {
        let target = dedup(self.service.parse_vocabulary(words)?);
        tracing::info!("Resolved {} words into {} vocabulary items", words.len(), target.len());

        let (deck, created) = self.find_or_create_deck(deck_name)?;
        let current = self.service.deck_vocabulary(deck.id)?;

        let (added, obsolete) = differences(&target, &current);
        tracing::info!(
            "Deck \"{}\": {} to add, {} obsolete",
            deck.name,
            added.len(),
            obsolete.len()
        );

        // Spellings are only worth showing when there was an existing deck to compare to.
        let (added_spellings, obsolete_spellings) = if self.options.report_spellings && !created {
            (self.spellings(&added)?, self.spellings(&obsolete)?)
        } else {
            (Vec::new(), Vec::new())
        };

        if !added.is_empty() {
            self.service.add_vocabulary(deck.id, &added, true)?;
        }

        let removed_obsolete = self.options.remove_obsolete && !obsolete.is_empty();
        if removed_obsolete {
            self.service.remove_vocabulary(deck.id, &obsolete)?;
        }

        Ok(SyncReport {
            deck,
            created,
            added,
            obsolete,
            removed_obsolete,
            added_spellings,
            obsolete_spellings,
        })
    }

    fn find_or_create_deck(&self, deck_name: &str) -> Result<(Deck, bool), WaniWordsError> {
        let decks = self.service.list_decks()?;
        if let Some(deck) = decks.iter().find(|deck| deck.name == deck_name) {
            tracing::info!("Existing \"{}\" deck found", deck_name);
            return Ok((deck.clone(), false));
        }

        tracing::info!("Existing \"{}\" deck NOT found! Creating deck...", deck_name);
        let id = self.service.create_empty_deck(deck_name, decks.len())?;
        Ok((Deck { name: deck_name.to_string(), id }, true))
    }

    fn spellings(&self, ids: &[VocabularyId]) -> Result<Vec<String>, WaniWordsError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.service.lookup_spellings(ids)
    }
}

fn dedup(ids: Vec<VocabularyId>) -> Vec<VocabularyId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// `(target - current, current - target)`, each in its source order.
fn differences(
    target: &[VocabularyId],
    current: &[VocabularyId],
) -> (Vec<VocabularyId>, Vec<VocabularyId>) {
    let target_set: HashSet<&VocabularyId> = target.iter().collect();
    let current_set: HashSet<&VocabularyId> = current.iter().collect();

    let added = target.iter().filter(|id| !current_set.contains(id)).copied().collect();
    let obsolete = current.iter().filter(|id| !target_set.contains(id)).copied().collect();
    (added, obsolete)
}
