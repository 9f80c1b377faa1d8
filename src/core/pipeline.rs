use std::time::Instant;

use super::{
    WaniWordsError,
    WordList,
};
use crate::{
    corpus::FrequencyListReader,
    filters::{
        apply_filters,
        FilterStep,
    },
    jpdb::{
        DeckService,
        DeckSynchronizer,
        SyncOptions,
        SyncReport,
        DEFAULT_DECK_NAME,
    },
    wanikani::{
        KnowledgeStore,
        ProgressService,
        RefreshMode,
        RefreshSummary,
    },
};

#[derive(Debug, Clone)]
pub struct StudyListRequest {
    /// How many of the most frequent words to start from.
    pub word_count: usize,
    pub filters: Vec<FilterStep>,
    pub refresh_mode: RefreshMode,
    pub deck_name: String,
    pub sync_options: SyncOptions,
}

impl Default for StudyListRequest {
    fn default() -> Self {
        Self {
            word_count: 1000,
            filters: FilterStep::canonical(),
            refresh_mode: RefreshMode::Incremental,
            deck_name: DEFAULT_DECK_NAME.to_string(),
            sync_options: SyncOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudyListOutcome {
    pub candidates: usize,
    pub truncated: bool,
    pub refresh: Option<RefreshSummary>,
    pub stage_counts: Vec<(FilterStep, usize)>,
    pub words: WordList,
    pub sync: Option<SyncReport>,
}

impl StudyListOutcome {
    pub fn status_message(&self) -> String {
        let mut status = format!(
            "Generated {} new words from the {} most frequent",
            self.words.len(),
            self.candidates
        );
        if self.truncated {
            status.push_str(" (frequency list exhausted)");
        }
        status.push('.');

        match &self.sync {
            Some(report) => {
                let verb = if report.created { "Created" } else { "Updated" };
                status.push_str(&format!(
                    " {} deck \"{}\": {} added, {} obsolete",
                    verb,
                    report.deck.name,
                    report.added_count(),
                    report.removed_count()
                ));
                if report.removed_obsolete {
                    status.push_str(" (removed)");
                }
                status.push('.');
            }
            None => status.push_str(" Deck not updated."),
        }
        status
    }
}

/// Refreshes what the learner knows, filters the top of the frequency list against it and
/// pushes the result to the deck.
///
/// Without `progress` the cached knowledge is used as is; without `deck` nothing is synced.
pub fn generate_study_list<P, D>(
    request: &StudyListRequest,
    frequency_list: &FrequencyListReader,
    knowledge: &mut KnowledgeStore,
    progress: Option<&P>,
    deck: Option<&D>,
) -> Result<StudyListOutcome, WaniWordsError>
where
    P: ProgressService + ?Sized,
    D: DeckService + ?Sized,
{
    let start = Instant::now();

    let refresh = match progress {
        Some(service) => Some(knowledge.refresh(service, request.refresh_mode)?),
        None => {
            tracing::info!("Skipping WaniKani refresh, using cached data");
            None
        }
    };

    tracing::info!("Generating word list of size {}...", request.word_count);
    let top = frequency_list.top_words(request.word_count);
    let candidates = top.words.len();

    let (words, stage_counts) = apply_filters(top.words, &request.filters, knowledge);

    let sync = match deck {
        Some(service) if !request.deck_name.trim().is_empty() => {
            let synchronizer = DeckSynchronizer::new(service, request.sync_options);
            Some(synchronizer.sync(&words, &request.deck_name)?)
        }
        Some(_) => return Err(WaniWordsError::Config("Deck name must not be empty".to_string())),
        None => None,
    };

    tracing::info!("Study list finished ({:.1}s)", start.elapsed().as_secs_f32());
    Ok(StudyListOutcome { candidates, truncated: top.truncated, refresh, stage_counts, words, sync })
}
