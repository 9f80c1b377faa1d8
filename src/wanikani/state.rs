use std::{
    collections::{
        BTreeMap,
        HashSet,
    },
    path::{
        Path,
        PathBuf,
    },
    time::Instant,
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    api::ProgressService,
    types::{
        AssignmentQuery,
        SubjectQuery,
        SubjectType,
        VOCABULARY_TYPES,
    },
};
use crate::{
    core::{
        utils::KanaTable,
        WaniWordsError,
    },
    persistence::{
        load_json_or_default,
        save_json,
    },
};

pub const MAX_SRS_STAGE: u8 = 9;
/// Guru
pub const DEFAULT_KANJI_STAGE: u8 = 5;
/// Apprentice
pub const DEFAULT_VOCABULARY_STAGE: u8 = 1;

#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Kanji count as readable from this SRS stage on.
    pub kanji_min_stage: u8,
    /// Vocabulary counts as known once studying has started at this stage.
    pub vocabulary_min_stage: u8,
    pub kana: KanaTable,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            kanji_min_stage: DEFAULT_KANJI_STAGE,
            vocabulary_min_stage: DEFAULT_VOCABULARY_STAGE,
            kana: KanaTable::default(),
        }
    }
}

/// Everything we remember about the learner between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeCache {
    #[serde(default)]
    pub kanji_subjects: BTreeMap<u64, String>,
    #[serde(default)]
    pub vocabulary_subjects: BTreeMap<u64, String>,
    #[serde(default)]
    pub kanji_assignments: BTreeMap<u64, u8>,
    #[serde(default)]
    pub vocabulary_assignments: BTreeMap<u64, u8>,
    #[serde(default)]
    pub last_synced: Option<DateTime<Utc>>,
}

impl KnowledgeCache {
    pub fn is_empty(&self) -> bool {
        self.kanji_subjects.is_empty()
            && self.vocabulary_subjects.is_empty()
            && self.kanji_assignments.is_empty()
            && self.vocabulary_assignments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Only fetch records changed since the last sync.
    #[default]
    Incremental,
    /// Forget the cache and fetch everything.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSummary {
    pub kanji_subjects: usize,
    pub vocabulary_subjects: usize,
    pub kanji_assignments: usize,
    pub vocabulary_assignments: usize,
    pub incremental: bool,
}

/// Records fetched by one refresh, before they are merged into the cache.
struct FetchedRecords {
    kanji_subjects: BTreeMap<u64, String>,
    vocabulary_subjects: BTreeMap<u64, String>,
    kanji_assignments: BTreeMap<u64, u8>,
    vocabulary_assignments: BTreeMap<u64, u8>,
}

pub struct KnowledgeStore {
    cache: KnowledgeCache,
    cache_path: PathBuf,
    config: KnowledgeConfig,
}

impl KnowledgeStore {
    /// A missing cache means first run; a corrupt one is discarded. Either way the remote
    /// service can rebuild it.
    pub fn load(cache_path: impl Into<PathBuf>, config: KnowledgeConfig) -> Self {
        let cache_path = cache_path.into();
        let cache: KnowledgeCache = load_json_or_default(&cache_path);
        Self { cache, cache_path, config }
    }

    pub fn from_cache(
        cache: KnowledgeCache,
        cache_path: impl Into<PathBuf>,
        config: KnowledgeConfig,
    ) -> Self {
        Self { cache, cache_path: cache_path.into(), config }
    }

    pub fn cache(&self) -> &KnowledgeCache {
        &self.cache
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn kana(&self) -> &KanaTable {
        &self.config.kana
    }

    /// Pulls the learner's progress and merges it into the cache, then writes the cache.
    ///
    /// Nothing is merged or written unless all four fetches succeed.
    pub fn refresh<S: ProgressService + ?Sized>(
        &mut self,
        service: &S,
        mode: RefreshMode,
    ) -> Result<RefreshSummary, WaniWordsError> {
        self.check_thresholds()?;
        let start = Instant::now();
        let started_at = Utc::now();
        let updated_after = match mode {
            RefreshMode::Incremental => self.cache.last_synced,
            RefreshMode::Full => None,
        };

        match updated_after {
            Some(ts) => tracing::info!("Downloading WaniKani changes since {}", ts),
            None => tracing::info!("Downloading all WaniKani data"),
        }

        let fetched = self.fetch(service, updated_after)?;
        let summary = RefreshSummary {
            kanji_subjects: fetched.kanji_subjects.len(),
            vocabulary_subjects: fetched.vocabulary_subjects.len(),
            kanji_assignments: fetched.kanji_assignments.len(),
            vocabulary_assignments: fetched.vocabulary_assignments.len(),
            incremental: updated_after.is_some(),
        };

        let mut staged = match mode {
            RefreshMode::Incremental => self.cache.clone(),
            RefreshMode::Full => KnowledgeCache::default(),
        };
        staged.kanji_subjects.extend(fetched.kanji_subjects);
        staged.vocabulary_subjects.extend(fetched.vocabulary_subjects);
        staged.kanji_assignments.extend(fetched.kanji_assignments);
        staged.vocabulary_assignments.extend(fetched.vocabulary_assignments);
        staged.last_synced = Some(started_at);

        save_json(&staged, &self.cache_path)?;
        self.cache = staged;

        tracing::info!(
            "WaniKani data updated ({} kanji assignments, {} vocabulary assignments, {:.1}s)",
            self.cache.kanji_assignments.len(),
            self.cache.vocabulary_assignments.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(summary)
    }

    // An empty srs_stages filter would still be sent, and would match nothing.
    fn check_thresholds(&self) -> Result<(), WaniWordsError> {
        let thresholds = [
            ("kanji", self.config.kanji_min_stage),
            ("vocabulary", self.config.vocabulary_min_stage),
        ];
        for (label, stage) in thresholds {
            if !(1..=MAX_SRS_STAGE).contains(&stage) {
                return Err(WaniWordsError::Config(format!(
                    "{label} SRS stage must be between 1 and {MAX_SRS_STAGE}, got {stage}"
                )));
            }
        }
        Ok(())
    }

    // The four fetches are independent of each other and of the cache.
    fn fetch<S: ProgressService + ?Sized>(
        &self,
        service: &S,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<FetchedRecords, WaniWordsError> {
        let kanji_assignments = service
            .assignments(&AssignmentQuery {
                subject_types: vec![SubjectType::Kanji],
                srs_stages: stages_from(self.config.kanji_min_stage),
                updated_after,
            })?
            .into_iter()
            .map(|a| (a.subject_id, a.srs_stage))
            .collect();

        let vocabulary_assignments = service
            .assignments(&AssignmentQuery {
                subject_types: VOCABULARY_TYPES.to_vec(),
                srs_stages: stages_from(self.config.vocabulary_min_stage),
                updated_after,
            })?
            .into_iter()
            .map(|a| (a.subject_id, a.srs_stage))
            .collect();

        let kanji_subjects = service
            .subjects(&SubjectQuery { types: vec![SubjectType::Kanji], updated_after })?
            .into_iter()
            .filter_map(|s| s.characters.map(|c| (s.id, c)))
            .collect();

        let vocabulary_subjects = service
            .subjects(&SubjectQuery { types: VOCABULARY_TYPES.to_vec(), updated_after })?
            .into_iter()
            .filter_map(|s| s.characters.map(|c| (s.id, c)))
            .collect();

        Ok(FetchedRecords {
            kanji_subjects,
            vocabulary_subjects,
            kanji_assignments,
            vocabulary_assignments,
        })
    }

    /// Characters of every kanji at or past the kanji threshold.
    pub fn known_kanji(&self) -> HashSet<char> {
        cross_reference(
            &self.cache.kanji_assignments,
            &self.cache.kanji_subjects,
            self.config.kanji_min_stage,
            "kanji",
        )
        .flat_map(|characters| characters.chars())
        .collect()
    }

    pub fn known_vocabulary(&self) -> HashSet<String> {
        cross_reference(
            &self.cache.vocabulary_assignments,
            &self.cache.vocabulary_subjects,
            self.config.vocabulary_min_stage,
            "vocabulary",
        )
        .cloned()
        .collect()
    }

    /// Kana plus known kanji: everything the learner can read on its own.
    pub fn known_characters(&self) -> HashSet<char> {
        let mut characters = self.known_kanji();
        characters.extend(self.config.kana.characters().iter().copied());
        characters
    }
}

fn stages_from(min_stage: u8) -> Vec<u8> {
    (min_stage.max(1)..=MAX_SRS_STAGE).collect()
}

/// Subject characters for every assignment at or above `min_stage`. Assignments whose
/// subject is not cached yet are skipped; WaniKani can publish the assignment first.
fn cross_reference<'a>(
    assignments: &'a BTreeMap<u64, u8>,
    subjects: &'a BTreeMap<u64, String>,
    min_stage: u8,
    label: &'a str,
) -> impl Iterator<Item = &'a String> + 'a {
    assignments.iter().filter(move |(_, stage)| **stage >= min_stage).filter_map(
        move |(subject_id, _)| {
            let characters = subjects.get(subject_id);
            if characters.is_none() {
                tracing::warn!("No {} subject cached for assignment subject {}", label, subject_id);
            }
            characters
        },
    )
}
