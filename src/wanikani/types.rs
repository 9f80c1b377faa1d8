use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectType {
    Kanji,
    Vocabulary,
    KanaVocabulary,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Kanji => "kanji",
            SubjectType::Vocabulary => "vocabulary",
            SubjectType::KanaVocabulary => "kana_vocabulary",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const VOCABULARY_TYPES: &[SubjectType] =
    &[SubjectType::Vocabulary, SubjectType::KanaVocabulary];

/// `GET /subjects` filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectQuery {
    pub types: Vec<SubjectType>,
    pub updated_after: Option<DateTime<Utc>>,
}

/// `GET /assignments` filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentQuery {
    pub subject_types: Vec<SubjectType>,
    pub srs_stages: Vec<u8>,
    pub updated_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: u64,
    /// Radicals and a few image-only subjects have no characters.
    pub characters: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub subject_id: u64,
    pub srs_stage: u8,
}

// Wire format

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiResponse<T> {
    Error { error: String, code: u16 },
    Collection(Collection<T>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct Collection<T> {
    pub pages: Pages,
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pages {
    pub next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Resource<T> {
    pub id: u64,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectData {
    pub characters: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentData {
    pub subject_id: u64,
    pub srs_stage: u8,
}

impl From<Resource<SubjectData>> for Subject {
    fn from(resource: Resource<SubjectData>) -> Self {
        Subject { id: resource.id, characters: resource.data.characters }
    }
}

impl From<Resource<AssignmentData>> for Assignment {
    fn from(resource: Resource<AssignmentData>) -> Self {
        Assignment { subject_id: resource.data.subject_id, srs_stage: resource.data.srs_stage }
    }
}
