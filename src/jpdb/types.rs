use serde::{
    Deserialize,
    Serialize,
};

use crate::core::VocabularyId;

/// Every jpdb endpoint answers with either its payload or an error object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiResponse<T> {
    Error { error: String, error_message: Option<String> },
    Ok(T),
}

#[derive(Debug, Serialize)]
pub(crate) struct ParseRequest<'a> {
    pub text: &'a str,
    pub token_fields: Vec<&'static str>,
    pub vocabulary_fields: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParseResponse {
    pub vocabulary: Vec<VocabularyId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListDecksRequest {
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListDecksResponse {
    /// `[name, id]` rows, in the requested field order.
    pub decks: Vec<(String, u64)>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateDeckRequest<'a> {
    pub name: &'a str,
    pub position: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateDeckResponse {
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeckVocabularyRequest {
    pub id: u64,
    pub fetch_occurences: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeckVocabularyResponse {
    pub vocabulary: Vec<VocabularyId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LookupVocabularyRequest<'a> {
    pub list: &'a [VocabularyId],
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupVocabularyResponse {
    /// One row per requested id, `null` for ids jpdb no longer knows.
    pub vocabulary_info: Vec<Option<(String,)>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddVocabularyRequest<'a> {
    pub id: u64,
    pub vocabulary: &'a [VocabularyId],
    pub replace_existing_occurences: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveVocabularyRequest<'a> {
    pub id: u64,
    pub vocabulary: &'a [VocabularyId],
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmptyResponse {}
