use reqwest::blocking::Client;
use serde::{
    de::DeserializeOwned,
    Serialize,
};

use super::types::{
    AddVocabularyRequest,
    ApiResponse,
    CreateDeckRequest,
    CreateDeckResponse,
    DeckVocabularyRequest,
    DeckVocabularyResponse,
    EmptyResponse,
    ListDecksRequest,
    ListDecksResponse,
    LookupVocabularyRequest,
    LookupVocabularyResponse,
    ParseRequest,
    ParseResponse,
    RemoveVocabularyRequest,
};
use crate::core::{
    http::{
        http_client,
        read_json,
        send,
    },
    Deck,
    Service,
    VocabularyId,
    WaniWordsError,
};

const BASE_URL: &str = "https://jpdb.io/api/v1/";

/// The deck operations the synchronizer needs from a flashcard service.
pub trait DeckService {
    /// Resolves newline-separated words into vocabulary identities in one request.
    fn parse_vocabulary(&self, words: &[String]) -> Result<Vec<VocabularyId>, WaniWordsError>;

    fn list_decks(&self) -> Result<Vec<Deck>, WaniWordsError>;

    /// Returns the id of the new deck.
    fn create_empty_deck(&self, name: &str, position: usize) -> Result<u64, WaniWordsError>;

    fn deck_vocabulary(&self, deck_id: u64) -> Result<Vec<VocabularyId>, WaniWordsError>;

    /// Spellings in the same order as `ids`; unknown ids are left out.
    fn lookup_spellings(&self, ids: &[VocabularyId]) -> Result<Vec<String>, WaniWordsError>;

    fn add_vocabulary(
        &self,
        deck_id: u64,
        ids: &[VocabularyId],
        replace_existing_occurrences: bool,
    ) -> Result<(), WaniWordsError>;

    fn remove_vocabulary(&self, deck_id: u64, ids: &[VocabularyId]) -> Result<(), WaniWordsError>;
}

pub struct JpdbClient {
    client: Client,
    api_token: String,
    base_url: String,
}

impl JpdbClient {
    pub fn new(api_token: impl Into<String>) -> Result<Self, WaniWordsError> {
        Ok(Self { client: http_client()?, api_token: api_token.into(), base_url: BASE_URL.into() })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn make_request<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, WaniWordsError> {
        tracing::debug!("jpdb request: {}", endpoint);
        let request = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.api_token)
            .json(body);
        let response: ApiResponse<T> = read_json(Service::Jpdb, send(Service::Jpdb, request)?)?;
        into_result(response)
    }
}

impl DeckService for JpdbClient {
    fn parse_vocabulary(&self, words: &[String]) -> Result<Vec<VocabularyId>, WaniWordsError> {
        let text = words.join("\n");
        let response: ParseResponse = self.make_request(
            "parse",
            &ParseRequest {
                text: &text,
                token_fields: Vec::new(),
                vocabulary_fields: vec!["vid", "sid"],
            },
        )?;
        Ok(response.vocabulary)
    }

    fn list_decks(&self) -> Result<Vec<Deck>, WaniWordsError> {
        let response: ListDecksResponse =
            self.make_request("list-user-decks", &ListDecksRequest { fields: vec!["name", "id"] })?;
        Ok(response.decks.into_iter().map(|(name, id)| Deck { name, id }).collect())
    }

    fn create_empty_deck(&self, name: &str, position: usize) -> Result<u64, WaniWordsError> {
        let response: CreateDeckResponse =
            self.make_request("deck/create-empty", &CreateDeckRequest { name, position })?;
        Ok(response.id)
    }

    fn deck_vocabulary(&self, deck_id: u64) -> Result<Vec<VocabularyId>, WaniWordsError> {
        let response: DeckVocabularyResponse = self.make_request(
            "deck/list-vocabulary",
            &DeckVocabularyRequest { id: deck_id, fetch_occurences: false },
        )?;
        Ok(response.vocabulary)
    }

    fn lookup_spellings(&self, ids: &[VocabularyId]) -> Result<Vec<String>, WaniWordsError> {
        let response: LookupVocabularyResponse = self.make_request(
            "lookup-vocabulary",
            &LookupVocabularyRequest { list: ids, fields: vec!["spelling"] },
        )?;
        Ok(response.vocabulary_info.into_iter().flatten().map(|(spelling,)| spelling).collect())
    }

    fn add_vocabulary(
        &self,
        deck_id: u64,
        ids: &[VocabularyId],
        replace_existing_occurrences: bool,
    ) -> Result<(), WaniWordsError> {
        let _: EmptyResponse = self.make_request(
            "deck/add-vocabulary",
            &AddVocabularyRequest {
                id: deck_id,
                vocabulary: ids,
                replace_existing_occurences: replace_existing_occurrences,
            },
        )?;
        Ok(())
    }

    fn remove_vocabulary(&self, deck_id: u64, ids: &[VocabularyId]) -> Result<(), WaniWordsError> {
        let _: EmptyResponse = self.make_request(
            "deck/remove-vocabulary",
            &RemoveVocabularyRequest { id: deck_id, vocabulary: ids },
        )?;
        Ok(())
    }
}

fn into_result<T>(response: ApiResponse<T>) -> Result<T, WaniWordsError> {
    match response {
        ApiResponse::Ok(value) => Ok(value),
        ApiResponse::Error { error, .. } if error == "bad_key" => {
            Err(WaniWordsError::Auth { service: Service::Jpdb })
        }
        ApiResponse::Error { error, error_message } => Err(WaniWordsError::Remote {
            service: Service::Jpdb,
            message: error_message.unwrap_or(error),
        }),
    }
}
