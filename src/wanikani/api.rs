use chrono::{
    DateTime,
    SecondsFormat,
    Utc,
};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use super::types::{
    ApiResponse,
    Assignment,
    AssignmentData,
    AssignmentQuery,
    Collection,
    Resource,
    Subject,
    SubjectData,
    SubjectQuery,
    SubjectType,
};
use crate::core::{
    http::{
        http_client,
        read_json,
        send,
    },
    Service,
    WaniWordsError,
};

const BASE_URL: &str = "https://api.wanikani.com/v2/";
const API_REVISION: &str = "20170710";

/// Read access to a learner's progress. Pagination is the implementor's problem: each call
/// returns every matching record.
pub trait ProgressService {
    fn subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>, WaniWordsError>;

    fn assignments(&self, query: &AssignmentQuery) -> Result<Vec<Assignment>, WaniWordsError>;
}

pub struct WaniKaniClient {
    client: Client,
    api_token: String,
    base_url: String,
}

impl WaniKaniClient {
    pub fn new(api_token: impl Into<String>) -> Result<Self, WaniWordsError> {
        Ok(Self { client: http_client()?, api_token: api_token.into(), base_url: BASE_URL.into() })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Vec<Resource<T>>, WaniWordsError> {
        let mut records = Vec::new();
        let mut request = self.client.get(format!("{}{}", self.base_url, endpoint)).query(params);
        let mut pages = 0;

        loop {
            let resp = send(
                Service::WaniKani,
                request.bearer_auth(&self.api_token).header("Wanikani-Revision", API_REVISION),
            )?;
            let page = into_collection(read_json(Service::WaniKani, resp)?)?;
            pages += 1;
            records.extend(page.data);

            match page.pages.next_url {
                // next_url already carries the original filters
                Some(next_url) => request = self.client.get(next_url),
                None => break,
            }
        }

        tracing::debug!("Fetched {} {} records in {} page(s)", records.len(), endpoint, pages);
        Ok(records)
    }
}

impl ProgressService for WaniKaniClient {
    fn subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>, WaniWordsError> {
        let records = self.fetch_all::<SubjectData>("subjects", &subject_params(query))?;
        Ok(records.into_iter().map(Subject::from).collect())
    }

    fn assignments(&self, query: &AssignmentQuery) -> Result<Vec<Assignment>, WaniWordsError> {
        let records = self.fetch_all::<AssignmentData>("assignments", &assignment_params(query))?;
        Ok(records.into_iter().map(Assignment::from).collect())
    }
}

fn into_collection<T>(response: ApiResponse<T>) -> Result<Collection<T>, WaniWordsError> {
    match response {
        ApiResponse::Collection(collection) => Ok(collection),
        ApiResponse::Error { code: 401, .. } => Err(WaniWordsError::Auth { service: Service::WaniKani }),
        ApiResponse::Error { error, code } => Err(WaniWordsError::Remote {
            service: Service::WaniKani,
            message: format!("{error} (code {code})"),
        }),
    }
}

fn join_types(types: &[SubjectType]) -> String {
    types.iter().map(SubjectType::as_str).collect::<Vec<_>>().join(",")
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn subject_params(query: &SubjectQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("types", join_types(&query.types))];
    if let Some(updated_after) = &query.updated_after {
        params.push(("updated_after", format_timestamp(updated_after)));
    }
    params
}

fn assignment_params(query: &AssignmentQuery) -> Vec<(&'static str, String)> {
    let stages = query.srs_stages.iter().map(u8::to_string).collect::<Vec<_>>().join(",");
    let mut params =
        vec![("subject_types", join_types(&query.subject_types)), ("srs_stages", stages)];
    if let Some(updated_after) = &query.updated_after {
        params.push(("updated_after", format_timestamp(updated_after)));
    }
    params
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::{
            http::tests::{
                closed_port_url,
                CannedServer,
            },
            ErrorKind,
        },
        wanikani::types::VOCABULARY_TYPES,
    };

    fn kanji_assignments() -> AssignmentQuery {
        AssignmentQuery {
            subject_types: vec![SubjectType::Kanji],
            srs_stages: vec![5, 6],
            updated_after: None,
        }
    }

    #[test]
    fn test_query_params() {
        let query = AssignmentQuery {
            subject_types: VOCABULARY_TYPES.to_vec(),
            srs_stages: (1..=9).collect(),
            updated_after: None,
        };
        assert_eq!(
            assignment_params(&query),
            vec![
                ("subject_types", "vocabulary,kana_vocabulary".to_string()),
                ("srs_stages", "1,2,3,4,5,6,7,8,9".to_string()),
            ]
        );

        let synced = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let query = SubjectQuery { types: vec![SubjectType::Kanji], updated_after: Some(synced) };
        assert_eq!(
            subject_params(&query),
            vec![
                ("types", "kanji".to_string()),
                ("updated_after", "2024-03-01T12:30:00.000Z".to_string()),
            ]
        );
    }

    #[test]
    fn test_collection_page() {
        let body = r#"{
            "object": "collection",
            "pages": { "per_page": 1000, "next_url": "https://api.wanikani.com/v2/subjects?page_after_id=440", "previous_url": null },
            "total_count": 2,
            "data": [
                { "id": 440, "object": "kanji", "data": { "characters": "一", "level": 1 } },
                { "id": 1, "object": "radical", "data": { "characters": null, "level": 1 } }
            ]
        }"#;
        let response: ApiResponse<Resource<SubjectData>> = serde_json::from_str(body).unwrap();
        let page = into_collection(response).unwrap();

        assert!(page.pages.next_url.is_some());
        let subjects: Vec<Subject> = page.data.into_iter().map(Subject::from).collect();
        assert_eq!(subjects[0], Subject { id: 440, characters: Some("一".to_string()) });
        assert_eq!(subjects[1].characters, None);
    }

    #[test]
    fn test_assignment_page() {
        let body = r#"{
            "object": "collection",
            "pages": { "next_url": null },
            "data": [
                { "id": 80463006, "object": "assignment", "data": { "subject_id": 8761, "subject_type": "radical", "srs_stage": 8 } }
            ]
        }"#;
        let response: ApiResponse<Resource<AssignmentData>> = serde_json::from_str(body).unwrap();
        let page = into_collection(response).unwrap();
        let assignments: Vec<Assignment> = page.data.into_iter().map(Assignment::from).collect();
        assert_eq!(assignments, vec![Assignment { subject_id: 8761, srs_stage: 8 }]);
    }

    #[test]
    fn test_error_bodies() {
        let response: ApiResponse<SubjectData> =
            serde_json::from_str(r#"{ "error": "Unauthorized. Nice try.", "code": 401 }"#).unwrap();
        let err = into_collection(response).err().unwrap();
        assert_eq!(err.rejected_credential(), Some(Service::WaniKani));

        let response: ApiResponse<SubjectData> =
            serde_json::from_str(r#"{ "error": "Rate limit exceeded", "code": 429 }"#).unwrap();
        match into_collection(response).err().unwrap() {
            WaniWordsError::Remote { service, message } => {
                assert_eq!(service, Service::WaniKani);
                assert_eq!(message, "Rate limit exceeded (code 429)");
            }
            other => panic!("Expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_follows_next_url_across_pages() {
        let server = CannedServer::bind();
        let base_url = server.base_url.clone();
        let first = format!(
            r#"{{ "object": "collection", "pages": {{ "next_url": "{base_url}assignments?page_after_id=1" }},
                "data": [{{ "id": 1, "data": {{ "subject_id": 10, "srs_stage": 5 }} }}] }}"#
        );
        let second = r#"{ "object": "collection", "pages": { "next_url": null },
            "data": [{ "id": 2, "data": { "subject_id": 11, "srs_stage": 6 } }] }"#;
        let handle = server.serve(vec![(200, first), (200, second.to_string())]);

        let client = WaniKaniClient::new("secret-token").unwrap().with_base_url(base_url);
        let assignments = client.assignments(&kanji_assignments()).unwrap();

        assert_eq!(
            assignments,
            vec![
                Assignment { subject_id: 10, srs_stage: 5 },
                Assignment { subject_id: 11, srs_stage: 6 },
            ]
        );

        let requests = handle.join().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("GET /assignments?subject_types=kanji&srs_stages=5%2C6 "));
        assert!(requests[1].starts_with("GET /assignments?page_after_id=1 "));
        for request in &requests {
            let request = request.to_lowercase();
            assert!(request.contains("authorization: bearer secret-token"));
            assert!(request.contains("wanikani-revision: 20170710"));
        }
    }

    #[test]
    fn test_unauthorized_over_http() {
        let server = CannedServer::bind();
        let base_url = server.base_url.clone();
        let handle = server.serve(vec![(
            401,
            r#"{ "error": "Unauthorized. Nice try.", "code": 401 }"#.to_string(),
        )]);

        let client = WaniKaniClient::new("stale").unwrap().with_base_url(base_url);
        let err = client
            .subjects(&SubjectQuery { types: vec![SubjectType::Kanji], updated_after: None })
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.rejected_credential(), Some(Service::WaniKani));
        handle.join().unwrap();
    }

    #[test]
    fn test_unreachable_api_is_network_error() {
        let client = WaniKaniClient::new("secret-token").unwrap().with_base_url(closed_port_url());
        let err = client.assignments(&kanji_assignments()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
