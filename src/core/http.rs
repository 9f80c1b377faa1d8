use std::time::Duration;

use reqwest::{
    blocking::{
        Client,
        RequestBuilder,
        Response,
    },
    header::{
        HeaderMap,
        HeaderValue,
        USER_AGENT,
    },
};
use serde::de::DeserializeOwned;

use crate::core::{
    Service,
    WaniWordsError,
};

pub fn http_client() -> Result<Client, WaniWordsError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("waniwords/0.1 (+reqwest)"));

    Client::builder()
        .timeout(Duration::from_secs(60))
        .default_headers(headers)
        .build()
        .map_err(|e| WaniWordsError::Custom(format!("HTTP client build failed: {e}")))
}

/// Sends the request. Anything that fails before a response arrives is a network error.
pub fn send(service: Service, request: RequestBuilder) -> Result<Response, WaniWordsError> {
    request.send().map_err(|e| WaniWordsError::network(service, e))
}

/// Decodes a JSON body. Both services put their error payloads in the body, so the status
/// code only matters when the body is not the JSON we expected.
pub fn read_json<T: DeserializeOwned>(service: Service, resp: Response) -> Result<T, WaniWordsError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let text = resp.text().map_err(|e| WaniWordsError::network(service, e))?;

    serde_json::from_str(&text).map_err(|e| {
        if status.is_success() {
            WaniWordsError::Remote {
                service,
                message: format!("Malformed response from {url}: {e}"),
            }
        } else {
            WaniWordsError::Remote { service, message: format!("HTTP error {status} from {url}") }
        }
    })
}
