use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use thiserror::Error;

use super::model::CategoryDataset;

const MAX_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving the dataset.
///
/// These cover the full retrieval path: network issues, HTTP errors,
/// oversized bodies, and JSON decode failures. The viewer never sees the
/// distinction; the caller logs it and commits a generic failure message.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, invalid location string)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response body was not a valid CategoryDataset document
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Builds the HTTP client used for dataset retrieval.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().user_agent(user_agent).build()
}

/// Fetches and decodes the dataset from `location`.
///
/// The request carries `Cache-Control: no-cache` and `Pragma: no-cache` so
/// every render pass reads fresh data; no intermediate cache may answer.
///
/// `timeout` of `None` lets a hung request hang the render indefinitely
/// (the original behavior); callers normally pass a bound.
///
/// Non-2xx statuses are failures. The original renderer never checked the
/// response status, so an error page with a JSON body could slip through;
/// that gap is closed here.
pub async fn fetch_dataset(
    client: &reqwest::Client,
    location: &str,
    timeout: Option<Duration>,
) -> Result<CategoryDataset, FetchError> {
    let send = client
        .get(location)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send();

    let response = match timeout {
        Some(limit) => tokio::time::timeout(limit, send)
            .await
            .map_err(|_| FetchError::Timeout)?,
        None => send.await,
    }?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header. Compare in u64 so a declared
    // length past usize::MAX cannot truncate on 32-bit targets.
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_DATASET: &str = r#"{
        "groups": [
            {"name": "Tools", "items": [{"url": "https://example.com/a"}]}
        ]
    }"#;

    fn client() -> reqwest::Client {
        build_client("linkdeck-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/tools.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_DATASET)
                    .insert_header("Content-Type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/data/tools.json", mock_server.uri());
        let dataset = fetch_dataset(&client(), &url, None).await.unwrap();
        assert_eq!(dataset.groups.len(), 1);
        assert_eq!(dataset.groups[0].name, "Tools");
    }

    #[tokio::test]
    async fn test_cache_bypass_headers_sent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Cache-Control", "no-cache"))
            .and(header("Pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_DATASET))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/data.json", mock_server.uri());
        fetch_dataset(&client(), &url, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_404_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing.json", mock_server.uri());
        let err = fetch_dataset(&client(), &url, None).await.unwrap_err();
        match err {
            FetchError::HttpStatus(404) => {}
            e => panic!("Expected HttpStatus(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_500_with_json_body_is_failure() {
        // An error page with a well-shaped JSON body must not render as data.
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"groups": []}"#))
            .mount(&mock_server)
            .await;

        let url = format!("{}/data.json", mock_server.uri());
        let err = fetch_dataset(&client(), &url, None).await.unwrap_err();
        match err {
            FetchError::HttpStatus(500) => {}
            e => panic!("Expected HttpStatus(500), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/data.json", mock_server.uri());
        let err = fetch_dataset(&client(), &url, None).await.unwrap_err();
        match err {
            FetchError::Json(_) => {}
            e => panic!("Expected Json error, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(vec![b' '; MAX_BODY_SIZE + 1]),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/huge.json", mock_server.uri());
        let err = fetch_dataset(&client(), &url, None).await.unwrap_err();
        match err {
            FetchError::ResponseTooLarge => {}
            e => panic!("Expected ResponseTooLarge, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_DATASET)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/slow.json", mock_server.uri());
        let err = fetch_dataset(&client(), &url, Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        match err {
            FetchError::Timeout => {}
            e => panic!("Expected Timeout, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_unresolvable_location_is_network_failure() {
        // An empty data-source attribute produces an unusable location whose
        // failure surfaces here rather than being validated up front.
        let err = fetch_dataset(&client(), "", None).await.unwrap_err();
        match err {
            FetchError::Network(_) => {}
            e => panic!("Expected Network error, got {:?}", e),
        }
    }
}
