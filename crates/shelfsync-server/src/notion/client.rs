//! HTTP client for the Notion API
//!
//! Thin transport layer: sends already-formatted payloads and surfaces
//! Notion's error envelope unmodified. Retry and backoff are deliberately
//! not handled here.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::page::Page;
use super::{database_query_url, page_url, pages_url};

/// Default timeout for Notion API requests in seconds.
/// Can be overridden via the NOTION_TIMEOUT_SECS environment variable.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Notion API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// Notion API version header value this client speaks.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Errors from the Notion transport layer
#[derive(Debug, Error)]
pub enum NotionError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notion returned its error envelope; carried upward unmodified.
    #[error("notion api error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("unexpected notion response: {0}")]
    InvalidResponse(String),
}

/// Client for the Notion pages and database-query endpoints
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: Client,
    base_url: String,
    token: String,
}

impl NotionClient {
    /// Create a client against the public Notion API.
    pub fn new(token: impl Into<String>) -> Result<Self, NotionError> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (tests point this at a
    /// local mock server).
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, NotionError> {
        let timeout_secs = std::env::var("NOTION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    /// Create a page from an already-formatted payload.
    pub async fn create_page(&self, payload: &Value) -> Result<Page, NotionError> {
        let url = pages_url(&self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(payload)
            .send()
            .await?;

        let body: Value = response.json().await?;
        Self::into_page(body)
    }

    /// Patch properties of an existing page.
    pub async fn update_page(&self, page_id: &str, payload: &Value) -> Result<Page, NotionError> {
        let url = page_url(&self.base_url, page_id);
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(payload)
            .send()
            .await?;

        let body: Value = response.json().await?;
        Self::into_page(body)
    }

    /// Archive a page. Notion has no hard delete; archived pages stay
    /// queryable through the trash.
    pub async fn archive_page(&self, page_id: &str) -> Result<(), NotionError> {
        let url = page_url(&self.base_url, page_id);
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&serde_json::json!({"archived": true}))
            .send()
            .await?;

        let body: Value = response.json().await?;
        Self::check_error(&body)?;
        Ok(())
    }

    /// Query a database; returns the result pages, empty when nothing
    /// matches.
    pub async fn query_database(
        &self,
        database_id: &str,
        payload: &Value,
    ) -> Result<Vec<Page>, NotionError> {
        let url = database_query_url(&self.base_url, database_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(payload)
            .send()
            .await?;

        let body: Value = response.json().await?;
        Self::check_error(&body)?;

        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                NotionError::InvalidResponse("query response has no results array".to_string())
            })?;

        results
            .iter()
            .map(|page| {
                serde_json::from_value(page.clone())
                    .map_err(|e| NotionError::InvalidResponse(e.to_string()))
            })
            .collect()
    }

    /// Reject Notion's error envelope: `{"object": "error", ...}`.
    fn check_error(body: &Value) -> Result<(), NotionError> {
        if body.get("object").and_then(Value::as_str) == Some("error") {
            return Err(NotionError::Api {
                status: body.get("status").and_then(Value::as_u64).unwrap_or(0) as u16,
                code: body
                    .get("code")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                message: body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        Ok(())
    }

    fn into_page(body: Value) -> Result<Page, NotionError> {
        Self::check_error(&body)?;
        serde_json::from_value(body).map_err(|e| NotionError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_body(id: &str) -> Value {
        json!({
            "object": "page",
            "id": id,
            "archived": false,
            "properties": {},
            "url": format!("https://notion.so/{id}")
        })
    }

    #[tokio::test]
    async fn create_page_parses_the_created_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(header("Notion-Version", NOTION_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body("page-1")))
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url("secret", server.uri()).unwrap();
        let page = client
            .create_page(&json!({"parent": {"database_id": "db"}}))
            .await
            .unwrap();
        assert_eq!(page.id, "page-1");
    }

    #[tokio::test]
    async fn error_envelope_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "object": "error",
                "status": 400,
                "code": "validation_error",
                "message": "body failed validation"
            })))
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url("secret", server.uri()).unwrap();
        let err = client.create_page(&json!({})).await.unwrap_err();
        match err {
            NotionError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "validation_error");
                assert_eq!(message, "body failed validation");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn query_database_returns_result_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db-1/query"))
            .and(body_partial_json(
                json!({"filter": {"property": "Title"}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "results": [page_body("page-1"), page_body("page-2")]
            })))
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url("secret", server.uri()).unwrap();
        let pages = client
            .query_database(
                "db-1",
                &json!({"filter": {"property": "Title", "rich_text": {"equals": "Ep1"}}}),
            )
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].id, "page-1");
    }

    #[tokio::test]
    async fn query_database_empty_results_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db-1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "results": []
            })))
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url("secret", server.uri()).unwrap();
        let pages = client.query_database("db-1", &json!({})).await.unwrap();
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn archive_page_patches_the_archived_flag() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/pages/page-1"))
            .and(body_partial_json(json!({"archived": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body("page-1")))
            .expect(1)
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url("secret", server.uri()).unwrap();
        client.archive_page("page-1").await.unwrap();
    }
}
