//! HTTP route handlers
//!
//! One ingestion endpoint: POST a URL or ISBN, get back the id of the row
//! it landed in. Repeat posts of the same identifier return the same row.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::response::{ApiResponse, ApiResult, AppError, ErrorResponse};
use crate::commands::DispatchCommand;

/// State shared by the API handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatch: Arc<DispatchCommand>,
}

/// Request body for record ingestion; exactly one identifier is used, a
/// URL taking precedence when both are present.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
}

impl IngestRequest {
    fn identifier(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.isbn.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Build the ingestion router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/records", post(ingest_record))
        .with_state(state)
}

/// Ingest one record by URL or ISBN
async fn ingest_record(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Response> {
    let identifier = request
        .identifier()
        .ok_or_else(|| AppError::BadRequest("request must carry a url or an isbn".to_string()))?;

    info!(%identifier, "ingesting record");

    match state.dispatch.execute(identifier).await? {
        Some(page) => {
            let body = IngestResponse {
                id: page.id,
                url: page.url,
            };
            Ok((StatusCode::CREATED, Json(ApiResponse::success(body))).into_response())
        },
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "NO_EXTRACTOR",
                format!("no extractor recognises '{identifier}'"),
            )),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::MemoryStore;
    use crate::commands::{CreateRecordCommand, ResolveIdCommand};
    use crate::extract::{ExtractError, Extractor};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::json;
    use shelfsync_common::Record;
    use tower::ServiceExt;

    struct StubExtractor;

    #[async_trait]
    impl Extractor for StubExtractor {
        fn matches(&self, identifier: &str) -> bool {
            identifier.contains("known")
        }

        async fn extract(&self, _identifier: &str) -> Result<Option<Record>, ExtractError> {
            let mut record = Record::new();
            record.set("title", "Ep1");
            record.set("type", "Podcast");
            record.set("author", json!([{"name": "X"}]));
            Ok(Some(record))
        }
    }

    fn test_router() -> Router {
        let sources = MemoryStore::new("src", "title", "Title");
        let people = MemoryStore::new("person", "name", "Name");
        let podcasts = MemoryStore::new("podcast", "title", "Title");
        let books = MemoryStore::new("book", "title", "Title");

        let resolve_source = Arc::new(ResolveIdCommand::for_sources(sources));
        let resolve_person = Arc::new(ResolveIdCommand::for_people(people));
        let dispatch = DispatchCommand::new(
            vec![Box::new(StubExtractor)],
            Arc::new(CreateRecordCommand::new(
                resolve_source.clone(),
                resolve_person.clone(),
                podcasts,
            )),
            Arc::new(CreateRecordCommand::new(
                resolve_source,
                resolve_person,
                books,
            )),
        );

        router(AppState {
            dispatch: Arc::new(dispatch),
        })
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/records")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn known_url_creates_a_record() {
        let app = test_router();
        let response = app
            .oneshot(post_json(json!({"url": "https://known/1"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(true));
        assert!(body["data"]["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found() {
        let app = test_router();
        let response = app
            .oneshot(post_json(json!({"isbn": "9780393635829"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], json!("NO_EXTRACTOR"));
    }

    #[tokio::test]
    async fn empty_body_is_a_bad_request() {
        let app = test_router();
        let response = app.oneshot(post_json(json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_url_is_a_bad_request() {
        let app = test_router();
        let response = app
            .oneshot(post_json(json!({"url": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
