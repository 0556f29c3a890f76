use axum::{
    extract::{ Path, State },
    http::{ HeaderMap, StatusCode },
    response::{ IntoResponse, Response },
    routing::{ get, post, put },
    Json,
    Router,
};
use log::{ error, info };
use serde::{ Deserialize, Serialize };
use std::error::Error;
use std::sync::Arc;
use tower_http::cors::{ Any, CorsLayer };
use uuid::Uuid;

use crate::history::ConversationStore;
use crate::models::chat::{ Conversation, MessageType };
use crate::title::generator::TitleGenerator;
use crate::title::maybe_generate_conversation_title;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ConversationStore>,
    pub titles: Arc<dyn TitleGenerator>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("conversation '{0}' not found")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    pub language: Option<String>,
}

#[derive(Deserialize)]
pub struct AppendMessageRequest {
    pub message_type: MessageType,
    pub content: String,
}

#[derive(Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/v1/conversations", post(create_conversation))
        .route("/api/v1/conversations/{id}", get(get_conversation))
        .route("/api/v1/conversations/{id}/messages", post(append_message))
        .route("/api/v1/conversations/{id}/title", put(rename_conversation))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(
    addr: String,
    store: Arc<dyn ConversationStore>,
    titles: Arc<dyn TitleGenerator>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = build_router(AppState { store, titles });
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on: http://{}", addr);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>
) -> Result<impl IntoResponse, ApiError> {
    let conversation = Conversation::new(Uuid::new_v4().to_string(), req.language.as_deref());
    state.store
        .save(&conversation).await
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Conversation>, ApiError> {
    let conversation = load_or_404(&state, &id).await?;
    Ok(Json(conversation))
}

/// Appends one message to the conversation. When the appended message is
/// assistant-side, a title generation attempt runs inline before the save;
/// its failure never fails this request.
async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AppendMessageRequest>
) -> Result<Json<Conversation>, ApiError> {
    let mut conversation = load_or_404(&state, &id).await?;
    conversation.push_message(req.message_type, req.content);

    if req.message_type.is_assistant_response() {
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok());
        let forward_headers = forwardable_headers(&headers);
        if
            let Some(title) = maybe_generate_conversation_title(
                &mut conversation,
                state.titles.as_ref(),
                &forward_headers,
                request_id
            ).await
        {
            info!("Generated title for conversation {}: {}", conversation.id, title);
        }
    }

    state.store
        .save(&conversation).await
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    Ok(Json(conversation))
}

/// Manual rename. Sets the manual-override flag; from here on the title
/// pipeline will never touch this conversation again.
async fn rename_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameRequest>
) -> Result<Json<Conversation>, ApiError> {
    let mut conversation = load_or_404(&state, &id).await?;
    conversation.title = req.title.trim().to_string();
    conversation.title_manually_set = true;
    state.store
        .save(&conversation).await
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    Ok(Json(conversation))
}

/// Inbound headers the AI backend needs to authorize the title call.
/// Everything else stays behind.
const FORWARDED_HEADERS: [&str; 1] = ["authorization"];

fn forwardable_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    FORWARDED_HEADERS.iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| ((*name).to_string(), v.to_string()))
        })
        .collect()
}

async fn load_or_404(state: &AppState, id: &str) -> Result<Conversation, ApiError> {
    state.store
        .load(id).await
        .map_err(|e| ApiError::Storage(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryConversationStore;
    use crate::locale::LanguageCode;
    use crate::title::generator::{ TitleResponse, TranscriptMessage };
    use async_trait::async_trait;
    use axum::body::{ to_bytes, Body };
    use axum::http::Request;
    use std::error::Error as StdError;
    use tower::ServiceExt;

    struct StaticTitles {
        title: &'static str,
        headers_seen: std::sync::Mutex<Vec<(String, String)>>,
    }

    impl StaticTitles {
        fn new(title: &'static str) -> Self {
            Self {
                title,
                headers_seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TitleGenerator for StaticTitles {
        async fn generate(
            &self,
            _language: LanguageCode,
            _messages: &[TranscriptMessage],
            forward_headers: &[(String, String)]
        ) -> Result<TitleResponse, Box<dyn StdError + Send + Sync>> {
            self.headers_seen.lock().unwrap().extend(forward_headers.iter().cloned());
            Ok(TitleResponse { title: Some(self.title.to_string()) })
        }
    }

    fn test_router() -> Router {
        build_router(AppState {
            store: Arc::new(MemoryConversationStore::new()),
            titles: Arc::new(StaticTitles::new("Password reset help")),
        })
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_uses_localized_placeholder() {
        let app = test_router();
        let response = app
            .oneshot(post_json("/api/v1/conversations", serde_json::json!({ "language": "de" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["title"], "Neue Unterhaltung");
        assert_eq!(body["title_language"], "de");
    }

    #[tokio::test]
    async fn assistant_message_triggers_title_generation() {
        let app = test_router();
        let created = json_body(
            app
                .clone()
                .oneshot(post_json("/api/v1/conversations", serde_json::json!({ "language": "en" })))
                .await
                .unwrap()
        ).await;
        let id = created["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/conversations/{}/messages", id);
        app.clone()
            .oneshot(
                post_json(
                    &uri,
                    serde_json::json!({ "message_type": "user_query", "content": "How do I reset?" })
                )
            ).await
            .unwrap();
        let response = app
            .clone()
            .oneshot(
                post_json(
                    &uri,
                    serde_json::json!({ "message_type": "bot_response", "content": "Open settings." })
                )
            ).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["title"], "Password reset help");
        assert!(!body["title_generated_at"].is_null());
    }

    #[tokio::test]
    async fn auth_header_is_forwarded_to_title_transport() {
        let titles = Arc::new(StaticTitles::new("Password reset help"));
        let app = build_router(AppState {
            store: Arc::new(MemoryConversationStore::new()),
            titles: titles.clone(),
        });

        let created = json_body(
            app
                .clone()
                .oneshot(post_json("/api/v1/conversations", serde_json::json!({ "language": "en" })))
                .await
                .unwrap()
        ).await;
        let id = created["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/conversations/{}/messages", id);
        app.clone()
            .oneshot(
                post_json(&uri, serde_json::json!({ "message_type": "user_query", "content": "Hi" }))
            ).await
            .unwrap();

        let append = Request::builder()
            .method("POST")
            .uri(&uri)
            .header("content-type", "application/json")
            .header("authorization", "Bearer token-123")
            .header("x-custom", "stays-behind")
            .body(
                Body::from(
                    serde_json::json!({ "message_type": "bot_response", "content": "Hello!" }).to_string()
                )
            )
            .unwrap();
        app.clone().oneshot(append).await.unwrap();

        let seen = titles.headers_seen.lock().unwrap();
        assert_eq!(*seen, vec![("authorization".to_string(), "Bearer token-123".to_string())]);
    }

    #[tokio::test]
    async fn manual_rename_locks_the_title() {
        let app = test_router();
        let created = json_body(
            app
                .clone()
                .oneshot(post_json("/api/v1/conversations", serde_json::json!({ "language": "en" })))
                .await
                .unwrap()
        ).await;
        let id = created["id"].as_str().unwrap().to_string();

        let rename = Request::builder()
            .method("PUT")
            .uri(format!("/api/v1/conversations/{}/title", id))
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "title": "My notes" }).to_string()))
            .unwrap();
        app.clone().oneshot(rename).await.unwrap();

        let uri = format!("/api/v1/conversations/{}/messages", id);
        app.clone()
            .oneshot(
                post_json(&uri, serde_json::json!({ "message_type": "user_query", "content": "Hi" }))
            ).await
            .unwrap();
        let response = app
            .clone()
            .oneshot(
                post_json(
                    &uri,
                    serde_json::json!({ "message_type": "bot_response", "content": "Hello!" })
                )
            ).await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["title"], "My notes");
        assert_eq!(body["title_manually_set"], true);
        assert!(body["title_generated_at"].is_null());
    }

    #[tokio::test]
    async fn unknown_conversation_is_404() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/conversations/missing")
                    .body(Body::empty())
                    .unwrap()
            ).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
