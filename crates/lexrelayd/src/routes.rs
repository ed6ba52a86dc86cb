//! API routes for lexrelayd.
//!
//! One endpoint matters: POST /api/ask, which validates the request,
//! extracts attached documents, assembles the prompt, and dispatches
//! upstream. Every failure kind is mapped to a response here; nothing
//! propagates as an unhandled fault.

use crate::extract::{self, UploadedFile, ALLOWED_MIME_TYPES, MAX_ATTACHMENTS, MAX_FILE_BYTES};
use crate::prompt;
use crate::server::AppState;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use lexrelay_common::{AskRequest, AskResponse, ErrorResponse, HealthResponse};
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// User-facing message for any upstream failure. Deliberately generic:
/// upstream hostnames, status lines, and provider identity stay out of
/// response bodies.
const UNAVAILABLE_MESSAGE: &str =
    "The assistant is temporarily unavailable. Please try again later.";

const EMPTY_QUERY_MESSAGE: &str = "Please enter a query.";

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn ask_routes() -> Router<AppStateArc> {
    Router::new().route("/api/ask", post(ask))
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

/// Pipeline order is fixed: validate, extract, assemble, dispatch.
async fn ask(
    State(state): State<AppStateArc>,
    request: Request,
) -> Result<Json<AskResponse>, ApiError> {
    let (req, files) = parse_ask_request(request).await?;

    // Reject before any extraction or upstream I/O
    if req.prompt.trim().is_empty() {
        return Err(bad_request(EMPTY_QUERY_MESSAGE));
    }

    info!(
        "[Q]  tool={} attachments={} reasoning={}",
        req.tool.as_deref().unwrap_or("-"),
        files.len(),
        req.reasoning
    );

    let extracted = extract::extract_all(state.extractor.as_ref(), &files);
    let assembled = prompt::assemble(&req, extracted.as_deref());

    match state.dispatcher.dispatch(&assembled, req.prompt.trim()).await {
        Ok(answer) => Ok(Json(AskResponse { answer })),
        Err(e) => {
            // Full detail stays in server-side logs only
            error!("[E]  Upstream dispatch failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: UNAVAILABLE_MESSAGE.to_string(),
                }),
            ))
        }
    }
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Accept the request as JSON, or as multipart form fields plus files
/// when attachments are present.
async fn parse_ask_request(request: Request) -> Result<(AskRequest, Vec<UploadedFile>), ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| bad_request(format!("Malformed multipart body: {}", e)))?;
        parse_multipart(multipart).await
    } else {
        let Json(req) = Json::<AskRequest>::from_request(request, &())
            .await
            .map_err(|e| bad_request(format!("Malformed request body: {}", e)))?;
        Ok((req, Vec::new()))
    }
}

async fn parse_multipart(
    mut multipart: Multipart,
) -> Result<(AskRequest, Vec<UploadedFile>), ApiError> {
    let mut req = AskRequest {
        prompt: String::new(),
        tool: None,
        context: None,
        reasoning: false,
    };
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "prompt" => req.prompt = field_text(field).await?,
            "tool" => req.tool = Some(field_text(field).await?),
            "context" => req.context = Some(field_text(field).await?),
            "reasoning" => {
                let value = field_text(field).await?;
                req.reasoning = matches!(value.trim(), "true" | "1" | "on");
            }
            "files" | "file" => {
                if files.len() >= MAX_ATTACHMENTS {
                    return Err(bad_request(format!(
                        "At most {} files can be attached per request",
                        MAX_ATTACHMENTS
                    )));
                }

                let file_name = field.file_name().unwrap_or("document").to_string();
                let mime = field.content_type().unwrap_or("").to_string();
                if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
                    return Err(bad_request(format!(
                        "Unsupported file type for '{}'",
                        file_name
                    )));
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read upload body: {}", e)))?;
                if data.len() > MAX_FILE_BYTES {
                    return Err((
                        StatusCode::PAYLOAD_TOO_LARGE,
                        Json(ErrorResponse {
                            error: format!("File '{}' exceeds the 10 MiB limit", file_name),
                        }),
                    ));
                }

                files.push(UploadedFile {
                    name: file_name,
                    mime,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok((req, files))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart field: {}", e)))
}
