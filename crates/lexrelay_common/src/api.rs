//! Request and response shapes for the /api/ask endpoint.

use serde::{Deserialize, Serialize};

/// A question submitted by the browser client.
///
/// Accepted either as a JSON body or as multipart form fields (when
/// document attachments are present). `tool` stays a raw string here;
/// the daemon resolves it to a persona with an explicit default arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub reasoning: bool,
}

/// Successful answer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Generic error payload. Never carries upstream detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Daemon health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
