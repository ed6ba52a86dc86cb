//! Shared types for the LexRelay daemon: API request/response shapes and
//! the upstream completion client abstraction.

pub mod api;
pub mod completion;

pub use api::{AskRequest, AskResponse, ErrorResponse, HealthResponse};
pub use completion::{
    CompletionClient, CompletionError, FakeCompletionClient, HttpCompletionClient,
};
