//! # Mutation Transport
//!
//! Abstraction over the GraphQL endpoint that commits console mutations.
//! Sessions only ever see this trait, so tests can swap in an in-memory
//! transport and the CLI can use the HTTP client.

use async_trait::async_trait;
use shared::{ActionSchemaSelection, GraphQLErrorEntry, MutationRequest, MutationResponse};
#[cfg(any(test, feature = "test-support"))]
use std::collections::VecDeque;
#[cfg(any(test, feature = "test-support"))]
use std::sync::Mutex;
use thiserror::Error;

/// Why a commit did not produce a server-confirmed payload
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("could not reach the API: {0}")]
    Network(String),
    #[error("API answered with HTTP status {status}")]
    HttpStatus { status: u16, body: Option<String> },
    #[error("API response could not be decoded: {0}")]
    Decode(String),
    #[error("API rejected the mutation with {} error(s)", .0.len())]
    GraphQL(Vec<GraphQLErrorEntry>),
    #[error("API response carries no payload for {0}")]
    MissingPayload(String),
}

impl TransportError {
    /// Messages suitable for the notification surface. GraphQL errors are
    /// shown verbatim, everything else is summarised.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            TransportError::GraphQL(errors) if !errors.is_empty() => {
                errors.iter().map(|e| e.message.clone()).collect()
            }
            TransportError::GraphQL(_) => vec!["The request was rejected.".to_string()],
            TransportError::Network(_) => {
                vec!["Could not reach the server. Please check your connection.".to_string()]
            }
            TransportError::HttpStatus { status, .. } => {
                vec![format!("The server answered with an error (HTTP {status}).")]
            }
            TransportError::Decode(_) | TransportError::MissingPayload(_) => {
                vec!["The server sent an unexpected response.".to_string()]
            }
        }
    }
}

/// Commits a single mutation and resolves to exactly one outcome
#[async_trait]
pub trait MutationTransport: Send + Sync {
    async fn commit(&self, request: MutationRequest) -> Result<MutationResponse, TransportError>;
}

/// Supplies the introspection JSON an action trigger fragment is checked
/// against
#[async_trait]
pub trait ActionSchemaSource: Send + Sync {
    async fn action_schema(
        &self,
        project_id: &str,
        selection: &ActionSchemaSelection,
    ) -> Result<Option<String>, TransportError>;
}

/// In-memory transport that records every request and answers from a queue
/// of scripted replies. Once the queue is empty each commit succeeds with an
/// empty payload. Test double, compiled for tests and the `test-support`
/// feature only.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<MutationResponse, TransportError>>>,
    requests: Mutex<Vec<MutationRequest>>,
}

#[cfg(any(test, feature = "test-support"))]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: Result<MutationResponse, TransportError>) {
        self.replies.lock().expect("reply queue lock poisoned").push_back(reply);
    }

    pub fn reply_with_payload(&self, field: &str, payload: serde_json::Value) {
        self.push_reply(Ok(MutationResponse::new(field, payload)));
    }

    pub fn fail_with(&self, error: TransportError) {
        self.push_reply(Err(error));
    }

    pub fn requests(&self) -> Vec<MutationRequest> {
        self.requests.lock().expect("request log lock poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request log lock poisoned").len()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl MutationTransport for ScriptedTransport {
    async fn commit(&self, request: MutationRequest) -> Result<MutationResponse, TransportError> {
        let field = request.field_name();
        self.requests.lock().expect("request log lock poisoned").push(request);
        let reply = self.replies.lock().expect("reply queue lock poisoned").pop_front();
        reply.unwrap_or_else(|| Ok(MutationResponse::new(field, serde_json::json!({}))))
    }
}
