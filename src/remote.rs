//! Remote mirror of the active project.
//!
//! One explicit, user-triggered POST of `{title, content}` to the configured
//! append-only endpoint. Fire-and-forget: no retry, no read-back, and no
//! interaction with the local autosave path. The acknowledgment body is kept
//! opaque. Empty content is rejected before the request leaves the process,
//! matching the collaborator's own 400 response; an empty title is sent
//! as-is and the collaborator substitutes its "Untitled" placeholder.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    Rejected { status: u16, message: String },
    /// The request never produced a server answer.
    Unreachable(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::Rejected { message, .. } => {
                write!(f, "Erro ao salvar: {}", message)
            }
            RemoteError::Unreachable(_) => {
                write!(f, "Erro de conexão com o servidor local.")
            }
        }
    }
}

impl std::error::Error for RemoteError {}

#[derive(Serialize)]
struct SavePayload<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct RejectionBody {
    error: Option<String>,
}

pub struct RemoteMirror {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl RemoteMirror {
    pub fn new(endpoint: impl Into<String>) -> Self {
        RemoteMirror {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Push one snapshot of the active project. Success returns the stored
    /// record as an opaque value.
    pub fn push(&self, title: &str, content: &str) -> Result<serde_json::Value, RemoteError> {
        if content.trim().is_empty() {
            // Matches the collaborator contract without spending a request.
            return Err(RemoteError::Rejected {
                status: 400,
                message: "Content is required".to_string(),
            });
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&SavePayload { title, content })
            .send()
            .map_err(|err| {
                warn!(endpoint = %self.endpoint, "Remote mirror unreachable: {err}");
                RemoteError::Unreachable(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<RejectionBody>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Erro desconhecido".to_string());
            warn!(status = status.as_u16(), %message, "Remote mirror rejected the text");
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(status = status.as_u16(), "Remote mirror stored the text");
        Ok(response.json().unwrap_or(serde_json::Value::Null))
    }
}
