use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the remote API attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("transport failure for {endpoint}: {reason}")]
    Transport {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },
    #[error("malformed response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl GatewayError {
    pub fn transport(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status: None,
            reason: reason.into(),
        }
    }

    pub fn status(endpoint: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            status: Some(status),
            reason: reason.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Short explanation suitable for the single error line a renderer shows.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport {
                status: Some(403 | 429),
                ..
            } => "the server is rate limiting requests; wait a moment and retry".to_string(),
            Self::Transport {
                status: Some(404), ..
            } => "the requested resource was not found".to_string(),
            Self::Transport {
                status: Some(status),
                ..
            } => format!("the server responded with HTTP {status}"),
            Self::Transport { status: None, .. } => {
                "the server is unreachable; check the network and retry".to_string()
            }
            Self::Decode { .. } => "the server returned an unexpected response".to_string(),
        }
    }
}
