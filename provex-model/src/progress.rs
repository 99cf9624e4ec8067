use serde::{Deserialize, Serialize};

use crate::account::AccountPayload;

/// One message on the progress relay between a background provisioning
/// run and its streaming consumer. Produced by exactly one run and
/// consumed in strict production order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Human-readable progress line.
    Log(String),
    /// Terminal success, carrying the full response envelope.
    Done(ProvisionResponse),
    /// Terminal failure, carrying the error envelope.
    Error(ProvisionResponse),
    /// Internal termination marker; never forwarded to clients.
    Close,
}

/// The response envelope shared by the blocking endpoint and the
/// terminal streaming event, so both modes produce identical payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountPayload>,
}

impl ProvisionResponse {
    pub fn success(account: AccountPayload, message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            account: Some(account),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            account: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
