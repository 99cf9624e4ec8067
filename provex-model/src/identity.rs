use serde::{Deserialize, Serialize};

/// A candidate email/password/name tuple produced by the identity
/// generator. Ephemeral: discarded after persistence or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub domain: String,
}
