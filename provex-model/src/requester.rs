use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller a provisioning request runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: Uuid,
    /// Domain new identities are generated under.
    pub domain: String,
    /// Recovery-email fallback; the system default applies when unset.
    pub recovery_email: Option<String>,
}
