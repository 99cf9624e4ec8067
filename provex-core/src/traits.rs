use async_trait::async_trait;
use provex_model::{Account, Identity, Requester};

use crate::error::{GenerationError, RegistrarError, StoreError};
use crate::relay::DiagnosticSink;

/// Produces a candidate email/password/name tuple for a domain.
#[async_trait]
pub trait IdentityGenerator: Send + Sync {
    async fn generate(&self, domain: &str) -> Result<Identity, GenerationError>;
}

/// Performs the actual third-party registration.
///
/// Returns the registrar's single boolean verdict; there is no
/// partial-success state. Free-text diagnostics emitted during the
/// call go through the injected per-request sink, never through any
/// process-wide channel, so concurrent requests cannot observe each
/// other's registrar output.
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register(
        &self,
        identity: &Identity,
        recovery_email: &str,
        diagnostics: &DiagnosticSink,
    ) -> Result<bool, RegistrarError>;
}

/// Persistence gateway for accounts and requester lookup.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Lookup by email across all rows, deleted or not.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Insert and commit atomically; no partially visible writes.
    async fn insert(&self, account: &Account) -> Result<(), StoreError>;

    /// Resolve an HMAC-hashed bearer token to its requester. Token
    /// issuance lives outside this system; the store only verifies.
    async fn find_requester_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Requester>, StoreError>;
}
