use thiserror::Error;

/// Terminal outcome taxonomy for one provisioning request.
///
/// Every variant is terminal for its request; the pipeline never
/// retries. Admission rejection is not a pipeline failure and is
/// reported with a distinct status so callers can tell "retry soon"
/// apart from "this attempt failed".
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("server is busy, please try again shortly")]
    AdmissionRejected,

    #[error("the generated email is already in use, please retry")]
    DuplicateIdentity,

    #[error("identity generation failed: {0}")]
    GenerationFailure(String),

    /// Registration failure is surfaced with a generic message; the
    /// registrar's sub-cause is never exposed to callers.
    #[error("registration failed, please try again later")]
    RegistrationFailure,

    #[error("failed to persist account: {0}")]
    PersistenceFailure(String),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

/// Failure producing an identity candidate.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct GenerationError(pub String);

/// Failure reaching or driving the external registrar. The boolean
/// "registration declined" outcome is not an error; this covers
/// transport and protocol faults only.
#[derive(Error, Debug)]
pub enum RegistrarError {
    #[error("registrar transport error: {0}")]
    Transport(String),

    #[error("registrar protocol error: {0}")]
    Protocol(String),
}

/// Account store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique-constraint violation on the account email. The second
    /// line of defense behind the read-then-decide uniqueness check.
    #[error("account email already exists")]
    DuplicateEmail,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return StoreError::DuplicateEmail;
        }
        StoreError::Backend(err.to_string())
    }
}

impl From<StoreError> for ProvisionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ProvisionError::DuplicateIdentity,
            StoreError::Backend(msg) => ProvisionError::PersistenceFailure(msg),
        }
    }
}
