//! # Provex Core
//!
//! The provisioning pipeline behind the Provex service: a bounded
//! concurrency admission gate, the account orchestration state machine,
//! the progress relay that streams live status to clients, and the
//! gateways to the external collaborators (identity generator,
//! registrar, account store).
//!
//! The HTTP surface lives in `provex-server`; everything here is
//! transport-agnostic and exercised directly by the server handlers.

pub mod admission;
pub mod auth;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod registrar;
pub mod relay;
pub mod store;
pub mod traits;

pub use admission::{AdmissionController, AdmissionPermit};
pub use auth::TokenHasher;
pub use error::{GenerationError, ProvisionError, RegistrarError, StoreError};
pub use generator::RandomIdentityGenerator;
pub use orchestrator::{ProvisionPolicy, Provisioner};
pub use registrar::HttpRegistrar;
pub use relay::{DiagnosticSink, ProgressReceiver, ProgressSender, progress_channel};
pub use store::memory::MemoryAccountStore;
pub use store::postgres::PgAccountStore;
pub use traits::{AccountStore, IdentityGenerator, Registrar};
