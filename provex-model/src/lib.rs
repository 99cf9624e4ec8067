//! Core data model definitions shared across Provex crates.

pub mod account;
pub mod identity;
pub mod progress;
pub mod requester;

pub use account::{Account, AccountPayload};
pub use identity::Identity;
pub use progress::{ProgressEvent, ProvisionResponse};
pub use requester::Requester;
