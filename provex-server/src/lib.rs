//! # Provex Server
//!
//! HTTP surface for the Provex provisioning service.
//!
//! The server provisions ephemeral upstream accounts on demand for
//! authenticated callers:
//!
//! - **Admission control**: a fixed number of provisioning runs may be
//!   in flight; saturated requests are rejected immediately with 429.
//! - **Blocking mode**: `GET /account` runs the full pipeline in the
//!   request and returns the final payload.
//! - **Streaming mode**: `GET /account/stream` dispatches the pipeline
//!   to a background task and streams live progress over SSE.
//!
//! The pipeline itself lives in `provex-core`; this crate wires it to
//! axum, bearer authentication, and configuration.

pub mod auth;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use errors::{AppError, AppResult};
pub use infra::app_state::AppState;
pub use infra::config::Config;
