//! Persistence gateway implementations: Postgres for deployments,
//! in-memory for tests and database-less dev runs.

pub mod memory;
pub mod postgres;
