//! # Graph Console
//!
//! Controlled edit sessions for the project console: forms that hold a local
//! draft of a remote entity, validate it (URLs, password confirmation,
//! GraphQL fragments against a schema) and commit it as a create or update
//! mutation.
//!
//! ## Module Organization
//!
//! - **domain**: edit sessions and the forms built on them
//! - **graphql**: client-side schema model and query validation
//! - **io**: transport, notifier and confirmer seams with their adapters
//! - **config**: YAML + environment configuration

pub mod config;
pub mod domain;
pub mod graphql;
pub mod io;

pub use config::{ConfigError, ConsoleConfig};
