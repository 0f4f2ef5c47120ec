//! # GraphQL Module
//!
//! Client-side checks of query fragments against a schema fetched from the
//! console API.
//!
//! ## Module Organization
//!
//! - **schema**: builds a [`ClientSchema`] from introspection JSON
//! - this module: validates executable documents against it with
//!   `apollo-compiler`, reporting every rule violation with its position
//!
//! ## Key Responsibilities
//!
//! - Turn an optional schema source into a shared, immutable schema
//! - Answer "is this query valid?" without ever surfacing an error: absent
//!   inputs, malformed JSON, parse errors and rule violations all read as
//!   `false`

pub mod schema;

pub use schema::{ClientSchema, SchemaBuildError};

use apollo_compiler::ExecutableDocument;
use log::debug;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Source name reported in query diagnostics
const QUERY_SOURCE_NAME: &str = "fragment.graphql";

/// Outcome of checking a query against an optional schema source
#[derive(Debug, Clone)]
pub struct SchemaCheck {
    /// The schema built from the source, kept so callers can revalidate
    /// edits without rebuilding it
    pub schema: Option<Arc<ClientSchema>>,
    pub valid: bool,
}

/// A syntax error or a broken validation rule, with its 1-based
/// line and column when the diagnostic points into the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub message: String,
    pub location: Option<(usize, usize)>,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some((line, column)) => write!(f, "{}:{}: {}", line, column, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query has {} validation error(s)", .0.len())]
    Invalid(Vec<RuleViolation>),
}

/// Build a schema from introspection JSON. Absent or blank sources and build
/// failures yield `None`.
pub fn build_schema(source: Option<&str>) -> Option<Arc<ClientSchema>> {
    let source = source.map(str::trim).filter(|s| !s.is_empty())?;
    match ClientSchema::from_introspection_str(source) {
        Ok(schema) => Some(Arc::new(schema)),
        Err(e) => {
            debug!("Ignoring unusable schema source: {}", e);
            None
        }
    }
}

/// Parse and validate `query`, collecting every syntax error and rule
/// violation
pub fn validate_query(schema: &ClientSchema, query: &str) -> Result<(), QueryError> {
    match ExecutableDocument::parse_and_validate(schema.as_valid(), query, QUERY_SOURCE_NAME) {
        Ok(_) => Ok(()),
        Err(invalid) => {
            let violations = invalid
                .errors
                .iter()
                .map(|diagnostic| RuleViolation {
                    message: diagnostic.error.to_string(),
                    location: diagnostic
                        .line_column_range()
                        .map(|range| (range.start.line, range.start.column)),
                })
                .collect();
            Err(QueryError::Invalid(violations))
        }
    }
}

/// Whether `query` is valid against `schema`; any missing input is invalid
pub fn is_valid_query(schema: Option<&ClientSchema>, query: Option<&str>) -> bool {
    let (Some(schema), Some(query)) = (schema, query.filter(|q| !q.trim().is_empty())) else {
        return false;
    };
    match validate_query(schema, query) {
        Ok(()) => true,
        Err(e) => {
            debug!("Query rejected: {}", e);
            false
        }
    }
}

/// Build the schema from `schema_source` and validate `query` against it
pub fn check_query(schema_source: Option<&str>, query: Option<&str>) -> SchemaCheck {
    let schema = build_schema(schema_source);
    let valid = is_valid_query(schema.as_deref(), query);
    SchemaCheck { schema, valid }
}
