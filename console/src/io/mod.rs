//! # IO Module
//!
//! Boundary between edit sessions and the outside world: the GraphQL API,
//! the notification surface and the confirmation prompt.
//!
//! ## Module Organization
//!
//! - **transport**: the `MutationTransport` and `ActionSchemaSource` seams,
//!   their error type and an in-memory scripted transport (tests and the
//!   `test-support` feature only)
//! - **graphql_client**: HTTP implementation built on `reqwest`
//! - **notification**: `Notifier` plus log and recording adapters, the
//!   recording one gated like the scripted transport
//! - **confirmation**: `Confirmer` plus fixed-answer and stdin adapters

pub mod confirmation;
pub mod graphql_client;
pub mod notification;
pub mod transport;

pub use confirmation::{Confirmer, StaticConfirmer, StdinConfirmer};
pub use graphql_client::GraphQLClient;
pub use notification::{LogNotifier, Notifier};
pub use transport::{ActionSchemaSource, MutationTransport, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub use notification::RecordingNotifier;
#[cfg(any(test, feature = "test-support"))]
pub use transport::ScriptedTransport;
