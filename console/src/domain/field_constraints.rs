//! Constraints panel of a model field: the "unique" toggle.
//!
//! Toggling commits immediately and is not tracked by an edit session; only
//! failures come back to the user, through the notifier.

use log::{info, warn};
use shared::{Field, MutationRequest, NotificationLevel, UpdateFieldIsUniqueRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use super::edit_session::SessionServices;
use crate::io::{MutationTransport, Notifier};

/// Field types a uniqueness constraint can be put on
pub const SCALAR_TYPE_IDENTIFIERS: [&str; 8] = [
    "String", "Int", "Float", "Boolean", "GraphQLID", "Enum", "DateTime", "Json",
];

pub fn is_scalar_type(type_identifier: &str) -> bool {
    SCALAR_TYPE_IDENTIFIERS.contains(&type_identifier)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("system field {0} cannot be constrained")]
    SystemField(String),
    #[error("field {field} of type {type_identifier} cannot be unique")]
    NotScalar {
        field: String,
        type_identifier: String,
    },
}

#[derive(Clone)]
pub struct FieldConstraints {
    transport: Arc<dyn MutationTransport>,
    notifier: Arc<dyn Notifier>,
}

impl FieldConstraints {
    pub fn new(services: &SessionServices) -> Self {
        Self {
            transport: Arc::clone(&services.transport),
            notifier: Arc::clone(&services.notifier),
        }
    }

    /// Whether the unique toggle is offered for `field`
    pub fn unique_toggle_enabled(field: &Field) -> bool {
        Self::check_toggle(field).is_ok()
    }

    fn check_toggle(field: &Field) -> Result<(), ConstraintError> {
        if field.is_system {
            return Err(ConstraintError::SystemField(field.name.clone()));
        }
        if !is_scalar_type(&field.type_identifier) {
            return Err(ConstraintError::NotScalar {
                field: field.name.clone(),
                type_identifier: field.type_identifier.clone(),
            });
        }
        Ok(())
    }

    /// Commit the new flag in the background. The handle resolves to whether
    /// the commit succeeded; callers are free to drop it.
    pub fn update_is_unique(&self, field: &Field, is_unique: bool) -> Result<JoinHandle<bool>, ConstraintError> {
        Self::check_toggle(field)?;

        let request = MutationRequest::UpdateFieldIsUnique(UpdateFieldIsUniqueRequest {
            field_id: field.id.clone(),
            is_unique,
        });
        let transport = Arc::clone(&self.transport);
        let notifier = Arc::clone(&self.notifier);
        let field_name = field.name.clone();

        Ok(tokio::spawn(async move {
            match transport.commit(request).await {
                Ok(_) => {
                    info!("Field {} is_unique set to {}", field_name, is_unique);
                    true
                }
                Err(error) => {
                    warn!("Updating is_unique of {} failed: {}", field_name, error);
                    for message in error.user_messages() {
                        notifier.show(&message, NotificationLevel::Error);
                    }
                    false
                }
            }
        }))
    }
}
