use serde::{Deserialize, Serialize};
use std::fmt;

/// A model reference as returned by the console API (id + display name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    pub id: String,
    pub name: String,
}

/// Kind of model mutation an action trigger listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelMutationType {
    Created,
    Updated,
    Deleted,
}

impl ModelMutationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelMutationType::Created => "CREATED",
            ModelMutationType::Updated => "UPDATED",
            ModelMutationType::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for ModelMutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionTriggerType {
    MutationModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionHandlerType {
    Webhook,
}

/// Trigger configuration of an action: which model mutation fires it and
/// which fields of the mutated node are sent along
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTriggerMutationModel {
    pub model: ModelRef,
    pub mutation_type: ModelMutationType,
    /// GraphQL selection validated against the action schema
    pub fragment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionHandlerWebhook {
    pub url: String,
}

/// Action (trigger/handler rule) attached to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub description: String,
    pub is_active: bool,
    pub trigger_type: ActionTriggerType,
    pub handler_type: ActionHandlerType,
    pub trigger_mutation_model: Option<ActionTriggerMutationModel>,
    pub handler_webhook: Option<ActionHandlerWebhook>,
}

/// Pluggable authentication methods a project can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthProviderType {
    #[serde(rename = "AUTH_PROVIDER_EMAIL")]
    Email,
    #[serde(rename = "AUTH_PROVIDER_DIGITS")]
    Digits,
    #[serde(rename = "AUTH_PROVIDER_AUTH0")]
    Auth0,
}

impl AuthProviderType {
    pub const ALL: [AuthProviderType; 3] = [
        AuthProviderType::Email,
        AuthProviderType::Digits,
        AuthProviderType::Auth0,
    ];

    /// Wire name used by the GraphQL API
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProviderType::Email => "AUTH_PROVIDER_EMAIL",
            AuthProviderType::Digits => "AUTH_PROVIDER_DIGITS",
            AuthProviderType::Auth0 => "AUTH_PROVIDER_AUTH0",
        }
    }
}

impl fmt::Display for AuthProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitsCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth0Credentials {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Auth provider configuration as stored on a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProvider {
    pub id: String,
    #[serde(rename = "type")]
    pub provider_type: AuthProviderType,
    pub is_enabled: bool,
    pub digits: Option<DigitsCredentials>,
    pub auth0: Option<Auth0Credentials>,
}

/// Account owner of the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A field of a project model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    /// Type identifier such as `String`, `Int` or a relation model name
    pub type_identifier: String,
    pub is_system: bool,
    pub is_unique: bool,
}

/// Model and mutation kind an action schema is generated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSchemaSelection {
    pub model_id: String,
    pub mutation_type: ModelMutationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMutationModelInput {
    pub fragment: String,
    pub mutation_type: Option<ModelMutationType>,
    pub model_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerWebhookInput {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddActionRequest {
    pub project_id: String,
    pub is_active: bool,
    pub description: String,
    pub trigger_type: ActionTriggerType,
    pub handler_type: ActionHandlerType,
    pub trigger_mutation_model: TriggerMutationModelInput,
    pub handler_webhook: HandlerWebhookInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActionRequest {
    pub action_id: String,
    pub is_active: bool,
    pub description: String,
    pub trigger_type: ActionTriggerType,
    pub handler_type: ActionHandlerType,
    pub trigger_mutation_model: TriggerMutationModelInput,
    pub handler_webhook: HandlerWebhookInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAuthProviderRequest {
    pub project_id: String,
    #[serde(rename = "type")]
    pub provider_type: AuthProviderType,
    pub digits: Option<DigitsCredentials>,
    pub auth0: Option<Auth0Credentials>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthProviderRequest {
    pub auth_provider_id: String,
    pub project_id: String,
    #[serde(rename = "type")]
    pub provider_type: AuthProviderType,
    pub digits: Option<DigitsCredentials>,
    pub auth0: Option<Auth0Credentials>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableAuthProviderRequest {
    pub auth_provider_id: String,
    pub project_id: String,
    #[serde(rename = "type")]
    pub provider_type: AuthProviderType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub customer_id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub customer_id: String,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldIsUniqueRequest {
    pub field_id: String,
    pub is_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigninCustomerRequest {
    pub email: String,
    pub password: String,
}

/// Every mutation the console commits through the GraphQL transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mutation", content = "input", rename_all = "camelCase")]
pub enum MutationRequest {
    AddAction(AddActionRequest),
    UpdateAction(UpdateActionRequest),
    AddAuthProvider(AddAuthProviderRequest),
    UpdateAuthProvider(UpdateAuthProviderRequest),
    DisableAuthProvider(DisableAuthProviderRequest),
    UpdateCustomer(UpdateCustomerRequest),
    UpdatePassword(UpdatePasswordRequest),
    UpdateFieldIsUnique(UpdateFieldIsUniqueRequest),
    SigninCustomer(SigninCustomerRequest),
}

impl MutationRequest {
    /// Root mutation field name on the console API
    pub fn field_name(&self) -> &'static str {
        match self {
            MutationRequest::AddAction(_) => "addAction",
            MutationRequest::UpdateAction(_) => "updateAction",
            MutationRequest::AddAuthProvider(_) => "addAuthProvider",
            MutationRequest::UpdateAuthProvider(_) => "updateAuthProvider",
            MutationRequest::DisableAuthProvider(_) => "disableAuthProvider",
            MutationRequest::UpdateCustomer(_) => "updateCustomer",
            MutationRequest::UpdatePassword(_) => "updatePassword",
            MutationRequest::UpdateFieldIsUnique(_) => "updateField",
            MutationRequest::SigninCustomer(_) => "signinCustomer",
        }
    }

    /// True for requests that create a new remote entity
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            MutationRequest::AddAction(_) | MutationRequest::AddAuthProvider(_)
        )
    }
}

/// Server-confirmed payload of a successful commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// Root mutation field the payload was read from
    pub field: String,
    pub payload: serde_json::Value,
}

impl MutationResponse {
    pub fn new(field: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            field: field.into(),
            payload,
        }
    }

    /// Look up a nested payload value by a `/`-separated JSON pointer
    pub fn pointer(&self, pointer: &str) -> Option<&serde_json::Value> {
        self.payload.pointer(pointer)
    }
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Info => f.write_str("info"),
            NotificationLevel::Success => f.write_str("success"),
            NotificationLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// A single entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}
