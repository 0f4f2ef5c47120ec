//! # GraphQL Client
//!
//! HTTP implementation of [`MutationTransport`] against the console API.
//!
//! ## Responsibilities
//!
//! - Render every [`MutationRequest`] as a Relay-style mutation document with
//!   a single `input` variable carrying a fresh `clientMutationId`
//! - Attach the bearer token once the customer has signed in
//! - Map network failures, non-2xx statuses, undecodable bodies and GraphQL
//!   `errors` arrays to [`TransportError`]
//! - Fetch the action schema a trigger fragment is validated against

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{ActionSchemaSelection, GraphQLErrorEntry, MutationRequest, MutationResponse};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::transport::{ActionSchemaSource, MutationTransport, TransportError};

const ACTION_SELECTION: &str = "action { id description isActive triggerType handlerType \
    triggerMutationModel { model { id name } mutationType fragment } handlerWebhook { url } }";
const AUTH_PROVIDER_SELECTION: &str = "authProvider { id type isEnabled \
    digits { consumerKey consumerSecret } auth0 { domain clientId clientSecret } }";
const CUSTOMER_SELECTION: &str = "customer { id name email }";
const FIELD_SELECTION: &str = "field { id name typeIdentifier isSystem isUnique }";
const SIGNIN_SELECTION: &str = "token viewer { user { id } }";

const ACTION_SCHEMA_QUERY: &str = "query ActionSchema($projectId: ID!, $modelId: ID!, \
    $mutationType: ModelMutationType!) { project(id: $projectId) { \
    actionSchema(modelId: $modelId, modelMutationType: $mutationType) } }";

#[derive(Debug, Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQLErrorEntry>,
}

/// Console API client over HTTP
#[derive(Debug, Clone)]
pub struct GraphQLClient {
    http: Client,
    endpoint: Url,
    auth_token: Option<String>,
}

impl GraphQLClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            auth_token: None,
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.set_auth_token(token);
        self
    }

    /// Authenticate subsequent requests, e.g. after a successful sign-in
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.auth_token = (!token.is_empty()).then_some(token);
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the introspection JSON a trigger fragment is validated against.
    /// `None` when the project has no schema for the selection.
    pub async fn fetch_action_schema(
        &self,
        project_id: &str,
        selection: &ActionSchemaSelection,
    ) -> Result<Option<String>, TransportError> {
        let variables = json!({
            "projectId": project_id,
            "modelId": selection.model_id,
            "mutationType": selection.mutation_type.as_str(),
        });
        let data = self.execute(ACTION_SCHEMA_QUERY, variables).await?;
        let schema = data
            .pointer("/project/actionSchema")
            .and_then(Value::as_str)
            .map(str::to_string);
        debug!(
            "Fetched action schema for model {} ({}): {}",
            selection.model_id,
            selection.mutation_type,
            if schema.is_some() { "present" } else { "absent" }
        );
        Ok(schema)
    }

    async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphQLRequest { query, variables });
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            warn!("GraphQL endpoint answered {}", status);
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphQLResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        into_data(body)
    }
}

#[async_trait]
impl MutationTransport for GraphQLClient {
    async fn commit(&self, request: MutationRequest) -> Result<MutationResponse, TransportError> {
        let field = request.field_name();
        let (query, variables) = mutation_document(&request)?;
        info!("📤 Committing {} to {}", field, self.endpoint);

        let data = self.execute(&query, variables).await?;
        let response = payload_for(field, data)?;
        info!("✅ {} committed", field);
        Ok(response)
    }
}

#[async_trait]
impl ActionSchemaSource for GraphQLClient {
    async fn action_schema(
        &self,
        project_id: &str,
        selection: &ActionSchemaSelection,
    ) -> Result<Option<String>, TransportError> {
        self.fetch_action_schema(project_id, selection).await
    }
}

/// Query text and variables for a mutation request
pub fn mutation_document(request: &MutationRequest) -> Result<(String, Value), TransportError> {
    let field = request.field_name();
    let selection = match request {
        MutationRequest::AddAction(_) | MutationRequest::UpdateAction(_) => ACTION_SELECTION,
        MutationRequest::AddAuthProvider(_)
        | MutationRequest::UpdateAuthProvider(_)
        | MutationRequest::DisableAuthProvider(_) => AUTH_PROVIDER_SELECTION,
        MutationRequest::UpdateCustomer(_) | MutationRequest::UpdatePassword(_) => {
            CUSTOMER_SELECTION
        }
        MutationRequest::UpdateFieldIsUnique(_) => FIELD_SELECTION,
        MutationRequest::SigninCustomer(_) => SIGNIN_SELECTION,
    };
    let query = format!(
        "mutation ($input: {}Input!) {{ {field}(input: $input) {{ clientMutationId {selection} }} }}",
        input_type_prefix(field)
    );

    let mut tagged =
        serde_json::to_value(request).map_err(|e| TransportError::Decode(e.to_string()))?;
    let mut input = tagged
        .get_mut("input")
        .map(Value::take)
        .unwrap_or_else(|| json!({}));
    if let Some(object) = input.as_object_mut() {
        object.insert(
            "clientMutationId".to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
    }
    Ok((query, json!({ "input": input })))
}

fn input_type_prefix(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn into_data(body: GraphQLResponse) -> Result<Value, TransportError> {
    if !body.errors.is_empty() {
        return Err(TransportError::GraphQL(body.errors));
    }
    body.data
        .ok_or_else(|| TransportError::Decode("response has neither data nor errors".to_string()))
}

fn payload_for(field: &str, mut data: Value) -> Result<MutationResponse, TransportError> {
    match data.get_mut(field).map(Value::take) {
        Some(payload) if !payload.is_null() => Ok(MutationResponse::new(field, payload)),
        _ => Err(TransportError::MissingPayload(field.to_string())),
    }
}
