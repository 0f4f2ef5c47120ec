//! # Action Editor
//!
//! Edit session for an action: a model-mutation trigger (model, mutation
//! kind, fragment) plus a webhook handler.
//!
//! ## Responsibilities
//!
//! - Track trigger validity by checking the fragment against the action
//!   schema for the selected model and mutation kind
//! - Track handler validity by checking the webhook URL
//! - Rebuild the schema whenever a new schema source arrives, so validity
//!   follows both the fragment and the schema
//! - Commit `addAction` with fixed defaults or `updateAction` carrying the
//!   existing `isActive` forward; a successful commit closes the editor

use log::debug;
use shared::{
    Action, ActionHandlerType, ActionSchemaSelection, ActionTriggerType, AddActionRequest,
    HandlerWebhookInput, ModelMutationType, MutationRequest, TriggerMutationModelInput,
    UpdateActionRequest,
};
use std::sync::Arc;

use super::edit_session::{
    CommitTarget, EditError, EditSession, SessionForm, SessionServices, ValidityMap,
};
use super::validation::is_valid_url;
use crate::graphql::{self, ClientSchema};
use crate::io::{ActionSchemaSource, TransportError};

pub const TRIGGER: &str = "trigger";
pub const HANDLER: &str = "handler";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionDraft {
    pub description: String,
    pub model_id: String,
    /// Unset until the user picks one for a new action
    pub mutation_type: Option<ModelMutationType>,
    pub fragment: String,
    pub webhook_url: String,
}

/// Action editor context: the owning project and its current action schema
#[derive(Debug, Clone)]
pub struct ActionForm {
    project_id: String,
    schema: Option<Arc<ClientSchema>>,
}

impl ActionForm {
    pub fn new(project_id: impl Into<String>, schema_source: Option<&str>) -> Self {
        Self {
            project_id: project_id.into(),
            schema: graphql::build_schema(schema_source),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn schema(&self) -> Option<&Arc<ClientSchema>> {
        self.schema.as_ref()
    }
}

pub type ActionEditor = EditSession<ActionForm>;

impl SessionForm for ActionForm {
    type Remote = Action;
    type Draft = ActionDraft;

    fn kind(&self) -> &'static str {
        "action"
    }

    fn initial_draft(&self, remote: Option<&Action>) -> ActionDraft {
        let Some(action) = remote else {
            return ActionDraft::default();
        };
        let trigger = action.trigger_mutation_model.as_ref();
        ActionDraft {
            description: action.description.clone(),
            model_id: trigger.map(|t| t.model.id.clone()).unwrap_or_default(),
            mutation_type: trigger.map(|t| t.mutation_type),
            fragment: trigger.map(|t| t.fragment.clone()).unwrap_or_default(),
            webhook_url: action
                .handler_webhook
                .as_ref()
                .map(|h| h.url.clone())
                .unwrap_or_default(),
        }
    }

    fn remote_id<'r>(&self, remote: &'r Action) -> &'r str {
        &remote.id
    }

    fn validities(&self, draft: &ActionDraft) -> ValidityMap {
        ValidityMap::new()
            .with(
                TRIGGER,
                graphql::is_valid_query(self.schema.as_deref(), Some(draft.fragment.as_str())),
            )
            .with(HANDLER, is_valid_url(&draft.webhook_url))
    }

    fn build_request(&self, target: CommitTarget<'_, Action>, draft: &ActionDraft) -> MutationRequest {
        let trigger_mutation_model = TriggerMutationModelInput {
            fragment: draft.fragment.clone(),
            mutation_type: draft.mutation_type,
            model_id: draft.model_id.clone(),
        };
        let handler_webhook = HandlerWebhookInput {
            url: draft.webhook_url.clone(),
        };

        match target {
            CommitTarget::Create => MutationRequest::AddAction(AddActionRequest {
                project_id: self.project_id.clone(),
                is_active: true,
                description: draft.description.clone(),
                trigger_type: ActionTriggerType::MutationModel,
                handler_type: ActionHandlerType::Webhook,
                trigger_mutation_model,
                handler_webhook,
            }),
            CommitTarget::Update(action) => MutationRequest::UpdateAction(UpdateActionRequest {
                action_id: action.id.clone(),
                is_active: action.is_active,
                description: draft.description.clone(),
                trigger_type: ActionTriggerType::MutationModel,
                handler_type: ActionHandlerType::Webhook,
                trigger_mutation_model,
                handler_webhook,
            }),
        }
    }
}

impl EditSession<ActionForm> {
    /// Open an editor for `action`, or for a new action when `None`
    pub fn open_action(
        project_id: impl Into<String>,
        schema_source: Option<&str>,
        action: Option<Action>,
        services: SessionServices,
    ) -> Self {
        Self::open(ActionForm::new(project_id, schema_source), action, services)
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditError> {
        let description = description.into();
        self.edit(|draft| {
            draft.description = description;
            Ok(())
        })
    }

    /// Changing the model drops the action schema until the one for the new
    /// selection is applied
    pub fn set_trigger_model(&mut self, model_id: impl Into<String>) -> Result<(), EditError> {
        let model_id = model_id.into();
        let changed = self.edit(|draft| {
            let changed = draft.model_id != model_id;
            draft.model_id = model_id;
            Ok(changed)
        })?;
        if changed {
            self.drop_action_schema();
        }
        Ok(())
    }

    pub fn set_trigger_mutation_type(&mut self, mutation_type: ModelMutationType) -> Result<(), EditError> {
        let changed = self.edit(|draft| {
            let changed = draft.mutation_type != Some(mutation_type);
            draft.mutation_type = Some(mutation_type);
            Ok(changed)
        })?;
        if changed {
            self.drop_action_schema();
        }
        Ok(())
    }

    fn drop_action_schema(&mut self) {
        if self.form_mut().schema.take().is_some() {
            debug!("Trigger selection changed, action schema dropped until refreshed");
        }
    }

    /// Replace the trigger fragment; trigger validity follows immediately
    pub fn set_trigger_fragment(&mut self, fragment: impl Into<String>) -> Result<(), EditError> {
        let fragment = fragment.into();
        self.edit(|draft| {
            draft.fragment = fragment;
            Ok(())
        })?;
        debug!("Trigger fragment changed, valid: {}", self.trigger_valid());
        Ok(())
    }

    pub fn set_webhook_url(&mut self, url: impl Into<String>) -> Result<(), EditError> {
        let url = url.into();
        self.edit(|draft| {
            draft.webhook_url = url;
            Ok(())
        })
    }

    /// Swap in a new action schema source and revalidate the current
    /// fragment against it. Not a draft edit: the dirty flag is unchanged.
    /// Returns the new trigger validity.
    pub fn set_action_schema(&mut self, schema_source: Option<&str>) -> bool {
        let check = graphql::check_query(schema_source, Some(self.draft().fragment.as_str()));
        self.form_mut().schema = check.schema;
        debug!("Action schema replaced, trigger valid: {}", check.valid);
        check.valid
    }

    /// Fetch the schema for the current trigger selection and apply it.
    /// Returns the trigger validity, or `None` when there is no selection yet.
    pub async fn refresh_action_schema(
        &mut self,
        source: &dyn ActionSchemaSource,
    ) -> Result<Option<bool>, TransportError> {
        let Some(selection) = self.schema_selection() else {
            return Ok(None);
        };
        let schema_source = source
            .action_schema(self.form().project_id(), &selection)
            .await?;
        Ok(Some(self.set_action_schema(schema_source.as_deref())))
    }

    /// Model and mutation kind the action schema must be fetched for
    pub fn schema_selection(&self) -> Option<ActionSchemaSelection> {
        let draft = self.draft();
        match (draft.model_id.is_empty(), draft.mutation_type) {
            (false, Some(mutation_type)) => Some(ActionSchemaSelection {
                model_id: draft.model_id.clone(),
                mutation_type,
            }),
            _ => None,
        }
    }

    pub fn trigger_valid(&self) -> bool {
        self.validities().get(TRIGGER).unwrap_or(false)
    }

    pub fn handler_valid(&self) -> bool {
        self.validities().get(HANDLER).unwrap_or(false)
    }

    /// The handler is only offered for editing once the trigger is valid
    pub fn handler_editable(&self) -> bool {
        self.trigger_valid()
    }
}
