//! End-to-end behaviour of edit sessions against in-memory collaborators

use graph_console::domain::edit_session::UNSAVED_CHANGES_PROMPT;
use graph_console::domain::{
    AccountSettings, ActionEditor, AuthProviderPanel, CommitOutcome, PrimaryAction, SessionServices,
    SessionStatus, SubmitRejected,
};
use graph_console::io::{RecordingNotifier, ScriptedTransport, StaticConfirmer, TransportError};
use serde_json::json;
use shared::{
    Action, ActionHandlerType, ActionHandlerWebhook, ActionTriggerMutationModel, ActionTriggerType,
    AuthProvider, AuthProviderType, Customer, DigitsCredentials, GraphQLErrorEntry, ModelMutationType,
    ModelRef, MutationRequest, NotificationLevel,
};
use std::sync::Arc;

const SCHEMA: &str = include_str!("fixtures/post_schema.json");

struct Harness {
    transport: Arc<ScriptedTransport>,
    notifier: Arc<RecordingNotifier>,
    confirmer: Arc<StaticConfirmer>,
}

impl Harness {
    fn new(confirm: bool) -> Self {
        Self {
            transport: Arc::new(ScriptedTransport::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            confirmer: Arc::new(StaticConfirmer::new(confirm)),
        }
    }

    fn services(&self) -> SessionServices {
        SessionServices::new(
            self.transport.clone(),
            self.notifier.clone(),
            self.confirmer.clone(),
        )
    }
}

fn existing_action() -> Action {
    Action {
        id: "act-7".to_string(),
        description: "Notify on new posts".to_string(),
        is_active: false,
        trigger_type: ActionTriggerType::MutationModel,
        handler_type: ActionHandlerType::Webhook,
        trigger_mutation_model: Some(ActionTriggerMutationModel {
            model: ModelRef {
                id: "model-post".to_string(),
                name: "Post".to_string(),
            },
            mutation_type: ModelMutationType::Created,
            fragment: "{ post(id: \"1\") { id title } }".to_string(),
        }),
        handler_webhook: Some(ActionHandlerWebhook {
            url: "https://hooks.example.com/posts".to_string(),
        }),
    }
}

#[tokio::test]
async fn test_invalid_field_dispatches_nothing() {
    let harness = Harness::new(true);
    let mut editor = ActionEditor::open_action("proj-1", Some(SCHEMA), None, harness.services());
    editor.set_trigger_fragment("{ viewer { id } }").unwrap();
    editor.set_webhook_url("not a url").unwrap();

    let rejected = editor.submit().await.unwrap_err();

    match rejected {
        SubmitRejected::Invalid(validities) => {
            assert_eq!(validities.invalid_fields(), vec!["handler"]);
        }
        other => panic!("unexpected rejection: {:?}", other),
    }
    assert_eq!(harness.transport.request_count(), 0);
    assert!(harness.notifier.is_empty());
    assert_eq!(editor.status(), SessionStatus::Dirty);
}

#[tokio::test]
async fn test_mode_follows_remote_identity() {
    let harness = Harness::new(true);

    let mut create = ActionEditor::open_action("proj-1", Some(SCHEMA), None, harness.services());
    create.set_trigger_model("model-post").unwrap();
    create.set_action_schema(Some(SCHEMA));
    create.set_trigger_fragment("{ viewer { name } }").unwrap();
    create.set_webhook_url("http://example.com").unwrap();
    create.submit().await.unwrap();

    let mut blank = existing_action();
    blank.id = String::new();
    let mut blank_id = ActionEditor::open_action("proj-1", Some(SCHEMA), Some(blank), harness.services());
    blank_id.submit().await.unwrap();

    let mut update =
        ActionEditor::open_action("proj-1", Some(SCHEMA), Some(existing_action()), harness.services());
    update.submit().await.unwrap();

    let requests = harness.transport.requests();
    assert!(matches!(requests[0], MutationRequest::AddAction(_)));
    assert!(matches!(requests[1], MutationRequest::AddAction(_)));
    match &requests[2] {
        MutationRequest::UpdateAction(request) => assert_eq!(request.action_id, "act-7"),
        other => panic!("expected an update, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unedited_submit_round_trips_remote() {
    let harness = Harness::new(true);
    let action = existing_action();
    let mut editor =
        ActionEditor::open_action("proj-1", Some(SCHEMA), Some(action.clone()), harness.services());
    assert!(!editor.is_dirty());

    let outcome = editor.submit().await.unwrap();
    assert!(outcome.is_committed());

    let requests = harness.transport.requests();
    let MutationRequest::UpdateAction(request) = &requests[0] else {
        panic!("expected an update, got {:?}", requests[0]);
    };
    let trigger = action.trigger_mutation_model.unwrap();
    assert_eq!(request.description, action.description);
    assert_eq!(request.is_active, action.is_active);
    assert_eq!(request.trigger_mutation_model.fragment, trigger.fragment);
    assert_eq!(request.trigger_mutation_model.model_id, trigger.model.id);
    assert_eq!(request.trigger_mutation_model.mutation_type, Some(trigger.mutation_type));
    assert_eq!(request.handler_webhook.url, action.handler_webhook.unwrap().url);
    assert!(editor.is_closed());
}

#[tokio::test]
async fn test_transport_failure_keeps_session_open() {
    let harness = Harness::new(true);
    harness.transport.fail_with(TransportError::GraphQL(vec![GraphQLErrorEntry {
        message: "Insufficient permissions".to_string(),
        code: Some(3008),
    }]));
    let mut editor =
        ActionEditor::open_action("proj-1", Some(SCHEMA), Some(existing_action()), harness.services());
    editor.set_description("Notify on every new post").unwrap();

    let outcome = editor.submit().await.unwrap();

    assert!(matches!(outcome, CommitOutcome::Failed(_)));
    assert_eq!(editor.status(), SessionStatus::Dirty);
    assert_eq!(
        harness.notifier.messages(NotificationLevel::Error),
        vec!["Insufficient permissions".to_string()]
    );
}

#[test]
fn test_cancel_without_edits_does_not_prompt() {
    let harness = Harness::new(false);
    let mut editor =
        ActionEditor::open_action("proj-1", Some(SCHEMA), Some(existing_action()), harness.services());

    assert!(editor.request_cancel());
    assert!(editor.is_closed());
    assert_eq!(harness.confirmer.times_asked(), 0);
}

#[test]
fn test_cancel_with_edits_prompts_once_per_attempt() {
    let harness = Harness::new(false);
    let mut editor =
        ActionEditor::open_action("proj-1", Some(SCHEMA), Some(existing_action()), harness.services());
    editor.set_description("Changed").unwrap();

    assert!(!editor.request_cancel());
    assert_eq!(harness.confirmer.times_asked(), 1);
    assert!(!editor.request_cancel());
    assert_eq!(harness.confirmer.times_asked(), 2);
    assert_eq!(harness.confirmer.last_message().as_deref(), Some(UNSAVED_CHANGES_PROMPT));
    assert_eq!(editor.draft().description, "Changed");
}

#[test]
fn test_edits_after_close_are_refused() {
    let harness = Harness::new(true);
    let mut editor = ActionEditor::open_action("proj-1", None, None, harness.services());
    editor.set_description("draft").unwrap();
    assert!(editor.request_cancel());

    assert!(editor.set_description("again").is_err());
}

#[tokio::test]
async fn test_auth_provider_enable_then_disable() {
    let harness = Harness::new(true);
    harness.transport.reply_with_payload(
        "addAuthProvider",
        json!({
            "authProvider": {
                "id": "ap-1",
                "type": "AUTH_PROVIDER_DIGITS",
                "isEnabled": true,
                "digits": { "consumerKey": "key", "consumerSecret": "secret" },
                "auth0": null
            }
        }),
    );
    let mut panel =
        AuthProviderPanel::open_provider("proj-1", AuthProviderType::Digits, &[], harness.services());
    assert_eq!(panel.primary_action(), PrimaryAction::Enable);
    assert!(matches!(panel.disable().await, Err(SubmitRejected::NotCreated(_))));

    panel.set_consumer_key("key").unwrap();
    panel.set_consumer_secret("secret").unwrap();
    assert!(panel.submit().await.unwrap().is_committed());

    assert!(panel.exists());
    assert!(!panel.is_closed());
    assert_eq!(panel.primary_action(), PrimaryAction::None);

    assert!(panel.disable().await.unwrap().is_committed());
    let requests = harness.transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(matches!(requests[1], MutationRequest::DisableAuthProvider(_)));
}

#[test]
fn test_auth_provider_rejects_foreign_credentials() {
    let harness = Harness::new(true);
    let providers = vec![AuthProvider {
        id: "ap-2".to_string(),
        provider_type: AuthProviderType::Digits,
        is_enabled: true,
        digits: Some(DigitsCredentials {
            consumer_key: "k".to_string(),
            consumer_secret: "s".to_string(),
        }),
        auth0: None,
    }];
    let mut panel =
        AuthProviderPanel::open_provider("proj-1", AuthProviderType::Digits, &providers, harness.services());

    assert!(panel.set_domain("example.auth0.com").is_err());
    assert!(!panel.is_dirty());
    panel.set_consumer_key("k2").unwrap();
    assert_eq!(panel.primary_action(), PrimaryAction::Update);
}

#[tokio::test]
async fn test_account_settings_password_mismatch() {
    let harness = Harness::new(true);
    let customer = Customer {
        id: "cus-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let mut settings = AccountSettings::open(customer, harness.services());
    settings.set_old_password("old").unwrap();
    settings.set_new_password("a").unwrap();
    settings.set_repeat_password("b").unwrap();

    settings.save_changes().await;

    assert_eq!(harness.transport.request_count(), 0);
    assert_eq!(
        harness.notifier.messages(NotificationLevel::Error),
        vec!["Please enter the same new password twice.".to_string()]
    );
}
