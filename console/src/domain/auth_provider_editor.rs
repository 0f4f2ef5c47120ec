//! # Auth Provider Panel
//!
//! Edit session for one authentication provider of a project. The panel is
//! opened for a provider type; it edits the project's existing provider of
//! that type or, when there is none, an empty draft that enabling creates.
//!
//! ## Responsibilities
//!
//! - Keep provider credentials in a draft whose shape follows the provider
//!   type (email carries none, Digits a consumer key pair, Auth0 a domain and
//!   client pair)
//! - Enable (`addAuthProvider`), update (`updateAuthProvider`) and disable
//!   (`disableAuthProvider`) the provider
//! - Rebuild the draft from every project refresh
//! - Describe each provider type for the panel header

use serde::Deserialize;
use shared::{
    AddAuthProviderRequest, Auth0Credentials, AuthProvider, AuthProviderType, DigitsCredentials,
    DisableAuthProviderRequest, MutationRequest, MutationResponse, UpdateAuthProviderRequest,
};

use super::edit_session::{
    AfterCommit, CommitMode, CommitOutcome, CommitTarget, EditError, EditSession, PendingCommit,
    SessionForm, SessionServices, SubmitRejected,
};

/// Credentials of a provider draft, shaped by provider type
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCredentials {
    Email,
    Digits(DigitsCredentials),
    Auth0(Auth0Credentials),
}

impl ProviderCredentials {
    pub fn empty(provider_type: AuthProviderType) -> Self {
        match provider_type {
            AuthProviderType::Email => ProviderCredentials::Email,
            AuthProviderType::Digits => ProviderCredentials::Digits(DigitsCredentials::default()),
            AuthProviderType::Auth0 => ProviderCredentials::Auth0(Auth0Credentials::default()),
        }
    }

    pub fn provider_type(&self) -> AuthProviderType {
        match self {
            ProviderCredentials::Email => AuthProviderType::Email,
            ProviderCredentials::Digits(_) => AuthProviderType::Digits,
            ProviderCredentials::Auth0(_) => AuthProviderType::Auth0,
        }
    }

    fn digits(&self) -> Option<DigitsCredentials> {
        match self {
            ProviderCredentials::Digits(digits) => Some(digits.clone()),
            _ => None,
        }
    }

    fn auth0(&self) -> Option<Auth0Credentials> {
        match self {
            ProviderCredentials::Auth0(auth0) => Some(auth0.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthProviderDraft {
    pub is_enabled: bool,
    pub credentials: ProviderCredentials,
}

/// The button the panel offers next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    /// Provider does not exist yet
    Enable,
    /// Provider exists and the draft was edited
    Update,
    None,
}

#[derive(Debug, Clone)]
pub struct AuthProviderForm {
    project_id: String,
    provider_type: AuthProviderType,
}

impl AuthProviderForm {
    pub fn new(project_id: impl Into<String>, provider_type: AuthProviderType) -> Self {
        Self {
            project_id: project_id.into(),
            provider_type,
        }
    }

    pub fn provider_type(&self) -> AuthProviderType {
        self.provider_type
    }

    /// The project's provider of this panel's type, if any
    pub fn select<'p>(&self, providers: &'p [AuthProvider]) -> Option<&'p AuthProvider> {
        providers.iter().find(|p| p.provider_type == self.provider_type)
    }
}

pub type AuthProviderPanel = EditSession<AuthProviderForm>;

impl SessionForm for AuthProviderForm {
    type Remote = AuthProvider;
    type Draft = AuthProviderDraft;

    fn kind(&self) -> &'static str {
        "auth provider"
    }

    fn initial_draft(&self, remote: Option<&AuthProvider>) -> AuthProviderDraft {
        let Some(provider) = remote.filter(|p| p.provider_type == self.provider_type) else {
            return AuthProviderDraft {
                is_enabled: false,
                credentials: ProviderCredentials::empty(self.provider_type),
            };
        };
        let credentials = match provider.provider_type {
            AuthProviderType::Email => ProviderCredentials::Email,
            AuthProviderType::Digits => {
                ProviderCredentials::Digits(provider.digits.clone().unwrap_or_default())
            }
            AuthProviderType::Auth0 => {
                ProviderCredentials::Auth0(provider.auth0.clone().unwrap_or_default())
            }
        };
        AuthProviderDraft {
            is_enabled: provider.is_enabled,
            credentials,
        }
    }

    fn remote_id<'r>(&self, remote: &'r AuthProvider) -> &'r str {
        &remote.id
    }

    // Every project refresh resets the panel
    fn same_identity(&self, _current: Option<&AuthProvider>, _incoming: Option<&AuthProvider>) -> bool {
        false
    }

    fn build_request(
        &self,
        target: CommitTarget<'_, AuthProvider>,
        draft: &AuthProviderDraft,
    ) -> MutationRequest {
        let provider_type = draft.credentials.provider_type();
        match target {
            CommitTarget::Create => MutationRequest::AddAuthProvider(AddAuthProviderRequest {
                project_id: self.project_id.clone(),
                provider_type,
                digits: draft.credentials.digits(),
                auth0: draft.credentials.auth0(),
            }),
            CommitTarget::Update(provider) => {
                MutationRequest::UpdateAuthProvider(UpdateAuthProviderRequest {
                    auth_provider_id: provider.id.clone(),
                    project_id: self.project_id.clone(),
                    provider_type,
                    digits: draft.credentials.digits(),
                    auth0: draft.credentials.auth0(),
                })
            }
        }
    }

    fn after_commit(
        &self,
        _mode: CommitMode,
        _response: &MutationResponse,
        _draft: &mut AuthProviderDraft,
    ) -> AfterCommit {
        AfterCommit::KeepOpen
    }

    fn committed_remote(&self, response: &MutationResponse) -> Option<AuthProvider> {
        let provider = response.pointer("/authProvider")?;
        AuthProvider::deserialize(provider).ok()
    }
}

impl EditSession<AuthProviderForm> {
    /// Open the panel for `provider_type` against the project's providers
    pub fn open_provider(
        project_id: impl Into<String>,
        provider_type: AuthProviderType,
        providers: &[AuthProvider],
        services: SessionServices,
    ) -> Self {
        let form = AuthProviderForm::new(project_id, provider_type);
        let remote = form.select(providers).cloned();
        Self::open(form, remote, services)
    }

    /// Rebuild from a refreshed provider list
    pub fn refresh(&mut self, providers: &[AuthProvider]) -> bool {
        let remote = self.form().select(providers).cloned();
        self.rebase(remote)
    }

    pub fn exists(&self) -> bool {
        self.commit_mode() == CommitMode::Update
    }

    pub fn is_active(&self) -> bool {
        self.remote().is_some_and(|p| p.is_enabled)
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if !self.exists() {
            PrimaryAction::Enable
        } else if self.is_dirty() {
            PrimaryAction::Update
        } else {
            PrimaryAction::None
        }
    }

    pub fn info(&self) -> &'static ProviderInfo {
        provider_info(self.form().provider_type())
    }

    pub fn set_consumer_key(&mut self, value: impl Into<String>) -> Result<(), EditError> {
        let value = value.into();
        self.edit_digits("consumer key", |digits| digits.consumer_key = value)
    }

    pub fn set_consumer_secret(&mut self, value: impl Into<String>) -> Result<(), EditError> {
        let value = value.into();
        self.edit_digits("consumer secret", |digits| digits.consumer_secret = value)
    }

    pub fn set_domain(&mut self, value: impl Into<String>) -> Result<(), EditError> {
        let value = value.into();
        self.edit_auth0("domain", |auth0| auth0.domain = value)
    }

    pub fn set_client_id(&mut self, value: impl Into<String>) -> Result<(), EditError> {
        let value = value.into();
        self.edit_auth0("client id", |auth0| auth0.client_id = value)
    }

    pub fn set_client_secret(&mut self, value: impl Into<String>) -> Result<(), EditError> {
        let value = value.into();
        self.edit_auth0("client secret", |auth0| auth0.client_secret = value)
    }

    fn edit_digits(
        &mut self,
        field: &'static str,
        apply: impl FnOnce(&mut DigitsCredentials),
    ) -> Result<(), EditError> {
        self.edit(|draft| match &mut draft.credentials {
            ProviderCredentials::Digits(digits) => {
                apply(digits);
                Ok(())
            }
            other => Err(EditError::NotApplicable {
                field,
                kind: other.provider_type().to_string(),
            }),
        })
    }

    fn edit_auth0(
        &mut self,
        field: &'static str,
        apply: impl FnOnce(&mut Auth0Credentials),
    ) -> Result<(), EditError> {
        self.edit(|draft| match &mut draft.credentials {
            ProviderCredentials::Auth0(auth0) => {
                apply(auth0);
                Ok(())
            }
            other => Err(EditError::NotApplicable {
                field,
                kind: other.provider_type().to_string(),
            }),
        })
    }

    /// Build the disable request; only an existing provider can be disabled
    pub fn begin_disable(&mut self) -> Result<PendingCommit, SubmitRejected> {
        let request = match self.remote() {
            Some(provider) if !provider.id.is_empty() => {
                MutationRequest::DisableAuthProvider(DisableAuthProviderRequest {
                    auth_provider_id: provider.id.clone(),
                    project_id: self.form().project_id.clone(),
                    provider_type: provider.provider_type,
                })
            }
            _ => return Err(SubmitRejected::NotCreated("auth provider")),
        };
        self.begin_commit_with(CommitMode::Update, request)
    }

    pub async fn disable(&mut self) -> Result<CommitOutcome, SubmitRejected> {
        let pending = self.begin_disable()?;
        Ok(self.dispatch(pending).await)
    }
}

/// Descriptive texts shown in the panel for a provider type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub link_href: &'static str,
    pub link_text: &'static str,
    /// Fields the provider adds to the `User` type
    pub generated_fields: &'static [&'static str],
    pub generated_mutations: &'static [&'static str],
}

static EMAIL_INFO: ProviderInfo = ProviderInfo {
    title: "Graphcool Email + Password",
    description: "Use the built-in auth system that authenticates users with email and password",
    link_href: "https://docs.graph.cool/reference/platform#temporary-authentication-token",
    link_text: "docs.graph.cool",
    generated_fields: &["email", "password"],
    generated_mutations: &[
        "createUser(authProvider: { email: { email, password } })",
        "signinUser(email: { email, password })",
    ],
};

static DIGITS_INFO: ProviderInfo = ProviderInfo {
    title: "Digits - Two-Step Phone Authentication",
    description: "Digits offers two-step authentication via a phone number and a code that is sent to that number.",
    link_href: "https://www.digits.com",
    link_text: "www.digits.com",
    generated_fields: &["digitsID"],
    generated_mutations: &[
        "createUser(authProvider: { digits: { apiUrl, credentials } })",
        "signinUser(digits: { apiUrl, credentials })",
    ],
};

static AUTH0_INFO: ProviderInfo = ProviderInfo {
    title: "Auth0 - Broad Authentication Solution",
    description: "Auth0 combines a variety of authentication methods and a dashboard to organize them.",
    link_href: "https://www.auth0.com",
    link_text: "www.auth0.com",
    generated_fields: &["auth0UserId"],
    generated_mutations: &[
        "createUser(authProvider: { auth0: { idToken } })",
        "signinUser(auth0: { idToken })",
    ],
};

pub fn provider_info(provider_type: AuthProviderType) -> &'static ProviderInfo {
    match provider_type {
        AuthProviderType::Email => &EMAIL_INFO,
        AuthProviderType::Digits => &DIGITS_INFO,
        AuthProviderType::Auth0 => &AUTH0_INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::edit_session::SessionStatus;
    use crate::io::{RecordingNotifier, ScriptedTransport, StaticConfirmer, TransportError};
    use serde_json::json;
    use shared::{GraphQLErrorEntry, NotificationLevel};
    use std::sync::Arc;

    struct Fixture {
        transport: Arc<ScriptedTransport>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                transport: Arc::new(ScriptedTransport::new()),
                notifier: Arc::new(RecordingNotifier::new()),
            }
        }

        fn services(&self) -> SessionServices {
            SessionServices::new(
                self.transport.clone(),
                self.notifier.clone(),
                Arc::new(StaticConfirmer::accepting()),
            )
        }
    }

    fn digits_provider() -> AuthProvider {
        AuthProvider {
            id: "ap-1".to_string(),
            provider_type: AuthProviderType::Digits,
            is_enabled: true,
            digits: Some(DigitsCredentials {
                consumer_key: "key".to_string(),
                consumer_secret: "secret".to_string(),
            }),
            auth0: None,
        }
    }

    #[test]
    fn test_empty_drafts_follow_provider_type() {
        let fixture = Fixture::new();
        for provider_type in AuthProviderType::ALL {
            let panel = AuthProviderPanel::open_provider("p-1", provider_type, &[], fixture.services());
            assert_eq!(panel.draft().credentials, ProviderCredentials::empty(provider_type));
            assert!(!panel.draft().is_enabled);
            assert_eq!(panel.primary_action(), PrimaryAction::Enable);
        }

        let auth0 = AuthProviderPanel::open_provider("p-1", AuthProviderType::Auth0, &[], fixture.services());
        assert_eq!(
            auth0.draft().credentials,
            ProviderCredentials::Auth0(Auth0Credentials {
                domain: String::new(),
                client_id: String::new(),
                client_secret: String::new(),
            })
        );
    }

    #[test]
    fn test_opens_existing_provider_of_selected_type() {
        let fixture = Fixture::new();
        let providers = vec![digits_provider()];

        let panel = AuthProviderPanel::open_provider("p-1", AuthProviderType::Digits, &providers, fixture.services());
        assert!(panel.exists());
        assert!(panel.is_active());
        assert_eq!(panel.primary_action(), PrimaryAction::None);

        let other = AuthProviderPanel::open_provider("p-1", AuthProviderType::Email, &providers, fixture.services());
        assert!(!other.exists());
    }

    #[test]
    fn test_credential_setters_respect_shape() {
        let fixture = Fixture::new();
        let mut panel = AuthProviderPanel::open_provider(
            "p-1",
            AuthProviderType::Digits,
            &[digits_provider()],
            fixture.services(),
        );

        assert_eq!(
            panel.set_domain("tenant.auth0.com"),
            Err(EditError::NotApplicable {
                field: "domain",
                kind: "AUTH_PROVIDER_DIGITS".to_string(),
            })
        );
        assert!(!panel.is_dirty());

        panel.set_consumer_secret("rotated").unwrap();
        assert!(panel.is_dirty());
        assert_eq!(panel.primary_action(), PrimaryAction::Update);
        assert_eq!(
            panel.draft().credentials,
            ProviderCredentials::Digits(DigitsCredentials {
                consumer_key: "key".to_string(),
                consumer_secret: "rotated".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_enable_creates_provider_and_stays_open() {
        let fixture = Fixture::new();
        fixture.transport.reply_with_payload(
            "addAuthProvider",
            json!({
                "authProvider": {
                    "id": "ap-9",
                    "type": "AUTH_PROVIDER_AUTH0",
                    "isEnabled": true,
                    "digits": null,
                    "auth0": { "domain": "tenant.auth0.com", "clientId": "cid", "clientSecret": "cs" }
                }
            }),
        );
        let mut panel = AuthProviderPanel::open_provider("p-1", AuthProviderType::Auth0, &[], fixture.services());
        panel.set_domain("tenant.auth0.com").unwrap();
        panel.set_client_id("cid").unwrap();
        panel.set_client_secret("cs").unwrap();

        assert!(panel.submit().await.unwrap().is_committed());

        let requests = fixture.transport.requests();
        let MutationRequest::AddAuthProvider(request) = &requests[0] else {
            panic!("expected addAuthProvider, got {:?}", requests[0]);
        };
        assert_eq!(request.provider_type, AuthProviderType::Auth0);
        assert!(request.digits.is_none());
        assert_eq!(request.auth0.as_ref().map(|a| a.client_id.as_str()), Some("cid"));

        assert_eq!(panel.status(), SessionStatus::Clean);
        assert!(panel.exists());
        assert!(panel.is_active());
        assert_eq!(panel.primary_action(), PrimaryAction::None);
    }

    #[tokio::test]
    async fn test_update_reuses_provider_id() {
        let fixture = Fixture::new();
        let mut panel = AuthProviderPanel::open_provider(
            "p-1",
            AuthProviderType::Digits,
            &[digits_provider()],
            fixture.services(),
        );
        panel.set_consumer_key("new-key").unwrap();

        panel.submit().await.unwrap();

        assert_eq!(
            fixture.transport.requests(),
            vec![MutationRequest::UpdateAuthProvider(UpdateAuthProviderRequest {
                auth_provider_id: "ap-1".to_string(),
                project_id: "p-1".to_string(),
                provider_type: AuthProviderType::Digits,
                digits: Some(DigitsCredentials {
                    consumer_key: "new-key".to_string(),
                    consumer_secret: "secret".to_string(),
                }),
                auth0: None,
            })]
        );
    }

    #[tokio::test]
    async fn test_disable_requires_existing_provider() {
        let fixture = Fixture::new();
        let mut missing = AuthProviderPanel::open_provider("p-1", AuthProviderType::Email, &[], fixture.services());
        assert_eq!(
            missing.disable().await.unwrap_err(),
            SubmitRejected::NotCreated("auth provider")
        );

        let mut panel = AuthProviderPanel::open_provider(
            "p-1",
            AuthProviderType::Digits,
            &[digits_provider()],
            fixture.services(),
        );
        assert!(panel.disable().await.unwrap().is_committed());
        assert_eq!(
            fixture.transport.requests(),
            vec![MutationRequest::DisableAuthProvider(DisableAuthProviderRequest {
                auth_provider_id: "ap-1".to_string(),
                project_id: "p-1".to_string(),
                provider_type: AuthProviderType::Digits,
            })]
        );
    }

    #[tokio::test]
    async fn test_failure_is_notified() {
        let fixture = Fixture::new();
        fixture.transport.fail_with(TransportError::GraphQL(vec![GraphQLErrorEntry {
            message: "Invalid Auth0 domain".to_string(),
            code: None,
        }]));
        let mut panel = AuthProviderPanel::open_provider("p-1", AuthProviderType::Auth0, &[], fixture.services());
        panel.set_domain("nope").unwrap();

        assert!(!panel.submit().await.unwrap().is_committed());
        assert_eq!(
            fixture.notifier.messages(NotificationLevel::Error),
            vec!["Invalid Auth0 domain".to_string()]
        );
        assert_eq!(panel.draft().credentials.auth0().map(|a| a.domain), Some("nope".to_string()));
    }

    #[tokio::test]
    async fn test_failed_disable_leaves_panel_untouched() {
        let fixture = Fixture::new();
        fixture.transport.fail_with(TransportError::Network("connection reset".to_string()));
        let confirmer = Arc::new(StaticConfirmer::declining());
        let services = SessionServices::new(fixture.transport.clone(), fixture.notifier.clone(), confirmer.clone());
        let mut panel = AuthProviderPanel::open_provider("p-1", AuthProviderType::Digits, &[digits_provider()], services);
        assert_eq!(panel.primary_action(), PrimaryAction::None);

        assert!(!panel.disable().await.unwrap().is_committed());

        assert!(!panel.is_dirty());
        assert_eq!(panel.primary_action(), PrimaryAction::None);
        assert_eq!(fixture.notifier.messages(NotificationLevel::Error).len(), 1);
        assert!(panel.request_cancel());
        assert_eq!(confirmer.times_asked(), 0);
    }

    #[test]
    fn test_refresh_always_rebuilds() {
        let fixture = Fixture::new();
        let mut panel = AuthProviderPanel::open_provider(
            "p-1",
            AuthProviderType::Digits,
            &[digits_provider()],
            fixture.services(),
        );
        panel.set_consumer_key("typed").unwrap();

        assert!(panel.refresh(&[digits_provider()]));
        assert!(!panel.is_dirty());
        assert_eq!(panel.draft().credentials.digits().map(|d| d.consumer_key), Some("key".to_string()));
    }

    #[test]
    fn test_provider_catalogue() {
        assert_eq!(provider_info(AuthProviderType::Digits).generated_fields, &["digitsID"]);
        assert!(provider_info(AuthProviderType::Auth0).title.starts_with("Auth0"));
        assert_eq!(provider_info(AuthProviderType::Email).generated_mutations.len(), 2);
        assert_eq!(provider_info(AuthProviderType::Email).title, "Graphcool Email + Password");
    }
}
