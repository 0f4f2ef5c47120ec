//! # Account Settings
//!
//! The settings tab of the signed-in customer. It is made of two independent
//! edit sessions that share one "Save changes" action:
//!
//! - **profile**: name and email, committed with `updateCustomer`
//! - **password**: current password plus the new one entered twice,
//!   committed with `updatePassword`
//!
//! Saving commits whichever part changed; both commits may be in flight at
//! the same time. A password change whose two entries differ is reported
//! explicitly instead of being silently ignored.

use log::info;
use serde::Deserialize;
use shared::{
    Customer, MutationRequest, MutationResponse, NotificationLevel, UpdateCustomerRequest,
    UpdatePasswordRequest,
};

use super::edit_session::{
    AfterCommit, CommitMode, CommitOutcome, CommitTarget, EditError, EditSession, PendingCommit,
    SessionForm, SessionServices, SubmitRejected, ValidityMap,
};
use super::validation::passwords_match;

pub const NOTHING_TO_SAVE: &str = "No changes to save...";
pub const PROFILE_SAVED: &str = "Changes to email and name were saved.";
pub const PASSWORD_CHANGED: &str = "Changes to password successful.";
pub const PASSWORD_MISMATCH: &str = "Please enter the same new password twice.";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PasswordDraft {
    pub old_password: String,
    pub new_password: String,
    pub repeat_password: String,
}

impl PasswordDraft {
    /// Both new-password entries are filled in
    pub fn is_entered(&self) -> bool {
        !self.new_password.is_empty() && !self.repeat_password.is_empty()
    }
}

fn customer_id(target: &CommitTarget<'_, Customer>) -> String {
    match target {
        CommitTarget::Create => String::new(),
        CommitTarget::Update(customer) => customer.id.clone(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm;

impl SessionForm for ProfileForm {
    type Remote = Customer;
    type Draft = ProfileDraft;

    fn kind(&self) -> &'static str {
        "profile"
    }

    fn initial_draft(&self, remote: Option<&Customer>) -> ProfileDraft {
        remote
            .map(|customer| ProfileDraft {
                name: customer.name.clone(),
                email: customer.email.clone(),
            })
            .unwrap_or_default()
    }

    fn remote_id<'r>(&self, remote: &'r Customer) -> &'r str {
        &remote.id
    }

    fn build_request(&self, target: CommitTarget<'_, Customer>, draft: &ProfileDraft) -> MutationRequest {
        MutationRequest::UpdateCustomer(UpdateCustomerRequest {
            customer_id: customer_id(&target),
            email: draft.email.clone(),
            name: draft.name.clone(),
        })
    }

    fn after_commit(&self, _mode: CommitMode, _response: &MutationResponse, _draft: &mut ProfileDraft) -> AfterCommit {
        AfterCommit::KeepOpen
    }

    fn committed_remote(&self, response: &MutationResponse) -> Option<Customer> {
        Customer::deserialize(response.pointer("/customer")?).ok()
    }

    fn success_message(&self, _mode: CommitMode) -> Option<&'static str> {
        Some(PROFILE_SAVED)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PasswordForm;

impl SessionForm for PasswordForm {
    type Remote = Customer;
    type Draft = PasswordDraft;

    fn kind(&self) -> &'static str {
        "password"
    }

    fn initial_draft(&self, _remote: Option<&Customer>) -> PasswordDraft {
        PasswordDraft::default()
    }

    fn remote_id<'r>(&self, remote: &'r Customer) -> &'r str {
        &remote.id
    }

    fn validities(&self, draft: &PasswordDraft) -> ValidityMap {
        ValidityMap::new().with(
            "new_password",
            passwords_match(&draft.new_password, &draft.repeat_password),
        )
    }

    fn build_request(&self, target: CommitTarget<'_, Customer>, draft: &PasswordDraft) -> MutationRequest {
        MutationRequest::UpdatePassword(UpdatePasswordRequest {
            customer_id: customer_id(&target),
            old_password: draft.old_password.clone(),
            new_password: draft.new_password.clone(),
        })
    }

    fn after_commit(&self, _mode: CommitMode, _response: &MutationResponse, draft: &mut PasswordDraft) -> AfterCommit {
        *draft = PasswordDraft::default();
        AfterCommit::KeepOpen
    }

    fn success_message(&self, _mode: CommitMode) -> Option<&'static str> {
        Some(PASSWORD_CHANGED)
    }
}

/// What one `save_changes` call did with each part
#[derive(Debug, Default)]
pub struct SaveReport {
    pub profile: Option<Result<CommitOutcome, SubmitRejected>>,
    pub password: Option<Result<CommitOutcome, SubmitRejected>>,
}

impl SaveReport {
    pub fn nothing_to_save(&self) -> bool {
        self.profile.is_none() && self.password.is_none()
    }
}

#[derive(Debug)]
pub struct AccountSettings {
    profile: EditSession<ProfileForm>,
    password: EditSession<PasswordForm>,
}

impl AccountSettings {
    pub fn open(customer: Customer, services: SessionServices) -> Self {
        Self {
            profile: EditSession::open(ProfileForm, Some(customer.clone()), services.clone()),
            password: EditSession::open(PasswordForm, Some(customer), services),
        }
    }

    pub fn profile(&self) -> &EditSession<ProfileForm> {
        &self.profile
    }

    pub fn password(&self) -> &EditSession<PasswordForm> {
        &self.password
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), EditError> {
        let name = name.into();
        self.profile.edit(|draft| {
            draft.name = name;
            Ok(())
        })
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), EditError> {
        let email = email.into();
        self.profile.edit(|draft| {
            draft.email = email;
            Ok(())
        })
    }

    pub fn set_old_password(&mut self, password: impl Into<String>) -> Result<(), EditError> {
        let password = password.into();
        self.password.edit(|draft| {
            draft.old_password = password;
            Ok(())
        })
    }

    pub fn set_new_password(&mut self, password: impl Into<String>) -> Result<(), EditError> {
        let password = password.into();
        self.password.edit(|draft| {
            draft.new_password = password;
            Ok(())
        })
    }

    pub fn set_repeat_password(&mut self, password: impl Into<String>) -> Result<(), EditError> {
        let password = password.into();
        self.password.edit(|draft| {
            draft.repeat_password = password;
            Ok(())
        })
    }

    /// Fresh customer data from the API; edits survive unless the customer
    /// changed
    pub fn rebase(&mut self, customer: Customer) {
        self.profile.rebase(Some(customer.clone()));
        self.password.rebase(Some(customer));
    }

    /// Commit every changed part, concurrently when both changed
    pub async fn save_changes(&mut self) -> SaveReport {
        let profile_changed = self.profile.is_dirty();
        let password_changed = self.password.draft().is_entered();
        if !profile_changed && !password_changed {
            self.profile
                .services()
                .notifier
                .show(NOTHING_TO_SAVE, NotificationLevel::Info);
            return SaveReport::default();
        }

        let profile_pending = profile_changed.then(|| self.profile.begin_submit());
        let password_pending = password_changed.then(|| self.password.begin_submit());
        if let Some(Err(SubmitRejected::Invalid(_))) = &password_pending {
            self.password
                .services()
                .notifier
                .show(PASSWORD_MISMATCH, NotificationLevel::Error);
        }

        info!(
            "Saving account settings (profile: {}, password: {})",
            profile_changed, password_changed
        );
        let (profile, password) = tokio::join!(
            finish(&mut self.profile, profile_pending),
            finish(&mut self.password, password_pending),
        );
        SaveReport { profile, password }
    }
}

async fn finish<F: SessionForm>(
    session: &mut EditSession<F>,
    pending: Option<Result<PendingCommit, SubmitRejected>>,
) -> Option<Result<CommitOutcome, SubmitRejected>> {
    match pending? {
        Ok(pending) => Some(Ok(session.dispatch(pending).await)),
        Err(rejected) => Some(Err(rejected)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::edit_session::SessionStatus;
    use crate::io::{RecordingNotifier, ScriptedTransport, StaticConfirmer};
    use serde_json::json;
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

        fn settings(&self) -> AccountSettings {
            let services = SessionServices::new(
                self.transport.clone(),
                self.notifier.clone(),
                Arc::new(StaticConfirmer::accepting()),
            );
            AccountSettings::open(
                Customer {
                    id: "cus-1".to_string(),
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                },
                services,
            )
        }
    }

    #[tokio::test]
    async fn test_nothing_to_save() {
        let fixture = Fixture::new();
        let mut settings = fixture.settings();
        // A single new-password entry is not a change yet
        settings.set_new_password("hunter2").unwrap();

        let report = settings.save_changes().await;

        assert!(report.nothing_to_save());
        assert_eq!(fixture.transport.request_count(), 0);
        assert_eq!(
            fixture.notifier.messages(NotificationLevel::Info),
            vec![NOTHING_TO_SAVE.to_string()]
        );
    }

    #[tokio::test]
    async fn test_profile_change_is_saved_and_tab_stays_open() {
        let fixture = Fixture::new();
        fixture.transport.reply_with_payload(
            "updateCustomer",
            json!({ "customer": { "id": "cus-1", "name": "Ada L.", "email": "ada@example.com" } }),
        );
        let mut settings = fixture.settings();
        settings.set_name("Ada L.").unwrap();

        let report = settings.save_changes().await;

        assert!(matches!(report.profile, Some(Ok(CommitOutcome::Committed { .. }))));
        assert!(report.password.is_none());
        assert_eq!(
            fixture.transport.requests(),
            vec![MutationRequest::UpdateCustomer(UpdateCustomerRequest {
                customer_id: "cus-1".to_string(),
                email: "ada@example.com".to_string(),
                name: "Ada L.".to_string(),
            })]
        );
        assert_eq!(
            fixture.notifier.messages(NotificationLevel::Success),
            vec![PROFILE_SAVED.to_string()]
        );
        assert_eq!(settings.profile().status(), SessionStatus::Clean);
        assert_eq!(settings.profile().draft().name, "Ada L.");
    }

    #[tokio::test]
    async fn test_password_change_clears_fields() {
        let fixture = Fixture::new();
        let mut settings = fixture.settings();
        settings.set_old_password("old").unwrap();
        settings.set_new_password("new").unwrap();
        settings.set_repeat_password("new").unwrap();

        let report = settings.save_changes().await;

        assert!(matches!(report.password, Some(Ok(CommitOutcome::Committed { .. }))));
        assert_eq!(
            fixture.transport.requests(),
            vec![MutationRequest::UpdatePassword(UpdatePasswordRequest {
                customer_id: "cus-1".to_string(),
                old_password: "old".to_string(),
                new_password: "new".to_string(),
            })]
        );
        assert_eq!(settings.password().draft(), &PasswordDraft::default());
        assert_eq!(
            fixture.notifier.messages(NotificationLevel::Success),
            vec![PASSWORD_CHANGED.to_string()]
        );
    }

    #[tokio::test]
    async fn test_password_mismatch_is_reported() {
        let fixture = Fixture::new();
        let mut settings = fixture.settings();
        settings.set_new_password("one").unwrap();
        settings.set_repeat_password("two").unwrap();

        let report = settings.save_changes().await;

        assert!(matches!(report.password, Some(Err(SubmitRejected::Invalid(_)))));
        assert_eq!(fixture.transport.request_count(), 0);
        assert_eq!(
            fixture.notifier.messages(NotificationLevel::Error),
            vec![PASSWORD_MISMATCH.to_string()]
        );
        assert_eq!(settings.password().draft().repeat_password, "two");
    }

    #[tokio::test]
    async fn test_both_parts_commit_together() {
        let fixture = Fixture::new();
        let mut settings = fixture.settings();
        settings.set_email("ada@lovelace.dev").unwrap();
        settings.set_new_password("new").unwrap();
        settings.set_repeat_password("new").unwrap();

        let report = settings.save_changes().await;

        assert!(report.profile.is_some());
        assert!(report.password.is_some());
        let fields: Vec<_> = fixture
            .transport
            .requests()
            .iter()
            .map(|r| r.field_name())
            .collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"updateCustomer"));
        assert!(fields.contains(&"updatePassword"));
    }
}
