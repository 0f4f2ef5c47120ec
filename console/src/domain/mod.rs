//! # Domain Module
//!
//! Edit sessions of the console: a local draft of a remote entity, its
//! validity, and the commit that turns the draft into a create or update
//! mutation.
//!
//! ## Responsibilities
//!
//! - Track draft and dirty state for every editable panel
//! - Gate submission on field validity and on in-flight commits
//! - Dispatch commits through the injected transport and report failures
//!   through the notifier
//! - Guard cancellation of unsaved work with the confirmer
//!
//! ## Module Organization
//!
//! - **edit_session**: the generic `EditSession<F>` state holder and the
//!   `SessionForm` trait each panel implements
//! - **validation**: URL and password validators
//! - **action_editor**: mutation-callback actions (trigger fragment + webhook)
//! - **auth_provider_editor**: email, Digits and Auth0 provider panels
//! - **account_settings**: profile and password tabs saved together
//! - **login**: sign-in form
//! - **field_constraints**: the fire-and-forget "unique" toggle

pub mod account_settings;
pub mod action_editor;
pub mod auth_provider_editor;
pub mod edit_session;
pub mod field_constraints;
pub mod login;
pub mod validation;

pub use account_settings::{AccountSettings, SaveReport};
pub use action_editor::{ActionDraft, ActionEditor, ActionForm};
pub use auth_provider_editor::{AuthProviderDraft, AuthProviderForm, AuthProviderPanel, PrimaryAction};
pub use edit_session::{
    AfterCommit, CommitMode, CommitOutcome, CommitTarget, EditError, EditSession, PendingCommit,
    SessionForm, SessionServices, SessionStatus, SubmitRejected, ValidityMap,
};
pub use field_constraints::{ConstraintError, FieldConstraints};
pub use login::{LoginError, LoginSession, SigninPayload};
pub use validation::{is_valid_url, passwords_match};
