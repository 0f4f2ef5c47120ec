//! # Edit Session
//!
//! The controlled edit session shared by every console form: a draft derived
//! from a remote entity, a dirty flag, derived validity, create-or-update
//! dispatch and a cancel guard.
//!
//! ## Responsibilities
//!
//! - Build the initial draft from the remote entity, or an empty one
//! - Apply edits through named setters and track divergence with a flag
//! - Refuse to dispatch while any tracked field is invalid, while a commit
//!   is already in flight, or after the session closed
//! - Choose create vs update from the remote id and let the form build the
//!   request
//! - Relay commit failures to the notifier and keep the draft for resubmission
//! - Ask for confirmation before discarding unsaved edits
//!
//! ## Lifecycle
//!
//! ```text
//! Clean --edit--> Dirty --submit(valid)--> Submitting --success--> Closed | Clean
//! Dirty --submit(invalid)--> Dirty
//! Submitting --failure--> Dirty
//! Clean --cancel--> Closed
//! Dirty --cancel--> [confirm] --accept--> Closed | --decline--> Dirty
//! ```
//!
//! Each session kind supplies a [`SessionForm`]; the kind-specific setters
//! are inherent methods on `EditSession<ThatForm>` in the sibling modules.

use log::{debug, info, warn};
use shared::{MutationRequest, MutationResponse, NotificationLevel};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::io::{Confirmer, MutationTransport, Notifier, TransportError};

/// Prompt shown before discarding a dirty draft
pub const UNSAVED_CHANGES_PROMPT: &str = "You have unsaved changes. Do you really want to cancel?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Clean,
    Dirty,
    Submitting,
    Closed,
}

/// Whether a commit creates the remote entity or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    Create,
    Update,
}

impl fmt::Display for CommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitMode::Create => f.write_str("create"),
            CommitMode::Update => f.write_str("update"),
        }
    }
}

/// What a request is built against: nothing yet, or the existing entity
#[derive(Debug)]
pub enum CommitTarget<'a, R> {
    Create,
    Update(&'a R),
}

impl<R> CommitTarget<'_, R> {
    pub fn mode(&self) -> CommitMode {
        match self {
            CommitTarget::Create => CommitMode::Create,
            CommitTarget::Update(_) => CommitMode::Update,
        }
    }
}

/// Per-field validity, derived from the draft on demand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityMap {
    fields: BTreeMap<&'static str, bool>,
}

impl ValidityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str, valid: bool) -> Self {
        self.fields.insert(field, valid);
        self
    }

    pub fn get(&self, field: &str) -> Option<bool> {
        self.fields.get(field).copied()
    }

    /// True when every tracked field is valid (and trivially when none are)
    pub fn all_valid(&self) -> bool {
        self.fields.values().all(|valid| *valid)
    }

    pub fn invalid_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|(_, valid)| !**valid)
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{field} does not apply to {kind}")]
    NotApplicable { field: &'static str, kind: String },
    #[error("session cannot be edited while {0:?}")]
    NotEditable(SessionStatus),
}

/// Why `begin_submit` dispatched nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("draft has invalid fields: {}", .0.invalid_fields().join(", "))]
    Invalid(ValidityMap),
    #[error("a commit is already in flight")]
    InFlight,
    #[error("session is closed")]
    Closed,
    #[error("{0} has not been created yet")]
    NotCreated(&'static str),
}

/// A request ready for the transport; feed its result back through
/// [`EditSession::complete`]
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub mode: CommitMode,
    pub request: MutationRequest,
}

/// What a form does with its session after a successful commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterCommit {
    Close,
    /// Stay open with a clean draft
    KeepOpen,
}

#[derive(Debug, Clone)]
pub enum CommitOutcome {
    Committed {
        response: MutationResponse,
        after: AfterCommit,
    },
    Failed(TransportError),
    /// A result arrived although no commit was pending; nothing changed
    Stale,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// Collaborators every session talks to
#[derive(Clone)]
pub struct SessionServices {
    pub transport: Arc<dyn MutationTransport>,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
}

impl SessionServices {
    pub fn new(
        transport: Arc<dyn MutationTransport>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            transport,
            notifier,
            confirmer,
        }
    }
}

impl fmt::Debug for SessionServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionServices").finish_non_exhaustive()
    }
}

/// Kind-specific half of an edit session
pub trait SessionForm {
    type Remote: Clone;
    type Draft: Clone + fmt::Debug;

    /// Short name used in logs and errors
    fn kind(&self) -> &'static str;

    fn initial_draft(&self, remote: Option<&Self::Remote>) -> Self::Draft;

    /// Opaque id of the remote entity; empty means not yet created
    fn remote_id<'r>(&self, remote: &'r Self::Remote) -> &'r str;

    /// Whether fresh remote data still describes the entity being edited
    fn same_identity(&self, current: Option<&Self::Remote>, incoming: Option<&Self::Remote>) -> bool {
        match (current, incoming) {
            (Some(current), Some(incoming)) => self.remote_id(current) == self.remote_id(incoming),
            (None, None) => true,
            _ => false,
        }
    }

    fn validities(&self, _draft: &Self::Draft) -> ValidityMap {
        ValidityMap::new()
    }

    fn build_request(&self, target: CommitTarget<'_, Self::Remote>, draft: &Self::Draft) -> MutationRequest;

    fn after_commit(
        &self,
        _mode: CommitMode,
        _response: &MutationResponse,
        _draft: &mut Self::Draft,
    ) -> AfterCommit {
        AfterCommit::Close
    }

    /// Remote entity as confirmed by the server, when the payload carries one
    fn committed_remote(&self, _response: &MutationResponse) -> Option<Self::Remote> {
        None
    }

    fn success_message(&self, _mode: CommitMode) -> Option<&'static str> {
        None
    }
}

/// Commit awaiting its result, with the dirty flag it started from
#[derive(Debug, Clone, Copy)]
struct InFlight {
    mode: CommitMode,
    was_dirty: bool,
}

pub struct EditSession<F: SessionForm> {
    form: F,
    remote: Option<F::Remote>,
    draft: F::Draft,
    dirty: bool,
    in_flight: Option<InFlight>,
    closed: bool,
    services: SessionServices,
}

impl<F: SessionForm> EditSession<F> {
    pub fn open(form: F, remote: Option<F::Remote>, services: SessionServices) -> Self {
        let draft = form.initial_draft(remote.as_ref());
        let session = Self {
            form,
            remote,
            draft,
            dirty: false,
            in_flight: None,
            closed: false,
            services,
        };
        debug!(
            "Opened {} session in {} mode",
            session.form.kind(),
            session.commit_mode()
        );
        session
    }

    pub fn draft(&self) -> &F::Draft {
        &self.draft
    }

    pub fn remote(&self) -> Option<&F::Remote> {
        self.remote.as_ref()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub(crate) fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub(crate) fn services(&self) -> &SessionServices {
        &self.services
    }

    pub fn status(&self) -> SessionStatus {
        if self.closed {
            SessionStatus::Closed
        } else if self.in_flight.is_some() {
            SessionStatus::Submitting
        } else if self.dirty {
            SessionStatus::Dirty
        } else {
            SessionStatus::Clean
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Create when there is no remote entity or its id is empty
    pub fn commit_mode(&self) -> CommitMode {
        match &self.remote {
            Some(remote) if !self.form.remote_id(remote).is_empty() => CommitMode::Update,
            _ => CommitMode::Create,
        }
    }

    pub fn validities(&self) -> ValidityMap {
        self.form.validities(&self.draft)
    }

    pub fn is_valid(&self) -> bool {
        self.validities().all_valid()
    }

    /// Whether the confirm affordance is enabled: edited, valid and idle
    pub fn can_confirm(&self) -> bool {
        self.status() == SessionStatus::Dirty && self.is_valid()
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), EditError> {
        match self.status() {
            status @ (SessionStatus::Submitting | SessionStatus::Closed) => {
                Err(EditError::NotEditable(status))
            }
            SessionStatus::Clean | SessionStatus::Dirty => Ok(()),
        }
    }

    /// Apply a draft edit and mark the session dirty. `apply` must leave the
    /// draft untouched when it returns an error.
    pub(crate) fn edit<T>(
        &mut self,
        apply: impl FnOnce(&mut F::Draft) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        self.ensure_editable()?;
        let value = apply(&mut self.draft)?;
        self.dirty = true;
        Ok(value)
    }

    /// Accept fresh remote data. The draft is rebuilt and the dirty flag
    /// cleared only when the remote identity changed; returns whether that
    /// happened.
    pub fn rebase(&mut self, remote: Option<F::Remote>) -> bool {
        if self.closed {
            return false;
        }
        let rebuild = self.in_flight.is_none()
            && !self.form.same_identity(self.remote.as_ref(), remote.as_ref());
        if rebuild {
            self.draft = self.form.initial_draft(remote.as_ref());
            self.dirty = false;
            debug!("Rebuilt {} draft from new remote data", self.form.kind());
        }
        self.remote = remote;
        rebuild
    }

    /// Validate the draft and build the request to commit
    pub fn begin_submit(&mut self) -> Result<PendingCommit, SubmitRejected> {
        self.ensure_can_commit()?;
        let validities = self.validities();
        if !validities.all_valid() {
            debug!(
                "Not submitting {}: invalid {:?}",
                self.form.kind(),
                validities.invalid_fields()
            );
            return Err(SubmitRejected::Invalid(validities));
        }

        let target = match &self.remote {
            Some(remote) if !self.form.remote_id(remote).is_empty() => CommitTarget::Update(remote),
            _ => CommitTarget::Create,
        };
        let mode = target.mode();
        let request = self.form.build_request(target, &self.draft);
        Ok(self.start_commit(mode, request))
    }

    /// Start a commit of a form-specific request that bypasses draft
    /// validation, e.g. disabling an auth provider
    pub(crate) fn begin_commit_with(
        &mut self,
        mode: CommitMode,
        request: MutationRequest,
    ) -> Result<PendingCommit, SubmitRejected> {
        self.ensure_can_commit()?;
        Ok(self.start_commit(mode, request))
    }

    fn ensure_can_commit(&self) -> Result<(), SubmitRejected> {
        if self.closed {
            warn!("Refusing to submit closed {} session", self.form.kind());
            return Err(SubmitRejected::Closed);
        }
        if self.in_flight.is_some() {
            warn!("Refusing second submit of {} while a commit is in flight", self.form.kind());
            return Err(SubmitRejected::InFlight);
        }
        Ok(())
    }

    fn start_commit(&mut self, mode: CommitMode, request: MutationRequest) -> PendingCommit {
        info!(
            "Submitting {} ({} via {})",
            self.form.kind(),
            mode,
            request.field_name()
        );
        self.in_flight = Some(InFlight {
            mode,
            was_dirty: self.dirty,
        });
        PendingCommit { mode, request }
    }

    /// Deliver the transport's answer for the pending commit
    pub fn complete(&mut self, result: Result<MutationResponse, TransportError>) -> CommitOutcome {
        let Some(InFlight { mode, was_dirty }) = self.in_flight.take() else {
            warn!("Ignoring commit result for idle {} session", self.form.kind());
            return CommitOutcome::Stale;
        };

        match result {
            Ok(response) => {
                let after = self.form.after_commit(mode, &response, &mut self.draft);
                if let Some(remote) = self.form.committed_remote(&response) {
                    if after == AfterCommit::KeepOpen {
                        self.draft = self.form.initial_draft(Some(&remote));
                    }
                    self.remote = Some(remote);
                }
                match after {
                    AfterCommit::Close => self.closed = true,
                    AfterCommit::KeepOpen => self.dirty = false,
                }
                if let Some(message) = self.form.success_message(mode) {
                    self.services.notifier.show(message, NotificationLevel::Success);
                }
                info!("{} {} committed", self.form.kind(), mode);
                CommitOutcome::Committed { response, after }
            }
            Err(error) => {
                warn!("{} {} failed: {}", self.form.kind(), mode, error);
                for message in error.user_messages() {
                    self.services.notifier.show(&message, NotificationLevel::Error);
                }
                // Only edits make a session dirty
                self.dirty = was_dirty;
                CommitOutcome::Failed(error)
            }
        }
    }

    /// Validate, dispatch through the transport and apply the outcome
    pub async fn submit(&mut self) -> Result<CommitOutcome, SubmitRejected> {
        let pending = self.begin_submit()?;
        Ok(self.dispatch(pending).await)
    }

    pub(crate) async fn dispatch(&mut self, pending: PendingCommit) -> CommitOutcome {
        let transport = Arc::clone(&self.services.transport);
        let result = transport.commit(pending.request).await;
        self.complete(result)
    }

    /// Close the session, asking first when there are unsaved edits.
    /// Returns whether the session is now closed.
    pub fn request_cancel(&mut self) -> bool {
        match self.status() {
            SessionStatus::Closed => true,
            SessionStatus::Submitting => {
                warn!("Cannot cancel {} while a commit is in flight", self.form.kind());
                false
            }
            SessionStatus::Clean => {
                self.closed = true;
                true
            }
            SessionStatus::Dirty => {
                if self.services.confirmer.confirm(UNSAVED_CHANGES_PROMPT) {
                    debug!("Discarding unsaved {} edits", self.form.kind());
                    self.closed = true;
                    true
                } else {
                    false
                }
            }
        }
    }
}

impl<F: SessionForm> fmt::Debug for EditSession<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("kind", &self.form.kind())
            .field("status", &self.status())
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}
