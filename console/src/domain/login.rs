//! # Login
//!
//! Sign-in form of the console. Every submit is a `signinCustomer` commit;
//! the session reports `loading` while it is in flight and hands back the
//! token and customer id the caller authenticates the transport with.

use log::info;
use shared::{MutationRequest, MutationResponse, SigninCustomerRequest};
use std::sync::Arc;
use thiserror::Error;

use super::edit_session::{
    CommitTarget, EditError, EditSession, SessionForm, SessionServices, SubmitRejected,
};
use crate::io::TransportError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoginDraft {
    pub email: String,
    pub password: String,
}

/// Credentials granted by a successful sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigninPayload {
    pub token: String,
    pub customer_id: String,
}

impl SigninPayload {
    pub fn from_response(response: &MutationResponse) -> Option<Self> {
        let token = response.pointer("/token")?.as_str()?;
        let customer_id = response.pointer("/viewer/user/id")?.as_str()?;
        Some(Self {
            token: token.to_string(),
            customer_id: customer_id.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("sign-in not submitted: {0}")]
    Rejected(#[from] SubmitRejected),
    #[error("sign-in failed: {0}")]
    Failed(TransportError),
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm;

pub type LoginSession = EditSession<LoginForm>;

impl SessionForm for LoginForm {
    /// Nothing exists before signing in
    type Remote = ();
    type Draft = LoginDraft;

    fn kind(&self) -> &'static str {
        "login"
    }

    fn initial_draft(&self, _remote: Option<&()>) -> LoginDraft {
        LoginDraft::default()
    }

    fn remote_id<'r>(&self, _remote: &'r ()) -> &'r str {
        ""
    }

    fn build_request(&self, _target: CommitTarget<'_, ()>, draft: &LoginDraft) -> MutationRequest {
        MutationRequest::SigninCustomer(SigninCustomerRequest {
            email: draft.email.clone(),
            password: draft.password.clone(),
        })
    }
}

impl EditSession<LoginForm> {
    pub fn open_login(services: SessionServices) -> Self {
        Self::open(LoginForm, None, services)
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), EditError> {
        let email = email.into();
        self.edit(|draft| {
            draft.email = email;
            Ok(())
        })
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> Result<(), EditError> {
        let password = password.into();
        self.edit(|draft| {
            draft.password = password;
            Ok(())
        })
    }

    pub fn is_loading(&self) -> bool {
        self.is_submitting()
    }

    /// Submit the credentials. A failure is notified and the form accepts
    /// edits again; a success closes the form.
    pub async fn sign_in(&mut self) -> Result<SigninPayload, LoginError> {
        let pending = self.begin_submit()?;
        let transport = Arc::clone(&self.services().transport);
        let field = pending.request.field_name();

        // A payload without token is as useless as a failed commit
        let result = transport.commit(pending.request).await.and_then(|response| {
            match SigninPayload::from_response(&response) {
                Some(payload) => Ok((response, payload)),
                None => Err(TransportError::MissingPayload(field.to_string())),
            }
        });

        match result {
            Ok((response, payload)) => {
                self.complete(Ok(response));
                info!("🔑 Signed in as customer {}", payload.customer_id);
                Ok(payload)
            }
            Err(error) => {
                self.complete(Err(error.clone()));
                Err(LoginError::Failed(error))
            }
        }
    }
}
