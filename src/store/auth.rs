//! Authentication slice.

use super::dogs::Lifecycle;
use crate::service::User;

/// Rejection message for a failed login.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed. Please check your name and email.";

/// Actions understood by the auth slice.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthAction {
    LoginPending,
    LoginFulfilled(User),
    LoginRejected(String),
    LoggedOut,
}

impl AuthAction {
    pub fn name(&self) -> &'static str {
        match self {
            AuthAction::LoginPending => "auth/login/pending",
            AuthAction::LoginFulfilled(_) => "auth/login/fulfilled",
            AuthAction::LoginRejected(_) => "auth/login/rejected",
            AuthAction::LoggedOut => "auth/logout",
        }
    }
}

/// Houses the session of the current user.
///
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    user: Option<User>,
    login: Lifecycle,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login(&self) -> &Lifecycle {
        &self.login
    }

    pub fn reduce(&mut self, action: AuthAction) {
        match action {
            AuthAction::LoginPending => self.login.pending(),
            AuthAction::LoginFulfilled(user) => {
                self.login.fulfilled();
                self.user = Some(user);
            }
            AuthAction::LoginRejected(message) => {
                self.login.rejected(message);
                self.user = None;
            }
            AuthAction::LoggedOut => {
                self.user = None;
                self.login = Lifecycle::default();
            }
        }
    }
}
