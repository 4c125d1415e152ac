//! Authorization Gate: access decisions from session state, role and ownership.
//!
//! The gate borrows the session user for the duration of one decision and
//! holds no state of its own.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Job, Role, User};

pub const LOGIN_PATH: &str = "/auth/login";
pub const FALLBACK_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    Allow,
    RedirectLogin,
    RedirectFallback,
}

impl AccessDecision {
    /// Where presentation should navigate, if anywhere.
    pub fn redirect_to(&self) -> Option<&'static str> {
        match self {
            AccessDecision::Allow => None,
            AccessDecision::RedirectLogin => Some(LOGIN_PATH),
            AccessDecision::RedirectFallback => Some(FALLBACK_PATH),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGate<'a> {
    user: Option<&'a User>,
}

impl<'a> AuthorizationGate<'a> {
    pub fn new(user: Option<&'a User>) -> Self {
        Self { user }
    }

    pub fn can_access(&self, required_role: Option<Role>) -> AccessDecision {
        match (self.user, required_role) {
            (None, _) => AccessDecision::RedirectLogin,
            (Some(_), None) => AccessDecision::Allow,
            (Some(user), Some(role)) if user.role() == role => AccessDecision::Allow,
            (Some(_), Some(_)) => AccessDecision::RedirectFallback,
        }
    }

    pub fn is_owner(&self, resource_owner_id: Uuid) -> bool {
        self.user.is_some_and(|user| user.id == resource_owner_id)
    }

    /// Only the employer who posted a job sees who applied to it.
    pub fn can_view_applications(&self, job: &Job) -> bool {
        self.is_owner(job.employer_id)
    }

    /// `can_access` for callers that need the user: login redirects become
    /// `Unauthorized`, fallback redirects become `Forbidden`.
    pub fn require(&self, required_role: Option<Role>) -> Result<&'a User, AppError> {
        match (self.can_access(required_role), self.user) {
            (AccessDecision::Allow, Some(user)) => Ok(user),
            (AccessDecision::RedirectFallback, _) => Err(AppError::Forbidden),
            _ => Err(AppError::Unauthorized),
        }
    }
}
