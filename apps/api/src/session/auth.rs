//! Authenticator seam: where credentials and registrations turn into users.
//!
//! Default: `LocalAuthenticator` (no credential check; registered accounts
//! are remembered for the life of the process, other emails get a
//! deterministic user).
//! `remote::MarketplaceClient` implements the same trait against a hosted
//! marketplace service, so the session store never changes when the backend
//! does.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::ids::{user_id_for_email, IdGenerator};
use crate::models::{
    Credentials, EmployerProfile, Registration, Role, RoleProfile, SeekerProfile, User,
};

const DEFAULT_LOCATION: &str = "San Francisco, CA";
const DEFAULT_BIO: &str = "Passionate about connecting talent with opportunities";
const DEFAULT_COMPANY: &str = "Tech Corp";
const DEFAULT_SKILLS: [&str; 3] = ["JavaScript", "React", "Node.js"];
const DEFAULT_EXPERIENCE: &str = "3+ years";

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AppError>;
    /// Validates a registration and builds its user. Nothing is recorded
    /// until `commit_registration`.
    async fn register(&self, registration: &Registration) -> Result<User, AppError>;

    /// Called once the new user's session record has been written.
    fn commit_registration(&self, _user: &User) {}

    /// Called after a profile edit of `user` has been written.
    fn account_updated(&self, _user: &User) {}
}

/// Legacy role inference: any email mentioning "employer" is an employer.
/// Only used when the caller does not state a role.
pub fn infer_role_from_email(email: &str) -> Role {
    if email.to_lowercase().contains("employer") {
        Role::Employer
    } else {
        Role::JobSeeker
    }
}

/// Resolves users in-process without verifying the password.
pub struct LocalAuthenticator {
    ids: Arc<dyn IdGenerator>,
    /// Registered accounts by lowercased email, with their latest profile.
    accounts: Mutex<HashMap<String, User>>,
}

impl LocalAuthenticator {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ids,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    fn accounts(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, User>>, AppError> {
        self.accounts
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("account directory poisoned")))
    }

    /// Builds the user for a login. Same email, same id, same profile.
    pub fn user_for_login(credentials: &Credentials) -> Result<User, AppError> {
        let email = credentials.email.trim();
        if email.is_empty() {
            return Err(AppError::validation("email is required"));
        }

        let role = match credentials.role {
            Some(role) => role,
            None => {
                let role = infer_role_from_email(email);
                warn!("No role supplied for login; inferred '{role}' from email");
                role
            }
        };

        let name = email.split('@').next().unwrap_or(email).to_string();
        let profile = match role {
            Role::Employer => RoleProfile::Employer(EmployerProfile {
                company: DEFAULT_COMPANY.to_string(),
            }),
            Role::JobSeeker => RoleProfile::JobSeeker(SeekerProfile {
                skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
                experience: DEFAULT_EXPERIENCE.to_string(),
            }),
        };

        Ok(User {
            id: user_id_for_email(email),
            email: email.to_string(),
            name,
            profile,
            location: DEFAULT_LOCATION.to_string(),
            bio: DEFAULT_BIO.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Builds a fresh user from a registration form.
    pub fn user_for_registration(&self, registration: &Registration) -> Result<User, AppError> {
        let name = required(registration.name.as_deref(), "name")?;
        let email = required(registration.email.as_deref(), "email")?;
        let role = registration
            .role
            .ok_or_else(|| AppError::validation("role is required"))?;

        let profile = match role {
            Role::Employer => RoleProfile::Employer(EmployerProfile {
                company: required(registration.company.as_deref(), "company")?.to_string(),
            }),
            Role::JobSeeker => RoleProfile::JobSeeker(SeekerProfile::default()),
        };

        Ok(User {
            id: self.ids.next_id(),
            email: email.to_string(),
            name: name.to_string(),
            profile,
            location: String::new(),
            bio: String::new(),
            created_at: Utc::now(),
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("{field} is required")))
}

#[async_trait]
impl Authenticator for LocalAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AppError> {
        let key = credentials.email.trim().to_lowercase();
        if let Some(user) = self.accounts()?.get(&key) {
            debug!("Resolved registered account for {}", user.email);
            return Ok(user.clone());
        }
        let user = Self::user_for_login(credentials)?;
        debug!("Resolved local login for {}", user.email);
        Ok(user)
    }

    async fn register(&self, registration: &Registration) -> Result<User, AppError> {
        let user = self.user_for_registration(registration)?;
        if self.accounts()?.contains_key(&user.email.to_lowercase()) {
            return Err(AppError::validation(format!(
                "an account for {} already exists",
                user.email
            )));
        }
        Ok(user)
    }

    fn commit_registration(&self, user: &User) {
        match self.accounts() {
            Ok(mut accounts) => {
                accounts
                    .entry(user.email.to_lowercase())
                    .or_insert_with(|| user.clone());
            }
            Err(e) => warn!("Could not record account for {}: {e}", user.email),
        }
    }

    fn account_updated(&self, user: &User) {
        match self.accounts() {
            Ok(mut accounts) => {
                if let Some(account) = accounts.get_mut(&user.email.to_lowercase()) {
                    *account = user.clone();
                }
            }
            Err(e) => warn!("Could not refresh account for {}: {e}", user.email),
        }
    }
}
