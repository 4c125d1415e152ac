//! The presentation boundary: one object owning the session, the catalog and
//! the ledger, with the authorization gate run in front of every
//! state-changing call.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::access::{AccessDecision, AuthorizationGate};
use crate::applications::{ApplicationLedger, DuplicatePolicy};
use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::jobs::JobCatalog;
use crate::models::{
    Applicant, Application, Credentials, Job, NewJob, ProfileUpdate, Registration, Role,
    SearchFilters, User,
};
use crate::session::{Authenticator, SessionStorage, SessionStore};

const RECENT_JOBS_ON_DASHBOARD: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct PostingSummary {
    pub job: Job,
    pub application_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Employer {
        user: User,
        postings: Vec<PostingSummary>,
        total_applications: usize,
    },
    JobSeeker {
        user: User,
        applications: Vec<Application>,
        recent_jobs: Vec<Job>,
    },
}

pub struct Marketplace {
    session: SessionStore,
    catalog: JobCatalog,
    ledger: ApplicationLedger,
}

impl Marketplace {
    pub fn new(session: SessionStore, catalog: JobCatalog, ledger: ApplicationLedger) -> Self {
        Self {
            session,
            catalog,
            ledger,
        }
    }

    /// Wires the three stores over one identifier generator.
    pub async fn open(
        storage: Arc<dyn SessionStorage>,
        authenticator: Arc<dyn Authenticator>,
        ids: Arc<dyn IdGenerator>,
        seed_jobs: Vec<Job>,
        policy: DuplicatePolicy,
    ) -> Self {
        Self::new(
            SessionStore::open(storage, authenticator).await,
            JobCatalog::with_jobs(ids.clone(), seed_jobs),
            ApplicationLedger::new(ids, policy),
        )
    }

    fn gate(&self) -> AuthorizationGate<'_> {
        AuthorizationGate::new(self.session.current())
    }

    // ── Session ───────────────────────────────────────────────────────────

    pub async fn login(&mut self, credentials: &Credentials) -> Result<User, AppError> {
        self.session.login(credentials).await
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<User, AppError> {
        self.session.register(registration).await
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.current()
    }

    pub fn access(&self, required_role: Option<Role>) -> AccessDecision {
        self.gate().can_access(required_role)
    }

    pub fn is_owner(&self, resource_owner_id: Uuid) -> bool {
        self.gate().is_owner(resource_owner_id)
    }

    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<User, AppError> {
        self.session.update_profile(update).await
    }

    /// Profile edit addressed by id; only the profile's owner may make it.
    pub async fn update_profile_of(
        &mut self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, AppError> {
        let gate = self.gate();
        gate.require(None)?;
        if !gate.is_owner(user_id) {
            warn!("Rejected profile edit of {user_id} by a different user");
            return Err(AppError::Forbidden);
        }
        self.session.update_profile(update).await
    }

    // ── Jobs ──────────────────────────────────────────────────────────────

    pub fn post_job(&mut self, data: NewJob) -> Result<Job, AppError> {
        let employer_id = self.gate().require(Some(Role::Employer))?.id;
        self.catalog.add_job(data, employer_id)
    }

    pub fn job(&self, id: Uuid) -> Option<&Job> {
        self.catalog.get_job_by_id(id)
    }

    pub fn search(&self, filters: &SearchFilters) -> Vec<Job> {
        self.catalog.search(filters)
    }

    pub fn jobs(&self) -> &[Job] {
        self.catalog.jobs()
    }

    // ── Applications ──────────────────────────────────────────────────────

    pub fn apply(&mut self, job_id: Uuid, cover_letter: Option<String>) -> Result<Application, AppError> {
        let applicant = {
            let user = match self.gate().require(Some(Role::JobSeeker)) {
                Err(AppError::Unauthorized) => return Err(AppError::NoActiveSession),
                other => other?,
            };
            Applicant {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                cover_letter,
            }
        };
        self.ledger.apply(&self.catalog, job_id, applicant)
    }

    pub fn has_applied(&self, job_id: Uuid) -> bool {
        self.session
            .current()
            .is_some_and(|user| self.ledger.has_applied(job_id, user.id))
    }

    /// Applications to a job, visible only to the employer who posted it.
    pub fn applications_for_job(&self, job_id: Uuid) -> Result<Vec<Application>, AppError> {
        let gate = self.gate();
        gate.require(None)?;
        let job = self
            .catalog
            .get_job_by_id(job_id)
            .ok_or(AppError::JobNotFound(job_id))?;
        if !gate.can_view_applications(job) {
            return Err(AppError::Forbidden);
        }
        Ok(self.ledger.applications_for_job(job_id))
    }

    pub fn my_applications(&self) -> Result<Vec<Application>, AppError> {
        let user = self.gate().require(None)?;
        Ok(self.ledger.applications_for_applicant(user.id))
    }

    pub fn dashboard(&self) -> Result<Dashboard, AppError> {
        let user = self.gate().require(None)?;
        let dashboard = match user.role() {
            Role::Employer => {
                let postings: Vec<PostingSummary> = self
                    .catalog
                    .jobs_by_employer(user.id)
                    .into_iter()
                    .map(|job| PostingSummary {
                        application_count: self.ledger.count_for_job(job.id),
                        job,
                    })
                    .collect();
                Dashboard::Employer {
                    user: user.clone(),
                    total_applications: postings.iter().map(|p| p.application_count).sum(),
                    postings,
                }
            }
            Role::JobSeeker => Dashboard::JobSeeker {
                user: user.clone(),
                applications: self.ledger.applications_for_applicant(user.id),
                recent_jobs: self.catalog.recent(RECENT_JOBS_ON_DASHBOARD).to_vec(),
            },
        };
        Ok(dashboard)
    }
}
