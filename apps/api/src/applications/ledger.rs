use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::jobs::JobCatalog;
use crate::models::{Applicant, Application, ApplicationStatus};

/// Whether one applicant may apply to the same job more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Allow,
    Reject,
}

/// Append-only record of applications. Entries are never edited or removed.
pub struct ApplicationLedger {
    applications: Vec<Application>,
    ids: Arc<dyn IdGenerator>,
    policy: DuplicatePolicy,
}

impl ApplicationLedger {
    pub fn new(ids: Arc<dyn IdGenerator>, policy: DuplicatePolicy) -> Self {
        Self {
            applications: Vec::new(),
            ids,
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn apply(
        &mut self,
        catalog: &JobCatalog,
        job_id: Uuid,
        applicant: Applicant,
    ) -> Result<Application, AppError> {
        if !catalog.contains(job_id) {
            return Err(AppError::JobNotFound(job_id));
        }
        if self.policy == DuplicatePolicy::Reject && self.has_applied(job_id, applicant.id) {
            return Err(AppError::DuplicateApplication { job_id });
        }

        let Applicant {
            id: applicant_id,
            name,
            email,
            cover_letter,
        } = applicant;

        let application = Application {
            id: self.ids.next_id(),
            job_id,
            applicant_id,
            applicant_name: name,
            applicant_email: email,
            cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
            status: ApplicationStatus::Pending,
            applied_date: Utc::now(),
        };

        info!(
            "Recorded application {} from {} to job {job_id}",
            application.id, application.applicant_email
        );
        self.applications.push(application.clone());
        Ok(application)
    }

    pub fn applications_for_job(&self, job_id: Uuid) -> Vec<Application> {
        self.applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect()
    }

    pub fn applications_for_applicant(&self, applicant_id: Uuid) -> Vec<Application> {
        self.applications
            .iter()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect()
    }

    pub fn has_applied(&self, job_id: Uuid, applicant_id: Uuid) -> bool {
        self.applications
            .iter()
            .any(|a| a.job_id == job_id && a.applicant_id == applicant_id)
    }

    pub fn count_for_job(&self, job_id: Uuid) -> usize {
        self.applications.iter().filter(|a| a.job_id == job_id).count()
    }

    pub fn all(&self) -> &[Application] {
        &self.applications
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}
