//! Job Catalog: the ordered set of postings and the search filter.
//!
//! Standing order is newest-first: every new posting goes to the front and
//! nothing ever re-sorts the sequence, so search results and listings come
//! back in posting order without a ranking step.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::models::{Job, NewJob, SearchFilters};

pub struct JobCatalog {
    jobs: Vec<Job>,
    ids: Arc<dyn IdGenerator>,
}

impl JobCatalog {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            jobs: Vec::new(),
            ids,
        }
    }

    /// Catalog pre-populated with existing postings, already newest-first.
    pub fn with_jobs(ids: Arc<dyn IdGenerator>, jobs: Vec<Job>) -> Self {
        Self { jobs, ids }
    }

    pub fn add_job(&mut self, data: NewJob, employer_id: Uuid) -> Result<Job, AppError> {
        if employer_id.is_nil() {
            return Err(AppError::validation("employer id is required"));
        }
        data.validate()?;

        let NewJob {
            title,
            company,
            location,
            job_type,
            description,
            requirements,
            salary,
        } = data;

        let job = Job {
            id: self.ids.next_id(),
            title: title.trim().to_string(),
            company: company.trim().to_string(),
            location: location.trim().to_string(),
            job_type,
            description,
            requirements: requirements
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            salary: salary.trim().to_string(),
            posted_date: Utc::now().date_naive(),
            employer_id,
        };

        info!(
            "Posted job {} '{}' at {} for employer {}",
            job.id, job.title, job.company, employer_id
        );
        self.jobs.insert(0, job.clone());
        Ok(job)
    }

    pub fn get_job_by_id(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get_job_by_id(id).is_some()
    }

    /// Every filter that is set must match (AND). Catalog order is kept.
    pub fn search(&self, filters: &SearchFilters) -> Vec<Job> {
        let query = filters.normalized_query();
        let location = filters.normalized_location();

        let results: Vec<Job> = self
            .jobs
            .iter()
            .filter(|job| {
                matches_query(job, query.as_deref())
                    && matches_location(job, location.as_deref())
                    && filters.job_type.map_or(true, |t| job.job_type == t)
            })
            .cloned()
            .collect();

        debug!(
            "Search {:?} matched {} of {} jobs",
            filters,
            results.len(),
            self.jobs.len()
        );
        results
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn jobs_by_employer(&self, employer_id: Uuid) -> Vec<Job> {
        self.jobs
            .iter()
            .filter(|job| job.employer_id == employer_id)
            .cloned()
            .collect()
    }

    /// The `n` most recently posted jobs.
    pub fn recent(&self, n: usize) -> &[Job] {
        &self.jobs[..n.min(self.jobs.len())]
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn matches_query(job: &Job, query: Option<&str>) -> bool {
    let Some(query) = query else {
        return true;
    };
    [&job.title, &job.company, &job.description]
        .iter()
        .any(|field| field.to_lowercase().contains(query))
}

fn matches_location(job: &Job, location: Option<&str>) -> bool {
    location.map_or(true, |loc| job.location.to_lowercase().contains(loc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialGenerator;
    use crate::models::JobType;

    fn new_job(title: &str, company: &str, location: &str, job_type: JobType) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            job_type,
            description: format!("{title} role at {company}"),
            requirements: vec!["Communication".to_string()],
            salary: "$100,000".to_string(),
        }
    }

    fn catalog() -> JobCatalog {
        let mut catalog = JobCatalog::new(Arc::new(SequentialGenerator::new()));
        let employer = Uuid::from_u128(900);
        catalog
            .add_job(
                new_job("Frontend Developer", "TechCorp", "San Francisco, CA", JobType::FullTime),
                employer,
            )
            .unwrap();
        catalog
            .add_job(
                new_job("Product Manager", "InnovateLabs", "New York, NY", JobType::FullTime),
                employer,
            )
            .unwrap();
        catalog
            .add_job(
                new_job("UX Designer", "DesignStudio", "Remote", JobType::Remote),
                Uuid::from_u128(901),
            )
            .unwrap();
        catalog
    }

    fn titles(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn test_add_job_goes_to_front_and_resolves() {
        let mut catalog = catalog();
        let job = catalog
            .add_job(
                new_job("Backend Engineer", "Acme", "Berlin", JobType::Contract),
                Uuid::from_u128(902),
            )
            .unwrap();
        assert_eq!(catalog.jobs()[0].id, job.id);
        assert_eq!(catalog.get_job_by_id(job.id), Some(&job));
        assert_eq!(job.posted_date, Utc::now().date_naive());
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_add_job_rejects_nil_employer() {
        let mut catalog = catalog();
        let err = catalog
            .add_job(new_job("X", "Y", "Z", JobType::Remote), Uuid::nil())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_get_job_by_id_miss() {
        assert!(catalog().get_job_by_id(Uuid::from_u128(12345)).is_none());
    }

    #[test]
    fn test_empty_filters_return_whole_catalog_in_order() {
        let catalog = catalog();
        let all = catalog.search(&SearchFilters::default());
        assert_eq!(all, catalog.jobs());
        assert_eq!(
            titles(&all),
            vec!["UX Designer", "Product Manager", "Frontend Developer"]
        );

        let blank = SearchFilters::from_raw(Some(""), Some("  "), Some("")).unwrap();
        assert_eq!(catalog.search(&blank), catalog.jobs());
    }

    #[test]
    fn test_query_matches_title_company_or_description() {
        let catalog = catalog();
        let by_title = SearchFilters {
            query: Some("DESIGNER".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&catalog.search(&by_title)), vec!["UX Designer"]);

        let by_company = SearchFilters {
            query: Some("innovate".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&catalog.search(&by_company)), vec!["Product Manager"]);

        let by_description = SearchFilters {
            query: Some("role at techcorp".to_string()),
            ..Default::default()
        };
        assert_eq!(
            titles(&catalog.search(&by_description)),
            vec!["Frontend Developer"]
        );
    }

    #[test]
    fn test_query_spaces_are_part_of_the_match() {
        let catalog = catalog();
        let bare = SearchFilters {
            query: Some("ux".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&catalog.search(&bare)), vec!["UX Designer"]);

        let leading_space = SearchFilters {
            query: Some(" ux".to_string()),
            ..Default::default()
        };
        assert!(catalog.search(&leading_space).is_empty());
    }

    #[test]
    fn test_filters_combine_with_and() {
        let catalog = catalog();
        let filters = SearchFilters {
            query: None,
            location: Some("new york".to_string()),
            job_type: Some(JobType::FullTime),
        };
        assert_eq!(titles(&catalog.search(&filters)), vec!["Product Manager"]);

        let contradictory = SearchFilters {
            query: Some("designer".to_string()),
            location: None,
            job_type: Some(JobType::FullTime),
        };
        assert!(catalog.search(&contradictory).is_empty());
    }

    #[test]
    fn test_results_are_subset_satisfying_every_filter() {
        let catalog = catalog();
        let filters = SearchFilters {
            query: Some("e".to_string()),
            location: Some("r".to_string()),
            job_type: Some(JobType::FullTime),
        };
        let results = catalog.search(&filters);
        assert!(!results.is_empty());
        for job in &results {
            assert!(catalog.contains(job.id));
            assert!(matches_query(job, Some("e")));
            assert!(matches_location(job, Some("r")));
            assert_eq!(job.job_type, JobType::FullTime);
        }
    }

    #[test]
    fn test_jobs_by_employer_and_recent() {
        let catalog = catalog();
        let mine = catalog.jobs_by_employer(Uuid::from_u128(900));
        assert_eq!(
            titles(&mine),
            vec!["Product Manager", "Frontend Developer"]
        );
        assert_eq!(titles(catalog.recent(2)), vec!["UX Designer", "Product Manager"]);
        assert_eq!(catalog.recent(10).len(), 3);
    }
}
