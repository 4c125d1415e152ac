use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Remote,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Remote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Remote => "remote",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| AppError::validation(format!("unknown job type '{s}'")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub description: String,
    pub requirements: Vec<String>,
    /// Free-form display string, e.g. "$120,000 - $150,000".
    pub salary: String,
    pub posted_date: NaiveDate,
    pub employer_id: Uuid,
}

/// Fields supplied by an employer when posting. Id, date and owner are
/// assigned by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub description: String,
    #[serde(deserialize_with = "super::string_list")]
    pub requirements: Vec<String>,
    pub salary: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("salary", &self.salary),
            ("description", &self.description),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AppError::validation(format!("{field} is required")));
        }
        if self.requirements.iter().all(|r| r.trim().is_empty()) {
            return Err(AppError::validation("at least one requirement is required"));
        }
        Ok(())
    }
}

/// Search criteria. Each filter is optional; empty strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<JobType>,
}

impl SearchFilters {
    /// Builds filters from raw form values; a blank type means "all types".
    pub fn from_raw(
        query: Option<&str>,
        location: Option<&str>,
        job_type: Option<&str>,
    ) -> Result<Self, AppError> {
        let job_type = match job_type.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse()?),
        };
        Ok(Self {
            query: query.map(str::to_string),
            location: location.map(str::to_string),
            job_type,
        })
    }

    /// Lowercased query, or `None` when absent or whitespace-only.
    pub fn normalized_query(&self) -> Option<String> {
        normalize(self.query.as_deref())
    }

    pub fn normalized_location(&self) -> Option<String> {
        normalize(self.location.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.normalized_query().is_none()
            && self.normalized_location().is_none()
            && self.job_type.is_none()
    }
}

/// Whitespace-only counts as absent; anything else is matched as typed.
fn normalize(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_lowercase)
}
