pub mod application;
pub mod job;
pub mod user;

use serde::{Deserialize, Deserializer};

pub use application::{Applicant, Application, ApplicationStatus};
pub use job::{Job, JobType, NewJob, SearchFilters};
pub use user::{
    Credentials, EmployerProfile, ProfileUpdate, Registration, Role, RoleProfile, SeekerProfile,
    User,
};

/// Splits a comma-separated form value into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringList {
    List(Vec<String>),
    Csv(String),
}

impl From<StringList> for Vec<String> {
    fn from(value: StringList) -> Self {
        match value {
            StringList::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            StringList::Csv(raw) => split_list(&raw),
        }
    }
}

pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    StringList::deserialize(deserializer).map(Into::into)
}

pub(crate) fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringList>::deserialize(deserializer)?.map(Into::into))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list("React, TypeScript ,, CSS,"),
            vec!["React", "TypeScript", "CSS"]
        );
        assert!(split_list("  ").is_empty());
    }
}
