use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    JobSeeker,
    Employer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::JobSeeker => "jobseeker",
            Role::Employer => "employer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeekerProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmployerProfile {
    #[serde(default)]
    pub company: String,
}

/// Role-specific profile data. The variant is the user's role, so
/// `company` can only exist on employers and `skills`/`experience` only on
/// job seekers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    JobSeeker(SeekerProfile),
    Employer(EmployerProfile),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::JobSeeker(_) => Role::JobSeeker,
            RoleProfile::Employer(_) => Role::Employer,
        }
    }
}

/// The authenticated user. Serialized flat, with `role` as the tag of the
/// role-specific fields, which is also the shape of the durable session
/// record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn company(&self) -> Option<&str> {
        match &self.profile {
            RoleProfile::Employer(p) => Some(&p.company),
            RoleProfile::JobSeeker(_) => None,
        }
    }

    pub fn skills(&self) -> Option<&[String]> {
        match &self.profile {
            RoleProfile::JobSeeker(p) => Some(&p.skills),
            RoleProfile::Employer(_) => None,
        }
    }

    pub fn experience(&self) -> Option<&str> {
        match &self.profile {
            RoleProfile::JobSeeker(p) => Some(&p.experience),
            RoleProfile::Employer(_) => None,
        }
    }

    /// Shallow merge: every field present in `update` replaces the current
    /// value, absent fields are kept. Rejects the whole update (leaving the
    /// user untouched) if it carries fields belonging to the other role or
    /// blanks out name/email.
    pub fn apply_update(&mut self, update: ProfileUpdate) -> Result<(), AppError> {
        update.validate_for(self.role())?;

        let ProfileUpdate {
            name,
            email,
            location,
            bio,
            company,
            skills,
            experience,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(bio) = bio {
            self.bio = bio;
        }

        match &mut self.profile {
            RoleProfile::Employer(p) => {
                if let Some(company) = company {
                    p.company = company;
                }
            }
            RoleProfile::JobSeeker(p) => {
                if let Some(skills) = skills {
                    p.skills = skills;
                }
                if let Some(experience) = experience {
                    p.experience = experience;
                }
            }
        }

        Ok(())
    }
}

/// Partial profile edit. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    /// Accepts a list or the comma-separated form value.
    #[serde(default, deserialize_with = "super::optional_string_list")]
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
}

impl ProfileUpdate {
    fn validate_for(&self, role: Role) -> Result<(), AppError> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err(AppError::validation("name cannot be blank"));
        }
        if matches!(&self.email, Some(e) if e.trim().is_empty()) {
            return Err(AppError::validation("email cannot be blank"));
        }
        match role {
            Role::Employer if self.skills.is_some() || self.experience.is_some() => Err(
                AppError::validation("skills and experience only apply to job seekers"),
            ),
            Role::JobSeeker if self.company.is_some() => {
                Err(AppError::validation("company only applies to employers"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Explicit role. When absent the legacy email heuristic decides.
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub company: Option<String>,
}
