use chrono::NaiveDate;
use uuid::Uuid;

use crate::ids::user_id_for_email;
use crate::models::{Job, JobType};

struct SeedJob {
    title: &'static str,
    company: &'static str,
    location: &'static str,
    job_type: JobType,
    description: &'static str,
    requirements: &'static [&'static str],
    salary: &'static str,
    posted: (i32, u32, u32),
    employer_email: &'static str,
}

const SEED_JOBS: &[SeedJob] = &[
    SeedJob {
        title: "Senior Frontend Developer",
        company: "TechCorp",
        location: "San Francisco, CA",
        job_type: JobType::FullTime,
        description: "We are looking for a Senior Frontend Developer to join our team and help build amazing user experiences. You will work with React, TypeScript, and modern web technologies.",
        requirements: &["React", "TypeScript", "CSS", "5+ years experience"],
        salary: "$120,000 - $150,000",
        posted: (2024, 1, 15),
        employer_email: "hiring@techcorp.employer.co",
    },
    SeedJob {
        title: "Product Manager",
        company: "InnovateLabs",
        location: "New York, NY",
        job_type: JobType::FullTime,
        description: "Join our product team to drive strategy and execution for our cutting-edge products. Lead cross-functional teams and shape the future of our platform.",
        requirements: &["Product Management", "Agile", "Analytics", "3+ years experience"],
        salary: "$100,000 - $130,000",
        posted: (2024, 1, 14),
        employer_email: "talent@innovatelabs.employer.co",
    },
    SeedJob {
        title: "UX Designer",
        company: "DesignStudio",
        location: "Remote",
        job_type: JobType::Remote,
        description: "Create beautiful and intuitive user experiences for our digital products. Work with a talented team of designers and developers.",
        requirements: &["Figma", "User Research", "Prototyping", "2+ years experience"],
        salary: "$80,000 - $100,000",
        posted: (2024, 1, 13),
        employer_email: "jobs@designstudio.employer.co",
    },
];

/// Demo postings for a fresh catalog, newest first. Ids are fixed so links
/// survive restarts; each posting is owned by the employer a login with
/// `employer_email` resolves to.
pub fn demo_jobs() -> Vec<Job> {
    SEED_JOBS
        .iter()
        .enumerate()
        .filter_map(|(i, seed)| {
            let (y, m, d) = seed.posted;
            Some(Job {
                id: Uuid::from_u128(0xdead_0000 + i as u128 + 1),
                title: seed.title.to_string(),
                company: seed.company.to_string(),
                location: seed.location.to_string(),
                job_type: seed.job_type,
                description: seed.description.to_string(),
                requirements: seed.requirements.iter().map(|r| r.to_string()).collect(),
                salary: seed.salary.to_string(),
                posted_date: NaiveDate::from_ymd_opt(y, m, d)?,
                employer_id: user_id_for_email(seed.employer_email),
            })
        })
        .collect()
}
