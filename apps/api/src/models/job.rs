use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Closing,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closing => "closing",
            JobStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job status '{0}' (expected active, closing or closed)")]
pub struct UnknownJobStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownJobStatus;

    /// Exact, case-sensitive match on the three status tokens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobStatus::Active),
            "closing" => Ok(JobStatus::Closing),
            "closed" => Ok(JobStatus::Closed),
            other => Err(UnknownJobStatus(other.to_string())),
        }
    }
}

/// Job posting as stored. `status` is the raw column value; see [`Job`] for the typed record.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub skills: Vec<String>,
    pub requirements: String,
    pub status: String,
    pub applications: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub company: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub skills: Vec<String>,
    pub requirements: String,
    pub status: JobStatus,
    pub applications: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = UnknownJobStatus;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            status: row.status.parse()?,
            id: row.id,
            company: row.company,
            title: row.title,
            description: row.description,
            location: row.location,
            salary: row.salary,
            skills: row.skills,
            requirements: row.requirements,
            applications: row.applications,
            created_at: row.created_at,
        })
    }
}
