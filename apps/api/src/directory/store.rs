//! The persistence seam for profiles, students and jobs.
//!
//! Backends implement [`DirectoryStore`]; `AppState` carries an
//! `Arc<dyn DirectoryStore>` chosen at startup (`STORE_BACKEND`).
//! Inputs arrive here already normalized by [`rules`](crate::directory::rules).

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::directory::rules::RuleViolation;
use crate::models::job::{Job, JobStatus};
use crate::models::profile::{NewProfile, Profile};
use crate::models::student::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Profile,
    Student,
    Job,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Profile => "Profile",
            RecordKind::Student => "Student",
            RecordKind::Job => "Job",
        })
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: Uuid },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored row that no longer satisfies the data model.
    #[error("Integrity fault: {0}")]
    Integrity(String),
}

impl DirectoryError {
    pub fn not_found(kind: RecordKind, id: Uuid) -> Self {
        DirectoryError::NotFound { kind, id }
    }
}

impl From<RuleViolation> for DirectoryError {
    fn from(v: RuleViolation) -> Self {
        DirectoryError::ValidationFailed(v.to_string())
    }
}

impl From<sqlx::Error> for DirectoryError {
    fn from(e: sqlx::Error) -> Self {
        DirectoryError::StoreUnavailable(e.to_string())
    }
}

/// Status filter for job listings. The default lists everything, newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
}

impl JobFilter {
    pub fn all() -> Self {
        Self { status: None }
    }

    /// The student-facing listing.
    pub fn active() -> Self {
        Self {
            status: Some(JobStatus::Active),
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.status.map_or(true, |s| s == job.status)
    }
}

/// A validated job ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub company: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub skills: Vec<String>,
    pub requirements: String,
    pub status: JobStatus,
    pub applications: i32,
}

/// A validated partial job update. `None` leaves the stored value untouched.
/// The applications counter is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobChanges {
    pub company: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub requirements: Option<String>,
    pub status: Option<JobStatus>,
}

/// A validated student record ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub user_id: Uuid,
    pub student_code: String,
    pub department: String,
    pub year_of_study: i32,
    pub cgpa: Option<f64>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
}

/// A validated partial student update. For `cgpa` and `phone`, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentChanges {
    pub student_code: Option<String>,
    pub department: Option<String>,
    pub year_of_study: Option<i32>,
    pub cgpa: Option<Option<f64>>,
    pub phone: Option<Option<String>>,
    pub skills: Option<Vec<String>>,
}

impl From<NewStudent> for StudentChanges {
    /// A full save of an existing record replaces every editable field.
    fn from(s: NewStudent) -> Self {
        StudentChanges {
            student_code: Some(s.student_code),
            department: Some(s.department),
            year_of_study: Some(s.year_of_study),
            cgpa: Some(s.cgpa),
            phone: Some(s.phone),
            skills: Some(s.skills),
        }
    }
}

/// Typed accessors over the three record kinds.
///
/// Every call is a single async request against the backing store; callers
/// surface failures once and never retry. Lists are ordered `created_at DESC`.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DirectoryError>;

    /// Batch lookup backing the student/profile join. Missing ids are simply absent.
    async fn profiles_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, DirectoryError>;

    /// Inserts the profile unless one already exists for `user_id`; returns the stored row.
    async fn provision_profile(&self, profile: NewProfile) -> Result<Profile, DirectoryError>;

    async fn list_students(&self) -> Result<Vec<Student>, DirectoryError>;

    async fn get_student(&self, id: Uuid) -> Result<Student, DirectoryError>;

    async fn find_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>, DirectoryError>;

    async fn insert_student(&self, student: NewStudent) -> Result<Student, DirectoryError>;

    async fn update_student(
        &self,
        id: Uuid,
        changes: StudentChanges,
    ) -> Result<Student, DirectoryError>;

    async fn delete_student(&self, id: Uuid) -> Result<(), DirectoryError>;

    async fn count_students(&self) -> Result<i64, DirectoryError>;

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, DirectoryError>;

    async fn get_job(&self, id: Uuid) -> Result<Job, DirectoryError>;

    async fn insert_job(&self, job: NewJob) -> Result<Job, DirectoryError>;

    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Job, DirectoryError>;

    async fn delete_job(&self, id: Uuid) -> Result<(), DirectoryError>;
}
