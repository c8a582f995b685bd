//! In-memory [`DirectoryStore`] backend for local development and tests.
//!
//! Mirrors the PostgreSQL backend's contract: newest-first listings, one student
//! per profile, student rows must reference an existing profile.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::directory::store::{
    DirectoryError, DirectoryStore, JobChanges, JobFilter, NewJob, NewStudent, RecordKind,
    StudentChanges,
};
use crate::models::job::Job;
use crate::models::profile::{NewProfile, Profile};
use crate::models::student::Student;

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    students: Vec<Student>,
    jobs: Vec<Job>,
}

#[derive(Default)]
pub struct InMemoryDirectoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a backing-store outage: every call fails with `StoreUnavailable`.
    #[cfg(test)]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Drops a profile row without touching students, leaving them orphaned.
    #[cfg(test)]
    pub async fn forget_profile(&self, user_id: Uuid) {
        self.tables
            .write()
            .await
            .profiles
            .retain(|p| p.user_id != user_id);
    }

    fn ensure_online(&self) -> Result<(), DirectoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DirectoryError::StoreUnavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

/// Newest first. Rows are appended in time order, so reversing keeps ties newest-first
/// and the stable sort only has to fix out-of-order timestamps.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn profiles_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn provision_profile(&self, profile: NewProfile) -> Result<Profile, DirectoryError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.profiles.iter().find(|p| p.user_id == profile.user_id) {
            return Ok(existing.clone());
        }
        let row = Profile {
            user_id: profile.user_id,
            full_name: profile.full_name,
            email: profile.email,
            role: profile.role.as_str().to_string(),
            created_at: Utc::now(),
        };
        tables.profiles.push(row.clone());
        Ok(row)
    }

    async fn list_students(&self) -> Result<Vec<Student>, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.students, |s| s.created_at))
    }

    async fn get_student(&self, id: Uuid) -> Result<Student, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        tables
            .students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(RecordKind::Student, id))
    }

    async fn find_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student, DirectoryError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        if !tables.profiles.iter().any(|p| p.user_id == student.user_id) {
            return Err(DirectoryError::ValidationFailed(format!(
                "no profile exists for user {}",
                student.user_id
            )));
        }
        if tables.students.iter().any(|s| s.user_id == student.user_id) {
            return Err(DirectoryError::ValidationFailed(format!(
                "user {} already has a student record",
                student.user_id
            )));
        }
        let row = Student {
            id: Uuid::new_v4(),
            user_id: student.user_id,
            student_code: student.student_code,
            department: student.department,
            year_of_study: student.year_of_study,
            cgpa: student.cgpa,
            phone: student.phone,
            skills: student.skills,
            created_at: Utc::now(),
        };
        tables.students.push(row.clone());
        Ok(row)
    }

    async fn update_student(
        &self,
        id: Uuid,
        changes: StudentChanges,
    ) -> Result<Student, DirectoryError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let row = tables
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DirectoryError::not_found(RecordKind::Student, id))?;

        if let Some(code) = changes.student_code {
            row.student_code = code;
        }
        if let Some(department) = changes.department {
            row.department = department;
        }
        if let Some(year) = changes.year_of_study {
            row.year_of_study = year;
        }
        if let Some(cgpa) = changes.cgpa {
            row.cgpa = cgpa;
        }
        if let Some(phone) = changes.phone {
            row.phone = phone;
        }
        if let Some(skills) = changes.skills {
            row.skills = skills;
        }
        Ok(row.clone())
    }

    async fn delete_student(&self, id: Uuid) -> Result<(), DirectoryError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != id);
        if tables.students.len() == before {
            return Err(DirectoryError::not_found(RecordKind::Student, id));
        }
        Ok(())
    }

    async fn count_students(&self) -> Result<i64, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables.students.len() as i64)
    }

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        let mut jobs = newest_first(&tables.jobs, |j| j.created_at);
        jobs.retain(|j| filter.matches(j));
        Ok(jobs)
    }

    async fn get_job(&self, id: Uuid) -> Result<Job, DirectoryError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        tables
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(RecordKind::Job, id))
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job, DirectoryError> {
        self.ensure_online()?;
        let row = Job {
            id: Uuid::new_v4(),
            company: job.company,
            title: job.title,
            description: job.description,
            location: job.location,
            salary: job.salary,
            skills: job.skills,
            requirements: job.requirements,
            status: job.status,
            applications: job.applications,
            created_at: Utc::now(),
        };
        self.tables.write().await.jobs.push(row.clone());
        Ok(row)
    }

    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Job, DirectoryError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let row = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| DirectoryError::not_found(RecordKind::Job, id))?;

        if let Some(company) = changes.company {
            row.company = company;
        }
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(location) = changes.location {
            row.location = location;
        }
        if let Some(salary) = changes.salary {
            row.salary = salary;
        }
        if let Some(skills) = changes.skills {
            row.skills = skills;
        }
        if let Some(requirements) = changes.requirements {
            row.requirements = requirements;
        }
        if let Some(status) = changes.status {
            row.status = status;
        }
        Ok(row.clone())
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), DirectoryError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let before = tables.jobs.len();
        tables.jobs.retain(|j| j.id != id);
        if tables.jobs.len() == before {
            return Err(DirectoryError::not_found(RecordKind::Job, id));
        }
        Ok(())
    }
}
