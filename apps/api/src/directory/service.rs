use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::directory::rules::{
    validate_job_draft, validate_job_patch, validate_student_draft, validate_student_patch,
    JobDraft, JobPatch, StudentDraft, StudentPatch,
};
use crate::directory::stats::{summarize_jobs, DirectoryStats};
use crate::directory::store::{DirectoryError, DirectoryStore, JobFilter, RecordKind};
use crate::models::job::{Job, JobStatus};
use crate::models::profile::{NewProfile, Profile, ProfileSummary};
use crate::models::student::{Student, StudentWithProfile};

/// The directory as seen by handlers: every mutation passes the consistency
/// rules before it reaches the store.
#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn DirectoryStore>,
}

impl Directory {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    // ── Profiles ────────────────────────────────────────────────────────────

    pub async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, DirectoryError> {
        self.store.get_profile(user_id).await
    }

    pub async fn provision_profile(&self, profile: NewProfile) -> Result<Profile, DirectoryError> {
        let requested = profile.role;
        let stored = self.store.provision_profile(profile).await?;
        if stored.role != requested.as_str() {
            warn!(
                "Sign-in for {} claimed role {requested} but profile is {}; keeping stored role",
                stored.user_id, stored.role
            );
        }
        Ok(stored)
    }

    // ── Jobs ────────────────────────────────────────────────────────────────

    pub async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, DirectoryError> {
        self.store.list_jobs(filter).await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, DirectoryError> {
        self.store.get_job(id).await
    }

    /// Student view of a single posting: anything not active is treated as gone.
    pub async fn get_active_job(&self, id: Uuid) -> Result<Job, DirectoryError> {
        let job = self.store.get_job(id).await?;
        if job.status != JobStatus::Active {
            return Err(DirectoryError::not_found(RecordKind::Job, id));
        }
        Ok(job)
    }

    pub async fn create_job(&self, draft: &JobDraft) -> Result<Job, DirectoryError> {
        let new_job = validate_job_draft(draft)?;
        let job = self.store.insert_job(new_job).await?;
        info!("Created job {} ({} @ {})", job.id, job.title, job.company);
        Ok(job)
    }

    pub async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Job, DirectoryError> {
        let changes = validate_job_patch(patch)?;
        let job = self.store.update_job(id, changes).await?;
        info!("Updated job {id}");
        Ok(job)
    }

    pub async fn delete_job(&self, id: Uuid) -> Result<(), DirectoryError> {
        self.store.delete_job(id).await?;
        info!("Deleted job {id}");
        Ok(())
    }

    // ── Students ────────────────────────────────────────────────────────────

    /// All students paired with their owner's display fields.
    ///
    /// One batch profile lookup; a student whose profile is missing is paired
    /// with [`ProfileSummary::unknown`] instead of failing the listing.
    pub async fn list_students_with_profiles(
        &self,
    ) -> Result<Vec<StudentWithProfile>, DirectoryError> {
        let students = self.store.list_students().await?;
        if students.is_empty() {
            return Ok(vec![]);
        }

        let user_ids: Vec<Uuid> = students.iter().map(|s| s.user_id).collect();
        let profiles: HashMap<Uuid, ProfileSummary> = self
            .store
            .profiles_for_users(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p.summary()))
            .collect();

        Ok(students
            .into_iter()
            .map(|student| {
                let profile = profiles.get(&student.user_id).cloned().unwrap_or_else(|| {
                    warn!(
                        "Student {} references missing profile {}",
                        student.id, student.user_id
                    );
                    ProfileSummary::unknown()
                });
                StudentWithProfile { student, profile }
            })
            .collect())
    }

    pub async fn get_student(&self, id: Uuid) -> Result<Student, DirectoryError> {
        self.store.get_student(id).await
    }

    pub async fn find_own_student(&self, user_id: Uuid) -> Result<Option<Student>, DirectoryError> {
        self.store.find_student_by_user(user_id).await
    }

    /// Profile-completion flow: creates the caller's record on first save, replaces it after.
    pub async fn save_own_student(
        &self,
        user_id: Uuid,
        draft: &StudentDraft,
    ) -> Result<Student, DirectoryError> {
        let record = validate_student_draft(user_id, draft)?;

        match self.store.find_student_by_user(user_id).await? {
            Some(existing) => {
                let student = self.store.update_student(existing.id, record.into()).await?;
                info!("Student {} updated own record {}", user_id, student.id);
                Ok(student)
            }
            None => {
                if self.store.get_profile(user_id).await?.is_none() {
                    return Err(DirectoryError::ValidationFailed(format!(
                        "no profile exists for user {user_id}"
                    )));
                }
                let student = self.store.insert_student(record).await?;
                info!("Student {} created record {}", user_id, student.id);
                Ok(student)
            }
        }
    }

    pub async fn update_student(
        &self,
        id: Uuid,
        patch: &StudentPatch,
    ) -> Result<Student, DirectoryError> {
        let changes = validate_student_patch(patch)?;
        let student = self.store.update_student(id, changes).await?;
        info!("Updated student {id}");
        Ok(student)
    }

    /// Removes the academic record only; the owner's profile stays.
    pub async fn delete_student(&self, id: Uuid) -> Result<(), DirectoryError> {
        self.store.delete_student(id).await?;
        info!("Deleted student {id}");
        Ok(())
    }

    // ── Statistics ──────────────────────────────────────────────────────────

    pub async fn stats(&self) -> Result<DirectoryStats, DirectoryError> {
        let total_students = self.store.count_students().await?;
        let jobs = self.store.list_jobs(JobFilter::all()).await?;
        Ok(summarize_jobs(total_students, &jobs))
    }
}
