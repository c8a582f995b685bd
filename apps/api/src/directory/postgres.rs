use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::directory::store::{
    DirectoryError, DirectoryStore, JobChanges, JobFilter, NewJob, NewStudent, RecordKind,
    StudentChanges,
};
use crate::models::job::{Job, JobRow};
use crate::models::profile::{NewProfile, Profile};
use crate::models::student::Student;

/// PostgreSQL-backed directory. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_job(row: JobRow) -> Result<Job, DirectoryError> {
    let id = row.id;
    Job::try_from(row).map_err(|e| {
        error!("Job {id} has a corrupt status column: {e}");
        DirectoryError::Integrity(format!("job {id}: {e}"))
    })
}

fn into_jobs(rows: Vec<JobRow>) -> Result<Vec<Job>, DirectoryError> {
    rows.into_iter().map(into_job).collect()
}

/// Maps constraint violations on student writes to validation failures.
fn student_write_error(e: sqlx::Error) -> DirectoryError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return DirectoryError::ValidationFailed(
                "student must reference an existing profile".to_string(),
            );
        }
        if db.is_unique_violation() {
            return DirectoryError::ValidationFailed(
                "this user already has a student record".to_string(),
            );
        }
    }
    DirectoryError::from(e)
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DirectoryError> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn profiles_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<Profile>, DirectoryError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ANY($1)")
                .bind(user_ids)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn provision_profile(&self, profile: NewProfile) -> Result<Profile, DirectoryError> {
        // Role is immutable: an existing row wins over the incoming claim.
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, full_name, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
                .bind(profile.user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn list_students(&self) -> Result<Vec<Student>, DirectoryError> {
        Ok(
            sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_student(&self, id: Uuid) -> Result<Student, DirectoryError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DirectoryError::not_found(RecordKind::Student, id))
    }

    async fn find_student_by_user(&self, user_id: Uuid) -> Result<Option<Student>, DirectoryError> {
        Ok(
            sqlx::query_as::<_, Student>("SELECT * FROM students WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn insert_student(&self, student: NewStudent) -> Result<Student, DirectoryError> {
        sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students
                (user_id, student_code, department, year_of_study, cgpa, phone, skills)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(student.user_id)
        .bind(&student.student_code)
        .bind(&student.department)
        .bind(student.year_of_study)
        .bind(student.cgpa)
        .bind(&student.phone)
        .bind(&student.skills)
        .fetch_one(&self.pool)
        .await
        .map_err(student_write_error)
    }

    async fn update_student(
        &self,
        id: Uuid,
        changes: StudentChanges,
    ) -> Result<Student, DirectoryError> {
        // cgpa and phone are nullable, so "leave as is" needs its own flag.
        sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET
                student_code  = COALESCE($2, student_code),
                department    = COALESCE($3, department),
                year_of_study = COALESCE($4, year_of_study),
                cgpa          = CASE WHEN $5 THEN $6 ELSE cgpa END,
                phone         = CASE WHEN $7 THEN $8 ELSE phone END,
                skills        = COALESCE($9, skills)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.student_code)
        .bind(&changes.department)
        .bind(changes.year_of_study)
        .bind(changes.cgpa.is_some())
        .bind(changes.cgpa.flatten())
        .bind(changes.phone.is_some())
        .bind(changes.phone.clone().flatten())
        .bind(&changes.skills)
        .fetch_optional(&self.pool)
        .await
        .map_err(student_write_error)?
        .ok_or_else(|| DirectoryError::not_found(RecordKind::Student, id))
    }

    async fn delete_student(&self, id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DirectoryError::not_found(RecordKind::Student, id));
        }
        Ok(())
    }

    async fn count_students(&self) -> Result<i64, DirectoryError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, DirectoryError> {
        let rows = match filter.status {
            Some(status) => {
                sqlx::query_as::<_, JobRow>(
                    "SELECT * FROM jobs WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        into_jobs(rows)
    }

    async fn get_job(&self, id: Uuid) -> Result<Job, DirectoryError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DirectoryError::not_found(RecordKind::Job, id))?;
        into_job(row)
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job, DirectoryError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (company, title, description, location, salary, skills,
                 requirements, status, applications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&job.company)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.salary)
        .bind(&job.skills)
        .bind(&job.requirements)
        .bind(job.status.as_str())
        .bind(job.applications)
        .fetch_one(&self.pool)
        .await?;
        into_job(row)
    }

    async fn update_job(&self, id: Uuid, changes: JobChanges) -> Result<Job, DirectoryError> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs SET
                company      = COALESCE($2, company),
                title        = COALESCE($3, title),
                description  = COALESCE($4, description),
                location     = COALESCE($5, location),
                salary       = COALESCE($6, salary),
                skills       = COALESCE($7, skills),
                requirements = COALESCE($8, requirements),
                status       = COALESCE($9, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.company)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.location)
        .bind(&changes.salary)
        .bind(&changes.skills)
        .bind(&changes.requirements)
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DirectoryError::not_found(RecordKind::Job, id))?;
        into_job(row)
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DirectoryError::not_found(RecordKind::Job, id));
        }
        Ok(())
    }
}
