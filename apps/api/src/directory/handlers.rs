use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::access::identity::IdentityContext;
use crate::access::router::{Action, Module};
use crate::directory::rules::{parse_status, JobDraft, JobPatch, StudentDraft, StudentPatch};
use crate::directory::stats::DirectoryStats;
use crate::directory::store::JobFilter;
use crate::errors::AppError;
use crate::models::job::Job;
use crate::models::profile::ProfileSummary;
use crate::models::student::{Student, StudentWithProfile, DEPARTMENTS};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OwnProfileResponse {
    pub profile: ProfileSummary,
    pub student: Option<Student>,
}

// ────────────────────────────────────────────────────────────────────────────
// Admin: statistics
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    identity: IdentityContext,
) -> Result<Json<DirectoryStats>, AppError> {
    identity.authorize(Module::Statistics, Action::Read)?;
    Ok(Json(state.directory.stats().await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Admin: job management
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    identity: IdentityContext,
    Query(params): Query<JobListQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    identity.authorize(Module::JobManagement, Action::List)?;
    let filter = JobFilter {
        status: params
            .status
            .as_deref()
            .map(parse_status)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?,
    };
    Ok(Json(state.directory.list_jobs(filter).await?))
}

/// POST /api/v1/admin/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    identity: IdentityContext,
    body: Result<Json<JobDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    identity.authorize(Module::JobManagement, Action::Create)?;
    let Json(draft) = body?;
    let job = state.directory.create_job(&draft).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/admin/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Job>, AppError> {
    identity.authorize(Module::JobManagement, Action::Read)?;
    let Path(id) = id?;
    Ok(Json(state.directory.get_job(id).await?))
}

/// PATCH /api/v1/admin/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<JobPatch>, JsonRejection>,
) -> Result<Json<Job>, AppError> {
    identity.authorize(Module::JobManagement, Action::Update)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Json(state.directory.update_job(id, &patch).await?))
}

/// DELETE /api/v1/admin/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    identity.authorize(Module::JobManagement, Action::Delete)?;
    let Path(id) = id?;
    state.directory.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Admin: student management
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/students
pub async fn handle_list_students(
    State(state): State<AppState>,
    identity: IdentityContext,
) -> Result<Json<Vec<StudentWithProfile>>, AppError> {
    identity.authorize(Module::StudentManagement, Action::List)?;
    Ok(Json(state.directory.list_students_with_profiles().await?))
}

/// GET /api/v1/admin/students/:id
pub async fn handle_get_student(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Student>, AppError> {
    identity.authorize(Module::StudentManagement, Action::Read)?;
    let Path(id) = id?;
    Ok(Json(state.directory.get_student(id).await?))
}

/// PATCH /api/v1/admin/students/:id
pub async fn handle_update_student(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<StudentPatch>, JsonRejection>,
) -> Result<Json<Student>, AppError> {
    identity.authorize(Module::StudentManagement, Action::Update)?;
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Json(state.directory.update_student(id, &patch).await?))
}

/// DELETE /api/v1/admin/students/:id
pub async fn handle_delete_student(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    identity.authorize(Module::StudentManagement, Action::Delete)?;
    let Path(id) = id?;
    state.directory.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Student: listings and own profile
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn handle_job_listings(
    State(state): State<AppState>,
    identity: IdentityContext,
) -> Result<Json<Vec<Job>>, AppError> {
    identity.authorize(Module::JobListings, Action::List)?;
    Ok(Json(state.directory.list_jobs(JobFilter::active()).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_job_listing(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Job>, AppError> {
    identity.authorize(Module::JobListings, Action::Read)?;
    let Path(id) = id?;
    Ok(Json(state.directory.get_active_job(id).await?))
}

/// POST /api/v1/jobs/:id/apply
///
/// Applying is not wired to any record yet: the posting must exist and be
/// active, and the caller gets a notice. The applications counter is untouched.
pub async fn handle_apply(
    State(state): State<AppState>,
    identity: IdentityContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    identity.authorize(Module::JobListings, Action::Apply)?;
    let Path(id) = id?;
    let job = state.directory.get_active_job(id).await?;
    info!("User {} tried to apply to job {}", identity.user_id, job.id);
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "job_id": job.id,
            "recorded": false,
            "message": "Applications are not open through the portal yet"
        })),
    ))
}

/// GET /api/v1/me/student
pub async fn handle_get_own_profile(
    State(state): State<AppState>,
    identity: IdentityContext,
) -> Result<Json<OwnProfileResponse>, AppError> {
    identity.authorize(Module::OwnProfile, Action::Read)?;
    let student = state.directory.find_own_student(identity.user_id).await?;
    Ok(Json(OwnProfileResponse {
        profile: ProfileSummary {
            full_name: identity.full_name,
            email: identity.email,
        },
        student,
    }))
}

/// PUT /api/v1/me/student
///
/// First save creates the caller's record, later saves replace it. The owner
/// is always the caller; the body cannot name another user.
pub async fn handle_save_own_profile(
    State(state): State<AppState>,
    identity: IdentityContext,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<Json<Student>, AppError> {
    identity.authorize(Module::OwnProfile, Action::Update)?;
    let Json(draft) = body?;
    Ok(Json(
        state
            .directory
            .save_own_student(identity.user_id, &draft)
            .await?,
    ))
}

/// GET /api/v1/me/applications
pub async fn handle_applications(identity: IdentityContext) -> Result<Json<Value>, AppError> {
    identity.authorize(Module::Applications, Action::List)?;
    Ok(Json(placeholder("applications")))
}

/// GET /api/v1/me/interviews
pub async fn handle_interviews(identity: IdentityContext) -> Result<Json<Value>, AppError> {
    identity.authorize(Module::Interviews, Action::List)?;
    Ok(Json(placeholder("interviews")))
}

fn placeholder(module: &str) -> Value {
    json!({
        "module": module,
        "items": [],
        "message": "Coming soon"
    })
}

/// GET /api/v1/departments
pub async fn handle_departments() -> Json<&'static [&'static str]> {
    Json(DEPARTMENTS)
}
