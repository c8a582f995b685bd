pub mod health;

#[cfg(test)]
mod tests;

use axum::{
    routing::{get, post},
    Router,
};

use crate::access::handlers as access;
use crate::directory::handlers as directory;
use crate::scan::handlers as scan;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Identity boundary
        .route("/api/v1/identity/sign-in", post(access::handle_sign_in))
        .route("/api/v1/identity/sign-out", post(access::handle_sign_out))
        .route("/api/v1/identity/session", get(access::handle_current_session))
        .route("/api/v1/session/view/:module", get(access::handle_route_view))
        .route("/api/v1/departments", get(directory::handle_departments))
        // Admin dashboard
        .route("/api/v1/admin/stats", get(directory::handle_stats))
        .route(
            "/api/v1/admin/jobs",
            get(directory::handle_list_jobs).post(directory::handle_create_job),
        )
        .route(
            "/api/v1/admin/jobs/:id",
            get(directory::handle_get_job)
                .patch(directory::handle_update_job)
                .delete(directory::handle_delete_job),
        )
        .route("/api/v1/admin/students", get(directory::handle_list_students))
        .route(
            "/api/v1/admin/students/:id",
            get(directory::handle_get_student)
                .patch(directory::handle_update_student)
                .delete(directory::handle_delete_student),
        )
        // Student dashboard
        .route("/api/v1/jobs", get(directory::handle_job_listings))
        .route("/api/v1/jobs/:id", get(directory::handle_job_listing))
        .route("/api/v1/jobs/:id/apply", post(directory::handle_apply))
        .route(
            "/api/v1/me/student",
            get(directory::handle_get_own_profile).put(directory::handle_save_own_profile),
        )
        .route("/api/v1/me/applications", get(directory::handle_applications))
        .route("/api/v1/me/interviews", get(directory::handle_interviews))
        .route("/api/v1/resume/scan", post(scan::handle_scan))
        .with_state(state)
}
