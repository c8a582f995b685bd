use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::build_router;
use crate::config::{Config, StoreBackend};
use crate::directory::memory::InMemoryDirectoryStore;
use crate::directory::service::Directory;
use crate::state::AppState;

const IDENTITY_HEADER: &str = "x-user-id";

fn app() -> Router {
    let config = Config {
        store_backend: StoreBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        port: 0,
        rust_log: "info".to_string(),
        identity_header: IDENTITY_HEADER.to_string(),
    };
    build_router(AppState {
        directory: Directory::new(Arc::new(InMemoryDirectoryStore::new())),
        config,
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(IDENTITY_HEADER, user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_in(app: &Router, role: &str, name: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    let (status, _) = send(
        app,
        Method::POST,
        "/api/v1/identity/sign-in",
        None,
        Some(json!({
            "user_id": user_id,
            "full_name": name,
            "email": format!("{}@campus.edu", name.to_lowercase().replace(' ', ".")),
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    user_id
}

async fn create_job(app: &Router, admin: Uuid, title: &str, status: &str) -> Value {
    let (code, job) = send(
        app,
        Method::POST,
        "/api/v1/admin/jobs",
        Some(admin),
        Some(json!({
            "company": "TechCorp",
            "title": title,
            "location": "Bangalore",
            "skills": "Java, Spring, , AWS",
            "status": status,
            "applications": 47,
        })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED);
    job
}

fn multipart(content_type: &str, data: &str) -> Request<Body> {
    let boundary = "X-PLACEMENT-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"resume\"; filename=\"resume.pdf\"\r\n\
         Content-Type: {content_type}\r\n\r\n\
         {data}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/resume/scan")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "placement-api");
}

#[tokio::test]
async fn test_sign_in_resolves_phase_and_default_module() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/identity/sign-in",
        None,
        Some(json!({
            "user_id": Uuid::new_v4(),
            "full_name": "Placement Officer",
            "email": "officer@campus.edu",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "admin");
    assert_eq!(body["default_module"], "statistics");
}

#[tokio::test]
async fn test_sign_in_with_unknown_role_is_unauthorized() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/v1/identity/sign-in",
        None,
        Some(json!({
            "user_id": Uuid::new_v4(),
            "full_name": "Recruiter",
            "email": "r@corp.com",
            "role": "recruiter",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_sign_in_without_role_claim_is_unauthorized() {
    let app = app();
    for role in [None, Some(Value::Null)] {
        let mut body = json!({
            "user_id": Uuid::new_v4(),
            "full_name": "No Role",
            "email": "norole@campus.edu",
        });
        if let Some(role) = role {
            body["role"] = role;
        }
        let (status, body) = send(&app, Method::POST, "/api/v1/identity/sign-in", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_role_cannot_change_on_later_sign_in() {
    let app = app();
    let user = sign_in(&app, "student", "Asha Rao").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/identity/sign-in",
        None,
        Some(json!({
            "user_id": user,
            "full_name": "Asha Rao",
            "email": "asha@campus.edu",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "student");
}

#[tokio::test]
async fn test_missing_or_unknown_identity_is_unauthorized() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/v1/jobs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::GET, "/api/v1/jobs", Some(Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_out_returns_unauthenticated() {
    let app = app();
    let student = sign_in(&app, "student", "Asha Rao").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/identity/sign-out",
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "unauthenticated");
}

#[tokio::test]
async fn test_roles_are_confined_to_their_dashboards() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;
    let student = sign_in(&app, "student", "Asha Rao").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/admin/stats", Some(student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = send(&app, Method::GET, "/api/v1/jobs", Some(admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/v1/me/student", Some(admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_view_routing_by_token() {
    let app = app();
    let student = sign_in(&app, "student", "Asha Rao").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/session/view/resume",
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"], "resume_scanner");

    for token in ["stats", "billing"] {
        let uri = format!("/api/v1/session/view/{token}");
        let (status, _) = send(&app, Method::GET, &uri, Some(student), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "token {token}");
    }
}

#[tokio::test]
async fn test_admin_job_lifecycle_and_student_listing() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;
    let student = sign_in(&app, "student", "Asha Rao").await;

    let open = create_job(&app, admin, "Software Engineer", "active").await;
    let closed = create_job(&app, admin, "Data Analyst", "closed").await;
    assert_eq!(open["skills"], json!(["Java", "Spring", "AWS"]));

    let (_, listings) = send(&app, Method::GET, "/api/v1/jobs", Some(student), None).await;
    let titles: Vec<&str> = listings
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Software Engineer"]);

    let uri = format!("/api/v1/jobs/{}", closed["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::GET, &uri, Some(student), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, all) = send(&app, Method::GET, "/api/v1/admin/jobs", Some(admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    let (_, only_closed) = send(
        &app,
        Method::GET,
        "/api/v1/admin/jobs?status=closed",
        Some(admin),
        None,
    )
    .await;
    assert_eq!(only_closed.as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/admin/jobs/{}", open["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(admin),
        Some(json!({ "status": "closing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "closing");
    assert_eq!(updated["applications"], 47);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, Some(admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_job_payloads_are_rejected() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/admin/jobs",
        Some(admin),
        Some(json!({ "company": "A", "title": "B", "location": "C", "status": "paused" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/admin/jobs",
        Some(admin),
        Some(json!({ "company": "A", "title": "B", "location": "C", "priority": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/admin/jobs?status=archived",
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_record_id_gets_json_error() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;
    for uri in ["/api/v1/admin/jobs/not-a-uuid", "/api/v1/admin/students/42"] {
        let (status, body) = send(&app, Method::GET, uri, Some(admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_skills_list_survives_edit_round_trip() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;
    let (status, job) = send(
        &app,
        Method::POST,
        "/api/v1/admin/jobs",
        Some(admin),
        Some(json!({
            "company": "TechCorp",
            "title": "Systems Engineer",
            "location": "Pune",
            "skills": ["C, C++", " Go "],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["skills"], json!(["C", "C++", "Go"]));

    let uri = format!("/api/v1/admin/jobs/{}", job["id"].as_str().unwrap());
    let (_, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(admin),
        Some(json!({ "skills": "C, C++, Go" })),
    )
    .await;
    assert_eq!(updated["skills"], job["skills"]);
}

#[tokio::test]
async fn test_apply_does_not_change_counter() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;
    let student = sign_in(&app, "student", "Asha Rao").await;
    let job = create_job(&app, admin, "Software Engineer", "active").await;
    let id = job["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/jobs/{id}/apply"),
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["recorded"], false);

    let (_, stats) = send(&app, Method::GET, "/api/v1/admin/stats", Some(admin), None).await;
    assert_eq!(stats["total_applications"], 47);
    assert_eq!(stats["active_jobs"], 1);
}

#[tokio::test]
async fn test_student_profile_flow_and_admin_management() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;
    let student = sign_in(&app, "student", "Asha Rao").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/me/student", Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student"], Value::Null);
    assert_eq!(body["profile"]["full_name"], "Asha Rao");

    let (status, saved) = send(
        &app,
        Method::PUT,
        "/api/v1/me/student",
        Some(student),
        Some(json!({
            "student_code": "CS21B045",
            "department": "Computer Science Engineering",
            "year_of_study": 3,
            "cgpa": "8.75",
            "skills": "Rust, SQL",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["cgpa"], 8.75);

    let (_, listed) = send(&app, Method::GET, "/api/v1/admin/students", Some(admin), None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["profile"]["full_name"], "Asha Rao");
    assert_eq!(listed[0]["student_code"], "CS21B045");

    let uri = format!("/api/v1/admin/students/{}", saved["id"].as_str().unwrap());
    let (status, _) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(admin),
        Some(json!({ "cgpa": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, patched) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(admin),
        Some(json!({ "cgpa": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["cgpa"], 0.0);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, stats) = send(&app, Method::GET, "/api/v1/admin/stats", Some(admin), None).await;
    assert_eq!(stats["total_students"], 0);
}

#[tokio::test]
async fn test_placeholders_and_departments() {
    let app = app();
    let student = sign_in(&app, "student", "Asha Rao").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/me/interviews",
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));

    let (status, body) = send(&app, Method::GET, "/api/v1/departments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_resume_scan_accepts_only_pdf() {
    let app = app();
    let student = sign_in(&app, "student", "Asha Rao").await;

    let mut request = multipart("text/plain", "hello");
    request
        .headers_mut()
        .insert(IDENTITY_HEADER, student.to_string().parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut request = multipart("application/pdf", "%PDF-1.7 fake");
    request
        .headers_mut()
        .insert(IDENTITY_HEADER, student.to_string().parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let report: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report["stages"].as_array().unwrap().len(), 7);
    let findings = report["findings"].as_array().unwrap().len();
    assert!((1..=4).contains(&findings));
}

#[tokio::test]
async fn test_admin_cannot_scan_resumes() {
    let app = app();
    let admin = sign_in(&app, "admin", "Placement Officer").await;
    let mut request = multipart("application/pdf", "%PDF-1.7 fake");
    request
        .headers_mut()
        .insert(IDENTITY_HEADER, admin.to_string().parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
