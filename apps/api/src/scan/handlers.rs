use axum::{extract::Multipart, Json};
use tracing::info;

use crate::access::identity::IdentityContext;
use crate::access::router::{Action, Module};
use crate::errors::AppError;
use crate::scan::{ResumeScan, ResumeUpload, ScanError, ScanReport};

const RESUME_FIELD: &str = "resume";

/// POST /api/v1/resume/scan
///
/// Multipart upload; the PDF goes in the `resume` field. Other fields are ignored.
pub async fn handle_scan(
    identity: IdentityContext,
    mut multipart: Multipart,
) -> Result<Json<ScanReport>, AppError> {
    identity.authorize(Module::ResumeScan, Action::Create)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScanError::Multipart(e.body_text()))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field
            .bytes()
            .await
            .map_err(|e| ScanError::Multipart(e.body_text()))?;
        upload = Some(ResumeUpload::select(
            file_name.as_deref(),
            content_type.as_deref(),
            &data,
        )?);
        break;
    }
    let upload = upload.ok_or(ScanError::MissingFile)?;

    let mut scan = ResumeScan::start(upload);
    while let Some(stage) = scan.advance() {
        info!(
            "Resume scan for {}: {} ({:.0}%)",
            identity.user_id,
            stage.message(),
            scan.progress_percent()
        );
    }
    Ok(Json(scan.finish_random()?))
}
