//! Normalization and validation applied to every create and update
//! before the store commits.
//!
//! Policy decisions:
//! - skills: comma-delimited, trimmed, empties dropped, order and duplicates kept
//! - cgpa: unparsable text is stored as 0; parsed values outside [0, 10] are rejected;
//!   blank text means "no CGPA"
//! - status: exactly `active`, `closing` or `closed`
//! - applications: set once at creation, never patched

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::directory::store::{JobChanges, NewJob, NewStudent, StudentChanges};
use crate::models::job::JobStatus;

pub const CGPA_MIN: f64 = 0.0;
pub const CGPA_MAX: f64 = 10.0;
pub const YEARS_OF_STUDY: std::ops::RangeInclusive<i64> = 1..=4;

const SKILL_DELIMITER: char = ',';
const SKILL_JOINER: &str = ", ";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleViolation {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("cgpa {0} is outside the range 0 to 10")]
    CgpaOutOfRange(f64),

    #[error("year_of_study {0} must be 1, 2, 3 or 4")]
    YearOutOfRange(i64),

    #[error("{0}")]
    UnknownStatus(#[from] crate::models::job::UnknownJobStatus),

    #[error("applications must be a non-negative whole number, got {0}")]
    InvalidApplications(String),

    #[error("{field} must be a whole number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

/// Skills as they arrive from a form (one delimited string) or an API client (a list).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    Delimited(String),
    List(Vec<String>),
}

/// CGPA as typed into a form (text) or sent as a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CgpaInput {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobDraft {
    pub company: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub skills: Option<SkillsInput>,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub applications: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobPatch {
    pub company: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub skills: Option<SkillsInput>,
    pub requirements: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentDraft {
    pub student_code: String,
    pub department: String,
    pub year_of_study: i64,
    #[serde(default)]
    pub cgpa: Option<CgpaInput>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Option<SkillsInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPatch {
    pub student_code: Option<String>,
    pub department: Option<String>,
    pub year_of_study: Option<i64>,
    pub cgpa: Option<CgpaInput>,
    pub phone: Option<String>,
    pub skills: Option<SkillsInput>,
}

// ────────────────────────────────────────────────────────────────────────────
// Field rules
// ────────────────────────────────────────────────────────────────────────────

/// Splits a comma-delimited skills string into trimmed, non-empty tags.
pub fn parse_skills(raw: &str) -> Vec<String> {
    clean_tags(raw.split(SKILL_DELIMITER))
}

/// Canonical form for editing: tags joined with `", "`. `parse_skills` inverts it.
pub fn join_skills(skills: &[String]) -> String {
    skills.join(SKILL_JOINER)
}

pub fn normalize_skills(input: &SkillsInput) -> Vec<String> {
    match input {
        SkillsInput::Delimited(raw) => parse_skills(raw),
        // List elements are split like form text; stored tags never contain the delimiter.
        SkillsInput::List(items) => items.iter().flat_map(|item| parse_skills(item)).collect(),
    }
}

fn clean_tags<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<String> {
    tags.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Coerces CGPA input. Returns `None` only for blank text.
pub fn coerce_cgpa(input: &CgpaInput) -> Result<Option<f64>, RuleViolation> {
    let value = match input {
        CgpaInput::Number(n) => *n,
        CgpaInput::Text(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            // "NaN" and "inf" parse as floats but are not grades.
            match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => CGPA_MIN,
            }
        }
    };

    if !(CGPA_MIN..=CGPA_MAX).contains(&value) {
        return Err(RuleViolation::CgpaOutOfRange(value));
    }
    // -0.0 is in range; store it as 0.0
    Ok(Some(value + 0.0))
}

pub fn parse_status(raw: &str) -> Result<JobStatus, RuleViolation> {
    Ok(raw.trim().parse::<JobStatus>()?)
}

pub fn check_year_of_study(year: i64) -> Result<i32, RuleViolation> {
    if !YEARS_OF_STUDY.contains(&year) {
        return Err(RuleViolation::YearOutOfRange(year));
    }
    // In range 1..=4, always fits.
    Ok(year as i32)
}

pub fn check_applications(count: i64) -> Result<i32, RuleViolation> {
    i32::try_from(count)
        .ok()
        .filter(|c| *c >= 0)
        .ok_or_else(|| RuleViolation::InvalidApplications(count.to_string()))
}

/// Trimmed phone number; blank means no phone on file.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let phone = raw.trim();
    (!phone.is_empty()).then(|| phone.to_string())
}

fn required(field: &'static str, value: &str) -> Result<String, RuleViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RuleViolation::Required { field });
    }
    Ok(trimmed.to_string())
}

fn optional_required(
    field: &'static str,
    value: Option<&String>,
) -> Result<Option<String>, RuleViolation> {
    value.map(|v| required(field, v)).transpose()
}

// ────────────────────────────────────────────────────────────────────────────
// Record rules
// ────────────────────────────────────────────────────────────────────────────

pub fn validate_job_draft(draft: &JobDraft) -> Result<NewJob, RuleViolation> {
    let status = match draft.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => JobStatus::Active,
    };

    Ok(NewJob {
        company: required("company", &draft.company)?,
        title: required("title", &draft.title)?,
        description: draft.description.trim().to_string(),
        location: required("location", &draft.location)?,
        salary: draft.salary.trim().to_string(),
        skills: draft
            .skills
            .as_ref()
            .map(normalize_skills)
            .unwrap_or_default(),
        requirements: draft.requirements.trim().to_string(),
        status,
        applications: check_applications(draft.applications.unwrap_or(0))?,
    })
}

pub fn validate_job_patch(patch: &JobPatch) -> Result<JobChanges, RuleViolation> {
    Ok(JobChanges {
        company: optional_required("company", patch.company.as_ref())?,
        title: optional_required("title", patch.title.as_ref())?,
        description: patch.description.as_deref().map(|d| d.trim().to_string()),
        location: optional_required("location", patch.location.as_ref())?,
        salary: patch.salary.as_deref().map(|s| s.trim().to_string()),
        skills: patch.skills.as_ref().map(normalize_skills),
        requirements: patch.requirements.as_deref().map(|r| r.trim().to_string()),
        status: patch.status.as_deref().map(parse_status).transpose()?,
    })
}

pub fn validate_student_draft(
    user_id: Uuid,
    draft: &StudentDraft,
) -> Result<NewStudent, RuleViolation> {
    Ok(NewStudent {
        user_id,
        student_code: required("student_code", &draft.student_code)?,
        department: required("department", &draft.department)?,
        year_of_study: check_year_of_study(draft.year_of_study)?,
        cgpa: match &draft.cgpa {
            Some(input) => coerce_cgpa(input)?,
            None => None,
        },
        phone: draft.phone.as_deref().and_then(normalize_phone),
        skills: draft
            .skills
            .as_ref()
            .map(normalize_skills)
            .unwrap_or_default(),
    })
}

pub fn validate_student_patch(patch: &StudentPatch) -> Result<StudentChanges, RuleViolation> {
    Ok(StudentChanges {
        student_code: optional_required("student_code", patch.student_code.as_ref())?,
        department: optional_required("department", patch.department.as_ref())?,
        year_of_study: patch.year_of_study.map(check_year_of_study).transpose()?,
        cgpa: patch.cgpa.as_ref().map(coerce_cgpa).transpose()?,
        phone: patch.phone.as_deref().map(normalize_phone),
        skills: patch.skills.as_ref().map(normalize_skills),
    })
}
