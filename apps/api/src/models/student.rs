use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::profile::ProfileSummary;

/// Departments offered by the profile form. Free text outside this list is still accepted.
pub const DEPARTMENTS: &[&str] = &[
    "Computer Science Engineering",
    "Information Technology",
    "Electronics & Communication",
    "Mechanical Engineering",
    "Civil Engineering",
    "Electrical Engineering",
];

/// Academic record, one-to-one with a [`Profile`](crate::models::profile::Profile) via `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub student_code: String,
    pub department: String,
    pub year_of_study: i32,
    pub cgpa: Option<f64>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// CGPA as shown on cards: two decimals, or a dash when absent.
    pub fn cgpa_display(&self) -> String {
        match self.cgpa {
            Some(cgpa) => format!("{cgpa:.2}"),
            None => "-".to_string(),
        }
    }
}

/// Admin listing row: a student joined with its owner's display fields.
#[derive(Debug, Clone, Serialize)]
pub struct StudentWithProfile {
    #[serde(flatten)]
    pub student: Student,
    pub profile: ProfileSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(cgpa: Option<f64>) -> Student {
        Student {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            student_code: "EC22B011".to_string(),
            department: DEPARTMENTS[2].to_string(),
            year_of_study: 2,
            cgpa,
            phone: None,
            skills: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cgpa_display_uses_two_decimals() {
        assert_eq!(student(Some(8.756)).cgpa_display(), "8.76");
        assert_eq!(student(Some(0.0)).cgpa_display(), "0.00");
        assert_eq!(student(None).cgpa_display(), "-");
    }

    #[test]
    fn test_listing_row_flattens_student_fields() {
        let row = StudentWithProfile {
            student: student(Some(7.0)),
            profile: ProfileSummary::unknown(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["student_code"], "EC22B011");
        assert_eq!(value["profile"]["full_name"], "Unknown");
    }
}
