use serde::Serialize;

use crate::models::job::{Job, JobStatus};

/// Admin dashboard overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
    pub total_students: i64,
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
}

pub fn summarize_jobs(total_students: i64, jobs: &[Job]) -> DirectoryStats {
    DirectoryStats {
        total_students,
        total_jobs: jobs.len() as i64,
        active_jobs: jobs
            .iter()
            .filter(|j| j.status == JobStatus::Active)
            .count() as i64,
        total_applications: jobs.iter().map(|j| i64::from(j.applications)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn job(status: JobStatus, applications: i32) -> Job {
        Job {
            id: Uuid::new_v4(),
            company: "CloudNet Co".to_string(),
            title: "DevOps Engineer".to_string(),
            description: String::new(),
            location: "Pune".to_string(),
            salary: "10-15 LPA".to_string(),
            skills: vec![],
            requirements: String::new(),
            status,
            applications,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_directory() {
        let stats = summarize_jobs(0, &[]);
        assert_eq!(stats.total_jobs, 0);
        assert_eq!(stats.active_jobs, 0);
        assert_eq!(stats.total_applications, 0);
    }

    #[test]
    fn test_applications_summed_across_all_statuses() {
        let jobs = vec![
            job(JobStatus::Active, 47),
            job(JobStatus::Closing, 23),
            job(JobStatus::Closed, 31),
        ];
        let stats = summarize_jobs(12, &jobs);
        assert_eq!(stats.total_students, 12);
        assert_eq!(stats.total_jobs, 3);
        assert_eq!(stats.active_jobs, 1);
        assert_eq!(stats.total_applications, 101);
    }

    #[test]
    fn test_large_counters_do_not_overflow() {
        let jobs = vec![job(JobStatus::Active, i32::MAX), job(JobStatus::Active, i32::MAX)];
        assert_eq!(
            summarize_jobs(0, &jobs).total_applications,
            2 * i64::from(i32::MAX)
        );
    }
}
