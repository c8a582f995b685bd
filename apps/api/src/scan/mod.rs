//! The student's resume screening tool.
//!
//! Nothing is parsed: an accepted PDF walks a fixed sequence of named stages
//! and the finished scan reports a random-length prefix of canned findings.

pub mod handlers;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const FINDINGS: [&str; 4] = [
    "WARNING: Experience section may contain recursive references",
    "ALERT: Skills enumeration lacks termination criteria",
    "INFO: Contact information validation passed",
    "WARNING: Project descriptions show potential incompleteness",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("only PDF files are accepted (got {0})")]
    NotPdf(String),

    #[error("the uploaded file is empty")]
    Empty,

    #[error("no file was uploaded in the 'resume' field")]
    MissingFile,

    #[error("scan finished {completed} of {total} stages")]
    Incomplete { completed: usize, total: usize },

    #[error("malformed upload: {0}")]
    Multipart(String),
}

/// An accepted upload. Only constructible through [`ResumeUpload::select`].
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub size: usize,
}

impl ResumeUpload {
    /// Synchronous selection check: PDF media type and a non-empty body.
    pub fn select(
        file_name: Option<&str>,
        content_type: Option<&str>,
        data: &Bytes,
    ) -> Result<Self, ScanError> {
        let media_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or_default().trim())
            .unwrap_or_default();
        if media_type != PDF_MEDIA_TYPE {
            let shown = if media_type.is_empty() { "no media type" } else { media_type };
            return Err(ScanError::NotPdf(shown.to_string()));
        }
        if data.is_empty() {
            return Err(ScanError::Empty);
        }
        Ok(Self {
            file_name: file_name.map(String::from),
            size: data.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Initiating,
    AnalyzingStructure,
    CheckingExperienceLoops,
    ValidatingTermination,
    DetectingIncomplete,
    SemanticAnalysis,
    FinalizingReport,
}

impl ScanStage {
    pub const ALL: [ScanStage; 7] = [
        ScanStage::Initiating,
        ScanStage::AnalyzingStructure,
        ScanStage::CheckingExperienceLoops,
        ScanStage::ValidatingTermination,
        ScanStage::DetectingIncomplete,
        ScanStage::SemanticAnalysis,
        ScanStage::FinalizingReport,
    ];

    pub fn message(&self) -> &'static str {
        match self {
            ScanStage::Initiating => "INITIATING HALTING PROBLEM SIMULATION...",
            ScanStage::AnalyzingStructure => "ANALYZING RESUME STRUCTURE...",
            ScanStage::CheckingExperienceLoops => "CHECKING FOR INFINITE LOOPS IN EXPERIENCE...",
            ScanStage::ValidatingTermination => "VALIDATING TERMINATION CONDITIONS...",
            ScanStage::DetectingIncomplete => "DETECTING INCOMPLETE SECTIONS...",
            ScanStage::SemanticAnalysis => "RUNNING SEMANTIC ANALYSIS...",
            ScanStage::FinalizingReport => "FINALIZING SCAN REPORT...",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub stage: ScanStage,
    pub message: &'static str,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub file_name: Option<String>,
    pub size: usize,
    pub stages: Vec<StageRecord>,
    pub findings: Vec<&'static str>,
}

/// A scan in progress. Each [`advance`](Self::advance) completes one stage.
#[derive(Debug)]
pub struct ResumeScan {
    upload: ResumeUpload,
    completed: Vec<StageRecord>,
}

impl ResumeScan {
    pub fn start(upload: ResumeUpload) -> Self {
        Self {
            upload,
            completed: Vec::with_capacity(ScanStage::ALL.len()),
        }
    }

    /// Completes the next stage; `None` once every stage is done.
    pub fn advance(&mut self) -> Option<ScanStage> {
        let stage = *ScanStage::ALL.get(self.completed.len())?;
        self.completed.push(StageRecord {
            stage,
            message: stage.message(),
            progress_percent: 0.0,
        });
        let progress = self.progress_percent();
        if let Some(last) = self.completed.last_mut() {
            last.progress_percent = progress;
        }
        Some(stage)
    }

    pub fn progress_percent(&self) -> f64 {
        self.completed.len() as f64 * 100.0 / ScanStage::ALL.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.completed.len() == ScanStage::ALL.len()
    }

    /// Report with the first `issue_count` findings, clamped to 1..=4.
    pub fn finish(self, issue_count: usize) -> Result<ScanReport, ScanError> {
        if !self.is_complete() {
            return Err(ScanError::Incomplete {
                completed: self.completed.len(),
                total: ScanStage::ALL.len(),
            });
        }
        let count = issue_count.clamp(1, FINDINGS.len());
        Ok(ScanReport {
            file_name: self.upload.file_name,
            size: self.upload.size,
            stages: self.completed,
            findings: FINDINGS[..count].to_vec(),
        })
    }

    pub fn finish_random(self) -> Result<ScanReport, ScanError> {
        self.finish(random_issue_count())
    }
}

fn random_issue_count() -> usize {
    // v4 UUIDs are random; one byte is plenty for a 1..=4 pick.
    usize::from(Uuid::new_v4().as_bytes()[0]) % FINDINGS.len() + 1
}
