#![allow(dead_code)]

//! Per-dashboard selection state for the UI layer.
//!
//! Holds the active module, the expanded/selected record, the open dialog's
//! draft and a pending delete confirmation. Never a source of truth: a
//! submitted draft becomes a [`Command`] for the directory, and the UI
//! refetches afterwards.

use thiserror::Error;
use uuid::Uuid;

use crate::access::identity::IdentityContext;
use crate::access::router::{authorize, default_module, route, Action, Module, RouteDecision};
use crate::directory::rules::{
    validate_job_draft, validate_job_patch, validate_student_draft, validate_student_patch,
    CgpaInput, JobDraft, JobPatch, RuleViolation, SkillsInput, StudentDraft, StudentPatch,
    join_skills,
};
use crate::models::job::Job;
use crate::models::profile::Role;
use crate::models::student::Student;

/// Raw job form fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobForm {
    pub company: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: String,
    pub skills: String,
    pub requirements: String,
    pub status: String,
    pub applications: String,
}

impl JobForm {
    pub fn blank() -> Self {
        Self {
            status: "active".to_string(),
            applications: "0".to_string(),
            ..Default::default()
        }
    }

    pub fn from_job(job: &Job) -> Self {
        Self {
            company: job.company.clone(),
            title: job.title.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            salary: job.salary.clone(),
            skills: join_skills(&job.skills),
            requirements: job.requirements.clone(),
            status: job.status.as_str().to_string(),
            applications: job.applications.to_string(),
        }
    }
}

/// Raw student form fields, exactly as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentForm {
    pub student_code: String,
    pub department: String,
    pub year_of_study: String,
    pub cgpa: String,
    pub phone: String,
    pub skills: String,
}

impl StudentForm {
    pub fn blank() -> Self {
        Self {
            student_code: String::new(),
            department: String::new(),
            year_of_study: "1".to_string(),
            cgpa: String::new(),
            phone: String::new(),
            skills: String::new(),
        }
    }

    pub fn from_student(student: &Student) -> Self {
        Self {
            student_code: student.student_code.clone(),
            department: student.department.clone(),
            year_of_study: student.year_of_study.to_string(),
            cgpa: student.cgpa.map(|c| c.to_string()).unwrap_or_default(),
            phone: student.phone.clone().unwrap_or_default(),
            skills: join_skills(&student.skills),
        }
    }

    fn year(&self) -> Result<i64, RuleViolation> {
        self.year_of_study
            .trim()
            .parse()
            .map_err(|_| RuleViolation::NotANumber {
                field: "year_of_study",
                value: self.year_of_study.clone(),
            })
    }

    fn draft(&self) -> Result<StudentDraft, RuleViolation> {
        Ok(StudentDraft {
            student_code: self.student_code.clone(),
            department: self.department.clone(),
            year_of_study: self.year()?,
            cgpa: Some(CgpaInput::Text(self.cgpa.clone())),
            phone: Some(self.phone.clone()),
            skills: Some(SkillsInput::Delimited(self.skills.clone())),
        })
    }

    fn patch(&self) -> Result<StudentPatch, RuleViolation> {
        let draft = self.draft()?;
        Ok(StudentPatch {
            student_code: Some(draft.student_code),
            department: Some(draft.department),
            year_of_study: Some(draft.year_of_study),
            cgpa: draft.cgpa,
            phone: draft.phone,
            skills: draft.skills,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    NewJob(JobForm),
    EditJob { id: Uuid, form: JobForm },
    EditStudent { id: Uuid, form: StudentForm },
    /// The student's own profile form; `existing` is their record, if any.
    OwnProfile {
        existing: Option<Uuid>,
        form: StudentForm,
    },
}

/// Validated intent handed to the directory.
#[derive(Debug, Clone)]
pub enum Command {
    CreateJob(JobDraft),
    UpdateJob(Uuid, JobPatch),
    UpdateStudent(Uuid, StudentPatch),
    SaveOwnStudent(StudentDraft),
    DeleteJob(Uuid),
    DeleteStudent(Uuid),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("module not permitted: {0:?}")]
    NotPermitted(RouteDecision),

    #[error("no dialog is open")]
    NoDraft,

    #[error("no delete is awaiting confirmation")]
    NothingToConfirm,

    #[error(transparent)]
    Invalid(#[from] RuleViolation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewSession {
    role: Role,
    active_module: Module,
    selected_record_id: Option<Uuid>,
    draft: Option<Draft>,
    pending_delete: Option<Uuid>,
}

impl ViewSession {
    /// Starts on the role's default module. Identities without a role get no session.
    pub fn for_identity(identity: &IdentityContext) -> Option<Self> {
        identity.role.map(|role| Self {
            role,
            active_module: default_module(role),
            selected_record_id: None,
            draft: None,
            pending_delete: None,
        })
    }

    pub fn active_module(&self) -> Module {
        self.active_module
    }

    pub fn selected_record_id(&self) -> Option<Uuid> {
        self.selected_record_id
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.draft.as_mut()
    }

    pub fn pending_delete(&self) -> Option<Uuid> {
        self.pending_delete
    }

    /// Switches module; selection, draft and pending confirmation are reset.
    pub fn select_module(&mut self, module: Module) -> RouteDecision {
        let decision = route(Some(self.role), module);
        if let RouteDecision::Render(_) = decision {
            self.active_module = module;
            self.reset();
        }
        decision
    }

    /// Expands a record, or collapses it if it is already selected.
    pub fn toggle_selection(&mut self, id: Uuid) {
        self.selected_record_id = match self.selected_record_id {
            Some(current) if current == id => None,
            _ => Some(id),
        };
    }

    fn require(&self, action: Action) -> Result<(), SessionError> {
        match authorize(Some(self.role), self.active_module, action) {
            RouteDecision::Render(_) => Ok(()),
            other => Err(SessionError::NotPermitted(other)),
        }
    }

    fn require_module(&self, module: Module, action: Action) -> Result<(), SessionError> {
        if self.active_module != module {
            return Err(SessionError::NotPermitted(RouteDecision::Unauthorized));
        }
        self.require(action)
    }

    pub fn open_new_job(&mut self) -> Result<(), SessionError> {
        self.require_module(Module::JobManagement, Action::Create)?;
        self.draft = Some(Draft::NewJob(JobForm::blank()));
        Ok(())
    }

    pub fn open_edit_job(&mut self, job: &Job) -> Result<(), SessionError> {
        self.require_module(Module::JobManagement, Action::Update)?;
        self.draft = Some(Draft::EditJob {
            id: job.id,
            form: JobForm::from_job(job),
        });
        Ok(())
    }

    pub fn open_edit_student(&mut self, student: &Student) -> Result<(), SessionError> {
        self.require_module(Module::StudentManagement, Action::Update)?;
        self.draft = Some(Draft::EditStudent {
            id: student.id,
            form: StudentForm::from_student(student),
        });
        Ok(())
    }

    pub fn open_own_profile(&mut self, existing: Option<&Student>) -> Result<(), SessionError> {
        self.require_module(Module::OwnProfile, Action::Update)?;
        self.draft = Some(Draft::OwnProfile {
            existing: existing.map(|s| s.id),
            form: existing
                .map(StudentForm::from_student)
                .unwrap_or_else(StudentForm::blank),
        });
        Ok(())
    }

    /// Closes the dialog; the draft is discarded with no side effects.
    pub fn close_dialog(&mut self) {
        self.draft = None;
    }

    /// Turns the open draft into a command. On a rule violation the draft stays open, untouched.
    pub fn submit(&mut self) -> Result<Command, SessionError> {
        let draft = self.draft.as_ref().ok_or(SessionError::NoDraft)?;
        let command = match draft {
            Draft::NewJob(form) => {
                let job = job_draft(form)?;
                validate_job_draft(&job)?;
                Command::CreateJob(job)
            }
            Draft::EditJob { id, form } => {
                let patch = job_patch(form)?;
                validate_job_patch(&patch)?;
                Command::UpdateJob(*id, patch)
            }
            Draft::EditStudent { id, form } => {
                let patch = form.patch()?;
                validate_student_patch(&patch)?;
                Command::UpdateStudent(*id, patch)
            }
            Draft::OwnProfile { form, .. } => {
                let draft = form.draft()?;
                // user id is bound by the server; nil only exercises the field rules here
                validate_student_draft(Uuid::nil(), &draft)?;
                Command::SaveOwnStudent(draft)
            }
        };
        self.draft = None;
        Ok(command)
    }

    /// First step of a delete: nothing is issued until [`confirm_delete`](Self::confirm_delete).
    pub fn request_delete(&mut self, id: Uuid) -> Result<(), SessionError> {
        self.require(Action::Delete)?;
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Result<Command, SessionError> {
        let id = self
            .pending_delete
            .take()
            .ok_or(SessionError::NothingToConfirm)?;
        if self.selected_record_id == Some(id) {
            self.selected_record_id = None;
        }
        Ok(match self.active_module {
            Module::StudentManagement => Command::DeleteStudent(id),
            _ => Command::DeleteJob(id),
        })
    }

    fn reset(&mut self) {
        self.selected_record_id = None;
        self.draft = None;
        self.pending_delete = None;
    }
}

fn job_draft(form: &JobForm) -> Result<JobDraft, RuleViolation> {
    let applications = form
        .applications
        .trim()
        .parse::<i64>()
        .map_err(|_| RuleViolation::InvalidApplications(form.applications.clone()))?;
    Ok(JobDraft {
        company: form.company.clone(),
        title: form.title.clone(),
        description: form.description.clone(),
        location: form.location.clone(),
        salary: form.salary.clone(),
        skills: Some(SkillsInput::Delimited(form.skills.clone())),
        requirements: form.requirements.clone(),
        status: Some(form.status.clone()),
        applications: Some(applications),
    })
}

/// Edits resubmit every editable field; the counter is not one of them.
fn job_patch(form: &JobForm) -> Result<JobPatch, RuleViolation> {
    Ok(JobPatch {
        company: Some(form.company.clone()),
        title: Some(form.title.clone()),
        description: Some(form.description.clone()),
        location: Some(form.location.clone()),
        salary: Some(form.salary.clone()),
        skills: Some(SkillsInput::Delimited(form.skills.clone())),
        requirements: Some(form.requirements.clone()),
        status: Some(form.status.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobStatus;
    use chrono::Utc;

    fn identity(role: Option<Role>) -> IdentityContext {
        IdentityContext {
            user_id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            email: "test@campus.edu".to_string(),
            role,
        }
    }

    fn admin_session() -> ViewSession {
        ViewSession::for_identity(&identity(Some(Role::Admin))).unwrap()
    }

    fn student_session() -> ViewSession {
        ViewSession::for_identity(&identity(Some(Role::Student))).unwrap()
    }

    fn job() -> Job {
        Job {
            id: Uuid::new_v4(),
            company: "TechCorp".to_string(),
            title: "Software Engineer".to_string(),
            description: "Backend work".to_string(),
            location: "Bangalore".to_string(),
            salary: "8-12 LPA".to_string(),
            skills: vec!["Java".to_string(), "Spring".to_string()],
            requirements: String::new(),
            status: JobStatus::Active,
            applications: 47,
            created_at: Utc::now(),
        }
    }

    fn student() -> Student {
        Student {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            student_code: "CS21B045".to_string(),
            department: "Computer Science Engineering".to_string(),
            year_of_study: 3,
            cgpa: Some(8.5),
            phone: None,
            skills: vec!["Rust".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_role_gets_no_session() {
        assert!(ViewSession::for_identity(&identity(None)).is_none());
    }

    #[test]
    fn test_sessions_start_on_default_module() {
        assert_eq!(admin_session().active_module(), Module::Statistics);
        assert_eq!(student_session().active_module(), Module::JobListings);
    }

    #[test]
    fn test_select_foreign_module_is_refused_and_state_kept() {
        let mut session = student_session();
        session.toggle_selection(Uuid::new_v4());
        let before = session.clone();
        assert_eq!(
            session.select_module(Module::JobManagement),
            RouteDecision::Unauthorized
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_select_module_resets_selection_and_draft() {
        let mut session = admin_session();
        session.select_module(Module::JobManagement);
        session.toggle_selection(Uuid::new_v4());
        session.open_new_job().unwrap();

        session.select_module(Module::StudentManagement);
        assert_eq!(session.selected_record_id(), None);
        assert!(session.draft().is_none());
    }

    #[test]
    fn test_toggle_selection_expands_and_collapses() {
        let mut session = student_session();
        let id = Uuid::new_v4();
        session.toggle_selection(id);
        assert_eq!(session.selected_record_id(), Some(id));
        session.toggle_selection(id);
        assert_eq!(session.selected_record_id(), None);
    }

    #[test]
    fn test_edit_job_prefills_joined_skills() {
        let mut session = admin_session();
        session.select_module(Module::JobManagement);
        session.open_edit_job(&job()).unwrap();
        match session.draft() {
            Some(Draft::EditJob { form, .. }) => {
                assert_eq!(form.skills, "Java, Spring");
                assert_eq!(form.status, "active");
            }
            other => panic!("unexpected draft {other:?}"),
        }
    }

    #[test]
    fn test_close_dialog_discards_draft() {
        let mut session = admin_session();
        session.select_module(Module::JobManagement);
        session.open_new_job().unwrap();
        if let Some(Draft::NewJob(form)) = session.draft_mut() {
            form.company = "Half typed".to_string();
        }
        session.close_dialog();
        assert!(session.draft().is_none());
        assert!(matches!(session.submit(), Err(SessionError::NoDraft)));
    }

    #[test]
    fn test_submit_new_job_produces_create_command() {
        let mut session = admin_session();
        session.select_module(Module::JobManagement);
        session.open_new_job().unwrap();
        if let Some(Draft::NewJob(form)) = session.draft_mut() {
            form.company = "DataFlow Inc".to_string();
            form.title = "Data Scientist".to_string();
            form.location = "Hyderabad".to_string();
            form.skills = "Python, ML, , TensorFlow".to_string();
        }
        let command = session.submit().unwrap();
        assert!(matches!(command, Command::CreateJob(_)));
        assert!(session.draft().is_none());
    }

    #[test]
    fn test_invalid_submit_keeps_draft_intact() {
        let mut session = admin_session();
        session.select_module(Module::JobManagement);
        session.open_edit_job(&job()).unwrap();
        if let Some(Draft::EditJob { form, .. }) = session.draft_mut() {
            form.status = "paused".to_string();
        }
        let before = session.draft().cloned();
        assert!(matches!(session.submit(), Err(SessionError::Invalid(_))));
        assert_eq!(session.draft().cloned(), before);
    }

    #[test]
    fn test_admin_cannot_open_student_create_dialog() {
        let mut session = admin_session();
        session.select_module(Module::StudentManagement);
        assert!(session.open_new_job().is_err());
        assert!(session.open_own_profile(None).is_err());
        assert!(session.open_edit_student(&student()).is_ok());
    }

    #[test]
    fn test_student_form_year_must_be_numeric() {
        let mut session = admin_session();
        session.select_module(Module::StudentManagement);
        session.open_edit_student(&student()).unwrap();
        if let Some(Draft::EditStudent { form, .. }) = session.draft_mut() {
            form.year_of_study = "third".to_string();
        }
        assert!(matches!(
            session.submit(),
            Err(SessionError::Invalid(RuleViolation::NotANumber { .. }))
        ));
    }

    #[test]
    fn test_own_profile_first_save_is_blank_form() {
        let mut session = student_session();
        session.select_module(Module::OwnProfile);
        session.open_own_profile(None).unwrap();
        assert_eq!(
            session.draft(),
            Some(&Draft::OwnProfile {
                existing: None,
                form: StudentForm::blank()
            })
        );
    }

    #[test]
    fn test_own_profile_submit_saves_own_record() {
        let mut session = student_session();
        session.select_module(Module::OwnProfile);
        let mine = student();
        session.open_own_profile(Some(&mine)).unwrap();
        let command = session.submit().unwrap();
        assert!(matches!(command, Command::SaveOwnStudent(_)));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut session = admin_session();
        session.select_module(Module::StudentManagement);
        let id = Uuid::new_v4();
        session.toggle_selection(id);

        assert!(matches!(
            session.confirm_delete(),
            Err(SessionError::NothingToConfirm)
        ));
        session.request_delete(id).unwrap();
        session.cancel_delete();
        assert!(session.confirm_delete().is_err());

        session.request_delete(id).unwrap();
        match session.confirm_delete().unwrap() {
            Command::DeleteStudent(deleted) => assert_eq!(deleted, id),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(session.selected_record_id(), None);
    }

    #[test]
    fn test_student_cannot_request_delete() {
        let mut session = student_session();
        assert!(session.request_delete(Uuid::new_v4()).is_err());
    }
}
