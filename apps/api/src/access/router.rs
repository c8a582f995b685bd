//! Pure mapping from (role claim, requested module) to the view a
//! session may render.
//!
//! Admin capability set: statistics, job management (full CRUD), student
//! management (no create: records come from the student's own profile flow).
//! Student capability set: job listings (read + apply), own profile, and the
//! applications / interviews / resume-scan placeholders.

use std::fmt;

use serde::Serialize;

use crate::models::profile::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Statistics,
    JobManagement,
    StudentManagement,
    JobListings,
    OwnProfile,
    Applications,
    Interviews,
    ResumeScan,
}

impl Module {
    pub const ALL: [Module; 8] = [
        Module::Statistics,
        Module::JobManagement,
        Module::StudentManagement,
        Module::JobListings,
        Module::OwnProfile,
        Module::Applications,
        Module::Interviews,
        Module::ResumeScan,
    ];

    /// Menu token used by the dashboards.
    pub fn token(&self) -> &'static str {
        match self {
            Module::Statistics => "stats",
            Module::JobManagement => "jobs",
            Module::StudentManagement => "students",
            Module::JobListings => "job-listings",
            Module::OwnProfile => "profile",
            Module::Applications => "applications",
            Module::Interviews => "interviews",
            Module::ResumeScan => "resume",
        }
    }

    pub fn from_token(token: &str) -> Option<Module> {
        Module::ALL.into_iter().find(|m| m.token() == token)
    }

    pub fn owner(&self) -> Role {
        match self {
            Module::Statistics | Module::JobManagement | Module::StudentManagement => Role::Admin,
            Module::JobListings
            | Module::OwnProfile
            | Module::Applications
            | Module::Interviews
            | Module::ResumeScan => Role::Student,
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// What a caller wants to do inside a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    Read,
    Create,
    Update,
    Delete,
    Apply,
}

/// Concrete screen to render for a permitted module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    AdminStatistics,
    AdminJobManagement,
    AdminStudentManagement,
    StudentJobListings,
    StudentProfile,
    ApplicationsPlaceholder,
    InterviewsPlaceholder,
    ResumeScanner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "view", rename_all = "snake_case")]
pub enum RouteDecision {
    Render(View),
    /// Role is known but the module or action is outside its capability set.
    Unauthorized,
    /// No usable role claim: send the caller back to sign-in.
    Reauthenticate,
}

fn view_for(module: Module) -> View {
    match module {
        Module::Statistics => View::AdminStatistics,
        Module::JobManagement => View::AdminJobManagement,
        Module::StudentManagement => View::AdminStudentManagement,
        Module::JobListings => View::StudentJobListings,
        Module::OwnProfile => View::StudentProfile,
        Module::Applications => View::ApplicationsPlaceholder,
        Module::Interviews => View::InterviewsPlaceholder,
        Module::ResumeScan => View::ResumeScanner,
    }
}

fn actions_for(module: Module) -> &'static [Action] {
    use Action::*;
    match module {
        Module::Statistics => &[List, Read],
        Module::JobManagement => &[List, Read, Create, Update, Delete],
        Module::StudentManagement => &[List, Read, Update, Delete],
        Module::JobListings => &[List, Read, Apply],
        Module::OwnProfile => &[Read, Create, Update],
        Module::Applications | Module::Interviews => &[List, Read],
        Module::ResumeScan => &[Create],
    }
}

pub fn default_module(role: Role) -> Module {
    match role {
        Role::Admin => Module::Statistics,
        Role::Student => Module::JobListings,
    }
}

pub fn modules_for(role: Role) -> Vec<Module> {
    Module::ALL
        .into_iter()
        .filter(|m| m.owner() == role)
        .collect()
}

pub fn route(role: Option<Role>, module: Module) -> RouteDecision {
    let Some(role) = role else {
        return RouteDecision::Reauthenticate;
    };
    if module.owner() != role {
        return RouteDecision::Unauthorized;
    }
    RouteDecision::Render(view_for(module))
}

/// Routes a raw menu token. Unknown tokens are never rendered.
pub fn route_token(role: Option<Role>, token: &str) -> RouteDecision {
    if role.is_none() {
        return RouteDecision::Reauthenticate;
    }
    match Module::from_token(token) {
        Some(module) => route(role, module),
        None => RouteDecision::Unauthorized,
    }
}

/// Routes the module, then checks the action against the module's capability set.
pub fn authorize(role: Option<Role>, module: Module, action: Action) -> RouteDecision {
    match route(role, module) {
        RouteDecision::Render(view) if actions_for(module).contains(&action) => {
            RouteDecision::Render(view)
        }
        RouteDecision::Render(_) => RouteDecision::Unauthorized,
        other => other,
    }
}
