//! In-memory test doubles for the API and dialog seams

use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::api::{Api, ApiError};
use crate::controller::Dialogs;
use crate::models::{
    HistoryEntry, Link, LinkId, MatrixResponse, NewLink, Project, ProjectDraft, ProjectId,
    Requirement, RequirementDraft, RequirementId,
};

/// A call received by [`FakeBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: &'static str,
    pub body: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    requirements: Vec<Requirement>,
    projects: Vec<Project>,
    history: BTreeMap<RequirementId, Vec<HistoryEntry>>,
    next_id: i64,
    calls: Vec<Call>,
    failures: HashMap<&'static str, ApiError>,
}

/// Backend double keeping requirements, links and projects in memory
pub struct FakeBackend {
    project_id: Option<ProjectId>,
    state: RefCell<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            project_id: Some(1),
            state: RefCell::new(FakeState {
                next_id: 100,
                ..FakeState::default()
            }),
        }
    }

    pub fn with_requirements(requirements: Vec<Requirement>) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().requirements = requirements;
        backend
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().projects = projects;
        backend
    }

    pub fn without_project(mut self) -> Self {
        self.project_id = None;
        self
    }

    pub fn set_history(&self, id: RequirementId, entries: Vec<HistoryEntry>) {
        self.state.borrow_mut().history.insert(id, entries);
    }

    /// Make the next call named `name` fail with an HTTP error
    pub fn fail_next(&self, name: &'static str, status: u16, message: &str) {
        self.state.borrow_mut().failures.insert(
            name,
            ApiError::from_status(status, Some(serde_json::json!({ "error": message }))),
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.name == name)
            .count()
    }

    pub fn requirements(&self) -> Vec<Requirement> {
        self.state.borrow().requirements.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state.borrow().projects.clone()
    }

    fn record<B: Serialize>(&self, name: &'static str, body: Option<&B>) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call {
            name,
            body: body.and_then(|b| serde_json::to_value(b).ok()),
        });
        match state.failures.remove(name) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn scoped<B: Serialize>(&self, name: &'static str, body: Option<&B>) -> Result<(), ApiError> {
        if self.project_id.is_none() {
            return Err(ApiError::NoProject);
        }
        self.record(name, body)
    }

    fn next_id(&self) -> i64 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }

    fn not_found() -> ApiError {
        ApiError::from_status(404, Some(serde_json::json!({ "error": "Not found" })))
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_draft(req: &mut Requirement, draft: &RequirementDraft) {
    req.title = draft.title.clone();
    req.description = draft.description.clone();
    req.requirement_type = draft.requirement_type.clone();
    req.status = draft.status.clone();
    req.priority = draft.priority.clone();
    req.source = draft.source.clone();
    req.author = draft.author.clone();
}

impl Api for FakeBackend {
    fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    fn list_requirements(&self) -> Result<Vec<Requirement>, ApiError> {
        self.scoped::<()>("list_requirements", None)?;
        Ok(self.requirements())
    }

    fn get_requirement(&self, id: RequirementId) -> Result<Requirement, ApiError> {
        self.scoped::<()>("get_requirement", None)?;
        self.state
            .borrow()
            .requirements
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    fn create_requirement(&self, draft: &RequirementDraft) -> Result<Requirement, ApiError> {
        self.scoped("create_requirement", Some(draft))?;
        let mut req = Requirement::new(self.next_id(), "");
        apply_draft(&mut req, draft);
        self.state.borrow_mut().requirements.push(req.clone());
        Ok(req)
    }

    fn update_requirement(
        &self,
        id: RequirementId,
        draft: &RequirementDraft,
    ) -> Result<Requirement, ApiError> {
        self.scoped("update_requirement", Some(draft))?;
        let mut state = self.state.borrow_mut();
        let req = state
            .requirements
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(Self::not_found)?;
        apply_draft(req, draft);
        Ok(req.clone())
    }

    fn delete_requirement(&self, id: RequirementId) -> Result<(), ApiError> {
        self.scoped::<()>("delete_requirement", None)?;
        let mut state = self.state.borrow_mut();
        let before = state.requirements.len();
        state.requirements.retain(|r| r.id != id);
        if state.requirements.len() == before {
            return Err(Self::not_found());
        }
        for req in &mut state.requirements {
            req.outgoing_links.retain(|l| l.target_requirement_id != id);
            req.incoming_links.retain(|l| l.source_requirement_id != id);
        }
        Ok(())
    }

    fn requirement_history(&self, id: RequirementId) -> Result<Vec<HistoryEntry>, ApiError> {
        self.scoped::<()>("requirement_history", None)?;
        Ok(self
            .state
            .borrow()
            .history
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    fn create_link(&self, link: &NewLink) -> Result<Link, ApiError> {
        self.scoped("create_link", Some(link))?;
        let created = Link {
            id: Some(self.next_id()),
            source_requirement_id: link.source_id,
            target_requirement_id: link.target_id,
            link_type: link.link_type.clone(),
        };
        let mut state = self.state.borrow_mut();
        for req in &mut state.requirements {
            if req.id == link.source_id {
                req.outgoing_links.push(created.clone());
            }
            if req.id == link.target_id {
                req.incoming_links.push(created.clone());
            }
        }
        Ok(created)
    }

    fn delete_link(&self, id: LinkId) -> Result<(), ApiError> {
        self.record::<()>("delete_link", None)?;
        let mut state = self.state.borrow_mut();
        for req in &mut state.requirements {
            req.outgoing_links.retain(|l| l.id != Some(id));
            req.incoming_links.retain(|l| l.id != Some(id));
        }
        Ok(())
    }

    fn matrix(&self) -> Result<MatrixResponse, ApiError> {
        self.scoped::<()>("matrix", None)?;
        let requirements = self.requirements();
        let mut matrix: BTreeMap<String, BTreeMap<String, _>> = BTreeMap::new();
        for req in &requirements {
            for link in &req.outgoing_links {
                matrix
                    .entry(req.id.to_string())
                    .or_default()
                    .insert(link.target_requirement_id.to_string(), link.link_type.clone());
            }
        }
        Ok(MatrixResponse {
            requirements,
            matrix,
        })
    }

    fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.record::<()>("list_projects", None)?;
        Ok(self.projects())
    }

    fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.record("create_project", Some(draft))?;
        let project = Project {
            id: self.next_id(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            created_at: None,
        };
        self.state.borrow_mut().projects.push(project.clone());
        Ok(project)
    }

    fn update_project(&self, id: ProjectId, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.record("update_project", Some(draft))?;
        let mut state = self.state.borrow_mut();
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(Self::not_found)?;
        project.name = draft.name.clone();
        project.description = draft.description.clone();
        Ok(project.clone())
    }

    fn delete_project(&self, id: ProjectId) -> Result<(), ApiError> {
        self.record::<()>("delete_project", None)?;
        self.state.borrow_mut().projects.retain(|p| p.id != id);
        Ok(())
    }
}

/// Dialogs answering confirmations from a script and recording every prompt
#[derive(Default)]
pub struct ScriptedDialogs {
    answers: RefCell<VecDeque<bool>>,
    pub confirms: RefCell<Vec<String>>,
    pub alerts: RefCell<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn confirms(&self) -> Vec<String> {
        self.confirms.borrow().clone()
    }
}

impl Dialogs for ScriptedDialogs {
    fn confirm(&self, message: &str) -> bool {
        self.confirms.borrow_mut().push(message.to_string());
        // Unscripted confirmations are declined
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}
