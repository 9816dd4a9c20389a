//! Project management
//!
//! One controller for listing, creating, editing, deleting and opening
//! projects. Form errors are reported inline on the form rather than through
//! an alert.

use log::{info, warn};

use crate::actions::Action;
use crate::api::{Api, ApiError};
use crate::controller::{Dialogs, Outcome};
use crate::flow::{Mutation, Reload};
use crate::forms::ProjectForm;
use crate::models::{Project, ProjectId};
use crate::render::project_grid_html;

pub struct ProjectsController<A: Api, D: Dialogs> {
    api: A,
    dialogs: D,
    projects: Vec<Project>,
    selected: Option<ProjectId>,
}

impl<A: Api, D: Dialogs> ProjectsController<A, D> {
    pub fn new(api: A, dialogs: D) -> Self {
        let selected = api.project_id();
        Self {
            api,
            dialogs,
            projects: Vec::new(),
            selected,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn find(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Project whose requirements are being viewed
    pub fn selected(&self) -> Option<ProjectId> {
        self.selected
    }

    pub fn to_html(&self) -> String {
        project_grid_html(&self.projects)
    }

    pub fn load(&mut self) -> Outcome {
        match self.api.list_projects() {
            Ok(projects) => {
                self.projects = projects;
                Outcome::Reloaded
            }
            Err(err) => {
                let message = err.to_string();
                warn!("Failed to load projects: {}", message);
                self.dialogs
                    .alert(&format!("Failed to load projects: {}", message));
                Outcome::Failed(message)
            }
        }
    }

    /// Create or update from the form, then reload the list.
    ///
    /// Validation and backend errors land in `form.error`; nothing is sent
    /// when the name is empty.
    pub fn submit(&mut self, form: &mut ProjectForm) -> Outcome {
        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(err) => return Outcome::Failed(err.to_string()),
        };

        let result = match form.id {
            Some(id) => self.api.update_project(id, &draft),
            None => self.api.create_project(&draft),
        };
        let result = result.map(|project| {
            info!("Saved project #{} ({})", project.id, project.name);
            form.error = None;
        });
        if let Err(err) = &result {
            form.error = Some(err.to_string());
        }
        self.complete(Mutation::SaveProject, result)
    }

    pub fn delete(&mut self, id: ProjectId) -> Outcome {
        let mutation = Mutation::DeleteProject(id);
        if let Some(question) = mutation.confirmation(&self.projects) {
            if !self.dialogs.confirm(&question) {
                return Outcome::Cancelled;
            }
        }
        let result = self
            .api
            .delete_project(id)
            .map(|()| info!("Deleted project #{}", id));
        self.complete(mutation, result)
    }

    /// Report a failure, otherwise run the mutation's follow-up
    fn complete(&mut self, mutation: Mutation, result: Result<(), ApiError>) -> Outcome {
        if let Err(err) = result {
            let message = err.to_string();
            warn!("{}: {}", mutation.failure_context(), message);
            if !mutation.reports_inline() {
                self.dialogs
                    .alert(&format!("{}: {}", mutation.failure_context(), message));
            }
            return Outcome::Failed(message);
        }

        let follow_up = mutation.follow_up(self.selected);
        if follow_up.clear_scope {
            info!("Project #{:?} is gone; no project selected", self.selected);
            self.selected = None;
        }
        match follow_up.reload {
            Reload::Projects => self.load(),
            // Requirement lists belong to the requirement controller
            Reload::Requirements => Outcome::Reloaded,
        }
    }

    /// Select a project as the active scope
    pub fn open(&mut self, id: ProjectId) -> Option<&Project> {
        let project = self.projects.iter().find(|p| p.id == id)?;
        self.selected = Some(id);
        Some(project)
    }

    /// Edit form for a listed project
    pub fn edit_form(&self, id: ProjectId) -> Option<ProjectForm> {
        self.find(id).map(ProjectForm::from_project)
    }

    /// Route a project action; returns the form to show for edits
    pub fn dispatch(&mut self, action: Action) -> Option<ProjectForm> {
        match action {
            Action::OpenProject(id) => {
                self.open(id);
                None
            }
            Action::EditProject(id) => self.edit_form(id),
            Action::DeleteProject(id) => {
                self.delete(id);
                None
            }
            other => {
                warn!("Not a project action: {}", other);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, ScriptedDialogs};
    use serde_json::json;

    fn project(id: ProjectId, name: &str) -> Project {
        Project {
            id,
            name: name.into(),
            description: String::new(),
            created_at: None,
        }
    }

    fn controller(answers: &[bool]) -> ProjectsController<FakeBackend, ScriptedDialogs> {
        let backend = FakeBackend::with_projects(vec![project(1, "Apollo"), project(2, "Gemini")]);
        let mut ctl = ProjectsController::new(backend, ScriptedDialogs::answering(answers));
        ctl.load();
        ctl
    }

    #[test]
    fn test_load_lists_projects() {
        let ctl = controller(&[]);
        assert_eq!(ctl.projects().len(), 2);
        assert_eq!(ctl.selected(), Some(1));
        assert!(ctl.to_html().contains("Gemini"));
    }

    #[test]
    fn test_empty_name_stays_inline_without_request() {
        let mut ctl = controller(&[]);
        let mut form = ProjectForm::blank();

        assert!(matches!(ctl.submit(&mut form), Outcome::Failed(_)));

        assert_eq!(form.error.as_deref(), Some(crate::forms::PROJECT_NAME_REQUIRED));
        assert_eq!(ctl.api().count("create_project"), 0);
        assert!(ctl.dialogs().alerts().is_empty());
    }

    #[test]
    fn test_create_then_reload() {
        let mut ctl = controller(&[]);
        let mut form = ProjectForm::blank();
        form.name = " Mercury ".into();

        assert_eq!(ctl.submit(&mut form), Outcome::Reloaded);

        let create = ctl
            .api()
            .calls()
            .into_iter()
            .find(|c| c.name == "create_project")
            .unwrap();
        assert_eq!(create.body, Some(json!({"name": "Mercury", "description": ""})));
        assert_eq!(ctl.api().count("list_projects"), 2);
        assert_eq!(ctl.projects().len(), 3);
    }

    #[test]
    fn test_backend_error_shown_inline() {
        let mut ctl = controller(&[]);
        ctl.api().fail_next("update_project", 400, "name required");
        let mut form = ctl.edit_form(2).unwrap();

        assert_eq!(
            ctl.submit(&mut form),
            Outcome::Failed("name required".into())
        );
        assert_eq!(form.error.as_deref(), Some("name required"));
        assert!(ctl.dialogs().alerts().is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut ctl = controller(&[false, true]);

        assert_eq!(ctl.delete(1), Outcome::Cancelled);
        assert_eq!(ctl.api().count("delete_project"), 0);

        assert_eq!(ctl.delete(1), Outcome::Reloaded);
        assert_eq!(ctl.api().count("delete_project"), 1);
        assert!(ctl.api().projects().iter().all(|p| p.id != 1));
        assert_eq!(ctl.selected(), None);
        assert!(ctl.dialogs().confirms()[0].contains("\"Apollo\""));
    }

    #[test]
    fn test_deleting_another_project_keeps_scope() {
        let mut ctl = controller(&[true]);

        assert_eq!(ctl.delete(2), Outcome::Reloaded);

        assert_eq!(ctl.selected(), Some(1));
        assert_eq!(ctl.api().count("list_projects"), 2);
        assert_eq!(ctl.projects().len(), 1);
    }

    #[test]
    fn test_delete_failure_is_alerted() {
        let mut ctl = controller(&[true]);
        ctl.api().fail_next("delete_project", 500, "locked");

        assert_eq!(ctl.delete(1), Outcome::Failed("locked".into()));

        assert_eq!(ctl.selected(), Some(1));
        assert_eq!(
            ctl.dialogs().alerts(),
            vec!["Failed to delete project: locked".to_string()]
        );
    }

    #[test]
    fn test_dispatch() {
        let mut ctl = controller(&[]);
        assert_eq!(ctl.dispatch(Action::OpenProject(2)), None);
        assert_eq!(ctl.selected(), Some(2));
        assert_eq!(
            ctl.dispatch(Action::EditProject(2)).map(|f| f.name),
            Some("Gemini".to_string())
        );
        assert_eq!(ctl.dispatch(Action::OpenProject(42)), None);
        assert_eq!(ctl.selected(), Some(2));
    }
}
