//! Window state without the drawing
//!
//! Holds the view model, the open modals and the jobs waiting for the API
//! worker. Confirmations and follow-ups after a mutation are decided by
//! [`Mutation`], the same way the command-line controllers decide them.

use log::{debug, info, warn};

use reqtrace_core::{
    Action, Api, ApiClient, ApiError, DescriptionView, ExportKind, HistoryTable, LinkForm, Mutation,
    Project, ProjectForm, ProjectId, Reload, RenderedView, RequirementDetail, RequirementForm,
    RequirementId, ViewMode, ViewModel,
};

use crate::mind_map::MindMap;
use crate::worker::{Job, JobResult, Purpose};

/// A mutation waiting for the user's answer
pub struct PendingConfirm {
    pub message: String,
    pub job: Job,
}

pub struct Session {
    /// Unscoped client; export URLs are built from it
    api: ApiClient,
    default_author: String,
    outbox: Vec<Job>,

    pub view: ViewModel,
    pub rendered: Option<RenderedView>,
    /// Graph instance behind the mind map, present only while it is shown
    pub mind_map: Option<MindMap>,
    pub loading: bool,

    pub projects: Vec<Project>,
    pub selected_project: Option<ProjectId>,
    pub show_projects: bool,

    // Modal state
    pub requirement_form: Option<RequirementForm>,
    pub link_form: Option<LinkForm>,
    pub detail: Option<RequirementDetail>,
    pub description: Option<DescriptionView>,
    pub history: Option<(RequirementId, HistoryTable)>,
    pub project_form: Option<ProjectForm>,
    pub confirm: Option<PendingConfirm>,
    pub alert: Option<String>,
}

impl Session {
    /// Queues the project list, and the requirements when a project is open
    pub fn new(api: ApiClient, default_author: String) -> Self {
        let selected_project = api.project_id();
        let mut session = Self {
            api,
            default_author,
            outbox: Vec::new(),
            view: ViewModel::new(),
            rendered: None,
            mind_map: None,
            loading: false,
            projects: Vec::new(),
            selected_project,
            show_projects: selected_project.is_none(),
            requirement_form: None,
            link_form: None,
            detail: None,
            description: None,
            history: None,
            project_form: None,
            confirm: None,
            alert: None,
        };

        session.outbox.push(Job::LoadProjects);
        if selected_project.is_some() {
            session.reload();
        }
        session
    }

    /// Jobs queued since the last call, oldest first
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.outbox)
    }

    /// Issue a full reload; only the newest one is applied
    pub fn reload(&mut self) {
        let ticket = self.view.begin_load();
        self.loading = true;
        self.outbox.push(Job::LoadRequirements(ticket));
    }

    pub fn fail(&mut self, context: &str, message: &str) {
        warn!("{}: {}", context, message);
        self.alert = Some(format!("{}: {}", context, message));
    }

    /// Show a freshly rendered view. The old graph instance is dropped
    /// before a new one is built.
    fn show(&mut self, rendered: RenderedView) {
        self.mind_map = None;
        if let RenderedView::MindMap(graph) = &rendered {
            self.mind_map = Some(MindMap::new(graph));
        }
        self.rendered = Some(rendered);
    }

    pub fn switch_view(&mut self, mode: ViewMode) {
        let rendered = self.view.switch_view(mode);
        self.show(rendered);
    }

    pub fn select_project(&mut self, project_id: Option<ProjectId>) {
        info!("Switching to project {:?}", project_id);
        self.selected_project = project_id;
        self.outbox.push(Job::SelectProject(project_id));

        // Open modals belong to the previous project
        self.requirement_form = None;
        self.link_form = None;
        self.detail = None;
        self.description = None;
        self.history = None;

        match project_id {
            Some(_) => self.reload(),
            None => {
                // Also invalidates any load still in flight
                let ticket = self.view.begin_load();
                self.loading = false;
                if let Some(rendered) = self.view.apply_load(ticket, Vec::new()) {
                    self.show(rendered);
                }
            }
        }
    }

    pub fn export_url(&self, kind: ExportKind) -> Result<String, ApiError> {
        self.api
            .for_project(self.selected_project)
            .export_url(kind)
            .map(|url| url.to_string())
    }

    pub fn open_add_form(&mut self) {
        self.requirement_form = Some(RequirementForm {
            author: self.default_author.clone(),
            ..RequirementForm::blank()
        });
    }

    /// The form stays open until the backend accepts it
    pub fn submit_requirement_form(&mut self) {
        if let Some(form) = &self.requirement_form {
            let job = Job::SaveRequirement(form.id, form.to_draft());
            self.request(Mutation::SaveRequirement, job);
        }
    }

    pub fn submit_link_form(&mut self) {
        let Some(form) = &self.link_form else {
            return;
        };
        match form.to_new_link() {
            Ok(link) => self.request(Mutation::CreateLink, Job::CreateLink(link)),
            Err(e) => self.alert = Some(e.to_string()),
        }
    }

    /// A missing name is reported inline and sends nothing
    pub fn submit_project_form(&mut self) {
        let Some(form) = self.project_form.as_mut() else {
            return;
        };
        if let Ok(draft) = form.validate() {
            let job = Job::SaveProject(form.id, draft);
            self.request(Mutation::SaveProject, job);
        }
    }

    /// Ask first when the mutation needs it, otherwise queue the job
    fn request(&mut self, mutation: Mutation, job: Job) {
        match mutation.confirmation(&self.projects) {
            Some(message) => self.confirm = Some(PendingConfirm { message, job }),
            None => self.outbox.push(job),
        }
    }

    /// The user's answer to the pending confirmation
    pub fn answer(&mut self, confirmed: bool) {
        let Some(pending) = self.confirm.take() else {
            return;
        };
        if confirmed {
            self.outbox.push(pending.job);
        } else {
            debug!("Declined: {}", pending.message);
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!("Dispatching {:?}", action);
        match action {
            Action::OpenDetail(id) => self.outbox.push(Job::FetchRequirement(id, Purpose::Detail)),
            Action::OpenDescription(id) => match self.view.find(id) {
                Some(req) => self.description = Some(DescriptionView::new(req)),
                None => self
                    .outbox
                    .push(Job::FetchRequirement(id, Purpose::Description)),
            },
            Action::Edit(id) => self.outbox.push(Job::FetchRequirement(id, Purpose::Edit)),
            Action::Delete(id) => {
                self.request(Mutation::DeleteRequirement(id), Job::DeleteRequirement(id))
            }
            Action::AddLink(id) => {
                self.link_form = Some(LinkForm::new(id, self.view.requirements()));
            }
            Action::History(id) => self.outbox.push(Job::FetchHistory(id)),
            Action::DeleteLink(id) => self.request(Mutation::DeleteLink(id), Job::DeleteLink(id)),
            Action::OpenProject(id) => {
                self.select_project(Some(id));
                self.show_projects = false;
            }
            Action::EditProject(id) => {
                if let Some(project) = self.projects.iter().find(|p| p.id == id) {
                    self.project_form = Some(ProjectForm::from_project(project));
                }
            }
            Action::DeleteProject(id) => {
                self.request(Mutation::DeleteProject(id), Job::DeleteProject(id))
            }
        }
    }

    pub fn handle_result(&mut self, result: JobResult) {
        match result {
            JobResult::Requirements(ticket, Ok(requirements)) => {
                if let Some(rendered) = self.view.apply_load(ticket, requirements) {
                    self.loading = false;
                    self.show(rendered);
                }
            }
            JobResult::Requirements(ticket, Err(message)) => {
                if self.view.is_current(ticket) {
                    self.loading = false;
                    self.fail("Failed to load requirements", &message);
                }
            }
            JobResult::Requirement(purpose, Ok(req)) => match purpose {
                Purpose::Detail => {
                    self.detail = Some(RequirementDetail::new(req, self.view.requirements()));
                }
                Purpose::Description => self.description = Some(DescriptionView::new(&req)),
                Purpose::Edit => self.requirement_form = Some(RequirementForm::from_requirement(&req)),
            },
            JobResult::Requirement(_, Err(message)) => {
                self.fail("Failed to load requirement", &message);
            }
            JobResult::History(id, Ok(entries)) => {
                self.history = Some((id, HistoryTable::from_entries(&entries)));
            }
            JobResult::History(_, Err(message)) => self.fail("Failed to load history", &message),
            JobResult::Mutated(mutation, Ok(())) => self.mutated(mutation),
            JobResult::Mutated(mutation, Err(message)) => self.mutation_failed(mutation, message),
            JobResult::Projects(Ok(projects)) => self.projects = projects,
            JobResult::Projects(Err(message)) => self.fail("Failed to load projects", &message),
        }
    }

    fn mutated(&mut self, mutation: Mutation) {
        info!("{:?} succeeded", mutation);

        // Close the modal the change was made from
        match mutation {
            Mutation::SaveRequirement => self.requirement_form = None,
            Mutation::CreateLink => self.link_form = None,
            Mutation::DeleteRequirement(id) => {
                if self.detail.as_ref().map(|d| d.requirement.id) == Some(id) {
                    self.detail = None;
                }
            }
            // The open detail lists the deleted link
            Mutation::DeleteLink(_) => self.detail = None,
            Mutation::SaveProject => self.project_form = None,
            Mutation::DeleteProject(_) => {}
        }

        let follow_up = mutation.follow_up(self.selected_project);
        if follow_up.clear_scope {
            self.select_project(None);
        }
        match follow_up.reload {
            Reload::Requirements => self.reload(),
            Reload::Projects => self.outbox.push(Job::LoadProjects),
        }
    }

    fn mutation_failed(&mut self, mutation: Mutation, message: String) {
        if mutation.reports_inline() {
            if let Some(form) = self.project_form.as_mut() {
                warn!("{}: {}", mutation.failure_context(), message);
                form.error = Some(message);
                return;
            }
        }
        self.fail(mutation.failure_context(), &message);
    }
}
