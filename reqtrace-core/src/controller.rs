//! Requirement flows
//!
//! [`Controller`] runs each user flow against an [`Api`]: submit or delete,
//! then exactly one full reload. Confirmations and error alerts go through
//! the [`Dialogs`] seam so front-ends decide how they look.

use log::{info, warn};

use crate::actions::Action;
use crate::api::{Api, ApiError};
use crate::detail::{DescriptionView, RequirementDetail};
use crate::flow::{Mutation, Reload};
use crate::forms::{LinkForm, RequirementForm};
use crate::history::HistoryTable;
use crate::models::{LinkId, RequirementId};
use crate::view::{RenderedView, ViewMode, ViewModel};

/// Blocking prompts shown to the user
pub trait Dialogs {
    /// Ask a yes/no question; `true` means proceed
    fn confirm(&self, message: &str) -> bool;

    /// Report an error
    fn alert(&self, message: &str);
}

/// Result of a mutating flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The change was accepted and the requirement list reloaded
    Reloaded,
    /// The user declined the confirmation; nothing was sent
    Cancelled,
    /// The backend or the form rejected the change
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Reloaded)
    }
}

/// What a dispatched action asks the front-end to show
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Detail(RequirementDetail),
    Description(DescriptionView),
    History {
        id: RequirementId,
        table: HistoryTable,
    },
    RequirementForm(RequirementForm),
    LinkForm(LinkForm),
    /// A mutation finished
    Done(Outcome),
    /// Project actions belong to the projects controller
    Project(Action),
    /// The action failed; the error was already alerted
    Nothing,
}

pub struct Controller<A: Api, D: Dialogs> {
    api: A,
    dialogs: D,
    view: ViewModel,
    rendered: Option<RenderedView>,
}

impl<A: Api, D: Dialogs> Controller<A, D> {
    pub fn new(api: A, dialogs: D) -> Self {
        Self {
            api,
            dialogs,
            view: ViewModel::new(),
            rendered: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Last rendered view, if any load succeeded
    pub fn rendered(&self) -> Option<&RenderedView> {
        self.rendered.as_ref()
    }

    fn fail(&self, context: &str, err: ApiError) -> Outcome {
        let message = err.to_string();
        warn!("{}: {} (status {:?})", context, message, err.status());
        self.dialogs.alert(&format!("{}: {}", context, message));
        Outcome::Failed(message)
    }

    /// `false` when the user declined the mutation's confirmation
    fn confirmed(&self, mutation: Mutation) -> bool {
        match mutation.confirmation(&[]) {
            Some(question) => self.dialogs.confirm(&question),
            None => true,
        }
    }

    /// Alert on failure, otherwise run the mutation's follow-up
    fn complete(&mut self, mutation: Mutation, result: Result<(), ApiError>) -> Outcome {
        if let Err(err) = result {
            return self.fail(mutation.failure_context(), err);
        }
        match mutation.follow_up(self.api.project_id()).reload {
            Reload::Requirements => self.reload(),
            // Project lists belong to the projects controller
            Reload::Projects => Outcome::Reloaded,
        }
    }

    /// Fetch the requirement list and re-render the active view
    pub fn reload(&mut self) -> Outcome {
        match self.view.load_requirements(&self.api) {
            Ok(rendered) => {
                if let Some(rendered) = rendered {
                    self.rendered = Some(rendered);
                }
                Outcome::Reloaded
            }
            Err(err) => self.fail("Failed to load requirements", err),
        }
    }

    pub fn switch_view(&mut self, mode: ViewMode) -> &RenderedView {
        self.rendered.insert(self.view.switch_view(mode))
    }

    /// POST a new requirement or PUT an edited one
    pub fn submit_requirement(&mut self, form: &RequirementForm) -> Outcome {
        let draft = form.to_draft();
        let result = match form.id {
            Some(id) => self.api.update_requirement(id, &draft),
            None => self.api.create_requirement(&draft),
        };
        let result = result.map(|saved| info!("Saved requirement #{}", saved.id));
        self.complete(Mutation::SaveRequirement, result)
    }

    pub fn delete_requirement(&mut self, id: RequirementId) -> Outcome {
        let mutation = Mutation::DeleteRequirement(id);
        if !self.confirmed(mutation) {
            return Outcome::Cancelled;
        }
        let result = self
            .api
            .delete_requirement(id)
            .map(|()| info!("Deleted requirement #{}", id));
        self.complete(mutation, result)
    }

    pub fn submit_link(&mut self, form: &LinkForm) -> Outcome {
        let link = match form.to_new_link() {
            Ok(link) => link,
            Err(err) => {
                let message = err.to_string();
                self.dialogs.alert(&message);
                return Outcome::Failed(message);
            }
        };
        let result = self
            .api
            .create_link(&link)
            .map(|_| info!("Linked #{} -> #{}", link.source_id, link.target_id));
        self.complete(Mutation::CreateLink, result)
    }

    pub fn delete_link(&mut self, id: LinkId) -> Outcome {
        let mutation = Mutation::DeleteLink(id);
        if !self.confirmed(mutation) {
            return Outcome::Cancelled;
        }
        let result = self.api.delete_link(id);
        self.complete(mutation, result)
    }

    /// Fetch a requirement and resolve its links against the cache
    pub fn open_detail(&self, id: RequirementId) -> Option<RequirementDetail> {
        match self.api.get_requirement(id) {
            Ok(req) => Some(RequirementDetail::new(req, self.view.requirements())),
            Err(err) => {
                self.fail("Failed to load requirement", err);
                None
            }
        }
    }

    /// Description view, served from the cache when possible
    pub fn open_description(&self, id: RequirementId) -> Option<DescriptionView> {
        if let Some(req) = self.view.find(id) {
            return Some(DescriptionView::new(req));
        }
        match self.api.get_requirement(id) {
            Ok(req) => Some(DescriptionView::new(&req)),
            Err(err) => {
                self.fail("Failed to load requirement", err);
                None
            }
        }
    }

    pub fn open_history(&self, id: RequirementId) -> Option<HistoryTable> {
        match self.api.requirement_history(id) {
            Ok(entries) => Some(HistoryTable::from_entries(&entries)),
            Err(err) => {
                self.fail("Failed to load history", err);
                None
            }
        }
    }

    /// Edit form populated from a fresh copy of the requirement
    pub fn edit_form(&self, id: RequirementId) -> Option<RequirementForm> {
        match self.api.get_requirement(id) {
            Ok(req) => Some(RequirementForm::from_requirement(&req)),
            Err(err) => {
                self.fail("Failed to load requirement", err);
                None
            }
        }
    }

    /// Link form whose targets come from a fresh requirement list
    pub fn link_form(&self, source: RequirementId) -> Option<LinkForm> {
        match self.api.list_requirements() {
            Ok(requirements) => Some(LinkForm::new(source, &requirements)),
            Err(err) => {
                self.fail("Failed to load requirements", err);
                None
            }
        }
    }

    /// Route an action to its flow
    pub fn dispatch(&mut self, action: Action) -> Screen {
        let screen = match action {
            Action::OpenDetail(id) => self.open_detail(id).map(Screen::Detail),
            Action::OpenDescription(id) => self.open_description(id).map(Screen::Description),
            Action::Edit(id) => self.edit_form(id).map(Screen::RequirementForm),
            Action::Delete(id) => Some(Screen::Done(self.delete_requirement(id))),
            Action::AddLink(id) => self.link_form(id).map(Screen::LinkForm),
            Action::History(id) => self
                .open_history(id)
                .map(|table| Screen::History { id, table }),
            Action::DeleteLink(id) => Some(Screen::Done(self.delete_link(id))),
            Action::OpenProject(_) | Action::EditProject(_) | Action::DeleteProject(_) => {
                Some(Screen::Project(action))
            }
        };
        screen.unwrap_or(Screen::Nothing)
    }
}
