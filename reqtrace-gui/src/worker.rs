//! Background API worker
//!
//! Every backend call runs on one worker thread so the UI thread never
//! blocks. Jobs are processed in the order they are sent; each result is
//! posted back and the UI is asked to repaint so it polls the channel.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use reqtrace_core::{
    Api, ApiClient, HistoryEntry, LinkId, LoadTicket, Mutation, NewLink, Project, ProjectDraft,
    ProjectId, Requirement, RequirementDraft, RequirementId,
};

/// Why a single requirement is being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Detail,
    Description,
    Edit,
}

/// Commands sent to the worker
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    LoadRequirements(LoadTicket),
    FetchRequirement(RequirementId, Purpose),
    FetchHistory(RequirementId),
    SaveRequirement(Option<RequirementId>, RequirementDraft),
    DeleteRequirement(RequirementId),
    CreateLink(NewLink),
    DeleteLink(LinkId),
    LoadProjects,
    SaveProject(Option<ProjectId>, ProjectDraft),
    DeleteProject(ProjectId),
    /// Scope later requirement calls to another project
    SelectProject(Option<ProjectId>),
    Stop,
}

/// Results posted back to the UI thread; errors carry the backend message
#[derive(Debug)]
pub enum JobResult {
    Requirements(LoadTicket, Result<Vec<Requirement>, String>),
    Requirement(Purpose, Result<Requirement, String>),
    History(RequirementId, Result<Vec<HistoryEntry>, String>),
    Mutated(Mutation, Result<(), String>),
    Projects(Result<Vec<Project>, String>),
}

pub struct Worker {
    /// Handle to the background thread
    thread_handle: Option<JoinHandle<()>>,
    command_tx: mpsc::Sender<Job>,
    result_rx: mpsc::Receiver<JobResult>,
}

impl Worker {
    /// Start the worker thread; `ctx` is repainted after every result
    pub fn spawn(api: ApiClient, ctx: egui::Context) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();

        let thread_handle = thread::spawn(move || {
            worker_thread(api, command_rx, result_tx, ctx);
        });

        Self {
            thread_handle: Some(thread_handle),
            command_tx,
            result_rx,
        }
    }

    pub fn send(&self, job: Job) {
        debug!("Queueing {:?}", job);
        if self.command_tx.send(job).is_err() {
            warn!("API worker has stopped; job dropped");
        }
    }

    /// Results that arrived since the last poll, without blocking
    pub fn poll(&self) -> Vec<JobResult> {
        self.result_rx.try_iter().collect()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.command_tx.send(Job::Stop);

        // Wait for the in-flight request, if any
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_thread(
    mut api: ApiClient,
    command_rx: mpsc::Receiver<Job>,
    result_tx: mpsc::Sender<JobResult>,
    ctx: egui::Context,
) {
    while let Ok(job) = command_rx.recv() {
        let result = match job {
            Job::Stop => break,
            Job::SelectProject(project_id) => {
                api = api.for_project(project_id);
                continue;
            }
            job => match run(&api, job) {
                Some(result) => result,
                None => continue,
            },
        };

        if result_tx.send(result).is_err() {
            break;
        }
        ctx.request_repaint();
    }
    debug!("API worker stopped");
}

/// Perform one job against `api`; control jobs yield nothing
fn run<A: Api + ?Sized>(api: &A, job: Job) -> Option<JobResult> {
    let message = |e: reqtrace_core::ApiError| e.to_string();

    let result = match job {
        Job::LoadRequirements(ticket) => {
            JobResult::Requirements(ticket, api.list_requirements().map_err(message))
        }
        Job::FetchRequirement(id, purpose) => {
            JobResult::Requirement(purpose, api.get_requirement(id).map_err(message))
        }
        Job::FetchHistory(id) => {
            JobResult::History(id, api.requirement_history(id).map_err(message))
        }
        Job::SaveRequirement(id, draft) => {
            let result = match id {
                Some(id) => api.update_requirement(id, &draft),
                None => api.create_requirement(&draft),
            };
            JobResult::Mutated(Mutation::SaveRequirement, result.map(|_| ()).map_err(message))
        }
        Job::DeleteRequirement(id) => JobResult::Mutated(
            Mutation::DeleteRequirement(id),
            api.delete_requirement(id).map_err(message),
        ),
        Job::CreateLink(link) => JobResult::Mutated(
            Mutation::CreateLink,
            api.create_link(&link).map(|_| ()).map_err(message),
        ),
        Job::DeleteLink(id) => {
            JobResult::Mutated(Mutation::DeleteLink(id), api.delete_link(id).map_err(message))
        }
        Job::LoadProjects => JobResult::Projects(api.list_projects().map_err(message)),
        Job::SaveProject(id, draft) => {
            let result = match id {
                Some(id) => api.update_project(id, &draft),
                None => api.create_project(&draft),
            };
            let result = result.map(|project| debug!("Saved project #{}", project.id));
            JobResult::Mutated(Mutation::SaveProject, result.map_err(message))
        }
        Job::DeleteProject(id) => JobResult::Mutated(
            Mutation::DeleteProject(id),
            api.delete_project(id).map_err(message),
        ),
        Job::SelectProject(_) | Job::Stop => return None,
    };
    Some(result)
}
