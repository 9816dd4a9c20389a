pub mod actions;
pub mod api;
pub mod config;
pub mod controller;
pub mod detail;
pub mod flow;
pub mod forms;
pub mod graph;
pub mod history;
pub mod matrix;
pub mod models;
pub mod projects;
pub mod render;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use actions::{scan_actions, Action, ActionError};
pub use api::{Api, ApiClient, ApiError, ExportKind};
pub use config::{config_path, ClientConfig};
pub use controller::{Controller, Dialogs, Outcome, Screen};
pub use detail::{DescriptionView, LinkRow, RequirementDetail};
pub use flow::{FollowUp, Mutation, Reload};
pub use forms::{FormError, LinkForm, ProjectForm, RequirementForm};
pub use graph::{GraphEdge, GraphModel, GraphNode};
pub use history::{HistoryRow, HistoryTable};
pub use matrix::{Cell, TraceMatrix};
pub use models::{
    ChangeType, HistoryEntry, Link, LinkId, LinkType, MatrixResponse, NewLink, Project,
    ProjectDraft, ProjectId, Requirement, RequirementDraft, RequirementId, RequirementPriority,
    RequirementStatus, RequirementType,
};
pub use projects::ProjectsController;
pub use view::{LoadTicket, RenderedView, ViewMode, ViewModel};
