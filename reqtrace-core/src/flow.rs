//! Mutation flows
//!
//! Every change goes through the same steps: an optional confirmation, one
//! request, then a fixed follow-up. The blocking controllers and the GUI's
//! job queue both take those decisions from [`Mutation`].

use crate::models::{LinkId, Project, ProjectId, RequirementId};

pub fn delete_requirement_prompt(id: RequirementId) -> String {
    format!("Are you sure you want to delete requirement #{}?", id)
}

pub const DELETE_LINK_PROMPT: &str = "Are you sure you want to delete this link?";

pub fn delete_project_prompt(project: &Project) -> String {
    format!(
        "Delete project \"{}\"? Its requirements and links will be deleted too.",
        project.name
    )
}

/// A change sent to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Create or update, depending on the form
    SaveRequirement,
    DeleteRequirement(RequirementId),
    CreateLink,
    DeleteLink(LinkId),
    SaveProject,
    DeleteProject(ProjectId),
}

/// Which list is fetched again after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    Requirements,
    Projects,
}

/// What happens once a mutation succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    /// Exactly one reload of this list
    pub reload: Reload,
    /// The open project no longer exists; requirement calls lose their scope
    pub clear_scope: bool,
}

impl Mutation {
    /// Question to ask before sending; `None` sends right away.
    ///
    /// Project prompts name the project when it is in `projects`.
    pub fn confirmation(&self, projects: &[Project]) -> Option<String> {
        match self {
            Mutation::DeleteRequirement(id) => Some(delete_requirement_prompt(*id)),
            Mutation::DeleteLink(_) => Some(DELETE_LINK_PROMPT.to_string()),
            Mutation::DeleteProject(id) => Some(
                projects
                    .iter()
                    .find(|p| p.id == *id)
                    .map(delete_project_prompt)
                    .unwrap_or_else(|| format!("Delete project #{}?", id)),
            ),
            Mutation::SaveRequirement | Mutation::CreateLink | Mutation::SaveProject => None,
        }
    }

    /// Prefix of the alert shown when the request fails
    pub fn failure_context(&self) -> &'static str {
        match self {
            Mutation::SaveRequirement => "Failed to save requirement",
            Mutation::DeleteRequirement(_) => "Failed to delete requirement",
            Mutation::CreateLink => "Failed to create link",
            Mutation::DeleteLink(_) => "Failed to delete link",
            Mutation::SaveProject => "Failed to save project",
            Mutation::DeleteProject(_) => "Failed to delete project",
        }
    }

    /// Follow-up after success, given the project currently open
    pub fn follow_up(&self, selected: Option<ProjectId>) -> FollowUp {
        match self {
            Mutation::SaveRequirement
            | Mutation::DeleteRequirement(_)
            | Mutation::CreateLink
            | Mutation::DeleteLink(_) => FollowUp {
                reload: Reload::Requirements,
                clear_scope: false,
            },
            Mutation::SaveProject => FollowUp {
                reload: Reload::Projects,
                clear_scope: false,
            },
            Mutation::DeleteProject(id) => FollowUp {
                reload: Reload::Projects,
                clear_scope: selected == Some(*id),
            },
        }
    }

    /// Project form errors are shown on the form instead of in an alert
    pub fn reports_inline(&self) -> bool {
        matches!(self, Mutation::SaveProject)
    }
}
