//! User actions carried by interactive elements.
//!
//! Rendered markup never embeds handlers; each clickable element carries
//! `data-action` and `data-id` attributes which parse back into an [`Action`]
//! and are dispatched through a single `match`.

use std::fmt;
use thiserror::Error;

use crate::models::{LinkId, ProjectId, RequirementId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid id for action {action}: {id:?}")]
    InvalidId { action: String, id: String },
}

/// Something the user asked for by clicking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Show the full detail view of a requirement
    OpenDetail(RequirementId),
    /// Show only the description of a requirement (matrix headers)
    OpenDescription(RequirementId),
    /// Open the edit form of a requirement
    Edit(RequirementId),
    /// Delete a requirement after confirmation
    Delete(RequirementId),
    /// Open the link form with this requirement as source
    AddLink(RequirementId),
    /// Show the change history of a requirement
    History(RequirementId),
    /// Delete a link after confirmation
    DeleteLink(LinkId),
    /// Select a project as the active scope
    OpenProject(ProjectId),
    EditProject(ProjectId),
    DeleteProject(ProjectId),
}

impl Action {
    /// Value of the `data-action` attribute
    pub fn name(&self) -> &'static str {
        match self {
            Action::OpenDetail(_) => "open-detail",
            Action::OpenDescription(_) => "open-description",
            Action::Edit(_) => "edit",
            Action::Delete(_) => "delete",
            Action::AddLink(_) => "add-link",
            Action::History(_) => "history",
            Action::DeleteLink(_) => "delete-link",
            Action::OpenProject(_) => "open-project",
            Action::EditProject(_) => "edit-project",
            Action::DeleteProject(_) => "delete-project",
        }
    }

    /// Value of the `data-id` attribute
    pub fn id(&self) -> i64 {
        match *self {
            Action::OpenDetail(id)
            | Action::OpenDescription(id)
            | Action::Edit(id)
            | Action::Delete(id)
            | Action::AddLink(id)
            | Action::History(id)
            | Action::DeleteLink(id)
            | Action::OpenProject(id)
            | Action::EditProject(id)
            | Action::DeleteProject(id) => id,
        }
    }

    /// Rebuild an action from its data attributes
    pub fn from_attrs(action: &str, id: &str) -> Result<Self, ActionError> {
        let constructor: fn(i64) -> Action = match action {
            "open-detail" => Action::OpenDetail,
            "open-description" => Action::OpenDescription,
            "edit" => Action::Edit,
            "delete" => Action::Delete,
            "add-link" => Action::AddLink,
            "history" => Action::History,
            "delete-link" => Action::DeleteLink,
            "open-project" => Action::OpenProject,
            "edit-project" => Action::EditProject,
            "delete-project" => Action::DeleteProject,
            other => return Err(ActionError::UnknownAction(other.to_string())),
        };
        let id = id.trim().parse::<i64>().map_err(|_| ActionError::InvalidId {
            action: action.to_string(),
            id: id.to_string(),
        })?;
        Ok(constructor(id))
    }

    /// `data-action="…" data-id="…"` for embedding in markup
    pub fn to_attrs(&self) -> String {
        format!("data-action=\"{}\" data-id=\"{}\"", self.name(), self.id())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.name(), self.id())
    }
}

/// Extract every action from markup, in document order.
///
/// Only understands the attribute layout produced by [`Action::to_attrs`].
pub fn scan_actions(html: &str) -> Vec<Action> {
    const ACTION: &str = "data-action=\"";
    const ID: &str = "data-id=\"";

    let mut actions = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find(ACTION) {
        rest = &rest[start + ACTION.len()..];
        let Some(end) = rest.find('"') else { break };
        let name = &rest[..end];
        rest = &rest[end..];

        let Some(id_start) = rest.find(ID) else { break };
        let after = &rest[id_start + ID.len()..];
        let Some(id_end) = after.find('"') else { break };
        if let Ok(action) = Action::from_attrs(name, &after[..id_end]) {
            actions.push(action);
        }
        rest = &after[id_end..];
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrs_round_trip_every_variant() {
        let all = [
            Action::OpenDetail(1),
            Action::OpenDescription(2),
            Action::Edit(3),
            Action::Delete(4),
            Action::AddLink(5),
            Action::History(6),
            Action::DeleteLink(7),
            Action::OpenProject(8),
            Action::EditProject(9),
            Action::DeleteProject(10),
        ];
        for action in all {
            let parsed = Action::from_attrs(action.name(), &action.id().to_string()).unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert_eq!(
            Action::from_attrs("explode", "1"),
            Err(ActionError::UnknownAction("explode".into()))
        );
    }

    #[test]
    fn test_malformed_id_rejected() {
        assert!(matches!(
            Action::from_attrs("edit", "1); alert(1"),
            Err(ActionError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_scan_actions() {
        let html = format!(
            "<div {}><button {}>Edit</button><span class=\"x\">no action</span></div>",
            Action::OpenDetail(4).to_attrs(),
            Action::Edit(4).to_attrs()
        );
        assert_eq!(
            scan_actions(&html),
            vec![Action::OpenDetail(4), Action::Edit(4)]
        );
    }
}
