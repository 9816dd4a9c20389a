//! Form state for the requirement, link and project modals

use thiserror::Error;

use crate::models::{
    LinkType, NewLink, Project, ProjectDraft, ProjectId, Requirement, RequirementDraft,
    RequirementId, RequirementPriority, RequirementStatus, RequirementType,
};

/// Inline message for a project form submitted without a name
pub const PROJECT_NAME_REQUIRED: &str = "Enter a project name";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Enter a project name")]
    MissingProjectName,

    #[error("Select a target requirement")]
    MissingTarget,

    #[error("A requirement cannot link to itself")]
    SelfLink,
}

/// Create or edit form of a requirement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequirementForm {
    /// Set when editing an existing requirement
    pub id: Option<RequirementId>,
    pub title: String,
    pub description: String,
    pub requirement_type: RequirementType,
    pub status: RequirementStatus,
    pub priority: RequirementPriority,
    pub source: String,
    pub author: String,
}

impl RequirementForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_requirement(req: &Requirement) -> Self {
        Self {
            id: Some(req.id),
            title: req.title.clone(),
            description: req.description.clone(),
            requirement_type: req.requirement_type.clone(),
            status: req.status.clone(),
            priority: req.priority.clone(),
            source: req.source.clone(),
            author: req.author.clone(),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Modal heading
    pub fn heading(&self) -> &'static str {
        if self.is_edit() {
            "Edit requirement"
        } else {
            "Add requirement"
        }
    }

    pub fn to_draft(&self) -> RequirementDraft {
        RequirementDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            requirement_type: self.requirement_type.clone(),
            status: self.status.clone(),
            priority: self.priority.clone(),
            source: self.source.clone(),
            author: self.author.clone(),
        }
    }
}

/// Choice offered in the link form's target selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub id: RequirementId,
    pub label: String,
}

/// Form creating a link from a fixed source requirement
#[derive(Debug, Clone, PartialEq)]
pub struct LinkForm {
    pub source_id: RequirementId,
    pub target_id: Option<RequirementId>,
    pub link_type: LinkType,
    pub options: Vec<LinkTarget>,
}

impl LinkForm {
    pub fn new(source_id: RequirementId, requirements: &[Requirement]) -> Self {
        Self {
            source_id,
            target_id: None,
            link_type: LinkType::default(),
            options: Self::target_options(source_id, requirements),
        }
    }

    /// Every requirement except the source, as `#id - title`
    pub fn target_options(source_id: RequirementId, requirements: &[Requirement]) -> Vec<LinkTarget> {
        requirements
            .iter()
            .filter(|r| r.id != source_id)
            .map(|r| LinkTarget {
                id: r.id,
                label: format!("#{} - {}", r.id, r.title),
            })
            .collect()
    }

    pub fn to_new_link(&self) -> Result<NewLink, FormError> {
        let target_id = self.target_id.ok_or(FormError::MissingTarget)?;
        if target_id == self.source_id {
            return Err(FormError::SelfLink);
        }
        Ok(NewLink {
            source_id: self.source_id,
            target_id,
            link_type: self.link_type.clone(),
        })
    }
}

/// Create or edit form of a project, with its inline error
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectForm {
    pub id: Option<ProjectId>,
    pub name: String,
    pub description: String,
    pub error: Option<String>,
}

impl ProjectForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            id: Some(project.id),
            name: project.name.clone(),
            description: project.description.clone(),
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_edit() {
            "Edit project"
        } else {
            "Create project"
        }
    }

    /// Check the required name; on failure the message is kept in `error`
    pub fn validate(&mut self) -> Result<ProjectDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            self.error = Some(PROJECT_NAME_REQUIRED.to_string());
            return Err(FormError::MissingProjectName);
        }
        self.error = None;
        Ok(ProjectDraft {
            name: name.to_string(),
            description: self.description.trim().to_string(),
        })
    }
}
