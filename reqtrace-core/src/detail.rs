//! Detail and description views of a single requirement

use crate::actions::Action;
use crate::models::{LinkId, LinkType, Requirement, RequirementId};
use crate::render::{escape_html, format_optional_date, link_type_class};

/// Shown for empty optional fields
pub const NOT_SPECIFIED: &str = "Not specified";

/// Shown for link ends missing from the cache
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Shown in the description view when there is no description
pub const NO_DESCRIPTION: &str = "No description provided";

/// Direction of a link relative to the requirement being viewed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Outgoing => "→",
            Direction::Incoming => "←",
        }
    }
}

/// One link as shown in the detail view
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRow {
    pub link_id: Option<LinkId>,
    pub direction: Direction,
    /// The requirement at the other end
    pub other_id: RequirementId,
    pub other_title: String,
    pub link_type: LinkType,
}

impl LinkRow {
    /// Clicking a row opens the other end
    pub fn open_action(&self) -> Action {
        Action::OpenDetail(self.other_id)
    }

    pub fn delete_action(&self) -> Option<Action> {
        self.link_id.map(Action::DeleteLink)
    }
}

fn title_in(cache: &[Requirement], id: RequirementId) -> String {
    cache
        .iter()
        .find(|r| r.id == id)
        .map(|r| r.title.clone())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

fn or_not_specified(text: &str) -> String {
    if text.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequirementDetail {
    pub requirement: Requirement,
    pub outgoing: Vec<LinkRow>,
    pub incoming: Vec<LinkRow>,
}

impl RequirementDetail {
    /// Resolve link ends against the cached requirement list
    pub fn new(requirement: Requirement, cache: &[Requirement]) -> Self {
        let outgoing = requirement
            .outgoing_links
            .iter()
            .map(|link| LinkRow {
                link_id: link.id,
                direction: Direction::Outgoing,
                other_id: link.target_requirement_id,
                other_title: title_in(cache, link.target_requirement_id),
                link_type: link.link_type.clone(),
            })
            .collect();

        let incoming = requirement
            .incoming_links
            .iter()
            .map(|link| LinkRow {
                link_id: link.id,
                direction: Direction::Incoming,
                other_id: link.source_requirement_id,
                other_title: title_in(cache, link.source_requirement_id),
                link_type: link.link_type.clone(),
            })
            .collect();

        Self {
            requirement,
            outgoing,
            incoming,
        }
    }

    pub fn heading(&self) -> String {
        heading(&self.requirement)
    }

    /// Label/value pairs of the main section
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let req = &self.requirement;
        vec![
            ("Title", req.title.clone()),
            ("Description", or_not_specified(&req.description)),
            ("Type", req.requirement_type.to_string()),
            ("Status", req.status.to_string()),
            ("Priority", req.priority.to_string()),
            ("Source", or_not_specified(&req.source)),
            ("Author", or_not_specified(&req.author)),
            ("Created", format_optional_date(req.created_at.as_deref())),
            ("Updated", format_optional_date(req.updated_at.as_deref())),
        ]
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkRow> {
        self.outgoing.iter().chain(self.incoming.iter())
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<div class=\"detail-section\"><h3>Main information</h3>");
        for (label, value) in self.fields() {
            html.push_str(&format!(
                "<div class=\"detail-field\"><label>{}:</label><div>{}</div></div>",
                label,
                escape_html(&value)
            ));
        }
        html.push_str("</div>");

        for (heading, rows) in [
            ("Outgoing links", &self.outgoing),
            ("Incoming links", &self.incoming),
        ] {
            if rows.is_empty() {
                continue;
            }
            html.push_str(&format!("<div class=\"detail-section\"><h3>{}</h3>", heading));
            for row in rows {
                html.push_str(&format!(
                    "<div class=\"link-item clickable\" {}><span class=\"link-type {}\">{}</span> {} <strong>#{}</strong>: {}</div>",
                    row.open_action().to_attrs(),
                    link_type_class(&row.link_type),
                    escape_html(row.link_type.keyword()),
                    row.direction.arrow(),
                    row.other_id,
                    escape_html(&row.other_title)
                ));
            }
            html.push_str("</div>");
        }

        let id = self.requirement.id;
        html.push_str(&format!(
            "<div class=\"form-actions\"><button class=\"btn btn-primary\" {}>Edit</button><button class=\"btn btn-secondary\" {}>History</button></div>",
            Action::Edit(id).to_attrs(),
            Action::History(id).to_attrs()
        ));
        html
    }
}

/// `Requirement #id: title`
pub fn heading(req: &Requirement) -> String {
    format!("Requirement #{}: {}", req.id, req.title)
}

/// Description-only view opened from the matrix headers
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionView {
    pub id: RequirementId,
    pub heading: String,
    pub description: String,
}

impl DescriptionView {
    pub fn new(req: &Requirement) -> Self {
        let description = if req.description.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            req.description.clone()
        };
        Self {
            id: req.id,
            heading: heading(req),
            description,
        }
    }

    /// "Show full information"
    pub fn full_action(&self) -> Action {
        Action::OpenDetail(self.id)
    }
}
