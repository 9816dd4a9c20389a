//! Rendering helpers
//!
//! Pure functions mapping domain values to display classes and colors, plus
//! the HTML fragments for requirement and project cards. Every interpolated
//! value goes through [`escape_html`].

use chrono::{DateTime, NaiveDateTime};

use crate::actions::Action;
use crate::models::{
    LinkType, Project, Requirement, RequirementPriority, RequirementStatus, RequirementType,
};

/// Fallback color for unknown requirement and link types
pub const DEFAULT_COLOR: &str = "#95a5a6";

/// Display format for timestamps
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escape text for interpolation into HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn status_class(status: &RequirementStatus) -> &'static str {
    match status {
        RequirementStatus::Approved => "approved",
        RequirementStatus::InProgress => "in-progress",
        RequirementStatus::Rejected => "rejected",
        _ => "",
    }
}

pub fn priority_class(priority: &RequirementPriority) -> &'static str {
    match priority {
        RequirementPriority::Critical => "critical",
        RequirementPriority::High => "high",
        _ => "",
    }
}

pub fn link_type_class(link_type: &LinkType) -> &'static str {
    match link_type {
        LinkType::Implements => "implements",
        LinkType::DependsOn => "depends",
        LinkType::Contradicts => "contradicts",
        LinkType::Other(_) => "",
    }
}

/// Fill color of a mind-map node
pub fn node_color(requirement_type: &RequirementType) -> &'static str {
    match requirement_type {
        RequirementType::Business => "#3498db",
        RequirementType::Functional => "#27ae60",
        RequirementType::NonFunctional => "#e67e22",
        RequirementType::User => "#9b59b6",
        RequirementType::Interface => "#e74c3c",
        RequirementType::Other(_) => DEFAULT_COLOR,
    }
}

/// Stroke color of a mind-map edge
pub fn edge_color(link_type: &LinkType) -> &'static str {
    match link_type {
        LinkType::Implements => "#27ae60",
        LinkType::DependsOn => "#f39c12",
        LinkType::Contradicts => "#e74c3c",
        LinkType::Other(_) => DEFAULT_COLOR,
    }
}

/// Parse a hex color string (e.g., "#ff6b6b" or "ff6b6b") into RGB components
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Cut `text` to `limit` characters, appending `...` when something was cut
pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    }
}

/// Render a backend timestamp for display.
///
/// Accepts RFC 3339, naive ISO-8601 (what the backend emits) and RFC 2822.
/// Anything else is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.format(DATE_FORMAT).to_string();
    }
    raw.to_string()
}

/// Format an optional timestamp, empty when absent
pub fn format_optional_date(raw: Option<&str>) -> String {
    raw.map(format_date).unwrap_or_default()
}

/// Shown in the card grid when there is nothing to display
pub const EMPTY_GRID_MESSAGE: &str = "No requirements yet. Add the first requirement.";

/// Shown in the project grid when there is nothing to display
pub const EMPTY_PROJECTS_MESSAGE: &str = "No projects yet. Click \"Create project\".";

fn placeholder(message: &str) -> String {
    format!("<p class=\"placeholder\">{}</p>", escape_html(message))
}

fn link_items(req: &Requirement) -> String {
    let mut html = String::new();

    if !req.outgoing_links.is_empty() {
        html.push_str("<div class=\"requirement-links\"><strong>Outgoing links:</strong>");
        for link in &req.outgoing_links {
            html.push_str(&format!(
                "<div class=\"link-item clickable\" {}><span class=\"link-type {}\">{}</span> → Requirement #{}</div>",
                Action::OpenDetail(link.target_requirement_id).to_attrs(),
                link_type_class(&link.link_type),
                escape_html(link.link_type.keyword()),
                link.target_requirement_id
            ));
        }
        html.push_str("</div>");
    }

    if !req.incoming_links.is_empty() {
        html.push_str("<div class=\"requirement-links\"><strong>Incoming links:</strong>");
        for link in &req.incoming_links {
            html.push_str(&format!(
                "<div class=\"link-item clickable\" {}><span class=\"link-type {}\">{}</span> ← Requirement #{}</div>",
                Action::OpenDetail(link.source_requirement_id).to_attrs(),
                link_type_class(&link.link_type),
                escape_html(link.link_type.keyword()),
                link.source_requirement_id
            ));
        }
        html.push_str("</div>");
    }

    html
}

/// One requirement card
pub fn requirement_card_html(req: &Requirement) -> String {
    let mut info = String::new();
    if !req.author.is_empty() {
        info.push_str(&format!("<div>Author: {}</div>", escape_html(&req.author)));
    }
    if !req.source.is_empty() {
        info.push_str(&format!("<div>Source: {}</div>", escape_html(&req.source)));
    }
    if let Some(created) = req.created_at.as_deref() {
        info.push_str(&format!(
            "<div>Created: {}</div>",
            escape_html(&format_date(created))
        ));
    }

    format!(
        concat!(
            "<div class=\"requirement-card\" {open}>",
            "<div class=\"requirement-card-header\">",
            "<span class=\"requirement-id\">#{id}</span>",
            "<div class=\"requirement-actions\">",
            "<button class=\"btn btn-small btn-primary\" {edit}>Edit</button>",
            "<button class=\"btn btn-small btn-danger\" {delete}>Delete</button>",
            "</div></div>",
            "<div class=\"requirement-title\">{title}</div>",
            "<div class=\"requirement-description\">{description}</div>",
            "<div class=\"requirement-meta\">",
            "<span class=\"badge badge-type\">{rtype}</span>",
            "<span class=\"badge badge-status {status_class}\">{status}</span>",
            "<span class=\"badge badge-priority {priority_class}\">{priority}</span>",
            "</div>",
            "{links}",
            "<div class=\"requirement-info\">{info}</div>",
            "<div class=\"requirement-actions\">",
            "<button class=\"btn btn-small btn-secondary\" {add_link}>Add link</button>",
            "<button class=\"btn btn-small btn-secondary\" {history}>History</button>",
            "</div></div>"
        ),
        open = Action::OpenDetail(req.id).to_attrs(),
        id = req.id,
        edit = Action::Edit(req.id).to_attrs(),
        delete = Action::Delete(req.id).to_attrs(),
        title = escape_html(&req.title),
        description = escape_html(&req.description),
        rtype = escape_html(req.requirement_type.keyword()),
        status_class = status_class(&req.status),
        status = escape_html(req.status.keyword()),
        priority_class = priority_class(&req.priority),
        priority = escape_html(req.priority.keyword()),
        links = link_items(req),
        info = info,
        add_link = Action::AddLink(req.id).to_attrs(),
        history = Action::History(req.id).to_attrs(),
    )
}

/// The card grid, or a placeholder when empty
pub fn requirement_grid_html(requirements: &[Requirement]) -> String {
    if requirements.is_empty() {
        return placeholder(EMPTY_GRID_MESSAGE);
    }
    let cards: String = requirements.iter().map(requirement_card_html).collect();
    format!("<div class=\"requirements-grid\">{}</div>", cards)
}

/// The project grid, or a placeholder when empty
pub fn project_grid_html(projects: &[Project]) -> String {
    if projects.is_empty() {
        return placeholder(EMPTY_PROJECTS_MESSAGE);
    }

    let mut html = String::from("<div class=\"projects-grid\">");
    for project in projects {
        html.push_str(&format!(
            concat!(
                "<div class=\"requirement-card\">",
                "<div class=\"requirement-title\">{name}</div>",
                "<div class=\"requirement-description\">{description}</div>",
                "<div class=\"requirement-info\"><div>Project #{id}</div></div>",
                "<div class=\"actions\">",
                "<button class=\"btn btn-primary btn-small\" type=\"button\" {open}>Open</button>",
                "<button class=\"btn btn-secondary btn-small\" type=\"button\" {edit}>Edit</button>",
                "<button class=\"btn btn-danger btn-small\" type=\"button\" {delete}>Delete</button>",
                "</div></div>"
            ),
            name = escape_html(&project.name),
            description = escape_html(&project.description),
            id = project.id,
            open = Action::OpenProject(project.id).to_attrs(),
            edit = Action::EditProject(project.id).to_attrs(),
            delete = Action::DeleteProject(project.id).to_attrs(),
        ));
    }
    html.push_str("</div>");
    html
}
