use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a requirement as assigned by the backend
pub type RequirementId = i64;

/// Identifier of a project as assigned by the backend
pub type ProjectId = i64;

/// Identifier of a link as assigned by the backend
pub type LinkId = i64;

/// Declares an enumeration carried on the wire as the backend's label.
///
/// Each member has an English keyword (used for display and accepted on input)
/// and a wire value (what the backend stores and expects). Values this client
/// does not know are kept verbatim in `Other` so a payload never fails to parse
/// because the backend grew a new member.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($keyword:literal, $wire:literal), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Value not known to this client, preserved as received
            Other(String),
        }

        impl $name {
            /// All known members in the order forms offer them
            pub fn all() -> Vec<Self> {
                vec![$($name::$variant),+]
            }

            /// English keyword, or the raw text for unknown values
            pub fn keyword(&self) -> &str {
                match self {
                    $( $name::$variant => $keyword, )+
                    $name::Other(raw) => raw.as_str(),
                }
            }

            /// Value sent to and received from the backend
            pub fn wire(&self) -> &str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Other(raw) => raw.as_str(),
                }
            }

            /// Parse a wire value or an English keyword (case-insensitive,
            /// `_` and ` ` accepted in place of `-`)
            pub fn parse(s: &str) -> Self {
                let trimmed = s.trim();
                let normalized = trimmed.to_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
                $(
                    if trimmed == $wire || normalized == $keyword {
                        return $name::$variant;
                    }
                )+
                $name::Other(trimmed.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.wire().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.keyword())
            }
        }
    };
}

wire_enum! {
    /// Represents the type of a requirement
    RequirementType {
        Business => ("business", "Бизнес-требование"),
        Functional => ("functional", "Функциональное требование"),
        NonFunctional => ("non-functional", "Нефункциональное требование"),
        User => ("user", "Пользовательское требование"),
        Interface => ("interface", "Требование к интерфейсу"),
    }
}

wire_enum! {
    /// Represents the status of a requirement
    RequirementStatus {
        Draft => ("draft", "Черновик"),
        InProgress => ("in-progress", "В работе"),
        Review => ("review", "На проверке"),
        Approved => ("approved", "Утверждено"),
        Rejected => ("rejected", "Отклонено"),
    }
}

wire_enum! {
    /// Represents the priority of a requirement
    RequirementPriority {
        Low => ("low", "Низкий"),
        Medium => ("medium", "Средний"),
        High => ("high", "Высокий"),
        Critical => ("critical", "Критический"),
    }
}

wire_enum! {
    /// Represents the type of a directed link between two requirements
    LinkType {
        /// Source implements target
        Implements => ("implements", "Реализует"),
        /// Source depends on target
        DependsOn => ("depends-on", "Зависит от"),
        /// Source contradicts target
        Contradicts => ("contradicts", "Противоречит"),
    }
}

impl Default for RequirementType {
    fn default() -> Self {
        RequirementType::Functional
    }
}

impl Default for RequirementStatus {
    fn default() -> Self {
        RequirementStatus::Draft
    }
}

impl Default for RequirementPriority {
    fn default() -> Self {
        RequirementPriority::Medium
    }
}

impl Default for LinkType {
    fn default() -> Self {
        LinkType::Implements
    }
}

/// Kind of change recorded in a requirement's history
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl ChangeType {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeType::Create => "CREATE",
            ChangeType::Update => "UPDATE",
            ChangeType::Delete => "DELETE",
            ChangeType::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for ChangeType {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "CREATE" => ChangeType::Create,
            "UPDATE" => ChangeType::Update,
            "DELETE" => ChangeType::Delete,
            _ => ChangeType::Other(s),
        }
    }
}

impl From<ChangeType> for String {
    fn from(value: ChangeType) -> String {
        value.as_str().to_string()
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Treats an explicit JSON `null` the same as a missing string field
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A directed, typed edge between two requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub id: Option<LinkId>,

    /// Source requirement; absent in some nested payloads, where the owning
    /// requirement is the source
    #[serde(default)]
    pub source_requirement_id: RequirementId,

    pub target_requirement_id: RequirementId,

    pub link_type: LinkType,
}

/// Represents a single requirement as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Unique identifier for the requirement
    pub id: RequirementId,

    /// Short title describing the requirement
    pub title: String,

    /// Detailed description (empty when not provided)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    #[serde(default)]
    pub requirement_type: RequirementType,

    #[serde(default)]
    pub status: RequirementStatus,

    #[serde(default)]
    pub priority: RequirementPriority,

    /// Where the requirement came from (empty when not provided)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,

    /// Backend timestamps, kept as received
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,

    /// Links where this requirement is the source
    #[serde(default)]
    pub outgoing_links: Vec<Link>,

    /// Links where this requirement is the target
    #[serde(default)]
    pub incoming_links: Vec<Link>,
}

impl Requirement {
    /// Creates a requirement with default metadata, mostly useful for tests
    pub fn new(id: RequirementId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            requirement_type: RequirementType::default(),
            status: RequirementStatus::default(),
            priority: RequirementPriority::default(),
            source: String::new(),
            author: String::new(),
            created_at: None,
            updated_at: None,
            outgoing_links: Vec::new(),
            incoming_links: Vec::new(),
        }
    }

    /// Adds an outgoing link to `target`
    pub fn with_link(mut self, target: RequirementId, link_type: LinkType) -> Self {
        self.outgoing_links.push(Link {
            id: None,
            source_requirement_id: self.id,
            target_requirement_id: target,
            link_type,
        });
        self
    }
}

/// Top-level container scoping a set of requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One record of a requirement's change history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub requirement_id: RequirementId,
    #[serde(default)]
    pub changed_by: Option<String>,
    #[serde(default)]
    pub changed_at: Option<String>,
    pub change_type: ChangeType,
    /// Field values before the change (UPDATE and DELETE)
    #[serde(default)]
    pub old_values: Option<Map<String, Value>>,
    /// Field values after the change (CREATE and UPDATE)
    #[serde(default)]
    pub new_values: Option<Map<String, Value>>,
}

/// Body of `GET /matrix`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixResponse {
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// source id -> target id -> link type; JSON object keys are strings
    #[serde(default)]
    pub matrix: BTreeMap<String, BTreeMap<String, LinkType>>,
}

/// Body of `POST /requirements` and `PUT /requirements/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementDraft {
    pub title: String,
    pub description: String,
    pub requirement_type: RequirementType,
    pub status: RequirementStatus,
    pub priority: RequirementPriority,
    pub source: String,
    pub author: String,
}

/// Body of `POST /links`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLink {
    pub source_id: RequirementId,
    pub target_id: RequirementId,
    pub link_type: LinkType,
}

/// Body of `POST /projects` and `PUT /projects/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_wire_and_keyword() {
        assert_eq!(LinkType::parse("Зависит от"), LinkType::DependsOn);
        assert_eq!(LinkType::parse("depends-on"), LinkType::DependsOn);
        assert_eq!(LinkType::parse("Depends_On"), LinkType::DependsOn);
        assert_eq!(RequirementStatus::parse("in progress"), RequirementStatus::InProgress);
        assert_eq!(
            RequirementType::parse("Требование к интерфейсу"),
            RequirementType::Interface
        );
    }

    #[test]
    fn test_unknown_value_preserved() {
        let link_type = LinkType::parse("depends");
        assert_eq!(link_type, LinkType::Other("depends".to_string()));
        assert_eq!(link_type.to_string(), "depends");
        assert_eq!(link_type.wire(), "depends");
    }

    #[test]
    fn test_serializes_wire_value() {
        let body = serde_json::to_value(NewLink {
            source_id: 1,
            target_id: 2,
            link_type: LinkType::Contradicts,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"source_id": 1, "target_id": 2, "link_type": "Противоречит"})
        );
    }

    #[test]
    fn test_requirement_tolerates_sparse_payload() {
        let req: Requirement = serde_json::from_value(json!({
            "id": 1,
            "title": "A",
            "description": null,
            "outgoing_links": [{"target_requirement_id": 2, "link_type": "depends"}]
        }))
        .unwrap();

        assert_eq!(req.description, "");
        assert_eq!(req.status, RequirementStatus::Draft);
        assert_eq!(req.outgoing_links.len(), 1);
        assert_eq!(req.outgoing_links[0].target_requirement_id, 2);
        assert!(req.incoming_links.is_empty());
    }

    #[test]
    fn test_full_requirement_payload() {
        let req: Requirement = serde_json::from_value(json!({
            "id": 7,
            "title": "Login",
            "description": "Users log in",
            "requirement_type": "Функциональное требование",
            "status": "Утверждено",
            "priority": "Критический",
            "source": "Workshop",
            "author": "anna",
            "created_at": "2024-03-01T10:15:00.123456",
            "updated_at": null,
            "outgoing_links": [],
            "incoming_links": [{"id": 3, "source_requirement_id": 2,
                                "target_requirement_id": 7, "link_type": "Реализует"}]
        }))
        .unwrap();

        assert_eq!(req.requirement_type, RequirementType::Functional);
        assert_eq!(req.status, RequirementStatus::Approved);
        assert_eq!(req.priority, RequirementPriority::Critical);
        assert_eq!(req.incoming_links[0].link_type, LinkType::Implements);
        assert_eq!(req.updated_at, None);
    }

    #[test]
    fn test_history_entry_change_type() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "id": 1,
            "requirement_id": 4,
            "changed_by": null,
            "changed_at": "2024-03-01T10:15:00",
            "change_type": "UPDATE",
            "old_values": {"title": "a"},
            "new_values": {"title": "b"}
        }))
        .unwrap();

        assert_eq!(entry.change_type, ChangeType::Update);
        assert_eq!(entry.changed_by, None);
        assert!(entry.old_values.is_some());
    }
}
