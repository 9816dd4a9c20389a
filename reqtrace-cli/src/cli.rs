use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Client for a requirements-traceability server")]
pub struct Cli {
    /// Backend URL (overrides the config file and REQTRACE_URL)
    #[clap(long)]
    pub url: Option<String>,

    /// Project ID to work in (overrides the config file and REQTRACE_PROJECT)
    #[clap(long, short = 'p')]
    pub project: Option<i64>,

    /// Path to the config file
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphFormat {
    Dot,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum LinkCommand {
    /// Add a link between requirements
    Add {
        /// Source requirement ID
        #[clap(long)]
        from: i64,

        /// Target requirement ID; picked interactively when omitted
        #[clap(long)]
        to: Option<i64>,

        /// Link type (implements, depends-on, contradicts)
        #[clap(long, default_value = "implements")]
        r#type: String,
    },

    /// Delete a link
    Del {
        /// The ID of the link to delete
        id: i64,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List all projects
    List {
        /// Print the project cards as HTML
        #[clap(long)]
        html: bool,
    },

    /// Create a project
    Add {
        /// Name of the project
        #[clap(long)]
        name: Option<String>,

        /// Description of the project
        #[clap(long)]
        description: Option<String>,
    },

    /// Edit a project
    Edit {
        /// The ID of the project to edit
        id: i64,

        #[clap(long)]
        name: Option<String>,

        #[clap(long)]
        description: Option<String>,
    },

    /// Delete a project with all its requirements and links
    Del {
        /// The ID of the project to delete
        id: i64,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Make a project the default in the config file
    Use {
        /// The ID of the project
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all requirements of the project
    List {
        /// Print the requirement cards as HTML
        #[clap(long)]
        html: bool,
    },

    /// Show details for a specific requirement
    Show {
        /// The ID of the requirement to show
        id: i64,

        /// Print the detail view as HTML
        #[clap(long)]
        html: bool,
    },

    /// Add a new requirement
    Add {
        /// Title of the requirement
        #[clap(long)]
        title: Option<String>,

        /// Description of the requirement
        #[clap(long)]
        description: Option<String>,

        /// Type of the requirement (business, functional, non-functional, user, interface)
        #[clap(long)]
        r#type: Option<String>,

        /// Status of the requirement (draft, in-progress, review, approved, rejected)
        #[clap(long)]
        status: Option<String>,

        /// Priority of the requirement (low, medium, high, critical)
        #[clap(long)]
        priority: Option<String>,

        /// Where the requirement came from
        #[clap(long)]
        source: Option<String>,

        /// Author of the requirement
        #[clap(long)]
        author: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// Edit an existing requirement
    Edit {
        /// The ID of the requirement to edit
        id: i64,

        #[clap(long)]
        title: Option<String>,

        #[clap(long)]
        description: Option<String>,

        #[clap(long)]
        r#type: Option<String>,

        #[clap(long)]
        status: Option<String>,

        #[clap(long)]
        priority: Option<String>,

        #[clap(long)]
        source: Option<String>,

        #[clap(long)]
        author: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long)]
        interactive: bool,
    },

    /// Delete a requirement
    Del {
        /// The ID of the requirement to delete
        id: i64,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Link management commands
    #[clap(subcommand)]
    Link(LinkCommand),

    /// Show the change history of a requirement
    History {
        /// The ID of the requirement
        id: i64,

        /// Print the history table as HTML
        #[clap(long)]
        html: bool,
    },

    /// Print the cross-reference matrix
    Matrix {
        /// Print HTML instead of a text table
        #[clap(long)]
        html: bool,

        /// Build from the server's matrix endpoint instead of the requirement list
        #[clap(long)]
        remote: bool,
    },

    /// Print the requirement graph
    Graph {
        /// Output format
        #[clap(long, short = 'f', value_enum, default_value = "dot")]
        format: GraphFormat,
    },

    /// Download the spreadsheet export of the project
    Export {
        /// Export the cross-reference matrix instead of the requirements
        #[clap(long)]
        matrix: bool,

        /// Output file path
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,

        /// Open the export URL in the browser instead of downloading
        #[clap(long, conflicts_with = "output")]
        open: bool,
    },

    /// Project management commands
    #[clap(subcommand)]
    Project(ProjectCommand),
}

/// Requirement fields given as flags to `add` and `edit`
pub struct FieldFlags<'a> {
    pub title: &'a Option<String>,
    pub description: &'a Option<String>,
    pub r#type: &'a Option<String>,
    pub status: &'a Option<String>,
    pub priority: &'a Option<String>,
    pub source: &'a Option<String>,
    pub author: &'a Option<String>,
}

impl FieldFlags<'_> {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.r#type.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.source.is_none()
            && self.author.is_none()
    }
}
