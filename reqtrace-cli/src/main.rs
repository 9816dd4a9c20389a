mod cli;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use reqtrace_core::{
    config_path, Api, ApiClient, ClientConfig, Controller, ExportKind, GraphModel, LinkForm,
    LinkType, Outcome, ProjectForm, ProjectsController, RequirementForm, RequirementId,
    RequirementPriority, RequirementStatus, RequirementType, TraceMatrix,
};

use crate::cli::{Cli, Command, FieldFlags, GraphFormat, LinkCommand, ProjectCommand};
use crate::prompts::InquireDialogs;

/// Error already shown to the user through an alert
#[derive(Debug)]
struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation failed")
    }
}

impl std::error::Error for Reported {}

fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()) {
        if !err.is::<Reported>() {
            eprintln!("{} {:#}", "Error:".red(), err);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config_path()?,
    };
    let config = load_config(&cli, &path)?;
    let api = config.api_client()?;

    match &cli.command {
        Command::List { html } => list_requirements(api, *html),
        Command::Show { id, html } => show_requirement(api, *id, *html),
        Command::Add {
            title,
            description,
            r#type,
            status,
            priority,
            source,
            author,
            interactive,
        } => {
            let flags = FieldFlags {
                title,
                description,
                r#type,
                status,
                priority,
                source,
                author,
            };
            add_requirement(api, &config, &flags, *interactive)
        }
        Command::Edit {
            id,
            title,
            description,
            r#type,
            status,
            priority,
            source,
            author,
            interactive,
        } => {
            let flags = FieldFlags {
                title,
                description,
                r#type,
                status,
                priority,
                source,
                author,
            };
            edit_requirement(api, *id, &flags, *interactive)
        }
        Command::Del { id, yes } => {
            let mut controller = Controller::new(api, InquireDialogs { assume_yes: *yes });
            finish(
                controller.delete_requirement(*id),
                &format!("Requirement #{} deleted.", id),
            )
        }
        Command::Link(cmd) => handle_link_command(cmd, api),
        Command::History { id, html } => show_history(api, *id, *html),
        Command::Matrix { html, remote } => print_matrix(api, *html, *remote),
        Command::Graph { format } => print_graph(api, *format),
        Command::Export {
            matrix,
            output,
            open,
        } => export(&api, *matrix, output.as_deref(), *open),
        Command::Project(cmd) => handle_project_command(cmd, api, &path),
    }
}

/// Config file, then environment, then command-line flags
fn load_config(cli: &Cli, path: &Path) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;

    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(project) = cli.project {
        config.project_id = Some(project);
    }
    config.validate()?;

    log::debug!(
        "Using {} (project {:?})",
        config.base_url,
        config.project_id
    );
    Ok(config)
}

/// Map a flow outcome onto the command's exit status
fn finish(outcome: Outcome, success: &str) -> Result<()> {
    match outcome {
        Outcome::Reloaded => {
            println!("{}", success.green());
            Ok(())
        }
        Outcome::Cancelled => {
            println!("{}", "Cancelled.".yellow());
            Ok(())
        }
        Outcome::Failed(_) => Err(Reported.into()),
    }
}

fn controller(api: ApiClient) -> Controller<ApiClient, InquireDialogs> {
    Controller::new(api, InquireDialogs { assume_yes: false })
}

fn colored_status(status: &RequirementStatus) -> colored::ColoredString {
    let text = status.keyword();
    match status {
        RequirementStatus::Draft => text.yellow(),
        RequirementStatus::InProgress | RequirementStatus::Review => text.cyan(),
        RequirementStatus::Approved => text.green(),
        RequirementStatus::Rejected => text.red(),
        RequirementStatus::Other(_) => text.normal(),
    }
}

fn colored_priority(priority: &RequirementPriority) -> colored::ColoredString {
    let text = priority.keyword();
    match priority {
        RequirementPriority::Critical => text.red().bold(),
        RequirementPriority::High => text.red(),
        RequirementPriority::Medium => text.yellow(),
        RequirementPriority::Low => text.green(),
        RequirementPriority::Other(_) => text.normal(),
    }
}

fn list_requirements(api: ApiClient, html: bool) -> Result<()> {
    let mut controller = controller(api);
    if !controller.reload().is_success() {
        return Err(Reported.into());
    }
    if html {
        println!("{}", controller.view().grid_html());
        return Ok(());
    }

    let requirements = controller.view().requirements();
    if requirements.is_empty() {
        println!("{}", "No requirements found.".yellow());
        return Ok(());
    }

    println!(
        "{:<6} | {:<40} | {:<15} | {:<12} | {:<10} | {:<5}",
        "ID", "Title", "Type", "Status", "Priority", "Links"
    );
    println!("{}", "-".repeat(104));

    for req in requirements {
        println!(
            "{:<6} | {:<40} | {:<15} | {:<12} | {:<10} | {:<5}",
            req.id,
            reqtrace_core::render::truncate_label(&req.title, 37),
            req.requirement_type.keyword(),
            colored_status(&req.status),
            colored_priority(&req.priority),
            req.outgoing_links.len()
        );
    }

    Ok(())
}

fn show_requirement(api: ApiClient, id: i64, html: bool) -> Result<()> {
    let mut controller = controller(api);
    // Populate the cache so link ends resolve to titles
    if !controller.reload().is_success() {
        return Err(Reported.into());
    }
    let detail = controller.open_detail(id).ok_or(Reported)?;
    if html {
        println!("{}", detail.to_html());
        return Ok(());
    }

    println!("{}", detail.heading().bold());
    for (label, value) in detail.fields() {
        println!("{}: {}", label.blue(), value);
    }

    let sections = [
        ("Outgoing links", &detail.outgoing),
        ("Incoming links", &detail.incoming),
    ];
    for (heading, rows) in sections {
        if rows.is_empty() {
            continue;
        }
        println!("\n{}:", heading.green());
        for row in rows {
            let link_id = row
                .link_id
                .map(|l| format!("[link {}] ", l))
                .unwrap_or_default();
            println!(
                "  {}{} {} {} - {}",
                link_id.dimmed(),
                row.link_type.keyword().cyan(),
                row.direction.arrow(),
                format!("#{}", row.other_id).yellow(),
                row.other_title
            );
        }
    }

    Ok(())
}

/// Apply flag values on top of the form; unknown enum names are kept as given
fn apply_flags(form: &mut RequirementForm, flags: &FieldFlags) {
    if let Some(title) = flags.title {
        form.title = title.clone();
    }
    if let Some(description) = flags.description {
        form.description = description.clone();
    }
    if let Some(t) = flags.r#type {
        form.requirement_type = RequirementType::parse(t);
    }
    if let Some(status) = flags.status {
        form.status = RequirementStatus::parse(status);
    }
    if let Some(priority) = flags.priority {
        form.priority = RequirementPriority::parse(priority);
    }
    if let Some(source) = flags.source {
        form.source = source.clone();
    }
    if let Some(author) = flags.author {
        form.author = author.clone();
    }
}

fn add_requirement(
    api: ApiClient,
    config: &ClientConfig,
    flags: &FieldFlags,
    interactive: bool,
) -> Result<()> {
    let mut form = RequirementForm::blank();
    if let Some(author) = &config.author {
        form.author = author.clone();
    }
    apply_flags(&mut form, flags);

    // Default to interactive mode if no specific arguments are provided
    if interactive || flags.is_empty() {
        form = prompts::prompt_requirement(form)?;
    }
    if form.title.trim().is_empty() {
        anyhow::bail!("A title is required");
    }

    let mut controller = controller(api);
    finish(
        controller.submit_requirement(&form),
        "Requirement added successfully!",
    )
}

fn edit_requirement(api: ApiClient, id: i64, flags: &FieldFlags, interactive: bool) -> Result<()> {
    let mut controller = controller(api);
    let mut form = controller.edit_form(id).ok_or(Reported)?;
    apply_flags(&mut form, flags);

    if interactive || flags.is_empty() {
        form = prompts::prompt_requirement(form)?;
    }

    finish(
        controller.submit_requirement(&form),
        &format!("Requirement #{} updated.", id),
    )
}

fn handle_link_command(cmd: &LinkCommand, api: ApiClient) -> Result<()> {
    match cmd {
        LinkCommand::Add { from, to, r#type } => {
            let mut controller = controller(api);
            let mut form = controller.link_form(*from).ok_or(Reported)?;
            let target = choose_link_target(&form, *to, prompts::prompt_link_target)?;
            form.target_id = Some(target);
            form.link_type = LinkType::parse(r#type);
            finish(
                controller.submit_link(&form),
                &format!("Linked #{} → #{} ({})", from, target, form.link_type),
            )
        }
        LinkCommand::Del { id, yes } => {
            let mut controller = Controller::new(api, InquireDialogs { assume_yes: *yes });
            finish(controller.delete_link(*id), &format!("Link {} deleted.", id))
        }
    }
}

/// The `--to` target when given, otherwise the user's pick among the form's options
fn choose_link_target(
    form: &LinkForm,
    to: Option<RequirementId>,
    pick: impl FnOnce(&LinkForm) -> Result<RequirementId>,
) -> Result<RequirementId> {
    let target = match to {
        Some(id) => id,
        None => pick(form)?,
    };
    if !form.options.iter().any(|o| o.id == target) {
        anyhow::bail!(
            "Requirement #{} is not a valid link target for #{}",
            target,
            form.source_id
        );
    }
    Ok(target)
}

fn show_history(api: ApiClient, id: i64, html: bool) -> Result<()> {
    let controller = controller(api);
    let table = controller.open_history(id).ok_or(Reported)?;
    if html {
        println!("{}", table.to_html());
        return Ok(());
    }

    if table.is_empty() {
        println!("{}", reqtrace_core::history::EMPTY_HISTORY_MESSAGE.yellow());
        return Ok(());
    }

    for row in &table.rows {
        println!("\n{} {}", row.date.yellow(), row.change_type.as_str().magenta());
        println!("  {} {}", "By:".dimmed(), row.actor.cyan());
        for change in &row.changes {
            println!("  {}", change);
        }
    }

    Ok(())
}

fn print_matrix(api: ApiClient, html: bool, remote: bool) -> Result<()> {
    let matrix = if remote {
        let response = api.matrix().context("Failed to load the matrix")?;
        TraceMatrix::from_response(&response)
    } else {
        let requirements = api
            .list_requirements()
            .context("Failed to load requirements")?;
        TraceMatrix::from_requirements(&requirements)
    };

    if html {
        println!("{}", matrix.to_html());
    } else {
        print!("{}", matrix.to_text());
    }
    Ok(())
}

fn print_graph(api: ApiClient, format: GraphFormat) -> Result<()> {
    let requirements = api
        .list_requirements()
        .context("Failed to load requirements")?;
    let graph = GraphModel::from_requirements(&requirements);
    if graph.is_empty() {
        eprintln!("{}", reqtrace_core::graph::EMPTY_MIND_MAP_MESSAGE.yellow());
    }

    match format {
        GraphFormat::Dot => print!("{}", graph.to_dot()),
        GraphFormat::Json => println!("{}", graph.to_json()?),
    }
    Ok(())
}

fn export(api: &ApiClient, matrix: bool, output: Option<&Path>, open: bool) -> Result<()> {
    let kind = if matrix {
        ExportKind::Matrix
    } else {
        ExportKind::Requirements
    };

    if open {
        let url = api.export_url(kind)?;
        open::that(url.as_str()).with_context(|| format!("Failed to open {}", url))?;
        println!("Opened {}", url);
        return Ok(());
    }

    let bytes = api
        .download_export(kind)
        .context("Failed to download the export")?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(kind.file_name()));
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {:?}", path))?;

    println!(
        "{} {} ({} bytes)",
        "Exported to".green(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

fn handle_project_command(cmd: &ProjectCommand, api: ApiClient, config_file: &Path) -> Result<()> {
    let yes = matches!(cmd, ProjectCommand::Del { yes: true, .. });
    let mut projects = ProjectsController::new(api, InquireDialogs { assume_yes: yes });
    if !projects.load().is_success() {
        return Err(Reported.into());
    }

    match cmd {
        ProjectCommand::List { html: true } => {
            println!("{}", projects.to_html());
            Ok(())
        }
        ProjectCommand::List { html: false } => {
            if projects.projects().is_empty() {
                println!("{}", "No projects found.".yellow());
                return Ok(());
            }
            println!("{:<3}{:<6} | {:<30} | {}", "", "ID", "Name", "Description");
            println!("{}", "-".repeat(80));
            for project in projects.projects() {
                let marker = if projects.selected() == Some(project.id) {
                    "*"
                } else {
                    ""
                };
                println!(
                    "{:<3}{:<6} | {:<30} | {}",
                    marker.green(),
                    project.id,
                    project.name,
                    project.description
                );
            }
            Ok(())
        }
        ProjectCommand::Add { name, description } => {
            let mut form = ProjectForm::blank();
            match name {
                Some(name) => {
                    form.name = name.clone();
                    form.description = description.clone().unwrap_or_default();
                }
                None => form = prompts::prompt_project(form)?,
            }
            submit_project(&mut projects, form, "Project created.")
        }
        ProjectCommand::Edit {
            id,
            name,
            description,
        } => {
            let mut form = projects
                .edit_form(*id)
                .with_context(|| format!("Project #{} not found", id))?;
            if name.is_none() && description.is_none() {
                form = prompts::prompt_project(form)?;
            } else {
                if let Some(name) = name {
                    form.name = name.clone();
                }
                if let Some(description) = description {
                    form.description = description.clone();
                }
            }
            submit_project(&mut projects, form, "Project updated.")
        }
        ProjectCommand::Del { id, .. } => {
            finish(projects.delete(*id), &format!("Project #{} deleted.", id))
        }
        ProjectCommand::Use { id } => {
            let project = projects
                .open(*id)
                .with_context(|| format!("Project #{} not found", id))?
                .clone();

            // Only the project changes; overrides from env and flags are not persisted
            let mut file_config = ClientConfig::load(config_file)?;
            file_config.project_id = Some(project.id);
            file_config.save(config_file)?;

            println!(
                "{} #{} ({})",
                "Now using project".green(),
                project.id,
                project.name
            );
            Ok(())
        }
    }
}

fn submit_project(
    projects: &mut ProjectsController<ApiClient, InquireDialogs>,
    mut form: ProjectForm,
    success: &str,
) -> Result<()> {
    let outcome = projects.submit(&mut form);
    if let Some(error) = &form.error {
        eprintln!("{}", error.red());
    }
    finish(outcome, success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqtrace_core::api::{Method, RawResponse, Transport, TransportError};
    use reqtrace_core::Requirement;
    use std::sync::Arc;

    /// Fails the requirement list, serves single requirements
    struct ListDown;

    impl Transport for ListDown {
        fn execute(
            &self,
            _method: Method,
            url: &str,
            _body: Option<&serde_json::Value>,
        ) -> Result<RawResponse, TransportError> {
            if url.ends_with("/requirements") {
                Ok(RawResponse::new(500, r#"{"error": "database down"}"#))
            } else {
                Ok(RawResponse::new(200, r#"{"id": 1, "title": "Login"}"#))
            }
        }
    }

    #[test]
    fn test_apply_flags_accepts_keywords_and_wire_values() {
        let mut form = RequirementForm::blank();
        let title = Some("Login".to_string());
        let kind = Some("Бизнес-требование".to_string());
        let status = Some("in-progress".to_string());
        let flags = FieldFlags {
            title: &title,
            description: &None,
            r#type: &kind,
            status: &status,
            priority: &None,
            source: &None,
            author: &None,
        };

        apply_flags(&mut form, &flags);

        assert_eq!(form.title, "Login");
        assert_eq!(form.requirement_type, RequirementType::Business);
        assert_eq!(form.status, RequirementStatus::InProgress);
        assert_eq!(form.priority, RequirementPriority::Medium);
    }

    fn link_form() -> LinkForm {
        LinkForm::new(
            1,
            &[
                Requirement::new(1, "Login"),
                Requirement::new(2, "SSO"),
                Requirement::new(3, "Audit"),
            ],
        )
    }

    #[test]
    fn test_link_target_from_flag_skips_picker() {
        let target = choose_link_target(&link_form(), Some(3), |_| panic!("picker shown")).unwrap();
        assert_eq!(target, 3);
    }

    #[test]
    fn test_link_target_picked_when_flag_missing() {
        let mut offered = Vec::new();
        let target = choose_link_target(&link_form(), None, |form| {
            offered = form.options.iter().map(|o| o.id).collect();
            Ok(2)
        })
        .unwrap();

        assert_eq!(target, 2);
        assert_eq!(offered, vec![2, 3]);
    }

    #[test]
    fn test_link_target_must_be_another_requirement() {
        let err = choose_link_target(&link_form(), Some(1), |_| Ok(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Requirement #1 is not a valid link target for #1"
        );
        assert!(choose_link_target(&link_form(), Some(9), |_| Ok(9)).is_err());
    }

    #[test]
    fn test_show_exits_with_error_when_reload_fails() {
        let api = ApiClient::with_transport("http://tracker.test", Arc::new(ListDown))
            .unwrap()
            .for_project(Some(1));

        let err = show_requirement(api, 1, false).unwrap_err();
        assert!(err.is::<Reported>());
    }

    #[test]
    fn test_failed_outcome_is_already_reported() {
        let err = finish(Outcome::Failed("boom".into()), "ok").unwrap_err();
        assert!(err.is::<Reported>());
        assert!(finish(Outcome::Cancelled, "ok").is_ok());
    }
}
