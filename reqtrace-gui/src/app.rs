use eframe::egui;
use egui::{Align2, Color32, RichText};
use egui_extras::{Column, TableBuilder};
use log::info;
use std::fmt::Display;

use reqtrace_core::graph::EMPTY_MIND_MAP_MESSAGE;
use reqtrace_core::history::EMPTY_HISTORY_MESSAGE;
use reqtrace_core::matrix::EMPTY_MATRIX_MESSAGE;
use reqtrace_core::render::{
    edge_color, format_optional_date, node_color, parse_hex_color, priority_class, status_class,
    truncate_label, EMPTY_GRID_MESSAGE, EMPTY_PROJECTS_MESSAGE,
};
use reqtrace_core::{
    Action, ApiClient, Cell, ChangeType, ExportKind, HistoryTable, LinkType, Project, ProjectForm,
    ProjectId, RenderedView, Requirement, RequirementPriority, RequirementStatus, RequirementType,
    TraceMatrix, ViewMode,
};

use crate::session::Session;
use crate::worker::Worker;

const CARD_WIDTH: f32 = 280.0;
const CARD_DESCRIPTION_LIMIT: usize = 120;
const MATRIX_HEADER_LIMIT: usize = 24;

pub struct ReqtraceApp {
    session: Session,
    worker: Worker,

    /// Clicks collected while drawing, dispatched at the end of the frame
    pending_actions: Vec<Action>,
}

impl ReqtraceApp {
    pub fn new(cc: &eframe::CreationContext<'_>, api: ApiClient, default_author: String) -> Self {
        let worker = Worker::spawn(api.clone(), cc.egui_ctx.clone());
        let mut app = Self {
            session: Session::new(api, default_author),
            worker,
            pending_actions: Vec::new(),
        };
        app.flush_jobs();
        app
    }

    /// Hand the session's queued jobs to the worker
    fn flush_jobs(&mut self) {
        for job in self.session.take_jobs() {
            self.worker.send(job);
        }
    }

    fn export(&mut self, kind: ExportKind) {
        let url = match self.session.export_url(kind) {
            Ok(url) => url,
            Err(e) => return self.session.fail("Export failed", &e.to_string()),
        };
        info!("Opening {}", url);
        if let Err(e) = open::that(url.as_str()) {
            self.session.fail("Failed to open the browser", &e.to_string());
        }
    }

    fn show_top_panel(&mut self, ctx: &egui::Context) {
        let mut chosen_project = None;
        let mut open_projects = false;
        let mut add = false;
        let mut export = None;
        let mut switch_to = None;
        let session = &self.session;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                let project_name = session
                    .selected_project
                    .and_then(|id| session.projects.iter().find(|p| p.id == id))
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Select project".to_string());

                egui::ComboBox::from_id_salt("project_combo")
                    .selected_text(project_name)
                    .show_ui(ui, |ui| {
                        for project in &session.projects {
                            let selected = session.selected_project == Some(project.id);
                            if ui.selectable_label(selected, project.name.as_str()).clicked() {
                                chosen_project = Some(project.id);
                            }
                        }
                    });

                if ui.button("📁 Projects").clicked() {
                    open_projects = true;
                }

                ui.separator();

                let has_project = session.selected_project.is_some();
                if ui.add_enabled(has_project, egui::Button::new("➕ Add")).clicked() {
                    add = true;
                }
                if ui.add_enabled(has_project, egui::Button::new("Export")).clicked() {
                    export = Some(ExportKind::Requirements);
                }
                if ui
                    .add_enabled(has_project, egui::Button::new("Export matrix"))
                    .clicked()
                {
                    export = Some(ExportKind::Matrix);
                }

                ui.separator();

                for mode in ViewMode::all() {
                    if ui
                        .selectable_label(session.view.mode() == mode, mode.label())
                        .clicked()
                    {
                        switch_to = Some(mode);
                    }
                }

                ui.separator();
                ui.label(format!("Requirements: {}", session.view.requirements().len()));
                if session.loading {
                    ui.spinner();
                }
            });
        });

        if let Some(id) = chosen_project {
            self.pending_actions.push(Action::OpenProject(id));
        }
        if open_projects {
            self.session.show_projects = true;
        }
        if add {
            self.session.open_add_form();
        }
        if let Some(kind) = export {
            self.export(kind);
        }
        if let Some(mode) = switch_to {
            self.session.switch_view(mode);
        }
    }

    fn show_central_panel(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();
        let session = &mut self.session;

        egui::CentralPanel::default().show(ctx, |ui| {
            if session.selected_project.is_none() {
                ui.label("Open a project to see its requirements.");
                return;
            }

            match &session.rendered {
                None => {
                    ui.spinner();
                }
                Some(RenderedView::Grid) => {
                    card_grid(ui, session.view.requirements(), &mut actions)
                }
                Some(RenderedView::Matrix(matrix)) => matrix_grid(ui, matrix, &mut actions),
                Some(RenderedView::MindMap(_)) => match session.mind_map.as_mut() {
                    Some(map) if !map.is_empty() => map.show(ui, &mut actions),
                    _ => {
                        ui.label(EMPTY_MIND_MAP_MESSAGE);
                    }
                },
            }
        });

        self.pending_actions.extend(actions);
    }

    fn show_requirement_form(&mut self, ctx: &egui::Context) {
        let Some(form) = self.session.requirement_form.as_mut() else {
            return;
        };

        let mut submit = false;
        let mut cancel = false;

        egui::Window::new(form.heading())
            .id(egui::Id::new("requirement_form"))
            .collapsible(false)
            .resizable(true)
            .min_width(450.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("requirement_form_grid")
                    .num_columns(2)
                    .spacing([10.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Title:");
                        ui.text_edit_singleline(&mut form.title);
                        ui.end_row();

                        ui.label("Description:");
                        ui.text_edit_multiline(&mut form.description);
                        ui.end_row();

                        ui.label("Type:");
                        choice(ui, "form_type", &mut form.requirement_type, RequirementType::all());
                        ui.end_row();

                        ui.label("Status:");
                        choice(ui, "form_status", &mut form.status, RequirementStatus::all());
                        ui.end_row();

                        ui.label("Priority:");
                        choice(ui, "form_priority", &mut form.priority, RequirementPriority::all());
                        ui.end_row();

                        ui.label("Source:");
                        ui.text_edit_singleline(&mut form.source);
                        ui.end_row();

                        ui.label("Author:");
                        ui.text_edit_singleline(&mut form.author);
                        ui.end_row();
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("💾 Save").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if submit {
            self.session.submit_requirement_form();
        }
        if cancel {
            self.session.requirement_form = None;
        }
    }

    fn show_link_form(&mut self, ctx: &egui::Context) {
        let Some(form) = self.session.link_form.as_mut() else {
            return;
        };

        let mut submit = false;
        let mut cancel = false;

        egui::Window::new("Add link")
            .id(egui::Id::new("link_form"))
            .collapsible(false)
            .resizable(false)
            .min_width(400.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("From requirement #{}", form.source_id));
                ui.add_space(6.0);

                let target = form
                    .target_id
                    .and_then(|id| form.options.iter().find(|o| o.id == id))
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| "Select requirement".to_string());

                egui::Grid::new("link_form_grid")
                    .num_columns(2)
                    .spacing([10.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Target:");
                        egui::ComboBox::from_id_salt("link_target")
                            .selected_text(target)
                            .width(300.0)
                            .show_ui(ui, |ui| {
                                for option in &form.options {
                                    ui.selectable_value(
                                        &mut form.target_id,
                                        Some(option.id),
                                        option.label.as_str(),
                                    );
                                }
                            });
                        ui.end_row();

                        ui.label("Link type:");
                        choice(ui, "link_type", &mut form.link_type, LinkType::all());
                        ui.end_row();
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Create link").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if submit {
            self.session.submit_link_form();
        }
        if cancel {
            self.session.link_form = None;
        }
    }

    fn show_detail(&mut self, ctx: &egui::Context) {
        let Some(detail) = &self.session.detail else {
            return;
        };

        let mut actions = Vec::new();
        let mut close = false;
        let id = detail.requirement.id;

        egui::Window::new(detail.heading())
            .id(egui::Id::new("detail_window"))
            .collapsible(false)
            .resizable(true)
            .min_width(500.0)
            .show(ctx, |ui| {
                egui::Grid::new("detail_fields")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (label, value) in detail.fields() {
                            ui.strong(label);
                            ui.label(value);
                            ui.end_row();
                        }
                    });

                ui.separator();
                ui.strong("Links");

                let mut has_links = false;
                for row in detail.links() {
                    has_links = true;
                    ui.horizontal(|ui| {
                        ui.label(row.direction.arrow());
                        ui.label(
                            RichText::new(row.link_type.keyword())
                                .color(hex_color(edge_color(&row.link_type))),
                        );
                        if ui
                            .link(format!("#{} {}", row.other_id, row.other_title))
                            .clicked()
                        {
                            actions.push(row.open_action());
                        }
                        if let Some(action) = row.delete_action() {
                            if ui.small_button("🗑").on_hover_text("Delete link").clicked() {
                                actions.push(action);
                            }
                        }
                    });
                }
                if !has_links {
                    ui.label(RichText::new("No links").color(Color32::GRAY));
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("✏ Edit").clicked() {
                        actions.push(Action::Edit(id));
                    }
                    if ui.button("Add link").clicked() {
                        actions.push(Action::AddLink(id));
                    }
                    if ui.button("History").clicked() {
                        actions.push(Action::History(id));
                    }
                    if ui.button("🗑 Delete").clicked() {
                        actions.push(Action::Delete(id));
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.session.detail = None;
        }
        self.pending_actions.extend(actions);
    }

    fn show_description(&mut self, ctx: &egui::Context) {
        let Some(description) = &self.session.description else {
            return;
        };

        let mut full = None;
        let mut close = false;

        egui::Window::new(description.heading.as_str())
            .id(egui::Id::new("description_window"))
            .collapsible(false)
            .resizable(true)
            .min_width(400.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                    ui.label(description.description.as_str());
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Show full information").clicked() {
                        full = Some(description.full_action());
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });

        if let Some(action) = full {
            self.pending_actions.push(action);
            close = true;
        }
        if close {
            self.session.description = None;
        }
    }

    fn show_history(&mut self, ctx: &egui::Context) {
        let Some((id, table)) = &self.session.history else {
            return;
        };

        let mut close = false;

        egui::Window::new(format!("History of requirement #{}", id))
            .id(egui::Id::new("history_window"))
            .collapsible(false)
            .resizable(true)
            .min_width(600.0)
            .show(ctx, |ui| {
                if table.is_empty() {
                    ui.label(EMPTY_HISTORY_MESSAGE);
                } else {
                    history_table(ui, table);
                }
                ui.separator();
                if ui.button("Close").clicked() {
                    close = true;
                }
            });

        if close {
            self.session.history = None;
        }
    }

    fn show_projects_window(&mut self, ctx: &egui::Context) {
        if !self.session.show_projects {
            return;
        }

        let mut actions = Vec::new();
        let mut create = false;
        let mut close = false;
        let session = &self.session;

        egui::Window::new("📁 Projects")
            .id(egui::Id::new("projects_window"))
            .collapsible(false)
            .resizable(true)
            .min_width(420.0)
            .show(ctx, |ui| {
                if session.projects.is_empty() {
                    ui.label(EMPTY_PROJECTS_MESSAGE);
                } else {
                    egui::ScrollArea::vertical()
                        .max_height(300.0)
                        .show(ui, |ui| {
                            for project in &session.projects {
                                project_card(ui, project, session.selected_project, &mut actions);
                            }
                        });
                }

                ui.add_space(10.0);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("➕ Create project").clicked() {
                        create = true;
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });

        if create {
            self.session.project_form = Some(ProjectForm::blank());
        }
        if close {
            self.session.show_projects = false;
        }
        self.pending_actions.extend(actions);
    }

    fn show_project_form(&mut self, ctx: &egui::Context) {
        let Some(form) = self.session.project_form.as_mut() else {
            return;
        };

        let mut submit = false;
        let mut cancel = false;

        egui::Window::new(form.heading())
            .id(egui::Id::new("project_form"))
            .collapsible(false)
            .resizable(false)
            .min_width(400.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("project_form_grid")
                    .num_columns(2)
                    .spacing([10.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Name:");
                        ui.text_edit_singleline(&mut form.name);
                        ui.end_row();

                        ui.label("Description:");
                        ui.text_edit_multiline(&mut form.description);
                        ui.end_row();
                    });

                if let Some(error) = &form.error {
                    ui.colored_label(Color32::RED, error.as_str());
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("💾 Save").clicked() {
                        submit = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if submit {
            self.session.submit_project_form();
        }
        if cancel {
            self.session.project_form = None;
        }
    }

    fn show_confirm(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.session.confirm else {
            return;
        };

        let mut answer = None;

        egui::Window::new("Confirm")
            .id(egui::Id::new("confirm_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(pending.message.as_str());
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("No").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if let Some(confirmed) = answer {
            self.session.answer(confirmed);
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.session.alert else {
            return;
        };

        let mut close = false;

        egui::Window::new("Error")
            .id(egui::Id::new("alert_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.colored_label(Color32::RED, message.as_str());
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    close = true;
                }
            });

        if close {
            self.session.alert = None;
        }
    }
}

impl eframe::App for ReqtraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for result in self.worker.poll() {
            self.session.handle_result(result);
        }

        self.show_top_panel(ctx);
        self.show_central_panel(ctx);

        self.show_projects_window(ctx);
        self.show_project_form(ctx);
        self.show_detail(ctx);
        self.show_description(ctx);
        self.show_history(ctx);
        self.show_requirement_form(ctx);
        self.show_link_form(ctx);
        self.show_confirm(ctx);
        self.show_alert(ctx);

        for action in std::mem::take(&mut self.pending_actions) {
            self.session.dispatch(action);
        }
        self.flush_jobs();
    }
}

/// Hex color from the rendering helpers, gray when it does not parse
pub(crate) fn hex_color(hex: &str) -> Color32 {
    parse_hex_color(hex)
        .map(|(r, g, b)| Color32::from_rgb(r, g, b))
        .unwrap_or(Color32::GRAY)
}

fn status_color(status: &RequirementStatus) -> Color32 {
    match status_class(status) {
        "approved" => Color32::from_rgb(39, 174, 96),
        "in-progress" => Color32::from_rgb(243, 156, 18),
        "rejected" => Color32::from_rgb(231, 76, 60),
        _ => Color32::GRAY,
    }
}

fn priority_color(priority: &RequirementPriority) -> Color32 {
    match priority_class(priority) {
        "critical" => Color32::from_rgb(231, 76, 60),
        "high" => Color32::from_rgb(230, 126, 34),
        _ => Color32::GRAY,
    }
}

fn change_color(change_type: &ChangeType) -> Color32 {
    match change_type {
        ChangeType::Create => Color32::from_rgb(39, 174, 96),
        ChangeType::Update => Color32::from_rgb(52, 152, 219),
        ChangeType::Delete => Color32::from_rgb(231, 76, 60),
        ChangeType::Other(_) => Color32::GRAY,
    }
}

/// Combo box over the members of a wire enum, labelled by keyword
fn choice<T: PartialEq + Clone + Display>(
    ui: &mut egui::Ui,
    id: &str,
    current: &mut T,
    options: Vec<T>,
) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .show_ui(ui, |ui| {
            for option in options {
                let label = option.to_string();
                ui.selectable_value(current, option, label);
            }
        });
}

fn badge(ui: &mut egui::Ui, text: &str, color: Color32) {
    egui::Frame::new()
        .fill(color.gamma_multiply(0.2))
        .corner_radius(4.0)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(RichText::new(text).small().color(color));
        });
}

fn card_grid(ui: &mut egui::Ui, requirements: &[Requirement], actions: &mut Vec<Action>) {
    if requirements.is_empty() {
        ui.label(EMPTY_GRID_MESSAGE);
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            for req in requirements {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(CARD_WIDTH);
                    ui.vertical(|ui| requirement_card(ui, req, actions));
                });
            }
        });
    });
}

fn requirement_card(ui: &mut egui::Ui, req: &Requirement, actions: &mut Vec<Action>) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("#{}", req.id)).strong().color(Color32::GRAY));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                actions.push(Action::Delete(req.id));
            }
            if ui.small_button("✏").on_hover_text("Edit").clicked() {
                actions.push(Action::Edit(req.id));
            }
        });
    });

    let title = egui::Label::new(RichText::new(req.title.as_str()).strong().size(15.0))
        .sense(egui::Sense::click());
    if ui.add(title).on_hover_text("Show details").clicked() {
        actions.push(Action::OpenDetail(req.id));
    }

    if !req.description.is_empty() {
        ui.label(truncate_label(&req.description, CARD_DESCRIPTION_LIMIT));
    }

    ui.horizontal_wrapped(|ui| {
        badge(
            ui,
            req.requirement_type.keyword(),
            hex_color(node_color(&req.requirement_type)),
        );
        badge(ui, req.status.keyword(), status_color(&req.status));
        badge(ui, req.priority.keyword(), priority_color(&req.priority));
    });

    for link in &req.outgoing_links {
        let text = format!("{} → #{}", link.link_type.keyword(), link.target_requirement_id);
        if ui.link(text).clicked() {
            actions.push(Action::OpenDetail(link.target_requirement_id));
        }
    }
    for link in &req.incoming_links {
        let text = format!("{} ← #{}", link.link_type.keyword(), link.source_requirement_id);
        if ui.link(text).clicked() {
            actions.push(Action::OpenDetail(link.source_requirement_id));
        }
    }

    let mut info = Vec::new();
    if !req.author.is_empty() {
        info.push(format!("Author: {}", req.author));
    }
    if !req.source.is_empty() {
        info.push(format!("Source: {}", req.source));
    }
    if req.created_at.is_some() {
        info.push(format!(
            "Created: {}",
            format_optional_date(req.created_at.as_deref())
        ));
    }
    for line in info {
        ui.label(RichText::new(line).small().color(Color32::GRAY));
    }

    ui.horizontal(|ui| {
        if ui.small_button("Add link").clicked() {
            actions.push(Action::AddLink(req.id));
        }
        if ui.small_button("History").clicked() {
            actions.push(Action::History(req.id));
        }
    });
}

fn matrix_grid(ui: &mut egui::Ui, matrix: &TraceMatrix, actions: &mut Vec<Action>) {
    if matrix.is_empty() {
        ui.label(EMPTY_MATRIX_MESSAGE);
        return;
    }

    egui::ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("matrix_grid")
            .striped(true)
            .spacing([4.0, 4.0])
            .show(ui, |ui| {
                ui.label("");
                for (col, header) in matrix.headers().iter().enumerate() {
                    let button = ui
                        .button(format!("#{}", header.id))
                        .on_hover_text(header.title.as_str());
                    if button.clicked() {
                        actions.extend(matrix.header_action(col));
                    }
                }
                ui.end_row();

                for (row, (header, cells)) in matrix.headers().iter().zip(matrix.rows()).enumerate() {
                    let label = format!(
                        "#{} {}",
                        header.id,
                        truncate_label(&header.title, MATRIX_HEADER_LIMIT)
                    );
                    if ui.button(label).on_hover_text(header.title.as_str()).clicked() {
                        actions.extend(matrix.header_action(row));
                    }

                    for (col, cell) in cells.iter().enumerate() {
                        match cell {
                            Cell::Diagonal => {
                                ui.label(RichText::new("-").color(Color32::DARK_GRAY));
                            }
                            Cell::Link(link_type) => {
                                let button =
                                    egui::Button::new(RichText::new(cell.label()).color(Color32::WHITE))
                                        .fill(hex_color(edge_color(link_type)));
                                if ui.add(button).clicked() {
                                    actions.extend(matrix.cell_action(row, col));
                                }
                            }
                            Cell::Empty => {
                                ui.label("");
                            }
                        }
                    }
                    ui.end_row();
                }
            });
    });
}

fn history_table(ui: &mut egui::Ui, table: &HistoryTable) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto()) // Date
        .column(Column::auto()) // Change
        .column(Column::auto()) // Actor
        .column(Column::remainder().at_least(250.0)) // Changes
        .max_scroll_height(400.0)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Date");
            });
            header.col(|ui| {
                ui.strong("Change");
            });
            header.col(|ui| {
                ui.strong("Changed by");
            });
            header.col(|ui| {
                ui.strong("Changes");
            });
        })
        .body(|mut body| {
            for row in &table.rows {
                let height = 18.0 * row.changes.len().max(1) as f32;
                body.row(height, |mut cells| {
                    cells.col(|ui| {
                        ui.label(row.date.as_str());
                    });
                    cells.col(|ui| {
                        ui.label(
                            RichText::new(row.change_type.as_str())
                                .color(change_color(&row.change_type)),
                        );
                    });
                    cells.col(|ui| {
                        ui.label(row.actor.as_str());
                    });
                    cells.col(|ui| {
                        ui.vertical(|ui| {
                            for line in &row.changes {
                                ui.label(line.as_str());
                            }
                        });
                    });
                });
            }
        });
}

fn project_card(
    ui: &mut egui::Ui,
    project: &Project,
    selected: Option<ProjectId>,
    actions: &mut Vec<Action>,
) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.strong(project.name.as_str());
            if selected == Some(project.id) {
                ui.label(RichText::new("(open)").small().color(Color32::GRAY));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Delete").clicked() {
                    actions.push(Action::DeleteProject(project.id));
                }
                if ui.small_button("Edit").clicked() {
                    actions.push(Action::EditProject(project.id));
                }
                if ui.small_button("Open").clicked() {
                    actions.push(Action::OpenProject(project.id));
                }
            });
        });
        if !project.description.is_empty() {
            ui.label(project.description.as_str());
        }
        ui.label(
            RichText::new(format!("Project #{}", project.id))
                .small()
                .color(Color32::GRAY),
        );
    });
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_fallback() {
        assert_eq!(hex_color("#27ae60"), Color32::from_rgb(39, 174, 96));
        assert_eq!(hex_color("teal"), Color32::GRAY);
    }

    #[test]
    fn test_status_and_priority_colors() {
        assert_eq!(
            status_color(&RequirementStatus::Approved),
            Color32::from_rgb(39, 174, 96)
        );
        assert_eq!(status_color(&RequirementStatus::Draft), Color32::GRAY);
        assert_eq!(priority_color(&RequirementPriority::Low), Color32::GRAY);
        assert_eq!(
            priority_color(&RequirementPriority::Critical),
            Color32::from_rgb(231, 76, 60)
        );
    }

    #[test]
    fn test_change_colors() {
        assert_eq!(change_color(&ChangeType::Delete), Color32::from_rgb(231, 76, 60));
        assert_eq!(change_color(&ChangeType::Other("merge".into())), Color32::GRAY);
    }
}
