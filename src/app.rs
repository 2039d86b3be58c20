use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::PlannerConfig;
use crate::io::store::FileStore;
use crate::model::{Category, GestureOutcome, Planner};
use crate::ui;
use crate::ui::dialogs::{FormAction, FormMode, TaskForm};

/// Main application state.
pub struct PlannerApp {
    pub planner: Planner,
    pub today: NaiveDate,
    pub default_category: Category,

    // Dialog state
    pub form: Option<TaskForm>,
    pub show_about: bool,
    pub show_clear_confirm: bool,

    // Status message
    pub status_message: String,
}

impl PlannerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: PlannerConfig) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let today = chrono::Local::now().date_naive();
        let store = FileStore::in_data_dir();
        tracing::info!(dir = ?store.dir(), "opened task store");
        let planner = Planner::open(Box::new(store), &config, today);

        Self {
            status_message: format!("{} tasks", planner.tasks().len()),
            planner,
            today,
            default_category: config.default_category,
            form: None,
            show_about: false,
            show_clear_confirm: false,
        }
    }

    // --- Task operations ---

    pub fn open_create_form(&mut self) {
        self.planner.cancel_gesture();
        self.form = Some(TaskForm::free(self.today, self.default_category));
    }

    pub fn open_edit_form(&mut self, id: Uuid) {
        if let Some(task) = self.planner.get(id) {
            self.form = Some(TaskForm::edit(task));
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let result = match form.mode {
            FormMode::Selection => self.planner.submit_selection(&form.name, form.category),
            FormMode::Free => self.planner.create(form.draft()).map(|_| ()),
            FormMode::Edit(id) => self.planner.update(id, form.draft()),
        };
        match result {
            Ok(()) => {
                self.status_message = match form.mode {
                    FormMode::Edit(_) => format!("Updated '{}'", form.name.trim()),
                    _ => format!("Added '{}'", form.name.trim()),
                };
                self.form = None;
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }

    fn cancel_form(&mut self) {
        if let Some(TaskForm {
            mode: FormMode::Selection,
            ..
        }) = self.form
        {
            self.planner.cancel_gesture();
        }
        self.form = None;
    }

    pub fn delete_task(&mut self, id: Uuid) {
        let name = self.planner.get(id).map(|t| t.name.clone()).unwrap_or_default();
        if self.planner.delete(id) {
            self.status_message = format!("Deleted '{name}'");
        }
        if matches!(&self.form, Some(form) if form.mode == FormMode::Edit(id)) {
            self.form = None;
        }
    }

    pub fn clear_tasks(&mut self) {
        self.planner.clear_all();
        self.form = None;
        self.status_message = "All tasks cleared".to_string();
    }

    fn handle_grid_outcome(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::OpenCreateForm { start, end } => {
                self.form = Some(TaskForm::for_selection(start, end, self.default_category));
            }
            GestureOutcome::Clicked(id) => self.open_edit_form(id),
            GestureOutcome::Edit(_) | GestureOutcome::None => {}
        }
    }

    fn any_dialog_open(&self) -> bool {
        self.form.is_some() || self.show_about || self.show_clear_confirm
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.today = chrono::Local::now().date_naive();

        // Escape abandons a drag in progress; open dialogs handle their own Escape.
        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if escape && !self.any_dialog_open() && !self.planner.gestures().is_idle() {
            self.planner.cancel_gesture();
            self.status_message = "Cancelled".to_string();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_STATUS)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.planner.tasks().len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        if let Some(err) = self.planner.last_store_error() {
                            ui.label(
                                egui::RichText::new(format!("Not saved: {err}"))
                                    .size(10.5)
                                    .color(ui::theme::TEXT_ERROR),
                            );
                        }
                    });
                });
            });

        // Left panel: filters + task list
        let mut filter_action = ui::filter_panel::FilterAction::None;
        let mut task_action = ui::task_table::TaskTableAction::None;
        egui::SidePanel::left("task_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .min_width(220.0)
            .max_width(ui::theme::SIDE_PANEL_WIDTH * 2.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                filter_action = ui::filter_panel::show_filter_panel(&mut self.planner.filters, ui);
                ui.add_space(6.0);
                ui.separator();

                let visible = self.planner.visible_tasks(self.today);
                task_action = ui::task_table::show_task_table(
                    &visible,
                    self.planner.tasks().len(),
                    self.today,
                    ui,
                );
            });

        match filter_action {
            ui::filter_panel::FilterAction::ClearTasks => self.show_clear_confirm = true,
            ui::filter_panel::FilterAction::None => {}
        }
        match task_action {
            ui::task_table::TaskTableAction::Edit(id) => self.open_edit_form(id),
            ui::task_table::TaskTableAction::Delete(id) => self.delete_task(id),
            ui::task_table::TaskTableAction::Add => self.open_create_form(),
            ui::task_table::TaskTableAction::None => {}
        }

        // Central panel: month grid
        let grid_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interactive = !self.any_dialog_open();
        let mut grid = ui::month_grid::GridInteraction::default();
        egui::CentralPanel::default().frame(grid_frame).show(ctx, |ui| {
            grid = ui::month_grid::show_month_grid(&mut self.planner, self.today, interactive, ui);
        });
        if grid.changed {
            self.status_message = "Tasks updated".to_string();
        }
        self.handle_grid_outcome(grid.outcome);

        // Dialogs
        if let Some(form) = self.form.as_mut() {
            match ui::dialogs::show_task_form(form, ctx) {
                FormAction::Submit => self.submit_form(),
                FormAction::Cancel => self.cancel_form(),
                FormAction::Delete(id) => self.delete_task(id),
                FormAction::None => {}
            }
        }
        if self.show_clear_confirm {
            if let Some(confirmed) = ui::dialogs::show_clear_confirm(ctx) {
                if confirmed {
                    self.clear_tasks();
                }
                self.show_clear_confirm = false;
            }
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
