use crate::app::PlannerApp;
use crate::model::planner::TaskDraft;
use crate::model::{Category, Task};
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Window};
use uuid::Uuid;

/// Where the task form came from, which decides how it is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Confirming a drag-selected range on the grid.
    Selection,
    /// "Add Task" without a selection; dates are picked in the form.
    Free,
    Edit(Uuid),
}

/// Fields of the create/edit task dialog.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub mode: FormMode,
    pub name: String,
    pub category: Category,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Inline validation message.
    pub error: Option<String>,
}

impl TaskForm {
    pub fn for_selection(start: NaiveDate, end: NaiveDate, category: Category) -> Self {
        Self {
            mode: FormMode::Selection,
            name: String::new(),
            category,
            start,
            end,
            error: None,
        }
    }

    pub fn free(day: NaiveDate, category: Category) -> Self {
        Self {
            mode: FormMode::Free,
            ..Self::for_selection(day, day, category)
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit(task.id),
            name: task.name.clone(),
            category: task.category,
            start: task.start,
            end: task.end,
            error: None,
        }
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            category: self.category,
            start: self.start,
            end: self.end,
        }
    }
}

pub enum FormAction {
    None,
    Submit,
    Cancel,
    Delete(Uuid),
}

/// Render the create/edit task dialog.
pub fn show_task_form(form: &mut TaskForm, ctx: &Context) -> FormAction {
    let mut action = FormAction::None;
    let title = match form.mode {
        FormMode::Edit(_) => "Edit Task",
        _ => "New Task",
    };

    Window::new(RichText::new(title).strong().size(14.0))
        .id(egui::Id::new("task_form"))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("task_form_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    let name = ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut form.name).hint_text("Task name..."),
                    );
                    if name.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        action = FormAction::Submit;
                    }
                    if name.changed() {
                        form.error = None;
                    }
                    ui.end_row();

                    ui.label(RichText::new("Category").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("task_form_category")
                        .selected_text(form.category.label())
                        .width(220.0)
                        .show_ui(ui, |ui| {
                            for &category in Category::all() {
                                ui.selectable_value(&mut form.category, category, category.label());
                            }
                        });
                    ui.end_row();

                    match form.mode {
                        FormMode::Selection => {
                            ui.label(RichText::new("Dates").color(theme::TEXT_SECONDARY));
                            ui.label(format!(
                                "{} → {}",
                                form.start.format("%d/%m/%Y"),
                                form.end.format("%d/%m/%Y")
                            ));
                            ui.end_row();
                        }
                        FormMode::Free | FormMode::Edit(_) => {
                            ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                            ui.add(
                                egui_extras::DatePickerButton::new(&mut form.start)
                                    .id_salt("task_form_start"),
                            );
                            ui.end_row();

                            ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                            ui.add(
                                egui_extras::DatePickerButton::new(&mut form.end)
                                    .id_salt("task_form_end"),
                            );
                            ui.end_row();
                        }
                    }
                });

            if let Some(error) = &form.error {
                ui.add_space(4.0);
                ui.label(RichText::new(error).color(theme::TEXT_ERROR));
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let label = match form.mode {
                    FormMode::Edit(_) => "Save",
                    _ => "Create",
                };
                let submit_btn = egui::Button::new(RichText::new(label).color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], submit_btn).clicked() {
                    action = FormAction::Submit;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = FormAction::Cancel;
                }
                if let FormMode::Edit(id) = form.mode {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let delete_btn =
                            egui::Button::new(RichText::new("Delete").color(theme::TEXT_ERROR));
                        if ui.add_sized([80.0, 28.0], delete_btn).clicked() {
                            action = FormAction::Delete(id);
                        }
                    });
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = FormAction::Cancel;
    }
    action
}

/// Ask before wiping every task. Returns `Some(true)` when confirmed.
pub fn show_clear_confirm(ctx: &Context) -> Option<bool> {
    let mut answer = None;
    Window::new(RichText::new("Clear Tasks").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label("Delete every task? This cannot be undone.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let clear_btn = egui::Button::new(RichText::new("Clear").color(Color32::WHITE))
                    .fill(theme::TODAY_MARK)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], clear_btn).clicked() {
                    answer = Some(true);
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    answer = Some(false);
                }
            });
        });
    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        answer = Some(false);
    }
    answer
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut PlannerApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Month Planner").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag across days to add a task,");
                ui.label("drag bars to move, drag edges to resize.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn edit_form_starts_from_task() {
        let task = Task::new("Design", Category::Review, day(2024, 6, 1), day(2024, 6, 3));
        let form = TaskForm::edit(&task);
        assert_eq!(form.mode, FormMode::Edit(task.id));
        assert_eq!(
            form.draft(),
            TaskDraft {
                name: "Design".into(),
                category: Category::Review,
                start: day(2024, 6, 1),
                end: day(2024, 6, 3),
            }
        );
    }

    #[test]
    fn free_form_covers_one_day() {
        let form = TaskForm::free(day(2024, 6, 9), Category::InProgress);
        assert_eq!(form.mode, FormMode::Free);
        assert_eq!((form.start, form.end), (day(2024, 6, 9), day(2024, 6, 9)));
        assert!(form.name.is_empty());
    }
}
