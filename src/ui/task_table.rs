use crate::model::Task;
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use uuid::Uuid;

/// Actions that the task list can request.
pub enum TaskTableAction {
    None,
    Edit(Uuid),
    Delete(Uuid),
    Add,
}

/// Render the visible (filtered) tasks as a compact list.
pub fn show_task_table(
    tasks: &[&Task],
    total: usize,
    today: NaiveDate,
    ui: &mut Ui,
) -> TaskTableAction {
    let mut action = TaskTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Tasks")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(4.0);
        let count = if tasks.len() == total {
            format!("({total})")
        } else {
            format!("({} of {total})", tasks.len())
        };
        ui.label(RichText::new(count).size(11.0).color(theme::TEXT_DIM));
    });
    ui.add_space(4.0);

    let btn = egui::Button::new(
        RichText::new("＋  Add Task").color(Color32::WHITE).size(12.0),
    )
    .fill(theme::ACCENT)
    .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = TaskTableAction::Add;
    }

    ui.add_space(6.0);
    ui.separator();

    if tasks.is_empty() {
        ui.add_space(8.0);
        ui.label(RichText::new("No tasks to show").color(theme::TEXT_DIM));
        return action;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, task) in tasks.iter().enumerate() {
                let row_bg = if i % 2 == 0 { theme::BG_PANEL } else { theme::BG_DARK };

                let frame = egui::Frame {
                    fill: row_bg,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    outer_margin: egui::Margin::ZERO,
                    stroke: egui::Stroke::NONE,
                    shadow: egui::epaint::Shadow::NONE,
                };

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;

                        let (dot_rect, _) =
                            ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                        ui.painter().circle_filled(
                            dot_rect.center(),
                            3.0,
                            theme::category_color(task.category),
                        );

                        // Tasks running today stand out.
                        let mut name = RichText::new(&task.name).size(12.0);
                        if task.covers(today) {
                            name = name.strong().color(Color32::WHITE);
                        }
                        ui.add(egui::Label::new(name).truncate());

                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                ui.spacing_mut().item_spacing.x = 4.0;

                                let del_btn = ui.add(
                                    egui::Button::new(
                                        RichText::new("✕").size(10.0).color(theme::TEXT_DIM),
                                    )
                                    .frame(false),
                                );
                                if del_btn.on_hover_text("Delete task").clicked() {
                                    action = TaskTableAction::Delete(task.id);
                                }

                                ui.label(
                                    RichText::new(format!(
                                        "{} → {}",
                                        task.start.format("%m/%d"),
                                        task.end.format("%m/%d")
                                    ))
                                    .size(10.0)
                                    .color(theme::TEXT_SECONDARY),
                                );
                            },
                        );
                    });
                });

                let row_click = ui.interact(
                    frame_resp.response.rect,
                    egui::Id::new(("task-row", task.id)),
                    egui::Sense::click(),
                );
                if row_click.on_hover_text(task.category.label()).clicked() {
                    action = TaskTableAction::Edit(task.id);
                }

                ui.add_space(1.0);
            }
        });

    action
}
