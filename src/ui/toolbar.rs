use crate::app::PlannerApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;

/// Render the top toolbar: menus, month navigation and the month title.
pub fn show_toolbar(app: &mut PlannerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Tasks  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{}  New Task...", icons::PLUS)).clicked() {
                app.open_create_form();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Clear Tasks", icons::TRASH)).clicked() {
                app.show_clear_confirm = true;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button(format!("{}  About", icons::INFO)).clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .button(icons::CARET_LEFT)
            .on_hover_text("Previous month")
            .clicked()
        {
            app.planner.previous_month();
        }
        if ui.button("Today").clicked() {
            app.planner.show_month_of(app.today);
        }
        if ui
            .button(icons::CARET_RIGHT)
            .on_hover_text("Next month")
            .clicked()
        {
            app.planner.next_month();
        }

        ui.add_space(8.0);
        ui.label(
            RichText::new(app.planner.grid().month_start().format("%B %Y").to_string())
                .strong()
                .size(15.0),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if app.planner.filters.is_active() {
                ui.label(
                    RichText::new(format!("{} filtered", icons::FUNNEL))
                        .size(11.0)
                        .weak(),
                );
            }
        });
    });
}
