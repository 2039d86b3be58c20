use crate::model::{Category, Filters, Horizon};
use crate::ui::theme;
use egui::{RichText, Ui};
use egui_phosphor::regular as icons;

/// Actions the filter panel can request beyond editing the filters in place.
pub enum FilterAction {
    None,
    ClearTasks,
}

/// Search, category toggles and the "starts within" horizon.
pub fn show_filter_panel(filters: &mut Filters, ui: &mut Ui) -> FilterAction {
    let mut action = FilterAction::None;

    ui.add_space(2.0);
    ui.label(
        RichText::new(format!("{}  Filters", icons::FUNNEL))
            .strong()
            .size(15.0)
            .color(theme::TEXT_PRIMARY),
    );
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label(RichText::new(icons::MAGNIFYING_GLASS).color(theme::TEXT_DIM));
        ui.add(
            egui::TextEdit::singleline(&mut filters.search)
                .hint_text("Search tasks...")
                .desired_width(f32::INFINITY),
        );
    });

    ui.add_space(6.0);
    ui.label(RichText::new("CATEGORY").size(9.0).color(theme::TEXT_DIM).strong());
    for &category in Category::all() {
        let mut checked = filters.categories.contains(&category);
        ui.horizontal(|ui| {
            let (dot_rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
            ui.painter()
                .circle_filled(dot_rect.center(), 4.0, theme::category_color(category));
            if ui.checkbox(&mut checked, category.label()).changed() {
                filters.toggle_category(category);
            }
        });
    }

    ui.add_space(6.0);
    ui.label(RichText::new("STARTS").size(9.0).color(theme::TEXT_DIM).strong());
    for &horizon in Horizon::all() {
        ui.radio_value(&mut filters.horizon, horizon, horizon.label());
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(
                filters.is_active(),
                egui::Button::new(format!("{}  Reset Filters", icons::ARROW_COUNTER_CLOCKWISE)),
            )
            .clicked()
        {
            filters.reset();
        }
        if ui.button(format!("{}  Clear Tasks", icons::TRASH)).clicked() {
            action = FilterAction::ClearTasks;
        }
    });

    action
}
