use crate::model::calendar::DAYS_PER_WEEK;
use crate::model::gesture::{Edge, GestureOutcome, GestureState, PointerTarget};
use crate::model::layout::WeekRow;
use crate::model::{Planner, Task};
use crate::ui::theme;
use chrono::{Datelike, NaiveDate};
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use uuid::Uuid;

const WEEKDAYS: [&str; DAYS_PER_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One painted piece of a task inside a week row.
#[derive(Debug, Clone)]
struct BarShape {
    task_id: Uuid,
    rect: Rect,
    /// Present only on the segment that holds the task's real start/end day.
    start_handle: Option<Rect>,
    end_handle: Option<Rect>,
}

#[derive(Debug, Clone)]
struct WeekShape {
    top: f32,
    height: f32,
    days: [NaiveDate; DAYS_PER_WEEK],
}

/// Screen geometry of the month body, rebuilt every frame from the layout.
#[derive(Debug, Clone)]
struct GridGeometry {
    origin: Pos2,
    column_width: f32,
    weeks: Vec<WeekShape>,
    bars: Vec<BarShape>,
}

impl GridGeometry {
    fn new(layout: &[WeekRow], tasks: &[Task], origin: Pos2, width: f32, fill_height: f32) -> Self {
        let column_width = (width / DAYS_PER_WEEK as f32).max(1.0);

        let natural: Vec<f32> = layout
            .iter()
            .map(|week| {
                let lanes = week.lanes as f32;
                let lanes_height = lanes * (theme::LANE_HEIGHT + theme::LANE_GAP);
                (theme::DAY_LABEL_HEIGHT + lanes_height + theme::LANE_GAP)
                    .max(theme::MIN_WEEK_HEIGHT)
            })
            .collect();
        let total: f32 = natural.iter().sum();
        let extra = if layout.is_empty() || fill_height <= total {
            0.0
        } else {
            (fill_height - total) / layout.len() as f32
        };

        let mut weeks = Vec::with_capacity(layout.len());
        let mut bars = Vec::new();
        let mut top = origin.y;
        for (week, height) in layout.iter().zip(natural) {
            let height = height + extra;
            for placed in &week.segments {
                let seg = &placed.segment;
                let x = origin.x + seg.start_column as f32 * column_width + theme::BAR_INSET;
                let y = top
                    + theme::DAY_LABEL_HEIGHT
                    + placed.lane as f32 * (theme::LANE_HEIGHT + theme::LANE_GAP);
                let rect = Rect::from_min_size(
                    Pos2::new(x, y),
                    Vec2::new(
                        (seg.span as f32 * column_width - theme::BAR_INSET * 2.0).max(4.0),
                        theme::LANE_HEIGHT,
                    ),
                );

                let task = tasks.iter().find(|t| t.id == seg.task_id);
                let first = week.days[seg.start_column];
                let last = week.days[seg.end_column()];
                let handle = |at_x: f32| {
                    Rect::from_min_max(
                        Pos2::new(at_x - theme::HANDLE_WIDTH * 0.5, rect.top()),
                        Pos2::new(at_x + theme::HANDLE_WIDTH * 0.5, rect.bottom()),
                    )
                };
                bars.push(BarShape {
                    task_id: seg.task_id,
                    rect,
                    start_handle: task
                        .filter(|t| t.start == first)
                        .map(|_| handle(rect.left())),
                    end_handle: task.filter(|t| t.end == last).map(|_| handle(rect.right())),
                });
            }
            weeks.push(WeekShape {
                top,
                height,
                days: week.days,
            });
            top += height;
        }

        Self {
            origin,
            column_width,
            weeks,
            bars,
        }
    }

    fn height(&self) -> f32 {
        self.weeks.iter().map(|w| w.height).sum()
    }

    fn cell_rect(&self, week: &WeekShape, column: usize) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.origin.x + column as f32 * self.column_width, week.top),
            Vec2::new(self.column_width, week.height),
        )
    }

    fn day_at(&self, pos: Pos2) -> Option<NaiveDate> {
        let dx = pos.x - self.origin.x;
        if dx < 0.0 {
            return None;
        }
        let column = (dx / self.column_width) as usize;
        if column >= DAYS_PER_WEEK {
            return None;
        }
        self.weeks
            .iter()
            .find(|w| pos.y >= w.top && pos.y < w.top + w.height)
            .map(|w| w.days[column])
    }

    /// Handles win over bars, bars over empty cells.
    fn target_at(&self, pos: Pos2) -> Option<PointerTarget> {
        for bar in self.bars.iter().rev() {
            if bar.start_handle.is_some_and(|r| r.expand(2.0).contains(pos)) {
                return Some(PointerTarget::ResizeHandle(bar.task_id, Edge::Start));
            }
            if bar.end_handle.is_some_and(|r| r.expand(2.0).contains(pos)) {
                return Some(PointerTarget::ResizeHandle(bar.task_id, Edge::End));
            }
        }
        let day = self.day_at(pos)?;
        if let Some(bar) = self.bars.iter().rev().find(|b| b.rect.contains(pos)) {
            return Some(PointerTarget::TaskBar(bar.task_id, day));
        }
        Some(PointerTarget::Cell(day))
    }
}

/// Result of one frame of grid interaction.
#[derive(Debug, Clone)]
pub struct GridInteraction {
    /// A form request or click the app has to act on.
    pub outcome: GestureOutcome,
    pub changed: bool,
}

impl Default for GridInteraction {
    fn default() -> Self {
        Self {
            outcome: GestureOutcome::None,
            changed: false,
        }
    }
}

/// Render the month grid and feed pointer input into the planner's gestures.
pub fn show_month_grid(
    planner: &mut Planner,
    today: NaiveDate,
    interactive: bool,
    ui: &mut Ui,
) -> GridInteraction {
    let mut interaction = GridInteraction::default();
    let layout = planner.layout(today);
    let grid = planner.grid();
    debug_assert_eq!(layout.len(), grid.row_count());
    let available = ui.available_size();

    let (header_rect, _) = ui.allocate_exact_size(
        Vec2::new(available.x, theme::WEEKDAY_HEADER_HEIGHT),
        Sense::hover(),
    );
    draw_weekday_header(ui.painter(), header_rect);
    let fill_height = ui.available_height();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let origin = ui.cursor().min;
            let width = ui.available_width();
            let geometry = GridGeometry::new(
                &layout,
                planner.tasks(),
                origin,
                width,
                fill_height,
            );
            let (response, painter) =
                ui.allocate_painter(Vec2::new(width, geometry.height()), Sense::click_and_drag());
            planner.set_pixels_per_day(geometry.column_width);

            // ── Input ────────────────────────────────────────────────
            let (pressed, released, pointer) = ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_released(),
                    i.pointer.interact_pos(),
                )
            });

            if interactive {
                if pressed && response.contains_pointer() {
                    if let Some(pos) = pointer {
                        if let Some(target) = geometry.target_at(pos) {
                            planner.pointer_down(target, pos.x);
                        }
                    }
                }

                let in_flight = matches!(
                    planner.gestures().state(),
                    GestureState::Selecting(_)
                        | GestureState::Dragging(_)
                        | GestureState::Resizing(_)
                );
                if in_flight {
                    if let Some(pos) = pointer {
                        match geometry.day_at(pos) {
                            Some(day) => planner.pointer_enter(day),
                            None => planner.pointer_leave(),
                        }
                        if planner.pointer_move(pos.x) {
                            interaction.changed = true;
                        }
                    }
                    if released {
                        let drop_day = pointer.and_then(|pos| geometry.day_at(pos));
                        let before = planner.tasks().to_vec();
                        interaction.outcome = planner.pointer_up(drop_day);
                        interaction.changed |= before.as_slice() != planner.tasks();
                    }
                }
            }

            // ── Cells ────────────────────────────────────────────────
            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            let selection = planner.gestures().selection_range();
            let drop_range = planner.gestures().drop_preview().and_then(|(id, day)| {
                planner
                    .get(id)
                    .map(|t| (day, day + chrono::Duration::days(t.day_count() - 1)))
            });

            for week in &geometry.weeks {
                for (column, &day) in week.days.iter().enumerate() {
                    let cell = geometry.cell_rect(week, column);
                    let fill = if grid.is_in_month(day) {
                        theme::BG_CELL
                    } else {
                        theme::BG_CELL_OUTSIDE
                    };
                    painter.rect_filled(cell, 0.0, fill);

                    if selection.is_some_and(|(s, e)| s <= day && day <= e) {
                        painter.rect_filled(cell, 0.0, theme::BG_SELECTED);
                    }
                    if drop_range.is_some_and(|(s, e)| s <= day && day <= e) {
                        painter.rect_filled(cell, 0.0, theme::BG_DROP_TARGET);
                    }
                    painter.rect_stroke(cell, 0.0, Stroke::new(0.5, theme::GRID_LINE));

                    draw_day_label(&painter, cell, day, grid.is_in_month(day), day == today);
                }
            }

            // ── Bars ─────────────────────────────────────────────────
            let dragged = match planner.gestures().state() {
                GestureState::Dragging(session) => Some(session.task_id),
                GestureState::Resizing(session) => Some(session.task_id),
                _ => None,
            };
            let hover = ui.input(|i| i.pointer.hover_pos());
            let mut hovered_task = None;

            for bar in &geometry.bars {
                let Some(task) = planner.get(bar.task_id) else {
                    continue;
                };
                let hovered = hover.is_some_and(|p| bar.rect.expand(2.0).contains(p))
                    && response.contains_pointer();
                let alpha = if dragged == Some(task.id) && drop_range.is_some() {
                    0.45
                } else {
                    1.0
                };
                draw_task_bar(&painter, bar, task, alpha);

                if hovered || dragged == Some(task.id) {
                    draw_handles(&painter, bar);
                }
                if hovered {
                    hovered_task = Some(task.id);
                }
            }

            // ── Cursor & tooltip ─────────────────────────────────────
            match (planner.gestures().state(), hover.and_then(|p| geometry.target_at(p))) {
                (GestureState::Resizing(_), _) => {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal)
                }
                (GestureState::Dragging(_), _) => {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing)
                }
                (_, Some(PointerTarget::ResizeHandle(..))) if response.contains_pointer() => {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal)
                }
                (_, Some(PointerTarget::TaskBar(..))) if response.contains_pointer() => {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grab)
                }
                _ => {}
            }

            if planner.gestures().is_idle() {
                if let Some(task) = hovered_task.and_then(|id| planner.get(id)) {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new(("task-tip", task.id)),
                        |ui| {
                            ui.strong(&task.name);
                            ui.label(task.category.label());
                            ui.label(format!(
                                "{} → {} ({} days)",
                                task.start.format("%d/%m/%Y"),
                                task.end.format("%d/%m/%Y"),
                                task.day_count(),
                            ));
                        },
                    );
                }
            }
        });

    interaction
}

fn draw_weekday_header(painter: &egui::Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, theme::BG_HEADER);
    let column_width = rect.width() / DAYS_PER_WEEK as f32;
    for (i, name) in WEEKDAYS.iter().enumerate() {
        let x = rect.left() + (i as f32 + 0.5) * column_width;
        painter.text(
            Pos2::new(x, rect.center().y),
            egui::Align2::CENTER_CENTER,
            *name,
            theme::font_header(),
            theme::TEXT_SECONDARY,
        );
    }
    painter.line_segment(
        [rect.left_bottom(), rect.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_day_label(
    painter: &egui::Painter,
    cell: Rect,
    day: NaiveDate,
    in_month: bool,
    is_today: bool,
) {
    let pos = Pos2::new(cell.right() - 12.0, cell.top() + theme::DAY_LABEL_HEIGHT / 2.0);
    if is_today {
        painter.circle_filled(pos, 9.0, theme::TODAY_MARK);
    }
    let color = if is_today {
        Color32::WHITE
    } else if in_month {
        theme::TEXT_PRIMARY
    } else {
        theme::TEXT_DIM
    };
    painter.text(
        pos,
        egui::Align2::CENTER_CENTER,
        day.day().to_string(),
        theme::font_day(),
        color,
    );
}

fn draw_task_bar(painter: &egui::Painter, bar: &BarShape, task: &Task, alpha: f32) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let color = theme::category_color(task.category).gamma_multiply(alpha);

    painter.rect_filled(
        bar.rect.translate(Vec2::new(1.0, 1.5)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar.rect, rounding, color);

    if bar.rect.width() > 24.0 {
        let galley =
            painter.layout_no_wrap(task.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar.rect.shrink(2.0));
        let text_y = bar.rect.top() + (bar.rect.height() - galley.size().y) / 2.0;
        clipped.galley(Pos2::new(bar.rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }
}

fn draw_handles(painter: &egui::Painter, bar: &BarShape) {
    let handle_h = bar.rect.height() * 0.55;
    let handle_y = bar.rect.center().y - handle_h / 2.0;
    if bar.start_handle.is_some() {
        let lh = Rect::from_min_size(
            Pos2::new(bar.rect.left() + 1.5, handle_y),
            Vec2::new(3.0, handle_h),
        );
        painter.rect_filled(lh, Rounding::same(1.5), theme::HANDLE_COLOR);
    }
    if bar.end_handle.is_some() {
        let rh = Rect::from_min_size(
            Pos2::new(bar.rect.right() - 4.5, handle_y),
            Vec2::new(3.0, handle_h),
        );
        painter.rect_filled(rh, Rounding::same(1.5), theme::HANDLE_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::calendar::MonthGrid;
    use crate::model::layout::layout_weeks;
    use crate::model::Category;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// June 2024 at 70px per column, starting at the origin.
    fn geometry(tasks: &[Task]) -> GridGeometry {
        let grid = MonthGrid::for_anchor(day(2024, 6, 15));
        let layout = layout_weeks(tasks, &grid);
        GridGeometry::new(&layout, tasks, Pos2::ZERO, 490.0, 0.0)
    }

    fn row_y(week: usize) -> f32 {
        week as f32 * theme::MIN_WEEK_HEIGHT + theme::DAY_LABEL_HEIGHT + theme::LANE_HEIGHT / 2.0
    }

    #[test]
    fn empty_cells_map_to_days() {
        let g = geometry(&[]);
        assert_eq!(g.weeks.len(), 6);
        assert_eq!(g.day_at(Pos2::new(5.0, 5.0)), Some(day(2024, 5, 26)));
        assert_eq!(g.day_at(Pos2::new(485.0, g.height() - 1.0)), Some(day(2024, 7, 6)));
        assert_eq!(g.day_at(Pos2::new(500.0, 5.0)), None);
        assert_eq!(g.day_at(Pos2::new(5.0, g.height() + 1.0)), None);
        assert_eq!(
            g.target_at(Pos2::new(75.0, 5.0)),
            Some(PointerTarget::Cell(day(2024, 5, 27)))
        );
    }

    #[test]
    fn bars_and_handles_are_hit_before_cells() {
        // Tue 4th to Thu 6th, second week row.
        let task = Task::new("Design", Category::ToDo, day(2024, 6, 4), day(2024, 6, 6));
        let g = geometry(std::slice::from_ref(&task));
        let y = row_y(1);

        assert_eq!(
            g.target_at(Pos2::new(3.0 * 70.0 + 35.0, y)),
            Some(PointerTarget::TaskBar(task.id, day(2024, 6, 5)))
        );
        assert_eq!(
            g.target_at(Pos2::new(2.0 * 70.0 + theme::BAR_INSET, y)),
            Some(PointerTarget::ResizeHandle(task.id, Edge::Start))
        );
        assert_eq!(
            g.target_at(Pos2::new(5.0 * 70.0 - theme::BAR_INSET, y)),
            Some(PointerTarget::ResizeHandle(task.id, Edge::End))
        );
        // Below the only lane is empty cell space.
        assert_eq!(
            g.target_at(Pos2::new(3.0 * 70.0 + 35.0, 80.0 + theme::MIN_WEEK_HEIGHT)),
            Some(PointerTarget::Cell(day(2024, 6, 5)))
        );
    }

    #[test]
    fn clipped_segments_only_carry_their_real_edges() {
        // Thu 6th to Tue 11th wraps into the third row.
        let task = Task::new("Build", Category::Review, day(2024, 6, 6), day(2024, 6, 11));
        let g = geometry(std::slice::from_ref(&task));
        assert_eq!(g.bars.len(), 2);
        assert!(g.bars[0].start_handle.is_some());
        assert!(g.bars[0].end_handle.is_none());
        assert!(g.bars[1].start_handle.is_none());
        assert!(g.bars[1].end_handle.is_some());
    }

    #[test]
    fn rows_grow_to_fit_lanes_and_fill_space() {
        let tasks: Vec<Task> = (0..6)
            .map(|i| Task::new(format!("t{i}"), Category::ToDo, day(2024, 6, 3), day(2024, 6, 4)))
            .collect();
        let grid = MonthGrid::for_anchor(day(2024, 6, 15));
        let layout = layout_weeks(&tasks, &grid);
        let g = GridGeometry::new(&layout, &tasks, Pos2::ZERO, 490.0, 0.0);
        assert!(g.weeks[1].height > theme::MIN_WEEK_HEIGHT);
        assert_eq!(g.weeks[0].height, theme::MIN_WEEK_HEIGHT);

        let filled = GridGeometry::new(&layout, &tasks, Pos2::ZERO, 490.0, 2000.0);
        assert!((filled.height() - 2000.0).abs() < 0.01);
    }
}
