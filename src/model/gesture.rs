//! Pointer gesture state machine for the month grid.
//!
//! The chart translates raw toolkit input into four calls: [`GestureResolver::pointer_down`],
//! [`GestureResolver::pointer_enter`], [`GestureResolver::pointer_move`] and
//! [`GestureResolver::pointer_up`]. The resolver never touches the task book
//! itself; it hands back a [`GestureOutcome`] for the planner to apply.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use super::task::{offset_day, Category, Task};
use crate::error::PlannerError;

/// Which end of a task bar a resize handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// What the pointer was pressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// An empty part of a day cell.
    Cell(NaiveDate),
    /// The body of a task bar, and the day cell under the pointer.
    TaskBar(Uuid, NaiveDate),
    /// A resize handle on one edge of a task bar.
    ResizeHandle(Uuid, Edge),
}

/// Days covered by a drag-select, in pointer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSelection {
    pub anchor_day: NaiveDate,
    pub current_day: NaiveDate,
}

impl DragSelection {
    /// The selection as an ordered inclusive range.
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (
            self.anchor_day.min(self.current_day),
            self.anchor_day.max(self.current_day),
        )
    }
}

/// A task bar being dragged to a new start day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSession {
    pub task_id: Uuid,
    pub original_start: NaiveDate,
    pub grab_day: NaiveDate,
    pub hover_day: Option<NaiveDate>,
    moved: bool,
}

/// A task edge being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub task_id: Uuid,
    pub edge: Edge,
    pub pointer_origin_x: f32,
    /// Day numbers (days since 0001-01-01) of the range at pointer-down.
    pub original_start_index: i32,
    pub original_end_index: i32,
    pub pixels_per_day: f32,
}

impl ResizeSession {
    /// Whole days the pointer has travelled since the last applied step.
    fn step_days(&self, x: f32) -> i64 {
        if self.pixels_per_day <= 0.0 {
            return 0;
        }
        ((x - self.pointer_origin_x) / self.pixels_per_day).round() as i64
    }

    fn original_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((
            NaiveDate::from_num_days_from_ce_opt(self.original_start_index)?,
            NaiveDate::from_num_days_from_ce_opt(self.original_end_index)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Selecting(DragSelection),
    /// The create form is open for this range.
    AwaitingConfirmation { start: NaiveDate, end: NaiveDate },
    Dragging(MoveSession),
    Resizing(ResizeSession),
}

/// A semantic change to the task book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    Create {
        name: String,
        category: Category,
        start: NaiveDate,
        end: NaiveDate,
    },
    Move { id: Uuid, delta_days: i64 },
    Resize { id: Uuid, start: NaiveDate, end: NaiveDate },
}

/// What the caller should do after feeding an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    None,
    OpenCreateForm { start: NaiveDate, end: NaiveDate },
    Edit(TaskEdit),
    /// A task bar was pressed and released without moving.
    Clicked(Uuid),
}

#[derive(Debug, Clone)]
pub struct GestureResolver {
    state: GestureState,
    pixels_per_day: f32,
}

impl Default for GestureResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureResolver {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            pixels_per_day: 1.0,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Width of one grid column, used to convert pointer travel into days.
    pub fn set_pixels_per_day(&mut self, pixels: f32) {
        if pixels > 0.0 {
            self.pixels_per_day = pixels;
        }
    }

    /// Range to highlight while selecting or while the create form is open.
    pub fn selection_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match &self.state {
            GestureState::Selecting(sel) => Some(sel.range()),
            GestureState::AwaitingConfirmation { start, end } => Some((*start, *end)),
            _ => None,
        }
    }

    /// Day cell a dragged task would land on, if any.
    pub fn drop_preview(&self) -> Option<(Uuid, NaiveDate)> {
        match &self.state {
            GestureState::Dragging(session) if session.moved => {
                session.hover_day.map(|d| (session.task_id, d))
            }
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, target: PointerTarget, x: f32, tasks: &[Task]) {
        match self.state {
            GestureState::AwaitingConfirmation { .. } => {
                tracing::debug!(?target, "pointer down ignored while form is open");
                return;
            }
            GestureState::Idle => {}
            _ => {
                tracing::debug!(state = ?self.state, "pointer down mid-gesture; restarting");
                self.state = GestureState::Idle;
            }
        }

        self.state = match target {
            PointerTarget::Cell(day) => GestureState::Selecting(DragSelection {
                anchor_day: day,
                current_day: day,
            }),
            PointerTarget::TaskBar(id, day) => match tasks.iter().find(|t| t.id == id) {
                Some(task) => GestureState::Dragging(MoveSession {
                    task_id: id,
                    original_start: task.start,
                    grab_day: day,
                    hover_day: Some(day),
                    moved: false,
                }),
                None => GestureState::Idle,
            },
            PointerTarget::ResizeHandle(id, edge) => match tasks.iter().find(|t| t.id == id) {
                Some(task) => GestureState::Resizing(ResizeSession {
                    task_id: id,
                    edge,
                    pointer_origin_x: x,
                    original_start_index: task.start.num_days_from_ce(),
                    original_end_index: task.end.num_days_from_ce(),
                    pixels_per_day: self.pixels_per_day,
                }),
                None => GestureState::Idle,
            },
        };
        tracing::debug!(state = ?self.state, "gesture started");
    }

    /// The pointer entered the cell for `day` while the button is held.
    pub fn pointer_enter(&mut self, day: NaiveDate) {
        match &mut self.state {
            GestureState::Selecting(sel) => sel.current_day = day,
            GestureState::Dragging(session) => {
                session.hover_day = Some(day);
                if day != session.grab_day {
                    session.moved = true;
                }
            }
            _ => {}
        }
    }

    /// The pointer left every day cell while dragging a task.
    pub fn pointer_leave(&mut self) {
        if let GestureState::Dragging(session) = &mut self.state {
            session.hover_day = None;
            session.moved = true;
        }
    }

    /// Horizontal pointer movement. Only meaningful while resizing.
    ///
    /// Reads the live task each tick and rebases the origin after every
    /// applied step, so deltas are incremental.
    pub fn pointer_move(&mut self, x: f32, tasks: &[Task]) -> GestureOutcome {
        let GestureState::Resizing(session) = &mut self.state else {
            return GestureOutcome::None;
        };

        let Some(task) = tasks.iter().find(|t| t.id == session.task_id) else {
            tracing::debug!(id = %session.task_id, "resized task vanished; ending resize");
            self.state = GestureState::Idle;
            return GestureOutcome::None;
        };

        let delta = session.step_days(x);
        if delta == 0 {
            return GestureOutcome::None;
        }
        session.pointer_origin_x += delta as f32 * session.pixels_per_day;

        let (start, end) = resized_range(task, session.edge, delta);
        if (start, end) == (task.start, task.end) {
            return GestureOutcome::None;
        }
        GestureOutcome::Edit(TaskEdit::Resize {
            id: task.id,
            start,
            end,
        })
    }

    /// Button released. `drop_day` is the cell under the pointer, if any.
    pub fn pointer_up(&mut self, drop_day: Option<NaiveDate>) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Selecting(mut sel) => {
                if let Some(day) = drop_day {
                    sel.current_day = day;
                }
                let (start, end) = sel.range();
                self.state = GestureState::AwaitingConfirmation { start, end };
                GestureOutcome::OpenCreateForm { start, end }
            }
            GestureState::Dragging(session) => {
                if !session.moved {
                    return GestureOutcome::Clicked(session.task_id);
                }
                let Some(day) = drop_day else {
                    tracing::debug!(id = %session.task_id, "dropped outside the grid");
                    return GestureOutcome::None;
                };
                let delta_days = (day - session.original_start).num_days();
                if delta_days == 0 {
                    return GestureOutcome::None;
                }
                GestureOutcome::Edit(TaskEdit::Move {
                    id: session.task_id,
                    delta_days,
                })
            }
            GestureState::Resizing(_) | GestureState::Idle => GestureOutcome::None,
            awaiting @ GestureState::AwaitingConfirmation { .. } => {
                self.state = awaiting;
                GestureOutcome::None
            }
        }
    }

    /// Confirm the create form. Empty names keep the form open.
    pub fn submit(
        &mut self,
        name: &str,
        category: Category,
    ) -> Result<GestureOutcome, PlannerError> {
        let GestureState::AwaitingConfirmation { start, end } = self.state else {
            return Ok(GestureOutcome::None);
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::EmptyName);
        }
        self.state = GestureState::Idle;
        Ok(GestureOutcome::Edit(TaskEdit::Create {
            name: name.to_string(),
            category,
            start,
            end,
        }))
    }

    /// Abandon whatever is in flight. A live resize is rolled back to the
    /// range it had at pointer-down.
    pub fn cancel(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Resizing(session) => match session.original_range() {
                Some((start, end)) => GestureOutcome::Edit(TaskEdit::Resize {
                    id: session.task_id,
                    start,
                    end,
                }),
                None => GestureOutcome::None,
            },
            _ => GestureOutcome::None,
        }
    }
}

/// Apply `delta` days to one edge, clamped so the range never inverts.
/// A delta past the representable calendar leaves the range unchanged.
pub fn resized_range(task: &Task, edge: Edge, delta: i64) -> (NaiveDate, NaiveDate) {
    match edge {
        Edge::Start => match offset_day(task.start, delta) {
            Some(start) => (start.min(task.end), task.end),
            None => (task.start, task.end),
        },
        Edge::End => match offset_day(task.end, delta) {
            Some(end) => (task.start, end.max(task.start)),
            None => (task.start, task.end),
        },
    }
}
