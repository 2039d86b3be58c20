//! Projection of task date ranges onto the month grid, and lane stacking.
//!
//! Both are pure functions of the current tasks and grid; the chart calls them
//! again every frame instead of caching a layout.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use super::calendar::{MonthGrid, DAYS_PER_WEEK};
use super::task::{inclusive_day_count, iso_key, Task};

/// The visible part of a task inside one week row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub task_id: Uuid,
    /// ISO key of the row's first (Sunday) day.
    pub row_key: String,
    /// Column 0..=6 where the segment starts.
    pub start_column: usize,
    /// Number of columns covered, 1..=7.
    pub span: usize,
}

impl Segment {
    /// Last column covered, inclusive.
    pub fn end_column(&self) -> usize {
        self.start_column + self.span - 1
    }
}

/// Segments grouped by row key, rows in chronological order.
pub type RowSegments = BTreeMap<String, Vec<Segment>>;

/// Split every task into per-row segments, clipped to the grid.
///
/// Tasks entirely outside the grid produce nothing. Within a row, segments
/// keep the order of `tasks`.
pub fn project_segments<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    grid: &MonthGrid,
) -> RowSegments {
    let mut rows: RowSegments = grid
        .rows()
        .map(|row| (iso_key(row[0]), Vec::new()))
        .collect();
    if grid.is_empty() {
        return rows;
    }

    let first = grid.first_day();
    let last = grid.last_day();

    for task in tasks {
        if task.end < first || task.start > last {
            continue;
        }
        let start = task.start.max(first);
        let end = task.end.min(last);

        for row in grid.rows() {
            let (row_start, row_end) = (row[0], row[DAYS_PER_WEEK - 1]);
            let seg_start = start.max(row_start);
            let seg_end = end.min(row_end);
            if seg_start > seg_end {
                continue;
            }

            let start_column = grid
                .index_of(seg_start)
                .map_or(0, |index| index % DAYS_PER_WEEK);
            let count = usize::try_from(inclusive_day_count(seg_start, seg_end)).unwrap_or(1);
            let span = count.min(DAYS_PER_WEEK - start_column).max(1);

            let row_key = iso_key(row_start);
            rows.entry(row_key.clone()).or_default().push(Segment {
                task_id: task.id,
                row_key,
                start_column,
                span,
            });
        }
    }

    rows
}

/// Anything occupying an inclusive `[start, end]` index range.
pub trait Interval {
    fn start_index(&self) -> i64;
    fn end_index(&self) -> i64;
}

impl Interval for Segment {
    fn start_index(&self) -> i64 {
        self.start_column as i64
    }

    fn end_index(&self) -> i64 {
        self.end_column() as i64
    }
}

impl Interval for Task {
    fn start_index(&self) -> i64 {
        i64::from(chrono::Datelike::num_days_from_ce(&self.start))
    }

    fn end_index(&self) -> i64 {
        i64::from(chrono::Datelike::num_days_from_ce(&self.end))
    }
}

/// First-fit lane assignment.
///
/// Items are visited by ascending start (stable on ties) and placed in the
/// lowest lane where they overlap nothing already there. Returns one lane
/// index per item, in input order. Not guaranteed to use the fewest lanes.
pub fn stack_rows<T: Interval>(items: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| items[i].start_index());

    let mut lanes: Vec<Vec<(i64, i64)>> = Vec::new();
    let mut assigned = vec![0; items.len()];

    for i in order {
        let (start, end) = (items[i].start_index(), items[i].end_index());
        let free = lanes.iter().position(|lane| lane.iter().all(|&(s, e)| end < s || start > e));
        let lane = match free {
            Some(lane) => lane,
            None => {
                lanes.push(Vec::new());
                lanes.len() - 1
            }
        };
        lanes[lane].push((start, end));
        assigned[i] = lane;
    }

    assigned
}

/// Number of lanes used by an assignment from [`stack_rows`].
pub fn lane_count(assignment: &[usize]) -> usize {
    assignment.iter().max().map_or(0, |m| m + 1)
}

/// A stacked segment ready for painting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSegment {
    pub segment: Segment,
    pub lane: usize,
}

/// One week row of the month view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRow {
    pub row_key: String,
    pub days: [NaiveDate; DAYS_PER_WEEK],
    pub segments: Vec<PlacedSegment>,
    pub lanes: usize,
}

/// Project `tasks` onto `grid` and stack each row's segments into lanes.
pub fn layout_weeks<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    grid: &MonthGrid,
) -> Vec<WeekRow> {
    let mut projected = project_segments(tasks, grid);

    grid.rows()
        .map(|row| {
            let row_key = iso_key(row[0]);
            let segments = projected.remove(&row_key).unwrap_or_default();
            let assignment = stack_rows(&segments);
            let lanes = lane_count(&assignment);
            let mut days = [row[0]; DAYS_PER_WEEK];
            days.copy_from_slice(row);
            WeekRow {
                row_key,
                days,
                segments: segments
                    .into_iter()
                    .zip(assignment)
                    .map(|(segment, lane)| PlacedSegment { segment, lane })
                    .collect(),
                lanes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Category;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(start: NaiveDate, end: NaiveDate) -> Task {
        Task::new("t", Category::ToDo, start, end)
    }

    fn june() -> MonthGrid {
        MonthGrid::for_anchor(day(2024, 6, 15))
    }

    fn seg(start_column: usize, span: usize) -> Segment {
        Segment {
            task_id: Uuid::nil(),
            row_key: String::new(),
            start_column,
            span,
        }
    }

    #[test]
    fn every_row_has_an_entry() {
        let rows = project_segments(std::iter::empty(), &june());
        assert_eq!(
            rows.keys().cloned().collect::<Vec<_>>(),
            vec![
                "2024-05-26",
                "2024-06-02",
                "2024-06-09",
                "2024-06-16",
                "2024-06-23",
                "2024-06-30"
            ]
        );
        assert!(rows.values().all(Vec::is_empty));
    }

    #[test]
    fn task_inside_one_row_yields_one_segment() {
        let t = task(day(2024, 6, 11), day(2024, 6, 13));
        let rows = project_segments([&t], &june());
        let all: Vec<_> = rows.values().flatten().collect();
        assert_eq!(
            all,
            vec![&Segment {
                task_id: t.id,
                row_key: "2024-06-09".into(),
                start_column: 2,
                span: 3,
            }]
        );
    }

    #[test]
    fn multi_week_task_splits_per_row() {
        let t = task(day(2024, 6, 6), day(2024, 6, 18));
        let rows = project_segments([&t], &june());
        let got: Vec<(String, usize, usize)> = rows
            .values()
            .flatten()
            .map(|s| (s.row_key.clone(), s.start_column, s.span))
            .collect();
        assert_eq!(
            got,
            vec![
                ("2024-06-02".to_string(), 4, 3),
                ("2024-06-09".to_string(), 0, 7),
                ("2024-06-16".to_string(), 0, 3),
            ]
        );
    }

    #[test]
    fn clips_to_grid_bounds_and_skips_outside_tasks() {
        let spill = task(day(2024, 5, 1), day(2024, 5, 27));
        let outside = task(day(2024, 8, 1), day(2024, 8, 3));
        let rows = project_segments([&spill, &outside], &june());
        let all: Vec<_> = rows.values().flatten().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].task_id, spill.id);
        assert_eq!((all[0].start_column, all[0].span), (0, 2));
    }

    #[test]
    fn row_order_follows_task_order() {
        let late = task(day(2024, 6, 14), day(2024, 6, 15));
        let early = task(day(2024, 6, 9), day(2024, 6, 10));
        let rows = project_segments([&late, &early], &june());
        let ids: Vec<Uuid> = rows["2024-06-09"].iter().map(|s| s.task_id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
    }

    #[test]
    fn stacker_reuses_free_lanes() {
        let segs = vec![seg(0, 3), seg(1, 2), seg(3, 4), seg(2, 1)];
        let lanes = stack_rows(&segs);
        assert_eq!(lanes, vec![0, 1, 0, 2]);
        assert_eq!(lane_count(&lanes), 3);
    }

    #[test]
    fn stacker_is_stable_on_equal_starts() {
        let a = task(day(2024, 6, 3), day(2024, 6, 3));
        let b = task(day(2024, 6, 3), day(2024, 6, 4));
        let c = task(day(2024, 6, 5), day(2024, 6, 5));
        assert_eq!(stack_rows(&[a, b, c]), vec![0, 1, 0]);
        assert_eq!(lane_count(&stack_rows::<Task>(&[])), 0);
    }

    #[test]
    fn layout_weeks_stacks_each_row() {
        let a = task(day(2024, 6, 3), day(2024, 6, 5));
        let b = task(day(2024, 6, 4), day(2024, 6, 10));
        let weeks = layout_weeks([&a, &b], &june());
        assert_eq!(weeks.len(), 6);
        let second = &weeks[1];
        assert_eq!(second.row_key, "2024-06-02");
        assert_eq!(second.lanes, 2);
        assert_eq!(second.segments.iter().map(|p| p.lane).collect::<Vec<_>>(), vec![0, 1]);
        let third = &weeks[2];
        assert_eq!(third.lanes, 1);
        assert_eq!(third.segments[0].segment.span, 2);
    }

    fn arb_task() -> impl Strategy<Value = Task> {
        (0i64..120, 0i64..40).prop_map(|(offset, len)| {
            let start = day(2024, 4, 20) + Duration::days(offset);
            task(start, start + Duration::days(len))
        })
    }

    proptest! {
        #[test]
        fn spans_sum_to_clipped_day_count(t in arb_task()) {
            let grid = june();
            let rows = project_segments([&t], &grid);
            let segs: Vec<_> = rows.values().flatten().collect();

            let start = t.start.max(grid.first_day());
            let end = t.end.min(grid.last_day());
            if start > end {
                prop_assert!(segs.is_empty());
            } else {
                let touched = grid
                    .rows()
                    .filter(|row| row[0] <= end && start <= row[DAYS_PER_WEEK - 1])
                    .count();
                prop_assert_eq!(segs.len(), touched);
                let total: usize = segs.iter().map(|s| s.span).sum();
                prop_assert_eq!(total as i64, inclusive_day_count(start, end));
                for s in &segs {
                    prop_assert!(s.start_column <= 6);
                    prop_assert!((1..=7).contains(&s.span));
                    prop_assert!(s.end_column() <= 6);
                }
            }
        }

        #[test]
        fn stacked_lanes_never_overlap(tasks in proptest::collection::vec(arb_task(), 0..25)) {
            let lanes = stack_rows(&tasks);
            for i in 0..tasks.len() {
                for j in (i + 1)..tasks.len() {
                    if lanes[i] == lanes[j] {
                        let (a, b) = (&tasks[i], &tasks[j]);
                        prop_assert!(a.end < b.start || b.end < a.start);
                    }
                }
            }
        }
    }
}
