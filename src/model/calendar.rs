use chrono::{Datelike, Duration, NaiveDate};

/// Days per grid row. Weeks always start on Sunday.
pub const DAYS_PER_WEEK: usize = 7;

/// The whole-week grid of days shown for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// First day of the displayed month.
    month_start: NaiveDate,
    days: Vec<NaiveDate>,
}

impl MonthGrid {
    /// Build the grid for the month containing `anchor`: from the Sunday on or
    /// before the 1st through the Saturday on or after the month's last day.
    pub fn for_anchor(anchor: NaiveDate) -> Self {
        let month_start = first_of_month(anchor);
        let month_end = last_of_month(anchor);
        let grid_start = start_of_week(month_start);
        let grid_end = end_of_week(month_end);

        let days = grid_start
            .iter_days()
            .take_while(|d| *d <= grid_end)
            .collect();

        Self { month_start, days }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_day(&self) -> NaiveDate {
        self.days.first().copied().unwrap_or(self.month_start)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days.last().copied().unwrap_or(self.month_start)
    }

    /// First day of the displayed month.
    pub fn month_start(&self) -> NaiveDate {
        self.month_start
    }

    /// Week rows, each exactly seven days.
    pub fn rows(&self) -> impl Iterator<Item = &[NaiveDate]> {
        self.days.chunks_exact(DAYS_PER_WEEK)
    }

    pub fn row_count(&self) -> usize {
        self.len() / DAYS_PER_WEEK
    }

    /// Cell index of `day`, if it is displayed.
    pub fn index_of(&self, day: NaiveDate) -> Option<usize> {
        if !self.contains(day) {
            return None;
        }
        usize::try_from((day - self.first_day()).num_days()).ok()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        !self.days.is_empty() && self.first_day() <= day && day <= self.last_day()
    }

    /// Whether `day` belongs to the displayed month (not a leading/trailing day).
    pub fn is_in_month(&self, day: NaiveDate) -> bool {
        day.year() == self.month_start.year() && day.month() == self.month_start.month()
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    next_month_anchor(date).pred_opt().unwrap_or(date)
}

/// Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Saturday on or after `date`.
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    start_of_week(date) + Duration::days(6)
}

/// First day of the month before the one containing `date`.
pub fn previous_month_anchor(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first.pred_opt().map(first_of_month).unwrap_or(first)
}

/// First day of the month after the one containing `date`.
pub fn next_month_anchor(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(date)
}
