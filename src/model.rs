use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

pub const DAYS_PER_WEEK: usize = 7;

pub const DAY_LABELS: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Push,
    Commit,
    Other(String),
}

impl EventKind {
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "PushEvent" => EventKind::Push,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// Push events and commit records are the only kinds that land on the grid.
    pub fn is_contribution(&self) -> bool {
        matches!(self, EventKind::Push | EventKind::Commit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub weight: u64,
}

impl Event {
    pub fn push(timestamp: DateTime<Utc>, weight: u64) -> Self {
        Self { kind: EventKind::Push, timestamp, weight }
    }

    pub fn commit(timestamp: DateTime<Utc>) -> Self {
        Self { kind: EventKind::Commit, timestamp, weight: 1 }
    }
}

/// Activity counts indexed by weekday (Monday = 0) and week offset from the window start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityGrid {
    days: [Vec<u64>; DAYS_PER_WEEK],
}

impl ActivityGrid {
    pub fn new(weeks: usize) -> Self {
        Self {
            days: std::array::from_fn(|_| vec![0; weeks]),
        }
    }

    pub fn from_rows(days: [Vec<u64>; DAYS_PER_WEEK]) -> Self {
        let weeks = days[0].len();
        debug_assert!(days.iter().all(|row| row.len() == weeks));
        Self { days }
    }

    pub fn weeks(&self) -> usize {
        self.days[0].len()
    }

    pub fn get(&self, day: usize, week: usize) -> u64 {
        self.days[day][week]
    }

    pub fn add(&mut self, day: usize, week: usize, weight: u64) {
        let cell = &mut self.days[day][week];
        *cell = cell.saturating_add(weight);
    }

    pub fn set(&mut self, day: usize, week: usize, value: u64) {
        self.days[day][week] = value;
    }

    pub fn rows(&self) -> &[Vec<u64>; DAYS_PER_WEEK] {
        &self.days
    }

    /// Iterates `(day, week, value)` for every cell, day-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        self.days.iter().enumerate().flat_map(|(day, row)| {
            row.iter().enumerate().map(move |(week, &value)| (day, week, value))
        })
    }

    pub fn sum(&self) -> u64 {
        self.cells().fold(0u64, |acc, (_, _, v)| acc.saturating_add(v))
    }

    pub fn max(&self) -> u64 {
        self.cells().map(|(_, _, v)| v).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.sum() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridSource {
    Events,
    Placeholder,
}

impl GridSource {
    pub fn is_real(self) -> bool {
        self == GridSource::Events
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedGrid {
    pub grid: ActivityGrid,
    pub source: GridSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub username: String,
    pub window_start: DateTime<Utc>,
    pub weeks: usize,
    pub source: GridSource,
    pub total: u64,
    pub max: u64,
    pub artifact: String,
    pub cells: Vec<Vec<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellRecord {
    pub day: usize,
    pub week: usize,
    pub value: u64,
    pub source: GridSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_starts_zeroed_with_requested_shape() {
        let grid = ActivityGrid::new(26);
        assert_eq!(grid.weeks(), 26);
        assert_eq!(grid.cells().count(), 7 * 26);
        assert!(grid.is_empty());
        assert_eq!(grid.max(), 0);
    }

    #[test]
    fn add_saturates_instead_of_overflowing() {
        let mut grid = ActivityGrid::new(1);
        grid.add(0, 0, u64::MAX);
        grid.add(0, 0, 10);
        assert_eq!(grid.get(0, 0), u64::MAX);
    }

    #[test]
    fn only_push_and_commit_are_contributions() {
        assert!(EventKind::from_api("PushEvent").is_contribution());
        assert!(EventKind::Commit.is_contribution());
        assert!(!EventKind::from_api("WatchEvent").is_contribution());
    }
}
