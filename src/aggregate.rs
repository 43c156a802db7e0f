use crate::model::{ActivityGrid, Event, GridSource, ResolvedGrid, DAYS_PER_WEEK};
use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use tracing::{debug, warn};

/// Highest value drawn for a placeholder cell.
pub const PLACEHOLDER_MAX: u64 = 4;

/// Buckets contribution events into a 7 × `window_weeks` grid.
///
/// Events that are not contributions, that predate `window_start`, or that fall
/// past the last week are dropped. Cells hold the sum of event weights, so the
/// result does not depend on the order of `events`.
pub fn aggregate(
    events: &[Event],
    window_start: DateTime<Utc>,
    window_weeks: usize,
) -> ActivityGrid {
    let mut grid = ActivityGrid::new(window_weeks);
    let mut dropped = 0usize;

    for event in events {
        if !event.kind.is_contribution() || event.timestamp < window_start {
            dropped += 1;
            continue;
        }

        let week = ((event.timestamp - window_start).num_days() / 7) as usize;
        if week >= window_weeks {
            dropped += 1;
            continue;
        }

        let day = event.timestamp.weekday().num_days_from_monday() as usize;
        grid.add(day, week, event.weight);
    }

    debug!(
        total = events.len(),
        dropped,
        sum = grid.sum(),
        "aggregated events into grid"
    );
    grid
}

/// Synthetic grid of small random counts, used only so an empty chart still has shape.
pub fn placeholder_grid<R: Rng + ?Sized>(rng: &mut R, weeks: usize) -> ActivityGrid {
    let mut grid = ActivityGrid::new(weeks);
    for day in 0..DAYS_PER_WEEK {
        for week in 0..weeks {
            grid.set(day, week, rng.gen_range(0..=PLACEHOLDER_MAX));
        }
    }
    grid
}

/// Tags the aggregated grid as real, or swaps in a placeholder when it is empty.
pub fn resolve<R: Rng + ?Sized>(grid: ActivityGrid, rng: &mut R) -> ResolvedGrid {
    if !grid.is_empty() {
        return ResolvedGrid { grid, source: GridSource::Events };
    }

    let weeks = grid.weeks();
    let placeholder = placeholder_grid(rng, weeks);
    warn!(
        weeks,
        placeholder_total = placeholder.sum(),
        "no qualifying activity in window; rendering PLACEHOLDER data, not real activity"
    );
    ResolvedGrid {
        grid: placeholder,
        source: GridSource::Placeholder,
    }
}
