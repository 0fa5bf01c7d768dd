//! Derived views over a task store: ongoing tasks, the nearest upcoming
//! task, and the day/week windows. Every query takes `now` from the caller
//! and scans the store linearly; nothing is cached between calls.

use tracing::debug;

use crate::error::Result;
use crate::models::Task;
use crate::storage::TaskStore;
use crate::timeutil::{next_midnight, next_week_boundary, SECS_PER_MIN};

/// Advance every active record past its elapsed occurrences and rewrite the
/// store. Inactive records pass through untouched. Running this twice in a
/// row changes nothing the second time.
pub fn advance_all(store: &TaskStore, now: i64) -> Result<()> {
    store.replace_all(|mut task| {
        if task.is_active() {
            task.advance(now);
        }
        task
    })
}

/// Active records that have started but not yet ended, in store order.
pub fn current_tasks(store: &TaskStore, now: i64) -> Result<Vec<Task>> {
    Ok(store
        .read_all()?
        .into_iter()
        .filter(|t| t.is_active() && t.start_time < now && t.end_time() > now)
        .collect())
}

/// The soonest upcoming active record rated strictly above `threshold`,
/// paired with the whole minutes until it starts.
///
/// Ties on start time keep the record that appears first in the store.
pub fn next_task(store: &TaskStore, now: i64, threshold: u8) -> Result<Option<(Task, i64)>> {
    let mut best: Option<(Task, i64)> = None;
    for task in store.read_all()? {
        if !task.is_active() || task.importance <= threshold || task.start_time <= now {
            continue;
        }
        let gap = task.start_time - now;
        if best.as_ref().map_or(true, |(_, min)| gap < *min) {
            best = Some((task, gap));
        }
    }
    Ok(best.map(|(task, gap)| (task, gap / SECS_PER_MIN)))
}

/// Tasks starting later today, materialized into `dest`. Returns how many
/// records were written.
pub fn day_tasks(store: &TaskStore, dest: &TaskStore, now: i64) -> Result<usize> {
    windowed_tasks(store, dest, now, next_midnight(now), 0)
}

/// Important tasks starting before the end of the week, materialized into
/// `dest`. Returns how many records were written.
pub fn week_tasks(
    store: &TaskStore,
    dest: &TaskStore,
    now: i64,
    min_importance: u8,
) -> Result<usize> {
    windowed_tasks(store, dest, now, next_week_boundary(now), min_importance)
}

/// Replace `dest` with the active records starting strictly inside
/// `(now, until)` and rated at least `min_importance`, in store order.
fn windowed_tasks(
    store: &TaskStore,
    dest: &TaskStore,
    now: i64,
    until: i64,
    min_importance: u8,
) -> Result<usize> {
    let selected: Vec<Task> = store
        .read_all()?
        .into_iter()
        .filter(|t| {
            t.is_active()
                && t.start_time > now
                && t.start_time < until
                && t.importance >= min_importance
        })
        .collect();
    dest.write_all(&selected)?;
    debug!(count = selected.len(), until, "materialized window view");
    Ok(selected.len())
}
