use chrono::{Local, TimeZone};
use tempfile::TempDir;

use eztask::models::{Task, FLAG_ACTIVE, FLAG_DAILY, FLAG_WEEKLY};
use eztask::queries::{advance_all, current_tasks, day_tasks, next_task, week_tasks};
use eztask::storage::TaskStore;
use eztask::timeutil::{
    end_time, humanize_minutes, next_midnight, next_week_boundary, SECS_PER_DAY, SECS_PER_MIN,
};

const NOW: i64 = 1_700_000_000;

fn store_in(dir: &TempDir, name: &str) -> TaskStore {
    TaskStore::new(dir.path().join(name))
}

fn task_at(name: &str, start: i64, duration_mins: u16, importance: u8) -> Task {
    Task::new(name, start, duration_mins, importance)
}

fn local_ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .unwrap()
        .timestamp()
}

#[test]
fn test_end_time_formula() {
    let task = task_at("t", NOW, 90, 0);
    assert_eq!(task.end_time(), NOW + 90 * SECS_PER_MIN);
    assert_eq!(end_time(NOW, 90), NOW + 5400);
}

#[test]
fn test_daily_advance_counts_elapsed_periods() {
    // Three and a half days old; the smallest k with
    // start + k*86400 + 600 > now is 4.
    let start = NOW - 302_400;
    let mut task = task_at("standup", start, 10, 0);
    task.set_flag(FLAG_DAILY);

    task.advance(NOW);

    assert_eq!(task.repeat_count, 4);
    assert_eq!(task.start_time, start + 4 * SECS_PER_DAY);
    assert!(task.end_time() > NOW);
    assert!(task.is_active());
}

#[test]
fn test_weekly_advance_counts_elapsed_periods() {
    // Ten days old; two weekly periods bring the end past now.
    let start = NOW - 10 * SECS_PER_DAY;
    let mut task = task_at("review", start, 10, 0);
    task.set_flag(FLAG_WEEKLY);

    task.advance(NOW);

    assert_eq!(task.repeat_count, 2);
    assert!(task.end_time() > NOW);
}

#[test]
fn test_one_shot_past_is_deactivated() {
    let mut task = task_at("dentist", NOW - 1_000, 10, 42);
    let before = task.clone();

    task.advance(NOW);

    assert!(!task.is_active());
    assert_eq!(task.name, before.name);
    assert_eq!(task.start_time, before.start_time);
    assert_eq!(task.duration_mins, before.duration_mins);
    assert_eq!(task.repeat_count, before.repeat_count);
    assert_eq!(task.importance, before.importance);
}

#[test]
fn test_advance_is_noop_while_pending() {
    let mut task = task_at("future", NOW + 100, 10, 0);
    task.set_flag(FLAG_DAILY);
    let before = task.clone();

    task.advance(NOW);

    assert_eq!(task, before);
}

#[test]
fn test_advance_all_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");

    let mut daily = task_at("daily", NOW - 302_400, 10, 0);
    daily.set_flag(FLAG_DAILY);
    let one_shot = task_at("gone", NOW - 1_000, 10, 0);
    let future = task_at("later", NOW + 3_600, 10, 0);
    let mut inactive = task_at("inactive", NOW - 90_000, 10, 0);
    inactive.clear_flag(FLAG_ACTIVE);

    for t in [&daily, &one_shot, &future, &inactive] {
        store.append(t).unwrap();
    }

    advance_all(&store, NOW).unwrap();
    let once = store.read_all().unwrap();
    advance_all(&store, NOW).unwrap();
    let twice = store.read_all().unwrap();

    assert_eq!(once, twice);
    // Order preserved, inactive record untouched.
    assert_eq!(once[0].name, "daily");
    assert_eq!(once[0].repeat_count, 4);
    assert!(!once[1].is_active());
    assert_eq!(once[2], future);
    assert_eq!(once[3], inactive);
}

#[test]
fn test_current_tasks_window() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");

    // Started a minute ago, ends in the future.
    store.append(&task_at("ongoing", NOW - 60, 2, 0)).unwrap();
    // Starts in the future.
    store.append(&task_at("upcoming", NOW + 60, 2, 0)).unwrap();
    // In the window but deactivated.
    let mut off = task_at("off", NOW - 60, 2, 0);
    off.clear_flag(FLAG_ACTIVE);
    store.append(&off).unwrap();

    let current = current_tasks(&store, NOW).unwrap();
    let names: Vec<&str> = current.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["ongoing"]);
}

#[test]
fn test_next_task_filters_by_importance() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");

    store.append(&task_at("soon-ish", NOW + 10 * SECS_PER_MIN, 10, 5)).unwrap();
    store.append(&task_at("soonest", NOW + 5 * SECS_PER_MIN, 10, 10)).unwrap();
    store.append(&task_at("important", NOW + 20 * SECS_PER_MIN, 10, 20)).unwrap();

    // Threshold is strict: ratings of 5 and 10 both fall out.
    let (task, minutes) = next_task(&store, NOW, 10).unwrap().unwrap();
    assert_eq!(task.name, "important");
    assert_eq!(minutes, 20);
}

#[test]
fn test_next_task_tie_keeps_first_in_store_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");

    store.append(&task_at("first", NOW + 7 * SECS_PER_MIN, 10, 50)).unwrap();
    store.append(&task_at("second", NOW + 7 * SECS_PER_MIN, 10, 50)).unwrap();

    let (task, minutes) = next_task(&store, NOW, 0).unwrap().unwrap();
    assert_eq!(task.name, "first");
    assert_eq!(minutes, 7);
}

#[test]
fn test_next_task_none_when_no_candidate() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    store.create().unwrap();
    assert!(next_task(&store, NOW, 0).unwrap().is_none());

    // Past and low-rated records are not candidates either.
    store.append(&task_at("past", NOW - 600, 10, 50)).unwrap();
    store.append(&task_at("dull", NOW + 600, 10, 3)).unwrap();
    assert!(next_task(&store, NOW, 3).unwrap().is_none());
}

#[test]
fn test_day_tasks_boundary_is_strict() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    let dest = store_in(&dir, "alice_day.dat");

    let now = local_ts(2026, 8, 5, 12, 0, 0);
    let midnight = next_midnight(now);

    store.append(&task_at("at-midnight", midnight, 10, 0)).unwrap();
    store.append(&task_at("just-before", midnight - 1, 10, 0)).unwrap();
    store.append(&task_at("already-started", now - 60, 10, 0)).unwrap();

    let written = day_tasks(&store, &dest, now).unwrap();
    assert_eq!(written, 1);
    let names: Vec<String> = dest.read_all().unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["just-before"]);
}

#[test]
fn test_day_view_is_regenerated_not_appended() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    let dest = store_in(&dir, "alice_day.dat");

    let now = local_ts(2026, 8, 5, 12, 0, 0);
    store.append(&task_at("later-today", now + 3_600, 10, 0)).unwrap();

    assert_eq!(day_tasks(&store, &dest, now).unwrap(), 1);
    assert_eq!(day_tasks(&store, &dest, now).unwrap(), 1);
    assert_eq!(dest.count().unwrap(), 1);
}

#[test]
fn test_week_tasks_importance_cutoff_and_boundary() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "alice.dat");
    let dest = store_in(&dir, "alice_week.dat");

    let now = local_ts(2026, 8, 5, 12, 0, 0);
    let boundary = next_week_boundary(now);

    store.append(&task_at("minor", now + 3_600, 10, 9)).unwrap();
    store.append(&task_at("important", now + 3_600, 10, 10)).unwrap();
    store.append(&task_at("next-week", boundary, 10, 99)).unwrap();
    store.append(&task_at("sunday-night", boundary - 1, 10, 99)).unwrap();

    let written = week_tasks(&store, &dest, now, 10).unwrap();
    assert_eq!(written, 2);
    let names: Vec<String> = dest.read_all().unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["important", "sunday-night"]);
}

#[test]
fn test_next_midnight_is_start_of_next_day() {
    let now = local_ts(2026, 8, 5, 12, 0, 0);
    assert_eq!(next_midnight(now), local_ts(2026, 8, 6, 0, 0, 0));

    // A second before midnight still rolls to the next day.
    let late = local_ts(2026, 8, 5, 23, 59, 59);
    assert_eq!(next_midnight(late), local_ts(2026, 8, 6, 0, 0, 0));
}

#[test]
fn test_week_boundary_lands_on_monday_midnight() {
    // Wednesday, five days before the boundary Monday.
    let wednesday = local_ts(2026, 8, 5, 12, 0, 0);
    assert_eq!(next_week_boundary(wednesday), local_ts(2026, 8, 10, 0, 0, 0));

    // From a Sunday the week extends past the coming weekend.
    let sunday = local_ts(2026, 8, 9, 12, 0, 0);
    assert_eq!(next_week_boundary(sunday), local_ts(2026, 8, 17, 0, 0, 0));
}

#[test]
fn test_humanize_minutes() {
    assert_eq!(humanize_minutes(0), "0 minutes");
    assert_eq!(humanize_minutes(1), "1 minute");
    assert_eq!(humanize_minutes(61), "1 hour 1 minute");
    assert_eq!(humanize_minutes(10_080 + 2 * 1_440 + 3 * 60 + 4), "1 week 2 days 3 hours 4 minutes");
}
