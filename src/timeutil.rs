use chrono::{DateTime, Datelike, Days, Duration, Local, NaiveDate, NaiveTime, TimeZone};

pub const SECS_PER_MIN: i64 = 60;
pub const MINS_PER_HOUR: i64 = 60;
pub const HOURS_PER_DAY: i64 = 24;
pub const DAYS_PER_WEEK: i64 = 7;
pub const SECS_PER_DAY: i64 = 86_400;
pub const SECS_PER_WEEK: i64 = 604_800;

/// End of a task starting at `start` and running for `duration_mins`.
pub fn end_time(start: i64, duration_mins: u16) -> i64 {
    start + duration_mins as i64 * SECS_PER_MIN
}

/// Interpret an epoch-seconds timestamp in the local timezone.
///
/// Timestamps chrono cannot represent fall back to the epoch; they can only
/// come from a hand-edited store file.
pub fn to_local(t: i64) -> DateTime<Local> {
    DateTime::from_timestamp(t, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Earliest valid local instant of `day` at or after 00:00.
fn local_midnight(day: NaiveDate) -> DateTime<Local> {
    let mut t = day.and_time(NaiveTime::MIN);
    loop {
        if let Some(resolved) = Local.from_local_datetime(&t).earliest() {
            return resolved;
        }
        // 00:00 fell in a DST gap; the day starts later.
        t = t + Duration::hours(1);
    }
}

/// Local-calendar midnight strictly after `now`: the start of the next day.
pub fn next_midnight(now: i64) -> i64 {
    let day = to_local(now).date_naive() + Days::new(1);
    local_midnight(day).timestamp()
}

/// Local midnight of the upcoming Sunday-to-Monday boundary.
///
/// From a Sunday this is the Monday eight days out, so "this week" always
/// extends past the current weekend.
pub fn next_week_boundary(now: i64) -> i64 {
    let local = to_local(now);
    let days_ahead = 8 - local.weekday().num_days_from_sunday() as u64;
    local_midnight(local.date_naive() + Days::new(days_ahead)).timestamp()
}

/// Render a timestamp as `%H:%M %d/%m/%Y` local time.
pub fn format_timestamp(t: i64) -> String {
    to_local(t).format("%H:%M %d/%m/%Y").to_string()
}

/// Break a minute count into "W weeks D days H hours M minutes".
///
/// Units that are zero are omitted, except minutes which always print.
pub fn humanize_minutes(total_minutes: i64) -> String {
    let mut minutes = total_minutes.max(0);
    let mut hours = minutes / MINS_PER_HOUR;
    minutes %= MINS_PER_HOUR;
    let mut days = hours / HOURS_PER_DAY;
    hours %= HOURS_PER_DAY;
    let weeks = days / DAYS_PER_WEEK;
    days %= DAYS_PER_WEEK;

    let mut out = String::new();
    if weeks > 0 {
        out.push_str(&format!("{} week{} ", weeks, if weeks == 1 { "" } else { "s" }));
    }
    if days > 0 {
        out.push_str(&format!("{} day{} ", days, if days == 1 { "" } else { "s" }));
    }
    if hours > 0 {
        out.push_str(&format!("{} hour{} ", hours, if hours == 1 { "" } else { "s" }));
    }
    out.push_str(&format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" }));
    out
}
