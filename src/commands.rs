use std::io::{self, Write};

use chrono::{Duration, Local, NaiveDateTime, NaiveTime, TimeZone};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::config::Config;
use crate::models::{Task, FLAG_COLLISION_WARNING, FLAG_DAILY, FLAG_WEEKLY, NAME_MAXLEN};
use crate::queries;
use crate::storage::{self, StoreKind, TaskStore};
use crate::timeutil::{format_timestamp, humanize_minutes};

/// Resolves the user's primary store, reporting a problem instead of
/// returning one when the name is invalid or the account does not exist.
fn primary_store(username: &str) -> Option<TaskStore> {
    if !storage::valid_username(username) {
        eprintln!(
            "Invalid username '{}': must start with a letter and contain only letters, digits, '_' or '-'.",
            username
        );
        return None;
    }
    let store = TaskStore::for_user(&storage::data_dir(), username, StoreKind::Primary);
    if !store.exists() {
        eprintln!("No account '{}'. Run `eztask login --user {}` to create it.", username, username);
        return None;
    }
    Some(store)
}

/// Rolls recurring tasks forward before a store is displayed or queried.
fn refresh(store: &TaskStore) -> bool {
    if let Err(e) = queries::advance_all(store, Local::now().timestamp()) {
        eprintln!("Failed to refresh tasks: {}", e);
        return false;
    }
    true
}

/// Logs in to an account, offering to create it when the store file is
/// missing. `yes` skips the confirmation prompt.
pub fn cmd_login(username: &str, yes: bool) {
    if !storage::valid_username(username) {
        eprintln!(
            "Invalid username '{}': must start with a letter and contain only letters, digits, '_' or '-'.",
            username
        );
        return;
    }
    let store = TaskStore::for_user(&storage::data_dir(), username, StoreKind::Primary);
    if store.exists() {
        println!("Welcome back, {}!", username);
        return;
    }
    if !yes {
        print!("Account '{}' does not exist. Create it? [y/N] ", username);
        io::stdout().flush().ok();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }
    match store.create() {
        Ok(()) => println!("Account '{}' created.", username),
        Err(e) => eprintln!("Unable to create account: {}", e),
    }
}

/// Parses the start time for a new task: either an absolute
/// `YYYY-MM-DD HH:MM`, or a day offset from now plus an `HH:MM` time.
fn parse_start(at: Option<&str>, in_days: Option<i64>, time: Option<&str>) -> Option<i64> {
    if let Some(s) = at {
        let dt = match NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
            Ok(dt) => dt,
            Err(e) => {
                eprintln!("Invalid start '{}': {}. Use YYYY-MM-DD HH:MM.", s, e);
                return None;
            }
        };
        return match Local.from_local_datetime(&dt).earliest() {
            Some(t) => Some(t.timestamp()),
            None => {
                eprintln!("Start '{}' does not exist in the local timezone.", s);
                None
            }
        };
    }
    if let Some(days) = in_days {
        let tod = match NaiveTime::parse_from_str(time.unwrap_or("00:00"), "%H:%M") {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Invalid time '{}': {}. Use HH:MM.", time.unwrap_or(""), e);
                return None;
            }
        };
        let date = Local::now().date_naive() + Duration::days(days);
        return match Local.from_local_datetime(&date.and_time(tod)).earliest() {
            Some(t) => Some(t.timestamp()),
            None => {
                eprintln!("That start time does not exist in the local timezone.");
                None
            }
        };
    }
    eprintln!("No start time given. Pass --at \"YYYY-MM-DD HH:MM\" or --in-days N [--time HH:MM].");
    None
}

/// Adds a new task to the user's store.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    username: &str,
    name: String,
    importance: u8,
    at: Option<String>,
    in_days: Option<i64>,
    time: Option<String>,
    duration: u16,
    daily: bool,
    weekly: bool,
    warn_collisions: bool,
) {
    let Some(store) = primary_store(username) else { return };
    if name.is_empty() {
        eprintln!("Task name must not be empty.");
        return;
    }
    if name.len() > NAME_MAXLEN {
        eprintln!("Task name is too long ({} bytes, max {}).", name.len(), NAME_MAXLEN);
        return;
    }
    if daily && weekly {
        eprintln!("A task repeats daily or weekly, not both.");
        return;
    }
    let Some(start) = parse_start(at.as_deref(), in_days, time.as_deref()) else { return };

    let mut task = Task::new(name, start, duration, importance);
    if daily {
        task.set_flag(FLAG_DAILY);
    }
    if weekly {
        task.set_flag(FLAG_WEEKLY);
    }
    if warn_collisions {
        task.set_flag(FLAG_COLLISION_WARNING);
    }
    match store.append(&task) {
        Ok(()) => println!("Task added, starting {}.", format_timestamp(task.start_time)),
        Err(e) => eprintln!("Failed to save task: {}", e),
    }
}

/// Builds the task table shared by the list, today and week views. Slots
/// are numbered within the page so they can be fed back to show/remove.
fn render_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Active").add_attribute(Attribute::Bold),
            Cell::new("Recurrent").add_attribute(Attribute::Bold),
            Cell::new("Repeated").add_attribute(Attribute::Bold),
        ]);
    for (slot, t) in tasks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(slot + 1),
            Cell::new(&t.name),
            Cell::new(format_timestamp(t.start_time)),
            Cell::new(if t.is_active() { "Yes" } else { "No" }),
            Cell::new(if t.is_recurrent() { "Yes" } else { "No" }),
            Cell::new(t.repeat_count),
        ]);
    }
    table
}

/// Lists one page of the user's tasks. `page` is 1-based and clamped to
/// the last page.
pub fn cmd_list(cfg: &Config, username: &str, page: usize) {
    let Some(store) = primary_store(username) else { return };
    if !refresh(&store) {
        return;
    }
    let total = match store.count() {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Failed to read tasks: {}", e);
            return;
        }
    };
    if total == 0 {
        println!("(There is nothing to display)");
        return;
    }
    let last_page = (total - 1) / cfg.page_size;
    let page0 = page.saturating_sub(1).min(last_page);
    let tasks = match store.read_range(page0 * cfg.page_size, cfg.page_size) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read tasks: {}", e);
            return;
        }
    };
    println!("{}", render_table(&tasks));
    println!(
        "({} - {} item(s) out of {}, page {}/{})",
        page0 * cfg.page_size + 1,
        page0 * cfg.page_size + tasks.len(),
        total,
        page0 + 1,
        last_page + 1
    );
}

/// Prints every field of one record.
fn print_detail(task: &Task) {
    println!("Task: {}", task.name);
    println!("Importance: {}", task.importance);
    println!(
        "Time: from {} to {}",
        format_timestamp(task.start_time),
        format_timestamp(task.end_time())
    );
    println!("Repeated {} times", task.repeat_count);
    println!("Active: {}", if task.is_active() { "Yes" } else { "No" });
    println!("Daily: {}", if task.is_daily() { "Yes" } else { "No" });
    println!("Weekly: {}", if task.is_weekly() { "Yes" } else { "No" });
    println!(
        "Collision warning: {}",
        if task.warns_on_collision() { "Yes" } else { "No" }
    );
}

/// Shows one task addressed by page and slot (both 1-based).
pub fn cmd_show(cfg: &Config, username: &str, page: usize, slot: usize) {
    let Some(store) = primary_store(username) else { return };
    if page == 0 || slot == 0 || slot > cfg.page_size {
        eprintln!("Page and slot are 1-based; slots go up to {}.", cfg.page_size);
        return;
    }
    let index = (page - 1) * cfg.page_size + (slot - 1);
    match store.read_one(index) {
        Ok(task) => print_detail(&task),
        Err(e) => eprintln!("Cannot view that task: {}", e),
    }
}

/// Deletes one task addressed by page and slot (both 1-based).
pub fn cmd_remove(cfg: &Config, username: &str, page: usize, slot: usize) {
    let Some(store) = primary_store(username) else { return };
    if page == 0 || slot == 0 || slot > cfg.page_size {
        eprintln!("Page and slot are 1-based; slots go up to {}.", cfg.page_size);
        return;
    }
    let index = (page - 1) * cfg.page_size + (slot - 1);
    match store.delete_at(index) {
        Ok(()) => println!("Task removed."),
        Err(e) => eprintln!("Cannot remove that task: {}", e),
    }
}

/// Shows the tasks still to come today. The filtered copy is materialized
/// into the user's `_day` store and removed afterwards.
pub fn cmd_today(username: &str) {
    let Some(store) = primary_store(username) else { return };
    if !refresh(&store) {
        return;
    }
    let day = TaskStore::for_user(&storage::data_dir(), username, StoreKind::Day);
    match queries::day_tasks(&store, &day, Local::now().timestamp()) {
        Ok(0) => println!("Nothing scheduled for the rest of today."),
        Ok(n) => match day.read_all() {
            Ok(tasks) => {
                println!("Today's tasks:\n");
                println!("{}", render_table(&tasks));
                println!("({} task(s))", n);
            }
            Err(e) => eprintln!("Failed to read today's tasks: {}", e),
        },
        Err(e) => eprintln!("Failed to filter tasks: {}", e),
    }
    let _ = day.remove();
}

/// Shows this week's important tasks (rating at or above the configured
/// threshold), materialized into the `_week` store and removed afterwards.
pub fn cmd_week(cfg: &Config, username: &str) {
    let Some(store) = primary_store(username) else { return };
    if !refresh(&store) {
        return;
    }
    let week = TaskStore::for_user(&storage::data_dir(), username, StoreKind::Week);
    match queries::week_tasks(&store, &week, Local::now().timestamp(), cfg.importance_threshold) {
        Ok(0) => println!(
            "No important task (rating >= {}) before next week.",
            cfg.importance_threshold
        ),
        Ok(n) => match week.read_all() {
            Ok(tasks) => {
                println!("This week's important tasks:\n");
                println!("{}", render_table(&tasks));
                println!("({} task(s))", n);
            }
            Err(e) => eprintln!("Failed to read this week's tasks: {}", e),
        },
        Err(e) => eprintln!("Failed to filter tasks: {}", e),
    }
    let _ = week.remove();
}

/// Shows the nearest upcoming task rated strictly above `threshold`.
pub fn cmd_next(username: &str, threshold: u8) {
    let Some(store) = primary_store(username) else { return };
    if !refresh(&store) {
        return;
    }
    match queries::next_task(&store, Local::now().timestamp(), threshold) {
        Ok(Some((task, minutes))) => {
            println!("{}, coming in {}.", task.name, humanize_minutes(minutes))
        }
        Ok(None) => println!("No upcoming task above importance {}.", threshold),
        Err(e) => eprintln!("Failed to scan tasks: {}", e),
    }
}

/// Shows the ongoing tasks and the next task, like the top of the
/// interactive main screen.
pub fn cmd_status(username: &str, threshold: u8) {
    let Some(store) = primary_store(username) else { return };
    if !refresh(&store) {
        return;
    }
    let now = Local::now().timestamp();
    match queries::current_tasks(&store, now) {
        Ok(current) => {
            println!(
                "You have {} ongoing task{}{}",
                current.len(),
                if current.len() == 1 { "" } else { "s" },
                if current.is_empty() { "." } else { ":" }
            );
            for t in &current {
                println!("- {}", t.name);
            }
        }
        Err(e) => eprintln!("Failed to scan tasks: {}", e),
    }
    println!("\nNext task: (with threshold {})", threshold);
    match queries::next_task(&store, now, threshold) {
        Ok(Some((task, minutes))) => {
            println!("{}, coming in {}.", task.name, humanize_minutes(minutes))
        }
        Ok(None) => println!("None"),
        Err(e) => eprintln!("Failed to scan tasks: {}", e),
    }
}
