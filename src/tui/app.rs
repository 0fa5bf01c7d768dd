use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone};
use ratatui::widgets::TableState;

use crate::config::Config;
use crate::models::{Task, FLAG_COLLISION_WARNING, FLAG_DAILY, FLAG_WEEKLY, NAME_MAXLEN};
use crate::queries;
use crate::storage::{self, StoreKind, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main,
    Tasks,
    Day,
    Week,
}

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub step: usize,
    pub name: String,
    pub importance: u8,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_mins: u16,
    pub daily: bool,
    pub weekly: bool,
}

impl AddState {
    pub fn title(&self) -> &'static str {
        match self.step {
            0 => "Add task: enter name",
            1 => "Add task: importance rating (0-255)",
            2 => "Add task: start date (days from now, or YYYY-MM-DD)",
            3 => "Add task: time of day (HH:MM)",
            4 => "Add task: duration in minutes",
            5 => "Add task: repeat? (d = daily, w = weekly, empty = no)",
            _ => "Add task: warn on collisions? (y/N)",
        }
    }
}

pub struct App {
    pub config: Config,
    pub data_dir: PathBuf,
    pub screen: Screen,
    pub username: String,
    pub input_buffer: String,
    /// Login screen is waiting for a yes/no on account creation.
    pub confirm_create: bool,
    /// One-line message shown on the current screen.
    pub status: Option<String>,
    /// Importance threshold for the next-task display, adjustable live.
    pub threshold: u8,
    pub current: Vec<Task>,
    pub next: Option<(Task, i64)>,
    /// 0-based page within the browsed store.
    pub page: usize,
    pub total: usize,
    pub page_tasks: Vec<Task>,
    pub table_state: TableState,
    pub input_mode: InputMode,
    pub add_state: AddState,
    pub detail: Option<Task>,
    pub should_quit: bool,
}

impl App {
    /// Creates the app on the login screen, optionally pre-filling the
    /// username passed on the command line.
    pub fn new(config: Config, user: Option<String>) -> App {
        App {
            config,
            data_dir: storage::data_dir(),
            screen: Screen::Login,
            username: String::new(),
            input_buffer: user.unwrap_or_default(),
            confirm_create: false,
            status: None,
            threshold: 0,
            current: Vec::new(),
            next: None,
            page: 0,
            total: 0,
            page_tasks: Vec::new(),
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            add_state: AddState::default(),
            detail: None,
            should_quit: false,
        }
    }

    fn store_for(&self, kind: StoreKind) -> TaskStore {
        TaskStore::for_user(&self.data_dir, &self.username, kind)
    }

    /// The store the current screen is browsing: the primary file, or the
    /// transient day/week copy.
    fn browsed(&self) -> TaskStore {
        match self.screen {
            Screen::Day => self.store_for(StoreKind::Day),
            Screen::Week => self.store_for(StoreKind::Week),
            _ => self.store_for(StoreKind::Primary),
        }
    }

    // ----- login -----

    pub fn login_submit(&mut self) {
        let name = self.input_buffer.trim().to_string();
        if !storage::valid_username(&name) {
            self.status =
                Some("Usernames start with a letter; then letters, digits, '_' or '-'.".into());
            return;
        }
        self.username = name;
        if self.store_for(StoreKind::Primary).exists() {
            self.input_buffer.clear();
            self.enter_main();
        } else {
            self.confirm_create = true;
            self.status = Some(format!(
                "Account '{}' does not exist. Create it? (y/n)",
                self.username
            ));
        }
    }

    pub fn answer_create(&mut self, yes: bool) {
        self.confirm_create = false;
        if !yes {
            self.username.clear();
            self.status = Some("Log in cancelled.".into());
            return;
        }
        match self.store_for(StoreKind::Primary).create() {
            Ok(()) => {
                self.input_buffer.clear();
                self.enter_main();
            }
            Err(e) => {
                self.username.clear();
                self.status = Some(format!("Unable to create account: {}", e));
            }
        }
    }

    // ----- main screen -----

    pub fn enter_main(&mut self) {
        self.screen = Screen::Main;
        self.status = None;
        self.refresh_main();
    }

    /// Rolls recurring tasks forward, then reloads the ongoing and
    /// next-task displays.
    pub fn refresh_main(&mut self) {
        let store = self.store_for(StoreKind::Primary);
        let now = Local::now().timestamp();
        if let Err(e) = queries::advance_all(&store, now) {
            self.status = Some(e.to_string());
            return;
        }
        match queries::current_tasks(&store, now) {
            Ok(tasks) => self.current = tasks,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        }
        match queries::next_task(&store, now, self.threshold) {
            Ok(next) => self.next = next,
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn threshold_up(&mut self) {
        self.threshold = self.threshold.saturating_add(1);
        self.refresh_main();
    }

    pub fn threshold_down(&mut self) {
        self.threshold = self.threshold.saturating_sub(1);
        self.refresh_main();
    }

    // ----- browsing -----

    pub fn enter_tasks(&mut self) {
        let store = self.store_for(StoreKind::Primary);
        if let Err(e) = queries::advance_all(&store, Local::now().timestamp()) {
            self.status = Some(e.to_string());
            return;
        }
        self.screen = Screen::Tasks;
        self.status = None;
        self.page = 0;
        self.load_page();
    }

    pub fn enter_day(&mut self) {
        let store = self.store_for(StoreKind::Primary);
        let dest = self.store_for(StoreKind::Day);
        let now = Local::now().timestamp();
        let filtered = queries::advance_all(&store, now)
            .and_then(|_| queries::day_tasks(&store, &dest, now));
        if let Err(e) = filtered {
            self.status = Some(e.to_string());
            return;
        }
        self.screen = Screen::Day;
        self.status = None;
        self.page = 0;
        self.load_page();
    }

    pub fn enter_week(&mut self) {
        let store = self.store_for(StoreKind::Primary);
        let dest = self.store_for(StoreKind::Week);
        let now = Local::now().timestamp();
        let filtered = queries::advance_all(&store, now).and_then(|_| {
            queries::week_tasks(&store, &dest, now, self.config.importance_threshold)
        });
        if let Err(e) = filtered {
            self.status = Some(e.to_string());
            return;
        }
        self.screen = Screen::Week;
        self.status = None;
        self.page = 0;
        self.load_page();
    }

    /// Back to the main screen. A day/week view deletes its transient
    /// store file on the way out.
    pub fn leave_browser(&mut self) {
        if matches!(self.screen, Screen::Day | Screen::Week) {
            let _ = self.browsed().remove();
        }
        self.detail = None;
        self.enter_main();
    }

    /// Reloads the records of the current page, clamping the page number
    /// and the row selection to what the store actually holds.
    pub fn load_page(&mut self) {
        let store = self.browsed();
        let total = match store.count() {
            Ok(n) => n,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };
        let last_page = if total == 0 {
            0
        } else {
            (total - 1) / self.config.page_size
        };
        self.page = self.page.min(last_page);
        let tasks = match store.read_range(self.page * self.config.page_size, self.config.page_size)
        {
            Ok(t) => t,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };
        self.total = total;
        self.page_tasks = tasks;
        if self.page_tasks.is_empty() {
            self.table_state.select(None);
        } else {
            let sel = self
                .table_state
                .selected()
                .unwrap_or(0)
                .min(self.page_tasks.len() - 1);
            self.table_state.select(Some(sel));
        }
    }

    pub fn next_page(&mut self) {
        self.page += 1;
        self.load_page();
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
        self.load_page();
    }

    /// Selects the next row on the page, wrapping around.
    pub fn select_next(&mut self) {
        if self.page_tasks.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.page_tasks.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Selects the previous row on the page, wrapping around.
    pub fn select_previous(&mut self) {
        if self.page_tasks.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.page_tasks.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn view_selected(&mut self) {
        if let Some(i) = self.table_state.selected() {
            if i < self.page_tasks.len() {
                self.detail = Some(self.page_tasks[i].clone());
            }
        }
    }

    /// Deletes the selected record from the primary store. The day/week
    /// views are read-only copies, so deletion only works on the Tasks
    /// screen.
    pub fn delete_selected(&mut self) {
        if self.screen != Screen::Tasks {
            return;
        }
        if let Some(i) = self.table_state.selected() {
            if i < self.page_tasks.len() {
                let index = self.page * self.config.page_size + i;
                match self.store_for(StoreKind::Primary).delete_at(index) {
                    Ok(()) => self.status = Some("Task removed.".into()),
                    Err(e) => self.status = Some(e.to_string()),
                }
                self.load_page();
            }
        }
    }

    // ----- add wizard -----

    pub fn start_add(&mut self) {
        if self.screen != Screen::Tasks {
            return;
        }
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.status = None;
    }

    pub fn cancel_add(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Validates the current wizard step; on success moves to the next
    /// step, on the last step saves the task. Invalid input keeps the
    /// wizard on the same step with a message.
    pub fn wizard_submit(&mut self) {
        let entry = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => {
                if entry.is_empty() {
                    self.status = Some("Name must not be empty.".into());
                    return;
                }
                if entry.len() > NAME_MAXLEN {
                    self.status = Some(format!("Name too long (max {} bytes).", NAME_MAXLEN));
                    return;
                }
                self.add_state.name = entry;
            }
            1 => match entry.parse::<u8>() {
                Ok(v) => self.add_state.importance = v,
                Err(_) => {
                    self.status = Some("Importance is a number from 0 to 255.".into());
                    return;
                }
            },
            2 => {
                if let Ok(days) = entry.parse::<i64>() {
                    self.add_state.date = Some(Local::now().date_naive() + Duration::days(days));
                } else if let Ok(date) = NaiveDate::parse_from_str(&entry, "%Y-%m-%d") {
                    self.add_state.date = Some(date);
                } else {
                    self.status =
                        Some("Enter days from now (e.g. 3) or a date like 2026-03-01.".into());
                    return;
                }
            }
            3 => match NaiveTime::parse_from_str(&entry, "%H:%M") {
                Ok(t) => self.add_state.time = Some(t),
                Err(_) => {
                    self.status = Some("Time of day is HH:MM.".into());
                    return;
                }
            },
            4 => match entry.parse::<u16>() {
                Ok(v) => self.add_state.duration_mins = v,
                Err(_) => {
                    self.status = Some("Duration is whole minutes.".into());
                    return;
                }
            },
            5 => match entry.as_str() {
                "" | "n" => {}
                "d" => self.add_state.daily = true,
                "w" => self.add_state.weekly = true,
                _ => {
                    self.status = Some("Enter d, w or leave empty.".into());
                    return;
                }
            },
            _ => {
                let warn = matches!(entry.as_str(), "y" | "Y");
                self.finish_add(warn);
                return;
            }
        }
        self.add_state.step += 1;
        self.input_buffer.clear();
        self.status = None;
    }

    fn finish_add(&mut self, warn_collisions: bool) {
        let (Some(date), Some(time)) = (self.add_state.date, self.add_state.time) else {
            self.cancel_add();
            return;
        };
        let Some(start) = Local.from_local_datetime(&date.and_time(time)).earliest() else {
            self.status = Some("That start time does not exist in the local timezone.".into());
            self.cancel_add();
            return;
        };
        let mut task = Task::new(
            self.add_state.name.clone(),
            start.timestamp(),
            self.add_state.duration_mins,
            self.add_state.importance,
        );
        if self.add_state.daily {
            task.set_flag(FLAG_DAILY);
        }
        if self.add_state.weekly {
            task.set_flag(FLAG_WEEKLY);
        }
        if warn_collisions {
            task.set_flag(FLAG_COLLISION_WARNING);
        }
        match self.store_for(StoreKind::Primary).append(&task) {
            Ok(()) => self.status = Some("Task added.".into()),
            Err(e) => self.status = Some(e.to_string()),
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.load_page();
    }
}
