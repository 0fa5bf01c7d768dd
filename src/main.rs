//! # eztask
//!
//! A single-user, file-backed personal task manager. Each account keeps its
//! tasks as fixed-size binary records in its own `.dat` file, browsed either
//! through an interactive terminal UI or through scriptable subcommands.
//!
//! ## Features
//!
//! *   **Per-user stores**: log in with a username, get your own task file.
//! *   **Recurrence**: daily and weekly tasks roll forward automatically,
//!     counting how often they have repeated.
//! *   **Windows**: see what is ongoing right now, what comes next above an
//!     importance threshold, what is left today, and what important tasks
//!     the week still holds.
//! *   **Dual interface**: a paginated interactive UI and a CLI for quick
//!     single commands.
//!
//! ## Usage
//!
//! ### Interactive mode
//!
//! ```bash
//! eztask
//! # or explicitly
//! eztask ui
//! ```
//!
//! ### Command line
//!
//! ```bash
//! # Create an account
//! eztask login --user alice
//!
//! # Add a task 3 days from now at 9:30, repeating weekly
//! eztask --user alice add "Team sync" --importance 20 --in-days 3 --time 09:30 \
//!     --duration 45 --weekly
//!
//! # Browse
//! eztask --user alice list --page 1
//! eztask --user alice show 1 3
//! eztask --user alice remove 1 3
//!
//! # Windows
//! eztask --user alice status
//! eztask --user alice today
//! eztask --user alice week
//! eztask --user alice next --threshold 10
//! ```
//!
//! ## Data storage
//!
//! Store files live in the local data directory (for example
//! `~/.local/share/eztask/alice.dat` on Linux); set `EZTASK_DATA_DIR` to
//! override. The `_day` and `_week` files next to a store are transient
//! filtered copies and are cleaned up after each view.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use tracing_subscriber::EnvFilter;

use eztask::commands::*;
use eztask::config::Config;
use eztask::tui::run_tui;

#[derive(Parser)]
#[command(name = "eztask")]
#[command(about = "File-backed personal task manager", long_about = None)]
struct Cli {
    /// Account username (must start with a letter)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Tasks shown per page
    #[arg(long, global = true, default_value_t = 8)]
    page_size: usize,

    /// Minimum rating for the weekly important-tasks view
    #[arg(long, global = true, default_value_t = 10)]
    week_threshold: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, creating the account's store file if it does not exist
    Login {
        /// Create the account without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// Importance rating, 0-255
        #[arg(short, long, default_value_t = 0)]
        importance: u8,
        /// Absolute start, "YYYY-MM-DD HH:MM" local time
        #[arg(long)]
        at: Option<String>,
        /// Start this many days from today (with --time)
        #[arg(long)]
        in_days: Option<i64>,
        /// Time of day for --in-days, HH:MM
        #[arg(long)]
        time: Option<String>,
        /// Duration in minutes
        #[arg(short, long, default_value_t = 60)]
        duration: u16,
        /// Repeat every day
        #[arg(long)]
        daily: bool,
        /// Repeat every week
        #[arg(long)]
        weekly: bool,
        /// Warn when this task collides with others
        #[arg(long)]
        warn_collisions: bool,
    },
    /// List tasks, one page at a time
    List {
        /// Page to show, 1-based
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// View one task by page and slot
    Show { page: usize, slot: usize },
    /// Remove one task by page and slot
    Remove { page: usize, slot: usize },
    /// Ongoing tasks and the next upcoming task
    Status {
        /// Only consider tasks rated strictly above this
        #[arg(short, long, default_value_t = 0)]
        threshold: u8,
    },
    /// Tasks still to come today
    Today,
    /// This week's important tasks
    Week,
    /// The next upcoming task above an importance threshold
    Next {
        /// Only consider tasks rated strictly above this
        #[arg(short, long, default_value_t = 0)]
        threshold: u8,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open the interactive UI
    Ui,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn require_user(user: Option<String>) -> Option<String> {
    if user.is_none() {
        eprintln!("No account given. Pass --user <NAME>.");
    }
    user
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let cfg = Config {
        page_size: cli.page_size.max(1),
        importance_threshold: cli.week_threshold,
    };

    match cli.command {
        Some(Commands::Login { yes }) => {
            if let Some(user) = require_user(cli.user) {
                cmd_login(&user, yes);
            }
        }
        Some(Commands::Add {
            name,
            importance,
            at,
            in_days,
            time,
            duration,
            daily,
            weekly,
            warn_collisions,
        }) => {
            if let Some(user) = require_user(cli.user) {
                cmd_add(
                    &user, name, importance, at, in_days, time, duration, daily, weekly,
                    warn_collisions,
                );
            }
        }
        Some(Commands::List { page }) => {
            if let Some(user) = require_user(cli.user) {
                cmd_list(&cfg, &user, page);
            }
        }
        Some(Commands::Show { page, slot }) => {
            if let Some(user) = require_user(cli.user) {
                cmd_show(&cfg, &user, page, slot);
            }
        }
        Some(Commands::Remove { page, slot }) => {
            if let Some(user) = require_user(cli.user) {
                cmd_remove(&cfg, &user, page, slot);
            }
        }
        Some(Commands::Status { threshold }) => {
            if let Some(user) = require_user(cli.user) {
                cmd_status(&user, threshold);
            }
        }
        Some(Commands::Today) => {
            if let Some(user) = require_user(cli.user) {
                cmd_today(&user);
            }
        }
        Some(Commands::Week) => {
            if let Some(user) = require_user(cli.user) {
                cmd_week(&cfg, &user);
            }
        }
        Some(Commands::Next { threshold }) => {
            if let Some(user) = require_user(cli.user) {
                cmd_next(&user, threshold);
            }
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "eztask", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(cfg, cli.user) {
                eprintln!("Error running UI: {}", e);
            }
        }
    }
}
