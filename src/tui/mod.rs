pub mod app;
pub mod ui;

use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use app::{App, InputMode, Screen};
use ui::ui;

pub fn run_tui(config: Config, user: Option<String>) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config, user);

    // Run loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            handle_key(app, key.code);
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    // An open detail popup swallows the next key.
    if app.detail.is_some() {
        app.detail = None;
        return;
    }
    if app.input_mode == InputMode::Adding {
        match code {
            KeyCode::Enter => app.wizard_submit(),
            KeyCode::Esc => app.cancel_add(),
            KeyCode::Char(c) => app.input_buffer.push(c),
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        }
        return;
    }
    match app.screen {
        Screen::Login => {
            if app.confirm_create {
                match code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => app.answer_create(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        app.answer_create(false)
                    }
                    _ => {}
                }
                return;
            }
            match code {
                KeyCode::Enter => app.login_submit(),
                KeyCode::Esc => app.should_quit = true,
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            }
        }
        Screen::Main => match code {
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            KeyCode::Char('1') => app.enter_tasks(),
            KeyCode::Char('2') => app.enter_day(),
            KeyCode::Char('3') => app.enter_week(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.threshold_up(),
            KeyCode::Char('-') => app.threshold_down(),
            _ => {}
        },
        Screen::Tasks => match code {
            KeyCode::Char('q') | KeyCode::Esc => app.leave_browser(),
            KeyCode::Right | KeyCode::Char('n') => app.next_page(),
            KeyCode::Left | KeyCode::Char('p') => app.prev_page(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Char('a') => app.start_add(),
            KeyCode::Enter | KeyCode::Char('v') => app.view_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            _ => {}
        },
        Screen::Day | Screen::Week => match code {
            KeyCode::Char('q') | KeyCode::Esc => app.leave_browser(),
            KeyCode::Right | KeyCode::Char('n') => app.next_page(),
            KeyCode::Left | KeyCode::Char('p') => app.prev_page(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
            KeyCode::Enter | KeyCode::Char('v') => app.view_selected(),
            _ => {}
        },
    }
}
