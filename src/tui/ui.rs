use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputMode, Screen};
use crate::models::Task;
use crate::timeutil::{format_timestamp, humanize_minutes};

pub fn ui(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Login => render_login(f, app),
        Screen::Main => render_main(f, app),
        Screen::Tasks | Screen::Day | Screen::Week => render_browser(f, app),
    }

    if let Some(task) = &app.detail {
        render_detail(f, task);
    }
    if app.input_mode == InputMode::Adding {
        render_wizard(f, app);
    }
}

fn render_login(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 3, f.area());
    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Log in: enter username"),
        );
    f.render_widget(input, area);

    if let Some(status) = &app.status {
        let below = Rect {
            y: (area.y + 3).min(f.area().height.saturating_sub(1)),
            height: 1,
            ..area
        };
        let msg = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red));
        f.render_widget(msg, below);
    }
}

fn render_main(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(format!("Welcome to eztask, {}!", app.username)));
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "You have {} ongoing task{}{}",
        app.current.len(),
        if app.current.len() == 1 { "" } else { "s" },
        if app.current.is_empty() { "." } else { ":" }
    )));
    for t in &app.current {
        lines.push(Line::from(format!("- {}", t.name)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Next task: (with threshold {})",
        app.threshold
    )));
    match &app.next {
        Some((task, minutes)) => lines.push(Line::from(format!(
            "{}, coming in {}.",
            task.name,
            humanize_minutes(*minutes)
        ))),
        None => lines.push(Line::from("None")),
    }
    if let Some(status) = &app.status {
        lines.push(Line::from(""));
        lines.push(Line::styled(status.clone(), Style::default().fg(Color::Red)));
    }

    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("eztask"));
    f.render_widget(body, chunks[0]);

    let help = Paragraph::new(
        "1: Manage tasks | 2: Today's tasks | 3: This week's important tasks | +/-: Threshold | q: Quit",
    )
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[1]);
}

fn render_browser(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = match app.screen {
        Screen::Day => "Today's tasks",
        Screen::Week => "This week's important tasks",
        _ => "All tasks",
    };

    let rows: Vec<Row> = app
        .page_tasks
        .iter()
        .enumerate()
        .map(|(slot, t)| {
            Row::new(vec![
                Cell::from(format!("{}", slot + 1)),
                Cell::from(t.name.clone()),
                Cell::from(format_timestamp(t.start_time)),
                Cell::from(if t.is_active() { "Yes" } else { "No" }),
                Cell::from(if t.is_recurrent() { "Yes" } else { "No" }),
                Cell::from(t.repeat_count.to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Task", "Date", "Active", "Recurrent", "Repeated"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.table_state);

    let mut counter = if app.total == 0 {
        "(There is nothing to display)".to_string()
    } else {
        format!(
            "({} - {} item(s) out of {}, page {}/{})",
            app.page * app.config.page_size + 1,
            app.page * app.config.page_size + app.page_tasks.len(),
            app.total,
            app.page + 1,
            (app.total - 1) / app.config.page_size + 1
        )
    };
    if let Some(status) = &app.status {
        counter = format!("{}  {}", counter, status);
    }
    f.render_widget(
        Paragraph::new(counter).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );

    let help_text = match app.screen {
        Screen::Tasks => "n/p: Page | j/k: Select | a: Add | Enter: View | d: Delete | q: Back",
        _ => "n/p: Page | j/k: Select | Enter: View | q: Back",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_detail(f: &mut Frame, task: &Task) {
    let area = centered_rect(60, 12, f.area());
    f.render_widget(Clear, area);

    let yes_no = |b: bool| if b { "Yes" } else { "No" };
    let lines = vec![
        Line::from(format!("Task: {}", task.name)),
        Line::from(format!("Importance: {}", task.importance)),
        Line::from(format!(
            "Time: from {} to {}",
            format_timestamp(task.start_time),
            format_timestamp(task.end_time())
        )),
        Line::from(format!("Repeated {} times", task.repeat_count)),
        Line::from(format!("Active: {}", yes_no(task.is_active()))),
        Line::from(format!("Daily: {}", yes_no(task.is_daily()))),
        Line::from(format!("Weekly: {}", yes_no(task.is_weekly()))),
        Line::from(format!(
            "Collision warning: {}",
            yes_no(task.warns_on_collision())
        )),
        Line::from(""),
        Line::from("Press any key to go back"),
    ];
    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Task"));
    f.render_widget(body, area);
}

fn render_wizard(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 3, f.area());
    f.render_widget(Clear, area);

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.add_state.title()),
        );
    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(margin),
                Constraint::Length(height),
                Constraint::Length(margin),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
