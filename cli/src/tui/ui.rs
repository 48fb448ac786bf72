use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};
use remindism_core::{countdown, NotificationGateway, TaskColor, TaskRepository};
use unicode_width::UnicodeWidthStr;

use crate::listing::format_local;
use crate::tui::app::{App, InputMode};

const PROMPT: &str = "add> ";

pub fn draw<R: TaskRepository>(f: &mut Frame, app: &mut App<R>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Input or status
            Constraint::Length(1), // Help
        ])
        .split(size);

    let header = Paragraph::new("REMINDISM")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[1]);

    draw_task_list(f, app, content_chunks[0]);
    draw_detail_view(f, app, content_chunks[1]);
    draw_message_line(f, app, main_chunks[2]);

    let help = match app.input_mode {
        InputMode::Normal => {
            "j/k: Navigate | space: Pause/Resume | a: Add | d: Delete | n: Notifications | q: Quit"
        }
        InputMode::Adding => "Enter: Save | Esc: Cancel | e.g. Drink water every:30m color:green",
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn swatch(color: TaskColor) -> Color {
    match color {
        TaskColor::Blue => Color::Blue,
        TaskColor::Green => Color::Green,
        TaskColor::Purple => Color::Magenta,
        TaskColor::Orange => Color::Indexed(208),
        TaskColor::Pink => Color::LightMagenta,
    }
}

fn draw_task_list<R: TaskRepository>(f: &mut Frame, app: &mut App<R>, area: Rect) {
    let now = app.now;
    let rows: Vec<Row> = app
        .tasks()
        .iter()
        .map(|task| {
            let title_style = if task.active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            Row::new(vec![
                Span::styled("●", Style::default().fg(swatch(task.color))),
                Span::styled(task.title.clone(), title_style),
                Span::raw(task.interval_label()),
                Span::raw(countdown(task, now).to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),  // Color
            Constraint::Min(10),    // Title
            Constraint::Length(12), // Every
            Constraint::Length(14), // Countdown
        ],
    )
    .header(Row::new(vec!["", "Task", "Every", "Next"]).style(Style::default().fg(Color::Yellow)))
    .block(Block::default().title(" Reminders ").borders(Borders::ALL).border_type(BorderType::Rounded))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_detail_view<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let block = Block::default().title(" Detail ").borders(Borders::ALL).border_type(BorderType::Rounded);

    let Some(task) = app.selected_task() else {
        let hint = if app.tasks().is_empty() {
            "No tasks yet. Press a to add one."
        } else {
            ""
        };
        f.render_widget(Paragraph::new(hint).block(block), area);
        return;
    };

    let label = |name: &'static str| Span::styled(name, Style::default().fg(Color::Blue));
    let detail_text = vec![
        Line::from(vec![
            label("Title: "),
            Span::styled(&task.title, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
            Span::raw(task.id.to_string()),
        ]),
        Line::from(vec![label("Every: "), Span::raw(task.interval_label())]),
        Line::from(vec![
            label("Color: "),
            Span::styled(task.color.as_str(), Style::default().fg(swatch(task.color))),
        ]),
        Line::from(vec![label("Next: "), Span::raw(format_local(task.next_notification_at))]),
        Line::from(vec![
            label("Status: "),
            Span::raw(if task.active { "running" } else { "paused" }),
        ]),
        Line::from(vec![label("Countdown: "), Span::raw(countdown(task, app.now).to_string())]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Notifications: ", Style::default().fg(Color::DarkGray)),
            Span::raw(app.scheduler.gateway().permission_state().to_string()),
        ]),
    ];

    let detail = Paragraph::new(detail_text).block(block).wrap(Wrap { trim: true });
    f.render_widget(detail, area);
}

fn draw_message_line<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    if let InputMode::Adding = app.input_mode {
        let prompt = Paragraph::new(Line::from(vec![
            Span::styled(PROMPT, Style::default().fg(Color::Yellow)),
            Span::raw(app.input.as_str()),
        ]));
        f.render_widget(prompt, area);
        let x = area
            .x
            .saturating_add(PROMPT.width() as u16)
            .saturating_add(cursor_column(&app.input, app.cursor_position));
        f.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        if let Some(status) = &app.status {
            // Validation errors stay visible while editing.
            let width = u16::try_from(status.width()).unwrap_or(u16::MAX);
            if width < area.width / 2 {
                let right = Rect::new(area.right() - width, area.y, width, 1);
                f.render_widget(Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red)), right);
            }
        }
        return;
    }

    let line = if let Some(banner) = app.banner() {
        Line::from(vec![
            Span::styled(
                format!("* {} ", banner.title),
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {}", banner.body)),
        ])
    } else if let Some(status) = &app.status {
        Line::from(Span::styled(status.as_str(), Style::default().fg(Color::Green)))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Terminal columns taken by the first `cursor` characters of `input`.
fn cursor_column(input: &str, cursor: usize) -> u16 {
    let end = input.char_indices().nth(cursor).map_or(input.len(), |(i, _)| i);
    u16::try_from(input[..end].width()).unwrap_or(u16::MAX)
}
