//! Drawing: header, input line, task list, key hints, then the completion
//! overlay and the duplicate alert on top.

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub const HEADER_TITLE: &str = "📝 To-Do List";
pub const INPUT_PLACEHOLDER: &str = "Enter a task...";
const KEY_HINTS: &str = "Enter add · ↑/↓ select · Tab toggle · Del delete · Esc quit";
const ALERT_HINT: &str = "press any key";

const ACCENT: Color = Color::Blue;
const DONE: Color = Color::Green;
const MUTED: Color = Color::DarkGray;
const DANGER: Color = Color::Red;

pub fn draw(frame: &mut Frame, app: &App, now: Instant) {
    let area = frame.area();
    let [header, input, list, hints] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(area);

    draw_header(frame, header);
    draw_input(frame, app, input);
    draw_tasks(frame, app, list);
    frame.render_widget(
        Paragraph::new(KEY_HINTS)
            .style(Style::default().fg(MUTED))
            .alignment(Alignment::Center),
        hints,
    );

    if app.board().overlay().is_visible() {
        draw_overlay(frame, app, area, now);
    }
    if let Some(alert) = app.alert() {
        draw_alert(frame, alert, area);
    }
}

fn draw_header(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        HEADER_TITLE,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().padding(Padding::vertical(1)));
    frame.render_widget(title, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .title(" Add ");
    let inner = block.inner(area);

    let text = app.board().input();
    let line = if text.is_empty() {
        Line::from(Span::styled(INPUT_PLACEHOLDER, Style::default().fg(MUTED)))
    } else {
        Line::from(text)
    };
    frame.render_widget(Paragraph::new(line).block(block), area);

    if app.alert().is_none() && !app.board().overlay().is_visible() && inner.width > 0 {
        let width = UnicodeWidthStr::width(text) as u16;
        let x = inner.x + width.min(inner.width - 1);
        frame.set_cursor_position((x, inner.y));
    }
}

fn draw_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED));

    if app.board().tasks().is_empty() {
        let empty = Paragraph::new(Span::styled("Nothing to do yet.", Style::default().fg(MUTED)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .board()
        .tasks()
        .iter()
        .map(|task| {
            let (mark, mark_style, text_style) = if task.completed {
                (
                    "✔ ",
                    Style::default().fg(DONE),
                    Style::default()
                        .fg(MUTED)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("○ ", Style::default().fg(MUTED), Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, mark_style),
                Span::styled(task.text.as_str(), text_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(app.selected());
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_overlay(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    frame.render_widget(Clear, area);

    let settings = app.settings();
    let mut lines = vec![
        Line::from(Span::styled(
            settings.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(settings.attribution.as_str()),
    ];
    if let Some(left) = app.board().overlay().remaining(now) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{}s", left.as_secs_f64().ceil() as u64),
            Style::default().fg(MUTED),
        )));
    }

    let height = lines.len() as u16;
    let [middle] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Black).fg(Color::White)),
        area,
    );
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black).fg(Color::White)),
        middle,
    );
}

fn draw_alert(frame: &mut Frame, alert: &str, area: Rect) {
    let width = (UnicodeWidthStr::width(alert) as u16 + 6).min(area.width);
    let [row] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(DANGER));
    let body = Paragraph::new(vec![
        Line::from(alert),
        Line::from(""),
        Line::from(Span::styled(ALERT_HINT, Style::default().fg(MUTED))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);
    frame.render_widget(body, popup);
}
