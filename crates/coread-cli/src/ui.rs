use coread_engine::{
    AgentId, Author, GridLayout, GridLine, MarkerPlacement, MarkerPositioner, SegmentKind,
    ThreadId, ThreadSummary,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, Focus};

/// Width of the marker gutter left of the section text: a glyph, a count of
/// the markers sharing the row, and a space
const GUTTER: u16 = 3;

pub fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    draw_section(f, app, columns[0]);
    match app.focus {
        Focus::Threads => draw_thread_list(f, app, columns[1]),
        Focus::Thread | Focus::Compose => draw_thread(f, app, columns[1]),
    }
    draw_footer(f, app, rows[1]);
}

fn agent_color(agent: AgentId) -> Color {
    let (r, g, b) = agent.color();
    Color::Rgb(r, g, b)
}

fn thread_color(threads: &[ThreadSummary], thread_id: &ThreadId) -> Color {
    threads
        .iter()
        .find(|t| &t.thread_id == thread_id)
        .and_then(ThreadSummary::lead_agent)
        .map_or(Color::Yellow, agent_color)
}

fn draw_section(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(section_id) = app.current_section_id() else {
        let empty = Paragraph::new("This document has no sections")
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    };
    let Some(section) = app.session.document().section(&section_id).cloned() else {
        return;
    };
    let render = match app.session.render_section(&section_id) {
        Ok(render) => render,
        Err(e) => {
            f.render_widget(Paragraph::new(e.to_string()), area);
            return;
        }
    };

    let inner_width = area.width.saturating_sub(2 + GUTTER).max(1);
    let width = app.wrap_width.map_or(inner_width, |w| w.min(inner_width));
    let grid = GridLayout::wrap(&section.content, &render.segments, usize::from(width));

    // Layout is synchronous here, so a pending pass can be measured right away
    let positioner = app.session.positioner_mut(&section_id);
    if let Some(ticket) = positioner.pending() {
        positioner.apply(MarkerPositioner::measure(ticket, &render.segments, &grid));
    }
    let placements = positioner.placements().to_vec();

    let threads = app.session.threads();
    let focus_row = app
        .cursor_thread()
        .and_then(|t| grid.row_of(&t.thread_id))
        .unwrap_or(0);
    let visible_rows = usize::from(area.height.saturating_sub(2));
    let scroll = focus_row.saturating_sub(visible_rows / 3);

    let lines: Vec<Line> = grid
        .lines()
        .iter()
        .enumerate()
        .map(|(row, line)| {
            let mut spans = vec![gutter(row, &placements, threads)];
            spans.extend(line_spans(line, threads));
            Line::from(spans)
        })
        .collect();

    let mut title = format!(" {} ", section.title);
    if !render.unresolved.is_empty() {
        title.push_str(&format!("({} anchors not found) ", render.unresolved.len()));
    }
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(paragraph, area);
}

fn gutter(row: usize, placements: &[MarkerPlacement], threads: &[ThreadSummary]) -> Span<'static> {
    let on_row: Vec<&MarkerPlacement> = placements
        .iter()
        .filter(|p| p.offset as usize == row)
        .collect();
    // The selected thread represents its row
    let Some(shown) = on_row.iter().find(|p| p.selected).or(on_row.first()) else {
        return Span::raw("   ");
    };
    let symbol = if shown.selected { '◆' } else { '●' };
    let count = match on_row.len() {
        1 => ' ',
        n @ 2..=9 => char::from_digit(n as u32, 10).unwrap_or('+'),
        _ => '+',
    };
    Span::styled(
        format!("{symbol}{count} "),
        Style::default().fg(thread_color(threads, &shown.thread_id)),
    )
}

fn line_spans<'a>(line: &'a GridLine, threads: &[ThreadSummary]) -> Vec<Span<'a>> {
    line.runs
        .iter()
        .map(|run| {
            let mut style = Style::default();
            if run.heading {
                style = style.add_modifier(Modifier::BOLD);
            }
            if let SegmentKind::Highlight {
                thread_id,
                selected,
            } = &run.kind
            {
                style = style
                    .fg(Color::Black)
                    .bg(thread_color(threads, thread_id));
                if *selected {
                    style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
                }
            }
            Span::styled(run.text.as_str(), style)
        })
        .collect()
}

fn draw_thread_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .session
        .threads()
        .iter()
        .map(|thread| {
            let kind = thread
                .discussion_type
                .map_or("Comment", |d| d.label());
            let color = thread.lead_agent().map_or(Color::White, agent_color);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled("▍", Style::default().fg(color)),
                    Span::styled(
                        format!("{kind} · {} messages", thread.message_count),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(format!(" {}", thread.tension_point)),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.session.document().display_title())),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    let mut state = ListState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_thread(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let Some(thread) = app.session.selected_thread() else {
        return;
    };

    let mut lines = vec![
        Line::styled(
            thread.tension_point.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!("“{}”", thread.anchor.snippet_text),
            Style::default().add_modifier(Modifier::ITALIC),
        ),
        Line::from(""),
    ];
    for message in &thread.messages {
        let color = match message.author {
            Author::User => Color::White,
            Author::Agent(agent) => agent_color(agent),
        };
        let mut header = vec![Span::styled(
            message.author.display_name(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if message.is_local_only() {
            header.push(Span::styled(
                " (not delivered)",
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::from(header));
        lines.push(Line::from(message.content.clone()));
        lines.push(Line::from(""));
    }

    let messages = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Thread "))
        .wrap(Wrap { trim: true });
    f.render_widget(messages, chunks[0]);

    let sending = app.is_sending(&thread.thread_id);
    let title = match (app.focus, sending) {
        (_, true) => " Sending... ",
        (Focus::Compose, false) => " Reply (Enter to send, Esc to cancel) ",
        _ => " Reply (i to write) ",
    };
    let compose = Paragraph::new(app.compose.as_str())
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(compose, chunks[1]);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.focus {
        Focus::Threads => "q: Quit | j/k: Next/Previous thread | Tab: Next section | Enter: Open",
        Focus::Thread => "q: Quit | Esc: Back | i: Reply | g: More turns",
        Focus::Compose => "Enter: Send | Esc: Stop writing | @critical, @aesthetic, @instrumental",
    };
    let mut lines = vec![Line::from(help)];
    if let Some(pending) = &app.pending {
        lines.push(Line::styled(pending.label(), Style::default().fg(Color::Yellow)));
    } else if let Some(status) = &app.status {
        lines.push(Line::styled(status.clone(), Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(lines).block(Block::default()), area);
}
