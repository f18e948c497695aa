//! Header rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

pub fn render_header(frame: &mut Frame, area: Rect, query: &str, track_count: usize) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Title
            Constraint::Length(25), // Search term
        ])
        .split(area);

    let title = Paragraph::new("Library")
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1))
                .title_bottom(" h: help "),
        );
    frame.render_widget(title, chunks[0]);

    let search = Paragraph::new(format!("🔎 {} ({})", query, track_count))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Search "));
    frame.render_widget(search, chunks[1]);
}
