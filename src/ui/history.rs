use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use typemaster::history::{HistoryEntry, HistorySummary};

use crate::App;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One line per entry for plain terminal output.
pub fn format_entry(entry: &HistoryEntry) -> String {
    format!(
        "{:>4} wpm  {:>4} raw  {:>3}% acc  {:<5} {:<5}  {}",
        entry.wpm,
        entry.raw_wpm,
        entry.accuracy,
        entry.mode.to_string(),
        entry.length_label,
        entry.timestamp.format(TIMESTAMP_FORMAT)
    )
}

pub fn format_summary(summary: &HistorySummary) -> String {
    format!(
        "{} runs   best {} wpm   avg {:.1} wpm   {:.2} sd   avg {:.1}% acc",
        summary.runs,
        summary.best_wpm,
        summary.average_wpm,
        summary.wpm_spread,
        summary.average_accuracy
    )
}

fn wpm_color(wpm: u32, best: u32) -> Color {
    if wpm == best {
        Color::Green
    } else if wpm * 10 >= best * 8 {
        Color::Yellow
    } else {
        Color::Reset
    }
}

/// Pure presenter for a single history row
pub fn present_row(entry: &HistoryEntry, best_wpm: u32) -> Row<'static> {
    let accuracy_color = match entry.accuracy {
        98.. => Color::Green,
        90..=97 => Color::Yellow,
        _ => Color::Red,
    };

    Row::new(vec![
        Cell::from(entry.wpm.to_string()).style(
            Style::default()
                .fg(wpm_color(entry.wpm, best_wpm))
                .add_modifier(Modifier::BOLD),
        ),
        Cell::from(entry.raw_wpm.to_string()),
        Cell::from(format!("{}%", entry.accuracy)).style(Style::default().fg(accuracy_color)),
        Cell::from(format!("{} {}", entry.mode, entry.length_label)),
        Cell::from(entry.timestamp.format(TIMESTAMP_FORMAT).to_string()),
    ])
}

/// Render the history screen for the signed-in identity
pub fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // table
            Constraint::Length(1), // summary
            Constraint::Length(2), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    let name = app.history.borrow().identity().display_name().to_string();
    Paragraph::new(format!("History for {name}"))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let entries = &app.history_cache;
    let summary = typemaster::history::summarize(entries);

    if let Some(ref summary) = summary {
        let visible = chunks[1].height.saturating_sub(3) as usize;
        let rows: Vec<Row> = entries
            .iter()
            .take(visible)
            .map(|entry| present_row(entry, summary.best_wpm))
            .collect();

        let header = Row::new(vec!["WPM", "Raw", "Acc", "Mode", "When"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Min(16),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[1], buf);

        Paragraph::new(format_summary(summary))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    } else {
        Paragraph::new("No results yet. Finish a session to start your history.")
            .style(Style::default().add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[1], buf);
    }

    if let Some(ref status) = app.status {
        Paragraph::new(status.as_str())
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    Paragraph::new("(b)ack / (c)lear / (e)xport / (r)etry / (n)ew / (esc)ape")
        .style(Style::default().add_modifier(Modifier::ITALIC))
        .render(chunks[4], buf);
}
