pub mod charting;
pub mod history;

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Clear, Dataset, GraphType, LineGauge, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use typemaster::{
    fx::ParticleField,
    scoring::CharStatus,
    session::{Mode, Session, SessionState},
    share,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const PARTICLE_COLOR: Color = Color::Rgb(0, 255, 163);

pub fn draw(app: &App, f: &mut Frame) {
    let area = f.area();
    f.render_widget(app, area);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_particles(&self.fx, area, buf);

        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::History => history::render_history(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn render_particles(fx: &ParticleField, area: Rect, buf: &mut Buffer) {
    for particle in fx.particles() {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x as u16, particle.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let symbol = if particle.radius > 1.8 { "•" } else { "·" };
        let style = if particle.alpha < 0.5 {
            Style::default()
                .fg(PARTICLE_COLOR)
                .add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(PARTICLE_COLOR)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
    }
}

/// Styled spans for the target text, one per character.
pub fn prompt_spans(session: &Session) -> Vec<Span<'static>> {
    let cursor = session.cursor();
    session
        .target()
        .chars()
        .zip(session.statuses())
        .enumerate()
        .map(|(idx, (expected, status))| {
            let style = match status {
                CharStatus::Correct => bold().fg(Color::Green),
                CharStatus::Incorrect => bold().fg(Color::Red),
                CharStatus::Untouched if cursor == Some(idx) => {
                    dim_bold().add_modifier(Modifier::UNDERLINED)
                }
                CharStatus::Untouched => dim_bold(),
            };
            let text = match (status, expected) {
                // a mistyped space would be invisible otherwise
                (CharStatus::Incorrect, ' ') => "·".to_string(),
                (_, c) => c.to_string(),
            };
            Span::styled(text, style)
        })
        .collect()
}

fn mode_line(app: &App) -> String {
    let config = app.controller.config();
    let identity = app.history.borrow().identity().display_name().to_string();
    format!("{} {} · {}", config.mode, config.length_label(), identity)
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.controller.session();
    let now = Instant::now();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = session.target().width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 6) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // mode
            Constraint::Length(padding),
            Constraint::Length(1), // timer or progress
            Constraint::Length(1),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1),
            Constraint::Length(1), // live stats
            Constraint::Min(0),
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(mode_line(app), italic().fg(Color::Cyan)))
        .alignment(Alignment::Right)
        .render(chunks[0], buf);

    match (session.mode(), session.remaining_seconds()) {
        (Mode::Time, Some(remaining)) => {
            Paragraph::new(Span::styled(format!("{remaining}s"), dim_bold()))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }
        _ => {
            LineGauge::default()
                .filled_style(Style::default().fg(Color::Magenta))
                .unfilled_style(Style::default().add_modifier(Modifier::DIM))
                .label(format!("{}s", session.elapsed_seconds(now)))
                .ratio(session.progress())
                .render(chunks[2], buf);
        }
    }

    Clear.render(chunks[4], buf);
    Paragraph::new(Line::from(prompt_spans(session)))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    let stats_line = if session.state() == SessionState::Idle {
        Span::styled("start typing, or press enter to start the clock", italic())
    } else {
        let stats = session.live_stats(now);
        Span::styled(
            format!(
                "{} wpm   {} raw   {}% acc",
                stats.net_wpm, stats.gross_wpm, stats.accuracy
            ),
            bold(),
        )
    };
    Paragraph::new(stats_line)
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    render_status(app, chunks[8], buf);

    Paragraph::new(Span::styled(
        "(tab) mode / (←) retry / (→) new / (esc)ape",
        italic(),
    ))
    .render(chunks[9], buf);
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    if let Some(ref status) = app.status {
        Paragraph::new(Span::styled(status.as_str(), italic().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.controller.session();
    let Some(results) = session.final_stats() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // details
            Constraint::Length(1), // padding
            Constraint::Length(2), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    let bounds = charting::chart_bounds(session.samples(), results.elapsed_seconds);
    let points: Vec<(f64, f64)> = session
        .samples()
        .points()
        .iter()
        .map(|&p| p.into())
        .collect();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, bounds.x_max])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(charting::format_label(bounds.x_max), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, bounds.y_max])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(bounds.y_max), bold()),
                ]),
        )
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {} raw   {}% acc   {}s",
            results.net_wpm, results.gross_wpm, results.accuracy, results.elapsed_seconds
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} {} · {} of {} correct · {} errors",
            results.mode,
            results.length_label,
            results.correct_chars,
            results.total_chars,
            results.errors
        ),
        italic().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    render_status(app, chunks[4], buf);

    Paragraph::new(Span::styled(
        if share::can_share() {
            "(r)etry / (n)ew / (h)istory / (e)xport / (t)weet / (tab) mode / (esc)ape"
        } else {
            "(r)etry / (n)ew / (h)istory / (e)xport / (tab) mode / (esc)ape"
        },
        italic(),
    ))
    .render(chunks[5], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use typemaster::session::SessionConfig;

    fn session(target: &str, input: &str) -> Session {
        let mut session =
            Session::new(SessionConfig::words(10).unwrap(), target.to_string()).unwrap();
        session.input(input, Instant::now());
        session
    }

    #[test]
    fn test_prompt_spans_follow_statuses() {
        let session = session("ab cd", "ax");
        let spans = prompt_spans(&session);

        assert_eq!(spans.len(), 5);
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[1].style.fg, Some(Color::Red));
        assert_eq!(spans[1].content, "b");
        assert!(spans[2].style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(!spans[3].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_mistyped_space_is_visible() {
        let session = session("a b", "ax");
        let spans = prompt_spans(&session);

        assert_eq!(spans[1].content, "·");
        assert_eq!(spans[1].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_particles_stay_inside_area() {
        let fx = ParticleField::seeded(10, 4, 9);
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);

        render_particles(&fx, area, &mut buf);

        let drawn = buf
            .content()
            .iter()
            .filter(|c| c.symbol() != " ")
            .count();
        assert!(drawn > 0);
    }
}
