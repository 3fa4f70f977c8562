pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::combo::Combo;
use crate::confetti::Confetti;
use crate::session::{Phase, WorkoutState};
use crate::util::{format_clock, is_warning_flash, on_off};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = self.engine();
        let config = engine.config();
        let session = engine.session();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let callout_lines =
            ((self.callout.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(callout_lines),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(Span::styled(
            session.label(config),
            bold_style.fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let status = format!(
            "{} | volume {}%{}",
            session.state,
            engine.volume(),
            if engine.is_muted() { " (muted)" } else { "" }
        );
        Paragraph::new(Span::styled(status, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let clock_color = match (session.state, session.phase) {
            (WorkoutState::Running, _) if is_warning_flash(session.seconds_remaining) => Color::Red,
            (WorkoutState::Paused, _) => Color::Yellow,
            (_, Phase::Work) => Color::Green,
            (_, Phase::Rest) => Color::Blue,
        };
        Paragraph::new(Span::styled(
            format_clock(u64::from(session.seconds_remaining)),
            bold_style.fg(clock_color),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        Paragraph::new(Span::styled(
            format!(
                "total remaining {}",
                format_clock(session.total_remaining_secs(config))
            ),
            italic_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        let callout = if self.callout.is_empty() && session.state == WorkoutState::Idle {
            Span::styled("Press space to start", dim_style.add_modifier(Modifier::ITALIC))
        } else {
            Span::styled(
                self.callout.clone(),
                bold_style.fg(Color::Yellow),
            )
        };
        let callout_area = chunks[5];
        let top_pad = callout_area.height.saturating_sub(callout_lines) / 2;
        let callout_area = Rect {
            y: callout_area.y + top_pad,
            height: callout_area.height - top_pad,
            ..callout_area
        };
        Paragraph::new(callout)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(callout_area, buf);

        if session.state != WorkoutState::Running {
            render_settings_panel(self, chunks[6], buf);
        }

        let legend = match session.state {
            WorkoutState::Running => "(space) pause / (s)top / (m)ute / (+/-) volume / (q)uit",
            WorkoutState::Paused => {
                "(space) resume / (s)top / (r/R) rounds (d/D) round (e/E) rest (l c x v i t o k) combos / (q)uit"
            }
            WorkoutState::Idle | WorkoutState::Finished => {
                "(space) start / (p)review / (r/R) rounds (d/D) round (e/E) rest (l c x v i t o k) combos / (m)ute / (q)uit"
            }
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);

        if self.confetti.is_active {
            render_confetti(&self.confetti, area, buf);
        }
    }
}

/// Current configuration, shown whenever the clock is not running
fn render_settings_panel(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = app.engine();
    let config = engine.config();
    let settings_text = format!(
        "Rounds: {} | Round: {} | Rest: {} | Length: {} | Difficulty: {} | Complexity: {}\nVariety: {} | Moves: {} | Intensity: {} | Mode: {} | Voice: {} | Sound: {}",
        config.num_rounds,
        format_clock(u64::from(config.round_duration_secs)),
        format_clock(u64::from(config.rest_duration_secs)),
        config.combo_length,
        config.combo_difficulty,
        config.move_complexity,
        config.punch_variety,
        config.moves_included,
        config.combo_intensity,
        config.training_mode,
        config.voice,
        on_off(!engine.is_muted()),
    );
    Paragraph::new(settings_text)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

/// A `width` x `height` rect centered in `area`, clipped to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render_preview(combos: &[Combo], area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line> = combos
        .iter()
        .enumerate()
        .map(|(i, combo)| {
            Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    combo.display_text(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let widest = combos
        .iter()
        .map(|c| c.display_text().width() + 4)
        .max()
        .unwrap_or(0)
        .max(30) as u16;
    let popup = centered_rect(widest + 4, lines.len() as u16 + 4, area);

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Combo preview ")
                .title_bottom(Line::from(" (esc) back ").alignment(Alignment::Center)),
        )
        .render(popup, buf);
}

pub fn render_confirm_stop(area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(36, 5, area);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(Span::styled(
            "Stop workout?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "(y)es / (n)o",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL))
    .render(popup, buf);
}

/// Draw confetti pieces over whatever is already in `buf`
fn render_confetti(confetti: &Confetti, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for piece in &confetti.pieces {
        if piece.x < 0.0 || piece.y < 0.0 {
            continue;
        }
        let x = piece.x as u16;
        let y = piece.y as u16;
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[piece.color_index % colors.len()];
        let style = if piece.is_banner {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&piece.symbol.to_string());
            cell.set_style(style);
        }
    }
}
