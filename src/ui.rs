use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget},
};

use crate::{
    engine::{GameEngine, Phase},
    notification::NotificationKind,
    store::KeyValueStore,
    tier::DifficultyTier,
};

const HORIZONTAL_MARGIN: u16 = 5;
const CONTENT_HEIGHT: u16 = 11;

fn gauge_color(percent: f64) -> Color {
    if percent > 50.0 {
        Color::Green
    } else if percent > 20.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

impl<S: KeyValueStore> Widget for &GameEngine<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let magenta_style = Style::default().fg(Color::Magenta);
        let target_style = Style::default()
            .patch(bold_style)
            .fg(Color::Cyan)
            .add_modifier(Modifier::REVERSED);

        let padding = area.height.saturating_sub(CONTENT_HEIGHT) / 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(padding),
                    Constraint::Length(1), // header
                    Constraint::Length(1),
                    Constraint::Length(1), // target
                    Constraint::Length(1),
                    Constraint::Length(1), // gauge
                    Constraint::Length(1), // scores
                    Constraint::Length(1), // high scores
                    Constraint::Length(1), // notification
                    Constraint::Length(1), // last key
                    Constraint::Length(1),
                    Constraint::Length(1), // help
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(area);

        let phase_label = match self.phase() {
            Phase::Playing => Span::styled("playing", Style::default().fg(Color::Green)),
            Phase::GameOver => Span::styled("game over", Style::default().fg(Color::Red)),
        };
        Paragraph::new(Line::from(vec![
            Span::styled("mode: ", dim_style),
            Span::styled(self.tier().to_string(), magenta_style.patch(bold_style)),
            Span::styled("  ·  ", dim_style),
            phase_label,
        ]))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("Type this:  ", bold_style),
            Span::styled(format!(" {} ", self.target()), target_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        let (ratio, label) = match self.phase() {
            Phase::Playing => {
                let percent = self.percent_remaining().clamp(0.0, 100.0);
                (percent / 100.0, format!("{percent:.0}%"))
            }
            Phase::GameOver => (0.0, String::new()),
        };
        Gauge::default()
            .gauge_style(Style::default().fg(gauge_color(ratio * 100.0)))
            .ratio(ratio)
            .label(label)
            .render(chunks[5], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("score ", dim_style),
            Span::styled(self.score().to_string(), bold_style),
            Span::styled("   last run ", dim_style),
            Span::raw(self.last_score().to_string()),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

        let mut best = vec![Span::styled("best  ", dim_style)];
        for tier in DifficultyTier::ALL {
            let style = if tier == self.tier() {
                magenta_style.patch(bold_style)
            } else {
                Style::default()
            };
            best.push(Span::styled(
                format!("{tier} {}  ", self.high_score(tier)),
                style,
            ));
        }
        Paragraph::new(Line::from(best))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);

        if let Some(notification) = self.notification() {
            let color = match notification.kind {
                NotificationKind::Success => Color::Green,
                NotificationKind::Error => Color::Red,
            };
            Paragraph::new(Span::styled(
                notification.text.clone(),
                Style::default().patch(bold_style).fg(color),
            ))
            .alignment(Alignment::Center)
            .render(chunks[8], buf);
        }

        if let Some(c) = self.last_key() {
            Paragraph::new(Line::from(vec![
                Span::styled("last key ", dim_style),
                Span::styled(c.to_string(), bold_style),
            ]))
            .alignment(Alignment::Center)
            .render(chunks[9], buf);
        }

        let help = match self.phase() {
            Phase::Playing => "press the symbol shown  (esc)quit",
            Phase::GameOver => "(enter)start  (tab)mode  (ctrl+r)reset best  (esc)quit",
        };
        Paragraph::new(Span::styled(help, Style::default().add_modifier(Modifier::ITALIC)))
            .alignment(Alignment::Center)
            .render(chunks[11], buf);
    }
}
