use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use focustap::{StimulusIdentity, Variant};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn fmt_optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}{unit}"))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        match self.state {
            AppState::Instructions => {
                let bad = match self.variant {
                    Variant::Letter => "the letter X",
                    Variant::Image => "the aubergine",
                };
                let text = vec![
                    Line::from(Span::styled("focustap", bold_style.fg(Color::Cyan))),
                    Line::from(""),
                    Line::from("Items will flash on the screen one at a time."),
                    Line::from("Tap (space or any letter key) as fast as you can for every item,"),
                    Line::from(vec![
                        Span::raw("except "),
                        Span::styled(bad, bold_style.fg(Color::Red)),
                        Span::raw(": let that one pass."),
                    ]),
                    Line::from(""),
                    Line::from(format!(
                        "{} items, getting slower after each round.",
                        self.total_items
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "press space to begin / (esc)ape to quit",
                        italic_style,
                    )),
                ];

                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(centered(area, 9), buf);
            }
            AppState::Playing => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([Constraint::Min(3), Constraint::Length(1)])
                    .split(area);

                if let Some(identity) = self.visible {
                    let label = match identity {
                        StimulusIdentity::Letter(c) => c.to_string(),
                        StimulusIdentity::Image(name) => format!("[ {name} ]"),
                    };
                    let width = (label.width() as u16 + 4).min(chunks[0].width);
                    let target = centered(chunks[0], 3);
                    let target = Rect {
                        x: target.x + target.width.saturating_sub(width) / 2,
                        width,
                        ..target
                    };

                    Paragraph::new(Span::styled(label, bold_style.fg(Color::Yellow)))
                        .alignment(Alignment::Center)
                        .block(Block::default().borders(Borders::ALL))
                        .render(target, buf);
                }

                Paragraph::new(Span::styled(
                    format!(
                        "item {}/{}   (esc)ape to stop",
                        self.items_shown, self.total_items
                    ),
                    dim_style,
                ))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
            }
            AppState::Results => {
                let Some(summary) = &self.summary else {
                    return;
                };
                let c = &summary.counters;

                let mut lines = vec![
                    Line::from(Span::styled(summary.feedback.clone(), bold_style)),
                    Line::from(""),
                    Line::from(format!(
                        "Number of times a good item was tapped: {}",
                        c.good_hits
                    )),
                    Line::from(format!(
                        "Number of times a bad item was tapped: {}",
                        c.bad_hits
                    )),
                    Line::from(format!(
                        "Number of times a good item was missed: {}",
                        c.good_misses
                    )),
                    Line::from(format!(
                        "Number of times a bad item was missed: {}",
                        c.bad_skips
                    )),
                    Line::from(format!("Number of duplicate taps: {}", c.repeat_taps)),
                    Line::from(""),
                    Line::from(format!(
                        "inhibition {}   hit rate {}   mean reaction {} (sd {})",
                        fmt_optional(summary.inhibition_percent(), "%"),
                        fmt_optional(summary.hit_rate_percent(), "%"),
                        fmt_optional(summary.mean_hit_reaction_ms(), "ms"),
                        fmt_optional(summary.hit_reaction_std_dev_ms(), "ms"),
                    )),
                    Line::from(""),
                    Line::from(Span::styled("Response times per item:", bold_style)),
                ];

                lines.extend(summary.breakdown().into_iter().map(|row| {
                    let color = if row.identity == self.bad {
                        Color::Red
                    } else {
                        Color::Green
                    };
                    Line::from(vec![
                        Span::styled(
                            format!("{:>10}", row.identity.to_string()),
                            Style::default().fg(color),
                        ),
                        Span::raw(format!(
                            "  shown {:>2}  tapped {:>2}  avg {:>6.0} ms",
                            row.shown, row.tapped, row.mean_elapsed_ms
                        )),
                    ])
                }));

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([Constraint::Min(1), Constraint::Length(1)])
                    .split(area);

                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .render(chunks[0], buf);

                Paragraph::new(Span::styled("press any key to exit", italic_style))
                    .render(chunks[1], buf);
            }
        }
    }
}

/// A full-width band of `height` rows in the vertical middle of `area`
fn centered(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}
