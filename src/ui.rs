use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::config::Theme;
use crate::round::RoundOutcome;
use crate::{App, AppState, GENRES};

const HORIZONTAL_MARGIN: u16 = 5;

fn accent(theme: Theme) -> Color {
    match theme {
        Theme::Dark => Color::Magenta,
        Theme::Light => Color::Blue,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let dim_bold_style = Style::default().patch(bold_style).add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let accent_style = Style::default().fg(accent(self.prefs.theme));

        match self.state {
            AppState::Menu => {
                let mut lines = vec![
                    Line::from(Span::styled("LYRICFLIP", accent_style.patch(bold_style))),
                    Line::from(Span::styled(
                        "guess the song from the lyric",
                        italic_style,
                    )),
                    Line::default(),
                ];

                for (idx, genre) in GENRES.iter().enumerate() {
                    let label = format!("{genre}");
                    if idx == self.menu_cursor {
                        lines.push(Line::from(Span::styled(
                            format!("> {label}"),
                            accent_style.patch(bold_style),
                        )));
                    } else {
                        lines.push(Line::from(Span::styled(format!("  {label}"), dim_bold_style)));
                    }
                }

                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    format!(
                        "difficulty: {} · high score: {}",
                        self.prefs.difficulty,
                        self.session.get().high_score
                    ),
                    dim_style,
                )));
                if let Some(status) = &self.status {
                    lines.push(Line::from(Span::styled(status.clone(), red_bold_style)));
                }
                lines.push(Line::from(Span::styled(
                    "(↑/↓) genre (enter) play (esc) quit",
                    dim_style,
                )));

                centered_paragraph(lines, area, buf);
            }
            AppState::Playing => {
                let Some(engine) = &self.engine else {
                    return;
                };
                let Some(prompt) = engine.prompt() else {
                    return;
                };

                let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
                let lyric_text = format!("“{}”", prompt.lyric);
                let lyric_lines =
                    ((lyric_text.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);

                let option_lines = prompt.options.len() as u16 + 1;
                let header_lines = 2u16;
                let footer_lines = 2u16;
                let used = lyric_lines + option_lines + header_lines + footer_lines;
                let pad = area.height.saturating_sub(used) / 2;

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints(
                        [
                            Constraint::Length(header_lines),
                            Constraint::Length(pad),
                            Constraint::Length(lyric_lines + 1),
                            Constraint::Length(option_lines),
                            Constraint::Min(0),
                            Constraint::Length(footer_lines),
                        ]
                        .as_ref(),
                    )
                    .split(area);

                let timer = self.timer.get();
                let header = Paragraph::new(Line::from(vec![
                    Span::styled(
                        format!("round {}/{}", engine.current_round() + 1, engine.max_rounds()),
                        dim_bold_style,
                    ),
                    Span::raw("  "),
                    Span::styled(format!("score {}", self.session.get().score), accent_style),
                    Span::raw("  "),
                    Span::styled(
                        format!("{:>2}s", timer.time_left),
                        if timer.time_left <= 3 {
                            red_bold_style
                        } else {
                            bold_style
                        },
                    ),
                ]))
                .alignment(Alignment::Center);
                header.render(chunks[0], buf);

                let lyric = Paragraph::new(Span::styled(lyric_text, italic_style))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                lyric.render(chunks[2], buf);

                let selected = engine.selected();
                let revealed = engine.revealed_answer();
                let mut option_rows = Vec::with_capacity(prompt.options.len());
                for (idx, option) in prompt.options.iter().enumerate() {
                    let label = format!("{}) {} — {}", idx + 1, option.title, option.artist);
                    let style = match (selected, revealed) {
                        (Some(sel), Some(answer)) => {
                            if option == answer {
                                green_bold_style
                            } else if option == sel {
                                red_bold_style
                            } else {
                                dim_style
                            }
                        }
                        _ => Style::default(),
                    };
                    option_rows.push(Line::from(Span::styled(label, style)));
                }
                let options = Paragraph::new(option_rows).alignment(Alignment::Center);
                options.render(chunks[3], buf);

                let mut footer_rows = Vec::new();
                if let Some(status) = &self.status {
                    footer_rows.push(Line::from(Span::styled(status.clone(), red_bold_style)));
                }
                footer_rows.push(Line::from(Span::styled("(1-4) answer (esc) quit", dim_style)));
                let footer = Paragraph::new(footer_rows).alignment(Alignment::Center);
                footer.render(chunks[5], buf);
            }
            AppState::Results => {
                let session = self.session.get();
                let (headline, headline_style) = match self.engine.as_ref().and_then(|e| e.outcome())
                {
                    Some(RoundOutcome::Won) => ("YOU WON", green_bold_style),
                    Some(RoundOutcome::Lost) => ("YOU LOST", red_bold_style),
                    None => ("GAME OVER", dim_bold_style),
                };

                let mut lines = vec![
                    Line::from(Span::styled(headline, headline_style)),
                    Line::default(),
                    Line::from(Span::styled(format!("score {}", session.score), accent_style)),
                    Line::from(Span::styled(
                        format!("high score {}", session.high_score),
                        dim_bold_style,
                    )),
                    Line::from(Span::styled(
                        format!("{}s played", session.time_elapsed),
                        dim_style,
                    )),
                    Line::default(),
                ];
                if let Some(status) = &self.status {
                    lines.push(Line::from(Span::styled(status.clone(), red_bold_style)));
                }
                lines.push(Line::from(Span::styled(
                    "(r)eplay (n)ew genre (t)weet (esc) quit",
                    dim_style,
                )));

                centered_paragraph(lines, area, buf);
            }
        }
    }
}

fn centered_paragraph(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let pad = area.height.saturating_sub(height) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Length(pad), Constraint::Min(height)].as_ref())
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}
