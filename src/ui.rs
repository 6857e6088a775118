use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use typebar::{
    character::TypedCharacter,
    config::{HousingColor, InkDensity, PaperType},
    session::{CHARS_PER_LINE, LINES_PER_PAGE},
    stats::{pace_remark, top_jam_pairs},
};

use crate::{on_off, App};

const HORIZONTAL_MARGIN: u16 = 2;
const TOP_JAM_PAIRS: usize = 5;

fn housing_color(color: HousingColor) -> Color {
    match color {
        HousingColor::ForestGreen => Color::Rgb(42, 75, 58),
        HousingColor::Burgundy => Color::Rgb(110, 30, 42),
        HousingColor::Black => Color::Rgb(40, 40, 40),
    }
}

fn paper_color(paper: PaperType) -> Color {
    match paper {
        PaperType::Standard => Color::Rgb(242, 232, 201),
        PaperType::CoffeeStained => Color::Rgb(222, 200, 160),
        PaperType::Yellowed => Color::Rgb(236, 220, 160),
    }
}

fn strike_style(c: &TypedCharacter, paper: Color) -> Style {
    let ink = if c.is_red_ink {
        Color::Rgb(170, 30, 30)
    } else {
        Color::Rgb(25, 25, 25)
    };
    let mut style = Style::default().fg(ink).bg(paper);
    style = match c.ink_density {
        InkDensity::High => style.add_modifier(Modifier::BOLD),
        InkDensity::Medium => style,
        InkDensity::Low => style.add_modifier(Modifier::DIM),
    };
    if c.has_ghost {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    // a cell can't rotate, so only the worst tilts get a slant
    if c.rotation.abs() > 1.2 {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if c.is_strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    style
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tw = &self.typewriter;
        let state = tw.state();
        let settings = tw.settings();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let paper = paper_color(settings.paper_type);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        // status line
        let bell = if self.bell_ticks > 0 { "  DING!" } else { "" };
        let held: String = state
            .pressed_keys
            .iter()
            .map(|k| match k {
                ' ' => "  [space]".to_string(),
                k => format!("  [{k}]"),
            })
            .collect();
        let status = Line::from(vec![
            Span::styled(
                format!("Ink {:>3}%", tw.ink_percent()),
                if tw.ink_percent() < 30 {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                },
            ),
            Span::raw(format!(
                "  {} WPM  {}  Page {}/{}  Line {}/{}  Col {}/{}",
                tw.wpm(),
                tw.elapsed_time(),
                state.current_page_index + 1,
                state.pages.len(),
                state.current_line_index + 1,
                LINES_PER_PAGE,
                state.carriage_position,
                CHARS_PER_LINE,
            )),
            Span::styled(
                if settings.is_red_ink { "  red" } else { "  black" },
                Style::default().fg(if settings.is_red_ink {
                    Color::Red
                } else {
                    Color::Gray
                }),
            ),
            Span::styled(held, Style::default().add_modifier(Modifier::REVERSED)),
            Span::styled(bell, bold_style.fg(Color::Yellow)),
        ]);
        Paragraph::new(status).render(chunks[0], buf);

        // the sheet, scrolled so the active line stays in view
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(housing_color(settings.housing_color)))
            .title(format!(" sheet {} ", state.current_page_index + 1));
        let inner = block.inner(chunks[1]);
        block.render(chunks[1], buf);

        let visible = inner.height.max(1) as usize;
        let skip = (state.current_line_index + 1).saturating_sub(visible);
        let lines: Vec<Line> = state
            .current_page()
            .lines
            .iter()
            .skip(skip)
            .map(|line| {
                Line::from(
                    line.characters
                        .iter()
                        .map(|c| Span::styled(c.char.to_string(), strike_style(c, paper)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        Paragraph::new(lines)
            .style(Style::default().bg(paper))
            .render(inner, buf);

        // footer
        let footer = if let Some(notice) = &self.notice {
            Span::styled(notice.as_str(), bold_style.fg(Color::Yellow))
        } else if state.show_backspace_tooltip {
            Span::styled(
                "No erasing on a typewriter: backspace overstrikes the last letter.",
                Style::default().add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::styled(
                "Enter return  Tab stats/settings  ^R ribbon  ^K ink  ^N new sheet  ^L clear  ^S save  Esc quit",
                Style::default().add_modifier(Modifier::DIM),
            )
        };
        Paragraph::new(Line::from(footer)).render(chunks[2], buf);

        if state.jam_state.is_jammed {
            let keys = |k: Option<char>| k.map(|c| c.to_string()).unwrap_or_default();
            let jam_area = centered(area, 44, 5);
            Clear.render(jam_area, buf);
            Paragraph::new(vec![
                Line::from(Span::styled(
                    format!(
                        "Typebars {} and {} collided",
                        keys(state.jam_state.key1),
                        keys(state.jam_state.key2)
                    ),
                    bold_style,
                )),
                Line::from("Press Esc to free them"),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" JAM "),
            )
            .render(jam_area, buf);
        }

        if self.show_stats {
            let stats = &state.stats;
            let wpm = tw.wpm();
            let mut lines = vec![
                Line::from(format!(
                    "Characters {:>6}   Words   {:>6}",
                    stats.characters_typed, stats.words_typed
                )),
                Line::from(format!(
                    "Time       {:>6}   Returns {:>6}",
                    tw.elapsed_time(),
                    stats.carriage_returns
                )),
                Line::from(""),
                Line::from(Span::styled(format!("{wpm} WPM"), bold_style)),
                Line::from(pace_remark(wpm)),
            ];
            if stats.jams > 0 {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Typebar jams ({})", stats.jams),
                    bold_style,
                )));
                for (pair, count) in top_jam_pairs(stats, TOP_JAM_PAIRS) {
                    lines.push(Line::from(format!("  {pair:<6} {count}")));
                }
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Settings", bold_style)));
            for (key, name, value) in [
                ("F2", "housing", settings.housing_color.to_string()),
                ("F3", "paper", settings.paper_type.to_string()),
                ("F4", "density", settings.ink_density.to_string()),
                ("F5", "jams", on_off(settings.jam_simulation_enabled).to_string()),
                ("F6", "bell", on_off(settings.margin_bell_enabled).to_string()),
            ] {
                lines.push(Line::from(format!("  {key} {name:<8} {value}")));
            }

            let stats_area = centered(area, 52, lines.len() as u16 + 2);
            Clear.render(stats_area, buf);
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Session Statistics "),
                )
                .render(stats_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebar::{
        character::SequenceSource,
        clock::ManualClock,
        input::{self, Command},
        runtime::{AutoSave, AUTOSAVE_INTERVAL_MS},
        store::MemoryStore,
        typewriter::Typewriter,
    };

    fn app() -> App {
        App {
            typewriter: Typewriter::new(
                Box::new(ManualClock::new(0)),
                Box::new(SequenceSource::new([0.5])),
            ),
            store: Box::new(MemoryStore::new()),
            autosave: AutoSave::new(AUTOSAVE_INTERVAL_MS, 0),
            show_stats: false,
            bell_ticks: 0,
            notice: None,
        }
    }

    fn screen(app: &App) -> String {
        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn held_key_shows_in_status_line() {
        let mut app = app();
        assert!(!screen(&app).contains("[q]"));
        input::apply(&mut app.typewriter, Command::Type('Q'));
        assert!(screen(&app).contains("[q]"));
    }

    #[test]
    fn stats_panel_lists_settings_keys() {
        let mut app = app();
        app.show_stats = true;
        input::apply(&mut app.typewriter, Command::ToggleJams);
        let text = screen(&app);
        assert!(text.contains("F5 jams     off"));
        assert!(text.contains("F2 housing  forest-green"));
    }
}
