//! Ratatui-based terminal UI.
//!
//! The TUI shows a "Student Information" panel with five selectors and two
//! sliders, and a result panel with the predicted math score and the input
//! row used for it. The pipeline is loaded by the caller before this module
//! touches the terminal.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::domain::{Score, StudentRecord};
use crate::error::AppError;
use crate::models::Pipeline;

pub mod form;

use form::{FormAction, FormField, FormResult, FormState};

/// Width of the text slider bar, in cells.
const SLIDER_CELLS: usize = 20;

/// Start the TUI with an already loaded pipeline.
pub fn run(pipeline: Pipeline) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(pipeline);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    pipeline: Pipeline,
    form: FormState,
}

impl App {
    fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            form: FormState::default(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.form.handle_key(key.code) {
                        FormAction::Quit => break,
                        FormAction::Submit => self.form.submit(&self.pipeline),
                        FormAction::Continue => {}
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Student Math Score Predictor",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw("Enter the student's details to predict their "),
                Span::styled("Math Score", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  (target: {})", self.pipeline.target()),
                    Style::default().fg(Color::Gray),
                ),
            ]),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(62), Constraint::Min(0)])
            .split(area);

        self.draw_inputs(frame, chunks[0]);
        self.draw_result(frame, chunks[1]);
    }

    fn draw_inputs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FormField::ALL
            .iter()
            .map(|&field| ListItem::new(field_line(field, &self.form.record)))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Student Information").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.form.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Prediction Result").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(result) = &self.form.result else {
            let msg = Paragraph::new("Press Enter to predict the math score.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(msg, inner);
            return;
        };

        match result {
            FormResult::Error(message) => {
                let p = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true });
                frame.render_widget(p, inner);
            }
            FormResult::Prediction(output) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(2), Constraint::Min(0)])
                    .split(inner);

                let headline = Paragraph::new(Line::from(Span::styled(
                    crate::report::format_prediction(output.value),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
                frame.render_widget(headline, chunks[0]);

                let rows = output
                    .row
                    .cells
                    .iter()
                    .map(|(col, v)| Row::new(vec![col.to_string(), v.to_string()]));
                let table = Table::new(rows, [Constraint::Length(28), Constraint::Min(10)])
                    .header(
                        Row::new(vec!["column", "value"])
                            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
                    )
                    .block(Block::default().title("Input Data Used for Prediction"));
                frame.render_widget(table, chunks[1]);
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ change  PgUp/PgDn ±10  Enter predict  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.form.status.as_str(), Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn field_line(field: FormField, record: &StudentRecord) -> Line<'static> {
    let value = field.value(record);
    let shown = if field.is_slider() {
        let score = match field {
            FormField::ReadingScore => record.reading_score,
            _ => record.writing_score,
        };
        format!("{} {value:>3}", slider_bar(score, SLIDER_CELLS))
    } else {
        format!("‹ {value} ›")
    };
    Line::from(vec![
        Span::styled(format!("{:<28}", field.label()), Style::default().fg(Color::Gray)),
        Span::raw(shown),
    ])
}

/// Text slider: filled cells proportional to the score.
fn slider_bar(score: Score, cells: usize) -> String {
    let filled = (score.value() as usize * cells + (Score::MAX as usize / 2)) / Score::MAX as usize;
    let filled = filled.min(cells);
    format!("[{}{}]", "█".repeat(filled), "·".repeat(cells - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_bar_spans_full_range() {
        assert_eq!(slider_bar(Score::clamped(0), 10), format!("[{}]", "·".repeat(10)));
        assert_eq!(slider_bar(Score::clamped(100), 10), format!("[{}]", "█".repeat(10)));
        assert_eq!(slider_bar(Score::clamped(70), 10), format!("[{}{}]", "█".repeat(7), "·".repeat(3)));
    }

    #[test]
    fn field_line_shows_current_values() {
        let record = StudentRecord::default();
        let text: String = field_line(FormField::Lunch, &record)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("Lunch Type"));
        assert!(text.contains("Standard"));
    }
}
