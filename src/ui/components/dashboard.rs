use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::quiz::state::SessionReport;
use crate::ui::theme::Theme;

/// End-of-session summary with the most-missed words.
pub struct Dashboard<'a> {
    pub report: &'a SessionReport,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(report: &'a SessionReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.report;

        let title = if report.completed {
            " Session Complete "
        } else {
            " Game Over "
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let headline = if report.completed {
            let noun = if report.rounds == 1 { "round" } else { "rounds" };
            format!("You did it in {} {noun}!", report.rounds)
        } else {
            "Game over.".to_string()
        };
        Paragraph::new(Line::from(Span::styled(
            headline,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let label = Style::default().fg(colors.fg());
        let summary = vec![
            Line::from(vec![
                Span::styled("  Points:   ", label),
                Span::styled(
                    report.score.to_string(),
                    Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Mistakes: ", label),
                Span::styled(
                    report.mistakes.to_string(),
                    Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Rounds:   ", label),
                Span::styled(report.rounds.to_string(), Style::default().fg(colors.fg())),
            ]),
        ];
        Paragraph::new(summary).render(layout[1], buf);

        let mut missed: Vec<Line> = Vec::new();
        if report.top_mistakes.is_empty() {
            missed.push(Line::from(Span::styled(
                "  No mistakes. Nicely done.",
                Style::default().fg(colors.text_dim()),
            )));
        } else {
            missed.push(Line::from(Span::styled(
                "  Words with the most errors:",
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )));
            for (word, count) in &report.top_mistakes {
                let noun = if *count == 1 { "mistake" } else { "mistakes" };
                missed.push(Line::from(vec![
                    Span::styled(format!("    {word}"), Style::default().fg(colors.warning())),
                    Span::styled(format!(": {count} {noun}"), Style::default().fg(colors.text_dim())),
                ]));
            }
        }
        Paragraph::new(missed).render(layout[2], buf);

        Paragraph::new(Line::from(Span::styled(
            "[Enter] Back to menu  [q] Quit",
            Style::default().fg(colors.text_dim()),
        )))
        .alignment(Alignment::Center)
        .render(layout[3], buf);
    }
}
