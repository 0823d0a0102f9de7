use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::quiz::state::Outcome;
use crate::quiz::view::QuestionView;
use crate::ui::theme::Theme;

pub struct QuestionCard<'a> {
    pub view: &'a QuestionView,
    pub theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(view: &'a QuestionView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let view = self.view;

        let block = Block::bordered()
            .title(format!(" Words left: {} ", view.words_left))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(view.choices.len() as u16 + 1),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(Line::from(vec![
            Span::styled("What does the word ", Style::default().fg(colors.fg())),
            Span::styled(
                &*view.word,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" mean?", Style::default().fg(colors.fg())),
        ]))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(layout[0], buf);

        let answered = view.feedback.as_ref();
        let lines: Vec<Line> = view
            .choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let text = format!("  {}. {choice}", i + 1);
                let style = match answered {
                    Some(fb) if *choice == fb.answer => Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                    Some(_) => Style::default().fg(colors.text_dim()),
                    None => Style::default().fg(colors.fg()),
                };
                Line::from(Span::styled(text, style))
            })
            .collect();
        Paragraph::new(lines).render(layout[1], buf);

        if let Some(fb) = answered {
            let color = match fb.outcome {
                Outcome::Correct => colors.success(),
                Outcome::Incorrect => colors.error(),
                Outcome::TimedOut => colors.warning(),
            };
            let mut spans = vec![Span::styled(
                fb.outcome.banner(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            if fb.outcome != Outcome::Correct {
                spans.push(Span::styled(
                    format!("  {} = {}", view.word, fb.answer),
                    Style::default().fg(colors.text_dim()),
                ));
            }
            Paragraph::new(Line::from(spans))
                .alignment(Alignment::Center)
                .render(layout[2], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::state::Phase;
    use crate::quiz::timer::QuestionId;
    use crate::quiz::view::{Feedback, Header};

    fn view() -> QuestionView {
        QuestionView {
            question: QuestionId(1),
            phase: Phase::AwaitingAnswer,
            header: Header { score: 0, mistakes: 0, round: 1 },
            words_left: 3,
            word: "dog".to_string(),
            prompt: "What does the word 'dog' mean?".to_string(),
            choices: vec!["gato".into(), "perro".into(), "casa".into(), "sol".into()],
            time_remaining: Some(10),
            time_limit: 10,
            feedback: None,
            notice: None,
        }
    }

    fn rendered(view: &QuestionView) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 14);
        let mut buf = Buffer::empty(area);
        QuestionCard::new(view, &theme).render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_lists_numbered_choices() {
        let text = rendered(&view());
        assert!(text.contains("dog"));
        assert!(text.contains("2. perro"));
        assert!(text.contains("Words left: 3"));
    }

    #[test]
    fn test_feedback_banner() {
        let mut v = view();
        v.feedback = Some(Feedback {
            outcome: Outcome::TimedOut,
            answer: "perro".to_string(),
        });
        let text = rendered(&v);
        assert!(text.contains("Time is up!"));
        assert!(text.contains("dog = perro"));
    }
}
