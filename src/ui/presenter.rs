use std::io::Stdout;

use anyhow::Result;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::quiz::view::{Header, PAUSE_OPTIONS, PauseView, Presenter, QuestionView};
use crate::ui::components::menu::{Menu, MenuItem};
use crate::ui::components::progress_bar::CountdownBar;
use crate::ui::components::question_card::QuestionCard;
use crate::ui::layout::{AppLayout, centered_rect};
use crate::ui::theme::Theme;

pub type Term = Terminal<CrosstermBackend<Stdout>>;

/// Draws engine payloads onto the alternate screen.
pub struct TerminalPresenter<'a> {
    terminal: &'a mut Term,
    theme: &'a Theme,
    last_question: Option<QuestionView>,
}

impl<'a> TerminalPresenter<'a> {
    pub fn new(terminal: &'a mut Term, theme: &'a Theme) -> Self {
        Self {
            terminal,
            theme,
            last_question: None,
        }
    }
}

impl Presenter for TerminalPresenter<'_> {
    fn show_question(&mut self, view: &QuestionView) -> Result<()> {
        let theme = self.theme;
        self.terminal
            .draw(|frame| render_question(frame, view, theme, false))?;
        self.last_question = Some(view.clone());
        Ok(())
    }

    fn show_pause(&mut self, view: &PauseView) -> Result<()> {
        let theme = self.theme;
        let behind = self.last_question.as_ref();
        self.terminal.draw(|frame| {
            if let Some(q) = behind {
                render_question(frame, q, theme, true);
            }
            render_pause(frame, view, theme);
        })?;
        Ok(())
    }
}

pub fn header_line<'h>(header: &Header, theme: &Theme) -> Line<'h> {
    let colors = &theme.colors;
    let info = format!(
        " Points: {}  Mistakes: {}  Round {}",
        header.score, header.mistakes, header.round
    );
    Line::from(vec![
        Span::styled(
            " [ESC] Pause ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(colors.header_fg()).bg(colors.header_bg())),
    ])
}

pub fn render_question(frame: &mut Frame, view: &QuestionView, theme: &Theme, paused: bool) {
    let area = frame.area();
    let colors = &theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let layout = AppLayout::new(area);
    frame.render_widget(
        Paragraph::new(header_line(&view.header, theme))
            .style(Style::default().bg(colors.header_bg())),
        layout.header,
    );

    let card_area = centered_rect(70, 90, layout.main);
    frame.render_widget(QuestionCard::new(view, theme), card_area);

    let bar = CountdownBar::new(view.time_remaining, view.time_limit, theme).paused(paused);
    frame.render_widget(bar, layout.timer);

    let footer_text = match (&view.notice, view.feedback.is_some()) {
        (Some(notice), _) => format!(" {notice}"),
        (None, true) => " [Enter] Next question".to_string(),
        (None, false) => format!(" [1-{}] Answer  [Ctrl-C] Quit", view.choices.len()),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer_text,
            Style::default().fg(colors.text_dim()),
        ))),
        layout.footer,
    );
}

pub fn render_pause(frame: &mut Frame, view: &PauseView, theme: &Theme) {
    let items = PAUSE_OPTIONS
        .iter()
        .enumerate()
        .map(|(i, label)| MenuItem::new(&(i + 1).to_string(), label, ""))
        .collect();
    let subtitle = match &view.header {
        Some(h) => format!("Points {}  Mistakes {}  Round {}", h.score, h.mistakes, h.round),
        None => String::new(),
    };
    let mut menu = Menu::new("Pause", &subtitle, items, theme);
    menu.status = view.status.clone();

    let popup = centered_rect(40, 50, frame.area());
    frame.render_widget(Clear, popup);
    frame.render_widget(&menu, popup);
}
