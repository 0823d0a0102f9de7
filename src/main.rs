use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::widgets::Block;

use wordrush::config::{self, Config};
use wordrush::dictionary::Dictionary;
use wordrush::event::KeyListener;
use wordrush::logging;
use wordrush::quiz::state::SessionReport;
use wordrush::quiz::{EngineSettings, RoundEngine, SessionIo};
use wordrush::store::json_store::SnapshotStore;
use wordrush::store::schema::SessionSnapshot;
use wordrush::ui::components::dashboard::Dashboard;
use wordrush::ui::components::menu::{Menu, MenuItem};
use wordrush::ui::layout::centered_rect;
use wordrush::ui::presenter::{Term, TerminalPresenter};
use wordrush::ui::theme::Theme;

const KEY_POLL_RATE: Duration = Duration::from_millis(50);
const MAX_LISTED_SAVES: usize = 9;
const LOAD_FAILED_NOTICE: &str = "Failed to load game, starting a new one";

#[derive(Parser)]
#[command(name = "wordrush", version, about = "Timed multiple-choice vocabulary quiz")]
struct Cli {
    #[arg(short = 'l', long, help = "Seconds allowed per question")]
    time_limit: Option<u32>,

    #[arg(short, long, help = "Bundled dictionary name or path to a JSON file")]
    dictionary: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Log at debug level")]
    debug: bool,

    #[arg(long, help = "List the bundled dictionaries and exit")]
    list_dictionaries: bool,

    #[arg(long, help = "Write the effective settings to the config file and exit")]
    write_config: bool,
}

enum StartChoice {
    NewGame,
    LoadGame,
    Quit,
}

struct App<'a> {
    config: &'a Config,
    dictionary: &'a Dictionary,
    theme: &'a Theme,
    store: &'a mut SnapshotStore,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_dictionaries {
        for name in Dictionary::bundled_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = Config::load()?;
    if let Some(limit) = cli.time_limit {
        config.time_limit_secs = limit;
    }
    if let Some(dictionary) = cli.dictionary {
        config.dictionary = dictionary;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();

    if cli.write_config {
        config.save()?;
        println!("settings written");
        return Ok(());
    }

    let _log_guard = logging::init(&config::data_dir().join("logs"), &config.log_level, cli.debug)?;

    let dictionary = load_dictionary(&config.dictionary)?;
    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });
    let mut store = SnapshotStore::with_base_dir(config.save_path())?;
    tracing::info!(
        dictionary = %config.dictionary,
        words = dictionary.len(),
        time_limit = config.time_limit_secs,
        "wordrush started"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut ctx = App {
        config: &config,
        dictionary: &dictionary,
        theme: &theme,
        store: &mut store,
    };
    let result = run_app(&mut terminal, &mut ctx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "wordrush stopped");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// A bundled name, or a path when a file by that name exists.
fn load_dictionary(name: &str) -> Result<Dictionary> {
    let path = Path::new(name);
    if path.is_file() {
        Dictionary::load_file(path)
            .with_context(|| format!("loading dictionary {}", path.display()))
    } else {
        Dictionary::load_bundled(name).with_context(|| format!("loading dictionary {name}"))
    }
}

fn run_app(terminal: &mut Term, ctx: &mut App) -> Result<()> {
    let mut status = None;
    loop {
        let mut notice = None;
        let resume = match start_menu(terminal, ctx.theme, status.take())? {
            StartChoice::Quit => return Ok(()),
            StartChoice::NewGame => None,
            StartChoice::LoadGame => {
                let names = ctx.store.list()?;
                if names.is_empty() {
                    status = Some("No saved games.".to_string());
                    continue;
                }
                let Some(name) = pick_save(terminal, ctx.theme, &names)? else {
                    continue;
                };
                match ctx.store.load(&name) {
                    Ok(snapshot) => Some(snapshot),
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to load game, starting a fresh session");
                        notice = Some(LOAD_FAILED_NOTICE);
                        None
                    }
                }
            }
        };

        let report = play(terminal, ctx, resume.as_ref(), notice)?;
        if show_report(terminal, ctx.theme, &report)? {
            return Ok(());
        }
    }
}

fn play(
    terminal: &mut Term,
    ctx: &mut App,
    resume: Option<&SessionSnapshot>,
    notice: Option<&str>,
) -> Result<SessionReport> {
    let io = SessionIo::new();
    let cancel = io.cancel.clone();
    let listener = KeyListener::spawn(io.events.clone(), io.gate.clone(), cancel.clone(), KEY_POLL_RATE)?;

    let settings = EngineSettings::from_config(ctx.config);
    let mut presenter = TerminalPresenter::new(terminal, ctx.theme);
    let result = {
        let mut engine = RoundEngine::new(ctx.dictionary, settings, io, &mut presenter)
            .with_snapshot_sink(&mut *ctx.store);
        if let Some(snapshot) = resume {
            engine.restore(snapshot);
        }
        if let Some(notice) = notice {
            engine = engine.with_notice(notice);
        }
        engine.run()
    };

    cancel.cancel();
    listener.join();
    result
}

fn start_menu(terminal: &mut Term, theme: &Theme, status: Option<String>) -> Result<StartChoice> {
    let mut menu = Menu::start(theme);
    menu.status = status;
    loop {
        draw_menu(terminal, &menu, theme)?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(StartChoice::Quit);
            }
            KeyCode::Char('1') => return Ok(StartChoice::NewGame),
            KeyCode::Char('2') => return Ok(StartChoice::LoadGame),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(StartChoice::Quit),
            KeyCode::Up | KeyCode::Char('k') => menu.prev(),
            KeyCode::Down | KeyCode::Char('j') => menu.next(),
            KeyCode::Enter => {
                return Ok(match menu.selected {
                    0 => StartChoice::NewGame,
                    1 => StartChoice::LoadGame,
                    _ => StartChoice::Quit,
                });
            }
            _ => {}
        }
    }
}

/// Numbered picker over the newest saves. `None` means back to the menu.
fn pick_save(terminal: &mut Term, theme: &Theme, names: &[String]) -> Result<Option<String>> {
    let shown = &names[..names.len().min(MAX_LISTED_SAVES)];
    let items = shown
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let label = name.trim_end_matches(".json");
            MenuItem::new(&(i + 1).to_string(), label, "")
        })
        .collect();
    let mut menu = Menu::new("Load Game", "[Esc] Back", items, theme);

    loop {
        draw_menu(terminal, &menu, theme)?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(None),
            KeyCode::Up | KeyCode::Char('k') => menu.prev(),
            KeyCode::Down | KeyCode::Char('j') => menu.next(),
            KeyCode::Enter => return Ok(shown.get(menu.selected).cloned()),
            KeyCode::Char(ch) => {
                if let Some(n) = ch.to_digit(10)
                    && n >= 1
                    && let Some(name) = shown.get(n as usize - 1)
                {
                    return Ok(Some(name.clone()));
                }
            }
            _ => {}
        }
    }
}

/// Returns true when the player chose to quit.
fn show_report(terminal: &mut Term, theme: &Theme, report: &SessionReport) -> Result<bool> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(
                Block::default().style(Style::default().bg(theme.colors.bg())),
                area,
            );
            let popup = centered_rect(60, 70, area);
            frame.render_widget(Dashboard::new(report, theme), popup);
        })?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Esc => return Ok(false),
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            _ => {}
        }
    }
}

fn draw_menu(terminal: &mut Term, menu: &Menu, theme: &Theme) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.colors.bg())),
            area,
        );
        let menu_area = centered_rect(50, 80, area);
        frame.render_widget(menu, menu_area);
    })?;
    Ok(())
}
