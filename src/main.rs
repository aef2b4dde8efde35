pub mod api;
pub mod app_dirs;
pub mod backend;
pub mod config;
pub mod error;
pub mod round;
pub mod runtime;
pub mod session;
pub mod songs;
pub mod store;
pub mod timer;
pub mod ui;

use crate::{
    api::ApiClient,
    app_dirs::AppDirs,
    backend::{BackendSession, HttpGameBackend},
    config::{ConfigStore, Difficulty, FileConfigStore, Preferences, Theme},
    round::{RoundConfig, RoundEngine},
    runtime::{CrosstermEventSource, GameEvent, Runner},
    session::SessionState,
    songs::Genre,
    store::Store,
    timer::TimerState,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    time::{Duration, Instant},
};
use tracing::warn;
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 100;

pub const GENRES: [Genre; 4] = [Genre::Pop, Genre::Rock, Genre::HipHop, Genre::Rnb];

/// guess the song from the lyric, against the clock
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal client for the LyricFlip lyric-guessing game. Pick a genre, read the lyric, name the song before the clock runs out."
)]
pub struct Cli {
    /// genre to draw lyric prompts from (skips the menu)
    #[clap(short = 'g', long, value_enum)]
    genre: Option<Genre>,

    /// number of rounds in a session
    #[clap(short = 'r', long, default_value_t = 5)]
    rounds: u32,

    /// seconds on the clock each round (overrides the difficulty preset)
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// difficulty preset controlling the round clock
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// color theme
    #[clap(long, value_enum)]
    theme: Option<Theme>,

    /// silence the terminal bell on answers
    #[clap(long)]
    mute: bool,

    /// backend base url (defaults to LYRICFLIP_API_URL or the local address)
    #[clap(long)]
    api_url: Option<String>,

    /// play without the multiplayer backend
    #[clap(long)]
    offline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Menu,
    Playing,
    Results,
}

pub struct App {
    pub cli: Option<Cli>,
    pub prefs: Preferences,
    pub config_store: FileConfigStore,
    pub session: Store<SessionState>,
    pub timer: Store<TimerState>,
    pub engine: Option<RoundEngine>,
    pub backend: BackendSession,
    pub backend_round: Option<u64>,
    pub state: AppState,
    pub menu_cursor: usize,
    pub last_genre: Option<Genre>,
    pub status: Option<String>,
    pending_bell: bool,
}

impl App {
    pub fn new(cli: Cli, prefs: Preferences, config_store: FileConfigStore) -> Self {
        let mut status = None;
        let backend = if cli.offline {
            BackendSession::uninitialized()
        } else {
            match build_backend(&cli) {
                Ok(backend) => BackendSession::new(Box::new(backend)),
                Err(err) => {
                    warn!("backend unavailable: {err}");
                    status = Some(format!("backend unavailable: {err}"));
                    BackendSession::uninitialized()
                }
            }
        };

        let menu_cursor = cli
            .genre
            .and_then(|g| GENRES.iter().position(|c| *c == g))
            .unwrap_or(0);
        let start_genre = cli.genre;

        let mut app = Self {
            cli: Some(cli),
            prefs,
            config_store,
            session: Store::new(SessionState::default()),
            timer: Store::new(TimerState::default()),
            engine: None,
            backend,
            backend_round: None,
            state: AppState::Menu,
            menu_cursor,
            last_genre: None,
            status,
            pending_bell: false,
        };

        if let Some(genre) = start_genre {
            app.start_session(genre);
        }
        app
    }

    fn round_secs(&self) -> u64 {
        self.cli
            .as_ref()
            .and_then(|cli| cli.seconds)
            .unwrap_or_else(|| self.prefs.difficulty.round_secs())
    }

    fn max_rounds(&self) -> u32 {
        self.cli.as_ref().map_or(5, |cli| cli.rounds)
    }

    pub fn start_session(&mut self, genre: Genre) {
        let config = RoundConfig::new(genre, self.max_rounds(), self.round_secs());
        match RoundEngine::new(config) {
            Ok(mut engine) => {
                let mut rng = rand::thread_rng();
                if let Err(err) = engine.start(&mut rng, &mut self.session, &mut self.timer) {
                    self.status = Some(err.to_string());
                    return;
                }
                self.engine = Some(engine);
                self.last_genre = Some(genre);
                self.state = AppState::Playing;
                self.status = None;

                // Solo sessions are still registered with the backend when
                // one is reachable; failures leave the local game intact.
                self.backend_round = None;
                if self.backend.is_initialized() {
                    match self.backend.create_round(genre, 0) {
                        Ok(info) => self.backend_round = Some(info.id),
                        Err(err) => {
                            warn!("create_round failed: {err}");
                            self.status = Some(format!("offline session: {err}"));
                        }
                    }
                }
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Feed wall-clock time through the round engine.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.state != AppState::Playing {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let mut rng = rand::thread_rng();
        match engine.advance(elapsed, &mut rng, &mut self.session, &mut self.timer) {
            Ok(Some(_)) => {
                self.state = AppState::Results;
                self.pending_bell = self.prefs.sound_enabled;
            }
            Ok(None) => {}
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn select_option(&mut self, index: usize) {
        if self.state != AppState::Playing {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if engine.select(index, &mut self.session, &mut self.timer).is_none() {
            return;
        }
        self.pending_bell = self.prefs.sound_enabled;

        if let (Some(round_id), Some(choice)) = (self.backend_round, engine.selected()) {
            let title = choice.title.clone();
            if let Err(err) = self.backend.submit_answer(round_id, &title) {
                warn!("submit_answer failed: {err}");
                self.status = Some(err.to_string());
            }
        }

        if engine.outcome().is_some() {
            self.state = AppState::Results;
        }
    }

    pub fn to_menu(&mut self) {
        self.session.update(SessionState::reset_game);
        self.timer.update(|t| {
            t.stop();
            t.end_game();
            t.reset(None);
        });
        self.engine = None;
        self.backend_round = None;
        self.state = AppState::Menu;
        self.status = None;
    }

    fn cycle_difficulty(&mut self) {
        self.prefs.difficulty = match self.prefs.difficulty {
            Difficulty::Easy => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        };
        if let Err(err) = self.config_store.save(&self.prefs) {
            warn!("failed to save preferences: {err}");
        }
    }

    fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.pending_bell)
    }
}

fn build_backend(cli: &Cli) -> crate::error::Result<HttpGameBackend> {
    let api = match &cli.api_url {
        Some(url) => ApiClient::with_base_url(url.clone())?,
        None => ApiClient::new()?,
    };
    Ok(HttpGameBackend::new(api))
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let Some(log_path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let config_store = FileConfigStore::new();
    let mut prefs = config_store.load();
    if let Some(theme) = cli.theme {
        prefs.theme = theme;
    }
    if let Some(difficulty) = cli.difficulty {
        prefs.difficulty = difficulty;
    }
    if cli.mute {
        prefs.sound_enabled = false;
    }
    if let Err(err) = config_store.save(&prefs) {
        warn!("failed to save preferences: {err}");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli, prefs, config_store);
    start_tui(&mut terminal, &mut app)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let event_source = CrosstermEventSource::new();
    let runner = Runner::new(event_source, Duration::from_millis(TICK_RATE_MS));

    let mut last = Instant::now();

    loop {
        terminal.draw(|f| ui(app, f))?;

        let event = runner.step();
        let now = Instant::now();
        app.advance(now - last);
        last = now;

        match event {
            GameEvent::Tick | GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }
                match app.state {
                    AppState::Menu => match key.code {
                        KeyCode::Esc => break,
                        KeyCode::Up => {
                            if app.menu_cursor > 0 {
                                app.menu_cursor -= 1;
                            }
                        }
                        KeyCode::Down => {
                            if app.menu_cursor + 1 < GENRES.len() {
                                app.menu_cursor += 1;
                            }
                        }
                        KeyCode::Enter => app.start_session(GENRES[app.menu_cursor]),
                        KeyCode::Char('d') => app.cycle_difficulty(),
                        _ => {}
                    },
                    AppState::Playing => match key.code {
                        KeyCode::Esc => app.to_menu(),
                        KeyCode::Char(c @ '1'..='4') => {
                            let index = (c as usize) - ('1' as usize);
                            app.select_option(index);
                        }
                        _ => {}
                    },
                    AppState::Results => match key.code {
                        KeyCode::Esc => break,
                        KeyCode::Char('r') => {
                            if let Some(genre) = app.last_genre {
                                app.start_session(genre);
                            }
                        }
                        KeyCode::Char('n') => app.to_menu(),
                        KeyCode::Char('t') => {
                            if Browser::is_available() {
                                let genre = app
                                    .last_genre
                                    .map(|g| g.to_string().to_lowercase())
                                    .unwrap_or_default();
                                webbrowser::open(&format!(
                                    "https://twitter.com/intent/tweet?text={}%20points%20guessing%20{}%20lyrics%20on%20lyricflip",
                                    app.session.get().score, genre
                                ))
                                .unwrap_or_default();
                            }
                        }
                        _ => {}
                    },
                }
            }
        }

        if app.take_bell() {
            let mut out = io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
