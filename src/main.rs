mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use focustap::{
    config::{ConfigStore, FileConfigStore},
    runtime::{run_session, CrosstermInputSource, GameEvent, Runner},
    stimulus::StimulusPool,
    timer::MonotonicClock,
    Game, Presenter, ResultSummary, StimulusIdentity, Variant,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

/// go/no-go reaction time test: tap every item except the bad one
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Items flash on screen in two rounds of increasing spacing. Tap for every item except the bad one (X, or the aubergine). Scores the mean response time."
)]
pub struct Cli {
    /// kind of item to show (overrides the config file)
    #[clap(short = 'v', long = "variant", value_enum)]
    game_type: Option<GameType>,

    /// seed for a reproducible item sequence
    #[clap(short = 's', long)]
    seed: Option<u64>,

    /// settings file to use instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// print the result summary as JSON when the test ends
    #[clap(long)]
    json: bool,

    /// write logs to this file (filter with RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum GameType {
    Letter,
    Image,
}

impl GameType {
    fn as_variant(&self) -> Variant {
        match self {
            GameType::Letter => Variant::Letter,
            GameType::Image => Variant::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Instructions,
    Playing,
    Results,
}

/// What the terminal shows; fed by the game through `TuiPresenter`
#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub variant: Variant,
    pub bad: StimulusIdentity,
    pub visible: Option<StimulusIdentity>,
    pub items_shown: usize,
    pub total_items: usize,
    pub summary: Option<ResultSummary>,
}

impl App {
    pub fn new(variant: Variant, total_items: usize) -> Self {
        Self {
            state: AppState::Instructions,
            variant,
            bad: StimulusPool::for_variant(variant, 0.0).bad(),
            visible: None,
            items_shown: 0,
            total_items,
            summary: None,
        }
    }
}

struct TuiPresenter<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    app: &'a mut App,
}

impl<B: Backend> Presenter for TuiPresenter<'_, B> {
    fn on_item_shown(&mut self, identity: StimulusIdentity) {
        self.app.visible = Some(identity);
        self.app.items_shown += 1;
    }

    fn on_item_hidden(&mut self) {
        self.app.visible = None;
    }

    fn on_session_ended(&mut self, summary: &ResultSummary) {
        self.app.visible = None;
        self.app.summary = Some(summary.clone());
        self.app.state = AppState::Results;
    }

    fn flush(&mut self) -> io::Result<()> {
        let app = &*self.app;
        self.terminal
            .draw(|f| f.render_widget(app, f.area()))
            .map(|_| ())
    }
}

fn init_logging(path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    if let Some(path) = path {
        let file = File::create(path)?;
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("focustap=info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    Ok(())
}

fn build_game(cli: &Cli) -> Result<Game, Box<dyn Error>> {
    let store = cli
        .config
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let mut config = store.load();
    // a variant picked on the command line becomes the new default; the seed does not
    if let Some(game_type) = cli.game_type {
        config.variant = game_type.as_variant().to_string();
        if let Err(e) = store.save(&config) {
            tracing::warn!("could not save config {}: {}", store.path().display(), e);
        }
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let settings = config.to_settings()?;
    tracing::info!(config = %store.path().display(), variant = %settings.variant, "settings loaded");
    Ok(Game::new(settings, config.seed)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let mut game = build_game(&cli)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut game);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(summary) = result? {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{}", summary.feedback);
        }
    }

    Ok(())
}

/// Instructions, then the session, then results. `None` if the user quit before starting.
fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    game: &mut Game,
) -> Result<Option<ResultSummary>, Box<dyn Error>> {
    let mut app = App::new(
        game.settings().variant,
        game.settings().schedule.total_items(),
    );
    let clock = MonotonicClock::new();
    let runner = Runner::new(CrosstermInputSource::new(clock), clock);

    terminal.draw(|f| f.render_widget(&app, f.area()))?;
    if runner.wait_for_key() == GameEvent::Abandon {
        return Ok(None);
    }

    app.state = AppState::Playing;
    game.start(runner.now_ms())?;
    let summary = {
        let mut presenter = TuiPresenter {
            terminal: &mut *terminal,
            app: &mut app,
        };
        run_session(game, &runner, &mut presenter)?
    };

    terminal.draw(|f| f.render_widget(&app, f.area()))?;
    runner.wait_for_key();

    Ok(Some(summary))
}
