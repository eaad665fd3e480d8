use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use snapkey::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    engine::{GameEngine, Phase},
    logging,
    runtime::{CrosstermEventSource, DrillEvent, FixedTicker, Runner},
    store::{KeyValueStore, SqliteStore},
    tier::DifficultyTier,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

/// reaction-speed symbol drill for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction-speed drill: a symbol is shown and you have to press it before the countdown runs out. Every hit scores a point; a wrong key or running out of time ends the game. Best scores are kept per difficulty mode."
)]
pub struct Cli {
    /// difficulty mode to start in (defaults to the last one played)
    #[clap(short = 't', long, value_enum)]
    tier: Option<DifficultyTier>,

    /// score database to use instead of the default state directory
    #[clap(long)]
    db_path: Option<PathBuf>,

    /// file to write logs to (filter with SNAPKEY_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// redraw interval in milliseconds
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    /// zero the high scores of every mode and exit
    #[clap(long)]
    reset_high_scores: bool,

    /// print the high scores and exit
    #[clap(long)]
    scores: bool,
}

impl Cli {
    /// Command-line values win over the config file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(tier) = self.tier {
            config.tier = tier;
        }
        if let Some(tick_rate_ms) = self.tick_rate_ms {
            config.tick_rate_ms = tick_rate_ms;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitType {
    Continue,
    Quit,
}

pub struct App<S: KeyValueStore> {
    pub engine: GameEngine<S>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(engine: GameEngine<S>) -> Self {
        Self { engine }
    }

    fn on_event(&mut self, event: DrillEvent) -> ExitType {
        match event {
            DrillEvent::Key(key) => self.on_key(key),
            DrillEvent::Resize | DrillEvent::Tick => ExitType::Continue,
            DrillEvent::Closed => {
                warn!("terminal input closed");
                ExitType::Quit
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> ExitType {
        if key.kind == KeyEventKind::Release {
            return ExitType::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return ExitType::Quit,
            // ctrl+c to quit
            KeyCode::Char('c') if ctrl => return ExitType::Quit,
            KeyCode::Char('r') if ctrl => {
                self.engine.reset_high_scores();
                return ExitType::Continue;
            }
            _ => {}
        }

        match self.engine.phase() {
            Phase::Playing => {
                self.engine.handle_key(&key);
            }
            Phase::GameOver => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.engine.new_game();
                }
                KeyCode::Tab => {
                    self.engine.cycle_tier();
                }
                _ => {}
            },
        }

        ExitType::Continue
    }
}

fn print_scores<S: KeyValueStore>(engine: &GameEngine<S>) {
    for tier in DifficultyTier::ALL {
        println!("{tier:<9}{}", engine.high_score(tier));
    }
    println!("{:<9}{}", "last", engine.last_score());
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    logging::init_file_logging(&log_path)?;

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);

    let pools = config.symbol_pools()?;
    let db_path = cli.db_path.clone().unwrap_or_else(AppDirs::db_path);
    let store = SqliteStore::open(&db_path)?;
    let mut engine = GameEngine::new(store, pools, config.tier);
    info!(db = %db_path.display(), tier = %config.tier, "starting");

    if cli.reset_high_scores || cli.scores {
        if cli.reset_high_scores {
            engine.reset_high_scores();
            println!("high scores reset");
        }
        if cli.scores {
            print_scores(&engine);
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine);
    let result = start_tui(&mut terminal, &mut app, config.tick_rate_ms);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    config.tier = app.engine.tier();
    if let Err(err) = config_store.save(&config) {
        warn!(%err, "could not save config");
    }

    result
}

fn start_tui<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    tick_rate_ms: u64,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(tick_rate_ms.max(1))),
    );

    loop {
        terminal.draw(|f| ui(app, f))?;

        let event = runner.step_engine(&mut app.engine);
        if app.on_event(event) == ExitType::Quit {
            break;
        }
    }

    Ok(())
}

fn ui<S: KeyValueStore>(app: &App<S>, f: &mut Frame) {
    f.render_widget(&app.engine, f.area());
}
