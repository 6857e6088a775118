mod ui;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use typebar::{
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{HousingColor, InkDensity, PaperType, SettingsPatch},
    input::{self, Command, Feedback},
    persistence,
    runtime::{AutoSave, CrosstermEventSource, DeskEvent, FixedTicker, Runner, AUTOSAVE_INTERVAL_MS},
    store::{BlobStore, MemoryStore, SqliteStore},
    typewriter::Typewriter,
};

const TICK_RATE_MS: u64 = 100;
/// how many ticks the margin bell flag stays lit
const BELL_TICKS: u8 = 3;

/// a mechanical typewriter in your terminal: typebars jam, ribbons run dry, nothing erases
///
/// Setting flags are remembered for later sessions; F2-F6 change them from inside.
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// path of the session database (default: ~/.local/state/typebar/typebar.db)
    #[clap(long)]
    db: Option<PathBuf>,

    /// keep nothing on disk
    #[clap(long, conflicts_with = "db")]
    memory: bool,

    /// seed for strike imperfections, for reproducible sheets
    #[clap(long)]
    seed: Option<u64>,

    #[clap(long, value_enum)]
    housing_color: Option<HousingColor>,

    #[clap(long, value_enum)]
    paper_type: Option<PaperType>,

    #[clap(long, value_enum)]
    ink_density: Option<InkDensity>,

    /// disable typebar jams
    #[clap(long)]
    no_jams: bool,

    /// disable the margin bell
    #[clap(long)]
    no_bell: bool,

    /// start with the red half of the ribbon
    #[clap(long)]
    red_ink: bool,
}

impl Cli {
    fn settings_patch(&self) -> SettingsPatch {
        SettingsPatch {
            housing_color: self.housing_color,
            paper_type: self.paper_type,
            ink_density: self.ink_density,
            jam_simulation_enabled: self.no_jams.then_some(false),
            margin_bell_enabled: self.no_bell.then_some(false),
            is_red_ink: self.red_ink.then_some(true),
            ..Default::default()
        }
    }

    fn open_store(&self) -> Box<dyn BlobStore> {
        if self.memory {
            return Box::new(MemoryStore::new());
        }
        let opened = match &self.db {
            Some(path) => SqliteStore::open(path),
            None => SqliteStore::open_default(),
        };
        match opened {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!(error = %e, "session database unavailable, nothing will be saved");
                Box::new(MemoryStore::new())
            }
        }
    }
}

pub struct App {
    pub typewriter: Typewriter,
    pub store: Box<dyn BlobStore>,
    pub autosave: AutoSave,
    pub show_stats: bool,
    pub bell_ticks: u8,
    pub notice: Option<String>,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let mut store = cli.open_store();
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock = SystemClock;
        let now = clock.now_ms();

        let settings = persistence::load_settings(&*store);
        let mut typewriter =
            Typewriter::new(Box::new(clock), Box::new(rng)).with_settings(settings);
        persistence::restore_work(&*store, &mut typewriter);

        let patch = cli.settings_patch();
        if !patch.is_empty() {
            typewriter.update_settings(&patch);
            persistence::save_settings(&mut *store, typewriter.settings());
        }

        Self {
            typewriter,
            store,
            autosave: AutoSave::new(AUTOSAVE_INTERVAL_MS, now),
            show_stats: false,
            bell_ticks: 0,
            notice: None,
        }
    }

    fn save(&mut self) -> bool {
        self.autosave.mark_saved(SystemClock.now_ms());
        persistence::save_settings(&mut *self.store, self.typewriter.settings());
        persistence::save_work(&mut *self.store, &self.typewriter)
    }

    fn on_tick(&mut self) {
        self.bell_ticks = self.bell_ticks.saturating_sub(1);
        // no key-up events without keyboard enhancement, so keys pop back on the next tick
        let pressed: Vec<char> = self.typewriter.state().pressed_keys.iter().copied().collect();
        for key in pressed {
            self.typewriter.release_key(key);
        }
        if self.autosave.poll(SystemClock.now_ms()) {
            persistence::save_work(&mut *self.store, &self.typewriter);
        }
    }

    /// Returns false when the app should exit.
    fn on_command(&mut self, command: Command) -> bool {
        if matches!(command, Command::Type(_)) {
            self.typewriter.dismiss_backspace_tooltip();
        }
        self.notice = None;

        match command {
            Command::Quit => return false,
            Command::ToggleStats => self.show_stats = !self.show_stats,
            Command::Save => {
                self.notice = Some(if self.save() {
                    "Saved.".to_string()
                } else {
                    "Could not save; will retry.".to_string()
                });
            }
            _ => match input::apply(&mut self.typewriter, command) {
                Some(Feedback::Struck(k)) if k.is_margin_bell => self.bell_ticks = BELL_TICKS,
                Some(Feedback::PageFull) => {
                    self.notice = Some("Page full. Ctrl+N loads a new sheet.".to_string())
                }
                Some(Feedback::InkToggled) => {
                    persistence::save_settings(&mut *self.store, self.typewriter.settings())
                }
                Some(Feedback::SettingsChanged) => {
                    let settings = self.typewriter.settings();
                    self.notice = Some(format!(
                        "{} housing, {} paper, {} ink, jams {}, bell {}",
                        settings.housing_color,
                        settings.paper_type,
                        settings.ink_density,
                        on_off(settings.jam_simulation_enabled),
                        on_off(settings.margin_bell_enabled),
                    ));
                    persistence::save_settings(&mut *self.store, self.typewriter.settings());
                }
                _ => {}
            },
        }
        true
    }
}

pub(crate) fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

fn init_tracing() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("TYPEBAR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        use clap::{error::ErrorKind, CommandFactory};
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing();
    let mut app = App::new(&cli);
    info!(
        pages = app.typewriter.state().pages.len(),
        "session started"
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.save();
    app.autosave.cancel();
    info!(
        characters = app.typewriter.state().stats.characters_typed,
        "session ended"
    );

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            DeskEvent::Tick => app.on_tick(),
            DeskEvent::Resize => {}
            DeskEvent::Key(key) => {
                let Some(command) = input::command_for(&key, app.typewriter.is_jammed()) else {
                    continue;
                };
                if !app.on_command(command) {
                    break;
                }
            }
        }
    }

    Ok(())
}
