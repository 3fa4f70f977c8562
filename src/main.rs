use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::KeyEventKind,
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
    fs::{self, File, OpenOptions},
    io::{self, stdin, Write},
    path::Path,
};

use shadowbox::{
    app::{App, Devices},
    app_dirs::AppDirs,
    combo::preview_combos,
    config::{
        ConfigStore, FileConfigStore, Intensity, Level, MovesIncluded, PunchVariety, Settings,
        TrainingMode, Voice,
    },
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner, TimerDriver},
    ui::screen::current_screen,
};

/// boxing round timer tui that calls out randomized punch combinations
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A boxing round timer that calls out randomized punch combinations during work rounds, with rest periods, countdown warnings and adjustable combo length, difficulty and intensity. Settings persist between runs; flags override them."
)]
pub struct Cli {
    /// number of rounds
    #[clap(short = 'r', long)]
    rounds: Option<u32>,

    /// length of each round in seconds
    #[clap(long)]
    round_secs: Option<u32>,

    /// rest between rounds in seconds (0 disables rest)
    #[clap(long)]
    rest_secs: Option<u32>,

    /// how many moves per combo
    #[clap(short = 'l', long, value_enum)]
    length: Option<Level>,

    /// how strictly combos alternate hands
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Level>,

    /// how many defensive and footwork moves get mixed in
    #[clap(short = 'c', long, value_enum)]
    complexity: Option<Level>,

    /// which punches can be called
    #[clap(long, value_enum)]
    variety: Option<PunchVariety>,

    /// which move groups can be called
    #[clap(long, value_enum)]
    moves: Option<MovesIncluded>,

    /// how often combos are called
    #[clap(short = 'i', long, value_enum)]
    intensity: Option<Intensity>,

    /// training mode shown in the header
    #[clap(long, value_enum)]
    mode: Option<TrainingMode>,

    /// voice handed to the speech command
    #[clap(long, value_enum)]
    voice: Option<Voice>,

    /// announcement volume, 0-100
    #[clap(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// silence speech and sounds
    #[clap(short = 'm', long)]
    mute: bool,

    /// text-to-speech command; {voice} and {volume} are substituted and the text is appended
    #[clap(long)]
    speech_command: Option<String>,

    /// keep the machine awake while a workout runs
    #[clap(long)]
    keep_awake: bool,

    /// print this many sample combos and exit
    #[clap(short = 'p', long, value_name = "N")]
    preview: Option<usize>,

    /// seed for reproducible combos
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Layer the flags that were given over stored settings
    fn apply(&self, settings: &mut Settings) {
        let workout = &mut settings.workout;
        if let Some(rounds) = self.rounds {
            workout.num_rounds = rounds;
        }
        if let Some(secs) = self.round_secs {
            workout.round_duration_secs = secs;
        }
        if let Some(secs) = self.rest_secs {
            workout.rest_duration_secs = secs;
        }
        if let Some(level) = self.length {
            workout.combo_length = level;
        }
        if let Some(level) = self.difficulty {
            workout.combo_difficulty = level;
        }
        if let Some(level) = self.complexity {
            workout.move_complexity = level;
        }
        if let Some(variety) = self.variety {
            workout.punch_variety = variety;
        }
        if let Some(moves) = self.moves {
            workout.moves_included = moves;
        }
        if let Some(intensity) = self.intensity {
            workout.combo_intensity = intensity;
        }
        if let Some(mode) = self.mode {
            workout.training_mode = mode;
        }
        if let Some(voice) = self.voice {
            workout.voice = voice;
        }
        if let Some(volume) = self.volume {
            settings.volume = volume;
        }
        if self.mute {
            settings.muted = true;
        }
        if let Some(cmd) = &self.speech_command {
            settings.speech_command = Some(cmd.clone());
        }
        if self.keep_awake {
            settings.keep_awake = true;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();

    if let Some(count) = cli.preview {
        init_logging(None);
        let mut settings = store.load();
        cli.apply(&mut settings);
        return print_preview(&settings, count, cli.seed);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(AppDirs::log_path().as_deref());

    let mut settings = store.load();
    cli.apply(&mut settings);
    let devices = Devices::from_settings(&settings);
    let mut app = App::new(settings, devices, cli.seed)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(e) = store.save(app.settings()) {
        log::warn!("could not save settings to {}: {}", store.path().display(), e);
    }

    result
}

/// Logs go to `log_file` when given (the TUI owns the terminal), otherwise stderr.
fn init_logging(log_file: Option<&Path>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // stderr would scribble over the UI
            Err(_) => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    builder.init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn print_preview(settings: &Settings, count: usize, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let combos = preview_combos(&settings.workout, count, &mut rng)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for combo in combos {
        writeln!(out, "{}", combo.display_text())?;
    }
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let tx = runner.sender();
    let mut timers = TimerDriver::new();

    loop {
        terminal.draw(|f| current_screen(&app.screen).render(app, f))?;

        match runner.step() {
            AppEvent::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
            AppEvent::Key(_) | AppEvent::Resize => {}
            AppEvent::Timer(kind, id) => app.on_timer(kind, id),
            AppEvent::Frame => app.on_frame(),
        }

        let size = terminal.size()?;
        app.drain_cues(size.width, size.height);
        timers.sync(app.engine().timers(), &tx);

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["shadowbox"]);

        assert_eq!(cli.rounds, None);
        assert_eq!(cli.round_secs, None);
        assert_eq!(cli.preview, None);
        assert!(!cli.mute);
        assert!(!cli.keep_awake);
    }

    #[test]
    fn test_cli_defaults_leave_settings_alone() {
        let cli = Cli::parse_from(["shadowbox"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_cli_overrides_workout_fields() {
        let cli = Cli::parse_from([
            "shadowbox",
            "-r",
            "3",
            "--round-secs",
            "120",
            "--rest-secs",
            "0",
            "--length",
            "high",
            "--difficulty",
            "low",
            "--variety",
            "include-body-and-rare",
            "--moves",
            "punches-only",
            "--intensity",
            "high",
            "--mode",
            "heavy-bag",
            "--voice",
            "charon",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);

        let w = &settings.workout;
        assert_eq!(w.num_rounds, 3);
        assert_eq!(w.round_duration_secs, 120);
        assert_eq!(w.rest_duration_secs, 0);
        assert_eq!(w.combo_length, Level::High);
        assert_eq!(w.combo_difficulty, Level::Low);
        assert_eq!(w.move_complexity, Level::Medium);
        assert_eq!(w.punch_variety, PunchVariety::IncludeBodyAndRare);
        assert_eq!(w.moves_included, MovesIncluded::PunchesOnly);
        assert_eq!(w.combo_intensity, Intensity::High);
        assert_eq!(w.training_mode, TrainingMode::HeavyBag);
        assert_eq!(w.voice, Voice::Charon);
    }

    #[test]
    fn test_cli_audio_flags() {
        let cli = Cli::parse_from([
            "shadowbox",
            "--volume",
            "40",
            "--mute",
            "--speech-command",
            "espeak -v {voice}",
            "--keep-awake",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.volume, 40);
        assert!(settings.muted);
        assert_eq!(settings.speech_command.as_deref(), Some("espeak -v {voice}"));
        assert!(settings.keep_awake);
    }

    #[test]
    fn test_cli_rejects_out_of_range_volume() {
        assert!(Cli::try_parse_from(["shadowbox", "--volume", "101"]).is_err());
    }

    #[test]
    fn test_cli_preview_and_seed() {
        let cli = Cli::parse_from(["shadowbox", "--preview", "5", "--seed", "42"]);
        assert_eq!(cli.preview, Some(5));
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_cli_command_is_consistent() {
        Cli::command().debug_assert();
    }
}
