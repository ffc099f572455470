//! quantum-os: the Quantum OS home screen in a terminal.
//!
//! Run: cargo run -p qos-terminal --bin quantum-os -- --profile mobile

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use crossterm::{cursor, execute, terminal};
use tracing::{error, info};

use qos_shell::{Activity, Profile, Shell, ShellConfig};
use qos_terminal::{init_tracing, render_once, ColorMode, TerminalApp, TuiError};

/// Quantum OS - a simulated operating-system shell
#[derive(Parser)]
#[command(name = "quantum-os", version, about, long_about = None)]
struct Cli {
    /// Layout and cadence preset
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// Path to a YAML config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fixed seed for telemetry and animation
    #[arg(long)]
    seed: Option<u64>,

    /// Render one frame to stdout as plain text and exit
    #[arg(long)]
    render_once: bool,

    /// Width for render-once mode
    #[arg(long, default_value = "120")]
    width: u16,

    /// Height for render-once mode
    #[arg(long, default_value = "40")]
    height: u16,

    /// Print the default configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Disable colours
    #[arg(long)]
    no_color: bool,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Desktop,
    Mobile,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Desktop => Self::Desktop,
            ProfileArg::Mobile => Self::Mobile,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "quantum-os failed");
            eprintln!("[quantum-os] {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), TuiError> {
    if cli.dump_config {
        print!("{}", ShellConfig::default_yaml()?);
        return Ok(());
    }

    init_tracing(cli.log_file.as_deref(), cli.render_once)?;

    let mut config = ShellConfig::load(cli.config.as_deref(), cli.profile.map(Profile::from))?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    info!(profile = ?config.profile, seed = ?config.seed, "starting");

    if cli.render_once {
        let mut shell = Shell::new(config)?;
        shell.refresh_widgets();
        let now = chrono::Local::now();
        for activity in [Activity::Clock, Activity::Animation] {
            // a failed tick is logged and the frame is still printed
            let _ = shell.run_activity(activity, now);
        }
        let mut stdout = io::stdout().lock();
        stdout.write_all(render_once(&shell, cli.width, cli.height).as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let color_mode = if cli.no_color {
        ColorMode::Mono
    } else {
        ColorMode::detect()
    };
    // build before raw mode so startup errors print normally
    let mut app = TerminalApp::new(config, color_mode)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().map_err(|_| TuiError::TerminalNotAvailable)?;
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(terminal::ClearType::All)
    )?;

    let result = app.run(&mut stdout);

    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    info!("bye");
    result
}
