pub mod config;
pub mod controller;
pub mod display;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::WrapErr, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::controller::device::JoystickDevice;
use crate::controller::event_collector::{Collecting, EventCollector};
use crate::controller::sixaxis::SixAxis;
use crate::display::cursor::{self, CursorMode};
use crate::display::event_log::{self, EventFilter, KindFilter};
use crate::display::screen::TerminalScreen;
use crate::display::{device_info, motion, poller, triggers};

// Sleep between empty non-blocking polls of the cursor visualizer
const IDLE_POLL: Duration = Duration::from_micros(100);

#[derive(Parser, Debug)]
#[command(version, about = "Decode and visualize joystick input")]
struct Cli {
    /// Config file (default: ~/.config/joyshim/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Joystick device node, overrides the config file
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every decoded event
    Log {
        /// Only print events of this kind
        #[arg(long, value_enum)]
        kind: Option<KindFilter>,
        /// Only print events for this axis or button number
        #[arg(long)]
        index: Option<u8>,
    },
    /// Draw the left thumbstick position in the terminal
    Cursor {
        #[arg(long, value_enum, default_value_t)]
        mode: CursorMode,
    },
    /// Print trigger positions as percentages
    Triggers,
    /// Periodically print the latest pressed button and left thumbstick
    Poll,
    /// Describe the joystick device
    Info,
    /// Print Sixaxis accelerometer readings from a hidraw node
    Motion {
        hidraw: PathBuf,
        /// Stop after this many readings
        #[arg(long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup(cli.verbose)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path).await?.with_device(cli.device);
    info!("Using joystick device {}", config.device.display());

    match cli.command {
        Command::Log { kind, index } => {
            let mut collector = open_collector(&config)?;
            let filter = EventFilter { kind, index };
            blocking(move || event_log::run(&mut collector, &mut io::stdout().lock(), filter))
                .await
        }
        Command::Cursor { mode } => run_cursor(&config, mode).await,
        Command::Triggers => {
            let mut collector = open_collector(&config)?;
            let exit_button = config.exit_button;
            blocking(move || triggers::run(&mut collector, &mut io::stdout().lock(), exit_button))
                .await
        }
        Command::Poll => {
            let mut collector = open_collector(&config)?;
            let exit_button = config.exit_button;
            let interval = config.poll_interval();
            blocking(move || {
                poller::run(&mut collector, &mut io::stdout().lock(), exit_button, interval)
            })
            .await
        }
        Command::Info => {
            let device = JoystickDevice::open(&config.device)?;
            device_info::write_info(device.path(), device.info(), &mut io::stdout().lock())
        }
        Command::Motion { hidraw, count } => {
            let mut sixaxis = SixAxis::open(&hidraw)?;
            blocking(move || motion::run(&mut sixaxis, &mut io::stdout().lock(), count)).await
        }
    }
}

async fn run_cursor(config: &Config, mode: CursorMode) -> Result<()> {
    let mut collector = open_collector(config)?;
    let exit_button = config.exit_button;

    match mode {
        CursorMode::Blocking => {
            blocking(move || {
                let mut screen = init_screen()?;
                cursor::run_blocking(&mut collector, &mut screen, exit_button)
            })
            .await
        }
        CursorMode::Nonblocking => {
            blocking(move || {
                let mut screen = init_screen()?;
                cursor::run_nonblocking(&mut collector, &mut screen, exit_button, IDLE_POLL)
            })
            .await
        }
        CursorMode::Threaded => {
            let mut screen = init_screen()?;
            cursor::run_threaded(
                collector,
                &mut screen,
                config.collector_settings(),
                config.render_interval(),
            )
            .await
        }
    }
}

fn open_collector(config: &Config) -> Result<EventCollector<Collecting>> {
    let device = JoystickDevice::open(&config.device)?;
    Ok(EventCollector::create(Box::new(device)).initialize())
}

fn init_screen() -> Result<TerminalScreen> {
    TerminalScreen::init().wrap_err("Failed to initialize terminal")
}

async fn blocking<F>(task: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .wrap_err("Display task panicked")?
}

fn setup(verbose: bool) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    setup_logging_env(if verbose { Level::DEBUG } else { Level::INFO });
    Ok(())
}

fn setup_logging_env(level: Level) {
    // stdout belongs to the display modes
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_log_filters_and_globals() {
        let cli = Cli::parse_from([
            "joyshim", "log", "--kind", "button", "--index", "7", "--device", "/dev/input/js1",
        ]);
        assert_eq!(cli.device, Some(PathBuf::from("/dev/input/js1")));
        match cli.command {
            Command::Log { kind, index } => {
                assert_eq!(kind, Some(KindFilter::Button));
                assert_eq!(index, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cursor_defaults_to_blocking() {
        let cli = Cli::parse_from(["joyshim", "cursor"]);
        assert!(matches!(
            cli.command,
            Command::Cursor {
                mode: CursorMode::Blocking
            }
        ));
        let cli = Cli::parse_from(["joyshim", "cursor", "--mode", "threaded"]);
        assert!(matches!(
            cli.command,
            Command::Cursor {
                mode: CursorMode::Threaded
            }
        ));
    }
}
