//! Entry point for the **poshud** daemon.
//!
//! Spawns all configured [`CommandSource`]s on background threads, starts
//! the target [`ProcessMonitor`], and processes commands and visibility
//! changes on the main thread.  Display events are rendered as text by a
//! presenter thread.
//!
//! # Flags
//!
//! | Flag              | Meaning                                             |
//! |-------------------|-----------------------------------------------------|
//! | `--config <path>` | Read this config file instead of the default one    |
//! | `--test-mode`     | Show the overlay even when the target is not running |
//! | `--socket <path>` | Command socket path (unix only)                     |
//! | `--no-stdin`      | Do not read commands from standard input            |

use log::{error, info, warn};
use poshud::command::Command;
use poshud::config::Config;
use poshud::display::PositionDisplay;
use poshud::ipc::stdin::LineReader;
use poshud::monitor::ProcessMonitor;
use poshud::render::render;
use poshud::traits::{CommandSource, DisplayEvent};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// How long the main loop waits for a command before looking at the
/// visibility channel again.
const LOOP_TICK: Duration = Duration::from_millis(50);

/// Parsed command-line flags.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    test_mode: bool,
    socket: Option<PathBuf>,
    no_stdin: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(path.into());
            }
            "--socket" => {
                let path = args.next().ok_or("--socket needs a path")?;
                parsed.socket = Some(path.into());
            }
            "--test-mode" => parsed.test_mode = true,
            "--no-stdin" => parsed.no_stdin = true,
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(parsed)
}

/// Default socket path for the command listener.
#[cfg(unix)]
fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("poshud.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/poshud`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("poshud")
}

/// Load the config named on the command line, or the default config file,
/// falling back to compiled-in defaults when the default file is absent.
fn load_config(explicit: Option<&PathBuf>) -> Result<Config, String> {
    let path = match explicit {
        Some(path) => path.clone(),
        None => {
            let path = config_dir().join("config.json");
            if !path.exists() {
                info!("no config file at {}, using defaults", path.display());
                let mut config = Config::default();
                config.prepare().map_err(|e| e.to_string())?;
                return Ok(config);
            }
            path
        }
    };
    let config = Config::load(&path).map_err(|e| e.to_string())?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

//  Main

fn main() {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut display = match PositionDisplay::new(config.settings.clone()) {
        Ok(display) => display,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let (display_tx, display_rx) = mpsc::channel::<DisplayEvent>();
    display.set_sink(display_tx);
    let presenter = spawn_presenter(display_rx);

    let (vis_tx, vis_rx) = mpsc::channel::<bool>();
    let monitor = Arc::new(ProcessMonitor::new(None, config.monitor.poll_interval()));
    monitor.subscribe(move |change| {
        let _ = vis_tx.send(change.visible);
    });
    display.attach_monitor(Arc::clone(&monitor));
    display.set_test_mode(args.test_mode);
    if let Err(e) = monitor.start() {
        error!("{}", e);
        std::process::exit(1);
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx, &args);

    info!("poshud running (profile {})", display.profile_id());
    run_event_loop(&mut display, &cmd_rx, &vis_rx);

    monitor.dispose();
    drop(display);
    let _ = presenter.join();
}

//  Event loop

fn run_event_loop(
    display: &mut PositionDisplay,
    cmd_rx: &mpsc::Receiver<Command>,
    vis_rx: &mpsc::Receiver<bool>,
) {
    loop {
        for visible in vis_rx.try_iter() {
            display.set_target_visible(visible);
        }
        match cmd_rx.recv_timeout(LOOP_TICK) {
            Ok(cmd) => {
                if let Err(e) = display.handle(cmd) {
                    warn!("command error: {}", e);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                info!("all command sources closed, exiting");
                return;
            }
        }
    }
}

//  Helpers

fn spawn_presenter(rx: mpsc::Receiver<DisplayEvent>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for event in rx {
            match event {
                DisplayEvent::Show(payload) => println!("{}\n", render(&payload)),
                DisplayEvent::Hide => info!("overlay hidden"),
            }
        }
    })
}

fn spawn_command_sources(tx: mpsc::Sender<Command>, args: &Args) {
    #[cfg(unix)]
    {
        use poshud::ipc::listener::UnixSocketListener;

        let tx = tx.clone();
        let path = args.socket.clone().unwrap_or_else(default_socket_path);
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }
    #[cfg(not(unix))]
    {
        if args.socket.is_some() {
            warn!("--socket is only supported on unix");
        }
    }

    if !args.no_stdin {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = LineReader::stdin();
            if let Err(e) = source.run(tx) {
                error!("stdin reader error: {}", e);
            }
        });
    }

    drop(tx);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<Args, String> {
        parse_args(raw.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_all_flags() {
        let a = args(&[
            "--config",
            "/tmp/c.json",
            "--test-mode",
            "--socket",
            "/tmp/s",
            "--no-stdin",
        ])
        .unwrap();
        assert_eq!(a.config, Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(a.socket, Some(PathBuf::from("/tmp/s")));
        assert!(a.test_mode);
        assert!(a.no_stdin);
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(args(&["--config"]).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(args(&["--frobnicate"]).is_err());
    }
}
