//! HID Telemetry - keystroke analysis for USB watchdog debug streams
//!
//! Reads decoded firmware lines from a file or stdin, reports attack
//! signatures as they fire, and optionally exports a replay script and a
//! JSON session report when the stream ends or the user interrupts.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use hid_telemetry::{script, Config, Monitor};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "hid-telemetry")]
#[command(version)]
#[command(about = "Keystroke telemetry for USB watchdog debug streams", long_about = None)]
struct Cli {
    /// Decoded firmware log to read (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Configuration file (defaults to the platform config location)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Strip the spurious CTRL prefix some companion devices add to every key
    #[arg(long = "ctrl-fix")]
    ctrl_fix: bool,

    /// Write the captured keystrokes as a replay script (.txt)
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Write a JSON session report
    #[arg(short, long, value_name = "FILE")]
    report: Option<PathBuf>,
}

/// Message from the reader thread
enum Feed {
    Line(String),
    End,
}

fn spawn_reader(input: Option<PathBuf>, tx: mpsc::Sender<Feed>) -> Result<thread::JoinHandle<()>> {
    let reader: Box<dyn BufRead + Send> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(&path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    Ok(thread::spawn(move || {
        for line in reader.split(b'\n') {
            let Ok(bytes) = line else {
                break;
            };
            let text = String::from_utf8_lossy(&bytes);
            let text = text.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                continue;
            }
            if tx.send(Feed::Line(text.to_string())).is_err() {
                return;
            }
        }
        let _ = tx.send(Feed::End);
    }))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            log::warn!("using default configuration: {}", e);
            Config::default()
        }),
    };
    if cli.ctrl_fix {
        config.filter.ctrl_artifact_fix = true;
    }

    let mut monitor = Monitor::new(config);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("installing interrupt handler")?;
    }

    let (tx, rx) = mpsc::channel::<Feed>();
    let _reader = spawn_reader(cli.input.clone(), tx)?;

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Feed::Line(line)) => {
                for alert in monitor.process_line(&line) {
                    println!("{} [{}]", alert, alert.severity);
                }
            }
            Ok(Feed::End) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
    }

    let telemetry = monitor.telemetry();
    println!("\nHID telemetry session complete.");
    println!("Lines processed: {}", monitor.total_lines);
    println!("{}", telemetry.summary());

    if let Some(path) = &cli.script {
        script::write_script(path, &monitor.export_script())
            .with_context(|| format!("writing script {}", path.display()))?;
    }

    if let Some(path) = &cli.report {
        monitor
            .report()
            .export_json(path)
            .with_context(|| format!("writing report {}", path.display()))?;
    }

    Ok(())
}
