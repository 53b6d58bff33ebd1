//! lotscan - Industrial camera OCR inspection
//!
//! Continuously captures frames from a camera and runs on-demand OCR over
//! the most recent frame, persisting recognized text to SQLite. The
//! camera, the OCR engine, and the sink are all trait boundaries; this
//! binary wires in the synthetic demo adapters.

mod app;
mod capture;
mod config;
mod inspection;
mod session;
mod shared;
mod storage;
mod vision;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::app::InspectionApp;
use crate::capture::pattern::PatternSource;
use crate::config::AppConfig;
use crate::shared::StatusEvent;
use crate::storage::SqliteSink;
use crate::vision::EchoRecognizer;

/// lotscan - industrial camera OCR inspection
#[derive(Parser, Debug)]
#[command(name = "lotscan")]
#[command(about = "Continuous camera capture with on-demand OCR inspection")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the configuration)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Text the demo scene carries; the stub engine reports it verbatim
    #[arg(long, default_value = "LOT-0000")]
    demo_label: String,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("lotscan starting...");
    let config = load_or_create_config(args.config.as_deref());

    let db_path = match args
        .database
        .clone()
        .or_else(|| config.storage.database_path.clone())
    {
        Some(path) => path,
        None => storage::get_data_dir()?.join("inspections.db"),
    };
    let sink = Arc::new(SqliteSink::open(&db_path)?);
    info!("recording inspections to {:?}", db_path);
    let review_sink = sink.clone();

    // Demo wiring: a synthetic camera and a fixed-answer engine. A vendor
    // SDK adapter and a real OCR engine plug in through the same traits.
    let label = args.demo_label.clone();
    let source_factory: app::SourceFactory =
        Box::new(move || Box::new(PatternSource::new(640, 480, label.clone())));
    let recognizer = Arc::new(EchoRecognizer::new(args.demo_label, 0.97));

    let app = InspectionApp::new(config, source_factory, recognizer, sink);

    // Relay status transitions to the operator as they arrive.
    let events = app.events();
    std::thread::spawn(move || {
        for event in events {
            print_event(&event);
            if event == StatusEvent::ShutDown {
                break;
            }
        }
    });

    run_operator_loop(&app, &review_sink)?;
    app.shutdown();

    info!("lotscan shutdown complete");
    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_create_config(explicit_path: Option<&Path>) -> AppConfig {
    if let Some(path) = explicit_path {
        match config::load_config(path) {
            Ok(config) => {
                info!("loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => warn!("failed to load {:?}: {e}; using defaults", path),
        }
    } else if let Ok(config_dir) = storage::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("loaded configuration from {:?}", config_path);
                return config;
            }
        } else {
            let config = AppConfig::default();
            match config::save_config(&config, &config_path) {
                Ok(()) => info!("wrote default configuration to {:?}", config_path),
                Err(e) => warn!("failed to write default configuration: {e}"),
            }
            return config;
        }
    }
    info!("using default configuration");
    AppConfig::default()
}

/// Line-oriented Start/Inspect/Stop loop on stdin
fn run_operator_loop(app: &InspectionApp, sink: &SqliteSink) -> Result<()> {
    println!("commands: start | inspect | status | stop | quit");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "start" => report(app.start()),
            "inspect" => report(app.analyze()),
            "status" => print_status(app, sink),
            "stop" => report(app.stop()),
            "quit" | "exit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }
    Ok(())
}

fn print_status(app: &InspectionApp, sink: &SqliteSink) {
    println!("session: {:?}", app.state());
    match app.latest_frame() {
        Some(frame) => {
            let (width, height) = frame.dimensions();
            println!("latest frame: {width}x{height} at {}", frame.timestamp);
        }
        None => println!("latest frame: none"),
    }
    match sink.count() {
        Ok(count) => println!("stored inspections: {count}"),
        Err(e) => println!("stored inspections: unavailable ({e})"),
    }
    if let Ok(Some(record)) = sink.latest() {
        println!("last result: {}", record.full_text.replace('\n', " | "));
    }
}

fn report<E: std::fmt::Display>(result: Result<(), E>) {
    if let Err(e) = result {
        println!("error: {e}");
    }
}

fn print_event(event: &StatusEvent) {
    match event {
        StatusEvent::CaptureStarted => println!("status: camera started"),
        StatusEvent::CaptureStopped => println!("status: camera stopped"),
        StatusEvent::Analyzing => println!("status: running OCR..."),
        StatusEvent::AnalysisCompleted { text } => {
            println!("status: OCR completed and saved");
            println!("{text}");
        }
        StatusEvent::NoTextFound => println!("status: no text found"),
        StatusEvent::AnalysisFailed { message } => println!("status: OCR error: {message}"),
        StatusEvent::ShutDown => println!("status: session closed"),
    }
}
