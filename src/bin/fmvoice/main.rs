//! fmvoice - play the FM voice from the terminal
//!
//! Run with: cargo run --bin fmvoice
//! Set `FMVOICE_LOG=<path>` to write a debug log there.

mod app;
mod ui;

use std::fs::File;
use std::sync::Mutex;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use fm_voice::EngineConfig;

use app::FmVoiceApp;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    FmVoiceApp::new(EngineConfig::default()).run()
}

/// The terminal belongs to the UI, so logs only ever go to a file.
fn init_logging() -> EyreResult<()> {
    let Ok(path) = std::env::var("FMVOICE_LOG") else {
        return Ok(());
    };
    let file = File::create(&path).wrap_err_with(|| format!("failed to open log file {path}"))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    Ok(())
}
