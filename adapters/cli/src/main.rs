#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Marble Lines in the terminal.

mod console;
mod session;
mod settings;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    session::Session,
    settings::{Args, Settings},
};

/// Entry point for the Marble Lines command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let settings = Settings::resolve(&args)?;
    info!(
        width = settings.board.width(),
        height = settings.board.height(),
        seed = settings.supply.rng_seed(),
        "resolved settings"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    console::write_legend(&mut out, settings.supply.rng_seed())?;

    let mut session = Session::new(settings.build_world());
    session.restart()?;
    console::run(&mut session, io::stdin().lock(), out)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
