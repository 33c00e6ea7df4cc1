//! Logging setup for a run.
//!
//! Log lines go to stdout and are appended to the run's log file
//! (`elpais_scraper.log` by default). The subscriber is installed for the
//! current thread only and removed when the returned guard is dropped, so its
//! lifetime is the run's lifetime.

use crate::error::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install stdout + file logging. Level comes from `RUST_LOG`, default `info`.
pub fn init(log_file: &str) -> Result<DefaultGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(UtcTime::rfc_3339()),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(Mutex::new(file)),
        );

    Ok(tracing::subscriber::set_default(subscriber))
}
