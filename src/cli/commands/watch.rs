//! Long-running connectivity watch.

use super::sync::summarize;
use crate::cli::args::OutputFormat;
use crate::config::SyncConfig;
use crate::error::ChoreSyncError;
use crate::features::sync::{format_sync_report, ConnectivityMonitor, SyncEngine, SyncReport};
use crate::output::to_json;

fn print_report(report: &SyncReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => match to_json(report) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize sync report"),
        },
        OutputFormat::Pretty => {
            if report.total() > 0 {
                println!("{}", format_sync_report(report));
            }
            println!("{}", summarize(report));
        },
    }
}

/// Poll connectivity and sync on reconnect and every interval.
///
/// Each finished pass is printed through a registered observer.
///
/// # Errors
///
/// Returns an error if the observer cannot be registered or local storage
/// fails.
pub fn watch(
    engine: &mut SyncEngine<'_>,
    settings: &SyncConfig,
    ticks: Option<u64>,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    let observer = engine.subscribe(move |report| print_report(report, format))?;

    let mut monitor = ConnectivityMonitor::new(settings.interval());
    let mut remaining = ticks;
    let result = engine.watch(&mut monitor, settings.poll_interval(), || match remaining.as_mut() {
        None => true,
        Some(0) => false,
        Some(n) => {
            *n -= 1;
            true
        },
    });

    engine.unsubscribe(observer);
    result?;

    Ok(String::new())
}
