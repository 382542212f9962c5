//! The annotation pass over every function of a database.

use super::processor::process_function;
use super::Limits;
use crate::database::ProgramDatabase;
use crate::models::RunSummary;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag, checked between functions.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation. The current function still completes.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Progress bar for the function loop, or a hidden one when `visible` is false.
pub fn progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} functions ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Process every function in database order.
///
/// Fails only if the database is not ready for annotation. Cancellation
/// stops the loop before the next function; comments already written stay.
pub fn run<D>(
    db: &mut D,
    limits: &Limits,
    cancel: &CancellationToken,
    progress: &ProgressBar,
) -> Result<RunSummary>
where
    D: ProgramDatabase + ?Sized,
{
    if !db.is_analysis_complete() {
        anyhow::bail!("Auto-analysis must finish before functions can be annotated");
    }

    let start_time = Instant::now();
    let total = db.function_count();
    let mut summary = RunSummary::new(total);

    info!("Processing {} functions", total);
    progress.set_length(total as u64);

    for index in 0..total {
        if cancel.is_cancelled() {
            warn!("Aborted after {} of {} functions", index, total);
            summary.cancelled = true;
            break;
        }

        let Some(function) = db.function(index) else {
            debug!("Function {} disappeared from the database", index);
            continue;
        };

        let outcome = process_function(db, &function, limits);
        debug!("{} @ {:#x}: {}", function.name, function.start, outcome);
        summary.record(&function, outcome);

        progress.inc(1);
    }

    if summary.cancelled {
        progress.abandon_with_message("Aborted");
    } else {
        progress.finish_with_message("Done");
    }

    summary.duration_seconds = start_time.elapsed().as_secs_f64();
    info!(
        "Generated {} string comments in {:.2}s",
        summary.committed, summary.duration_seconds
    );

    Ok(summary)
}
