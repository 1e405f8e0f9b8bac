use std::{
    sync::{mpsc::Receiver, Arc, LazyLock},
    time::Duration,
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nu_ansi_term::Color::{Cyan, Green, Red};
use shelf_events::{EventSink, LogLevel, ShelfEvent};
use tracing::{debug, error, info, warn};

use crate::utils::{icon_or, Colored, Icons};

/// Shared MultiProgress instance for suspend/stop from other modules.
static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

/// Owns the background thread spawned by [`spawn_event_handler`].
///
/// Call [`finish`](ProgressGuard::finish) after dropping the `ShelfContext` holding the
/// channel sender, otherwise the thread keeps waiting for events.
pub struct ProgressGuard {
    handle: Option<std::thread::JoinHandle<()>>,
}

impl ProgressGuard {
    /// Wait for the event handler thread to drain remaining events.
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

fn log_message(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug!("{message}"),
        LogLevel::Info => info!("{message}"),
        LogLevel::Warning => warn!("{message}"),
        LogLevel::Error => error!("{message}"),
    }
}

/// Event sink used when progress output is off. Only `Log` events are
/// surfaced, through the logger.
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ShelfEvent) {
        if let ShelfEvent::Log { level, message } = event {
            log_message(level, &message);
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn batch_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn create_spinner(len: u64) -> ProgressBar {
    let pb = MULTI.add(ProgressBar::new(len));
    pb.set_style(batch_style());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spawn a background thread that renders [`ShelfEvent`]s as a sync spinner.
pub fn spawn_event_handler(receiver: Receiver<ShelfEvent>) -> ProgressGuard {
    let handle = std::thread::spawn(move || {
        let mut batch: Option<ProgressBar> = None;

        while let Ok(event) = receiver.recv() {
            match event {
                ShelfEvent::SyncStarted { total } => {
                    let pb = create_spinner(total as u64);
                    pb.set_message("Syncing metrics");
                    batch = Some(pb);
                }
                ShelfEvent::EntrySyncing { name, .. } => {
                    if let Some(ref pb) = batch {
                        pb.set_message(format!("Fetching {}", Colored(Cyan, &name)));
                    }
                }
                ShelfEvent::EntrySynced {
                    name,
                    popularity_score,
                    maintenance_score,
                    ..
                } => {
                    if let Some(ref pb) = batch {
                        pb.inc(1);
                        pb.println(format!(
                            "{} {} (popularity {}, maintenance {})",
                            Colored(Green, icon_or(Icons::CHECK, "+")),
                            name,
                            popularity_score,
                            maintenance_score
                        ));
                    }
                }
                ShelfEvent::EntrySyncFailed { name, error, .. } => {
                    if let Some(ref pb) = batch {
                        pb.inc(1);
                        pb.println(format!(
                            "{} {}: {}",
                            Colored(Red, icon_or(Icons::CROSS, "x")),
                            name,
                            error
                        ));
                    }
                }
                ShelfEvent::SyncComplete { .. } => {
                    if let Some(pb) = batch.take() {
                        pb.finish_and_clear();
                    }
                }
                ShelfEvent::Log { level, message } => log_message(level, &message),
            }
        }

        if let Some(pb) = batch.take() {
            pb.finish_and_clear();
        }
    });

    ProgressGuard {
        handle: Some(handle),
    }
}
