//! Application coordinator that manages the lifecycle of a running controller.
//!
//! This module acquires the resources the controller needs and then drives
//! it from a single event channel:
//! - Configuration loading
//! - Preference store and its change watcher
//! - Worker process (or the log worker when none is configured)
//! - Signal handler and stdin toggle reader
//!
//! The `Snowfall` struct uses a builder pattern for the different ways the
//! controller is started:
//! - Normal startup: `Snowfall::new(debug_enabled).run()`
//! - Another day: `Snowfall::new(debug_enabled).with_date(Some(date)).run()`

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use crate::config::{self, get_custom_config_dir};
use crate::display::{
    ChildProcessWorker, DisplayOrchestrator, EventOutcome, LogWorker, OrchestratorParams,
    PageEvent, WorkerPort,
};
use crate::preference::{FileStore, PreferenceStore};
use crate::signals::setup_signal_handler;
use crate::terminal::TerminalPage;
use crate::time_source::{PinnedDateTimeSource, RealTimeSource, TimeSource};

/// Builder for configuring and running the controller.
///
/// ```no_run
/// use snowfall::Snowfall;
///
/// # fn main() -> anyhow::Result<()> {
/// Snowfall::new(false)
///     .with_worker_command(Some("snowfall-renderer".to_string()))
///     .run()?;
/// # Ok(())
/// # }
/// ```
pub struct Snowfall {
    debug_enabled: bool,
    date: Option<NaiveDate>,
    worker_command: Option<String>,
    show_headers: bool,
}

impl Snowfall {
    /// Create a new runner with defaults matching a normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            date: None,
            worker_command: None,
            show_headers: true,
        }
    }

    /// Pretend today is `date` (the time of day stays real)
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    /// Worker command overriding the configured one
    pub fn with_worker_command(mut self, command: Option<String>) -> Self {
        self.worker_command = command;
        self
    }

    /// Skip the version header
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Run until a shutdown signal or `quit` on stdin.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let config = config::load()?;
        if self.debug_enabled {
            config.log_config();
        }

        let time_source: Arc<dyn TimeSource> = match self.date {
            Some(date) => {
                log_block_start!("Using {} as today's date", date.format("%Y-%m-%d"));
                Arc::new(PinnedDateTimeSource::new(date))
            }
            None => Arc::new(RealTimeSource::new()),
        };

        let (event_tx, event_rx) = mpsc::channel::<PageEvent>();

        let _signal_state = setup_signal_handler(event_tx.clone(), self.debug_enabled)?;

        let mut store = FileStore::open_default(get_custom_config_dir().as_deref(), self.debug_enabled)
            .context("Failed to open preference store")?;
        let storage_tx = event_tx.clone();
        store.subscribe(Box::new(move |change| {
            let _ = storage_tx.send(PageEvent::StorageChanged(change));
        }))?;

        let worker: Box<dyn WorkerPort> =
            match self.worker_command.or_else(|| config.worker_command.clone()) {
                Some(command) => {
                    let worker = ChildProcessWorker::spawn(&command)?;
                    if self.debug_enabled {
                        log_pipe!();
                        log_debug!("Started worker '{}' (pid {})", command, worker.id());
                    }
                    Box::new(worker)
                }
                None => {
                    if self.debug_enabled {
                        log_pipe!();
                        log_debug!("No worker command configured, logging worker messages");
                    }
                    Box::new(LogWorker)
                }
            };

        let page = TerminalPage::new(config.title(), self.debug_enabled);
        page.spawn_input_reader(event_tx);

        let mut orchestrator = DisplayOrchestrator::initialize(OrchestratorParams {
            page: Box::new(page),
            worker,
            store: Box::new(store),
            time_source,
            settings: config.display_settings(),
            debug_enabled: self.debug_enabled,
        })?;

        if !orchestrator.is_winter() {
            log_block_start!("Not winter, snowfall stays off");
        }

        run_event_loop(&mut orchestrator, &event_rx);

        orchestrator.restore_title();
        log_block_start!("Shutting down");
        log_end!();

        Ok(())
    }
}

/// Feed events to the orchestrator until it asks to stop or every sender is gone.
pub fn run_event_loop(orchestrator: &mut DisplayOrchestrator, events: &Receiver<PageEvent>) {
    while let Ok(event) = events.recv() {
        if orchestrator.handle_event(event) == EventOutcome::Shutdown {
            break;
        }
    }
}
