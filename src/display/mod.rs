//! Animation display orchestration.
//!
//! [`DisplayOrchestrator`] is the stateful heart of the controller. It owns
//! the connection to the rendering worker, decides at start-up whether the
//! snowfall should run, keeps the persisted preference and the page controls
//! in sync, and forwards throttled viewport changes.
//!
//! ## Module Structure
//!
//! - [`protocol`]: the worker message types and the ports that carry them
//! - [`throttle`]: leading-edge throttle for resize notifications
//!
//! ## Start-up decision
//!
//! | winter | stored preference | result                                    |
//! |--------|-------------------|-------------------------------------------|
//! | yes    | present           | restore it (control + running state)      |
//! | yes    | absent            | default to snowfall, running              |
//! | no     | any               | stay stopped, control left untouched      |
//!
//! The toggle control is shown in winter and hidden otherwise, independent
//! of whether the animation is running.

pub mod protocol;
pub mod throttle;

#[cfg(any(test, feature = "testing-support"))]
pub mod testing;


pub use protocol::{
    ChannelWorker, ChildProcessWorker, JsonLinesWorker, LogWorker, RenderSurface, Viewport,
    WorkerMessage, WorkerPort,
};
pub use throttle::Throttle;

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{DEFAULT_STORAGE_KEY, DEFAULT_THROTTLE_WINDOW, DEFAULT_TITLE_PREFIX};
use crate::preference::{Preference, PreferenceStore, StorageChange, load_preference};
use crate::season::{self, SeasonOptions};
use crate::time_source::TimeSource;

/// Running state of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    #[default]
    Stopped,
    Running,
}

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The user picked a value on the toggle control.
    ToggleChanged(Preference),
    /// Another instance wrote to the preference store.
    StorageChanged(StorageChange),
    /// The viewport changed size.
    Resize(Viewport),
    /// The page is going away.
    Shutdown,
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    Shutdown,
}

/// The page the controller is embedded in.
///
/// The toggle control is a group of mutually exclusive options, one per
/// [`Preference`] value, inside a container that can be shown or hidden.
pub trait Page: Send {
    /// Hand out the rendering surface. Returns `None` once it has been taken.
    fn take_surface(&mut self) -> Option<RenderSurface>;

    fn viewport(&self) -> Viewport;

    /// Select the control option matching `preference`.
    fn set_control(&mut self, preference: Preference);

    fn set_toggle_visible(&mut self, visible: bool);

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);
}

/// Tunables for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// Inputs for the winter check.
    pub season_options: SeasonOptions,
    /// Key of the persisted preference.
    pub storage_key: String,
    /// Minimum spacing of forwarded resize messages.
    pub throttle_window: Duration,
    /// Prepended to the page title while running.
    pub title_prefix: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            season_options: SeasonOptions::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            throttle_window: DEFAULT_THROTTLE_WINDOW,
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
        }
    }
}

/// Everything [`DisplayOrchestrator::initialize`] needs.
pub struct OrchestratorParams {
    pub page: Box<dyn Page>,
    pub worker: Box<dyn WorkerPort>,
    pub store: Box<dyn PreferenceStore>,
    pub time_source: Arc<dyn TimeSource>,
    pub settings: DisplaySettings,
    pub debug_enabled: bool,
}

pub struct DisplayOrchestrator {
    page: Box<dyn Page>,
    worker: Box<dyn WorkerPort>,
    store: Box<dyn PreferenceStore>,
    throttle: Throttle,
    settings: DisplaySettings,
    base_title: String,
    state: AnimationState,
    is_winter: bool,
    debug_enabled: bool,
}

impl DisplayOrchestrator {
    /// Run the one-time page initialization.
    ///
    /// Transfers the rendering surface to the worker, sends the initial
    /// viewport, classifies today and applies the start-up decision.
    /// Fails only if the page has no surface left to hand over.
    pub fn initialize(params: OrchestratorParams) -> Result<Self> {
        let OrchestratorParams {
            mut page,
            worker,
            store,
            time_source,
            settings,
            debug_enabled,
        } = params;

        let Some(surface) = page.take_surface() else {
            anyhow::bail!("Rendering surface has already been transferred");
        };

        let base_title = page
            .title()
            .strip_prefix(settings.title_prefix.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| page.title());

        let today = time_source.now();
        let season = season::classify(&today, &settings.season_options);
        let is_winter = season.is_winter();

        let mut orchestrator = Self {
            page,
            worker,
            store,
            throttle: Throttle::new(settings.throttle_window, Arc::clone(&time_source)),
            settings,
            base_title,
            state: AnimationState::Stopped,
            is_winter,
            debug_enabled,
        };

        orchestrator.post(WorkerMessage::Canvas { canvas: surface });
        let viewport = orchestrator.page.viewport();
        orchestrator.post(WorkerMessage::resize(viewport));

        if debug_enabled {
            log_pipe!();
            log_debug!(
                "Season on {}: {} (winter: {})",
                today.format("%Y-%m-%d"),
                season,
                is_winter
            );
        }

        if is_winter {
            let preference = orchestrator
                .stored_preference()
                .unwrap_or(Preference::Snowfall);
            orchestrator.page.set_control(preference);
            orchestrator.apply(preference);
        }

        orchestrator.page.set_toggle_visible(is_winter);

        Ok(orchestrator)
    }

    /// Handle one page event.
    pub fn handle_event(&mut self, event: PageEvent) -> EventOutcome {
        match event {
            PageEvent::ToggleChanged(preference) => {
                if let Err(e) = self
                    .store
                    .set(&self.settings.storage_key, preference.as_str())
                {
                    log_pipe!();
                    log_warning!("Could not save preference: {}", e);
                }
                self.apply(preference);
            }
            PageEvent::StorageChanged(change) => {
                if change.key != self.settings.storage_key {
                    return EventOutcome::Continue;
                }
                // Read back through the store; other tabs never write here
                if let Some(preference) = self.stored_preference() {
                    self.page.set_control(preference);
                    self.apply(preference);
                }
            }
            PageEvent::Resize(viewport) => {
                if self.throttle.try_acquire() {
                    self.post(WorkerMessage::resize(viewport));
                }
            }
            PageEvent::Shutdown => return EventOutcome::Shutdown,
        }
        EventOutcome::Continue
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_winter(&self) -> bool {
        self.is_winter
    }

    /// Page title without the running indicator.
    pub fn base_title(&self) -> &str {
        &self.base_title
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Put the page title back as it was before the controller touched it.
    ///
    /// The worker is not told anything; it goes away with the page.
    pub fn restore_title(&mut self) {
        let base_title = self.base_title.clone();
        self.page.set_title(&base_title);
    }

    fn stored_preference(&self) -> Option<Preference> {
        load_preference(self.store.as_ref(), &self.settings.storage_key)
    }

    /// Bring state and title in line with `preference`.
    fn apply(&mut self, preference: Preference) {
        let target = match preference {
            Preference::Snowfall => AnimationState::Running,
            Preference::NoAnimation => AnimationState::Stopped,
        };
        self.transition(target);

        let title = match self.state {
            AnimationState::Running => format!("{}{}", self.settings.title_prefix, self.base_title),
            AnimationState::Stopped => self.base_title.clone(),
        };
        self.page.set_title(&title);
    }

    /// Move to `target`, telling the worker only on an actual change.
    fn transition(&mut self, target: AnimationState) {
        if self.state == target {
            return;
        }
        self.state = target;

        match target {
            AnimationState::Running => {
                self.post(WorkerMessage::Start);
                log_block_start!("Snowfall started");
            }
            AnimationState::Stopped => {
                self.post(WorkerMessage::Stop);
                log_block_start!("Snowfall stopped");
            }
        }
    }

    /// Fire and forget. Delivery failures are logged, never propagated.
    fn post(&mut self, message: WorkerMessage) {
        let kind = message.kind();
        if let Err(e) = self.worker.post(message) {
            log_pipe!();
            log_warning!("Failed to send '{}' to the worker: {}", kind, e);
        } else if self.debug_enabled {
            log_debug!("Sent '{}' to the worker", kind);
        }
    }
}
