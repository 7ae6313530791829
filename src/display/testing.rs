//! Test doubles for the page and the worker.
//!
//! Both keep their state behind an `Arc<Mutex<_>>` so a test can hand the
//! double to the orchestrator and still inspect what happened to it.

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Page, RenderSurface, Viewport, WorkerMessage, WorkerPort};
use crate::preference::Preference;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Worker that records every message it is sent.
#[derive(Clone, Default)]
pub struct RecordingWorker {
    messages: Arc<Mutex<Vec<WorkerMessage>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `post` fail.
    pub fn fail_posts(&self, fail: bool) {
        *lock(&self.fail) = fail;
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<WorkerMessage> {
        std::mem::take(&mut *lock(&self.messages))
    }

    /// Kinds of the recorded messages, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        lock(&self.messages).iter().map(WorkerMessage::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        lock(&self.messages)
            .iter()
            .filter(|m| m.kind() == kind)
            .count()
    }
}

impl WorkerPort for RecordingWorker {
    fn post(&mut self, message: WorkerMessage) -> Result<()> {
        if *lock(&self.fail) {
            anyhow::bail!("worker unavailable");
        }
        lock(&self.messages).push(message);
        Ok(())
    }
}

/// Observable state of a [`FakePage`].
#[derive(Debug)]
pub struct FakePageState {
    pub surface: Option<RenderSurface>,
    pub viewport: Viewport,
    pub control: Option<Preference>,
    pub toggle_visible: Option<bool>,
    pub title: String,
    pub title_history: Vec<String>,
}

/// In-memory page.
#[derive(Clone)]
pub struct FakePage {
    state: Arc<Mutex<FakePageState>>,
}

impl FakePage {
    pub fn new(title: &str, viewport: Viewport) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePageState {
                surface: Some(RenderSurface {
                    id: "fake".to_string(),
                    width: viewport.inner_width,
                    height: viewport.inner_height,
                }),
                viewport,
                control: None,
                toggle_visible: None,
                title: title.to_string(),
                title_history: Vec::new(),
            })),
        }
    }

    /// A page whose surface has already been handed out.
    pub fn without_surface(title: &str, viewport: Viewport) -> Self {
        let page = Self::new(title, viewport);
        lock(&page.state).surface = None;
        page
    }

    pub fn state(&self) -> MutexGuard<'_, FakePageState> {
        lock(&self.state)
    }

    pub fn control(&self) -> Option<Preference> {
        self.state().control
    }

    pub fn toggle_visible(&self) -> Option<bool> {
        self.state().toggle_visible
    }

    pub fn current_title(&self) -> String {
        self.state().title.clone()
    }
}

impl Page for FakePage {
    fn take_surface(&mut self) -> Option<RenderSurface> {
        self.state().surface.take()
    }

    fn viewport(&self) -> Viewport {
        self.state().viewport
    }

    fn set_control(&mut self, preference: Preference) {
        self.state().control = Some(preference);
    }

    fn set_toggle_visible(&mut self, visible: bool) {
        self.state().toggle_visible = Some(visible);
    }

    fn title(&self) -> String {
        self.current_title()
    }

    fn set_title(&mut self, title: &str) {
        let mut state = self.state();
        state.title = title.to_string();
        state.title_history.push(title.to_string());
    }
}
