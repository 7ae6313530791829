//! Signal handling for the running controller.
//!
//! A background thread turns process signals into [`PageEvent`]s on the
//! controller's event channel: termination signals become
//! [`PageEvent::Shutdown`] and terminal size changes become
//! [`PageEvent::Resize`].

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGWINCH},
    iterator::{Handle, Signals},
};
use std::sync::mpsc::Sender;
use std::thread;

use crate::display::{PageEvent, Viewport};
use crate::terminal::terminal_viewport;

/// Keeps the signal thread registered. Dropping it stops delivery.
pub struct SignalState {
    handle: Handle,
}

impl Drop for SignalState {
    fn drop(&mut self) {
        self.handle.close();
    }
}

/// Map a received signal to the event it produces.
pub fn event_for_signal(signal: i32, viewport: impl FnOnce() -> Viewport) -> Option<PageEvent> {
    match signal {
        SIGINT | SIGTERM | SIGHUP => Some(PageEvent::Shutdown),
        SIGWINCH => Some(PageEvent::Resize(viewport())),
        _ => None,
    }
}

/// Register the handlers and start forwarding signals to `events`.
pub fn setup_signal_handler(events: Sender<PageEvent>, debug_enabled: bool) -> Result<SignalState> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGWINCH])
        .context("failed to register signal handlers")?;
    let handle = signals.handle();

    thread::spawn(move || {
        for sig in signals.forever() {
            let Some(event) = event_for_signal(sig, terminal_viewport) else {
                continue;
            };

            if event == PageEvent::Shutdown {
                log_pipe!();
                log_info!("Received shutdown signal");
            } else if debug_enabled {
                log_debug!("Terminal resized");
            }

            if events.send(event).is_err() {
                // Event loop is gone
                break;
            }
        }
    });

    Ok(SignalState { handle })
}
