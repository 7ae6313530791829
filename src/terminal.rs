//! Terminal page.
//!
//! Presents the controller in a terminal: the window title carries the
//! running indicator, the terminal size is the viewport, and the toggle
//! control is driven by lines typed on stdin.
//!
//! | input              | effect                          |
//! |--------------------|---------------------------------|
//! | `snowfall`, `s`    | select snowfall                 |
//! | `none`, `n`        | select no animation             |
//! | `toggle`, `t`, blank | flip the current selection    |
//! | `quit`, `q`        | shut down                       |
//!
//! While the toggle is hidden (outside winter) selections are ignored, the
//! same way a hidden control cannot be clicked.

use crossterm::{ExecutableCommand, terminal};
use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use crate::display::{Page, PageEvent, RenderSurface, Viewport};
use crate::preference::Preference;

const FALLBACK_VIEWPORT: Viewport = Viewport::new(80, 24);

/// Current terminal size, or 80x24 when it cannot be determined.
pub fn terminal_viewport() -> Viewport {
    terminal::size()
        .map(|(cols, rows)| Viewport::new(u32::from(cols), u32::from(rows)))
        .unwrap_or(FALLBACK_VIEWPORT)
}

/// Toggle state shared with the input thread.
#[derive(Debug, Default)]
pub struct ControlState {
    pub selected: Option<Preference>,
    pub visible: bool,
}

type SharedControl = Arc<Mutex<ControlState>>;

fn lock(control: &SharedControl) -> MutexGuard<'_, ControlState> {
    match control.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct TerminalPage {
    surface: Option<RenderSurface>,
    title: String,
    control: SharedControl,
    debug_enabled: bool,
}

impl TerminalPage {
    pub fn new(title: &str, debug_enabled: bool) -> Self {
        let viewport = terminal_viewport();
        Self {
            surface: Some(RenderSurface {
                id: "tty".to_string(),
                width: viewport.inner_width,
                height: viewport.inner_height,
            }),
            title: title.to_string(),
            control: Arc::new(Mutex::new(ControlState::default())),
            debug_enabled,
        }
    }

    /// Start reading toggle input from stdin on a background thread.
    pub fn spawn_input_reader(&self, events: Sender<PageEvent>) {
        let control = Arc::clone(&self.control);
        let debug_enabled = self.debug_enabled;

        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };

                let event = {
                    let mut state = lock(&control);
                    let event = parse_input_line(&line, &state);
                    // The user's pick is the control's new selection
                    if let Ok(Some(PageEvent::ToggleChanged(preference))) = event {
                        state.selected = Some(preference);
                    }
                    event
                };

                match event {
                    Ok(Some(event)) => {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        if debug_enabled {
                            log_debug!("Toggle is hidden, ignoring '{}'", line.trim());
                        }
                    }
                    Err(unknown) => {
                        log_warning!(
                            "Unknown input '{}': type snowfall, none, toggle or quit",
                            unknown
                        );
                    }
                }
            }

            if debug_enabled {
                log_debug!("Input closed, toggle no longer available");
            }
        });
    }
}

/// Interpret one line of input.
///
/// Returns `Ok(None)` for selections while the toggle is hidden and `Err`
/// with the trimmed line when the input is not understood.
pub fn parse_input_line(line: &str, control: &ControlState) -> Result<Option<PageEvent>, String> {
    let input = line.trim().to_ascii_lowercase();

    let preference = match input.as_str() {
        "q" | "quit" | "exit" => return Ok(Some(PageEvent::Shutdown)),
        "s" | "snowfall" => Preference::Snowfall,
        "n" | "none" => Preference::NoAnimation,
        "" | "t" | "toggle" => control
            .selected
            .unwrap_or(Preference::NoAnimation)
            .toggled(),
        _ => return Err(line.trim().to_string()),
    };

    if !control.visible {
        return Ok(None);
    }
    Ok(Some(PageEvent::ToggleChanged(preference)))
}

impl Page for TerminalPage {
    fn take_surface(&mut self) -> Option<RenderSurface> {
        self.surface.take()
    }

    fn viewport(&self) -> Viewport {
        terminal_viewport()
    }

    fn set_control(&mut self, preference: Preference) {
        lock(&self.control).selected = Some(preference);
        let mark = |p: Preference| if p == preference { "(•)" } else { "( )" };
        log_decorated!(
            "Toggle: {} snowfall  {} none",
            mark(Preference::Snowfall),
            mark(Preference::NoAnimation)
        );
    }

    fn set_toggle_visible(&mut self, visible: bool) {
        lock(&self.control).visible = visible;
        if visible {
            log_indented!("Type 'toggle' (or snowfall/none) and Enter to change, 'quit' to exit");
        } else if self.debug_enabled {
            log_debug!("Toggle hidden outside winter");
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        if let Err(e) = io::stdout().execute(terminal::SetTitle(title))
            && self.debug_enabled
        {
            log_debug!("Could not set terminal title: {}", e);
        }
    }
}
