//! # Snowfall Library
//!
//! Seasonal display controller: decides whether a decorative snowfall
//! animation should run, keeps the user's choice in sync across instances,
//! and drives an external rendering worker.
//!
//! ## Architecture
//!
//! - **Season**: `season` classifies a date into a season for a hemisphere,
//!   resolving the hemisphere from explicit input, coordinates or a country
//! - **Display**: `display` holds the `DisplayOrchestrator` state machine, the
//!   worker message protocol and the resize throttle
//! - **Preference**: `preference` persists the user's choice and reports
//!   changes made by other instances
//! - **Entry Point**: `Snowfall` wires configuration, terminal page, signals and
//!   the event loop together
//! - **Commands**: `commands` implements the one-shot CLI subcommands
//! - **Infrastructure**: configuration, logging, signal handling and time
//!   sources

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod display;
pub mod preference;
pub mod season;
pub mod signals;
pub mod terminal;
pub mod time_source;

// Internal modules
mod snowfall;

// Re-export for binary
pub use snowfall::{Snowfall, run_event_loop};
