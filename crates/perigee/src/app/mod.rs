//! Application orchestration and main event loop.
//!
//! This module owns the core application lifecycle:
//! - Initialization (terminal setup, interpreter and listener startup)
//! - Event loop (keys, resizes, routed output, animation ticks)
//! - Focus transitions and their side effects
//! - UI rendering delegation
//!
//! The app is structured around a single `App` struct that holds
//! all state. Events are processed sequentially in the main loop.
//!
//! Submodules:
//! - state: App struct and shared constants
//! - runner: main loop, terminal setup and construction
//! - input: keyboard handling and view actions
//! - output: draining interpreter and OSC output
//! - render: UI rendering methods

mod input;
mod output;
mod render;
mod runner;
mod state;

pub use runner::run;
pub use state::App;
