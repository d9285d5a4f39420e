//! perigee: a terminal live-coding front-end for TidalCycles and
//! SuperCollider.
//!
//! The binary is a thin wrapper around [`app::run`]; everything else is
//! exposed so the pieces can be tested on their own.

pub mod app;
pub mod browser;
pub mod cli;
pub mod config;
pub mod console;
pub mod editor;
pub mod error;
pub mod events;
pub mod focus;
pub mod keymap;
pub mod logging;
pub mod osc;
pub mod queue;
pub mod router;
pub mod session;
pub mod ui;
pub mod visuals;

#[cfg(test)]
mod test_utils;
