//! UI rendering and layout utilities.
//!
//! This module contains pure rendering logic separated from state.
//! All functions here take data and produce ratatui widgets without
//! side effects.
//!
//! Submodules:
//! - layout: panel arithmetic and centering
//! - widgets: list overlays and windowing helpers

mod layout;
mod widgets;

pub use layout::{centered_rect, compute_panels, PanelLayout, PanelVisibility};
pub use widgets::{list_lines, render_list_overlay, scroll_offset};
