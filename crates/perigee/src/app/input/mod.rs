//! Input event handling.
//!
//! Keys go through the focus controller first; whatever it does not
//! consume is delivered to the focused view:
//! - editor.rs: editor commands (eval, hush, save, comment) and text input
//! - view.rs: consoles, quick select and the two browsers

mod editor;
mod event;
mod view;

pub use event::handle_event;
