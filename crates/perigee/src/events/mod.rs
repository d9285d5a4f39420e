//! Application event types.
//!
//! Defines the event enum sent from the terminal input thread to the
//! main event loop. Interpreter and network output does not travel here:
//! it arrives through the output router's bounded queues, which the loop
//! polls on every wake.

use crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum AppEvent {
    Input(KeyEvent),
    /// New terminal size as (columns, rows).
    Resize(u16, u16),
}
