//! List views opened over or beside the editor.
//!
//! Views never reach back into the app. Each key handler returns a
//! [`ViewAction`] and the orchestrator applies it.

pub mod files;
pub mod player;
pub mod quick_select;
pub mod samples;

use std::path::PathBuf;

pub use files::FileBrowser;
pub use quick_select::QuickSelect;
pub use samples::SampleBrowser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    None,
    Close,
    SelectConsole(String),
    OpenFile(PathBuf),
    PlaySample(PathBuf),
}

/// Move a wrapping selection by `delta` over `len` items.
pub(crate) fn move_selection(selected: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    let mut next = selected as isize + delta;
    if next < 0 {
        next = len - 1;
    } else if next >= len {
        next = 0;
    }
    next as usize
}

#[cfg(test)]
mod tests {
    use super::move_selection;

    #[test]
    fn selection_wraps_both_ways() {
        assert_eq!(move_selection(0, 3, -1), 2);
        assert_eq!(move_selection(2, 3, 1), 0);
        assert_eq!(move_selection(1, 3, 1), 2);
        assert_eq!(move_selection(5, 0, 1), 0);
    }
}
