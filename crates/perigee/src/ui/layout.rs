//! Layout utilities for rect manipulation.
//!
//! Pure functions for computing layout areas. No state mutation.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

const MIN_CONSOLE_HEIGHT: u16 = 10;
const MIN_VISUALS_WIDTH: u16 = 10;
const MIN_SAMPLES_WIDTH: u16 = 16;
const STATUS_HEIGHT: u16 = 1;

/// Which optional panels are on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelVisibility {
    pub console: bool,
    pub visuals: bool,
    pub samples: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub editor: Rect,
    pub visuals: Option<Rect>,
    pub samples: Option<Rect>,
    pub console: Option<Rect>,
    pub status: Rect,
}

/// Split `area` into panels. The console spans the bottom, a quarter of
/// the height but at least ten rows; visuals and the sample browser sit
/// right of the editor at a third of the width each (minimum ten and
/// sixteen columns); the editor takes what is left. The last row is the
/// status line.
pub fn compute_panels(area: Rect, visible: PanelVisibility) -> PanelLayout {
    let status_height = STATUS_HEIGHT.min(area.height);
    let body_height = area.height - status_height;
    let status = Rect {
        y: area.y + body_height,
        height: status_height,
        ..area
    };

    let console_height = if visible.console {
        (area.height / 4).max(MIN_CONSOLE_HEIGHT).min(body_height)
    } else {
        0
    };
    let top_height = body_height - console_height;
    let console = visible.console.then_some(Rect {
        y: area.y + top_height,
        height: console_height,
        ..area
    });

    let mut remaining = area.width;
    let mut take = |wanted: u16| {
        let width = wanted.min(remaining);
        remaining -= width;
        width
    };
    let visuals_width = if visible.visuals {
        take((area.width / 3).max(MIN_VISUALS_WIDTH))
    } else {
        0
    };
    let samples_width = if visible.samples {
        take((area.width / 3).max(MIN_SAMPLES_WIDTH))
    } else {
        0
    };
    let editor_width = remaining;

    let editor = Rect {
        x: area.x,
        y: area.y,
        width: editor_width,
        height: top_height,
    };
    let visuals = visible.visuals.then_some(Rect {
        x: area.x + editor_width,
        y: area.y,
        width: visuals_width,
        height: top_height,
    });
    let samples = visible.samples.then_some(Rect {
        x: area.x + editor_width + visuals_width,
        y: area.y,
        width: samples_width,
        height: top_height,
    });

    PanelLayout {
        editor,
        visuals,
        samples,
        console,
        status,
    }
}

/// Create a centered rect with given percentage of parent dimensions.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
