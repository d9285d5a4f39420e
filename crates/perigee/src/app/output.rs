//! Draining routed output into consoles and visuals.

use crate::focus::OSC_CONSOLE;
use crate::osc::OscEvent;
use crate::router::{RoutedLine, SourceKind, POLL_BUDGET};

use super::state::App;

/// Pull pending lines from every armed source. Returns how many were
/// delivered.
pub fn pump_output(app: &mut App) -> usize {
    let App {
        router,
        consoles,
        visuals,
        focus,
        ..
    } = app;
    let osc_visible = focus.active_console() == Some(OSC_CONSOLE);
    let overlay = focus.visuals_overlay();

    router.poll(POLL_BUDGET, |routed: RoutedLine| match routed.kind {
        SourceKind::Session => {
            if let Some(console) = consoles
                .iter_mut()
                .find(|console| console.name() == routed.source)
            {
                console.push(&routed.line);
            }
        }
        SourceKind::Network => {
            if osc_visible {
                if let Some(console) = consoles
                    .iter_mut()
                    .find(|console| console.name() == OSC_CONSOLE)
                {
                    console.push(&routed.line);
                }
            }
            if overlay {
                visuals.update(&OscEvent::parse(&routed.line));
            }
        }
    })
}
