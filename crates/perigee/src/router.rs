//! Multiplexing of background output into the event loop.
//!
//! The router holds one [`Subscription`] per output source. Each source
//! has at most one outstanding wait: a poll takes the next line, hands it
//! to the caller, and re-arms the same source before moving on. Only the
//! event loop calls [`OutputRouter::poll`], so per-source order is the
//! order the producer enqueued, and no locking is needed beyond the
//! queues themselves.

use tracing::debug;

use crate::queue::Subscription;

/// Lines taken from one source per poll, so a chatty interpreter cannot
/// starve rendering.
pub const POLL_BUDGET: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Interpreter stdout/stderr plus send echoes.
    Session,
    /// OSC messages from the network listener.
    Network,
}

/// A line tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedLine {
    pub source: String,
    pub kind: SourceKind,
    pub line: String,
}

#[derive(Debug)]
struct Source {
    subscription: Subscription,
    kind: SourceKind,
    armed: bool,
}

#[derive(Debug, Default)]
pub struct OutputRouter {
    sources: Vec<Source>,
}

impl OutputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. Session sources start armed; network sources
    /// wait until something needs them.
    pub fn attach(&mut self, subscription: Subscription, kind: SourceKind) {
        let name = subscription.source().to_string();
        self.sources.retain(|source| source.subscription.source() != name);
        debug!(source = %name, ?kind, "router source attached");
        self.sources.push(Source {
            subscription,
            kind,
            armed: kind == SourceKind::Session,
        });
    }

    /// Start or stop draining a source. Undrained lines stay queued.
    pub fn set_armed(&mut self, name: &str, armed: bool) {
        if let Some(source) = self.source_mut(name) {
            if source.armed != armed {
                debug!(source = %name, armed, "router source toggled");
            }
            source.armed = armed;
        }
    }

    /// Lines dropped on overflow for a source (network sources only).
    pub fn dropped(&self, name: &str) -> usize {
        self.sources
            .iter()
            .find(|source| source.subscription.source() == name)
            .map_or(0, |source| source.subscription.dropped())
    }

    /// Deliver pending lines from every armed source, at most `budget`
    /// per source. Returns how many lines were delivered.
    pub fn poll(&mut self, budget: usize, mut deliver: impl FnMut(RoutedLine)) -> usize {
        let mut delivered = 0;
        for source in self.sources.iter().filter(|source| source.armed) {
            for _ in 0..budget {
                let Some(line) = source.subscription.next() else {
                    break;
                };
                deliver(RoutedLine {
                    source: source.subscription.source().to_string(),
                    kind: source.kind,
                    line,
                });
                delivered += 1;
            }
        }
        delivered
    }

    fn source_mut(&mut self, name: &str) -> Option<&mut Source> {
        self.sources
            .iter_mut()
            .find(|source| source.subscription.source() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputRouter, RoutedLine, SourceKind, POLL_BUDGET};
    use crate::console::Console;
    use crate::queue::{line_queue, QUEUE_CAPACITY};

    #[test]
    fn burst_lands_in_console_in_order() {
        let (tx, sub) = line_queue("tidal", QUEUE_CAPACITY);
        let mut router = OutputRouter::new();
        router.attach(sub, SourceKind::Session);
        let mut console = Console::new("tidal", "Tidal");

        for line in ["a", "b", "c"] {
            assert!(tx.push(line.to_string()));
        }
        router.poll(POLL_BUDGET, |routed| console.push(&routed.line));

        assert_eq!(console.lines(), ["a", "b", "c"]);
    }

    #[test]
    fn budget_limits_lines_per_poll_without_reordering() {
        let (tx, sub) = line_queue("sclang", QUEUE_CAPACITY);
        let mut router = OutputRouter::new();
        router.attach(sub, SourceKind::Session);
        for idx in 0..5 {
            tx.push(idx.to_string());
        }

        let mut seen = Vec::new();
        assert_eq!(router.poll(2, |routed| seen.push(routed.line)), 2);
        assert_eq!(router.poll(2, |routed| seen.push(routed.line)), 2);
        assert_eq!(router.poll(2, |routed| seen.push(routed.line)), 1);
        assert_eq!(seen, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn network_source_waits_until_armed() {
        let (tx, sub) = line_queue("osc", QUEUE_CAPACITY);
        let mut router = OutputRouter::new();
        router.attach(sub, SourceKind::Network);
        tx.offer("/play ,s bd".to_string());

        assert_eq!(router.poll(POLL_BUDGET, |_| {}), 0);

        router.set_armed("osc", true);
        let mut seen = Vec::new();
        router.poll(POLL_BUDGET, |routed| seen.push(routed));
        assert_eq!(
            seen,
            vec![RoutedLine {
                source: "osc".to_string(),
                kind: SourceKind::Network,
                line: "/play ,s bd".to_string(),
            }]
        );
    }

    #[test]
    fn sources_are_tagged_independently() {
        let (tidal_tx, tidal) = line_queue("tidal", QUEUE_CAPACITY);
        let (sc_tx, sclang) = line_queue("sclang", QUEUE_CAPACITY);
        let mut router = OutputRouter::new();
        router.attach(tidal, SourceKind::Session);
        router.attach(sclang, SourceKind::Session);

        tidal_tx.push("t1".to_string());
        sc_tx.push("s1".to_string());
        tidal_tx.push("t2".to_string());

        let mut tidal_lines = Vec::new();
        let mut sc_lines = Vec::new();
        router.poll(POLL_BUDGET, |routed| match routed.source.as_str() {
            "tidal" => tidal_lines.push(routed.line),
            _ => sc_lines.push(routed.line),
        });
        assert_eq!(tidal_lines, vec!["t1", "t2"]);
        assert_eq!(sc_lines, vec!["s1"]);
    }
}
