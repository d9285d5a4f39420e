//! Formatting of code fragments for interpreter stdin.

/// Literal lines that open and close an interpreter's multi-statement mode
/// (GHCi uses `:{` and `:}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultilineMarkers {
    pub begin: &'static str,
    pub end: &'static str,
}

pub const GHCI_MARKERS: MultilineMarkers = MultilineMarkers {
    begin: ":{",
    end: ":}",
};

/// Interpreters reject literal tabs, so each one becomes two spaces.
pub const TAB_REPLACEMENT: &str = "  ";

/// Turn a raw fragment into the bytes written to the interpreter.
///
/// Fragments with more than one line are wrapped in `markers` when the
/// interpreter has them. The result always ends with a single newline.
pub fn format_command(text: &str, markers: Option<MultilineMarkers>) -> String {
    let normalized = text.replace('\t', TAB_REPLACEMENT);
    let lines: Vec<&str> = normalized.lines().collect();

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 2);
    match markers {
        Some(markers) if lines.len() > 1 => {
            out.push(markers.begin);
            out.extend(lines.iter().copied());
            out.push(markers.end);
        }
        _ => out.extend(lines.iter().copied()),
    }

    let mut payload = out.join("\n");
    payload.push('\n');
    payload
}
