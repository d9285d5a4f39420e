use super::TextSurface;

/// Toggle `prefix` on `row`, just after the line's indentation. A line
/// already carrying the prefix loses it.
pub fn toggle_comment(surface: &mut impl TextSurface, row: usize, prefix: &str) {
    let Some(line) = surface.lines().get(row) else {
        return;
    };
    let indent = line
        .chars()
        .take_while(|ch| *ch == ' ' || *ch == '\t')
        .count();
    let rest: String = line.chars().skip(indent).collect();

    if rest.starts_with(prefix) {
        let len = prefix.chars().count();
        surface.delete_at(row, indent, row, indent + len);
        return;
    }
    // "--" with nothing after it still counts as commented.
    let bare = prefix.trim_end();
    if !bare.is_empty() && rest == bare {
        surface.delete_at(row, indent, row, indent + bare.chars().count());
        return;
    }
    surface.insert_at(row, indent, prefix);
}

#[cfg(test)]
mod tests {
    use super::toggle_comment;
    use crate::editor::{LineEditor, TextSurface};

    #[test]
    fn inserts_prefix_after_indentation() {
        let mut editor = LineEditor::from_text("  d1 $ s \"bd\"");
        toggle_comment(&mut editor, 0, "-- ");
        assert_eq!(editor.lines(), ["  -- d1 $ s \"bd\""]);
    }

    #[test]
    fn removes_existing_prefix() {
        let mut editor = LineEditor::from_text("\t-- d1 $ s \"bd\"");
        toggle_comment(&mut editor, 0, "-- ");
        assert_eq!(editor.lines(), ["\td1 $ s \"bd\""]);
    }

    #[test]
    fn toggling_twice_restores_the_line() {
        let original = "    x = 1";
        let mut editor = LineEditor::from_text(original);
        toggle_comment(&mut editor, 0, "// ");
        toggle_comment(&mut editor, 0, "// ");
        assert_eq!(editor.lines(), [original]);
    }

    #[test]
    fn bare_marker_line_is_uncommented() {
        let mut editor = LineEditor::from_text("--");
        toggle_comment(&mut editor, 0, "-- ");
        assert_eq!(editor.lines(), [""]);
    }
}
