//! Evaluable blocks: runs of non-blank lines around the cursor.

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Inclusive line range of the block containing `row`. `None` when the
/// buffer is empty, `row` is out of range, or the cursor sits on a blank
/// line (there is nothing to evaluate there).
pub fn block_range(lines: &[String], row: usize) -> Option<(usize, usize)> {
    let line = lines.get(row)?;
    if is_blank(line) {
        return None;
    }

    let begin = lines[..row]
        .iter()
        .rposition(|line| is_blank(line))
        .map_or(0, |blank| blank + 1);
    let end = lines[row + 1..]
        .iter()
        .position(|line| is_blank(line))
        .map_or(lines.len() - 1, |offset| row + offset);
    Some((begin, end))
}

/// The block's lines joined with `\n`, ready for the formatter.
pub fn block_text(lines: &[String], row: usize) -> Option<String> {
    let (begin, end) = block_range(lines, row)?;
    Some(lines[begin..=end].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::{block_range, block_text};

    fn buffer(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn cursor_inside_block_selects_exactly_that_block() {
        let lines = buffer("d1 $ s \"bd\"\n  # gain 1\n\nd2 $ s \"hh*4\"\n\n\nhush");
        assert_eq!(block_range(&lines, 0), Some((0, 1)));
        assert_eq!(block_range(&lines, 1), Some((0, 1)));
        assert_eq!(block_range(&lines, 3), Some((3, 3)));
        assert_eq!(block_range(&lines, 6), Some((6, 6)));
    }

    #[test]
    fn first_and_last_lines_yield_non_empty_ranges() {
        let lines = buffer("a\nb\nc");
        assert_eq!(block_range(&lines, 0), Some((0, 2)));
        assert_eq!(block_range(&lines, 2), Some((0, 2)));
    }

    #[test]
    fn whitespace_only_lines_separate_blocks() {
        let lines = buffer("a\n   \t\nb\nc\n ");
        assert_eq!(block_range(&lines, 2), Some((2, 3)));
        assert_eq!(block_range(&lines, 1), None);
        assert_eq!(block_text(&lines, 3).as_deref(), Some("b\nc"));
    }

    #[test]
    fn empty_buffer_and_out_of_range_rows_have_no_block() {
        assert_eq!(block_range(&[], 0), None);
        assert_eq!(block_range(&buffer("a"), 3), None);
    }
}
