//! The text-editing surface and a small modal line editor.
//!
//! Evaluation only needs [`TextSurface`]: the cursor, the lines, and
//! positional insert/delete. [`LineEditor`] is the implementation the app
//! ships with: vi-flavoured normal and insert modes over a `Vec<String>`.

pub mod block;
pub mod comment;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use block::{block_range, block_text};
pub use comment::toggle_comment;

/// Positions are `(row, column)` in characters.
pub trait TextSurface {
    fn cursor_position(&self) -> (usize, usize);
    fn lines(&self) -> &[String];
    fn insert_at(&mut self, row: usize, col: usize, text: &str);
    fn delete_at(&mut self, start_row: usize, start_col: usize, end_row: usize, end_col: usize);
    /// True while the surface is taking raw text input.
    fn is_editing(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Normal,
    Insert,
}

impl EditorMode {
    pub fn label(self) -> &'static str {
        match self {
            EditorMode::Normal => "NORMAL",
            EditorMode::Insert => "INSERT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineEditor {
    lines: Vec<String>,
    row: usize,
    col: usize,
    mode: EditorMode,
    path: Option<PathBuf>,
    scroll: usize,
    dirty: bool,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            mode: EditorMode::Normal,
            path: None,
            scroll: 0,
            dirty: false,
        }
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map_or(line.len(), |(idx, _)| idx)
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

fn split_text(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: split_text(text),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Replace the buffer with the contents of `path`.
    pub fn load(&mut self, path: &Path) -> io::Result<()> {
        let contents = fs::read_to_string(path)?;
        self.lines = split_text(&contents);
        self.path = Some(path.to_path_buf());
        self.row = 0;
        self.col = 0;
        self.scroll = 0;
        self.mode = EditorMode::Normal;
        self.dirty = false;
        Ok(())
    }

    /// Start a new buffer bound to `path` without reading it.
    pub fn set_path(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
    }

    /// Write the buffer to its path.
    pub fn save(&mut self) -> io::Result<PathBuf> {
        let path = self.path.clone().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "buffer has no file name")
        })?;
        fs::write(&path, self.text())?;
        self.dirty = false;
        Ok(path)
    }

    /// First visible row after keeping the cursor inside `height` rows.
    pub fn scroll_for(&mut self, height: usize) -> usize {
        let height = height.max(1);
        if self.row < self.scroll {
            self.scroll = self.row;
        } else if self.row >= self.scroll + height {
            self.scroll = self.row + 1 - height;
        }
        self.scroll
    }

    /// Apply a key. Returns false when the key means nothing here.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match self.mode {
            EditorMode::Normal => self.handle_normal(key.code),
            EditorMode::Insert => self.handle_insert(key.code),
        }
    }

    fn handle_normal(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('i') => self.mode = EditorMode::Insert,
            KeyCode::Char('a') => {
                self.mode = EditorMode::Insert;
                self.col = (self.col + 1).min(self.line_len());
            }
            KeyCode::Char('A') => {
                self.mode = EditorMode::Insert;
                self.col = self.line_len();
            }
            KeyCode::Char('I') => {
                self.mode = EditorMode::Insert;
                self.col = 0;
            }
            KeyCode::Char('o') => {
                self.lines.insert(self.row + 1, String::new());
                self.row += 1;
                self.col = 0;
                self.dirty = true;
                self.mode = EditorMode::Insert;
            }
            KeyCode::Char('O') => {
                self.lines.insert(self.row, String::new());
                self.col = 0;
                self.dirty = true;
                self.mode = EditorMode::Insert;
            }
            KeyCode::Char('h') | KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Char('l') | KeyCode::Right => self.col += 1,
            KeyCode::Char('j') | KeyCode::Down => self.row += 1,
            KeyCode::Char('k') | KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Char('0') | KeyCode::Home => self.col = 0,
            KeyCode::Char('$') | KeyCode::End => self.col = self.line_len(),
            KeyCode::Char('g') => self.row = 0,
            KeyCode::Char('G') => self.row = self.lines.len() - 1,
            KeyCode::Char('x') | KeyCode::Delete => {
                if self.col < self.line_len() {
                    let (row, col) = (self.row, self.col);
                    self.delete_at(row, col, row, col + 1);
                }
            }
            _ => return false,
        }
        self.clamp_cursor();
        true
    }

    fn handle_insert(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => {
                self.mode = EditorMode::Normal;
                self.col = self.col.saturating_sub(1);
            }
            KeyCode::Char(ch) => {
                let (row, col) = (self.row, self.col);
                self.insert_at(row, col, ch.encode_utf8(&mut [0; 4]));
                self.col += 1;
            }
            KeyCode::Tab => {
                let (row, col) = (self.row, self.col);
                self.insert_at(row, col, "\t");
                self.col += 1;
            }
            KeyCode::Enter => {
                let (row, col) = (self.row, self.col);
                self.insert_at(row, col, "\n");
                self.row += 1;
                self.col = 0;
            }
            KeyCode::Backspace => {
                // Move first: delete_at clamps the cursor to the new text.
                let (row, col) = (self.row, self.col);
                if col > 0 {
                    self.col -= 1;
                    self.delete_at(row, col - 1, row, col);
                } else if row > 0 {
                    let prev_len = char_len(&self.lines[row - 1]);
                    self.row -= 1;
                    self.col = prev_len;
                    self.delete_at(row - 1, prev_len, row, 0);
                }
            }
            KeyCode::Delete => {
                let (row, col) = (self.row, self.col);
                if col < self.line_len() {
                    self.delete_at(row, col, row, col + 1);
                } else if row + 1 < self.lines.len() {
                    self.delete_at(row, col, row + 1, 0);
                }
            }
            KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Right => self.col += 1,
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => self.row += 1,
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.line_len(),
            _ => return false,
        }
        self.clamp_cursor();
        true
    }

    fn line_len(&self) -> usize {
        self.lines.get(self.row).map_or(0, |line| char_len(line))
    }

    fn clamp_cursor(&mut self) {
        self.row = self.row.min(self.lines.len().saturating_sub(1));
        let len = self.line_len();
        let max_col = match self.mode {
            EditorMode::Insert => len,
            EditorMode::Normal => len.saturating_sub(1),
        };
        self.col = self.col.min(max_col);
    }
}

impl TextSurface for LineEditor {
    fn cursor_position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn lines(&self) -> &[String] {
        &self.lines
    }

    fn insert_at(&mut self, row: usize, col: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let row = row.min(self.lines.len() - 1);
        let line = &mut self.lines[row];
        let at = byte_index(line, col);
        let tail = line.split_off(at);

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            line.push_str(first);
        }
        let mut inserted: Vec<String> = pieces.map(str::to_string).collect();
        match inserted.last_mut() {
            Some(last) => last.push_str(&tail),
            None => line.push_str(&tail),
        }
        let count = inserted.len();
        self.lines.splice(row + 1..row + 1, inserted);
        if row < self.row || (row == self.row && count > 0 && col < self.col) {
            self.row += count;
        }
        self.dirty = true;
    }

    fn delete_at(&mut self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) {
        let last = self.lines.len() - 1;
        if start_row > last || (start_row, start_col) >= (end_row, end_col) {
            return;
        }
        // Past the last row means the end of the buffer.
        let (end_row, end_col) = if end_row > last {
            (last, char_len(&self.lines[last]))
        } else {
            (end_row, end_col)
        };
        let start = byte_index(&self.lines[start_row], start_col);
        let end = byte_index(&self.lines[end_row], end_col);
        if start_row == end_row && start >= end {
            return;
        }

        if start_row == end_row {
            self.lines[start_row].replace_range(start..end, "");
        } else {
            let tail = self.lines[end_row][end..].to_string();
            self.lines[start_row].truncate(start);
            self.lines[start_row].push_str(&tail);
            self.lines.drain(start_row + 1..=end_row);
        }
        self.dirty = true;
        self.clamp_cursor();
    }

    fn is_editing(&self) -> bool {
        self.mode == EditorMode::Insert
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorMode, LineEditor, TextSurface};
    use crate::test_utils::key;
    use crossterm::event::KeyCode;
    use std::fs;
    use tempfile::TempDir;

    fn type_keys(editor: &mut LineEditor, text: &str) {
        for ch in text.chars() {
            let code = match ch {
                '\n' => KeyCode::Enter,
                other => KeyCode::Char(other),
            };
            editor.handle_key(key(code));
        }
    }

    #[test]
    fn insert_mode_types_text_and_escape_returns_to_normal() {
        let mut editor = LineEditor::new();
        assert!(!editor.is_editing());
        type_keys(&mut editor, "id1 $ s \"bd\"\nhush");
        assert!(editor.is_editing());
        editor.handle_key(key(KeyCode::Esc));

        assert_eq!(editor.mode(), EditorMode::Normal);
        assert_eq!(editor.lines(), ["d1 $ s \"bd\"", "hush"]);
        assert_eq!(editor.cursor_position(), (1, 3));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut editor = LineEditor::from_text("ab\ncd");
        editor.handle_key(key(KeyCode::Char('j')));
        editor.handle_key(key(KeyCode::Char('i')));
        editor.handle_key(key(KeyCode::Backspace));
        assert_eq!(editor.lines(), ["abcd"]);
        assert_eq!(editor.cursor_position(), (0, 2));
    }

    #[test]
    fn open_line_below_enters_insert_mode() {
        let mut editor = LineEditor::from_text("d1 $ s \"bd\"");
        type_keys(&mut editor, "ohush");
        assert_eq!(editor.lines(), ["d1 $ s \"bd\"", "hush"]);
        assert!(editor.is_editing());
    }

    #[test]
    fn insert_and_delete_handle_multibyte_and_multiline_text() {
        let mut editor = LineEditor::from_text("héllo");
        editor.insert_at(0, 2, "XY\nZ");
        assert_eq!(editor.lines(), ["héXY", "Zllo"]);
        editor.delete_at(0, 2, 1, 1);
        assert_eq!(editor.lines(), ["héllo"]);
        editor.delete_at(0, 0, 0, 2);
        assert_eq!(editor.lines(), ["llo"]);
    }

    #[test]
    fn delete_past_last_row_stops_at_buffer_end() {
        let mut editor = LineEditor::from_text("abc\nhello");
        editor.delete_at(1, 5, 2, 0);
        assert_eq!(editor.lines(), ["abc", "hello"]);

        editor.delete_at(0, 1, 7, 3);
        assert_eq!(editor.lines(), ["a"]);
    }

    #[test]
    fn normal_mode_motion_stays_inside_buffer() {
        let mut editor = LineEditor::from_text("abc\nde");
        for code in [KeyCode::Char('$'), KeyCode::Char('j'), KeyCode::Char('j')] {
            editor.handle_key(key(code));
        }
        assert_eq!(editor.cursor_position(), (1, 1));
        editor.handle_key(key(KeyCode::Char('x')));
        assert_eq!(editor.lines(), ["abc", "d"]);
        assert_eq!(editor.cursor_position(), (1, 0));
    }

    #[test]
    fn load_and_save_round_trip_through_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("set.tidal");
        fs::write(&path, "d1 $ s \"bd\"\n\nhush\n").expect("write file");

        let mut editor = LineEditor::new();
        editor.load(&path).expect("load");
        assert_eq!(editor.lines(), ["d1 $ s \"bd\"", "", "hush"]);
        assert!(!editor.is_dirty());

        editor.insert_at(2, 0, "-- ");
        assert!(editor.is_dirty());
        assert_eq!(editor.save().expect("save"), path);
        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "d1 $ s \"bd\"\n\n-- hush\n"
        );
    }

    #[test]
    fn save_without_path_fails() {
        let mut editor = LineEditor::from_text("x");
        assert!(editor.save().is_err());
    }

    #[test]
    fn scroll_follows_cursor() {
        let text = (0..20).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let mut editor = LineEditor::from_text(&text);
        assert_eq!(editor.scroll_for(5), 0);
        for _ in 0..10 {
            editor.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(editor.scroll_for(5), 6);
        editor.handle_key(key(KeyCode::Char('g')));
        assert_eq!(editor.scroll_for(5), 0);
    }
}
