use std::fs;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use super::{move_selection, ViewAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Directory listing: directories first, then files, case-insensitive,
/// dotfiles hidden. Unreadable directories list as empty.
pub fn list_directory(dir: &Path) -> Vec<FileEntry> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("failed to read directory {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut listed: Vec<FileEntry> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                return None;
            }
            let is_dir = entry.file_type().ok()?.is_dir();
            Some(FileEntry {
                name,
                path: entry.path(),
                is_dir,
            })
        })
        .collect();
    listed.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    listed
}

#[derive(Debug, Clone)]
pub struct FileBrowser {
    dir: PathBuf,
    entries: Vec<FileEntry>,
    selected: usize,
}

impl FileBrowser {
    pub fn new(dir: PathBuf) -> Self {
        let entries = list_directory(&dir);
        Self {
            dir,
            entries,
            selected: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn set_directory(&mut self, dir: PathBuf) {
        self.entries = list_directory(&dir);
        self.dir = dir;
        self.selected = 0;
    }

    pub fn refresh(&mut self) {
        self.entries = list_directory(&self.dir);
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => ViewAction::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = move_selection(self.selected, self.entries.len(), -1);
                ViewAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = move_selection(self.selected, self.entries.len(), 1);
                ViewAction::None
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                let Some(entry) = self.entries.get(self.selected).cloned() else {
                    return ViewAction::None;
                };
                if entry.is_dir {
                    self.set_directory(entry.path);
                    ViewAction::None
                } else {
                    ViewAction::OpenFile(entry.path)
                }
            }
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
                    self.set_directory(parent);
                }
                ViewAction::None
            }
            KeyCode::Char('g') => {
                self.set_directory(PathBuf::from("/"));
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }
}
