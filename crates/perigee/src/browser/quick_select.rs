use crossterm::event::{KeyCode, KeyEvent};

use super::{move_selection, ViewAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickItem {
    pub label: String,
    pub value: String,
}

/// Picks which console to show.
#[derive(Debug, Clone)]
pub struct QuickSelect {
    items: Vec<QuickItem>,
    selected: usize,
}

impl QuickSelect {
    pub fn new(items: Vec<QuickItem>) -> Self {
        Self { items, selected: 0 }
    }

    /// One entry per console, labelled with its title.
    pub fn for_consoles<'a>(consoles: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            consoles
                .into_iter()
                .map(|(name, title)| QuickItem {
                    label: title.to_string(),
                    value: name.to_string(),
                })
                .collect(),
        )
    }

    pub fn items(&self) -> &[QuickItem] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => ViewAction::Close,
            KeyCode::Enter => self
                .items
                .get(self.selected)
                .map_or(ViewAction::Close, |item| {
                    ViewAction::SelectConsole(item.value.clone())
                }),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = move_selection(self.selected, self.items.len(), -1);
                ViewAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = move_selection(self.selected, self.items.len(), 1);
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }
}
