use std::collections::VecDeque;
use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::Visual;
use crate::osc::OscEvent;

pub const NAME: &str = "ticker";
const HISTORY: usize = 10;

/// Scrolling list of the most recent play events.
#[derive(Debug, Default)]
pub struct Ticker {
    width: u16,
    height: u16,
    active: bool,
    messages: VecDeque<String>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }
}

impl Visual for Ticker {
    fn name(&self) -> &str {
        NAME
    }

    fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn active(&self) -> bool {
        self.active
    }

    fn reset(&mut self) {
        self.messages.clear();
    }

    fn update(&mut self, event: &OscEvent) {
        if !self.active {
            return;
        }
        let line = match &event.instrument {
            Some(instrument) => format!("{instrument:<12} {}", event.text),
            None => event.text.clone(),
        };
        self.messages.push_back(line);
        while self.messages.len() > HISTORY {
            self.messages.pop_front();
        }
    }

    fn tick(&mut self, _now: Instant) {}

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let rows = usize::from(area.height);
        let skip = self.messages.len().saturating_sub(rows);
        for (offset, message) in self.messages.iter().skip(skip).enumerate() {
            let y = area.y + offset as u16;
            let style = if offset + skip + 1 == self.messages.len() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            buf.set_stringn(area.x, y, message, usize::from(area.width), style);
        }
    }
}
