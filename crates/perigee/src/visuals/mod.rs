//! Visualizations driven by OSC play events.
//!
//! A [`VisualRegistry`] owns every renderer by name and forwards events
//! and ticks to the selected one only.

pub mod pulses;
pub mod ticker;

use std::collections::BTreeMap;
use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::warn;

use crate::osc::OscEvent;

pub use pulses::Pulses;
pub use ticker::Ticker;

pub trait Visual {
    fn name(&self) -> &str;
    fn set_size(&mut self, width: u16, height: u16);
    fn size(&self) -> (u16, u16);
    fn set_active(&mut self, active: bool);
    fn active(&self) -> bool;
    /// Drop all animation state.
    fn reset(&mut self);
    fn update(&mut self, event: &OscEvent);
    fn tick(&mut self, now: Instant);
    fn render(&self, area: Rect, buf: &mut Buffer);
}

#[derive(Default)]
pub struct VisualRegistry {
    visuals: BTreeMap<String, Box<dyn Visual>>,
    selected: Option<String>,
}

impl VisualRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in renderers with `pulses` selected.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Pulses::new()));
        registry.register(Box::new(Ticker::new()));
        registry.select(pulses::NAME);
        registry
    }

    pub fn register(&mut self, visual: Box<dyn Visual>) {
        self.visuals.insert(visual.name().to_string(), visual);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.visuals.keys().map(String::as_str)
    }

    /// Make `name` the active renderer, resetting it.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.visuals.contains_key(name) {
            let available: Vec<&str> = self.names().collect();
            warn!(?available, "unknown visual {name}");
            return false;
        }
        if let Some(previous) = self.selected_mut() {
            previous.set_active(false);
        }
        self.selected = Some(name.to_string());
        if let Some(visual) = self.selected_mut() {
            visual.set_active(true);
            visual.reset();
        }
        true
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&dyn Visual> {
        let name = self.selected.as_ref()?;
        self.visuals.get(name).map(|visual| visual.as_ref())
    }

    fn selected_mut(&mut self) -> Option<&mut Box<dyn Visual>> {
        let name = self.selected.as_ref()?;
        self.visuals.get_mut(name)
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        for visual in self.visuals.values_mut() {
            visual.set_size(width, height);
        }
    }

    pub fn reset(&mut self) {
        if let Some(visual) = self.selected_mut() {
            visual.reset();
        }
    }

    pub fn update(&mut self, event: &OscEvent) {
        if let Some(visual) = self.selected_mut() {
            visual.update(event);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(visual) = self.selected_mut() {
            visual.tick(now);
        }
    }
}
