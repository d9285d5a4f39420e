//! Instrument pulses: each play event drops a circle at a random spot
//! that springs open and fades after a second.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::Visual;
use crate::osc::OscEvent;

pub const NAME: &str = "pulses";

const LIFETIME: Duration = Duration::from_secs(1);
const FALLBACK_SIZE: (u16, u16) = (80, 24);
const RING_GLYPHS: [char; 5] = ['•', '○', '◎', '●', '⬤'];
const PALETTE: [Color; 12] = [
    Color::Rgb(0xff, 0x00, 0x00),
    Color::Rgb(0x00, 0xff, 0x00),
    Color::Rgb(0x00, 0x00, 0xff),
    Color::Rgb(0xff, 0xff, 0x00),
    Color::Rgb(0xff, 0x00, 0xff),
    Color::Rgb(0x00, 0xff, 0xff),
    Color::Rgb(0xff, 0xa5, 0x00),
    Color::Rgb(0x80, 0x00, 0x80),
    Color::Rgb(0x00, 0x80, 0x00),
    Color::Rgb(0x00, 0x00, 0x80),
    Color::Rgb(0x80, 0x00, 0x00),
    Color::Rgb(0xff, 0x69, 0xb4),
];

/// Under-damped harmonic spring stepped at a fixed rate.
#[derive(Debug, Clone, Copy)]
struct Spring {
    pos_pos: f64,
    pos_vel: f64,
    vel_pos: f64,
    vel_vel: f64,
}

impl Spring {
    /// `damping` must be in `(0, 1)`.
    fn new(delta: f64, angular_frequency: f64, damping: f64) -> Self {
        let omega_zeta = angular_frequency * damping;
        let alpha = angular_frequency * (1.0 - damping * damping).sqrt();
        let exp_term = (-omega_zeta * delta).exp();
        let cos_term = (alpha * delta).cos();
        let sin_term = (alpha * delta).sin();
        let exp_sin = exp_term * sin_term;
        let exp_cos = exp_term * cos_term;
        let exp_omega_zeta_sin_over_alpha = exp_term * omega_zeta * sin_term / alpha;

        Self {
            pos_pos: exp_cos + exp_omega_zeta_sin_over_alpha,
            pos_vel: exp_sin / alpha,
            vel_pos: -exp_sin * alpha - omega_zeta * exp_omega_zeta_sin_over_alpha,
            vel_vel: exp_cos - exp_omega_zeta_sin_over_alpha,
        }
    }

    fn step(&self, position: f64, velocity: f64, target: f64) -> (f64, f64) {
        let offset = position - target;
        (
            offset * self.pos_pos + velocity * self.pos_vel + target,
            offset * self.vel_pos + velocity * self.vel_vel,
        )
    }
}

#[derive(Debug, Clone)]
struct Pulse {
    x: u16,
    y: u16,
    size: u16,
    color: Color,
    created_at: Instant,
    position: f64,
    velocity: f64,
}

impl Pulse {
    fn radius(&self) -> i32 {
        ((f64::from(self.size) * self.position) as i32).max(1)
    }
}

#[derive(Debug)]
pub struct Pulses {
    width: u16,
    height: u16,
    active: bool,
    pulses: Vec<Pulse>,
    spring: Spring,
    rng: StdRng,
}

impl Pulses {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic placement, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            width: 0,
            height: 0,
            active: false,
            pulses: Vec::new(),
            spring: Spring::new(1.0 / 60.0, 5.0, 0.2),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    fn canvas(&self) -> (u16, u16) {
        if self.width == 0 || self.height == 0 {
            FALLBACK_SIZE
        } else {
            (self.width, self.height)
        }
    }

    fn spawn(&mut self, instrument: &str, now: Instant) {
        let (width, height) = self.canvas();
        let margin_x = width / 10;
        let margin_y = height / 10;
        let x = self
            .rng
            .random_range(margin_x..=width.saturating_sub(margin_x + 1).max(margin_x));
        let y = self
            .rng
            .random_range(margin_y..=height.saturating_sub(margin_y + 1).max(margin_y));
        let size = self.rng.random_range(2..=4);
        self.pulses.push(Pulse {
            x,
            y,
            size,
            color: instrument_color(instrument),
            created_at: now,
            position: 0.0,
            velocity: 2.0,
        });
    }
}

impl Default for Pulses {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable color per instrument, from its first two bytes.
fn instrument_color(instrument: &str) -> Color {
    let index: usize = instrument.bytes().take(2).map(usize::from).sum();
    PALETTE[index % PALETTE.len()]
}

impl Visual for Pulses {
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
        self.pulses.clear();
    }

    fn update(&mut self, event: &OscEvent) {
        if !self.active {
            return;
        }
        if let Some(instrument) = &event.instrument {
            self.spawn(instrument, Instant::now());
        }
    }

    fn tick(&mut self, now: Instant) {
        self.pulses
            .retain(|pulse| now.saturating_duration_since(pulse.created_at) <= LIFETIME);
        for pulse in &mut self.pulses {
            (pulse.position, pulse.velocity) =
                self.spring.step(pulse.position, pulse.velocity, 1.0);
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        for pulse in &self.pulses {
            let radius = pulse.radius();
            let edge = RING_GLYPHS[(radius as usize).min(RING_GLYPHS.len() - 1)];
            let style = Style::default().fg(pulse.color);
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let dist = dx * dx + dy * dy;
                    if dist > radius * radius {
                        continue;
                    }
                    let x = i32::from(pulse.x) + dx;
                    let y = i32::from(pulse.y) + dy;
                    if x < 0 || y < 0 || x >= i32::from(area.width) || y >= i32::from(area.height)
                    {
                        continue;
                    }
                    let glyph = if dx == 0 && dy == 0 {
                        '●'
                    } else if dist <= (radius - 1) * (radius - 1) {
                        '·'
                    } else {
                        edge
                    };
                    let cell = &mut buf[(area.x + x as u16, area.y + y as u16)];
                    cell.set_char(glyph).set_style(style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{instrument_color, Pulses, Spring};
    use crate::osc::OscEvent;
    use crate::visuals::Visual;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use std::time::{Duration, Instant};

    #[test]
    fn play_events_spawn_pulses_only_while_active() {
        let mut pulses = Pulses::with_seed(1);
        pulses.update(&OscEvent::parse("/play ,s bd"));
        assert!(pulses.is_empty());

        pulses.set_active(true);
        pulses.update(&OscEvent::parse("/play ,s bd"));
        pulses.update(&OscEvent::parse("/status ,s"));
        assert_eq!(pulses.len(), 1);
    }

    #[test]
    fn pulses_expire_after_a_second() {
        let mut pulses = Pulses::with_seed(2);
        pulses.set_active(true);
        pulses.update(&OscEvent::parse("/play ,s sn"));

        pulses.tick(Instant::now());
        assert_eq!(pulses.len(), 1);
        pulses.tick(Instant::now() + Duration::from_secs(2));
        assert!(pulses.is_empty());
    }

    #[test]
    fn spring_settles_on_target() {
        let spring = Spring::new(1.0 / 60.0, 5.0, 0.2);
        let (mut pos, mut vel) = (0.0, 2.0);
        for _ in 0..600 {
            (pos, vel) = spring.step(pos, vel, 1.0);
        }
        assert!((pos - 1.0_f64).abs() < 0.01);
    }

    #[test]
    fn render_stays_inside_small_areas() {
        let mut pulses = Pulses::with_seed(3);
        pulses.set_size(6, 3);
        pulses.set_active(true);
        for _ in 0..5 {
            pulses.update(&OscEvent::parse("/play ,s superpiano"));
        }
        pulses.tick(Instant::now());

        let area = Rect::new(2, 1, 6, 3);
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 5));
        pulses.render(area, &mut buf);
        let drawn = buf
            .content()
            .iter()
            .filter(|cell| cell.symbol() != " ")
            .count();
        assert!(drawn > 0);
    }

    #[test]
    fn instrument_color_is_stable() {
        assert_eq!(instrument_color("kalimba"), instrument_color("kalimba"));
    }
}
