//! Canvas mini-games. Each game is a plain state machine advanced by
//! fixed-length ticks; `runner` owns the browser side (canvas, input,
//! animation frame) and is shared by all of them.

use web_sys::CanvasRenderingContext2d;

use crate::dom;
use crate::error::Result;

pub mod penalty;
pub mod pong;
pub mod runner;
pub mod shooter;
pub mod snake;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GamePhase {
    #[default]
    Idle,
    Running,
    Paused,
    GameOver,
}

impl GamePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game-over",
        }
    }
}

/// Pointer input in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pointer {
    Move(f64, f64),
    Down(f64, f64),
    Up(f64, f64),
}

pub trait CanvasGame {
    fn name(&self) -> &'static str;
    fn size(&self) -> (u32, u32);
    /// Simulated milliseconds per tick.
    fn tick_ms(&self) -> f64;

    fn phase(&self) -> GamePhase;
    fn set_phase(&mut self, phase: GamePhase);
    fn score(&self) -> i64;

    /// Back to the initial board. Games with no end state may also drop back
    /// to `Idle`; `start` sets `Running` afterwards either way.
    fn reset(&mut self);
    /// One step of simulation at simulated time `now_ms`.
    fn tick(&mut self, now_ms: f64);
    fn render(&self, ctx: &CanvasRenderingContext2d, now_ms: f64) -> Result<()>;

    /// Returns true when the key was consumed (default action suppressed).
    fn key_down(&mut self, _key: &str) -> bool {
        false
    }
    fn key_up(&mut self, _key: &str) {}
    fn pointer(&mut self, _event: Pointer) {}
    /// Virtual stick offset from its centre; only games with touch steering
    /// care.
    fn joystick(&mut self, _dx: f64, _dy: f64) {}
    /// Called once when the game reaches `GameOver`.
    fn finished(&mut self) {}

    fn start(&mut self) {
        self.reset();
        self.set_phase(GamePhase::Running);
    }

    fn toggle_pause(&mut self) {
        match self.phase() {
            GamePhase::Running => self.set_phase(GamePhase::Paused),
            GamePhase::Paused => self.set_phase(GamePhase::Running),
            _ => {}
        }
    }
}

/// Dimmed full-canvas banner used for idle, paused and game-over screens.
pub(crate) fn overlay(ctx: &CanvasRenderingContext2d, title: &str, line: &str) -> Result<()> {
    let canvas_w = ctx.canvas().map(|c| c.width() as f64).unwrap_or(0.0);
    let canvas_h = ctx.canvas().map(|c| c.height() as f64).unwrap_or(0.0);
    dom::fill_style(ctx, "rgba(0, 0, 0, 0.7)");
    ctx.fill_rect(0.0, 0.0, canvas_w, canvas_h);
    ctx.set_text_align("center");
    dom::fill_style(ctx, "#ffffff");
    ctx.set_font("bold 48px Arial");
    ctx.fill_text(title, canvas_w / 2.0, canvas_h / 2.0 - 20.0)?;
    ctx.set_font("20px Arial");
    ctx.fill_text(line, canvas_w / 2.0, canvas_h / 2.0 + 24.0)?;
    ctx.set_text_align("left");
    Ok(())
}

/// Held-key flags keyed by lowercase key name.
#[derive(Clone, Debug, Default)]
pub struct KeySet(Vec<String>);

impl KeySet {
    pub fn press(&mut self, key: &str) {
        let key = key.to_lowercase();
        if !self.0.contains(&key) {
            self.0.push(key);
        }
    }

    pub fn release(&mut self, key: &str) {
        let key = key.to_lowercase();
        self.0.retain(|k| *k != key);
    }

    pub fn held(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.held(k))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
