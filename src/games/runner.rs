//! Browser side of the mini-games: one canvas, input listeners and an
//! animation loop driving a [`CanvasGame`] at its own fixed tick rate.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

use super::{CanvasGame, GamePhase, Pointer};
use crate::dom::{self, AnimationLoop, EventListener};
use crate::error::Result;

/// Longest frame gap simulated in one go; anything longer (background tab,
/// debugger pause) is dropped.
pub const MAX_FRAME_GAP_MS: f64 = 250.0;

/// Fixed-step clock. Converts animation frame timestamps into whole game
/// ticks and reports the game-over transition exactly once.
#[derive(Clone, Debug, Default)]
pub struct Driver {
    last_ts: Option<f64>,
    acc_ms: f64,
    sim_ms: f64,
    reported_over: bool,
}

impl Driver {
    /// Simulated time; only advances while the game runs.
    pub fn sim_ms(&self) -> f64 {
        self.sim_ms
    }

    /// Run as many ticks as fit in the time since the previous frame.
    /// Returns how many ran.
    pub fn frame(&mut self, game: &mut dyn CanvasGame, ts: f64) -> u32 {
        let dt = self.last_ts.map_or(0.0, |last| (ts - last).clamp(0.0, MAX_FRAME_GAP_MS));
        self.last_ts = Some(ts);

        let mut ticks = 0;
        if game.phase() == GamePhase::Running {
            self.reported_over = false;
            let step = game.tick_ms();
            self.acc_ms += dt;
            while self.acc_ms >= step {
                self.acc_ms -= step;
                self.sim_ms += step;
                game.tick(self.sim_ms);
                ticks += 1;
                if game.phase() != GamePhase::Running {
                    self.acc_ms = 0.0;
                    break;
                }
            }
        } else {
            self.acc_ms = 0.0;
        }

        if game.phase() == GamePhase::GameOver && !self.reported_over {
            self.reported_over = true;
            game.finished();
        }
        ticks
    }
}

type SharedGame = Rc<RefCell<dyn CanvasGame>>;

/// A mounted game. Dropping it (or calling `destroy`) stops the loop and
/// detaches every listener.
#[wasm_bindgen]
pub struct GameHandle {
    game: SharedGame,
    frame: Option<AnimationLoop>,
    listeners: Vec<EventListener>,
}

/// Attach `game` to the canvas with id `canvas_id` (created when absent).
pub fn mount<G: CanvasGame + 'static>(canvas_id: &str, game: G) -> Result<GameHandle> {
    let doc = dom::document()?;
    let (w, h) = game.size();
    let name = game.name();
    let canvas = dom::canvas_by_id(&doc, canvas_id, w, h)?;
    let ctx = dom::context_2d(&canvas)?;
    let game: SharedGame = Rc::new(RefCell::new(game));

    let mut listeners = Vec::new();
    let win = dom::window()?;
    {
        let g = game.clone();
        listeners.push(EventListener::new(&win, "keydown", move |evt| {
            let Some(evt) = evt.dyn_ref::<KeyboardEvent>() else { return };
            let key = evt.key();
            let mut game = g.borrow_mut();
            let consumed = if key.eq_ignore_ascii_case("p") {
                let live = matches!(game.phase(), GamePhase::Running | GamePhase::Paused);
                game.toggle_pause();
                live
            } else {
                game.phase() == GamePhase::Running && game.key_down(&key)
            };
            if consumed {
                evt.prevent_default();
            }
        })?);
    }
    {
        let g = game.clone();
        listeners.push(EventListener::new(&win, "keyup", move |evt| {
            if let Some(evt) = evt.dyn_ref::<KeyboardEvent>() {
                g.borrow_mut().key_up(&evt.key());
            }
        })?);
    }

    {
        let (g, c) = (game.clone(), canvas.clone());
        listeners.push(EventListener::new(&canvas, "mousemove", move |evt| {
            let Some(evt) = evt.dyn_ref::<MouseEvent>() else { return };
            let (x, y) = mouse_position(&c, evt);
            deliver(&g, Pointer::Move(x, y));
        })?);
    }
    {
        let (g, c) = (game.clone(), canvas.clone());
        listeners.push(EventListener::new(&canvas, "mousedown", move |evt| {
            let Some(evt) = evt.dyn_ref::<MouseEvent>() else { return };
            let (x, y) = mouse_position(&c, evt);
            deliver(&g, Pointer::Down(x, y));
        })?);
    }
    // Releases are heard on the window so a press that leaves the canvas
    // still ends.
    {
        let (g, c) = (game.clone(), canvas.clone());
        listeners.push(EventListener::new(&win, "mouseup", move |evt| {
            let Some(evt) = evt.dyn_ref::<MouseEvent>() else { return };
            let (x, y) = client_position(&c, evt.client_x() as f64, evt.client_y() as f64);
            deliver(&g, Pointer::Up(x, y));
        })?);
    }

    let touch: [(&'static str, fn(f64, f64) -> Pointer); 2] =
        [("touchstart", Pointer::Down), ("touchmove", Pointer::Move)];
    for (kind, make) in touch {
        let (g, c) = (game.clone(), canvas.clone());
        listeners.push(EventListener::new(&canvas, kind, move |evt| {
            let Some(evt) = evt.dyn_ref::<TouchEvent>() else { return };
            let Some((x, y)) = touch_position(&c, evt) else { return };
            evt.prevent_default();
            deliver(&g, make(x, y));
        })?);
    }
    {
        let (g, c) = (game.clone(), canvas.clone());
        listeners.push(EventListener::new(&win, "touchend", move |evt| {
            let Some(evt) = evt.dyn_ref::<TouchEvent>() else { return };
            let Some((x, y)) = touch_position(&c, evt) else { return };
            deliver(&g, Pointer::Up(x, y));
        })?);
    }

    let frame = {
        let g = game.clone();
        let mut driver = Driver::default();
        AnimationLoop::start(move |ts| {
            let mut game = g.borrow_mut();
            driver.frame(&mut *game, ts);
            if let Err(err) = game.render(&ctx, driver.sim_ms()) {
                log::warn!("{}: render failed: {err}", game.name());
            }
        })?
    };

    log::info!("{name}: mounted on #{canvas_id} ({w}x{h})");
    Ok(GameHandle { game, frame: Some(frame), listeners })
}

/// Presses and moves only count while the game runs; releases always do,
/// so nothing stays held across a pause.
pub fn accepts_pointer(phase: GamePhase, event: Pointer) -> bool {
    phase == GamePhase::Running || matches!(event, Pointer::Up(..))
}

fn deliver(game: &SharedGame, event: Pointer) {
    let mut game = game.borrow_mut();
    if accepts_pointer(game.phase(), event) {
        game.pointer(event);
    }
}

/// Canvas-space coordinates of a mouse event over the canvas, undoing any CSS
/// scaling.
fn mouse_position(canvas: &HtmlCanvasElement, evt: &MouseEvent) -> (f64, f64) {
    let (sx, sy) = css_scale(canvas);
    (evt.offset_x() as f64 * sx, evt.offset_y() as f64 * sy)
}

fn touch_position(canvas: &HtmlCanvasElement, evt: &TouchEvent) -> Option<(f64, f64)> {
    let touch = evt.touches().get(0).or_else(|| evt.changed_touches().get(0))?;
    Some(client_position(canvas, touch.client_x() as f64, touch.client_y() as f64))
}

/// Viewport coordinates translated through the canvas' bounding rect.
fn client_position(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    let (sx, sy) = css_scale(canvas);
    to_canvas((rect.left(), rect.top()), (sx, sy), (client_x, client_y))
}

pub fn to_canvas(origin: (f64, f64), scale: (f64, f64), client: (f64, f64)) -> (f64, f64) {
    ((client.0 - origin.0) * scale.0, (client.1 - origin.1) * scale.1)
}

fn css_scale(canvas: &HtmlCanvasElement) -> (f64, f64) {
    let ratio = |pixels: u32, css: i32| if css > 0 { pixels as f64 / css as f64 } else { 1.0 };
    (ratio(canvas.width(), canvas.client_width()), ratio(canvas.height(), canvas.client_height()))
}

#[wasm_bindgen]
impl GameHandle {
    /// Start over from the opening state.
    pub fn start(&self) {
        let mut game = self.game.borrow_mut();
        game.start();
        log::info!("{}: started", game.name());
    }

    pub fn toggle_pause(&self) {
        self.game.borrow_mut().toggle_pause();
    }

    /// One of `idle`, `running`, `paused`, `game-over`.
    pub fn phase(&self) -> String {
        self.game.borrow().phase().as_str().to_string()
    }

    /// The player's points; player 1 for two-player Pong.
    pub fn score(&self) -> f64 {
        self.game.borrow().score() as f64
    }

    /// Touch stick offset from its centre in CSS pixels; (0, 0) releases.
    pub fn joystick(&self, dx: f64, dy: f64) {
        self.game.borrow_mut().joystick(dx, dy);
    }

    pub fn destroy(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.cancel();
        }
        self.listeners.clear();
        log::debug!("{}: destroyed", self.game.borrow().name());
    }
}
