//! Two-player Pong. Player 1 (left) uses the arrow keys, player 2 (right)
//! uses W/S. First to five points wins.

use web_sys::CanvasRenderingContext2d;

use super::{overlay, CanvasGame, GamePhase, KeySet};
use crate::dom;
use crate::error::Result;

pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 400.0;
const PADDLE_W: f64 = 10.0;
const PADDLE_H: f64 = 80.0;
const BALL_SIZE: f64 = 8.0;
const PADDLE_SPEED: f64 = 6.0;
const BALL_SPEED: f64 = 5.0;
const SPEEDUP: f64 = 1.05;
pub const WIN_SCORE: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paddle {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

pub struct Pong {
    phase: GamePhase,
    pub left: Paddle,
    pub right: Paddle,
    pub ball: Ball,
    pub scores: (u32, u32),
    pub winner: Option<Side>,
    keys: KeySet,
}

impl Default for Pong {
    fn default() -> Self {
        Self::new()
    }
}

impl Pong {
    pub fn new() -> Self {
        let paddle_y = HEIGHT / 2.0 - PADDLE_H / 2.0;
        Self {
            phase: GamePhase::Idle,
            left: Paddle { x: 20.0, y: paddle_y },
            right: Paddle { x: WIDTH - 30.0, y: paddle_y },
            ball: Ball { x: WIDTH / 2.0, y: HEIGHT / 2.0, dx: BALL_SPEED, dy: BALL_SPEED },
            scores: (0, 0),
            winner: None,
            keys: KeySet::default(),
        }
    }

    fn move_paddles(&mut self) {
        let max_y = HEIGHT - PADDLE_H;
        if self.keys.held("arrowup") && self.left.y > 0.0 {
            self.left.y -= PADDLE_SPEED;
        }
        if self.keys.held("arrowdown") && self.left.y < max_y {
            self.left.y += PADDLE_SPEED;
        }
        if self.keys.held("w") && self.right.y > 0.0 {
            self.right.y -= PADDLE_SPEED;
        }
        if self.keys.held("s") && self.right.y < max_y {
            self.right.y += PADDLE_SPEED;
        }
    }

    fn bounce_walls(&mut self) {
        let half = BALL_SIZE / 2.0;
        let ball = &mut self.ball;
        if ball.y - half <= 0.0 || ball.y + half >= HEIGHT {
            ball.dy = -ball.dy;
            ball.y = if ball.y - half <= 0.0 { half } else { HEIGHT - half };
        }
    }

    fn bounce_paddles(&mut self) {
        let half = BALL_SIZE / 2.0;
        let (l, r) = (self.left, self.right);
        let ball = &mut self.ball;

        let hits_left = ball.x - half <= l.x + PADDLE_W
            && ball.x - half >= l.x
            && ball.y >= l.y
            && ball.y <= l.y + PADDLE_H;
        if hits_left {
            deflect(ball, &l, 1.0);
            ball.x = l.x + PADDLE_W + half;
        }

        let hits_right = ball.x + half >= r.x
            && ball.x + half <= r.x + PADDLE_W
            && ball.y >= r.y
            && ball.y <= r.y + PADDLE_H;
        if hits_right {
            deflect(ball, &r, -1.0);
            ball.x = r.x - half;
        }
    }

    fn check_points(&mut self) {
        let half = BALL_SIZE / 2.0;
        if self.ball.x + half < 0.0 {
            self.point(Side::Right);
        } else if self.ball.x - half > WIDTH {
            self.point(Side::Left);
        }
    }

    fn point(&mut self, scorer: Side) {
        let score = match scorer {
            Side::Left => &mut self.scores.0,
            Side::Right => &mut self.scores.1,
        };
        *score += 1;
        if *score >= WIN_SCORE {
            self.winner = Some(scorer);
            self.phase = GamePhase::GameOver;
            return;
        }
        let dx = match scorer {
            Side::Left => -BALL_SPEED,
            Side::Right => BALL_SPEED,
        };
        self.ball = Ball { x: WIDTH / 2.0, y: HEIGHT / 2.0, dx, dy: BALL_SPEED };
    }
}

/// Speed up by 5%, send the ball away from the paddle and angle it by where it
/// struck relative to the paddle centre.
fn deflect(ball: &mut Ball, paddle: &Paddle, away: f64) {
    let speed = (ball.dx * ball.dx + ball.dy * ball.dy).sqrt();
    let new_speed = speed * SPEEDUP;
    ball.dx = away * (new_speed / speed) * ball.dx.abs();
    let offset = ball.y - (paddle.y + PADDLE_H / 2.0);
    ball.dy = offset / (PADDLE_H / 2.0) * new_speed;
}

impl CanvasGame for Pong {
    fn name(&self) -> &'static str {
        "pong"
    }

    fn size(&self) -> (u32, u32) {
        (WIDTH as u32, HEIGHT as u32)
    }

    fn tick_ms(&self) -> f64 {
        1000.0 / 60.0
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    /// Player 1 (left paddle) points.
    fn score(&self) -> i64 {
        self.scores.0 as i64
    }

    fn reset(&mut self) {
        let keys = std::mem::take(&mut self.keys);
        *self = Self { phase: self.phase, keys, ..Self::new() };
    }

    fn tick(&mut self, _now_ms: f64) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.move_paddles();
        self.ball.x += self.ball.dx;
        self.ball.y += self.ball.dy;
        self.bounce_walls();
        self.bounce_paddles();
        self.check_points();
    }

    fn render(&self, ctx: &CanvasRenderingContext2d, _now_ms: f64) -> Result<()> {
        dom::fill_style(ctx, "#1a1a1a");
        ctx.fill_rect(0.0, 0.0, WIDTH, HEIGHT);

        dom::stroke_style(ctx, "rgba(0, 255, 204, 0.3)");
        ctx.set_line_width(2.0);
        dom::dashed_line(ctx, WIDTH / 2.0, 0.0, WIDTH / 2.0, HEIGHT, 10.0);

        dom::fill_style(ctx, "#00ffcc");
        ctx.fill_rect(self.left.x, self.left.y, PADDLE_W, PADDLE_H);
        dom::fill_style(ctx, "#ff6b9d");
        ctx.fill_rect(self.right.x, self.right.y, PADDLE_W, PADDLE_H);

        dom::fill_style(ctx, "#ffd700");
        dom::circle(ctx, self.ball.x, self.ball.y, BALL_SIZE / 2.0)?;
        ctx.fill();

        ctx.set_font("bold 28px Arial");
        ctx.set_text_align("center");
        dom::fill_style(ctx, "#ffffff");
        ctx.fill_text(&self.scores.0.to_string(), WIDTH / 4.0, 40.0)?;
        ctx.fill_text(&self.scores.1.to_string(), WIDTH * 3.0 / 4.0, 40.0)?;

        match self.phase {
            GamePhase::Idle => overlay(ctx, "Pong", "First to 5 points wins")?,
            GamePhase::Paused => overlay(ctx, "Paused", "Press P to resume")?,
            GamePhase::GameOver => {
                let who = match self.winner {
                    Some(Side::Left) => "Player 1 wins!",
                    _ => "Player 2 wins!",
                };
                overlay(ctx, "Game Over", who)?
            }
            GamePhase::Running => {}
        }
        Ok(())
    }

    fn key_down(&mut self, key: &str) -> bool {
        let k = key.to_lowercase();
        if matches!(k.as_str(), "arrowup" | "arrowdown" | "w" | "s") {
            self.keys.press(&k);
            return true;
        }
        false
    }

    fn key_up(&mut self, key: &str) {
        self.keys.release(key);
    }
}
