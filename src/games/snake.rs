//! Snake on a 20×20 wrapping grid. Eating food grows the snake by one cell
//! and scores 10; running into its own body ends the game.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::SmallRng;
use web_sys::CanvasRenderingContext2d;

use super::{overlay, CanvasGame, GamePhase};
use crate::dom::{self, PreferenceStore};
use crate::error::Result;

pub const TILES: i32 = 20;
pub const CELL_PX: f64 = 20.0;
pub const FOOD_POINTS: u32 = 10;
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";

const START: Cell = Cell { x: 10, y: 10 };
const FIRST_FOOD: Cell = Cell { x: 15, y: 15 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "arrowup" | "w" => Some(Direction::Up),
            "arrowdown" | "s" => Some(Direction::Down),
            "arrowleft" | "a" => Some(Direction::Left),
            "arrowright" | "d" => Some(Direction::Right),
            _ => None,
        }
    }
}

pub struct Snake {
    phase: GamePhase,
    /// Tail at the front, head at the back.
    body: VecDeque<Cell>,
    food: Cell,
    dir: Direction,
    next_dir: Direction,
    score: u32,
    high_score: u32,
    new_record: bool,
    store: Box<dyn PreferenceStore>,
    rng: SmallRng,
}

impl Snake {
    /// Restores the best score from `store`.
    pub fn new(store: Box<dyn PreferenceStore>, rng: SmallRng) -> Self {
        let high_score = store
            .get(HIGH_SCORE_KEY)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        Self {
            phase: GamePhase::Idle,
            body: VecDeque::from([START]),
            food: FIRST_FOOD,
            dir: Direction::Right,
            next_dir: Direction::Right,
            score: 0,
            high_score,
            new_record: false,
            store,
            rng,
        }
    }

    pub fn head(&self) -> Cell {
        self.body.back().copied().unwrap_or(START)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Queue a turn; reversing or repeating the current axis is ignored.
    pub fn turn(&mut self, dir: Direction) -> bool {
        if dir.is_vertical() == self.dir.is_vertical() {
            return false;
        }
        self.next_dir = dir;
        true
    }

    fn occupied(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    fn spawn_food(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..TILES)
            .flat_map(|y| (0..TILES).map(move |x| Cell { x, y }))
            .filter(|c| !self.occupied(*c))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.gen_range(0..free.len())])
    }
}

impl CanvasGame for Snake {
    fn name(&self) -> &'static str {
        "snake"
    }

    fn size(&self) -> (u32, u32) {
        let px = (TILES as f64 * CELL_PX) as u32;
        (px, px)
    }

    fn tick_ms(&self) -> f64 {
        100.0
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    fn score(&self) -> i64 {
        self.score as i64
    }

    fn reset(&mut self) {
        self.body = VecDeque::from([START]);
        self.food = FIRST_FOOD;
        self.dir = Direction::Right;
        self.next_dir = Direction::Right;
        self.score = 0;
        self.new_record = false;
    }

    fn tick(&mut self, _now_ms: f64) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.dir = self.next_dir;
        let (dx, dy) = self.dir.delta();
        let head = self.head();
        let next = Cell {
            x: (head.x + dx).rem_euclid(TILES),
            y: (head.y + dy).rem_euclid(TILES),
        };

        if self.occupied(next) {
            self.phase = GamePhase::GameOver;
            return;
        }
        self.body.push_back(next);

        if next == self.food {
            self.score += FOOD_POINTS;
            match self.spawn_food() {
                Some(cell) => self.food = cell,
                // Board full.
                None => self.phase = GamePhase::GameOver,
            }
        } else {
            self.body.pop_front();
        }
    }

    fn finished(&mut self) {
        if self.score > self.high_score {
            self.high_score = self.score;
            self.new_record = true;
            self.store.set(HIGH_SCORE_KEY, &self.score.to_string());
            log::info!("snake: new high score {}", self.score);
        }
    }

    fn render(&self, ctx: &CanvasRenderingContext2d, _now_ms: f64) -> Result<()> {
        let side = TILES as f64 * CELL_PX;
        dom::fill_style(ctx, "#1a1a1a");
        ctx.fill_rect(0.0, 0.0, side, side);

        dom::stroke_style(ctx, "rgba(100, 100, 100, 0.2)");
        ctx.set_line_width(1.0);
        for i in 0..=TILES {
            let pos = i as f64 * CELL_PX;
            dom::line(ctx, pos, 0.0, pos, side);
            dom::line(ctx, 0.0, pos, side, pos);
        }

        let cell = |c: Cell| (c.x as f64 * CELL_PX + 1.0, c.y as f64 * CELL_PX + 1.0, CELL_PX - 2.0);
        let (fx, fy, s) = cell(self.food);
        dom::fill_style(ctx, "#ff6b6b");
        ctx.fill_rect(fx, fy, s, s);

        let last = self.body.len().saturating_sub(1);
        for (i, seg) in self.body.iter().enumerate() {
            dom::fill_style(ctx, if i == last { "#00ffcc" } else { "#00cc99" });
            let (x, y, s) = cell(*seg);
            ctx.fill_rect(x, y, s, s);
        }

        match self.phase {
            GamePhase::Idle => overlay(ctx, "Snake", "Arrows or WASD to steer")?,
            GamePhase::Paused => overlay(ctx, "Paused", "Press P to resume")?,
            GamePhase::GameOver => {
                let line = if self.new_record {
                    format!("New record: {}", self.score)
                } else {
                    format!("Score: {}  Best: {}", self.score, self.high_score)
                };
                overlay(ctx, "Game Over", &line)?
            }
            GamePhase::Running => {}
        }
        Ok(())
    }

    fn key_down(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(dir) => self.turn(dir),
            None => false,
        }
    }
}
