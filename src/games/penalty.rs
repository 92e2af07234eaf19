//! Penalty kicks against a patrolling keeper. Hold to charge power, release
//! to shoot; more power means a wider spread across the goal mouth. There is
//! no end state, only a running conversion rate.

use std::f64::consts::TAU;

use rand::Rng;
use rand::rngs::SmallRng;
use web_sys::CanvasRenderingContext2d;

use super::{overlay, CanvasGame, GamePhase, Pointer};
use crate::dom;
use crate::error::Result;
use crate::geom::Rect;

pub const WIDTH: f64 = 700.0;
pub const HEIGHT: f64 = 500.0;

pub const GOAL: Rect = Rect::new((WIDTH - 250.0) / 2.0, 40.0, 250.0, 120.0);
const KEEPER_W: f64 = 50.0;
const KEEPER_H: f64 = 80.0;
const KEEPER_Y: f64 = 120.0;
const KEEPER_START_X: f64 = 300.0;
const KEEPER_STEP: f64 = 3.0;
const KEEPER_MS: f64 = 50.0;

pub const SPOT: (f64, f64) = (350.0, 420.0);
const BALL_RADIUS: f64 = 15.0;
pub const MAX_POWER: u32 = 100;
const POWER_STEP: u32 = 3;
const CHARGE_MS: f64 = 30.0;
pub const FLIGHT_STEPS: u32 = 30;
const FLIGHT_MS: f64 = 30.0;
pub const RESULT_MS: f64 = 1500.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Goal,
    Saved,
    Miss,
}

impl Outcome {
    fn banner(self) -> &'static str {
        match self {
            Outcome::Goal => "GOAL!",
            Outcome::Saved => "Saved!",
            Outcome::Miss => "Wide!",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keeper {
    pub x: f64,
    pub dir: f64,
}

impl Keeper {
    fn new() -> Self {
        Self { x: KEEPER_START_X, dir: 1.0 }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, KEEPER_Y, KEEPER_W, KEEPER_H)
    }

    /// One patrol step, turning back just before either post.
    pub fn step(&mut self) {
        let next = self.x + self.dir * KEEPER_STEP;
        if next <= GOAL.x + 20.0 || next >= GOAL.x + GOAL.w - 70.0 {
            self.dir = -self.dir;
            self.x += self.dir * KEEPER_STEP;
        } else {
            self.x = next;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shot {
    Ready,
    Charging { since_ms: f64 },
    Flying { target: (f64, f64), kicked_ms: f64 },
    Showing { outcome: Outcome, until_ms: f64 },
}

/// Power after holding for `held_ms`.
pub fn charge(held_ms: f64) -> u32 {
    let steps = (held_ms.max(0.0) / CHARGE_MS).floor() as u32;
    steps.saturating_mul(POWER_STEP).min(MAX_POWER)
}

/// Where a kick lands for two uniform draws in [0, 1).
pub fn aim(power: u32, rx: f64, ry: f64) -> (f64, f64) {
    let (cx, cy) = GOAL.center();
    let spread = power.min(MAX_POWER) as f64 / MAX_POWER as f64;
    (cx + (rx - 0.5) * GOAL.w * spread, cy + (ry - 0.5) * GOAL.h)
}

/// The keeper gets priority over the goal mouth.
pub fn judge(ball: (f64, f64), keeper: &Keeper) -> Outcome {
    if keeper.rect().contains(ball.0, ball.1) {
        Outcome::Saved
    } else if GOAL.contains(ball.0, ball.1) {
        Outcome::Goal
    } else {
        Outcome::Miss
    }
}

pub struct Penalty {
    phase: GamePhase,
    pub keeper: Keeper,
    pub ball: (f64, f64),
    pub shot: Shot,
    pub goals: u32,
    pub attempts: u32,
    power: u32,
    clock_ms: f64,
    keeper_moved_ms: Option<f64>,
    rng: SmallRng,
}

impl Penalty {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            phase: GamePhase::Idle,
            keeper: Keeper::new(),
            ball: SPOT,
            shot: Shot::Ready,
            goals: 0,
            attempts: 0,
            power: 0,
            clock_ms: 0.0,
            keeper_moved_ms: None,
            rng,
        }
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    /// Goals per attempt as a rounded percentage.
    pub fn rate(&self) -> u32 {
        if self.attempts == 0 {
            0
        } else {
            (self.goals as f64 / self.attempts as f64 * 100.0).round() as u32
        }
    }

    pub fn press(&mut self) {
        if self.phase == GamePhase::Running && self.shot == Shot::Ready {
            self.power = 0;
            self.shot = Shot::Charging { since_ms: self.clock_ms };
        }
    }

    /// Kick with the charged power. A release while paused is ignored and the
    /// charge carries on after resuming.
    pub fn release(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }
        let Shot::Charging { since_ms } = self.shot else { return };
        self.power = charge(self.clock_ms - since_ms);
        self.attempts += 1;
        let (rx, ry) = (self.rng.gen_range(0.0..1.0), self.rng.gen_range(0.0..1.0));
        let target = aim(self.power, rx, ry);
        log::debug!("penalty: kick with power {} toward ({:.0}, {:.0})", self.power, target.0, target.1);
        self.shot = Shot::Flying { target, kicked_ms: self.clock_ms };
    }

    fn patrol(&mut self, now_ms: f64) {
        let mut last = *self.keeper_moved_ms.get_or_insert(now_ms);
        while now_ms - last >= KEEPER_MS {
            self.keeper.step();
            last += KEEPER_MS;
        }
        self.keeper_moved_ms = Some(last);
    }
}

impl CanvasGame for Penalty {
    fn name(&self) -> &'static str {
        "penalty"
    }

    fn size(&self) -> (u32, u32) {
        (WIDTH as u32, HEIGHT as u32)
    }

    fn tick_ms(&self) -> f64 {
        10.0
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    fn score(&self) -> i64 {
        self.goals as i64
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Self::new(rng);
    }

    fn tick(&mut self, now_ms: f64) {
        self.clock_ms = now_ms;
        if self.phase != GamePhase::Running {
            return;
        }
        match self.shot {
            Shot::Ready => self.patrol(now_ms),
            Shot::Charging { since_ms } => {
                self.power = charge(now_ms - since_ms);
                self.patrol(now_ms);
            }
            Shot::Flying { target, kicked_ms } => {
                self.keeper_moved_ms = None;
                let step = (((now_ms - kicked_ms) / FLIGHT_MS).floor() as u32).min(FLIGHT_STEPS);
                let t = step as f64 / FLIGHT_STEPS as f64;
                self.ball = (SPOT.0 + (target.0 - SPOT.0) * t, SPOT.1 + (target.1 - SPOT.1) * t);
                if step >= FLIGHT_STEPS {
                    let outcome = judge(self.ball, &self.keeper);
                    if outcome == Outcome::Goal {
                        self.goals += 1;
                    }
                    log::debug!("penalty: {outcome:?}, {}/{}", self.goals, self.attempts);
                    self.shot = Shot::Showing { outcome, until_ms: now_ms + RESULT_MS };
                }
            }
            Shot::Showing { until_ms, .. } => {
                if now_ms >= until_ms {
                    self.ball = SPOT;
                    self.power = 0;
                    self.shot = Shot::Ready;
                }
            }
        }
    }

    fn render(&self, ctx: &CanvasRenderingContext2d, _now_ms: f64) -> Result<()> {
        dom::fill_style(ctx, "#2ecc71");
        ctx.fill_rect(0.0, 0.0, WIDTH, HEIGHT);

        dom::stroke_style(ctx, "#ffffff");
        ctx.set_line_width(3.0);
        dom::dashed_line(ctx, 0.0, HEIGHT / 2.0, WIDTH, HEIGHT / 2.0, 10.0);
        dom::circle(ctx, WIDTH / 2.0, HEIGHT / 2.0, 50.0)?;
        ctx.stroke();

        dom::fill_style(ctx, "#34495e");
        ctx.fill_rect(GOAL.x, GOAL.y, GOAL.w, GOAL.h);
        ctx.set_line_width(5.0);
        ctx.stroke_rect(GOAL.x, GOAL.y, GOAL.w, GOAL.h);
        dom::stroke_style(ctx, "#95a5a6");
        ctx.set_line_width(1.0);
        for i in (0..GOAL.w as u32).step_by(20) {
            let x = GOAL.x + i as f64;
            dom::line(ctx, x, GOAL.y, x, GOAL.y + GOAL.h);
        }
        for i in (0..GOAL.h as u32).step_by(20) {
            let y = GOAL.y + i as f64;
            dom::line(ctx, GOAL.x, y, GOAL.x + GOAL.w, y);
        }

        let k = self.keeper.rect();
        dom::fill_style(ctx, "#e74c3c");
        ctx.fill_rect(k.x, k.y, k.w, k.h);
        dom::fill_style(ctx, "#c0392b");
        dom::circle(ctx, k.x + k.w / 2.0, k.y - 15.0, 20.0)?;
        ctx.fill();

        let kicking = matches!(self.shot, Shot::Flying { .. } | Shot::Showing { .. });
        if !kicking {
            dom::fill_style(ctx, "#3498db");
            ctx.fill_rect(320.0, 400.0, 60.0, 80.0);
            dom::fill_style(ctx, "#2980b9");
            dom::circle(ctx, 350.0, 385.0, 22.0)?;
            ctx.fill();
        }

        dom::fill_style(ctx, "#ffffff");
        dom::circle(ctx, self.ball.0, self.ball.1, BALL_RADIUS)?;
        ctx.fill();
        dom::stroke_style(ctx, "#000000");
        ctx.set_line_width(2.0);
        ctx.stroke();

        if self.phase == GamePhase::Running && !kicking {
            let charging = matches!(self.shot, Shot::Charging { .. });
            dom::stroke_style(ctx, if charging { "#f39c12" } else { "rgba(52, 152, 219, 0.5)" });
            ctx.set_line_width(3.0);
            ctx.begin_path();
            ctx.arc(self.ball.0, self.ball.1, 50.0, 0.0, TAU)?;
            ctx.stroke();
            ctx.set_text_align("center");
            ctx.set_font("bold 16px Arial");
            if charging {
                dom::fill_style(ctx, "rgba(0, 0, 0, 0.4)");
                ctx.fill_rect(20.0, HEIGHT - 40.0, 200.0, 16.0);
                dom::fill_style(ctx, "#f39c12");
                ctx.fill_rect(20.0, HEIGHT - 40.0, 2.0 * self.power as f64, 16.0);
            } else {
                dom::fill_style(ctx, "#2c3e50");
                ctx.fill_text("CLICK HERE", self.ball.0, self.ball.1 - 60.0)?;
            }
        }

        dom::fill_style(ctx, "#ffffff");
        ctx.set_font("bold 18px Arial");
        ctx.set_text_align("left");
        let stats = format!("Goals: {}  Attempts: {}  Rate: {}%", self.goals, self.attempts, self.rate());
        ctx.fill_text(&stats, 20.0, HEIGHT - 60.0)?;

        if let Shot::Showing { outcome, .. } = self.shot {
            ctx.set_text_align("center");
            ctx.set_font("bold 48px Arial");
            ctx.fill_text(outcome.banner(), WIDTH / 2.0, HEIGHT / 2.0)?;
            ctx.set_text_align("left");
        }

        match self.phase {
            GamePhase::Idle => overlay(ctx, "Penalty Kick", "Hold to charge, release to shoot")?,
            GamePhase::Paused => overlay(ctx, "Paused", "Press P to resume")?,
            _ => {}
        }
        Ok(())
    }

    fn key_down(&mut self, key: &str) -> bool {
        if key == " " {
            self.press();
            return true;
        }
        false
    }

    fn key_up(&mut self, key: &str) {
        if key == " " {
            self.release();
        }
    }

    fn pointer(&mut self, event: Pointer) {
        match event {
            Pointer::Down(..) => self.press(),
            Pointer::Up(..) => self.release(),
            Pointer::Move(..) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn running() -> Penalty {
        let mut p = Penalty::new(SmallRng::seed_from_u64(5));
        p.start();
        p
    }

    fn run(p: &mut Penalty, from: f64, to: f64) {
        let mut t = from;
        while t <= to {
            p.tick(t);
            t += 10.0;
        }
    }

    #[test]
    fn idle_keeper_stands_still_and_ignores_presses() {
        let mut p = Penalty::new(SmallRng::seed_from_u64(5));
        run(&mut p, 0.0, 500.0);
        assert_eq!(p.keeper.x, KEEPER_START_X);
        p.pointer(Pointer::Down(350.0, 420.0));
        assert_eq!(p.shot, Shot::Ready);
    }

    #[test]
    fn keeper_patrols_three_pixels_every_fifty_ms() {
        let mut p = running();
        run(&mut p, 1000.0, 1040.0);
        assert_eq!(p.keeper.x, 300.0);
        p.tick(1050.0);
        assert_eq!(p.keeper.x, 303.0);
        run(&mut p, 1060.0, 1190.0);
        assert_eq!(p.keeper.x, 309.0);
    }

    #[test]
    fn keeper_turns_before_the_posts() {
        let mut k = Keeper { x: 403.0, dir: 1.0 };
        k.step();
        assert_eq!((k.x, k.dir), (400.0, -1.0));
        let mut k = Keeper { x: 247.0, dir: -1.0 };
        k.step();
        assert_eq!((k.x, k.dir), (250.0, 1.0));
    }

    #[test]
    fn power_climbs_in_steps_and_caps() {
        assert_eq!(charge(0.0), 0);
        assert_eq!(charge(29.0), 0);
        assert_eq!(charge(90.0), 9);
        assert_eq!(charge(1020.0), 100);
        assert_eq!(charge(60_000.0), 100);
    }

    #[test]
    fn aim_spreads_with_power() {
        assert_eq!(aim(0, 0.0, 0.5), (350.0, 100.0));
        assert_eq!(aim(100, 0.0, 0.0), (225.0, 40.0));
        assert_eq!(aim(50, 1.0, 1.0), (412.5, 160.0));
    }

    #[test]
    fn keeper_beats_the_goal_mouth() {
        let keeper = Keeper { x: 320.0, dir: 1.0 };
        assert_eq!(judge((340.0, 140.0), &keeper), Outcome::Saved);
        assert_eq!(judge((250.0, 140.0), &keeper), Outcome::Goal);
        assert_eq!(judge((200.0, 100.0), &keeper), Outcome::Miss);
        assert_eq!(judge((350.0, 170.0), &Keeper { x: 250.0, dir: 1.0 }), Outcome::Miss);
    }

    #[test]
    fn full_kick_counts_attempt_and_resets_ball() {
        let mut p = running();
        p.tick(0.0);
        p.pointer(Pointer::Down(350.0, 420.0));
        // Zero power always lands on the centre line, inside the goal.
        p.pointer(Pointer::Up(350.0, 420.0));
        assert_eq!(p.attempts, 1);
        assert!(matches!(p.shot, Shot::Flying { .. }));

        let keeper_at_kick = p.keeper.x;
        run(&mut p, 10.0, 890.0);
        assert!(matches!(p.shot, Shot::Flying { .. }));
        assert_eq!(p.keeper.x, keeper_at_kick);

        p.tick(900.0);
        let Shot::Showing { outcome, until_ms } = p.shot else { panic!("kick did not land: {:?}", p.shot) };
        assert_ne!(outcome, Outcome::Miss);
        assert_eq!(until_ms, 900.0 + RESULT_MS);
        assert_eq!(p.goals, u32::from(outcome == Outcome::Goal));
        assert_eq!(p.ball.0, 350.0);

        p.tick(2390.0);
        assert!(matches!(p.shot, Shot::Showing { .. }));
        p.tick(2400.0);
        assert_eq!(p.shot, Shot::Ready);
        assert_eq!(p.ball, SPOT);
    }

    #[test]
    fn holding_charges_then_release_kicks() {
        let mut p = running();
        p.tick(0.0);
        assert!(p.key_down(" "));
        run(&mut p, 10.0, 150.0);
        assert_eq!(p.power(), 15);
        p.key_up(" ");
        assert_eq!(p.power(), 15);
        assert_eq!(p.attempts, 1);
        // A second press mid-flight is ignored.
        p.pointer(Pointer::Down(0.0, 0.0));
        assert!(matches!(p.shot, Shot::Flying { .. }));
    }

    #[test]
    fn release_far_off_the_canvas_still_kicks() {
        let mut p = running();
        p.tick(0.0);
        p.pointer(Pointer::Down(350.0, 420.0));
        run(&mut p, 10.0, 300.0);
        p.pointer(Pointer::Up(-160.0, -80.0));
        assert_eq!(p.attempts, 1);
        assert_eq!(p.power(), 30);
        assert!(matches!(p.shot, Shot::Flying { .. }));
    }

    #[test]
    fn release_while_paused_waits_for_resume() {
        let mut p = running();
        p.tick(0.0);
        p.pointer(Pointer::Down(350.0, 420.0));
        p.toggle_pause();
        p.pointer(Pointer::Up(350.0, 420.0));
        p.key_up(" ");
        assert_eq!(p.attempts, 0);
        assert!(matches!(p.shot, Shot::Charging { .. }));

        p.toggle_pause();
        p.pointer(Pointer::Up(350.0, 420.0));
        assert_eq!(p.attempts, 1);
    }

    #[test]
    fn rate_rounds_and_handles_no_attempts() {
        let mut p = running();
        assert_eq!(p.rate(), 0);
        p.goals = 2;
        p.attempts = 3;
        assert_eq!(p.rate(), 67);
        p.goals = 1;
        p.attempts = 8;
        assert_eq!(p.rate(), 13);
    }

    #[test]
    fn reset_goes_back_to_idle_and_clears_stats() {
        let mut p = running();
        p.goals = 4;
        p.attempts = 5;
        p.keeper.x = 390.0;
        p.reset();
        assert_eq!(p.phase(), GamePhase::Idle);
        assert_eq!((p.goals, p.attempts, p.keeper.x), (0, 0, KEEPER_START_X));
    }
}
