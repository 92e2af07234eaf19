//! Top-down shooter. Enemies stream in from both sides toward the player;
//! every ten kills starts a new wave with faster enemies and a shorter spawn
//! interval.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use rand::rngs::SmallRng;
use web_sys::CanvasRenderingContext2d;

use super::{overlay, CanvasGame, GamePhase, KeySet, Pointer};
use crate::dom;
use crate::error::Result;
use crate::geom::{normalize, Rect};

pub const WIDTH: f64 = 1200.0;
pub const HEIGHT: f64 = 600.0;

const PLAYER_SIZE: f64 = 80.0;
const PLAYER_SPEED: f64 = 5.0;
const PLAYER_START: (f64, f64) = (WIDTH / 2.0, HEIGHT - 100.0);
const BULLET_W: f64 = 30.0;
const BULLET_H: f64 = 15.0;
const BULLET_SPEED: f64 = 16.0;
const ENEMY_SIZE: f64 = 50.0;

pub const START_HEALTH: i32 = 3;
pub const MAX_ENEMIES: usize = 15;
pub const KILL_POINTS: u32 = 10;
pub const KILLS_PER_WAVE: u32 = 10;
const INITIAL_SPAWN_MS: f64 = 1500.0;
const FLASHING_PER_WAVE: u32 = 5;
const FLASH_MS: f64 = 2000.0;
const SPARKS_PER_HIT: usize = 8;
const SPARK_SPEED: f64 = 3.0;
pub const SPARK_LIFE: u32 = 30;
const JOYSTICK_DEAD_ZONE: f64 = 5.0;

const FLASH_COLORS: [&str; 6] = ["#ff0000", "#ff6600", "#ffff00", "#00ff00", "#0088ff", "#ff00ff"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wave {
    pub enemy_speed: f64,
    pub spawn_ms: f64,
}

const fn wave(enemy_speed: f64, spawn_ms: f64) -> Wave {
    Wave { enemy_speed, spawn_ms }
}

/// Per-wave tuning; waves past the end reuse the last row.
pub const WAVES: [Wave; 20] = [
    wave(5.0, 2000.0),
    wave(10.0, 1500.0),
    wave(20.0, 1200.0),
    wave(40.0, 1000.0),
    wave(80.0, 800.0),
    wave(160.0, 700.0),
    wave(320.0, 600.0),
    wave(640.0, 550.0),
    wave(1280.0, 500.0),
    wave(2560.0, 450.0),
    wave(5120.0, 400.0),
    wave(10240.0, 350.0),
    wave(20480.0, 300.0),
    wave(40960.0, 250.0),
    wave(81920.0, 200.0),
    wave(163840.0, 150.0),
    wave(327680.0, 100.0),
    wave(655360.0, 80.0),
    wave(1310720.0, 60.0),
    wave(2621440.0, 50.0),
];

pub fn wave_row(wave: u32) -> Wave {
    let idx = (wave.max(1) - 1) as usize;
    WAVES[idx.min(WAVES.len() - 1)]
}

/// Arrow keys that steer the player for a joystick offset (screen axes, y
/// down). Inside the dead zone nothing is held.
pub fn joystick_keys(dx: f64, dy: f64) -> &'static [&'static str] {
    if (dx * dx + dy * dy).sqrt() < JOYSTICK_DEAD_ZONE {
        return &[];
    }
    let mut deg = dy.atan2(dx) * 180.0 / PI;
    if deg < 0.0 {
        deg += 360.0;
    }
    match (((deg + 22.5) / 45.0).floor() as u32) % 8 {
        0 => &["arrowright"],
        1 => &["arrowdown", "arrowright"],
        2 => &["arrowdown"],
        3 => &["arrowdown", "arrowleft"],
        4 => &["arrowleft"],
        5 => &["arrowup", "arrowleft"],
        6 => &["arrowup"],
        _ => &["arrowup", "arrowright"],
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bullet {
    pub rect: Rect,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    pub rect: Rect,
    pub vx: f64,
    pub vy: f64,
    flashing: bool,
    wave_started_ms: f64,
}

impl Enemy {
    pub fn is_flashing(&self, now_ms: f64) -> bool {
        self.flashing && now_ms - self.wave_started_ms < FLASH_MS
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    vx: f64,
    vy: f64,
    pub life: u32,
    hue: f64,
}

pub struct Shooter {
    phase: GamePhase,
    pub player: Rect,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub sparks: Vec<Spark>,
    score: u32,
    pub health: i32,
    pub kills: u32,
    pub wave: u32,
    spawn_interval_ms: f64,
    last_spawn_ms: Option<f64>,
    wave_started_ms: f64,
    spawned_in_wave: u32,
    keys: KeySet,
    aim: (f64, f64),
    trigger: bool,
    rng: SmallRng,
}

impl Shooter {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            phase: GamePhase::Idle,
            player: Rect::new(PLAYER_START.0, PLAYER_START.1, PLAYER_SIZE, PLAYER_SIZE),
            bullets: Vec::new(),
            enemies: Vec::new(),
            sparks: Vec::new(),
            score: 0,
            health: START_HEALTH,
            kills: 0,
            wave: 1,
            spawn_interval_ms: INITIAL_SPAWN_MS,
            last_spawn_ms: None,
            // Wave 1 enemies never flash.
            wave_started_ms: f64::NEG_INFINITY,
            spawned_in_wave: 0,
            keys: KeySet::default(),
            aim: (WIDTH / 2.0, HEIGHT / 2.0),
            trigger: false,
            rng,
        }
    }

    pub fn spawn_interval_ms(&self) -> f64 {
        self.spawn_interval_ms
    }

    fn move_player(&mut self) {
        let mut dx = 0.0;
        if self.keys.any(&["arrowleft", "a"]) {
            dx = -PLAYER_SPEED;
        }
        if self.keys.any(&["arrowright", "d"]) {
            dx = PLAYER_SPEED;
        }
        let mut dy = 0.0;
        if self.keys.any(&["arrowup", "w"]) {
            dy = -PLAYER_SPEED;
        }
        if self.keys.any(&["arrowdown", "s"]) {
            dy = PLAYER_SPEED;
        }
        self.player.x = (self.player.x + dx).clamp(0.0, WIDTH - self.player.w);
        self.player.y = (self.player.y + dy).clamp(0.0, HEIGHT - self.player.h);
    }

    fn shoot(&mut self) {
        let (cx, cy) = self.player.center();
        let (dx, dy) = normalize(self.aim.0 - cx, self.aim.1 - cy);
        self.bullets.push(Bullet {
            rect: Rect::new(cx, cy, BULLET_W, BULLET_H),
            vx: dx * BULLET_SPEED,
            vy: dy * BULLET_SPEED,
        });
    }

    fn spawn_enemy(&mut self, now_ms: f64) {
        let x = if self.rng.gen_bool(0.5) { -ENEMY_SIZE } else { WIDTH };
        let y = self.rng.gen_range(50.0..HEIGHT - 50.0);
        let (tx, ty) = self.player.center();
        let (dx, dy) = normalize(tx - x, ty - y);
        let speed = wave_row(self.wave).enemy_speed;
        self.enemies.push(Enemy {
            rect: Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
            vx: dx * speed,
            vy: dy * speed,
            flashing: self.spawned_in_wave < FLASHING_PER_WAVE,
            wave_started_ms: self.wave_started_ms,
        });
        self.spawned_in_wave += 1;
        self.last_spawn_ms = Some(now_ms);
    }

    fn burst(&mut self, (x, y): (f64, f64)) {
        for i in 0..SPARKS_PER_HIT {
            let angle = TAU * i as f64 / SPARKS_PER_HIT as f64;
            let hue = self.rng.gen_range(10.0..70.0);
            self.sparks.push(Spark {
                x,
                y,
                vx: angle.cos() * SPARK_SPEED,
                vy: angle.sin() * SPARK_SPEED,
                life: SPARK_LIFE,
                hue,
            });
        }
    }

    fn resolve_hits(&mut self) {
        let mut bursts = Vec::new();
        let mut kills = 0;
        let enemies = &mut self.enemies;
        self.bullets.retain(|bullet| {
            let before = enemies.len();
            enemies.retain(|enemy| {
                if bullet.rect.overlaps(&enemy.rect) {
                    bursts.push(enemy.rect.center());
                    false
                } else {
                    true
                }
            });
            let hit = before - enemies.len();
            kills += hit as u32;
            hit == 0
        });
        self.kills += kills;
        self.score += kills * KILL_POINTS;

        let player = self.player;
        let before = self.enemies.len();
        self.enemies.retain(|enemy| !player.overlaps(&enemy.rect));
        for _ in 0..before - self.enemies.len() {
            self.health -= 1;
            bursts.push(player.center());
        }
        for at in bursts {
            self.burst(at);
        }
        if self.health <= 0 {
            log::info!("shooter: game over at wave {} with {} points", self.wave, self.score);
            self.phase = GamePhase::GameOver;
        }
    }

    fn update_wave(&mut self, now_ms: f64) {
        let wave = self.kills / KILLS_PER_WAVE + 1;
        if wave != self.wave {
            self.wave = wave;
            self.wave_started_ms = now_ms;
            self.spawned_in_wave = 0;
            self.spawn_interval_ms = wave_row(wave).spawn_ms;
            log::debug!("shooter: wave {wave}");
        }
    }
}

impl CanvasGame for Shooter {
    fn name(&self) -> &'static str {
        "shooter"
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

    fn score(&self) -> i64 {
        self.score as i64
    }

    fn reset(&mut self) {
        let rng = self.rng.clone();
        *self = Self { phase: self.phase, ..Self::new(rng) };
    }

    fn tick(&mut self, now_ms: f64) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.move_player();
        if std::mem::take(&mut self.trigger) {
            self.shoot();
        }

        for b in &mut self.bullets {
            b.rect.x += b.vx;
            b.rect.y += b.vy;
        }
        self.bullets
            .retain(|b| b.rect.x > 0.0 && b.rect.x < WIDTH && b.rect.y > 0.0 && b.rect.y < HEIGHT);

        for e in &mut self.enemies {
            e.rect.x += e.vx;
            e.rect.y += e.vy;
        }
        let due = self.last_spawn_ms.is_none_or(|last| now_ms - last > self.spawn_interval_ms);
        if due && self.enemies.len() < MAX_ENEMIES {
            self.spawn_enemy(now_ms);
        }

        self.resolve_hits();
        // Spawn points sit exactly one enemy width outside, so only drop
        // enemies that went further.
        self.enemies
            .retain(|e| e.rect.x >= -ENEMY_SIZE && e.rect.x <= WIDTH + ENEMY_SIZE);
        self.update_wave(now_ms);

        for s in &mut self.sparks {
            s.x += s.vx;
            s.y += s.vy;
            s.life = s.life.saturating_sub(1);
        }
        self.sparks.retain(|s| s.life > 0);
    }

    fn render(&self, ctx: &CanvasRenderingContext2d, now_ms: f64) -> Result<()> {
        dom::fill_style(ctx, "#1a1a2e");
        ctx.fill_rect(0.0, 0.0, WIDTH, HEIGHT);
        dom::stroke_style(ctx, "#0f3460");
        ctx.set_line_width(1.0);
        for x in (0..WIDTH as u32).step_by(100) {
            dom::line(ctx, x as f64, 0.0, x as f64, HEIGHT);
        }
        for y in (0..HEIGHT as u32).step_by(100) {
            dom::line(ctx, 0.0, y as f64, WIDTH, y as f64);
        }

        let (cx, cy) = self.player.center();
        ctx.save();
        ctx.translate(cx, cy)?;
        ctx.rotate((self.aim.1 - cy).atan2(self.aim.0 - cx))?;
        dom::fill_style(ctx, "#00ff00");
        ctx.fill_rect(-self.player.w / 2.0, -self.player.h / 2.0, self.player.w, self.player.h);
        dom::fill_style(ctx, "#1a1a2e");
        ctx.fill_rect(self.player.w / 4.0, -4.0, self.player.w / 4.0, 8.0);
        ctx.restore();

        for e in &self.enemies {
            if e.is_flashing(now_ms) {
                let since = now_ms - e.wave_started_ms;
                let color = FLASH_COLORS[(since / 50.0) as usize % FLASH_COLORS.len()];
                ctx.set_global_alpha(0.5 + (since / 100.0).sin() * 0.5);
                dom::fill_style(ctx, color);
            } else {
                dom::fill_style(ctx, "#ff4444");
            }
            ctx.fill_rect(e.rect.x, e.rect.y, e.rect.w, e.rect.h);
            ctx.set_global_alpha(1.0);
        }

        dom::fill_style(ctx, "#ffff00");
        for b in &self.bullets {
            ctx.fill_rect(b.rect.x, b.rect.y, b.rect.w, b.rect.h);
        }

        for s in &self.sparks {
            ctx.set_global_alpha(s.life as f64 / SPARK_LIFE as f64);
            dom::fill_style(ctx, &format!("hsl({:.0}, 100%, 50%)", s.hue));
            ctx.fill_rect(s.x - 2.0, s.y - 2.0, 4.0, 4.0);
        }
        ctx.set_global_alpha(1.0);

        dom::fill_style(ctx, "#ffffff");
        ctx.set_font("bold 20px Arial");
        ctx.set_text_align("left");
        ctx.fill_text(&format!("Score: {}", self.score), 20.0, 30.0)?;
        ctx.fill_text(&format!("Wave: {}", self.wave), 20.0, 56.0)?;
        ctx.fill_text(&format!("Health: {}", self.health.max(0)), 20.0, 82.0)?;

        match self.phase {
            GamePhase::Idle => overlay(ctx, "Shooter", "Move with WASD, aim and click to shoot")?,
            GamePhase::Paused => overlay(ctx, "Paused", "Press P to resume")?,
            GamePhase::GameOver => overlay(ctx, "Game Over", &format!("Score: {}  Wave: {}", self.score, self.wave))?,
            GamePhase::Running => {}
        }
        Ok(())
    }

    fn key_down(&mut self, key: &str) -> bool {
        let k = key.to_lowercase();
        match k.as_str() {
            " " => {
                self.trigger = true;
                true
            }
            "arrowup" | "arrowdown" | "arrowleft" | "arrowright" | "w" | "a" | "s" | "d" => {
                self.keys.press(&k);
                true
            }
            _ => false,
        }
    }

    fn key_up(&mut self, key: &str) {
        self.keys.release(key);
    }

    fn pointer(&mut self, event: Pointer) {
        match event {
            Pointer::Move(x, y) => self.aim = (x, y),
            Pointer::Down(x, y) => {
                self.aim = (x, y);
                self.trigger = true;
            }
            Pointer::Up(..) => {}
        }
    }

    fn joystick(&mut self, dx: f64, dy: f64) {
        for k in ["arrowup", "arrowdown", "arrowleft", "arrowright"] {
            self.keys.release(k);
        }
        for k in joystick_keys(dx, dy) {
            self.keys.press(k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn running() -> Shooter {
        let mut s = Shooter::new(SmallRng::seed_from_u64(11));
        s.start();
        s
    }

    fn enemy_at(x: f64, y: f64) -> Enemy {
        Enemy { rect: Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE), vx: 0.0, vy: 0.0, flashing: false, wave_started_ms: 0.0 }
    }

    #[test]
    fn player_moves_and_is_clamped() {
        let mut s = running();
        s.key_down("ArrowLeft");
        s.tick(0.0);
        assert_eq!(s.player.x, 595.0);
        s.player.x = 2.0;
        s.tick(10.0);
        assert_eq!(s.player.x, 0.0);
        s.key_up("ArrowLeft");
        s.key_down("s");
        s.player.y = HEIGHT - PLAYER_SIZE - 1.0;
        s.tick(20.0);
        assert_eq!(s.player.y, HEIGHT - PLAYER_SIZE);
    }

    #[test]
    fn one_bullet_per_press_toward_the_pointer() {
        let mut s = running();
        s.enemies.clear();
        s.last_spawn_ms = Some(0.0);
        // Aim straight right of the player centre (640, 540).
        s.pointer(Pointer::Down(1000.0, 540.0));
        s.tick(1.0);
        s.tick(2.0);
        assert_eq!(s.bullets.len(), 1);
        let b = s.bullets[0];
        assert!((b.vx - BULLET_SPEED).abs() < 1e-9 && b.vy.abs() < 1e-9);
        assert_eq!(b.rect.x, 640.0 + 2.0 * BULLET_SPEED);

        assert!(s.key_down(" "));
        s.tick(3.0);
        assert_eq!(s.bullets.len(), 2);
    }

    #[test]
    fn bullets_leave_when_out_of_bounds() {
        let mut s = running();
        s.last_spawn_ms = Some(0.0);
        s.bullets.push(Bullet { rect: Rect::new(WIDTH - 5.0, 300.0, BULLET_W, BULLET_H), vx: BULLET_SPEED, vy: 0.0 });
        s.tick(1.0);
        assert!(s.bullets.is_empty());
    }

    #[test]
    fn spawns_on_interval_from_either_edge() {
        let mut s = running();
        s.tick(0.0);
        assert_eq!(s.enemies.len(), 1);
        let e = s.enemies[0];
        assert!(e.rect.x == -ENEMY_SIZE || e.rect.x == WIDTH);
        assert!((50.0..550.0).contains(&e.rect.y));
        // Heading toward the player centre at wave 1 speed.
        assert!(((e.vx * e.vx + e.vy * e.vy).sqrt() - 5.0).abs() < 1e-9);

        s.tick(1000.0);
        assert_eq!(s.enemies.len(), 1);
        s.tick(1501.0);
        assert_eq!(s.enemies.len(), 2);
    }

    #[test]
    fn alive_enemies_are_capped() {
        let mut s = running();
        s.enemies = (0..MAX_ENEMIES).map(|i| enemy_at(100.0 + i as f64, 50.0)).collect();
        s.tick(0.0);
        assert_eq!(s.enemies.len(), MAX_ENEMIES);
    }

    #[test]
    fn bullet_hit_kills_scores_and_sparks() {
        let mut s = running();
        s.last_spawn_ms = Some(0.0);
        s.enemies = vec![enemy_at(300.0, 100.0)];
        s.bullets.push(Bullet { rect: Rect::new(290.0, 110.0, BULLET_W, BULLET_H), vx: 0.0, vy: 0.0 });
        s.tick(1.0);
        assert!(s.enemies.is_empty() && s.bullets.is_empty());
        assert_eq!((s.score(), s.kills), (10, 1));
        assert_eq!(s.sparks.len(), SPARKS_PER_HIT);
    }

    #[test]
    fn contact_costs_health_until_game_over() {
        let mut s = running();
        s.last_spawn_ms = Some(0.0);
        for t in 1..=3 {
            s.enemies = vec![enemy_at(s.player.x + 10.0, s.player.y + 10.0)];
            s.tick(t as f64);
            assert!(s.enemies.is_empty());
        }
        assert_eq!(s.health, 0);
        assert_eq!(s.phase(), GamePhase::GameOver);
        s.tick(5.0);
        assert_eq!(s.health, 0);
    }

    #[test]
    fn enemies_that_drift_off_screen_are_dropped() {
        let mut s = running();
        s.last_spawn_ms = Some(0.0);
        let mut e = enemy_at(-ENEMY_SIZE, 100.0);
        e.vx = -1.0;
        s.enemies = vec![e, enemy_at(WIDTH, 300.0)];
        s.tick(1.0);
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.enemies[0].rect.x, WIDTH);
    }

    #[test]
    fn tenth_kill_advances_the_wave_and_flashes_new_enemies() {
        let mut s = running();
        s.kills = 9;
        s.last_spawn_ms = Some(0.0);
        s.enemies = vec![enemy_at(300.0, 100.0)];
        s.bullets.push(Bullet { rect: Rect::new(300.0, 110.0, BULLET_W, BULLET_H), vx: 0.0, vy: 0.0 });
        s.tick(100.0);
        assert_eq!(s.wave, 2);
        assert_eq!(s.spawn_interval_ms(), 1500.0);

        for t in [1700.0, 3300.0, 4900.0, 6500.0, 8100.0, 9700.0] {
            s.tick(t);
        }
        assert_eq!(s.spawned_in_wave, 6);
        let flashing = s.enemies.iter().filter(|e| e.flashing).count();
        assert!(flashing <= 5);
        assert!(s.enemies.iter().all(|e| !e.is_flashing(100.0 + FLASH_MS)));
    }

    #[test]
    fn wave_one_enemies_do_not_flash() {
        let mut s = running();
        s.tick(0.0);
        assert!(!s.enemies[0].is_flashing(0.0));
    }

    #[test]
    fn wave_table_saturates() {
        assert_eq!(wave_row(1), WAVES[0]);
        assert_eq!(wave_row(20), WAVES[19]);
        assert_eq!(wave_row(57), WAVES[19]);
    }

    #[test]
    fn sparks_fade_after_their_lifetime() {
        let mut s = running();
        s.last_spawn_ms = Some(0.0);
        s.burst((100.0, 100.0));
        for t in 0..SPARK_LIFE - 1 {
            s.tick(t as f64);
        }
        assert_eq!(s.sparks.len(), SPARKS_PER_HIT);
        s.tick(100.0);
        assert!(s.sparks.is_empty());
    }

    #[test]
    fn joystick_maps_to_eight_directions() {
        assert!(joystick_keys(3.0, 2.0).is_empty());
        assert_eq!(joystick_keys(20.0, 0.0), ["arrowright"]);
        assert_eq!(joystick_keys(0.0, 20.0), ["arrowdown"]);
        assert_eq!(joystick_keys(-20.0, 1.0), ["arrowleft"]);
        assert_eq!(joystick_keys(0.0, -20.0), ["arrowup"]);
        assert_eq!(joystick_keys(15.0, 15.0), ["arrowdown", "arrowright"]);
        assert_eq!(joystick_keys(-15.0, -15.0), ["arrowup", "arrowleft"]);

        let mut s = running();
        s.last_spawn_ms = Some(0.0);
        s.joystick(-30.0, 0.0);
        s.tick(1.0);
        assert_eq!(s.player.x, 595.0);
        s.joystick(0.0, 0.0);
        s.tick(2.0);
        assert_eq!(s.player.x, 595.0);
    }

    #[test]
    fn restart_restores_the_opening_state() {
        let mut s = running();
        s.kills = 25;
        s.health = 1;
        s.tick(0.0);
        s.start();
        assert_eq!((s.wave, s.kills, s.health, s.score()), (1, 0, START_HEALTH, 0));
        assert!(s.enemies.is_empty());
        assert_eq!(s.phase(), GamePhase::Running);
    }
}
