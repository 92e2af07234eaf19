//! Hero-section starfield: drifting particles that lean toward the pointer and
//! wrap around the canvas edges.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use crate::config::StarfieldConfig;
use crate::dom::{self, AnimationLoop, EventListener};
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub speed: f64,
    pub dir_x: f64,
    pub dir_y: f64,
}

pub struct Starfield {
    cfg: StarfieldConfig,
    width: f64,
    height: f64,
    mobile: bool,
    pointer: (f64, f64),
    stars: Vec<Star>,
    rng: SmallRng,
}

impl Starfield {
    pub fn new(cfg: StarfieldConfig, width: f64, height: f64, mobile: bool, rng: SmallRng) -> Self {
        let mut field = Self {
            cfg,
            width,
            height,
            mobile,
            pointer: (width / 2.0, height / 2.0),
            stars: Vec::new(),
            rng,
        };
        field.populate();
        field
    }

    fn populate(&mut self) {
        let count = if self.mobile { self.cfg.mobile_star_count } else { self.cfg.desktop_star_count };
        let (w, h) = (self.width.max(f64::MIN_POSITIVE), self.height.max(f64::MIN_POSITIVE));
        let rng = &mut self.rng;
        self.stars = (0..count)
            .map(|_| Star {
                x: rng.gen_range(0.0..w),
                y: rng.gen_range(0.0..h),
                radius: rng.gen_range(1.0..3.0),
                speed: rng.gen_range(0.2..0.7),
                dir_x: rng.gen_range(-1.0..1.0),
                dir_y: rng.gen_range(-1.0..1.0),
            })
            .collect();
    }

    /// New canvas size; stars are scattered again over the new area.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.populate();
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        if !self.mobile {
            self.pointer = (x, y);
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn step(&mut self) {
        let (px, py) = self.pointer;
        let radius = self.cfg.influence_radius;
        for star in &mut self.stars {
            star.x += star.dir_x * star.speed * self.cfg.drift_scale;
            star.y += star.dir_y * star.speed * self.cfg.drift_scale;

            if !self.mobile {
                let (dx, dy) = (px - star.x, py - star.y);
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 0.0 && dist < radius {
                    let pull = (radius - dist) / radius * self.cfg.influence_strength;
                    star.x += dx / dist * pull;
                    star.y += dy / dist * pull;
                }
            }

            wrap(star, self.width, self.height);
        }
    }

    pub fn render(&self, ctx: &CanvasRenderingContext2d) -> Result<()> {
        ctx.clear_rect(0.0, 0.0, self.width, self.height);
        dom::fill_style(ctx, "black");
        ctx.fill_rect(0.0, 0.0, self.width, self.height);
        dom::fill_style(ctx, "white");
        for star in &self.stars {
            dom::circle(ctx, star.x, star.y, star.radius)?;
            ctx.fill();
        }
        Ok(())
    }
}

fn wrap(star: &mut Star, width: f64, height: f64) {
    if star.x > width {
        star.x = 0.0;
    }
    if star.x < 0.0 {
        star.x = width;
    }
    if star.y > height {
        star.y = 0.0;
    }
    if star.y < 0.0 {
        star.y = height;
    }
}

/// Live starfield bound to a canvas. Dropping it stops the animation and
/// detaches the listeners.
pub struct StarfieldView {
    frame: AnimationLoop,
    _listeners: Vec<EventListener>,
}

impl StarfieldView {
    pub fn mount(canvas: HtmlCanvasElement, cfg: StarfieldConfig) -> Result<Self> {
        let (w, h) = dom::inner_size();
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        let ctx = dom::context_2d(&canvas)?;
        let mobile = dom::is_mobile_agent();
        let field = Rc::new(RefCell::new(Starfield::new(cfg, w, h, mobile, SmallRng::from_entropy())));
        log::info!("starfield: {} stars on {w}x{h} (mobile={mobile})", field.borrow().stars().len());

        let mut listeners = Vec::new();
        if !mobile {
            let f = field.clone();
            listeners.push(EventListener::new(&canvas, "mousemove", move |evt| {
                if let Some(m) = evt.dyn_ref::<MouseEvent>() {
                    f.borrow_mut().set_pointer(m.client_x() as f64, m.client_y() as f64);
                }
            })?);
        }
        {
            let f = field.clone();
            let c = canvas.clone();
            let win = dom::window()?;
            listeners.push(EventListener::new(&win, "resize", move |_| {
                let (w, h) = dom::inner_size();
                c.set_width(w as u32);
                c.set_height(h as u32);
                f.borrow_mut().resize(w, h);
            })?);
        }

        let frame = AnimationLoop::start(move |_ts| {
            let mut field = field.borrow_mut();
            field.step();
            if let Err(err) = field.render(&ctx) {
                log::debug!("starfield render failed: {err}");
            }
        })?;
        Ok(Self { frame, _listeners: listeners })
    }

    pub fn stop(&self) {
        self.frame.cancel();
    }
}
