//! Thin browser plumbing: element lookup, storage, listeners and the
//! `requestAnimationFrame` loop used by every animated component.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, Window};

use crate::error::{Result, SiteError};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(SiteError::NoWindow)
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(SiteError::NoDocument)
}

/// Look up a canvas by id, or create and append one with the given size.
pub fn canvas_by_id(doc: &Document, id: &str, width: u32, height: u32) -> Result<HtmlCanvasElement> {
    let canvas: HtmlCanvasElement = match doc.get_element_by_id(id) {
        Some(el) => el
            .dyn_into()
            .map_err(|_| SiteError::WrongElement(id.to_string(), "canvas"))?,
        None => {
            let c: HtmlCanvasElement = doc
                .create_element("canvas")?
                .dyn_into()
                .map_err(|_| SiteError::WrongElement(id.to_string(), "canvas"))?;
            c.set_id(id);
            doc.body().ok_or(SiteError::NoDocument)?.append_child(&c)?;
            c
        }
    };
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")?
        .ok_or(SiteError::NoContext)?
        .dyn_into()
        .map_err(|_| SiteError::NoContext)
}

pub fn is_mobile_agent() -> bool {
    let ua = web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .unwrap_or_default();
    user_agent_is_mobile(&ua)
}

/// Matches iPhone, iPad, iPod or Android, case-insensitively.
pub fn user_agent_is_mobile(ua: &str) -> bool {
    let ua = ua.to_ascii_lowercase();
    ["iphone", "ipad", "ipod", "android"].iter().any(|m| ua.contains(m))
}

pub fn inner_size() -> (f64, f64) {
    let Some(w) = web_sys::window() else { return (0.0, 0.0) };
    let width = w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width, height)
}

// --- Storage ------------------------------------------------------------------

/// Key/value preference storage. Local storage in the browser; tests plug in
/// an in-memory map.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        web_sys::window()?.local_storage().ok()??.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        match storage {
            Some(s) => {
                if let Err(err) = s.set_item(key, value) {
                    log::warn!("could not persist {key}: {err:?}");
                }
            }
            None => log::warn!("local storage unavailable, {key} not persisted"),
        }
    }
}

/// In-memory store for hosts without local storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(HashMap<String, String>);

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

// --- Listeners ----------------------------------------------------------------

/// An attached DOM event listener; detaches itself when dropped.
pub struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, kind: &'static str, handler: F) -> Result<Self>
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), kind, callback })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

// --- Animation loop -----------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running `requestAnimationFrame` loop. Cancelled on drop.
pub struct AnimationLoop {
    running: Rc<Cell<bool>>,
    request_id: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl AnimationLoop {
    pub fn start<F>(mut on_frame: F) -> Result<Self>
    where
        F: FnMut(f64) + 'static,
    {
        let running = Rc::new(Cell::new(true));
        let request_id = Rc::new(Cell::new(None));
        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();
        let (run, req) = (running.clone(), request_id.clone());
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            if !run.get() {
                return;
            }
            on_frame(ts);
            if let Some(w) = web_sys::window() {
                if let Some(cb) = f.borrow().as_ref() {
                    req.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let id = match g.borrow().as_ref() {
            Some(cb) => window()?.request_animation_frame(cb.as_ref().unchecked_ref())?,
            None => return Err(SiteError::Js("frame callback missing".into())),
        };
        request_id.set(Some(id));
        Ok(Self { running, request_id, callback: g })
    }

    pub fn cancel(&self) {
        if !self.running.replace(false) {
            return;
        }
        if let (Some(id), Some(w)) = (self.request_id.take(), web_sys::window()) {
            let _ = w.cancel_animation_frame(id);
        }
        // Breaks the self-reference cycle held by the closure.
        self.callback.borrow_mut().take();
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

// --- Canvas helpers -----------------------------------------------------------

pub fn fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    ctx.set_fill_style(&JsValue::from_str(color));
}

pub fn stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    ctx.set_stroke_style(&JsValue::from_str(color));
}

pub fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}

/// Dashed line drawn as individual segments.
pub fn dashed_line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64, dash: f64) {
    let len = crate::geom::distance(x1, y1, x2, y2);
    if len == 0.0 || dash <= 0.0 {
        return;
    }
    let (ux, uy) = ((x2 - x1) / len, (y2 - y1) / len);
    let mut t = 0.0;
    while t < len {
        let end = (t + dash).min(len);
        line(ctx, x1 + ux * t, y1 + uy * t, x1 + ux * end, y1 + uy * end);
        t += dash * 2.0;
    }
}

pub fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) -> Result<()> {
    ctx.begin_path();
    ctx.arc(x, y, r, 0.0, std::f64::consts::TAU)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_agents_detected() {
        assert!(user_agent_is_mobile(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        ));
        assert!(user_agent_is_mobile("Mozilla/5.0 (Linux; Android 14; Pixel 8)"));
        assert!(!user_agent_is_mobile("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"));
    }
}
