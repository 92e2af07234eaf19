//! Skills word cloud. Labels are measured in the DOM, then placed either on a
//! fixed grid of fractional slots (narrow screens) or by a spiral search that
//! keeps a margin between every accepted label.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::error::{Result, SiteError};
use crate::geom::Rect;

pub const DEFAULT_SKILLS: [&str; 20] = [
    "Commerce Cloud", "Salesforce", "JavaScript", "NodeJs", "Postman",
    "Express", "React", "API", "Visual Studio", "Content Assets",
    "Page Designer", "Einstein", "Insomnia", "Jira", "Trello",
    "Git", "Bitbucket", "Docker", "Prisma", "TypeScript",
];

const DESKTOP_FONT_REM: [f64; 20] = [
    1.4, 1.2, 1.1, 1.0, 0.9, 0.8, 1.3, 1.1, 0.95, 1.05,
    0.85, 1.15, 0.9, 0.8, 1.0, 0.85, 1.1, 0.9, 1.0, 0.95,
];
const MOBILE_FONT_REM: [f64; 20] = [
    0.62, 0.58, 0.65, 0.56, 0.61, 0.57, 0.64, 0.59, 0.56, 0.62,
    0.57, 0.63, 0.58, 0.55, 0.61, 0.57, 0.63, 0.59, 0.61, 0.56,
];

// Fractions of the padded container, one per label index (wraps).
const MOBILE_SLOTS: [(f64, f64); 20] = [
    (0.12, 0.08), (0.58, 0.04), (0.32, 0.15), (0.78, 0.12),
    (0.08, 0.22), (0.48, 0.26), (0.72, 0.24), (0.28, 0.32),
    (0.85, 0.30), (0.18, 0.38), (0.52, 0.36), (0.35, 0.44),
    (0.68, 0.42), (0.12, 0.50), (0.82, 0.48), (0.42, 0.54),
    (0.62, 0.56), (0.25, 0.60), (0.75, 0.62), (0.48, 0.66),
];

const EDGE: f64 = 15.0;
const FALLBACK_EDGE: f64 = 10.0;
const MARGIN: f64 = 25.0;
const MAX_ATTEMPTS: u32 = 200;
const ATTEMPTS_PER_TURN: f64 = 20.0;
const START_RADIUS: f64 = 30.0;
const RADIUS_STEP: f64 = 4.0;
const MAX_RADIUS_FACTOR: f64 = 0.75;
const FALLBACK_RADIUS_FACTOR: f64 = 0.6;

pub fn font_size_rem(index: usize, mobile: bool) -> f64 {
    if mobile {
        MOBILE_FONT_REM.get(index).copied().unwrap_or(0.58)
    } else {
        DESKTOP_FONT_REM.get(index).copied().unwrap_or(0.9)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementKind {
    /// Fixed fractional slot (narrow layout).
    Slot,
    /// Accepted by the spiral search; guaranteed clear of other spiral hits.
    Spiral,
    /// No clear spot found; parked on the fallback circle.
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    pub kind: PlacementKind,
}

/// Lay out labels of the given (width, height) sizes in a container.
/// Returns nothing for a collapsed container.
pub fn layout(sizes: &[(f64, f64)], width: f64, height: f64, mobile: bool) -> Vec<Placement> {
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    if mobile { slot_layout(sizes, width, height) } else { spiral_layout(sizes, width, height) }
}

pub fn slot_layout(sizes: &[(f64, f64)], width: f64, height: f64) -> Vec<Placement> {
    let (avail_w, avail_h) = (width - 2.0 * EDGE, height - 2.0 * EDGE);
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let (fx, fy) = MOBILE_SLOTS[i % MOBILE_SLOTS.len()];
            let x = (EDGE + fx * avail_w).min(width - w - EDGE).max(EDGE);
            let y = (EDGE + fy * avail_h).min(height - h - EDGE).max(EDGE);
            Placement { rect: Rect::new(x, y, w, h), kind: PlacementKind::Slot }
        })
        .collect()
}

pub fn spiral_layout(sizes: &[(f64, f64)], width: f64, height: f64) -> Vec<Placement> {
    let (cx, cy) = (width / 2.0, height / 2.0);
    let max_radius = cx.min(cy) * MAX_RADIUS_FACTOR;
    let mut accepted: Vec<Rect> = Vec::with_capacity(sizes.len());
    let mut out = Vec::with_capacity(sizes.len());

    for (i, &(w, h)) in sizes.iter().enumerate() {
        let hit = (0..MAX_ATTEMPTS).find_map(|attempt| {
            let a = attempt as f64;
            let angle = a / ATTEMPTS_PER_TURN * TAU;
            let radius = (START_RADIUS + a * RADIUS_STEP).min(max_radius);
            let candidate = Rect::new(cx + radius * angle.cos() - w / 2.0, cy + radius * angle.sin() - h / 2.0, w, h);
            let inside = candidate.x >= EDGE
                && candidate.y >= EDGE
                && candidate.x + w <= width - EDGE
                && candidate.y + h <= height - EDGE;
            (inside && !accepted.iter().any(|r| candidate.near(r, MARGIN))).then_some(candidate)
        });

        match hit {
            Some(rect) => {
                accepted.push(rect);
                out.push(Placement { rect, kind: PlacementKind::Spiral });
            }
            None => {
                let angle = i as f64 * TAU / sizes.len() as f64;
                let radius = max_radius * FALLBACK_RADIUS_FACTOR;
                let x = (cx + radius * angle.cos() - w / 2.0).min(width - w - FALLBACK_EDGE).max(FALLBACK_EDGE);
                let y = (cy + radius * angle.sin() - h / 2.0).min(height - h - FALLBACK_EDGE).max(FALLBACK_EDGE);
                log::debug!("skills: no clear slot for label {i}, using fallback circle");
                out.push(Placement { rect: Rect::new(x, y, w, h), kind: PlacementKind::Fallback });
            }
        }
    }
    out
}

/// The skills container and its labels.
pub struct SkillsCloud {
    container: HtmlElement,
    labels: Vec<String>,
    mobile_breakpoint: f64,
}

impl SkillsCloud {
    pub fn new(container: HtmlElement, labels: Vec<String>, mobile_breakpoint: f64) -> Self {
        Self { container, labels, mobile_breakpoint }
    }

    /// Rebuild the label spans and position them for the current size.
    pub fn render(&self, doc: &Document) -> Result<usize> {
        self.container.set_inner_html("");
        let mobile = crate::dom::inner_size().0 <= self.mobile_breakpoint;

        let mut spans = Vec::with_capacity(self.labels.len());
        for (i, label) in self.labels.iter().enumerate() {
            let span: HtmlElement = doc
                .create_element("span")?
                .dyn_into()
                .map_err(|_| SiteError::WrongElement("span".into(), "html element"))?;
            span.set_class_name("word");
            span.set_text_content(Some(label));
            let style = span.style();
            style.set_property("font-size", &format!("{}rem", font_size_rem(i, mobile)))?;
            style.set_property("position", "absolute")?;
            style.set_property("visibility", "hidden")?;
            self.container.append_child(&span)?;
            spans.push(span);
        }

        let bounds = self.container.get_bounding_client_rect();
        let sizes: Vec<(f64, f64)> = spans
            .iter()
            .map(|s| (s.offset_width() as f64, s.offset_height() as f64))
            .collect();
        let placements = layout(&sizes, bounds.width(), bounds.height(), mobile);
        for (span, p) in spans.iter().zip(&placements) {
            let style = span.style();
            style.set_property("left", &format!("{}px", p.rect.x))?;
            style.set_property("top", &format!("{}px", p.rect.y))?;
            style.set_property("visibility", "visible")?;
        }
        log::debug!("skills: placed {} of {} labels (mobile={mobile})", placements.len(), spans.len());
        Ok(placements.len())
    }
}
