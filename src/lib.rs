//! Starfolio core crate.
//!
//! Browser pieces of a portfolio page compiled to WebAssembly: the animated
//! starfield, the skills word cloud, project cards, the language switcher and
//! a handful of canvas mini-games. `start_site()` wires the page; each game is
//! mounted on its own canvas through the `mount_*` exports.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

pub mod config;
pub mod dom;
pub mod error;
pub mod games;
pub mod geom;
pub mod i18n;
pub mod projects;
pub mod starfield;
pub mod wordcloud;

use config::SiteConfig;
use dom::{EventListener, LocalStorage};
use error::{Result, SiteError};
use games::runner::{self, GameHandle};
use i18n::SwitcherView;
use starfield::StarfieldView;
use wordcloud::SkillsCloud;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // A logger is already installed (hot reload); keep it.
        log::debug!("logger already initialised");
    }
}

// -----------------------------------------------------------------------------
// Page components
// -----------------------------------------------------------------------------

/// Everything `start_site` mounted. Dropping it tears the page wiring down.
#[wasm_bindgen]
pub struct Site {
    config: SiteConfig,
    doc: Document,
    starfield: Option<StarfieldView>,
    skills: Option<std::rc::Rc<SkillsCloud>>,
    switcher: Option<SwitcherView>,
    listeners: Vec<EventListener>,
}

fn element_as<T: JsCast>(doc: &Document, selector: &str, kind: &'static str) -> Result<Option<T>> {
    match doc.query_selector(selector)? {
        Some(el) => el
            .dyn_into::<T>()
            .map(Some)
            .map_err(|_| SiteError::WrongElement(selector.to_string(), kind)),
        None => {
            log::debug!("nothing at {selector}, skipping");
            Ok(None)
        }
    }
}

impl Site {
    fn mount(config: SiteConfig) -> Result<Self> {
        let doc = dom::document()?;
        let sel = &config.selectors;

        let starfield = match element_as::<HtmlCanvasElement>(&doc, &sel.starfield_canvas, "canvas")? {
            Some(canvas) => Some(StarfieldView::mount(canvas, config.starfield.clone())?),
            None => None,
        };

        let switcher = SwitcherView::mount(&doc, &sel.language_switcher, &sel.language_button, config.default_language)?;
        projects::mount(&doc, &sel.projects_container, switcher.current())?;

        let mut listeners = Vec::new();
        let skills = match element_as::<HtmlElement>(&doc, &sel.skills_container, "html element")? {
            Some(container) => {
                let cloud = std::rc::Rc::new(SkillsCloud::new(
                    container,
                    config.skills.labels.clone(),
                    config.skills.mobile_breakpoint,
                ));
                cloud.render(&doc)?;
                let (c, d) = (cloud.clone(), doc.clone());
                let win = dom::window()?;
                listeners.push(EventListener::new(&win, "resize", move |_| {
                    if let Err(err) = c.render(&d) {
                        log::warn!("skills: relayout failed: {err}");
                    }
                })?);
                Some(cloud)
            }
            None => None,
        };

        Ok(Self { config, doc, starfield, skills, switcher: Some(switcher), listeners })
    }
}

/// Mount every page component found in the document. `config_json` is an
/// optional, possibly partial, `SiteConfig` object.
#[wasm_bindgen]
pub fn start_site(config_json: Option<String>) -> std::result::Result<Site, JsValue> {
    let config = match config_json.as_deref().map(str::trim) {
        Some(src) if !src.is_empty() => SiteConfig::from_json(src)?,
        _ => SiteConfig::default(),
    };
    log::set_max_level(config.level_filter());
    let site = Site::mount(config)?;
    log::info!(
        "site started: starfield={} skills={} language={}",
        site.starfield.is_some(),
        site.skills.is_some(),
        site.current_language()
    );
    Ok(site)
}

#[wasm_bindgen]
impl Site {
    /// Switch to `code` (pt, en, es), persist it and retranslate the page.
    pub fn set_language(&self, code: &str) -> std::result::Result<String, JsValue> {
        let switcher = self.switcher.as_ref().ok_or(SiteError::NoDocument)?;
        Ok(switcher.set_language(code)?.code().to_string())
    }

    pub fn current_language(&self) -> String {
        self.switcher
            .as_ref()
            .map_or(self.config.default_language, SwitcherView::current)
            .code()
            .to_string()
    }

    /// Lay the skills cloud out again, e.g. after the container was shown.
    pub fn relayout_skills(&self) -> std::result::Result<u32, JsValue> {
        match &self.skills {
            Some(cloud) => Ok(cloud.render(&self.doc)? as u32),
            None => Ok(0),
        }
    }

    pub fn destroy(&mut self) {
        if let Some(field) = self.starfield.take() {
            field.stop();
        }
        self.listeners.clear();
        self.switcher = None;
        self.skills = None;
        log::info!("site destroyed");
    }
}

// -----------------------------------------------------------------------------
// Mini-games
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn mount_pong(canvas_id: &str) -> std::result::Result<GameHandle, JsValue> {
    Ok(runner::mount(canvas_id, games::pong::Pong::new())?)
}

/// Snake keeps its best score in local storage.
#[wasm_bindgen]
pub fn mount_snake(canvas_id: &str) -> std::result::Result<GameHandle, JsValue> {
    let game = games::snake::Snake::new(Box::new(LocalStorage), SmallRng::from_entropy());
    Ok(runner::mount(canvas_id, game)?)
}

#[wasm_bindgen]
pub fn mount_shooter(canvas_id: &str) -> std::result::Result<GameHandle, JsValue> {
    Ok(runner::mount(canvas_id, games::shooter::Shooter::new(SmallRng::from_entropy()))?)
}

#[wasm_bindgen]
pub fn mount_penalty(canvas_id: &str) -> std::result::Result<GameHandle, JsValue> {
    Ok(runner::mount(canvas_id, games::penalty::Penalty::new(SmallRng::from_entropy()))?)
}
