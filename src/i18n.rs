//! Language switcher: an embedded translation table applied to every element
//! tagged with `data-translate`, with the choice kept in local storage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

use crate::dom::{EventListener, LocalStorage, PreferenceStore};
use crate::error::{Result, SiteError};

pub const PREFERENCE_KEY: &str = "preferred-language";
pub const TRANSLATE_ATTR: &str = "data-translate";

const TRANSLATIONS_JSON: &str = include_str!("../assets/translations.json");

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Pt,
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Pt, Language::En, Language::Es];

    pub fn code(self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Language::Pt => "🇧🇷",
            Language::En => "🇺🇸",
            Language::Es => "🇪🇸",
        }
    }

    /// Short label shown on the switcher button.
    pub fn text(self) -> &'static str {
        match self {
            Language::Pt => "PT",
            Language::En => "EN",
            Language::Es => "ES",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Pt => "Português",
            Language::En => "English",
            Language::Es => "Español",
        }
    }
}

impl FromStr for Language {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| SiteError::UnknownLanguage(s.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Translations(HashMap<Language, HashMap<String, String>>);

impl Translations {
    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    /// The table compiled into the crate, parsed once.
    pub fn embedded() -> &'static Translations {
        static TABLE: OnceLock<Translations> = OnceLock::new();
        TABLE.get_or_init(|| {
            Translations::from_json(TRANSLATIONS_JSON).unwrap_or_else(|err| {
                log::error!("embedded translations unreadable: {err}");
                Translations::default()
            })
        })
    }

    pub fn lookup(&self, lang: Language, key: &str) -> Option<&str> {
        self.0.get(&lang)?.get(key).map(String::as_str)
    }

    /// Translation for `key`, or the key itself when missing.
    pub fn t<'a>(&'a self, lang: Language, key: &'a str) -> &'a str {
        self.lookup(lang, key).unwrap_or(key)
    }

    pub fn has_language(&self, lang: Language) -> bool {
        self.0.contains_key(&lang)
    }

    pub fn keys(&self, lang: Language) -> impl Iterator<Item = &str> {
        self.0.get(&lang).into_iter().flat_map(|m| m.keys().map(String::as_str))
    }
}

/// Current language plus where it is persisted.
pub struct LanguageSwitcher<S: PreferenceStore> {
    current: Language,
    store: S,
    table: &'static Translations,
}

impl<S: PreferenceStore> LanguageSwitcher<S> {
    /// Restores a stored preference when it names a known language, and
    /// stores whichever language it settles on.
    pub fn new(mut store: S, default: Language) -> Self {
        let table = Translations::embedded();
        let current = store
            .get(PREFERENCE_KEY)
            .and_then(|code| code.parse::<Language>().ok())
            .filter(|l| table.has_language(*l))
            .unwrap_or(default);
        store.set(PREFERENCE_KEY, current.code());
        Self { current, store, table }
    }

    pub fn current(&self) -> Language {
        self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        self.table.t(self.current, key)
    }

    /// Switch language and persist the choice.
    pub fn change(&mut self, code: &str) -> Result<Language> {
        let lang: Language = code.parse()?;
        if !self.table.has_language(lang) {
            return Err(SiteError::UnknownLanguage(code.to_string()));
        }
        self.current = lang;
        self.store.set(PREFERENCE_KEY, lang.code());
        log::info!("language switched to {}", lang.code());
        Ok(lang)
    }

    /// Replacement text for each key the table knows; unknown keys are left
    /// out so their elements keep what they show.
    pub fn updates<'k, I>(&self, keys: I) -> Vec<(&'k str, &'static str)>
    where
        I: IntoIterator<Item = &'k str>,
    {
        keys.into_iter()
            .filter_map(|k| self.table.lookup(self.current, k).map(|text| (k, text)))
            .collect()
    }

    /// Rewrite every tagged element and the switcher chrome. Returns how many
    /// tagged elements changed.
    pub fn apply(&self, doc: &Document, button_selector: &str) -> Result<usize> {
        let nodes = doc.query_selector_all(&format!("[{TRANSLATE_ATTR}]"))?;
        let tagged: Vec<(Element, String)> = (0..nodes.length())
            .filter_map(|i| nodes.item(i)?.dyn_into::<Element>().ok())
            .filter_map(|el| {
                let key = el.get_attribute(TRANSLATE_ATTR)?;
                Some((el, key))
            })
            .collect();
        let texts: HashMap<&str, &str> = self.updates(tagged.iter().map(|(_, k)| k.as_str())).into_iter().collect();
        let mut updated = 0;
        for (el, key) in &tagged {
            if let Some(&text) = texts.get(key.as_str()) {
                el.set_text_content(Some(text));
                updated += 1;
            }
        }

        if let Some(btn) = doc.query_selector(button_selector)? {
            if let Some(flag) = btn.query_selector(".flag")? {
                flag.set_text_content(Some(self.current.flag()));
            }
            if let Some(text) = btn.query_selector(".lang-text")? {
                text.set_text_content(Some(self.current.text()));
            }
        }

        let options = doc.query_selector_all(".language-option")?;
        for opt in (0..options.length()).filter_map(|i| options.item(i)?.dyn_into::<Element>().ok()) {
            let active = opt.get_attribute("data-lang").as_deref() == Some(self.current.code());
            opt.class_list().toggle_with_force("active", active)?;
        }
        Ok(updated)
    }
}

/// Switcher wired to the page: dropdown toggling, option clicks and the
/// initial translation pass.
pub struct SwitcherView {
    state: Rc<RefCell<LanguageSwitcher<LocalStorage>>>,
    doc: Document,
    button_selector: String,
    _listeners: Vec<EventListener>,
}

impl SwitcherView {
    pub fn mount(doc: &Document, root_selector: &str, button_selector: &str, default: Language) -> Result<Self> {
        let state = Rc::new(RefCell::new(LanguageSwitcher::new(LocalStorage, default)));
        let updated = state.borrow().apply(doc, button_selector)?;
        log::info!("i18n: {} applied to {updated} elements", state.borrow().current().code());

        let mut listeners = Vec::new();
        if let Some(root) = doc.query_selector(root_selector)? {
            if let Some(button) = doc.query_selector(button_selector)? {
                let r = root.clone();
                listeners.push(EventListener::new(&button, "click", move |evt| {
                    evt.stop_propagation();
                    let _ = r.class_list().toggle("active");
                })?);
            }
            {
                let r = root.clone();
                listeners.push(EventListener::new(doc, "click", move |evt| {
                    let target = evt.target().and_then(|t| t.dyn_into::<Node>().ok());
                    if !r.contains(target.as_ref()) {
                        let _ = r.class_list().remove_1("active");
                    }
                })?);
            }
            let options = doc.query_selector_all(".language-option")?;
            for opt in (0..options.length()).filter_map(|i| options.item(i)?.dyn_into::<Element>().ok()) {
                let Some(code) = opt.get_attribute("data-lang") else { continue };
                let (st, d, r, sel) = (state.clone(), doc.clone(), root.clone(), button_selector.to_string());
                listeners.push(EventListener::new(&opt, "click", move |evt| {
                    evt.stop_propagation();
                    let mut switcher = st.borrow_mut();
                    match switcher.change(&code) {
                        Ok(_) => {
                            if let Err(err) = switcher.apply(&d, &sel) {
                                log::warn!("i18n: apply failed: {err}");
                            }
                        }
                        Err(err) => log::warn!("i18n: {err}"),
                    }
                    let _ = r.class_list().remove_1("active");
                })?);
            }
        } else {
            log::debug!("i18n: no switcher at {root_selector}, translating only");
        }

        Ok(Self { state, doc: doc.clone(), button_selector: button_selector.to_string(), _listeners: listeners })
    }

    pub fn set_language(&self, code: &str) -> Result<Language> {
        let mut switcher = self.state.borrow_mut();
        let lang = switcher.change(code)?;
        switcher.apply(&self.doc, &self.button_selector)?;
        Ok(lang)
    }

    pub fn current(&self) -> Language {
        self.state.borrow().current()
    }
}
