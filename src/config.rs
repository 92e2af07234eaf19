//! Site configuration. Every field has a default so the page can pass a
//! partial JSON object (or nothing) to `start_site`.

use serde::Deserialize;

use crate::error::Result;
use crate::i18n::Language;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// `log` level name: error, warn, info, debug, trace or off.
    pub log_level: String,
    pub default_language: Language,
    pub selectors: Selectors,
    pub starfield: StarfieldConfig,
    pub skills: SkillsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            default_language: Language::Pt,
            selectors: Selectors::default(),
            starfield: StarfieldConfig::default(),
            skills: SkillsConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Where each component mounts. Missing elements just skip that component.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Selectors {
    pub starfield_canvas: String,
    pub skills_container: String,
    pub projects_container: String,
    pub language_switcher: String,
    pub language_button: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            starfield_canvas: "#universe".into(),
            skills_container: "#skills-cloud".into(),
            projects_container: "#projects-grid".into(),
            language_switcher: ".language-switcher".into(),
            language_button: "#language-btn".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    pub desktop_star_count: usize,
    pub mobile_star_count: usize,
    pub influence_radius: f64,
    pub influence_strength: f64,
    pub drift_scale: f64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            desktop_star_count: 300,
            mobile_star_count: 100,
            influence_radius: 120.0,
            influence_strength: 0.8,
            drift_scale: 0.2,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkillsConfig {
    pub labels: Vec<String>,
    /// Window widths at or below this use the fixed fractional layout.
    pub mobile_breakpoint: f64,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            labels: crate::wordcloud::DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            mobile_breakpoint: 768.0,
        }
    }
}
