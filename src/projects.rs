//! Project cards. All visible copy goes through translation keys so the
//! language switcher can rewrite it in place.

use web_sys::{Document, Element};

use crate::error::Result;
use crate::i18n::{Language, Translations, TRANSLATE_ATTR};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Project {
    pub title_key: &'static str,
    pub description_key: &'static str,
    pub tags: &'static [&'static str],
    pub feature_keys: &'static [&'static str],
    pub image: &'static str,
    pub link: &'static str,
}

pub const PROJECTS: &[Project] = &[Project {
    title_key: "tcc-express-supermarket",
    description_key: "tcc-project-description",
    tags: &["Node.js", "React.js", "E-commerce"],
    feature_keys: &["feature-ecommerce", "feature-barcode", "feature-location"],
    image: "/images/tcc-app-screenshot.png",
    link: "https://www.gustavobit.com/tcc-express-supermarket-fe",
}];

/// Hides a broken screenshot and shows the placeholder after it.
const IMAGE_FALLBACK: &str = "this.style.display='none';this.nextElementSibling.style.display='flex'";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn translated(tag: &str, key: &str, table: &Translations, lang: Language) -> String {
    format!(
        r#"<{tag} {TRANSLATE_ATTR}="{key}">{text}</{tag}>"#,
        key = escape(key),
        text = escape(table.t(lang, key)),
    )
}

/// Markup for one card, with text already in `lang`.
pub fn card_markup(project: &Project, table: &Translations, lang: Language) -> String {
    let tags: String = project
        .tags
        .iter()
        .map(|t| format!(r#"<span class="tech-tag">{}</span>"#, escape(t)))
        .collect();
    let features: String = project
        .feature_keys
        .iter()
        .map(|k| translated("li", k, table, lang))
        .collect();
    let title = escape(table.t(lang, project.title_key));

    format!(
        concat!(
            r#"<div class="project-card">"#,
            r#"<div class="project-image"><img src="{image}" alt="{title}" loading="lazy" onerror="{on_error}">"#,
            r#"<div class="image-placeholder" style="display: none">{soon}</div></div>"#,
            r#"<div class="project-content">{heading}"#,
            r#"<div class="project-tech">{tags}</div>{description}"#,
            r#"<div class="project-features">{features_title}<ul>{features}</ul></div>"#,
            r#"<a class="project-btn" href="{link}" target="_blank" rel="noopener noreferrer">{view}</a>"#,
            r#"</div></div>"#,
        ),
        image = escape(project.image),
        title = title,
        on_error = IMAGE_FALLBACK,
        soon = translated("p", "image-coming-soon", table, lang),
        heading = translated("h3", project.title_key, table, lang),
        tags = tags,
        description = translated("p", project.description_key, table, lang),
        features_title = translated("h4", "key-features", table, lang),
        features = features,
        link = escape(project.link),
        view = translated("span", "view-project", table, lang),
    )
}

/// Fill `container` with every project card. Returns the card count.
pub fn render(container: &Element, lang: Language) -> Result<usize> {
    let table = Translations::embedded();
    let markup: String = PROJECTS.iter().map(|p| card_markup(p, table, lang)).collect();
    container.set_inner_html(&markup);
    log::debug!("projects: rendered {} cards", PROJECTS.len());
    Ok(PROJECTS.len())
}

/// Render into the first element matching `selector`, if the page has one.
pub fn mount(doc: &Document, selector: &str, lang: Language) -> Result<Option<usize>> {
    match doc.query_selector(selector)? {
        Some(container) => render(&container, lang).map(Some),
        None => {
            log::debug!("projects: no container at {selector}");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_project_key_is_translated() {
        let table = Translations::embedded();
        for p in PROJECTS {
            for key in [p.title_key, p.description_key].iter().chain(p.feature_keys) {
                for lang in Language::ALL {
                    assert!(table.lookup(lang, key).is_some(), "{key} missing for {}", lang.code());
                }
            }
        }
    }

    #[test]
    fn card_carries_translate_tags_and_link() {
        let html = card_markup(&PROJECTS[0], Translations::embedded(), Language::En);
        assert!(html.contains(r#"<h3 data-translate="tcc-express-supermarket">Express Supermarket</h3>"#));
        assert!(html.contains(r#"data-translate="feature-barcode""#));
        assert!(html.contains(r#"<span class="tech-tag">React.js</span>"#));
        assert!(html.contains(r#"href="https://www.gustavobit.com/tcc-express-supermarket-fe""#));
        assert_eq!(html.matches("<li ").count(), 3);
    }

    #[test]
    fn placeholder_is_hidden_until_the_image_fails() {
        let html = card_markup(&PROJECTS[0], Translations::embedded(), Language::Pt);
        assert!(html.contains(r#"<div class="image-placeholder" style="display: none">"#));
        assert!(html.contains(&format!(r#"onerror="{IMAGE_FALLBACK}""#)));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape(r#"<b>"R&D"</b>"#), "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;");
    }
}
