// Browser tests; run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn site_starts_on_an_empty_page() {
    let mut site = starfolio::start_site(None).expect("start_site");
    assert!(["pt", "en", "es"].contains(&site.current_language().as_str()));
    assert_eq!(site.relayout_skills().expect("relayout"), 0);
    site.destroy();
}

#[wasm_bindgen_test]
fn bad_config_is_rejected() {
    assert!(starfolio::start_site(Some("{\"default_language\":\"xx\"}".into())).is_err());
}

#[wasm_bindgen_test]
fn pong_mounts_and_starts() {
    let mut handle = starfolio::mount_pong("pong-test-canvas").expect("mount");
    assert_eq!(handle.phase(), "idle");
    handle.start();
    assert_eq!(handle.phase(), "running");
    handle.toggle_pause();
    assert_eq!(handle.phase(), "paused");
    assert_eq!(handle.score(), 0.0);
    handle.destroy();
}

#[wasm_bindgen_test]
fn mounting_reuses_an_existing_canvas() {
    let doc = web_sys::window().unwrap().document().unwrap();
    let mut first = starfolio::mount_penalty("penalty-test-canvas").expect("mount");
    let mut second = starfolio::mount_penalty("penalty-test-canvas").expect("remount");
    assert_eq!(doc.query_selector_all("#penalty-test-canvas").unwrap().length(), 1);
    first.destroy();
    second.destroy();
}

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn append(doc: &web_sys::Document, tag: &str, attrs: &[(&str, &str)]) -> web_sys::Element {
    let el = doc.create_element(tag).unwrap();
    for (name, value) in attrs {
        el.set_attribute(name, value).unwrap();
    }
    doc.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn language_switch_rewrites_tagged_elements_and_persists() {
    let doc = document();
    let hello = append(&doc, "span", &[("data-translate", "hello")]);
    let contact = append(&doc, "a", &[("data-translate", "contact-us")]);
    let unknown = append(&doc, "p", &[("data-translate", "not-a-key")]);
    unknown.set_text_content(Some("as written"));

    let mut site = starfolio::start_site(Some(r#"{"default_language":"pt"}"#.into())).unwrap();
    assert_eq!(site.set_language("es").unwrap(), "es");
    assert_eq!(hello.text_content().as_deref(), Some("Hola,"));
    assert_eq!(contact.text_content().as_deref(), Some("Contáctame"));
    assert_eq!(unknown.text_content().as_deref(), Some("as written"));

    let storage = web_sys::window().unwrap().local_storage().unwrap().unwrap();
    assert_eq!(storage.get_item("preferred-language").unwrap().as_deref(), Some("es"));

    site.destroy();
    for el in [hello, contact, unknown] {
        el.remove();
    }
}

#[wasm_bindgen_test]
fn site_mounts_starfield_and_skills_with_resize_listeners() {
    let doc = document();
    let canvas = append(&doc, "canvas", &[("id", "universe")]);
    let cloud = append(&doc, "div", &[("id", "skills-cloud"), ("style", "width: 800px; height: 400px")]);

    let mut site = starfolio::start_site(None).unwrap();
    assert!(site.relayout_skills().unwrap() > 0);
    web_sys::window().unwrap().dispatch_event(&web_sys::Event::new("resize").unwrap()).unwrap();
    site.destroy();

    canvas.remove();
    cloud.remove();
}

mod pointer_routing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use starfolio::games::{runner, CanvasGame, GamePhase, Pointer};
    use wasm_bindgen_test::*;

    struct Recorder {
        phase: GamePhase,
        seen: Rc<RefCell<Vec<Pointer>>>,
    }

    impl CanvasGame for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn size(&self) -> (u32, u32) {
            (100, 100)
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
            0
        }
        fn reset(&mut self) {}
        fn tick(&mut self, _now_ms: f64) {}
        fn render(&self, _ctx: &web_sys::CanvasRenderingContext2d, _now_ms: f64) -> starfolio::error::Result<()> {
            Ok(())
        }
        fn pointer(&mut self, event: Pointer) {
            self.seen.borrow_mut().push(event);
        }
    }

    fn mouse(kind: &str) -> web_sys::MouseEvent {
        web_sys::MouseEvent::new(kind).unwrap()
    }

    #[wasm_bindgen_test]
    fn release_off_the_canvas_reaches_the_game() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let game = Recorder { phase: GamePhase::Idle, seen: seen.clone() };
        let mut handle = runner::mount("recorder-canvas", game).unwrap();
        let win = web_sys::window().unwrap();
        let canvas = win.document().unwrap().get_element_by_id("recorder-canvas").unwrap();

        // Ignored until the game runs.
        canvas.dispatch_event(&mouse("mousedown")).unwrap();
        assert!(seen.borrow().is_empty());

        handle.start();
        canvas.dispatch_event(&mouse("mousedown")).unwrap();
        win.dispatch_event(&mouse("mouseup")).unwrap();
        assert!(matches!(seen.borrow().as_slice(), [Pointer::Down(..), Pointer::Up(..)]));

        handle.toggle_pause();
        canvas.dispatch_event(&mouse("mousedown")).unwrap();
        win.dispatch_event(&mouse("mouseup")).unwrap();
        assert_eq!(seen.borrow().len(), 3);
        assert!(matches!(seen.borrow().last(), Some(Pointer::Up(..))));

        handle.destroy();
        canvas.remove();
    }
}
