// Integration tests (native) for the `starfolio` crate.
// These drive the pure simulation and layout code through the public API, so
// they run under `cargo test` on the host without a browser.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use starfolio::dom::{MemoryStore, PreferenceStore};
use starfolio::games::penalty::{Penalty, Shot, SPOT};
use starfolio::games::runner::Driver;
use starfolio::games::shooter::Shooter;
use starfolio::games::{CanvasGame, GamePhase, Pointer};
use starfolio::i18n::{Language, LanguageSwitcher, PREFERENCE_KEY};
use starfolio::wordcloud::{self, PlacementKind};

// Feed the driver frames `step_ms` apart until `until_ms`.
fn run(driver: &mut Driver, game: &mut dyn CanvasGame, from: f64, until: f64, step: f64) {
    let mut ts = from;
    while ts <= until {
        driver.frame(game, ts);
        ts += step;
    }
}

#[test]
fn idle_player_is_overrun_in_the_shooter() {
    let mut game = Shooter::new(SmallRng::seed_from_u64(42));
    let mut driver = Driver::default();
    run(&mut driver, &mut game, 0.0, 1000.0, 100.0);
    assert_eq!(game.phase(), GamePhase::Idle);
    assert!(game.enemies.is_empty());

    game.start();
    run(&mut driver, &mut game, 1100.0, 21_000.0, 100.0);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(game.health <= 0);
    assert_eq!(game.score(), 0);
    assert_eq!(game.wave, 1);
}

#[test]
fn penalty_round_trip_through_the_driver() {
    let mut game = Penalty::new(SmallRng::seed_from_u64(9));
    let mut driver = Driver::default();
    game.start();
    run(&mut driver, &mut game, 0.0, 100.0, 50.0);

    game.pointer(Pointer::Down(SPOT.0, SPOT.1));
    assert!(matches!(game.shot, Shot::Charging { .. }));
    run(&mut driver, &mut game, 150.0, 400.0, 50.0);
    assert_eq!(game.power(), 30);

    game.pointer(Pointer::Up(SPOT.0, SPOT.1));
    assert_eq!(game.attempts, 1);
    run(&mut driver, &mut game, 450.0, 4000.0, 50.0);
    assert_eq!(game.shot, Shot::Ready);
    assert_eq!(game.ball, SPOT);
    assert!(game.goals <= 1);
    assert_eq!(game.rate(), game.goals * 100);
    // Penalty never ends on its own.
    assert_eq!(game.phase(), GamePhase::Running);
}

#[test]
fn language_choice_survives_a_reload() {
    let mut first = LanguageSwitcher::new(MemoryStore::default(), Language::Pt);
    first.change("es").unwrap();
    let store = first.into_store();
    assert_eq!(store.get(PREFERENCE_KEY).as_deref(), Some("es"));

    let reloaded = LanguageSwitcher::new(store, Language::Pt);
    assert_eq!(reloaded.current(), Language::Es);
    assert_eq!(reloaded.t("contact-us"), "Contáctame");
}

#[test]
fn desktop_cloud_keeps_labels_apart_in_narrow_containers() {
    let sizes: Vec<(f64, f64)> = wordcloud::DEFAULT_SKILLS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let rem = wordcloud::font_size_rem(i, false);
            (label.len() as f64 * 8.5 * rem, 22.0 * rem)
        })
        .collect();
    for (w, h) in [(420.0, 700.0), (640.0, 360.0), (1000.0, 420.0)] {
        let placed = wordcloud::layout(&sizes, w, h, false);
        assert_eq!(placed.len(), sizes.len());
        let spiral: Vec<_> = placed.iter().filter(|p| p.kind == PlacementKind::Spiral).collect();
        for (i, a) in spiral.iter().enumerate() {
            for b in &spiral[i + 1..] {
                assert!(!a.rect.overlaps(&b.rect), "overlap in {w}x{h}");
            }
        }
        for p in &placed {
            assert!(p.rect.x >= 0.0 && p.rect.y >= 0.0, "label outside {w}x{h}: {p:?}");
        }
    }
}

#[test]
fn mobile_cloud_uses_fixed_slots() {
    let sizes = vec![(60.0, 14.0); 20];
    let placed = wordcloud::layout(&sizes, 340.0, 400.0, true);
    assert!(placed.iter().all(|p| p.kind == PlacementKind::Slot));
}
