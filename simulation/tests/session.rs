use std::time::Duration;

use sky_bridge_siege_core::{Action, Event};
use sky_bridge_siege_simulation::{GameConfig, Simulation};
use sky_bridge_siege_world::query;

const FRAME: Duration = Duration::from_micros(15_625);

fn run(simulation: &mut Simulation, frames: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..frames {
        events.extend(simulation.step(FRAME));
    }
    events
}

#[test]
fn the_first_piece_spawns_after_the_interval_and_locks() {
    let mut config = GameConfig::default();
    config.piece.perfect_floor_probability = 1.0;
    config.piece.fall_speed = 8.0;
    let mut simulation = Simulation::new(config).expect("valid configuration");

    let early = run(&mut simulation, 64);
    assert!(
        !early
            .iter()
            .any(|event| matches!(event, Event::PieceSpawned { .. })),
        "exactly one second has not exceeded the interval"
    );

    let later = run(&mut simulation, 136);
    let spawned = later
        .iter()
        .position(|event| matches!(event, Event::PieceSpawned { .. }))
        .expect("a piece spawns once the interval is exceeded");
    let locked = later
        .iter()
        .position(|event| matches!(event, Event::PieceLocked { layer: 0, .. }))
        .expect("the piece lands on the floor and locks");
    assert!(spawned < locked);
    assert_eq!(query::tower_height(simulation.world()), 1);
}

#[test]
fn cheat_mode_shoots_enemies_down() {
    let mut simulation = Simulation::new(GameConfig::default()).expect("valid configuration");
    let _ = simulation.trigger(Action::ToggleCheat);

    let events = run(&mut simulation, 640);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyShot { .. })));
    assert!(query::counters(simulation.world()).score > 0);
}

#[test]
fn restart_returns_to_the_opening_state() {
    let fresh = Simulation::new(GameConfig::default()).expect("valid configuration");
    let mut simulation = Simulation::new(GameConfig::default()).expect("valid configuration");
    let _ = simulation.trigger(Action::ToggleCheat);
    let _ = run(&mut simulation, 300);
    assert_ne!(simulation.fingerprint(), fresh.fingerprint());

    let events = simulation.restart();

    assert_eq!(events, vec![Event::Restarted]);
    assert_eq!(simulation.fingerprint(), fresh.fingerprint());
    assert!(!query::toggles(simulation.world()).cheat_mode);
}

#[test]
fn restart_action_unfreezes_a_paused_game() {
    let mut simulation = Simulation::new(GameConfig::default()).expect("valid configuration");
    let _ = simulation.trigger(Action::Pause);
    assert!(simulation.step(FRAME).is_empty());

    let events = simulation.trigger(Action::Restart);
    assert_eq!(events, vec![Event::Restarted]);
    assert!(!simulation.step(FRAME).is_empty());
}
