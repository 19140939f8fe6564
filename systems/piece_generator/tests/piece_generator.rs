use std::time::Duration;

use sky_bridge_siege_core::{piece_cells, Command, Event, PieceOrder, Rotation, ShapeKind};
use sky_bridge_siege_system_piece_generator::{Config, PieceGenerator, BATCH_SIZE};
use sky_bridge_siege_world::TowerGrid;

fn tick(millis: u64) -> Vec<Event> {
    vec![Event::TimeAdvanced {
        dt: Duration::from_millis(millis),
    }]
}

fn spawned(commands: &[Command]) -> Vec<PieceOrder> {
    commands
        .iter()
        .map(|command| match command {
            Command::SpawnPiece { order } => *order,
            other => panic!("unexpected command emitted: {other:?}"),
        })
        .collect()
}

#[test]
fn perfect_floor_batches_tile_a_whole_layer() {
    for seed in 0..16 {
        let mut generator = PieceGenerator::new(Config::new(Duration::from_secs(1), 1.0, seed));
        let batch: Vec<_> = (0..BATCH_SIZE).map(|_| generator.next_order()).collect();
        let shape = batch[0].shape;
        assert!(matches!(shape, ShapeKind::O | ShapeKind::I));
        assert!(batch.iter().all(|order| order.shape == shape));

        let mut grid = TowerGrid::new();
        for order in &batch {
            let cells = piece_cells(order.shape, Rotation::Identity, order.x, order.y, 0.0);
            assert!(!grid.collides(&cells), "seed {seed}: pieces overlap");
            assert!(grid.place(&cells, 0, order.color));
        }
        assert!(grid.is_layer_solid(0), "seed {seed}: floor not covered");
        assert_eq!(generator.queued(), 0);
    }
}

#[test]
fn seeded_generators_replay_identically() {
    let config = Config::new(Duration::from_secs(1), 0.95, 0xfeed_beef);
    let mut first = PieceGenerator::new(config);
    let mut second = PieceGenerator::new(config);

    let first_orders: Vec<_> = (0..64).map(|_| first.next_order()).collect();
    let second_orders: Vec<_> = (0..64).map(|_| second.next_order()).collect();

    assert_eq!(first_orders, second_orders);
    assert!(first_orders.iter().all(|order| order.color.get() < 7));
}

#[test]
fn spawns_only_after_the_interval_elapses_without_a_piece() {
    let mut generator = PieceGenerator::new(Config::new(Duration::from_secs(1), 1.0, 3));
    let mut commands = Vec::new();

    generator.handle(&tick(600), false, false, &mut commands);
    generator.handle(&tick(400), false, false, &mut commands);
    assert!(commands.is_empty(), "the interval must be exceeded, not met");

    generator.handle(&tick(100), false, false, &mut commands);
    assert_eq!(spawned(&commands).len(), 1);

    commands.clear();
    generator.handle(&tick(900), false, false, &mut commands);
    generator.handle(&tick(900), true, false, &mut commands);
    generator.handle(&tick(900), false, false, &mut commands);
    assert!(commands.is_empty(), "an active piece resets the timer");
}

#[test]
fn nuke_suppresses_the_spawn_but_still_resets_the_timer() {
    let mut generator = PieceGenerator::new(Config::new(Duration::from_secs(1), 1.0, 9));
    let mut commands = Vec::new();

    generator.handle(&tick(1_500), false, true, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(generator.queued(), 0, "suppressed attempts never pop the queue");

    generator.handle(&tick(500), false, false, &mut commands);
    assert!(commands.is_empty());

    generator.handle(&tick(600), false, false, &mut commands);
    assert_eq!(spawned(&commands).len(), 1);
    assert_eq!(generator.queued(), BATCH_SIZE - 1);
}

#[test]
fn reset_discards_the_pending_batch() {
    let mut generator = PieceGenerator::new(Config::new(Duration::from_secs(1), 1.0, 21));
    let _ = generator.next_order();
    assert_eq!(generator.queued(), BATCH_SIZE - 1);

    generator.reset();
    assert_eq!(generator.queued(), 0);
}
