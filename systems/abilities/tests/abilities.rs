use std::time::Duration;

use sky_bridge_siege_core::{Command, Event};
use sky_bridge_siege_system_abilities::{Abilities, Config};
use sky_bridge_siege_world::{self as world, query, World};

const FRAME: Duration = Duration::from_micros(15_625);

fn shoot_nearest(world: &mut World, events: &mut Vec<Event>) {
    let player = query::player(world).position;
    let target = query::enemy_view(world)
        .iter()
        .next()
        .map(|enemy| enemy.position)
        .expect("an enemy to shoot at");

    let offset = target - player;
    let horizontal = (offset.x * offset.x + offset.y * offset.y).sqrt();
    world::apply(
        world,
        Command::Aim {
            yaw_degrees: offset.y.atan2(offset.x).to_degrees(),
            pitch_degrees: offset.z.atan2(horizontal).to_degrees(),
        },
        events,
    );
    world::apply(world, Command::FireBullet, events);

    for _ in 0..400 {
        world::apply(world, Command::AdvanceProjectiles { dt: FRAME }, events);
        world::apply(world, Command::ResolveHits, events);
        if query::projectiles(world).is_empty() {
            break;
        }
    }
}

fn grant(world: &mut World, abilities: &Abilities, events: &mut Vec<Event>) {
    let mut commands = Vec::new();
    abilities.handle(&query::counters(world), &mut commands);
    for command in commands {
        world::apply(world, command, events);
    }
}

fn kill(world: &mut World, abilities: &Abilities, count: u32, events: &mut Vec<Event>) {
    for shot in 0..count {
        let before = query::counters(world).killstreak;
        shoot_nearest(world, events);
        assert_eq!(query::counters(world).killstreak, before + 1, "shot {shot} missed");
        world::apply(
            world,
            Command::SpawnEnemy {
                angle: shot as f32 * 0.7,
            },
            events,
        );
        grant(world, abilities, events);
    }
}

#[test]
fn ten_clean_kills_refill_the_grenades() {
    let mut world = World::default();
    let abilities = Abilities::new(Config::default());
    let mut events = Vec::new();

    kill(&mut world, &abilities, 9, &mut events);
    assert_eq!(query::counters(&world).grenades, 0);
    assert_eq!(query::counters(&world).kills_without_damage, 9);

    kill(&mut world, &abilities, 1, &mut events);
    let counters = query::counters(&world);
    assert_eq!(counters.grenades, 2);
    assert_eq!(counters.kills_without_damage, 0);
    assert_eq!(counters.killstreak, 10);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::GrenadesRefilled { grenades: 2 }))
            .count(),
        1
    );
}

#[test]
fn a_twenty_kill_streak_arms_the_nuke_once() {
    let mut world = World::default();
    let abilities = Abilities::new(Config::default());
    let mut events = Vec::new();

    kill(&mut world, &abilities, 19, &mut events);
    assert!(!query::counters(&world).nuke_available);

    kill(&mut world, &abilities, 2, &mut events);
    let counters = query::counters(&world);
    assert!(counters.nuke_available);
    assert_eq!(counters.score, 210);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::NukeArmed))
            .count(),
        1
    );

    events.clear();
    world::apply(&mut world, Command::UseNuke, &mut events);
    assert!(query::counters(&world).nuke_active);
    assert!(!query::counters(&world).nuke_available);
    assert_eq!(query::enemy_count(&world), 0);
}
