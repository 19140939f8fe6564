#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Aim assist that locks onto the nearest enemy and fires on a fixed cadence.

use std::time::Duration;

use sky_bridge_siege_core::{
    Command, EnemyId, EnemyView, Event, PlayerSnapshot, ToggleState, Vec3,
};

/// Configuration parameters required to construct the aim assist.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    fire_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided fire cadence.
    #[must_use]
    pub const fn new(fire_interval: Duration) -> Self {
        Self { fire_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(150))
    }
}

/// Pure system that steers the aim toward the closest enemy while cheat mode is on.
#[derive(Debug)]
pub struct AutoAim {
    fire_interval: Duration,
    since_last_shot: Option<Duration>,
}

impl AutoAim {
    /// Creates a new aim assist using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            fire_interval: config.fire_interval,
            since_last_shot: None,
        }
    }

    /// Emits an aim command toward the nearest enemy and a shot whenever the
    /// cadence allows one.
    pub fn handle(
        &mut self,
        events: &[Event],
        toggles: &ToggleState,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if let Some(elapsed) = self.since_last_shot.as_mut() {
            for event in events {
                if let Event::TimeAdvanced { dt } = event {
                    *elapsed = elapsed.saturating_add(*dt);
                }
            }
        }

        if !toggles.cheat_mode || toggles.game_over.is_some() {
            return;
        }

        let Some(target) = nearest_enemy(player.position, enemies) else {
            return;
        };

        let offset = target.position - player.position;
        let horizontal = offset.x.hypot(offset.y);
        out.push(Command::Aim {
            yaw_degrees: offset.y.atan2(offset.x).to_degrees(),
            pitch_degrees: offset.z.atan2(horizontal).to_degrees(),
        });

        let ready = self
            .since_last_shot
            .map_or(true, |elapsed| elapsed > self.fire_interval);
        if ready {
            out.push(Command::FireBullet);
            self.since_last_shot = Some(Duration::ZERO);
        }
    }

    /// Forgets the fire cadence so the next assisted frame shoots immediately.
    pub fn reset(&mut self) {
        self.since_last_shot = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    position: Vec3,
    distance_sq: f32,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        self.id < other.id
    }
}

fn nearest_enemy(origin: Vec3, enemies: &EnemyView) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for enemy in enemies.iter() {
        let current = Candidate {
            id: enemy.id,
            position: enemy.position,
            distance_sq: enemy.position.distance_squared(origin),
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }
    best
}
