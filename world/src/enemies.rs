//! Enemy state machine: approach the wall, climb it, then chase the player.

use sky_bridge_siege_core::{
    EnemyId, EnemySnapshot, EnemyState, Vec3, ENEMY_FLOOR, TOWER_CENTER_X, TOWER_CENTER_Y,
    WALL_FRONT_FACE, WALL_HEIGHT,
};

/// Distance at which an enemy snaps onto its current waypoint.
const SNAP_DISTANCE: f32 = 5.0;
/// Horizontal distance at which a pursuing enemy damages the player.
pub(crate) const CONTACT_RADIUS: f32 = 20.0;
/// Ring radius used for the opening wave.
const WAVE_RADIUS: f32 = 100.0;
/// Ring radius used when refilling the population.
pub(crate) const REFILL_RADIUS: f32 = 120.0;

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) position: Vec3,
    pub(crate) state: EnemyState,
    pub(crate) speed: f32,
}

/// Outcome of advancing a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyStep {
    Moved,
    ReachedPlayer,
}

impl Enemy {
    pub(crate) fn on_ring(id: EnemyId, angle: f32, radius: f32, speed: f32) -> Self {
        Self {
            id,
            position: ring_position(angle, radius),
            state: EnemyState::Approaching,
            speed,
        }
    }

    /// Advances the enemy by at most one state transition.
    pub(crate) fn advance(&mut self, dt: f32, player: Vec3) -> EnemyStep {
        let travel = self.speed * dt;
        match self.state {
            EnemyState::Approaching => {
                let dy = WALL_FRONT_FACE - self.position.y;
                if dy.abs() > SNAP_DISTANCE {
                    self.position.y += dy.signum() * travel;
                } else {
                    self.position.y = WALL_FRONT_FACE;
                    self.state = EnemyState::Climbing;
                }
                EnemyStep::Moved
            }
            EnemyState::Climbing => {
                if (WALL_HEIGHT - self.position.z).abs() > SNAP_DISTANCE {
                    self.position.z += travel;
                } else {
                    self.position.z = WALL_HEIGHT;
                    self.state = EnemyState::Pursuing;
                }
                EnemyStep::Moved
            }
            EnemyState::Pursuing => {
                let dx = player.x - self.position.x;
                let dy = player.y - self.position.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance > SNAP_DISTANCE {
                    self.position.x += dx / distance * travel;
                    self.position.y += dy / distance * travel;
                }
                if distance < CONTACT_RADIUS {
                    EnemyStep::ReachedPlayer
                } else {
                    EnemyStep::Moved
                }
            }
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            state: self.state,
            speed: self.speed,
        }
    }
}

/// Ground position on a ring around the tower centre.
pub(crate) fn ring_position(angle: f32, radius: f32) -> Vec3 {
    Vec3::new(
        TOWER_CENTER_X + angle.cos() * radius,
        TOWER_CENTER_Y + angle.sin() * radius,
        0.0,
    )
}

/// Evenly spaced angles for the opening wave.
pub(crate) fn opening_wave() -> impl Iterator<Item = (f32, f32)> {
    (0..ENEMY_FLOOR).map(|index| {
        let angle = index as f32 / ENEMY_FLOOR as f32 * std::f32::consts::TAU;
        (angle, WAVE_RADIUS)
    })
}
