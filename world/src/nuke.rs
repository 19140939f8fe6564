//! Descending fireball left behind by the nuke ability.

use sky_bridge_siege_core::{NukeSnapshot, Vec3, TOWER_CENTER_X, TOWER_CENTER_Y};

const DURATION: f32 = 3.0;
const START_HEIGHT: f32 = 500.0;
const GROWTH_RATE: f32 = 300.0;
const DESCENT_RATE: f32 = 300.0;
/// Radius of the explosion fired every tick while the effect runs.
pub(crate) const BLAST_RADIUS: f32 = 300.0;

#[derive(Clone, Debug)]
pub(crate) struct NukeEffect {
    position: Vec3,
    scale: f32,
    remaining: f32,
}

impl NukeEffect {
    pub(crate) fn detonate() -> Self {
        Self {
            position: Vec3::new(TOWER_CENTER_X, TOWER_CENTER_Y, START_HEIGHT),
            scale: 0.0,
            remaining: DURATION,
        }
    }

    /// Advances the fireball and reports whether it is still burning.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.scale += GROWTH_RATE * dt;
        if self.position.z > 0.0 {
            self.position.z = (self.position.z - DESCENT_RATE * dt).max(0.0);
        }
        self.remaining > 0.0
    }

    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn snapshot(&self) -> NukeSnapshot {
        NukeSnapshot {
            position: self.position,
            scale: self.scale,
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fireball_grows_descends_and_burns_out() {
        let mut nuke = NukeEffect::detonate();
        assert!(nuke.advance(1.0));
        assert!((nuke.position().z - 200.0).abs() < f32::EPSILON);
        assert!((nuke.snapshot().scale - 300.0).abs() < f32::EPSILON);

        assert!(nuke.advance(1.0));
        assert!(nuke.position().z.abs() < f32::EPSILON);

        assert!(!nuke.advance(1.0));
        assert!(nuke.position().z >= 0.0);
    }
}
