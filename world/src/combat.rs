//! Projectile kinematics and cosmetic particles.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use sky_bridge_siege_core::{
    ParticleSnapshot, ProjectileId, ProjectileKind, ProjectileSnapshot, Vec3, WORLD_HALF_EXTENT,
};

/// Distance below which a bullet hits an enemy.
pub(crate) const HIT_RADIUS: f32 = 20.0;

const PARTICLES_PER_EXPLOSION: usize = 30;
const PARTICLE_LIFETIME: f32 = 1.0;
const PARTICLE_GRAVITY: f32 = 80.0;
const PARTICLE_SPREAD: f32 = 50.0;
const PARTICLE_MIN_LIFT: f32 = 10.0;
const PARTICLE_MAX_LIFT: f32 = 150.0;

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) kind: ProjectileKind,
}

impl Projectile {
    /// Integrates the projectile and reports whether it is still inside the world.
    pub(crate) fn advance(&mut self, dt: f32, grenade_gravity: f32) -> bool {
        self.position += self.velocity * dt;
        if self.kind == ProjectileKind::Grenade {
            self.velocity.z -= grenade_gravity * dt;
        }
        self.in_bounds()
    }

    fn in_bounds(&self) -> bool {
        self.position.x.abs() <= WORLD_HALF_EXTENT
            && self.position.y.abs() <= WORLD_HALF_EXTENT
            && self.position.z >= 0.0
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            kind: self.kind,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Particle {
    position: Vec3,
    velocity: Vec3,
    color: [f32; 3],
    remaining: f32,
}

impl Particle {
    /// Integrates the particle and reports whether it is still alive.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        self.position += self.velocity * dt;
        self.velocity.z -= PARTICLE_GRAVITY * dt;
        self.remaining -= dt;
        self.remaining > 0.0
    }

    pub(crate) fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            position: self.position,
            color: self.color,
            remaining: self.remaining,
        }
    }
}

/// Fire-colored debris burst emitted by every explosion.
pub(crate) fn burst(center: Vec3, rng: &mut ChaCha8Rng) -> impl Iterator<Item = Particle> + '_ {
    (0..PARTICLES_PER_EXPLOSION).map(move |_| Particle {
        position: center,
        velocity: Vec3::new(
            rng.gen_range(-PARTICLE_SPREAD..=PARTICLE_SPREAD),
            rng.gen_range(-PARTICLE_SPREAD..=PARTICLE_SPREAD),
            rng.gen_range(PARTICLE_MIN_LIFT..=PARTICLE_MAX_LIFT),
        ),
        color: [1.0, rng.gen_range(0.0..=1.0), 0.0],
        remaining: PARTICLE_LIFETIME,
    })
}
