#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population maintenance that keeps the enemy count at its floor.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sky_bridge_siege_core::{Command, ToggleState, ENEMY_FLOOR};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    population_floor: usize,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided population floor and seed.
    #[must_use]
    pub const fn new(population_floor: usize, rng_seed: u64) -> Self {
        Self {
            population_floor,
            rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(ENEMY_FLOOR, 0x0e5e_a11e_d0c0_ffee)
    }
}

/// Pure system that backfills enemies at random angles around the tower.
#[derive(Debug)]
pub struct EnemySpawning {
    population_floor: usize,
    rng: ChaCha8Rng,
}

impl EnemySpawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            population_floor: config.population_floor,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits one spawn command per missing enemy.
    ///
    /// Nothing is emitted once the game is over or while a nuke is active.
    pub fn handle(
        &mut self,
        enemy_count: usize,
        toggles: &ToggleState,
        nuke_active: bool,
        out: &mut Vec<Command>,
    ) {
        if toggles.game_over.is_some() || nuke_active {
            return;
        }

        for _ in enemy_count..self.population_floor {
            out.push(Command::SpawnEnemy {
                angle: self.rng.gen_range(0.0..TAU),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_population_emits_nothing() {
        let mut spawning = EnemySpawning::new(Config::default());
        let mut commands = Vec::new();
        spawning.handle(ENEMY_FLOOR + 2, &ToggleState::default(), false, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn angles_cover_the_full_ring() {
        let mut spawning = EnemySpawning::new(Config::new(64, 17));
        let mut commands = Vec::new();
        spawning.handle(0, &ToggleState::default(), false, &mut commands);
        assert_eq!(commands.len(), 64);
        for command in commands {
            match command {
                Command::SpawnEnemy { angle } => assert!((0.0..TAU).contains(&angle)),
                other => panic!("unexpected command emitted: {other:?}"),
            }
        }
    }
}
