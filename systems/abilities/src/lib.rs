#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reward rules that unlock grenade refills and the nuke.

use sky_bridge_siege_core::{CombatCounters, Command};

/// Configuration parameters required to construct the ability economy.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    refill_kill_threshold: u32,
    grenade_cap: u32,
    nuke_killstreak_threshold: u32,
}

impl Config {
    /// Creates a new configuration from the reward thresholds and the grenade cap.
    #[must_use]
    pub const fn new(
        refill_kill_threshold: u32,
        grenade_cap: u32,
        nuke_killstreak_threshold: u32,
    ) -> Self {
        Self {
            refill_kill_threshold,
            grenade_cap,
            nuke_killstreak_threshold,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(10, 2, 20)
    }
}

/// Pure system translating combat counters into ability grants.
#[derive(Debug)]
pub struct Abilities {
    config: Config,
}

impl Abilities {
    /// Creates a new ability economy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits grant commands for every reward whose threshold is met.
    ///
    /// Grenades are only refilled while below the cap and the nuke is only
    /// armed while it is not already available.
    pub fn handle(&self, counters: &CombatCounters, out: &mut Vec<Command>) {
        if counters.kills_without_damage >= self.config.refill_kill_threshold
            && counters.grenades < self.config.grenade_cap
        {
            out.push(Command::RefillGrenades {
                cap: self.config.grenade_cap,
            });
        }

        if counters.killstreak >= self.config.nuke_killstreak_threshold
            && !counters.nuke_available
        {
            out.push(Command::ArmNuke);
        }
    }
}
