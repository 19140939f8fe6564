#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame orchestration that drives the world and every system in a fixed order.

mod config;

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use sky_bridge_siege_core::{Action, Command, Control, Event, Toggle, Vec3, ENEMY_FLOOR};
use sky_bridge_siege_system_abilities::{self as abilities, Abilities};
use sky_bridge_siege_system_auto_aim::{self as auto_aim, AutoAim};
use sky_bridge_siege_system_enemy_spawning::{self as enemy_spawning, EnemySpawning};
use sky_bridge_siege_system_piece_generator::{self as piece_generator, PieceGenerator};
use sky_bridge_siege_system_slice_targeting::SliceTargeting;
use sky_bridge_siege_world::{self as world, query, World};

pub use config::{
    CombatSection, ConfigError, EnemySection, GameConfig, PieceSection, PlayerSection,
};

const PIECE_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;
const ENEMY_STREAM: u64 = 0xd1b5_4a32_d192_ed03;

/// Owns the world and its systems and advances them one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    piece_generator: PieceGenerator,
    enemy_spawning: EnemySpawning,
    auto_aim: AutoAim,
    slice_targeting: SliceTargeting,
    abilities: Abilities,
}

impl Simulation {
    /// Validates the configuration and builds a fresh session.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let world = World::new(world::Config {
            fall_speed: config.piece.fall_speed,
            lock_delay: config.lock_delay(),
            enemy_speed: config.enemy.speed,
            bullet_speed: config.combat.bullet_speed,
            grenade_speed: config.combat.grenade_speed,
            grenade_lift: config.combat.grenade_lift,
            grenade_gravity: config.combat.grenade_gravity,
            player_move_speed: config.player.move_speed,
            player_turn_speed: config.player.turn_speed,
            rng_seed: config.seed,
        });
        let piece_generator = PieceGenerator::new(piece_generator::Config::new(
            config.spawn_interval(),
            config.piece.perfect_floor_probability,
            config.seed ^ PIECE_STREAM,
        ));
        let enemy_spawning = EnemySpawning::new(enemy_spawning::Config::new(
            ENEMY_FLOOR,
            config.seed ^ ENEMY_STREAM,
        ));
        let auto_aim = AutoAim::new(auto_aim::Config::new(config.cheat_fire_interval()));

        tracing::info!(seed = config.seed, "simulation created");

        Ok(Self {
            world,
            piece_generator,
            enemy_spawning,
            auto_aim,
            slice_targeting: SliceTargeting::new(),
            abilities: Abilities::new(abilities::Config::default()),
        })
    }

    /// Read-only access to the authoritative world for presentation.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Records whether a continuous control is currently held.
    pub fn set_control(&mut self, control: Control, held: bool) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::SetControl { control, held }, &mut events);
    }

    /// Executes a discrete player action and returns the events it produced.
    pub fn trigger(&mut self, action: Action) -> Vec<Event> {
        let mut events = Vec::new();
        let command = match action {
            Action::Fire => Command::FireBullet,
            Action::Grenade => Command::ThrowGrenade,
            Action::Nuke => Command::UseNuke,
            Action::Pause => Command::Toggle {
                toggle: Toggle::Pause,
            },
            Action::ToggleCheat => Command::Toggle {
                toggle: Toggle::CheatMode,
            },
            Action::ToggleSlice => Command::Toggle {
                toggle: Toggle::SliceMode,
            },
            Action::ToggleDebug => Command::Toggle {
                toggle: Toggle::Debug,
            },
            Action::ToggleCamera => Command::Toggle {
                toggle: Toggle::FirstPerson,
            },
            Action::Restart => {
                self.restart_into(&mut events);
                return events;
            }
            Action::PrimaryClick => {
                if !query::toggles(&self.world).slice_mode {
                    Command::FireBullet
                } else {
                    self.retarget_slice(&mut events);
                    match query::hovered_layer(&self.world) {
                        Some(layer) => Command::SliceLayer { layer },
                        None => {
                            tracing::debug!("slice requested without a target layer");
                            return events;
                        }
                    }
                }
            }
        };
        world::apply(&mut self.world, command, &mut events);
        events
    }

    /// Advances the session by one frame and returns every event it produced.
    ///
    /// Nothing moves while the game is paused or over.
    pub fn step(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        if query::is_frozen(&self.world) {
            return events;
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let clock = events.clone();
        let mut commands = Vec::new();

        self.auto_aim.handle(
            &clock,
            &query::toggles(&self.world),
            &query::player(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        self.submit(&mut commands, &mut events);

        self.retarget_slice(&mut events);

        let piece_active = query::has_active_piece(&self.world);
        self.piece_generator.handle(
            &clock,
            piece_active,
            query::counters(&self.world).nuke_active,
            &mut commands,
        );
        if piece_active {
            commands.push(Command::AdvancePiece { dt });
        }
        commands.push(Command::AdvanceProjectiles { dt });
        commands.push(Command::AdvanceEnemies { dt });
        self.submit(&mut commands, &mut events);

        self.enemy_spawning.handle(
            query::enemy_count(&self.world),
            &query::toggles(&self.world),
            query::counters(&self.world).nuke_active,
            &mut commands,
        );
        commands.extend([
            Command::AdvanceNuke { dt },
            Command::AdvanceParticles { dt },
            Command::ResolveHits,
        ]);
        self.submit(&mut commands, &mut events);

        self.abilities
            .handle(&query::counters(&self.world), &mut commands);
        self.submit(&mut commands, &mut events);

        events
    }

    /// Starts a new session while keeping the configuration and random streams.
    pub fn restart(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.restart_into(&mut events);
        events
    }

    /// Digest of the observable world state, used to compare replays.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        let world = &self.world;

        query::tick_index(world).hash(&mut hasher);
        query::grid(world).hash(&mut hasher);
        query::tower_height(world).hash(&mut hasher);
        query::counters(world).hash(&mut hasher);
        query::toggles(world).hash(&mut hasher);
        query::hovered_layer(world).hash(&mut hasher);

        if let Some(piece) = query::active_piece(world) {
            (piece.shape, piece.rotation, piece.x, piece.y, piece.color).hash(&mut hasher);
            (piece.z.to_bits(), piece.lock_timer, piece.phase).hash(&mut hasher);
        }
        for enemy in query::enemy_view(world).iter() {
            (enemy.id, enemy.state, enemy.speed.to_bits()).hash(&mut hasher);
            hash_vec(enemy.position, &mut hasher);
        }
        for projectile in query::projectiles(world) {
            (projectile.id, projectile.kind).hash(&mut hasher);
            hash_vec(projectile.position, &mut hasher);
            hash_vec(projectile.velocity, &mut hasher);
        }
        for particle in query::particles(world) {
            hash_vec(particle.position, &mut hasher);
        }
        if let Some(nuke) = query::nuke(world) {
            hash_vec(nuke.position, &mut hasher);
            nuke.scale.to_bits().hash(&mut hasher);
        }
        let player = query::player(world);
        hash_vec(player.position, &mut hasher);
        (player.yaw_degrees.to_bits(), player.pitch_degrees.to_bits()).hash(&mut hasher);

        hasher.finish()
    }

    fn restart_into(&mut self, events: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::Restart, events);
        self.piece_generator.reset();
        self.auto_aim.reset();
    }

    fn retarget_slice(&mut self, events: &mut Vec<Event>) {
        let mut commands = Vec::new();
        self.slice_targeting.handle(
            &query::toggles(&self.world),
            &query::player(&self.world),
            query::grid(&self.world),
            query::tower_height(&self.world),
            &mut commands,
        );
        self.submit(&mut commands, events);
    }

    fn submit(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn hash_vec(value: Vec3, hasher: &mut DefaultHasher) {
    value.to_array().map(f32::to_bits).hash(hasher);
}
