#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Sky-Bridge Siege.

mod collapse;
mod combat;
mod enemies;
mod grid;
mod nuke;
mod piece;
mod player;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sky_bridge_siege_core::{
    layer_center_height, CombatCounters, Command, EnemyId, Event, GameOverReason, HeldControls,
    PieceOrder, ProjectileId, ProjectileKind, Toggle, ToggleState, Vec3, TOWER_CENTER_X,
    TOWER_CENTER_Y, TOWER_LIMIT, WELCOME_BANNER,
};

pub use collapse::unstable_layers;
pub use grid::TowerGrid;

use combat::{Particle, Projectile, HIT_RADIUS};
use enemies::{Enemy, EnemyStep, REFILL_RADIUS};
use nuke::NukeEffect;
use piece::{ActivePiece, PieceStep};
use player::Player;

const STARTING_LIVES: u32 = 5;
const COLLAPSE_BLAST_RADIUS: f32 = 100.0;
const SLICE_BLAST_RADIUS: f32 = 150.0;
const GRENADE_BLAST_RADIUS: f32 = 150.0;
const STRUCTURAL_SCORE: u32 = 50;
const EXPLOSION_KILL_SCORE: u32 = 20;
const DIRECT_HIT_SCORE: u32 = 10;

/// Tuning knobs consumed by the authoritative world.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Active-piece gravity in layers per second.
    pub fall_speed: f32,
    /// Time a blocked piece waits before it locks.
    pub lock_delay: Duration,
    /// Enemy movement speed in world units per second.
    pub enemy_speed: f32,
    /// Bullet speed in world units per second.
    pub bullet_speed: f32,
    /// Grenade launch speed along the aim.
    pub grenade_speed: f32,
    /// Extra upward launch velocity given to grenades.
    pub grenade_lift: f32,
    /// Downward acceleration applied to grenades.
    pub grenade_gravity: f32,
    /// Player walking speed in world units per second.
    pub player_move_speed: f32,
    /// Aim turn rate in degrees per second.
    pub player_turn_speed: f32,
    /// Seed for enemy placement and explosion debris.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fall_speed: 60.0,
            lock_delay: Duration::from_millis(500),
            enemy_speed: 80.0,
            bullet_speed: 400.0,
            grenade_speed: 300.0,
            grenade_lift: 200.0,
            grenade_gravity: 500.0,
            player_move_speed: 150.0,
            player_turn_speed: 120.0,
            rng_seed: 0x5b1d_6e5e_17a3_c0de,
        }
    }
}

/// Represents the authoritative Sky-Bridge Siege world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    grid: TowerGrid,
    tower_height: u32,
    piece: Option<ActivePiece>,
    player: Player,
    held: HeldControls,
    toggles: ToggleState,
    counters: CombatCounters,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    particles: Vec<Particle>,
    nuke: Option<NukeEffect>,
    hovered_layer: Option<u32>,
    next_enemy_id: u32,
    next_projectile_id: u32,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl World {
    /// Creates a new world with the opening enemy wave in place.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self::with_rng(config, rng)
    }

    fn with_rng(config: Config, rng: ChaCha8Rng) -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            config,
            grid: TowerGrid::new(),
            tower_height: 0,
            piece: None,
            player: Player::new(),
            held: HeldControls::default(),
            toggles: ToggleState::default(),
            counters: CombatCounters {
                lives: STARTING_LIVES,
                ..CombatCounters::default()
            },
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            nuke: None,
            hovered_layer: None,
            next_enemy_id: 0,
            next_projectile_id: 0,
            rng,
            tick_index: 0,
        };
        for (angle, radius) in enemies::opening_wave() {
            let _ = world.add_enemy(angle, radius);
        }
        world
    }

    fn is_frozen(&self) -> bool {
        self.toggles.paused || self.toggles.game_over.is_some()
    }

    /// Pause stops everything. Game over only stops new input, so the frame
    /// that ended the game still runs its remaining advance commands.
    fn accepts(&self, command: &Command) -> bool {
        if self.toggles.paused {
            return false;
        }
        self.toggles.game_over.is_none()
            || matches!(
                command,
                Command::AdvancePiece { .. }
                    | Command::AdvanceProjectiles { .. }
                    | Command::AdvanceEnemies { .. }
                    | Command::AdvanceNuke { .. }
                    | Command::AdvanceParticles { .. }
                    | Command::ResolveHits
                    | Command::RefillGrenades { .. }
                    | Command::ArmNuke
            )
    }

    fn add_enemy(&mut self, angle: f32, radius: f32) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        self.enemies
            .push(Enemy::on_ring(id, angle, radius, self.config.enemy_speed));
        id
    }

    fn launch(&mut self, kind: ProjectileKind, out_events: &mut Vec<Event>) {
        let direction = self.player.aim_direction();
        let velocity = match kind {
            ProjectileKind::Bullet => direction * self.config.bullet_speed,
            ProjectileKind::Grenade => {
                direction * self.config.grenade_speed + Vec3::Z * self.config.grenade_lift
            }
        };
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        self.projectiles.push(Projectile {
            id,
            position: self.player.muzzle(),
            velocity,
            kind,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            kind,
        });
    }

    /// Removes every enemy inside the blast and scatters debris.
    fn explode(&mut self, center: Vec3, radius: f32, out_events: &mut Vec<Event>) {
        let before = self.enemies.len();
        self.enemies
            .retain(|enemy| enemy.position.distance(center) >= radius);
        let kills = (before - self.enemies.len()) as u32;

        self.counters.score = self
            .counters
            .score
            .saturating_add(kills.saturating_mul(EXPLOSION_KILL_SCORE));
        self.counters.killstreak = self.counters.killstreak.saturating_add(kills);
        self.particles
            .extend(combat::burst(center, &mut self.rng));
        out_events.push(Event::Exploded {
            center,
            radius,
            kills,
        });
    }

    fn refresh_height(&mut self) {
        self.tower_height = self.grid.height();
    }

    fn end_game(&mut self, reason: GameOverReason, out_events: &mut Vec<Event>) {
        if self.toggles.game_over.is_some() {
            return;
        }
        self.toggles.game_over = Some(reason);
        tracing::info!(
            reason = reason.message(),
            score = self.counters.score,
            "game over"
        );
        out_events.push(Event::GameOver { reason });
    }

    fn spawn_piece(&mut self, order: PieceOrder, out_events: &mut Vec<Event>) {
        if self.piece.is_some() || self.nuke.is_some() {
            return;
        }
        let piece = ActivePiece::spawn(order, self.tower_height);
        tracing::debug!(shape = ?piece.shape(), layer = piece.layer(), "piece spawned");
        out_events.push(Event::PieceSpawned {
            shape: piece.shape(),
            layer: piece.layer(),
        });
        self.piece = Some(piece);
    }

    fn advance_piece(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        let step = piece.step(
            &self.grid,
            dt,
            self.config.fall_speed,
            self.config.lock_delay,
        );
        if step == PieceStep::Lock {
            if let Some(piece) = self.piece.take() {
                self.lock_piece(&piece, out_events);
            }
        }
    }

    fn lock_piece(&mut self, piece: &ActivePiece, out_events: &mut Vec<Event>) {
        let layer = piece.lock_layer();
        let cells = piece.cells_at(layer as f32);
        if !self.grid.place(&cells, layer, piece.color()) {
            tracing::warn!(shape = ?piece.shape(), layer, "lock outside the grid, piece discarded");
            out_events.push(Event::PieceDiscarded {
                shape: piece.shape(),
            });
            return;
        }

        out_events.push(Event::PieceLocked {
            shape: piece.shape(),
            layer: layer as u32,
        });
        self.refresh_height();
        self.collapse_unstable_layers(out_events);

        if self.tower_height >= TOWER_LIMIT {
            self.end_game(GameOverReason::TowerLimit, out_events);
        }
    }

    fn collapse_unstable_layers(&mut self, out_events: &mut Vec<Event>) {
        let unstable = unstable_layers(&self.grid, self.tower_height);
        for layer in unstable.into_iter().rev() {
            tracing::info!(layer, "unstable layer collapsed");
            let center = Vec3::new(TOWER_CENTER_X, TOWER_CENTER_Y, layer_center_height(layer));
            self.explode(center, COLLAPSE_BLAST_RADIUS, out_events);
            self.grid.remove_layer(layer);
            self.counters.score = self.counters.score.saturating_add(STRUCTURAL_SCORE);
            out_events.push(Event::LayerCollapsed { layer });
        }
        self.refresh_height();
    }

    fn slice_layer(&mut self, layer: u32, out_events: &mut Vec<Event>) {
        if layer >= self.tower_height || !self.grid.is_layer_solid(layer) {
            tracing::info!(layer, "slice ignored, layer is not solid");
            out_events.push(Event::SliceRejected { layer });
            return;
        }

        tracing::info!(layer, "solid layer sliced");
        let center = Vec3::new(TOWER_CENTER_X, TOWER_CENTER_Y, layer_center_height(layer));
        self.explode(center, SLICE_BLAST_RADIUS, out_events);
        self.grid.remove_layer(layer);
        self.refresh_height();
        self.counters.score = self.counters.score.saturating_add(STRUCTURAL_SCORE);
        self.hovered_layer = None;
        out_events.push(Event::LayerSliced { layer });
        self.collapse_unstable_layers(out_events);
    }

    fn advance_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let gravity = self.config.grenade_gravity;
        let mut detonations = Vec::new();
        self.projectiles.retain_mut(|projectile| {
            let inside = projectile.advance(dt, gravity);
            if !inside && projectile.kind == ProjectileKind::Grenade {
                detonations.push(Vec3::new(projectile.position.x, projectile.position.y, 0.0));
            }
            inside
        });
        for center in detonations {
            self.explode(center, GRENADE_BLAST_RADIUS, out_events);
        }
    }

    fn advance_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let target = self.player.position;
        let mut contacts = 0_u32;
        self.enemies.retain_mut(|enemy| {
            if enemy.advance(dt, target) == EnemyStep::ReachedPlayer {
                contacts += 1;
                false
            } else {
                true
            }
        });

        for _ in 0..contacts {
            self.counters.lives = self.counters.lives.saturating_sub(1);
            self.counters.kills_without_damage = 0;
            out_events.push(Event::PlayerDamaged {
                lives_remaining: self.counters.lives,
            });
            if self.counters.lives == 0 {
                self.end_game(GameOverReason::KilledByEnemies, out_events);
            }
        }
    }

    fn spawn_enemy(&mut self, angle: f32, out_events: &mut Vec<Event>) {
        if self.nuke.is_some() {
            return;
        }
        let enemy = self.add_enemy(angle, REFILL_RADIUS);
        tracing::debug!(enemy = enemy.get(), angle, "enemy spawned");
        out_events.push(Event::EnemySpawned { enemy });
    }

    fn advance_nuke(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let Some(nuke) = self.nuke.as_mut() else {
            return;
        };
        let burning = nuke.advance(dt);
        let center = nuke.position();
        self.enemies.clear();
        self.explode(center, nuke::BLAST_RADIUS, out_events);
        if !burning {
            self.nuke = None;
            self.counters.nuke_active = false;
            tracing::info!("nuke burned out");
            out_events.push(Event::NukeExpired);
        }
    }

    fn resolve_hits(&mut self, out_events: &mut Vec<Event>) {
        let mut spent: Vec<ProjectileId> = Vec::new();
        let mut slain: Vec<EnemyId> = Vec::new();

        for projectile in &self.projectiles {
            if projectile.kind != ProjectileKind::Bullet {
                continue;
            }
            let hit = self.enemies.iter().find(|enemy| {
                !slain.contains(&enemy.id)
                    && enemy.position.distance(projectile.position) < HIT_RADIUS
            });
            if let Some(enemy) = hit {
                spent.push(projectile.id);
                slain.push(enemy.id);
                out_events.push(Event::EnemyShot {
                    enemy: enemy.id,
                    projectile: projectile.id,
                });
            }
        }

        if slain.is_empty() {
            return;
        }

        let kills = slain.len() as u32;
        self.counters.score = self
            .counters
            .score
            .saturating_add(kills.saturating_mul(DIRECT_HIT_SCORE));
        self.counters.killstreak = self.counters.killstreak.saturating_add(kills);
        self.counters.kills_without_damage =
            self.counters.kills_without_damage.saturating_add(kills);
        self.projectiles
            .retain(|projectile| !spent.contains(&projectile.id));
        self.enemies.retain(|enemy| !slain.contains(&enemy.id));
    }

    fn refill_grenades(&mut self, cap: u32, out_events: &mut Vec<Event>) {
        if self.counters.grenades >= cap {
            return;
        }
        self.counters.grenades = cap;
        self.counters.kills_without_damage = 0;
        tracing::info!(grenades = cap, "grenades refilled");
        out_events.push(Event::GrenadesRefilled { grenades: cap });
    }

    fn arm_nuke(&mut self, out_events: &mut Vec<Event>) {
        if self.counters.nuke_available {
            return;
        }
        self.counters.nuke_available = true;
        tracing::info!(killstreak = self.counters.killstreak, "nuke available");
        out_events.push(Event::NukeArmed);
    }

    fn use_nuke(&mut self, out_events: &mut Vec<Event>) {
        if !self.counters.nuke_available {
            return;
        }
        self.counters.nuke_available = false;
        self.counters.killstreak = 0;
        self.counters.nuke_active = true;
        self.enemies.clear();
        self.grid.clear();
        self.tower_height = 0;
        self.hovered_layer = None;
        self.nuke = Some(NukeEffect::detonate());
        tracing::info!("nuke detonated");
        out_events.push(Event::NukeDetonated);
    }

    fn toggle(&mut self, toggle: Toggle, out_events: &mut Vec<Event>) {
        let flag = match toggle {
            Toggle::Pause => &mut self.toggles.paused,
            Toggle::CheatMode => &mut self.toggles.cheat_mode,
            Toggle::SliceMode => &mut self.toggles.slice_mode,
            Toggle::Debug => &mut self.toggles.debug,
            Toggle::FirstPerson => &mut self.toggles.first_person,
        };
        *flag = !*flag;
        let enabled = *flag;
        if toggle == Toggle::SliceMode && !enabled {
            self.hovered_layer = None;
        }
        out_events.push(Event::ToggleChanged { toggle, enabled });
    }

    fn restart(&mut self, out_events: &mut Vec<Event>) {
        let rng = self.rng.clone();
        *self = Self::with_rng(self.config.clone(), rng);
        tracing::info!("game restarted");
        out_events.push(Event::Restarted);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Gameplay commands are ignored while the game is paused. After game over
/// only the advance and resolution commands still apply, which lets the frame
/// that ended the game finish. Toggles, held controls and restart are always
/// honoured.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetControl { control, held } => world.held.set(control, held),
        Command::Toggle { toggle } => world.toggle(toggle, out_events),
        Command::Restart => world.restart(out_events),
        command if !world.accepts(&command) => {
            tracing::trace!(?command, "command ignored while frozen");
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            let held = world.held;
            world.player.steer(
                &held,
                dt.as_secs_f32(),
                world.config.player_move_speed,
                world.config.player_turn_speed,
            );
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::Aim {
            yaw_degrees,
            pitch_degrees,
        } => world.player.aim(yaw_degrees, pitch_degrees),
        Command::FireBullet => world.launch(ProjectileKind::Bullet, out_events),
        Command::ThrowGrenade => {
            if world.counters.grenades > 0 {
                world.counters.grenades -= 1;
                world.launch(ProjectileKind::Grenade, out_events);
            }
        }
        Command::SetHoveredLayer { layer } => world.hovered_layer = layer,
        Command::SliceLayer { layer } => world.slice_layer(layer, out_events),
        Command::SpawnPiece { order } => world.spawn_piece(order, out_events),
        Command::AdvancePiece { dt } => world.advance_piece(dt, out_events),
        Command::AdvanceProjectiles { dt } => {
            world.advance_projectiles(dt.as_secs_f32(), out_events);
        }
        Command::AdvanceEnemies { dt } => world.advance_enemies(dt.as_secs_f32(), out_events),
        Command::SpawnEnemy { angle } => world.spawn_enemy(angle, out_events),
        Command::AdvanceNuke { dt } => world.advance_nuke(dt.as_secs_f32(), out_events),
        Command::AdvanceParticles { dt } => {
            let dt = dt.as_secs_f32();
            world.particles.retain_mut(|particle| particle.advance(dt));
        }
        Command::ResolveHits => world.resolve_hits(out_events),
        Command::RefillGrenades { cap } => world.refill_grenades(cap, out_events),
        Command::ArmNuke => world.arm_nuke(out_events),
        Command::UseNuke => world.use_nuke(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use sky_bridge_siege_core::{
        ActivePieceSnapshot, CombatCounters, EnemyView, HeldControls, NukeSnapshot,
        ParticleSnapshot, PlayerSnapshot, ProjectileSnapshot, ToggleState,
    };

    use super::{TowerGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the locked tower geometry.
    #[must_use]
    pub fn grid(world: &World) -> &TowerGrid {
        &world.grid
    }

    /// Cached tower height: the highest occupied layer plus one.
    #[must_use]
    pub fn tower_height(world: &World) -> u32 {
        world.tower_height
    }

    /// Reports whether a piece is currently falling or settling.
    #[must_use]
    pub fn has_active_piece(world: &World) -> bool {
        world.piece.is_some()
    }

    /// Captures the active piece, if any.
    #[must_use]
    pub fn active_piece(world: &World) -> Option<ActivePieceSnapshot> {
        world.piece.as_ref().map(|piece| piece.snapshot())
    }

    /// Captures a read-only view of every enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of enemies currently alive.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures every projectile in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Captures every live particle.
    #[must_use]
    pub fn particles(world: &World) -> Vec<ParticleSnapshot> {
        world
            .particles
            .iter()
            .map(|particle| particle.snapshot())
            .collect()
    }

    /// Captures the nuke effect while it is active.
    #[must_use]
    pub fn nuke(world: &World) -> Option<NukeSnapshot> {
        world.nuke.as_ref().map(|nuke| nuke.snapshot())
    }

    /// Captures the player pose and the camera for the selected view.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot(world.toggles.first_person)
    }

    /// Scores, counters and ability flags.
    #[must_use]
    pub fn counters(world: &World) -> CombatCounters {
        world.counters
    }

    /// Boolean switches plus the terminal state.
    #[must_use]
    pub fn toggles(world: &World) -> ToggleState {
        world.toggles
    }

    /// Held state of the continuous controls.
    #[must_use]
    pub fn held_controls(world: &World) -> HeldControls {
        world.held
    }

    /// Layer currently targeted by the slice ray.
    #[must_use]
    pub fn hovered_layer(world: &World) -> Option<u32> {
        world.hovered_layer
    }

    /// Reports whether gameplay commands are currently ignored.
    #[must_use]
    pub fn is_frozen(world: &World) -> bool {
        world.is_frozen()
    }

    /// Number of ticks simulated since the world was created or restarted.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
