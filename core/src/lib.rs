#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sky-Bridge Siege engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and the frame orchestrator
//! submit [`Command`] values describing desired mutations, the world executes
//! them via its `apply` entry point, and then reports [`Event`] values.
//! Systems read immutable snapshots and respond exclusively with new command
//! batches.

mod shapes;

use std::time::Duration;

pub use glam::Vec3;

pub use shapes::{piece_cells, PieceCell, Rotation, ShapeKind, CELLS_PER_PIECE};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Sky-Bridge Siege.";

/// Number of cells along each horizontal edge of the tower grid.
pub const GRID_SIZE: usize = 4;
/// Tower height, in layers, at which the game is lost.
pub const TOWER_LIMIT: u32 = 15;
/// Number of layers stored by the tower grid.
pub const MAX_HEIGHT: usize = TOWER_LIMIT as usize + 20;
/// Edge length of one voxel in world units.
pub const BLOCK_SIZE: f32 = 40.0;
/// Height of the defensive wall in world units.
pub const WALL_HEIGHT: f32 = TOWER_LIMIT as f32 * BLOCK_SIZE;
/// Y coordinate of the wall's centre line.
pub const WALL_CENTER_Y: f32 = -50.0;
/// Thickness of the wall along the y axis.
pub const WALL_THICKNESS: f32 = 40.0;
/// Y coordinate of the wall face that enemies climb.
pub const WALL_FRONT_FACE: f32 = WALL_CENTER_Y + WALL_THICKNESS / 2.0;
/// Horizontal centre of the tower footprint.
pub const TOWER_CENTER_X: f32 = 0.0;
/// Horizontal centre of the tower footprint.
pub const TOWER_CENTER_Y: f32 = 300.0;
/// Projectiles leave the world once `|x|` or `|y|` exceeds this value.
pub const WORLD_HALF_EXTENT: f32 = 600.0;
/// Number of distinct piece colors.
pub const COLOR_COUNT: u8 = 7;
/// Minimum number of concurrent enemies kept alive by population maintenance.
pub const ENEMY_FLOOR: usize = 5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the clock and steers the player and camera from held controls.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Updates the held state of a continuous control.
    SetControl {
        /// Control whose state changed.
        control: Control,
        /// Whether the control is now held.
        held: bool,
    },
    /// Flips one of the boolean game toggles.
    Toggle {
        /// Toggle to flip.
        toggle: Toggle,
    },
    /// Points the player's aim at explicit angles.
    Aim {
        /// Heading around the vertical axis, in degrees.
        yaw_degrees: f32,
        /// Elevation above the horizontal plane, in degrees.
        pitch_degrees: f32,
    },
    /// Fires a bullet along the current aim.
    FireBullet,
    /// Throws a grenade along the current aim if a charge is available.
    ThrowGrenade,
    /// Records the layer currently hovered by the slice ray, if any.
    SetHoveredLayer {
        /// Hovered layer index.
        layer: Option<u32>,
    },
    /// Removes the provided layer when it is solid.
    SliceLayer {
        /// Layer index to remove.
        layer: u32,
    },
    /// Creates the active piece from a generator order.
    SpawnPiece {
        /// Piece description produced by the generator.
        order: PieceOrder,
    },
    /// Integrates gravity for the active piece and resolves locking.
    AdvancePiece {
        /// Simulated time step.
        dt: Duration,
    },
    /// Moves projectiles and resolves grenade detonations.
    AdvanceProjectiles {
        /// Simulated time step.
        dt: Duration,
    },
    /// Runs the enemy state machine and contact damage.
    AdvanceEnemies {
        /// Simulated time step.
        dt: Duration,
    },
    /// Adds an enemy on the spawn ring at the provided angle.
    SpawnEnemy {
        /// Angle around the tower centre, in radians.
        angle: f32,
    },
    /// Advances the active nuke effect.
    AdvanceNuke {
        /// Simulated time step.
        dt: Duration,
    },
    /// Integrates and culls cosmetic particles.
    AdvanceParticles {
        /// Simulated time step.
        dt: Duration,
    },
    /// Resolves direct bullet hits against enemies.
    ResolveHits,
    /// Refills grenade charges up to the provided cap.
    RefillGrenades {
        /// Charges held after a successful refill.
        cap: u32,
    },
    /// Marks the nuke ability as available.
    ArmNuke,
    /// Detonates the nuke when it is available.
    UseNuke,
    /// Re-initialises the whole game state.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that one of the game toggles changed.
    ToggleChanged {
        /// Toggle that changed.
        toggle: Toggle,
        /// New state of the toggle.
        enabled: bool,
    },
    /// Confirms that a new active piece entered the world.
    PieceSpawned {
        /// Shape of the piece.
        shape: ShapeKind,
        /// Spawn height in layers.
        layer: u32,
    },
    /// Confirms that the active piece merged into the grid.
    PieceLocked {
        /// Shape of the locked piece.
        shape: ShapeKind,
        /// Layer the piece locked at.
        layer: u32,
    },
    /// Reports that a lock would have written outside the grid and was dropped.
    PieceDiscarded {
        /// Shape of the discarded piece.
        shape: ShapeKind,
    },
    /// Reports that an unstable layer collapsed.
    LayerCollapsed {
        /// Index of the removed layer.
        layer: u32,
    },
    /// Reports that the player sliced a solid layer.
    LayerSliced {
        /// Index of the removed layer.
        layer: u32,
    },
    /// Reports that a slice request was ignored.
    SliceRejected {
        /// Layer targeted by the request.
        layer: u32,
    },
    /// Confirms that a projectile left the player's weapon.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Kind of projectile fired.
        kind: ProjectileKind,
    },
    /// Reports an explosion and how many enemies it removed.
    Exploded {
        /// Centre of the blast.
        center: Vec3,
        /// Blast radius in world units.
        radius: f32,
        /// Number of enemies removed by the blast.
        kills: u32,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
    },
    /// Reports that a bullet struck an enemy.
    EnemyShot {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Bullet that hit it.
        projectile: ProjectileId,
    },
    /// Reports that an enemy reached the player.
    PlayerDamaged {
        /// Lives left after the hit.
        lives_remaining: u32,
    },
    /// Reports that grenade charges were refilled.
    GrenadesRefilled {
        /// Charges held after the refill.
        grenades: u32,
    },
    /// Reports that the nuke became available.
    NukeArmed,
    /// Reports that the nuke was used.
    NukeDetonated,
    /// Reports that the nuke effect ended.
    NukeExpired,
    /// Reports that the game reached a terminal state.
    GameOver {
        /// Why the game ended.
        reason: GameOverReason,
    },
    /// Confirms that the game state was re-initialised.
    Restarted,
}

/// Continuous controls whose held state steers the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Move along the aim heading.
    MoveForward,
    /// Move against the aim heading.
    MoveBackward,
    /// Strafe to the left of the aim heading.
    StrafeLeft,
    /// Strafe to the right of the aim heading.
    StrafeRight,
    /// Turn the aim counter-clockwise.
    YawLeft,
    /// Turn the aim clockwise.
    YawRight,
    /// Raise the aim.
    PitchUp,
    /// Lower the aim.
    PitchDown,
}

impl Control {
    /// Every continuous control, in a stable order.
    pub const ALL: [Self; 8] = [
        Self::MoveForward,
        Self::MoveBackward,
        Self::StrafeLeft,
        Self::StrafeRight,
        Self::YawLeft,
        Self::YawRight,
        Self::PitchUp,
        Self::PitchDown,
    ];
}

/// Currently held state of every [`Control`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeldControls {
    held: [bool; 8],
}

impl HeldControls {
    /// Records whether `control` is held.
    pub fn set(&mut self, control: Control, held: bool) {
        self.held[Self::slot(control)] = held;
    }

    /// Reports whether `control` is held.
    #[must_use]
    pub fn is_held(&self, control: Control) -> bool {
        self.held[Self::slot(control)]
    }

    /// Signed axis value combining a positive and a negative control.
    #[must_use]
    pub fn axis(&self, positive: Control, negative: Control) -> f32 {
        let mut value = 0.0;
        if self.is_held(positive) {
            value += 1.0;
        }
        if self.is_held(negative) {
            value -= 1.0;
        }
        value
    }

    const fn slot(control: Control) -> usize {
        match control {
            Control::MoveForward => 0,
            Control::MoveBackward => 1,
            Control::StrafeLeft => 2,
            Control::StrafeRight => 3,
            Control::YawLeft => 4,
            Control::YawRight => 5,
            Control::PitchUp => 6,
            Control::PitchDown => 7,
        }
    }
}

/// Discrete, edge-triggered player actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Fire a bullet.
    Fire,
    /// Throw a grenade.
    Grenade,
    /// Use the nuke.
    Nuke,
    /// Restart the game.
    Restart,
    /// Pause or resume the simulation.
    Pause,
    /// Toggle the auto-aim assist.
    ToggleCheat,
    /// Toggle slice mode.
    ToggleSlice,
    /// Toggle the debug overlay.
    ToggleDebug,
    /// Switch between first and third person cameras.
    ToggleCamera,
    /// Primary mouse button: slice in slice mode, fire otherwise.
    PrimaryClick,
}

/// Boolean switches owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Simulation paused.
    Pause,
    /// Auto-aim assist active.
    CheatMode,
    /// Slice targeting active.
    SliceMode,
    /// Debug overlay visible.
    Debug,
    /// First-person camera active.
    FirstPerson,
}

/// Terminal conditions of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// The tower grew to [`TOWER_LIMIT`] layers.
    TowerLimit,
    /// Enemies depleted the player's lives.
    KilledByEnemies,
}

impl GameOverReason {
    /// Human-readable explanation shown on the game-over screen.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::TowerLimit => "Tower reached limit!",
            Self::KilledByEnemies => "Killed by enemies!",
        }
    }
}

/// Cosmetic color index of a locked block or piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorIndex(u8);

impl ColorIndex {
    /// Creates a color index, rejecting values outside the palette.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < COLOR_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Creates a color index, wrapping values past the end of the palette.
    #[must_use]
    pub const fn wrapping(index: u8) -> Self {
        Self(index % COLOR_COUNT)
    }

    /// Recovers a color index from a non-zero grid cell code.
    #[must_use]
    pub const fn from_cell_code(code: u8) -> Option<Self> {
        if code == 0 {
            None
        } else {
            Self::new(code - 1)
        }
    }

    /// Palette position of the color.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Value stored in the grid for a block of this color.
    #[must_use]
    pub const fn cell_code(&self) -> u8 {
        self.0 + 1
    }
}

/// Piece handed from the generator to the world for spawning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceOrder {
    /// Shape of the piece.
    pub shape: ShapeKind,
    /// Grid column of the piece origin.
    pub x: i32,
    /// Grid row of the piece origin.
    pub y: i32,
    /// Cosmetic color of the piece.
    pub color: ColorIndex,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Phase of an enemy's journey toward the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// Walking toward the wall's front face.
    Approaching,
    /// Climbing the wall.
    Climbing,
    /// Chasing the player along the wall top.
    Pursuing,
}

/// Kinds of projectile the player can launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Straight-line shot that kills on contact.
    Bullet,
    /// Ballistic charge that explodes when it lands.
    Grenade,
}

/// Whether the active piece is still falling or resting on an obstruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PiecePhase {
    /// The last gravity step succeeded.
    Falling,
    /// The piece is blocked and the lock-delay timer is running.
    Settling,
}

/// Immutable representation of the active piece.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePieceSnapshot {
    /// Shape of the piece.
    pub shape: ShapeKind,
    /// Orientation of the piece.
    pub rotation: Rotation,
    /// Grid column of the piece origin.
    pub x: i32,
    /// Grid row of the piece origin.
    pub y: i32,
    /// Continuous height in layers.
    pub z: f32,
    /// Cosmetic color of the piece.
    pub color: ColorIndex,
    /// Time spent resting against an obstruction.
    pub lock_timer: Duration,
    /// Lock-delay phase of the piece.
    pub phase: PiecePhase,
}

impl ActivePieceSnapshot {
    /// Absolute cells covered by the piece.
    #[must_use]
    pub fn cells(&self) -> [PieceCell; CELLS_PER_PIECE] {
        piece_cells(self.shape, self.rotation, self.x, self.y, self.z)
    }
}

/// Immutable representation of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Position in world units.
    pub position: Vec3,
    /// Current phase of the enemy state machine.
    pub state: EnemyState,
    /// Movement speed in world units per second.
    pub speed: f32,
}

/// Read-only snapshot describing all enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Position in world units.
    pub position: Vec3,
    /// Velocity in world units per second.
    pub velocity: Vec3,
    /// Kind of projectile.
    pub kind: ProjectileKind,
}

/// Immutable representation of a cosmetic particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSnapshot {
    /// Position in world units.
    pub position: Vec3,
    /// RGB color in the range `0.0..=1.0`.
    pub color: [f32; 3],
    /// Seconds until the particle disappears.
    pub remaining: f32,
}

/// Immutable representation of the active nuke effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NukeSnapshot {
    /// Centre of the effect.
    pub position: Vec3,
    /// Visual radius of the fireball.
    pub scale: f32,
    /// Seconds until the effect ends.
    pub remaining: f32,
}

/// Player pose and camera placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Player position in world units.
    pub position: Vec3,
    /// Aim heading in degrees.
    pub yaw_degrees: f32,
    /// Aim elevation in degrees.
    pub pitch_degrees: f32,
    /// Camera eye position.
    pub camera_position: Vec3,
    /// Point the camera looks at.
    pub camera_target: Vec3,
}

impl PlayerSnapshot {
    /// Unit vector along the player's aim.
    #[must_use]
    pub fn aim_direction(&self) -> Vec3 {
        aim_direction(self.yaw_degrees, self.pitch_degrees)
    }
}

/// Scores, counters and ability flags consumed by the ability economy and HUD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CombatCounters {
    /// Accumulated score.
    pub score: u32,
    /// Lives remaining.
    pub lives: u32,
    /// Kills since the nuke was last used.
    pub killstreak: u32,
    /// Direct-hit kills since the player last took damage.
    pub kills_without_damage: u32,
    /// Grenade charges held.
    pub grenades: u32,
    /// Whether the nuke can be used.
    pub nuke_available: bool,
    /// Whether the nuke effect is running.
    pub nuke_active: bool,
}

/// Boolean switches plus terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ToggleState {
    /// Simulation paused.
    pub paused: bool,
    /// Auto-aim assist active.
    pub cheat_mode: bool,
    /// Slice targeting active.
    pub slice_mode: bool,
    /// Debug overlay visible.
    pub debug: bool,
    /// First-person camera active.
    pub first_person: bool,
    /// Terminal condition, if the game has ended.
    pub game_over: Option<GameOverReason>,
}

/// Unit vector pointing along the provided yaw and pitch angles.
#[must_use]
pub fn aim_direction(yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
    let yaw = yaw_degrees.to_radians();
    let pitch = pitch_degrees.to_radians();
    Vec3::new(
        yaw.cos() * pitch.cos(),
        yaw.sin() * pitch.cos(),
        pitch.sin(),
    )
}

/// World-space centre height of a layer.
#[must_use]
pub fn layer_center_height(layer: u32) -> f32 {
    (layer as f32 + 0.5) * BLOCK_SIZE
}

/// World-space centre of the voxel at the provided grid coordinates.
#[must_use]
pub fn voxel_center(x: i32, y: i32, z: f32) -> Vec3 {
    let half_grid = GRID_SIZE as f32 / 2.0;
    Vec3::new(
        TOWER_CENTER_X + (x as f32 - half_grid + 0.5) * BLOCK_SIZE,
        TOWER_CENTER_Y + (y as f32 - half_grid + 0.5) * BLOCK_SIZE,
        (z + 0.5) * BLOCK_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_index_round_trips_through_cell_codes() {
        for index in 0..COLOR_COUNT {
            let color = ColorIndex::new(index).expect("palette index");
            assert_eq!(ColorIndex::from_cell_code(color.cell_code()), Some(color));
        }
        assert_eq!(ColorIndex::new(COLOR_COUNT), None);
        assert_eq!(ColorIndex::wrapping(COLOR_COUNT + 2).get(), 2);
        assert_eq!(ColorIndex::from_cell_code(0), None);
    }

    #[test]
    fn held_controls_combine_into_axes() {
        let mut held = HeldControls::default();
        held.set(Control::YawLeft, true);
        assert!((held.axis(Control::YawLeft, Control::YawRight) - 1.0).abs() < f32::EPSILON);
        held.set(Control::YawRight, true);
        assert!(held.axis(Control::YawLeft, Control::YawRight).abs() < f32::EPSILON);
        held.set(Control::YawLeft, false);
        assert!((held.axis(Control::YawLeft, Control::YawRight) + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn every_control_has_its_own_slot() {
        let mut held = HeldControls::default();
        for control in Control::ALL {
            assert!(!held.is_held(control));
            held.set(control, true);
        }
        assert!(Control::ALL.iter().all(|&control| held.is_held(control)));
    }

    #[test]
    fn aim_direction_is_normalised() {
        let direction = aim_direction(35.0, -20.0);
        assert!((direction.length() - 1.0).abs() < 1e-5);
        let straight_up_y = aim_direction(90.0, 0.0);
        assert!(straight_up_y.x.abs() < 1e-5);
        assert!((straight_up_y.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn wall_front_face_sits_in_front_of_centre() {
        assert!((WALL_FRONT_FACE + 30.0).abs() < f32::EPSILON);
        assert!((WALL_HEIGHT - 600.0).abs() < f32::EPSILON);
        assert_eq!(MAX_HEIGHT, 35);
    }

    #[test]
    fn game_over_messages_match_hud_copy() {
        assert_eq!(GameOverReason::TowerLimit.message(), "Tower reached limit!");
        assert_eq!(
            GameOverReason::KilledByEnemies.message(),
            "Killed by enemies!"
        );
    }
}
