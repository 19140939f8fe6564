//! Active-piece gravity and lock-delay state machine.

use std::time::Duration;

use sky_bridge_siege_core::{
    piece_cells, ActivePieceSnapshot, ColorIndex, PieceCell, PieceOrder, PiecePhase, Rotation,
    ShapeKind, CELLS_PER_PIECE,
};

use crate::grid::TowerGrid;

/// Lowest layer a piece may spawn at, regardless of tower height.
const MIN_SPAWN_LAYER: u32 = 10;
/// Clearance kept between the tower top and a freshly spawned piece.
const SPAWN_CLEARANCE: u32 = 4;

/// Outcome of one gravity step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PieceStep {
    /// The piece moved down freely.
    Fell,
    /// The piece is blocked and still inside its lock delay.
    Settling,
    /// The lock delay elapsed; the piece must merge into the grid.
    Lock,
}

#[derive(Clone, Debug)]
pub(crate) struct ActivePiece {
    shape: ShapeKind,
    rotation: Rotation,
    x: i32,
    y: i32,
    z: f32,
    color: ColorIndex,
    lock_timer: Duration,
}

impl ActivePiece {
    pub(crate) fn spawn(order: PieceOrder, tower_height: u32) -> Self {
        Self {
            shape: order.shape,
            rotation: Rotation::Identity,
            x: order.x,
            y: order.y,
            z: spawn_layer(tower_height) as f32,
            color: order.color,
            lock_timer: Duration::ZERO,
        }
    }

    pub(crate) fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub(crate) fn color(&self) -> ColorIndex {
        self.color
    }

    pub(crate) fn layer(&self) -> u32 {
        self.z.max(0.0) as u32
    }

    /// Integrates gravity against the grid and advances the lock delay.
    pub(crate) fn step(
        &mut self,
        grid: &TowerGrid,
        dt: Duration,
        fall_speed: f32,
        lock_delay: Duration,
    ) -> PieceStep {
        let candidate = self.z - fall_speed * dt.as_secs_f32();
        if grid.collides(&self.cells_at(candidate)) {
            self.lock_timer = self.lock_timer.saturating_add(dt);
            if self.lock_timer > lock_delay {
                PieceStep::Lock
            } else {
                PieceStep::Settling
            }
        } else {
            self.z = candidate;
            self.lock_timer = Duration::ZERO;
            PieceStep::Fell
        }
    }

    /// Integer layer the piece merges into: the rounded height, never below the floor.
    pub(crate) fn lock_layer(&self) -> i32 {
        (self.z.round() as i32).max(0)
    }

    pub(crate) fn cells_at(&self, z: f32) -> [PieceCell; CELLS_PER_PIECE] {
        piece_cells(self.shape, self.rotation, self.x, self.y, z)
    }

    pub(crate) fn snapshot(&self) -> ActivePieceSnapshot {
        ActivePieceSnapshot {
            shape: self.shape,
            rotation: self.rotation,
            x: self.x,
            y: self.y,
            z: self.z,
            color: self.color,
            lock_timer: self.lock_timer,
            phase: if self.lock_timer.is_zero() {
                PiecePhase::Falling
            } else {
                PiecePhase::Settling
            },
        }
    }
}

/// Spawn height that always clears the current stack.
pub(crate) fn spawn_layer(tower_height: u32) -> u32 {
    tower_height
        .saturating_add(SPAWN_CLEARANCE)
        .max(MIN_SPAWN_LAYER)
}
