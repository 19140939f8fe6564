#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic piece generator feeding the tower with floor-tiling batches.

use std::{collections::VecDeque, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sky_bridge_siege_core::{
    ColorIndex, Command, Event, PieceOrder, ShapeKind, COLOR_COUNT, GRID_SIZE,
};

/// Number of pieces queued by every refill.
pub const BATCH_SIZE: usize = 4;

/// Shapes drawn by chaos batches.
const IRREGULAR_SHAPES: [ShapeKind; 3] = [ShapeKind::T, ShapeKind::S, ShapeKind::Z];
/// Four squares covering the 4x4 floor.
const SQUARE_FLOOR: [(i32, i32); BATCH_SIZE] = [(0, 0), (2, 0), (0, 2), (2, 2)];
/// Four bars covering the 4x4 floor row by row.
const BAR_FLOOR: [(i32, i32); BATCH_SIZE] = [(0, 0), (0, 1), (0, 2), (0, 3)];

/// Configuration parameters required to construct the piece generator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    perfect_floor_probability: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, recipe odds and seed.
    #[must_use]
    pub const fn new(
        spawn_interval: Duration,
        perfect_floor_probability: f64,
        rng_seed: u64,
    ) -> Self {
        Self {
            spawn_interval,
            perfect_floor_probability,
            rng_seed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueuedPiece {
    shape: ShapeKind,
    x: i32,
    y: i32,
}

/// Pure system that queues upcoming pieces and emits spawn commands on a cadence.
#[derive(Debug)]
pub struct PieceGenerator {
    spawn_interval: Duration,
    perfect_floor_probability: f64,
    accumulator: Duration,
    queue: VecDeque<QueuedPiece>,
    rng: ChaCha8Rng,
}

impl PieceGenerator {
    /// Creates a new piece generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            perfect_floor_probability: config.perfect_floor_probability.clamp(0.0, 1.0),
            accumulator: Duration::ZERO,
            queue: VecDeque::with_capacity(BATCH_SIZE),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes time events and emits at most one spawn command.
    ///
    /// Time only accumulates while no piece is active. Once the accumulated
    /// time exceeds the spawn interval the timer resets and a spawn is
    /// attempted; the attempt is dropped without popping the queue while a
    /// nuke is active.
    pub fn handle(
        &mut self,
        events: &[Event],
        piece_active: bool,
        nuke_active: bool,
        out: &mut Vec<Command>,
    ) {
        if piece_active {
            self.accumulator = Duration::ZERO;
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        if self.accumulator <= self.spawn_interval {
            return;
        }

        self.accumulator = Duration::ZERO;
        if nuke_active {
            return;
        }

        out.push(Command::SpawnPiece {
            order: self.next_order(),
        });
    }

    /// Pops the next piece, refilling the queue with one batch when it is empty.
    ///
    /// The color is chosen at pop time.
    pub fn next_order(&mut self) -> PieceOrder {
        if self.queue.is_empty() {
            self.refill();
        }
        let queued = self.queue.pop_front().unwrap_or(QueuedPiece {
            shape: ShapeKind::O,
            x: 0,
            y: 0,
        });
        PieceOrder {
            shape: queued.shape,
            x: queued.x,
            y: queued.y,
            color: self.next_color(),
        }
    }

    /// Number of pieces waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Clears the queue and the spawn timer while keeping the random stream.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.accumulator = Duration::ZERO;
    }

    fn refill(&mut self) {
        if self.rng.gen_bool(self.perfect_floor_probability) {
            let recipe = if self.rng.gen_bool(0.5) {
                (ShapeKind::O, SQUARE_FLOOR)
            } else {
                (ShapeKind::I, BAR_FLOOR)
            };
            let (shape, origins) = recipe;
            self.queue
                .extend(origins.iter().map(|&(x, y)| QueuedPiece { shape, x, y }));
            return;
        }

        tracing::debug!("queueing a chaos batch");
        let max_origin = GRID_SIZE as i32 - 2;
        for _ in 0..BATCH_SIZE {
            let shape = IRREGULAR_SHAPES[self.rng.gen_range(0..IRREGULAR_SHAPES.len())];
            let x = self.rng.gen_range(0..=max_origin);
            let y = self.rng.gen_range(0..=max_origin);
            self.queue.push_back(QueuedPiece { shape, x, y });
        }
    }

    fn next_color(&mut self) -> ColorIndex {
        ColorIndex::wrapping(self.rng.gen_range(0..COLOR_COUNT))
    }
}
