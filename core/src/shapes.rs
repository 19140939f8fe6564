//! Static catalog of piece shapes and the planar rotation transform.
//!
//! Every consumer that needs the absolute cells of a piece (collision tests,
//! locking, rendering) goes through [`piece_cells`] so the three never
//! disagree about where a piece is.

/// Number of cells that compose every piece.
pub const CELLS_PER_PIECE: usize = 4;

/// The seven tetromino shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    /// Four cells in a straight line.
    I,
    /// Two-by-two square.
    O,
    /// Three cells with a centred nub.
    T,
    /// Three cells with a nub on the left end.
    L,
    /// Three cells with a nub on the right end.
    J,
    /// Skewed shape stepping up to the right.
    S,
    /// Skewed shape stepping up to the left.
    Z,
}

impl ShapeKind {
    /// Every shape in catalog order.
    pub const ALL: [ShapeKind; 7] = [
        Self::I,
        Self::O,
        Self::T,
        Self::L,
        Self::J,
        Self::S,
        Self::Z,
    ];

    /// Cell offsets of the shape relative to its origin in the unrotated state.
    #[must_use]
    pub const fn offsets(self) -> [(i32, i32); CELLS_PER_PIECE] {
        match self {
            Self::I => [(0, 0), (1, 0), (2, 0), (3, 0)],
            Self::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::T => [(1, 0), (0, 1), (1, 1), (2, 1)],
            Self::L => [(0, 0), (0, 1), (1, 1), (2, 1)],
            Self::J => [(2, 0), (0, 1), (1, 1), (2, 1)],
            Self::S => [(1, 0), (2, 0), (0, 1), (1, 1)],
            Self::Z => [(0, 0), (1, 0), (1, 1), (2, 1)],
        }
    }

    /// Offsets of the shape after applying `rotation`.
    #[must_use]
    pub fn rotated_offsets(self, rotation: Rotation) -> [(i32, i32); CELLS_PER_PIECE] {
        self.offsets().map(|(dx, dy)| rotation.apply(dx, dy))
    }
}

/// One of the four discrete planar orientations of a piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Offsets are used unchanged.
    #[default]
    Identity,
    /// `(dx, dy) -> (-dy, dx)`.
    Quarter,
    /// `(dx, dy) -> (-dx, -dy)`.
    Half,
    /// `(dx, dy) -> (dy, -dx)`.
    ThreeQuarter,
}

impl Rotation {
    /// Maps a rotation index onto a rotation, wrapping modulo four.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::Identity,
            1 => Self::Quarter,
            2 => Self::Half,
            _ => Self::ThreeQuarter,
        }
    }

    /// Index of the rotation within `0..4`.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Identity => 0,
            Self::Quarter => 1,
            Self::Half => 2,
            Self::ThreeQuarter => 3,
        }
    }

    /// Rotation reached after one more quarter turn.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Applies the rotation to a single offset.
    #[must_use]
    pub const fn apply(self, dx: i32, dy: i32) -> (i32, i32) {
        match self {
            Self::Identity => (dx, dy),
            Self::Quarter => (-dy, dx),
            Self::Half => (-dx, -dy),
            Self::ThreeQuarter => (dy, -dx),
        }
    }
}

/// Absolute location of one piece cell. The height stays continuous because a
/// falling piece moves between layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceCell {
    /// Grid column.
    pub x: i32,
    /// Grid row.
    pub y: i32,
    /// Height in layers, shared by all cells of a piece.
    pub z: f32,
}

/// Computes the absolute cells covered by a piece.
#[must_use]
pub fn piece_cells(
    shape: ShapeKind,
    rotation: Rotation,
    base_x: i32,
    base_y: i32,
    base_z: f32,
) -> [PieceCell; CELLS_PER_PIECE] {
    shape
        .rotated_offsets(rotation)
        .map(|(dx, dy)| PieceCell {
            x: base_x + dx,
            y: base_y + dy,
            z: base_z,
        })
}
