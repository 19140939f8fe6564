//! Voxel occupancy store for locked tower geometry.

use sky_bridge_siege_core::{ColorIndex, PieceCell, GRID_SIZE, MAX_HEIGHT};

const LAYER_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Dense `[x][y][z]` grid of locked blocks.
///
/// A cell stores `0` when empty and `color + 1` when occupied. Every write is
/// bounds-checked so out-of-range coordinates never corrupt neighbouring cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TowerGrid {
    cells: Vec<u8>,
}

impl Default for TowerGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![0; LAYER_CELLS * MAX_HEIGHT],
        }
    }

    /// Raw cell code at the provided coordinates, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32, z: i32) -> Option<u8> {
        self.index(x, y, z).map(|index| self.cells[index])
    }

    /// Color of the block at the provided coordinates, if any.
    #[must_use]
    pub fn color_at(&self, x: i32, y: i32, z: i32) -> Option<ColorIndex> {
        self.cell(x, y, z).and_then(ColorIndex::from_cell_code)
    }

    /// Reports whether the coordinates hold a block.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32, z: i32) -> bool {
        self.cell(x, y, z).is_some_and(|code| code > 0)
    }

    /// Writes a block of the provided color. Returns `false` without touching
    /// the grid when the coordinates are out of bounds.
    pub fn set(&mut self, x: i32, y: i32, z: i32, color: ColorIndex) -> bool {
        match self.index(x, y, z) {
            Some(index) => {
                self.cells[index] = color.cell_code();
                true
            }
            None => false,
        }
    }

    /// Tests piece cells against the floor, the horizontal bounds and locked
    /// blocks. Cells above the stored layers only collide with the bounds.
    #[must_use]
    pub fn collides(&self, cells: &[PieceCell]) -> bool {
        cells.iter().any(|cell| {
            if cell.z < 0.0 {
                return true;
            }
            if !in_horizontal_bounds(cell.x, cell.y) {
                return true;
            }
            let layer = cell.z.floor() as i32;
            self.is_occupied(cell.x, cell.y, layer)
        })
    }

    /// Writes every cell of a piece at integer height `layer`.
    ///
    /// The write is all-or-nothing: when any cell falls outside the grid
    /// nothing is written and `false` is returned.
    pub fn place(&mut self, cells: &[PieceCell], layer: i32, color: ColorIndex) -> bool {
        let mut indices = Vec::with_capacity(cells.len());
        for cell in cells {
            match self.index(cell.x, cell.y, layer) {
                Some(index) => indices.push(index),
                None => return false,
            }
        }

        for index in indices {
            self.cells[index] = color.cell_code();
        }
        true
    }

    /// Reports whether the layer holds at least one block.
    #[must_use]
    pub fn has_blocks(&self, layer: u32) -> bool {
        self.layer(layer)
            .is_some_and(|cells| cells.iter().any(|code| *code > 0))
    }

    /// A layer is uneven when it has at least one block and at least one gap.
    #[must_use]
    pub fn is_layer_uneven(&self, layer: u32) -> bool {
        self.layer(layer).is_some_and(|cells| {
            let occupied = cells.iter().filter(|code| **code > 0).count();
            occupied > 0 && occupied < cells.len()
        })
    }

    /// A layer is solid when every cell holds a block.
    #[must_use]
    pub fn is_layer_solid(&self, layer: u32) -> bool {
        self.layer(layer)
            .is_some_and(|cells| cells.iter().all(|code| *code > 0))
    }

    /// Removes a layer, shifting every layer above it down by one and
    /// clearing the topmost layer. Out-of-range indices are ignored.
    pub fn remove_layer(&mut self, layer: u32) {
        let start = layer as usize * LAYER_CELLS;
        if start >= self.cells.len() {
            return;
        }

        self.cells.copy_within(start + LAYER_CELLS.., start);
        let top = self.cells.len() - LAYER_CELLS;
        self.cells[top..].fill(0);
    }

    /// Height of the tower: the highest layer holding a block, plus one.
    #[must_use]
    pub fn height(&self) -> u32 {
        (0..MAX_HEIGHT as u32)
            .rev()
            .find(|layer| self.has_blocks(*layer))
            .map_or(0, |layer| layer + 1)
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Iterator over every occupied cell as `(x, y, z, color)`.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32, i32, ColorIndex)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, code)| {
            let color = ColorIndex::from_cell_code(*code)?;
            let z = index / LAYER_CELLS;
            let within = index % LAYER_CELLS;
            let x = within / GRID_SIZE;
            let y = within % GRID_SIZE;
            Some((x as i32, y as i32, z as i32, color))
        })
    }

    fn layer(&self, layer: u32) -> Option<&[u8]> {
        let start = usize::try_from(layer).ok()?.checked_mul(LAYER_CELLS)?;
        self.cells.get(start..start + LAYER_CELLS)
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !in_horizontal_bounds(x, y) {
            return None;
        }
        let z = usize::try_from(z).ok()?;
        if z >= MAX_HEIGHT {
            return None;
        }
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        Some(z * LAYER_CELLS + x * GRID_SIZE + y)
    }
}

fn in_horizontal_bounds(x: i32, y: i32) -> bool {
    let size = GRID_SIZE as i32;
    (0..size).contains(&x) && (0..size).contains(&y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sky_bridge_siege_core::{piece_cells, Rotation, ShapeKind};

    fn color(index: u8) -> ColorIndex {
        ColorIndex::new(index).expect("palette color")
    }

    fn fill_layer(grid: &mut TowerGrid, layer: i32, color_index: u8) {
        for x in 0..GRID_SIZE as i32 {
            for y in 0..GRID_SIZE as i32 {
                assert!(grid.set(x, y, layer, color(color_index)));
            }
        }
    }

    #[test]
    fn out_of_bounds_writes_are_rejected() {
        let mut grid = TowerGrid::new();
        assert!(!grid.set(-1, 0, 0, color(0)));
        assert!(!grid.set(0, GRID_SIZE as i32, 0, color(0)));
        assert!(!grid.set(0, 0, MAX_HEIGHT as i32, color(0)));
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn uneven_and_solid_are_exclusive() {
        let mut grid = TowerGrid::new();
        assert!(!grid.is_layer_uneven(0));
        assert!(!grid.is_layer_solid(0));

        assert!(grid.set(2, 3, 0, color(4)));
        assert!(grid.is_layer_uneven(0));
        assert!(!grid.is_layer_solid(0));

        fill_layer(&mut grid, 0, 1);
        assert!(grid.is_layer_solid(0));
        assert!(!grid.is_layer_uneven(0));
    }

    #[test]
    fn partial_placement_leaves_grid_untouched() {
        let mut grid = TowerGrid::new();
        let cells = piece_cells(ShapeKind::I, Rotation::Identity, 2, 0, 0.0);
        assert!(!grid.place(&cells, 0, color(2)));
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn collision_covers_floor_walls_and_blocks() {
        let mut grid = TowerGrid::new();
        let floor = piece_cells(ShapeKind::O, Rotation::Identity, 0, 0, -0.2);
        assert!(grid.collides(&floor));

        let wall = piece_cells(ShapeKind::O, Rotation::Identity, 3, 0, 4.0);
        assert!(grid.collides(&wall));

        assert!(grid.set(1, 1, 2, color(0)));
        let resting = piece_cells(ShapeKind::O, Rotation::Identity, 0, 0, 2.7);
        assert!(grid.collides(&resting));
        let above = piece_cells(ShapeKind::O, Rotation::Identity, 0, 0, 3.0);
        assert!(!grid.collides(&above));

        let sky = piece_cells(ShapeKind::O, Rotation::Identity, 0, 0, 80.0);
        assert!(!grid.collides(&sky));
    }

    #[test]
    fn removing_a_layer_shifts_everything_above_down() {
        let mut grid = TowerGrid::new();
        assert!(grid.set(0, 0, 0, color(0)));
        assert!(grid.set(1, 0, 1, color(1)));
        assert!(grid.set(2, 0, 2, color(2)));
        let top = MAX_HEIGHT as i32 - 1;
        assert!(grid.set(3, 3, top, color(3)));

        grid.remove_layer(1);

        assert_eq!(grid.color_at(0, 0, 0), Some(color(0)));
        assert_eq!(grid.color_at(2, 0, 1), Some(color(2)));
        assert!(!grid.is_occupied(1, 0, 1));
        assert_eq!(grid.color_at(3, 3, top - 1), Some(color(3)));
        assert!(!grid.has_blocks(top as u32));
    }

    #[test]
    fn height_tracks_highest_occupied_layer() {
        let mut grid = TowerGrid::new();
        assert_eq!(grid.height(), 0);
        assert!(grid.set(1, 2, 6, color(5)));
        assert_eq!(grid.height(), 7);
        grid.clear();
        assert_eq!(grid.height(), 0);
    }
}
