//! Structural-integrity scan run after locks.

use crate::grid::TowerGrid;

/// Collects every unstable layer of the tower in ascending order.
///
/// A layer is unstable when it is uneven and both layers directly above it
/// hold at least one block. The caller removes the returned layers from the
/// highest index down so earlier removals never shift later targets.
#[must_use]
pub fn unstable_layers(grid: &TowerGrid, tower_height: u32) -> Vec<u32> {
    (0..tower_height.saturating_sub(2))
        .filter(|&layer| {
            grid.is_layer_uneven(layer) && grid.has_blocks(layer + 1) && grid.has_blocks(layer + 2)
        })
        .collect()
}
