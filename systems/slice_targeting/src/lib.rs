#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ray-cast selection of the solid layer the player is aiming at.

use sky_bridge_siege_core::{
    layer_center_height, Command, PlayerSnapshot, ToggleState, Vec3, BLOCK_SIZE, GRID_SIZE,
    TOWER_CENTER_X, TOWER_CENTER_Y,
};
use sky_bridge_siege_world::TowerGrid;

/// Rays nearly parallel to the layer planes never select a layer.
const MIN_VERTICAL_COMPONENT: f32 = 0.001;
/// Extra margin around the tower footprint that still counts as a hit.
const FOOTPRINT_TOLERANCE: f32 = BLOCK_SIZE;

/// Pure system that keeps the hovered slice layer in sync with the aim.
#[derive(Debug, Default)]
pub struct SliceTargeting;

impl SliceTargeting {
    /// Creates a new slice targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits the hovered layer while slice mode is on and clears it otherwise.
    pub fn handle(
        &self,
        toggles: &ToggleState,
        player: &PlayerSnapshot,
        grid: &TowerGrid,
        tower_height: u32,
        out: &mut Vec<Command>,
    ) {
        let layer = if toggles.slice_mode {
            hovered_layer(player.camera_position, player.aim_direction(), grid, tower_height)
        } else {
            None
        };
        out.push(Command::SetHoveredLayer { layer });
    }
}

/// Nearest solid layer whose mid-plane the ray crosses inside the tower
/// footprint, if any.
#[must_use]
pub fn hovered_layer(
    origin: Vec3,
    direction: Vec3,
    grid: &TowerGrid,
    tower_height: u32,
) -> Option<u32> {
    if direction.z.abs() < MIN_VERTICAL_COMPONENT {
        return None;
    }

    let mut best: Option<(f32, u32)> = None;
    for layer in 0..tower_height {
        if !grid.is_layer_solid(layer) {
            continue;
        }

        let t = (layer_center_height(layer) - origin.z) / direction.z;
        if t <= 0.0 || best.is_some_and(|(nearest, _)| t >= nearest) {
            continue;
        }

        let hit = origin + direction * t;
        if within_footprint(hit) {
            best = Some((t, layer));
        }
    }
    best.map(|(_, layer)| layer)
}

fn within_footprint(point: Vec3) -> bool {
    let half_extent = GRID_SIZE as f32 * BLOCK_SIZE / 2.0 + FOOTPRINT_TOLERANCE;
    (point.x - TOWER_CENTER_X).abs() <= half_extent
        && (point.y - TOWER_CENTER_Y).abs() <= half_extent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn footprint_includes_one_block_of_tolerance() {
        assert!(within_footprint(Vec3::new(120.0, 300.0, 0.0)));
        assert!(within_footprint(Vec3::new(0.0, 180.0, 0.0)));
        assert!(!within_footprint(Vec3::new(121.0, 300.0, 0.0)));
        assert!(!within_footprint(Vec3::new(0.0, 421.0, 0.0)));
    }

    #[test]
    fn horizontal_rays_never_hover() {
        let grid = TowerGrid::new();
        assert_eq!(hovered_layer(Vec3::ZERO, Vec3::Y, &grid, 10), None);
    }
}
