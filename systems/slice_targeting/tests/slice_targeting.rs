use sky_bridge_siege_core::{
    ColorIndex, Command, PlayerSnapshot, ToggleState, Vec3, GRID_SIZE, TOWER_CENTER_Y,
};
use sky_bridge_siege_system_slice_targeting::{hovered_layer, SliceTargeting};
use sky_bridge_siege_world::TowerGrid;

fn fill(grid: &mut TowerGrid, layer: i32) {
    let color = ColorIndex::new(2).expect("palette color");
    for x in 0..GRID_SIZE as i32 {
        for y in 0..GRID_SIZE as i32 {
            assert!(grid.set(x, y, layer, color));
        }
    }
}

fn tower_with_uneven_top() -> TowerGrid {
    let mut grid = TowerGrid::new();
    fill(&mut grid, 0);
    fill(&mut grid, 1);
    fill(&mut grid, 2);
    let color = ColorIndex::new(0).expect("palette color");
    assert!(grid.set(0, 0, 3, color));
    grid
}

fn looking_down_from(origin: Vec3) -> PlayerSnapshot {
    PlayerSnapshot {
        position: origin,
        yaw_degrees: 90.0,
        pitch_degrees: -89.0,
        camera_position: origin,
        camera_target: origin - Vec3::Z,
    }
}

#[test]
fn nearest_solid_layer_wins_and_uneven_layers_are_skipped() {
    let grid = tower_with_uneven_top();
    let origin = Vec3::new(0.0, TOWER_CENTER_Y, 1_000.0);

    let hovered = hovered_layer(origin, -Vec3::Z, &grid, grid.height());

    assert_eq!(hovered, Some(2));
}

#[test]
fn rays_from_below_pick_the_lowest_solid_layer() {
    let grid = tower_with_uneven_top();
    let origin = Vec3::new(0.0, TOWER_CENTER_Y, -50.0);

    assert_eq!(hovered_layer(origin, Vec3::Z, &grid, grid.height()), Some(0));
}

#[test]
fn rays_missing_the_footprint_select_nothing() {
    let grid = tower_with_uneven_top();
    let origin = Vec3::new(400.0, TOWER_CENTER_Y, 1_000.0);

    assert_eq!(hovered_layer(origin, -Vec3::Z, &grid, grid.height()), None);
}

#[test]
fn layers_above_the_cached_height_are_ignored() {
    let grid = tower_with_uneven_top();
    let origin = Vec3::new(0.0, TOWER_CENTER_Y, 1_000.0);

    assert_eq!(hovered_layer(origin, -Vec3::Z, &grid, 2), Some(1));
}

#[test]
fn handle_clears_the_selection_outside_slice_mode() {
    let grid = tower_with_uneven_top();
    let player = looking_down_from(Vec3::new(0.0, TOWER_CENTER_Y, 1_000.0));
    let targeting = SliceTargeting::new();

    let mut commands = Vec::new();
    targeting.handle(&ToggleState::default(), &player, &grid, grid.height(), &mut commands);
    assert_eq!(commands, vec![Command::SetHoveredLayer { layer: None }]);

    commands.clear();
    let slicing = ToggleState {
        slice_mode: true,
        ..ToggleState::default()
    };
    targeting.handle(&slicing, &player, &grid, grid.height(), &mut commands);
    assert_eq!(commands, vec![Command::SetHoveredLayer { layer: Some(2) }]);
}
