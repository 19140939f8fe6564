//! Translation of world snapshots into rendering scenes.

use anyhow::{Context, Result};
use glam::Vec3;
use sky_bridge_siege_core::{
    layer_center_height, voxel_center, ProjectileKind, BLOCK_SIZE, GRID_SIZE, TOWER_CENTER_X,
    TOWER_CENTER_Y, TOWER_LIMIT, WALL_CENTER_Y, WALL_HEIGHT, WALL_THICKNESS, WORLD_HALF_EXTENT,
};
use sky_bridge_siege_rendering::{
    block_color, ArenaPresentation, CameraPresentation, Color, Cube, HudPresentation,
    LayerHighlight, Scene, Segment, Sphere,
};
use sky_bridge_siege_world::{query, World};

const GRID_SPACING: f32 = 100.0;
const WALL_WIDTH: f32 = 600.0;
const BLOCK_GAP: f32 = 2.0;
const HIGHLIGHT_SCALE: f32 = 1.05;
const SUMMONER_ZONE_SCALE: f32 = 2.2;
const SUMMONER_BEAM_HEIGHT: f32 = 300.0;

const GRID_COLOR: Color = Color::rgb(0.5, 0.5, 0.5);
const WALL_COLOR: Color = Color::rgb(0.3, 0.3, 0.4);
const ZONE_COLOR: Color = Color::rgb(0.5, 0.0, 0.0);
const SUMMONER_COLOR: Color = Color::rgb(0.8, 0.0, 0.0);
const BEAM_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);
const PLAYER_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const GUN_COLOR: Color = Color::rgb(0.0, 0.8, 0.8);
const ENEMY_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);
const BULLET_COLOR: Color = Color::rgb(1.0, 1.0, 0.0);
const GRENADE_COLOR: Color = Color::rgb(0.0, 0.8, 0.0);
const NUKE_OUTER_COLOR: Color = Color::new(1.0, 0.5, 0.0, 0.5);
const NUKE_CORE_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.8);

/// Static scenery: ground grid, wall and the summoner zone around the tower.
pub(crate) fn arena() -> Result<ArenaPresentation> {
    let wall = Cube::new(
        Vec3::new(0.0, WALL_CENTER_Y, WALL_HEIGHT / 2.0),
        Vec3::new(WALL_WIDTH, WALL_THICKNESS, WALL_HEIGHT),
        WALL_COLOR,
    );
    let half_zone = GRID_SIZE as f32 * BLOCK_SIZE / 2.0 * SUMMONER_ZONE_SCALE;
    let zone = Cube::new(
        Vec3::new(TOWER_CENTER_X, TOWER_CENTER_Y, 1.0),
        Vec3::new(2.0 * half_zone, 2.0 * half_zone, 2.0),
        ZONE_COLOR,
    );

    let mut arena = ArenaPresentation::new(WORLD_HALF_EXTENT, GRID_SPACING, GRID_COLOR, wall, zone)
        .context("failed to describe the arena")?;
    for (dx, dy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        let base = Vec3::new(
            TOWER_CENTER_X + dx * half_zone,
            TOWER_CENTER_Y + dy * half_zone,
            10.0,
        );
        arena.summoners.push(Sphere::new(base, 10.0, SUMMONER_COLOR));
        arena.beams.push(Segment {
            from: base,
            to: base + Vec3::Z * SUMMONER_BEAM_HEIGHT,
            color: BEAM_COLOR,
        });
    }
    Ok(arena)
}

pub(crate) fn camera(world: &World) -> CameraPresentation {
    let player = query::player(world);
    CameraPresentation {
        position: player.camera_position,
        target: player.camera_target,
    }
}

/// Rebuilds every dynamic part of `scene` from the current world state.
pub(crate) fn populate(scene: &mut Scene, world: &World) {
    scene.clear_actors();
    scene.camera = camera(world);

    let toggles = query::toggles(world);
    let counters = query::counters(world);
    let player = query::player(world);
    let block = Vec3::splat(BLOCK_SIZE - BLOCK_GAP);

    scene.blocks.extend(
        query::grid(world)
            .occupied()
            .map(|(x, y, z, color)| Cube::new(voxel_center(x, y, z as f32), block, block_color(color))),
    );

    if let Some(piece) = query::active_piece(world) {
        let color = block_color(piece.color);
        scene.piece.extend(
            piece
                .cells()
                .iter()
                .map(|cell| Cube::new(voxel_center(cell.x, cell.y, cell.z), block, color)),
        );
    }

    if toggles.slice_mode {
        let grid = query::grid(world);
        let hovered = query::hovered_layer(world);
        let extent = GRID_SIZE as f32 * BLOCK_SIZE * HIGHLIGHT_SCALE;
        scene.highlights.extend(
            (0..query::tower_height(world))
                .filter(|&layer| grid.is_layer_solid(layer))
                .map(|layer| LayerHighlight {
                    bounds: Cube::new(
                        Vec3::new(TOWER_CENTER_X, TOWER_CENTER_Y, layer_center_height(layer)),
                        Vec3::new(extent, extent, BLOCK_SIZE * HIGHLIGHT_SCALE),
                        PLAYER_COLOR,
                    ),
                    hovered: hovered == Some(layer),
                }),
        );
    }

    if !toggles.first_person {
        scene.player = Some(Sphere::new(player.position, 15.0, PLAYER_COLOR));
        let muzzle = player.position + Vec3::Z * 5.0;
        scene.gun = Some(Segment {
            from: muzzle,
            to: muzzle + player.aim_direction() * 30.0,
            color: GUN_COLOR,
        });
    }

    scene.enemies.extend(
        query::enemy_view(world)
            .iter()
            .map(|enemy| Sphere::new(enemy.position, 12.0, ENEMY_COLOR)),
    );
    scene
        .projectiles
        .extend(query::projectiles(world).iter().map(|projectile| {
            match projectile.kind {
                ProjectileKind::Bullet => Sphere::new(projectile.position, 4.0, BULLET_COLOR),
                ProjectileKind::Grenade => Sphere::new(projectile.position, 6.0, GRENADE_COLOR),
            }
        }));
    scene
        .particles
        .extend(query::particles(world).iter().map(|particle| {
            let [red, green, blue] = particle.color;
            Sphere::new(
                particle.position,
                1.5,
                Color::new(red, green, blue, particle.remaining.clamp(0.0, 1.0)),
            )
        }));
    if let Some(nuke) = query::nuke(world) {
        scene.nuke.push(Sphere::new(nuke.position, nuke.scale, NUKE_OUTER_COLOR));
        scene
            .nuke
            .push(Sphere::new(nuke.position, nuke.scale * 0.5, NUKE_CORE_COLOR));
    }

    scene.hud = HudPresentation {
        score: counters.score,
        lives: counters.lives,
        tower_height: query::tower_height(world),
        tower_limit: TOWER_LIMIT,
        killstreak: counters.killstreak,
        grenades: counters.grenades,
        nuke_ready: counters.nuke_available,
        cheat_mode: toggles.cheat_mode,
        slice_mode: toggles.slice_mode,
        paused: toggles.paused,
        debug_position: toggles.debug.then_some(player.position),
        game_over: toggles.game_over.map(|reason| reason.message()),
        crosshair: toggles.first_person || toggles.slice_mode,
    };
}
