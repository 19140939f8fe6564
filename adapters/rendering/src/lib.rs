#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Sky-Bridge Siege adapters.

use anyhow::Result as AnyResult;
use glam::Vec3;
use sky_bridge_siege_core::{Action, ColorIndex, HeldControls};
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from floating point channels.
    #[must_use]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Returns the same color with the provided opacity.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Colors assigned to tower blocks, indexed by [`ColorIndex`].
pub const BLOCK_PALETTE: [Color; 7] = [
    Color::rgb(0.0, 0.8, 0.8),
    Color::rgb(0.0, 0.0, 1.0),
    Color::rgb(0.8, 0.4, 0.0),
    Color::rgb(0.8, 0.8, 0.0),
    Color::rgb(0.5, 0.0, 0.8),
    Color::rgb(1.0, 0.0, 0.0),
    Color::rgb(0.0, 0.8, 0.0),
];

/// Looks up the presentation color of a block.
#[must_use]
pub fn block_color(color: ColorIndex) -> Color {
    BLOCK_PALETTE[usize::from(color.get()) % BLOCK_PALETTE.len()]
}

/// Axis-aligned cube positioned by its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cube {
    /// Center of the cube in world units.
    pub center: Vec3,
    /// Edge lengths along each axis.
    pub size: Vec3,
    /// Fill color.
    pub color: Color,
}

impl Cube {
    /// Creates a new cube descriptor.
    #[must_use]
    pub const fn new(center: Vec3, size: Vec3, color: Color) -> Self {
        Self {
            center,
            size,
            color,
        }
    }
}

/// Sphere positioned by its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    /// Center of the sphere in world units.
    pub center: Vec3,
    /// Radius in world units.
    pub radius: f32,
    /// Fill color.
    pub color: Color,
}

impl Sphere {
    /// Creates a new sphere descriptor.
    #[must_use]
    pub const fn new(center: Vec3, radius: f32, color: Color) -> Self {
        Self {
            center,
            radius,
            color,
        }
    }
}

/// Straight segment drawn in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub from: Vec3,
    /// Second endpoint.
    pub to: Vec3,
    /// Line color.
    pub color: Color,
}

/// Viewpoint used to render the frame. The world's up axis is `+z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPresentation {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
}

/// Static scenery surrounding the play area.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaPresentation {
    /// Half the side length of the square ground.
    pub half_extent: f32,
    /// Distance between neighbouring ground grid lines.
    pub grid_spacing: f32,
    /// Color of the ground grid lines.
    pub grid_color: Color,
    /// Wall the player stands on.
    pub wall: Cube,
    /// Ground area where enemies gather, drawn as a flat slab.
    pub summoner_zone: Cube,
    /// Markers placed on the summoner zone corners.
    pub summoners: Vec<Sphere>,
    /// Beams rising from the summoner markers.
    pub beams: Vec<Segment>,
}

impl ArenaPresentation {
    /// Creates the ground description, rejecting degenerate dimensions.
    pub fn new(
        half_extent: f32,
        grid_spacing: f32,
        grid_color: Color,
        wall: Cube,
        summoner_zone: Cube,
    ) -> Result<Self, RenderingError> {
        if !(half_extent.is_finite() && half_extent > 0.0) {
            return Err(RenderingError::InvalidHalfExtent { half_extent });
        }
        if !(grid_spacing.is_finite() && grid_spacing > 0.0) {
            return Err(RenderingError::InvalidGridSpacing { grid_spacing });
        }

        Ok(Self {
            half_extent,
            grid_spacing,
            grid_color,
            wall,
            summoner_zone,
            summoners: Vec::new(),
            beams: Vec::new(),
        })
    }

    /// Ground grid lines covering the square in both directions.
    #[must_use]
    pub fn grid_lines(&self) -> Vec<Segment> {
        let steps = (2.0 * self.half_extent / self.grid_spacing).floor() as u32;
        let mut lines = Vec::with_capacity(2 * (steps as usize + 1));
        for step in 0..=steps {
            let offset = -self.half_extent + step as f32 * self.grid_spacing;
            lines.push(Segment {
                from: Vec3::new(offset, -self.half_extent, 0.0),
                to: Vec3::new(offset, self.half_extent, 0.0),
                color: self.grid_color,
            });
            lines.push(Segment {
                from: Vec3::new(-self.half_extent, offset, 0.0),
                to: Vec3::new(self.half_extent, offset, 0.0),
                color: self.grid_color,
            });
        }
        lines
    }
}

/// Slab drawn around a tower layer that can be sliced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerHighlight {
    /// Outline of the layer.
    pub bounds: Cube,
    /// Whether the player is currently aiming at this layer.
    pub hovered: bool,
}

/// Text line rendered on the heads-up display.
#[derive(Clone, Debug, PartialEq)]
pub struct HudLine {
    /// Content of the line.
    pub text: String,
    /// Color of the text.
    pub color: Color,
}

/// Scalars shown on the heads-up display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudPresentation {
    /// Current score.
    pub score: u32,
    /// Lives left.
    pub lives: u32,
    /// Current tower height in layers.
    pub tower_height: u32,
    /// Height at which the tower ends the game.
    pub tower_limit: u32,
    /// Kills since the last nuke.
    pub killstreak: u32,
    /// Grenades in stock.
    pub grenades: u32,
    /// Whether the nuke can be used.
    pub nuke_ready: bool,
    /// Whether the auto-aim assist is on.
    pub cheat_mode: bool,
    /// Whether slice targeting is on.
    pub slice_mode: bool,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Player position shown while the debug overlay is on.
    pub debug_position: Option<Vec3>,
    /// Reason the game ended, if it has.
    pub game_over: Option<&'static str>,
    /// Whether the screen-centre crosshair is drawn.
    pub crosshair: bool,
}

const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
const ORANGE: Color = Color::rgb(1.0, 0.5, 0.0);
const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
const RED: Color = Color::rgb(1.0, 0.0, 0.0);

impl HudPresentation {
    /// Status lines drawn in the top-left corner, top to bottom.
    #[must_use]
    pub fn status_lines(&self) -> Vec<HudLine> {
        let mut lines = vec![
            line(format!("Score: {}", self.score), WHITE),
            line(format!("Lives: {}", self.lives), WHITE),
            line(
                format!("Tower: {}/{}", self.tower_height, self.tower_limit),
                WHITE,
            ),
            line(format!("Killstreak: {}", self.killstreak), WHITE),
        ];
        if self.slice_mode {
            lines.push(line("SLICE MODE: Click FLICKERING layers!".into(), YELLOW));
        }
        if self.nuke_ready {
            lines.push(line("NUKE READY! Press O".into(), ORANGE));
        } else if self.grenades > 0 {
            lines.push(line(format!("GRENADES: {} (Q)", self.grenades), GREEN));
        }
        if self.cheat_mode {
            lines.push(line("CHEAT MODE ACTIVE".into(), MAGENTA));
        }
        if self.paused {
            lines.push(line("PAUSED".into(), WHITE));
        }
        if let Some(position) = self.debug_position {
            lines.push(line(
                format!(
                    "Pos: {:.0},{:.0},{:.0}",
                    position.x, position.y, position.z
                ),
                WHITE,
            ));
        }
        lines
    }

    /// Banner lines drawn in the middle of the screen once the game is over.
    #[must_use]
    pub fn game_over_lines(&self) -> Vec<HudLine> {
        let Some(reason) = self.game_over else {
            return Vec::new();
        };
        vec![
            line("GAME OVER".into(), RED),
            line(format!("Reason: {reason}"), WHITE),
            line("Press R to Restart".into(), GREEN),
        ]
    }

    /// Crosshair color, green while slicing and white otherwise.
    #[must_use]
    pub fn crosshair_color(&self) -> Option<Color> {
        if !self.crosshair {
            None
        } else if self.slice_mode {
            Some(GREEN)
        } else {
            Some(WHITE)
        }
    }
}

fn line(text: String, color: Color) -> HudLine {
    HudLine { text, color }
}

/// Scene description combining the arena, the tower and every actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Static scenery.
    pub arena: ArenaPresentation,
    /// Viewpoint for the frame.
    pub camera: CameraPresentation,
    /// Locked tower blocks.
    pub blocks: Vec<Cube>,
    /// Cells of the falling piece.
    pub piece: Vec<Cube>,
    /// Sliceable layers while slice mode is on.
    pub highlights: Vec<LayerHighlight>,
    /// Player avatar, hidden in first person.
    pub player: Option<Sphere>,
    /// Gun barrel drawn along the aim, hidden in first person.
    pub gun: Option<Segment>,
    /// Enemies currently alive.
    pub enemies: Vec<Sphere>,
    /// Bullets and grenades in flight.
    pub projectiles: Vec<Sphere>,
    /// Explosion debris.
    pub particles: Vec<Sphere>,
    /// Nuke fireball layers, outermost first.
    pub nuke: Vec<Sphere>,
    /// Heads-up display content.
    pub hud: HudPresentation,
}

impl Scene {
    /// Creates a scene with static scenery and no actors.
    #[must_use]
    pub fn new(arena: ArenaPresentation, camera: CameraPresentation) -> Self {
        Self {
            arena,
            camera,
            blocks: Vec::new(),
            piece: Vec::new(),
            highlights: Vec::new(),
            player: None,
            gun: None,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            nuke: Vec::new(),
            hud: HudPresentation::default(),
        }
    }

    /// Drops every dynamic element while keeping the scenery and camera.
    pub fn clear_actors(&mut self) {
        self.blocks.clear();
        self.piece.clear();
        self.highlights.clear();
        self.player = None;
        self.gun = None;
        self.enemies.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.nuke.clear();
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Continuous controls held down during this frame.
    pub held: HeldControls,
    /// Discrete actions triggered during this frame, in detection order.
    pub actions: Vec<Action>,
}

/// Timing measurements reported by the scene update closure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSimulationBreakdown {
    /// Time spent advancing the simulation.
    pub simulation: Duration,
    /// Time spent rebuilding the scene.
    pub scene_population: Duration,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Sky-Bridge Siege scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The ground must have a positive size.
    #[error("half_extent must be positive (received {half_extent})")]
    InvalidHalfExtent {
        /// Provided value that failed validation.
        half_extent: f32,
    },
    /// Grid lines must be a positive distance apart.
    #[error("grid_spacing must be positive (received {grid_spacing})")]
    InvalidGridSpacing {
        /// Provided value that failed validation.
        grid_spacing: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(color: Color) -> Cube {
        Cube::new(Vec3::ZERO, Vec3::ONE, color)
    }

    fn arena() -> ArenaPresentation {
        ArenaPresentation::new(
            600.0,
            100.0,
            Color::rgb(0.5, 0.5, 0.5),
            slab(Color::rgb(0.3, 0.3, 0.4)),
            slab(Color::rgb(0.5, 0.0, 0.0)),
        )
        .expect("valid arena")
    }

    #[test]
    fn arena_rejects_degenerate_dimensions() {
        let wall = slab(WHITE);
        let error = ArenaPresentation::new(600.0, 0.0, WHITE, wall, wall)
            .expect_err("zero spacing must be rejected");
        assert_eq!(
            error,
            RenderingError::InvalidGridSpacing { grid_spacing: 0.0 }
        );
        assert_eq!(
            error.to_string(),
            "grid_spacing must be positive (received 0)"
        );

        assert!(matches!(
            ArenaPresentation::new(f32::NAN, 100.0, WHITE, wall, wall),
            Err(RenderingError::InvalidHalfExtent { .. })
        ));
    }

    #[test]
    fn grid_lines_span_the_ground_on_both_axes() {
        let lines = arena().grid_lines();

        assert_eq!(lines.len(), 26);
        assert_eq!(lines[0].from, Vec3::new(-600.0, -600.0, 0.0));
        assert_eq!(lines[0].to, Vec3::new(-600.0, 600.0, 0.0));
        let last = lines[lines.len() - 1];
        assert_eq!(last.from, Vec3::new(-600.0, 600.0, 0.0));
        assert_eq!(last.to, Vec3::new(600.0, 600.0, 0.0));
    }

    #[test]
    fn hud_lists_abilities_and_flags() {
        let hud = HudPresentation {
            score: 120,
            lives: 3,
            tower_height: 4,
            tower_limit: 15,
            killstreak: 7,
            grenades: 2,
            cheat_mode: true,
            debug_position: Some(Vec3::new(1.4, -2.6, 620.0)),
            ..HudPresentation::default()
        };

        let texts: Vec<_> = hud.status_lines().into_iter().map(|l| l.text).collect();
        assert_eq!(
            texts,
            vec![
                "Score: 120",
                "Lives: 3",
                "Tower: 4/15",
                "Killstreak: 7",
                "GRENADES: 2 (Q)",
                "CHEAT MODE ACTIVE",
                "Pos: 1,-3,620",
            ]
        );
        assert!(hud.game_over_lines().is_empty());
        assert_eq!(hud.crosshair_color(), None);
    }

    #[test]
    fn nuke_readiness_replaces_the_grenade_count() {
        let hud = HudPresentation {
            grenades: 2,
            nuke_ready: true,
            slice_mode: true,
            crosshair: true,
            game_over: Some("Tower reached limit!"),
            ..HudPresentation::default()
        };

        let texts: Vec<_> = hud.status_lines().into_iter().map(|l| l.text).collect();
        assert!(texts.contains(&"NUKE READY! Press O".to_owned()));
        assert!(!texts.iter().any(|text| text.starts_with("GRENADES")));
        assert_eq!(hud.crosshair_color(), Some(GREEN));
        assert_eq!(hud.game_over_lines()[1].text, "Reason: Tower reached limit!");
    }

    #[test]
    fn block_colors_follow_the_palette() {
        let color = ColorIndex::new(4).expect("palette color");
        assert_eq!(block_color(color), BLOCK_PALETTE[4]);
    }

    #[test]
    fn clearing_actors_keeps_the_scenery() {
        let camera = CameraPresentation {
            position: Vec3::new(0.0, -600.0, 650.0),
            target: Vec3::new(0.0, 0.0, 600.0),
        };
        let mut scene = Scene::new(arena(), camera);
        scene.enemies.push(Sphere::new(Vec3::ZERO, 12.0, RED));
        scene.player = Some(Sphere::new(Vec3::ZERO, 15.0, GREEN));

        scene.clear_actors();

        assert!(scene.enemies.is_empty());
        assert!(scene.player.is_none());
        assert_eq!(scene.arena, arena());
        assert_eq!(scene.camera, camera);
    }
}
