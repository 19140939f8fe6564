#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed 3D rendering adapter for Sky-Bridge Siege.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The world uses `+z` as its up axis, so the 3D camera is configured with
//! that up vector and the ground grid is drawn by hand instead of with
//! macroquad's `y`-up helpers.

use anyhow::Result;
use macroquad::{
    camera::{set_camera, set_default_camera, Camera3D},
    input::{is_key_down, is_key_pressed, is_mouse_button_pressed, KeyCode, MouseButton},
    math::{vec3, Vec3 as MacroquadVec3},
    models::{draw_cube, draw_cube_wires, draw_line_3d, draw_sphere},
};
use sky_bridge_siege_core::{Action, Control, HeldControls};
use sky_bridge_siege_rendering::{
    Color, Cube, FrameInput, FrameSimulationBreakdown, HudLine, LayerHighlight, Presentation,
    RenderingBackend, Scene, Segment, Sphere,
};
use std::time::{Duration, Instant};

const HELD_BINDINGS: [(KeyCode, Control); 8] = [
    (KeyCode::W, Control::MoveForward),
    (KeyCode::S, Control::MoveBackward),
    (KeyCode::A, Control::StrafeLeft),
    (KeyCode::D, Control::StrafeRight),
    (KeyCode::Left, Control::YawLeft),
    (KeyCode::Right, Control::YawRight),
    (KeyCode::Up, Control::PitchUp),
    (KeyCode::Down, Control::PitchDown),
];

const ACTION_BINDINGS: [(KeyCode, Action); 8] = [
    (KeyCode::Space, Action::Fire),
    (KeyCode::Q, Action::Grenade),
    (KeyCode::O, Action::Nuke),
    (KeyCode::R, Action::Restart),
    (KeyCode::P, Action::Pause),
    (KeyCode::C, Action::ToggleCheat),
    (KeyCode::E, Action::ToggleSlice),
    (KeyCode::B, Action::ToggleDebug),
];

const HUD_FONT_SIZE: f32 = 24.0;
const HUD_LINE_SPACING: f32 = 28.0;
const CROSSHAIR_HALF_LENGTH: f32 = 10.0;
const HIGHLIGHT_PULSE_RATE: f64 = 10.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    scene_population: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    simulation_accum: Duration,
    scene_population_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_simulation: Duration,
    avg_scene_population: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once a second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.scene_population_accum += breakdown.scene_population;
        self.render_accum += breakdown.render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let frames = self.frames.max(1);
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / self.elapsed.as_secs_f32(),
            avg_simulation: self.simulation_accum / frames,
            avg_scene_population: self.scene_population_accum / frames,
            avg_render: self.render_accum / frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1000,
            window_height: 800,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                let frame_dt = frame_duration(macroquad::time::get_frame_time());
                let frame_input = gather_frame_input();
                let simulation_breakdown = update_scene(frame_dt, frame_input, &mut scene);

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                draw_world(&scene, macroquad::time::get_time());
                draw_hud(&scene);
                let render_duration = render_start.elapsed();

                let metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_breakdown.simulation,
                    scene_population: simulation_breakdown.scene_population,
                    render: render_duration,
                });
                if let Some(metrics) = metrics.filter(|_| show_fps) {
                    tracing::info!(
                        fps = f64::from(metrics.per_second),
                        sim_ms = metrics.avg_simulation.as_secs_f64() * 1_000.0,
                        scene_ms = metrics.avg_scene_population.as_secs_f64() * 1_000.0,
                        render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                        "frame timing"
                    );
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn gather_frame_input() -> FrameInput {
    frame_input_from_observations(
        is_key_down,
        is_key_pressed,
        is_mouse_button_pressed(MouseButton::Left),
        is_mouse_button_pressed(MouseButton::Right),
    )
}

fn frame_input_from_observations(
    key_down: impl Fn(KeyCode) -> bool,
    key_pressed: impl Fn(KeyCode) -> bool,
    primary_click: bool,
    secondary_click: bool,
) -> FrameInput {
    let mut held = HeldControls::default();
    for (key, control) in HELD_BINDINGS {
        held.set(control, key_down(key));
    }

    let mut actions: Vec<Action> = ACTION_BINDINGS
        .iter()
        .filter(|(key, _)| key_pressed(*key))
        .map(|&(_, action)| action)
        .collect();
    if secondary_click {
        actions.push(Action::ToggleCamera);
    }
    if primary_click {
        actions.push(Action::PrimaryClick);
    }

    FrameInput { held, actions }
}

fn draw_world(scene: &Scene, seconds: f64) {
    set_camera(&Camera3D {
        position: to_macroquad_vec(scene.camera.position),
        target: to_macroquad_vec(scene.camera.target),
        up: vec3(0.0, 0.0, 1.0),
        ..Camera3D::default()
    });

    for line in scene.arena.grid_lines() {
        draw_segment(line);
    }
    draw_solid(scene.arena.wall);
    draw_solid(scene.arena.summoner_zone);
    scene.arena.summoners.iter().copied().for_each(draw_ball);
    scene.arena.beams.iter().copied().for_each(draw_segment);

    scene.piece.iter().copied().for_each(draw_solid);
    for highlight in &scene.highlights {
        draw_highlight(*highlight, seconds);
    }
    scene.blocks.iter().copied().for_each(draw_solid);

    if let Some(player) = scene.player {
        draw_ball(player);
    }
    if let Some(gun) = scene.gun {
        draw_segment(gun);
    }
    scene.enemies.iter().copied().for_each(draw_ball);
    scene.projectiles.iter().copied().for_each(draw_ball);
    for particle in &scene.particles {
        draw_cube(
            to_macroquad_vec(particle.center),
            MacroquadVec3::splat(particle.radius * 2.0),
            None,
            to_macroquad_color(particle.color),
        );
    }
    scene.nuke.iter().copied().for_each(draw_ball);

    set_default_camera();
}

fn draw_solid(cube: Cube) {
    draw_cube(
        to_macroquad_vec(cube.center),
        to_macroquad_vec(cube.size),
        None,
        to_macroquad_color(cube.color),
    );
}

fn draw_ball(sphere: Sphere) {
    draw_sphere(
        to_macroquad_vec(sphere.center),
        sphere.radius,
        None,
        to_macroquad_color(sphere.color),
    );
}

fn draw_segment(segment: Segment) {
    draw_line_3d(
        to_macroquad_vec(segment.from),
        to_macroquad_vec(segment.to),
        to_macroquad_color(segment.color),
    );
}

fn draw_highlight(highlight: LayerHighlight, seconds: f64) {
    let color = highlight_color(highlight.hovered, seconds);
    let center = to_macroquad_vec(highlight.bounds.center);
    let size = to_macroquad_vec(highlight.bounds.size);
    draw_cube(center, size, None, to_macroquad_color(color));
    if highlight.hovered {
        draw_cube_wires(center, size, to_macroquad_color(color.with_alpha(1.0)));
    }
}

/// Hovered layers glow steadily, other sliceable layers pulse.
fn highlight_color(hovered: bool, seconds: f64) -> Color {
    let green = Color::rgb(0.0, 1.0, 0.0);
    if hovered {
        return green.with_alpha(0.8);
    }
    let pulse = 0.5 + 0.5 * (seconds * HIGHLIGHT_PULSE_RATE).sin();
    green.with_alpha(0.3 * pulse as f32)
}

fn draw_hud(scene: &Scene) {
    let hud = &scene.hud;
    let screen_width = macroquad::window::screen_width();
    let screen_height = macroquad::window::screen_height();

    for (row, line) in hud.status_lines().iter().enumerate() {
        draw_hud_line(line, 10.0, HUD_LINE_SPACING * (row as f32 + 1.0));
    }

    let banner = hud.game_over_lines();
    let top = screen_height / 2.0 - HUD_LINE_SPACING;
    for (row, line) in banner.iter().enumerate() {
        draw_hud_line(line, screen_width / 2.0 - 100.0, top + HUD_LINE_SPACING * row as f32);
    }

    if let Some(color) = hud.crosshair_color() {
        let color = to_macroquad_color(color);
        let (center_x, center_y) = (screen_width / 2.0, screen_height / 2.0);
        macroquad::shapes::draw_line(
            center_x - CROSSHAIR_HALF_LENGTH,
            center_y,
            center_x + CROSSHAIR_HALF_LENGTH,
            center_y,
            2.0,
            color,
        );
        macroquad::shapes::draw_line(
            center_x,
            center_y - CROSSHAIR_HALF_LENGTH,
            center_x,
            center_y + CROSSHAIR_HALF_LENGTH,
            2.0,
            color,
        );
    }
}

fn draw_hud_line(line: &HudLine, x: f32, y: f32) {
    let _ = macroquad::text::draw_text(
        &line.text,
        x,
        y,
        HUD_FONT_SIZE,
        to_macroquad_color(line.color),
    );
}

fn to_macroquad_vec(vector: glam::Vec3) -> MacroquadVec3 {
    vec3(vector.x, vector.y, vector.z)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

/// Platform frame time as a duration. Negative or non-finite readings become an empty frame.
fn frame_duration(seconds: f32) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::try_from_secs_f32(seconds).unwrap_or_default()
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bogus_frame_times_become_empty_frames() {
        assert_eq!(frame_duration(0.25), Duration::from_millis(250));
        assert_eq!(frame_duration(-1.0), Duration::ZERO);
        assert_eq!(frame_duration(f32::NAN), Duration::ZERO);
        assert_eq!(frame_duration(f32::INFINITY), Duration::ZERO);
    }

    #[test]
    fn held_keys_map_to_controls() {
        let input = frame_input_from_observations(
            |key| matches!(key, KeyCode::W | KeyCode::Left),
            |_| false,
            false,
            false,
        );

        assert!(input.held.is_held(Control::MoveForward));
        assert!(input.held.is_held(Control::YawLeft));
        assert!(!input.held.is_held(Control::MoveBackward));
        assert!(!input.held.is_held(Control::PitchUp));
        assert!(input.actions.is_empty());
    }

    #[test]
    fn presses_and_clicks_become_actions_in_binding_order() {
        let input = frame_input_from_observations(
            |_| false,
            |key| matches!(key, KeyCode::E | KeyCode::Space | KeyCode::Z),
            true,
            true,
        );

        assert_eq!(
            input.actions,
            vec![
                Action::Fire,
                Action::ToggleSlice,
                Action::ToggleCamera,
                Action::PrimaryClick,
            ]
        );
        assert_eq!(input.held, HeldControls::default());
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = FrameBreakdown {
            frame: Duration::from_millis(250),
            simulation: Duration::from_millis(2),
            scene_population: Duration::from_millis(1),
            render: Duration::from_millis(4),
        };

        for _ in 0..3 {
            assert!(counter.record_frame(frame).is_none());
        }
        let metrics = counter.record_frame(frame).expect("a full second elapsed");
        assert!((metrics.per_second - 4.0).abs() < 1e-4);
        assert_eq!(metrics.avg_simulation, Duration::from_millis(2));
        assert_eq!(metrics.avg_render, Duration::from_millis(4));
        assert!(counter.record_frame(frame).is_none());
    }

    #[test]
    fn hovered_highlights_stay_bright_while_others_pulse() {
        assert!((highlight_color(true, 0.3).alpha - 0.8).abs() < f32::EPSILON);
        let dim = highlight_color(false, 0.0);
        assert!((dim.alpha - 0.15).abs() < 1e-6);
        assert!(highlight_color(false, 1.0).alpha <= 0.3);
    }
}
