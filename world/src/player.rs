//! Player pose, held-control steering and camera placement.

use sky_bridge_siege_core::{
    aim_direction, Control, HeldControls, PlayerSnapshot, Vec3, WALL_FRONT_FACE, WALL_HEIGHT,
};

const START_YAW_DEGREES: f32 = 90.0;
const PITCH_LIMIT_DEGREES: f32 = 89.0;
const THIRD_PERSON_DISTANCE: f32 = 600.0;
const THIRD_PERSON_LIFT: f32 = 50.0;
const FIRST_PERSON_EYE_HEIGHT: f32 = 10.0;
const FIRST_PERSON_LOOK_DISTANCE: f32 = 500.0;
/// Height above the player at which projectiles leave the weapon.
const MUZZLE_HEIGHT: f32 = 5.0;

#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vec3,
    pub(crate) yaw_degrees: f32,
    pub(crate) pitch_degrees: f32,
}

impl Player {
    pub(crate) fn new() -> Self {
        Self {
            position: Vec3::new(0.0, WALL_FRONT_FACE - 15.0, WALL_HEIGHT + 20.0),
            yaw_degrees: START_YAW_DEGREES,
            pitch_degrees: 0.0,
        }
    }

    /// Applies one tick of held-control steering.
    pub(crate) fn steer(&mut self, held: &HeldControls, dt: f32, move_speed: f32, turn_speed: f32) {
        let turn = turn_speed * dt;
        self.yaw_degrees += held.axis(Control::YawLeft, Control::YawRight) * turn;
        self.set_pitch(self.pitch_degrees + held.axis(Control::PitchUp, Control::PitchDown) * turn);

        let yaw = self.yaw_degrees.to_radians();
        let forward = Vec3::new(yaw.cos(), yaw.sin(), 0.0);
        let right_yaw = (self.yaw_degrees - 90.0).to_radians();
        let right = Vec3::new(right_yaw.cos(), right_yaw.sin(), 0.0);

        let step = move_speed * dt;
        self.position += forward * held.axis(Control::MoveForward, Control::MoveBackward) * step;
        self.position += right * held.axis(Control::StrafeRight, Control::StrafeLeft) * step;
    }

    pub(crate) fn aim(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        self.yaw_degrees = yaw_degrees;
        self.set_pitch(pitch_degrees);
    }

    pub(crate) fn aim_direction(&self) -> Vec3 {
        aim_direction(self.yaw_degrees, self.pitch_degrees)
    }

    pub(crate) fn muzzle(&self) -> Vec3 {
        self.position + Vec3::Z * MUZZLE_HEIGHT
    }

    /// Camera eye and look-at target for the selected view.
    pub(crate) fn camera(&self, first_person: bool) -> (Vec3, Vec3) {
        let look = self.aim_direction();
        if first_person {
            let eye = self.position + Vec3::Z * FIRST_PERSON_EYE_HEIGHT;
            (eye, eye + look * FIRST_PERSON_LOOK_DISTANCE)
        } else {
            let eye = self.position - look * THIRD_PERSON_DISTANCE + Vec3::Z * THIRD_PERSON_LIFT;
            (eye, self.position)
        }
    }

    pub(crate) fn snapshot(&self, first_person: bool) -> PlayerSnapshot {
        let (camera_position, camera_target) = self.camera(first_person);
        PlayerSnapshot {
            position: self.position,
            yaw_degrees: self.yaw_degrees,
            pitch_degrees: self.pitch_degrees,
            camera_position,
            camera_target,
        }
    }

    fn set_pitch(&mut self, pitch_degrees: f32) {
        self.pitch_degrees = pitch_degrees.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_follows_heading() {
        let mut player = Player::new();
        let start = player.position;
        let mut held = HeldControls::default();
        held.set(Control::MoveForward, true);

        player.steer(&held, 0.5, 150.0, 120.0);

        assert!((player.position.x - start.x).abs() < 1e-3);
        assert!((player.position.y - (start.y + 75.0)).abs() < 1e-3);
        assert!((player.position.z - start.z).abs() < f32::EPSILON);
    }

    #[test]
    fn strafing_right_moves_clockwise_of_heading() {
        let mut player = Player::new();
        let start = player.position;
        let mut held = HeldControls::default();
        held.set(Control::StrafeRight, true);

        player.steer(&held, 1.0, 150.0, 120.0);

        assert!((player.position.x - (start.x + 150.0)).abs() < 1e-3);
        assert!((player.position.y - start.y).abs() < 1e-3);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut player = Player::new();
        let mut held = HeldControls::default();
        held.set(Control::PitchUp, true);

        player.steer(&held, 2.0, 150.0, 120.0);
        assert!((player.pitch_degrees - 89.0).abs() < f32::EPSILON);

        player.aim(10.0, -120.0);
        assert!((player.pitch_degrees + 89.0).abs() < f32::EPSILON);
    }

    #[test]
    fn third_person_camera_trails_the_aim() {
        let player = Player::new();
        let (eye, target) = player.camera(false);
        assert_eq!(target, player.position);
        assert!((eye.y - (player.position.y - 600.0)).abs() < 1e-3);
        assert!((eye.z - (player.position.z + 50.0)).abs() < 1e-3);

        let (eye, target) = player.camera(true);
        assert!((eye.z - (player.position.z + 10.0)).abs() < 1e-3);
        assert!((target.y - (eye.y + 500.0)).abs() < 1e-3);
    }
}
