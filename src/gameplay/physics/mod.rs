use crate::config::PhysicsConfig;
use bevy::math::Vec2;
use serde::Serialize;

/// Instantaneous force multipliers for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForceProfile {
    pub upward_force: f32,
    pub air_control: f32,
    pub gravity_scale: f32,
}

/// Stateless mapping from motion and attitude to force multipliers.
#[derive(Debug, Clone)]
pub struct PhysicsResolver {
    config: PhysicsConfig,
}

impl PhysicsResolver {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, velocity: Vec2, rotation: f32, _grounded: bool, nitro_active: bool) -> ForceProfile {
        let config = &self.config;
        let forward_speed = velocity.x.abs();
        let speed_factor = forward_speed / config.lift_reference_speed;
        // Nose-up is negative rotation.
        let pitch_factor = (-rotation / config.lift_reference_angle).max(0.0);

        let mut profile = ForceProfile {
            upward_force: speed_factor * pitch_factor * config.max_upward_force,
            air_control: config.base_air_control,
            gravity_scale: 1.0,
        };

        if nitro_active {
            profile.upward_force *= config.nitro_lift_multiplier;
            profile.air_control *= config.nitro_air_control_multiplier;
            profile.gravity_scale *= config.nitro_gravity_multiplier;
        }

        if forward_speed > config.high_speed_threshold {
            profile.upward_force *= config.high_speed_lift_multiplier;
            profile.gravity_scale *= config.high_speed_gravity_multiplier;
        }

        profile
    }

    pub fn gravity(&self, gravity_scale: f32) -> f32 {
        self.config.base_gravity * gravity_scale
    }

    /// Vertical acceleration after subtracting lift from scaled gravity.
    pub fn vertical_acceleration(&self, profile: &ForceProfile) -> f32 {
        self.gravity(profile.gravity_scale) - profile.upward_force * self.config.lift_scale
    }
}
