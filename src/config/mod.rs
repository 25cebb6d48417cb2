use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "config";

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_game_config)
            .add_systems(Update, reload_game_config_hotkey);
    }
}

fn load_game_config(mut commands: Commands) {
    let config = GameConfig::load_from_dir(Path::new(CONFIG_DIR)).unwrap_or_else(|error| {
        panic!("failed to load configuration from `{CONFIG_DIR}`: {error}");
    });

    log_config_summary("Loaded", &config);
    info!("Press F5 to hot-reload config files from `{CONFIG_DIR}` (applies on restart with R).");

    commands.insert_resource(config);
}

fn reload_game_config_hotkey(
    keyboard: Res<ButtonInput<KeyCode>>,
    game_config: Option<ResMut<GameConfig>>,
) {
    if !keyboard.just_pressed(KeyCode::F5) {
        return;
    }

    let Some(mut current_config) = game_config else {
        warn!("Config hot-reload requested, but `GameConfig` resource is not initialized yet.");
        return;
    };

    match GameConfig::load_from_dir(Path::new(CONFIG_DIR)) {
        Ok(new_config) => {
            *current_config = new_config;
            log_config_summary("Hot-reloaded", &current_config);
        }
        Err(error) => {
            error!("Config hot-reload failed; keeping previous config: {error}");
        }
    }
}

fn log_config_summary(prefix: &str, config: &GameConfig) {
    info!(
        "{prefix} config: {} terrain segments of {:.0} units, top speed {:.0}, nitro x{:.1}, {} particle slots.",
        config.terrain.segments_to_keep,
        config.terrain.segment_width,
        config.vehicle.max_speed,
        config.nitro.speed_multiplier,
        config.particles.capacity
    );
}

#[derive(Resource, Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub app: AppConfig,
    pub world: WorldConfig,
    pub terrain: TerrainConfig,
    pub vehicle: VehicleConfig,
    pub nitro: NitroConfig,
    pub physics: PhysicsConfig,
    pub scoring: ScoringConfig,
    pub particles: ParticleConfig,
    pub hud: HudConfig,
    pub sky: SkyConfig,
}

impl GameConfig {
    pub fn load_from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig = read_toml(&config_dir.join("game.toml"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.max_frame_delta_s <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::app.max_frame_delta_s must be > 0".to_string(),
            ));
        }

        if self.world.canvas_width <= 0.0 || self.world.canvas_height <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::world canvas dimensions must be > 0".to_string(),
            ));
        }

        let terrain = &self.terrain;
        if terrain.segment_width <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::terrain.segment_width must be > 0".to_string(),
            ));
        }
        if terrain.sample_spacing <= 0.0 || terrain.sample_spacing > terrain.segment_width {
            return Err(ConfigError::Validation(
                "game.toml::terrain.sample_spacing must be in (0, segment_width]".to_string(),
            ));
        }
        if terrain.segments_to_keep < 2 {
            return Err(ConfigError::Validation(
                "game.toml::terrain.segments_to_keep must be >= 2".to_string(),
            ));
        }
        if terrain.lookahead < 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::terrain.lookahead must be >= 0".to_string(),
            ));
        }
        if terrain.floor_y() >= terrain.ceiling_y() {
            return Err(ConfigError::Validation(format!(
                "game.toml::terrain band is empty: min_y + floor_margin ({}) must be < max_y - ceiling_margin ({})",
                terrain.floor_y(),
                terrain.ceiling_y()
            )));
        }
        if terrain.max_step_delta <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::terrain.max_step_delta must be > 0".to_string(),
            ));
        }
        if terrain.flat_run_min == 0 || terrain.flat_run_min > terrain.flat_run_max {
            return Err(ConfigError::Validation(
                "game.toml::terrain flat run range is invalid (need 1 <= flat_run_min <= flat_run_max)"
                    .to_string(),
            ));
        }
        for (label, value) in [
            ("flat_chance", terrain.flat_chance),
            ("hill_to_flat_chance", terrain.hill_to_flat_chance),
            ("drop_chance", terrain.drop_chance),
            ("rise_chance", terrain.rise_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "game.toml::terrain.{label} must be in [0, 1]"
                )));
            }
        }
        if terrain.drop_progress_step <= 0.0 || terrain.rise_progress_step <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::terrain drop/rise progress steps must be > 0".to_string(),
            ));
        }

        let vehicle = &self.vehicle;
        if vehicle.wheel_base <= 0.0 || vehicle.width <= 0.0 || vehicle.height <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::vehicle dimensions must be > 0".to_string(),
            ));
        }
        if vehicle.max_speed <= 0.0 || vehicle.acceleration <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::vehicle max_speed and acceleration must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&vehicle.reverse_speed_fraction) {
            return Err(ConfigError::Validation(
                "game.toml::vehicle.reverse_speed_fraction must be in [0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&vehicle.suspension_stiffness)
            || !(0.0..=1.0).contains(&vehicle.suspension_damping)
        {
            return Err(ConfigError::Validation(
                "game.toml::vehicle suspension constants must be in [0, 1]".to_string(),
            ));
        }
        if vehicle.ground_idle_damping < 0.0 || vehicle.air_idle_damping < 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::vehicle idle damping must be >= 0".to_string(),
            ));
        }
        if vehicle.contact_threshold <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::vehicle.contact_threshold must be > 0".to_string(),
            ));
        }
        if vehicle.landing_bounce_impact_scale <= 0.0 || vehicle.landing_bounce_decay < 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::vehicle landing bounce scale must be > 0 and decay >= 0".to_string(),
            ));
        }

        let nitro = &self.nitro;
        if nitro.capacity <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::nitro.capacity must be > 0".to_string(),
            ));
        }
        if nitro.speed_multiplier < 1.0 {
            return Err(ConfigError::Validation(
                "game.toml::nitro.speed_multiplier must be >= 1".to_string(),
            ));
        }
        if nitro.depletion_rate <= 0.0 || nitro.recharge_rate < 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::nitro depletion must be > 0 and recharge >= 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&nitro.movement_recharge_penalty) {
            return Err(ConfigError::Validation(
                "game.toml::nitro.movement_recharge_penalty must be in [0, 1]".to_string(),
            ));
        }

        let physics = &self.physics;
        if physics.base_gravity <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::physics.base_gravity must be > 0".to_string(),
            ));
        }
        if physics.lift_reference_speed <= 0.0 || physics.lift_reference_angle <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::physics lift reference speed/angle must be > 0".to_string(),
            ));
        }

        if self.scoring.points_per_second < 0.0 || self.scoring.min_trick_air_time < 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::scoring values must be >= 0".to_string(),
            ));
        }

        let particles = &self.particles;
        if particles.capacity == 0 {
            return Err(ConfigError::Validation(
                "game.toml::particles.capacity must be >= 1".to_string(),
            ));
        }
        if particles.speed_per_particle <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::particles.speed_per_particle must be > 0".to_string(),
            ));
        }
        if particles.min_life <= 0.0 || particles.max_life <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::particles lifetimes must be > 0".to_string(),
            ));
        }

        if self.hud.speed_display_divisor <= 0.0 || self.hud.speed_display_max <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::hud speed divisor and ceiling must be > 0".to_string(),
            ));
        }

        if self.sky.day_length_s <= 0.0 {
            return Err(ConfigError::Validation(
                "game.toml::sky.day_length_s must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
    Validation(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse `{}`: {source}", path.display())
            }
            Self::Validation(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub max_frame_delta_s: f32,
    pub debug_overlay: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_frame_delta_s: 0.1,
            debug_overlay: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub start_x: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            start_x: 150.0,
        }
    }
}

/// Procedural terrain tuning. Heights are screen-space `y` values (down is positive).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub segment_width: f32,
    pub segments_to_keep: usize,
    pub lookahead: f32,
    pub sample_spacing: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub floor_margin: f32,
    pub ceiling_margin: f32,
    pub max_step_delta: f32,
    pub flat_chance: f64,
    pub flat_run_min: u32,
    pub flat_run_max: u32,
    pub flat_incline: f32,
    pub hill_delta: f32,
    pub hill_to_flat_chance: f64,
    pub drop_chance: f64,
    pub drop_progress_step: f32,
    pub drop_target_offset: f32,
    pub drop_target_spread: f32,
    pub rise_chance: f64,
    pub rise_progress_step: f32,
    pub rise_target_offset: f32,
    pub rise_target_spread: f32,
}

impl TerrainConfig {
    pub fn floor_y(&self) -> f32 {
        self.min_y + self.floor_margin
    }

    pub fn ceiling_y(&self) -> f32 {
        self.max_y - self.ceiling_margin
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            segment_width: 800.0,
            segments_to_keep: 5,
            lookahead: 800.0,
            sample_spacing: 20.0,
            min_y: 50.0,
            max_y: 600.0,
            floor_margin: 50.0,
            ceiling_margin: 100.0,
            max_step_delta: 25.0,
            flat_chance: 0.3,
            flat_run_min: 3,
            flat_run_max: 8,
            flat_incline: 1.0,
            hill_delta: 15.0,
            hill_to_flat_chance: 0.2,
            drop_chance: 0.3,
            drop_progress_step: 0.1,
            drop_target_offset: 100.0,
            drop_target_spread: 100.0,
            rise_chance: 0.2,
            rise_progress_step: 0.08,
            rise_target_offset: 150.0,
            rise_target_spread: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub width: f32,
    pub height: f32,
    pub wheel_base: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub reverse_speed_fraction: f32,
    pub slope_resistance: f32,
    pub slope_assist: f32,
    pub slope_bleed: f32,
    pub ground_idle_damping: f32,
    pub air_idle_damping: f32,
    pub idle_snap_speed: f32,
    pub contact_threshold: f32,
    pub suspension_stiffness: f32,
    pub suspension_damping: f32,
    pub air_rotation_speed: f32,
    pub air_nose_angle: f32,
    pub nitro_air_rotation_multiplier: f32,
    pub landing_bounce_min_impact: f32,
    pub landing_bounce_max: f32,
    pub landing_bounce_impact_scale: f32,
    pub landing_bounce_decay: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            width: 80.0,
            height: 40.0,
            wheel_base: 40.0,
            max_speed: 400.0,
            acceleration: 300.0,
            reverse_speed_fraction: 0.5,
            slope_resistance: 0.7,
            slope_assist: 0.8,
            slope_bleed: 2.0,
            ground_idle_damping: 3.08,
            air_idle_damping: 0.60,
            idle_snap_speed: 1.0,
            contact_threshold: 1.0,
            suspension_stiffness: 0.3,
            suspension_damping: 0.5,
            air_rotation_speed: 3.0,
            air_nose_angle: 0.2,
            nitro_air_rotation_multiplier: 1.5,
            landing_bounce_min_impact: 200.0,
            landing_bounce_max: 0.3,
            landing_bounce_impact_scale: 2000.0,
            landing_bounce_decay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NitroConfig {
    pub capacity: f32,
    pub speed_multiplier: f32,
    pub depletion_rate: f32,
    pub recharge_rate: f32,
    pub stationary_recharge_bonus: f32,
    pub movement_recharge_penalty: f32,
    pub stationary_speed: f32,
}

impl Default for NitroConfig {
    fn default() -> Self {
        Self {
            capacity: 100.0,
            speed_multiplier: 2.5,
            depletion_rate: 45.0,
            recharge_rate: 25.0,
            stationary_recharge_bonus: 0.8,
            movement_recharge_penalty: 0.5,
            stationary_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub base_gravity: f32,
    pub max_upward_force: f32,
    pub lift_reference_speed: f32,
    pub lift_reference_angle: f32,
    pub lift_scale: f32,
    pub base_air_control: f32,
    pub nitro_lift_multiplier: f32,
    pub nitro_air_control_multiplier: f32,
    pub nitro_gravity_multiplier: f32,
    pub high_speed_threshold: f32,
    pub high_speed_lift_multiplier: f32,
    pub high_speed_gravity_multiplier: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            base_gravity: 980.0,
            max_upward_force: 0.4,
            lift_reference_speed: 400.0,
            lift_reference_angle: std::f32::consts::FRAC_PI_4,
            lift_scale: 1000.0,
            base_air_control: 0.3,
            nitro_lift_multiplier: 1.5,
            nitro_air_control_multiplier: 1.4,
            nitro_gravity_multiplier: 0.6,
            high_speed_threshold: 300.0,
            high_speed_lift_multiplier: 1.2,
            high_speed_gravity_multiplier: 0.85,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_per_second: f32,
    pub min_trick_air_time: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_second: 1000.0,
            min_trick_air_time: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub capacity: usize,
    pub spawn_speed_threshold: f32,
    pub speed_per_particle: f32,
    pub gravity: f32,
    pub spawn_spread_x: f32,
    pub kick_speed_factor: f32,
    pub max_kick_up_speed: f32,
    pub min_life: f32,
    pub life_spread: f32,
    pub max_life: f32,
    pub min_size: f32,
    pub size_spread: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            capacity: 512,
            spawn_speed_threshold: 50.0,
            speed_per_particle: 100.0,
            gravity: 400.0,
            spawn_spread_x: 20.0,
            kick_speed_factor: 0.3,
            max_kick_up_speed: 200.0,
            min_life: 0.5,
            life_spread: 0.5,
            max_life: 1.0,
            min_size: 2.0,
            size_spread: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HudConfig {
    pub speed_display_divisor: f32,
    pub speed_display_max: f32,
    pub trick_popup_seconds: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            speed_display_divisor: 2.0,
            speed_display_max: 200.0,
            trick_popup_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SkyConfig {
    pub day_length_s: f32,
    pub star_count: usize,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            day_length_s: 1200.0,
            star_count: 100,
        }
    }
}
