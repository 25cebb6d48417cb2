use super::particles::ParticlePool;
use super::state::{ControlInput, DriveIntent, Particle, VehicleState};
use crate::config::{GameConfig, NitroConfig, ParticleConfig, VehicleConfig};
use crate::gameplay::physics::PhysicsResolver;
use crate::gameplay::scoring::{Score, ScoreTracker, TrickLanding};
use crate::gameplay::terrain::{TerrainError, TerrainWindow};
use bevy::math::Vec2;
use rand::Rng;
use serde::Serialize;
use std::f32::consts::PI;

pub const MAX_TILT_RAD: f32 = PI / 2.5;

/// Airborne-to-grounded transition observed during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingImpact {
    pub impact_speed: f32,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutcome {
    pub landing: Option<LandingImpact>,
    pub trick: Option<TrickLanding>,
    pub terrain_slides: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderSnapshot {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub velocity_sign: f32,
    pub grounded: bool,
    pub nitro_active: bool,
    pub landing_bounce: f32,
    pub particles: Vec<Particle>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HudSnapshot {
    pub speed: f32,
    pub nitro_fuel_percent: f32,
    pub max_speed: f32,
    pub score: Score,
    pub current_air_time: f32,
    pub max_air_time: f32,
}

/// Tick-driven integrator. Owns the vehicle aggregate, the terrain window, the
/// score tracker and the dust pool; nothing else mutates them.
pub struct VehicleSimulator<R: Rng> {
    vehicle: VehicleConfig,
    nitro: NitroConfig,
    dust: ParticleConfig,
    state: VehicleState,
    terrain: TerrainWindow<R>,
    physics: PhysicsResolver,
    scoring: ScoreTracker,
    particles: ParticlePool,
    effects_rng: R,
    elapsed_s: f32,
}

impl<R: Rng> VehicleSimulator<R> {
    pub fn new(config: &GameConfig, terrain_rng: R, effects_rng: R) -> Result<Self, TerrainError> {
        let terrain = TerrainWindow::new(config.terrain.clone(), terrain_rng)?;
        let start_x = config.world.start_x;
        let (_, resting_y) = ground_reference(&terrain, &config.vehicle, start_x);

        Ok(Self {
            vehicle: config.vehicle.clone(),
            nitro: config.nitro.clone(),
            dust: config.particles.clone(),
            state: VehicleState::at_rest(start_x, resting_y, config.nitro.capacity),
            terrain,
            physics: PhysicsResolver::new(config.physics.clone()),
            scoring: ScoreTracker::new(config.scoring.clone()),
            particles: ParticlePool::with_capacity(config.particles.capacity),
            effects_rng,
            elapsed_s: 0.0,
        })
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn score(&self) -> Score {
        self.scoring.score()
    }

    pub fn terrain(&self) -> &TerrainWindow<R> {
        &self.terrain
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn elapsed_s(&self) -> f32 {
        self.elapsed_s
    }

    /// Advances the simulation by one step. Non-positive or non-finite steps are
    /// ignored so a stalled clock cannot corrupt state.
    pub fn tick(&mut self, delta_time: f32, input: ControlInput) -> Result<TickOutcome, TerrainError> {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return Ok(TickOutcome::default());
        }

        let dt = delta_time;
        let was_grounded = self.state.grounded;
        let intent = input.drive_intent();

        self.update_nitro(dt, intent == DriveIntent::Accelerate && input.nitro);
        self.apply_drive(dt, intent);

        self.state.x += self.state.vx * dt;
        self.state.y += self.state.vy * dt;

        let (target_rotation, ground_y) = ground_reference(&self.terrain, &self.vehicle, self.state.x);
        let distance_to_ground = ground_y - self.state.y;
        self.state.grounded = distance_to_ground < self.vehicle.contact_threshold;

        let mut outcome = TickOutcome::default();
        if !was_grounded && self.state.grounded {
            let impact_speed = self.state.vy.abs();
            if impact_speed > self.vehicle.landing_bounce_min_impact {
                self.state.landing_bounce =
                    (impact_speed / self.vehicle.landing_bounce_impact_scale).min(self.vehicle.landing_bounce_max);
            }
            outcome.landing = Some(LandingImpact {
                impact_speed,
                position: Vec2::new(self.state.x, self.state.y),
            });
        }
        if self.state.grounded && self.state.landing_bounce > 0.0 {
            self.state.landing_bounce = (self.state.landing_bounce - self.vehicle.landing_bounce_decay * dt).max(0.0);
        }

        self.particles.advance(dt, self.dust.gravity);
        if self.state.grounded && self.state.speed() > self.dust.spawn_speed_threshold {
            self.spawn_dust();
        }

        if self.state.grounded {
            self.state.current_air_time = 0.0;
        } else {
            self.state.current_air_time += dt;
            self.state.max_air_time = self.state.max_air_time.max(self.state.current_air_time);
        }

        let forces = self.physics.resolve(
            Vec2::new(self.state.vx, self.state.vy),
            self.state.rotation,
            self.state.grounded,
            self.state.nitro_active,
        );
        self.state.vy += self.physics.vertical_acceleration(&forces) * dt;

        if self.state.grounded {
            self.state.y += distance_to_ground * self.vehicle.suspension_stiffness;
            self.state.vy *= self.vehicle.suspension_damping;

            let slope = self.state.rotation.sin().abs();
            self.state.vx -= self.state.vx * slope * dt * self.vehicle.slope_bleed;

            self.state.rotation += (target_rotation - self.state.rotation) * self.vehicle.suspension_stiffness;
        } else {
            let rotation_rate = if self.state.nitro_active {
                self.vehicle.air_rotation_speed * self.vehicle.nitro_air_rotation_multiplier
            } else {
                self.vehicle.air_rotation_speed
            };
            let air_target = if self.state.vx > 0.0 {
                -self.vehicle.air_nose_angle
            } else {
                self.vehicle.air_nose_angle
            };
            self.state.rotation += (air_target - self.state.rotation) * rotation_rate * dt;
        }

        self.state.rotation = self.state.rotation.clamp(-MAX_TILT_RAD, MAX_TILT_RAD);

        outcome.trick = self.scoring.update(dt, self.state.grounded);
        outcome.terrain_slides = self.terrain.advance(self.state.x)?;
        self.elapsed_s += dt;

        Ok(outcome)
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            x: self.state.x,
            y: self.state.y,
            rotation: self.state.rotation,
            velocity_sign: if self.state.vx < 0.0 { -1.0 } else { 1.0 },
            grounded: self.state.grounded,
            nitro_active: self.state.nitro_active,
            landing_bounce: self.state.landing_bounce,
            particles: self.particles.iter().copied().collect(),
        }
    }

    pub fn hud_snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            speed: self.state.speed(),
            nitro_fuel_percent: (self.state.nitro_fuel / self.nitro.capacity * 100.0).clamp(0.0, 100.0),
            max_speed: self.vehicle.max_speed,
            score: self.scoring.score(),
            current_air_time: self.state.current_air_time,
            max_air_time: self.state.max_air_time,
        }
    }

    fn update_nitro(&mut self, dt: f32, requested: bool) {
        let nitro = &self.nitro;
        let state = &mut self.state;

        if requested && state.nitro_fuel > 0.0 && !state.nitro_active {
            state.nitro_active = true;
        }

        if state.nitro_active {
            state.nitro_fuel = (state.nitro_fuel - nitro.depletion_rate * dt).max(0.0);
            if state.nitro_fuel <= 0.0 {
                state.nitro_active = false;
            }
        } else if state.nitro_fuel < nitro.capacity {
            let speed = state.vx.abs();
            let bonus = if speed < nitro.stationary_speed {
                nitro.stationary_recharge_bonus
            } else {
                -nitro.movement_recharge_penalty * (speed / self.vehicle.max_speed).min(1.0)
            };
            let recharge = nitro.recharge_rate * dt * (1.0 + bonus);
            state.nitro_fuel = (state.nitro_fuel + recharge).clamp(0.0, nitro.capacity);
        }
    }

    fn apply_drive(&mut self, dt: f32, intent: DriveIntent) {
        let vehicle = &self.vehicle;
        let state = &self.state;

        let vx = match intent {
            DriveIntent::Accelerate => {
                let boost = if state.nitro_active {
                    self.nitro.speed_multiplier
                } else {
                    1.0
                };
                let ceiling = vehicle.max_speed * boost;
                let gain = if state.grounded {
                    let resistance = state.rotation.sin().max(0.0);
                    vehicle.acceleration * dt * (1.0 - resistance * vehicle.slope_resistance) * boost
                } else {
                    vehicle.acceleration * dt * self.air_control()
                };
                // Clamps down as well once nitro ends.
                (state.vx + gain).min(ceiling)
            }
            DriveIntent::Reverse => {
                let floor = -vehicle.max_speed * vehicle.reverse_speed_fraction;
                let gain = if state.grounded {
                    let assist = (-state.rotation.sin()).max(0.0);
                    vehicle.acceleration * dt * (1.0 + assist * vehicle.slope_assist)
                } else {
                    vehicle.acceleration * dt * self.air_control()
                };
                (state.vx - gain).max(floor)
            }
            DriveIntent::Idle => {
                let damping = if state.grounded {
                    vehicle.ground_idle_damping
                } else {
                    vehicle.air_idle_damping
                };
                let vx = state.vx * f32::exp(-damping * dt);
                if vx.abs() < vehicle.idle_snap_speed {
                    0.0
                } else {
                    vx
                }
            }
        };

        self.state.vx = vx;
    }

    fn air_control(&self) -> f32 {
        self.physics
            .resolve(
                Vec2::new(self.state.vx, self.state.vy),
                self.state.rotation,
                self.state.grounded,
                self.state.nitro_active,
            )
            .air_control
    }

    fn spawn_dust(&mut self) {
        let dust = &self.dust;
        let speed = self.state.speed();
        let direction = if self.state.vx < 0.0 { -1.0 } else { 1.0 };
        let rear_x = self.state.x - direction * self.vehicle.width * 0.5;
        let floor_y = self.state.y + self.vehicle.height * 0.5;
        let count = (speed / dust.speed_per_particle).floor() as usize;

        for _ in 0..count {
            if self.particles.is_full() {
                break;
            }
            let rng = &mut self.effects_rng;
            self.particles.spawn(Particle {
                x: rear_x + direction * rng.random::<f32>() * dust.spawn_spread_x,
                y: floor_y,
                vx: -direction * speed * dust.kick_speed_factor * (0.5 + rng.random::<f32>() * 0.5),
                vy: -rng.random::<f32>() * dust.max_kick_up_speed,
                life: dust.min_life + rng.random::<f32>() * dust.life_spread,
                max_life: dust.max_life,
                size: dust.min_size + rng.random::<f32>() * dust.size_spread,
            });
        }
    }
}

/// Terrain-implied orientation and the body-centre `y` that rests on the ground
/// under `x`.
fn ground_reference<R: Rng>(terrain: &TerrainWindow<R>, vehicle: &VehicleConfig, x: f32) -> (f32, f32) {
    let half_base = vehicle.wheel_base * 0.5;
    let front_y = terrain.height_at(x + half_base);
    let back_y = terrain.height_at(x - half_base);
    let rotation = (front_y - back_y).atan2(vehicle.wheel_base);
    let resting_y = (front_y + back_y) * 0.5 - vehicle.height * 0.5;
    (rotation, resting_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn flat_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.terrain.flat_chance = 0.0;
        config.terrain.hill_to_flat_chance = 0.0;
        config.terrain.drop_chance = 0.0;
        config.terrain.rise_chance = 0.0;
        config.terrain.hill_delta = 0.0;
        config
    }

    fn simulator(config: &GameConfig, seed: u64) -> VehicleSimulator<StdRng> {
        VehicleSimulator::new(config, StdRng::seed_from_u64(seed), StdRng::seed_from_u64(seed ^ 0xD05))
            .expect("simulator should build")
    }

    fn resting_y(sim: &VehicleSimulator<StdRng>) -> f32 {
        ground_reference(&sim.terrain, &sim.vehicle, sim.state.x).1
    }

    fn accelerate_with_nitro() -> ControlInput {
        ControlInput {
            forward: true,
            reverse: false,
            nitro: true,
        }
    }

    #[test]
    fn session_starts_at_rest_on_the_ground() {
        let sim = simulator(&GameConfig::default(), 1);
        let state = sim.state();

        assert_eq!(state.x, 150.0);
        assert!(state.grounded);
        assert_eq!(state.nitro_fuel, 100.0);
        assert_eq!(state.vx, 0.0);
        assert_eq!(sim.score(), Score::default());
        assert!((state.y - resting_y(&sim)).abs() < 1e-4);
    }

    #[test]
    fn nitro_run_approaches_boosted_ceiling_while_grounded() {
        let mut sim = simulator(&flat_config(), 2);
        let mut previous_fuel = sim.state().nitro_fuel;

        for _ in 0..120 {
            sim.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
            let state = sim.state();
            assert!(state.nitro_fuel <= previous_fuel);
            assert!(state.nitro_fuel >= 0.0);
            assert!(state.rotation.abs() <= MAX_TILT_RAD);
            assert!(state.grounded);
            assert_eq!(sim.score().total_score, 0);
            previous_fuel = state.nitro_fuel;
        }

        let state = sim.state();
        assert!(state.nitro_active);
        assert!(state.nitro_fuel < 100.0);
        assert!(state.vx > 800.0 && state.vx <= 1_000.0, "vx = {}", state.vx);
    }

    #[test]
    fn top_speed_falls_back_to_base_ceiling_when_nitro_runs_dry() {
        let mut sim = simulator(&flat_config(), 12);
        let mut peak_vx: f32 = 0.0;

        for _ in 0..400 {
            sim.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
            peak_vx = peak_vx.max(sim.state().vx);
            if !sim.state().nitro_active && sim.state().nitro_fuel == 0.0 {
                break;
            }
        }
        assert!(peak_vx > 900.0, "nitro should have boosted past base top speed, got {peak_vx}");
        assert!(!sim.state().nitro_active);

        let forward = ControlInput {
            forward: true,
            ..ControlInput::default()
        };
        for _ in 0..600 {
            sim.tick(DT, forward).expect("tick should succeed");
            assert!(sim.state().vx <= 400.0 + 1e-3, "vx = {}", sim.state().vx);
        }
        assert!((sim.state().vx - 400.0).abs() < 1e-3);
    }

    #[test]
    fn airborne_thrust_is_scaled_by_air_control() {
        let forward = ControlInput {
            forward: true,
            ..ControlInput::default()
        };
        let mut sim = simulator(&flat_config(), 13);
        sim.state.y = resting_y(&sim) - 5_000.0;
        sim.state.grounded = false;
        sim.tick(DT, forward).expect("tick should succeed");
        assert!(!sim.state().grounded);
        assert!((sim.state().vx - 300.0 * 0.3 * DT).abs() < 1e-4, "vx = {}", sim.state().vx);

        let mut sim = simulator(&flat_config(), 13);
        sim.state.y = resting_y(&sim) - 5_000.0;
        sim.state.grounded = false;
        sim.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
        assert!(sim.state().nitro_active);
        assert!((sim.state().vx - 300.0 * 0.3 * 1.4 * DT).abs() < 1e-4, "vx = {}", sim.state().vx);
    }

    #[test]
    fn airborne_nose_eases_toward_travel_direction() {
        let airborne = |seed: u64, vx: f32| {
            let mut sim = simulator(&flat_config(), seed);
            sim.state.y = resting_y(&sim) - 5_000.0;
            sim.state.grounded = false;
            sim.state.vx = vx;
            sim
        };

        let mut forward = airborne(14, 100.0);
        forward.tick(DT, ControlInput::default()).expect("tick should succeed");
        assert!((forward.state().rotation - (-0.2 * 3.0 * DT)).abs() < 1e-5);

        let mut backward = airborne(15, -100.0);
        backward.tick(DT, ControlInput::default()).expect("tick should succeed");
        assert!((backward.state().rotation - 0.2 * 3.0 * DT).abs() < 1e-5);

        let mut boosted = airborne(16, 100.0);
        boosted.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
        assert!(boosted.state().nitro_active);
        assert!((boosted.state().rotation - (-0.2 * 4.5 * DT)).abs() < 1e-5);
        assert!(boosted.state().rotation < forward.state().rotation);
    }

    #[test]
    fn grounded_thrust_follows_slope_resistance_and_assist() {
        let tilt: f32 = 0.3;
        let bleed = 1.0 - tilt.sin() * 2.0 * DT;

        let mut climbing = simulator(&flat_config(), 17);
        climbing.state.rotation = tilt;
        let forward = ControlInput {
            forward: true,
            ..ControlInput::default()
        };
        climbing.tick(DT, forward).expect("tick should succeed");
        assert!(climbing.state().grounded);
        let expected = 300.0 * DT * (1.0 - tilt.sin() * 0.7) * bleed;
        assert!((climbing.state().vx - expected).abs() < 1e-4, "vx = {}", climbing.state().vx);

        let mut reversing = simulator(&flat_config(), 18);
        reversing.state.rotation = -tilt;
        let reverse = ControlInput {
            reverse: true,
            ..ControlInput::default()
        };
        reversing.tick(DT, reverse).expect("tick should succeed");
        assert!(reversing.state().grounded);
        let expected = -300.0 * DT * (1.0 + tilt.sin() * 0.8) * bleed;
        assert!((reversing.state().vx - expected).abs() < 1e-4, "vx = {}", reversing.state().vx);
    }

    #[test]
    fn grounded_slope_bleeds_speed() {
        let forward = ControlInput {
            forward: true,
            ..ControlInput::default()
        };

        let mut level = simulator(&flat_config(), 19);
        level.state.vx = 400.0;
        level.tick(DT, forward).expect("tick should succeed");
        assert_eq!(level.state().vx, 400.0);

        let tilt: f32 = 0.4;
        let mut sloped = simulator(&flat_config(), 19);
        sloped.state.vx = 400.0;
        sloped.state.rotation = tilt;
        sloped.tick(DT, forward).expect("tick should succeed");
        assert!(sloped.state().grounded);
        let expected = 400.0 * (1.0 - tilt.sin() * 2.0 * DT);
        assert!((sloped.state().vx - expected).abs() < 1e-3, "vx = {}", sloped.state().vx);
    }

    #[test]
    fn one_second_jump_commits_a_thousand_points() {
        let config = flat_config();
        let mut sim = simulator(&config, 3);
        sim.state.y = resting_y(&sim) - 5_000.0;

        let dt = 1.0 / 64.0;
        for _ in 0..64 {
            let outcome = sim.tick(dt, ControlInput::default()).expect("tick should succeed");
            assert!(!sim.state().grounded);
            assert_eq!(outcome.trick, None);
        }
        assert_eq!(sim.score().last_trick_score, 1_000);

        sim.state.y = resting_y(&sim);
        sim.state.vy = 0.0;
        let outcome = sim.tick(dt, ControlInput::default()).expect("tick should succeed");

        assert!(sim.state().grounded);
        assert!(outcome.landing.is_some());
        assert_eq!(outcome.trick.map(|trick| trick.points), Some(1_000));
        assert_eq!(sim.score().total_score, 1_000);
        assert!(sim.state().max_air_time >= 1.0);
        assert_eq!(sim.state().current_air_time, 0.0);
    }

    #[test]
    fn hard_landing_sets_and_decays_bounce() {
        let mut sim = simulator(&flat_config(), 4);
        sim.state.y = resting_y(&sim) - 10.0;
        sim.state.grounded = false;
        sim.state.vy = 1_200.0;

        let outcome = sim.tick(DT, ControlInput::default()).expect("tick should succeed");
        let landing = outcome.landing.expect("landing should be reported");
        assert_eq!(landing.impact_speed, 1_200.0);
        assert!(sim.state().landing_bounce > 0.2 && sim.state().landing_bounce <= 0.3);

        for _ in 0..30 {
            sim.tick(DT, ControlInput::default()).expect("tick should succeed");
        }
        assert_eq!(sim.state().landing_bounce, 0.0);
    }

    #[test]
    fn non_positive_delta_is_a_no_op() {
        let mut sim = simulator(&GameConfig::default(), 5);
        sim.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
        let before = sim.state().clone();
        let score_before = sim.score();

        for dt in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let outcome = sim.tick(dt, accelerate_with_nitro()).expect("no-op tick should succeed");
            assert_eq!(outcome, TickOutcome::default());
        }

        assert_eq!(sim.state(), &before);
        assert_eq!(sim.score(), score_before);
    }

    #[test]
    fn reverse_is_capped_at_half_top_speed() {
        let mut sim = simulator(&flat_config(), 6);
        let reverse = ControlInput {
            reverse: true,
            ..ControlInput::default()
        };
        for _ in 0..300 {
            sim.tick(DT, reverse).expect("tick should succeed");
            assert!(sim.state().vx >= -200.0);
        }
        assert!((sim.state().vx + 200.0).abs() < 1e-3);
    }

    #[test]
    fn idle_decays_to_an_exact_stop() {
        let mut sim = simulator(&flat_config(), 7);
        sim.state.vx = 300.0;
        for _ in 0..240 {
            sim.tick(DT, ControlInput::default()).expect("tick should succeed");
        }
        assert_eq!(sim.state().vx, 0.0);
    }

    #[test]
    fn nitro_requires_accelerate_intent_and_recharges_when_parked() {
        let mut sim = simulator(&flat_config(), 8);
        let nitro_only = ControlInput {
            nitro: true,
            ..ControlInput::default()
        };
        sim.tick(DT, nitro_only).expect("tick should succeed");
        assert!(!sim.state().nitro_active);

        sim.state.nitro_fuel = 50.0;
        sim.tick(DT, ControlInput::default()).expect("tick should succeed");
        let expected = 50.0 + 25.0 * DT * 1.8;
        assert!((sim.state().nitro_fuel - expected).abs() < 1e-4);
    }

    #[test]
    fn dust_kicks_up_behind_a_moving_vehicle() {
        let mut sim = simulator(&flat_config(), 9);
        for _ in 0..90 {
            sim.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
        }

        let snapshot = sim.render_snapshot();
        assert!(!snapshot.particles.is_empty());
        assert!(snapshot.particles.len() <= 512);
        assert!(snapshot.particles.iter().all(|p| p.vx < 0.0 && p.life > 0.0));
        assert!(snapshot.particles.iter().all(|p| p.x <= snapshot.x));
    }

    #[test]
    fn invariants_hold_under_random_input_sequences() {
        for seed in 0..8 {
            let mut sim = simulator(&GameConfig::default(), seed);
            let mut driver = StdRng::seed_from_u64(seed + 100);
            let mut previous_max_air = 0.0;
            let mut previous_total = 0;

            for _ in 0..3_000 {
                let input = ControlInput {
                    forward: driver.random_bool(0.7),
                    reverse: driver.random_bool(0.2),
                    nitro: driver.random_bool(0.3),
                };
                let dt = driver.random_range(0.001..0.05);
                sim.tick(dt, input).expect("tick should succeed");

                let state = sim.state();
                assert!((0.0..=100.0).contains(&state.nitro_fuel));
                assert!(state.rotation.abs() <= MAX_TILT_RAD);
                assert!(state.max_air_time >= previous_max_air);
                assert!(sim.score().total_score >= previous_total);
                assert!(sim.particle_count() <= 512);
                if state.grounded {
                    assert_eq!(state.current_air_time, 0.0);
                }
                previous_max_air = state.max_air_time;
                previous_total = sim.score().total_score;
            }
            assert_eq!(sim.terrain().segment_count(), 5);
        }
    }

    #[test]
    fn extreme_attitude_is_clamped_after_one_tick() {
        let mut sim = simulator(&flat_config(), 10);
        sim.state.rotation = 40.0;
        sim.state.grounded = false;
        sim.state.y -= 500.0;
        sim.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
        assert!(sim.state().rotation.abs() <= MAX_TILT_RAD);

        sim.state.rotation = -40.0;
        sim.tick(DT, accelerate_with_nitro()).expect("tick should succeed");
        assert!(sim.state().rotation.abs() <= MAX_TILT_RAD);
    }

    #[test]
    fn hud_snapshot_reports_raw_units() {
        let mut sim = simulator(&flat_config(), 11);
        sim.state.nitro_fuel = 37.5;
        let hud = sim.hud_snapshot();
        assert_eq!(hud.nitro_fuel_percent, 37.5);
        assert_eq!(hud.max_speed, 400.0);
        assert_eq!(hud.speed, 0.0);
    }
}
