mod particles;
mod simulator;
mod state;

pub use simulator::{HudSnapshot, RenderSnapshot, VehicleSimulator};
pub use state::{ControlInput, Particle};

use crate::config::GameConfig;
use crate::gameplay::terrain::{TerrainError, TerrainMode, TerrainPoint};
use crate::states::GameState;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

pub struct VehicleGameplayPlugin;

impl Plugin for VehicleGameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VehicleInputState>()
            .init_resource::<VehicleInputBindings>()
            .init_resource::<SimulationSnapshot>()
            .add_message::<TrickLandedEvent>()
            .add_message::<VehicleLandingEvent>()
            .configure_sets(
                Update,
                (
                    SimulationSystems::Input,
                    SimulationSystems::Advance,
                    SimulationSystems::Present,
                )
                    .chain(),
            )
            .add_systems(OnEnter(GameState::InRun), ensure_simulation_session)
            .add_systems(
                Update,
                (
                    read_vehicle_input.in_set(SimulationSystems::Input),
                    advance_simulation.in_set(SimulationSystems::Advance),
                )
                    .run_if(in_state(GameState::InRun))
                    .run_if(resource_exists::<SimulationSession>)
                    .run_if(resource_exists::<GameConfig>),
            )
            .add_systems(
                Update,
                restart_session_hotkey
                    .run_if(in_state(GameState::InRun).or(in_state(GameState::Pause)))
                    .run_if(resource_exists::<GameConfig>),
            );
    }
}

/// Per-frame ordering: controls are sampled, exactly one tick runs, then
/// consumers read the settled snapshot.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSystems {
    Input,
    Advance,
    Present,
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct VehicleInputState {
    pub controls: ControlInput,
}

#[derive(Resource, Debug, Clone)]
struct VehicleInputBindings {
    forward: Vec<KeyCode>,
    reverse: Vec<KeyCode>,
    nitro: Vec<KeyCode>,
}

impl Default for VehicleInputBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyD, KeyCode::ArrowRight],
            reverse: vec![KeyCode::KeyA, KeyCode::ArrowLeft],
            nitro: vec![KeyCode::Space],
        }
    }
}

#[derive(Resource)]
pub struct SimulationSession {
    simulator: VehicleSimulator<StdRng>,
}

impl SimulationSession {
    pub fn start(config: &GameConfig) -> Result<Self, TerrainError> {
        let simulator = VehicleSimulator::new(config, StdRng::from_os_rng(), StdRng::from_os_rng())?;
        Ok(Self { simulator })
    }

    pub fn snapshot(&self, controls: ControlInput) -> SimulationSnapshot {
        let terrain = self.simulator.terrain();
        SimulationSnapshot {
            elapsed_s: self.simulator.elapsed_s(),
            controls,
            render: self.simulator.render_snapshot(),
            hud: self.simulator.hud_snapshot(),
            terrain_points: terrain.points().collect(),
            terrain_span: terrain.span(),
            terrain_segments: terrain.segment_count(),
            terrain_mode: terrain.mode(),
        }
    }
}

/// Settled post-tick view shared with every consumer (render, HUD, audio, debug).
#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct SimulationSnapshot {
    pub elapsed_s: f32,
    pub controls: ControlInput,
    pub render: RenderSnapshot,
    pub hud: HudSnapshot,
    pub terrain_points: Vec<TerrainPoint>,
    pub terrain_span: (f32, f32),
    pub terrain_segments: usize,
    pub terrain_mode: TerrainMode,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct TrickLandedEvent {
    pub points: u32,
    pub air_time_s: f32,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct VehicleLandingEvent {
    pub impact_speed: f32,
    pub world_position: Vec2,
}

fn ensure_simulation_session(
    mut commands: Commands,
    config: Option<Res<GameConfig>>,
    session: Option<Res<SimulationSession>>,
    input: Res<VehicleInputState>,
    mut snapshot: ResMut<SimulationSnapshot>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if session.is_some() {
        return;
    }

    let Some(config) = config else {
        warn!("Cannot start a session before `GameConfig` is loaded.");
        next_state.set(GameState::Title);
        return;
    };

    match SimulationSession::start(&config) {
        Ok(session) => {
            info!(
                "Started session at x={:.0} with {} terrain segments.",
                config.world.start_x, config.terrain.segments_to_keep
            );
            *snapshot = session.snapshot(input.controls);
            commands.insert_resource(session);
        }
        Err(error) => {
            error!("Failed to start session: {error}");
            next_state.set(GameState::Title);
        }
    }
}

fn restart_session_hotkey(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    state: Res<State<GameState>>,
    mut input: ResMut<VehicleInputState>,
    mut snapshot: ResMut<SimulationSnapshot>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }

    *input = VehicleInputState::default();
    match SimulationSession::start(&config) {
        Ok(session) => {
            info!("Restarted session.");
            *snapshot = session.snapshot(input.controls);
            commands.insert_resource(session);
            if *state.get() == GameState::Pause {
                next_state.set(GameState::InRun);
            }
        }
        Err(error) => {
            error!("Failed to restart session: {error}");
            commands.remove_resource::<SimulationSession>();
            next_state.set(GameState::Title);
        }
    }
}

fn read_vehicle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    bindings: Res<VehicleInputBindings>,
    mut input_state: ResMut<VehicleInputState>,
) {
    input_state.controls = ControlInput {
        forward: bindings.forward.iter().any(|key| keyboard.pressed(*key)),
        reverse: bindings.reverse.iter().any(|key| keyboard.pressed(*key)),
        nitro: bindings.nitro.iter().any(|key| keyboard.pressed(*key)),
    };
}

#[allow(clippy::too_many_arguments)]
fn advance_simulation(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    input_state: Res<VehicleInputState>,
    mut session: ResMut<SimulationSession>,
    mut snapshot: ResMut<SimulationSnapshot>,
    mut trick_events: MessageWriter<TrickLandedEvent>,
    mut landing_events: MessageWriter<VehicleLandingEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let dt = time.delta_secs().min(config.app.max_frame_delta_s);

    let outcome = match session.simulator.tick(dt, input_state.controls) {
        Ok(outcome) => outcome,
        Err(error) => {
            error!("Simulation halted: {error}");
            commands.remove_resource::<SimulationSession>();
            next_state.set(GameState::Title);
            return;
        }
    };

    if let Some(landing) = outcome.landing {
        landing_events.write(VehicleLandingEvent {
            impact_speed: landing.impact_speed,
            world_position: landing.position,
        });
    }

    if let Some(trick) = outcome.trick {
        info!(
            "Trick landed: +{} points after {:.2}s airborne (total {}).",
            trick.points,
            trick.air_time_s,
            session.simulator.score().total_score
        );
        trick_events.write(TrickLandedEvent {
            points: trick.points,
            air_time_s: trick.air_time_s,
        });
    }

    *snapshot = session.snapshot(input_state.controls);
}
