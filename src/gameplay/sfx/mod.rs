use crate::gameplay::vehicle::{SimulationSnapshot, SimulationSystems};
use crate::states::GameState;
use bevy::prelude::*;
use serde::Serialize;

const STOPPED_SPEED_THRESHOLD: f32 = 1.0;

pub struct GameplaySfxPlugin;

impl Plugin for GameplaySfxPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EngineSoundTracker>()
            .add_message::<EngineStateChangedEvent>()
            .add_systems(OnEnter(GameState::Title), reset_engine_sound_tracker)
            .add_systems(
                Update,
                (track_engine_state, log_engine_transitions)
                    .chain()
                    .in_set(SimulationSystems::Present)
                    .run_if(in_state(GameState::InRun)),
            );
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EngineState {
    #[default]
    Idle,
    Accelerating,
    Decelerating,
    Reversing,
}

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct EngineStateChangedEvent {
    pub from: EngineState,
    pub to: EngineState,
}

/// Discrete engine states derived from pedals and ground speed. Only changes are
/// reported, so the consumer is independent of the tick rate.
#[derive(Resource, Debug, Clone, Default)]
pub struct EngineSoundTracker {
    current: EngineState,
}

impl EngineSoundTracker {
    pub fn current(&self) -> EngineState {
        self.current
    }

    pub fn update(&mut self, accelerating: bool, reversing: bool, velocity_x: f32) -> Option<EngineStateChangedEvent> {
        let next = if !accelerating && !reversing {
            match self.current {
                EngineState::Accelerating => EngineState::Decelerating,
                EngineState::Decelerating if velocity_x.abs() <= STOPPED_SPEED_THRESHOLD => EngineState::Idle,
                other => other,
            }
        } else if reversing {
            EngineState::Reversing
        } else {
            EngineState::Accelerating
        };

        if next == self.current {
            return None;
        }

        let event = EngineStateChangedEvent {
            from: self.current,
            to: next,
        };
        self.current = next;
        Some(event)
    }
}

fn reset_engine_sound_tracker(mut tracker: ResMut<EngineSoundTracker>) {
    *tracker = EngineSoundTracker::default();
}

fn track_engine_state(
    snapshot: Res<SimulationSnapshot>,
    mut tracker: ResMut<EngineSoundTracker>,
    mut engine_events: MessageWriter<EngineStateChangedEvent>,
) {
    let controls = snapshot.controls;
    let velocity_x = snapshot.render.velocity_sign * snapshot.hud.speed;
    if let Some(event) = tracker.update(controls.forward, controls.reverse, velocity_x) {
        engine_events.write(event);
    }
}

fn log_engine_transitions(mut engine_events: MessageReader<EngineStateChangedEvent>) {
    for event in engine_events.read() {
        debug!("Engine state: {:?} -> {:?}", event.from, event.to);
    }
}
