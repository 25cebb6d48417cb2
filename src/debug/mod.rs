use crate::config::GameConfig;
use crate::gameplay::sfx::EngineSoundTracker;
use crate::gameplay::terrain::TerrainMode;
use crate::gameplay::vehicle::{SimulationSnapshot, SimulationSystems, TrickLandedEvent, VehicleLandingEvent};
use crate::states::GameState;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

pub struct DebugOverlayPlugin;

impl Plugin for DebugOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugOverlayState>()
            .add_systems(OnEnter(GameState::Title), sync_overlay_from_config)
            .add_systems(Update, (toggle_debug_overlay, dump_snapshot_hotkey))
            .add_systems(
                Update,
                track_landings
                    .in_set(SimulationSystems::Present)
                    .run_if(in_state(GameState::InRun)),
            )
            .add_systems(
                EguiPrimaryContextPass,
                debug_overlay_ui.run_if(in_state(GameState::InRun).or(in_state(GameState::Pause))),
            );
    }
}

#[derive(Resource, Debug, Clone, Default)]
struct DebugOverlayState {
    visible: bool,
    landing_count: u32,
    last_impact_speed: f32,
    hardest_impact_speed: f32,
    last_landing_position: Vec2,
    last_trick: Option<(u32, f32)>,
}

fn sync_overlay_from_config(config: Res<GameConfig>, mut overlay: ResMut<DebugOverlayState>) {
    *overlay = DebugOverlayState {
        visible: config.app.debug_overlay,
        ..DebugOverlayState::default()
    };
}

fn toggle_debug_overlay(keyboard: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<DebugOverlayState>) {
    if !keyboard.just_pressed(KeyCode::F1) {
        return;
    }

    overlay.visible = !overlay.visible;
    if overlay.visible {
        info!("Debug overlay shown.");
    } else {
        info!("Debug overlay hidden.");
    }
}

fn track_landings(
    mut landing_events: MessageReader<VehicleLandingEvent>,
    mut trick_events: MessageReader<TrickLandedEvent>,
    mut overlay: ResMut<DebugOverlayState>,
) {
    if let Some(trick) = trick_events.read().last() {
        overlay.last_trick = Some((trick.points, trick.air_time_s));
    }
    for event in landing_events.read() {
        overlay.landing_count = overlay.landing_count.saturating_add(1);
        overlay.last_impact_speed = event.impact_speed;
        overlay.last_landing_position = event.world_position;
        overlay.hardest_impact_speed = overlay.hardest_impact_speed.max(event.impact_speed);
    }
}

fn dump_snapshot_hotkey(keyboard: Res<ButtonInput<KeyCode>>, snapshot: Res<SimulationSnapshot>) {
    if !keyboard.just_pressed(KeyCode::F9) {
        return;
    }

    match snapshot_json(&snapshot) {
        Ok(json) => info!("Simulation snapshot:\n{json}"),
        Err(error) => error!("Failed to serialize simulation snapshot: {error}"),
    }
}

fn snapshot_json(snapshot: &SimulationSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

fn describe_terrain_mode(mode: TerrainMode) -> String {
    match mode {
        TerrainMode::RollingHills => "rolling hills".to_string(),
        TerrainMode::Flat {
            run, run_length, ..
        } => format!("flat ({run}/{run_length})"),
    }
}

fn debug_overlay_ui(
    mut egui_contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
    snapshot: Res<SimulationSnapshot>,
    engine: Res<EngineSoundTracker>,
    mut overlay: ResMut<DebugOverlayState>,
) {
    if !overlay.visible {
        return;
    }

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|value| value.smoothed())
        .unwrap_or(0.0);
    let render = &snapshot.render;
    let hud = &snapshot.hud;
    let (span_start, span_end) = snapshot.terrain_span;

    let Ok(ctx) = egui_contexts.ctx_mut() else {
        return;
    };

    let mut window_open = overlay.visible;
    egui::Window::new("Simulation Debug")
        .open(&mut window_open)
        .resizable(false)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {fps:>5.1} | Sim time: {:.1}s", snapshot.elapsed_s));
            ui.separator();
            ui.label(format!("Position: ({:.1}, {:.1})", render.x, render.y));
            ui.label(format!(
                "Speed: {:.1} | Rotation: {:.3} rad",
                hud.speed, render.rotation
            ));
            ui.label(format!(
                "Grounded: {} | Nitro: {} ({:.0}%)",
                render.grounded, render.nitro_active, hud.nitro_fuel_percent
            ));
            ui.label(format!("Engine: {:?}", engine.current()));
            ui.label(format!(
                "Air: {:.2}s (best {:.2}s) | Trick: +{}",
                hud.current_air_time, hud.max_air_time, hud.score.last_trick_score
            ));
            ui.label(format!(
                "Landings: {} | Last impact: {:.0} | Hardest: {:.0}",
                overlay.landing_count, overlay.last_impact_speed, overlay.hardest_impact_speed
            ));
            ui.label(format!(
                "Last landing at ({:.0}, {:.0})",
                overlay.last_landing_position.x, overlay.last_landing_position.y
            ));
            if let Some((points, air_time_s)) = overlay.last_trick {
                ui.label(format!("Last trick: +{points} over {air_time_s:.2}s"));
            }
            ui.separator();
            ui.label(format!(
                "Terrain: {} segments, {span_start:.0}..{span_end:.0}, {} samples",
                snapshot.terrain_segments,
                snapshot.terrain_points.len()
            ));
            ui.label(format!("Terrain mode: {}", describe_terrain_mode(snapshot.terrain_mode)));
            ui.label(format!("Particles: {}", render.particles.len()));
            ui.separator();
            ui.label("F1 toggle | F5 reload config | F9 dump snapshot | R restart");
        });

    overlay.visible = window_open;
}
