use crate::config::{GameConfig, HudConfig};
use crate::gameplay::vehicle::{SimulationSnapshot, SimulationSystems, TrickLandedEvent};
use crate::states::{GameState, StartRunRequested};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

const HUD_PANEL_Z_INDEX: i32 = 190;
const HUD_PANEL_BG: Color = Color::srgba(0.06, 0.09, 0.12, 0.86);
const HUD_PANEL_BORDER: Color = Color::srgba(0.58, 0.68, 0.76, 0.92);
const HUD_TEXT_PRIMARY: Color = Color::srgb(0.94, 0.97, 1.0);
const HUD_TEXT_MUTED: Color = Color::srgb(0.76, 0.83, 0.9);
const HUD_TRICK_TEXT: Color = Color::srgb(1.0, 0.84, 0.25);
const HUD_BAR_WIDTH_PX: f32 = 260.0;
const SCORE_DIGITS: usize = 6;

pub struct GameHudPlugin;

impl Plugin for GameHudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrickPopupState>()
            .add_systems(OnEnter(GameState::InRun), spawn_game_hud)
            .add_systems(OnEnter(GameState::Title), (cleanup_game_hud, reset_trick_popup))
            .add_systems(
                Update,
                (track_trick_landings, update_game_hud)
                    .chain()
                    .in_set(SimulationSystems::Present)
                    .run_if(in_state(GameState::InRun))
                    .run_if(resource_exists::<GameConfig>),
            )
            .add_systems(
                EguiPrimaryContextPass,
                draw_title_screen.run_if(in_state(GameState::Title)),
            );
    }
}

#[derive(Component)]
struct GameHudRoot;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum HudTextKind {
    Score,
    Speed,
    Nitro,
    AirTime,
    TrickPopup,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum HudBarFill {
    Speed,
    Nitro,
}

/// Keeps the last committed trick on screen for a short while after landing.
#[derive(Resource, Debug, Clone, Default)]
struct TrickPopupState {
    committed_points: u32,
    remaining_s: f32,
}

impl TrickPopupState {
    fn commit(&mut self, points: u32, hud: &HudConfig) {
        self.committed_points = points;
        self.remaining_s = hud.trick_popup_seconds.max(0.0);
    }

    fn tick(&mut self, delta_s: f32) {
        self.remaining_s = (self.remaining_s - delta_s).max(0.0);
    }

    /// Live trick points while airborne, otherwise the lingering committed value.
    fn visible_points(&self, live_points: u32) -> Option<u32> {
        if live_points > 0 {
            return Some(live_points);
        }
        (self.remaining_s > 0.0 && self.committed_points > 0).then_some(self.committed_points)
    }
}

/// Speedometer reading and its fill fraction. Raw units are scaled down and
/// capped against the display ceiling.
fn speed_display(speed: f32, hud: &HudConfig) -> (u32, f32) {
    let value = (speed / hud.speed_display_divisor).round().min(hud.speed_display_max).max(0.0);
    (value as u32, value / hud.speed_display_max)
}

fn format_score(score: u32) -> String {
    format!("{score:0width$}", width = SCORE_DIGITS)
}

fn reset_trick_popup(mut popup: ResMut<TrickPopupState>) {
    *popup = TrickPopupState::default();
}

fn spawn_game_hud(mut commands: Commands, existing_hud: Query<Entity, With<GameHudRoot>>) {
    if !existing_hud.is_empty() {
        return;
    }

    commands
        .spawn((
            Name::new("GameHudRoot"),
            GameHudRoot,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                right: Val::Px(12.0),
                top: Val::Px(10.0),
                bottom: Val::Px(10.0),
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::FlexStart,
                ..default()
            },
            ZIndex(HUD_PANEL_Z_INDEX),
        ))
        .with_children(|root| {
            root.spawn((
                Name::new("GameHudDashboard"),
                Node {
                    width: Val::Px(300.0),
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(6.0),
                    padding: UiRect::all(Val::Px(12.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(HUD_PANEL_BG),
                BorderColor::all(HUD_PANEL_BORDER),
            ))
            .with_children(|panel| {
                panel.spawn(hud_text(HudTextKind::Speed, "SPEED 0", 18.0, HUD_TEXT_PRIMARY));
                spawn_bar(panel, HudBarFill::Speed, Color::srgb(0.95, 0.55, 0.18));
                panel.spawn(hud_text(HudTextKind::Nitro, "NITRO 100%", 18.0, HUD_TEXT_PRIMARY));
                spawn_bar(panel, HudBarFill::Nitro, Color::srgb(0.25, 0.75, 1.0));
                panel.spawn(hud_text(HudTextKind::AirTime, "AIR 0.00s | BEST 0.00s", 16.0, HUD_TEXT_MUTED));
            });

            root.spawn((
                Name::new("GameHudScorePanel"),
                Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::FlexEnd,
                    row_gap: Val::Px(6.0),
                    padding: UiRect::all(Val::Px(12.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(HUD_PANEL_BG),
                BorderColor::all(HUD_PANEL_BORDER),
            ))
            .with_children(|panel| {
                panel.spawn(hud_text(HudTextKind::Score, "SCORE 000000", 30.0, HUD_TEXT_PRIMARY));
                panel.spawn(hud_text(HudTextKind::TrickPopup, "", 28.0, HUD_TRICK_TEXT));
            });
        });
}

fn hud_text(kind: HudTextKind, initial: &str, font_size: f32, color: Color) -> impl Bundle {
    (
        kind,
        Text::new(initial),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    )
}

fn spawn_bar(panel: &mut ChildSpawnerCommands, fill: HudBarFill, color: Color) {
    panel
        .spawn((
            Node {
                width: Val::Px(HUD_BAR_WIDTH_PX),
                height: Val::Px(14.0),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.02, 0.03, 0.04, 0.84)),
            BorderColor::all(Color::srgba(0.56, 0.64, 0.70, 0.9)),
        ))
        .with_children(|bar| {
            bar.spawn((
                fill,
                Node {
                    width: Val::Px(0.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(color),
            ));
        });
}

fn cleanup_game_hud(mut commands: Commands, hud_query: Query<Entity, With<GameHudRoot>>) {
    for entity in &hud_query {
        commands.entity(entity).try_despawn();
    }
}

fn track_trick_landings(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut events: MessageReader<TrickLandedEvent>,
    mut popup: ResMut<TrickPopupState>,
) {
    popup.tick(time.delta_secs());
    for event in events.read() {
        popup.commit(event.points, &config.hud);
    }
}

fn update_game_hud(
    config: Res<GameConfig>,
    snapshot: Res<SimulationSnapshot>,
    popup: Res<TrickPopupState>,
    mut text_query: Query<(&HudTextKind, &mut Text)>,
    mut fill_query: Query<(&HudBarFill, &mut Node)>,
) {
    let hud = &snapshot.hud;
    let (speed_value, speed_fraction) = speed_display(hud.speed, &config.hud);
    let nitro_fraction = (hud.nitro_fuel_percent / 100.0).clamp(0.0, 1.0);

    for (fill, mut node) in &mut fill_query {
        let fraction = match fill {
            HudBarFill::Speed => speed_fraction,
            HudBarFill::Nitro => nitro_fraction,
        };
        node.width = Val::Px(HUD_BAR_WIDTH_PX * fraction);
    }

    for (kind, mut text) in &mut text_query {
        *text = match kind {
            HudTextKind::Score => Text::new(format!("SCORE {}", format_score(hud.score.total_score))),
            HudTextKind::Speed => Text::new(format!("SPEED {speed_value}")),
            HudTextKind::Nitro => Text::new(format!("NITRO {:.0}%", hud.nitro_fuel_percent)),
            HudTextKind::AirTime => Text::new(format!(
                "AIR {:.2}s | BEST {:.2}s",
                hud.current_air_time, hud.max_air_time
            )),
            HudTextKind::TrickPopup => match popup.visible_points(hud.score.last_trick_score) {
                Some(points) => Text::new(format!("+{points}")),
                None => Text::new(""),
            },
        };
    }
}

fn draw_title_screen(mut egui_contexts: EguiContexts, mut start_requests: MessageWriter<StartRunRequested>) {
    let Ok(ctx) = egui_contexts.ctx_mut() else {
        return;
    };

    egui::Window::new("Desert Van")
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("How to play");
            ui.label("Right / D - accelerate");
            ui.label("Left / A - reverse");
            ui.label("Space - nitro (while accelerating)");
            ui.label("Esc - pause, R - restart");
            ui.separator();
            ui.label(egui::RichText::new("Stay airborne to score 1000 points per second.").italics());
            ui.add_space(8.0);
            if ui.button(egui::RichText::new("START").strong().size(22.0)).clicked() {
                start_requests.write(StartRunRequested);
            }
        });
}
