use crate::config::GameConfig;
use crate::gameplay::vehicle::SimulationSnapshot;
use bevy::app::AppExit;
use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    #[default]
    Boot,
    Title,
    InRun,
    Pause,
}

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<StartRunRequested>()
            .add_systems(Startup, setup_camera)
            .add_systems(OnEnter(GameState::Boot), enter_boot)
            .add_systems(
                Update,
                boot_to_title
                    .run_if(in_state(GameState::Boot))
                    .run_if(resource_exists::<GameConfig>),
            )
            .add_systems(OnEnter(GameState::Title), enter_title)
            .add_systems(Update, title_controls.run_if(in_state(GameState::Title)))
            .add_systems(OnEnter(GameState::InRun), enter_in_run)
            .add_systems(Update, in_run_controls.run_if(in_state(GameState::InRun)))
            .add_systems(OnEnter(GameState::Pause), enter_pause)
            .add_systems(OnExit(GameState::Pause), cleanup_pause_screen)
            .add_systems(Update, pause_controls.run_if(in_state(GameState::Pause)));
    }
}

/// Sent by the title screen's START button.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct StartRunRequested;

#[derive(Component)]
struct PauseScreenRoot;

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn enter_boot() {
    info!("Entered state: Boot");
}

fn boot_to_title(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::Title);
}

fn enter_title() {
    info!("Entered state: Title");
}

fn title_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut start_requests: MessageReader<StartRunRequested>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let button_pressed = start_requests.read().count() > 0;
    if button_pressed || keyboard.any_just_pressed([KeyCode::Enter, KeyCode::Space]) {
        next_state.set(GameState::InRun);
    }
}

fn enter_in_run() {
    info!("Entered state: InRun");
}

fn in_run_controls(keyboard: Res<ButtonInput<KeyCode>>, mut next_state: ResMut<NextState<GameState>>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        next_state.set(GameState::Pause);
    }
}

/// One-line run recap shown while paused.
fn pause_run_summary(snapshot: &SimulationSnapshot, start_x: f32) -> String {
    let distance = (snapshot.render.x - start_x).max(0.0);
    format!(
        "Distance {distance:.0} | Score {:06} | Best air {:.2}s",
        snapshot.hud.score.total_score, snapshot.hud.max_air_time
    )
}

fn enter_pause(mut commands: Commands, config: Res<GameConfig>, snapshot: Res<SimulationSnapshot>) {
    let summary = pause_run_summary(&snapshot, config.world.start_x);

    commands
        .spawn((
            Name::new("PauseOverlay"),
            PauseScreenRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.12, 0.07, 0.03, 0.55)),
            ZIndex(300),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(8.0),
                        padding: UiRect::axes(Val::Px(24.0), Val::Px(16.0)),
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.20, 0.12, 0.05, 0.94)),
                    BorderColor::all(Color::srgb(0.86, 0.58, 0.26)),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new("ENGINE IDLING"),
                        TextFont {
                            font_size: 44.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.84, 0.25)),
                    ));
                    panel.spawn((
                        Text::new(summary.clone()),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.98, 0.92, 0.82)),
                    ));
                    panel.spawn((
                        Text::new("Esc back on the road | R fresh desert | Q park the van"),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.85, 0.74, 0.60)),
                    ));
                });
        });

    info!("Entered state: Pause ({summary})");
}

fn cleanup_pause_screen(mut commands: Commands, pause_screen_query: Query<Entity, With<PauseScreenRoot>>) {
    for entity in &pause_screen_query {
        commands.entity(entity).try_despawn();
    }
}

fn pause_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<AppExit>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        next_state.set(GameState::InRun);
    }

    if keyboard.just_pressed(KeyCode::KeyQ) {
        exit.write(AppExit::Success);
    }
}
