use crate::config::{GameConfig, VehicleConfig, WorldConfig};
use crate::gameplay::sky::SkyClock;
use crate::gameplay::vehicle::{RenderSnapshot, SimulationSnapshot, SimulationSystems};
use crate::states::GameState;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::Rng;

const CAMERA_LEAD_FRACTION: f32 = 1.0 / 3.0;
const TERRAIN_EDGE_COLOR: Color = Color::srgb(0.55, 0.36, 0.16);
const TERRAIN_FILL_COLOR: Color = Color::srgba(0.42, 0.27, 0.12, 0.55);
const BODY_COLOR: Color = Color::srgb(1.0, 0.27, 0.27);
const WHEEL_COLOR: Color = Color::srgb(0.12, 0.12, 0.14);
const WHEEL_RADIUS: f32 = 7.0;
const STAR_RADIUS: f32 = 1.0;
const DUST_RGB: (f32, f32, f32) = (139.0 / 255.0, 69.0 / 255.0, 19.0 / 255.0);
const DUST_MAX_ALPHA: f32 = 0.6;
const FLAME_COUNT: usize = 3;
const FLAME_BASE_LENGTH: f32 = 25.0;
const FLAME_WIDTH: f32 = 8.0;

pub struct WorldRenderPlugin;

impl Plugin for WorldRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (camera_follow_vehicle, draw_sky, draw_terrain, draw_vehicle)
                .chain()
                .in_set(SimulationSystems::Present)
                .run_if(in_state(GameState::InRun).or(in_state(GameState::Pause)))
                .run_if(resource_exists::<GameConfig>),
        );
    }
}

/// Simulation space is y-down; the view is y-up.
fn to_view(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, -y)
}

/// Left edge of the visible canvas, keeping the vehicle a third of the way in.
fn camera_left_edge(vehicle_x: f32, world: &WorldConfig) -> f32 {
    (vehicle_x - world.canvas_width * CAMERA_LEAD_FRACTION).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BodyPose {
    center: Vec2,
    pivot: Vec2,
    rotation: Rot2,
    size: Vec2,
}

/// Body rectangle squashed by the landing bounce and pivoting on its bottom edge.
fn body_pose(render: &RenderSnapshot, vehicle: &VehicleConfig) -> BodyPose {
    let scale = Vec2::new(1.0 + render.landing_bounce * 0.5, 1.0 - render.landing_bounce);
    let size = Vec2::new(vehicle.width, vehicle.height) * scale;
    let pivot = to_view(render.x, render.y + vehicle.height * 0.5);
    let rotation = Rot2::radians(-render.rotation);
    BodyPose {
        center: pivot + rotation * Vec2::new(0.0, size.y * 0.5),
        pivot,
        rotation,
        size,
    }
}

fn camera_follow_vehicle(
    config: Res<GameConfig>,
    snapshot: Res<SimulationSnapshot>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut camera_query: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
) {
    let Ok((mut transform, mut projection)) = camera_query.single_mut() else {
        return;
    };

    let world = &config.world;
    let left = camera_left_edge(snapshot.render.x, world);
    transform.translation.x = left + world.canvas_width * 0.5;
    transform.translation.y = -world.canvas_height * 0.5;

    let Ok(window) = windows.single() else {
        return;
    };
    if let Projection::Orthographic(ortho) = &mut *projection {
        let fit_x = world.canvas_width / window.width().max(1.0);
        let fit_y = world.canvas_height / window.height().max(1.0);
        ortho.scale = fit_x.max(fit_y);
    }
}

fn draw_sky(
    mut gizmos: Gizmos,
    config: Res<GameConfig>,
    snapshot: Res<SimulationSnapshot>,
    sky: Option<Res<SkyClock>>,
) {
    let Some(sky) = sky else {
        return;
    };

    let world = &config.world;
    let left = camera_left_edge(snapshot.render.x, world);
    for star in sky.visible_stars() {
        let position = to_view(left + star.x * world.canvas_width, star.y * world.canvas_height);
        gizmos.circle_2d(position, STAR_RADIUS, Color::srgba(1.0, 1.0, 1.0, star.brightness));
    }

    let horizon = sky.gradient().bottom;
    gizmos.line_2d(
        to_view(left, world.canvas_height),
        to_view(left + world.canvas_width, world.canvas_height),
        horizon,
    );
}

fn draw_terrain(mut gizmos: Gizmos, config: Res<GameConfig>, snapshot: Res<SimulationSnapshot>) {
    let floor = config.world.canvas_height;
    for point in &snapshot.terrain_points {
        gizmos.line_2d(to_view(point.x, point.y), to_view(point.x, floor), TERRAIN_FILL_COLOR);
    }

    gizmos.linestrip_2d(
        snapshot.terrain_points.iter().map(|point| to_view(point.x, point.y)),
        TERRAIN_EDGE_COLOR,
    );
}

fn draw_vehicle(mut gizmos: Gizmos, config: Res<GameConfig>, snapshot: Res<SimulationSnapshot>) {
    let render = &snapshot.render;

    for particle in &render.particles {
        let alpha = (particle.life / particle.max_life).clamp(0.0, 1.0) * DUST_MAX_ALPHA;
        let (r, g, b) = DUST_RGB;
        gizmos.circle_2d(to_view(particle.x, particle.y), particle.size, Color::srgba(r, g, b, alpha));
    }

    let vehicle = &config.vehicle;
    let pose = body_pose(render, vehicle);
    gizmos.rect_2d(Isometry2d::new(pose.center, pose.rotation), pose.size, BODY_COLOR);

    let half_base = vehicle.wheel_base * 0.5;
    for offset in [-half_base, half_base] {
        let wheel = pose.pivot + pose.rotation * Vec2::new(offset, 0.0);
        gizmos.circle_2d(wheel, WHEEL_RADIUS, WHEEL_COLOR);
    }

    if render.nitro_active {
        draw_nitro_flames(&mut gizmos, &pose, render.velocity_sign);
    }
}

fn draw_nitro_flames(gizmos: &mut Gizmos, pose: &BodyPose, velocity_sign: f32) {
    let mut rng = rand::rng();
    let rear = -velocity_sign * pose.size.x * 0.5;
    let local_to_view = |local: Vec2| pose.center + pose.rotation * local;

    for index in 0..FLAME_COUNT {
        let length = FLAME_BASE_LENGTH * (0.7 + rng.random::<f32>() * 0.3);
        let y = (index as f32 - 1.0) * FLAME_WIDTH;
        let back = -velocity_sign;
        let zigzag = [
            Vec2::new(rear, y),
            Vec2::new(rear + back * length * 0.3, y + FLAME_WIDTH * 0.3),
            Vec2::new(rear + back * length * 0.6, y - FLAME_WIDTH * 0.3),
            Vec2::new(rear + back * length, y),
        ];
        let colors = [
            Color::srgba(1.0, 1.0, 1.0, 0.9),
            Color::srgba(1.0, 0.78, 0.0, 0.8),
            Color::srgba(1.0, 0.39, 0.0, 0.6),
            Color::srgba(1.0, 0.0, 0.0, 0.0),
        ];
        gizmos.linestrip_gradient_2d(
            zigzag
                .into_iter()
                .map(local_to_view)
                .zip(colors),
        );
    }
}
