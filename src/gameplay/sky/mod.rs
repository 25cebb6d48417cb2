use crate::config::{GameConfig, SkyConfig};
use crate::gameplay::vehicle::SimulationSystems;
use crate::states::GameState;
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

const NIGHT_TOP: [u8; 3] = [0x0a, 0x0a, 0x2c];
const NIGHT_BOTTOM: [u8; 3] = [0x1a, 0x1b, 0x4b];
const DAWN_TOP: [u8; 3] = [0xff, 0x7f, 0x50];
const DAY_TOP: [u8; 3] = [0x4b, 0x9f, 0xe1];
const DAY_BOTTOM: [u8; 3] = [0x87, 0xce, 0xeb];
const STAR_BAND_HEIGHT: f32 = 0.7;

pub struct SkyPlugin;

impl Plugin for SkyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Title), setup_sky_clock)
            .add_systems(
                Update,
                advance_sky_clock
                    .in_set(SimulationSystems::Present)
                    .run_if(in_state(GameState::InRun))
                    .run_if(resource_exists::<SkyClock>),
            );
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Horizontal position as a fraction of the view width.
    pub x: f32,
    /// Vertical position as a fraction of the view height, measured from the top.
    pub y: f32,
    pub brightness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyGradient {
    pub top: Srgba,
    pub bottom: Srgba,
}

/// Decorative day/night cycle. Consumes elapsed time only.
#[derive(Resource, Debug, Clone)]
pub struct SkyClock {
    time_s: f32,
    day_length_s: f32,
    stars: Vec<Star>,
}

impl SkyClock {
    pub fn new(config: &SkyConfig, rng: &mut impl Rng) -> Self {
        let stars = (0..config.star_count)
            .map(|_| Star {
                x: rng.random::<f32>(),
                y: rng.random::<f32>() * STAR_BAND_HEIGHT,
                brightness: 0.5 + rng.random::<f32>() * 0.5,
            })
            .collect();

        Self {
            time_s: 0.0,
            day_length_s: config.day_length_s.max(f32::EPSILON),
            stars,
        }
    }

    pub fn advance(&mut self, delta_s: f32) {
        self.time_s = (self.time_s + delta_s.max(0.0)).rem_euclid(self.day_length_s);
    }

    /// Cycle phase folded through a sine into `[0, 1]`.
    pub fn day_progress(&self) -> f32 {
        (self.time_s / self.day_length_s * TAU).sin() * 0.5 + 0.5
    }

    pub fn gradient(&self) -> SkyGradient {
        let progress = self.day_progress();
        let phase = |start: f32| smoothstep((progress - start) / 0.2);

        let (top, bottom) = if progress < 0.2 {
            (NIGHT_TOP, NIGHT_BOTTOM)
        } else if progress < 0.4 {
            let t = phase(0.2);
            (lerp_rgb(NIGHT_TOP, DAWN_TOP, t), lerp_rgb(NIGHT_BOTTOM, DAY_BOTTOM, t))
        } else if progress < 0.6 {
            (lerp_rgb(DAWN_TOP, DAY_TOP, phase(0.4)), DAY_BOTTOM)
        } else if progress < 0.8 {
            let t = phase(0.6);
            (lerp_rgb(DAY_TOP, DAWN_TOP, t), lerp_rgb(DAY_BOTTOM, NIGHT_BOTTOM, t))
        } else {
            (lerp_rgb(DAWN_TOP, NIGHT_TOP, phase(0.8)), NIGHT_BOTTOM)
        };

        SkyGradient {
            top: to_srgba(top),
            bottom: to_srgba(bottom),
        }
    }

    pub fn star_opacity(&self) -> f32 {
        let progress = self.day_progress();
        if progress > 0.2 && progress < 0.4 {
            1.0 - smoothstep((progress - 0.2) / 0.2)
        } else if (0.4..=0.6).contains(&progress) {
            0.0
        } else if progress > 0.6 && progress < 0.8 {
            smoothstep((progress - 0.6) / 0.2)
        } else {
            1.0
        }
    }

    /// Stars with brightness already scaled by the current opacity.
    pub fn visible_stars(&self) -> impl Iterator<Item = Star> + '_ {
        let opacity = self.star_opacity();
        self.stars.iter().filter(move |_| opacity > 0.0).map(move |star| Star {
            brightness: star.brightness * opacity,
            ..*star
        })
    }
}

fn setup_sky_clock(mut commands: Commands, config: Res<GameConfig>, clock: Option<Res<SkyClock>>) {
    if clock.is_some() {
        return;
    }
    commands.insert_resource(SkyClock::new(&config.sky, &mut rand::rng()));
}

fn advance_sky_clock(time: Res<Time>, mut clock: ResMut<SkyClock>, mut clear_color: ResMut<ClearColor>) {
    clock.advance(time.delta_secs());
    clear_color.0 = clock.gradient().top.into();
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp_rgb(from: [u8; 3], to: [u8; 3], t: f32) -> [u8; 3] {
    std::array::from_fn(|channel| {
        let (a, b) = (f32::from(from[channel]), f32::from(to[channel]));
        (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
    })
}

fn to_srgba(rgb: [u8; 3]) -> Srgba {
    Srgba::rgb_u8(rgb[0], rgb[1], rgb[2])
}
