pub mod physics;
pub mod scoring;
pub mod sfx;
pub mod sky;
pub mod terrain;
pub mod vehicle;

use bevy::prelude::*;
use sfx::GameplaySfxPlugin;
use sky::SkyPlugin;
use vehicle::VehicleGameplayPlugin;

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(VehicleGameplayPlugin)
            .add_plugins(GameplaySfxPlugin)
            .add_plugins(SkyPlugin);
    }
}
