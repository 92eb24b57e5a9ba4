mod arc_length;
mod components;
mod types;

pub use arc_length::*;
pub use components::*;
pub use types::*;

use bevy::prelude::*;

/// Plugin that registers spline types for reflection/serialization.
/// Generation plugins add this automatically when it is missing.
pub struct SplinePlugin;

impl Plugin for SplinePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SplineType>().register_type::<Spline>();
    }
}
