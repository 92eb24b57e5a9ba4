mod systems;

pub use systems::collision_intervals;

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::spline::SplinePlugin;

/// Plugin for placing collision primitives along splines.
///
/// A [`SplineCollision`] component spawns one collider per spacing interval
/// along the full curve, oriented by the local tangent frame. Unlike the
/// segment mesh pool, colliders are not reconciled: regeneration despawns the
/// previous set and spawns a fresh one.
///
/// # Usage
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_spline_segments::prelude::*;
///
/// fn setup(mut commands: Commands) {
///     let spline = commands.spawn(Spline::new(
///         SplineType::CatmullRom,
///         vec![/* points */],
///     )).id();
///
///     commands.spawn(SplineCollision::boxes(spline, Vec3::new(1.0, 0.5, 2.0), 2.0));
/// }
/// ```
pub struct SplineCollisionPlugin;

impl Plugin for SplineCollisionPlugin {
    fn build(&self, app: &mut App) {
        // Ensure SplinePlugin is added
        if !app.is_plugin_added::<SplinePlugin>() {
            app.add_plugins(SplinePlugin);
        }

        app.register_type::<SplineCollision>()
            .register_type::<CollisionShape>()
            .register_type::<GeneratedSplineCollider>()
            .add_systems(
                Update,
                (systems::update_spline_collision, systems::cleanup_spline_collision).chain(),
            );
    }
}

/// Shape of the generated collision primitives.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum CollisionShape {
    /// Box with the given full extent. Z runs along the spline, X is
    /// sideways and Y is height.
    Box {
        /// Full side lengths of the box.
        extent: Vec3,
    },
    /// Capsule of the given radius, aligned along the spline and spanning one
    /// spacing interval.
    Capsule {
        /// Capsule radius.
        radius: f32,
    },
}

/// Component that places collision primitives along a spline.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SplineCollision {
    /// The spline entity to place collision along.
    pub spline: Entity,
    /// Shape of each generated primitive.
    pub shape: CollisionShape,
    /// Distance between consecutive primitives along the curve.
    pub spacing: f32,
    /// Offset applied in the spline-local frame (X sideways, Y up, Z along
    /// the tangent).
    pub offset: Vec3,
    /// Collision layers assigned to every generated primitive.
    pub layers: CollisionLayers,
    /// Whether generation is enabled.
    pub enabled: bool,
}

impl Default for SplineCollision {
    fn default() -> Self {
        Self {
            spline: Entity::PLACEHOLDER,
            shape: CollisionShape::Box { extent: Vec3::ONE },
            spacing: 2.0,
            offset: Vec3::ZERO,
            layers: CollisionLayers::default(),
            enabled: true,
        }
    }
}

impl SplineCollision {
    /// Place boxes of the given extent along the spline.
    pub fn boxes(spline: Entity, extent: Vec3, spacing: f32) -> Self {
        Self {
            spline,
            shape: CollisionShape::Box { extent },
            spacing,
            ..default()
        }
    }

    /// Place capsules of the given radius along the spline.
    pub fn capsules(spline: Entity, radius: f32, spacing: f32) -> Self {
        Self {
            spline,
            shape: CollisionShape::Capsule { radius },
            spacing,
            ..default()
        }
    }

    /// Set the offset applied in the spline-local frame.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Set the collision layers assigned to generated primitives.
    pub fn with_layers(mut self, layers: CollisionLayers) -> Self {
        self.layers = layers;
        self
    }
}

/// Marker component added to generated collider entities.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct GeneratedSplineCollider {
    /// The SplineCollision entity this collider belongs to.
    pub source: Entity,
}
