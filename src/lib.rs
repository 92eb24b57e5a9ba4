//! # bevy_spline_segments
//!
//! A Bevy plugin for generating pooled segment meshes and collision
//! primitives along 3D splines.
//!
//! ## Features
//!
//! - Multiple spline types: Cubic Bézier, Catmull-Rom, B-Spline
//! - Persistent segment pools that are reconciled in place as the spline
//!   changes, instead of being rebuilt from scratch
//! - Fixed-length, capped, and adaptive tolerance-stepping segmentation
//! - Bent segment meshes that follow the curve between pose boundaries
//! - Box and capsule collision placement along the curve (via avian3d)
//! - Serializable with Bevy's scene system (RON format)
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_spline_segments::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SplineSegmentsPlugin)
//!         .add_plugins(SplineCollisionPlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
//!     let spline = commands
//!         .spawn(Spline::new(
//!             SplineType::CatmullRom,
//!             vec![
//!                 Vec3::new(-3.0, 0.0, 0.0),
//!                 Vec3::new(-1.0, 2.0, 0.0),
//!                 Vec3::new(1.0, -1.0, 0.0),
//!                 Vec3::new(3.0, 1.0, 0.0),
//!             ],
//!         ))
//!         .id();
//!
//!     let segment_mesh = meshes.add(/* straight mesh along +Z */);
//!     commands.spawn((
//!         SplineSegments::new(spline, segment_mesh),
//!         Transform::IDENTITY,
//!         Visibility::default(),
//!     ));
//! }
//! ```
//!
//! ## Plugins
//!
//! - [`SplinePlugin`]: Core spline functionality and type registration (required)
//! - [`SplineSegmentsPlugin`]: Pooled segment meshes along splines (optional)
//! - [`SplineCollisionPlugin`]: Collision primitives along splines (optional)
//!
//! ## Core without the ECS
//!
//! The generation algorithms are plain functions over the [`curve::Curve`]
//! trait: [`stepping::next_step`] for adaptive tolerance stepping and
//! [`segments::reconcile_segments`] for pool reconciliation. The plugins are
//! thin system wrappers over them; callers with their own scene model can use
//! the functions directly.

pub mod collision;
pub mod curve;
pub mod geometry;
pub mod segments;
pub mod spline;
pub mod stepping;

pub use collision::SplineCollisionPlugin;
pub use segments::SplineSegmentsPlugin;
pub use spline::SplinePlugin;

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::collision::{
        CollisionShape, GeneratedSplineCollider, SplineCollision, SplineCollisionPlugin,
    };
    pub use crate::curve::{Curve, CurveSpace, SampledCurve};
    pub use crate::geometry::CoordinateFrame;
    pub use crate::segments::{
        bend_segment_mesh, reconcile_segments, PooledSegment, SegmentHandle, SegmentPolicy,
        SegmentPose, SplineSegments, SplineSegmentsPlugin,
    };
    pub use crate::spline::{ArcLengthTable, Spline, SplineEvaluator, SplinePlugin, SplineType};
    pub use crate::stepping::{
        collect_steps, next_step, CurveStep, DeviationMetric, SteppingConfig,
    };
}
