//! Arc-length parameterized curve abstraction.
//!
//! The stepping and segment generation algorithms only need a path they can
//! query by distance, not a concrete spline representation. [`Curve`] is that
//! seam; [`SampledCurve`] adapts a [`Spline`] to it through an
//! [`ArcLengthTable`].

use bevy::prelude::*;

use crate::spline::{ArcLengthTable, Spline, DEFAULT_ARC_LENGTH_SAMPLES};

/// Coordinate space for curve queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum CurveSpace {
    /// Spline-local coordinates, relative to the owning entity.
    #[default]
    Local,
    /// World coordinates.
    World,
}

/// An arc-length parameterized 3D path.
///
/// Distances are measured in world units from the start of the curve,
/// independent of the underlying control-point parameterization. Tangents are
/// unnormalized; callers that need a direction normalize them, callers that
/// need curvature hints use the magnitude.
pub trait Curve {
    /// Total arc length of the curve.
    fn length(&self) -> f32;

    /// Position at the given arc-length distance.
    ///
    /// Distances outside `[0, length]` are clamped to the curve ends.
    fn position_at(&self, distance: f32, space: CurveSpace) -> Vec3;

    /// Tangent at the given arc-length distance (unnormalized).
    fn tangent_at(&self, distance: f32, space: CurveSpace) -> Vec3;
}

/// A [`Curve`] view over a [`Spline`].
///
/// Builds an [`ArcLengthTable`] once at construction and answers all distance
/// queries through it. The view borrows the spline, so it lives for a single
/// generation pass; rebuild it when the spline changes.
pub struct SampledCurve<'a> {
    spline: &'a Spline,
    table: ArcLengthTable,
    transform: Transform,
}

impl<'a> SampledCurve<'a> {
    /// Create a curve view with the default sample resolution.
    pub fn new(spline: &'a Spline) -> Self {
        Self::with_samples(spline, DEFAULT_ARC_LENGTH_SAMPLES)
    }

    /// Create a curve view with an explicit sample count.
    ///
    /// More samples give a more accurate distance parameterization at the cost
    /// of construction time.
    pub fn with_samples(spline: &'a Spline, samples: usize) -> Self {
        Self {
            spline,
            table: ArcLengthTable::compute(spline, samples),
            transform: Transform::IDENTITY,
        }
    }

    /// Set the transform used for [`CurveSpace::World`] queries.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn t_at(&self, distance: f32) -> f32 {
        self.table.length_to_t(distance)
    }
}

impl Curve for SampledCurve<'_> {
    fn length(&self) -> f32 {
        self.table.total_length()
    }

    fn position_at(&self, distance: f32, space: CurveSpace) -> Vec3 {
        let local = self
            .spline
            .evaluate(self.t_at(distance))
            .unwrap_or(Vec3::ZERO);
        match space {
            CurveSpace::Local => local,
            CurveSpace::World => self.transform.transform_point(local),
        }
    }

    fn tangent_at(&self, distance: f32, space: CurveSpace) -> Vec3 {
        let local = self
            .spline
            .evaluate_tangent(self.t_at(distance))
            .unwrap_or(Vec3::ZERO);
        match space {
            CurveSpace::Local => local,
            CurveSpace::World => self.transform.rotation * (local * self.transform.scale),
        }
    }
}
