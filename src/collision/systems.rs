use avian3d::prelude::*;
use bevy::prelude::*;

use crate::curve::{Curve, CurveSpace, SampledCurve};
use crate::geometry::CoordinateFrame;
use crate::spline::Spline;

use super::{CollisionShape, GeneratedSplineCollider, SplineCollision};

/// Number of samples used to compute the arc length lookup table.
const ARC_LENGTH_SAMPLES: usize = 256;

/// Arc-length intervals the primitives are centered in.
///
/// One interval per spacing distance along the full curve; the last interval
/// may be shorter. A curve of zero length still gets one interval.
pub fn collision_intervals(length: f32, spacing: f32) -> Vec<(f32, f32)> {
    let count = ((length / spacing).ceil() as usize).max(1);
    (0..count)
        .map(|i| (i as f32 * spacing, ((i + 1) as f32 * spacing).min(length)))
        .collect()
}

/// Regenerate collision primitives when their spline or configuration changes.
pub fn update_spline_collision(
    mut commands: Commands,
    configs: Query<(Entity, &SplineCollision)>,
    splines: Query<&Spline>,
    changed_splines: Query<Entity, Changed<Spline>>,
    changed_configs: Query<Entity, Changed<SplineCollision>>,
    existing: Query<(Entity, &GeneratedSplineCollider)>,
) {
    let changed_spline_set: std::collections::HashSet<Entity> = changed_splines.iter().collect();
    let changed_config_set: std::collections::HashSet<Entity> = changed_configs.iter().collect();

    for (config_entity, config) in &configs {
        let needs_update = changed_config_set.contains(&config_entity)
            || changed_spline_set.contains(&config.spline);
        if !needs_update {
            continue;
        }

        // Previous primitives are never reused; despawn and start over.
        for (entity, generated) in &existing {
            if generated.source == config_entity {
                if let Ok(mut entity_commands) = commands.get_entity(entity) {
                    entity_commands.despawn();
                }
            }
        }

        if !config.enabled {
            continue;
        }

        let Ok(spline) = splines.get(config.spline) else {
            continue;
        };

        if !spline.is_valid() {
            continue;
        }

        let curve = SampledCurve::with_samples(spline, ARC_LENGTH_SAMPLES);

        for (start, end) in collision_intervals(curve.length(), config.spacing) {
            let center = 0.5 * (start + end);
            let position = curve.position_at(center, CurveSpace::Local);
            let tangent = curve.tangent_at(center, CurveSpace::Local);
            let frame = CoordinateFrame::from_tangent(tangent);

            let translation = frame.transform_point(position, config.offset);
            let (collider, rotation) = match config.shape {
                CollisionShape::Box { extent } => (
                    Collider::cuboid(extent.x, extent.y, extent.z),
                    frame.to_rotation(),
                ),
                CollisionShape::Capsule { radius } => (
                    // Capsules are Y-aligned locally; tip them onto the
                    // tangent axis so they span their interval.
                    Collider::capsule(radius, config.spacing),
                    frame.to_rotation() * Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
                ),
            };

            let entity = commands
                .spawn((
                    collider,
                    config.layers,
                    Transform {
                        translation,
                        rotation,
                        scale: Vec3::ONE,
                    },
                    GeneratedSplineCollider {
                        source: config_entity,
                    },
                ))
                .id();
            commands.entity(config.spline).add_child(entity);
        }
    }
}

/// Despawn generated colliders when their config component is removed.
pub fn cleanup_spline_collision(
    mut commands: Commands,
    mut removed: RemovedComponents<SplineCollision>,
    existing: Query<(Entity, &GeneratedSplineCollider)>,
) {
    for removed_config in removed.read() {
        for (entity, generated) in &existing {
            if generated.source == removed_config {
                commands.entity(entity).despawn();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals_tile_the_curve() {
        let intervals = collision_intervals(1000.0, 100.0);

        assert_eq!(intervals.len(), 10);
        assert_eq!(intervals[0], (0.0, 100.0));
        assert_eq!(intervals[9], (900.0, 1000.0));
        let centers: Vec<f32> = intervals.iter().map(|(s, e)| 0.5 * (s + e)).collect();
        assert!((centers[0] - 50.0).abs() < 0.001);
        assert!((centers[9] - 950.0).abs() < 0.001);
    }

    #[test]
    fn test_partial_last_interval() {
        let intervals = collision_intervals(250.0, 100.0);

        assert_eq!(intervals.len(), 3);
        assert_eq!(intervals[2], (200.0, 250.0));
    }

    #[test]
    fn test_short_curve_gets_one_interval() {
        let intervals = collision_intervals(30.0, 100.0);

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0], (0.0, 30.0));
    }

    #[test]
    fn test_zero_length_curve_gets_one_interval() {
        let intervals = collision_intervals(0.0, 100.0);

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0], (0.0, 0.0));
    }
}
