use bevy::prelude::*;

use crate::curve::SampledCurve;
use crate::spline::Spline;

use super::{
    bend_segment_mesh, reconcile_segments, PooledSegment, SegmentHandle, SegmentPoolState,
    SegmentPose, SplineSegments,
};

/// Number of samples used to compute the arc length lookup table.
const ARC_LENGTH_SAMPLES: usize = 256;

/// Pool entry backing one spawned segment entity.
///
/// The slot records what the reconciler decided; the owning system applies it
/// to the ECS afterwards. Despawning is also the system's job, since slots
/// have no access to `Commands`.
#[derive(Debug, Clone)]
pub(crate) struct SegmentSlot {
    pub entity: Entity,
    pub pose: SegmentPose,
    pub visual: Handle<Mesh>,
    pub activated: bool,
}

impl SegmentHandle for SegmentSlot {
    type Visual = Handle<Mesh>;

    fn set_pose(&mut self, pose: &SegmentPose) {
        self.pose = *pose;
    }

    fn set_visual(&mut self, visual: Handle<Mesh>) {
        self.visual = visual;
    }

    fn is_activated(&self) -> bool {
        self.activated
    }

    fn activate(&mut self) {
        self.activated = true;
    }

    fn destroy(self) {}
}

/// Reconcile segment pools when their spline or configuration changes.
pub fn update_segment_pools(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    pools: Query<(Entity, &SplineSegments, Option<&SegmentPoolState>)>,
    splines: Query<&Spline>,
    changed_splines: Query<Entity, Changed<Spline>>,
    changed_pools: Query<Entity, Changed<SplineSegments>>,
) {
    // Collect changed entities for quick lookup
    let changed_spline_set: std::collections::HashSet<Entity> = changed_splines.iter().collect();
    let changed_pool_set: std::collections::HashSet<Entity> = changed_pools.iter().collect();

    for (pool_entity, config, state) in &pools {
        if !config.enabled {
            continue;
        }

        let needs_update = state.is_none()
            || changed_pool_set.contains(&pool_entity)
            || changed_spline_set.contains(&config.spline);
        if !needs_update {
            continue;
        }

        let Ok(spline) = splines.get(config.spline) else {
            continue;
        };

        if !spline.is_valid() {
            continue;
        }

        let curve = SampledCurve::with_samples(spline, ARC_LENGTH_SAMPLES);

        // The pool itself persists in SegmentPoolState; reconcile it in place.
        let mut slots = state.map(|s| s.segments.clone()).unwrap_or_default();
        let before: Vec<Entity> = slots.iter().map(|slot| slot.entity).collect();

        reconcile_segments(
            &curve,
            &config.policy,
            Some(&config.mesh),
            &mut slots,
            |_curve| {
                let entity = commands
                    .spawn((
                        Transform::IDENTITY,
                        Visibility::Hidden,
                        MeshMaterial3d(config.material.clone()),
                        PooledSegment {
                            pool: pool_entity,
                            index: 0,
                        },
                    ))
                    .id();
                commands.entity(pool_entity).add_child(entity);
                Some(SegmentSlot {
                    entity,
                    pose: SegmentPose::default(),
                    visual: Handle::default(),
                    activated: false,
                })
            },
        );

        // Shrinking only removes from the tail, so the entities to despawn
        // are exactly the old tail.
        if before.len() > slots.len() {
            for &entity in &before[slots.len()..] {
                if let Ok(mut entity_commands) = commands.get_entity(entity) {
                    entity_commands.despawn();
                }
            }
        }

        // Apply the reconciled slots to their entities: bend the mesh to the
        // pose, then reveal. Activation maps to flipping visibility, which
        // only happens after every pose in the batch is written.
        for (index, slot) in slots.iter().enumerate() {
            let bent = meshes
                .get(&slot.visual)
                .and_then(|source| bend_segment_mesh(source, &slot.pose, config.rings));

            let Ok(mut entity_commands) = commands.get_entity(slot.entity) else {
                continue;
            };
            entity_commands.insert(PooledSegment {
                pool: pool_entity,
                index,
            });
            if let Some(bent) = bent {
                entity_commands.insert(Mesh3d(meshes.add(bent)));
            }
            if slot.activated {
                entity_commands.insert(Visibility::Inherited);
            }
        }

        commands
            .entity(pool_entity)
            .insert(SegmentPoolState { segments: slots });
    }
}

/// Despawn segments when their pool component is removed.
pub fn cleanup_segment_pools(
    mut commands: Commands,
    mut removed: RemovedComponents<SplineSegments>,
    states: Query<&SegmentPoolState>,
    segments: Query<(Entity, &PooledSegment)>,
) {
    for removed_pool in removed.read() {
        if let Ok(state) = states.get(removed_pool) {
            for slot in &state.segments {
                if let Ok(mut entity_commands) = commands.get_entity(slot.entity) {
                    entity_commands.despawn();
                }
            }
        }

        // Drop the stale state so a re-added pool starts empty.
        if let Ok(mut entity_commands) = commands.get_entity(removed_pool) {
            entity_commands.remove::<SegmentPoolState>();
        }

        // Also cleanup any segments that reference this pool
        // (in case state wasn't available)
        for (entity, segment) in &segments {
            if segment.pool == removed_pool {
                commands.entity(entity).despawn();
            }
        }
    }
}
