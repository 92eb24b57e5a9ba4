mod mesh_bend;
mod pool;
mod systems;

pub use mesh_bend::*;
pub use pool::*;

use bevy::prelude::*;

use crate::spline::SplinePlugin;

/// Plugin for generating pooled segment meshes along splines.
///
/// A [`SplineSegments`] component keeps a persistent pool of bent mesh
/// segments fitted to a spline. The pool is reconciled in place whenever the
/// spline or the configuration changes: surviving segments are re-posed,
/// missing ones spawned, excess ones despawned. This keeps interactive
/// editing cheap, since the spline changes a lot while most of the pool is
/// reused.
///
/// # Usage
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_spline_segments::prelude::*;
///
/// fn setup(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
///     let spline = commands.spawn(Spline::new(
///         SplineType::CatmullRom,
///         vec![/* points */],
///     )).id();
///
///     let segment_mesh = meshes.add(/* straight segment mesh along +Z */);
///
///     commands.spawn((
///         SplineSegments::new(spline, segment_mesh)
///             .with_policy(SegmentPolicy::FixedLength { segment_length: 2.0 }),
///         Transform::IDENTITY,
///         Visibility::default(),
///     ));
/// }
/// ```
///
/// # Policies
///
/// - [`SegmentPolicy::FixedLength`]: equal arc-length slices, full coverage
/// - [`SegmentPolicy::FixedLengthCapped`]: growth bounded, tail stops short
/// - [`SegmentPolicy::Adaptive`]: slice boundaries from tolerance stepping
pub struct SplineSegmentsPlugin;

impl Plugin for SplineSegmentsPlugin {
    fn build(&self, app: &mut App) {
        // Ensure SplinePlugin is added
        if !app.is_plugin_added::<SplinePlugin>() {
            app.add_plugins(SplinePlugin);
        }

        app.register_type::<SplineSegments>()
            .register_type::<SegmentPolicy>()
            .register_type::<SegmentPose>()
            .register_type::<PooledSegment>()
            .add_systems(
                Update,
                (systems::update_segment_pools, systems::cleanup_segment_pools).chain(),
            );
    }
}

/// Component that keeps a pooled run of segment meshes fitted to a spline.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SplineSegments {
    /// The spline entity the segments follow.
    pub spline: Entity,
    /// Source mesh whose cross-section profile is bent along each segment.
    /// The mesh must extend along +Z with its front edge at Z = 0.
    #[reflect(ignore)]
    pub mesh: Handle<Mesh>,
    /// Material applied to every segment.
    #[reflect(ignore)]
    pub material: Handle<StandardMaterial>,
    /// How segment boundaries are derived from the spline.
    pub policy: SegmentPolicy,
    /// Sweep rows per bent segment. Higher values track bends more smoothly
    /// at the cost of more geometry.
    pub rings: usize,
    /// Whether reconciliation is enabled.
    pub enabled: bool,
}

impl Default for SplineSegments {
    fn default() -> Self {
        Self {
            spline: Entity::PLACEHOLDER,
            mesh: Handle::default(),
            material: Handle::default(),
            policy: SegmentPolicy::FixedLength {
                segment_length: 2.0,
            },
            rings: 8,
            enabled: true,
        }
    }
}

impl SplineSegments {
    /// Create a segment pool for the given spline and source mesh.
    pub fn new(spline: Entity, mesh: Handle<Mesh>) -> Self {
        Self {
            spline,
            mesh,
            ..default()
        }
    }

    /// Set the material applied to segments.
    pub fn with_material(mut self, material: Handle<StandardMaterial>) -> Self {
        self.material = material;
        self
    }

    /// Set the segmentation policy.
    pub fn with_policy(mut self, policy: SegmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the sweep resolution per segment.
    pub fn with_rings(mut self, rings: usize) -> Self {
        self.rings = rings;
        self
    }
}

/// Marker component added to pooled segment entities.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PooledSegment {
    /// The pool controller entity.
    pub pool: Entity,
    /// The index of this segment along the spline (0 = front).
    pub index: usize,
}

/// Internal component tracking a pool's spawned segments.
#[derive(Component, Debug, Clone, Default)]
pub(crate) struct SegmentPoolState {
    /// Current pool entries, front-to-back along the spline.
    pub segments: Vec<systems::SegmentSlot>,
}
