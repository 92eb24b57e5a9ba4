//! Example demonstrating pooled segment meshes along a spline.
//!
//! The spline is animated every frame; watch the pool grow, shrink, and
//! re-fit without respawning surviving segments.
//!
//! Run with: `cargo run --example segments`

use bevy::{
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
};
use bevy_spline_segments::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Spline Segments Example".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(SplineSegmentsPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (animate_spline, draw_spline))
        .run();
}

/// A flat strip along +Z, the shape the segment pool bends along the curve.
fn strip_mesh(width: f32, length: f32) -> Mesh {
    let hw = width / 2.0;
    let positions = vec![
        [-hw, 0.0, 0.0],
        [hw, 0.0, 0.0],
        [-hw, 0.0, length],
        [hw, 0.0, length],
    ];
    let normals = vec![[0.0, 1.0, 0.0]; 4];
    let uvs = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(vec![0, 1, 2, 1, 3, 2]));
    mesh
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(10.0, 12.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Lighting
    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        affects_lightmapped_meshes: true,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Create a curved spline path
    let spline = commands
        .spawn(Spline::new(
            SplineType::CatmullRom,
            vec![
                Vec3::new(-8.0, 0.0, 0.0),
                Vec3::new(-4.0, 2.0, 3.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(4.0, 3.0, -2.0),
                Vec3::new(8.0, 1.0, 1.0),
            ],
        ))
        .id();

    let segment_mesh = meshes.add(strip_mesh(1.0, 2.0));
    let segment_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.5, 0.8),
        ..default()
    });

    commands.spawn((
        SplineSegments::new(spline, segment_mesh)
            .with_material(segment_material)
            .with_policy(SegmentPolicy::FixedLength {
                segment_length: 2.0,
            })
            .with_rings(8),
        Transform::IDENTITY,
        Visibility::default(),
    ));
}

/// Wiggle a control point so the pool reconciles every frame.
fn animate_spline(mut splines: Query<&mut Spline>, time: Res<Time>) {
    let t = time.elapsed_secs();
    for mut spline in &mut splines {
        if let Some(point) = spline.control_points.get_mut(3) {
            point.y = 3.0 + 2.0 * t.sin();
            point.z = -2.0 + 3.0 * (t * 0.7).cos();
        }
    }
}

fn draw_spline(mut gizmos: Gizmos, splines: Query<&Spline>) {
    for spline in &splines {
        let points = spline.sample(16);
        for pair in points.windows(2) {
            gizmos.line(pair[0], pair[1], Color::srgb(0.9, 0.9, 0.2));
        }
    }
}
