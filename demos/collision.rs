//! Example demonstrating collision primitive placement along splines.
//!
//! One spline gets boxes, the other capsules; enable the physics debug
//! renderer to see them.
//!
//! Run with: `cargo run --example collision`

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_spline_segments::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Spline Collision Example".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(PhysicsDebugPlugin::default())
        .add_plugins(SplineCollisionPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, draw_splines)
        .run();
}

fn setup(mut commands: Commands) {
    // Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(12.0, 10.0, 18.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        affects_lightmapped_meshes: true,
    });

    // Boxes along a curved spline
    let box_spline = commands
        .spawn((
            Spline::new(
                SplineType::CatmullRom,
                vec![
                    Vec3::new(-8.0, 0.0, -3.0),
                    Vec3::new(-4.0, 1.0, 0.0),
                    Vec3::new(0.0, 0.0, -2.0),
                    Vec3::new(4.0, 2.0, 0.0),
                    Vec3::new(8.0, 0.0, -3.0),
                ],
            ),
            Transform::IDENTITY,
            Visibility::default(),
        ))
        .id();

    commands.spawn(
        SplineCollision::boxes(box_spline, Vec3::new(1.0, 0.5, 2.0), 2.0)
            .with_offset(Vec3::new(0.0, 0.25, 0.0)),
    );

    // Capsules along a second spline
    let capsule_spline = commands
        .spawn((
            Spline::new(
                SplineType::CatmullRom,
                vec![
                    Vec3::new(-8.0, 0.0, 4.0),
                    Vec3::new(-3.0, 2.0, 6.0),
                    Vec3::new(3.0, 1.0, 4.0),
                    Vec3::new(8.0, 0.0, 6.0),
                ],
            ),
            Transform::IDENTITY,
            Visibility::default(),
        ))
        .id();

    commands.spawn(SplineCollision::capsules(capsule_spline, 0.4, 2.5));
}

fn draw_splines(mut gizmos: Gizmos, splines: Query<&Spline>) {
    for spline in &splines {
        let points = spline.sample(16);
        for pair in points.windows(2) {
            gizmos.line(pair[0], pair[1], Color::srgb(0.9, 0.9, 0.2));
        }
    }
}
