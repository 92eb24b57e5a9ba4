//! Bending a segment mesh between two poses.
//!
//! A pooled segment's visual is a straight source mesh whose cross-section
//! profile gets swept along the cubic Hermite curve defined by the segment's
//! start/end positions and scaled tangents. The result hugs the curve instead
//! of cutting straight across it.

use bevy::{
    mesh::{Indices, PrimitiveTopology, VertexAttributeValues},
    prelude::*,
};

use crate::geometry::CoordinateFrame;

use super::SegmentPose;

/// A vertex in a mesh cross-section profile.
#[derive(Debug, Clone)]
pub struct ProfileVertex {
    /// The vertex position in the source mesh.
    pub position: Vec3,
    /// The UV coordinates, when the source mesh has them.
    pub uv: Option<Vec2>,
}

/// Extract the cross-section profile from a segment mesh.
///
/// Returns vertices at the front edge (minimum Z) sorted by X coordinate.
/// The source mesh is expected to extend along +Z; the front edge is the
/// cross-section that gets swept.
pub fn extract_mesh_profile(mesh: &Mesh) -> Option<Vec<ProfileVertex>> {
    let positions = mesh.attribute(Mesh::ATTRIBUTE_POSITION)?;
    let positions = match positions {
        VertexAttributeValues::Float32x3(v) => v,
        _ => return None,
    };

    let uvs: Option<&Vec<[f32; 2]>> = mesh.attribute(Mesh::ATTRIBUTE_UV_0).and_then(|attr| {
        if let VertexAttributeValues::Float32x2(v) = attr {
            Some(v)
        } else {
            None
        }
    });

    let min_z = positions
        .iter()
        .map(|p| p[2])
        .min_by(|a: &f32, b: &f32| a.partial_cmp(b).unwrap())?;

    let tolerance = 0.001;
    let mut profile: Vec<ProfileVertex> = positions
        .iter()
        .enumerate()
        .filter(|(_, p)| (p[2] - min_z).abs() < tolerance)
        .map(|(i, p)| ProfileVertex {
            position: Vec3::new(p[0], p[1], p[2]),
            uv: uvs.map(|uvs| Vec2::new(uvs[i][0], uvs[i][1])),
        })
        .collect();

    // Sort by X coordinate for consistent ordering
    profile.sort_by(|a, b| a.position.x.partial_cmp(&b.position.x).unwrap());

    Some(profile)
}

/// Position on the cubic Hermite curve through the pose at parameter t.
pub fn hermite_position(pose: &SegmentPose, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    (2.0 * t3 - 3.0 * t2 + 1.0) * pose.start_position
        + (t3 - 2.0 * t2 + t) * pose.start_tangent
        + (-2.0 * t3 + 3.0 * t2) * pose.end_position
        + (t3 - t2) * pose.end_tangent
}

/// Derivative of the Hermite curve at parameter t.
pub fn hermite_tangent(pose: &SegmentPose, t: f32) -> Vec3 {
    let t2 = t * t;

    (6.0 * t2 - 6.0 * t) * pose.start_position
        + (3.0 * t2 - 4.0 * t + 1.0) * pose.start_tangent
        + (-6.0 * t2 + 6.0 * t) * pose.end_position
        + (3.0 * t2 - 2.0 * t) * pose.end_tangent
}

/// Bend a segment mesh between the two ends of a pose.
///
/// Sweeps the source mesh's cross-section profile along the Hermite curve in
/// `rings + 1` rows. Returns `None` when the source mesh carries no usable
/// profile.
pub fn bend_segment_mesh(source: &Mesh, pose: &SegmentPose, rings: usize) -> Option<Mesh> {
    let profile = extract_mesh_profile(source)?;
    if profile.is_empty() {
        return None;
    }

    let rings = rings.max(1);
    let profile_len = profile.len();
    let total_vertices = profile_len * (rings + 1);

    let mut positions = Vec::with_capacity(total_vertices);
    let mut normals = Vec::with_capacity(total_vertices);
    let mut uvs = Vec::with_capacity(total_vertices);

    // A degenerate pose has no usable tangent anywhere; carry the last valid
    // one forward so zero-length slices still produce a frame.
    let mut last_tangent = Vec3::Z;

    for ring in 0..=rings {
        let t = ring as f32 / rings as f32;

        let center = hermite_position(pose, t);
        let mut tangent = hermite_tangent(pose, t);
        if tangent.length_squared() < 1e-8 {
            tangent = last_tangent;
        } else {
            last_tangent = tangent;
        }

        let frame = CoordinateFrame::from_tangent(tangent);

        for vertex in &profile {
            let offset = frame.transform_profile_point(vertex.position.x, vertex.position.y);
            let position = center + offset;

            positions.push([position.x, position.y, position.z]);
            normals.push([frame.up.x, frame.up.y, frame.up.z]);

            // UV: U from the profile, V from progress along the segment.
            let u = vertex.uv.map(|uv| uv.x).unwrap_or(0.0);
            uvs.push([u, t]);
        }
    }

    // Two triangles per quad between consecutive rings.
    let mut indices = Vec::new();
    for ring in 0..rings {
        let row = ring * profile_len;
        let next_row = (ring + 1) * profile_len;

        for i in 0..(profile_len - 1) {
            let a = (row + i) as u32;
            let b = (row + i + 1) as u32;
            let c = (next_row + i) as u32;
            let d = (next_row + i + 1) as u32;

            indices.extend_from_slice(&[a, b, c]);
            indices.extend_from_slice(&[b, d, c]);
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));

    mesh.compute_normals();

    Some(mesh)
}
