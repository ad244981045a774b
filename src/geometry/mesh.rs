//! Triangulated mesh geometry and its incremental builder.
//!
//! A [`Mesh`] is immutable once built: flat position/normal buffers, a
//! triangle index buffer, and one group tag per vertex for picking. The
//! [`MeshBuilder`] appends whole primitives (cylinders, spheres), each
//! tagged with a caller-supplied group id.

use glam::Vec3;

use crate::geometry::primitive::{find_perpendicular, unit_sphere};
use crate::geometry::sphere3d::Sphere3D;

/// Degenerate axes below this length produce no geometry.
const MIN_AXIS_LENGTH: f32 = 1e-6;

/// Shape parameters for one cylinder primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderProps {
    /// Radius at the far (end) ring.
    pub radius_top: f32,
    /// Radius at the near (start) ring.
    pub radius_bottom: f32,
    /// Number of segments around the axis.
    pub radial_segments: u32,
}

impl Default for CylinderProps {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            radial_segments: 16,
        }
    }
}

/// An immutable triangulated mesh with per-vertex picking groups.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    positions: Vec<f32>,
    normals: Vec<f32>,
    groups: Vec<u32>,
    indices: Vec<u32>,
    bounding_sphere: Sphere3D,
}

impl Mesh {
    /// An empty mesh, reclaiming `previous`'s backing storage when given.
    pub fn empty(previous: Option<Mesh>) -> Self {
        previous.map_or_else(Self::default, |mut m| {
            m.positions.clear();
            m.normals.clear();
            m.groups.clear();
            m.indices.clear();
            m.bounding_sphere = Sphere3D::ZERO;
            m
        })
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat vertex positions, 3 floats per vertex.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat vertex normals, 3 floats per vertex.
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    /// Picking group tag per vertex.
    pub fn groups(&self) -> &[u32] {
        &self.groups
    }

    /// Triangle index buffer.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Position buffer as bytes, for GPU upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normal buffer as bytes, for GPU upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Index buffer as bytes, for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Group buffer as bytes, for GPU upload.
    pub fn group_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.groups)
    }

    /// Bounding sphere of the mesh.
    pub fn bounding_sphere(&self) -> Sphere3D {
        self.bounding_sphere
    }

    /// The distinct group ids in first-emission order.
    pub fn group_sequence(&self) -> Vec<u32> {
        let mut out: Vec<u32> = Vec::new();
        for &g in &self.groups {
            if out.last() != Some(&g) {
                out.push(g);
            }
        }
        out
    }
}

/// Incremental mesh construction.
pub struct MeshBuilder {
    positions: Vec<f32>,
    normals: Vec<f32>,
    groups: Vec<u32>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    /// A builder with pre-reserved capacity.
    pub fn with_capacity(
        vertex_estimate: usize,
        triangle_estimate: usize,
    ) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_estimate * 3),
            normals: Vec::with_capacity(vertex_estimate * 3),
            groups: Vec::with_capacity(vertex_estimate),
            indices: Vec::with_capacity(triangle_estimate * 3),
        }
    }

    /// A builder reclaiming a previous mesh's backing storage.
    pub fn reuse(previous: Mesh) -> Self {
        let mut m = previous;
        m.positions.clear();
        m.normals.clear();
        m.groups.clear();
        m.indices.clear();
        Self {
            positions: m.positions,
            normals: m.normals,
            groups: m.groups,
            indices: m.indices,
        }
    }

    /// Pick reuse or fresh allocation depending on `previous`.
    pub fn reuse_or_with_capacity(
        previous: Option<Mesh>,
        vertex_estimate: usize,
        triangle_estimate: usize,
    ) -> Self {
        previous.map_or_else(
            || Self::with_capacity(vertex_estimate, triangle_estimate),
            Self::reuse,
        )
    }

    /// Number of vertices emitted so far.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, group: u32) {
        self.positions.extend_from_slice(&position.to_array());
        self.normals.extend_from_slice(&normal.to_array());
        self.groups.push(group);
    }

    /// Append an uncapped cylinder from `start` along `start → end`, scaled
    /// to `length_scale` of the span, tagged `group`.
    pub fn add_cylinder(
        &mut self,
        start: Vec3,
        end: Vec3,
        length_scale: f32,
        props: &CylinderProps,
        group: u32,
    ) {
        let axis = (end - start) * length_scale;
        let length = axis.length();
        if length < MIN_AXIS_LENGTH || props.radial_segments < 2 {
            return;
        }
        let dir = axis / length;
        let u = find_perpendicular(dir);
        let v = dir.cross(u);

        let radial = props.radial_segments;
        let base = self.vertex_count() as u32;

        // Bottom and top ring vertices, radial normals, shared seam.
        for s in 0..radial {
            let angle =
                (s as f32 / radial as f32) * std::f32::consts::TAU;
            let normal = u * angle.cos() + v * angle.sin();
            self.push_vertex(
                start + normal * props.radius_bottom,
                normal,
                group,
            );
            self.push_vertex(
                start + axis + normal * props.radius_top,
                normal,
                group,
            );
        }

        // Two triangles per quad between the rings.
        for s in 0..radial {
            let s_next = (s + 1) % radial;
            let v0 = base + s * 2;
            let v1 = base + s * 2 + 1;
            let v2 = base + s_next * 2;
            let v3 = base + s_next * 2 + 1;
            self.indices.extend_from_slice(&[v0, v2, v1]);
            self.indices.extend_from_slice(&[v1, v2, v3]);
        }
    }

    /// Append an icosphere at `center`, tagged `group`.
    pub fn add_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        detail: u32,
        group: u32,
    ) {
        let sphere = unit_sphere(detail);
        let base = self.vertex_count() as u32;
        for &p in &sphere.positions {
            self.push_vertex(center + p * radius, p, group);
        }
        self.indices
            .extend(sphere.indices.iter().map(|&i| base + i));
    }

    /// Finish into an immutable mesh with the given bounding sphere.
    pub fn finish(self, bounding_sphere: Sphere3D) -> Mesh {
        Mesh {
            positions: self.positions,
            normals: self.normals,
            groups: self.groups,
            indices: self.indices,
            bounding_sphere,
        }
    }
}
