//! Impostor sphere geometry: per-primitive instance records rendered as
//! ray-cast billboards by the external backend.

use glam::Vec3;

use crate::geometry::sphere3d::Sphere3D;

/// Per-instance data for a sphere impostor.
/// Must match the GPU-side struct layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereInstance {
    /// xyz = center position, w = picking group packed as float.
    pub center: [f32; 4],
}

impl SphereInstance {
    /// Center position.
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.center[0], self.center[1], self.center[2])
    }
}

/// Immutable impostor sphere list with per-primitive picking groups.
#[derive(Debug, Clone, Default)]
pub struct Spheres {
    instances: Vec<SphereInstance>,
    groups: Vec<u32>,
    bounding_sphere: Sphere3D,
}

impl Spheres {
    /// An empty list, reclaiming `previous`'s backing storage when given.
    pub fn empty(previous: Option<Spheres>) -> Self {
        previous.map_or_else(Self::default, |mut s| {
            s.instances.clear();
            s.groups.clear();
            s.bounding_sphere = Sphere3D::ZERO;
            s
        })
    }

    /// Number of spheres.
    pub fn sphere_count(&self) -> usize {
        self.instances.len()
    }

    /// Instance records.
    pub fn instances(&self) -> &[SphereInstance] {
        &self.instances
    }

    /// Instance buffer as bytes, for GPU upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Picking group tag per sphere.
    pub fn groups(&self) -> &[u32] {
        &self.groups
    }

    /// Bounding sphere of the geometry.
    pub fn bounding_sphere(&self) -> Sphere3D {
        self.bounding_sphere
    }
}

/// Incremental impostor sphere construction.
pub struct SpheresBuilder {
    instances: Vec<SphereInstance>,
    groups: Vec<u32>,
}

impl SpheresBuilder {
    /// A builder with pre-reserved capacity.
    pub fn with_capacity(estimate: usize) -> Self {
        Self {
            instances: Vec::with_capacity(estimate),
            groups: Vec::with_capacity(estimate),
        }
    }

    /// Pick reuse or fresh allocation depending on `previous`.
    pub fn reuse_or_with_capacity(
        previous: Option<Spheres>,
        estimate: usize,
    ) -> Self {
        previous.map_or_else(
            || Self::with_capacity(estimate),
            |mut s| {
                s.instances.clear();
                s.groups.clear();
                Self {
                    instances: s.instances,
                    groups: s.groups,
                }
            },
        )
    }

    /// Append one sphere tagged `group`.
    pub fn add(&mut self, center: Vec3, group: u32) {
        self.instances.push(SphereInstance {
            center: [center.x, center.y, center.z, group as f32],
        });
        self.groups.push(group);
    }

    /// Number of spheres emitted so far.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Finish into an immutable list with the given bounding sphere.
    pub fn finish(self, bounding_sphere: Sphere3D) -> Spheres {
        Spheres {
            instances: self.instances,
            groups: self.groups,
            bounding_sphere,
        }
    }
}
