//! Impostor cylinder geometry: per-primitive instance records rendered as
//! ray-cast billboards by the external backend.

use glam::Vec3;

use crate::geometry::sphere3d::Sphere3D;

/// Per-instance data for a cylinder impostor.
/// Lane packing mirrors the GPU-side struct layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CylinderInstance {
    /// xyz = start position, w = radius scale (multiplied by the themed
    /// size in the vertex stage).
    pub start: [f32; 4],
    /// xyz = end position, w = cap bits (1 = top, 2 = bottom) packed as
    /// float.
    pub end: [f32; 4],
}

impl CylinderInstance {
    /// Start position.
    pub fn start_position(&self) -> Vec3 {
        Vec3::new(self.start[0], self.start[1], self.start[2])
    }

    /// End position.
    pub fn end_position(&self) -> Vec3 {
        Vec3::new(self.end[0], self.end[1], self.end[2])
    }

    /// Radius scale.
    pub fn radius_scale(&self) -> f32 {
        self.start[3]
    }
}

/// Immutable impostor cylinder list with per-primitive picking groups.
#[derive(Debug, Clone, Default)]
pub struct Cylinders {
    instances: Vec<CylinderInstance>,
    groups: Vec<u32>,
    bounding_sphere: Sphere3D,
}

impl Cylinders {
    /// An empty list, reclaiming `previous`'s backing storage when given.
    pub fn empty(previous: Option<Cylinders>) -> Self {
        previous.map_or_else(Self::default, |mut c| {
            c.instances.clear();
            c.groups.clear();
            c.bounding_sphere = Sphere3D::ZERO;
            c
        })
    }

    /// Number of cylinders.
    pub fn cylinder_count(&self) -> usize {
        self.instances.len()
    }

    /// Instance records.
    pub fn instances(&self) -> &[CylinderInstance] {
        &self.instances
    }

    /// Instance buffer as bytes, for GPU upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Picking group tag per cylinder.
    pub fn groups(&self) -> &[u32] {
        &self.groups
    }

    /// Bounding sphere of the geometry.
    pub fn bounding_sphere(&self) -> Sphere3D {
        self.bounding_sphere
    }
}

/// Incremental impostor cylinder construction.
pub struct CylindersBuilder {
    instances: Vec<CylinderInstance>,
    groups: Vec<u32>,
}

impl CylindersBuilder {
    /// A builder with pre-reserved capacity.
    pub fn with_capacity(estimate: usize) -> Self {
        Self {
            instances: Vec::with_capacity(estimate),
            groups: Vec::with_capacity(estimate),
        }
    }

    /// Pick reuse or fresh allocation depending on `previous`.
    pub fn reuse_or_with_capacity(
        previous: Option<Cylinders>,
        estimate: usize,
    ) -> Self {
        previous.map_or_else(
            || Self::with_capacity(estimate),
            |mut c| {
                c.instances.clear();
                c.groups.clear();
                Self {
                    instances: c.instances,
                    groups: c.groups,
                }
            },
        )
    }

    /// Append one cylinder tagged `group`.
    pub fn add(
        &mut self,
        start: Vec3,
        end: Vec3,
        radius_scale: f32,
        top_cap: bool,
        bottom_cap: bool,
        group: u32,
    ) {
        let caps = u32::from(top_cap) | (u32::from(bottom_cap) << 1);
        self.instances.push(CylinderInstance {
            start: [start.x, start.y, start.z, radius_scale],
            end: [end.x, end.y, end.z, caps as f32],
        });
        self.groups.push(group);
    }

    /// Number of cylinders emitted so far.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Finish into an immutable list with the given bounding sphere.
    pub fn finish(self, bounding_sphere: Sphere3D) -> Cylinders {
        Cylinders {
            instances: self.instances,
            groups: self.groups,
            bounding_sphere,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_records_instance_and_group() {
        let mut builder = CylindersBuilder::with_capacity(2);
        builder.add(Vec3::ZERO, Vec3::X, 1.0, false, false, 4);
        builder.add(Vec3::X, Vec3::Y, 0.5, true, false, 5);
        let cylinders = builder.finish(Sphere3D::ZERO);

        assert_eq!(cylinders.cylinder_count(), 2);
        assert_eq!(cylinders.groups(), &[4, 5]);
        assert_eq!(cylinders.instances()[0].end_position(), Vec3::X);
        assert_eq!(cylinders.instances()[1].radius_scale(), 0.5);
        assert_eq!(cylinders.instances()[1].end[3], 1.0);
    }

    #[test]
    fn test_instance_bytes_length() {
        let mut builder = CylindersBuilder::with_capacity(1);
        builder.add(Vec3::ZERO, Vec3::X, 1.0, false, false, 0);
        let cylinders = builder.finish(Sphere3D::ZERO);
        assert_eq!(
            cylinders.instance_bytes().len(),
            size_of::<CylinderInstance>()
        );
    }
}
