//! Wavefront OBJ export.
//!
//! Meshes are written directly; impostor geometry is converted to a mesh
//! through the shared builders first, since OBJ has no impostor concept.
//! Format reference: the OBJ notes at paulbourke.net/dataformats/obj/.

use std::fmt::Write as _;

use crate::geometry::cylinders::Cylinders;
use crate::geometry::mesh::{CylinderProps, Mesh, MeshBuilder};
use crate::geometry::sphere3d::Sphere3D;
use crate::geometry::spheres::Spheres;

/// Accumulates geometry into a single OBJ document.
///
/// Each added geometry becomes one `o` object; vertex indices are 1-based
/// and shared across the whole document, so objects can be appended in any
/// order.
#[derive(Debug, Default)]
pub struct ObjExporter {
    out: String,
    vertex_offset: u32,
}

impl ObjExporter {
    /// An empty exporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mesh as one OBJ object.
    pub fn add_mesh(&mut self, name: &str, mesh: &Mesh) {
        let _ = writeln!(self.out, "o {name}");
        for p in mesh.positions().chunks(3) {
            let _ = writeln!(self.out, "v {} {} {}", p[0], p[1], p[2]);
        }
        for n in mesh.normals().chunks(3) {
            let _ = writeln!(self.out, "vn {} {} {}", n[0], n[1], n[2]);
        }
        for tri in mesh.indices().chunks(3) {
            let a = tri[0] + self.vertex_offset + 1;
            let b = tri[1] + self.vertex_offset + 1;
            let c = tri[2] + self.vertex_offset + 1;
            let _ =
                writeln!(self.out, "f {a}//{a} {b}//{b} {c}//{c}");
        }
        self.vertex_offset += mesh.vertex_count() as u32;
    }

    /// Append impostor spheres as one tessellated OBJ object.
    ///
    /// Impostor instances carry no radius (it is applied in the backend's
    /// vertex stage), so the caller supplies one.
    pub fn add_spheres(
        &mut self,
        name: &str,
        spheres: &Spheres,
        radius: f32,
        detail: u32,
    ) {
        let mut builder =
            MeshBuilder::with_capacity(spheres.sphere_count() * 12, 0);
        for (instance, &group) in
            spheres.instances().iter().zip(spheres.groups())
        {
            builder.add_sphere(instance.position(), radius, detail, group);
        }
        self.add_mesh(name, &builder.finish(Sphere3D::ZERO));
    }

    /// Append impostor cylinders as one tessellated OBJ object.
    ///
    /// The per-instance radius scale is multiplied by `radius`.
    pub fn add_cylinders(
        &mut self,
        name: &str,
        cylinders: &Cylinders,
        radius: f32,
        radial_segments: u32,
    ) {
        let mut builder = MeshBuilder::with_capacity(
            cylinders.cylinder_count() * radial_segments as usize * 2,
            0,
        );
        let mut props = CylinderProps {
            radius_top: radius,
            radius_bottom: radius,
            radial_segments,
        };
        for (instance, &group) in
            cylinders.instances().iter().zip(cylinders.groups())
        {
            let r = radius * instance.radius_scale();
            props.radius_top = r;
            props.radius_bottom = r;
            builder.add_cylinder(
                instance.start_position(),
                instance.end_position(),
                1.0,
                &props,
                group,
            );
        }
        self.add_mesh(name, &builder.finish(Sphere3D::ZERO));
    }

    /// The assembled OBJ document.
    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::cylinders::CylindersBuilder;
    use crate::geometry::primitive::sphere_vertex_count;
    use crate::geometry::spheres::SpheresBuilder;

    fn count_records(obj: &str, prefix: &str) -> usize {
        obj.lines()
            .filter(|l| {
                l.starts_with(prefix)
                    && l[prefix.len()..].starts_with(' ')
            })
            .count()
    }

    fn one_sphere_mesh(detail: u32) -> Mesh {
        let mut builder = MeshBuilder::with_capacity(0, 0);
        builder.add_sphere(Vec3::ZERO, 1.0, detail, 0);
        builder.finish(Sphere3D::ZERO)
    }

    #[test]
    fn test_mesh_record_counts() {
        let mesh = one_sphere_mesh(0);
        let mut exporter = ObjExporter::new();
        exporter.add_mesh("backbone", &mesh);
        let obj = exporter.finish();

        assert!(obj.starts_with("o backbone\n"));
        assert_eq!(count_records(&obj, "v"), mesh.vertex_count());
        assert_eq!(count_records(&obj, "vn"), mesh.vertex_count());
        assert_eq!(count_records(&obj, "f"), mesh.triangle_count());
    }

    #[test]
    fn test_face_indices_are_one_based_and_offset() {
        let mesh = one_sphere_mesh(0);
        let mut exporter = ObjExporter::new();
        exporter.add_mesh("a", &mesh);
        exporter.add_mesh("b", &mesh);
        let obj = exporter.finish();

        let face_indices: Vec<u32> = obj
            .lines()
            .filter(|l| l.starts_with("f "))
            .flat_map(|l| {
                l.split_whitespace().skip(1).map(|t| {
                    t.split("//").next().unwrap().parse::<u32>().unwrap()
                })
            })
            .collect();
        let min = *face_indices.iter().min().unwrap();
        let max = *face_indices.iter().max().unwrap();
        assert_eq!(min, 1);
        assert_eq!(max, (mesh.vertex_count() * 2) as u32);
    }

    #[test]
    fn test_sphere_conversion_tessellates() {
        let mut builder = SpheresBuilder::with_capacity(2);
        builder.add(Vec3::ZERO, 0);
        builder.add(Vec3::X, 1);
        let spheres = builder.finish(Sphere3D::ZERO);

        let mut exporter = ObjExporter::new();
        exporter.add_spheres("traces", &spheres, 0.5, 1);
        let obj = exporter.finish();
        assert_eq!(count_records(&obj, "v"), 2 * sphere_vertex_count(1));
    }

    #[test]
    fn test_cylinder_conversion_tessellates() {
        let mut builder = CylindersBuilder::with_capacity(1);
        builder.add(Vec3::ZERO, Vec3::X, 1.0, false, false, 0);
        let cylinders = builder.finish(Sphere3D::ZERO);

        let mut exporter = ObjExporter::new();
        exporter.add_cylinders("bonds", &cylinders, 0.3, 8);
        let obj = exporter.finish();
        assert_eq!(count_records(&obj, "v"), 16);
        assert_eq!(count_records(&obj, "f"), 16);
    }
}
