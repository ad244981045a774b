//! Shared tessellation primitives.
//!
//! The icosphere is generated once per detail level and cached; builders
//! copy out of the cache while translating/scaling.

use std::collections::HashMap;
use std::sync::OnceLock;

use glam::Vec3;

/// Highest supported sphere subdivision level.
pub const MAX_SPHERE_DETAIL: u32 = 3;

/// A unit sphere mesh; for a unit sphere the normal equals the position.
#[derive(Debug, Clone)]
pub struct UnitSphere {
    /// Unit-length vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

/// Vertices an icosphere of the given detail level contains.
///
/// Detail is clamped to [`MAX_SPHERE_DETAIL`]. Levels 0-3 give 12, 42, 162,
/// and 642 vertices.
pub fn sphere_vertex_count(detail: u32) -> usize {
    let d = detail.min(MAX_SPHERE_DETAIL);
    10 * 4usize.pow(d) + 2
}

/// The cached unit icosphere for a detail level (clamped to
/// [`MAX_SPHERE_DETAIL`]).
pub fn unit_sphere(detail: u32) -> &'static UnitSphere {
    static CACHE: OnceLock<Vec<UnitSphere>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| {
        (0..=MAX_SPHERE_DETAIL).map(generate_icosphere).collect()
    });
    &cache[detail.min(MAX_SPHERE_DETAIL) as usize]
}

fn generate_icosphere(subdivisions: u32) -> UnitSphere {
    // Golden ratio for icosahedron vertices
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let inv_len = 1.0 / (1.0 + phi * phi).sqrt();

    // 12 vertices of icosahedron (normalized to unit sphere)
    let mut positions: Vec<Vec3> = vec![
        Vec3::new(-1.0, phi, 0.0) * inv_len,
        Vec3::new(1.0, phi, 0.0) * inv_len,
        Vec3::new(-1.0, -phi, 0.0) * inv_len,
        Vec3::new(1.0, -phi, 0.0) * inv_len,
        Vec3::new(0.0, -1.0, phi) * inv_len,
        Vec3::new(0.0, 1.0, phi) * inv_len,
        Vec3::new(0.0, -1.0, -phi) * inv_len,
        Vec3::new(0.0, 1.0, -phi) * inv_len,
        Vec3::new(phi, 0.0, -1.0) * inv_len,
        Vec3::new(phi, 0.0, 1.0) * inv_len,
        Vec3::new(-phi, 0.0, -1.0) * inv_len,
        Vec3::new(-phi, 0.0, 1.0) * inv_len,
    ];

    // 20 triangles of icosahedron (CCW winding for outward-facing normals)
    #[rustfmt::skip]
    let mut indices: Vec<u32> = vec![
        0, 5, 11,   0, 1, 5,    0, 7, 1,    0, 10, 7,   0, 11, 10,
        1, 9, 5,    5, 4, 11,   11, 2, 10,  10, 6, 7,   7, 8, 1,
        3, 4, 9,    3, 2, 4,    3, 6, 2,    3, 8, 6,    3, 9, 8,
        4, 5, 9,    2, 11, 4,   6, 10, 2,   8, 7, 6,    9, 1, 8,
    ];

    let mut midpoint_cache: HashMap<(u32, u32), u32> = HashMap::new();

    for _ in 0..subdivisions {
        let mut new_indices = Vec::with_capacity(indices.len() * 4);

        for tri in indices.chunks(3) {
            let v0 = tri[0];
            let v1 = tri[1];
            let v2 = tri[2];

            let a = get_midpoint(&mut positions, &mut midpoint_cache, v0, v1);
            let b = get_midpoint(&mut positions, &mut midpoint_cache, v1, v2);
            let c = get_midpoint(&mut positions, &mut midpoint_cache, v2, v0);

            new_indices.extend_from_slice(&[v0, a, c]);
            new_indices.extend_from_slice(&[v1, b, a]);
            new_indices.extend_from_slice(&[v2, c, b]);
            new_indices.extend_from_slice(&[a, b, c]);
        }

        indices = new_indices;
    }

    UnitSphere { positions, indices }
}

fn get_midpoint(
    positions: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    v0: u32,
    v1: u32,
) -> u32 {
    // Consistent ordering for the cache key
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let p0 = positions[v0 as usize];
    let p1 = positions[v1 as usize];
    let mid = ((p0 + p1) * 0.5).normalize();

    let idx = positions.len() as u32;
    positions.push(mid);
    cache.insert(key, idx);
    idx
}

/// Any unit vector perpendicular to `v` (arbitrary but deterministic).
pub(crate) fn find_perpendicular(v: Vec3) -> Vec3 {
    if v.length_squared() < 1e-8 {
        return Vec3::X;
    }
    let candidate = if v.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    v.cross(candidate).normalize()
}
