//! Shared mesh builders for the integration tests.
#![allow(dead_code)]

use examesh::prelude::*;

/// The reference unit tetrahedron with its four boundary faces.
pub fn unit_tet() -> UMesh {
    let mut mesh = UMesh::new();
    mesh.add_vert([0.0, 0.0, 0.0]);
    mesh.add_vert([1.0, 0.0, 0.0]);
    mesh.add_vert([0.0, 1.0, 0.0]);
    mesh.add_vert([0.0, 0.0, 1.0]);
    mesh.add_tet([0, 1, 2, 3]);
    mesh.add_bdry_tri([0, 1, 2]);
    mesh.add_bdry_tri([0, 3, 1]);
    mesh.add_bdry_tri([1, 3, 2]);
    mesh.add_bdry_tri([2, 3, 0]);
    mesh
}

/// Two tets sharing the face (1, 2, 3).
pub fn two_tets() -> UMesh {
    let mut mesh = UMesh::new();
    mesh.add_vert([0.0, 0.0, 0.0]);
    mesh.add_vert([1.0, 0.0, 0.0]);
    mesh.add_vert([0.0, 1.0, 0.0]);
    mesh.add_vert([0.0, 0.0, 1.0]);
    mesh.add_vert([1.0, 1.0, 1.0]);
    mesh.add_tet([0, 1, 2, 3]);
    // Same face (1, 2, 3), opposite orientation as seen from vertex 4.
    mesh.add_tet([1, 2, 3, 4]);
    mesh
}

/// An axis-aligned box [0,sx]×[0,sy]×[0,sz] meshed as nx×ny×nz hexes.
pub fn hex_grid(nx: u32, ny: u32, nz: u32, scale: [f64; 3]) -> UMesh {
    let mut mesh = UMesh::new();
    let vert = |i: u32, j: u32, k: u32| (k * (ny + 1) + j) * (nx + 1) + i;
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                mesh.add_vert([
                    i as f64 * scale[0] / nx as f64,
                    j as f64 * scale[1] / ny as f64,
                    k as f64 * scale[2] / nz as f64,
                ]);
            }
        }
    }
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                mesh.add_hex([
                    vert(i, j, k),
                    vert(i + 1, j, k),
                    vert(i + 1, j + 1, k),
                    vert(i, j + 1, k),
                    vert(i, j, k + 1),
                    vert(i + 1, j, k + 1),
                    vert(i + 1, j + 1, k + 1),
                    vert(i, j + 1, k + 1),
                ]);
            }
        }
    }
    mesh
}

/// The unit-square-based pyramid with apex at (0.5, 0.5, 1).
pub fn unit_pyramid() -> UMesh {
    let mut mesh = UMesh::new();
    mesh.add_vert([0.0, 0.0, 0.0]);
    mesh.add_vert([1.0, 0.0, 0.0]);
    mesh.add_vert([1.0, 1.0, 0.0]);
    mesh.add_vert([0.0, 1.0, 0.0]);
    mesh.add_vert([0.5, 0.5, 1.0]);
    mesh.add_pyr([0, 1, 2, 3, 4]);
    mesh
}

/// The unit right prism over the reference triangle.
pub fn unit_prism() -> UMesh {
    let mut mesh = UMesh::new();
    mesh.add_vert([0.0, 0.0, 0.0]);
    mesh.add_vert([1.0, 0.0, 0.0]);
    mesh.add_vert([0.0, 1.0, 0.0]);
    mesh.add_vert([0.0, 0.0, 1.0]);
    mesh.add_vert([1.0, 0.0, 1.0]);
    mesh.add_vert([0.0, 1.0, 1.0]);
    mesh.add_prism([0, 1, 2, 3, 4, 5]);
    mesh
}

/// Total signed volume of every cell in the mesh, summed per shape with
/// the same decompositions the refiner guarantees positive.
pub fn total_volume(mesh: &UMesh) -> f64 {
    use examesh::geometry::{pyr_volume, tet_volume};
    let mut total = 0.0;
    for t in 0..mesh.num_tets() {
        let c = *mesh.tet_conn(t);
        let [a, b, cc, d] = c.map(|v| mesh.coords(v));
        total += tet_volume(a, b, cc, d);
    }
    for p in 0..mesh.num_pyramids() {
        let c = *mesh.pyr_conn(p);
        let [a, b, cc, d, e] = c.map(|v| mesh.coords(v));
        total += pyr_volume(a, b, cc, d, e);
    }
    for p in 0..mesh.num_prisms() {
        let c = *mesh.prism_conn(p);
        let [p0, p1, p2, p3, p4, p5] = c.map(|v| mesh.coords(v));
        // Split into three tets.
        total += tet_volume(p0, p1, p2, p3)
            + tet_volume(p1, p4, p2, p3)
            + tet_volume(p2, p4, p5, p3);
    }
    for h in 0..mesh.num_hexes() {
        let c = *mesh.hex_conn(h);
        let [p0, p1, p2, p3, p4, p5, p6, p7] = c.map(|v| mesh.coords(v));
        total += tet_volume(p0, p1, p3, p4)
            + tet_volume(p1, p2, p3, p6)
            + tet_volume(p1, p3, p4, p6)
            + tet_volume(p1, p4, p5, p6)
            + tet_volume(p3, p4, p6, p7);
    }
    total
}
