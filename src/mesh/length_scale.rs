//! Per-vertex length-scale estimation.
//!
//! For every vertex the estimator accumulates the absolute volumes and the
//! solid angles of its incident cells, then converts the solid-angle-weighted
//! volume into the radius of the equivalent sphere:
//! `len_scale[v] = cbrt((vol · 4π / solid) / (4π/3))`.
//!
//! Solid angles come from interior dihedral angles: for the faces meeting at
//! a vertex, `Ω = Σ dihedrals − (k − 2)·π` with `k` faces. The face and
//! dihedral orderings per shape are fixed tables; normals are taken with a
//! consistent inward orientation so `safe_acos(−n_a·n_b)` is the interior
//! dihedral.

use std::f64::consts::PI;

use crate::error::{ExaMeshError, Result};
use crate::geometry::dot;
use crate::geometry::{pyr_volume, quad_unit_normal, safe_acos, tet_volume, tri_unit_normal};
use crate::mesh::{CellType, MeshBase};

struct Accumulator {
    vert_volume: Vec<f64>,
    vert_solid: Vec<f64>,
}

impl Accumulator {
    fn new(n_verts: usize) -> Self {
        Accumulator {
            vert_volume: vec![0.0; n_verts],
            vert_solid: vec![0.0; n_verts],
        }
    }

    /// Scatter one cell's volume and per-vertex solid angles. The absolute
    /// volume tolerates cells with reversed connectivity (which also leaves
    /// dihedrals unchanged, since both face normals flip); a zero volume or
    /// non-positive solid angle is a genuine degeneracy and is reported.
    fn add_cell(
        &mut self,
        cell_type: CellType,
        cell: u32,
        verts: &[u32],
        volume: f64,
        solids: &[f64],
    ) -> Result<()> {
        let volume = volume.abs();
        if volume == 0.0 || !volume.is_finite() {
            return Err(ExaMeshError::DegenerateGeometry {
                cell_type,
                cell,
                what: "zero cell volume",
            });
        }
        for (&v, &solid) in verts.iter().zip(solids.iter()) {
            if solid <= 0.0 || !solid.is_finite() {
                return Err(ExaMeshError::DegenerateGeometry {
                    cell_type,
                    cell,
                    what: "non-positive solid angle",
                });
            }
            self.vert_volume[v as usize] += volume;
            self.vert_solid[v as usize] += solid;
        }
        Ok(())
    }
}

fn dihedral(n_a: [f64; 3], n_b: [f64; 3]) -> f64 {
    safe_acos(-dot(n_a, n_b))
}

/// Compute the per-vertex length scales of a coarse mesh.
///
/// Every vertex must be touched by at least one volume cell; isolated
/// vertices and degenerate cells are reported as errors rather than
/// producing NaN scales downstream.
pub fn compute_length_scales<M: MeshBase>(mesh: &M) -> Result<Vec<f64>> {
    let n_verts = mesh.num_verts() as usize;
    let mut acc = Accumulator::new(n_verts);

    for tet in 0..mesh.num_tets() {
        let conn = *mesh.tet_conn(tet);
        let [a, b, c, d] = conn.map(|v| mesh.coords(v));
        let norm_abc = tri_unit_normal(a, b, c);
        let norm_adb = tri_unit_normal(a, d, b);
        let norm_bdc = tri_unit_normal(b, d, c);
        let norm_cda = tri_unit_normal(c, d, a);

        // Dihedrals in the order 01, 02, 03, 12, 13, 23.
        let diheds = [
            dihedral(norm_abc, norm_adb),
            dihedral(norm_abc, norm_cda),
            dihedral(norm_adb, norm_cda),
            dihedral(norm_abc, norm_bdc),
            dihedral(norm_adb, norm_bdc),
            dihedral(norm_bdc, norm_cda),
        ];
        let solids = [
            diheds[0] + diheds[1] + diheds[2] - PI,
            diheds[0] + diheds[3] + diheds[4] - PI,
            diheds[1] + diheds[3] + diheds[5] - PI,
            diheds[2] + diheds[4] + diheds[5] - PI,
        ];
        let volume = tet_volume(a, b, c, d);
        acc.add_cell(CellType::Tetrahedron, tet, &conn, volume, &solids)?;
    }

    for pyr in 0..mesh.num_pyramids() {
        let conn = *mesh.pyr_conn(pyr);
        let [p0, p1, p2, p3, p4] = conn.map(|v| mesh.coords(v));
        let norm_0123 = quad_unit_normal(p0, p1, p2, p3);
        let norm_014 = tri_unit_normal(p1, p0, p4);
        let norm_124 = tri_unit_normal(p2, p1, p4);
        let norm_234 = tri_unit_normal(p3, p2, p4);
        let norm_304 = tri_unit_normal(p0, p3, p4);

        // Dihedrals in the order 01, 04, 12, 14, 23, 24, 30, 34.
        let diheds = [
            dihedral(norm_0123, norm_014),
            dihedral(norm_014, norm_304),
            dihedral(norm_0123, norm_124),
            dihedral(norm_124, norm_014),
            dihedral(norm_0123, norm_234),
            dihedral(norm_234, norm_124),
            dihedral(norm_0123, norm_304),
            dihedral(norm_304, norm_234),
        ];
        // Four faces meet at the apex, so it loses 2π instead of π.
        let solids = [
            diheds[0] + diheds[1] + diheds[6] - PI,
            diheds[0] + diheds[2] + diheds[3] - PI,
            diheds[2] + diheds[4] + diheds[5] - PI,
            diheds[4] + diheds[6] + diheds[7] - PI,
            diheds[1] + diheds[3] + diheds[5] + diheds[7] - 2.0 * PI,
        ];
        let volume = pyr_volume(p0, p1, p2, p3, p4);
        acc.add_cell(CellType::Pyramid, pyr, &conn, volume, &solids)?;
    }

    for prism in 0..mesh.num_prisms() {
        let conn = *mesh.prism_conn(prism);
        let [p0, p1, p2, p3, p4, p5] = conn.map(|v| mesh.coords(v));
        let norm_1034 = quad_unit_normal(p1, p0, p3, p4);
        let norm_2145 = quad_unit_normal(p2, p1, p4, p5);
        let norm_0253 = quad_unit_normal(p0, p2, p5, p3);
        let norm_012 = tri_unit_normal(p0, p1, p2);
        let norm_543 = tri_unit_normal(p5, p4, p3);

        // Dihedrals in the order 01, 12, 20, 03, 14, 25, 34, 45, 53.
        let diheds = [
            dihedral(norm_1034, norm_012),
            dihedral(norm_2145, norm_012),
            dihedral(norm_0253, norm_012),
            dihedral(norm_0253, norm_1034),
            dihedral(norm_1034, norm_2145),
            dihedral(norm_2145, norm_0253),
            dihedral(norm_1034, norm_543),
            dihedral(norm_2145, norm_543),
            dihedral(norm_0253, norm_543),
        ];
        let solids = [
            diheds[0] + diheds[2] + diheds[3] - PI,
            diheds[0] + diheds[1] + diheds[4] - PI,
            diheds[1] + diheds[2] + diheds[5] - PI,
            diheds[6] + diheds[8] + diheds[3] - PI,
            diheds[6] + diheds[7] + diheds[4] - PI,
            diheds[7] + diheds[8] + diheds[5] - PI,
        ];
        let middle = centroid(&[p0, p1, p2, p3, p4, p5]);
        let volume = tet_volume(p0, p1, p2, middle)
            + tet_volume(p5, p4, p3, middle)
            + pyr_volume(p1, p0, p3, p4, middle)
            + pyr_volume(p2, p1, p4, p5, middle)
            + pyr_volume(p0, p2, p5, p3, middle);
        acc.add_cell(CellType::Prism, prism, &conn, volume.abs(), &solids)?;
    }

    for hex in 0..mesh.num_hexes() {
        let conn = *mesh.hex_conn(hex);
        let [p0, p1, p2, p3, p4, p5, p6, p7] = conn.map(|v| mesh.coords(v));
        let norm_1045 = quad_unit_normal(p1, p0, p4, p5);
        let norm_2156 = quad_unit_normal(p2, p1, p5, p6);
        let norm_3267 = quad_unit_normal(p3, p2, p6, p7);
        let norm_0374 = quad_unit_normal(p0, p3, p7, p4);
        let norm_0123 = quad_unit_normal(p0, p1, p2, p3);
        let norm_7654 = quad_unit_normal(p7, p6, p5, p4);

        // Dihedrals in the order 01, 12, 23, 30, 04, 15, 26, 37, 45, 56, 67, 74.
        let diheds = [
            dihedral(norm_1045, norm_0123),
            dihedral(norm_2156, norm_0123),
            dihedral(norm_3267, norm_0123),
            dihedral(norm_0374, norm_0123),
            dihedral(norm_1045, norm_0374),
            dihedral(norm_2156, norm_1045),
            dihedral(norm_3267, norm_2156),
            dihedral(norm_0374, norm_3267),
            dihedral(norm_1045, norm_7654),
            dihedral(norm_2156, norm_7654),
            dihedral(norm_3267, norm_7654),
            dihedral(norm_0374, norm_7654),
        ];
        let solids = [
            diheds[3] + diheds[0] + diheds[4] - PI,
            diheds[0] + diheds[1] + diheds[5] - PI,
            diheds[1] + diheds[2] + diheds[6] - PI,
            diheds[2] + diheds[3] + diheds[7] - PI,
            diheds[11] + diheds[8] + diheds[4] - PI,
            diheds[8] + diheds[9] + diheds[5] - PI,
            diheds[9] + diheds[10] + diheds[6] - PI,
            diheds[10] + diheds[11] + diheds[7] - PI,
        ];
        let middle = centroid(&[p0, p1, p2, p3, p4, p5, p6, p7]);
        let volume = pyr_volume(p1, p0, p4, p5, middle)
            + pyr_volume(p2, p1, p5, p6, middle)
            + pyr_volume(p3, p2, p6, p7, middle)
            + pyr_volume(p0, p3, p7, p4, middle)
            + pyr_volume(p0, p1, p2, p3, middle)
            + pyr_volume(p7, p6, p5, p4, middle);
        acc.add_cell(CellType::Hexahedron, hex, &conn, volume.abs(), &solids)?;
    }

    let mut scales = Vec::with_capacity(n_verts);
    for vv in 0..n_verts {
        let (vol, solid) = (acc.vert_volume[vv], acc.vert_solid[vv]);
        if vol <= 0.0 || solid <= 0.0 {
            return Err(ExaMeshError::InvalidMesh(format!(
                "vertex {vv} has no incident volume cells"
            )));
        }
        let volume = vol * (4.0 * PI) / solid;
        scales.push((volume / (4.0 * PI / 3.0)).cbrt());
    }
    Ok(scales)
}

fn centroid(pts: &[[f64; 3]]) -> [f64; 3] {
    let inv = 1.0 / pts.len() as f64;
    let mut out = [0.0; 3];
    for p in pts {
        out[0] += p[0] * inv;
        out[1] += p[1] * inv;
        out[2] += p[2] * inv;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::UMesh;

    fn unit_cube() -> UMesh {
        let mut mesh = UMesh::new();
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..2 {
                    mesh.add_vert([i as f64, j as f64, k as f64]);
                }
            }
        }
        // Vertex order above is x-fastest; hex connectivity wants the
        // bottom face counter-clockwise then the top face.
        mesh.add_hex([0, 1, 3, 2, 4, 5, 7, 6]);
        mesh
    }

    #[test]
    fn cube_corner_scales_are_uniform() {
        let mesh = unit_cube();
        let scales = compute_length_scales(&mesh).unwrap();
        assert_eq!(scales.len(), 8);
        // Every corner sees volume 1 over solid angle π/2.
        let expected = (1.0 * 4.0 * PI / (PI / 2.0) / (4.0 * PI / 3.0)).cbrt();
        for s in scales {
            assert!((s - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn tet_scales_positive_and_finite() {
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 0.0, 0.0]);
        mesh.add_vert([0.0, 1.0, 0.0]);
        mesh.add_vert([0.0, 0.0, 1.0]);
        mesh.add_tet([0, 1, 2, 3]);
        let scales = compute_length_scales(&mesh).unwrap();
        for s in scales {
            assert!(s.is_finite() && s > 0.0);
        }
    }

    #[test]
    fn pyramid_and_prism_tables_give_positive_scales() {
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 1.0, 0.0]);
        mesh.add_vert([0.0, 1.0, 0.0]);
        mesh.add_vert([0.5, 0.5, 1.0]);
        mesh.add_pyr([0, 1, 2, 3, 4]);
        let scales = compute_length_scales(&mesh).unwrap();
        assert!(scales.iter().all(|s| s.is_finite() && *s > 0.0));

        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 0.0, 0.0]);
        mesh.add_vert([0.0, 1.0, 0.0]);
        mesh.add_vert([0.0, 0.0, 2.0]);
        mesh.add_vert([1.0, 0.0, 2.0]);
        mesh.add_vert([0.0, 1.0, 2.0]);
        mesh.add_prism([0, 1, 2, 3, 4, 5]);
        let scales = compute_length_scales(&mesh).unwrap();
        assert!(scales.iter().all(|s| s.is_finite() && *s > 0.0));
    }

    #[test]
    fn reversed_connectivity_is_tolerated() {
        // Swap two base corners so the tet volume comes out negative; the
        // absolute value keeps the accumulation usable.
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 0.0, 0.0]);
        mesh.add_vert([0.0, 1.0, 0.0]);
        mesh.add_vert([0.0, 0.0, 1.0]);
        mesh.add_tet([0, 2, 1, 3]);
        let scales = compute_length_scales(&mesh).unwrap();
        assert!(scales.iter().all(|s| s.is_finite() && *s > 0.0));
    }

    #[test]
    fn isolated_vertex_is_an_error() {
        let mut mesh = unit_cube();
        mesh.add_vert([10.0, 10.0, 10.0]);
        assert!(compute_length_scales(&mesh).is_err());
    }

    #[test]
    fn flat_tet_is_degenerate() {
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 0.0, 0.0]);
        mesh.add_vert([0.0, 1.0, 0.0]);
        mesh.add_vert([1.0, 1.0, 0.0]);
        mesh.add_tet([0, 1, 2, 3]);
        assert!(matches!(
            compute_length_scales(&mesh),
            Err(ExaMeshError::DegenerateGeometry { .. })
        ));
    }
}
