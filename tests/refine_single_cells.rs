//! Refinement of single cells of each shape: vertex and cell counts,
//! volume preservation, and map consistency.

mod util;

use examesh::prelude::*;
use util::*;

#[test]
fn tet_n2_has_ten_verts_and_eight_subtets() {
    let fine = refine_mesh(&unit_tet(), 2, MappingType::Lagrange).unwrap();
    assert_eq!(fine.num_verts(), 10);
    assert_eq!(fine.num_tets(), 8);
    assert!((total_volume(&fine) - 1.0 / 6.0).abs() < 1e-12);
}

#[test]
fn tet_subtet_volumes_are_positive_for_many_factors() {
    use examesh::geometry::tet_volume;
    for n in 1..=6u32 {
        let fine = refine_mesh(&unit_tet(), n, MappingType::Lagrange).unwrap();
        assert_eq!(fine.num_tets(), n * n * n);
        for t in 0..fine.num_tets() {
            let c = *fine.tet_conn(t);
            let [a, b, cc, d] = c.map(|v| fine.coords(v));
            assert!(
                tet_volume(a, b, cc, d) > 0.0,
                "negative sub-tet at n = {n}, cell {t}"
            );
        }
        assert!((total_volume(&fine) - 1.0 / 6.0).abs() < 1e-12, "n = {n}");
    }
}

#[test]
fn hex_n3_counts_and_exact_bottom_face() {
    let coarse = hex_grid(1, 1, 1, [1.0, 1.0, 1.0]);
    let fine = refine_mesh(&coarse, 3, MappingType::Lagrange).unwrap();
    assert_eq!(fine.num_verts(), 64);
    assert_eq!(fine.num_hexes(), 27);
    assert!((total_volume(&fine) - 1.0).abs() < 1e-12);

    // Any fine vertex near the bottom must be exactly on it.
    let mut on_bottom = 0;
    for v in 0..fine.num_verts() {
        let z = fine.coords(v)[2];
        if z.abs() < 0.1 {
            assert_eq!(z, 0.0, "vertex {v} drifted off the z = 0 face");
            on_bottom += 1;
        }
    }
    assert_eq!(on_bottom, 16);
}

#[test]
fn pyramid_n2_mixed_decomposition() {
    let fine = refine_mesh(&unit_pyramid(), 2, MappingType::Lagrange).unwrap();
    // Five upward and one inverted pyramid plus four gap tets fill
    // 2³ = 8 pyramid-volume units.
    assert_eq!(fine.num_pyramids(), 6);
    assert_eq!(fine.num_tets(), 4);
    assert_eq!(fine.num_verts(), 14);
    assert!((total_volume(&fine) - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn pyramid_counts_track_the_lattice_for_larger_factors() {
    for n in [3u32, 4, 5] {
        let fine = refine_mesh(&unit_pyramid(), n, MappingType::Lagrange).unwrap();
        let n64 = n as u64;
        let expect_pyrs =
            n64 * (n64 + 1) * (2 * n64 + 1) / 6 + (n64 - 1) * n64 * (2 * n64 - 1) / 6;
        let expect_tets = 2 * n64 * (n64 + 1) * (n64 - 1) / 3;
        assert_eq!(fine.num_pyramids() as u64, expect_pyrs, "n = {n}");
        assert_eq!(fine.num_tets() as u64, expect_tets, "n = {n}");
        assert!((total_volume(&fine) - 1.0 / 3.0).abs() < 1e-12, "n = {n}");
    }
}

#[test]
fn prism_n2_counts_and_volume() {
    let fine = refine_mesh(&unit_prism(), 2, MappingType::Lagrange).unwrap();
    assert_eq!(fine.num_prisms(), 8);
    assert_eq!(fine.num_verts(), 18);
    assert!((total_volume(&fine) - 0.5).abs() < 1e-12);
}

#[test]
fn prism_cell_count_is_cubic() {
    for n in [3u32, 4] {
        let fine = refine_mesh(&unit_prism(), n, MappingType::Lagrange).unwrap();
        assert_eq!(fine.num_prisms(), n * n * n, "n = {n}");
        assert!((total_volume(&fine) - 0.5).abs() < 1e-12, "n = {n}");
    }
}

#[test]
fn length_scale_map_with_unit_scales_matches_lagrange() {
    let mut coarse = hex_grid(1, 1, 1, [1.0, 1.0, 1.0]);
    coarse.set_length_scales(vec![1.0; 8]).unwrap();
    let with_scales = refine_mesh(&coarse, 2, MappingType::LengthScale).unwrap();
    let lagrange = refine_mesh(&coarse, 2, MappingType::Lagrange).unwrap();
    assert_eq!(with_scales.num_verts(), lagrange.num_verts());
    for v in 0..with_scales.num_verts() {
        let a = with_scales.coords(v);
        let b = lagrange.coords(v);
        for d in 0..3 {
            assert!(
                (a[d] - b[d]).abs() < 1e-12,
                "vertex {v} differs between maps"
            );
        }
    }
}

#[test]
fn graded_refinement_shifts_vertices_but_keeps_volume() {
    let mut coarse = hex_grid(1, 1, 1, [1.0, 1.0, 1.0]);
    // Tight spacing near the bottom face.
    coarse
        .set_length_scales(vec![0.3, 0.3, 0.3, 0.3, 1.5, 1.5, 1.5, 1.5])
        .unwrap();
    let fine = refine_mesh(&coarse, 4, MappingType::LengthScale).unwrap();
    assert!((total_volume(&fine) - 1.0).abs() < 1e-10);
    // The first interior grid plane must sit below z = 1/4.
    let mut min_interior_z = f64::INFINITY;
    for v in 0..fine.num_verts() {
        let z = fine.coords(v)[2];
        if z > 1e-12 && z < min_interior_z {
            min_interior_z = z;
        }
    }
    assert!(
        min_interior_z < 0.25 - 1e-6,
        "expected grading toward z = 0, first plane at {min_interior_z}"
    );
}

#[test]
fn refinement_is_deterministic() {
    let coarse = two_tets();
    let a = refine_mesh(&coarse, 3, MappingType::Lagrange).unwrap();
    let b = refine_mesh(&coarse, 3, MappingType::Lagrange).unwrap();
    assert_eq!(a.num_verts(), b.num_verts());
    for v in 0..a.num_verts() {
        assert_eq!(a.coords(v), b.coords(v));
    }
    assert_eq!(a.num_tets(), b.num_tets());
    for t in 0..a.num_tets() {
        assert_eq!(a.tet_conn(t), b.tet_conn(t));
    }
}

#[test]
fn oversized_factor_is_rejected() {
    let err = refine_mesh(&unit_tet(), 51, MappingType::Lagrange).unwrap_err();
    assert!(matches!(err, ExaMeshError::BadSubdivision(51)));
}
