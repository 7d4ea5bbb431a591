//! Sharing of edge and face interior vertices between sibling cells.

mod util;

use examesh::refine::{refine_mesh_with_tables, Edge, MappingType};
use examesh::prelude::*;
use util::*;

#[test]
fn two_tets_share_the_common_face_without_duplicates() {
    let coarse = two_tets();
    let n = 4;
    let fine = refine_mesh(&coarse, n, MappingType::Lagrange).unwrap();
    // Each tet lattice has 35 points at N=4; the shared face holds
    // 3 corners + 3·3 edge interiors + 3 face interiors = 15 of them.
    assert_eq!(fine.num_verts(), 35 + 35 - 15);
    assert_eq!(fine.num_tets(), 2 * n * n * n);

    // No two vertices may coincide.
    let mut coords: Vec<[i64; 3]> = (0..fine.num_verts())
        .map(|v| fine.coords(v).map(|x| (x * 1e12).round() as i64))
        .collect();
    coords.sort_unstable();
    coords.dedup();
    assert_eq!(coords.len(), fine.num_verts() as usize);
}

#[test]
fn edge_interiors_reverse_with_traversal_direction() {
    let coarse = two_tets();
    let n = 4;
    let (_fine, tables) =
        refine_mesh_with_tables(&coarse, n, MappingType::Lagrange).unwrap();
    for (a, b) in [(1u32, 2u32), (1, 3), (2, 3)] {
        let key = Edge::new(a, b);
        let edge = tables.edge(&key).expect("shared edge must be registered");
        for k in 1..n {
            assert_eq!(
                edge.interior(&key, a, k),
                edge.interior(&key, b, n - k),
                "edge ({a}, {b}) position {k}"
            );
        }
    }
}

#[test]
fn shared_tri_face_is_indexable_from_both_orientations() {
    let coarse = two_tets();
    let n = 4;
    let (fine, tables) = refine_mesh_with_tables(&coarse, n, MappingType::Lagrange).unwrap();
    let record = tables.tri_face([1, 2, 3]).expect("shared face registered");
    assert_eq!(record.use_count, 2);

    // The same interior set must come back through any corner ordering.
    let mut from_a = Vec::new();
    let mut from_b = Vec::new();
    for i in 1..n {
        for j in 1..n - i {
            from_a.push(record.interior(n, &[1, 2, 3], i, j));
            from_b.push(record.interior(n, &[3, 1, 2], i, j));
        }
    }
    from_a.sort_unstable();
    from_b.sort_unstable();
    assert_eq!(from_a, from_b);

    // And the interior vertices sit on the face plane x + y + z = 1.
    for &v in &from_a {
        let [x, y, z] = fine.coords(v);
        assert!((x + y + z - 1.0).abs() < 1e-12);
    }
}

#[test]
fn two_hexes_share_their_quad_face() {
    let coarse = hex_grid(2, 1, 1, [2.0, 1.0, 1.0]);
    let n = 3;
    let fine = refine_mesh(&coarse, n, MappingType::Lagrange).unwrap();
    // Two 4×4×4 lattices minus the shared 4×4 face.
    assert_eq!(fine.num_verts(), 64 + 64 - 16);
    assert_eq!(fine.num_hexes(), 2 * 27);

    let mut coords: Vec<[i64; 3]> = (0..fine.num_verts())
        .map(|v| fine.coords(v).map(|x| (x * 1e12).round() as i64))
        .collect();
    coords.sort_unstable();
    coords.dedup();
    assert_eq!(coords.len(), fine.num_verts() as usize);
}

#[test]
fn mixed_pyramid_on_hex_shares_the_quad_face() {
    // A hex with a pyramid sitting on its top face.
    let mut coarse = hex_grid(1, 1, 1, [1.0, 1.0, 1.0]);
    let apex = coarse.add_vert([0.5, 0.5, 1.75]);
    // Top face of the hex is (4, 5, 6, 7).
    coarse.add_pyr([4, 5, 6, 7, apex]);

    let n = 3;
    let fine = refine_mesh(&coarse, n, MappingType::Lagrange).unwrap();
    // Hex lattice 64 + pyramid lattice 30 − shared quad 16.
    assert_eq!(fine.num_verts(), 64 + 30 - 16);

    let mut coords: Vec<[i64; 3]> = (0..fine.num_verts())
        .map(|v| fine.coords(v).map(|x| (x * 1e12).round() as i64))
        .collect();
    coords.sort_unstable();
    coords.dedup();
    assert_eq!(coords.len(), fine.num_verts() as usize);

    assert!((total_volume(&fine) - (1.0 + 0.25)).abs() < 1e-12);
}
