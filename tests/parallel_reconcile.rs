//! Partitioned refinement end to end: sub-mesh files, reconciliation of
//! partition-boundary vertices, and run-to-run determinism.

mod util;

use std::collections::BTreeSet;
use std::path::PathBuf;

use examesh::prelude::*;
use util::*;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("examesh-test-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(n_divs: u32, max_cells: u64, dir: PathBuf) -> RefineConfig {
    RefineConfig {
        n_divs,
        max_cells_per_part: max_cells,
        mapping: MappingType::Lagrange,
        epsilon: 1e-10,
        output_dir: dir,
        format: OutputFormat::Vtk,
    }
}

/// S6: a unit cube meshed as two hexes split at x = 0.5 and refined with
/// two ranks must reconcile exactly the 9 vertices of the internal face.
#[test]
fn two_rank_cube_reconciles_the_internal_face() {
    let dir = temp_dir("two-rank");
    let coarse = hex_grid(2, 1, 1, [1.0, 1.0, 1.0]);

    std::thread::scope(|scope| {
        for rank in 0..2usize {
            let coarse = &coarse;
            let dir = dir.clone();
            scope.spawn(move || {
                let comm = RayonComm::new(rank, 2);
                let cfg = config(2, 8, dir);
                refine_with_comm(coarse, &cfg, &comm).unwrap();
            });
        }
    });

    for rank in 0..2 {
        let listing = dir.join(format!("identical-verts-submesh{rank:03}.txt"));
        let text = std::fs::read_to_string(&listing).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // 9 duplicate groups of two records each.
        assert_eq!(lines.len(), 18, "rank {rank} listing:\n{text}");

        let mut distinct: BTreeSet<(i64, i64, i64)> = BTreeSet::new();
        for line in &lines {
            let cols: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(cols.len(), 5);
            let x: f64 = cols[2].parse().unwrap();
            let y: f64 = cols[3].parse().unwrap();
            let z: f64 = cols[4].parse().unwrap();
            assert!(
                (x - 0.5).abs() < 1e-12,
                "duplicate off the internal face: {line}"
            );
            distinct.insert((
                (x * 1e9).round() as i64,
                (y * 1e9).round() as i64,
                (z * 1e9).round() as i64,
            ));
        }
        assert_eq!(distinct.len(), 9);

        let submesh = dir.join(format!("mpi-fine-submesh{rank:03}.vtk"));
        assert!(submesh.exists());
    }
    std::fs::remove_dir_all(&dir).ok();
}

/// The single-process driver produces the same reconciliation.
#[test]
fn serial_driver_matches_the_part_policy_and_reconciles() {
    let dir = temp_dir("serial");
    let coarse = hex_grid(2, 1, 1, [1.0, 1.0, 1.0]);
    // 16 fine cells with a cap of 8 per part forces exactly two parts.
    let stats = refine_for_parallel(&coarse, &config(2, 8, dir.clone())).unwrap();
    assert_eq!(stats.parts, 2);
    assert_eq!(stats.cells, 16);

    for part in 0..2 {
        assert!(dir.join(format!("fine-submesh{part:03}.vtk")).exists());
        let listing = dir.join(format!("identical-verts-submesh{part:03}.txt"));
        let text = std::fs::read_to_string(&listing).unwrap();
        assert_eq!(text.lines().count(), 18);
    }
    std::fs::remove_dir_all(&dir).ok();
}

/// Per-part outputs are byte-identical across reruns.
#[test]
fn rerun_outputs_are_byte_identical() {
    let coarse = hex_grid(2, 2, 1, [1.0, 1.0, 0.5]);
    let dir_a = temp_dir("determinism-a");
    let dir_b = temp_dir("determinism-b");
    refine_for_parallel(&coarse, &config(2, 8, dir_a.clone())).unwrap();
    refine_for_parallel(&coarse, &config(2, 8, dir_b.clone())).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(&dir_a)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert!(!names.is_empty());
    for name in names {
        let a = std::fs::read(dir_a.join(&name)).unwrap();
        let b = std::fs::read(dir_b.join(&name)).unwrap();
        assert_eq!(a, b, "output file {name} differs between reruns");
    }
    std::fs::remove_dir_all(&dir_a).ok();
    std::fs::remove_dir_all(&dir_b).ok();
}

/// Refined parts can be written and read back unchanged.
#[test]
fn refined_mesh_round_trips_through_vtk() {
    let dir = temp_dir("round-trip");
    let coarse = unit_tet();
    let fine = refine_mesh(&coarse, 3, MappingType::Lagrange).unwrap();
    let path = dir.join("fine.vtk");
    examesh::io::vtk::write_vtk(&fine, &path).unwrap();
    let back = examesh::io::vtk::read_vtk(&path).unwrap();

    assert_eq!(back.num_verts(), fine.num_verts());
    assert_eq!(back.num_tets(), fine.num_tets());
    assert_eq!(back.num_bdry_tris(), fine.num_bdry_tris());
    for v in 0..fine.num_verts() {
        assert_eq!(back.coords(v), fine.coords(v));
    }
    for t in 0..fine.num_tets() {
        assert_eq!(back.tet_conn(t), fine.tet_conn(t));
    }
    std::fs::remove_dir_all(&dir).ok();
}
