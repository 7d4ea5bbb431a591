//! Uniform refinement of a coarse mesh by a factor of N per edge.
//!
//! The driver walks cells in a fixed type order (tets, pyramids, prisms,
//! hexes), running each shape's divider through the shared
//! edge → face → interior → cells sequence. Canonical registries guarantee
//! that neighbouring cells reuse the vertices along shared edges and faces,
//! and the fixed traversal order makes vertex IDs, and therefore whole
//! output files, reproducible across runs.

pub mod canonical;
pub(crate) mod divider;
pub(crate) mod hex;
mod mapping;
pub(crate) mod prism;
pub(crate) mod pyr;
pub(crate) mod tet;

pub use canonical::{Edge, EdgeVerts, QuadFaceVerts, RefineTables, TriFaceVerts};
pub use mapping::MappingType;

use crate::error::{ExaMeshError, Result};
use crate::mesh::{compute_mesh_size, MeshBase, UMesh};
use divider::{
    divide_edges, divide_faces, divide_interior, quad_face_grid, setup_corners, tri_face_grid,
    tri_grid_idx, CellDivider, Lattice,
};
use hex::HexDivider;
use prism::PrismDivider;
use pyr::PyrDivider;
use tet::TetDivider;

/// Refine a coarse mesh, producing a fresh fine mesh.
///
/// The first `coarse.num_verts()` vertices of the output are the coarse
/// vertices in order, so for N = 1 the output matches the input modulo
/// cell reordering.
pub fn refine_mesh<M: MeshBase>(coarse: &M, n_divs: u32, mapping: MappingType) -> Result<UMesh> {
    let (fine, _tables) = refine_mesh_with_tables(coarse, n_divs, mapping)?;
    Ok(fine)
}

/// As [`refine_mesh`], but also hands back the canonical registries, which
/// the parallel driver mines for partition-boundary vertices.
pub fn refine_mesh_with_tables<M: MeshBase>(
    coarse: &M,
    n_divs: u32,
    mapping: MappingType,
) -> Result<(UMesh, RefineTables)> {
    let predicted = compute_mesh_size(&coarse.mesh_size(), n_divs)?;
    let mut fine = UMesh::with_capacity(&predicted);
    for v in 0..coarse.num_verts() {
        fine.add_vert(coarse.coords(v));
    }

    let mut tables = RefineTables::new();
    let mut grid = Lattice::new(n_divs);

    for cell in 0..coarse.num_tets() {
        let div = TetDivider::new(coarse, cell, n_divs, mapping);
        refine_cell(&div, &mut grid, &mut fine, &mut tables, cell);
    }
    for cell in 0..coarse.num_pyramids() {
        let div = PyrDivider::new(coarse, cell, n_divs, mapping);
        refine_cell(&div, &mut grid, &mut fine, &mut tables, cell);
    }
    for cell in 0..coarse.num_prisms() {
        let div = PrismDivider::new(coarse, cell, n_divs, mapping);
        refine_cell(&div, &mut grid, &mut fine, &mut tables, cell);
    }
    for cell in 0..coarse.num_hexes() {
        let div = HexDivider::new(coarse, cell, n_divs, mapping);
        refine_cell(&div, &mut grid, &mut fine, &mut tables, cell);
    }

    for face in 0..coarse.num_bdry_tris() {
        emit_bdry_tri(&tables, &mut fine, *coarse.bdry_tri_conn(face), n_divs)?;
    }
    for face in 0..coarse.num_bdry_quads() {
        emit_bdry_quad(&tables, &mut fine, *coarse.bdry_quad_conn(face), n_divs)?;
    }

    let feature_edges = tables
        .edges
        .values()
        .filter(|e| e.total_dihedral() < std::f64::consts::TAU - 1e-6)
        .count();
    log::debug!(
        "divided {} edges ({} on the surface), {} tri faces, {} quad faces",
        tables.edges.len(),
        feature_edges,
        tables.tri_faces.len(),
        tables.quad_faces.len(),
    );

    Ok((fine, tables))
}

fn refine_cell(
    div: &dyn CellDivider,
    grid: &mut Lattice,
    fine: &mut UMesh,
    tables: &mut RefineTables,
    cell_index: u32,
) {
    grid.reset();
    setup_corners(div, grid);
    divide_edges(div, grid, fine, tables);
    divide_faces(div, grid, fine, tables, cell_index);
    divide_interior(div, grid, fine);
    div.create_new_cells(grid, fine);
}

fn emit_bdry_tri(
    tables: &RefineTables,
    fine: &mut UMesh,
    conn: [u32; 3],
    n: u32,
) -> Result<()> {
    let grid = tri_face_grid(tables, conn, n).ok_or_else(|| {
        ExaMeshError::InvalidMesh(format!(
            "boundary tri ({}, {}, {}) is not a face of any volume cell",
            conn[0], conn[1], conn[2]
        ))
    })?;
    let at = |i: u32, j: u32| grid[tri_grid_idx(n, i, j)];
    for i in 0..n {
        for j in 0..n - i {
            fine.add_bdry_tri([at(i, j), at(i + 1, j), at(i, j + 1)]);
            if i + j + 2 <= n {
                fine.add_bdry_tri([at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
            }
        }
    }
    Ok(())
}

fn emit_bdry_quad(
    tables: &RefineTables,
    fine: &mut UMesh,
    conn: [u32; 4],
    n: u32,
) -> Result<()> {
    let grid = quad_face_grid(tables, conn, n).ok_or_else(|| {
        ExaMeshError::InvalidMesh(format!(
            "boundary quad ({}, {}, {}, {}) is not a face of any volume cell",
            conn[0], conn[1], conn[2], conn[3]
        ))
    })?;
    let n1 = (n + 1) as usize;
    let at = |i: u32, j: u32| grid[i as usize * n1 + j as usize];
    for i in 0..n {
        for j in 0..n {
            fine.add_bdry_quad([at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }
    Ok(())
}
