//! Pyramid divider.
//!
//! The lattice shrinks layer by layer: level k holds an (N−k+1)² grid in
//! collapsed coordinates, down to the single apex point at level N. Each
//! layer sheds upward pyramids, inverted pyramids between the grids, and
//! gap-filling tets, which together fill N³ pyramid-volume units (a tet
//! counting as half a pyramid).

use crate::mesh::{CellType, MeshBase, UMesh};
use crate::refine::divider::{CellDivider, Lattice, ShapeTables};
use crate::refine::mapping::{MappingType, PyrMap};

pub(crate) static PYR_TABLES: ShapeTables = ShapeTables {
    cell_type: CellType::Pyramid,
    corners_unit: &[[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0], [0, 0, 1]],
    edges: &[
        [0, 1],
        [0, 4],
        [1, 2],
        [1, 4],
        [2, 3],
        [2, 4],
        [3, 0],
        [3, 4],
    ],
    // The four lateral triangles, then the base quad, in the estimator's
    // winding.
    tri_faces: &[[1, 0, 4], [2, 1, 4], [3, 2, 4], [0, 3, 4]],
    quad_faces: &[[0, 1, 2, 3]],
    edge_faces: &[
        [4, 0],
        [0, 3],
        [4, 1],
        [0, 1],
        [4, 2],
        [1, 2],
        [4, 3],
        [2, 3],
    ],
};

pub(crate) struct PyrDivider {
    n: u32,
    corner_verts: [u32; 5],
    corner_coords: [[f64; 3]; 5],
    map: PyrMap,
}

impl PyrDivider {
    pub fn new<M: MeshBase>(mesh: &M, cell: u32, n: u32, mapping: MappingType) -> Self {
        let corner_verts = *mesh.pyr_conn(cell);
        let corner_coords = corner_verts.map(|v| mesh.coords(v));
        let scales = corner_verts.map(|v| mesh.length_scale(v));
        PyrDivider {
            n,
            corner_verts,
            corner_coords,
            map: PyrMap::new(mapping, corner_coords, scales),
        }
    }
}

impl CellDivider for PyrDivider {
    fn tables(&self) -> &'static ShapeTables {
        &PYR_TABLES
    }

    fn n(&self) -> u32 {
        self.n
    }

    fn corner_verts(&self) -> &[u32] {
        &self.corner_verts
    }

    fn corner_coords(&self) -> &[[f64; 3]] {
        &self.corner_coords
    }

    fn uvw_of(&self, ijk: [u32; 3]) -> [f64; 3] {
        let n = self.n;
        let k = ijk[2];
        // Collapsed coordinates: level k spans the full unit square.
        let denom = (n - k).max(1) as f64;
        [
            ijk[0] as f64 / denom,
            ijk[1] as f64 / denom,
            k as f64 / n as f64,
        ]
    }

    fn map_point(&self, uvw: [f64; 3]) -> [f64; 3] {
        self.map.point(uvw)
    }

    fn interior_points(&self, visit: &mut dyn FnMut([u32; 3])) {
        let n = self.n;
        // Interior of each level's shrinking grid; the level-0 interior
        // belongs to the base quad face and the outer rings to the
        // lateral faces.
        for k in 1..n {
            let side = n - k;
            for j in 1..side {
                for i in 1..side {
                    visit([i, j, k]);
                }
            }
        }
    }

    fn create_new_cells(&self, grid: &Lattice, mesh: &mut UMesh) {
        let n = self.n;
        for k in 0..n {
            let side = n - k;
            // Upward pyramids: one per level-k grid cell, apex on the
            // point of the level above that sits over the cell centre.
            for j in 0..side {
                for i in 0..side {
                    mesh.add_pyr([
                        grid.get([i, j, k]),
                        grid.get([i + 1, j, k]),
                        grid.get([i + 1, j + 1, k]),
                        grid.get([i, j + 1, k]),
                        grid.get([i, j, k + 1]),
                    ]);
                }
            }
            // Inverted pyramids: base on the level above, apex below.
            for j in 0..side.saturating_sub(1) {
                for i in 0..side.saturating_sub(1) {
                    mesh.add_pyr([
                        grid.get([i, j, k + 1]),
                        grid.get([i, j + 1, k + 1]),
                        grid.get([i + 1, j + 1, k + 1]),
                        grid.get([i + 1, j, k + 1]),
                        grid.get([i + 1, j + 1, k]),
                    ]);
                }
            }
            // Gap tets between x-adjacent upward pyramids.
            for j in 0..side {
                for i in 0..side.saturating_sub(1) {
                    mesh.add_tet([
                        grid.get([i + 1, j, k]),
                        grid.get([i + 1, j + 1, k]),
                        grid.get([i, j, k + 1]),
                        grid.get([i + 1, j, k + 1]),
                    ]);
                }
            }
            // Gap tets between y-adjacent upward pyramids.
            for j in 0..side.saturating_sub(1) {
                for i in 0..side {
                    mesh.add_tet([
                        grid.get([i, j + 1, k]),
                        grid.get([i, j, k + 1]),
                        grid.get([i + 1, j + 1, k]),
                        grid.get([i, j + 1, k + 1]),
                    ]);
                }
            }
        }
    }
}
