//! Prism divider: a triangular lattice crossed with N layers, producing
//! N³ fine prisms (upward and downward triangles per layer).

use crate::mesh::{CellType, MeshBase, UMesh};
use crate::refine::divider::{CellDivider, Lattice, ShapeTables};
use crate::refine::mapping::{MappingType, PrismMap};

pub(crate) static PRISM_TABLES: ShapeTables = ShapeTables {
    cell_type: CellType::Prism,
    corners_unit: &[
        [0, 0, 0],
        [1, 0, 0],
        [0, 1, 0],
        [0, 0, 1],
        [1, 0, 1],
        [0, 1, 1],
    ],
    edges: &[
        [0, 1],
        [1, 2],
        [2, 0],
        [0, 3],
        [1, 4],
        [2, 5],
        [3, 4],
        [4, 5],
        [5, 3],
    ],
    // Bottom and top triangles, then the three side quads, in the
    // estimator's winding.
    tri_faces: &[[0, 1, 2], [5, 4, 3]],
    quad_faces: &[[1, 0, 3, 4], [2, 1, 4, 5], [0, 2, 5, 3]],
    edge_faces: &[
        [2, 0],
        [3, 0],
        [4, 0],
        [2, 4],
        [2, 3],
        [3, 4],
        [2, 1],
        [3, 1],
        [4, 1],
    ],
};

pub(crate) struct PrismDivider {
    n: u32,
    corner_verts: [u32; 6],
    corner_coords: [[f64; 3]; 6],
    map: PrismMap,
}

impl PrismDivider {
    pub fn new<M: MeshBase>(mesh: &M, cell: u32, n: u32, mapping: MappingType) -> Self {
        let corner_verts = *mesh.prism_conn(cell);
        let corner_coords = corner_verts.map(|v| mesh.coords(v));
        let scales = corner_verts.map(|v| mesh.length_scale(v));
        PrismDivider {
            n,
            corner_verts,
            corner_coords,
            map: PrismMap::new(mapping, corner_coords, scales),
        }
    }
}

impl CellDivider for PrismDivider {
    fn tables(&self) -> &'static ShapeTables {
        &PRISM_TABLES
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
        let n = self.n as f64;
        [ijk[0] as f64 / n, ijk[1] as f64 / n, ijk[2] as f64 / n]
    }

    fn map_point(&self, uvw: [f64; 3]) -> [f64; 3] {
        self.map.point(uvw)
    }

    fn interior_points(&self, visit: &mut dyn FnMut([u32; 3])) {
        let n = self.n;
        for k in 1..n {
            for j in 1..n {
                for i in 1..n - j {
                    visit([i, j, k]);
                }
            }
        }
    }

    fn create_new_cells(&self, grid: &Lattice, mesh: &mut UMesh) {
        let n = self.n;
        for k in 0..n {
            for j in 0..n {
                for i in 0..n - j {
                    // Upward triangle column.
                    mesh.add_prism([
                        grid.get([i, j, k]),
                        grid.get([i + 1, j, k]),
                        grid.get([i, j + 1, k]),
                        grid.get([i, j, k + 1]),
                        grid.get([i + 1, j, k + 1]),
                        grid.get([i, j + 1, k + 1]),
                    ]);
                    if i + j + 2 <= n {
                        // Downward triangle column.
                        mesh.add_prism([
                            grid.get([i + 1, j, k]),
                            grid.get([i + 1, j + 1, k]),
                            grid.get([i, j + 1, k]),
                            grid.get([i + 1, j, k + 1]),
                            grid.get([i + 1, j + 1, k + 1]),
                            grid.get([i, j + 1, k + 1]),
                        ]);
                    }
                }
            }
        }
    }
}
