//! Hexahedron divider: a regular N×N×N lattice producing N³ fine hexes.

use crate::mesh::{CellType, MeshBase, UMesh};
use crate::refine::divider::{CellDivider, Lattice, ShapeTables};
use crate::refine::mapping::{HexMap, MappingType};

pub(crate) static HEX_TABLES: ShapeTables = ShapeTables {
    cell_type: CellType::Hexahedron,
    corners_unit: &[
        [0, 0, 0],
        [1, 0, 0],
        [1, 1, 0],
        [0, 1, 0],
        [0, 0, 1],
        [1, 0, 1],
        [1, 1, 1],
        [0, 1, 1],
    ],
    edges: &[
        [0, 1],
        [1, 2],
        [2, 3],
        [3, 0],
        [0, 4],
        [1, 5],
        [2, 6],
        [3, 7],
        [4, 5],
        [5, 6],
        [6, 7],
        [7, 4],
    ],
    tri_faces: &[],
    // Sides in the estimator's winding, then bottom and top.
    quad_faces: &[
        [1, 0, 4, 5],
        [2, 1, 5, 6],
        [3, 2, 6, 7],
        [0, 3, 7, 4],
        [0, 1, 2, 3],
        [7, 6, 5, 4],
    ],
    edge_faces: &[
        [0, 4],
        [1, 4],
        [2, 4],
        [3, 4],
        [0, 3],
        [0, 1],
        [1, 2],
        [2, 3],
        [0, 5],
        [1, 5],
        [2, 5],
        [3, 5],
    ],
};

pub(crate) struct HexDivider {
    n: u32,
    corner_verts: [u32; 8],
    corner_coords: [[f64; 3]; 8],
    map: HexMap,
}

impl HexDivider {
    pub fn new<M: MeshBase>(mesh: &M, cell: u32, n: u32, mapping: MappingType) -> Self {
        let corner_verts = *mesh.hex_conn(cell);
        let corner_coords = corner_verts.map(|v| mesh.coords(v));
        let scales = corner_verts.map(|v| mesh.length_scale(v));
        HexDivider {
            n,
            corner_verts,
            corner_coords,
            map: HexMap::new(mapping, corner_coords, scales),
        }
    }
}

impl CellDivider for HexDivider {
    fn tables(&self) -> &'static ShapeTables {
        &HEX_TABLES
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
                for i in 1..n {
                    visit([i, j, k]);
                }
            }
        }
    }

    fn create_new_cells(&self, grid: &Lattice, mesh: &mut UMesh) {
        let n = self.n;
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    mesh.add_hex([
                        grid.get([i, j, k]),
                        grid.get([i + 1, j, k]),
                        grid.get([i + 1, j + 1, k]),
                        grid.get([i, j + 1, k]),
                        grid.get([i, j, k + 1]),
                        grid.get([i + 1, j, k + 1]),
                        grid.get([i + 1, j + 1, k + 1]),
                        grid.get([i, j + 1, k + 1]),
                    ]);
                }
            }
        }
    }
}
