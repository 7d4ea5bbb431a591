//! Tetrahedron divider.
//!
//! The refinement lattice is (i, j, k) with i + j + k ≤ N over the corner
//! order v0 = origin, v1 = +u, v2 = +v, v3 = +w. Each unit sub-cube slice
//! of the lattice yields one upright tet, one octahedron (split into four
//! tets around its shortest internal diagonal) and one inverted tet, for
//! N³ fine tets in total.

use crate::geometry::sub;
use crate::mesh::{CellType, MeshBase, UMesh};
use crate::refine::divider::{CellDivider, Lattice, ShapeTables};
use crate::refine::mapping::{MappingType, TetMap};

pub(crate) static TET_TABLES: ShapeTables = ShapeTables {
    cell_type: CellType::Tetrahedron,
    corners_unit: &[[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]],
    edges: &[[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]],
    // Faces (tri list): 012, 031, 132, 230, matching the estimator's
    // normal conventions.
    tri_faces: &[[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]],
    quad_faces: &[],
    edge_faces: &[[0, 1], [0, 3], [1, 3], [0, 2], [1, 2], [2, 3]],
};

pub(crate) struct TetDivider {
    n: u32,
    corner_verts: [u32; 4],
    corner_coords: [[f64; 3]; 4],
    map: TetMap,
}

impl TetDivider {
    pub fn new<M: MeshBase>(mesh: &M, cell: u32, n: u32, mapping: MappingType) -> Self {
        let corner_verts = *mesh.tet_conn(cell);
        let corner_coords = corner_verts.map(|v| mesh.coords(v));
        let scales = corner_verts.map(|v| mesh.length_scale(v));
        TetDivider {
            n,
            corner_verts,
            corner_coords,
            map: TetMap::new(mapping, corner_coords, scales),
        }
    }
}

impl CellDivider for TetDivider {
    fn tables(&self) -> &'static ShapeTables {
        &TET_TABLES
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
            for j in 1..n - k {
                for i in 1..n - k - j {
                    visit([i, j, k]);
                }
            }
        }
    }

    fn create_new_cells(&self, grid: &Lattice, mesh: &mut UMesh) {
        let n = self.n;
        for k in 0..n {
            for j in 0..n - k {
                for i in 0..n - k - j {
                    let s = i + j + k;
                    // Upright tet in the corner of the slice.
                    mesh.add_tet([
                        grid.get([i, j, k]),
                        grid.get([i + 1, j, k]),
                        grid.get([i, j + 1, k]),
                        grid.get([i, j, k + 1]),
                    ]);
                    if s + 2 <= n {
                        stuff_tets_into_octahedron(grid, mesh, [i, j, k]);
                    }
                    if s + 3 <= n {
                        // Inverted tet.
                        mesh.add_tet([
                            grid.get([i + 1, j + 1, k]),
                            grid.get([i, j + 1, k + 1]),
                            grid.get([i + 1, j, k + 1]),
                            grid.get([i + 1, j + 1, k + 1]),
                        ]);
                    }
                }
            }
        }
    }
}

/// The three internal diagonals of the slice octahedron, as offset pairs,
/// each with its equatorial cycle ordered so that the four tets
/// (pole0, eq[t], eq[t+1], pole1) are positively oriented.
const OCT_DIAGONALS: [([u32; 3], [u32; 3], [[u32; 3]; 4]); 3] = [
    (
        [1, 0, 0],
        [0, 1, 1],
        [[0, 1, 0], [0, 0, 1], [1, 0, 1], [1, 1, 0]],
    ),
    (
        [0, 1, 0],
        [1, 0, 1],
        [[1, 0, 0], [1, 1, 0], [0, 1, 1], [0, 0, 1]],
    ),
    (
        [0, 0, 1],
        [1, 1, 0],
        [[1, 0, 0], [0, 1, 0], [0, 1, 1], [1, 0, 1]],
    ),
];

/// Split the octahedron at lattice offset `base` into four tets around its
/// shortest internal diagonal, which gives the best-shaped tets.
fn stuff_tets_into_octahedron(grid: &Lattice, mesh: &mut UMesh, base: [u32; 3]) {
    let at = |off: [u32; 3]| [base[0] + off[0], base[1] + off[1], base[2] + off[2]];
    let dist2 = |a: [u32; 3], b: [u32; 3]| -> f64 {
        let d = sub(mesh.coords(grid.get(at(a))), mesh.coords(grid.get(at(b))));
        d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
    };

    let mut best = 0;
    let mut best_len = f64::INFINITY;
    for (idx, (p0, p1, _)) in OCT_DIAGONALS.iter().enumerate() {
        let len = dist2(*p0, *p1);
        if len < best_len {
            best_len = len;
            best = idx;
        }
    }

    let (p0, p1, equator) = &OCT_DIAGONALS[best];
    let pole0 = grid.get(at(*p0));
    let pole1 = grid.get(at(*p1));
    for t in 0..4 {
        mesh.add_tet([
            pole0,
            grid.get(at(equator[t])),
            grid.get(at(equator[(t + 1) % 4])),
            pole1,
        ]);
    }
}
