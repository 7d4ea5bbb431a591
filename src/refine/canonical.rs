//! Canonical edge and face records for refinement-time reconciliation.
//!
//! Two cells sharing an edge or a face must see the same interior vertex
//! IDs along it. Instead of cross-linking cells, the first cell to divide
//! an edge/face registers the interior vertices under a canonical key (the
//! vertex tuple sorted ascending); later cells look the record up and
//! traverse the stored grid through the corner permutation between their
//! own orientation and the record's.
//!
//! Registries live for the duration of one part's refinement and are then
//! dropped.

use hashbrown::HashMap;

use crate::mesh::CellType;

/// An unordered vertex pair with `v0 < v1`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Edge {
    v0: u32,
    v1: u32,
}

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        debug_assert_ne!(a, b);
        if a < b {
            Edge { v0: a, v1: b }
        } else {
            Edge { v0: b, v1: a }
        }
    }

    pub fn v0(&self) -> u32 {
        self.v0
    }

    pub fn v1(&self) -> u32 {
        self.v1
    }
}

/// The interior vertices of a divided edge, ordered from `v0` to `v1`,
/// plus the running total of interior dihedral angles of the cells
/// registered around the edge.
#[derive(Clone, Debug)]
pub struct EdgeVerts {
    pub(crate) verts: Vec<u32>,
    pub(crate) total_dihedral: f64,
}

impl EdgeVerts {
    pub fn new(verts: Vec<u32>) -> Self {
        EdgeVerts {
            verts,
            total_dihedral: 0.0,
        }
    }

    /// The `k`-th interior vertex (1-based) walking the edge from `from`.
    /// A traversal starting at `v1` sees the stored run reversed.
    pub fn interior(&self, edge: &Edge, from: u32, k: u32) -> u32 {
        debug_assert!(from == edge.v0 || from == edge.v1);
        debug_assert!(k >= 1 && (k as usize) <= self.verts.len());
        if from == edge.v0 {
            self.verts[k as usize - 1]
        } else {
            self.verts[self.verts.len() - k as usize]
        }
    }

    pub fn total_dihedral(&self) -> f64 {
        self.total_dihedral
    }
}

fn sorted3(mut v: [u32; 3]) -> [u32; 3] {
    v.sort_unstable();
    v
}

fn sorted4(mut v: [u32; 4]) -> [u32; 4] {
    v.sort_unstable();
    v
}

/// A divided triangular face: the creating cell's corner orientation plus
/// the `(N−2)²`-bounded grid of interior vertex IDs.
///
/// The grid is indexed by the lattice coordinates `(i, j)` of the point
/// `corners[0] + i·(corners[1]−corners[0])/N + j·(corners[2]−corners[0])/N`,
/// i.e. `i` is the barycentric weight of `corners[1]` and `j` that of
/// `corners[2]`.
#[derive(Clone, Debug)]
pub struct TriFaceVerts {
    pub corners: [u32; 3],
    grid: Vec<u32>,
    pub vol_element: u32,
    pub vol_element_type: CellType,
    pub use_count: u32,
}

impl TriFaceVerts {
    pub fn new(corners: [u32; 3], n: u32, vol_element: u32, vol_element_type: CellType) -> Self {
        let side = n.saturating_sub(2) as usize;
        TriFaceVerts {
            corners,
            grid: vec![u32::MAX; side * side],
            vol_element,
            vol_element_type,
            use_count: 0,
        }
    }

    pub fn sorted(&self) -> [u32; 3] {
        sorted3(self.corners)
    }

    fn slot(&self, n: u32, i: u32, j: u32) -> usize {
        debug_assert!(i >= 1 && j >= 1 && i + j <= n - 1);
        let side = (n - 2) as usize;
        (i as usize - 1) * side + (j as usize - 1)
    }

    /// Store an interior vertex in the creating cell's orientation.
    pub fn set_interior(&mut self, n: u32, i: u32, j: u32, vert: u32) {
        let slot = self.slot(n, i, j);
        self.grid[slot] = vert;
    }

    /// Fetch the interior vertex at lattice `(i, j)` relative to
    /// `my_corners`, which must be a permutation of the stored corners.
    pub fn interior(&self, n: u32, my_corners: &[u32; 3], i: u32, j: u32) -> u32 {
        // Barycentric weights of the query point at each of my corners,
        // re-scattered onto the record's corner order.
        let mine = [n - i - j, i, j];
        let mut rec = [0u32; 3];
        for (m, &c) in my_corners.iter().enumerate() {
            let pos = self
                .corners
                .iter()
                .position(|&rc| rc == c)
                .expect("face corner mismatch");
            rec[pos] = mine[m];
        }
        let vert = self.grid[self.slot(n, rec[1], rec[2])];
        debug_assert_ne!(vert, u32::MAX);
        vert
    }
}

/// A divided quad face: corners in the creating cell's orientation plus
/// the `(N−1)²` grid of interior vertex IDs.
///
/// The grid point `(i, j)` is
/// `corners[0] + i·(corners[1]−corners[0])/N + j·(corners[3]−corners[0])/N`.
#[derive(Clone, Debug)]
pub struct QuadFaceVerts {
    pub corners: [u32; 4],
    grid: Vec<u32>,
    pub vol_element: u32,
    pub vol_element_type: CellType,
    pub use_count: u32,
}

/// Lattice positions of the four quad corners in the record frame.
const QUAD_CORNER_POS: [[i64; 2]; 4] = [[0, 0], [1, 0], [1, 1], [0, 1]];

impl QuadFaceVerts {
    pub fn new(corners: [u32; 4], n: u32, vol_element: u32, vol_element_type: CellType) -> Self {
        let side = (n - 1) as usize;
        QuadFaceVerts {
            corners,
            grid: vec![u32::MAX; side * side],
            vol_element,
            vol_element_type,
            use_count: 0,
        }
    }

    pub fn sorted(&self) -> [u32; 4] {
        sorted4(self.corners)
    }

    fn slot(&self, n: u32, i: u32, j: u32) -> usize {
        debug_assert!(i >= 1 && j >= 1 && i <= n - 1 && j <= n - 1);
        let side = (n - 1) as usize;
        (i as usize - 1) * side + (j as usize - 1)
    }

    pub fn set_interior(&mut self, n: u32, i: u32, j: u32, vert: u32) {
        let slot = self.slot(n, i, j);
        self.grid[slot] = vert;
    }

    /// Fetch the interior vertex at lattice `(i, j)` relative to
    /// `my_corners`. Handles all eight orientations (four rotations, two
    /// windings) by mapping my affine frame into the record frame.
    pub fn interior(&self, n: u32, my_corners: &[u32; 4], i: u32, j: u32) -> u32 {
        let pos = |c: u32| -> [i64; 2] {
            let idx = self
                .corners
                .iter()
                .position(|&rc| rc == c)
                .expect("face corner mismatch");
            QUAD_CORNER_POS[idx]
        };
        let p0 = pos(my_corners[0]);
        let p1 = pos(my_corners[1]);
        let p3 = pos(my_corners[3]);
        let nn = n as i64;
        let u = p0[0] * nn + i as i64 * (p1[0] - p0[0]) + j as i64 * (p3[0] - p0[0]);
        let v = p0[1] * nn + i as i64 * (p1[1] - p0[1]) + j as i64 * (p3[1] - p0[1]);
        debug_assert!(u >= 1 && v >= 1 && u <= nn - 1 && v <= nn - 1);
        let vert = self.grid[self.slot(n, u as u32, v as u32)];
        debug_assert_ne!(vert, u32::MAX);
        vert
    }
}

/// Per-part registries for divided edges and faces, keyed canonically.
#[derive(Debug, Default)]
pub struct RefineTables {
    pub(crate) edges: HashMap<Edge, EdgeVerts>,
    pub(crate) tri_faces: HashMap<[u32; 3], TriFaceVerts>,
    pub(crate) quad_faces: HashMap<[u32; 4], QuadFaceVerts>,
}

impl RefineTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge(&self, key: &Edge) -> Option<&EdgeVerts> {
        self.edges.get(key)
    }

    pub fn tri_face(&self, corners: [u32; 3]) -> Option<&TriFaceVerts> {
        self.tri_faces.get(&sorted3(corners))
    }

    pub fn quad_face(&self, corners: [u32; 4]) -> Option<&QuadFaceVerts> {
        self.quad_faces.get(&sorted4(corners))
    }

    pub(crate) fn insert_tri(&mut self, record: TriFaceVerts) {
        self.tri_faces.insert(record.sorted(), record);
    }

    pub(crate) fn insert_quad(&mut self, record: QuadFaceVerts) {
        self.quad_faces.insert(record.sorted(), record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_is_order_independent() {
        assert_eq!(Edge::new(7, 3), Edge::new(3, 7));
        assert_eq!(Edge::new(3, 7).v0(), 3);
        assert_eq!(Edge::new(3, 7).v1(), 7);
    }

    #[test]
    fn edge_interior_reverses() {
        let edge = Edge::new(10, 20);
        let ev = EdgeVerts::new(vec![100, 101, 102]);
        // Forward walk from v0.
        assert_eq!(ev.interior(&edge, 10, 1), 100);
        assert_eq!(ev.interior(&edge, 10, 3), 102);
        // Reverse walk from v1.
        assert_eq!(ev.interior(&edge, 20, 1), 102);
        assert_eq!(ev.interior(&edge, 20, 3), 100);
    }

    #[test]
    fn tri_face_permuted_lookup() {
        let n = 4;
        let mut record = TriFaceVerts::new([5, 9, 2], n, 0, CellType::Tetrahedron);
        // Interior lattice for n=4: (1,1), (1,2), (2,1).
        record.set_interior(n, 1, 1, 100);
        record.set_interior(n, 1, 2, 101);
        record.set_interior(n, 2, 1, 102);

        // Identity orientation.
        assert_eq!(record.interior(n, &[5, 9, 2], 1, 1), 100);
        // Rotated orientation [9, 2, 5]: the query (i=2, j=1) weights
        // corner 9 with 4−2−1 = 1, corner 2 with 2, corner 5 with 1,
        // which is the record's (1, 2) slot.
        assert_eq!(record.interior(n, &[9, 2, 5], 2, 1), 101);
        // Reflected orientation [2, 9, 5]: (i=2, j=1) weights corner 9
        // with 2 and corner 5 with 1, the record's (2, 1) slot.
        assert_eq!(record.interior(n, &[2, 9, 5], 2, 1), 102);
    }

    #[test]
    fn quad_face_rotated_lookup() {
        let n = 3;
        let mut record = QuadFaceVerts::new([4, 8, 15, 16], n, 0, CellType::Hexahedron);
        record.set_interior(n, 1, 1, 200);
        record.set_interior(n, 1, 2, 201);
        record.set_interior(n, 2, 1, 202);
        record.set_interior(n, 2, 2, 203);

        // Identity.
        assert_eq!(record.interior(n, &[4, 8, 15, 16], 1, 1), 200);
        // The reversed winding a neighbouring cell sees: [8, 4, 16, 15].
        // Its frame maps (i, j) to record coordinates (n−i, j).
        assert_eq!(record.interior(n, &[8, 4, 16, 15], 1, 1), 202);
        assert_eq!(record.interior(n, &[8, 4, 16, 15], 2, 1), 200);
        assert_eq!(record.interior(n, &[8, 4, 16, 15], 1, 2), 203);
        // Same-winding rotation [8, 15, 16, 4]: (i, j) maps to (n−j, i).
        assert_eq!(record.interior(n, &[8, 15, 16, 4], 1, 1), 202);
        assert_eq!(record.interior(n, &[8, 15, 16, 4], 1, 2), 200);
    }

    #[test]
    fn registry_round_trip() {
        let mut tables = RefineTables::new();
        let record = TriFaceVerts::new([30, 10, 20], 2, 7, CellType::Prism);
        tables.insert_tri(record);
        // Any corner order finds the record through the sorted key.
        assert!(tables.tri_face([20, 30, 10]).is_some());
        assert!(tables.tri_face([10, 20, 30]).is_some());
        assert!(tables.tri_face([10, 20, 31]).is_none());
        assert_eq!(tables.tri_face([20, 30, 10]).unwrap().vol_element, 7);
    }
}
