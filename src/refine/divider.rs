//! The shared core of the cell divider family.
//!
//! Each shape supplies its static reference-element tables and a parametric
//! map; the edge and face division passes here are common to all shapes.
//! Vertices are created in edge → face → interior order per cell, and cells
//! are visited in a fixed order, so vertex IDs are deterministic for a given
//! input and subdivision factor.

use crate::geometry::{dot, quad_unit_normal, safe_acos, tri_unit_normal};
use crate::mesh::{CellType, UMesh};
use crate::refine::canonical::{Edge, EdgeVerts, QuadFaceVerts, RefineTables, TriFaceVerts};

/// Static per-shape reference element description.
///
/// `corners_unit` holds the unit lattice coordinates of each corner
/// (multiplied by N at run time). Faces are listed triangles first, then
/// quads; `edge_faces` maps each edge to the two adjacent faces in that
/// combined order, with the corner windings taken from the length-scale
/// estimator's normal conventions so dihedral angles are consistent.
pub(crate) struct ShapeTables {
    pub cell_type: CellType,
    pub corners_unit: &'static [[u32; 3]],
    pub edges: &'static [[usize; 2]],
    pub edge_faces: &'static [[usize; 2]],
    pub tri_faces: &'static [[usize; 3]],
    pub quad_faces: &'static [[usize; 4]],
}

/// Dense (N+1)³ scratch array mapping lattice (i, j, k) to fine vertex IDs.
/// Reused across cells; `u32::MAX` marks unset entries.
pub(crate) struct Lattice {
    n: u32,
    data: Vec<u32>,
}

impl Lattice {
    pub fn new(n: u32) -> Self {
        let side = (n + 1) as usize;
        Lattice {
            n,
            data: vec![u32::MAX; side * side * side],
        }
    }

    pub fn reset(&mut self) {
        self.data.fill(u32::MAX);
    }

    #[inline]
    fn slot(&self, ijk: [u32; 3]) -> usize {
        let side = (self.n + 1) as usize;
        (ijk[2] as usize * side + ijk[1] as usize) * side + ijk[0] as usize
    }

    #[inline]
    pub fn get(&self, ijk: [u32; 3]) -> u32 {
        let vert = self.data[self.slot(ijk)];
        debug_assert_ne!(vert, u32::MAX, "unset lattice point {ijk:?}");
        vert
    }

    #[inline]
    pub fn set(&mut self, ijk: [u32; 3], vert: u32) {
        let slot = self.slot(ijk);
        self.data[slot] = vert;
    }
}

/// One shape's divider: reference tables plus the per-cell parametric map.
pub(crate) trait CellDivider {
    fn tables(&self) -> &'static ShapeTables;
    fn n(&self) -> u32;
    /// Fine-mesh vertex IDs of the coarse corners.
    fn corner_verts(&self) -> &[u32];
    /// Physical corner coordinates, for dihedral accumulation.
    fn corner_coords(&self) -> &[[f64; 3]];
    /// Reference coordinates of a lattice point.
    fn uvw_of(&self, ijk: [u32; 3]) -> [f64; 3];
    /// Evaluate the cell map.
    fn map_point(&self, uvw: [f64; 3]) -> [f64; 3];
    /// Visit every strictly interior lattice point.
    fn interior_points(&self, visit: &mut dyn FnMut([u32; 3]));
    /// Emit this cell's fine cells from the completed lattice.
    fn create_new_cells(&self, grid: &Lattice, mesh: &mut UMesh);
}

fn corner_lattice(div: &dyn CellDivider, corner: usize) -> [u32; 3] {
    let unit = div.tables().corners_unit[corner];
    let n = div.n();
    [unit[0] * n, unit[1] * n, unit[2] * n]
}

/// Lattice step from `from` toward `to` per subdivision (always integral).
fn lattice_step(from: [u32; 3], to: [u32; 3], n: u32) -> [i64; 3] {
    [
        (to[0] as i64 - from[0] as i64) / n as i64,
        (to[1] as i64 - from[1] as i64) / n as i64,
        (to[2] as i64 - from[2] as i64) / n as i64,
    ]
}

fn offset(base: [u32; 3], step: [i64; 3], k: u32) -> [u32; 3] {
    [
        (base[0] as i64 + step[0] * k as i64) as u32,
        (base[1] as i64 + step[1] * k as i64) as u32,
        (base[2] as i64 + step[2] * k as i64) as u32,
    ]
}

fn offset2(base: [u32; 3], step_a: [i64; 3], a: u32, step_b: [i64; 3], b: u32) -> [u32; 3] {
    [
        (base[0] as i64 + step_a[0] * a as i64 + step_b[0] * b as i64) as u32,
        (base[1] as i64 + step_a[1] * a as i64 + step_b[1] * b as i64) as u32,
        (base[2] as i64 + step_a[2] * a as i64 + step_b[2] * b as i64) as u32,
    ]
}

/// Interior dihedral of the cell along face pair `(fa, fb)` of the combined
/// face list, from the corner coordinates.
fn face_pair_dihedral(div: &dyn CellDivider, fa: usize, fb: usize) -> f64 {
    let normal = |f: usize| -> [f64; 3] {
        let tables = div.tables();
        let coords = div.corner_coords();
        if f < tables.tri_faces.len() {
            let [a, b, c] = tables.tri_faces[f];
            tri_unit_normal(coords[a], coords[b], coords[c])
        } else {
            let [a, b, c, d] = tables.quad_faces[f - tables.tri_faces.len()];
            quad_unit_normal(coords[a], coords[b], coords[c], coords[d])
        }
    };
    safe_acos(-dot(normal(fa), normal(fb)))
}

/// Seed the lattice with the corner vertex IDs.
pub(crate) fn setup_corners(div: &dyn CellDivider, grid: &mut Lattice) {
    for (c, &vert) in div.corner_verts().iter().enumerate() {
        grid.set(corner_lattice(div, c), vert);
    }
}

/// Divide (or re-use) every edge of the cell.
///
/// New edges get N−1 interior vertices at equally spaced parametric points
/// along the edge, created walking from the smaller global endpoint so the
/// stored run is canonical. Every visit accumulates the cell's interior
/// dihedral into the edge record.
pub(crate) fn divide_edges(
    div: &dyn CellDivider,
    grid: &mut Lattice,
    mesh: &mut UMesh,
    tables: &mut RefineTables,
) {
    let n = div.n();
    let corner_verts = div.corner_verts();
    for (e_idx, &[a, b]) in div.tables().edges.iter().enumerate() {
        let (ga, gb) = (corner_verts[a], corner_verts[b]);
        let key = Edge::new(ga, gb);
        if let Some(existing) = tables.edges.get(&key) {
            let la = corner_lattice(div, a);
            let step = lattice_step(la, corner_lattice(div, b), n);
            for k in 1..n {
                grid.set(offset(la, step, k), existing.interior(&key, ga, k));
            }
        } else {
            // Walk from the smaller global endpoint regardless of which
            // local corner it is, so the stored run is in canonical order.
            let (from, to) = if ga < gb { (a, b) } else { (b, a) };
            let lf = corner_lattice(div, from);
            let step = lattice_step(lf, corner_lattice(div, to), n);
            let mut verts = Vec::with_capacity(n as usize - 1);
            for k in 1..n {
                let ijk = offset(lf, step, k);
                let xyz = div.map_point(div.uvw_of(ijk));
                let id = mesh.add_vert(xyz);
                grid.set(ijk, id);
                verts.push(id);
            }
            tables.edges.insert(key, EdgeVerts::new(verts));
        }
        let [fa, fb] = div.tables().edge_faces[e_idx];
        let dihedral = face_pair_dihedral(div, fa, fb);
        if let Some(record) = tables.edges.get_mut(&key) {
            record.total_dihedral += dihedral;
        }
    }
}

/// Divide (or re-use) every face of the cell. Edges must be divided first.
pub(crate) fn divide_faces(
    div: &dyn CellDivider,
    grid: &mut Lattice,
    mesh: &mut UMesh,
    tables: &mut RefineTables,
    cell_index: u32,
) {
    let n = div.n();
    let corner_verts = div.corner_verts();
    let shape = div.tables().cell_type;

    for &[a, b, c] in div.tables().tri_faces {
        let globals = [corner_verts[a], corner_verts[b], corner_verts[c]];
        let la = corner_lattice(div, a);
        let step_b = lattice_step(la, corner_lattice(div, b), n);
        let step_c = lattice_step(la, corner_lattice(div, c), n);
        if let Some(record) = tables.tri_faces.get_mut(&sorted_key3(globals)) {
            record.use_count += 1;
            for i in 1..n {
                for j in 1..n - i {
                    grid.set(
                        offset2(la, step_b, i, step_c, j),
                        record.interior(n, &globals, i, j),
                    );
                }
            }
        } else {
            let mut record = TriFaceVerts::new(globals, n, cell_index, shape);
            record.use_count = 1;
            for i in 1..n {
                for j in 1..n - i {
                    let ijk = offset2(la, step_b, i, step_c, j);
                    let id = mesh.add_vert(div.map_point(div.uvw_of(ijk)));
                    grid.set(ijk, id);
                    record.set_interior(n, i, j, id);
                }
            }
            tables.insert_tri(record);
        }
    }

    for &[a, b, c, d] in div.tables().quad_faces {
        let globals = [
            corner_verts[a],
            corner_verts[b],
            corner_verts[c],
            corner_verts[d],
        ];
        let la = corner_lattice(div, a);
        let step_b = lattice_step(la, corner_lattice(div, b), n);
        let step_d = lattice_step(la, corner_lattice(div, d), n);
        if let Some(record) = tables.quad_faces.get_mut(&sorted_key4(globals)) {
            record.use_count += 1;
            for i in 1..n {
                for j in 1..n {
                    grid.set(
                        offset2(la, step_b, i, step_d, j),
                        record.interior(n, &globals, i, j),
                    );
                }
            }
        } else {
            let mut record = QuadFaceVerts::new(globals, n, cell_index, shape);
            record.use_count = 1;
            for i in 1..n {
                for j in 1..n {
                    let ijk = offset2(la, step_b, i, step_d, j);
                    let id = mesh.add_vert(div.map_point(div.uvw_of(ijk)));
                    grid.set(ijk, id);
                    record.set_interior(n, i, j, id);
                }
            }
            tables.insert_quad(record);
        }
    }
}

/// Create the strictly interior vertices of the cell.
pub(crate) fn divide_interior(div: &dyn CellDivider, grid: &mut Lattice, mesh: &mut UMesh) {
    let mut points = Vec::new();
    div.interior_points(&mut |ijk| points.push(ijk));
    for ijk in points {
        let id = mesh.add_vert(div.map_point(div.uvw_of(ijk)));
        grid.set(ijk, id);
    }
}

fn sorted_key3(mut v: [u32; 3]) -> [u32; 3] {
    v.sort_unstable();
    v
}

fn sorted_key4(mut v: [u32; 4]) -> [u32; 4] {
    v.sort_unstable();
    v
}

// ---------------------------------------------------------------------------
// Face grid assembly (boundary emission and partition-boundary collection)
// ---------------------------------------------------------------------------

/// Index into a triangular grid with rows i, entries j ≤ n−i.
#[inline]
pub(crate) fn tri_grid_idx(n: u32, i: u32, j: u32) -> usize {
    // Row i starts after rows 0..i of lengths (n+1), (n), ...
    let i = i as usize;
    let n1 = (n + 1) as usize;
    i * (2 * n1 - i + 1) / 2 + j as usize
}

/// Assemble the full (corner + edge + interior) fine-vertex grid of a
/// divided triangular face, in the orientation of `corners`.
///
/// Fails with `None` when the face was never divided, which means the face
/// is not a face of any volume cell in the mesh.
pub(crate) fn tri_face_grid(
    tables: &RefineTables,
    corners: [u32; 3],
    n: u32,
) -> Option<Vec<u32>> {
    let size = ((n + 1) * (n + 2) / 2) as usize;
    let mut grid = vec![u32::MAX; size];
    grid[tri_grid_idx(n, 0, 0)] = corners[0];
    grid[tri_grid_idx(n, n, 0)] = corners[1];
    grid[tri_grid_idx(n, 0, n)] = corners[2];

    let record = tables.tri_face(corners)?;
    for (from, to, place) in [
        (corners[0], corners[1], 0usize),
        (corners[0], corners[2], 1),
        (corners[1], corners[2], 2),
    ] {
        let key = Edge::new(from, to);
        let edge = tables.edge(&key)?;
        for k in 1..n {
            let vert = edge.interior(&key, from, k);
            let idx = match place {
                0 => tri_grid_idx(n, k, 0),
                1 => tri_grid_idx(n, 0, k),
                _ => tri_grid_idx(n, n - k, k),
            };
            grid[idx] = vert;
        }
    }
    for i in 1..n {
        for j in 1..n - i {
            grid[tri_grid_idx(n, i, j)] = record.interior(n, &corners, i, j);
        }
    }
    Some(grid)
}

/// Assemble the full fine-vertex grid of a divided quad face, indexed
/// `i * (n + 1) + j` in the orientation of `corners`.
pub(crate) fn quad_face_grid(
    tables: &RefineTables,
    corners: [u32; 4],
    n: u32,
) -> Option<Vec<u32>> {
    let n1 = (n + 1) as usize;
    let at = |i: u32, j: u32| i as usize * n1 + j as usize;
    let mut grid = vec![u32::MAX; n1 * n1];
    grid[at(0, 0)] = corners[0];
    grid[at(n, 0)] = corners[1];
    grid[at(n, n)] = corners[2];
    grid[at(0, n)] = corners[3];

    let record = tables.quad_face(corners)?;
    for (from, to, along_i, fixed) in [
        (corners[0], corners[1], true, 0),
        (corners[3], corners[2], true, n),
        (corners[0], corners[3], false, 0),
        (corners[1], corners[2], false, n),
    ] {
        let key = Edge::new(from, to);
        let edge = tables.edge(&key)?;
        for k in 1..n {
            let vert = edge.interior(&key, from, k);
            let idx = if along_i { at(k, fixed) } else { at(fixed, k) };
            grid[idx] = vert;
        }
    }
    for i in 1..n {
        for j in 1..n {
            grid[at(i, j)] = record.interior(n, &corners, i, j);
        }
    }
    Some(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tri_grid_indexing_is_dense_and_unique() {
        let n = 4;
        let size = ((n + 1) * (n + 2) / 2) as usize;
        let mut seen = vec![false; size];
        for i in 0..=n {
            for j in 0..=(n - i) {
                let idx = tri_grid_idx(n, i, j);
                assert!(idx < size);
                assert!(!seen[idx], "duplicate index for ({i}, {j})");
                seen[idx] = true;
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn lattice_round_trip() {
        let mut grid = Lattice::new(3);
        grid.set([1, 2, 3], 42);
        grid.set([3, 3, 3], 7);
        assert_eq!(grid.get([1, 2, 3]), 42);
        assert_eq!(grid.get([3, 3, 3]), 7);
        grid.reset();
        grid.set([0, 0, 0], 1);
        assert_eq!(grid.get([0, 0, 0]), 1);
    }
}
