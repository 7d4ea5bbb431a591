//! Coordinate-bisection cell partitioner.
//!
//! Cells are described by their centroid only; the partitioner groups them
//! into P contiguous ranges of a reordered cell array by recursively
//! splitting along the axis of maximum centroid spread at the proportional
//! median. Vertex data never moves.

use crate::mesh::{CellType, MeshBase};

/// What the partitioner knows about one coarse cell.
#[derive(Clone, Copy, Debug)]
pub struct CellPartData {
    /// Dense index within the cell's own type.
    pub index: u32,
    pub cell_type: CellType,
    pub centroid: [f64; 3],
}

/// A half-open range [first, last) into the partitioned cell array.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Part {
    first: u32,
    last: u32,
}

impl Part {
    pub fn new(first: u32, last: u32) -> Self {
        debug_assert!(first <= last);
        Part { first, last }
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    pub fn len(&self) -> u32 {
        self.last - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.first == self.last
    }
}

fn centroid(coords: impl Iterator<Item = [f64; 3]>, count: f64) -> [f64; 3] {
    let mut out = [0.0; 3];
    for c in coords {
        out[0] += c[0];
        out[1] += c[1];
        out[2] += c[2];
    }
    out.map(|x| x / count)
}

/// Build the partitioner's view of every volume cell, in type order.
pub fn build_cell_part_data<M: MeshBase>(mesh: &M) -> Vec<CellPartData> {
    let mut cpd = Vec::with_capacity(mesh.num_cells() as usize);
    for i in 0..mesh.num_tets() {
        cpd.push(CellPartData {
            index: i,
            cell_type: CellType::Tetrahedron,
            centroid: centroid(mesh.tet_conn(i).iter().map(|&v| mesh.coords(v)), 4.0),
        });
    }
    for i in 0..mesh.num_pyramids() {
        cpd.push(CellPartData {
            index: i,
            cell_type: CellType::Pyramid,
            centroid: centroid(mesh.pyr_conn(i).iter().map(|&v| mesh.coords(v)), 5.0),
        });
    }
    for i in 0..mesh.num_prisms() {
        cpd.push(CellPartData {
            index: i,
            cell_type: CellType::Prism,
            centroid: centroid(mesh.prism_conn(i).iter().map(|&v| mesh.coords(v)), 6.0),
        });
    }
    for i in 0..mesh.num_hexes() {
        cpd.push(CellPartData {
            index: i,
            cell_type: CellType::Hexahedron,
            centroid: centroid(mesh.hex_conn(i).iter().map(|&v| mesh.coords(v)), 8.0),
        });
    }
    cpd
}

/// Partition the mesh's cells into `n_parts` contiguous ranges.
///
/// `n_parts` is clamped to the cell count (and to at least one part).
/// Returns the parts and the reordered cell array the ranges index into.
pub fn partition_cells<M: MeshBase>(mesh: &M, n_parts: u32) -> (Vec<Part>, Vec<CellPartData>) {
    let mut cpd = build_cell_part_data(mesh);
    let n_parts = n_parts.clamp(1, (cpd.len() as u32).max(1));
    let mut parts = Vec::with_capacity(n_parts as usize);
    split_recursive(&mut cpd, 0, n_parts, &mut parts);
    log::info!(
        "partitioned {} cells into {} parts (largest {})",
        cpd.len(),
        parts.len(),
        parts.iter().map(Part::len).max().unwrap_or(0),
    );
    (parts, cpd)
}

/// Number of parts implied by the max-cells-per-part policy: exactly P
/// parts for P·max output cells, P+1 for one more.
pub fn compute_part_count(n_coarse_cells: u64, n_divs: u32, max_cells_per_part: u64) -> u32 {
    let output_cells = n_coarse_cells * (n_divs as u64).pow(3);
    if output_cells == 0 || max_cells_per_part == 0 {
        return 1;
    }
    let n_parts = (output_cells - 1) / max_cells_per_part + 1;
    n_parts.min(n_coarse_cells).max(1).min(u32::MAX as u64) as u32
}

fn split_recursive(cpd: &mut [CellPartData], first: u32, n_parts: u32, parts: &mut Vec<Part>) {
    if n_parts <= 1 {
        parts.push(Part::new(first, first + cpd.len() as u32));
        return;
    }

    // Axis of maximum centroid spread.
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for cell in cpd.iter() {
        for d in 0..3 {
            lo[d] = lo[d].min(cell.centroid[d]);
            hi[d] = hi[d].max(cell.centroid[d]);
        }
    }
    let mut axis = 0;
    let mut spread = hi[0] - lo[0];
    for d in 1..3 {
        if hi[d] - lo[d] > spread {
            spread = hi[d] - lo[d];
            axis = d;
        }
    }

    let n_low = n_parts / 2;
    let n_high = n_parts - n_low;
    let mid = cpd.len() * n_low as usize / n_parts as usize;
    cpd.select_nth_unstable_by(mid, |a, b| {
        a.centroid[axis]
            .total_cmp(&b.centroid[axis])
            .then(a.cell_type.file_tag().cmp(&b.cell_type.file_tag()))
            .then(a.index.cmp(&b.index))
    });

    let (low, high) = cpd.split_at_mut(mid);
    split_recursive(low, first, n_low, parts);
    split_recursive(high, first + mid as u32, n_high, parts);
}
