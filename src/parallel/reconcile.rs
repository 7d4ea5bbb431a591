//! Cross-partition identification of coincident refined vertices.
//!
//! The coordinator sorts the gathered partition-boundary records with a
//! single lexicographic comparator over (x, y, z), equivalent to (and
//! cheaper than) three successive stable sorts, then scans for runs of
//! coordinate-coincident records. A run is a duplicate group when it spans
//! at least two partitions; the first line of a group is the
//! representative, the rest are its aliases.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::parallel::wire::WireBdryVert;

/// Sort the gathered buffer lexicographically by (x, y, z), breaking ties
/// on partition and vertex ID so the result is deterministic.
pub fn sort_buffer(buffer: &mut [WireBdryVert]) {
    #[cfg(feature = "rayon")]
    {
        use rayon::slice::ParallelSliceMut;
        buffer.par_sort_unstable_by(WireBdryVert::cmp_coords);
    }
    #[cfg(not(feature = "rayon"))]
    buffer.sort_unstable_by(WireBdryVert::cmp_coords);
}

/// Scan a sorted buffer for duplicate groups and return them flattened,
/// group by group.
///
/// Records belong to the same group when their coordinates agree within
/// `eps` pairwise along the run; a group is emitted only when it contains
/// records from at least two different partitions.
pub fn find_identical_verts(sorted: &[WireBdryVert], eps: f64) -> Vec<WireBdryVert> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len() && sorted[end - 1].coords_close(&sorted[end], eps) {
            end += 1;
        }
        let group = &sorted[start..end];
        let first_part = group[0].part();
        if group.iter().any(|r| r.part() != first_part) {
            out.extend_from_slice(group);
        }
        start = end;
    }
    out
}

/// Write a duplicate-group listing: `partID  vertexID  x  y  z`.
pub fn write_identical_verts(path: &Path, records: &[WireBdryVert]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for r in records {
        let [x, y, z] = r.coord();
        writeln!(out, "{}   {}   {}   {}   {}", r.part(), r.vert(), x, y, z)?;
    }
    out.flush()?;
    Ok(())
}

/// Dump a whole record buffer in the same column format, for debugging
/// reconciliation runs.
pub fn write_buffer(path: &Path, records: &[WireBdryVert]) -> Result<()> {
    write_identical_verts(path, records)
}
