//! Refined mesh size prediction.
//!
//! [`compute_mesh_size`] is a pure computation from coarse counts and the
//! subdivision factor. Cell and boundary-face counts are exact; the vertex
//! count is the per-cell lattice bound, which is what the fine-mesh builder
//! reserves and what the index-range check is run against. Shared edge and
//! face vertices make the actual count lower, never higher.

use crate::error::{ExaMeshError, Result};
use crate::MAX_DIVS;

/// Entity counts for a mixed-element mesh. Stored as `u64` so that refined
/// counts can be computed without intermediate overflow; the index-range
/// check against `u32` happens in [`compute_mesh_size`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshSize {
    pub n_verts: u64,
    pub n_bdry_verts: u64,
    pub n_bdry_tris: u64,
    pub n_bdry_quads: u64,
    pub n_tets: u64,
    pub n_pyrs: u64,
    pub n_prisms: u64,
    pub n_hexes: u64,
}

impl MeshSize {
    /// Total volume cell count.
    pub fn n_cells(&self) -> u64 {
        self.n_tets + self.n_pyrs + self.n_prisms + self.n_hexes
    }
}

/// Number of fine tets a single coarse pyramid sheds (the gap-filling tets
/// between same-layer pyramids).
pub(crate) fn pyr_tets_per_pyr(n: u64) -> u64 {
    2 * n * (n + 1) * (n - 1) / 3
}

/// Number of fine pyramids per coarse pyramid: upward pyramids on every
/// layer plus the inverted ones between layers.
pub(crate) fn pyrs_per_pyr(n: u64) -> u64 {
    n * (n + 1) * (2 * n + 1) / 6 + (n - 1) * n * (2 * n - 1) / 6
}

fn check_u32(value: u64, what: &'static str) -> Result<u64> {
    if value > u32::MAX as u64 {
        Err(ExaMeshError::SizeOverflow(what))
    } else {
        Ok(value)
    }
}

/// Derive the refined counts from the coarse counts and the subdivision
/// factor. Fails with [`ExaMeshError::SizeOverflow`] when any count would
/// exceed the `u32` index range, and with [`ExaMeshError::BadSubdivision`]
/// when `n_divs` is outside `1..=MAX_DIVS`.
pub fn compute_mesh_size(input: &MeshSize, n_divs: u32) -> Result<MeshSize> {
    if n_divs < 1 || n_divs > MAX_DIVS {
        return Err(ExaMeshError::BadSubdivision(n_divs));
    }
    let n = n_divs as u64;
    let n3 = n * n * n;

    // Per-cell full lattice counts; summed they bound the fine vertex total.
    let tet_lattice = (n + 1) * (n + 2) * (n + 3) / 6;
    let pyr_lattice = (n + 1) * (n + 2) * (2 * n + 3) / 6;
    let prism_lattice = (n + 1) * (n + 1) * (n + 2) / 2;
    let hex_lattice = (n + 1) * (n + 1) * (n + 1);

    let n_verts = check_u32(
        input.n_verts
            + input.n_tets * (tet_lattice - 4)
            + input.n_pyrs * (pyr_lattice - 5)
            + input.n_prisms * (prism_lattice - 6)
            + input.n_hexes * (hex_lattice - 8),
        "vertex count",
    )?;

    let n_bdry_verts = check_u32(
        input.n_bdry_verts
            + input.n_bdry_tris * ((n + 1) * (n + 2) / 2 - 3)
            + input.n_bdry_quads * ((n + 1) * (n + 1) - 4),
        "boundary vertex count",
    )?;

    let out = MeshSize {
        n_verts,
        n_bdry_verts,
        n_bdry_tris: check_u32(input.n_bdry_tris * n * n, "boundary tri count")?,
        n_bdry_quads: check_u32(input.n_bdry_quads * n * n, "boundary quad count")?,
        n_tets: check_u32(
            input.n_tets * n3 + input.n_pyrs * pyr_tets_per_pyr(n),
            "tet count",
        )?,
        n_pyrs: check_u32(input.n_pyrs * pyrs_per_pyr(n), "pyramid count")?,
        n_prisms: check_u32(input.n_prisms * n3, "prism count")?,
        n_hexes: check_u32(input.n_hexes * n3, "hex count")?,
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_for_one_division() {
        let input = MeshSize {
            n_verts: 100,
            n_bdry_verts: 40,
            n_bdry_tris: 20,
            n_bdry_quads: 10,
            n_tets: 50,
            n_pyrs: 5,
            n_prisms: 8,
            n_hexes: 12,
        };
        let out = compute_mesh_size(&input, 1).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn single_tet_counts() {
        let input = MeshSize {
            n_verts: 4,
            n_tets: 1,
            ..Default::default()
        };
        let out = compute_mesh_size(&input, 2).unwrap();
        assert_eq!(out.n_tets, 8);
        // Full tet lattice for N=2 is 10 points.
        assert_eq!(out.n_verts, 10);
    }

    #[test]
    fn pyramid_volume_equivalence() {
        // A pyramid's fine cells must fill N^3 pyramid-volume units, with
        // each gap tet counting for half a pyramid.
        for n in 1..=6u64 {
            assert_eq!(
                pyrs_per_pyr(n) * 2 + pyr_tets_per_pyr(n),
                2 * n * n * n,
                "n = {n}"
            );
        }
    }

    #[test]
    fn overflow_is_reported() {
        let input = MeshSize {
            n_verts: 4_000_000,
            n_hexes: 4_000_000,
            ..Default::default()
        };
        assert!(matches!(
            compute_mesh_size(&input, 50),
            Err(ExaMeshError::SizeOverflow(_))
        ));
    }

    #[test]
    fn bad_factor_is_rejected() {
        let input = MeshSize::default();
        assert!(matches!(
            compute_mesh_size(&input, 0),
            Err(ExaMeshError::BadSubdivision(0))
        ));
        assert!(matches!(
            compute_mesh_size(&input, 51),
            Err(ExaMeshError::BadSubdivision(51))
        ));
    }
}
