//! Mesh containers and per-vertex data.
//!
//! The refinement core never reads files itself; it consumes any coarse mesh
//! through the read-only [`MeshBase`] accessor contract and produces fine
//! meshes in the concrete [`UMesh`] container.

mod cell_type;
pub mod length_scale;
mod size;
mod umesh;

pub use cell_type::CellType;
pub use size::{compute_mesh_size, MeshSize};
pub use umesh::UMesh;

/// Read-only accessor contract for a volume mesh.
///
/// Connectivity is dense per cell type and vertex identity is the index into
/// the coordinate array. Implementations must be immutable for the lifetime
/// of a refinement run; concurrent readers see a consistent snapshot.
pub trait MeshBase {
    fn num_verts(&self) -> u32;
    fn num_bdry_verts(&self) -> u32;
    fn num_bdry_tris(&self) -> u32;
    fn num_bdry_quads(&self) -> u32;
    fn num_tets(&self) -> u32;
    fn num_pyramids(&self) -> u32;
    fn num_prisms(&self) -> u32;
    fn num_hexes(&self) -> u32;

    fn bdry_tri_conn(&self, i: u32) -> &[u32; 3];
    fn bdry_quad_conn(&self, i: u32) -> &[u32; 4];
    fn tet_conn(&self, i: u32) -> &[u32; 4];
    fn pyr_conn(&self, i: u32) -> &[u32; 5];
    fn prism_conn(&self, i: u32) -> &[u32; 6];
    fn hex_conn(&self, i: u32) -> &[u32; 8];

    fn coords(&self, v: u32) -> [f64; 3];

    /// Per-vertex characteristic length. Implementations without length
    /// scales return 1.0, which degrades the length-scale map to uniform
    /// spacing.
    fn length_scale(&self, v: u32) -> f64;

    /// Total volume-cell count across all shapes.
    fn num_cells(&self) -> u64 {
        self.num_tets() as u64
            + self.num_pyramids() as u64
            + self.num_prisms() as u64
            + self.num_hexes() as u64
    }

    /// Coarse cell counts packaged for [`compute_mesh_size`].
    fn mesh_size(&self) -> MeshSize {
        MeshSize {
            n_verts: self.num_verts() as u64,
            n_bdry_verts: self.num_bdry_verts() as u64,
            n_bdry_tris: self.num_bdry_tris() as u64,
            n_bdry_quads: self.num_bdry_quads() as u64,
            n_tets: self.num_tets() as u64,
            n_pyrs: self.num_pyramids() as u64,
            n_prisms: self.num_prisms() as u64,
            n_hexes: self.num_hexes() as u64,
        }
    }

    /// Log a size report for the mesh.
    fn log_size_stats(&self) {
        log::info!(
            "mesh: {} verts, {} bdry tris, {} bdry quads, {} tets, {} pyramids, {} prisms, {} hexes ({} cells total)",
            self.num_verts(),
            self.num_bdry_tris(),
            self.num_bdry_quads(),
            self.num_tets(),
            self.num_pyramids(),
            self.num_prisms(),
            self.num_hexes(),
            self.num_cells(),
        );
    }
}
