//! # examesh
//!
//! examesh uniformly refines mixed-element unstructured volume meshes
//! (tetrahedra, pyramids, prisms, hexahedra): every coarse cell is
//! subdivided N times along each edge, with new vertex positions taken
//! from a per-cell curvilinear map. The refined mesh can be produced in
//! parts so that large cases are generated in parallel, and vertices
//! duplicated across partition boundaries are identified afterwards so a
//! consumer can stitch the parts back into a conforming global mesh.
//!
//! ## Pipeline
//!
//! 1. Per-vertex length scales are estimated from incident cell volumes
//!    and solid angles ([`mesh::length_scale`]).
//! 2. Cells are grouped into parts by recursive coordinate bisection
//!    ([`partition`]).
//! 3. Each part's coarse sub-mesh is extracted and refined; shared edges
//!    and faces are reconciled through canonical sorted-key registries
//!    ([`refine`]).
//! 4. Partition-boundary vertices are gathered, sorted, and reduced to
//!    duplicate groups ([`parallel`]).
//!
//! ## Features
//! - `rayon` (default): parallel sorting of the reconciliation buffer.
//! - `mpi-support`: the `MpiComm` backend for distributed runs.

pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod parallel;
pub mod partition;
pub mod refine;

/// Compile-time bound on the subdivision factor. Face-interior grids and
/// edge runs are sized against this limit.
pub const MAX_DIVS: u32 = 50;

/// The most-used types and entry points.
pub mod prelude {
    pub use crate::error::{ExaMeshError, Result};
    pub use crate::io::OutputFormat;
    pub use crate::mesh::length_scale::compute_length_scales;
    pub use crate::mesh::{compute_mesh_size, CellType, MeshBase, MeshSize, UMesh};
    pub use crate::parallel::{
        refine_for_parallel, refine_with_comm, Communicator, NoComm, RayonComm, RefineConfig,
        RefineStats,
    };
    pub use crate::partition::{compute_part_count, partition_cells, CellPartData, Part};
    pub use crate::refine::{refine_mesh, MappingType};
    pub use crate::MAX_DIVS;
}
