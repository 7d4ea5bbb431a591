//! Mesh file writers (and a VTK reader for round-trip testing).
//!
//! The refinement core consumes meshes through the accessor contract;
//! these writers exist so the drivers can emit one file per part without
//! an external collaborator in the loop.

pub mod ugrid;
pub mod vtk;

use std::path::Path;

use crate::error::Result;
use crate::mesh::UMesh;

/// Output format for fine sub-mesh files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    Vtk,
    Ugrid,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Vtk => "vtk",
            OutputFormat::Ugrid => "ugrid",
        }
    }
}

/// Write a mesh in the chosen format.
pub fn write_mesh(mesh: &UMesh, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Vtk => vtk::write_vtk(mesh, path),
        OutputFormat::Ugrid => ugrid::write_ugrid(mesh, path),
    }
}
