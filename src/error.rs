//! ExaMeshError: unified error type for examesh public APIs.
//!
//! Every fallible operation in the crate reports through this enum so that
//! callers (including the CLI) can map failures to exit codes without string
//! matching.

use crate::mesh::CellType;
use thiserror::Error;

/// Unified error type for examesh operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExaMeshError {
    /// The refined mesh would not fit in the 32-bit index space.
    #[error("refined mesh size overflows the index type ({0} would exceed u32::MAX)")]
    SizeOverflow(&'static str),
    /// Subdivision factor outside the supported range.
    #[error("subdivision factor {0} not in 1..={max}", max = crate::MAX_DIVS)]
    BadSubdivision(u32),
    /// A cell with non-positive volume or solid angle, or a collapsed face.
    #[error("degenerate geometry in {cell_type:?} {cell}: {what}")]
    DegenerateGeometry {
        cell_type: CellType,
        cell: u32,
        what: &'static str,
    },
    /// Connectivity references a vertex that does not exist, or similar.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    /// Underlying I/O failure while writing or reading mesh files.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExaMeshError {
    fn from(e: std::io::Error) -> Self {
        ExaMeshError::Io(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExaMeshError>;
