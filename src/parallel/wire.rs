//! Fixed little-endian wire record for partition-boundary vertices.

use bytemuck::{Pod, Zeroable};
use std::cmp::Ordering;
use std::mem::{align_of, size_of};

/// A refined vertex on a partition boundary: 32-bit vertex and partition
/// IDs plus the three coordinates. Multi-byte integers are little-endian
/// on the wire; coordinates are native f64 (exchanged homogeneous-endian).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireBdryVert {
    vert_le: i32,
    part_le: i32,
    coord: [f64; 3],
}

impl WireBdryVert {
    pub fn new(vert: u32, part: u32, coord: [f64; 3]) -> Self {
        WireBdryVert {
            vert_le: (vert as i32).to_le(),
            part_le: (part as i32).to_le(),
            coord,
        }
    }

    pub fn vert(&self) -> u32 {
        i32::from_le(self.vert_le) as u32
    }

    pub fn part(&self) -> u32 {
        i32::from_le(self.part_le) as u32
    }

    pub fn coord(&self) -> [f64; 3] {
        self.coord
    }

    /// Total lexicographic order on (x, y, z), with partition and vertex
    /// IDs as tie-breaks so sorting is deterministic.
    pub fn cmp_coords(&self, other: &Self) -> Ordering {
        self.coord[0]
            .total_cmp(&other.coord[0])
            .then(self.coord[1].total_cmp(&other.coord[1]))
            .then(self.coord[2].total_cmp(&other.coord[2]))
            .then(self.part().cmp(&other.part()))
            .then(self.vert().cmp(&other.vert()))
    }

    /// Records are identical when they come from different partitions and
    /// all three coordinates agree within `eps`.
    pub fn identical(&self, other: &Self, eps: f64) -> bool {
        self.part() != other.part() && self.coords_close(other, eps)
    }

    /// Coordinate agreement alone, ignoring ownership.
    pub fn coords_close(&self, other: &Self, eps: f64) -> bool {
        (0..3).all(|d| (self.coord[d] - other.coord[d]).abs() < eps)
    }
}

const _: () = {
    assert!(size_of::<WireBdryVert>() == 32);
    assert!(align_of::<WireBdryVert>() == 8);
};

/// MPI structured datatype with explicit offsets, mirroring the record
/// layout: two int32 fields then three float64 coordinates.
#[cfg(feature = "mpi-support")]
unsafe impl mpi::datatype::Equivalence for WireBdryVert {
    type Out = mpi::datatype::UserDatatype;

    fn equivalent_datatype() -> Self::Out {
        use mpi::datatype::UserDatatype;
        UserDatatype::structured(
            &[1, 1, 3],
            &[
                std::mem::offset_of!(WireBdryVert, vert_le) as mpi::Address,
                std::mem::offset_of!(WireBdryVert, part_le) as mpi::Address,
                std::mem::offset_of!(WireBdryVert, coord) as mpi::Address,
            ],
            &[
                &i32::equivalent_datatype(),
                &i32::equivalent_datatype(),
                &f64::equivalent_datatype(),
            ],
        )
    }
}
