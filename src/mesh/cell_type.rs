//! Cell type tags for the shapes this crate meshes.

/// The element shapes supported by the refinement engine, plus the two
/// boundary face shapes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CellType {
    /// 2D boundary triangle.
    Triangle,
    /// 2D boundary quad.
    Quadrilateral,
    /// 4-vertex simplex.
    Tetrahedron,
    /// 5-vertex quad-based pyramid (vertex 4 is the apex).
    Pyramid,
    /// 6-vertex triangular prism.
    Prism,
    /// 8-vertex hexahedron.
    Hexahedron,
}

impl CellType {
    /// Number of corner vertices.
    pub fn vertex_count(self) -> usize {
        match self {
            CellType::Triangle => 3,
            CellType::Quadrilateral => 4,
            CellType::Tetrahedron => 4,
            CellType::Pyramid => 5,
            CellType::Prism => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// The linear element tag used in external records (CGNS numbering).
    pub fn file_tag(self) -> u32 {
        match self {
            CellType::Triangle => 5,
            CellType::Quadrilateral => 7,
            CellType::Tetrahedron => 10,
            CellType::Pyramid => 12,
            CellType::Prism => 14,
            CellType::Hexahedron => 17,
        }
    }

    /// The cubic (high-order) element tag used in external records.
    pub fn cubic_file_tag(self) -> u32 {
        match self {
            CellType::Triangle => 26,
            CellType::Quadrilateral => 28,
            CellType::Tetrahedron => 30,
            CellType::Pyramid => 33,
            CellType::Prism => 36,
            CellType::Hexahedron => 39,
        }
    }

    /// True for the three-dimensional shapes.
    pub fn is_volume(self) -> bool {
        !matches!(self, CellType::Triangle | CellType::Quadrilateral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_external_numbering() {
        assert_eq!(CellType::Tetrahedron.file_tag(), 10);
        assert_eq!(CellType::Pyramid.file_tag(), 12);
        assert_eq!(CellType::Prism.file_tag(), 14);
        assert_eq!(CellType::Hexahedron.file_tag(), 17);
        assert_eq!(CellType::Hexahedron.cubic_file_tag(), 39);
    }

    #[test]
    fn arity() {
        assert_eq!(CellType::Tetrahedron.vertex_count(), 4);
        assert_eq!(CellType::Pyramid.vertex_count(), 5);
        assert_eq!(CellType::Prism.vertex_count(), 6);
        assert_eq!(CellType::Hexahedron.vertex_count(), 8);
        assert!(!CellType::Triangle.is_volume());
    }
}
