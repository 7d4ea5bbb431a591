//! ASCII UGRID (`.ugrid`) writer for `UMesh`.
//!
//! Header counts are `nVerts nTris nQuads nTets nPyramids nPrisms nHexes`,
//! followed by coordinates, surface faces with their surface IDs, and the
//! volume cells. Indices are 1-based per the format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::mesh::{MeshBase, UMesh};

/// Write the mesh as an ASCII UGRID file. All surface faces get surface
/// ID 1; the refinement pipeline does not track patch IDs.
pub fn write_ugrid(mesh: &UMesh, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(
        out,
        "{} {} {} {} {} {} {}",
        mesh.num_verts(),
        mesh.num_bdry_tris(),
        mesh.num_bdry_quads(),
        mesh.num_tets(),
        mesh.num_pyramids(),
        mesh.num_prisms(),
        mesh.num_hexes(),
    )?;

    for v in 0..mesh.num_verts() {
        let [x, y, z] = mesh.coords(v);
        writeln!(out, "{x} {y} {z}")?;
    }

    for i in 0..mesh.num_bdry_tris() {
        write_conn(&mut out, mesh.bdry_tri_conn(i))?;
    }
    for i in 0..mesh.num_bdry_quads() {
        write_conn(&mut out, mesh.bdry_quad_conn(i))?;
    }
    for _ in 0..mesh.num_bdry_tris() + mesh.num_bdry_quads() {
        writeln!(out, "1")?;
    }
    for i in 0..mesh.num_tets() {
        write_conn(&mut out, mesh.tet_conn(i))?;
    }
    for i in 0..mesh.num_pyramids() {
        write_conn(&mut out, mesh.pyr_conn(i))?;
    }
    for i in 0..mesh.num_prisms() {
        write_conn(&mut out, mesh.prism_conn(i))?;
    }
    for i in 0..mesh.num_hexes() {
        write_conn(&mut out, mesh.hex_conn(i))?;
    }
    out.flush()?;
    Ok(())
}

fn write_conn<W: Write>(out: &mut W, conn: &[u32]) -> Result<()> {
    let mut sep = "";
    for &v in conn {
        write!(out, "{sep}{}", v + 1)?;
        sep = " ";
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_one_based_indices() {
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 0.0, 0.0]);
        mesh.add_vert([0.0, 1.0, 0.0]);
        mesh.add_vert([0.0, 0.0, 1.0]);
        mesh.add_tet([0, 1, 2, 3]);
        mesh.add_bdry_tri([0, 1, 2]);

        let path = std::env::temp_dir().join("examesh-ugrid-writer-test.ugrid");
        write_ugrid(&mesh, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "4 1 0 1 0 0 0");
        // Four coordinate lines, the tri conn, its surface id, the tet.
        let body: Vec<&str> = lines.collect();
        assert_eq!(body.len(), 7);
        assert_eq!(body[4], "1 2 3");
        assert_eq!(body[5], "1");
        assert_eq!(body[6], "1 2 3 4");
    }
}
