//! Legacy ASCII VTK (`.vtk`) writer and reader for `UMesh`.
//!
//! Targets `DATASET UNSTRUCTURED_GRID`. Boundary faces are written as
//! triangle/quad cells ahead of the volume cells, so a written mesh can be
//! read back into an identical `UMesh`. VTK cell type numbering: 5 tri,
//! 9 quad, 10 tet, 12 hex, 13 wedge, 14 pyramid.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ExaMeshError, Result};
use crate::mesh::{MeshBase, UMesh};

const VTK_TRI: u32 = 5;
const VTK_QUAD: u32 = 9;
const VTK_TET: u32 = 10;
const VTK_HEX: u32 = 12;
const VTK_WEDGE: u32 = 13;
const VTK_PYRAMID: u32 = 14;

/// Write the mesh as a legacy ASCII VTK unstructured grid.
pub fn write_vtk(mesh: &UMesh, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# vtk DataFile Version 3.0")?;
    writeln!(out, "examesh refined mesh")?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(out, "POINTS {} double", mesh.num_verts())?;
    for v in 0..mesh.num_verts() {
        let [x, y, z] = mesh.coords(v);
        writeln!(out, "{x} {y} {z}")?;
    }

    let n_cells = mesh.num_bdry_tris() as usize
        + mesh.num_bdry_quads() as usize
        + mesh.num_tets() as usize
        + mesh.num_pyramids() as usize
        + mesh.num_prisms() as usize
        + mesh.num_hexes() as usize;
    let total_size = 4 * mesh.num_bdry_tris() as usize
        + 5 * mesh.num_bdry_quads() as usize
        + 5 * mesh.num_tets() as usize
        + 6 * mesh.num_pyramids() as usize
        + 7 * mesh.num_prisms() as usize
        + 9 * mesh.num_hexes() as usize;

    writeln!(out, "CELLS {n_cells} {total_size}")?;
    let mut write_conn = |conn: &[u32]| -> Result<()> {
        write!(out, "{}", conn.len())?;
        for &v in conn {
            write!(out, " {v}")?;
        }
        writeln!(out)?;
        Ok(())
    };
    for i in 0..mesh.num_bdry_tris() {
        write_conn(mesh.bdry_tri_conn(i))?;
    }
    for i in 0..mesh.num_bdry_quads() {
        write_conn(mesh.bdry_quad_conn(i))?;
    }
    for i in 0..mesh.num_tets() {
        write_conn(mesh.tet_conn(i))?;
    }
    for i in 0..mesh.num_pyramids() {
        write_conn(mesh.pyr_conn(i))?;
    }
    for i in 0..mesh.num_prisms() {
        write_conn(mesh.prism_conn(i))?;
    }
    for i in 0..mesh.num_hexes() {
        write_conn(mesh.hex_conn(i))?;
    }

    writeln!(out, "CELL_TYPES {n_cells}")?;
    for _ in 0..mesh.num_bdry_tris() {
        writeln!(out, "{VTK_TRI}")?;
    }
    for _ in 0..mesh.num_bdry_quads() {
        writeln!(out, "{VTK_QUAD}")?;
    }
    for _ in 0..mesh.num_tets() {
        writeln!(out, "{VTK_TET}")?;
    }
    for _ in 0..mesh.num_pyramids() {
        writeln!(out, "{VTK_PYRAMID}")?;
    }
    for _ in 0..mesh.num_prisms() {
        writeln!(out, "{VTK_WEDGE}")?;
    }
    for _ in 0..mesh.num_hexes() {
        writeln!(out, "{VTK_HEX}")?;
    }
    out.flush()?;
    Ok(())
}

fn parse_err(what: impl Into<String>) -> ExaMeshError {
    ExaMeshError::InvalidMesh(what.into())
}

/// Read a legacy ASCII VTK unstructured grid into a `UMesh`.
///
/// Supports the subset [`write_vtk`] emits: one `POINTS` block followed by
/// `CELLS` and `CELL_TYPES` with the six supported cell types.
pub fn read_vtk(path: &Path) -> Result<UMesh> {
    let reader = BufReader::new(File::open(path)?);
    let mut tokens: Vec<String> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        tokens.extend(line.split_whitespace().map(str::to_owned));
    }

    let mut pos = 0;
    let mut next = |what: &str| -> Result<String> {
        let token = tokens
            .get(pos)
            .ok_or_else(|| parse_err(format!("unexpected end of VTK file at {what}")))?;
        pos += 1;
        Ok(token.clone())
    };

    // Skip forward to POINTS.
    loop {
        let token = next("POINTS")?;
        if token == "POINTS" {
            break;
        }
    }
    let n_points: usize = next("point count")?
        .parse()
        .map_err(|_| parse_err("bad point count"))?;
    let _data_type = next("point data type")?;

    let mut mesh = UMesh::new();
    for _ in 0..n_points {
        let mut xyz = [0.0; 3];
        for coord in xyz.iter_mut() {
            *coord = next("coordinate")?
                .parse()
                .map_err(|_| parse_err("bad coordinate"))?;
        }
        mesh.add_vert(xyz);
    }

    if next("CELLS")? != "CELLS" {
        return Err(parse_err("expected CELLS"));
    }
    let n_cells: usize = next("cell count")?
        .parse()
        .map_err(|_| parse_err("bad cell count"))?;
    let _total_size = next("cell list size")?;

    let mut conns: Vec<Vec<u32>> = Vec::with_capacity(n_cells);
    for _ in 0..n_cells {
        let arity: usize = next("cell arity")?
            .parse()
            .map_err(|_| parse_err("bad cell arity"))?;
        let mut conn = Vec::with_capacity(arity);
        for _ in 0..arity {
            conn.push(
                next("cell vertex")?
                    .parse()
                    .map_err(|_| parse_err("bad cell vertex"))?,
            );
        }
        conns.push(conn);
    }

    if next("CELL_TYPES")? != "CELL_TYPES" {
        return Err(parse_err("expected CELL_TYPES"));
    }
    let n_types: usize = next("cell type count")?
        .parse()
        .map_err(|_| parse_err("bad cell type count"))?;
    if n_types != n_cells {
        return Err(parse_err("CELL_TYPES count does not match CELLS"));
    }

    for conn in conns {
        let cell_type: u32 = next("cell type")?
            .parse()
            .map_err(|_| parse_err("bad cell type"))?;
        match (cell_type, conn.len()) {
            (VTK_TRI, 3) => {
                mesh.add_bdry_tri([conn[0], conn[1], conn[2]]);
            }
            (VTK_QUAD, 4) => {
                mesh.add_bdry_quad([conn[0], conn[1], conn[2], conn[3]]);
            }
            (VTK_TET, 4) => {
                mesh.add_tet([conn[0], conn[1], conn[2], conn[3]]);
            }
            (VTK_PYRAMID, 5) => {
                mesh.add_pyr([conn[0], conn[1], conn[2], conn[3], conn[4]]);
            }
            (VTK_WEDGE, 6) => {
                mesh.add_prism([conn[0], conn[1], conn[2], conn[3], conn[4], conn[5]]);
            }
            (VTK_HEX, 8) => {
                mesh.add_hex([
                    conn[0], conn[1], conn[2], conn[3], conn[4], conn[5], conn[6], conn[7],
                ]);
            }
            (t, a) => {
                return Err(parse_err(format!(
                    "unsupported VTK cell type {t} with {a} vertices"
                )));
            }
        }
    }

    mesh.validate()?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_round_trip() {
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_vert([1.0, 0.0, 0.0]);
        mesh.add_vert([0.0, 1.0, 0.0]);
        mesh.add_vert([0.0, 0.0, 1.0]);
        mesh.add_vert([0.25, 0.25, -1.0]);
        mesh.add_tet([0, 1, 2, 3]);
        mesh.add_tet([1, 0, 2, 4]);
        mesh.add_bdry_tri([0, 1, 3]);

        let path = std::env::temp_dir().join("examesh-vtk-round-trip.vtk");
        write_vtk(&mesh, &path).unwrap();
        let back = read_vtk(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.num_verts(), mesh.num_verts());
        assert_eq!(back.num_tets(), mesh.num_tets());
        assert_eq!(back.num_bdry_tris(), mesh.num_bdry_tris());
        for v in 0..mesh.num_verts() {
            assert_eq!(back.coords(v), mesh.coords(v));
        }
        for t in 0..mesh.num_tets() {
            assert_eq!(back.tet_conn(t), mesh.tet_conn(t));
        }
        assert_eq!(back.bdry_tri_conn(0), mesh.bdry_tri_conn(0));
    }
}
