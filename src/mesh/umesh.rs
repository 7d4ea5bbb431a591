//! `UMesh`: the concrete mixed-element unstructured mesh container.
//!
//! Coordinates live in one contiguous array; each cell type has its own
//! dense connectivity array of fixed arity. Mutation happens only through
//! the appenders while a mesh is being built; every accessor borrows
//! immutably, so a finished mesh can be shared freely across threads.

use super::{MeshBase, MeshSize};
use crate::error::{ExaMeshError, Result};

/// A mixed tet/pyramid/prism/hex volume mesh with triangle and quad
/// boundary faces and an optional per-vertex length-scale array.
#[derive(Clone, Debug, Default)]
pub struct UMesh {
    coords: Vec<[f64; 3]>,
    len_scale: Vec<f64>,
    bdry_tris: Vec<[u32; 3]>,
    bdry_quads: Vec<[u32; 4]>,
    tets: Vec<[u32; 4]>,
    pyrs: Vec<[u32; 5]>,
    prisms: Vec<[u32; 6]>,
    hexes: Vec<[u32; 8]>,
}

impl UMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the arrays for a refined mesh of the given predicted size.
    pub fn with_capacity(size: &MeshSize) -> Self {
        UMesh {
            coords: Vec::with_capacity(size.n_verts as usize),
            len_scale: Vec::new(),
            bdry_tris: Vec::with_capacity(size.n_bdry_tris as usize),
            bdry_quads: Vec::with_capacity(size.n_bdry_quads as usize),
            tets: Vec::with_capacity(size.n_tets as usize),
            pyrs: Vec::with_capacity(size.n_pyrs as usize),
            prisms: Vec::with_capacity(size.n_prisms as usize),
            hexes: Vec::with_capacity(size.n_hexes as usize),
        }
    }

    /// Append a vertex and return its index.
    pub fn add_vert(&mut self, xyz: [f64; 3]) -> u32 {
        let id = self.coords.len() as u32;
        self.coords.push(xyz);
        id
    }

    pub fn add_bdry_tri(&mut self, conn: [u32; 3]) -> u32 {
        let id = self.bdry_tris.len() as u32;
        self.bdry_tris.push(conn);
        id
    }

    pub fn add_bdry_quad(&mut self, conn: [u32; 4]) -> u32 {
        let id = self.bdry_quads.len() as u32;
        self.bdry_quads.push(conn);
        id
    }

    pub fn add_tet(&mut self, conn: [u32; 4]) -> u32 {
        let id = self.tets.len() as u32;
        self.tets.push(conn);
        id
    }

    pub fn add_pyr(&mut self, conn: [u32; 5]) -> u32 {
        let id = self.pyrs.len() as u32;
        self.pyrs.push(conn);
        id
    }

    pub fn add_prism(&mut self, conn: [u32; 6]) -> u32 {
        let id = self.prisms.len() as u32;
        self.prisms.push(conn);
        id
    }

    pub fn add_hex(&mut self, conn: [u32; 8]) -> u32 {
        let id = self.hexes.len() as u32;
        self.hexes.push(conn);
        id
    }

    /// Attach a per-vertex length-scale array. The array must be parallel
    /// to the vertex array.
    pub fn set_length_scales(&mut self, scales: Vec<f64>) -> Result<()> {
        if scales.len() != self.coords.len() {
            return Err(ExaMeshError::InvalidMesh(format!(
                "length-scale array has {} entries for {} vertices",
                scales.len(),
                self.coords.len()
            )));
        }
        self.len_scale = scales;
        Ok(())
    }

    pub fn has_length_scales(&self) -> bool {
        !self.len_scale.is_empty()
    }

    /// Verify that every connectivity entry points at a real vertex.
    pub fn validate(&self) -> Result<()> {
        let nv = self.coords.len() as u32;
        let check = |conn: &[u32], what: &str, idx: usize| -> Result<()> {
            for &v in conn {
                if v >= nv {
                    return Err(ExaMeshError::InvalidMesh(format!(
                        "{what} {idx} references vertex {v} of {nv}"
                    )));
                }
            }
            Ok(())
        };
        for (i, c) in self.tets.iter().enumerate() {
            check(c, "tet", i)?;
        }
        for (i, c) in self.pyrs.iter().enumerate() {
            check(c, "pyramid", i)?;
        }
        for (i, c) in self.prisms.iter().enumerate() {
            check(c, "prism", i)?;
        }
        for (i, c) in self.hexes.iter().enumerate() {
            check(c, "hex", i)?;
        }
        for (i, c) in self.bdry_tris.iter().enumerate() {
            check(c, "bdry tri", i)?;
        }
        for (i, c) in self.bdry_quads.iter().enumerate() {
            check(c, "bdry quad", i)?;
        }
        Ok(())
    }
}

impl MeshBase for UMesh {
    fn num_verts(&self) -> u32 {
        self.coords.len() as u32
    }

    fn num_bdry_verts(&self) -> u32 {
        // Boundary vertices are the ones referenced by boundary faces.
        let mut seen = vec![false; self.coords.len()];
        for c in &self.bdry_tris {
            for &v in c {
                seen[v as usize] = true;
            }
        }
        for c in &self.bdry_quads {
            for &v in c {
                seen[v as usize] = true;
            }
        }
        seen.iter().filter(|&&s| s).count() as u32
    }

    fn num_bdry_tris(&self) -> u32 {
        self.bdry_tris.len() as u32
    }

    fn num_bdry_quads(&self) -> u32 {
        self.bdry_quads.len() as u32
    }

    fn num_tets(&self) -> u32 {
        self.tets.len() as u32
    }

    fn num_pyramids(&self) -> u32 {
        self.pyrs.len() as u32
    }

    fn num_prisms(&self) -> u32 {
        self.prisms.len() as u32
    }

    fn num_hexes(&self) -> u32 {
        self.hexes.len() as u32
    }

    fn bdry_tri_conn(&self, i: u32) -> &[u32; 3] {
        &self.bdry_tris[i as usize]
    }

    fn bdry_quad_conn(&self, i: u32) -> &[u32; 4] {
        &self.bdry_quads[i as usize]
    }

    fn tet_conn(&self, i: u32) -> &[u32; 4] {
        &self.tets[i as usize]
    }

    fn pyr_conn(&self, i: u32) -> &[u32; 5] {
        &self.pyrs[i as usize]
    }

    fn prism_conn(&self, i: u32) -> &[u32; 6] {
        &self.prisms[i as usize]
    }

    fn hex_conn(&self, i: u32) -> &[u32; 8] {
        &self.hexes[i as usize]
    }

    fn coords(&self, v: u32) -> [f64; 3] {
        self.coords[v as usize]
    }

    fn length_scale(&self, v: u32) -> f64 {
        if self.len_scale.is_empty() {
            1.0
        } else {
            self.len_scale[v as usize]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshBase;

    #[test]
    fn append_and_access() {
        let mut mesh = UMesh::new();
        let v0 = mesh.add_vert([0.0, 0.0, 0.0]);
        let v1 = mesh.add_vert([1.0, 0.0, 0.0]);
        let v2 = mesh.add_vert([0.0, 1.0, 0.0]);
        let v3 = mesh.add_vert([0.0, 0.0, 1.0]);
        assert_eq!((v0, v3), (0, 3));
        mesh.add_tet([v0, v1, v2, v3]);
        mesh.add_bdry_tri([v0, v1, v2]);
        assert_eq!(mesh.num_verts(), 4);
        assert_eq!(mesh.num_tets(), 1);
        assert_eq!(mesh.tet_conn(0), &[0, 1, 2, 3]);
        assert_eq!(mesh.coords(1), [1.0, 0.0, 0.0]);
        assert_eq!(mesh.num_bdry_verts(), 3);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn length_scale_defaults_to_unity() {
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        assert_eq!(mesh.length_scale(0), 1.0);
        mesh.set_length_scales(vec![0.5]).unwrap();
        assert_eq!(mesh.length_scale(0), 0.5);
        assert!(mesh.set_length_scales(vec![0.5, 0.5]).is_err());
    }

    #[test]
    fn validate_catches_bad_connectivity() {
        let mut mesh = UMesh::new();
        mesh.add_vert([0.0, 0.0, 0.0]);
        mesh.add_tet([0, 1, 2, 3]);
        assert!(mesh.validate().is_err());
    }
}
