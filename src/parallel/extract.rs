//! Coarse sub-mesh extraction for one partition.
//!
//! The part's cells are copied with densely renumbered vertices and the
//! global length scales carried over. Input boundary faces attached to
//! part cells survive as boundary faces; every other cell face with no
//! neighbour inside the part is materialised as a *partition face*: the
//! surface along which this part must later be reconciled with its
//! siblings.

use hashbrown::{HashMap, HashSet};

use crate::error::Result;
use crate::mesh::{CellType, MeshBase, UMesh};
use crate::partition::{CellPartData, Part};
use crate::refine::divider::ShapeTables;

/// One partition's coarse sub-mesh plus its partition faces (local vertex
/// numbering).
pub struct PartMesh {
    pub mesh: UMesh,
    /// Part-local vertex index to global coarse vertex index.
    pub to_global: Vec<u32>,
    /// Partition faces: cell faces with no in-part neighbour that are not
    /// input boundary faces.
    pub part_tris: Vec<[u32; 3]>,
    pub part_quads: Vec<[u32; 4]>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum FaceKey {
    Tri([u32; 3]),
    Quad([u32; 4]),
}

fn tri_key(mut v: [u32; 3]) -> FaceKey {
    v.sort_unstable();
    FaceKey::Tri(v)
}

fn quad_key(mut v: [u32; 4]) -> FaceKey {
    v.sort_unstable();
    FaceKey::Quad(v)
}

enum LocalFace {
    Tri([u32; 3]),
    Quad([u32; 4]),
}

/// Face census over the part's cells: occurrence counts plus first-seen
/// order, so the partition-face output is deterministic.
#[derive(Default)]
struct FaceCensus {
    count: HashMap<FaceKey, u32>,
    in_order: Vec<(FaceKey, LocalFace)>,
}

impl FaceCensus {
    fn note(&mut self, key: FaceKey, local: LocalFace) {
        let count = self.count.entry(key).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.in_order.push((key, local));
        }
    }
}

/// Dense renumbering: global vertex to part-local vertex, appending new
/// vertices on first touch.
struct VertRemap {
    to_global: Vec<u32>,
    global_to_local: HashMap<u32, u32>,
}

impl VertRemap {
    fn new() -> Self {
        VertRemap {
            to_global: Vec::new(),
            global_to_local: HashMap::new(),
        }
    }

    fn local<M: MeshBase>(&mut self, mesh: &M, sub: &mut UMesh, v: u32) -> u32 {
        if let Some(&id) = self.global_to_local.get(&v) {
            return id;
        }
        let id = sub.add_vert(mesh.coords(v));
        self.global_to_local.insert(v, id);
        self.to_global.push(v);
        id
    }
}

fn cell_tables(cell_type: CellType) -> &'static ShapeTables {
    match cell_type {
        CellType::Tetrahedron => &crate::refine::tet::TET_TABLES,
        CellType::Pyramid => &crate::refine::pyr::PYR_TABLES,
        CellType::Prism => &crate::refine::prism::PRISM_TABLES,
        CellType::Hexahedron => &crate::refine::hex::HEX_TABLES,
        CellType::Triangle | CellType::Quadrilateral => {
            unreachable!("boundary faces are not partitioned cells")
        }
    }
}

/// Extract the coarse sub-mesh for `part`. `scales` is the global
/// per-vertex length-scale array, carried into the sub-mesh.
pub fn extract_part_mesh<M: MeshBase>(
    mesh: &M,
    scales: &[f64],
    part: &Part,
    cpd: &[CellPartData],
) -> Result<PartMesh> {
    // A deterministic cell order regardless of how the partitioner
    // scrambled the range: by type, then by index.
    let mut cells: Vec<CellPartData> =
        cpd[part.first() as usize..part.last() as usize].to_vec();
    cells.sort_unstable_by_key(|c| (c.cell_type.file_tag(), c.index));

    let mut sub = UMesh::new();
    let mut remap = VertRemap::new();
    let mut census = FaceCensus::default();

    for cell in &cells {
        let globals: Vec<u32> = match cell.cell_type {
            CellType::Tetrahedron => mesh.tet_conn(cell.index).to_vec(),
            CellType::Pyramid => mesh.pyr_conn(cell.index).to_vec(),
            CellType::Prism => mesh.prism_conn(cell.index).to_vec(),
            CellType::Hexahedron => mesh.hex_conn(cell.index).to_vec(),
            CellType::Triangle | CellType::Quadrilateral => unreachable!(),
        };
        let locals: Vec<u32> = globals
            .iter()
            .map(|&v| remap.local(mesh, &mut sub, v))
            .collect();

        match cell.cell_type {
            CellType::Tetrahedron => {
                sub.add_tet([locals[0], locals[1], locals[2], locals[3]]);
            }
            CellType::Pyramid => {
                sub.add_pyr([locals[0], locals[1], locals[2], locals[3], locals[4]]);
            }
            CellType::Prism => {
                sub.add_prism([
                    locals[0], locals[1], locals[2], locals[3], locals[4], locals[5],
                ]);
            }
            CellType::Hexahedron => {
                sub.add_hex([
                    locals[0], locals[1], locals[2], locals[3], locals[4], locals[5],
                    locals[6], locals[7],
                ]);
            }
            _ => unreachable!(),
        }

        let tables = cell_tables(cell.cell_type);
        for f in tables.tri_faces {
            census.note(
                tri_key([globals[f[0]], globals[f[1]], globals[f[2]]]),
                LocalFace::Tri([locals[f[0]], locals[f[1]], locals[f[2]]]),
            );
        }
        for f in tables.quad_faces {
            census.note(
                quad_key([globals[f[0]], globals[f[1]], globals[f[2]], globals[f[3]]]),
                LocalFace::Quad([locals[f[0]], locals[f[1]], locals[f[2]], locals[f[3]]]),
            );
        }
    }

    // Carry the length scales across.
    let local_scales: Vec<f64> = remap
        .to_global
        .iter()
        .map(|&v| scales[v as usize])
        .collect();
    sub.set_length_scales(local_scales)?;

    // Input boundary faces owned by this part's cells.
    let mut input_bdry: HashSet<FaceKey> = HashSet::new();
    for f in 0..mesh.num_bdry_tris() {
        let g = *mesh.bdry_tri_conn(f);
        let key = tri_key(g);
        if census.count.contains_key(&key) {
            input_bdry.insert(key);
            sub.add_bdry_tri(g.map(|v| remap.global_to_local[&v]));
        }
    }
    for f in 0..mesh.num_bdry_quads() {
        let g = *mesh.bdry_quad_conn(f);
        let key = quad_key(g);
        if census.count.contains_key(&key) {
            input_bdry.insert(key);
            sub.add_bdry_quad(g.map(|v| remap.global_to_local[&v]));
        }
    }

    // Faces seen exactly once and not on the input boundary are the
    // partition boundary. Materialise them so the sub-mesh is closed.
    let mut part_tris = Vec::new();
    let mut part_quads = Vec::new();
    for (key, local_face) in &census.in_order {
        if census.count[key] == 1 && !input_bdry.contains(key) {
            match local_face {
                LocalFace::Tri(l) => {
                    part_tris.push(*l);
                    sub.add_bdry_tri(*l);
                }
                LocalFace::Quad(l) => {
                    part_quads.push(*l);
                    sub.add_bdry_quad(*l);
                }
            }
        }
    }

    log::debug!(
        "part [{}, {}): {} cells, {} verts, {} partition tris, {} partition quads",
        part.first(),
        part.last(),
        cells.len(),
        sub.num_verts(),
        part_tris.len(),
        part_quads.len(),
    );

    Ok(PartMesh {
        mesh: sub,
        to_global: remap.to_global,
        part_tris,
        part_quads,
    })
}
