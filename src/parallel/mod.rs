//! Partitioned refinement drivers.
//!
//! Two entry points share the extract → refine → write pipeline:
//!
//! * [`refine_for_parallel`] loops over every part in one process, the
//!   batch workflow for a single machine.
//! * [`refine_with_comm`] runs one part per rank over a [`Communicator`]
//!   and finishes with the four-collective reconciliation: count gather,
//!   record gather, size broadcast, record broadcast. Every rank then
//!   writes its identical-vertex listing.
//!
//! All collectives are entered by every rank in the same order; a rank
//! failing to do so is a protocol error with no defined recovery.

pub mod communicator;
pub mod extract;
pub mod reconcile;
pub mod wire;

use std::path::{Path, PathBuf};
use std::time::Instant;

pub use communicator::{CommTag, Communicator, NoComm, RayonComm, ReconcileCommTags, Wait};
#[cfg(feature = "mpi-support")]
pub use communicator::MpiComm;
pub use extract::{extract_part_mesh, PartMesh};
pub use wire::WireBdryVert;

use crate::error::{ExaMeshError, Result};
use crate::io::{write_mesh, OutputFormat};
use crate::mesh::length_scale::compute_length_scales;
use crate::mesh::{MeshBase, UMesh};
use crate::partition::{compute_part_count, partition_cells, Part};
use crate::refine::divider::{quad_face_grid, tri_face_grid};
use crate::refine::{refine_mesh_with_tables, MappingType, RefineTables};
use communicator::{broadcast_records, gather_counts, gather_records};
use reconcile::{find_identical_verts, sort_buffer, write_identical_verts};

/// Rank that coordinates the reconciliation.
pub const MASTER: usize = 0;

/// Everything a refinement run needs to know.
#[derive(Clone, Debug)]
pub struct RefineConfig {
    pub n_divs: u32,
    pub max_cells_per_part: u64,
    pub mapping: MappingType,
    /// Coordinate tolerance for cross-partition vertex identity. Two
    /// distinct geometric vertices closer than this will be conflated, so
    /// it must stay well below the smallest fine-cell edge length.
    pub epsilon: f64,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

impl RefineConfig {
    pub fn new(n_divs: u32) -> Self {
        RefineConfig {
            n_divs,
            max_cells_per_part: 1_000_000,
            mapping: MappingType::LengthScale,
            epsilon: 1e-10,
            output_dir: PathBuf::from("."),
            format: OutputFormat::Vtk,
        }
    }
}

/// Accumulated timings and sizes for a refinement run.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefineStats {
    pub parts: u32,
    pub cells: u64,
    pub verts: u64,
    pub extract_seconds: f64,
    pub refine_seconds: f64,
}

fn fine_submesh_path(config: &RefineConfig, prefix: &str, part: usize) -> PathBuf {
    config
        .output_dir
        .join(format!("{prefix}{part:03}.{}", config.format.extension()))
}

fn identical_verts_path(dir: &Path, part: usize) -> PathBuf {
    dir.join(format!("identical-verts-submesh{part:03}.txt"))
}

/// Collect the fine vertices on a part's partition faces as wire records.
fn collect_part_bdry_verts(
    fine: &UMesh,
    tables: &RefineTables,
    part_mesh: &PartMesh,
    n_divs: u32,
    part_id: u32,
) -> Result<Vec<WireBdryVert>> {
    let mut seen = vec![false; fine.num_verts() as usize];
    let mut records = Vec::new();
    let mut push = |vert: u32, records: &mut Vec<WireBdryVert>| {
        if !seen[vert as usize] {
            seen[vert as usize] = true;
            records.push(WireBdryVert::new(vert, part_id, fine.coords(vert)));
        }
    };

    for tri in &part_mesh.part_tris {
        let grid = tri_face_grid(tables, *tri, n_divs).ok_or_else(|| {
            ExaMeshError::InvalidMesh("partition tri face was never divided".into())
        })?;
        for vert in grid {
            push(vert, &mut records);
        }
    }
    for quad in &part_mesh.part_quads {
        let grid = quad_face_grid(tables, *quad, n_divs).ok_or_else(|| {
            ExaMeshError::InvalidMesh("partition quad face was never divided".into())
        })?;
        for vert in grid {
            push(vert, &mut records);
        }
    }
    Ok(records)
}

/// Refine one part: extract its coarse sub-mesh, refine it, and write the
/// fine sub-mesh. Returns the fine mesh, the registries, and the part's
/// partition-boundary records.
#[allow(clippy::too_many_arguments)]
fn refine_one_part<M: MeshBase>(
    mesh: &M,
    scales: &[f64],
    part: &Part,
    cpd: &[crate::partition::CellPartData],
    part_id: usize,
    config: &RefineConfig,
    prefix: &str,
    stats: &mut RefineStats,
) -> Result<Vec<WireBdryVert>> {
    let start = Instant::now();
    let part_mesh = extract_part_mesh(mesh, scales, part, cpd)?;
    stats.extract_seconds += start.elapsed().as_secs_f64();

    let start = Instant::now();
    let (fine, tables) = refine_mesh_with_tables(&part_mesh.mesh, config.n_divs, config.mapping)?;
    let refine_seconds = start.elapsed().as_secs_f64();
    stats.refine_seconds += refine_seconds;

    let part_cells = fine.num_cells();
    stats.cells += part_cells;
    stats.verts += fine.num_verts() as u64;
    log::info!(
        "part {part_id:3}: cells {}-{}, {} fine cells in {:.2}s ({:.2} Mcells/min)",
        part.first(),
        part.last(),
        part_cells,
        refine_seconds,
        part_cells as f64 / 1.0e6 / (refine_seconds / 60.0).max(1e-9),
    );

    let records =
        collect_part_bdry_verts(&fine, &tables, &part_mesh, config.n_divs, part_id as u32)?;
    write_mesh(&fine, &fine_submesh_path(config, prefix, part_id), config.format)?;
    Ok(records)
}

/// Refine the whole mesh part by part in this process.
///
/// The partition count follows the max-cells-per-part policy. When more
/// than one part is produced, the cross-partition duplicate listing is
/// computed after the loop and written once per part, matching the
/// distributed driver's output.
pub fn refine_for_parallel<M: MeshBase>(mesh: &M, config: &RefineConfig) -> Result<RefineStats> {
    mesh.log_size_stats();
    std::fs::create_dir_all(&config.output_dir)?;
    let scales = compute_length_scales(mesh)?;

    let n_parts = compute_part_count(mesh.num_cells(), config.n_divs, config.max_cells_per_part);
    let start = Instant::now();
    let (parts, cpd) = partition_cells(mesh, n_parts);
    let partition_seconds = start.elapsed().as_secs_f64();

    let mut stats = RefineStats {
        parts: parts.len() as u32,
        ..Default::default()
    };
    let mut buffer: Vec<WireBdryVert> = Vec::new();
    for (part_id, part) in parts.iter().enumerate() {
        let records = refine_one_part(
            mesh,
            &scales,
            part,
            &cpd,
            part_id,
            config,
            "fine-submesh",
            &mut stats,
        )?;
        buffer.extend(records);
    }

    if parts.len() > 1 {
        sort_buffer(&mut buffer);
        let identical = find_identical_verts(&buffer, config.epsilon);
        log::info!(
            "reconciliation: {} boundary records, {} in duplicate groups",
            buffer.len(),
            identical.len(),
        );
        for part_id in 0..parts.len() {
            write_identical_verts(&identical_verts_path(&config.output_dir, part_id), &identical)?;
        }
    }

    log::info!(
        "done: {} parts, {} cells; partition {:.2}s, extract {:.2}s, refine {:.2}s",
        stats.parts,
        stats.cells,
        partition_seconds,
        stats.extract_seconds,
        stats.refine_seconds,
    );
    Ok(stats)
}

/// Refine one part per rank and reconcile partition boundaries across the
/// communicator.
pub fn refine_with_comm<M: MeshBase, C: Communicator>(
    mesh: &M,
    config: &RefineConfig,
    comm: &C,
) -> Result<RefineStats> {
    std::fs::create_dir_all(&config.output_dir)?;
    let scales = compute_length_scales(mesh)?;

    let (parts, cpd) = partition_cells(mesh, comm.size() as u32);
    if parts.len() != comm.size() {
        return Err(ExaMeshError::InvalidMesh(format!(
            "{} ranks but only {} cells to partition",
            comm.size(),
            parts.len(),
        )));
    }

    let rank = comm.rank();
    let mut stats = RefineStats {
        parts: 1,
        ..Default::default()
    };
    let records = refine_one_part(
        mesh,
        &scales,
        &parts[rank],
        &cpd,
        rank,
        config,
        "mpi-fine-submesh",
        &mut stats,
    )?;

    // The four ordered collectives of the reconciliation protocol.
    let tags = ReconcileCommTags::from_base(CommTag::new(100));
    let counts = gather_counts(comm, MASTER, records.len() as u64, tags.counts);
    let gathered = gather_records(comm, MASTER, &records, counts.as_deref(), tags.records);
    let identical = gathered.map(|mut buffer| {
        sort_buffer(&mut buffer);
        find_identical_verts(&buffer, config.epsilon)
    });
    let identical = broadcast_records(comm, MASTER, identical, (tags.size, tags.data));

    write_identical_verts(&identical_verts_path(&config.output_dir, rank), &identical)?;
    comm.barrier();
    Ok(stats)
}
