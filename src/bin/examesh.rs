//! examesh CLI: uniformly refine an unstructured volume mesh.
//!
//! Reads a legacy ASCII VTK unstructured grid, refines it by the given
//! factor, and writes one fine sub-mesh per part (plus the cross-partition
//! identical-vertex listings when more than one part is produced).
//!
//! Exit codes: 0 on success, 2 when the refined mesh would overflow the
//! index type, 1 on any other failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use examesh::error::ExaMeshError;
use examesh::io::{vtk, OutputFormat};
use examesh::parallel::{refine_for_parallel, RefineConfig};
use examesh::refine::MappingType;
use examesh::MAX_DIVS;

#[derive(Parser)]
#[command(name = "examesh")]
#[command(author, version, about = "Uniform refinement of mixed-element volume meshes", long_about = None)]
struct Cli {
    /// Input mesh (legacy ASCII VTK unstructured grid)
    input: PathBuf,

    /// Subdivision factor: each coarse edge is split into this many pieces
    #[arg(short = 'n', long, default_value = "2")]
    divisions: u32,

    /// Maximum fine cells per part
    #[arg(short = 'm', long, default_value = "1000000")]
    max_cells_per_part: u64,

    /// Output directory for the per-part files
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Which cell map places the new vertices
    #[arg(long, value_enum, default_value = "length-scale")]
    map: MapArg,

    /// Output format for the fine sub-meshes
    #[arg(long, value_enum, default_value = "vtk")]
    format: FormatArg,

    /// Coordinate tolerance for cross-partition vertex identity
    #[arg(long, default_value = "1e-10")]
    epsilon: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum MapArg {
    /// Length-scale-weighted map with smooth grading
    LengthScale,
    /// Cubic Lagrange map
    Lagrange,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Vtk,
    Ugrid,
}

fn run(cli: &Cli) -> Result<(), ExaMeshError> {
    if cli.divisions < 1 || cli.divisions > MAX_DIVS {
        return Err(ExaMeshError::BadSubdivision(cli.divisions));
    }
    let mesh = vtk::read_vtk(&cli.input)?;
    let config = RefineConfig {
        n_divs: cli.divisions,
        max_cells_per_part: cli.max_cells_per_part,
        mapping: match cli.map {
            MapArg::LengthScale => MappingType::LengthScale,
            MapArg::Lagrange => MappingType::Lagrange,
        },
        epsilon: cli.epsilon,
        output_dir: cli.output_dir.clone(),
        format: match cli.format {
            FormatArg::Vtk => OutputFormat::Vtk,
            FormatArg::Ugrid => OutputFormat::Ugrid,
        },
    };
    refine_for_parallel(&mesh, &config)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ ExaMeshError::SizeOverflow(_)) => {
            log::error!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
