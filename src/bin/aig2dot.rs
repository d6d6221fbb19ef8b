use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::{Parser, ValueEnum};
use log::info;

use aigviz::Aig;
use aigviz::disbalance::estimate_disbalance;
use aigviz::dot::{Annotations, GraphvizStyle, aig_to_dot};
use aigviz::eqgates::{EqGatesOptions, search_eq_gates};
use aigviz::layering::{LayerMode, Layering};
use aigviz::oracle::VarisatOracle;

/// Renders an ASCII AIGER circuit to Graphviz DOT, optionally annotated
/// with equivalent gates and per-node output bias.
#[derive(Parser, Debug)]
struct Args {
    /// File with an And-Inverter Graph in ASCII AIGER format.
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Path of the resulting DOT file.
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Also render the DOT to a PDF at this path (requires the `dot` tool).
    #[arg(short = 'p', long)]
    pdf: Option<PathBuf>,

    /// Rank nodes by topological layers (false: a single shared rank).
    #[arg(long, default_value_t = true)]
    #[arg(action = clap::ArgAction::Set)]
    rank_by_layers: bool,

    /// Compute the disbalance of the nodes.
    #[arg(long)]
    disbalance: bool,

    /// Sample size for the disbalance computation.
    #[arg(short = 's', long, default_value_t = 10000)]
    sample_size: u32,

    /// Random seed for the disbalance computation.
    #[arg(long, default_value_t = 42)]
    random_seed: u64,

    /// Determine equivalent gates.
    #[arg(long)]
    eq_gates: bool,

    /// SAT backend for the equivalence search.
    #[arg(long, value_enum, default_value_t = SolverBackend::Varisat)]
    solver: SolverBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SolverBackend {
    Varisat,
}

fn create_parent_dirs(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let aig = Aig::from_file(&args.input)?;
    info!(
        "parsed '{}': {} inputs, {} gates, {} outputs",
        args.input.display(),
        aig.get_inputs().len(),
        aig.get_ands().len(),
        aig.get_outputs().len()
    );

    let eq = if args.eq_gates {
        // The oracle session lives exactly as long as this one search.
        let mut oracle = match args.solver {
            SolverBackend::Varisat => VarisatOracle::new(),
        };
        let result = search_eq_gates(&aig, &mut oracle, &EqGatesOptions::default());
        Some(result)
    } else {
        None
    };

    let table = if args.disbalance {
        info!(
            "computing disbalance table using sample_size={} and random_seed={}...",
            args.sample_size, args.random_seed
        );
        let table = estimate_disbalance(&aig, args.sample_size, args.random_seed)?;

        let s = |t: u32, f: u32| t as f64 / (t + f) as f64;
        let mut entries: Vec<_> = table.iter().collect();
        entries.sort_by(|&(_, (t1, f1)), &(_, (t2, f2))| {
            s(t1, f1).total_cmp(&s(t2, f2))
        });
        println!("Disbalance table ({} samples):", table.get_sample_size());
        for (id, (t, f)) in entries {
            println!("  - {}: t={}, f={}, s={:.3}", id, t, f, s(t, f));
        }
        Some(table)
    } else {
        None
    };

    let mode = if args.rank_by_layers {
        LayerMode::ByDepth
    } else {
        LayerMode::SingleRank
    };
    let layering = Layering::new(&aig, mode);

    let annotations = Annotations {
        layering: Some(&layering),
        eq_ids: eq.as_ref().map(|r| r.eq_ids.as_slice()).unwrap_or(&[]),
        disbalance: table.as_ref(),
    };
    let dot = aig_to_dot(&aig, &GraphvizStyle::default(), &annotations);

    info!("writing DOT to '{}'...", args.output.display());
    create_parent_dirs(&args.output)?;
    fs::write(&args.output, &dot)?;

    if let Some(pdf) = &args.pdf {
        info!("rendering DOT to '{}'", pdf.display());
        create_parent_dirs(pdf)?;
        let status = Command::new("dot")
            .arg("-Tpdf")
            .arg(&args.output)
            .arg("-o")
            .arg(pdf)
            .status()?;
        if !status.success() {
            return Err(format!("dot exited with {}", status).into());
        }
    }

    Ok(())
}
