use clap::Parser;
use plate_cutter::export;
use plate_cutter::instance::{Instance, InstanceData};
use plate_cutter::params::Params;
use plate_cutter::render;
use plate_cutter::solver::{Solver, SolverConfig};
use plate_cutter::types::PlateId;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "plate_cutter",
    about = "Guillotine cutting-stock solver for defective plates and ordered item stacks"
)]
struct Cli {
    /// Problem instance JSON file
    #[arg(long)]
    instance: std::path::PathBuf,

    /// Time budget in seconds (search widens until it expires)
    #[arg(long)]
    time_limit: Option<u64>,

    /// Beam width of the first search round
    #[arg(long, default_value_t = 64)]
    beam: usize,

    /// Partial-solution comparator id (0-3)
    #[arg(long, default_value_t = 2)]
    comparator: u8,

    /// Minimum waste piece dimension in mm
    #[arg(long, default_value_t = 20)]
    min_waste: i64,

    /// Keep geometrically symmetric moves (larger search space)
    #[arg(long)]
    keep_symmetries: bool,

    /// Write the cut plan as CSV to this path
    #[arg(long)]
    csv: Option<std::path::PathBuf>,

    /// Show ASCII layout of each plate
    #[arg(long)]
    layout: bool,
}

fn load_instance(path: &std::path::Path) -> Result<Instance, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let data: InstanceData =
        serde_json::from_str(&text).map_err(|e| format!("invalid instance JSON: {}", e))?;
    Instance::from_data(&data)
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.comparator > 3 {
        eprintln!("Error: comparator must be 0-3");
        std::process::exit(1);
    }

    let instance = load_instance(&cli.instance).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let mut params = Params::default().with_min_waste(cli.min_waste);
    if let Some(secs) = cli.time_limit {
        params = params.with_time_limit(Duration::from_secs(secs));
    }
    let config = SolverConfig {
        beam_width: cli.beam,
        comparator: cli.comparator,
        break_symmetries: !cli.keep_symmetries,
    };

    let solver = Solver::new(&instance, params, config);
    let Some(solution) = solver.solve() else {
        eprintln!("No feasible cutting plan found");
        std::process::exit(2);
    };

    let nodes = solution.plan_nodes();
    for p in 0..solution.plate_number() {
        let plate = PlateId(p);
        println!("Plate {}:", p + 1);
        for node in nodes.iter().filter(|n| n.plate == plate) {
            for item in &node.items {
                let rot = if item.orientation == plate_cutter::types::Orientation::Rotated {
                    " [rotated]"
                } else {
                    ""
                };
                println!(
                    "  item {} {}x{} @ ({}, {}){}",
                    item.item,
                    item.rect.length(),
                    item.rect.width(),
                    item.rect.left,
                    item.rect.bottom,
                    rot
                );
            }
        }
        if cli.layout {
            print!("{}", render::render_plate(&instance, &nodes, plate));
        }
        println!();
    }

    if let Some(path) = &cli.csv {
        let csv = export::to_csv(&nodes);
        if let Err(e) = std::fs::write(path, csv) {
            eprintln!("Error: cannot write {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    println!(
        "Summary: {} item{} on {} plate{}, waste {} ({:.1}% of item area)",
        solution.item_number(),
        if solution.item_number() == 1 { "" } else { "s" },
        solution.plate_number(),
        if solution.plate_number() == 1 { "" } else { "s" },
        solution.final_waste(),
        solution.final_waste() as f64 / instance.item_surface() as f64 * 100.0,
    );
}
