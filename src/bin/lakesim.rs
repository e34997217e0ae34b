use lakesim::prelude::*;
use lakesim::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "lakesim",
    about = "Simulates the flow of an ice slab over a periodically filling subglacial lake"
)]
struct Options {
    /// JSON file with the configuration (defaults are used if omitted)
    #[structopt(short, long)]
    config: Option<String>,

    /// Output directory
    #[structopt(short, long, default_value = "/tmp/lakesim/results")]
    out_dir: String,

    /// Wall boundary conditions: "dirichlet" or "neumann" (overrides the configuration)
    #[structopt(short, long)]
    walls: Option<String>,

    /// Do not print the time stepping statistics
    #[structopt(short, long)]
    quiet: bool,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // configuration
    let mut config = match &options.config {
        Some(path) => Config::read_json(path)?,
        None => Config::new(),
    };
    if let Some(mode) = &options.walls {
        config.set_wall_bcs(mode)?;
    }
    if options.quiet {
        config.set_verbose(false, false);
    }
    if config.verbose_timesteps {
        println!("{}", config);
    }

    // run
    let sim = Simulation::new(&config, Some(&options.out_dir))?;
    let results = sim.run()?;

    // message
    let path = format!("{}", sim.results_path().display());
    let thin_line = format!("{:─^1$}", "", path.len());
    println!("\n\n{}", thin_line);
    println!("{} snapshots written to:", results.nt());
    println!("{}", path);
    println!("{}\n\n", thin_line);
    Ok(())
}
