use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xfoil_polar::{
    submodules::output_files::OutputFiles,
    ControlScript, PolarTable, RunFile, RunOverrides, XfoilResult, XfoilRunner,
};

#[derive(Parser)]
#[command(name = "xfoil-polar")]
#[command(about = "Runs XFOIL over an angle-of-attack sweep and plots the polar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the solver and parse its polar
    Run {
        #[command(flatten)]
        settings: RunArgs,
        #[command(flatten)]
        outputs: OutputArgs,
        /// Copy the raw polar file here
        #[arg(long)]
        polar: Option<PathBuf>,
        /// Write the solver's console output here
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Parse an existing polar file
    Parse {
        /// Polar file written by XFOIL
        polar_file: PathBuf,
        /// Airfoil name used in the figure title
        #[arg(long, default_value = "airfoil")]
        airfoil: String,
        #[command(flatten)]
        outputs: OutputArgs,
    },
    /// Print the control script a run would feed to the solver
    Script {
        #[command(flatten)]
        settings: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// YAML or JSON run description; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Airfoil name, read from <airfoil-dir>/<name>.dat
    #[arg(long)]
    airfoil: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    alpha_start: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    alpha_end: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    alpha_step: Option<f64>,
    #[arg(long)]
    reynolds: Option<f64>,
    /// Viscous iteration cap per angle
    #[arg(long)]
    iterations: Option<u32>,
    /// XFOIL executable
    #[arg(long)]
    solver: Option<PathBuf>,
    #[arg(long)]
    airfoil_dir: Option<PathBuf>,
    /// Keep scratch files in this directory instead of a temporary one
    #[arg(long)]
    scratch_dir: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    /// Save the figure (.png or .svg)
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Write the table as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl RunArgs {
    fn resolve(self) -> XfoilResult<RunFile> {
        let file = RunFile::load_or_default(self.config.as_deref())?;
        let overrides = RunOverrides {
            airfoil_name: self.airfoil,
            alpha_start: self.alpha_start,
            alpha_end: self.alpha_end,
            alpha_step: self.alpha_step,
            reynolds: self.reynolds,
            n_iter: self.iterations,
            executable: self.solver,
            airfoil_dir: self.airfoil_dir,
            scratch_dir: self.scratch_dir,
        };
        Ok(overrides.apply(file))
    }
}

fn main() -> XfoilResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { settings, outputs, polar, log } => cmd_run(settings, &outputs, polar.as_deref(), log.as_deref()),
        Commands::Parse { polar_file, airfoil, outputs } => cmd_parse(&polar_file, &airfoil, &outputs),
        Commands::Script { settings } => {
            let file = settings.resolve()?;
            file.run.validate()?;
            print!("{}", ControlScript::for_run(&file.run));
            Ok(())
        }
    }
}

fn cmd_run(settings: RunArgs, outputs: &OutputArgs, polar: Option<&Path>, log: Option<&Path>) -> XfoilResult<()> {
    let file = settings.resolve()?;
    let session = XfoilRunner::new(file.solver).run_session(&file.run)?;
    if let Some(path) = polar {
        OutputFiles::write_text(&session.polar_text, path)?;
    }
    if let Some(path) = log {
        OutputFiles::write_text(&session.stdout, path)?;
    }
    report(&session.table, outputs)
}

fn cmd_parse(polar_file: &Path, airfoil: &str, outputs: &OutputArgs) -> XfoilResult<()> {
    let table = PolarTable::read(airfoil, polar_file)?;
    report(&table, outputs)
}

fn report(table: &PolarTable, outputs: &OutputArgs) -> XfoilResult<()> {
    print_table(table);
    if let Some(path) = &outputs.json {
        OutputFiles::print(&table.export(), path)?;
    }
    if let Some(path) = &outputs.plot {
        table.figure()?.save(path)?;
    }
    Ok(())
}

fn print_table(table: &PolarTable) {
    println!("{} ({} angles)", table.airfoil_name, table.len());
    println!("{:>8} {:>8} {:>9} {:>9} {:>9} {:>8} {:>8} {:>8}", "alpha", "C_l", "C_d", "C_l/C_d", "C_dp", "C_m", "Top_Xtr", "Bot_Xtr");
    for r in table.records() {
        println!(
            "{:8.3} {:8.4} {:9.5} {:9.3} {:9.5} {:8.4} {:8.4} {:8.4}",
            r.alpha, r.c_l, r.c_d, r.glide_ratio, r.c_dp, r.c_m, r.top_xtr, r.bot_xtr
        );
    }
    if let Some(best) = table.best_glide() {
        println!("max C_l/C_d = {:.2} at alpha = {:.2} deg", best.glide_ratio, best.alpha);
    }
}
