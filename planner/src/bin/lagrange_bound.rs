use std::{error::Error, fs::File, io::Write, path::PathBuf};

use bebsched_planner::{io, SubgradientConfig};
use clap::Parser;
use log::{info, warn};

/// Lagrangian lower bound on the number of backup buses needed.
#[derive(Parser)]
#[command(name = "lagrange_bound")]
struct Cli {
    /// Problem JSON files
    #[arg(required = true)]
    problems: Vec<PathBuf>,

    /// Arc table (CSV) replacing the arcs of the problem
    #[arg(long)]
    arcs: Option<PathBuf>,

    /// Solver configuration (JSON). Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_iterations: Option<usize>,

    #[arg(long)]
    step_constant: Option<f64>,

    #[arg(long)]
    step_method: Option<String>,

    /// Solve the vehicle subproblems on one thread
    #[arg(long)]
    serial: bool,

    /// Write the schedule of the best iteration here (JSON)
    #[arg(long)]
    schedule_out: Option<PathBuf>,

    /// Print the schedule of the best iteration
    #[arg(long)]
    print_schedule: bool,
}

struct Row {
    name: String,
    vehicles: usize,
    arcs: usize,
    status: String,
    iterations: usize,
    bound: f64,
    integer_bound: f64,
    upper_bound: Option<f64>,
    time: f64,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.problems.len() > 1 && (cli.arcs.is_some() || cli.schedule_out.is_some()) {
        return Err("--arcs and --schedule-out need exactly one problem file".into());
    }

    let mut config = match cli.config.as_ref() {
        Some(path) => serde_json::from_reader(std::io::BufReader::new(File::open(path)?))?,
        None => SubgradientConfig::default(),
    };
    if let Some(n) = cli.max_iterations {
        config.max_iterations = n;
    }
    if let Some(c) = cli.step_constant {
        config.step_constant = c;
    }
    if let Some(m) = cli.step_method.as_ref() {
        config.step_method = m.clone();
    }
    if cli.serial {
        config.parallel = false;
    }
    info!("Using {:?}", config);

    let mut rows = Vec::new();
    for path in cli.problems.iter() {
        let mut problem = {
            #[cfg(feature = "prof")]
            let _p = hprof::enter("read");
            io::read_problem_json(path)?
        };
        if let Some(arcs) = cli.arcs.as_ref() {
            problem.arcs = io::read_arcs_csv_file(arcs)?;
        }
        println!(
            " * instance {} with {} blocks {} backups {} arcs",
            path.display(),
            problem.blocks.len(),
            problem.backups.len(),
            problem.arcs.len()
        );

        let report = bebsched_planner::solve(&problem, &config)?;

        let check = &report.schedule_check;
        if !check.is_feasible() {
            warn!(
                "best relaxed schedule is not operable: {} uncovered, {} overcovered, {} over budget",
                check.uncovered.len(),
                check.overcovered.len(),
                check.over_budget.len()
            );
        }

        if cli.print_schedule {
            report.schedule.print();
        }
        if let Some(out) = cli.schedule_out.as_ref() {
            serde_json::to_writer_pretty(File::create(out)?, &report.schedule)?;
        }

        rows.push(Row {
            name: path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default(),
            vehicles: problem.n_vehicles(),
            arcs: problem.arcs.len(),
            status: format!("{:?}", report.status),
            iterations: report.iterations,
            bound: report.best_bound,
            integer_bound: report.best_integer_bound,
            upper_bound: problem.upper_bound,
            time: report.duration.as_secs_f64(),
        });
    }

    #[cfg(feature = "prof")]
    {
        println!();
        println!("# PROFILER");
        hprof::profiler().print_timing();
    }

    println!();
    println!("# RESULTS");
    let mut tablewriter = tabwriter::TabWriter::new(Vec::new());
    writeln!(&mut tablewriter, "instance\tvhs\tarcs\t|\tstatus\titers\tbnd\tint\tub\ttime")?;
    writeln!(&mut tablewriter, "---\t---\t---\t\t---\t---\t---\t---\t---\t---")?;
    for row in rows.iter() {
        let ub = row.upper_bound.map(|ub| format!("{:.0}", ub)).unwrap_or_else(|| "-".to_string());
        writeln!(
            &mut tablewriter,
            "{}\t{}\t{}\t|\t{}\t{}\t{:.4}\t{:.0}\t{}\t{:.2}",
            row.name, row.vehicles, row.arcs, row.status, row.iterations, row.bound, row.integer_bound, ub, row.time
        )?;
    }
    let written = String::from_utf8(tablewriter.into_inner().map_err(|_| "could not flush results table")?)?;
    println!("{}", written);
    Ok(())
}
