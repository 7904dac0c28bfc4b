use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use voxel_autopilot::benchmark::{resolve_presets, run_benchmark, BenchmarkConfig};
use voxel_autopilot::config::BotConfig;
use voxel_autopilot::geom::Vec3;
use voxel_autopilot::host::{AimConfirmer, CrosshairConfirmer, HostWorld, TrustingConfirmer};
use voxel_autopilot::ordering::{order, OrderingMode};
use voxel_autopilot::scanner::{scan, TargetMatcher};
use voxel_autopilot::session::run_session;
use voxel_autopilot::sim::SimWorld;
use voxel_autopilot::util::{parse_seed, parse_seed_csv, seed_sequence};

#[derive(Parser, Debug)]
#[command(name = "voxel-autopilot")]
#[command(about = "Scan-order-aim-interact autopilot over a simulated voxel world")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List built-in config presets
    Presets,
    /// Scan a seeded world and print the visit order without moving
    Plan {
        #[command(flatten)]
        setup: Setup,
    },
    /// Run a full session against a seeded world
    Run {
        #[command(flatten)]
        setup: Setup,
        /// Confirm aims by trusting the finished rotation instead of the
        /// host crosshair probe
        #[arg(long)]
        trusting: bool,
        /// Print the session summary as JSON
        #[arg(long)]
        json: bool,
        /// Print every host-facing status line after the run
        #[arg(long)]
        transcript: bool,
    },
    /// Multi-seed, multi-preset sweep over generated worlds
    Benchmark {
        /// Comma-separated preset names (default: all)
        #[arg(long)]
        presets: Option<String>,
        /// Comma-separated seeds (decimal or 0x hex)
        #[arg(long)]
        seeds: Option<String>,
        /// First seed of a consecutive range (with --seed-count)
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 8)]
        seed_count: u32,
        #[arg(long, default_value_t = 6)]
        veins: u32,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

#[derive(clap::Args, Debug)]
struct Setup {
    /// Built-in preset name
    #[arg(long, default_value = "cluster-harvest")]
    preset: String,
    /// JSON config file overriding the preset entirely
    #[arg(long)]
    config: Option<PathBuf>,
    /// World seed (decimal or 0x hex)
    #[arg(long, default_value = "0x5EED")]
    seed: String,
    /// Veins scattered across the generated world
    #[arg(long, default_value_t = 6)]
    veins: u32,
    /// Override the ordering mode
    #[arg(long, value_enum)]
    mode: Option<CliMode>,
    /// Override the target label
    #[arg(long)]
    target: Option<String>,
    /// Override the scan radius
    #[arg(long)]
    radius: Option<f64>,
    /// Override the scan-pass cap
    #[arg(long)]
    max_cycles: Option<u32>,
    /// Look only, never interact
    #[arg(long)]
    no_interact: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    Distance,
    Cluster,
    AngularTour,
}

impl From<CliMode> for OrderingMode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Distance => OrderingMode::Distance,
            CliMode::Cluster => OrderingMode::Cluster,
            CliMode::AngularTour => OrderingMode::AngularTour,
        }
    }
}

impl Setup {
    fn resolve(&self) -> Result<(BotConfig, SimWorld)> {
        let mut cfg = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed reading config {}", path.display()))?;
                serde_json::from_str::<BotConfig>(&raw)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => BotConfig::preset(&self.preset)
                .ok_or_else(|| anyhow!("unknown preset: {}", self.preset))?,
        };

        if let Some(mode) = self.mode {
            cfg.mode = mode.into();
        }
        if let Some(target) = &self.target {
            cfg.target_label = target.clone();
        }
        if let Some(radius) = self.radius {
            cfg.scan_radius = radius;
        }
        if let Some(max_cycles) = self.max_cycles {
            cfg.max_cycles = max_cycles;
        }
        if self.no_interact {
            cfg.interact = false;
        }
        cfg.clamp();

        let seed = parse_seed(&self.seed)?;
        // Floor veins sit a layer below the viewpoint; keep them well inside
        // the scan sphere.
        let vein_radius = ((cfg.scan_radius * 0.6).floor() as i32).max(1);
        let world = SimWorld::with_surface_veins(seed, self.veins, vein_radius, &cfg.target_label);
        Ok((cfg, world))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Presets => {
            for name in BotConfig::preset_names() {
                if let Some(cfg) = BotConfig::preset(name) {
                    println!("{name:16} {}", cfg.description);
                }
            }
        }

        Commands::Plan { setup } => {
            let (cfg, mut world) = setup.resolve()?;
            let origin = world.viewpoint_position();
            let eye = Vec3::new(origin.x, origin.y + cfg.eye_height, origin.z);
            let matcher = TargetMatcher::new(cfg.target_label.clone(), cfg.ignore_state);

            let found = scan(&mut world, origin, cfg.scan_radius, &matcher);
            if found.is_empty() {
                println!(
                    "no {} within {:.1} of the viewpoint",
                    cfg.target_label, cfg.scan_radius
                );
                return Ok(());
            }

            let tour = order(found, eye, cfg.mode, cfg.link_threshold);
            println!(
                "{} cell(s), {} order:",
                tour.len(),
                cfg.mode.as_str()
            );
            for (idx, candidate) in tour.iter().enumerate() {
                println!(
                    "  {:>3}. {} {:.1} away [{}]",
                    idx + 1,
                    candidate.position,
                    candidate.distance,
                    candidate.label
                );
            }
        }

        Commands::Run {
            setup,
            trusting,
            json,
            transcript,
        } => {
            let (cfg, mut world) = setup.resolve()?;
            let confirmer: Box<dyn AimConfirmer> = if trusting {
                Box::new(TrustingConfirmer)
            } else {
                Box::new(CrosshairConfirmer)
            };

            let summary = run_session(&mut world, confirmer.as_ref(), &cfg);

            if transcript {
                for line in world.messages() {
                    println!("> {line}");
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{}: visited {}, interacted {}, {} scan passes, {} obstruction marks, {:.1}s sim time",
                    summary.end.as_str(),
                    summary.cells_visited,
                    summary.total_interacted,
                    summary.scan_passes,
                    summary.obstructed_marks,
                    world.clock().as_secs_f64()
                );
            }
        }

        Commands::Benchmark {
            presets,
            seeds,
            seed_start,
            seed_count,
            veins,
            out_dir,
            jobs,
        } => {
            let presets = resolve_presets(presets.as_deref())?;
            let seeds = match (seeds, seed_start) {
                (Some(csv), _) => parse_seed_csv(&csv)?,
                (None, Some(start)) => seed_sequence(parse_seed(&start)?, seed_count),
                (None, None) => seed_sequence(0x5EED, seed_count),
            };
            let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("benchmarks/latest"));

            let report = run_benchmark(BenchmarkConfig {
                presets,
                seeds,
                veins,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            println!(
                "{} runs over {} seed(s), written to {}",
                report.run_count,
                report.seeds.len(),
                out_dir.display()
            );
            for (rank, agg) in report.rankings.iter().enumerate() {
                println!(
                    "  {}. {:16} {:>5.1}% avg completion, {:.1} interactions, {:.1} passes, {:.1}s sim, {} full clears",
                    rank + 1,
                    agg.preset,
                    agg.avg_completion * 100.0,
                    agg.avg_interacted,
                    agg.avg_scan_passes,
                    agg.avg_sim_seconds,
                    agg.full_clears
                );
            }
        }
    }

    Ok(())
}
