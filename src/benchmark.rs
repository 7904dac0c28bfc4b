use crate::config::BotConfig;
use crate::host::CrosshairConfirmer;
use crate::session::run_session;
use crate::sim::SimWorld;
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

// ── Sweep configuration ─────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub presets: Vec<String>,
    pub seeds: Vec<u32>,
    /// Veins scattered per generated world.
    pub veins: u32,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub preset: String,
    pub seed: u32,
    pub seed_hex: String,
    pub target_cells: usize,
    pub interacted: u64,
    pub visited: u64,
    pub scan_passes: u32,
    pub obstructed_marks: u32,
    pub end: String,
    pub sim_seconds: f64,
    /// Interacted cells over cells present at world generation.
    pub completion: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresetAggregate {
    pub preset: String,
    pub runs: usize,
    pub avg_completion: f64,
    pub avg_interacted: f64,
    pub avg_scan_passes: f64,
    pub avg_obstructed: f64,
    pub avg_sim_seconds: f64,
    pub full_clears: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub presets: Vec<String>,
    pub seeds: Vec<u32>,
    pub veins: u32,
    pub jobs: Option<usize>,
    pub run_count: usize,
    pub rankings: Vec<PresetAggregate>,
    pub runs: Vec<RunRecord>,
}

pub fn resolve_presets(input: Option<&str>) -> Result<Vec<String>> {
    match input {
        None => Ok(BotConfig::preset_names()
            .iter()
            .map(|name| (*name).to_string())
            .collect()),
        Some(raw) => {
            let mut presets = Vec::new();
            for token in raw.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                if BotConfig::preset(token).is_none() {
                    return Err(anyhow!("unknown preset: {token}"));
                }
                presets.push(token.to_string());
            }
            if presets.is_empty() {
                return Err(anyhow!("--presets resolved to empty list"));
            }
            Ok(presets)
        }
    }
}

// ── Sweep ───────────────────────────────────────────────────────────

/// Run every preset over every seeded world, aggregate per preset, and
/// write `summary.json` + `runs.csv` into the output directory.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.presets.is_empty() {
        return Err(anyhow!("benchmark requires at least one preset"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_jobs: Vec<(String, u32)> = config
        .presets
        .iter()
        .flat_map(|preset| config.seeds.iter().map(move |seed| (preset.clone(), *seed)))
        .collect();

    let veins = config.veins;
    let run_one = |(preset, seed): &(String, u32)| -> Result<RunRecord> {
        let mut cfg = BotConfig::preset(preset)
            .ok_or_else(|| anyhow!("unknown preset: {preset}"))?;
        cfg.clamp();

        // Keep veins well inside the scan sphere; floor cells sit a layer
        // below the viewpoint, so the horizontal reach is tighter than the
        // radius itself.
        let vein_radius = ((cfg.scan_radius * 0.6).floor() as i32).max(1);
        let mut world = SimWorld::with_surface_veins(*seed, veins, vein_radius, &cfg.target_label);
        let target_cells = world.count_cells_with(&cfg.target_label);

        let summary = run_session(&mut world, &CrosshairConfirmer, &cfg);
        let completion = if target_cells == 0 {
            1.0
        } else {
            summary.total_interacted as f64 / target_cells as f64
        };

        Ok(RunRecord {
            preset: preset.clone(),
            seed: *seed,
            seed_hex: seed_to_hex(*seed),
            target_cells,
            interacted: summary.total_interacted,
            visited: summary.cells_visited,
            scan_passes: summary.scan_passes,
            obstructed_marks: summary.obstructed_marks,
            end: summary.end.as_str().to_string(),
            sim_seconds: world.clock().as_secs_f64(),
            completion,
        })
    };

    let results: Vec<Result<RunRecord>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(results.len());
    for result in results {
        runs.push(result?);
    }

    let mut grouped: HashMap<String, Vec<&RunRecord>> = HashMap::new();
    for run in &runs {
        grouped.entry(run.preset.clone()).or_default().push(run);
    }

    let mut rankings = Vec::new();
    for (preset, preset_runs) in grouped {
        let count = preset_runs.len();
        let sum_completion: f64 = preset_runs.iter().map(|r| r.completion).sum();
        let sum_interacted: u64 = preset_runs.iter().map(|r| r.interacted).sum();
        let sum_passes: u64 = preset_runs.iter().map(|r| r.scan_passes as u64).sum();
        let sum_obstructed: u64 = preset_runs.iter().map(|r| r.obstructed_marks as u64).sum();
        let sum_seconds: f64 = preset_runs.iter().map(|r| r.sim_seconds).sum();
        let full_clears = preset_runs
            .iter()
            .filter(|r| r.interacted as usize >= r.target_cells && r.target_cells > 0)
            .count();

        rankings.push(PresetAggregate {
            preset,
            runs: count,
            avg_completion: sum_completion / count as f64,
            avg_interacted: sum_interacted as f64 / count as f64,
            avg_scan_passes: sum_passes as f64 / count as f64,
            avg_obstructed: sum_obstructed as f64 / count as f64,
            avg_sim_seconds: sum_seconds / count as f64,
            full_clears,
        });
    }

    rankings.sort_by(|a, b| {
        b.avg_completion
            .total_cmp(&a.avg_completion)
            .then(a.avg_sim_seconds.total_cmp(&b.avg_sim_seconds))
            .then(a.preset.cmp(&b.preset))
    });

    runs.sort_by(|a, b| {
        b.completion
            .total_cmp(&a.completion)
            .then(a.sim_seconds.total_cmp(&b.sim_seconds))
            .then(a.preset.cmp(&b.preset))
            .then(a.seed.cmp(&b.seed))
    });

    write_runs_csv(&config.out_dir.join("runs.csv"), &runs)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        presets: config.presets,
        seeds: config.seeds,
        veins: config.veins,
        jobs: config.jobs,
        run_count: runs.len(),
        rankings,
        runs,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "preset,seed_hex,seed,target_cells,interacted,visited,scan_passes,obstructed_marks,end,sim_seconds,completion\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{:.2},{:.4}\n",
            row.preset,
            row.seed_hex,
            row.seed,
            row.target_cells,
            row.interacted,
            row.visited,
            row.scan_passes,
            row.obstructed_marks,
            row.end,
            row.sim_seconds,
            row.completion
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
