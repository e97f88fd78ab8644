// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshdoctor CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meshdoctor::analysis::MeshDefects;
use meshdoctor::cli::{batch_bar, RepairBar, Reporter};
use meshdoctor::config::{parse_step_list, Config, CONFIG_FILE};
use meshdoctor::geometry::BoundingBox;
use meshdoctor::obj::{load_obj, repair_obj, save_obj, ObjModel};
use meshdoctor::radar::{synthesize_geometry, AperturePath};
use meshdoctor::repair::{remove_meshes_with_issues, Repairer};
use meshdoctor::scene::{Scene, SceneNode};
use meshdoctor::{analyze_scene, AggregateDefectReport};
use nalgebra::Point3;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "meshdoctor")]
#[command(about = "Triangle mesh defect analysis and repair", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine readable JSON instead of the colored report
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ./meshdoctor.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the defects of one or more OBJ files
    Analyze {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Vertex merge tolerance
        #[arg(short, long)]
        tolerance: Option<f64>,
    },

    /// Repair an OBJ file
    Repair {
        input: PathBuf,

        /// Output OBJ file
        #[arg(short, long)]
        output: PathBuf,

        /// Run the convergence loop after the fixed steps
        #[arg(long)]
        ensure_manifold: bool,

        /// Comma separated steps to skip
        #[arg(long, value_name = "STEPS")]
        skip: Option<String>,

        /// Vertex merge tolerance
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Repair the indexed buffers instead of the OBJ corners
        #[arg(long)]
        indexed: bool,
    },

    /// Analyze, or repair, every OBJ file under a directory
    Batch {
        dir: PathBuf,

        /// Repair each file into this directory, keeping relative paths
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Report meshes that exceed the configured prune thresholds
        #[arg(long)]
        prune: bool,
    },

    /// Render a synthetic aperture radar image of a mesh seen from above
    Radar {
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "linear")]
        aperture: ApertureKind,

        /// Sensor positions along the aperture
        #[arg(long, default_value_t = 64)]
        samples: usize,

        #[arg(long)]
        wavelength: Option<f64>,
    },

    /// Write the effective configuration to a file
    InitConfig {
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum ApertureKind {
    Linear,
    Circular,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            Reporter::report_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether every processed mesh ended up clean
fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::load()?,
    };

    match cli.command {
        Commands::Analyze { inputs, tolerance } => {
            if let Some(tolerance) = tolerance {
                config.set_merge_tolerance(tolerance).context("Invalid --tolerance")?;
            }
            analyze_command(&inputs, &config, cli.json)
        }
        Commands::Repair {
            input,
            output,
            ensure_manifold,
            skip,
            tolerance,
            indexed,
        } => {
            if let Some(tolerance) = tolerance {
                config.set_merge_tolerance(tolerance).context("Invalid --tolerance")?;
            }
            if let Some(skip) = skip {
                config.repair.skip_operations = parse_step_list(&skip)?;
            }
            config.repair.ensure_manifold |= ensure_manifold;
            if indexed {
                repair_indexed_command(&input, &output, &config, cli.json)
            } else {
                repair_command(&input, &output, &config, cli.json)
            }
        }
        Commands::Batch { dir, out, prune } => {
            batch_command(&dir, out.as_deref(), prune, &config, cli.json)
        }
        Commands::Radar {
            input,
            output,
            aperture,
            samples,
            wavelength,
        } => {
            if let Some(wavelength) = wavelength {
                config.radar.wavelength = wavelength;
            }
            radar_command(&input, &output, aperture, samples, &config)?;
            Ok(true)
        }
        Commands::InitConfig { path } => {
            config.save(&path)?;
            Reporter::success(&format!("Wrote {}", path.display()));
            Ok(true)
        }
        Commands::Version => {
            println!("meshdoctor v{}", meshdoctor::VERSION);
            Ok(true)
        }
    }
}

/// Load an OBJ file as a one-mesh scene named after the object or the file
fn load_scene(path: &Path) -> Result<Scene> {
    let model = load_obj(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let geometry = model.to_geometry()?;
    let name = model.name.clone().unwrap_or_else(|| file_stem(path));

    let mut scene = Scene::default();
    scene.add(SceneNode::mesh(name, geometry));
    Ok(scene)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string())
}

fn analyze_command(inputs: &[PathBuf], config: &Config, json: bool) -> Result<bool> {
    let mut all_clean = true;
    for input in inputs {
        let scene = load_scene(input)?;
        let report = analyze_scene(&scene, config.repair.merge_tolerance);
        all_clean &= report.is_clean();

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            Reporter::report_analysis(&input.display().to_string(), &report);
        }
    }
    Ok(all_clean)
}

fn repair_command(input: &Path, output: &Path, config: &Config, json: bool) -> Result<bool> {
    let start = Instant::now();
    let mut model = load_obj(input).with_context(|| format!("Failed to load {}", input.display()))?;
    let summary = repair_obj(&mut model, &config.repair)?;
    save_obj(&model, output).with_context(|| format!("Failed to write {}", output.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        Reporter::report_obj_repair(&input.display().to_string(), &summary, start.elapsed());
        Reporter::report_info(&format!("Output: {}", output.display()));
    }
    Ok(summary.after.issue_count() == 0)
}

fn repair_indexed_command(
    input: &Path,
    output: &Path,
    config: &Config,
    json: bool,
) -> Result<bool> {
    let start = Instant::now();
    let mut scene = load_scene(input)?;
    let repairer = Repairer::new(&scene, config.repair.clone());

    let bar = (!json).then(RepairBar::new);
    let outcome = repairer.repair(&mut scene, &mut |progress| {
        debug!(percent = progress.percent, step = %progress.step, "repair progress");
        if let Some(bar) = &bar {
            bar.update(&progress);
        }
    })?;
    if let Some(bar) = bar {
        bar.finish();
    }

    let entry = scene
        .mesh_entries()
        .into_iter()
        .next()
        .context("Scene has no mesh after repair")?;
    let geometry = scene
        .geometry(&entry.path)
        .context("Scene has no mesh after repair")?;
    save_obj(&ObjModel::from_geometry(geometry, Some(entry.name)), output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        Reporter::report_repair(&input.display().to_string(), &outcome, start.elapsed());
        Reporter::report_info(&format!("Output: {}", output.display()));
    }
    Ok(outcome.is_manifold_ready())
}

fn batch_command(
    dir: &Path,
    out: Option<&Path>,
    prune: bool,
    config: &Config,
    json: bool,
) -> Result<bool> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let start = Instant::now();
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("obj"))
        })
        .collect();

    let bar = (!json).then(|| batch_bar(files.len() as u64));
    let results: Vec<(PathBuf, Result<AggregateDefectReport>)> = files
        .par_iter()
        .map(|path| {
            let result = match out {
                Some(out) => repair_into(path, dir, out, config),
                None => load_scene(path).map(|mut scene| {
                    if prune {
                        let pruned = remove_meshes_with_issues(
                            &mut scene,
                            &config.prune,
                            config.repair.merge_tolerance,
                        );
                        for name in &pruned.removed_meshes {
                            warn!(file = %path.display(), mesh = %name, "mesh exceeds prune thresholds");
                        }
                    }
                    analyze_scene(&scene, config.repair.merge_tolerance)
                }),
            };
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            (path.clone(), result)
        })
        .collect();
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let mut clean = 0;
    let mut dirty = 0;
    let mut failed = 0;
    let mut json_rows = Vec::new();
    for (path, result) in results {
        match result {
            Ok(report) => {
                // A pruned-away mesh leaves an empty, trivially clean scene
                if report.is_clean() && report.mesh_count > 0 {
                    clean += 1;
                } else {
                    dirty += 1;
                }
                if json {
                    json_rows.push(serde_json::json!({
                        "file": path.display().to_string(),
                        "report": report,
                    }));
                }
            }
            Err(e) => {
                failed += 1;
                if json {
                    json_rows.push(serde_json::json!({
                        "file": path.display().to_string(),
                        "error": format!("{:#}", e),
                    }));
                } else {
                    Reporter::report_warning(&format!("{}: {:#}", path.display(), e));
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&json_rows)?);
    } else {
        Reporter::report_batch(clean, dirty, failed, start.elapsed());
    }
    Ok(dirty == 0 && failed == 0)
}

/// Repair one file of a batch and report its final state
fn repair_into(
    path: &Path,
    root: &Path,
    out: &Path,
    config: &Config,
) -> Result<AggregateDefectReport> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let target = out.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut model = load_obj(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let summary = repair_obj(&mut model, &config.repair)?;
    save_obj(&model, &target).with_context(|| format!("Failed to write {}", target.display()))?;

    let name = model.name.clone().unwrap_or_else(|| file_stem(path));
    Ok(AggregateDefectReport::from_meshes(vec![MeshDefects {
        name,
        report: summary.after,
    }]))
}

fn radar_command(
    input: &Path,
    output: &Path,
    kind: ApertureKind,
    samples: usize,
    config: &Config,
) -> Result<()> {
    let model = load_obj(input).with_context(|| format!("Failed to load {}", input.display()))?;
    let geometry = model.to_geometry()?;
    let bounds = BoundingBox::from_positions(geometry.positions());
    if bounds.is_empty() {
        bail!("{} has no vertices", input.display());
    }

    // Sensor flies one scene extent above the top of the mesh
    let extent = bounds.size().max().max(1.0);
    let center = bounds.center();
    let altitude = bounds.max.z + extent;
    let aperture = match kind {
        ApertureKind::Linear => AperturePath::Linear {
            start: Point3::new(bounds.min.x, bounds.min.y - extent, altitude),
            end: Point3::new(bounds.max.x, bounds.min.y - extent, altitude),
            samples,
        },
        ApertureKind::Circular => AperturePath::Circular {
            center: Point3::new(center.x, center.y, bounds.max.z),
            radius: extent,
            height: extent,
            samples,
        },
    };

    let image = synthesize_geometry(&geometry, &aperture, &config.radar)?;
    image
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Reporter::success(&format!(
        "Rendered {}x{} radar image -> {}",
        image.width(),
        image.height(),
        output.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_empty_config(dir: &Path, args: &[&str]) -> Result<Cli> {
        let config = dir.join(CONFIG_FILE);
        std::fs::write(&config, "")?;
        let config = config.display().to_string();
        let mut argv = vec!["meshdoctor", "--config", config.as_str()];
        argv.extend_from_slice(args);
        Ok(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn test_analyze_rejects_zero_tolerance() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let cli = cli_with_empty_config(dir.path(), &["analyze", "part.obj", "--tolerance", "0"])?;

        let err = run(cli).expect_err("zero tolerance");
        assert!(format!("{:#}", err).contains("--tolerance"));
        Ok(())
    }

    #[test]
    fn test_repair_rejects_degenerate_tolerance_before_writing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("quad.obj");
        let output = dir.path().join("out.obj");
        std::fs::write(&input, "v 1 1 0\nv 2 1 0\nv 2 2 0\nv 1 2 0\nf 1 2 3\nf 1 3 4\n")?;
        let (input, output) = (input.display().to_string(), output.display().to_string());

        for tolerance in ["--tolerance=NaN", "--tolerance=-1", "--tolerance=0"] {
            let cli = cli_with_empty_config(
                dir.path(),
                &["repair", input.as_str(), "-o", output.as_str(), tolerance],
            )?;
            assert!(run(cli).is_err(), "{} was accepted", tolerance);
            assert!(!Path::new(&output).exists());
        }
        Ok(())
    }
}
