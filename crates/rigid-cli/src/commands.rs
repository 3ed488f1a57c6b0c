//! CLI command implementations.

use serde::Serialize;

use rigid_bench::metrics::BenchmarkMetrics;
use rigid_bench::runner::BenchmarkRunner;
use rigid_bench::scenarios::{Scenario, ScenarioKind};
use rigid_mesh::TriangleMesh;
use rigid_solver::ArapConfig;

/// Final pose written by `rigid deform`.
#[derive(Serialize)]
struct DeformOutput {
    scenario: String,
    frames: u32,
    iterations: u32,
    energy: f64,
    /// One `[x, y, z]` per vertex, rest-pose order.
    positions: Vec<[f64; 3]>,
}

fn load_config(path: &str) -> Result<ArapConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(ArapConfig::from_toml_str(&content)?)
}

fn scenario_kind(name: &str) -> Result<ScenarioKind, Box<dyn std::error::Error>> {
    ScenarioKind::from_name(name).ok_or_else(|| {
        let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
        format!("Unknown scenario: '{name}'. Available: {}", available.join(", ")).into()
    })
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    output_path: Option<&str>,
    config_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Rigid Benchmark Suite");
    println!("═════════════════════");
    println!();

    let config = config_path.map(load_config).transpose()?;
    if let Some(path) = config_path {
        println!("Config: {path}");
        println!();
    }

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_kind(scenario_name)?]
    };

    let mut all_metrics = Vec::new();

    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind);
        if let Some(ref config) = config {
            scenario = scenario.with_config(config.clone());
        }

        println!(
            "Running: {} ({} verts, {} tris, {} handles, {} frames)",
            kind.name(),
            scenario.mesh.vertex_count(),
            scenario.mesh.triangle_count(),
            scenario.handle_count(),
            scenario.frames,
        );

        let metrics =
            BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
        println!("  Avg iters:     {:.1}", metrics.avg_iterations);
        println!("  Final energy:  {:.6e}", metrics.final_energy);
        println!("  Max displace:  {:.4}", metrics.max_displacement);
        println!();

        all_metrics.push(metrics);
    }

    if let Some(path) = output_path {
        let csv = BenchmarkMetrics::to_csv(&all_metrics);
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
    }

    Ok(())
}

/// Deform a scenario and write the final pose.
pub fn deform(
    scenario_name: &str,
    frames: Option<u32>,
    output_path: Option<&str>,
    config_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = Scenario::from_kind(scenario_kind(scenario_name)?);
    if let Some(path) = config_path {
        scenario = scenario.with_config(load_config(path)?);
    }
    if let Some(frames) = frames {
        scenario.frames = frames;
    }

    let (metrics, deformer) = BenchmarkRunner::run_with_deformer(&scenario)
        .map_err(|e| format!("Deformation failed: {e}"))?;

    let output = DeformOutput {
        scenario: metrics.scenario,
        frames: metrics.frames,
        iterations: deformer.last_result().map_or(0, |r| r.iterations),
        energy: metrics.final_energy,
        positions: deformer.positions().iter().map(|p| p.to_array()).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match output_path {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!(
                "Deformed {} ({} frames, energy {:.6e}) → {path}",
                output.scenario, output.frames, output.energy
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Validate a mesh or config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Rigid Validator");
    println!("───────────────");
    println!();

    if path.ends_with(".toml") {
        println!("Validating config: {path}");
        match load_config(path) {
            Ok(config) => println!(
                "✅ Config is valid ({} iterations, tolerance {:e}).",
                config.max_iterations, config.tolerance
            ),
            Err(e) => println!("❌ Config validation failed: {e}"),
        }
    } else if path.ends_with(".json") {
        println!("Validating mesh: {path}");
        let content = std::fs::read_to_string(path)?;
        let mesh: TriangleMesh = serde_json::from_str(&content)?;
        match mesh.validate() {
            Ok(()) => println!(
                "✅ Mesh is valid ({} verts, {} tris).",
                mesh.vertex_count(),
                mesh.triangle_count()
            ),
            Err(e) => println!("❌ Mesh validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (config) or .json (mesh).");
    }

    Ok(())
}
