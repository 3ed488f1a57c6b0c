//! Benchmark runner: drives a [`Deformer`] through a scenario and collects metrics.

use std::time::Instant;

use rigid_math::DAffine3;
use rigid_solver::Deformer;
use rigid_types::RigidResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario.
    ///
    /// Returns metrics for the completed run.
    pub fn run(scenario: &Scenario) -> RigidResult<BenchmarkMetrics> {
        Self::run_with_deformer(scenario).map(|(metrics, _)| metrics)
    }

    /// Run a single scenario and hand back the deformer in its final pose.
    pub fn run_with_deformer(scenario: &Scenario) -> RigidResult<(BenchmarkMetrics, Deformer)> {
        let mut deformer = Deformer::new(scenario.mesh.clone(), scenario.config.clone())?;
        if !scenario.fixed.is_empty() {
            deformer.add_group(&scenario.fixed, DAffine3::IDENTITY)?;
        }
        let moving = deformer.add_group(&scenario.moving, DAffine3::IDENTITY)?;

        let mut step_times: Vec<f64> = Vec::with_capacity(scenario.frames as usize);
        let mut total_iterations: u64 = 0;
        let mut final_energy = 0.0;

        let total_start = Instant::now();

        for frame in 0..scenario.frames {
            deformer.set_transform(moving, scenario.transform_at(frame))?;
            deformer.step()?;
            if let Some(result) = deformer.last_result() {
                step_times.push(result.wall_time);
                total_iterations += u64::from(result.iterations);
                final_energy = result.energy;
            }
        }

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let rest = scenario.mesh.positions();
        let max_displacement = deformer
            .positions()
            .iter()
            .zip(&rest)
            .map(|(p, x)| p.distance(*x))
            .fold(0.0f64, f64::max);

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().copied().fold(f64::MAX, f64::min)
        };
        let max_step = step_times.iter().copied().fold(0.0, f64::max);
        let avg_iter = if scenario.frames > 0 {
            total_iterations as f64 / f64::from(scenario.frames)
        } else {
            0.0
        };

        tracing::debug!(
            scenario = scenario.kind.name(),
            frames = scenario.frames,
            total_wall_time,
            "benchmark finished"
        );

        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            total_wall_time,
            frames: scenario.frames,
            avg_step_time: avg_step,
            min_step_time: min_step,
            max_step_time: max_step,
            final_energy,
            max_displacement,
            avg_iterations: avg_iter,
            vertex_count: scenario.mesh.vertex_count(),
            triangle_count: scenario.mesh.triangle_count(),
            handle_count: scenario.handle_count(),
        };
        Ok((metrics, deformer))
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all() -> RigidResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            let scenario = Scenario::from_kind(kind);
            results.push(Self::run(&scenario)?);
        }
        Ok(results)
    }
}
