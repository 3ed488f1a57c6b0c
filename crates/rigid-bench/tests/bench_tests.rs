//! Integration tests for rigid-bench.

use rigid_bench::metrics::BenchmarkMetrics;
use rigid_bench::runner::BenchmarkRunner;
use rigid_bench::scenarios::{HandleMotion, Scenario, ScenarioKind};
use rigid_math::DVec3;
use rigid_solver::ArapConfig;

fn sample_metrics(scenario: &str) -> BenchmarkMetrics {
    BenchmarkMetrics {
        scenario: scenario.into(),
        total_wall_time: 1.5,
        frames: 100,
        avg_step_time: 0.015,
        min_step_time: 0.01,
        max_step_time: 0.02,
        final_energy: 1e-5,
        max_displacement: 0.5,
        avg_iterations: 10.0,
        vertex_count: 441,
        triangle_count: 800,
        handle_count: 2,
    }
}

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn translate_triangle_setup() {
    let s = Scenario::translate_triangle();
    assert_eq!(s.kind, ScenarioKind::TranslateTriangle);
    assert_eq!(s.mesh.vertex_count(), 3);
    assert_eq!(s.handle_count(), 1);
}

#[test]
fn grid_bend_setup() {
    let s = Scenario::grid_bend();
    assert_eq!(s.mesh.vertex_count(), 81); // 9×9
    assert_eq!(s.mesh.triangle_count(), 128);
    // Opposite corners: bottom-left fixed, top-right moving
    assert_eq!(s.fixed, vec![72]);
    assert_eq!(s.moving, vec![8]);
}

#[test]
fn strip_twist_setup() {
    let s = Scenario::strip_twist();
    assert_eq!(s.fixed.len(), 4);
    assert_eq!(s.moving.len(), 4);
    assert_eq!(s.handle_count(), 8);
    for &v in &s.moving {
        assert!((s.mesh.position_dvec3(v as usize).x - 2.0).abs() < 1e-12);
    }
}

#[test]
fn all_scenarios() {
    assert_eq!(ScenarioKind::all().len(), 3);
    for &kind in ScenarioKind::all() {
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(ScenarioKind::from_name("hanging_sheet"), None);
}

#[test]
fn motion_reaches_target_at_last_frame() {
    let s = Scenario::grid_bend();
    let corner = s.mesh.position_dvec3(8);
    let pivot = s.mesh.position_dvec3(72);
    let end = s.transform_at(s.frames - 1).transform_point3(corner);

    // 90° about Y through the pivot keeps y and the radius in XZ
    assert!((end.y - corner.y).abs() < 1e-12);
    let r0 = (corner - pivot).with_y(0.0).length();
    let r1 = (end - pivot).with_y(0.0).length();
    assert!((r0 - r1).abs() < 1e-12);
    assert!((end.x - pivot.x).abs() < 1e-12, "end = {end:?}");

    let half = HandleMotion::Translate(DVec3::new(2.0, 0.0, 0.0)).transform_at(0.5);
    assert!((half.translation.x - 1.0).abs() < 1e-12);
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_translate_triangle() {
    let scenario = Scenario::translate_triangle();
    let (metrics, deformer) = BenchmarkRunner::run_with_deformer(&scenario).unwrap();

    assert_eq!(metrics.scenario, "translate_triangle");
    assert_eq!(metrics.frames, 10);
    assert!(metrics.total_wall_time > 0.0);
    assert!(metrics.final_energy < 1e-18, "energy = {}", metrics.final_energy);

    let offset = DVec3::new(0.5, 0.25, 0.1);
    assert!((metrics.max_displacement - offset.length()).abs() < 1e-9);
    for (p, x) in deformer.positions().iter().zip(scenario.mesh.positions()) {
        assert!((*p - x - offset).length() < 1e-9);
    }
}

#[test]
fn run_strip_twist_short() {
    let mut scenario = Scenario::strip_twist();
    scenario.frames = 4;
    let metrics = BenchmarkRunner::run(&scenario).unwrap();
    // Top and bottom of the twisted end swap sides
    assert!(metrics.max_displacement > 0.4);
    assert!(metrics.final_energy > 0.0);
    assert!(metrics.min_step_time <= metrics.max_step_time);
}

#[test]
fn run_all_scenarios_short() {
    for &kind in ScenarioKind::all() {
        let mut scenario = Scenario::from_kind(kind).with_config(ArapConfig::with_iterations(3));
        scenario.frames = 3;
        let metrics = BenchmarkRunner::run(&scenario).unwrap();
        assert_eq!(metrics.scenario, kind.name());
        assert!((metrics.avg_iterations - 3.0).abs() < 1e-12);
        assert!(metrics.total_wall_time >= 0.0);
    }
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn metrics_csv_output() {
    let csv_row = sample_metrics("test").to_csv_row();
    assert!(csv_row.contains("test"));
    assert!(csv_row.contains("441"));
    assert!(csv_row.contains("800"));
}

#[test]
fn metrics_csv_multi() {
    let csv = BenchmarkMetrics::to_csv(&[sample_metrics("a"), sample_metrics("b")]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3); // Header + 2 data rows
    assert!(lines[0].contains("scenario"));
    assert_eq!(
        lines[0].split(',').count(),
        lines[1].split(',').count(),
        "header and rows must have the same column count"
    );
}

#[test]
fn metrics_json_round_trip() {
    let json = serde_json::to_string(&sample_metrics("test")).unwrap();
    let recovered: BenchmarkMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered.frames, 100);
    assert_eq!(recovered.handle_count, 2);
}
