//! Integration tests for rigid-solver.

use rigid_math::decomposition::is_proper_rotation;
use rigid_math::{DMat3, DQuat, DVec3};
use rigid_mesh::generators::{cylinder, quad_grid, single_triangle};
use rigid_mesh::topology::Topology;
use rigid_mesh::TriangleMesh;
use rigid_solver::config::{ArapConfig, DynamicsConfig};
use rigid_solver::local_step::fit_rotations;
use rigid_solver::partition::{ConstraintPartition, Slot};
use rigid_solver::session::{ArapSession, SessionState};
use rigid_solver::weights::{lumped_mass, triangle_quality, CotangentWeights};
use rigid_telemetry::{EventBus, EventKind, VecSink};
use rigid_types::ErrorKind;

fn assert_close(a: DVec3, b: DVec3, tol: f64, what: &str) {
    assert!(
        (a - b).length() < tol,
        "{what}: {a:?} vs {b:?} (distance {})",
        (a - b).length()
    );
}

fn weights_of(mesh: &TriangleMesh) -> CotangentWeights {
    let topology = Topology::build(mesh).unwrap();
    CotangentWeights::compute(mesh, &topology, 1e-14)
}

fn config(iterations: u32) -> ArapConfig {
    ArapConfig::with_iterations(iterations)
}

/// 5×5 vertex grid: corners are 0, 4, 20, 24; the center is 12.
fn grid() -> TriangleMesh {
    quad_grid(4, 4, 1.0, 1.0)
}

/// `mesh` uniformly scaled about the origin.
fn scaled(mesh: &TriangleMesh, factor: f64) -> TriangleMesh {
    let positions: Vec<DVec3> = mesh.positions().iter().map(|p| *p * factor).collect();
    TriangleMesh::from_positions(&positions, &mesh.indices).unwrap()
}

/// Left column fixed, right column lifted and pulled inwards.
fn bend_targets(mesh: &TriangleMesh) -> (Vec<usize>, Vec<DVec3>) {
    let left = [0, 5, 10, 15, 20];
    let right = [4, 9, 14, 19, 24];
    let mut indices = Vec::new();
    let mut targets = Vec::new();
    for &v in &left {
        indices.push(v);
        targets.push(mesh.position_dvec3(v));
    }
    for &v in &right {
        indices.push(v);
        targets.push(mesh.position_dvec3(v) + DVec3::new(-0.2, 0.0, 0.4));
    }
    (indices, targets)
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn config_default() {
    let config = ArapConfig::default();
    assert_eq!(config.max_iterations, 10);
    assert_eq!(config.tolerance, 0.0);
    assert!(config.dynamics.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn config_presets() {
    assert!(ArapConfig::interactive().max_iterations < ArapConfig::default().max_iterations);
    let hq = ArapConfig::high_quality();
    assert_eq!(hq.max_iterations, 100);
    assert!(hq.tolerance > 0.0);
    let dynamic = ArapConfig::with_dynamics(DynamicsConfig::default());
    assert!(dynamic.validate().is_ok());
    assert!(dynamic.dynamics.is_some());
}

#[test]
fn config_validation() {
    let zero = ArapConfig::with_iterations(0);
    assert_eq!(zero.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);

    let negative = ArapConfig {
        tolerance: -1.0,
        ..Default::default()
    };
    assert_eq!(negative.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);

    let massless = ArapConfig::with_dynamics(DynamicsConfig {
        inertia: 0.0,
        ..Default::default()
    });
    assert_eq!(massless.validate().unwrap_err().kind(), ErrorKind::InvalidConfig);
}

#[test]
fn config_toml_roundtrip() {
    let config = ArapConfig::with_dynamics(DynamicsConfig {
        inertia: 2.0,
        time_step: 0.01,
        external_acceleration: [0.0, -9.81, 0.0],
    });
    let text = config.to_toml_string().unwrap();
    let back = ArapConfig::from_toml_str(&text).unwrap();
    assert_eq!(config, back);

    let plain = ArapConfig::interactive();
    let back = ArapConfig::from_toml_str(&plain.to_toml_string().unwrap()).unwrap();
    assert_eq!(plain, back);
}

#[test]
fn config_toml_partial_and_invalid() {
    let config = ArapConfig::from_toml_str("max_iterations = 3\nparallel = false\n").unwrap();
    assert_eq!(config.max_iterations, 3);
    assert!(!config.parallel);
    assert_eq!(config.degenerate_threshold, ArapConfig::default().degenerate_threshold);

    let err = ArapConfig::from_toml_str("max_iterations = \"many\"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);

    let err = ArapConfig::from_toml_str("max_iterations = 0").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

// ─── Weight Tests ─────────────────────────────────────────────

#[test]
fn right_triangle_weights() {
    let weights = weights_of(&single_triangle());
    // Edges sorted: (0,1), (0,2), (1,2). Opposite angles 45°, 45°, 90°.
    assert!((weights.edge_weights[0] - 0.5).abs() < 1e-12);
    assert!((weights.edge_weights[1] - 0.5).abs() < 1e-12);
    assert!(weights.edge_weights[2].abs() < 1e-12);
}

#[test]
fn interior_edge_sums_both_sides() {
    // Two equilateral triangles sharing edge (0, 1).
    let h = 3.0_f64.sqrt() / 2.0;
    let positions = [
        DVec3::ZERO,
        DVec3::X,
        DVec3::new(0.5, h, 0.0),
        DVec3::new(0.5, -h, 0.0),
    ];
    let mesh = TriangleMesh::from_positions(&positions, &[0, 1, 2, 1, 0, 3]).unwrap();
    let topology = Topology::build(&mesh).unwrap();
    let weights = CotangentWeights::compute(&mesh, &topology, 1e-14);

    let cot60 = 1.0 / 3.0_f64.sqrt();
    let shared = topology.edge_index(0, 1).unwrap();
    assert!((weights.edge_weights[shared] - cot60).abs() < 1e-12);
    let boundary = topology.edge_index(1, 2).unwrap();
    assert!((weights.edge_weights[boundary] - 0.5 * cot60).abs() < 1e-12);
}

#[test]
fn obtuse_triangle_gives_negative_weight() {
    let positions = [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::new(1.0, 0.2, 0.0)];
    let mesh = TriangleMesh::from_positions(&positions, &[0, 1, 2]).unwrap();
    let weights = weights_of(&mesh);
    // Edge (0,1) faces the obtuse angle at vertex 2.
    assert!(weights.edge_weights[0] < 0.0);
}

#[test]
fn degenerate_triangle_contributes_nothing() {
    let positions = [DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)];
    let mesh = TriangleMesh::from_positions(&positions, &[0, 1, 2]).unwrap();
    let weights = weights_of(&mesh);
    assert!(weights.edge_weights.iter().all(|&w| w == 0.0));
}

#[test]
fn weights_do_not_depend_on_mesh_scale() {
    let mesh = grid();
    let reference = weights_of(&mesh);
    for factor in [1e-9, 1e-7, 1e5] {
        let weights = weights_of(&scaled(&mesh, factor));
        for (w, r) in weights.edge_weights.iter().zip(&reference.edge_weights) {
            assert!((w - r).abs() < 1e-9, "scale {factor}: {w} vs {r}");
        }
    }
    assert!(triangle_quality(DVec3::ZERO, DVec3::ZERO, DVec3::ZERO) == 0.0);
}

#[test]
fn laplacian_is_symmetric_with_zero_row_sums() {
    let mesh = cylinder(0.5, 1.0, 3, 8);
    let weights = weights_of(&mesh);
    let laplacian = weights.laplacian();
    assert!(laplacian.is_symmetric(1e-12));
    for row in 0..laplacian.rows {
        let sum: f64 = laplacian.row(row).map(|(_, v)| v).sum();
        assert!(sum.abs() < 1e-12, "row {row} sums to {sum}");
    }
    // Cells are sorted by neighbor.
    for cell in &weights.cells {
        assert!(cell.windows(2).all(|w| w[0].neighbor < w[1].neighbor));
    }
}

#[test]
fn lumped_mass_sums_to_area() {
    let mesh = quad_grid(3, 2, 3.0, 2.0);
    let total: f64 = lumped_mass(&mesh).iter().sum();
    assert!((total - 6.0).abs() < 1e-12);
}

// ─── Partition Tests ──────────────────────────────────────────

#[test]
fn partition_slots() {
    let partition = ConstraintPartition::new(5, &[3, 0]).unwrap();
    assert_eq!(partition.free, vec![1, 2, 4]);
    assert_eq!(partition.constrained, vec![3, 0]);
    assert_eq!(partition.slots[0], Slot::Constrained(1));
    assert_eq!(partition.slots[3], Slot::Constrained(0));
    assert_eq!(partition.slots[4], Slot::Free(2));
}

#[test]
fn partition_rejects_bad_constraints() {
    let err = ConstraintPartition::new(5, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyConstraintSet);

    let err = ConstraintPartition::new(5, &[1, 5]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConstraintIndex);

    let err = ConstraintPartition::new(5, &[2, 1, 2]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConstraintIndex);
}

#[test]
fn reduced_blocks_have_expected_shape() {
    let mesh = grid();
    let weights = weights_of(&mesh);
    let partition = ConstraintPartition::new(mesh.vertex_count(), &[0, 24]).unwrap();
    let reduced = partition.reduce(&weights.laplacian(), None);
    assert_eq!(reduced.k_ff.rows, 23);
    assert_eq!(reduced.k_fc.cols, 2);
    assert!(reduced.k_ff.is_symmetric(1e-12));
}

// ─── Local Step Tests ─────────────────────────────────────────

#[test]
fn rest_pose_fits_identity() {
    let mesh = cylinder(1.0, 2.0, 4, 10);
    let weights = weights_of(&mesh);
    let rest = mesh.positions();
    let fit = fit_rotations(&weights.cells, &rest, &rest, 1e-14, true);
    assert_eq!(fit.degenerate, 0);
    for r in &fit.rotations {
        assert!((*r - DMat3::IDENTITY).abs_diff_eq(DMat3::ZERO, 1e-9), "{r:?}");
    }
}

#[test]
fn rigidly_rotated_cells_fit_that_rotation() {
    let mesh = cylinder(1.0, 2.0, 4, 10);
    let weights = weights_of(&mesh);
    let rest = mesh.positions();
    let q = DQuat::from_axis_angle(DVec3::new(1.0, 2.0, -0.5).normalize(), 1.1);
    let current: Vec<DVec3> = rest.iter().map(|p| q * *p + DVec3::X).collect();
    let fit = fit_rotations(&weights.cells, &rest, &current, 1e-14, false);
    let expected = DMat3::from_quat(q);
    for r in &fit.rotations {
        assert!(r.abs_diff_eq(expected, 1e-9));
    }
}

#[test]
fn tiny_cells_are_not_degenerate() {
    let mesh = scaled(&cylinder(1.0, 2.0, 4, 10), 1e-8);
    let weights = weights_of(&mesh);
    let rest = mesh.positions();
    let q = DQuat::from_rotation_z(0.7);
    let current: Vec<DVec3> = rest.iter().map(|p| q * *p).collect();
    let fit = fit_rotations(&weights.cells, &rest, &current, 1e-14, false);
    assert_eq!(fit.degenerate, 0);
    let expected = DMat3::from_quat(q);
    for r in &fit.rotations {
        assert!(r.abs_diff_eq(expected, 1e-9), "{r:?}");
    }
}

#[test]
fn parallel_and_sequential_fits_agree() {
    let mesh = grid();
    let weights = weights_of(&mesh);
    let rest = mesh.positions();
    let current: Vec<DVec3> = rest
        .iter()
        .map(|p| DVec3::new(p.x, p.y, (p.x * 3.0).sin() * 0.3))
        .collect();
    let a = fit_rotations(&weights.cells, &rest, &current, 1e-14, true);
    let b = fit_rotations(&weights.cells, &rest, &current, 1e-14, false);
    assert_eq!(a.rotations, b.rotations);
}

// ─── Session Lifecycle Tests ──────────────────────────────────

#[test]
fn create_rejects_empty_constraints() {
    let err = ArapSession::create(&grid(), &[], config(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyConstraintSet);
}

#[test]
fn create_rejects_out_of_range_triangle() {
    let mut mesh = single_triangle();
    mesh.indices[1] = 3;
    let err = ArapSession::create(&mesh, &[0], config(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTopology);
}

#[test]
fn create_rejects_bad_constraint_index() {
    let err = ArapSession::create(&single_triangle(), &[0, 3], config(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConstraintIndex);
    let err = ArapSession::create(&single_triangle(), &[1, 1], config(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConstraintIndex);
}

#[test]
fn create_rejects_invalid_config() {
    let err = ArapSession::create(&single_triangle(), &[0], config(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn unanchored_component_is_singular() {
    // Two disjoint triangles; only the first carries a handle.
    let positions = [
        DVec3::ZERO,
        DVec3::X,
        DVec3::Y,
        DVec3::new(5.0, 0.0, 0.0),
        DVec3::new(6.0, 0.0, 0.0),
        DVec3::new(5.0, 1.0, 0.0),
    ];
    let mesh = TriangleMesh::from_positions(&positions, &[0, 1, 2, 3, 4, 5]).unwrap();
    let err = ArapSession::create(&mesh, &[0], config(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SingularSystem);

    // The inertia term anchors the second component.
    let dynamic = ArapConfig::with_dynamics(DynamicsConfig::default());
    assert!(ArapSession::create(&mesh, &[0], dynamic).is_ok());
}

#[test]
fn dispose_then_use_fails() {
    let mut session = ArapSession::create(&single_triangle(), &[0], config(3)).unwrap();
    assert_eq!(session.state(), SessionState::Ready);
    session.dispose().unwrap();
    assert_eq!(session.state(), SessionState::Disposed);

    let kind = |r: rigid_types::RigidError| r.kind();
    assert_eq!(kind(session.step(&[DVec3::ZERO]).unwrap_err()), ErrorKind::UseAfterDispose);
    assert_eq!(kind(session.positions().unwrap_err()), ErrorKind::UseAfterDispose);
    assert_eq!(kind(session.energy().unwrap_err()), ErrorKind::UseAfterDispose);
    assert_eq!(kind(session.dispose().unwrap_err()), ErrorKind::UseAfterDispose);
}

#[test]
fn wrong_target_count_keeps_session_ready() {
    let mesh = grid();
    let mut session = ArapSession::create(&mesh, &[0, 24], config(3)).unwrap();
    let err = session.step(&[DVec3::ZERO]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    let err = session.step(&[DVec3::ZERO, DVec3::splat(f64::NAN)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(session.frame().unwrap(), 0);
    let targets = [mesh.position_dvec3(0), mesh.position_dvec3(24)];
    assert!(session.step(&targets).is_ok());
    assert_eq!(session.frame().unwrap(), 1);
}

#[test]
fn accessors_report_creation_data() {
    let mesh = grid();
    let session = ArapSession::create(&mesh, &[24, 0], config(3)).unwrap();
    assert_eq!(session.vertex_count().unwrap(), 25);
    assert_eq!(session.triangle_count().unwrap(), 32);
    assert_eq!(session.constraint_indices().unwrap(), &[24, 0]);
    assert_eq!(session.positions().unwrap(), mesh.positions().as_slice());
    assert_eq!(session.rest_positions().unwrap(), mesh.positions().as_slice());
    assert_eq!(
        session.edge_weights().unwrap().len(),
        session.topology().unwrap().edges.len()
    );
    assert_eq!(session.energy().unwrap(), 0.0);
}

#[test]
fn write_positions_flattens_row_major() {
    let mut session = ArapSession::create(&single_triangle(), &[0], config(3)).unwrap();
    session.step(&[DVec3::new(1.0, 2.0, 3.0)]).unwrap();

    let mut out = vec![0.0; 9];
    session.write_positions(&mut out).unwrap();
    let positions = session.positions().unwrap();
    for (v, p) in positions.iter().enumerate() {
        assert_eq!(&out[v * 3..v * 3 + 3], &p.to_array());
    }

    let mut short = vec![0.0; 8];
    assert_eq!(
        session.write_positions(&mut short).unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
}

// ─── ARAP Property Tests ──────────────────────────────────────

#[test]
fn rest_targets_are_a_no_op() {
    for mesh in [grid(), cylinder(0.5, 1.0, 3, 8)] {
        let handles = vec![0, 1, mesh.vertex_count() - 1];
        let targets: Vec<DVec3> = handles.iter().map(|&v| mesh.position_dvec3(v)).collect();
        let mut session = ArapSession::create(&mesh, &handles, config(10)).unwrap();
        let result = session.step(&targets).unwrap();
        assert_eq!(result.iterations, 10);
        assert!(result.energy < 1e-18);
        for (p, r) in session.positions().unwrap().iter().zip(mesh.positions()) {
            assert_close(*p, r, 1e-9, "rest no-op");
        }
    }
}

#[test]
fn single_triangle_follows_translation() {
    let mesh = single_triangle();
    let shift = DVec3::new(0.3, -0.2, 0.5);
    let mut session = ArapSession::create(&mesh, &[0], config(10)).unwrap();
    session.step(&[shift]).unwrap();
    let positions = session.positions().unwrap();
    for v in 0..3 {
        assert_close(positions[v], mesh.position_dvec3(v) + shift, 1e-9, "translated vertex");
    }
}

#[test]
fn rotations_are_always_proper() {
    let mesh = grid();
    let (handles, targets) = bend_targets(&mesh);
    let mut session = ArapSession::create(&mesh, &handles, config(4)).unwrap();
    for _ in 0..3 {
        session.step(&targets).unwrap();
        for (v, r) in session.rotations().unwrap().iter().enumerate() {
            assert!(is_proper_rotation(r, 1e-9), "cell {v}: {r:?}");
        }
    }
}

#[test]
fn rigid_targets_give_rigid_result() {
    let mesh = grid();
    let handles = [0, 4, 20];
    let q = DQuat::from_axis_angle(DVec3::new(1.0, 1.0, 1.0).normalize(), 0.8);
    let shift = DVec3::new(0.5, -1.0, 2.0);
    let rigid = |p: DVec3| q * p + shift;
    let targets: Vec<DVec3> = handles.iter().map(|&v| rigid(mesh.position_dvec3(v))).collect();

    let config = ArapConfig {
        max_iterations: 1000,
        tolerance: 1e-14,
        ..Default::default()
    };
    let mut session = ArapSession::create(&mesh, &handles, config).unwrap();
    session.step(&targets).unwrap();
    for (v, p) in session.positions().unwrap().iter().enumerate() {
        assert_close(*p, rigid(mesh.position_dvec3(v)), 1e-6, "rigid motion");
    }
}

#[test]
fn converged_step_is_idempotent() {
    let mesh = grid();
    let (handles, targets) = bend_targets(&mesh);
    let converge = ArapConfig {
        max_iterations: 2000,
        tolerance: 1e-13,
        ..Default::default()
    };
    let mut session = ArapSession::create(&mesh, &handles, converge).unwrap();
    session.step(&targets).unwrap();
    let first = session.positions().unwrap().to_vec();

    let result = session.step(&targets).unwrap();
    assert!(result.final_residual < 1e-6);
    for (a, b) in first.iter().zip(session.positions().unwrap()) {
        assert_close(*a, *b, 1e-6, "second step");
    }
}

#[test]
fn energy_decreases_with_iterations() {
    let mesh = grid();
    let (handles, targets) = bend_targets(&mesh);
    let mut last = f64::INFINITY;
    for iterations in 1..=8 {
        let mut session = ArapSession::create(&mesh, &handles, config(iterations)).unwrap();
        let energy = session.step(&targets).unwrap().energy;
        assert!(
            energy <= last * (1.0 + 1e-9) + 1e-15,
            "{iterations} iterations: {energy} > {last}"
        );
        last = energy;
    }
    assert!(last > 0.0);
}

#[test]
fn grid_corner_traces_circular_arc() {
    let mesh = grid();
    let pivot = mesh.position_dvec3(20);
    let corner = mesh.position_dvec3(4);
    let center_rest = mesh.position_dvec3(12);
    let radius = (center_rest - pivot).length();

    let mut session = ArapSession::create(&mesh, &[20, 4], config(100)).unwrap();
    for step in 0..=9 {
        let angle = (step as f64 * 10.0).to_radians();
        let q = DQuat::from_rotation_z(angle);
        let target = pivot + q * (corner - pivot);
        session.step(&[pivot, target]).unwrap();

        let center = session.positions().unwrap()[12];
        let offset = center - pivot;
        assert!(
            (offset.length() - radius).abs() < 0.02 * radius,
            "step {step}: radius {} vs {radius}",
            offset.length()
        );
        let expected = std::f64::consts::FRAC_PI_4 + angle;
        let actual = offset.y.atan2(offset.x);
        assert!(
            (actual - expected).abs() < 3.0_f64.to_radians(),
            "step {step}: angle {actual} vs {expected}"
        );
        assert!(center.z.abs() < 1e-9);
    }
}

#[test]
fn small_meshes_create_and_step() {
    let factor = 1e-7;
    let mesh = scaled(&grid(), factor);
    let rest = mesh.positions();
    let mut session = ArapSession::create(&mesh, &[0, 24], config(5)).unwrap();

    let shift = DVec3::new(0.1, -0.2, 0.05) * factor;
    let result = session.step(&[rest[0] + shift, rest[24] + shift]).unwrap();
    assert_eq!(result.degenerate_cells, 0);
    for (p, r) in session.positions().unwrap().iter().zip(&rest) {
        assert_close(*p, *r + shift, 1e-9 * factor, "translated small grid");
    }
}

#[test]
fn all_vertices_constrained() {
    let mesh = single_triangle();
    let targets = [DVec3::new(0.0, 0.0, 1.0), DVec3::new(2.0, 0.0, 1.0), DVec3::new(0.0, 2.0, 1.0)];
    let mut session = ArapSession::create(&mesh, &[0, 1, 2], config(2)).unwrap();
    session.step(&targets).unwrap();
    assert_eq!(session.positions().unwrap(), &targets);
}

#[test]
fn degenerate_cells_fall_back_to_identity() {
    // Vertex 3 sits on edge (1, 2): triangle (1, 2, 3) has zero area.
    let positions = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(0.5, 0.5, 0.0)];
    let mesh = TriangleMesh::from_positions(&positions, &[0, 1, 2, 1, 2, 3]).unwrap();
    let mut session = ArapSession::create(&mesh, &[0, 3], config(3)).unwrap();
    let result = session.step(&[positions[0], positions[3]]).unwrap();
    assert_eq!(result.degenerate_cells, 1);
    assert_eq!(session.rotations().unwrap()[3], DMat3::IDENTITY);
    for (p, r) in session.positions().unwrap().iter().zip(positions) {
        assert_close(*p, r, 1e-9, "degenerate mesh at rest");
    }
}

#[test]
fn parallel_flag_does_not_change_results() {
    let mesh = grid();
    let (handles, targets) = bend_targets(&mesh);
    let run = |parallel: bool| {
        let config = ArapConfig {
            parallel,
            ..config(6)
        };
        let mut session = ArapSession::create(&mesh, &handles, config).unwrap();
        session.step(&targets).unwrap();
        session.positions().unwrap().to_vec()
    };
    assert_eq!(run(true), run(false));
}

#[test]
fn early_exit_at_rest() {
    let mesh = grid();
    let mut session = ArapSession::create(&mesh, &[0], ArapConfig::high_quality()).unwrap();
    let result = session.step(&[mesh.position_dvec3(0)]).unwrap();
    assert!(result.converged);
    assert_eq!(result.iterations, 1);
}

// ─── Dynamics Tests ───────────────────────────────────────────

#[test]
fn dynamics_at_rest_stays_at_rest() {
    let mesh = grid();
    let config = ArapConfig::with_dynamics(DynamicsConfig::default());
    let mut session = ArapSession::create(&mesh, &[0, 4], config).unwrap();
    let targets = [mesh.position_dvec3(0), mesh.position_dvec3(4)];
    for _ in 0..3 {
        session.step(&targets).unwrap();
    }
    for (p, r) in session.positions().unwrap().iter().zip(mesh.positions()) {
        assert_close(*p, r, 1e-9, "dynamics at rest");
    }
}

#[test]
fn dynamics_sags_under_acceleration() {
    let mesh = grid();
    let top = [0, 1, 2, 3, 4];
    let targets: Vec<DVec3> = top.iter().map(|&v| mesh.position_dvec3(v)).collect();
    let config = ArapConfig {
        max_iterations: 1,
        ..ArapConfig::with_dynamics(DynamicsConfig {
            inertia: 1.0,
            time_step: 0.1,
            external_acceleration: [0.0, 0.0, -9.81],
        })
    };
    let mut session = ArapSession::create(&mesh, &top, config).unwrap();
    session.step(&targets).unwrap();
    let positions = session.positions().unwrap();
    for v in 5..25 {
        assert!(positions[v].z < 0.0, "vertex {v} at {:?}", positions[v]);
    }
    for v in top {
        assert_eq!(positions[v], mesh.position_dvec3(v));
    }
}

// ─── Telemetry Tests ──────────────────────────────────────────

#[test]
fn session_emits_lifecycle_events() {
    let sink = VecSink::new();
    let log = sink.log();
    let mesh = grid();
    let mut session =
        ArapSession::create_with_bus(&mesh, &[0], config(3), EventBus::with_sink(Box::new(sink)))
            .unwrap();
    session.step(&[mesh.position_dvec3(0)]).unwrap();
    session.dispose().unwrap();

    let events = log.lock().unwrap();
    assert!(matches!(events[0].kind, EventKind::SessionCreated { vertex_count: 25, .. }));
    assert!(matches!(events[1].kind, EventKind::StepBegin { max_iterations: 3 }));
    let iterations = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::SolverIteration { .. }))
        .count();
    assert_eq!(iterations, 3);
    assert!(events.iter().any(|e| matches!(e.kind, EventKind::Convergence { iterations: 3, .. })));
    assert!(matches!(events.last().unwrap().kind, EventKind::Disposed));
    assert_eq!(events.last().unwrap().step, 1);
}
