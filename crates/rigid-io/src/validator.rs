//! Request validation and session construction.
//!
//! Validates boundary requests before the solver receives them, catching
//! shape errors early with clear diagnostics. Semantic checks (index
//! ranges, duplicates, singularity) stay with the solver.

use rigid_mesh::TriangleMesh;
use rigid_solver::ArapSession;
use rigid_types::{RigidError, RigidResult};

use crate::buffers::{constraint_indices, points_from_flat, triangle_indices};
use crate::contract::CreateRequest;

/// Validates the shape of a create request.
///
/// Checks:
/// - Position buffer holds whole, finite points
/// - Triangle buffer holds whole triangles
/// - Iteration count is at least 1
pub fn validate_create(request: &CreateRequest) -> RigidResult<()> {
    if request.positions.len() % 3 != 0 {
        return Err(RigidError::InvalidTopology(format!(
            "Position buffer length {} is not a multiple of 3",
            request.positions.len()
        )));
    }
    if let Some(k) = request.positions.iter().position(|v| !v.is_finite()) {
        return Err(RigidError::InvalidTopology(format!(
            "Vertex {} has a non-finite coordinate",
            k / 3
        )));
    }
    if request.triangles.len() % 3 != 0 {
        return Err(RigidError::InvalidTopology(format!(
            "Triangle buffer length {} is not a multiple of 3",
            request.triangles.len()
        )));
    }
    if request.iterations == 0 {
        return Err(RigidError::InvalidConfig(
            "Iteration count must be >= 1".into(),
        ));
    }
    Ok(())
}

/// Validates targets for a session with `constraint_count` handles.
pub fn validate_targets(targets: &[f64], constraint_count: usize) -> RigidResult<()> {
    if targets.len() != constraint_count * 3 {
        return Err(RigidError::InvalidInput(format!(
            "Target buffer holds {} values, expected {} ({} handles)",
            targets.len(),
            constraint_count * 3,
            constraint_count
        )));
    }
    Ok(())
}

/// Marshals a create request into a mesh plus handle list.
pub fn marshal_create(request: &CreateRequest) -> RigidResult<(TriangleMesh, Vec<usize>)> {
    validate_create(request)?;
    let positions = points_from_flat(&request.positions)?;
    let triangles = triangle_indices(&request.triangles)?;
    let mesh = TriangleMesh::from_positions(&positions, &triangles)?;
    let constraints = constraint_indices(&request.constraints)?;
    Ok((mesh, constraints))
}

/// Validates, marshals and creates a session.
pub fn build_session(request: &CreateRequest) -> RigidResult<ArapSession> {
    let (mesh, constraints) = marshal_create(request)?;
    ArapSession::create(&mesh, &constraints, request.config())
}
