//! C ABI.
//!
//! The entry points mirror the boundary operations. Every function
//! returns a [`RigidStatus`]; results travel through caller-owned
//! out-pointers. Sessions live in the process-wide registry.
//!
//! ```c
//! uint64_t h;
//! rigid_initialize(pos, n_verts, tris, n_tris, handles, n_handles, 10, &h);
//! rigid_step(h, targets, n_handles, out_pos, n_verts);
//! rigid_dispose(h);
//! ```

use std::panic::{self, AssertUnwindSafe};

use rigid_solver::config::DynamicsConfig;
use rigid_types::{ErrorKind, RigidResult};

use crate::contract::CreateRequest;
use crate::registry::global;

/// Status codes returned across the C ABI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidStatus {
    Ok = 0,
    InvalidTopology = 1,
    EmptyConstraintSet = 2,
    InvalidConstraintIndex = 3,
    SingularSystem = 4,
    UseAfterDispose = 5,
    InvalidConfig = 6,
    InvalidInput = 7,
    Io = 8,
    Serialization = 9,
    NullPointer = 10,
    Panic = 11,
}

impl From<ErrorKind> for RigidStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidTopology => RigidStatus::InvalidTopology,
            ErrorKind::EmptyConstraintSet => RigidStatus::EmptyConstraintSet,
            ErrorKind::InvalidConstraintIndex => RigidStatus::InvalidConstraintIndex,
            ErrorKind::SingularSystem => RigidStatus::SingularSystem,
            ErrorKind::UseAfterDispose => RigidStatus::UseAfterDispose,
            ErrorKind::InvalidConfig => RigidStatus::InvalidConfig,
            ErrorKind::InvalidInput => RigidStatus::InvalidInput,
            ErrorKind::Io => RigidStatus::Io,
            ErrorKind::Serialization => RigidStatus::Serialization,
        }
    }
}

fn status_of(f: impl FnOnce() -> RigidResult<()>) -> RigidStatus {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => RigidStatus::Ok,
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "boundary call failed");
            err.kind().into()
        }
        Err(_) => RigidStatus::Panic,
    }
}

/// Reads `len` elements from `ptr`. A zero length accepts any pointer.
///
/// # Safety
/// When `len > 0`, `ptr` must be valid for `len` reads of `T` for `'a`.
unsafe fn input<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        // SAFETY: non-null and valid for `len` reads per the caller contract.
        Some(unsafe { std::slice::from_raw_parts(ptr, len) })
    }
}

/// `count * per_item` elements, or `None` if that many doubles could not
/// form a valid slice.
fn buffer_len(count: usize, per_item: usize) -> Option<usize> {
    count
        .checked_mul(per_item)
        .filter(|&len| len <= isize::MAX as usize / std::mem::size_of::<f64>())
}

/// Creates a static ARAP session and writes its handle to `out_handle`.
///
/// `positions` holds `3 * vertex_count` doubles, `triangles` holds
/// `3 * triangle_count` indices and `constraints` holds `constraint_count`
/// indices. The session has no inertia term; use
/// [`rigid_initialize_dynamics`] for the dynamics mode.
///
/// # Safety
/// Every pointer must be valid for the number of elements stated by its
/// count argument, and `out_handle` must be valid for one write.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn rigid_initialize(
    positions: *const f64,
    vertex_count: usize,
    triangles: *const i32,
    triangle_count: usize,
    constraints: *const i32,
    constraint_count: usize,
    iterations: u32,
    out_handle: *mut u64,
) -> RigidStatus {
    // SAFETY: forwarded caller contract.
    unsafe {
        initialize(
            positions,
            vertex_count,
            triangles,
            triangle_count,
            constraints,
            constraint_count,
            iterations,
            None,
            out_handle,
        )
    }
}

/// Like [`rigid_initialize`], with the inertia term switched on.
///
/// `inertia` weighs the lumped vertex mass and `time_step` is the frame
/// duration in seconds; both must be positive. No external acceleration is
/// applied.
///
/// # Safety
/// Same contract as [`rigid_initialize`].
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn rigid_initialize_dynamics(
    positions: *const f64,
    vertex_count: usize,
    triangles: *const i32,
    triangle_count: usize,
    constraints: *const i32,
    constraint_count: usize,
    iterations: u32,
    inertia: f64,
    time_step: f64,
    out_handle: *mut u64,
) -> RigidStatus {
    let dynamics = DynamicsConfig {
        inertia,
        time_step,
        external_acceleration: [0.0; 3],
    };
    // SAFETY: forwarded caller contract.
    unsafe {
        initialize(
            positions,
            vertex_count,
            triangles,
            triangle_count,
            constraints,
            constraint_count,
            iterations,
            Some(dynamics),
            out_handle,
        )
    }
}

/// # Safety
/// See [`rigid_initialize`].
#[allow(clippy::too_many_arguments)]
unsafe fn initialize(
    positions: *const f64,
    vertex_count: usize,
    triangles: *const i32,
    triangle_count: usize,
    constraints: *const i32,
    constraint_count: usize,
    iterations: u32,
    dynamics: Option<DynamicsConfig>,
    out_handle: *mut u64,
) -> RigidStatus {
    let (Some(position_len), Some(triangle_len)) =
        (buffer_len(vertex_count, 3), buffer_len(triangle_count, 3))
    else {
        return RigidStatus::InvalidInput;
    };
    // SAFETY: forwarded caller contract.
    let buffers = unsafe {
        (
            input(positions, position_len),
            input(triangles, triangle_len),
            input(constraints, constraint_count),
        )
    };
    let (Some(positions), Some(triangles), Some(constraints)) = buffers else {
        return RigidStatus::NullPointer;
    };
    if out_handle.is_null() {
        return RigidStatus::NullPointer;
    }

    let request = CreateRequest {
        positions: positions.to_vec(),
        triangles: triangles.to_vec(),
        constraints: constraints.to_vec(),
        iterations,
        dynamics,
    };
    status_of(|| {
        let handle = global().create(&request)?;
        // SAFETY: checked non-null above; valid for one write per the caller contract.
        unsafe { out_handle.write(handle) };
        Ok(())
    })
}

/// Moves the handles of session `handle` and writes all positions.
///
/// `targets` holds `3 * constraint_count` doubles in creation order;
/// `out_positions` receives `3 * vertex_count` doubles.
///
/// # Safety
/// `targets` must be valid for `3 * constraint_count` reads and
/// `out_positions` for `3 * vertex_count` writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rigid_step(
    handle: u64,
    targets: *const f64,
    constraint_count: usize,
    out_positions: *mut f64,
    vertex_count: usize,
) -> RigidStatus {
    let (Some(target_len), Some(out_len)) =
        (buffer_len(constraint_count, 3), buffer_len(vertex_count, 3))
    else {
        return RigidStatus::InvalidInput;
    };
    // SAFETY: forwarded caller contract.
    let Some(targets) = (unsafe { input(targets, target_len) }) else {
        return RigidStatus::NullPointer;
    };
    if out_positions.is_null() && vertex_count > 0 {
        return RigidStatus::NullPointer;
    }
    let out: &mut [f64] = if vertex_count == 0 {
        &mut []
    } else {
        // SAFETY: non-null and valid for `3 * vertex_count` writes per the caller contract.
        unsafe { std::slice::from_raw_parts_mut(out_positions, out_len) }
    };

    status_of(|| global().step_into(handle, targets, out).map(|_| ()))
}

/// Disposes session `handle`. The handle must not be used afterwards.
#[unsafe(no_mangle)]
pub extern "C" fn rigid_dispose(handle: u64) -> RigidStatus {
    status_of(|| global().dispose(handle))
}
