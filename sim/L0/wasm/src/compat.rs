//! Legacy smoke-test surface on one implicit instance per flavor.
//!
//! `init` loads the instance, `step_demo` advances it, `qpos0`/`qvel0` read
//! its first coordinates and `term` releases it. Everything else goes through
//! the handle-based exports in [`crate::ffi`].

use std::ffi::{c_char, c_int};

use crate::engine::View;
use crate::ffi::{self, Flavor};
use crate::handle::Handle;

fn implicit<F: Flavor>() -> c_int {
    F::with_implicit(std::cell::Cell::get)
}

/// Load `path` as the implicit instance, releasing any previous one.
/// Returns `1` on success; on failure the global error says why.
///
/// # Safety
///
/// `path` must be null or point to a NUL-terminated string.
pub unsafe fn init<F: Flavor>(path: *const c_char) -> c_int {
    term::<F>();
    // SAFETY: forwarded caller contract.
    let handle = unsafe { ffi::make_from_xml::<F>(path) };
    F::with_implicit(|cell| cell.set(handle.max(0)));
    c_int::from(handle > 0)
}

/// Advance the implicit instance. Ignored before `init` or for
/// `steps <= 0`.
pub fn step_demo<F: Flavor>(steps: c_int) {
    if steps <= 0 {
        return;
    }
    ffi::step::<F>(implicit::<F>(), steps);
}

/// First position coordinate, or `0.0`.
pub fn qpos0<F: Flavor>() -> f64 {
    first::<F>(View::Qpos)
}

/// First velocity, or `0.0`.
pub fn qvel0<F: Flavor>() -> f64 {
    first::<F>(View::Qvel)
}

fn first<F: Flavor>(view: View) -> f64 {
    let Some(handle) = Handle::from_raw(implicit::<F>()) else {
        return 0.0;
    };
    ffi::guarded::<F, _>(Some(handle), 0.0, |registry| {
        registry
            .view(handle, view)
            .and_then(|buf| buf.first().copied())
            .unwrap_or(0.0)
    })
}

/// Release the implicit instance, if any.
pub fn term<F: Flavor>() {
    let handle = F::with_implicit(|cell| cell.replace(0));
    if handle > 0 {
        ffi::free::<F>(handle);
    }
}
