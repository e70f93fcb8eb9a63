//! C-ABI export surface.
//!
//! The operations here are generic over a [`Flavor`], which supplies the
//! symbol prefix and the flavor's own registry. `export_flavor!` stamps
//! out the `#[unsafe(no_mangle)]` symbols for one flavor; the [`mjw`] and
//! [`mjwf`] modules are its two instantiations.
//!
//! Every export returns a defined sentinel rather than unwinding. Handles are
//! plain `c_int`s; zero and negative values are never valid. Panics inside
//! the engine are caught and recorded as [`ErrorCode::Panic`].
//!
//! [`ErrorCode::Panic`]: crate::ErrorCode::Panic

#[macro_use]
mod macros;

pub mod mjw;
pub mod mjwf;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::ffi::{CStr, c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::ptr;

use tracing::warn;

use crate::engine::{Dim, Engine, View};
use crate::error::RegistryError;
use crate::handle::{Handle, INVALID_HANDLE};
use crate::registry::Registry;

/// One export family: a symbol prefix plus the registry behind it.
pub trait Flavor: 'static {
    /// Symbol prefix without the trailing underscore, e.g. `mjwf`.
    const PREFIX: &'static str;
    /// Whether the flavor exports `abi_version`, `layout_hash` and
    /// `version_string`.
    const HAS_INTROSPECTION: bool;

    /// Engine behind this flavor's registry.
    type Engine: Engine + 'static;

    /// Run `f` with this flavor's registry for the current thread.
    fn with_registry<R>(f: impl FnOnce(&RefCell<Registry<Self::Engine>>) -> R) -> R;

    /// Run `f` with the raw handle of the compat surface's implicit instance.
    fn with_implicit<R>(f: impl FnOnce(&Cell<c_int>) -> R) -> R;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `body` against the flavor's registry with panics contained.
///
/// A panic is recorded against `handle` (or globally) and `sentinel` is
/// returned. A re-entrant call, which can only come from an engine calling
/// back into the exports, also gets `sentinel`.
pub(crate) fn guarded<F: Flavor, R>(
    handle: Option<Handle>,
    sentinel: R,
    body: impl FnOnce(&mut Registry<F::Engine>) -> R,
) -> R {
    F::with_registry(|cell| {
        let Ok(mut registry) = cell.try_borrow_mut() else {
            warn!(flavor = F::PREFIX, "re-entrant call rejected");
            return sentinel;
        };
        match catch_unwind(AssertUnwindSafe(|| body(&mut registry))) {
            Ok(value) => value,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(
                    flavor = F::PREFIX,
                    handle = handle.map(Handle::to_raw),
                    %message,
                    "panic caught at export boundary"
                );
                registry.record_panic(handle, &message);
                sentinel
            }
        }
    })
}

fn as_flag(ok: bool) -> c_int {
    c_int::from(ok)
}

// ==================== Global errors ====================

/// Code of the last creation failure.
pub fn errno_last_global<F: Flavor>() -> c_int {
    guarded::<F, _>(None, 0, |registry| registry.global_error().code().as_raw())
}

/// Message of the last creation failure. Never null.
pub fn errmsg_last_global<F: Flavor>() -> *const c_char {
    guarded::<F, _>(None, c"".as_ptr(), |registry| {
        registry.global_error().as_c_str().as_ptr()
    })
}

// ==================== Lifecycle ====================

/// Load a model and return its handle, or [`INVALID_HANDLE`].
///
/// A null or non-UTF-8 path is a load failure.
///
/// # Safety
///
/// `path` must be null or point to a NUL-terminated string.
pub unsafe fn make_from_xml<F: Flavor>(path: *const c_char) -> c_int {
    let path = if path.is_null() {
        Err("model path is null")
    } else {
        // SAFETY: non-null and NUL-terminated per the caller contract.
        unsafe { CStr::from_ptr(path) }
            .to_str()
            .map_err(|_| "model path is not valid UTF-8")
    };
    guarded::<F, _>(None, INVALID_HANDLE, |registry| {
        let result = match path {
            Ok(path) => registry.create(Path::new(path)),
            Err(message) => Err(registry.fail_global(RegistryError::Load(message.to_string()))),
        };
        result.map_or(INVALID_HANDLE, Handle::to_raw)
    })
}

/// Release an instance. Invalid and stale handles are ignored.
pub fn free<F: Flavor>(raw: c_int) {
    let Some(handle) = Handle::from_raw(raw) else {
        return;
    };
    guarded::<F, _>(Some(handle), (), |registry| {
        registry.free(handle);
    });
}

/// `1` if the handle refers to a live instance, else `0`.
pub fn valid<F: Flavor>(raw: c_int) -> c_int {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0;
    };
    guarded::<F, _>(Some(handle), 0, |registry| as_flag(registry.is_valid(handle)))
}

// ==================== Simulation ====================

/// Advance `n` steps. `1` on success, `0` for an invalid handle or `n <= 0`.
pub fn step<F: Flavor>(raw: c_int, n: c_int) -> c_int {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0;
    };
    guarded::<F, _>(Some(handle), 0, |registry| {
        as_flag(registry.step(handle, n).is_ok())
    })
}

/// Recompute derived quantities. `1` on success, `0` for an invalid handle.
pub fn forward<F: Flavor>(raw: c_int) -> c_int {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0;
    };
    guarded::<F, _>(Some(handle), 0, |registry| {
        as_flag(registry.forward(handle).is_ok())
    })
}

/// Restore initial conditions. `1` on success, `0` for an invalid handle.
pub fn reset<F: Flavor>(raw: c_int) -> c_int {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0;
    };
    guarded::<F, _>(Some(handle), 0, |registry| {
        as_flag(registry.reset(handle).is_ok())
    })
}

// ==================== Per-handle errors ====================

/// Last error code of a handle; `0` if invalid.
pub fn errno_last<F: Flavor>(raw: c_int) -> c_int {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0;
    };
    guarded::<F, _>(Some(handle), 0, |registry| {
        registry
            .last_error(handle)
            .map_or(0, |e| e.code().as_raw())
    })
}

/// Last error message of a handle; `""` if invalid. Never null.
pub fn errmsg_last<F: Flavor>(raw: c_int) -> *const c_char {
    let Some(handle) = Handle::from_raw(raw) else {
        return c"".as_ptr();
    };
    guarded::<F, _>(Some(handle), c"".as_ptr(), |registry| {
        registry
            .last_error(handle)
            .map_or(c"".as_ptr(), |e| e.as_c_str().as_ptr())
    })
}

// ==================== Introspection ====================

/// A model dimension; `0` if invalid.
pub fn dim<F: Flavor>(raw: c_int, dim: Dim) -> c_int {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0;
    };
    guarded::<F, _>(Some(handle), 0, |registry| {
        c_int::try_from(registry.dim(handle, dim)).unwrap_or(c_int::MAX)
    })
}

/// Fixed timestep; `0.0` if invalid.
pub fn timestep<F: Flavor>(raw: c_int) -> f64 {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0.0;
    };
    guarded::<F, _>(Some(handle), 0.0, |registry| registry.timestep(handle))
}

/// Simulation time; `0.0` if invalid.
pub fn time<F: Flavor>(raw: c_int) -> f64 {
    let Some(handle) = Handle::from_raw(raw) else {
        return 0.0;
    };
    guarded::<F, _>(Some(handle), 0.0, |registry| registry.time(handle))
}

// ==================== Buffers ====================

/// Pointer to a state array, or null for an invalid handle.
///
/// A live handle always yields a non-null pointer, even for an empty array,
/// so null is a reliable validity signal. Valid until the handle is freed.
pub fn view_ptr<F: Flavor>(raw: c_int, view: View) -> *mut f64 {
    let Some(handle) = Handle::from_raw(raw) else {
        return ptr::null_mut();
    };
    guarded::<F, _>(Some(handle), ptr::null_mut(), |registry| {
        registry
            .view(handle, view)
            .map_or(ptr::null_mut(), <[f64]>::as_mut_ptr)
    })
}

/// Copy up to `n` values from `src` into a state array, clamped to the
/// array's length.
///
/// # Safety
///
/// `src` must be null or point to at least `n` readable `f64`s.
pub unsafe fn write<F: Flavor>(raw: c_int, view: View, src: *const f64, n: c_int) {
    let Some(handle) = Handle::from_raw(raw) else {
        return;
    };
    let Ok(n) = usize::try_from(n) else {
        return;
    };
    if src.is_null() || n == 0 {
        return;
    }
    guarded::<F, _>(Some(handle), (), |registry| {
        let Some(len) = registry.view(handle, view).map(|buf| buf.len()) else {
            return;
        };
        // SAFETY: `src` holds at least `n` values and we read no more.
        let src = unsafe { std::slice::from_raw_parts(src, n.min(len)) };
        registry.write(handle, view, src);
    });
}

// ==================== Names ====================

/// Name of element `id` in `category`, or null. Valid until the handle is
/// freed.
pub fn name_at<F: Flavor>(raw: c_int, category: c_int, id: c_int) -> *const c_char {
    let Some(handle) = Handle::from_raw(raw) else {
        return ptr::null();
    };
    guarded::<F, _>(Some(handle), ptr::null(), |registry| {
        registry
            .name_at(handle, category, id)
            .map_or(ptr::null(), CStr::as_ptr)
    })
}

/// Id of the element called `name` in `category`, or `-1`.
///
/// # Safety
///
/// `name` must be null or point to a NUL-terminated string.
pub unsafe fn name2id<F: Flavor>(raw: c_int, category: c_int, name: *const c_char) -> c_int {
    let Some(handle) = Handle::from_raw(raw) else {
        return -1;
    };
    if name.is_null() {
        return -1;
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let Ok(name) = unsafe { CStr::from_ptr(name) }.to_str() else {
        return -1;
    };
    guarded::<F, _>(Some(handle), -1, |registry| {
        registry.name_to_id(handle, category, name)
    })
}
