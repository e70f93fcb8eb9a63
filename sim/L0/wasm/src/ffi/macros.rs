/// Declare a flavor and its `#[unsafe(no_mangle)]` exports.
///
/// Symbol names are spelled out in full at the call site so the exported
/// surface can be read (and grepped) without expanding the macro. Each
/// export delegates to the generic operation of the same name in
/// [`crate::ffi`] or [`crate::compat`].
macro_rules! export_flavor {
    (
        $(#[$meta:meta])*
        flavor $flavor:ident {
            prefix: $prefix:literal,
            introspection: $introspection:literal,
            engine: $engine:ty,
        }
        core {
            errno_last_global: $errno_last_global:ident,
            errmsg_last_global: $errmsg_last_global:ident,
            make_from_xml: $make_from_xml:ident,
            free: $free:ident,
            valid: $valid:ident,
            step: $step:ident,
            forward: $forward:ident,
            reset: $reset:ident,
            errno_last: $errno_last:ident,
            errmsg_last: $errmsg_last:ident,
            timestep: $timestep:ident,
            time: $time:ident,
            name_at: $name_at:ident,
            name2id: $name2id:ident,
        }
        dims { $($dim_fn:ident => $dim:ident),* $(,)? }
        views { $($view_fn:ident => $view:ident),* $(,)? }
        writers { $($write_fn:ident => $write_view:ident),* $(,)? }
        compat {
            init: $init:ident,
            step_demo: $step_demo:ident,
            qpos0: $qpos0:ident,
            qvel0: $qvel0:ident,
            term: $term:ident,
        }
    ) => {
        use std::cell::{Cell, RefCell};
        use std::ffi::{c_char, c_int};

        use $crate::engine::{Dim, View};
        use $crate::ffi::Flavor;
        use $crate::registry::Registry;

        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $flavor;

        thread_local! {
            static REGISTRY: RefCell<Registry<$engine>> =
                RefCell::new(Registry::new(<$engine>::default()));
            static IMPLICIT: Cell<c_int> = const { Cell::new(0) };
        }

        impl Flavor for $flavor {
            const PREFIX: &'static str = $prefix;
            const HAS_INTROSPECTION: bool = $introspection;

            type Engine = $engine;

            fn with_registry<R>(f: impl FnOnce(&RefCell<Registry<$engine>>) -> R) -> R {
                REGISTRY.with(f)
            }

            fn with_implicit<R>(f: impl FnOnce(&Cell<c_int>) -> R) -> R {
                IMPLICIT.with(f)
            }
        }

        /// Code of the last creation failure (`0` if none).
        #[unsafe(no_mangle)]
        pub extern "C" fn $errno_last_global() -> c_int {
            $crate::ffi::errno_last_global::<$flavor>()
        }

        /// Message of the last creation failure. Never null.
        #[unsafe(no_mangle)]
        pub extern "C" fn $errmsg_last_global() -> *const c_char {
            $crate::ffi::errmsg_last_global::<$flavor>()
        }

        /// Load a model file; returns a handle or `-1`.
        ///
        /// # Safety
        ///
        /// `path` must be null or point to a NUL-terminated string.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $make_from_xml(path: *const c_char) -> c_int {
            // SAFETY: forwarded caller contract.
            unsafe { $crate::ffi::make_from_xml::<$flavor>(path) }
        }

        /// Release an instance. Safe to call twice.
        #[unsafe(no_mangle)]
        pub extern "C" fn $free(h: c_int) {
            $crate::ffi::free::<$flavor>(h);
        }

        /// `1` if `h` is live.
        #[unsafe(no_mangle)]
        pub extern "C" fn $valid(h: c_int) -> c_int {
            $crate::ffi::valid::<$flavor>(h)
        }

        /// Advance `n` steps; `1` on success.
        #[unsafe(no_mangle)]
        pub extern "C" fn $step(h: c_int, n: c_int) -> c_int {
            $crate::ffi::step::<$flavor>(h, n)
        }

        /// Recompute derived quantities; `1` on success.
        #[unsafe(no_mangle)]
        pub extern "C" fn $forward(h: c_int) -> c_int {
            $crate::ffi::forward::<$flavor>(h)
        }

        /// Restore initial conditions; `1` on success.
        #[unsafe(no_mangle)]
        pub extern "C" fn $reset(h: c_int) -> c_int {
            $crate::ffi::reset::<$flavor>(h)
        }

        /// Last error code of `h`.
        #[unsafe(no_mangle)]
        pub extern "C" fn $errno_last(h: c_int) -> c_int {
            $crate::ffi::errno_last::<$flavor>(h)
        }

        /// Last error message of `h`. Never null.
        #[unsafe(no_mangle)]
        pub extern "C" fn $errmsg_last(h: c_int) -> *const c_char {
            $crate::ffi::errmsg_last::<$flavor>(h)
        }

        $(
            #[doc = concat!("`", stringify!($dim), "` dimension of the model.")]
            #[unsafe(no_mangle)]
            pub extern "C" fn $dim_fn(h: c_int) -> c_int {
                $crate::ffi::dim::<$flavor>(h, Dim::$dim)
            }
        )*

        /// Fixed integration timestep.
        #[unsafe(no_mangle)]
        pub extern "C" fn $timestep(h: c_int) -> f64 {
            $crate::ffi::timestep::<$flavor>(h)
        }

        /// Current simulation time.
        #[unsafe(no_mangle)]
        pub extern "C" fn $time(h: c_int) -> f64 {
            $crate::ffi::time::<$flavor>(h)
        }

        $(
            #[doc = concat!("Pointer to the `", stringify!($view), "` array, or null.")]
            #[unsafe(no_mangle)]
            pub extern "C" fn $view_fn(h: c_int) -> *mut f64 {
                $crate::ffi::view_ptr::<$flavor>(h, View::$view)
            }
        )*

        $(
            #[doc = concat!("Copy up to `n` values into the `", stringify!($write_view), "` array.")]
            ///
            /// # Safety
            ///
            /// `src` must be null or point to at least `n` readable values.
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $write_fn(h: c_int, src: *const f64, n: c_int) {
                // SAFETY: forwarded caller contract.
                unsafe { $crate::ffi::write::<$flavor>(h, View::$write_view, src, n) }
            }
        )*

        /// Name of element `id` in `category`, or null.
        #[unsafe(no_mangle)]
        pub extern "C" fn $name_at(h: c_int, category: c_int, id: c_int) -> *const c_char {
            $crate::ffi::name_at::<$flavor>(h, category, id)
        }

        /// Id of the element called `name` in `category`, or `-1`.
        ///
        /// # Safety
        ///
        /// `name` must be null or point to a NUL-terminated string.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name2id(h: c_int, category: c_int, name: *const c_char) -> c_int {
            // SAFETY: forwarded caller contract.
            unsafe { $crate::ffi::name2id::<$flavor>(h, category, name) }
        }

        /// Load the implicit instance; `1` on success.
        ///
        /// # Safety
        ///
        /// `path` must be null or point to a NUL-terminated string.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $init(path: *const c_char) -> c_int {
            // SAFETY: forwarded caller contract.
            unsafe { $crate::compat::init::<$flavor>(path) }
        }

        /// Step the implicit instance.
        #[unsafe(no_mangle)]
        pub extern "C" fn $step_demo(steps: c_int) {
            $crate::compat::step_demo::<$flavor>(steps);
        }

        /// First position coordinate of the implicit instance.
        #[unsafe(no_mangle)]
        pub extern "C" fn $qpos0() -> f64 {
            $crate::compat::qpos0::<$flavor>()
        }

        /// First velocity of the implicit instance.
        #[unsafe(no_mangle)]
        pub extern "C" fn $qvel0() -> f64 {
            $crate::compat::qvel0::<$flavor>()
        }

        /// Release the implicit instance.
        #[unsafe(no_mangle)]
        pub extern "C" fn $term() {
            $crate::compat::term::<$flavor>();
        }
    };
}
