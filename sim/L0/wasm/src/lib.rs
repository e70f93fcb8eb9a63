//! Handle-based C ABI over a physics engine, for WebAssembly hosts.
//!
//! A sandboxed host cannot hold native pointers, so every simulation lives
//! in a fixed-size [`Registry`] and is addressed by a small integer
//! [`Handle`]. The registry owns each instance's model and state, records
//! creation failures in a global error and engine faults per handle, and
//! hands out direct views of the state arrays.
//!
//! # Layers
//!
//! - [`Registry`]: safe Rust API, generic over an [`Engine`]
//! - [`ffi`]: `extern "C"` exports for the `mjw_*` and `mjwf_*` flavors,
//!   each with its own registry and a legacy compat surface
//! - [`manifest`]: the symbol lists a WASM build must export
//!
//! # Quick Start
//!
//! ```no_run
//! use sim_wasm::{LiteEngine, Registry, View};
//!
//! let mut registry = Registry::new(LiteEngine);
//! let h = registry.create("pendulum.xml".as_ref())?;
//! registry.set_ctrl(h, &[0.5]);
//! registry.step(h, 100)?;
//! println!("t = {}, qpos = {:?}", registry.time(h), registry.view(h, View::Qpos));
//! registry.free(h);
//! # Ok::<(), sim_wasm::RegistryError>(())
//! ```
//!
//! # Handles
//!
//! A raw handle packs the slot index in its low 8 bits and the slot's reuse
//! counter above them, so a handle kept past `free` is rejected once its slot
//! is reused. `0` and negative values are never handles.

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::doc_markdown, // MuJoCo names don't need backticks
)]

pub mod compat;
pub mod config;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod manifest;
pub mod registry;

pub use config::{ConfigError, RegistryConfig};
pub use engine::{Dim, Engine, LiteEngine, View};
pub use error::{ErrorCode, ErrorState, RegistryError, Result};
pub use ffi::Flavor;
pub use ffi::mjw::Mjw;
pub use ffi::mjwf::Mjwf;
pub use handle::{Handle, INVALID_HANDLE};
pub use manifest::{ExportManifest, ExportReport, check_exports};
pub use registry::Registry;
