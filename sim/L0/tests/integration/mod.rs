//! Integration tests for the sim-wasm handle registry.
//!
//! These tests drive the registry end to end with real model files:
//! - Registry lifecycle: create, free, slot reuse, exhaustion
//! - State buffers: views, clamped writers, reset
//! - Name lookup through `mjtObj` categories
//! - The `mjw_*` / `mjwf_*` C exports and the compat surface
//! - Export manifests

pub mod buffers;
pub mod common;
pub mod ffi_surface;
pub mod lifecycle;
pub mod manifest;
pub mod name_lookup;
