//! Lightweight MJCF-subset physics engine.
//!
//! A small engine with MuJoCo's Model/Data split and naming, meant as a
//! deterministic stand-in wherever the full simulator is too heavy: host
//! bindings, golden-vector harnesses and tests.
//!
//! - [`Model`] is static (immutable after loading)
//! - [`Data`] is dynamic (`qpos`/`qvel` are the source of truth)
//!
//! Each degree of freedom evolves independently: `inertia * qacc = qfrc`,
//! where the inertia is the subtree mass of the joint's body plus armature.
//! There is no collision, constraint solving or kinematic coupling.
//!
//! # Quick Start
//!
//! ```
//! use sim_lite::load_model;
//!
//! let model = load_model(r#"
//!     <mujoco model="slider">
//!       <option timestep="0.01" gravity="0 0 0"/>
//!       <worldbody>
//!         <body name="cart"><joint name="x" type="slide"/><geom mass="2"/></body>
//!       </worldbody>
//!       <actuator><motor name="push" joint="x"/></actuator>
//!     </mujoco>
//! "#).expect("valid model");
//!
//! let mut data = model.make_data();
//! data.ctrl[0] = 1.0;
//! for _ in 0..100 {
//!     data.step(&model).expect("finite state");
//! }
//! assert!(data.qpos[0] > 0.0);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,  // nalgebra constructors are not const
    clippy::suboptimal_flops,      // mul_add rewrites aren't clearer here
    clippy::doc_markdown,          // MJCF terms don't need backticks
)]

pub mod error;
pub mod mjcf;
pub mod types;

mod forward;
mod integrate;

pub use error::{LoadError, StepError};
pub use mjcf::{load_model, load_model_from_file};
pub use types::{
    ActuatorKind, Data, ElementType, JointType, MAX_VAL, Model, NUM_WARNINGS, SensorType,
    Warning, WarningStat,
};

/// Engine name and version reported to hosts, e.g. `sim-lite 0.1.0`.
pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
