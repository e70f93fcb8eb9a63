//! The boundary with the wrapped physics engine.
//!
//! The registry never looks inside a model or state; everything it needs goes
//! through [`Engine`]. Releasing a model or state is `Drop`.

use std::ffi::CStr;
use std::fmt::Display;
use std::path::Path;

use sim_lite::{Data, ElementType, LoadError, Model, StepError};

/// Model dimensions exposed through the dimension queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Position coordinates.
    Nq,
    /// Degrees of freedom.
    Nv,
    /// Actuators / controls.
    Nu,
    /// Sensor outputs.
    NSensorData,
    /// Bodies, including the world body.
    NBody,
    /// Joints.
    NJnt,
    /// Geoms.
    NGeom,
    /// Sites.
    NSite,
    /// Sensors.
    NSensor,
}

impl Dim {
    /// Every dimension, in export order.
    pub const ALL: [Self; 9] = [
        Self::Nq,
        Self::Nv,
        Self::Nu,
        Self::NSensorData,
        Self::NBody,
        Self::NJnt,
        Self::NGeom,
        Self::NSite,
        Self::NSensor,
    ];

    /// Export name suffix, e.g. `nq`.
    #[must_use]
    pub fn export_name(self) -> &'static str {
        match self {
            Self::Nq => "nq",
            Self::Nv => "nv",
            Self::Nu => "nu",
            Self::NSensorData => "nsensordata",
            Self::NBody => "nbody",
            Self::NJnt => "njnt",
            Self::NGeom => "ngeom",
            Self::NSite => "nsite",
            Self::NSensor => "nsensor",
        }
    }
}

/// State arrays exposed as read/write views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Joint positions (`nq`).
    Qpos,
    /// Joint velocities (`nv`).
    Qvel,
    /// Joint accelerations (`nv`).
    Qacc,
    /// Controls (`nu`).
    Ctrl,
    /// Sensor outputs (`nsensordata`).
    SensorData,
}

impl View {
    /// Every view, in export order.
    pub const ALL: [Self; 5] = [
        Self::Qpos,
        Self::Qvel,
        Self::Qacc,
        Self::Ctrl,
        Self::SensorData,
    ];

    /// Export name stem, e.g. `qpos` for `qpos_ptr`.
    #[must_use]
    pub fn export_name(self) -> &'static str {
        match self {
            Self::Qpos => "qpos",
            Self::Qvel => "qvel",
            Self::Qacc => "qacc",
            Self::Ctrl => "ctrl",
            Self::SensorData => "sensordata",
        }
    }
}

/// A physics engine the registry can drive.
///
/// `category` arguments use MuJoCo's `mjtObj` numbering; unknown categories
/// resolve to nothing.
pub trait Engine {
    /// Immutable model description.
    type Model;
    /// Mutable simulation state for one model.
    type State;
    /// Load failure; its text becomes the global error message.
    type LoadError: Display;
    /// Step or forward failure; its text becomes the per-handle message.
    type StepError: Display;

    /// Load a model from a file.
    ///
    /// # Errors
    ///
    /// Returns the engine's load error.
    fn load_model(&self, path: &Path) -> Result<Self::Model, Self::LoadError>;

    /// Allocate state for `model`, or `None` if allocation fails.
    fn make_state(&self, model: &Self::Model) -> Option<Self::State>;

    /// Advance one timestep.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault. The state must still be usable.
    fn step(&self, model: &Self::Model, state: &mut Self::State) -> Result<(), Self::StepError>;

    /// Recompute derived quantities without advancing time.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault. The state must still be usable.
    fn forward(&self, model: &Self::Model, state: &mut Self::State)
    -> Result<(), Self::StepError>;

    /// Restore the model's initial conditions.
    fn reset(&self, model: &Self::Model, state: &mut Self::State);

    /// A model dimension.
    fn dim(&self, model: &Self::Model, dim: Dim) -> usize;

    /// Fixed integration timestep.
    fn timestep(&self, model: &Self::Model) -> f64;

    /// Current simulation time.
    fn time(&self, state: &Self::State) -> f64;

    /// Mutable view of one state array.
    fn buffer<'a>(&self, state: &'a mut Self::State, view: View) -> &'a mut [f64];

    /// Name of element `id` in `category`, or `None` if absent or unnamed.
    fn id2name<'a>(&self, model: &'a Self::Model, category: i32, id: usize)
    -> Option<&'a CStr>;

    /// Id of the element called `name` in `category`.
    fn name2id(&self, model: &Self::Model, category: i32, name: &str) -> Option<usize>;

    /// Engine name and version, e.g. `sim-lite 0.1.0`.
    fn version(&self) -> &str;
}

/// [`Engine`] backed by [`sim_lite`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteEngine;

impl Engine for LiteEngine {
    type Model = Model;
    type State = Data;
    type LoadError = LoadError;
    type StepError = StepError;

    fn load_model(&self, path: &Path) -> Result<Model, LoadError> {
        sim_lite::load_model_from_file(path)
    }

    fn make_state(&self, model: &Model) -> Option<Data> {
        Some(model.make_data())
    }

    fn step(&self, model: &Model, state: &mut Data) -> Result<(), StepError> {
        state.step(model)
    }

    fn forward(&self, model: &Model, state: &mut Data) -> Result<(), StepError> {
        state.forward(model);
        Ok(())
    }

    fn reset(&self, model: &Model, state: &mut Data) {
        state.reset(model);
    }

    fn dim(&self, model: &Model, dim: Dim) -> usize {
        match dim {
            Dim::Nq => model.nq,
            Dim::Nv => model.nv,
            Dim::Nu => model.nu,
            Dim::NSensorData => model.nsensordata,
            Dim::NBody => model.nbody,
            Dim::NJnt => model.njnt,
            Dim::NGeom => model.ngeom,
            Dim::NSite => model.nsite,
            Dim::NSensor => model.nsensor,
        }
    }

    fn timestep(&self, model: &Model) -> f64 {
        model.timestep
    }

    fn time(&self, state: &Data) -> f64 {
        state.time
    }

    fn buffer<'a>(&self, state: &'a mut Data, view: View) -> &'a mut [f64] {
        match view {
            View::Qpos => state.qpos.as_mut_slice(),
            View::Qvel => state.qvel.as_mut_slice(),
            View::Qacc => state.qacc.as_mut_slice(),
            View::Ctrl => state.ctrl.as_mut_slice(),
            View::SensorData => state.sensordata.as_mut_slice(),
        }
    }

    fn id2name<'a>(&self, model: &'a Model, category: i32, id: usize) -> Option<&'a CStr> {
        model.id2name_c(ElementType::from_mjt(category)?, id)
    }

    fn name2id(&self, model: &Model, category: i32, name: &str) -> Option<usize> {
        model.name2id(ElementType::from_mjt(category)?, name)
    }

    fn version(&self) -> &str {
        sim_lite::VERSION
    }
}
