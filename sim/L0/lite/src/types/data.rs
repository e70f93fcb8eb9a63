//! Dynamic simulation state (like `mjData`).

use nalgebra::DVector;

use super::model::Model;
use super::warning::{NUM_WARNINGS, Warning, WarningStat, first_bad, record_warning};
use crate::error::StepError;
use crate::{forward, integrate};

/// Dynamic simulation state.
///
/// `qpos` and `qvel` are the only state variables besides `time` and the
/// user inputs in `ctrl`. Everything else is recomputed by
/// [`forward`](Self::forward).
#[derive(Debug, Clone)]
pub struct Data {
    /// Simulation time (seconds).
    pub time: f64,
    /// Joint positions (length `nq`).
    pub qpos: DVector<f64>,
    /// Joint velocities (length `nv`).
    pub qvel: DVector<f64>,
    /// Joint accelerations (length `nv`), computed by forward dynamics.
    pub qacc: DVector<f64>,
    /// Actuator controls (length `nu`).
    pub ctrl: DVector<f64>,
    /// Scalar actuator forces (length `nu`).
    pub actuator_force: DVector<f64>,
    /// Actuator forces in joint space (length `nv`).
    pub qfrc_actuator: DVector<f64>,
    /// Passive forces in joint space: springs, damping, gravity (length `nv`).
    pub qfrc_passive: DVector<f64>,
    /// Sensor outputs (length `nsensordata`).
    pub sensordata: DVector<f64>,
    /// Warning statistics, indexed by [`Warning`].
    pub warnings: [WarningStat; NUM_WARNINGS],
}

impl Data {
    pub(crate) fn new(model: &Model) -> Self {
        Self {
            time: 0.0,
            qpos: model.qpos0.clone(),
            qvel: DVector::zeros(model.nv),
            qacc: DVector::zeros(model.nv),
            ctrl: DVector::zeros(model.nu),
            actuator_force: DVector::zeros(model.nu),
            qfrc_actuator: DVector::zeros(model.nv),
            qfrc_passive: DVector::zeros(model.nv),
            sensordata: DVector::zeros(model.nsensordata),
            warnings: [WarningStat::default(); NUM_WARNINGS],
        }
    }

    /// Reset simulation state to model defaults.
    ///
    /// `qpos = qpos0`, `time = 0`, every other array and the warning
    /// counters are zeroed.
    pub fn reset(&mut self, model: &Model) {
        self.qpos.copy_from(&model.qpos0);
        self.qvel.fill(0.0);
        self.qacc.fill(0.0);
        self.ctrl.fill(0.0);
        self.actuator_force.fill(0.0);
        self.qfrc_actuator.fill(0.0);
        self.qfrc_passive.fill(0.0);
        self.sensordata.fill(0.0);
        self.time = 0.0;
        self.warnings = [WarningStat::default(); NUM_WARNINGS];
    }

    /// Recompute derived quantities (forces, accelerations, sensors) at the
    /// current state without advancing time.
    pub fn forward(&mut self, model: &Model) {
        forward::forward(model, self);
    }

    /// Advance the simulation by one timestep.
    ///
    /// Checks qpos/qvel, runs [`forward`](Self::forward), checks qacc, then
    /// integrates with semi-implicit Euler. A failed check records a
    /// warning, resets the state and continues from `qpos0`; the step then
    /// reports [`StepError::Diverged`].
    ///
    /// # Errors
    ///
    /// - [`StepError::InvalidTimestep`] if the model timestep is not positive.
    ///   Nothing is modified.
    /// - [`StepError::Diverged`] after an auto-reset.
    pub fn step(&mut self, model: &Model) -> Result<(), StepError> {
        if !model.timestep.is_finite() || model.timestep <= 0.0 {
            return Err(StepError::InvalidTimestep);
        }

        let mut diverged = self
            .check(model, Warning::BadQpos)
            .or_else(|| self.check(model, Warning::BadQvel));

        forward::forward(model, self);

        if let Some(err) = self.check(model, Warning::BadQacc) {
            diverged.get_or_insert(err);
            forward::forward(model, self);
        }

        integrate::euler(model, self);

        match diverged {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Check one state array; on failure reset and report.
    fn check(&mut self, model: &Model, warning: Warning) -> Option<StepError> {
        let values = match warning {
            Warning::BadQpos => self.qpos.as_slice(),
            Warning::BadQvel => self.qvel.as_slice(),
            Warning::BadQacc => self.qacc.as_slice(),
            Warning::BadCtrl => self.ctrl.as_slice(),
        };
        let index = first_bad(values)?;
        let kept = self.warnings;
        self.reset(model);
        self.warnings = kept;
        record_warning(self, warning, index);
        Some(StepError::Diverged { warning, index })
    }

    /// Whether any divergence warning fired since the last reset.
    #[must_use]
    pub fn divergence_detected(&self) -> bool {
        [Warning::BadQpos, Warning::BadQvel, Warning::BadQacc]
            .iter()
            .any(|w| self.warnings[*w as usize].count > 0)
    }
}
