//! The handle registry.
//!
//! A fixed table of slots, each either empty or holding one engine model and
//! its state. Slot 0 is never used so that handle 0 is never valid. Creation
//! failures are recorded in the registry-wide error; engine faults on a live
//! handle are recorded in that slot's error.

use std::ffi::CStr;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::{ConfigError, RegistryConfig};
use crate::engine::{Dim, Engine, View};
use crate::error::{ErrorState, RegistryError, Result};
use crate::handle::{GENERATION_MASK, Handle};

/// A live model and its state.
///
/// Fields drop in declaration order, so the state is released before the
/// model it was allocated for.
struct Instance<E: Engine> {
    state: E::State,
    model: E::Model,
}

struct Slot<E: Engine> {
    instance: Option<Instance<E>>,
    error: ErrorState,
    generation: u32,
}

impl<E: Engine> Slot<E> {
    fn new(error_capacity: usize) -> Self {
        Self {
            instance: None,
            error: ErrorState::new(error_capacity),
            generation: 0,
        }
    }
}

/// Look up the live instance behind `handle` together with its error record.
fn live_mut<E: Engine>(
    slots: &mut [Slot<E>],
    handle: Handle,
) -> Option<(&mut Instance<E>, &mut ErrorState)> {
    if handle.index() == 0 {
        return None;
    }
    let slot = slots.get_mut(handle.index())?;
    if slot.generation != handle.generation() {
        return None;
    }
    let instance = slot.instance.as_mut()?;
    Some((instance, &mut slot.error))
}

fn record_fault(error: &mut ErrorState, fault: &impl std::fmt::Display) {
    let fault = RegistryError::Engine(fault.to_string());
    error.set(fault.code(), &fault.to_string());
}

/// Fixed-capacity table of simulation instances addressed by [`Handle`].
///
/// # Example
///
/// ```no_run
/// use sim_wasm::{LiteEngine, Registry, View};
///
/// let mut registry = Registry::new(LiteEngine);
/// let h = registry.create("model.xml".as_ref())?;
/// registry.step(h, 10)?;
/// let qpos = registry.view(h, View::Qpos).unwrap_or_default();
/// println!("{qpos:?}");
/// registry.free(h);
/// # Ok::<(), sim_wasm::RegistryError>(())
/// ```
pub struct Registry<E: Engine> {
    engine: E,
    config: RegistryConfig,
    slots: Vec<Slot<E>>,
    global_error: ErrorState,
}

impl<E: Engine> Registry<E> {
    /// Registry with the default configuration (64 slots).
    pub fn new(engine: E) -> Self {
        Self::build(engine, RegistryConfig::default())
    }

    /// Registry with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_config(engine: E, config: RegistryConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(engine, config))
    }

    fn build(engine: E, config: RegistryConfig) -> Self {
        let slots = (0..config.capacity)
            .map(|_| Slot::new(config.error_message_capacity))
            .collect();
        Self {
            engine,
            config,
            slots,
            global_error: ErrorState::new(config.error_message_capacity),
        }
    }

    // ==================== Lifecycle ====================

    /// Load a model and reserve a slot for it.
    ///
    /// On failure nothing is left allocated and the failure is recorded in
    /// the global error.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Load`] if the engine cannot load the model.
    /// - [`RegistryError::StateAllocation`] if the engine cannot allocate state.
    /// - [`RegistryError::NoFreeHandle`] if every slot is live.
    pub fn create(&mut self, path: &Path) -> Result<Handle> {
        let model = match self.engine.load_model(path) {
            Ok(model) => model,
            Err(e) => {
                let mut message = e.to_string();
                if message.is_empty() {
                    message = "load failed".to_string();
                }
                return Err(self.fail_global(RegistryError::Load(message)));
            }
        };

        let Some(state) = self.engine.make_state(&model) else {
            drop(model);
            return Err(self.fail_global(RegistryError::StateAllocation));
        };

        let Some(index) = self.allocate() else {
            drop(state);
            drop(model);
            return Err(self.fail_global(RegistryError::NoFreeHandle));
        };

        let slot = &mut self.slots[index];
        slot.instance = Some(Instance { state, model });
        slot.error.clear();
        let handle = Handle::new(index, slot.generation);
        debug!(handle = handle.to_raw(), path = %path.display(), "created instance");
        Ok(handle)
    }

    /// Lowest empty slot index in `1..capacity`, or `None` if the table is
    /// full.
    #[must_use]
    pub fn allocate(&self) -> Option<usize> {
        (1..self.slots.len()).find(|&i| self.slots[i].instance.is_none())
    }

    /// Release the instance behind `handle`.
    ///
    /// Out-of-range, already-freed and stale handles are ignored, so calling
    /// this twice is harmless. Returns whether an instance was released.
    pub fn free(&mut self, handle: Handle) -> bool {
        if handle.index() == 0 {
            return false;
        }
        let Some(slot) = self.slots.get_mut(handle.index()) else {
            return false;
        };
        if slot.generation != handle.generation() {
            return false;
        }
        let Some(instance) = slot.instance.take() else {
            return false;
        };
        drop(instance);
        slot.error.clear();
        if self.config.stale_handle_check {
            slot.generation = slot.generation.wrapping_add(1) & GENERATION_MASK;
        }
        debug!(handle = handle.to_raw(), "freed instance");
        true
    }

    /// Whether `handle` refers to a live instance.
    #[must_use]
    pub fn is_valid(&self, handle: Handle) -> bool {
        handle.index() != 0
            && self.slots.get(handle.index()).is_some_and(|slot| {
                slot.generation == handle.generation() && slot.instance.is_some()
            })
    }

    // ==================== Simulation ====================

    /// Advance the instance exactly `n` engine steps.
    ///
    /// Engine faults do not stop the loop; the most recent one is recorded
    /// in the handle's error with
    /// [`ErrorCode::EngineFault`](crate::ErrorCode::EngineFault) and the call
    /// still succeeds.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidHandle`] or [`RegistryError::InvalidStepCount`]
    /// (for `n <= 0`); in both cases the engine is not called.
    pub fn step(&mut self, handle: Handle, n: i32) -> Result<()> {
        let (instance, error) =
            live_mut(&mut self.slots, handle).ok_or(RegistryError::InvalidHandle(handle))?;
        if n <= 0 {
            return Err(RegistryError::InvalidStepCount(n));
        }

        let mut faults = 0_u32;
        for _ in 0..n {
            if let Err(e) = self.engine.step(&instance.model, &mut instance.state) {
                record_fault(error, &e);
                faults += 1;
            }
        }
        if faults > 0 {
            warn!(
                handle = handle.to_raw(),
                faults,
                steps = n,
                last = error.message(),
                "engine faults during step"
            );
        }
        Ok(())
    }

    /// Recompute derived quantities without advancing time.
    ///
    /// An engine fault is recorded in the handle's error and the call still
    /// succeeds.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidHandle`].
    pub fn forward(&mut self, handle: Handle) -> Result<()> {
        let (instance, error) =
            live_mut(&mut self.slots, handle).ok_or(RegistryError::InvalidHandle(handle))?;
        if let Err(e) = self.engine.forward(&instance.model, &mut instance.state) {
            record_fault(error, &e);
            warn!(handle = handle.to_raw(), error = %e, "engine fault during forward");
        }
        Ok(())
    }

    /// Restore the model's initial conditions.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidHandle`].
    pub fn reset(&mut self, handle: Handle) -> Result<()> {
        let (instance, _) =
            live_mut(&mut self.slots, handle).ok_or(RegistryError::InvalidHandle(handle))?;
        self.engine.reset(&instance.model, &mut instance.state);
        Ok(())
    }

    // ==================== Errors ====================

    /// Error record of a live handle, or `None` if the handle is invalid.
    #[must_use]
    pub fn last_error(&self, handle: Handle) -> Option<&ErrorState> {
        self.is_valid(handle).then(|| &self.slots[handle.index()].error)
    }

    /// Error record for failures that happen before a handle exists.
    #[must_use]
    pub fn global_error(&self) -> &ErrorState {
        &self.global_error
    }

    /// Record `error` in the global error record and hand it back.
    pub fn fail_global(&mut self, error: RegistryError) -> RegistryError {
        warn!(code = error.code().as_raw(), %error, "create failed");
        self.global_error.set(error.code(), &error.to_string());
        error
    }

    /// Record a caught panic against `handle` if it is live, otherwise in the
    /// global error record.
    pub fn record_panic(&mut self, handle: Option<Handle>, message: &str) {
        let error = RegistryError::Panicked(message.to_string());
        let target = match handle.and_then(|h| live_mut(&mut self.slots, h)) {
            Some((_, slot_error)) => slot_error,
            None => &mut self.global_error,
        };
        target.set(error.code(), &error.to_string());
    }

    // ==================== Introspection ====================

    /// A model dimension; `0` for an invalid handle.
    #[must_use]
    pub fn dim(&self, handle: Handle, dim: Dim) -> usize {
        self.instance(handle)
            .map_or(0, |inst| self.engine.dim(&inst.model, dim))
    }

    /// Fixed timestep; `0.0` for an invalid handle.
    #[must_use]
    pub fn timestep(&self, handle: Handle) -> f64 {
        self.instance(handle)
            .map_or(0.0, |inst| self.engine.timestep(&inst.model))
    }

    /// Current simulation time; `0.0` for an invalid handle.
    #[must_use]
    pub fn time(&self, handle: Handle) -> f64 {
        self.instance(handle)
            .map_or(0.0, |inst| self.engine.time(&inst.state))
    }

    /// Direct read/write access to a state array; `None` for an invalid
    /// handle. Nothing is copied.
    pub fn view(&mut self, handle: Handle, view: View) -> Option<&mut [f64]> {
        let (instance, _) = live_mut(&mut self.slots, handle)?;
        Some(self.engine.buffer(&mut instance.state, view))
    }

    /// Copy the leading `min(src.len(), len)` elements of `src` into a state
    /// array, leaving the rest untouched. Returns the number copied; `0` for
    /// an invalid handle.
    pub fn write(&mut self, handle: Handle, view: View, src: &[f64]) -> usize {
        let Some(dst) = self.view(handle, view) else {
            return 0;
        };
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
        n
    }

    /// [`write`](Self::write) into `qpos`.
    pub fn set_qpos(&mut self, handle: Handle, src: &[f64]) -> usize {
        self.write(handle, View::Qpos, src)
    }

    /// [`write`](Self::write) into `qvel`.
    pub fn set_qvel(&mut self, handle: Handle, src: &[f64]) -> usize {
        self.write(handle, View::Qvel, src)
    }

    /// [`write`](Self::write) into `ctrl`.
    pub fn set_ctrl(&mut self, handle: Handle, src: &[f64]) -> usize {
        self.write(handle, View::Ctrl, src)
    }

    // ==================== Names ====================

    /// Name of element `id` in `category` (`mjtObj` numbering).
    ///
    /// `None` for an invalid handle, an unknown category, an out-of-range or
    /// negative id, or an unnamed element. The string lives as long as the
    /// instance.
    #[must_use]
    pub fn name_at(&self, handle: Handle, category: i32, id: i32) -> Option<&CStr> {
        let id = usize::try_from(id).ok()?;
        let inst = self.instance(handle)?;
        self.engine.id2name(&inst.model, category, id)
    }

    /// Id of the element called `name` in `category`, or `-1`.
    #[must_use]
    pub fn name_to_id(&self, handle: Handle, category: i32, name: &str) -> i32 {
        self.instance(handle)
            .and_then(|inst| self.engine.name2id(&inst.model, category, name))
            .and_then(|id| i32::try_from(id).ok())
            .unwrap_or(-1)
    }

    // ==================== Registry ====================

    /// Number of slots, including the reserved slot 0.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live instances.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.instance.is_some()).count()
    }

    /// Handles of every live instance, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.instance.is_some())
            .map(|(i, s)| Handle::new(i, s.generation))
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn instance(&self, handle: Handle) -> Option<&Instance<E>> {
        if !self.is_valid(handle) {
            return None;
        }
        self.slots[handle.index()].instance.as_ref()
    }
}

impl<E: Engine + Default> Default for Registry<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}
