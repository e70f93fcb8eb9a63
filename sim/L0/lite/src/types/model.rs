//! Static model description (like `mjModel`).

use std::collections::HashMap;
use std::ffi::CStr;

use nalgebra::{DVector, Vector3};

use super::data::Data;
use super::enums::{ActuatorKind, ElementType, JointType, SensorType};

/// Static model definition, immutable after loading.
///
/// Arrays are indexed by element id and laid out the way MuJoCo lays out
/// `mjModel`: `jnt_qposadr[j]` is the first qpos entry of joint `j`,
/// `sensor_adr[s]` the first sensordata entry of sensor `s`, and so on.
#[derive(Debug, Clone)]
pub struct Model {
    /// Model name from `<mujoco model="...">`.
    pub name: String,

    // ==================== Dimensions ====================
    /// Number of position coordinates.
    pub nq: usize,
    /// Number of degrees of freedom.
    pub nv: usize,
    /// Number of actuators / controls.
    pub nu: usize,
    /// Number of bodies, including the world body.
    pub nbody: usize,
    /// Number of joints.
    pub njnt: usize,
    /// Number of geoms.
    pub ngeom: usize,
    /// Number of sites.
    pub nsite: usize,
    /// Number of sensors.
    pub nsensor: usize,
    /// Total sensordata length.
    pub nsensordata: usize,

    // ==================== Options ====================
    /// Fixed integration timestep (seconds).
    pub timestep: f64,
    /// Gravity vector.
    pub gravity: Vector3<f64>,

    // ==================== Initial state ====================
    /// Reference configuration (length `nq`).
    pub qpos0: DVector<f64>,

    // ==================== Bodies ====================
    /// Parent body id (world's parent is itself).
    pub body_parent: Vec<usize>,
    /// Body mass.
    pub body_mass: Vec<f64>,
    /// Mass of the body and all its descendants.
    pub body_subtreemass: Vec<f64>,

    // ==================== Joints ====================
    /// Joint type.
    pub jnt_type: Vec<JointType>,
    /// Body the joint belongs to.
    pub jnt_body: Vec<usize>,
    /// First qpos address.
    pub jnt_qposadr: Vec<usize>,
    /// First dof address.
    pub jnt_dofadr: Vec<usize>,
    /// Unit joint axis (hinge/slide).
    pub jnt_axis: Vec<Vector3<f64>>,
    /// Spring stiffness (scalar joints only).
    pub jnt_stiffness: Vec<f64>,
    /// Spring rest position (scalar joints only).
    pub jnt_springref: Vec<f64>,

    // ==================== DOFs ====================
    /// Joint owning each dof.
    pub dof_jnt: Vec<usize>,
    /// Effective scalar inertia of each dof.
    pub dof_inertia: Vec<f64>,
    /// Viscous damping of each dof.
    pub dof_damping: Vec<f64>,

    // ==================== Actuators ====================
    /// Gain/bias family.
    pub actuator_kind: Vec<ActuatorKind>,
    /// Target joint.
    pub actuator_trnid: Vec<usize>,
    /// Transmission gear.
    pub actuator_gear: Vec<f64>,
    /// Control clamp range, when limited.
    pub actuator_ctrlrange: Vec<Option<(f64, f64)>>,

    // ==================== Sensors ====================
    /// Sensor type.
    pub sensor_type: Vec<SensorType>,
    /// Referenced object id (joint or actuator; unused for clock).
    pub sensor_objid: Vec<usize>,
    /// First sensordata address.
    pub sensor_adr: Vec<usize>,
    /// Number of sensordata entries.
    pub sensor_dim: Vec<usize>,

    // ==================== Names ====================
    /// NUL-separated name buffer; the model name comes first.
    pub names: Vec<u8>,
    /// Per-category name addresses into `names`, indexed by
    /// `ElementType::index()` then element id.
    pub(crate) name_adr: [Vec<usize>; 6],
    pub(crate) name_to_id: [HashMap<String, usize>; 6],
}

impl Model {
    /// Create a new [`Data`] with `qpos = qpos0` and everything else zero.
    #[must_use]
    pub fn make_data(&self) -> Data {
        Data::new(self)
    }

    /// Look up element index by name.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use sim_lite::ElementType;
    /// let joint_id = model.name2id(ElementType::Joint, "shoulder").unwrap();
    /// ```
    #[must_use]
    pub fn name2id(&self, element: ElementType, name: &str) -> Option<usize> {
        self.name_to_id[element.index()].get(name).copied()
    }

    /// Look up element name by index.
    ///
    /// Returns `None` if the index is out of bounds or the element has no name.
    #[must_use]
    pub fn id2name(&self, element: ElementType, id: usize) -> Option<&str> {
        self.id2name_c(element, id).and_then(|c| c.to_str().ok())
    }

    /// Like [`id2name`](Self::id2name) but borrows the NUL-terminated entry in
    /// the name buffer, for handing straight to C callers.
    #[must_use]
    pub fn id2name_c(&self, element: ElementType, id: usize) -> Option<&CStr> {
        let adr = *self.name_adr[element.index()].get(id)?;
        let tail = self.names.get(adr..)?;
        if tail.first().is_none_or(|b| *b == 0) {
            return None;
        }
        CStr::from_bytes_until_nul(tail).ok()
    }

    /// Number of elements in a category.
    #[must_use]
    pub fn count(&self, element: ElementType) -> usize {
        match element {
            ElementType::Body => self.nbody,
            ElementType::Joint => self.njnt,
            ElementType::Geom => self.ngeom,
            ElementType::Site => self.nsite,
            ElementType::Actuator => self.nu,
            ElementType::Sensor => self.nsensor,
        }
    }
}
