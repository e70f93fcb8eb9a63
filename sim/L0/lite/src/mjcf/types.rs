//! Intermediate representation of the supported MJCF subset.
//!
//! These types mirror the XML closely; the builder turns them into a
//! [`Model`](crate::Model).

use nalgebra::{Vector3, Vector4};

use crate::types::{JointType, SensorType};

/// Angle unit for joint `ref` / `springref` on hinge joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    /// Degrees (MJCF default).
    #[default]
    Degree,
    /// Radians.
    Radian,
}

/// `<compiler>` settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MjcfCompiler {
    /// Unit for hinge angles.
    pub angle: AngleUnit,
}

/// `<option>` settings.
#[derive(Debug, Clone, Copy)]
pub struct MjcfOption {
    /// Integration timestep.
    pub timestep: f64,
    /// Gravity vector.
    pub gravity: Vector3<f64>,
}

impl Default for MjcfOption {
    fn default() -> Self {
        Self {
            timestep: 0.002,
            gravity: Vector3::new(0.0, 0.0, -9.81),
        }
    }
}

/// `<joint>` or `<freejoint>`.
#[derive(Debug, Clone)]
pub struct MjcfJoint {
    /// Optional name.
    pub name: Option<String>,
    /// Joint type.
    pub joint_type: JointType,
    /// Axis in the body frame (hinge/slide).
    pub axis: Vector3<f64>,
    /// Reference position, in compiler angle units for hinges.
    pub ref_pos: f64,
    /// Spring rest position, in compiler angle units for hinges.
    pub springref: f64,
    /// Spring stiffness.
    pub stiffness: f64,
    /// Viscous damping.
    pub damping: f64,
    /// Added rotor inertia.
    pub armature: f64,
}

impl Default for MjcfJoint {
    fn default() -> Self {
        Self {
            name: None,
            joint_type: JointType::Hinge,
            axis: Vector3::z(),
            ref_pos: 0.0,
            springref: 0.0,
            stiffness: 0.0,
            damping: 0.0,
            armature: 0.0,
        }
    }
}

/// `<geom>`; only the name and mass matter here.
#[derive(Debug, Clone, Default)]
pub struct MjcfGeom {
    /// Optional name.
    pub name: Option<String>,
    /// Explicit mass; unset geoms weigh 1.
    pub mass: Option<f64>,
}

/// `<site>`.
#[derive(Debug, Clone, Default)]
pub struct MjcfSite {
    /// Optional name.
    pub name: Option<String>,
}

/// `<body>` (or the world body).
#[derive(Debug, Clone)]
pub struct MjcfBody {
    /// Optional name. The world body is always named `world`.
    pub name: Option<String>,
    /// Position relative to the parent.
    pub pos: Vector3<f64>,
    /// Orientation (w, x, y, z).
    pub quat: Vector4<f64>,
    /// `<inertial mass>` if present.
    pub inertial_mass: Option<f64>,
    /// Joints connecting this body to its parent.
    pub joints: Vec<MjcfJoint>,
    /// Geoms attached to this body.
    pub geoms: Vec<MjcfGeom>,
    /// Sites attached to this body.
    pub sites: Vec<MjcfSite>,
    /// Child bodies.
    pub children: Vec<MjcfBody>,
}

impl MjcfBody {
    /// Empty body with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Default for MjcfBody {
    fn default() -> Self {
        Self {
            name: None,
            pos: Vector3::zeros(),
            quat: Vector4::new(1.0, 0.0, 0.0, 0.0),
            inertial_mass: None,
            joints: Vec::new(),
            geoms: Vec::new(),
            sites: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Actuator element type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MjcfActuatorType {
    /// `<motor>`.
    Motor,
    /// `<position kp>`.
    Position {
        /// Position gain.
        kp: f64,
    },
    /// `<velocity kv>`.
    Velocity {
        /// Velocity gain.
        kv: f64,
    },
}

/// Whether `ctrllimited` was given and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limited {
    /// Limited when a range is present.
    #[default]
    Auto,
    /// Always limited.
    True,
    /// Never limited.
    False,
}

impl Limited {
    /// Parse `true` / `false` / `auto`.
    pub fn from_mjcf(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            _ => None,
        }
    }
}

/// An actuator element.
#[derive(Debug, Clone)]
pub struct MjcfActuator {
    /// Optional name.
    pub name: Option<String>,
    /// Gain/bias family.
    pub actuator_type: MjcfActuatorType,
    /// Target joint name.
    pub joint: Option<String>,
    /// Transmission gear (first component).
    pub gear: f64,
    /// Control range.
    pub ctrlrange: Option<(f64, f64)>,
    /// `ctrllimited` flag.
    pub ctrllimited: Limited,
}

/// A sensor element.
#[derive(Debug, Clone)]
pub struct MjcfSensor {
    /// Optional name.
    pub name: Option<String>,
    /// Sensor type.
    pub sensor_type: SensorType,
    /// Referenced joint or actuator name (unused for `clock`).
    pub objname: Option<String>,
}

/// A parsed MJCF document.
#[derive(Debug, Clone)]
pub struct MjcfModel {
    /// Model name.
    pub name: String,
    /// Global options.
    pub option: MjcfOption,
    /// Compiler settings.
    pub compiler: MjcfCompiler,
    /// Root of the body tree.
    pub worldbody: MjcfBody,
    /// Actuators in declaration order.
    pub actuators: Vec<MjcfActuator>,
    /// Sensors in declaration order.
    pub sensors: Vec<MjcfSensor>,
}

impl MjcfModel {
    /// Empty model with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            option: MjcfOption::default(),
            compiler: MjcfCompiler::default(),
            worldbody: MjcfBody::new("world"),
            actuators: Vec::new(),
            sensors: Vec::new(),
        }
    }
}
