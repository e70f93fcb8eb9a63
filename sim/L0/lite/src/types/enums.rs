//! Enums shared by [`Model`](super::Model) and [`Data`](super::Data).

/// Element type for name↔index lookup via [`Model::name2id`](super::Model::name2id)
/// / [`Model::id2name`](super::Model::id2name).
///
/// The numeric codes follow MuJoCo's `mjtObj` so that hosts can pass the same
/// integers they would pass to `mj_name2id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Body elements (indexed by body_id, world is 0).
    Body,
    /// Joint elements (indexed by jnt_id).
    Joint,
    /// Geom elements (indexed by geom_id).
    Geom,
    /// Site elements (indexed by site_id).
    Site,
    /// Actuator elements (indexed by actuator_id).
    Actuator,
    /// Sensor elements (indexed by sensor_id).
    Sensor,
}

impl ElementType {
    /// All categories, in name-buffer order.
    pub const ALL: [Self; 6] = [
        Self::Body,
        Self::Joint,
        Self::Geom,
        Self::Site,
        Self::Actuator,
        Self::Sensor,
    ];

    /// Map an `mjtObj` code. `mjOBJ_XBODY` resolves to bodies.
    #[must_use]
    pub fn from_mjt(code: i32) -> Option<Self> {
        match code {
            1 | 2 => Some(Self::Body),
            3 => Some(Self::Joint),
            5 => Some(Self::Geom),
            6 => Some(Self::Site),
            19 => Some(Self::Actuator),
            20 => Some(Self::Sensor),
            _ => None,
        }
    }

    /// The `mjtObj` code for this category.
    #[must_use]
    pub fn mjt(self) -> i32 {
        match self {
            Self::Body => 1,
            Self::Joint => 3,
            Self::Geom => 5,
            Self::Site => 6,
            Self::Actuator => 19,
            Self::Sensor => 20,
        }
    }

    /// Lowercase element name, as written in MJCF.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Joint => "joint",
            Self::Geom => "geom",
            Self::Site => "site",
            Self::Actuator => "actuator",
            Self::Sensor => "sensor",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Body => 0,
            Self::Joint => 1,
            Self::Geom => 2,
            Self::Site => 3,
            Self::Actuator => 4,
            Self::Sensor => 5,
        }
    }
}

/// Joint type following MuJoCo conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JointType {
    /// Hinge joint (1 DOF): rotation about a single axis.
    #[default]
    Hinge,
    /// Slide joint (1 DOF): translation along a single axis.
    Slide,
    /// Ball joint (3 DOF). qpos: unit quaternion (w, x, y, z).
    Ball,
    /// Free joint (6 DOF). qpos: position + quaternion, qvel: linear + angular.
    Free,
}

impl JointType {
    /// Parse an MJCF `type` attribute.
    #[must_use]
    pub fn from_mjcf(s: &str) -> Option<Self> {
        match s {
            "hinge" => Some(Self::Hinge),
            "slide" => Some(Self::Slide),
            "ball" => Some(Self::Ball),
            "free" => Some(Self::Free),
            _ => None,
        }
    }

    /// Number of position coordinates (nq contribution).
    #[must_use]
    pub fn nq(self) -> usize {
        match self {
            Self::Hinge | Self::Slide => 1,
            Self::Ball => 4,
            Self::Free => 7,
        }
    }

    /// Number of velocity coordinates (nv contribution).
    #[must_use]
    pub fn nv(self) -> usize {
        match self {
            Self::Hinge | Self::Slide => 1,
            Self::Ball => 3,
            Self::Free => 6,
        }
    }

    /// Whether this is a scalar (hinge or slide) joint.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Hinge | Self::Slide)
    }
}

/// Actuator gain/bias family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorKind {
    /// `force = ctrl`.
    Motor,
    /// `force = kp * (ctrl - length)`.
    Position {
        /// Position gain.
        kp: f64,
    },
    /// `force = kv * (ctrl - velocity)`.
    Velocity {
        /// Velocity gain.
        kv: f64,
    },
}

/// Sensor types supported by the lite engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    /// Scalar joint position.
    JointPos,
    /// Scalar joint velocity.
    JointVel,
    /// Scalar actuator force.
    ActuatorFrc,
    /// Ball joint quaternion.
    BallQuat,
    /// Ball joint angular velocity.
    BallAngVel,
    /// Simulation time.
    Clock,
}

impl SensorType {
    /// Parse an MJCF sensor element name.
    #[must_use]
    pub fn from_mjcf(s: &str) -> Option<Self> {
        match s {
            "jointpos" => Some(Self::JointPos),
            "jointvel" => Some(Self::JointVel),
            "actuatorfrc" => Some(Self::ActuatorFrc),
            "ballquat" => Some(Self::BallQuat),
            "ballangvel" => Some(Self::BallAngVel),
            "clock" => Some(Self::Clock),
            _ => None,
        }
    }

    /// Number of sensordata entries this sensor writes.
    #[must_use]
    pub fn dim(self) -> usize {
        match self {
            Self::JointPos | Self::JointVel | Self::ActuatorFrc | Self::Clock => 1,
            Self::BallQuat => 4,
            Self::BallAngVel => 3,
        }
    }
}
