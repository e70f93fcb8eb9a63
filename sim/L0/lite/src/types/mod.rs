//! Core type definitions: [`Model`], [`Data`] and their enums.

pub mod data;
pub mod enums;
pub mod model;
pub mod warning;

pub use data::Data;
pub use enums::{ActuatorKind, ElementType, JointType, SensorType};
pub use model::Model;
pub use warning::{MAX_VAL, NUM_WARNINGS, Warning, WarningStat};
