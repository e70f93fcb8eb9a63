//! Error types for model loading and stepping.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Warning;

/// Errors that can occur while loading an MJCF model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Missing required element.
    #[error("missing required element: {element} in {context}")]
    MissingElement {
        /// The missing element name.
        element: &'static str,
        /// Where the element was expected.
        context: String,
    },

    /// Missing required attribute.
    #[error("missing required attribute: {attribute} on {element}")]
    MissingAttribute {
        /// The missing attribute name.
        attribute: &'static str,
        /// The element that should have the attribute.
        element: String,
    },

    /// Invalid attribute value.
    #[error("invalid value for {attribute} on {element}: {message}")]
    InvalidAttribute {
        /// The attribute with the invalid value.
        attribute: &'static str,
        /// The element containing the attribute.
        element: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// Unknown joint type.
    #[error("unknown joint type: {0}")]
    UnknownJointType(String),

    /// Unknown sensor type.
    #[error("unknown sensor type: {0}")]
    UnknownSensorType(String),

    /// Reference to an element that does not exist.
    #[error("reference to undefined {element}: {name} in {context}")]
    UndefinedReference {
        /// Category of the referenced element.
        element: &'static str,
        /// The name that was referenced.
        name: String,
        /// The context where it was referenced.
        context: String,
    },

    /// Two elements of the same category share a name.
    #[error("duplicate {element} name: {name}")]
    DuplicateName {
        /// Category of the duplicated element.
        element: &'static str,
        /// The duplicated name.
        name: String,
    },

    /// Invalid option value.
    #[error("invalid option '{option}': {message}")]
    InvalidOption {
        /// The option with the invalid value.
        option: &'static str,
        /// Description of why the value is invalid.
        message: String,
    },

    /// Feature outside the supported subset.
    #[error("unsupported MJCF feature: {0}")]
    Unsupported(String),

    /// The model file could not be read.
    #[error("could not read {}: {source}", path.display())]
    File {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Create a missing element error.
    pub fn missing_element(element: &'static str, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element,
            context: context.into(),
        }
    }

    /// Create a missing attribute error.
    pub fn missing_attribute(attribute: &'static str, element: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute,
            element: element.into(),
        }
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(
        attribute: &'static str,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            attribute,
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create an undefined reference error.
    pub fn undefined(
        element: &'static str,
        name: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::UndefinedReference {
            element,
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create an invalid option error.
    pub fn invalid_option(option: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            message: message.into(),
        }
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors reported by [`Data::step`](crate::Data::step).
///
/// `Diverged` is recoverable: the state has already been reset to `qpos0`
/// and the step continued from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StepError {
    /// Timestep is zero, negative or not finite.
    #[error("timestep is zero or negative")]
    InvalidTimestep,
    /// A state array held a non-finite or huge value.
    #[error("simulation diverged ({warning} at index {index}); state was reset")]
    Diverged {
        /// Which check fired.
        warning: Warning,
        /// First offending index.
        index: usize,
    },
}
