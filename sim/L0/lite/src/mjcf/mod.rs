//! MJCF loading: parse the XML subset, then compile it into a [`Model`].

pub mod builder;
pub mod parser;
pub mod types;

use std::path::Path;

use crate::error::{LoadError, Result};
use crate::types::Model;

pub use builder::model_from_mjcf;
pub use parser::parse_mjcf_str;

/// Load a model from an MJCF XML string.
///
/// # Errors
///
/// Returns a [`LoadError`] if the XML is malformed or the model fails
/// validation.
///
/// # Example
///
/// ```
/// let model = sim_lite::load_model(r#"
///     <mujoco model="pendulum">
///       <worldbody>
///         <body name="bob"><joint name="hinge"/><geom mass="1"/></body>
///       </worldbody>
///     </mujoco>
/// "#).expect("valid model");
/// assert_eq!(model.nq, 1);
/// ```
pub fn load_model(xml: &str) -> Result<Model> {
    let mjcf = parse_mjcf_str(xml)?;
    model_from_mjcf(&mjcf)
}

/// Load a model from an MJCF file on disk.
///
/// # Errors
///
/// Returns [`LoadError::File`] if the file cannot be read, otherwise the same
/// errors as [`load_model`].
pub fn load_model_from_file<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path).map_err(|source| LoadError::File {
        path: path.to_path_buf(),
        source,
    })?;
    load_model(&xml)
}
