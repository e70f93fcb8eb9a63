//! Shared model fixtures.

use std::ffi::CString;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Two hinges on sprung, damped arms, starting away from rest.
///
/// Initial state: `qpos = [0.3, -0.2]`, `qvel = [0, 0]`.
pub const TWO_DOF: &str = r#"
<mujoco model="two_dof">
  <compiler angle="radian"/>
  <option timestep="0.01" gravity="0 0 -9.81"/>
  <worldbody>
    <body name="upper" pos="0 0 1">
      <joint name="shoulder" type="hinge" axis="0 1 0" ref="0.3" stiffness="4" damping="0.1"/>
      <geom name="upper_geom" type="capsule" size="0.05 0.2" mass="1"/>
      <site name="elbow_site"/>
      <body name="lower" pos="0 0 -0.4">
        <joint name="elbow" type="hinge" axis="0 1 0" ref="-0.2" stiffness="2" damping="0.1"/>
        <geom name="lower_geom" type="capsule" size="0.04 0.2" mass="0.5"/>
      </body>
    </body>
  </worldbody>
  <actuator>
    <motor name="shoulder_motor" joint="shoulder" gear="1" ctrlrange="-1 1"/>
  </actuator>
  <sensor>
    <jointpos name="shoulder_pos" joint="shoulder"/>
    <jointvel name="elbow_vel" joint="elbow"/>
  </sensor>
</mujoco>
"#;

/// A single slider falling under gravity.
pub const SLIDER: &str = r#"
<mujoco model="slider">
  <option timestep="0.002"/>
  <worldbody>
    <body name="cart">
      <joint name="z" type="slide" axis="0 0 1"/>
      <geom mass="2"/>
    </body>
  </worldbody>
</mujoco>
"#;

/// Model files written to a temporary directory that lives as long as the
/// fixture.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    /// Write `xml` to `<dir>/<name>` and return its path.
    pub fn write(&self, name: &str, xml: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, xml).expect("write model");
        path
    }

    /// Path inside the fixture that does not exist.
    pub fn missing(&self) -> PathBuf {
        self.dir.path().join("missing.xml")
    }
}

/// `path` as a C string for the exports.
pub fn c_path(path: &Path) -> CString {
    CString::new(path.to_str().expect("utf-8 path")).expect("no interior NUL")
}
