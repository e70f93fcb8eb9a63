//! Semi-implicit Euler integration.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::types::{Data, JointType, Model};

/// Advance `qvel` with `qacc`, then `qpos` with the new `qvel`, then `time`.
///
/// Quaternion coordinates of ball and free joints are integrated on the
/// manifold: the angular velocity is applied as an exponential-map rotation
/// in the body frame and the result is renormalized.
pub(crate) fn euler(model: &Model, data: &mut Data) {
    let dt = model.timestep;

    for d in 0..model.nv {
        data.qvel[d] += dt * data.qacc[d];
    }

    for j in 0..model.njnt {
        let qadr = model.jnt_qposadr[j];
        let dadr = model.jnt_dofadr[j];
        match model.jnt_type[j] {
            JointType::Hinge | JointType::Slide => {
                data.qpos[qadr] += dt * data.qvel[dadr];
            }
            JointType::Ball => integrate_quat(data, qadr, dadr, dt),
            JointType::Free => {
                for k in 0..3 {
                    data.qpos[qadr + k] += dt * data.qvel[dadr + k];
                }
                integrate_quat(data, qadr + 3, dadr + 3, dt);
            }
        }
    }

    data.time += dt;
}

fn integrate_quat(data: &mut Data, qadr: usize, dadr: usize, dt: f64) {
    let q = UnitQuaternion::from_quaternion(Quaternion::new(
        data.qpos[qadr],
        data.qpos[qadr + 1],
        data.qpos[qadr + 2],
        data.qpos[qadr + 3],
    ));
    let omega = Vector3::new(data.qvel[dadr], data.qvel[dadr + 1], data.qvel[dadr + 2]);
    let q = q * UnitQuaternion::from_scaled_axis(omega * dt);
    data.qpos[qadr] = q.w;
    data.qpos[qadr + 1] = q.i;
    data.qpos[qadr + 2] = q.j;
    data.qpos[qadr + 3] = q.k;
}
