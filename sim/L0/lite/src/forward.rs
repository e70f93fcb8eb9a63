//! Forward dynamics: actuation, passive forces, accelerations, sensors.
//!
//! Every dof is an independent scalar system `inertia * qacc = qfrc`. There
//! is no kinematic coupling between joints, no contact and no constraint
//! solve; gravity acts only along translational dofs.

use crate::types::warning::{first_bad, record_warning};
use crate::types::{ActuatorKind, Data, JointType, Model, SensorType, Warning};

/// Run the full forward pass at the current state.
pub fn forward(model: &Model, data: &mut Data) {
    fwd_actuation(model, data);
    fwd_passive(model, data);
    fwd_acceleration(model, data);
    fwd_sensor(model, data);
}

/// Actuator forces from controls. Bad controls are zeroed with a warning.
fn fwd_actuation(model: &Model, data: &mut Data) {
    if let Some(index) = first_bad(data.ctrl.as_slice()) {
        record_warning(data, Warning::BadCtrl, index);
        data.ctrl.fill(0.0);
    }

    data.qfrc_actuator.fill(0.0);
    for i in 0..model.nu {
        let jnt = model.actuator_trnid[i];
        let gear = model.actuator_gear[i];
        let qadr = model.jnt_qposadr[jnt];
        let dadr = model.jnt_dofadr[jnt];

        let mut ctrl = data.ctrl[i];
        if let Some((lo, hi)) = model.actuator_ctrlrange[i] {
            ctrl = ctrl.clamp(lo, hi);
        }

        let force = match model.actuator_kind[i] {
            ActuatorKind::Motor => ctrl,
            ActuatorKind::Position { kp } => kp * (ctrl - gear * data.qpos[qadr]),
            ActuatorKind::Velocity { kv } => kv * (ctrl - gear * data.qvel[dadr]),
        };
        data.actuator_force[i] = force;
        data.qfrc_actuator[dadr] += gear * force;
    }
}

/// Springs, dampers and gravity.
fn fwd_passive(model: &Model, data: &mut Data) {
    for d in 0..model.nv {
        data.qfrc_passive[d] = -model.dof_damping[d] * data.qvel[d];
    }

    for j in 0..model.njnt {
        let dadr = model.jnt_dofadr[j];
        let mass = model.body_subtreemass[model.jnt_body[j]];
        match model.jnt_type[j] {
            JointType::Hinge => {
                let qadr = model.jnt_qposadr[j];
                data.qfrc_passive[dadr] -=
                    model.jnt_stiffness[j] * (data.qpos[qadr] - model.jnt_springref[j]);
            }
            JointType::Slide => {
                let qadr = model.jnt_qposadr[j];
                data.qfrc_passive[dadr] -=
                    model.jnt_stiffness[j] * (data.qpos[qadr] - model.jnt_springref[j]);
                data.qfrc_passive[dadr] += mass * model.gravity.dot(&model.jnt_axis[j]);
            }
            JointType::Free => {
                for k in 0..3 {
                    data.qfrc_passive[dadr + k] += mass * model.gravity[k];
                }
            }
            JointType::Ball => {}
        }
    }
}

fn fwd_acceleration(model: &Model, data: &mut Data) {
    for d in 0..model.nv {
        data.qacc[d] = (data.qfrc_actuator[d] + data.qfrc_passive[d]) / model.dof_inertia[d];
    }
}

fn fwd_sensor(model: &Model, data: &mut Data) {
    for s in 0..model.nsensor {
        let adr = model.sensor_adr[s];
        let obj = model.sensor_objid[s];
        match model.sensor_type[s] {
            SensorType::JointPos => data.sensordata[adr] = data.qpos[model.jnt_qposadr[obj]],
            SensorType::JointVel => data.sensordata[adr] = data.qvel[model.jnt_dofadr[obj]],
            SensorType::ActuatorFrc => data.sensordata[adr] = data.actuator_force[obj],
            SensorType::BallQuat => {
                let qadr = model.jnt_qposadr[obj];
                for k in 0..4 {
                    data.sensordata[adr + k] = data.qpos[qadr + k];
                }
            }
            SensorType::BallAngVel => {
                let dadr = model.jnt_dofadr[obj];
                for k in 0..3 {
                    data.sensordata[adr + k] = data.qvel[dadr + k];
                }
            }
            SensorType::Clock => data.sensordata[adr] = data.time,
        }
    }
}
