//! Compile the MJCF intermediate representation into a [`Model`].

use std::collections::HashMap;

use nalgebra::{DVector, Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use tracing::debug;

use super::types::{
    AngleUnit, Limited, MjcfActuatorType, MjcfBody, MjcfGeom, MjcfModel, MjcfSensor,
};
use crate::error::{LoadError, Result};
use crate::types::{ActuatorKind, ElementType, JointType, Model, SensorType};

/// Smallest inertia a dof may have.
const MIN_INERTIA: f64 = 1e-15;

/// Build a [`Model`] from parsed MJCF.
///
/// # Errors
///
/// Returns an error for a non-positive timestep, duplicate names within a
/// category, references to undefined elements, zero joint axes, massless
/// moving bodies, and actuators or sensors attached to the wrong joint type.
pub fn model_from_mjcf(mjcf: &MjcfModel) -> Result<Model> {
    let timestep = mjcf.option.timestep;
    if !timestep.is_finite() || timestep <= 0.0 {
        return Err(LoadError::invalid_option(
            "timestep",
            format!("must be positive and finite, got {timestep}"),
        ));
    }

    let mut names = NameTable::new(&mjcf.name);
    let bodies = flatten_bodies(&mjcf.worldbody);

    // ------------------------------------------------------------ bodies
    let mut body_parent = Vec::with_capacity(bodies.len());
    let mut body_mass = Vec::with_capacity(bodies.len());
    for (id, flat) in bodies.iter().enumerate() {
        names.add(ElementType::Body, flat.body.name.as_deref(), id)?;
        body_parent.push(flat.parent);
        body_mass.push(if id == 0 { 0.0 } else { body_mass_of(flat.body) });
    }
    let mut body_subtreemass = body_mass.clone();
    for id in (1..bodies.len()).rev() {
        let parent = body_parent[id];
        body_subtreemass[parent] += body_subtreemass[id];
    }

    // ------------------------------------------------------------ joints
    let mut jnt_type = Vec::new();
    let mut jnt_body = Vec::new();
    let mut jnt_qposadr = Vec::new();
    let mut jnt_dofadr = Vec::new();
    let mut jnt_axis = Vec::new();
    let mut jnt_stiffness = Vec::new();
    let mut jnt_springref = Vec::new();
    let mut dof_jnt = Vec::new();
    let mut dof_inertia = Vec::new();
    let mut dof_damping = Vec::new();
    let mut qpos0 = Vec::new();

    for (body_id, flat) in bodies.iter().enumerate() {
        for joint in &flat.body.joints {
            let jnt_id = jnt_type.len();
            names.add(ElementType::Joint, joint.name.as_deref(), jnt_id)?;
            let context = describe(ElementType::Joint, joint.name.as_deref(), jnt_id);

            let ty = joint.joint_type;
            let axis = if ty.is_scalar() {
                let norm = joint.axis.norm();
                if norm < 1e-10 {
                    return Err(LoadError::invalid_attribute(
                        "axis",
                        context,
                        "axis must be non-zero",
                    ));
                }
                joint.axis / norm
            } else {
                Vector3::z()
            };

            let inertia = body_subtreemass[body_id] + joint.armature;
            if inertia < MIN_INERTIA {
                return Err(LoadError::invalid_attribute(
                    "mass",
                    context,
                    "moving body has no mass",
                ));
            }

            let to_rad = |v: f64| match (ty, mjcf.compiler.angle) {
                (JointType::Hinge, AngleUnit::Degree) => v.to_radians(),
                _ => v,
            };

            jnt_type.push(ty);
            jnt_body.push(body_id);
            jnt_qposadr.push(qpos0.len());
            jnt_dofadr.push(dof_jnt.len());
            jnt_axis.push(axis);
            jnt_stiffness.push(joint.stiffness);
            jnt_springref.push(to_rad(joint.springref));

            match ty {
                JointType::Hinge | JointType::Slide => qpos0.push(to_rad(joint.ref_pos)),
                JointType::Ball => qpos0.extend([1.0, 0.0, 0.0, 0.0]),
                JointType::Free => {
                    let pose = flat.pose;
                    let q = pose.rotation;
                    qpos0.extend([pose.translation.x, pose.translation.y, pose.translation.z]);
                    qpos0.extend([q.w, q.i, q.j, q.k]);
                }
            }

            for _ in 0..ty.nv() {
                dof_jnt.push(jnt_id);
                dof_inertia.push(inertia);
                dof_damping.push(joint.damping);
            }
        }
    }

    // ------------------------------------------------------------ geoms & sites
    let mut ngeom = 0;
    let mut nsite = 0;
    for flat in &bodies {
        for geom in &flat.body.geoms {
            names.add(ElementType::Geom, geom.name.as_deref(), ngeom)?;
            ngeom += 1;
        }
        for site in &flat.body.sites {
            names.add(ElementType::Site, site.name.as_deref(), nsite)?;
            nsite += 1;
        }
    }

    // ------------------------------------------------------------ actuators
    let joint_ids = names.lookup(ElementType::Joint);
    let mut actuator_kind = Vec::new();
    let mut actuator_trnid = Vec::new();
    let mut actuator_gear = Vec::new();
    let mut actuator_ctrlrange = Vec::new();

    for (id, act) in mjcf.actuators.iter().enumerate() {
        names.add(ElementType::Actuator, act.name.as_deref(), id)?;
        let context = describe(ElementType::Actuator, act.name.as_deref(), id);

        let joint_name = act
            .joint
            .as_deref()
            .ok_or_else(|| LoadError::missing_attribute("joint", context.clone()))?;
        let jnt = *joint_ids
            .get(joint_name)
            .ok_or_else(|| LoadError::undefined("joint", joint_name, context.clone()))?;
        if !jnt_type[jnt].is_scalar() {
            return Err(LoadError::Unsupported(format!(
                "{context} drives a {:?} joint",
                jnt_type[jnt]
            )));
        }

        let ctrlrange = match (act.ctrllimited, act.ctrlrange) {
            (Limited::False, _) => None,
            (Limited::True, None) => {
                return Err(LoadError::invalid_attribute(
                    "ctrlrange",
                    context,
                    "ctrllimited requires ctrlrange",
                ));
            }
            (_, range) => range,
        };

        actuator_kind.push(match act.actuator_type {
            MjcfActuatorType::Motor => ActuatorKind::Motor,
            MjcfActuatorType::Position { kp } => ActuatorKind::Position { kp },
            MjcfActuatorType::Velocity { kv } => ActuatorKind::Velocity { kv },
        });
        actuator_trnid.push(jnt);
        actuator_gear.push(act.gear);
        actuator_ctrlrange.push(ctrlrange);
    }

    // ------------------------------------------------------------ sensors
    let actuator_ids = names.lookup(ElementType::Actuator);
    let mut sensor_type = Vec::new();
    let mut sensor_objid = Vec::new();
    let mut sensor_adr = Vec::new();
    let mut sensor_dim = Vec::new();
    let mut nsensordata = 0;

    for (id, sensor) in mjcf.sensors.iter().enumerate() {
        names.add(ElementType::Sensor, sensor.name.as_deref(), id)?;
        let objid = resolve_sensor(sensor, id, &joint_ids, &actuator_ids, &jnt_type)?;
        let dim = sensor.sensor_type.dim();
        sensor_type.push(sensor.sensor_type);
        sensor_objid.push(objid);
        sensor_adr.push(nsensordata);
        sensor_dim.push(dim);
        nsensordata += dim;
    }

    let (names, name_adr, name_to_id) = names.finish();

    let model = Model {
        name: mjcf.name.clone(),
        nq: qpos0.len(),
        nv: dof_jnt.len(),
        nu: actuator_kind.len(),
        nbody: bodies.len(),
        njnt: jnt_type.len(),
        ngeom,
        nsite,
        nsensor: sensor_type.len(),
        nsensordata,
        timestep,
        gravity: mjcf.option.gravity,
        qpos0: DVector::from_vec(qpos0),
        body_parent,
        body_mass,
        body_subtreemass,
        jnt_type,
        jnt_body,
        jnt_qposadr,
        jnt_dofadr,
        jnt_axis,
        jnt_stiffness,
        jnt_springref,
        dof_jnt,
        dof_inertia,
        dof_damping,
        actuator_kind,
        actuator_trnid,
        actuator_gear,
        actuator_ctrlrange,
        sensor_type,
        sensor_objid,
        sensor_adr,
        sensor_dim,
        names,
        name_adr,
        name_to_id,
    };

    debug!(
        model = %model.name,
        nq = model.nq,
        nv = model.nv,
        nu = model.nu,
        nbody = model.nbody,
        "compiled model"
    );
    Ok(model)
}

/// A body in depth-first order with its parent id and world pose.
struct FlatBody<'a> {
    body: &'a MjcfBody,
    parent: usize,
    pose: Isometry3<f64>,
}

fn flatten_bodies(world: &MjcfBody) -> Vec<FlatBody<'_>> {
    let mut out = vec![FlatBody {
        body: world,
        parent: 0,
        pose: Isometry3::identity(),
    }];
    push_children(world, 0, &mut out);
    out
}

fn push_children<'a>(body: &'a MjcfBody, id: usize, out: &mut Vec<FlatBody<'a>>) {
    let parent_pose = out[id].pose;
    for child in &body.children {
        let q = child.quat;
        let local = Isometry3::from_parts(
            Translation3::from(child.pos),
            UnitQuaternion::from_quaternion(Quaternion::new(q[0], q[1], q[2], q[3])),
        );
        let child_id = out.len();
        out.push(FlatBody {
            body: child,
            parent: id,
            pose: parent_pose * local,
        });
        push_children(child, child_id, out);
    }
}

fn body_mass_of(body: &MjcfBody) -> f64 {
    if let Some(mass) = body.inertial_mass {
        return mass;
    }
    if body.geoms.is_empty() {
        return 1.0;
    }
    body.geoms.iter().map(geom_mass).sum()
}

fn geom_mass(geom: &MjcfGeom) -> f64 {
    geom.mass.unwrap_or(1.0)
}

fn describe(element: ElementType, name: Option<&str>, id: usize) -> String {
    match name {
        Some(n) if !n.is_empty() => format!("{} '{n}'", element.as_str()),
        _ => format!("{} {id}", element.as_str()),
    }
}

fn resolve_sensor(
    sensor: &MjcfSensor,
    id: usize,
    joint_ids: &HashMap<String, usize>,
    actuator_ids: &HashMap<String, usize>,
    jnt_type: &[JointType],
) -> Result<usize> {
    let context = describe(ElementType::Sensor, sensor.name.as_deref(), id);
    let (category, table) = match sensor.sensor_type {
        SensorType::Clock => return Ok(0),
        SensorType::ActuatorFrc => ("actuator", actuator_ids),
        _ => ("joint", joint_ids),
    };

    let objname = sensor
        .objname
        .as_deref()
        .ok_or_else(|| LoadError::missing_attribute(category, context.clone()))?;
    let objid = *table
        .get(objname)
        .ok_or_else(|| LoadError::undefined(category, objname, context.clone()))?;

    let fits = match sensor.sensor_type {
        SensorType::JointPos | SensorType::JointVel => jnt_type[objid].is_scalar(),
        SensorType::BallQuat | SensorType::BallAngVel => jnt_type[objid] == JointType::Ball,
        SensorType::ActuatorFrc | SensorType::Clock => true,
    };
    if !fits {
        return Err(LoadError::invalid_attribute(
            "joint",
            context,
            format!("'{objname}' has the wrong joint type"),
        ));
    }
    Ok(objid)
}

/// Accumulates the NUL-separated name buffer and per-category lookups.
struct NameTable {
    buffer: Vec<u8>,
    adr: [Vec<usize>; 6],
    ids: [HashMap<String, usize>; 6],
}

impl NameTable {
    fn new(model_name: &str) -> Self {
        let mut buffer = model_name.as_bytes().to_vec();
        buffer.push(0);
        Self {
            buffer,
            adr: Default::default(),
            ids: Default::default(),
        }
    }

    /// Register element `id`. Unnamed elements get an empty entry.
    fn add(&mut self, element: ElementType, name: Option<&str>, id: usize) -> Result<()> {
        let slot = element.index();
        self.adr[slot].push(self.buffer.len());
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            if name.contains('\0') {
                return Err(LoadError::invalid_attribute(
                    "name",
                    element.as_str(),
                    "name contains NUL",
                ));
            }
            if self.ids[slot].insert(name.to_string(), id).is_some() {
                return Err(LoadError::DuplicateName {
                    element: element.as_str(),
                    name: name.to_string(),
                });
            }
            self.buffer.extend_from_slice(name.as_bytes());
        }
        self.buffer.push(0);
        Ok(())
    }

    fn lookup(&self, element: ElementType) -> HashMap<String, usize> {
        self.ids[element.index()].clone()
    }

    #[allow(clippy::type_complexity)]
    fn finish(self) -> (Vec<u8>, [Vec<usize>; 6], [HashMap<String, usize>; 6]) {
        (self.buffer, self.adr, self.ids)
    }
}
