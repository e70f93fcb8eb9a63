//! MJCF XML parser.
//!
//! Parses the supported MJCF subset into the intermediate representation.
//! Elements outside the subset are skipped, except inside `<actuator>` and
//! `<sensor>` where an unknown element would silently change `nu` or
//! `nsensordata`.

use std::io::BufRead;

use nalgebra::{Vector3, Vector4};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::types::{
    AngleUnit, Limited, MjcfActuator, MjcfActuatorType, MjcfBody, MjcfCompiler, MjcfGeom,
    MjcfJoint, MjcfModel, MjcfOption, MjcfSensor, MjcfSite,
};
use crate::error::{LoadError, Result};
use crate::types::{JointType, SensorType};

/// Parse an MJCF string into the intermediate representation.
///
/// # Errors
///
/// Returns an error if the XML is malformed, the root `<mujoco>` element is
/// missing, or an attribute value cannot be parsed.
pub fn parse_mjcf_str(xml: &str) -> Result<MjcfModel> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    parse_mjcf_reader(&mut reader)
}

fn parse_mjcf_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<MjcfModel> {
    let mut buf = Vec::new();
    let mut model: Option<MjcfModel> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"mujoco" => {
                model = Some(parse_mujoco(reader, e)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"mujoco" => {
                model = Some(MjcfModel::new(model_name(e)));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(LoadError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    model.ok_or_else(|| LoadError::missing_element("mujoco", "MJCF document"))
}

fn model_name(e: &BytesStart) -> String {
    get_attribute_opt(e, "model").unwrap_or_else(|| "unnamed".to_string())
}

fn parse_mujoco<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<MjcfModel> {
    let mut model = MjcfModel::new(model_name(start));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"option" => {
                        model.option = parse_option_attrs(e)?;
                        skip_element(reader, &elem_name)?;
                    }
                    b"compiler" => {
                        model.compiler = parse_compiler_attrs(e)?;
                        skip_element(reader, &elem_name)?;
                    }
                    b"worldbody" => {
                        let wb = parse_worldbody(reader)?;
                        model.worldbody.children.extend(wb.children);
                        model.worldbody.geoms.extend(wb.geoms);
                        model.worldbody.sites.extend(wb.sites);
                    }
                    b"actuator" => model.actuators.extend(parse_actuators(reader)?),
                    b"sensor" => model.sensors.extend(parse_sensors(reader)?),
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"option" => model.option = parse_option_attrs(e)?,
                b"compiler" => model.compiler = parse_compiler_attrs(e)?,
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"mujoco" => break,
            Ok(Event::Eof) => return Err(LoadError::XmlParse("unexpected EOF in mujoco".into())),
            Ok(_) => {}
            Err(e) => return Err(LoadError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(model)
}

fn parse_option_attrs(e: &BytesStart) -> Result<MjcfOption> {
    let mut option = MjcfOption::default();
    if let Some(ts) = parse_float_attr(e, "timestep", "option")? {
        option.timestep = ts;
    }
    if let Some(g) = get_attribute_opt(e, "gravity") {
        option.gravity = parse_vector3(&g)?;
    }
    Ok(option)
}

fn parse_compiler_attrs(e: &BytesStart) -> Result<MjcfCompiler> {
    let mut compiler = MjcfCompiler::default();
    if let Some(angle) = get_attribute_opt(e, "angle") {
        compiler.angle = match angle.as_str() {
            "degree" => AngleUnit::Degree,
            "radian" => AngleUnit::Radian,
            other => {
                return Err(LoadError::invalid_attribute(
                    "angle",
                    "compiler",
                    format!("expected 'degree' or 'radian', got '{other}'"),
                ));
            }
        };
    }
    Ok(compiler)
}

// ============================================================================
// Body tree
// ============================================================================

fn parse_worldbody<R: BufRead>(reader: &mut Reader<R>) -> Result<MjcfBody> {
    let mut worldbody = MjcfBody::new("world");
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"body" => worldbody.children.push(parse_body(reader, e)?),
                    b"geom" => {
                        worldbody.geoms.push(parse_geom_attrs(e)?);
                        skip_element(reader, &elem_name)?;
                    }
                    b"site" => {
                        worldbody.sites.push(parse_site_attrs(e));
                        skip_element(reader, &elem_name)?;
                    }
                    b"joint" | b"freejoint" => {
                        return Err(LoadError::Unsupported("joint on the world body".into()));
                    }
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"body" => worldbody.children.push(parse_body_attrs(e)?),
                b"geom" => worldbody.geoms.push(parse_geom_attrs(e)?),
                b"site" => worldbody.sites.push(parse_site_attrs(e)),
                b"joint" | b"freejoint" => {
                    return Err(LoadError::Unsupported("joint on the world body".into()));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"worldbody" => break,
            Ok(Event::Eof) => {
                return Err(LoadError::XmlParse("unexpected EOF in worldbody".into()));
            }
            Ok(_) => {}
            Err(e) => return Err(LoadError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(worldbody)
}

fn parse_body<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<MjcfBody> {
    let mut body = parse_body_attrs(start)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"body" => body.children.push(parse_body(reader, e)?),
                    _ => {
                        parse_body_leaf(&mut body, e)?;
                        skip_element(reader, &elem_name)?;
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"body" {
                    body.children.push(parse_body_attrs(e)?);
                } else {
                    parse_body_leaf(&mut body, e)?;
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"body" => break,
            Ok(Event::Eof) => return Err(LoadError::XmlParse("unexpected EOF in body".into())),
            Ok(_) => {}
            Err(e) => return Err(LoadError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(body)
}

/// Elements that live directly inside a body and carry only attributes.
fn parse_body_leaf(body: &mut MjcfBody, e: &BytesStart) -> Result<()> {
    match e.name().as_ref() {
        b"joint" => body.joints.push(parse_joint_attrs(e)?),
        b"freejoint" => body.joints.push(MjcfJoint {
            name: get_attribute_opt(e, "name"),
            joint_type: JointType::Free,
            ..MjcfJoint::default()
        }),
        b"geom" => body.geoms.push(parse_geom_attrs(e)?),
        b"site" => body.sites.push(parse_site_attrs(e)),
        b"inertial" => {
            let mass = parse_float_attr(e, "mass", "inertial")?
                .ok_or_else(|| LoadError::missing_attribute("mass", "inertial"))?;
            body.inertial_mass = Some(mass);
        }
        _ => {}
    }
    Ok(())
}

fn parse_body_attrs(e: &BytesStart) -> Result<MjcfBody> {
    let mut body = MjcfBody {
        name: get_attribute_opt(e, "name"),
        ..MjcfBody::default()
    };
    if let Some(pos) = get_attribute_opt(e, "pos") {
        body.pos = parse_vector3(&pos)?;
    }
    if let Some(quat) = get_attribute_opt(e, "quat") {
        body.quat = parse_vector4(&quat)?;
    }
    Ok(body)
}

fn parse_joint_attrs(e: &BytesStart) -> Result<MjcfJoint> {
    let mut joint = MjcfJoint {
        name: get_attribute_opt(e, "name"),
        ..MjcfJoint::default()
    };
    if let Some(ty) = get_attribute_opt(e, "type") {
        joint.joint_type = JointType::from_mjcf(&ty).ok_or(LoadError::UnknownJointType(ty))?;
    }
    if let Some(axis) = get_attribute_opt(e, "axis") {
        joint.axis = parse_vector3(&axis)?;
    }
    if let Some(v) = parse_float_attr(e, "ref", "joint")? {
        joint.ref_pos = v;
    }
    if let Some(v) = parse_float_attr(e, "springref", "joint")? {
        joint.springref = v;
    }
    if let Some(v) = parse_float_attr(e, "stiffness", "joint")? {
        joint.stiffness = v;
    }
    if let Some(v) = parse_float_attr(e, "damping", "joint")? {
        joint.damping = v;
    }
    if let Some(v) = parse_float_attr(e, "armature", "joint")? {
        joint.armature = v;
    }
    Ok(joint)
}

fn parse_geom_attrs(e: &BytesStart) -> Result<MjcfGeom> {
    Ok(MjcfGeom {
        name: get_attribute_opt(e, "name"),
        mass: parse_float_attr(e, "mass", "geom")?,
    })
}

fn parse_site_attrs(e: &BytesStart) -> MjcfSite {
    MjcfSite {
        name: get_attribute_opt(e, "name"),
    }
}

// ============================================================================
// Actuators and sensors
// ============================================================================

fn parse_actuators<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<MjcfActuator>> {
    let mut actuators = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                actuators.push(parse_actuator_attrs(e)?);
                skip_element(reader, &elem_name)?;
            }
            Ok(Event::Empty(ref e)) => actuators.push(parse_actuator_attrs(e)?),
            Ok(Event::End(ref e)) if e.name().as_ref() == b"actuator" => break,
            Ok(Event::Eof) => {
                return Err(LoadError::XmlParse("unexpected EOF in actuator".into()));
            }
            Ok(_) => {}
            Err(e) => return Err(LoadError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(actuators)
}

fn parse_actuator_attrs(e: &BytesStart) -> Result<MjcfActuator> {
    let elem = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let actuator_type = match elem.as_str() {
        "motor" => MjcfActuatorType::Motor,
        "position" => MjcfActuatorType::Position {
            kp: parse_float_attr(e, "kp", &elem)?.unwrap_or(1.0),
        },
        "velocity" => MjcfActuatorType::Velocity {
            kv: parse_float_attr(e, "kv", &elem)?.unwrap_or(1.0),
        },
        other => return Err(LoadError::Unsupported(format!("actuator type <{other}>"))),
    };

    let gear = match get_attribute_opt(e, "gear") {
        Some(s) => parse_float_array(&s)?.first().copied().unwrap_or(1.0),
        None => 1.0,
    };

    let ctrlrange = match get_attribute_opt(e, "ctrlrange") {
        Some(s) => {
            let parts = parse_float_array(&s)?;
            match parts.as_slice() {
                [lo, hi] if lo <= hi => Some((*lo, *hi)),
                _ => {
                    return Err(LoadError::invalid_attribute(
                        "ctrlrange",
                        elem,
                        format!("expected 'low high' with low <= high, got '{s}'"),
                    ));
                }
            }
        }
        None => None,
    };

    let ctrllimited = match get_attribute_opt(e, "ctrllimited") {
        Some(s) => Limited::from_mjcf(&s).ok_or_else(|| {
            LoadError::invalid_attribute("ctrllimited", elem.clone(), format!("'{s}'"))
        })?,
        None => Limited::Auto,
    };

    Ok(MjcfActuator {
        name: get_attribute_opt(e, "name"),
        actuator_type,
        joint: get_attribute_opt(e, "joint"),
        gear,
        ctrlrange,
        ctrllimited,
    })
}

fn parse_sensors<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<MjcfSensor>> {
    let mut sensors = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                sensors.push(parse_sensor_attrs(e)?);
                skip_element(reader, &elem_name)?;
            }
            Ok(Event::Empty(ref e)) => sensors.push(parse_sensor_attrs(e)?),
            Ok(Event::End(ref e)) if e.name().as_ref() == b"sensor" => break,
            Ok(Event::Eof) => return Err(LoadError::XmlParse("unexpected EOF in sensor".into())),
            Ok(_) => {}
            Err(e) => return Err(LoadError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(sensors)
}

fn parse_sensor_attrs(e: &BytesStart) -> Result<MjcfSensor> {
    let elem = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let sensor_type = SensorType::from_mjcf(&elem).ok_or(LoadError::UnknownSensorType(elem))?;
    let objname = match sensor_type {
        SensorType::ActuatorFrc => get_attribute_opt(e, "actuator"),
        SensorType::Clock => None,
        _ => get_attribute_opt(e, "joint"),
    };
    Ok(MjcfSensor {
        name: get_attribute_opt(e, "name"),
        sensor_type,
        objname,
    })
}

// ============================================================================
// Attribute helpers
// ============================================================================

fn get_attribute_opt(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return String::from_utf8(attr.value.to_vec()).ok();
        }
    }
    None
}

/// Parse a float attribute. Absent is `Ok(None)`, unparseable is an error.
fn parse_float_attr(e: &BytesStart, name: &'static str, element: &str) -> Result<Option<f64>> {
    match get_attribute_opt(e, name) {
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| LoadError::invalid_attribute(name, element, format!("'{s}'"))),
        None => Ok(None),
    }
}

fn parse_vector3(s: &str) -> Result<Vector3<f64>> {
    let parts = parse_float_array(s)?;
    if parts.len() < 3 {
        return Err(LoadError::XmlParse(format!(
            "expected 3 values in vector, got {}: {s}",
            parts.len()
        )));
    }
    Ok(Vector3::new(parts[0], parts[1], parts[2]))
}

fn parse_vector4(s: &str) -> Result<Vector4<f64>> {
    let parts = parse_float_array(s)?;
    if parts.len() < 4 {
        return Err(LoadError::XmlParse(format!(
            "expected 4 values in vector, got {}: {s}",
            parts.len()
        )));
    }
    Ok(Vector4::new(parts[0], parts[1], parts[2], parts[3]))
}

fn parse_float_array(s: &str) -> Result<Vec<f64>> {
    s.split_whitespace()
        .map(|p| {
            p.parse::<f64>()
                .map_err(|_| LoadError::XmlParse(format!("invalid float: {p}")))
        })
        .collect()
}

fn skip_element<R: BufRead>(reader: &mut Reader<R>, name: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == name => depth += 1,
            Ok(Event::End(ref e)) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(LoadError::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(())
}
