//! Name lookup through `mjtObj` category codes.

use sim_lite::ElementType;
use sim_wasm::{Handle, LiteEngine, Registry};

use crate::common::{Fixture, TWO_DOF};

const BODY: i32 = 1;
const XBODY: i32 = 2;
const JOINT: i32 = 3;
const GEOM: i32 = 5;
const SITE: i32 = 6;
const ACTUATOR: i32 = 19;
const SENSOR: i32 = 20;

fn name(registry: &Registry<LiteEngine>, h: Handle, category: i32, id: i32) -> Option<String> {
    registry
        .name_at(h, category, id)
        .map(|c| c.to_str().expect("utf-8").to_string())
}

#[test]
fn category_codes_match_element_types() {
    for element in ElementType::ALL {
        assert_eq!(ElementType::from_mjt(element.mjt()), Some(element));
    }
    assert_eq!(ElementType::from_mjt(BODY), Some(ElementType::Body));
    assert_eq!(ElementType::from_mjt(SENSOR), Some(ElementType::Sensor));
}

#[test]
fn name_at_every_category() {
    let fx = Fixture::new();
    let mut registry = Registry::new(LiteEngine);
    let h = registry
        .create(&fx.write("two_dof.xml", TWO_DOF))
        .expect("create");

    // Bodies, world first
    assert_eq!(name(&registry, h, BODY, 0).as_deref(), Some("world"));
    assert_eq!(name(&registry, h, BODY, 1).as_deref(), Some("upper"));
    assert_eq!(name(&registry, h, XBODY, 2).as_deref(), Some("lower"));

    assert_eq!(name(&registry, h, JOINT, 0).as_deref(), Some("shoulder"));
    assert_eq!(name(&registry, h, JOINT, 1).as_deref(), Some("elbow"));
    assert_eq!(name(&registry, h, GEOM, 1).as_deref(), Some("lower_geom"));
    assert_eq!(name(&registry, h, SITE, 0).as_deref(), Some("elbow_site"));
    assert_eq!(name(&registry, h, ACTUATOR, 0).as_deref(), Some("shoulder_motor"));
    assert_eq!(name(&registry, h, SENSOR, 1).as_deref(), Some("elbow_vel"));
}

#[test]
fn name_at_out_of_range_is_absent() {
    let fx = Fixture::new();
    let mut registry = Registry::new(LiteEngine);
    let h = registry
        .create(&fx.write("two_dof.xml", TWO_DOF))
        .expect("create");

    assert!(registry.name_at(h, JOINT, 2).is_none());
    assert!(registry.name_at(h, JOINT, -1).is_none());
    assert!(registry.name_at(h, 0, 0).is_none(), "unknown category");
    assert!(registry.name_at(h, 7, 0).is_none(), "cameras are not tracked");
}

#[test]
fn name_to_id_round_trip() {
    let fx = Fixture::new();
    let mut registry = Registry::new(LiteEngine);
    let h = registry
        .create(&fx.write("two_dof.xml", TWO_DOF))
        .expect("create");

    for (category, names) in [
        (BODY, &["world", "upper", "lower"][..]),
        (JOINT, &["shoulder", "elbow"][..]),
        (GEOM, &["upper_geom", "lower_geom"][..]),
        (SENSOR, &["shoulder_pos", "elbow_vel"][..]),
    ] {
        for (id, n) in names.iter().enumerate() {
            let id = i32::try_from(id).expect("small");
            assert_eq!(registry.name_to_id(h, category, n), id);
            assert_eq!(name(&registry, h, category, id).as_deref(), Some(*n));
        }
    }

    assert_eq!(registry.name_to_id(h, JOINT, "wrist"), -1);
    assert_eq!(registry.name_to_id(h, GEOM, "shoulder"), -1, "wrong category");
    assert_eq!(registry.name_to_id(h, 99, "shoulder"), -1);
}

#[test]
fn unnamed_elements_have_no_name() {
    let fx = Fixture::new();
    let path = fx.write(
        "unnamed.xml",
        r#"
        <mujoco>
          <worldbody>
            <body><joint type="slide"/><geom/></body>
          </worldbody>
        </mujoco>"#,
    );
    let mut registry = Registry::new(LiteEngine);
    let h = registry.create(&path).expect("create");

    assert!(registry.name_at(h, BODY, 1).is_none());
    assert!(registry.name_at(h, JOINT, 0).is_none());
    assert!(registry.name_at(h, GEOM, 0).is_none());
    assert_eq!(registry.name_to_id(h, JOINT, ""), -1);
}

#[test]
fn lookups_on_freed_handle_fail() {
    let fx = Fixture::new();
    let mut registry = Registry::new(LiteEngine);
    let h = registry
        .create(&fx.write("two_dof.xml", TWO_DOF))
        .expect("create");
    registry.free(h);

    assert!(registry.name_at(h, JOINT, 0).is_none());
    assert_eq!(registry.name_to_id(h, JOINT, "shoulder"), -1);
}
