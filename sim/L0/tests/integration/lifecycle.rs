//! Registry lifecycle: create, free, validity, slot reuse and exhaustion.

use sim_wasm::{Dim, ErrorCode, LiteEngine, Registry, RegistryConfig, RegistryError, View};

use crate::common::{Fixture, SLIDER, TWO_DOF};

#[test]
fn create_reports_model_dimensions() {
    let fx = Fixture::new();
    let path = fx.write("two_dof.xml", TWO_DOF);
    let mut registry = Registry::new(LiteEngine);

    let h = registry.create(&path).expect("create");
    assert!(registry.is_valid(h));
    assert_eq!(h.index(), 1, "slot 0 is reserved");

    assert_eq!(registry.dim(h, Dim::Nq), 2);
    assert_eq!(registry.dim(h, Dim::Nv), 2);
    assert_eq!(registry.dim(h, Dim::Nu), 1);
    assert_eq!(registry.dim(h, Dim::NSensorData), 2);
    assert_eq!(registry.dim(h, Dim::NBody), 3);
    assert_eq!(registry.dim(h, Dim::NJnt), 2);
    assert_eq!(registry.dim(h, Dim::NGeom), 2);
    assert_eq!(registry.dim(h, Dim::NSite), 1);
    assert_eq!(registry.dim(h, Dim::NSensor), 2);
    assert_eq!(registry.timestep(h), 0.01);
    assert_eq!(registry.time(h), 0.0);
    assert_eq!(registry.last_error(h).expect("live").code(), ErrorCode::None);
}

#[test]
fn successful_create_leaves_global_error_alone() {
    let fx = Fixture::new();
    let mut registry = Registry::new(LiteEngine);

    registry.create(&fx.missing()).unwrap_err();
    registry
        .create(&fx.write("slider.xml", SLIDER))
        .expect("create");
    assert_eq!(registry.global_error().code(), ErrorCode::Load);
}

#[test]
fn missing_file_is_a_load_error() {
    let fx = Fixture::new();
    let mut registry = Registry::new(LiteEngine);

    let err = registry.create(&fx.missing()).unwrap_err();
    assert!(matches!(err, RegistryError::Load(_)));
    assert_eq!(registry.global_error().code(), ErrorCode::Load);
    assert!(registry.global_error().message().contains("missing.xml"));
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn malformed_model_is_a_load_error() {
    let fx = Fixture::new();
    let mut registry = Registry::new(LiteEngine);

    // Actuator on an undefined joint
    let bad = fx.write(
        "bad.xml",
        r#"<mujoco><worldbody/><actuator><motor joint="nope"/></actuator></mujoco>"#,
    );
    registry.create(&bad).unwrap_err();
    assert_eq!(registry.global_error().code(), ErrorCode::Load);
    assert!(!registry.global_error().message().is_empty());

    // Not XML at all
    let garbage = fx.write("garbage.xml", "<mujoco><worldbody>");
    registry.create(&garbage).unwrap_err();
    assert_eq!(registry.global_error().code(), ErrorCode::Load);
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn free_is_idempotent() {
    let fx = Fixture::new();
    let path = fx.write("slider.xml", SLIDER);
    let mut registry = Registry::new(LiteEngine);

    let h = registry.create(&path).expect("create");
    assert!(registry.free(h));
    assert!(!registry.is_valid(h));
    assert!(!registry.free(h));
    assert!(!registry.free(h));
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn reused_slot_behaves_as_fresh_instance() {
    let fx = Fixture::new();
    let two_dof = fx.write("two_dof.xml", TWO_DOF);
    let slider = fx.write("slider.xml", SLIDER);
    let mut registry = Registry::new(LiteEngine);

    let first = registry.create(&two_dof).expect("create");
    registry.step(first, 25).expect("step");
    registry.free(first);

    let second = registry.create(&slider).expect("create");
    assert_eq!(second.index(), first.index(), "lowest free slot is reused");
    assert_ne!(second, first, "reuse bumps the generation");
    assert!(!registry.is_valid(first));

    assert_eq!(registry.dim(second, Dim::Nq), 1);
    assert_eq!(registry.time(second), 0.0);
    assert_eq!(registry.view(second, View::Qpos).expect("live"), &[0.0]);
    assert_eq!(registry.view(second, View::Qvel).expect("live"), &[0.0]);
}

#[test]
fn bare_index_handles_when_stale_check_is_off() {
    let fx = Fixture::new();
    let path = fx.write("slider.xml", SLIDER);
    let config = RegistryConfig::new().stale_handle_check(false);
    let mut registry = Registry::with_config(LiteEngine, config).expect("config");

    let first = registry.create(&path).expect("create");
    registry.free(first);
    let second = registry.create(&path).expect("create");
    assert_eq!(first.to_raw(), 1);
    assert_eq!(second.to_raw(), 1);
}

#[test]
fn exhaustion_leaves_existing_handles_intact() {
    let fx = Fixture::new();
    let path = fx.write("slider.xml", SLIDER);
    let mut registry = Registry::new(LiteEngine);
    assert_eq!(registry.capacity(), 64);

    let handles: Vec<_> = (0..63)
        .map(|_| registry.create(&path).expect("room left"))
        .collect();
    assert_eq!(registry.live_count(), 63);
    assert_eq!(registry.allocate(), None);

    let err = registry.create(&path).unwrap_err();
    assert_eq!(err, RegistryError::NoFreeHandle);
    assert_eq!(registry.global_error().code(), ErrorCode::NoFreeHandle);
    assert_eq!(registry.global_error().message(), "no free handle");

    for (i, h) in handles.iter().enumerate() {
        assert_eq!(h.index(), i + 1);
        assert!(registry.is_valid(*h));
        assert_eq!(registry.dim(*h, Dim::Nq), 1);
    }
    assert_eq!(registry.live_count(), 63);

    // Freeing one makes room again, in that slot
    registry.free(handles[40]);
    let h = registry.create(&path).expect("slot freed");
    assert_eq!(h.index(), 41);
}

#[test]
fn distinct_registries_are_independent() {
    let fx = Fixture::new();
    let path = fx.write("slider.xml", SLIDER);
    let mut a = Registry::new(LiteEngine);
    let mut b = Registry::new(LiteEngine);

    let ha = a.create(&path).expect("create");
    let hb = b.create(&path).expect("create");
    assert_eq!(ha, hb);

    a.free(ha);
    assert!(!a.is_valid(ha));
    assert!(b.is_valid(hb));
}

#[test]
fn handles_iterates_live_slots() {
    let fx = Fixture::new();
    let path = fx.write("slider.xml", SLIDER);
    let mut registry = Registry::new(LiteEngine);

    let hs: Vec<_> = (0..4).map(|_| registry.create(&path).expect("create")).collect();
    registry.free(hs[1]);
    let live: Vec<_> = registry.handles().collect();
    assert_eq!(live, vec![hs[0], hs[2], hs[3]]);
}
