//! State buffers: views, clamped writers, stepping and reset.

use approx::assert_relative_eq;
use sim_wasm::{ErrorCode, LiteEngine, Registry, RegistryError, View};

use crate::common::{Fixture, SLIDER, TWO_DOF};

fn two_dof() -> (Fixture, Registry<LiteEngine>, sim_wasm::Handle) {
    let fx = Fixture::new();
    let path = fx.write("two_dof.xml", TWO_DOF);
    let mut registry = Registry::new(LiteEngine);
    let h = registry.create(&path).expect("create");
    (fx, registry, h)
}

#[test]
fn initial_state_matches_model() {
    let (_fx, mut registry, h) = two_dof();
    assert_eq!(registry.view(h, View::Qpos).expect("live"), &[0.3, -0.2]);
    assert_eq!(registry.view(h, View::Qvel).expect("live"), &[0.0, 0.0]);
    assert_eq!(registry.view(h, View::Ctrl).expect("live"), &[0.0]);
    assert_eq!(registry.view(h, View::SensorData).expect("live").len(), 2);
}

#[test]
fn step_then_reset_restores_initial_values_exactly() {
    let (_fx, mut registry, h) = two_dof();
    registry.set_ctrl(h, &[0.8]);

    registry.step(h, 10).expect("step");
    assert_relative_eq!(registry.time(h), 0.1, epsilon = 1e-12);
    assert_ne!(registry.view(h, View::Qpos).expect("live"), &[0.3, -0.2]);
    assert_ne!(registry.view(h, View::Qvel).expect("live"), &[0.0, 0.0]);

    registry.reset(h).expect("reset");
    assert_eq!(registry.time(h), 0.0);
    assert_eq!(registry.view(h, View::Qpos).expect("live"), &[0.3, -0.2]);
    assert_eq!(registry.view(h, View::Qvel).expect("live"), &[0.0, 0.0]);
    assert_eq!(registry.view(h, View::Ctrl).expect("live"), &[0.0]);
}

#[test]
fn step_advances_time_by_n_timesteps() {
    let (_fx, mut registry, h) = two_dof();
    let dt = registry.timestep(h);

    let mut last = registry.time(h);
    for n in [1, 3, 7, 20] {
        registry.step(h, n).expect("step");
        let now = registry.time(h);
        assert!(now > last);
        assert_relative_eq!(now - last, f64::from(n) * dt, epsilon = 1e-12);
        last = now;
    }
}

#[test]
fn non_positive_step_counts_do_nothing() {
    let (_fx, mut registry, h) = two_dof();
    let before = registry.view(h, View::Qpos).expect("live").to_vec();

    for n in [0, -1, i32::MIN] {
        assert_eq!(registry.step(h, n), Err(RegistryError::InvalidStepCount(n)));
    }
    assert_eq!(registry.time(h), 0.0);
    assert_eq!(registry.view(h, View::Qpos).expect("live"), before.as_slice());
}

#[test]
fn writers_clamp_to_array_length() {
    let (_fx, mut registry, h) = two_dof();

    assert_eq!(registry.set_qpos(h, &[1.0, 2.0, 3.0, 4.0, 5.0]), 2);
    assert_eq!(registry.view(h, View::Qpos).expect("live"), &[1.0, 2.0]);

    // Short writes leave the tail untouched
    assert_eq!(registry.set_qpos(h, &[9.0]), 1);
    assert_eq!(registry.view(h, View::Qpos).expect("live"), &[9.0, 2.0]);

    assert_eq!(registry.set_qvel(h, &[0.5, 0.25, 0.125]), 2);
    assert_eq!(registry.view(h, View::Qvel).expect("live"), &[0.5, 0.25]);

    assert_eq!(registry.set_ctrl(h, &[0.1, 0.2]), 1);
    assert_eq!(registry.view(h, View::Ctrl).expect("live"), &[0.1]);
}

#[test]
fn views_write_through() {
    let (_fx, mut registry, h) = two_dof();
    registry.view(h, View::Qvel).expect("live")[1] = 3.0;
    registry.forward(h).expect("forward");

    // elbow_vel sensor reads the value written through the view
    assert_eq!(registry.view(h, View::SensorData).expect("live")[1], 3.0);
    assert_eq!(registry.time(h), 0.0, "forward does not advance time");
}

#[test]
fn instances_from_same_file_are_independent() {
    let fx = Fixture::new();
    let path = fx.write("two_dof.xml", TWO_DOF);
    let mut registry = Registry::new(LiteEngine);
    let a = registry.create(&path).expect("create");
    let b = registry.create(&path).expect("create");
    assert_ne!(a, b);

    registry.view(a, View::Qpos).expect("live")[0] = 42.0;
    registry.set_ctrl(a, &[1.0]);
    registry.step(a, 5).expect("step");

    assert_eq!(registry.view(b, View::Qpos).expect("live"), &[0.3, -0.2]);
    assert_eq!(registry.view(b, View::Ctrl).expect("live"), &[0.0]);
    assert_eq!(registry.time(b), 0.0);
}

#[test]
fn slider_falls_under_gravity() {
    let fx = Fixture::new();
    let path = fx.write("slider.xml", SLIDER);
    let mut registry = Registry::new(LiteEngine);
    let h = registry.create(&path).expect("create");

    registry.step(h, 500).expect("step");
    let t = registry.time(h);
    assert_relative_eq!(t, 1.0, epsilon = 1e-9);
    let z = registry.view(h, View::Qpos).expect("live")[0];
    assert_relative_eq!(z, -0.5 * 9.81 * t * t, max_relative = 0.01);
    assert_relative_eq!(
        registry.view(h, View::Qacc).expect("live")[0],
        -9.81,
        epsilon = 1e-9
    );
}

#[test]
fn divergence_is_recorded_on_the_handle() {
    let (_fx, mut registry, h) = two_dof();
    let other = {
        let fx = Fixture::new();
        registry
            .create(&fx.write("slider.xml", SLIDER))
            .expect("create")
    };

    registry.set_qpos(h, &[f64::NAN]);
    registry.step(h, 1).expect("faults do not fail the call");

    let err = registry.last_error(h).expect("live");
    assert_eq!(err.code(), ErrorCode::EngineFault);
    assert!(err.message().contains("diverged"), "{}", err.message());

    // The engine reset the state and kept going
    assert!(registry.view(h, View::Qpos).expect("live").iter().all(|q| q.is_finite()));
    assert_eq!(registry.last_error(other).expect("live").code(), ErrorCode::None);
    assert_eq!(registry.global_error().code(), ErrorCode::None);

    // The record stays until the handle is freed
    registry.step(h, 1).expect("step");
    assert_eq!(registry.last_error(h).expect("live").code(), ErrorCode::EngineFault);
}
