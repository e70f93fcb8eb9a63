//! The `mjw_*` and `mjwf_*` C exports.
//!
//! Each test thread sees its own per-flavor registries, so tests free what
//! they create but never assume specific handle values.

use std::ffi::{CStr, c_int};
use std::ptr;

use sim_wasm::ffi::mjw::*;
use sim_wasm::ffi::mjwf::*;

use crate::common::{Fixture, SLIDER, TWO_DOF, c_path};

fn create_mjw(fx: &Fixture, xml: &str) -> c_int {
    let path = c_path(&fx.write("model.xml", xml));
    let h = unsafe { mjw_make_from_xml(path.as_ptr()) };
    assert!(h > 0, "create failed: {}", global_message_mjw());
    h
}

fn global_message_mjw() -> String {
    let msg = unsafe { CStr::from_ptr(mjw_errmsg_last_global()) };
    msg.to_string_lossy().into_owned()
}

fn slice<'a>(ptr: *mut f64, len: c_int) -> &'a [f64] {
    assert!(!ptr.is_null());
    unsafe { std::slice::from_raw_parts(ptr, usize::try_from(len).expect("len")) }
}

#[test]
fn lifecycle_through_exports() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, TWO_DOF);

    assert_eq!(mjw_valid(h), 1);
    assert_eq!(mjw_nq(h), 2);
    assert_eq!(mjw_nv(h), 2);
    assert_eq!(mjw_nu(h), 1);
    assert_eq!(mjw_nsensordata(h), 2);
    assert_eq!(mjw_nbody(h), 3);
    assert_eq!(mjw_njnt(h), 2);
    assert_eq!(mjw_ngeom(h), 2);
    assert_eq!(mjw_nsite(h), 1);
    assert_eq!(mjw_nsensor(h), 2);
    assert_eq!(mjw_timestep(h), 0.01);
    assert_eq!(mjw_errno_last(h), 0);

    mjw_free(h);
    assert_eq!(mjw_valid(h), 0);
    mjw_free(h);
    assert_eq!(mjw_valid(h), 0);
}

#[test]
fn step_reset_and_views() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, TWO_DOF);

    assert_eq!(mjw_step(h, 10), 1);
    assert!((mjw_time(h) - 0.1).abs() < 1e-12);
    assert_eq!(mjw_forward(h), 1);

    assert_eq!(mjw_reset(h), 1);
    assert_eq!(mjw_time(h), 0.0);
    assert_eq!(slice(mjw_qpos_ptr(h), mjw_nq(h)), &[0.3, -0.2]);
    assert_eq!(slice(mjw_qvel_ptr(h), mjw_nv(h)), &[0.0, 0.0]);
    assert_eq!(slice(mjw_qacc_ptr(h), mjw_nv(h)).len(), 2);
    assert_eq!(slice(mjw_sensordata_ptr(h), mjw_nsensordata(h)).len(), 2);

    // Non-positive counts are rejected without stepping
    assert_eq!(mjw_step(h, 0), 0);
    assert_eq!(mjw_step(h, -5), 0);
    assert_eq!(mjw_time(h), 0.0);

    mjw_free(h);
}

#[test]
fn pointers_alias_engine_state() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, TWO_DOF);

    let ctrl = mjw_ctrl_ptr(h);
    unsafe { *ctrl = 0.75 };
    assert_eq!(slice(mjw_ctrl_ptr(h), 1), &[0.75]);
    assert_eq!(mjw_ctrl_ptr(h), ctrl, "views are stable between calls");

    mjw_free(h);
}

#[test]
fn setters_clamp_to_true_length() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, TWO_DOF);

    let values = [1.0, 2.0, 3.0, 4.0];
    unsafe { mjw_set_qpos(h, values.as_ptr(), 4) };
    assert_eq!(slice(mjw_qpos_ptr(h), 2), &[1.0, 2.0]);

    unsafe { mjw_set_qvel(h, values[2..].as_ptr(), 1) };
    assert_eq!(slice(mjw_qvel_ptr(h), 2), &[3.0, 0.0]);

    unsafe { mjw_set_ctrl(h, values.as_ptr(), 100) };
    assert_eq!(slice(mjw_ctrl_ptr(h), 1), &[1.0]);

    // Null source and negative counts are ignored
    unsafe {
        mjw_set_qpos(h, ptr::null(), 2);
        mjw_set_qpos(h, values[3..].as_ptr(), -1);
    }
    assert_eq!(slice(mjw_qpos_ptr(h), 2), &[1.0, 2.0]);

    mjw_free(h);
}

#[test]
fn invalid_handles_return_sentinels() {
    let fx = Fixture::new();
    let stale = create_mjw(&fx, SLIDER);
    mjw_free(stale);

    for h in [0, -1, 255, stale] {
        assert_eq!(mjw_valid(h), 0);
        assert_eq!(mjw_step(h, 1), 0);
        assert_eq!(mjw_forward(h), 0);
        assert_eq!(mjw_reset(h), 0);
        assert_eq!(mjw_errno_last(h), 0);
        assert!(unsafe { CStr::from_ptr(mjw_errmsg_last(h)) }.is_empty());
        assert_eq!(mjw_nq(h), 0);
        assert_eq!(mjw_nsensor(h), 0);
        assert_eq!(mjw_timestep(h), 0.0);
        assert_eq!(mjw_time(h), 0.0);
        assert!(mjw_qpos_ptr(h).is_null());
        assert!(mjw_ctrl_ptr(h).is_null());
        assert!(mjw_name_at(h, 1, 0).is_null());
        assert_eq!(unsafe { mjw_name2id(h, 1, c"world".as_ptr()) }, -1);
        unsafe { mjw_set_qpos(h, [1.0].as_ptr(), 1) };
        mjw_free(h);
    }
}

#[test]
fn stale_handle_does_not_alias_reused_slot() {
    let fx = Fixture::new();
    let old = create_mjw(&fx, SLIDER);
    mjw_free(old);
    let new = create_mjw(&fx, SLIDER);

    assert_ne!(old, new);
    assert_eq!(old & 0xff, new & 0xff, "same slot");
    assert_eq!(mjw_valid(old), 0);
    mjw_free(old);
    assert_eq!(mjw_valid(new), 1);

    mjw_free(new);
}

#[test]
fn load_failures_set_global_error() {
    let fx = Fixture::new();
    let missing = c_path(&fx.missing());

    let h = unsafe { mjw_make_from_xml(missing.as_ptr()) };
    assert_eq!(h, -1);
    assert_eq!(mjw_errno_last_global(), 1);
    assert!(global_message_mjw().contains("missing.xml"));

    let h = unsafe { mjw_make_from_xml(ptr::null()) };
    assert_eq!(h, -1);
    assert_eq!(mjw_errno_last_global(), 1);
    assert_eq!(global_message_mjw(), "model path is null");
}

#[test]
fn exhaustion_reports_no_free_handle() {
    let fx = Fixture::new();
    let path = c_path(&fx.write("slider.xml", SLIDER));

    let mut live = Vec::new();
    loop {
        let h = unsafe { mjw_make_from_xml(path.as_ptr()) };
        if h <= 0 {
            break;
        }
        live.push(h);
        assert!(live.len() <= 63, "table holds at most 63 instances");
    }
    assert!(!live.is_empty());
    assert_eq!(mjw_errno_last_global(), 3);
    assert_eq!(global_message_mjw(), "no free handle");
    assert!(live.iter().all(|&h| mjw_valid(h) == 1 && mjw_nq(h) == 1));

    for h in live {
        mjw_free(h);
    }
}

#[test]
fn engine_fault_sets_per_handle_error() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, TWO_DOF);

    unsafe { mjw_set_qvel(h, [f64::INFINITY].as_ptr(), 1) };
    assert_eq!(mjw_step(h, 2), 1);
    assert_eq!(mjw_errno_last(h), 4);
    let msg = unsafe { CStr::from_ptr(mjw_errmsg_last(h)) };
    assert!(msg.to_str().expect("utf-8").contains("diverged"));

    mjw_free(h);
}

#[test]
fn global_message_pointer_outlives_later_failures() {
    let fx = Fixture::new();
    let missing = c_path(&fx.missing());
    let malformed = c_path(&fx.write("broken.xml", "<mujoco><worldbody>"));

    assert_eq!(unsafe { mjw_make_from_xml(missing.as_ptr()) }, -1);
    let first = mjw_errmsg_last_global();
    let first_text = global_message_mjw();

    assert_eq!(unsafe { mjw_make_from_xml(malformed.as_ptr()) }, -1);
    let second = mjw_errmsg_last_global();
    assert_eq!(first, second);

    // The old pointer reads the newer message
    let text = unsafe { CStr::from_ptr(first) }.to_str().expect("utf-8");
    assert!(!text.is_empty());
    assert_ne!(text, first_text);
}

#[test]
fn handle_message_pointer_outlives_later_faults() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, TWO_DOF);

    let before = mjw_errmsg_last(h);
    assert!(unsafe { CStr::from_ptr(before) }.is_empty());

    unsafe { mjw_set_qvel(h, [f64::INFINITY].as_ptr(), 1) };
    assert_eq!(mjw_step(h, 1), 1);
    assert_eq!(mjw_errmsg_last(h), before);
    let text = unsafe { CStr::from_ptr(before) }.to_str().expect("utf-8");
    assert!(text.contains("diverged"));

    unsafe { mjw_set_qpos(h, [f64::NAN].as_ptr(), 1) };
    assert_eq!(mjw_step(h, 1), 1);
    assert_eq!(mjw_errmsg_last(h), before);
    assert_eq!(mjw_errno_last(h), 4);

    mjw_free(h);
}

#[test]
fn empty_arrays_have_pointers_while_live() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, SLIDER);

    assert_eq!(mjw_nu(h), 0);
    assert_eq!(mjw_nsensordata(h), 0);
    assert!(!mjw_ctrl_ptr(h).is_null());
    assert!(!mjw_sensordata_ptr(h).is_null());

    mjw_free(h);
    assert!(mjw_ctrl_ptr(h).is_null());
    assert!(mjw_sensordata_ptr(h).is_null());
}

#[test]
fn names_through_exports() {
    let fx = Fixture::new();
    let h = create_mjw(&fx, TWO_DOF);

    let name = mjw_name_at(h, 3, 1);
    assert!(!name.is_null());
    assert_eq!(unsafe { CStr::from_ptr(name) }.to_str(), Ok("elbow"));
    assert!(mjw_name_at(h, 3, 2).is_null());
    assert!(mjw_name_at(h, 3, -1).is_null());

    assert_eq!(unsafe { mjw_name2id(h, 19, c"shoulder_motor".as_ptr()) }, 0);
    assert_eq!(unsafe { mjw_name2id(h, 20, c"elbow_vel".as_ptr()) }, 1);
    assert_eq!(unsafe { mjw_name2id(h, 3, c"wrist".as_ptr()) }, -1);
    assert_eq!(unsafe { mjw_name2id(h, 3, ptr::null()) }, -1);

    mjw_free(h);
}

#[test]
fn flavors_have_separate_registries() {
    let fx = Fixture::new();
    let path = c_path(&fx.write("slider.xml", SLIDER));

    let a = unsafe { mjw_make_from_xml(path.as_ptr()) };
    let b = unsafe { mjwf_make_from_xml(path.as_ptr()) };
    assert!(a > 0 && b > 0);

    mjw_free(a);
    assert_eq!(mjw_valid(a), 0);
    assert_eq!(mjwf_valid(b), 1);
    assert_eq!(mjwf_nq(b), 1);

    // A failure in one flavor does not show up in the other
    let missing = c_path(&fx.missing());
    assert_eq!(unsafe { mjwf_make_from_xml(missing.as_ptr()) }, -1);
    assert_eq!(mjwf_errno_last_global(), 1);
    assert_eq!(mjw_valid(a), 0);

    mjwf_free(b);
}

#[test]
fn forge_introspection() {
    assert_eq!(mjwf_abi_version(), 1);
    assert_eq!(mjwf_layout_hash(), 0x3370_A1B3);
    let version = unsafe { CStr::from_ptr(mjwf_version_string()) }
        .to_str()
        .expect("utf-8");
    assert_eq!(version, sim_wasm::ffi::mjwf::version_string().to_str().expect("utf-8"));
    assert!(version.contains(sim_lite::VERSION));
    assert!(version.ends_with("| forge 3.3.7"));
}
