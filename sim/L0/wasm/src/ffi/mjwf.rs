//! Forge `mjwf_*` exports.
//!
//! Same operations as [`mjw`](super::mjw) on a separate registry, plus ABI
//! introspection so a host can refuse a module built against another layout.

export_flavor! {
    /// The `mjwf` flavor.
    flavor Mjwf {
        prefix: "mjwf",
        introspection: true,
        engine: crate::engine::LiteEngine,
    }
    core {
        errno_last_global: mjwf_errno_last_global,
        errmsg_last_global: mjwf_errmsg_last_global,
        make_from_xml: mjwf_make_from_xml,
        free: mjwf_free,
        valid: mjwf_valid,
        step: mjwf_step,
        forward: mjwf_forward,
        reset: mjwf_reset,
        errno_last: mjwf_errno_last,
        errmsg_last: mjwf_errmsg_last,
        timestep: mjwf_timestep,
        time: mjwf_time,
        name_at: mjwf_name_at,
        name2id: mjwf_name2id,
    }
    dims {
        mjwf_nq => Nq,
        mjwf_nv => Nv,
        mjwf_nu => Nu,
        mjwf_nsensordata => NSensorData,
        mjwf_nbody => NBody,
        mjwf_njnt => NJnt,
        mjwf_ngeom => NGeom,
        mjwf_nsite => NSite,
        mjwf_nsensor => NSensor,
    }
    views {
        mjwf_qpos_ptr => Qpos,
        mjwf_qvel_ptr => Qvel,
        mjwf_qacc_ptr => Qacc,
        mjwf_ctrl_ptr => Ctrl,
        mjwf_sensordata_ptr => SensorData,
    }
    writers {
        mjwf_set_qpos => Qpos,
        mjwf_set_qvel => Qvel,
        mjwf_set_ctrl => Ctrl,
    }
    compat {
        init: mjwf_init,
        step_demo: mjwf_step_demo,
        qpos0: mjwf_qpos0,
        qvel0: mjwf_qvel0,
        term: mjwf_term,
    }
}

use std::ffi::CStr;
use std::sync::OnceLock;

use crate::engine::{Engine, LiteEngine};

/// ABI revision of the `mjwf_*` surface.
pub const ABI_VERSION: c_int = 1;

/// Hash of the exported struct-free layout, checked by hosts at load time.
pub const LAYOUT_HASH: u32 = 0x3370_A1B3;

/// Forge release this surface tracks.
pub const FORGE_VERSION: &str = "3.3.7";

/// `"<engine version> | forge <forge version>"`.
pub fn version_string() -> &'static CStr {
    static VERSION: OnceLock<std::ffi::CString> = OnceLock::new();
    VERSION.get_or_init(|| {
        let text = format!("{} | forge {FORGE_VERSION}", LiteEngine.version());
        std::ffi::CString::new(text).unwrap_or_default()
    })
}

/// ABI revision.
#[unsafe(no_mangle)]
pub extern "C" fn mjwf_abi_version() -> c_int {
    ABI_VERSION
}

/// Layout hash.
#[unsafe(no_mangle)]
pub extern "C" fn mjwf_layout_hash() -> u32 {
    LAYOUT_HASH
}

/// Engine and forge version. Static; never null.
#[unsafe(no_mangle)]
pub extern "C" fn mjwf_version_string() -> *const c_char {
    version_string().as_ptr()
}
