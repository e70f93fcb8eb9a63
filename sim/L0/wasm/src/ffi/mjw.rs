//! Plain `mjw_*` exports.

export_flavor! {
    /// The `mjw` flavor.
    flavor Mjw {
        prefix: "mjw",
        introspection: false,
        engine: crate::engine::LiteEngine,
    }
    core {
        errno_last_global: mjw_errno_last_global,
        errmsg_last_global: mjw_errmsg_last_global,
        make_from_xml: mjw_make_from_xml,
        free: mjw_free,
        valid: mjw_valid,
        step: mjw_step,
        forward: mjw_forward,
        reset: mjw_reset,
        errno_last: mjw_errno_last,
        errmsg_last: mjw_errmsg_last,
        timestep: mjw_timestep,
        time: mjw_time,
        name_at: mjw_name_at,
        name2id: mjw_name2id,
    }
    dims {
        mjw_nq => Nq,
        mjw_nv => Nv,
        mjw_nu => Nu,
        mjw_nsensordata => NSensorData,
        mjw_nbody => NBody,
        mjw_njnt => NJnt,
        mjw_ngeom => NGeom,
        mjw_nsite => NSite,
        mjw_nsensor => NSensor,
    }
    views {
        mjw_qpos_ptr => Qpos,
        mjw_qvel_ptr => Qvel,
        mjw_qacc_ptr => Qacc,
        mjw_ctrl_ptr => Ctrl,
        mjw_sensordata_ptr => SensorData,
    }
    writers {
        mjw_set_qpos => Qpos,
        mjw_set_qvel => Qvel,
        mjw_set_ctrl => Ctrl,
    }
    compat {
        init: mjw_init,
        step_demo: mjw_step_demo,
        qpos0: mjw_qpos0,
        qvel0: mjw_qvel0,
        term: mjw_term,
    }
}
