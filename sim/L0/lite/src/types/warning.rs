//! Warning tracking for simulation diagnostics.
//!
//! Mirrors MuJoCo's `mjtWarning` subset that applies to the lite engine.
//! Warnings accumulate in `Data::warnings` and are logged on first occurrence.

use std::fmt;

use super::data::Data;

/// Warning types. `repr(u8)` for compact storage; cast to `usize` for indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Warning {
    /// Bad qpos (NaN/Inf/diverged).
    BadQpos = 0,
    /// Bad qvel (NaN/Inf/diverged).
    BadQvel = 1,
    /// Bad qacc (NaN/Inf/diverged).
    BadQacc = 2,
    /// Bad ctrl (NaN/Inf).
    BadCtrl = 3,
}

/// Number of warning types.
pub const NUM_WARNINGS: usize = 4;

/// Values above this magnitude count as diverged (MuJoCo's `mjMAXVAL`).
pub const MAX_VAL: f64 = 1e10;

/// Per-warning statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarningStat {
    /// Index that triggered the warning.
    pub last_info: usize,
    /// Cumulative count since last reset.
    pub count: u32,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadQpos => "bad qpos",
            Self::BadQvel => "bad qvel",
            Self::BadQacc => "bad qacc",
            Self::BadCtrl => "bad ctrl",
        };
        f.write_str(s)
    }
}

/// Record a warning and log it on first occurrence.
pub fn record_warning(data: &mut Data, warning: Warning, info: usize) {
    let w = &mut data.warnings[warning as usize];
    if w.count == 0 {
        tracing::warn!("Warning: {warning} at index {info}. Time = {:.4}.", data.time);
    }
    w.last_info = info;
    w.count += 1;
}

/// First index whose value is non-finite or larger than [`MAX_VAL`].
pub(crate) fn first_bad(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .position(|v| !v.is_finite() || v.abs() > MAX_VAL)
}
