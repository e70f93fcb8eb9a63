//! Export manifests and export-list checks.
//!
//! A manifest lists the symbols a flavor must export (as the WASM toolchain
//! names them, with a leading underscore), the compat symbols it may export,
//! and the runtime symbols the link step has to keep. [`check_exports`]
//! compares a module's actual export names against it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::engine::{Dim, View};
use crate::ffi::Flavor;

/// Core operations every flavor exports, without prefix.
pub const CORE_EXPORTS: [&str; 14] = [
    "errno_last_global",
    "errmsg_last_global",
    "make_from_xml",
    "free",
    "valid",
    "step",
    "forward",
    "reset",
    "errno_last",
    "errmsg_last",
    "timestep",
    "time",
    "name_at",
    "name2id",
];

/// Bulk writers, without prefix.
pub const WRITER_EXPORTS: [&str; 3] = ["set_qpos", "set_qvel", "set_ctrl"];

/// Exports of flavors with ABI introspection, without prefix.
pub const INTROSPECTION_EXPORTS: [&str; 3] = ["abi_version", "layout_hash", "version_string"];

/// Compat surface, without prefix.
pub const COMPAT_EXPORTS: [&str; 5] = ["init", "step_demo", "qpos0", "qvel0", "term"];

/// Runtime helpers the host's glue code calls directly.
pub const RUNTIME_KEEP: [&str; 6] = [
    "_malloc",
    "_free",
    "_realloc",
    "stackSave",
    "stackRestore",
    "stackAlloc",
];

/// Linker and runtime symbols that may appear in any module.
pub const ALLOWED_RUNTIME: [&str; 25] = [
    "__wasm_call_ctors",
    "__wasm_apply_data_relocations",
    "__wasm_init_memory_flag",
    "__heap_base",
    "__data_end",
    "__global_base",
    "__memory_base",
    "__table_base",
    "__stack_pointer",
    "__indirect_function_table",
    "__cxa_increment_exception_refcount",
    "__cxa_is_pointer_type",
    "memory",
    "table",
    "stackSave",
    "stackRestore",
    "stackAlloc",
    "setThrew",
    "emscripten_stack_get_current",
    "emscripten_stack_get_end",
    "emscripten_stack_get_base",
    "emscripten_stack_get_free",
    "emscripten_stack_init",
    "emscripten_stack_set_limits",
    "fflush",
];

/// Engine-internal families (visualisation, rendering, UI, plugins,
/// collision) that must never leak into a module's exports.
const FORBIDDEN_FAMILIES: [&str; 5] = ["v_", "r_", "ui_", "p_", "c_"];

/// Symbol list for one flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Flavor prefix, e.g. `mjwf`.
    pub flavor: String,
    /// Crate version the manifest was generated from.
    pub version: String,
    /// Number of required symbols.
    pub count: usize,
    /// Symbols that must be exported.
    pub required: Vec<String>,
    /// Symbols that may be exported.
    #[serde(default)]
    pub optional: Vec<String>,
    /// Runtime symbols to keep alive at link time.
    #[serde(default)]
    pub runtime_keep: Vec<String>,
}

impl ExportManifest {
    /// Manifest for `prefix`, with or without the introspection exports.
    pub fn new(prefix: &str, introspection: bool) -> Self {
        let symbol = |name: &str| format!("_{prefix}_{name}");

        let mut required: Vec<String> = CORE_EXPORTS.into_iter().map(symbol).collect();
        required.extend(Dim::ALL.into_iter().map(|d| symbol(d.export_name())));
        required.extend(
            View::ALL
                .into_iter()
                .map(|v| symbol(&format!("{}_ptr", v.export_name()))),
        );
        required.extend(WRITER_EXPORTS.into_iter().map(symbol));
        if introspection {
            required.extend(INTROSPECTION_EXPORTS.into_iter().map(symbol));
        }
        required.sort();

        Self {
            flavor: prefix.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            count: required.len(),
            required,
            optional: COMPAT_EXPORTS.into_iter().map(symbol).collect(),
            runtime_keep: RUNTIME_KEEP.iter().map(ToString::to_string).collect(),
        }
    }

    /// Manifest for a compiled-in flavor.
    pub fn for_flavor<F: Flavor>() -> Self {
        Self::new(F::PREFIX, F::HAS_INTROSPECTION)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error; never expected for this type.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Outcome of [`check_exports`]. All lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// Exports carrying the flavor prefix.
    pub actual_wrappers: usize,
    /// Required symbols that are not exported.
    pub missing_required: Vec<String>,
    /// Exports that are neither wrappers nor allowed runtime symbols.
    pub unexpected: Vec<String>,
    /// Exports from a forbidden engine family.
    pub forbidden_prefix: Vec<String>,
}

impl ExportReport {
    /// No missing, unexpected or forbidden exports.
    pub fn is_ok(&self) -> bool {
        self.missing_required.is_empty()
            && self.unexpected.is_empty()
            && self.forbidden_prefix.is_empty()
    }
}

fn normalize(name: &str) -> String {
    if name.starts_with('_') {
        name.to_string()
    } else {
        format!("_{name}")
    }
}

/// Whether `name` belongs to a forbidden engine family (`mjv_`, `mjr_`,
/// `mjui_`, `mjp_`, `mjc_`), with or without a leading underscore.
pub fn is_forbidden(name: &str) -> bool {
    let bare = name.strip_prefix('_').unwrap_or(name);
    bare.strip_prefix("mj")
        .is_some_and(|rest| FORBIDDEN_FAMILIES.iter().any(|f| rest.starts_with(f)))
}

/// Compare a module's export names against `manifest`.
///
/// Any export with the flavor prefix counts as a wrapper; the rest must be a
/// kept or allowed runtime symbol.
pub fn check_exports<S: AsRef<str>>(manifest: &ExportManifest, exports: &[S]) -> ExportReport {
    let wrapper_prefix = format!("_{}_", manifest.flavor);
    let keep: BTreeSet<String> = manifest.runtime_keep.iter().map(|n| normalize(n)).collect();
    let allowed: BTreeSet<&str> = ALLOWED_RUNTIME.into_iter().collect();

    let mut wrappers = BTreeSet::new();
    let mut unexpected = BTreeSet::new();
    let mut forbidden = BTreeSet::new();

    for raw in exports {
        let raw = raw.as_ref();
        let norm = normalize(raw);
        if norm.starts_with(&wrapper_prefix) {
            wrappers.insert(norm);
            continue;
        }
        if keep.contains(&norm) || keep.contains(raw) {
            continue;
        }
        if allowed.contains(norm.as_str()) || allowed.contains(raw) {
            continue;
        }
        if is_forbidden(raw) {
            forbidden.insert(raw.to_string());
        } else {
            unexpected.insert(raw.to_string());
        }
    }

    let missing_required = manifest
        .required
        .iter()
        .map(|n| normalize(n))
        .filter(|n| !wrappers.contains(n))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    ExportReport {
        actual_wrappers: wrappers.len(),
        missing_required,
        unexpected: unexpected.into_iter().collect(),
        forbidden_prefix: forbidden.into_iter().collect(),
    }
}
