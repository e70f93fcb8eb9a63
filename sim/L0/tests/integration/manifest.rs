//! Export manifests against the compiled-in flavors.

use sim_wasm::manifest::{COMPAT_EXPORTS, CORE_EXPORTS};
use sim_wasm::{Dim, ExportManifest, Mjw, Mjwf, View, check_exports};

#[test]
fn manifest_covers_every_operation() {
    let manifest = ExportManifest::for_flavor::<Mjw>();

    for name in CORE_EXPORTS {
        assert!(manifest.required.contains(&format!("_mjw_{name}")), "{name}");
    }
    for dim in Dim::ALL {
        assert!(manifest.required.contains(&format!("_mjw_{}", dim.export_name())));
    }
    for view in View::ALL {
        assert!(
            manifest
                .required
                .contains(&format!("_mjw_{}_ptr", view.export_name()))
        );
    }
    for name in COMPAT_EXPORTS {
        assert!(manifest.optional.contains(&format!("_mjw_{name}")));
        assert!(!manifest.required.contains(&format!("_mjw_{name}")));
    }
}

#[test]
fn forge_manifest_json_shape() {
    let manifest = ExportManifest::for_flavor::<Mjwf>();
    let json = manifest.to_json().expect("serialize");

    let parsed = ExportManifest::from_json(&json).expect("parse");
    assert_eq!(parsed.flavor, "mjwf");
    assert_eq!(parsed.count, parsed.required.len());
    assert!(parsed.required.iter().any(|n| n == "_mjwf_version_string"));
    assert_eq!(
        parsed.runtime_keep,
        ["_malloc", "_free", "_realloc", "stackSave", "stackRestore", "stackAlloc"]
    );
}

#[test]
fn manifest_without_optional_fields_parses() {
    let manifest = ExportManifest::from_json(
        r#"{ "flavor": "mjwf", "version": "0.0.0", "count": 1, "required": ["_mjwf_step"] }"#,
    )
    .expect("parse");
    assert!(manifest.optional.is_empty());
    assert!(manifest.runtime_keep.is_empty());
}

#[test]
fn check_exports_against_a_module_listing() {
    let manifest = ExportManifest::for_flavor::<Mjwf>();
    let mut exports: Vec<String> = manifest
        .required
        .iter()
        .map(|n| n.trim_start_matches('_').to_string())
        .collect();
    exports.extend(
        ["memory", "__indirect_function_table", "malloc", "free", "stackAlloc", "mjwf_init"]
            .map(String::from),
    );
    let report = check_exports(&manifest, &exports);
    assert!(report.is_ok(), "{report:?}");

    exports.retain(|n| n != "mjwf_name2id");
    exports.push("mjr_render".into());
    exports.push("printf".into());
    let report = check_exports(&manifest, &exports);
    assert!(!report.is_ok());
    assert_eq!(report.missing_required, ["_mjwf_name2id"]);
    assert_eq!(report.forbidden_prefix, ["mjr_render"]);
    assert_eq!(report.unexpected, ["printf"]);
}
