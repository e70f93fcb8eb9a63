//! Export manifests and export-list checks for the WASM build.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use sim_wasm::{ExportManifest, Mjw, Mjwf, check_exports};

use crate::FlavorArg;

fn manifest(flavor: FlavorArg) -> ExportManifest {
    match flavor {
        FlavorArg::Mjw => ExportManifest::for_flavor::<Mjw>(),
        FlavorArg::Mjwf => ExportManifest::for_flavor::<Mjwf>(),
    }
}

/// Write the manifest JSON to `out`, or print it.
pub fn write_manifest(flavor: FlavorArg, out: Option<&Path>) -> Result<()> {
    let manifest = manifest(flavor);
    let json = manifest.to_json()?;

    match out {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            std::fs::write(path, json + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "{} wrote {} ({} required, {} optional)",
                "✓".green(),
                path.display(),
                manifest.count,
                manifest.optional.len()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Check the export names listed in `list` against the flavor's manifest.
pub fn check(flavor: FlavorArg, list: &Path, report_path: Option<&Path>) -> Result<()> {
    let manifest = manifest(flavor);
    let text = std::fs::read_to_string(list)
        .with_context(|| format!("reading {}", list.display()))?;
    let exports: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();

    let report = check_exports(&manifest, &exports);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("writing {}", path.display()))?;
    }

    println!(
        "{} exports, {} {} wrappers",
        exports.len(),
        report.actual_wrappers,
        manifest.flavor
    );
    print_list("missing", &report.missing_required);
    print_list("unexpected", &report.unexpected);
    print_list("forbidden prefix", &report.forbidden_prefix);

    if report.is_ok() {
        println!("{}", "✓ Exports match the manifest".green().bold());
        Ok(())
    } else {
        anyhow::bail!("export check failed for {}", manifest.flavor)
    }
}

fn print_list(label: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    println!("  {} {label}: {}", "✗".red(), names.len());
    for name in names.iter().take(20) {
        println!("    - {name}");
    }
    if names.len() > 20 {
        println!("    ...");
    }
}
