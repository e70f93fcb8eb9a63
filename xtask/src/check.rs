//! Workspace gates: cargo checks, the unwrap scan, the wasm32 build and the
//! export manifests the link step reads.

use std::path::Path;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use xshell::{Shell, cmd};

use crate::FlavorArg;
use crate::exports;

/// Library crates whose non-test code must not unwrap.
const LIBRARY_SRC: [&str; 2] = ["sim/L0/lite/src", "sim/L0/wasm/src"];

/// Where `check` leaves the per-flavor manifests.
const MANIFEST_DIR: &str = "target/exports";

/// One `cargo` invocation. Optional gates only warn, since the wasm32
/// target may not be installed locally.
struct Gate {
    label: &'static str,
    args: &'static [&'static str],
    env: &'static [(&'static str, &'static str)],
    optional: bool,
}

const GATES: [Gate; 5] = [
    Gate {
        label: "fmt",
        args: &["fmt", "--all", "--", "--check"],
        env: &[],
        optional: false,
    },
    Gate {
        label: "clippy",
        args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        env: &[],
        optional: false,
    },
    Gate {
        label: "test",
        args: &["test", "--workspace"],
        env: &[],
        optional: false,
    },
    Gate {
        label: "doc",
        args: &["doc", "--workspace", "--no-deps"],
        env: &[("RUSTDOCFLAGS", "-D warnings")],
        optional: false,
    },
    Gate {
        label: "wasm32",
        args: &[
            "build",
            "-p",
            "sim-wasm",
            "--release",
            "--target",
            "wasm32-unknown-unknown",
        ],
        env: &[],
        optional: true,
    },
];

/// Run every gate. With `strict`, any failure fails the command.
pub fn run(strict: bool) -> Result<()> {
    let sh = Shell::new()?;
    let mut failed = Vec::new();

    for gate in &GATES {
        let args = gate.args;
        let outcome = cmd!(sh, "cargo {args...}")
            .envs(gate.env.iter().copied())
            .run()
            .map_err(anyhow::Error::from);
        match outcome {
            Err(e) if gate.optional => println!("  {} {}: {e}", "⚠".yellow(), gate.label),
            outcome => record(gate.label, outcome, &mut failed),
        }
    }

    record("unwrap scan", unwrap_scan(&sh), &mut failed);
    record("manifests", write_manifests(&sh), &mut failed);

    println!();
    if failed.is_empty() {
        println!("{}", "✓ all gates passed".green().bold());
        return Ok(());
    }
    println!("{} failed: {}", "✗".red().bold(), failed.join(", "));
    if strict {
        bail!("{} gate(s) failed", failed.len());
    }
    Ok(())
}

fn record(label: &'static str, outcome: Result<()>, failed: &mut Vec<&'static str>) {
    match outcome {
        Ok(()) => println!("  {} {label}", "✓".green()),
        Err(e) => {
            println!("  {} {label}: {e:#}", "✗".red());
            failed.push(label);
        }
    }
}

fn write_manifests(sh: &Shell) -> Result<()> {
    let dir = sh.current_dir().join(MANIFEST_DIR);
    for (flavor, name) in [(FlavorArg::Mjw, "mjw"), (FlavorArg::Mjwf, "mjwf")] {
        exports::write_manifest(flavor, Some(&dir.join(format!("{name}.json"))))?;
    }
    Ok(())
}

fn unwrap_scan(sh: &Shell) -> Result<()> {
    let root = sh.current_dir();
    let mut hits = Vec::new();
    for dir in LIBRARY_SRC {
        scan_dir(&root.join(dir), &mut hits)?;
    }
    for hit in hits.iter().take(20) {
        println!("    {}", hit.dimmed());
    }
    if !hits.is_empty() {
        bail!("{} unwrap/expect calls in library code", hits.len());
    }
    Ok(())
}

/// Collect `file:line` for every unwrap/expect above the first test module.
fn scan_dir(dir: &Path, hits: &mut Vec<String>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            scan_dir(&path, hits)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let text = std::fs::read_to_string(&path)?;
            hits.extend(scan_source(&text).map(|n| format!("{}:{n}", path.display())));
        }
    }
    Ok(())
}

/// 1-based line numbers of unwrap/expect calls in non-comment lines before
/// `#[cfg(test)]`.
fn scan_source(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .filter(|(_, line)| line.contains(".unwrap()") || line.contains(".expect("))
        .map(|(n, _)| n + 1)
}
