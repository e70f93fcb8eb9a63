//! Golden vectors: step a model through the registry and record state.
//!
//! The output is compared against a reference run by the host-side test
//! harness, so the sequence here has to stay fixed: record `qpos[0]` for
//! `steps` steps, reset, then record `qvel[0]` for `steps` more.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use sim_wasm::{Dim, Handle, LiteEngine, Registry, View};

#[derive(Debug, Serialize)]
struct Golden {
    nq: usize,
    nv: usize,
    qpos0: Vec<f64>,
    qvel0: Vec<f64>,
}

fn first(registry: &mut Registry<LiteEngine>, h: Handle, view: View) -> f64 {
    registry
        .view(h, view)
        .and_then(|buf| buf.first().copied())
        .unwrap_or(0.0)
}

fn record(model: &Path, steps: u32) -> Result<Golden> {
    if steps == 0 {
        bail!("steps must be at least 1");
    }
    let mut registry = Registry::new(LiteEngine);
    let h = registry
        .create(model)
        .with_context(|| format!("loading {}", model.display()))?;

    let mut golden = Golden {
        nq: registry.dim(h, Dim::Nq),
        nv: registry.dim(h, Dim::Nv),
        qpos0: Vec::with_capacity(steps as usize),
        qvel0: Vec::with_capacity(steps as usize),
    };

    for _ in 0..steps {
        registry.step(h, 1)?;
        golden.qpos0.push(first(&mut registry, h, View::Qpos));
    }
    registry.reset(h)?;
    for _ in 0..steps {
        registry.step(h, 1)?;
        golden.qvel0.push(first(&mut registry, h, View::Qvel));
    }

    if let Some(err) = registry.last_error(h).filter(|e| e.is_set()) {
        return Err(anyhow!("engine fault while stepping: {}", err.message()));
    }
    registry.free(h);
    Ok(golden)
}

/// Print the golden vectors for `model` as JSON.
pub fn run(model: &Path, steps: u32) -> Result<()> {
    let golden = record(model, steps)?;
    println!("{}", serde_json::to_string(&golden)?);
    Ok(())
}
