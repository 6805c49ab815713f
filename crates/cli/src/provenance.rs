//! `<stem>.provenance.json` sidecars next to every table or report the runner
//! writes.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

/// What produced an artifact: code revision, library version, where in the
/// runner it was written, with which parameters and from which inputs.
#[derive(Serialize)]
pub struct Provenance {
    code_rev: String,
    gamut_version: &'static str,
    callsite: Option<Callsite>,
    params: Value,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Provenance {
    pub fn new(params: Value) -> Self {
        Self {
            code_rev: current_git_rev(),
            gamut_version: gamut::VERSION,
            callsite: None,
            params,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn inputs<P: AsRef<Path>>(mut self, paths: &[P]) -> Self {
        self.inputs = paths.iter().map(|p| display(p.as_ref())).collect();
        self
    }

    /// Record `artifact` as the output and write the sidecar beside it.
    #[track_caller]
    pub fn write_next_to(mut self, artifact: &Path) -> Result<PathBuf> {
        let caller = Location::caller();
        self.callsite = Some(Callsite {
            file: caller.file(),
            line: caller.line(),
        });
        self.outputs = vec![display(artifact)];

        let target = sidecar_path(artifact);
        if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        std::fs::write(&target, serde_json::to_vec_pretty(&self)?)
            .with_context(|| format!("writing {}", target.display()))?;
        tracing::debug!(path = %target.display(), "provenance sidecar written");
        Ok(target)
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.file_stem().unwrap_or("artifact".as_ref()).to_os_string();
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` baked in at build time or set at run time, else
/// `git rev-parse HEAD`, else `unknown`.
pub fn current_git_rev() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty())
        .or_else(|| {
            let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            out.status
                .success()
                .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
