use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata recorded next to a written artifact.
pub struct Payload {
    pub params: Value,
    /// Files the artifact was derived from.
    pub inputs: Vec<String>,
    pub tag: Option<String>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            inputs: Vec::new(),
            tag: None,
        }
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.inputs.push(path.to_string_lossy().into_owned());
        self
    }

    pub fn tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Provenance document for `outputs`; `callsite` is omitted when `None`.
    fn document(self, outputs: &[&Path], callsite: Option<&Location<'_>>) -> Value {
        let mut doc = json!({
            "code_rev": current_git_rev(),
            "rupgraph_version": rupgraph::VERSION,
            "tag": self.tag,
            "inputs": self.inputs,
            "params": self.params,
            "outputs": outputs.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
        });
        if let Some(loc) = callsite {
            doc["callsite"] = json!({"file": loc.file(), "line": loc.line()});
        }
        doc
    }
}

/// The provenance block without outputs, as printed by `report`.
pub fn block(tag: Option<&str>) -> Value {
    Payload::new(json!({}))
        .tag(tag.map(str::to_string))
        .document(&[], None)
}

/// Write `<artifact-stem>.provenance.json` next to the artifact.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let callsite = Location::caller();
    let artifact = artifact.as_ref();
    let sidecar = provenance_path(artifact);
    if let Some(parent) = sidecar.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }
    let doc = payload.document(&[artifact], Some(callsite));
    fs::write(&sidecar, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", sidecar.display()))?;
    tracing::debug!(path = %sidecar.display(), "provenance written");
    Ok(sidecar)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit of the running build: `GIT_COMMIT` at compile or run time, else `git rev-parse`.
pub fn current_git_rev() -> String {
    if let Some(rev) = option_env!("GIT_COMMIT").filter(|s| !s.is_empty()) {
        return rev.to_string();
    }
    if let Ok(rev) = std::env::var("GIT_COMMIT") {
        if !rev.is_empty() {
            return rev;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_name_replaces_extension() {
        let derived = provenance_path(Path::new("/tmp/run/ruptures.json"));
        assert_eq!(derived, Path::new("/tmp/run/ruptures.provenance.json"));
    }

    #[test]
    fn sidecar_records_inputs_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("jumps.json");
        fs::write(&artifact, "[]").unwrap();
        let payload = Payload::new(json!({"max_dist": 5.0}))
            .input(Path::new("sections.csv"))
            .tag(Some("trial-3".into()));
        let path = write_sidecar(&artifact, payload).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["inputs"][0], "sections.csv");
        assert_eq!(parsed["tag"], "trial-3");
        assert_eq!(parsed["params"]["max_dist"], 5.0);
        assert!(parsed["callsite"]["file"].as_str().unwrap().ends_with("provenance.rs"));
    }

    #[test]
    fn report_block_has_no_outputs() {
        let b = block(Some("nightly"));
        assert!(b["outputs"].as_array().unwrap().is_empty());
        assert_eq!(b["tag"], "nightly");
        assert!(b.get("callsite").is_none());
        assert_eq!(b["rupgraph_version"], rupgraph::VERSION);
    }
}
