//! Section and config loading, JSON output.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rupgraph::api::{sections_from_records, FaultSection, RunCfg, SectionRecord};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load sections from `.csv` (one row per trace point) or JSON records.
pub fn load_sections(path: &Path) -> Result<Vec<FaultSection>> {
    let records = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv")) {
        read_sections_csv(path)?
    } else {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str::<Vec<SectionRecord>>(&text)
            .with_context(|| format!("parsing section records in {}", path.display()))?
    };
    let sections = sections_from_records(records).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!(sections = sections.len(), path = %path.display(), "sections loaded");
    Ok(sections)
}

/// Columns `id, parent_id, x, y` and optionally `parent_name`; consecutive rows
/// with the same id form one trace.
pub fn read_sections_csv(path: &Path) -> Result<Vec<SectionRecord>> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(1000))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;

    let ids = df.column("id")?.cast(&DataType::Int64)?;
    let parents = df.column("parent_id")?.cast(&DataType::Int64)?;
    let xs = df.column("x")?.cast(&DataType::Float64)?;
    let ys = df.column("y")?.cast(&DataType::Float64)?;
    let names = match df.column("parent_name") {
        Ok(c) => Some(c.cast(&DataType::String)?),
        Err(_) => None,
    };
    let (ids, parents, xs, ys) = (ids.i64()?, parents.i64()?, xs.f64()?, ys.f64()?);
    let names = names.as_ref().map(|s| s.str()).transpose()?;

    let mut records: Vec<SectionRecord> = Vec::new();
    for row in 0..df.height() {
        let id = ids.get(row).with_context(|| format!("row {row}: missing id"))?;
        let id = usize::try_from(id).with_context(|| format!("row {row}: negative id {id}"))?;
        let (Some(x), Some(y)) = (xs.get(row), ys.get(row)) else {
            bail!("row {row}: missing coordinate");
        };
        match records.last_mut() {
            Some(rec) if rec.id == id => rec.trace.push([x, y]),
            _ => {
                let parent_id = match parents.get(row) {
                    Some(p) => Some(u32::try_from(p).with_context(|| format!("row {row}: bad parent id {p}"))?),
                    None => None,
                };
                records.push(SectionRecord {
                    id,
                    parent_id,
                    parent_name: names.and_then(|n| n.get(row)).map(str::to_string),
                    trace: vec![[x, y]],
                });
            }
        }
    }
    Ok(records)
}

/// Run configuration from an optional JSON file, defaults otherwise.
pub fn load_cfg(path: Option<&Path>) -> Result<RunCfg> {
    let Some(path) = path else {
        return Ok(RunCfg::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: RunCfg =
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate().with_context(|| format!("validating config {}", path.display()))?;
    Ok(cfg)
}

/// Pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn csv_rows_group_into_traces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sections.csv");
        fs::write(
            &path,
            "id,parent_id,parent_name,x,y\n\
             0,7,North,0.0,0.0\n\
             0,7,North,0.0,2.5\n\
             0,7,North,0.0,5.0\n\
             1,7,North,0.0,5.0\n\
             1,7,North,0.0,10.0\n",
        )
        .unwrap();
        let records = read_sections_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].trace.len(), 3);
        assert_eq!(records[1].parent_id, Some(7));
        assert_eq!(records[1].parent_name.as_deref(), Some("North"));

        let sections = load_sections(&path).unwrap();
        assert!((sections[1].length - 5.0).abs() < 1e-9);
    }

    #[test]
    fn json_sections_missing_parent_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sections.json");
        fs::write(&path, r#"[{"id": 0, "trace": [[0.0, 0.0], [0.0, 5.0]]}]"#).unwrap();
        let err = load_sections(&path).unwrap_err();
        assert!(format!("{err:#}").contains("no parent"));
    }

    #[test]
    fn missing_cfg_file_means_defaults() {
        assert_eq!(load_cfg(None).unwrap(), RunCfg::default());
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"filters": [{"type": "splay_count"}]}"#).unwrap();
        assert!(load_cfg(Some(&path)).is_err());
    }
}
