use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rupgraph::api::{
    draw_network, ClusterConnectionStrategy, ConnectionRule, FilterContext, RunCfg, RuptureBuilder,
    RuptureConnectionSearch, SectionDistAzCalc, SectionId, SectionRecord, SynthCfg, SynthReplay,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod input;
mod provenance;

use provenance::Payload;

#[derive(Parser)]
#[command(name = "rupgraph")]
#[command(about = "Multi-fault rupture enumeration over fault subsection networks")]
struct Cmd {
    /// Free-form run tag; recorded in provenance sidecars
    #[arg(long, global = true)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RuleArg {
    Closest,
    All,
}

impl From<RuleArg> for ConnectionRule {
    fn from(r: RuleArg) -> Self {
        match r {
            RuleArg::Closest => ConnectionRule::ClosestSectionPair,
            RuleArg::All => ConnectionRule::AllWithinDistance,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Write a reproducible synthetic section list (JSON records)
    Synth {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[arg(long, default_value_t = 6)]
        faults: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Build the jump graph and write cluster/jump records
    Connect {
        #[arg(long)]
        sections: PathBuf,
        /// Maximum jump distance (km); omit for unconstrained closest pairs
        #[arg(long)]
        max_dist: Option<f64>,
        #[arg(long, value_enum, default_value_t = RuleArg::Closest)]
        rule: RuleArg,
        /// Worker count; 0 uses all cores
        #[arg(long, default_value_t = 0)]
        threads: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Build connections and enumerate ruptures
    Build {
        #[arg(long)]
        sections: PathBuf,
        /// RunCfg JSON; defaults apply to missing fields
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        max_dist: Option<f64>,
        #[arg(long)]
        threads: Option<usize>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Reconstruct a rupture from an ordered section list and check it
    Trace {
        #[arg(long)]
        sections: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Comma-separated section ids in rupture order
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<usize>,
    },
    /// Print a provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cmd = Cmd::parse();
    let tag = cmd.tag;
    match cmd.action {
        Action::Synth {
            seed,
            index,
            faults,
            out,
        } => synth(seed, index, faults, &out, tag),
        Action::Connect {
            sections,
            max_dist,
            rule,
            threads,
            out,
        } => connect(&sections, max_dist, rule.into(), threads, &out, tag),
        Action::Build {
            sections,
            config,
            max_dist,
            threads,
            out,
        } => {
            let mut cfg = input::load_cfg(config.as_deref())?;
            if max_dist.is_some() {
                cfg.max_jump_dist = max_dist;
            }
            if let Some(t) = threads {
                cfg.connect_threads = t;
                cfg.build.threads = t;
            }
            build(&sections, &cfg, &out, tag)
        }
        Action::Trace {
            sections,
            config,
            ids,
        } => {
            let cfg = input::load_cfg(config.as_deref())?;
            let report = trace(&sections, &cfg, &ids)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Action::Report => {
            println!("{}", serde_json::to_string_pretty(&provenance::block(tag.as_deref()))?);
            Ok(())
        }
    }
}

fn synth(seed: u64, index: u64, faults: usize, out: &Path, tag: Option<String>) -> Result<()> {
    let cfg = SynthCfg {
        num_faults: faults,
        ..SynthCfg::default()
    };
    let sections = draw_network(&cfg, SynthReplay { seed, index })?;
    let records: Vec<SectionRecord> = sections.iter().map(SectionRecord::from).collect();
    input::write_json(out, &records)?;
    tracing::info!(sections = records.len(), seed, index, out = %out.display(), "synthetic network written");
    provenance::write_sidecar(
        out,
        Payload::new(json!({"seed": seed, "index": index, "faults": faults})).tag(tag),
    )?;
    Ok(())
}

fn connect(
    sections_path: &Path,
    max_dist: Option<f64>,
    rule: ConnectionRule,
    threads: usize,
    out: &Path,
    tag: Option<String>,
) -> Result<()> {
    let sections = input::load_sections(sections_path)?;
    let strategy = ClusterConnectionStrategy::new(sections, rule, max_dist)?;
    let calc = SectionDistAzCalc::new();
    let graph = strategy.build_connections(&calc, threads)?;
    tracing::info!(jumps = graph.num_jumps(), cached = calc.cache_len(), "connections built");
    let records = strategy.to_records()?;
    input::write_json(out, &records)?;
    provenance::write_sidecar(
        out,
        Payload::new(json!({"max_dist": max_dist, "rule": rule, "threads": threads}))
            .input(sections_path)
            .tag(tag),
    )?;
    Ok(())
}

fn build(sections_path: &Path, cfg: &RunCfg, out: &Path, tag: Option<String>) -> Result<()> {
    let sections = input::load_sections(sections_path)?;
    let strategy = cfg.strategy(sections)?;
    let calc = SectionDistAzCalc::new();
    strategy.build_connections(&calc, cfg.connect_threads)?;
    let pipeline = cfg.pipeline()?;
    let builder = RuptureBuilder::new(&strategy, &pipeline, &calc, cfg.build.clone())?;
    let output = builder.build().context("building ruptures")?;
    input::write_json(out, &output)?;
    provenance::write_sidecar(
        out,
        Payload::new(serde_json::to_value(cfg)?)
            .input(sections_path)
            .tag(tag),
    )?;
    Ok(())
}

/// Structured rupture, its check result and per-filter scalar values.
fn trace(sections_path: &Path, cfg: &RunCfg, ids: &[usize]) -> Result<serde_json::Value> {
    let sections = input::load_sections(sections_path)?;
    let strategy = cfg.strategy(sections)?;
    let calc = SectionDistAzCalc::new();
    strategy.build_connections(&calc, cfg.connect_threads)?;
    let pipeline = cfg.pipeline()?;
    let search = RuptureConnectionSearch::new(&strategy)?;
    let ids: Vec<SectionId> = ids.iter().copied().map(SectionId).collect();
    let rupture = search.build_rupture(&ids).context("reconstructing rupture")?;
    let result = search.check(&rupture, &pipeline, &calc, cfg.build.verbose);

    let ctx = FilterContext::from_strategy(&strategy, &calc);
    let scalars: Vec<_> = pipeline
        .filters()
        .iter()
        .filter_map(|f| {
            f.as_scalar().map(|s| {
                json!({
                    "filter": f.name(),
                    "value": s.value(&rupture, &ctx),
                    "threshold": s.threshold(),
                    "units": s.units(),
                })
            })
        })
        .collect();
    Ok(json!({
        "rupture": rupture,
        "display": rupture.to_string(),
        "result": result,
        "length_km": rupture.length(strategy.sections()),
        "sections": rupture.total_section_count(),
        "jumps": rupture.total_jump_count(),
        "scalars": scalars,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rupgraph::api::{BuildCfg, FilterCfg};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn cli_parses_ids_and_overrides() {
        let cmd = Cmd::try_parse_from([
            "rupgraph", "trace", "--sections", "s.json", "--ids", "0,1,2,3", "--tag", "t1",
        ])
        .unwrap();
        assert_eq!(cmd.tag.as_deref(), Some("t1"));
        match cmd.action {
            Action::Trace { ids, .. } => assert_eq!(ids, vec![0, 1, 2, 3]),
            _ => panic!("expected trace"),
        }
        assert!(Cmd::try_parse_from(["rupgraph", "connect", "--sections", "s.json"]).is_err());
    }

    #[test]
    fn synth_connect_build_trace_pipeline() {
        let dir = tempdir().unwrap();
        let sections = dir.path().join("net/sections.json");
        synth(5, 0, 5, &sections, None).unwrap();
        assert!(dir.path().join("net/sections.provenance.json").exists());

        let jumps = dir.path().join("jumps.json");
        connect(&sections, Some(6.0), ConnectionRule::ClosestSectionPair, 2, &jumps, Some("x".into())).unwrap();
        let records: serde_json::Value = serde_json::from_slice(&fs::read(&jumps).unwrap()).unwrap();
        assert_eq!(records.as_array().unwrap().len(), 5);

        let cfg = RunCfg {
            max_jump_dist: Some(6.0),
            build: BuildCfg {
                threads: 2,
                ..BuildCfg::default()
            },
            filters: vec![FilterCfg::JumpAzimuthChange { max_change: 60.0 }],
            ..RunCfg::default()
        };
        let out = dir.path().join("ruptures.json");
        build(&sections, &cfg, &out, None).unwrap();
        let built: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        let ruptures = built["ruptures"].as_array().unwrap();
        assert!(ruptures.len() >= 5);
        let prov: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("ruptures.provenance.json")).unwrap()).unwrap();
        assert_eq!(prov["params"]["max_jump_dist"], 6.0);

        // the first rupture of the first seed is its whole first cluster
        let first: Vec<usize> = ruptures[0]["clusters"][0]["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_u64().unwrap() as usize)
            .collect();
        let report = trace(&sections, &cfg, &first).unwrap();
        assert_eq!(report["result"], "pass");
        assert_eq!(report["jumps"], 0);
        assert_eq!(report["scalars"][0]["value"], serde_json::Value::Null);
    }

    #[test]
    fn trace_reports_disconnected_sections() {
        let dir = tempdir().unwrap();
        let sections = dir.path().join("sections.json");
        // two faults 100 km apart never connect under a 5 km threshold
        fs::write(
            &sections,
            r#"[
                {"id": 0, "parent_id": 1, "trace": [[0.0, 0.0], [0.0, 5.0]]},
                {"id": 1, "parent_id": 2, "trace": [[100.0, 0.0], [100.0, 5.0]]}
            ]"#,
        )
        .unwrap();
        let err = trace(&sections, &RunCfg::default(), &[0, 1]).unwrap_err();
        assert!(format!("{err:#}").contains("not connected"));
    }
}
