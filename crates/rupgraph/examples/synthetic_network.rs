//! Enumerate ruptures on a small synthetic network and print a summary.
//!
//! Run: `cargo run -p rupgraph --example synthetic_network -- [seed] [faults]`

use rupgraph::api::*;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let faults: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(9);

    let sections = draw_network(
        &SynthCfg {
            num_faults: faults,
            ..SynthCfg::default()
        },
        SynthReplay { seed, index: 0 },
    )?;
    let cfg = RunCfg {
        filters: vec![
            FilterCfg::JumpAzimuthChange { max_change: 60.0 },
            FilterCfg::CumulativeAzimuthChange { max_cumulative: 560.0 },
            FilterCfg::SplayLength {
                max_len: 0.5,
                is_fract_of_main: true,
                total_across_splays: false,
                allow_full_cluster: false,
            },
        ],
        ..RunCfg::default()
    };
    let strategy = cfg.strategy(sections)?;
    let calc = SectionDistAzCalc::new();
    let graph = strategy.build_connections(&calc, cfg.connect_threads)?;
    println!(
        "{} sections, {} clusters, {} jumps",
        strategy.sections().len(),
        strategy.clusters().len(),
        graph.num_jumps()
    );

    let pipeline = cfg.pipeline()?;
    let out = RuptureBuilder::new(&strategy, &pipeline, &calc, cfg.build.clone())?.build()?;
    println!(
        "{} ruptures ({} candidates, {} duplicates)",
        out.ruptures.len(),
        out.candidates,
        out.duplicates
    );
    for counts in &out.tally.filters {
        println!(
            "  {:<40} pass {:>6}  fail {:>6}  stop {:>6}",
            counts.name, counts.passed, counts.failed, counts.hard_stopped
        );
    }
    if let Some(longest) = out.ruptures.iter().max_by_key(|r| r.total_section_count()) {
        println!("largest: {longest}");
    }
    Ok(())
}
