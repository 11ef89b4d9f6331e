//! Criterion benches for rupture growth (group "build").
//!
//! Connections are built once per network; only the growth search is timed.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rupgraph::api::*;

fn populated(faults: usize) -> (ClusterConnectionStrategy, SectionDistAzCalc) {
    let cfg = SynthCfg {
        num_faults: faults,
        ..SynthCfg::default()
    };
    let sections = draw_network(&cfg, SynthReplay { seed: 7, index: 0 }).unwrap();
    let strat = ClusterConnectionStrategy::new(sections, ConnectionRule::ClosestSectionPair, Some(5.0)).unwrap();
    let calc = SectionDistAzCalc::new();
    strat.build_connections(&calc, 0).unwrap();
    (strat, calc)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);
    let pipeline = FilterPipeline::from_cfgs(&[
        FilterCfg::JumpAzimuthChange { max_change: 60.0 },
        FilterCfg::CumulativeAzimuthChange { max_cumulative: 560.0 },
        FilterCfg::SplayLength {
            max_len: 0.5,
            is_fract_of_main: true,
            total_across_splays: true,
            allow_full_cluster: false,
        },
    ])
    .unwrap();
    for faults in [8usize, 16] {
        let (strat, calc) = populated(faults);
        for max_splays in [0usize, 1] {
            let cfg = BuildCfg {
                max_splays,
                ..BuildCfg::default()
            };
            let builder = RuptureBuilder::new(&strat, &pipeline, &calc, cfg).unwrap();
            group.bench_function(BenchmarkId::new(format!("splays{max_splays}"), faults), |b| {
                b.iter(|| builder.build().map(|o| o.ruptures.len()))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
