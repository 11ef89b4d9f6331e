//! Property tests over random synthetic networks: jump symmetry, section
//! uniqueness, flat-list reconstruction, worker-count invariance and
//! idempotent connection building.

use proptest::prelude::*;
use rupgraph::api::*;
use std::collections::HashSet;

fn network(seed: u64, faults: usize) -> Vec<FaultSection> {
    let cfg = SynthCfg {
        num_faults: faults,
        ..SynthCfg::default()
    };
    draw_network(&cfg, SynthReplay { seed, index: 0 }).unwrap()
}

fn rule_strategy() -> impl Strategy<Value = ConnectionRule> {
    prop_oneof![
        Just(ConnectionRule::ClosestSectionPair),
        Just(ConnectionRule::AllWithinDistance),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn jumps_are_symmetric(seed in any::<u64>(), faults in 2usize..10, max in 1.0f64..10.0, rule in rule_strategy()) {
        let strat = ClusterConnectionStrategy::new(network(seed, faults), rule, Some(max)).unwrap();
        let graph = strat.build_connections(&SectionDistAzCalc::new(), 2).unwrap();
        graph.check_symmetry().unwrap();
        for j in graph.all_possible_jumps() {
            prop_assert!(j.distance <= max);
            prop_assert_ne!(j.from_cluster, j.to_cluster);
            let back = graph.jumps_from(j.to_section).iter().find(|r| r.to_section == j.from_section);
            prop_assert_eq!(back.map(|r| r.distance), Some(j.distance));
        }
    }

    #[test]
    fn worker_count_does_not_change_the_graph(seed in any::<u64>(), faults in 2usize..10, threads in 2usize..6) {
        let sections = network(seed, faults);
        let calc = SectionDistAzCalc::new();
        let one = ClusterConnectionStrategy::new(sections.clone(), ConnectionRule::AllWithinDistance, Some(6.0)).unwrap();
        let many = ClusterConnectionStrategy::new(sections, ConnectionRule::AllWithinDistance, Some(6.0)).unwrap();
        let a: Vec<Jump> = one.build_connections(&calc, 1).unwrap().all_possible_jumps().copied().collect();
        let b: Vec<Jump> = many.build_connections(&calc, threads).unwrap().all_possible_jumps().copied().collect();
        prop_assert_eq!(a, b);
        let parents: Vec<ParentId> = one.clusters().iter().map(|c| c.parent_id).collect();
        for &p in &parents {
            for &q in &parents {
                prop_assert_eq!(one.are_parents_connected(p, q).unwrap(), many.are_parents_connected(p, q).unwrap());
            }
        }
    }

    #[test]
    fn second_build_adds_nothing(seed in any::<u64>(), faults in 2usize..8) {
        let strat = ClusterConnectionStrategy::new(network(seed, faults), ConnectionRule::ClosestSectionPair, Some(6.0)).unwrap();
        let calc = SectionDistAzCalc::new();
        let first = strat.build_connections(&calc, 1).unwrap().num_jumps();
        let second = strat.build_connections(&calc, 3).unwrap().num_jumps();
        prop_assert_eq!(first, second);
        prop_assert_eq!(strat.all_possible_jumps().unwrap().len(), first);
    }

    #[test]
    fn grown_ruptures_never_reuse_sections(seed in any::<u64>(), faults in 2usize..7, max_splays in 0usize..2) {
        let strat = ClusterConnectionStrategy::new(network(seed, faults), ConnectionRule::ClosestSectionPair, Some(5.0)).unwrap();
        let calc = SectionDistAzCalc::new();
        strat.build_connections(&calc, 1).unwrap();
        let pipeline = FilterPipeline::new();
        let cfg = BuildCfg { max_splays, ..BuildCfg::default() };
        let out = RuptureBuilder::new(&strat, &pipeline, &calc, cfg).unwrap().build().unwrap();

        let search = RuptureConnectionSearch::new(&strat).unwrap();
        let mut uniques = HashSet::new();
        for r in &out.ruptures {
            let all = r.all_sections();
            let set: HashSet<SectionId> = all.iter().copied().collect();
            prop_assert_eq!(set.len(), all.len());
            prop_assert!(uniques.insert(r.unique()));
            prop_assert!(r.splay_count() <= max_splays);
            // every grown rupture, splayed or not, re-derives from its flat list
            prop_assert_eq!(&search.build_rupture(&all).unwrap(), r);
        }
        // every cluster is at least a trivial rupture
        prop_assert!(out.ruptures.len() >= strat.clusters().len());
    }
}
