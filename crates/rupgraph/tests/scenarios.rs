//! End-to-end scenarios through the public API: sections -> connections ->
//! growth -> reconstruction.

use nalgebra::Vector2;
use rupgraph::api::*;

/// Two 3-section faults; only sections 2 and 3 lie within 5 km (distance 4).
fn two_clusters() -> (ClusterConnectionStrategy, DistanceTable) {
    let mut sections = straight_fault(0, ParentId(10), "West", 3, Vector2::new(0.0, 0.0), 0.0, 5.0).unwrap();
    sections.extend(straight_fault(3, ParentId(20), "East", 3, Vector2::new(30.0, 0.0), 0.0, 5.0).unwrap());
    let table = DistanceTable::new(10.0).with(2, 3, 4.0);
    let strat = ClusterConnectionStrategy::new(sections, ConnectionRule::AllWithinDistance, Some(5.0)).unwrap();
    (strat, table)
}

#[test]
fn single_close_pair_end_to_end() {
    let (strat, table) = two_clusters();
    let graph = strat.build_connections(&table, 4).unwrap();
    assert_eq!(graph.num_jumps(), 2);
    assert!(strat.are_parents_connected(ParentId(10), ParentId(20)).unwrap());

    let pipeline = FilterPipeline::new();
    let builder = RuptureBuilder::new(&strat, &pipeline, &table, BuildCfg::default()).unwrap();
    let out = builder.build().unwrap();
    assert_eq!(out.ruptures.len(), 3);
    let multi: Vec<_> = out.ruptures.iter().filter(|r| r.cluster_count() == 2).collect();
    assert_eq!(multi.len(), 1);
    assert_eq!(multi[0].total_section_count(), 6);
    assert_eq!(multi[0].total_jump_count(), 1);

    // the flat list of the multi-cluster rupture reconstructs to the same tree
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    let flat = multi[0].all_sections();
    assert_eq!(&search.build_rupture(&flat).unwrap(), multi[0]);
}

#[test]
fn always_hard_stop_keeps_only_trivial_ruptures() {
    let (strat, table) = two_clusters();
    strat.build_connections(&table, 1).unwrap();
    // no jump in this graph is 1 km or shorter
    let pipeline = FilterPipeline::from_cfgs(&[FilterCfg::JumpDist { max_dist: 1.0 }]).unwrap();
    let out = RuptureBuilder::new(&strat, &pipeline, &table, BuildCfg::default())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(out.ruptures.len(), 2);
    assert!(out.ruptures.iter().all(|r| r.cluster_count() == 1));
    assert!(out.tally.filters[0].hard_stopped > 0);
}

#[test]
fn disconnected_flat_list_is_a_structural_error() {
    let (strat, _) = two_clusters();
    let table = DistanceTable::new(10.0);
    strat.build_connections(&table, 1).unwrap();
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    let ids: Vec<SectionId> = [0, 1, 2, 3, 4, 5].into_iter().map(SectionId).collect();
    let err = search.build_rupture(&ids).unwrap_err();
    assert!(matches!(err, RuptureError::Disconnected { .. }));
    assert!(err.is_structural());
}

#[test]
fn splay_length_scenario() {
    // primary: 4 x 5 km; splay: one 11 km (or 9 km) section reached from section 1
    for (splay_len, expected) in [
        (11.0, PlausibilityResult::FailHardStop),
        (9.0, PlausibilityResult::Pass),
    ] {
        let mut sections = straight_fault(0, ParentId(1), "Main", 4, Vector2::new(0.0, 0.0), 0.0, 5.0).unwrap();
        sections.extend(
            straight_fault(4, ParentId(2), "Branch", 1, Vector2::new(2.0, 5.0), 60.0, splay_len).unwrap(),
        );
        let strat = ClusterConnectionStrategy::new(sections, ConnectionRule::ClosestSectionPair, Some(5.0)).unwrap();
        let table = DistanceTable::new(30.0).with(1, 4, 2.0);
        strat.build_connections(&table, 1).unwrap();

        let main = RuptureCluster::whole(&strat.clusters()[0]);
        let branch = RuptureCluster::whole(&strat.clusters()[1]);
        let jump = strat.jumps_from(SectionId(1)).unwrap()[0];
        let rup = ClusterRupture::single(main).take_splay(jump, branch).unwrap();
        rup.validate().unwrap();

        let pipeline = FilterPipeline::from_cfgs(&[FilterCfg::SplayLength {
            max_len: 10.0,
            is_fract_of_main: false,
            total_across_splays: false,
            allow_full_cluster: false,
        }])
        .unwrap();
        let ctx = FilterContext::from_strategy(&strat, &table);
        assert_eq!(pipeline.apply(&rup, &ctx, false), expected, "splay {splay_len} km");

        // the builder reaches the same splay from the interior section and applies the same verdict
        let out = RuptureBuilder::new(&strat, &pipeline, &table, BuildCfg::default())
            .unwrap()
            .build()
            .unwrap();
        let splayed = out.ruptures.iter().any(|r| r.is_splayed());
        assert_eq!(splayed, expected.is_pass(), "splay {splay_len} km");
    }
}

#[test]
fn records_rebuild_the_same_ruptures() {
    let cfg = SynthCfg {
        num_faults: 6,
        ..SynthCfg::default()
    };
    let sections = draw_network(&cfg, SynthReplay { seed: 99, index: 2 }).unwrap();
    let calc = SectionDistAzCalc::new();
    let built = ClusterConnectionStrategy::new(sections.clone(), ConnectionRule::ClosestSectionPair, Some(6.0)).unwrap();
    built.build_connections(&calc, 2).unwrap();
    let records = built.to_records().unwrap();
    let json = serde_json::to_string(&records).unwrap();
    let records: Vec<ClusterRecord> = serde_json::from_str(&json).unwrap();
    let loaded =
        ClusterConnectionStrategy::from_records(sections, ConnectionRule::ClosestSectionPair, Some(6.0), &records)
            .unwrap();

    let pipeline = FilterPipeline::new();
    let a = RuptureBuilder::new(&built, &pipeline, &calc, BuildCfg::default()).unwrap().build().unwrap();
    let b = RuptureBuilder::new(&loaded, &pipeline, &calc, BuildCfg::default()).unwrap().build().unwrap();
    assert_eq!(a.ruptures, b.ruptures);
}
