use super::*;
use crate::connections::{ClusterConnectionStrategy, ClusterId, ConnectionRule};
use crate::filters::{FilterContext, FilterPipeline, PlausibilityFilter, PlausibilityResult};
use crate::sections::{DistanceTable, FaultSection, ParentId, SectionId};
use crate::synth::straight_fault;
use crate::RuptureError;
use nalgebra::Vector2;

fn ids(v: &[usize]) -> Vec<SectionId> {
    v.iter().copied().map(SectionId).collect()
}

/// Parent 1 = sections 0..3, parent 2 = 3..6, parent 3 = 6..8; jumps 2<->3 and 4<->6.
fn network() -> (ClusterConnectionStrategy, DistanceTable) {
    let mut s: Vec<FaultSection> =
        straight_fault(0, ParentId(1), "A", 3, Vector2::new(0.0, 0.0), 0.0, 5.0).unwrap();
    s.extend(straight_fault(3, ParentId(2), "B", 3, Vector2::new(20.0, 0.0), 0.0, 5.0).unwrap());
    s.extend(straight_fault(6, ParentId(3), "C", 2, Vector2::new(40.0, 0.0), 0.0, 5.0).unwrap());
    let table = DistanceTable::new(50.0).with(2, 3, 4.0).with(4, 6, 3.0);
    let strat = ClusterConnectionStrategy::new(s, ConnectionRule::ClosestSectionPair, Some(5.0)).unwrap();
    (strat, table)
}

fn populated() -> (ClusterConnectionStrategy, DistanceTable) {
    let (strat, table) = network();
    strat.build_connections(&table, 1).unwrap();
    (strat, table)
}

#[derive(Debug)]
struct StartsAt(SectionId, bool);

impl PlausibilityFilter for StartsAt {
    fn name(&self) -> String {
        format!("starts-at-{}", self.0)
    }
    fn apply(&self, r: &ClusterRupture, _c: &FilterContext<'_>, _v: bool) -> PlausibilityResult {
        if r.start_section() == self.0 {
            PlausibilityResult::Pass
        } else {
            PlausibilityResult::Fail
        }
    }
    fn is_directional(&self, _splayed: bool) -> bool {
        self.1
    }
}

#[test]
fn build_rupture_links_runs_through_known_jumps() {
    let (strat, _) = populated();
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    let rup = search.build_rupture(&ids(&[0, 1, 2, 3, 4, 5])).unwrap();
    assert_eq!(rup.clusters.len(), 2);
    assert_eq!(rup.internal_jumps.len(), 1);
    assert_eq!(rup.internal_jumps[0].to_section, SectionId(3));
    assert_eq!(rup.start_section(), SectionId(0));
    assert_eq!(rup.end_section(), SectionId(5));
    rup.validate().unwrap();

    let back = search.build_rupture(&ids(&[5, 4, 3, 2, 1, 0])).unwrap();
    assert_eq!(back.unique(), rup.unique());
    assert_eq!(back, rup.reversed().unwrap());
}

#[test]
fn build_rupture_rejects_bad_lists() {
    let (strat, _) = populated();
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    assert!(matches!(search.build_rupture(&[]), Err(RuptureError::EmptyRupture)));
    assert!(matches!(
        search.build_rupture(&ids(&[0, 1, 0])),
        Err(RuptureError::DuplicateSection(SectionId(0)))
    ));
    assert!(matches!(
        search.build_rupture(&ids(&[0, 2])),
        Err(RuptureError::NonContiguousRun { .. })
    ));
    assert!(matches!(
        search.build_rupture(&ids(&[1, 2, 0])),
        Err(RuptureError::NonContiguousRun { .. })
    ));
    assert!(matches!(
        search.build_rupture(&ids(&[1, 2, 4, 5])),
        Err(RuptureError::Disconnected { .. })
    ));
    assert!(matches!(search.build_rupture(&ids(&[99])), Err(RuptureError::UnknownSection(99))));
}

#[test]
fn search_requires_populated_strategy() {
    let (strat, _) = network();
    assert!(matches!(RuptureConnectionSearch::new(&strat), Err(RuptureError::NotPopulated)));
}

#[test]
fn growth_operations_and_counts() {
    let (strat, _) = populated();
    let graph = strat.jump_graph().unwrap();
    let a = RuptureCluster::whole(&strat.clusters()[0]);
    let b = RuptureCluster::whole(&strat.clusters()[1]);
    let c = RuptureCluster::whole(&strat.clusters()[2]);
    let j23 = graph.jumps_from(SectionId(2))[0];
    let j46 = graph.jumps_from(SectionId(4))[0];

    let ab = ClusterRupture::single(a.clone()).take(j23, b).unwrap();
    assert!(ab.take(j23, c.clone()).is_err());
    let with_splay = ab.take_splay(j46, c.clone()).unwrap();
    assert!(with_splay.is_splayed());
    assert_eq!(with_splay.total_section_count(), 8);
    assert_eq!(with_splay.total_jump_count(), 2);
    assert_eq!(with_splay.cluster_count(), 3);
    assert_eq!(with_splay.splay_count(), 1);
    assert_eq!(with_splay.splay_at(&j46).unwrap().clusters[0].cluster, ClusterId(2));
    assert!(with_splay.contains_section(SectionId(7)));
    assert_eq!(with_splay.all_sections(), ids(&[0, 1, 2, 3, 4, 5, 6, 7]));
    assert!(with_splay.reversed().is_none());
    assert!((with_splay.length(strat.sections()) - 40.0).abs() < 1e-9);
    assert!((with_splay.primary_length(strat.sections()) - 30.0).abs() < 1e-9);
    with_splay.validate().unwrap();
    assert!(with_splay.extend_splay(3, j46, c).is_err());

    // splays may only leave the primary strand
    assert!(ClusterRupture::single(a).take_splay(j46, RuptureCluster::whole(&strat.clusters()[2])).is_err());
    assert!(format!("{with_splay}").contains("splay@4"));
}

#[test]
fn validate_catches_duplicates_and_broken_links() {
    let (strat, _) = populated();
    let graph = strat.jump_graph().unwrap();
    let a = RuptureCluster::whole(&strat.clusters()[0]);
    let b = RuptureCluster::whole(&strat.clusters()[1]);
    let j23 = graph.jumps_from(SectionId(2))[0];

    let mut dup = ClusterRupture::single(a.clone()).take(j23, b.clone()).unwrap();
    dup.clusters[1].sections.push(SectionId(0));
    assert!(matches!(dup.validate(), Err(RuptureError::DuplicateSection(SectionId(0)))));

    let mut missing = ClusterRupture::single(a).take(j23, b).unwrap();
    missing.internal_jumps.clear();
    let err = missing.validate().unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn unique_ignores_order() {
    let (strat, _) = populated();
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    let fwd = search.build_rupture(&ids(&[3, 4, 5])).unwrap();
    let rev = search.build_rupture(&ids(&[5, 4, 3])).unwrap();
    assert_ne!(fwd, rev);
    assert_eq!(fwd.unique(), rev.unique());
    assert_eq!(fwd.unique().sections(), ids(&[3, 4, 5]).as_slice());
}

#[test]
fn check_tries_reversal_for_directional_pipelines() {
    let (strat, table) = populated();
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    let rup = search.build_rupture(&ids(&[0, 1, 2, 3, 4, 5])).unwrap();

    let directional = FilterPipeline::new().with(StartsAt(SectionId(5), true));
    assert_eq!(search.check(&rup, &directional, &table, false), PlausibilityResult::Pass);

    let fixed = FilterPipeline::new().with(StartsAt(SectionId(5), false));
    assert_eq!(search.check(&rup, &fixed, &table, false), PlausibilityResult::Fail);
}

#[test]
fn build_rupture_accepts_landings_inside_a_run() {
    let (strat, _) = populated();
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    // C walked backwards ends on 6, whose jump lands on the middle of B
    let rup = search.build_rupture(&ids(&[7, 6, 3, 4, 5])).unwrap();
    assert_eq!(rup.internal_jumps[0].from_section, SectionId(6));
    assert_eq!(rup.internal_jumps[0].to_section, SectionId(4));
    assert!(!rup.is_splayed());
    rup.validate().unwrap();
}

#[test]
fn build_rupture_turns_interior_links_into_splays() {
    let (strat, _) = populated();
    let graph = strat.jump_graph().unwrap();
    let search = RuptureConnectionSearch::new(&strat).unwrap();
    let rup = search.build_rupture(&ids(&[0, 1, 2, 3, 4, 5, 6, 7])).unwrap();

    let expected = ClusterRupture::single(RuptureCluster::whole(&strat.clusters()[0]))
        .take(graph.jumps_from(SectionId(2))[0], RuptureCluster::whole(&strat.clusters()[1]))
        .unwrap()
        .take_splay(graph.jumps_from(SectionId(4))[0], RuptureCluster::whole(&strat.clusters()[2]))
        .unwrap();
    assert_eq!(rup, expected);
    assert_eq!(rup.all_sections(), ids(&[0, 1, 2, 3, 4, 5, 6, 7]));

    // B with C hanging off its interior section 4
    let small = search.build_rupture(&ids(&[3, 4, 5, 6, 7])).unwrap();
    assert_eq!(small.splays.len(), 1);
    assert_eq!(small.splays[0].jump.from_section, SectionId(4));
    // a run reachable only from the primary start stays disconnected
    assert!(matches!(
        search.build_rupture(&ids(&[2, 1, 0, 3, 4, 5])),
        Err(RuptureError::Disconnected { .. })
    ));
}
