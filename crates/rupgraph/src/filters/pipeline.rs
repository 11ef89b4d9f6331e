use serde::Serialize;
use tracing::debug;

use super::cfg::FilterCfg;
use super::types::{FilterContext, PlausibilityFilter, PlausibilityResult};
use crate::error::Result;
use crate::rupture::ClusterRupture;
use crate::sections::SectionId;

/// Ordered list of filters evaluated against each candidate rupture.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn PlausibilityFilter>>,
}

/// Combined outcome plus the index of the filter that decided it, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub result: PlausibilityResult,
    pub failed_by: Option<usize>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cfgs(cfgs: &[FilterCfg]) -> Result<Self> {
        let filters = cfgs.iter().map(FilterCfg::build).collect::<Result<Vec<_>>>()?;
        Ok(Self { filters })
    }

    pub fn with(mut self, filter: impl PlausibilityFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn push(&mut self, filter: Box<dyn PlausibilityFilter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[Box<dyn PlausibilityFilter>] {
        &self.filters
    }

    pub fn names(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn is_directional(&self, splayed: bool) -> bool {
        self.filters.iter().any(|f| f.is_directional(splayed))
    }

    pub fn apply(&self, rupture: &ClusterRupture, ctx: &FilterContext<'_>, verbose: bool) -> PlausibilityResult {
        self.evaluate(rupture, ctx, verbose, None).result
    }

    /// Run filters in order. A hard stop ends evaluation; otherwise the most
    /// severe result wins and is attributed to the first filter that produced it.
    pub fn evaluate(
        &self,
        rupture: &ClusterRupture,
        ctx: &FilterContext<'_>,
        verbose: bool,
        mut tally: Option<&mut FilterTally>,
    ) -> Verdict {
        let mut verdict = Verdict {
            result: PlausibilityResult::Pass,
            failed_by: None,
        };
        for (i, filter) in self.filters.iter().enumerate() {
            let r = filter.apply(rupture, ctx, verbose);
            if let Some(t) = tally.as_deref_mut() {
                t.record(i, r, rupture);
            }
            if r > verdict.result {
                verdict = Verdict {
                    result: r,
                    failed_by: Some(i),
                };
            }
            if !r.can_continue() {
                break;
            }
        }
        if verbose && !verdict.result.is_pass() {
            let by = verdict.failed_by.map(|i| self.filters[i].name());
            debug!(rupture = %rupture, result = %verdict.result, filter = ?by, "rupture rejected");
        }
        verdict
    }

    pub fn new_tally(&self) -> FilterTally {
        FilterTally {
            filters: self
                .filters
                .iter()
                .map(|f| FilterCounts {
                    name: f.name(),
                    ..FilterCounts::default()
                })
                .collect(),
        }
    }
}

/// Per-filter evaluation counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilterCounts {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub hard_stopped: usize,
    /// Sections of the first rupture this filter rejected.
    pub first_rejected: Option<Vec<SectionId>>,
}

/// Counters for every filter of a pipeline, mergeable across seeds.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilterTally {
    pub filters: Vec<FilterCounts>,
}

impl FilterTally {
    pub(crate) fn record(&mut self, idx: usize, result: PlausibilityResult, rupture: &ClusterRupture) {
        let Some(c) = self.filters.get_mut(idx) else {
            return;
        };
        match result {
            PlausibilityResult::Pass => c.passed += 1,
            PlausibilityResult::Fail => c.failed += 1,
            PlausibilityResult::FailHardStop => c.hard_stopped += 1,
        }
        if !result.is_pass() && c.first_rejected.is_none() {
            c.first_rejected = Some(rupture.all_sections());
        }
    }

    /// Add `other` into `self`; earlier first-rejections are kept.
    pub fn merge(&mut self, other: &FilterTally) {
        if self.filters.is_empty() {
            self.filters = other.filters.clone();
            return;
        }
        for (mine, theirs) in self.filters.iter_mut().zip(&other.filters) {
            mine.passed += theirs.passed;
            mine.failed += theirs.failed;
            mine.hard_stopped += theirs.hard_stopped;
            if mine.first_rejected.is_none() {
                mine.first_rejected = theirs.first_rejected.clone();
            }
        }
    }

    pub fn evaluations(&self) -> usize {
        self.filters
            .iter()
            .map(|c| c.passed + c.failed + c.hard_stopped)
            .sum()
    }
}
