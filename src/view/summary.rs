//! Outcome counts for the live summary.

use serde::Serialize;

use crate::model::{Outcome, Report};

/// Occurrence counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub ok: usize,
    pub not_ok: usize,
    pub not_applicable: usize,
    pub unset: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Ok => self.ok += 1,
            Outcome::NotOk => self.not_ok += 1,
            Outcome::NotApplicable => self.not_applicable += 1,
            Outcome::Unset => self.unset += 1,
        }
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Ok => self.ok,
            Outcome::NotOk => self.not_ok,
            Outcome::NotApplicable => self.not_applicable,
            Outcome::Unset => self.unset,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.not_ok + self.not_applicable + self.unset
    }

    /// Occurrences with an outcome recorded.
    pub fn decided(&self) -> usize {
        self.total() - self.unset
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTally {
    pub title: String,
    pub tally: Tally,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub overall: Tally,
    pub sections: Vec<SectionTally>,
}

/// Count outcomes per section and overall in one pass.
pub fn summary_counts(report: &Report) -> Summary {
    let mut sections: Vec<SectionTally> = report
        .sections
        .iter()
        .map(|s| SectionTally {
            title: s.title.clone(),
            tally: Tally::default(),
        })
        .collect();
    let mut overall = Tally::default();

    for occurrence in report.occurrences() {
        overall.record(occurrence.instance.outcome);
        sections[occurrence.path.section]
            .tally
            .record(occurrence.instance.outcome);
    }

    Summary { overall, sections }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use jiff::civil::date;

    use crate::model::Catalog;

    fn set(report: &mut Report, section: usize, item: usize, outcome: Outcome) {
        let s = Arc::make_mut(&mut report.sections[section]);
        let it = Arc::make_mut(&mut s.items[item]);
        Arc::make_mut(&mut it.instances[0]).outcome = outcome;
    }

    #[test]
    fn fresh_report_is_all_unset() {
        let catalog = Catalog::builtin();
        let report = Report::new(&catalog, date(2026, 3, 14));

        let summary = summary_counts(&report);
        assert_eq!(summary.overall.unset, catalog.item_count());
        assert_eq!(summary.overall.decided(), 0);
        assert_eq!(summary.sections.len(), 4);
        assert_eq!(summary.sections[2].tally.unset, 10);
    }

    #[test]
    fn counts_per_section_and_overall() {
        let mut report = Report::new(&Catalog::builtin(), date(2026, 3, 14));
        set(&mut report, 0, 0, Outcome::Ok);
        set(&mut report, 0, 1, Outcome::NotOk);
        set(&mut report, 1, 0, Outcome::NotOk);
        set(&mut report, 3, 3, Outcome::NotApplicable);

        let summary = summary_counts(&report);
        assert_eq!(summary.overall.ok, 1);
        assert_eq!(summary.overall.not_ok, 2);
        assert_eq!(summary.overall.not_applicable, 1);
        assert_eq!(summary.overall.total(), 25);
        assert_eq!(summary.sections[0].tally.count(Outcome::NotOk), 1);
        assert_eq!(summary.sections[0].tally.count(Outcome::Unset), 4);
        assert_eq!(summary.sections[1].tally.not_ok, 1);
        assert_eq!(summary.sections[3].tally.not_applicable, 1);

        let per_section: usize = summary.sections.iter().map(|s| s.tally.total()).sum();
        assert_eq!(per_section, summary.overall.total());
    }
}
