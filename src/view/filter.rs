//! The not-OK filter.

use std::sync::Arc;

use crate::model::{AssessmentItem, Outcome, Report, Section};

use super::ViewState;

/// A section as currently displayed.
#[derive(Debug, Clone)]
pub struct VisibleSection {
    /// Position of the section in the report.
    pub index: usize,
    pub section: Arc<Section>,
    pub expanded: bool,
}

/// Sections to display.
///
/// With `only_not_ok` off this is the report's own section list. With it on,
/// only `Not OK` instances survive, in their original order; items and
/// sections left empty are dropped.
pub fn filtered_view(report: &Report, only_not_ok: bool) -> Vec<Arc<Section>> {
    if !only_not_ok {
        return report.sections.clone();
    }
    report
        .sections
        .iter()
        .filter_map(|s| not_ok_section(s))
        .collect()
}

/// Sections to display under `view`, tagged with their report position.
pub fn visible_sections(report: &Report, view: &ViewState) -> Vec<VisibleSection> {
    report
        .sections
        .iter()
        .enumerate()
        .filter_map(|(index, section)| {
            let section = if view.only_not_ok {
                not_ok_section(section)?
            } else {
                Arc::clone(section)
            };
            Some(VisibleSection {
                index,
                section,
                expanded: view.is_expanded(index),
            })
        })
        .collect()
}

fn not_ok_section(section: &Section) -> Option<Arc<Section>> {
    let items: Vec<_> = section.items.iter().filter_map(|i| not_ok_item(i)).collect();
    if items.is_empty() {
        return None;
    }
    Some(Arc::new(Section {
        title: section.title.clone(),
        items,
    }))
}

fn not_ok_item(item: &AssessmentItem) -> Option<Arc<AssessmentItem>> {
    let instances: Vec<_> = item
        .instances
        .iter()
        .filter(|i| i.outcome == Outcome::NotOk)
        .cloned()
        .collect();
    if instances.is_empty() {
        return None;
    }
    Some(Arc::new(AssessmentItem {
        id: item.id.clone(),
        text: item.text.clone(),
        repeatable: item.repeatable,
        instances,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::{Catalog, InstanceId, ItemInstance};

    fn fresh() -> Report {
        Report::new(&Catalog::builtin(), date(2026, 3, 14))
    }

    fn set(report: &mut Report, section: usize, item: usize, outcomes: &[Outcome]) {
        let mut next = report.next_instance_id;
        let s = Arc::make_mut(&mut report.sections[section]);
        let it = Arc::make_mut(&mut s.items[item]);
        it.instances.truncate(1);
        for (n, outcome) in outcomes.iter().enumerate() {
            if n > 0 {
                it.instances
                    .push(Arc::new(ItemInstance::new(InstanceId(next))));
                next += 1;
            }
            Arc::make_mut(&mut it.instances[n]).outcome = *outcome;
        }
        report.next_instance_id = next;
    }

    #[test]
    fn unfiltered_view_is_the_report() {
        let mut report = fresh();
        set(&mut report, 1, 0, &[Outcome::NotOk]);

        let view = filtered_view(&report, false);
        assert_eq!(view, report.sections);
        assert!(
            view.iter()
                .zip(&report.sections)
                .all(|(a, b)| Arc::ptr_eq(a, b))
        );
    }

    #[test]
    fn filtered_view_keeps_only_not_ok_in_order() {
        let mut report = fresh();
        set(
            &mut report,
            0,
            1,
            &[Outcome::NotOk, Outcome::Ok, Outcome::NotOk, Outcome::Unset],
        );
        set(&mut report, 2, 4, &[Outcome::NotOk]);
        set(&mut report, 3, 0, &[Outcome::NotApplicable]);

        let original = &report.sections[0].items[1].instances;
        let expected_ids = vec![original[0].id, original[2].id];

        let view = filtered_view(&report, true);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].title, report.sections[0].title);
        assert_eq!(view[0].items.len(), 1);
        assert_eq!(view[0].items[0].id, "1.2");
        let ids: Vec<_> = view[0].items[0].instances.iter().map(|i| i.id).collect();
        assert_eq!(ids, expected_ids);
        assert_eq!(view[1].items[0].id, "3.5");

        let mut every_instance = view
            .iter()
            .flat_map(|s| &s.items)
            .flat_map(|i| &i.instances);
        assert!(every_instance.all(|i| i.outcome == Outcome::NotOk));
    }

    #[test]
    fn filtered_view_of_clean_report_is_empty() {
        let report = fresh();
        assert!(filtered_view(&report, true).is_empty());
    }

    #[test]
    fn filtering_leaves_report_untouched() {
        let mut report = fresh();
        set(&mut report, 0, 0, &[Outcome::NotOk, Outcome::Ok]);
        let before = report.clone();

        let _ = filtered_view(&report, true);
        assert_eq!(report, before);
        assert_eq!(report.sections[0].items[0].instances.len(), 2);
    }

    #[test]
    fn visible_sections_keep_report_positions() {
        let mut report = fresh();
        set(&mut report, 2, 0, &[Outcome::NotOk]);
        let mut view = ViewState::default();
        view.only_not_ok = true;
        view.focus_section(2);

        let visible = visible_sections(&report, &view);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].index, 2);
        assert!(visible[0].expanded);

        view.only_not_ok = false;
        let visible = visible_sections(&report, &view);
        assert_eq!(visible.len(), 4);
        assert!(!visible[0].expanded);
        assert!(visible[2].expanded);
    }
}
