//! Pure edits: each takes a report and returns the edited copy.
//!
//! Only the path from the root to the edited node is cloned; the input
//! report is never modified. Edits addressed outside the report return
//! `None`.

use std::sync::Arc;

use jiff::civil::Date;

use crate::model::{
    AssessmentItem, InstancePath, ItemInstance, ItemPath, OccurrenceKey, Outcome, Photo, Report,
};

/// A change to one header attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEdit {
    AssessmentDate(Date),
    AreaLocation(String),
    AssessorName(String),
}

/// A change to one follow-up attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUpEdit {
    Summary(String),
    Recommendations(String),
    PersonInCharge(String),
    TargetDate(Option<Date>),
}

/// Outcome of [`remove_instance`].
#[derive(Debug)]
pub enum Removal {
    /// The instance was removed; `key` identified it.
    Removed { report: Report, key: OccurrenceKey },

    /// The item has a single instance, which cannot be removed.
    LastInstance,
}

pub fn set_header(report: &Report, edit: HeaderEdit) -> Report {
    let mut next = report.clone();
    let header = &mut next.header;
    match edit {
        HeaderEdit::AssessmentDate(date) => header.assessment_date = date,
        HeaderEdit::AreaLocation(text) => header.area_location = text,
        HeaderEdit::AssessorName(text) => header.assessor_name = text,
    }
    next
}

pub fn set_follow_up(report: &Report, edit: FollowUpEdit) -> Report {
    let mut next = report.clone();
    let follow_up = &mut next.follow_up;
    match edit {
        FollowUpEdit::Summary(text) => follow_up.summary = text,
        FollowUpEdit::Recommendations(text) => follow_up.recommendations = text,
        FollowUpEdit::PersonInCharge(text) => follow_up.person_in_charge = text,
        FollowUpEdit::TargetDate(date) => follow_up.target_date = date,
    }
    next
}

/// Press `pressed` on an instance: set it, or clear it if already set.
pub fn toggle_outcome(report: &Report, at: InstancePath, pressed: Outcome) -> Option<Report> {
    update_instance(report, at, |instance| {
        instance.outcome = instance.outcome.toggled(pressed);
    })
}

pub fn set_description(report: &Report, at: InstancePath, text: String) -> Option<Report> {
    update_instance(report, at, |instance| instance.description = text)
}

pub fn set_photo(report: &Report, at: InstancePath, photo: Option<Photo>) -> Option<Report> {
    update_instance(report, at, |instance| instance.photo = photo)
}

/// Append a fresh instance to an item.
pub fn add_instance(report: &Report, at: ItemPath) -> Option<Report> {
    report.item(at)?;
    let mut next = report.clone();
    let id = next.allocate_instance_id();
    item_mut(&mut next, at)
        .instances
        .push(Arc::new(ItemInstance::new(id)));
    Some(next)
}

/// Remove an instance unless it is the item's last one.
pub fn remove_instance(report: &Report, at: InstancePath) -> Option<Removal> {
    let item = report.item(at.item_path())?;
    let instance = item.instances.get(at.instance)?;
    if item.instances.len() <= 1 {
        return Some(Removal::LastInstance);
    }
    let key = item.key(instance);

    let mut next = report.clone();
    item_mut(&mut next, at.item_path()).instances.remove(at.instance);
    Some(Removal::Removed { report: next, key })
}

fn update_instance(
    report: &Report,
    at: InstancePath,
    edit: impl FnOnce(&mut ItemInstance),
) -> Option<Report> {
    report.instance(at)?;
    let mut next = report.clone();
    let item = item_mut(&mut next, at.item_path());
    edit(Arc::make_mut(&mut item.instances[at.instance]));
    Some(next)
}

/// Unshare the path down to an item. Callers check `at` first.
fn item_mut(report: &mut Report, at: ItemPath) -> &mut AssessmentItem {
    let section = Arc::make_mut(&mut report.sections[at.section]);
    Arc::make_mut(&mut section.items[at.item])
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::Catalog;

    fn fresh() -> Report {
        Report::new(&Catalog::builtin(), date(2026, 3, 14))
    }

    fn at(section: usize, item: usize, instance: usize) -> InstancePath {
        InstancePath {
            section,
            item,
            instance,
        }
    }

    #[test]
    fn edits_never_touch_the_input() {
        let report = fresh();
        let before = report.clone();

        let _ = toggle_outcome(&report, at(0, 0, 0), Outcome::NotOk).unwrap();
        let _ = set_description(&report, at(0, 0, 0), "leak".into()).unwrap();
        let _ = add_instance(&report, ItemPath { section: 0, item: 0 }).unwrap();
        let _ = set_header(&report, HeaderEdit::AreaLocation("Kiln".into()));

        assert_eq!(report, before);
    }

    #[test]
    fn edit_clones_only_the_touched_path() {
        let report = fresh();
        let next = toggle_outcome(&report, at(1, 2, 0), Outcome::Ok).unwrap();

        assert!(Arc::ptr_eq(&report.sections[0], &next.sections[0]));
        assert!(!Arc::ptr_eq(&report.sections[1], &next.sections[1]));
        assert!(Arc::ptr_eq(
            &report.sections[1].items[0],
            &next.sections[1].items[0]
        ));
        assert!(!Arc::ptr_eq(
            &report.sections[1].items[2],
            &next.sections[1].items[2]
        ));
        assert_eq!(next.sections[1].items[2].instances[0].outcome, Outcome::Ok);
    }

    #[test]
    fn toggle_twice_returns_to_unset() {
        let report = fresh();
        let once = toggle_outcome(&report, at(0, 0, 0), Outcome::NotOk).unwrap();
        let twice = toggle_outcome(&once, at(0, 0, 0), Outcome::NotOk).unwrap();

        assert_eq!(twice.instance(at(0, 0, 0)).unwrap().outcome, Outcome::Unset);
    }

    #[test]
    fn toggle_different_outcomes_keeps_the_second() {
        let report = fresh();
        let first = toggle_outcome(&report, at(0, 0, 0), Outcome::Ok).unwrap();
        let second = toggle_outcome(&first, at(0, 0, 0), Outcome::NotApplicable).unwrap();

        assert_eq!(
            second.instance(at(0, 0, 0)).unwrap().outcome,
            Outcome::NotApplicable
        );
    }

    #[test]
    fn add_instance_appends_fresh_instance_with_new_id() {
        let report = fresh();
        let next = add_instance(&report, ItemPath { section: 0, item: 0 }).unwrap();

        let item = &next.sections[0].items[0];
        assert_eq!(item.instances.len(), 2);
        let added = &item.instances[1];
        assert_eq!(added.outcome, Outcome::Unset);
        assert!(added.description.is_empty());
        assert!(added.photo.is_none());
        assert_eq!(added.id.0, report.next_instance_id);
        assert_eq!(next.next_instance_id, report.next_instance_id + 1);
    }

    #[test]
    fn remove_last_instance_is_refused() {
        let report = fresh();
        let removal = remove_instance(&report, at(0, 0, 0)).unwrap();
        assert!(matches!(removal, Removal::LastInstance));
    }

    #[test]
    fn remove_middle_instance_keeps_other_ids() {
        let item_at = ItemPath { section: 0, item: 0 };
        let report = fresh();
        let report = add_instance(&report, item_at).unwrap();
        let report = add_instance(&report, item_at).unwrap();
        let ids: Vec<_> = report.sections[0].items[0]
            .instances
            .iter()
            .map(|i| i.id)
            .collect();

        let Removal::Removed { report: next, key } = remove_instance(&report, at(0, 0, 1)).unwrap()
        else {
            panic!("expected removal");
        };
        assert_eq!(key.instance, ids[1]);
        let remaining: Vec<_> = next.sections[0].items[0]
            .instances
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
    }

    #[test]
    fn out_of_range_edits_return_none() {
        let report = fresh();
        assert!(toggle_outcome(&report, at(7, 0, 0), Outcome::Ok).is_none());
        assert!(set_description(&report, at(0, 0, 3), "x".into()).is_none());
        assert!(add_instance(&report, ItemPath { section: 0, item: 99 }).is_none());
        assert!(remove_instance(&report, at(0, 0, 5)).is_none());
    }

    #[test]
    fn header_and_follow_up_edits() {
        let report = fresh();
        let report = set_header(&report, HeaderEdit::AssessorName("Rina".into()));
        let report = set_header(&report, HeaderEdit::AssessmentDate(date(2026, 1, 2)));
        let report = set_follow_up(&report, FollowUpEdit::TargetDate(Some(date(2026, 2, 1))));
        let report = set_follow_up(&report, FollowUpEdit::PersonInCharge("Budi".into()));

        assert_eq!(report.header.assessor_name, "Rina");
        assert_eq!(report.header.assessment_date, date(2026, 1, 2));
        assert_eq!(report.follow_up.target_date, Some(date(2026, 2, 1)));
        assert_eq!(report.follow_up.person_in_charge, "Budi");
    }
}
