//! Report: the document being filled in during a session.
//!
//! Sections, items and instances sit behind `Arc` so an edit clones only the
//! path from the root to the touched instance. Everything else is shared
//! with the previous version of the document.

use std::fmt;
use std::sync::Arc;

use jiff::civil::Date;
use serde::Serialize;

use super::catalog::Catalog;
use super::outcome::Outcome;
use super::photo::Photo;

/// Identity of an instance, assigned once at creation and never reused
/// within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Identifies one occurrence across the whole report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceKey {
    pub item_id: String,
    pub instance: InstanceId,
}

/// Positional address of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPath {
    pub section: usize,
    pub item: usize,
}

/// Positional address of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstancePath {
    pub section: usize,
    pub item: usize,
    pub instance: usize,
}

impl ItemPath {
    pub fn instance(self, instance: usize) -> InstancePath {
        InstancePath {
            section: self.section,
            item: self.item,
            instance,
        }
    }
}

impl InstancePath {
    pub fn item_path(self) -> ItemPath {
        ItemPath {
            section: self.section,
            item: self.item,
        }
    }
}

/// One recorded occurrence of a checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInstance {
    pub id: InstanceId,
    pub outcome: Outcome,
    pub description: String,
    pub photo: Option<Photo>,
}

impl ItemInstance {
    pub fn new(id: InstanceId) -> Self {
        Self {
            id,
            outcome: Outcome::Unset,
            description: String::new(),
            photo: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentItem {
    pub id: String,
    pub text: String,
    pub repeatable: bool,
    /// Never empty. Insertion order is display and evaluation order.
    pub instances: Vec<Arc<ItemInstance>>,
}

impl AssessmentItem {
    /// Current position of an instance, if it still belongs to this item.
    pub fn position_of(&self, id: InstanceId) -> Option<usize> {
        self.instances.iter().position(|i| i.id == id)
    }

    pub fn key(&self, instance: &ItemInstance) -> OccurrenceKey {
        OccurrenceKey {
            item_id: self.id.clone(),
            instance: instance.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub items: Vec<Arc<AssessmentItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub assessment_date: Date,
    pub area_location: String,
    pub assessor_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub summary: String,
    pub recommendations: String,
    pub person_in_charge: String,
    pub target_date: Option<Date>,
}

/// The aggregate root: header, sections and follow-up notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub header: Header,
    pub sections: Vec<Arc<Section>>,
    pub follow_up: FollowUp,
    /// Next value handed out by [`Report::allocate_instance_id`].
    pub next_instance_id: u64,
}

/// One occurrence seen while walking a report in document order.
#[derive(Debug, Clone, Copy)]
pub struct Occurrence<'a> {
    pub path: InstancePath,
    pub item: &'a AssessmentItem,
    pub instance: &'a ItemInstance,
}

impl Occurrence<'_> {
    pub fn key(&self) -> OccurrenceKey {
        self.item.key(self.instance)
    }
}

impl Report {
    /// Build the initial document: one empty instance per catalog item.
    pub fn new(catalog: &Catalog, today: Date) -> Self {
        let mut next = 0;
        let sections = catalog
            .sections
            .iter()
            .map(|section| {
                let items = section
                    .items
                    .iter()
                    .map(|item| {
                        let instance = ItemInstance::new(InstanceId(next));
                        next += 1;
                        Arc::new(AssessmentItem {
                            id: item.id.clone(),
                            text: item.text.clone(),
                            repeatable: item.repeatable,
                            instances: vec![Arc::new(instance)],
                        })
                    })
                    .collect();
                Arc::new(Section {
                    title: section.title.clone(),
                    items,
                })
            })
            .collect();

        Self {
            header: Header {
                assessment_date: today,
                area_location: String::new(),
                assessor_name: String::new(),
            },
            sections,
            follow_up: FollowUp::default(),
            next_instance_id: next,
        }
    }

    /// Hand out a fresh instance id.
    pub fn allocate_instance_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_instance_id);
        self.next_instance_id += 1;
        id
    }

    /// Find an item by its catalog id.
    pub fn locate(&self, item_id: &str) -> Option<ItemPath> {
        self.sections.iter().enumerate().find_map(|(s, section)| {
            section
                .items
                .iter()
                .position(|item| item.id == item_id)
                .map(|i| ItemPath { section: s, item: i })
        })
    }

    pub fn item(&self, at: ItemPath) -> Option<&AssessmentItem> {
        self.sections
            .get(at.section)
            .and_then(|s| s.items.get(at.item))
            .map(|item| &**item)
    }

    pub fn instance(&self, at: InstancePath) -> Option<&ItemInstance> {
        self.item(at.item_path())
            .and_then(|item| item.instances.get(at.instance))
            .map(|instance| &**instance)
    }

    /// Every occurrence in document order.
    pub fn occurrences(&self) -> impl Iterator<Item = Occurrence<'_>> {
        self.sections.iter().enumerate().flat_map(|(s, section)| {
            section.items.iter().enumerate().flat_map(move |(i, item)| {
                item.instances
                    .iter()
                    .enumerate()
                    .map(move |(n, instance)| Occurrence {
                        path: InstancePath {
                            section: s,
                            item: i,
                            instance: n,
                        },
                        item,
                        instance,
                    })
            })
        })
    }

    /// Positional label for an occurrence, e.g. `1.1-0`.
    ///
    /// Returns `None` once the instance has been removed.
    pub fn occurrence_label(&self, key: &OccurrenceKey) -> Option<String> {
        let at = self.locate(&key.item_id)?;
        let position = self.item(at)?.position_of(key.instance)?;
        Some(format!("{}-{position}", key.item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    fn fresh() -> Report {
        Report::new(&Catalog::builtin(), date(2026, 3, 14))
    }

    #[test]
    fn new_report_has_one_unset_instance_per_item() {
        let catalog = Catalog::builtin();
        let report = fresh();

        assert_eq!(report.sections.len(), catalog.sections.len());
        assert_eq!(report.occurrences().count(), catalog.item_count());
        for occurrence in report.occurrences() {
            assert_eq!(occurrence.item.instances.len(), 1);
            assert_eq!(occurrence.instance.outcome, Outcome::Unset);
            assert!(occurrence.instance.description.is_empty());
            assert!(occurrence.instance.photo.is_none());
        }
    }

    #[test]
    fn occurrence_paths_address_their_instances() {
        let report = fresh();
        let paths: Vec<_> = report.occurrences().map(|o| o.path).collect();

        assert_eq!(paths[0], ItemPath { section: 0, item: 0 }.instance(0));
        assert_eq!(paths[6], ItemPath { section: 1, item: 0 }.instance(0));
        for occurrence in report.occurrences() {
            let instance = report.instance(occurrence.path).unwrap();
            assert_eq!(instance.id, occurrence.instance.id);
            assert_eq!(occurrence.key(), occurrence.item.key(instance));
        }
    }

    #[test]
    fn new_report_defaults_header_and_follow_up() {
        let report = fresh();
        assert_eq!(report.header.assessment_date, date(2026, 3, 14));
        assert!(report.header.area_location.is_empty());
        assert!(report.header.assessor_name.is_empty());
        assert_eq!(report.follow_up, FollowUp::default());
    }

    #[test]
    fn instance_ids_are_unique() {
        let report = fresh();
        let mut ids: Vec<_> = report.occurrences().map(|o| o.instance.id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(report.next_instance_id, total as u64);
    }

    #[test]
    fn locate_finds_items_across_sections() {
        let report = fresh();
        assert_eq!(report.locate("1.1"), Some(ItemPath { section: 0, item: 0 }));
        assert_eq!(report.locate("3.10"), Some(ItemPath { section: 2, item: 9 }));
        assert_eq!(report.locate("9.9"), None);
    }

    #[test]
    fn occurrence_label_is_positional() {
        let report = fresh();
        let item = report.item(ItemPath { section: 0, item: 0 }).unwrap();
        let key = item.key(&item.instances[0]);
        assert_eq!(report.occurrence_label(&key).as_deref(), Some("1.1-0"));
    }

    #[test]
    fn out_of_range_lookups_return_none() {
        let report = fresh();
        assert!(report.item(ItemPath { section: 9, item: 0 }).is_none());
        assert!(
            report
                .instance(InstancePath {
                    section: 0,
                    item: 0,
                    instance: 1
                })
                .is_none()
        );
    }
}
