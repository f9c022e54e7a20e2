//! Form state: the one report of a session and everything derived from it.
//!
//! [`FormStore`] owns the report, the set of occurrences currently flagged
//! invalid, and the view state. Every edit replaces the report with an
//! edited copy (see [`edit`]) and then re-checks only the touched
//! occurrence, so the flagged set never needs a full re-scan between exports.
//!
//! The flagged set holds what the user has been shown, not every incomplete
//! occurrence: untouched blank occurrences are only flagged once
//! [`FormStore::validate`] runs. Every flagged key is always incomplete
//! according to a full scan.

pub mod edit;

use std::collections::BTreeSet;

use jiff::Zoned;
use jiff::civil::Date;
use tracing::{debug, trace};

use crate::model::{Catalog, InstancePath, ItemPath, OccurrenceKey, Outcome, Photo, Report};
use crate::validate::{self, Validation};
use crate::view::ViewState;

use edit::{FollowUpEdit, HeaderEdit, Removal};

/// Errors from addressing something the report does not contain.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no item at section {} item {}", .0.section, .0.item)]
    NoSuchItem(ItemPath),

    #[error("no instance at section {} item {} instance {}", .0.section, .0.item, .0.instance)]
    NoSuchInstance(InstancePath),
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// Source of "today" for new reports.
pub type Clock = fn() -> Date;

fn system_today() -> Date {
    Zoned::now().date()
}

pub struct FormStore {
    catalog: Catalog,
    clock: Clock,
    report: Report,
    errors: BTreeSet<OccurrenceKey>,
    view: ViewState,
}

impl FormStore {
    /// Start a session with a fresh report dated today.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_clock(catalog, system_today)
    }

    pub fn with_clock(catalog: Catalog, clock: Clock) -> Self {
        let report = Report::new(&catalog, clock());
        Self {
            catalog,
            clock,
            report,
            errors: BTreeSet::new(),
            view: ViewState::default(),
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Occurrences currently flagged incomplete.
    pub fn errors(&self) -> &BTreeSet<OccurrenceKey> {
        &self.errors
    }

    pub fn is_flagged(&self, key: &OccurrenceKey) -> bool {
        self.errors.contains(key)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn set_header_field(&mut self, edit: HeaderEdit) {
        debug!(?edit, "header edited");
        self.report = edit::set_header(&self.report, edit);
    }

    pub fn set_follow_up_field(&mut self, edit: FollowUpEdit) {
        debug!(?edit, "follow-up edited");
        self.report = edit::set_follow_up(&self.report, edit);
    }

    /// Press an outcome on an instance. Returns the outcome now recorded.
    pub fn toggle_outcome(&mut self, at: InstancePath, pressed: Outcome) -> Result<Outcome> {
        self.report = edit::toggle_outcome(&self.report, at, pressed)
            .ok_or(StoreError::NoSuchInstance(at))?;
        let outcome = self.recheck(at);
        Ok(outcome)
    }

    pub fn set_description(&mut self, at: InstancePath, text: impl Into<String>) -> Result<()> {
        self.report = edit::set_description(&self.report, at, text.into())
            .ok_or(StoreError::NoSuchInstance(at))?;
        self.recheck(at);
        Ok(())
    }

    /// Attach or clear a photo. Returns the handle it replaced.
    pub fn set_photo(&mut self, at: InstancePath, photo: Option<Photo>) -> Result<Option<Photo>> {
        let previous = self
            .report
            .instance(at)
            .ok_or(StoreError::NoSuchInstance(at))?
            .photo
            .clone();
        self.report = edit::set_photo(&self.report, at, photo)
            .ok_or(StoreError::NoSuchInstance(at))?;
        let attached = self.report.instance(at).is_some_and(|i| i.photo.is_some());
        debug!(?at, attached, "photo set");
        Ok(previous)
    }

    /// Append a fresh instance. Returns where it landed.
    pub fn add_instance(&mut self, at: ItemPath) -> Result<InstancePath> {
        self.report = edit::add_instance(&self.report, at).ok_or(StoreError::NoSuchItem(at))?;
        let position = self.report.item(at).map_or(0, |item| item.instances.len() - 1);
        debug!(?at, position, "instance added");
        Ok(at.instance(position))
    }

    /// Remove an instance. Removing an item's last instance does nothing
    /// and returns `false`.
    pub fn remove_instance(&mut self, at: InstancePath) -> Result<bool> {
        match edit::remove_instance(&self.report, at).ok_or(StoreError::NoSuchInstance(at))? {
            Removal::Removed { report, key } => {
                self.report = report;
                self.errors.remove(&key);
                debug!(item = %key.item_id, instance = %key.instance, "instance removed");
                Ok(true)
            }
            Removal::LastInstance => {
                trace!(?at, "refused to remove last instance");
                Ok(false)
            }
        }
    }

    /// Discard everything and start over with a fresh report.
    pub fn reset(&mut self) {
        self.report = Report::new(&self.catalog, (self.clock)());
        self.errors.clear();
        self.view = ViewState::default();
        debug!("form reset");
    }

    /// Run a full scan, flag every incomplete occurrence, and open the first
    /// section that needs attention.
    pub fn validate(&mut self) -> Validation {
        let validation = validate::validate_report(&self.report);
        self.errors.clone_from(&validation.errors);
        if let Some(section) = validation.first_invalid_section
            && !self.view.is_exporting()
        {
            self.view.focus_section(section);
        }
        validation
    }

    /// Bring the flag for one occurrence in line with its current state.
    fn recheck(&mut self, at: InstancePath) -> Outcome {
        let Some(item) = self.report.item(at.item_path()) else {
            return Outcome::Unset;
        };
        let Some(instance) = item.instances.get(at.instance) else {
            return Outcome::Unset;
        };
        let key = item.key(instance);
        let valid = validate::is_instance_valid(instance);
        let outcome = instance.outcome;
        debug!(item = %key.item_id, instance = %key.instance, %outcome, valid, "occurrence edited");
        if valid {
            self.errors.remove(&key);
        } else {
            self.errors.insert(key);
        }
        outcome
    }
}
