//! Core data model for checklist reports.
//!
//! The catalog describes what can be assessed; a report records what was
//! found. Everything here is plain data plus construction of the initial
//! document.

mod catalog;
mod outcome;
mod photo;
mod report;

pub use catalog::{Catalog, CatalogError, CatalogItem, CatalogSection};
pub use outcome::Outcome;
pub use photo::{Photo, PhotoError};
pub use report::{
    AssessmentItem, FollowUp, Header, InstanceId, InstancePath, ItemInstance, ItemPath,
    Occurrence, OccurrenceKey, Report, Section,
};
