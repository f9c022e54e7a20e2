//! Validation: is every recorded occurrence complete?
//!
//! An occurrence is complete when it has an outcome, and a `Not OK` outcome
//! also carries a description. Validation never fails; it reports what is
//! missing so the caller can decide what to block.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::model::{ItemInstance, OccurrenceKey, Outcome, Report};

/// Why an occurrence is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    /// No outcome recorded.
    Unset,

    /// `Not OK` without a description.
    MissingDescription,
}

pub fn check_instance(instance: &ItemInstance) -> Option<Problem> {
    match instance.outcome {
        Outcome::Unset => Some(Problem::Unset),
        Outcome::NotOk if instance.description.trim().is_empty() => {
            Some(Problem::MissingDescription)
        }
        _ => None,
    }
}

pub fn is_instance_valid(instance: &ItemInstance) -> bool {
    check_instance(instance).is_none()
}

/// Result of a full scan over a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Every incomplete occurrence.
    pub errors: BTreeSet<OccurrenceKey>,
    pub has_unset_outcomes: bool,
    pub has_missing_descriptions: bool,
    /// First section, in document order, holding an incomplete occurrence.
    pub first_invalid_section: Option<usize>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return f.write_str("Form is complete.");
        }
        writeln!(f, "Form is incomplete!")?;
        if self.has_unset_outcomes {
            writeln!(
                f,
                "- Please complete all assessment statuses (OK/Not OK/N/A)."
            )?;
        }
        if self.has_missing_descriptions {
            writeln!(
                f,
                "- Please fill in the description for all items with \"Not OK\" status."
            )?;
        }
        Ok(())
    }
}

/// Scan every occurrence of the report.
pub fn validate_report(report: &Report) -> Validation {
    let mut validation = Validation::default();

    for occurrence in report.occurrences() {
        let Some(problem) = check_instance(occurrence.instance) else {
            continue;
        };
        match problem {
            Problem::Unset => validation.has_unset_outcomes = true,
            Problem::MissingDescription => validation.has_missing_descriptions = true,
        }
        validation
            .first_invalid_section
            .get_or_insert(occurrence.path.section);
        validation.errors.insert(occurrence.key());
    }

    debug!(
        errors = validation.errors.len(),
        unset = validation.has_unset_outcomes,
        missing_descriptions = validation.has_missing_descriptions,
        "validated report"
    );
    validation
}
