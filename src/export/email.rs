//! Email export: a plain-text summary of `Not OK` findings and follow-up notes.

use std::fmt::Write as _;

use tracing::info;

use crate::model::{Header, Outcome, Report};
use crate::store::FormStore;

use super::{CollaboratorError, ExportError};

/// Recipient offered when the user has not chosen one.
pub const DEFAULT_RECIPIENT: &str = "area.report@example.com";

/// Line emitted in place of the findings when nothing is `Not OK`.
pub const NO_NOT_OK_ITEMS: &str = "No items with \"Not OK\" status.";

const RULE: &str = "--------------------------------------";

/// Everything a mail client needs to open a pre-filled message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    /// `mailto:` URL with subject and body percent-encoded.
    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.recipient,
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}

/// Hands a draft to an external mail client.
pub trait MailComposer {
    fn compose(&self, draft: &MailDraft) -> Result<(), CollaboratorError>;
}

pub fn email_subject(header: &Header) -> String {
    format!(
        "Area Assessment Report - {} - {}",
        header.area_location, header.assessment_date
    )
}

/// Render the email body.
///
/// Sections without `Not OK` occurrences are left out. An item with several
/// occurrences has each one numbered from 1.
pub fn build_email_body(report: &Report) -> String {
    let Report {
        header, follow_up, ..
    } = report;

    let mut body = String::from("Area Assessment Report\n\n");
    let _ = writeln!(body, "Date: {}", header.assessment_date);
    let _ = writeln!(body, "Area/Location: {}", header.area_location);
    let _ = writeln!(body, "Assessor: {}\n", header.assessor_name);
    let _ = writeln!(body, "{RULE}\n");
    body.push_str("SUMMARY OF \"NOT OK\" ITEMS\n\n");

    let mut any_not_ok = false;
    for section in &report.sections {
        let findings: Vec<_> = section
            .items
            .iter()
            .flat_map(|item| {
                let numbered = item.instances.len() > 1;
                item.instances
                    .iter()
                    .enumerate()
                    .filter(|(_, i)| i.outcome == Outcome::NotOk)
                    .map(move |(n, instance)| {
                        let text = if numbered {
                            format!("{} #{}", item.text, n + 1)
                        } else {
                            item.text.clone()
                        };
                        (text, instance.description.as_str())
                    })
            })
            .collect();
        if findings.is_empty() {
            continue;
        }

        any_not_ok = true;
        let _ = writeln!(body, "SECTION: {}", section.title);
        for (text, description) in findings {
            let _ = writeln!(body, "- Item: {text}");
            let _ = writeln!(body, "  Description: {description}\n");
        }
    }

    if !any_not_ok {
        let _ = writeln!(body, "{NO_NOT_OK_ITEMS}\n");
    }

    let _ = writeln!(body, "{RULE}\n");
    body.push_str("NOTES & FOLLOW-UP\n\n");
    let _ = writeln!(body, "Summary: {}", follow_up.summary);
    let _ = writeln!(body, "Recommendations: {}", follow_up.recommendations);
    let _ = writeln!(body, "Person In Charge: {}", follow_up.person_in_charge);
    let target = follow_up
        .target_date
        .map(|d| d.to_string())
        .unwrap_or_default();
    let _ = writeln!(body, "Target Completion Date: {target}");
    body
}

/// Validate, build the draft, and hand it to the composer.
pub fn export_email(
    store: &mut FormStore,
    recipient: &str,
    composer: &dyn MailComposer,
) -> Result<MailDraft, ExportError> {
    let validation = store.validate();
    if !validation.is_valid() {
        return Err(ExportError::Incomplete(validation));
    }

    let report = store.report();
    let draft = MailDraft {
        recipient: recipient.to_string(),
        subject: email_subject(&report.header),
        body: build_email_body(report),
    };
    composer.compose(&draft).map_err(ExportError::Compose)?;
    info!(recipient, "email draft handed to composer");
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use jiff::civil::date;

    use crate::model::{Catalog, InstancePath, ItemPath};
    use crate::store::edit::{FollowUpEdit, HeaderEdit};

    fn at(section: usize, item: usize, instance: usize) -> InstancePath {
        InstancePath {
            section,
            item,
            instance,
        }
    }

    fn store() -> FormStore {
        FormStore::with_clock(Catalog::builtin(), || date(2026, 3, 14))
    }

    fn complete(store: &mut FormStore) {
        let sections = store.report().sections.clone();
        for (s, section) in sections.iter().enumerate() {
            for (i, item) in section.items.iter().enumerate() {
                for n in 0..item.instances.len() {
                    store.toggle_outcome(at(s, i, n), Outcome::Ok).unwrap();
                }
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        drafts: RefCell<Vec<MailDraft>>,
    }

    impl MailComposer for Recorder {
        fn compose(&self, draft: &MailDraft) -> Result<(), CollaboratorError> {
            self.drafts.borrow_mut().push(draft.clone());
            Ok(())
        }
    }

    struct Broken;

    impl MailComposer for Broken {
        fn compose(&self, _: &MailDraft) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::Unavailable("no mail client".into()))
        }
    }

    #[test]
    fn lists_not_ok_findings_per_section_in_order() {
        let mut store = store();
        store.toggle_outcome(at(0, 2, 0), Outcome::NotOk).unwrap();
        store.set_description(at(0, 2, 0), "A").unwrap();
        store.toggle_outcome(at(3, 1, 0), Outcome::NotOk).unwrap();
        store.set_description(at(3, 1, 0), "B").unwrap();

        let body = build_email_body(store.report());
        let first = body.find("SECTION: 1. Housekeeping & Cleanliness").unwrap();
        let a = body.find("  Description: A\n").unwrap();
        let second = body.find("SECTION: 4. Equipment & Operational Condition").unwrap();
        let b = body.find("  Description: B\n").unwrap();

        assert!(first < a && a < second && second < b);
        assert!(body.contains("- Item: Lantai & Tangga\n"));
        assert!(!body.contains(NO_NOT_OK_ITEMS));
        assert!(!body.contains("SECTION: 2."));
    }

    #[test]
    fn falls_back_when_nothing_is_not_ok() {
        let mut store = store();
        complete(&mut store);

        let body = build_email_body(store.report());
        assert!(body.contains("No items with \"Not OK\" status.\n"));
        assert!(!body.contains("SECTION:"));
    }

    #[test]
    fn numbers_occurrences_of_repeated_items() {
        let mut store = store();
        store.add_instance(ItemPath { section: 0, item: 0 }).unwrap();
        store.toggle_outcome(at(0, 0, 1), Outcome::NotOk).unwrap();
        store.set_description(at(0, 0, 1), "mould").unwrap();

        let body = build_email_body(store.report());
        assert!(body.contains("- Item: Dinding & Ventilasi #2\n  Description: mould\n"));
    }

    #[test]
    fn full_body_layout() {
        let mut store = store();
        store.set_header_field(HeaderEdit::AreaLocation("Kiln 2".into()));
        store.set_header_field(HeaderEdit::AssessorName("Rina".into()));
        store.set_follow_up_field(FollowUpEdit::Summary("Mostly fine".into()));
        store.set_follow_up_field(FollowUpEdit::TargetDate(Some(date(2026, 4, 1))));
        store.toggle_outcome(at(1, 0, 0), Outcome::NotOk).unwrap();
        store.set_description(at(1, 0, 0), "no helmets").unwrap();

        let expected = "Area Assessment Report\n\n\
            Date: 2026-03-14\n\
            Area/Location: Kiln 2\n\
            Assessor: Rina\n\n\
            --------------------------------------\n\n\
            SUMMARY OF \"NOT OK\" ITEMS\n\n\
            SECTION: 2. Occupational Health & Safety\n\
            - Item: Penggunaan APD\n  \
            Description: no helmets\n\n\
            --------------------------------------\n\n\
            NOTES & FOLLOW-UP\n\n\
            Summary: Mostly fine\n\
            Recommendations: \n\
            Person In Charge: \n\
            Target Completion Date: 2026-04-01\n";
        assert_eq!(build_email_body(store.report()), expected);
    }

    #[test]
    fn subject_and_mailto_are_encoded() {
        let mut store = store();
        store.set_header_field(HeaderEdit::AreaLocation("Kiln 2".into()));
        let draft = MailDraft {
            recipient: DEFAULT_RECIPIENT.into(),
            subject: email_subject(&store.report().header),
            body: "a&b\n".into(),
        };

        assert_eq!(draft.subject, "Area Assessment Report - Kiln 2 - 2026-03-14");
        assert_eq!(
            draft.mailto_url(),
            "mailto:area.report@example.com?subject=Area%20Assessment%20Report%20-%20Kiln%202%20-%202026-03-14&body=a%26b%0A"
        );
    }

    #[test]
    fn incomplete_form_blocks_email() {
        let mut store = store();
        let recorder = Recorder::default();

        let err = export_email(&mut store, DEFAULT_RECIPIENT, &recorder).unwrap_err();
        assert!(matches!(err, ExportError::Incomplete(ref v) if v.has_unset_outcomes));
        assert!(recorder.drafts.borrow().is_empty());
        assert!(!store.errors().is_empty());
    }

    #[test]
    fn complete_form_reaches_composer() {
        let mut store = store();
        complete(&mut store);
        let recorder = Recorder::default();

        let draft = export_email(&mut store, "hse@example.com", &recorder).unwrap();
        assert_eq!(draft.recipient, "hse@example.com");
        assert_eq!(recorder.drafts.borrow().as_slice(), &[draft]);
    }

    #[test]
    fn composer_failure_is_reported() {
        let mut store = store();
        complete(&mut store);

        let err = export_email(&mut store, DEFAULT_RECIPIENT, &Broken).unwrap_err();
        assert!(matches!(err, ExportError::Compose(_)));
    }
}
