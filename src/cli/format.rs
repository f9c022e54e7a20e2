//! Output formatting for CLI display.

use std::fmt::Write as _;

use crate::export::SnapshotRequest;
use crate::model::{AssessmentItem, Catalog, Header, Outcome, Report};
use crate::store::FormStore;
use crate::view::{Summary, Tally, summary_counts, visible_sections};

/// Render the form as the shell shows it: header, then every visible
/// section with its tally, expanded sections listing their instances.
pub(super) fn format_form(store: &FormStore) -> String {
    let report = store.report();
    let view = store.view();
    let summary = summary_counts(report);

    let mut out = format_header(&report.header);
    if view.only_not_ok {
        out.push_str("Filter: only \"Not OK\"\n");
    }
    out.push('\n');

    let sections = visible_sections(report, view);
    if sections.is_empty() {
        out.push_str("No items with \"Not OK\" status.\n");
        return out;
    }

    for visible in sections {
        let marker = if visible.expanded { 'v' } else { '>' };
        let tally = summary
            .sections
            .get(visible.index)
            .map_or(Tally::default(), |s| s.tally);
        let _ = writeln!(
            out,
            "[{}] {marker} {} ({}/{})",
            visible.index,
            visible.section.title,
            tally.decided(),
            tally.total()
        );
        if !visible.expanded {
            continue;
        }
        for item in &visible.section.items {
            format_item(&mut out, store, item);
        }
    }
    out
}

fn format_item(out: &mut String, store: &FormStore, item: &AssessmentItem) {
    let repeat = if item.repeatable { " (+)" } else { "" };
    let _ = writeln!(out, "    {} {}{repeat}", item.id, item.text);
    // `item` may be filtered; positions are always the report's.
    let report = store.report();
    let unfiltered = report.locate(&item.id).and_then(|at| report.item(at));
    for instance in &item.instances {
        let position = unfiltered
            .and_then(|i| i.position_of(instance.id))
            .unwrap_or_default();
        let flag = if store.is_flagged(&item.key(instance)) {
            "  ! incomplete"
        } else {
            ""
        };
        let _ = write!(out, "      #{position} [{}]", instance.outcome);
        if !instance.description.is_empty() {
            let _ = write!(out, " {}", instance.description);
        }
        if let Some(photo) = &instance.photo {
            let _ = write!(out, " (photo: {})", photo.file_name());
        }
        let _ = writeln!(out, "{flag}");
    }
}

fn format_header(header: &Header) -> String {
    format!(
        "Date: {}\nArea/Location: {}\nAssessor: {}\n",
        header.assessment_date, header.area_location, header.assessor_name
    )
}

pub(super) fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Overall: {}", format_tally(&summary.overall));
    for section in &summary.sections {
        let _ = writeln!(out, "  {}: {}", section.title, format_tally(&section.tally));
    }
    out
}

fn format_tally(tally: &Tally) -> String {
    Outcome::ALL
        .iter()
        .map(|&o| format!("{o} {}", tally.count(o)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn format_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for section in &catalog.sections {
        let _ = writeln!(out, "{}", section.title);
        for item in &section.items {
            let repeat = if item.repeatable { " (+)" } else { "" };
            let _ = writeln!(out, "  {} {}{repeat}", item.id, item.text);
        }
    }
    let _ = writeln!(
        out,
        "{} sections, {} items",
        catalog.sections.len(),
        catalog.item_count()
    );
    out
}

/// Markdown document handed to the snapshot command.
pub(super) fn format_snapshot(request: &SnapshotRequest<'_>) -> String {
    let Report {
        header, follow_up, ..
    } = request.report;

    let mut out = String::from("# Area Assessment Report\n\n");
    let _ = writeln!(out, "- **Date:** {}", header.assessment_date);
    let _ = writeln!(out, "- **Area/Location:** {}", header.area_location);
    let _ = writeln!(out, "- **Assessor:** {}\n", header.assessor_name);

    for section in &request.sections {
        let _ = writeln!(out, "## {}\n", section.title);
        for item in &section.items {
            let numbered = item.instances.len() > 1;
            for (n, instance) in item.instances.iter().enumerate() {
                let label = if numbered {
                    format!("{} {} #{}", item.id, item.text, n + 1)
                } else {
                    format!("{} {}", item.id, item.text)
                };
                let _ = write!(out, "- **{label}:** {}", instance.outcome);
                if !instance.description.is_empty() {
                    let _ = write!(out, " - {}", instance.description);
                }
                if let Some(photo) = &instance.photo {
                    let _ = write!(out, " (photo: {})", photo.file_name());
                }
                out.push('\n');
            }
        }
        out.push('\n');
    }

    out.push_str("## Notes & Follow-up\n\n");
    let _ = writeln!(out, "- **Summary:** {}", follow_up.summary);
    let _ = writeln!(out, "- **Recommendations:** {}", follow_up.recommendations);
    let _ = writeln!(out, "- **Person In Charge:** {}", follow_up.person_in_charge);
    let target = follow_up
        .target_date
        .map(|d| d.to_string())
        .unwrap_or_default();
    let _ = writeln!(out, "- **Target Completion Date:** {target}");
    out
}
