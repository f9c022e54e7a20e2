//! Derived views over a report, and the view state that selects them.
//!
//! Projections never mutate the report. They share unchanged sections,
//! items and instances with it.

mod filter;
mod state;
mod summary;

pub use filter::{VisibleSection, filtered_view, visible_sections};
pub use state::{ExportBusy, RestoreToken, SectionFocus, ViewState};
pub use summary::{SectionTally, Summary, Tally, summary_counts};
