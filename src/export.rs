//! Report exports: a pre-filled email and a paginated snapshot.
//!
//! Both exports run a full validation first and refuse to proceed while the
//! form is incomplete. The mail composer and the snapshot renderer are
//! external; this module only prepares what they need and handles their
//! failures.

mod email;
mod snapshot;

pub use email::{
    DEFAULT_RECIPIENT, MailComposer, MailDraft, NO_NOT_OK_ITEMS, build_email_body, email_subject,
    export_email,
};
pub use snapshot::{
    SNAPSHOT_SCALE, SnapshotRenderer, SnapshotRequest, build_snapshot_request, export_snapshot,
    snapshot_file_name,
};

use crate::validate::Validation;

/// Errors raised by external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("not available: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The form has incomplete occurrences.
    #[error("{0}")]
    Incomplete(Validation),

    #[error("an export is already in progress")]
    Busy,

    #[error("Failed to export to PDF. Please try again.")]
    Render(#[source] CollaboratorError),

    #[error("failed to open mail composer: {0}")]
    Compose(#[source] CollaboratorError),
}
