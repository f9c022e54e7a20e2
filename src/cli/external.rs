//! External collaborators: the snapshot command and the mail opener.
//!
//! Both are plain processes. The snapshot command reads the rendered form on
//! stdin and gets the output file name as its last argument; the mail opener
//! gets the `mailto:` URL.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::export::{CollaboratorError, MailComposer, MailDraft, SnapshotRenderer, SnapshotRequest};

use super::format::format_snapshot;

/// Renders snapshots by piping the form into a configured command.
pub(super) struct CommandRenderer {
    command: Vec<String>,
}

impl CommandRenderer {
    pub(super) fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl SnapshotRenderer for CommandRenderer {
    fn render(&self, request: &SnapshotRequest<'_>) -> Result<PathBuf, CollaboratorError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(CollaboratorError::Unavailable(
                "no snapshot command configured (set [snapshot] command in config.toml)".into(),
            ));
        };

        debug!(
            program,
            file = %request.file_name,
            scale = request.scale,
            exporting = request.view.is_exporting(),
            "running snapshot command"
        );
        let mut child = Command::new(program)
            .args(args)
            .arg(&request.file_name)
            .env("CHECKLIST_SCALE", request.scale.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CollaboratorError::Unavailable(format!("failed to run {program}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(format_snapshot(request).as_bytes())?;
        }
        let output = child.wait_with_output()?;

        if output.status.success() {
            Ok(PathBuf::from(&request.file_name))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CollaboratorError::Failed(format!(
                "{program} failed: {}",
                stderr.trim()
            )))
        }
    }
}

/// Hands drafts to a program that opens `mailto:` URLs.
pub(super) struct CommandComposer {
    opener: String,
}

impl CommandComposer {
    pub(super) fn new(opener: String) -> Self {
        Self { opener }
    }
}

impl MailComposer for CommandComposer {
    fn compose(&self, draft: &MailDraft) -> Result<(), CollaboratorError> {
        let output = Command::new(&self.opener)
            .arg(draft.mailto_url())
            .output()
            .map_err(|e| {
                CollaboratorError::Unavailable(format!("failed to run {}: {e}", self.opener))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CollaboratorError::Failed(format!(
                "{} failed: {}",
                self.opener,
                stderr.trim()
            )))
        }
    }
}

/// Composer used when no opener is configured. The shell prints the
/// `mailto:` URL for the user to open.
pub(super) struct PrintOnly;

impl MailComposer for PrintOnly {
    fn compose(&self, _: &MailDraft) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
