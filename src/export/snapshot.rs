//! Snapshot export: hand the fully expanded, unfiltered form to a renderer
//! that produces a paginated document.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::model::{Header, Report, Section};
use crate::store::FormStore;
use crate::view::{ViewState, filtered_view};

use super::{CollaboratorError, ExportError};

/// Scale factor requested from the renderer.
pub const SNAPSHOT_SCALE: f32 = 2.0;

/// What the renderer is asked to draw.
#[derive(Debug)]
pub struct SnapshotRequest<'a> {
    pub report: &'a Report,
    /// Sections as displayed under `view`.
    pub sections: Vec<Arc<Section>>,
    pub view: &'a ViewState,
    pub scale: f32,
    pub file_name: String,
}

/// Turns the visible form into a paginated document.
pub trait SnapshotRenderer {
    /// Render and save the document. Returns where it was written.
    fn render(&self, request: &SnapshotRequest<'_>) -> Result<PathBuf, CollaboratorError>;
}

/// `Assessment_Report_<area>_<date>.pdf`, with whitespace and path
/// separators in the area replaced by underscores.
pub fn snapshot_file_name(header: &Header) -> String {
    let area: String = header
        .area_location
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("Assessment_Report_{area}_{}.pdf", header.assessment_date)
}

pub fn build_snapshot_request<'a>(
    report: &'a Report,
    view: &'a ViewState,
    scale: f32,
) -> SnapshotRequest<'a> {
    SnapshotRequest {
        report,
        sections: filtered_view(report, view.only_not_ok),
        view,
        scale,
        file_name: snapshot_file_name(&report.header),
    }
}

/// Validate, switch the view to export configuration, render, and restore
/// the view whatever the renderer did.
pub fn export_snapshot(
    store: &mut FormStore,
    renderer: &dyn SnapshotRenderer,
    scale: f32,
) -> Result<PathBuf, ExportError> {
    if store.view().is_exporting() {
        return Err(ExportError::Busy);
    }
    let validation = store.validate();
    if !validation.is_valid() {
        return Err(ExportError::Incomplete(validation));
    }

    let token = store
        .view_mut()
        .enter_export()
        .map_err(|_| ExportError::Busy)?;
    let rendered = {
        let request = build_snapshot_request(store.report(), store.view(), scale);
        renderer.render(&request)
    };
    store.view_mut().exit_export(token);

    match rendered {
        Ok(path) => {
            info!(path = %path.display(), "snapshot exported");
            Ok(path)
        }
        Err(e) => {
            warn!(error = %e, "snapshot renderer failed");
            Err(ExportError::Render(e))
        }
    }
}
