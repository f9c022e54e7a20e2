//! View state: which sections are expanded and whether the not-OK filter is on.
//!
//! Exporting a snapshot needs a canonical view (everything expanded, no
//! filter). [`ViewState::enter_export`] switches to it and returns a token
//! holding the prior state; [`ViewState::exit_export`] consumes the token and
//! puts that state back.

use serde::Serialize;

/// Which sections are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "section", rename_all = "camelCase")]
pub enum SectionFocus {
    /// Exactly one section is open.
    Single(usize),

    /// Every section is closed.
    Collapsed,

    /// Every section is open. Used while exporting.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub focus: SectionFocus,
    /// Show only `Not OK` occurrences.
    pub only_not_ok: bool,
    exporting: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            focus: SectionFocus::Single(0),
            only_not_ok: false,
            exporting: false,
        }
    }
}

/// Another export is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("an export is already in progress")]
pub struct ExportBusy;

/// Prior view state captured by [`ViewState::enter_export`].
#[derive(Debug)]
#[must_use = "the view stays in export configuration until the token is passed to exit_export"]
pub struct RestoreToken {
    focus: SectionFocus,
    only_not_ok: bool,
}

impl ViewState {
    pub fn is_expanded(&self, section: usize) -> bool {
        match self.focus {
            SectionFocus::Single(open) => open == section,
            SectionFocus::Collapsed => false,
            SectionFocus::All => true,
        }
    }

    /// Accordion toggle: opening a section closes the others,
    /// toggling the open section closes it.
    pub fn toggle_section(&mut self, section: usize) {
        self.focus = match self.focus {
            SectionFocus::Single(open) if open == section => SectionFocus::Collapsed,
            _ => SectionFocus::Single(section),
        };
    }

    pub fn focus_section(&mut self, section: usize) {
        self.focus = SectionFocus::Single(section);
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Switch to export configuration.
    ///
    /// Fails without touching the view if an export is already in flight.
    pub fn enter_export(&mut self) -> Result<RestoreToken, ExportBusy> {
        if self.exporting {
            return Err(ExportBusy);
        }
        let token = RestoreToken {
            focus: self.focus,
            only_not_ok: self.only_not_ok,
        };
        self.exporting = true;
        self.focus = SectionFocus::All;
        self.only_not_ok = false;
        Ok(token)
    }

    /// Leave export configuration, restoring the state captured by `token`.
    pub fn exit_export(&mut self, token: RestoreToken) {
        self.focus = token.focus;
        self.only_not_ok = token.only_not_ok;
        self.exporting = false;
    }
}
