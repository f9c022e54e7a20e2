//! Outcome: the judgment recorded for one occurrence.

use std::fmt;

use serde::Serialize;

/// The judgment recorded for an occurrence.
///
/// `Unset` is the absence of a decision and the only state that fails
/// validation on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Ok,
    NotOk,
    NotApplicable,
    #[default]
    Unset,
}

impl Outcome {
    /// Every outcome, in display order.
    pub const ALL: [Outcome; 4] = [
        Outcome::Ok,
        Outcome::NotOk,
        Outcome::NotApplicable,
        Outcome::Unset,
    ];

    /// The outcome after a user presses `pressed` while `self` is recorded.
    ///
    /// Pressing the recorded outcome again clears it.
    pub fn toggled(self, pressed: Outcome) -> Outcome {
        if self == pressed {
            Outcome::Unset
        } else {
            pressed
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Ok => "OK",
            Outcome::NotOk => "Not OK",
            Outcome::NotApplicable => "N/A",
            Outcome::Unset => "-",
        };
        f.write_str(label)
    }
}
