//! Toolbar modes.

use serde::{Deserialize, Serialize};

/// What a map click does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Clicks open info panels for existing turfs and pins.
    #[default]
    Pointer,
    /// Clicks place a new pin.
    Pin,
    /// Clicks add vertices to a new turf polygon.
    Turf,
}

impl Tool {
    /// Toolbar label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pointer => "Select",
            Self::Pin => "Drop Pin",
            Self::Turf => "Draw Turf",
        }
    }

    /// Map cursor while this tool is active.
    #[must_use]
    pub const fn cursor(self) -> &'static str {
        match self {
            Self::Pointer => "default",
            Self::Pin | Self::Turf => "crosshair",
        }
    }
}
