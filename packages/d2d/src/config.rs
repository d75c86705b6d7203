//! Tunables for the D2D page.

use std::path::Path;
use std::time::Duration;

use roofing_geometry::LatLng;
use serde::Deserialize;

use crate::D2dError;

/// Page configuration, loadable from TOML. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct D2dConfig {
    /// How long a single click waits for a competing double click while
    /// drawing.
    pub debounce_ms: u64,
    /// Map centre when there is nothing to fit.
    pub default_center: LatLng,
    /// Map zoom when there is nothing to fit.
    pub default_zoom: u8,
    /// Extra margin around fitted bounds, as a fraction of their span.
    pub fit_padding: f64,
    /// Fill opacity of saved turf polygons.
    pub turf_fill_opacity: f64,
    /// Fill opacity of the in-progress preview polygon.
    pub preview_fill_opacity: f64,
}

impl Default for D2dConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            default_center: LatLng::new(53.5461, -113.4938),
            default_zoom: 12,
            fit_padding: 0.05,
            turf_fill_opacity: 0.25,
            preview_fill_opacity: 0.15,
        }
    }
}

impl D2dConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::Config`] if the document is malformed.
    pub fn from_toml_str(text: &str) -> Result<Self, D2dError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::Io`] if the file cannot be read or
    /// [`D2dError::Config`] if it is malformed.
    pub fn from_file(path: &Path) -> Result<Self, D2dError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Debounce window as a [`Duration`].
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
