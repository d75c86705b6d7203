//! The fixed 16-colour palette shared by turfs and team chips.

use serde::{Deserialize, Deserializer, Serialize};

/// Palette entries as lowercase `#rrggbb`.
pub const PALETTE: [&str; 16] = [
    "#3b82f6", "#ef4444", "#22c55e", "#f59e0b", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
    "#6366f1", "#84cc16", "#06b6d4", "#e11d48", "#a855f7", "#10b981", "#eab308", "#64748b",
];

/// One entry of [`PALETTE`], serialized as its hex string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaletteColor(u8);

impl PaletteColor {
    /// Palette entry at `index`, or `None` if out of range.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < PALETTE.len() {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Cycles through the palette, e.g. to pick a colour for the n-th new
    /// turf.
    #[must_use]
    pub const fn nth(n: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self((n % PALETTE.len()) as u8)
    }

    /// Position in [`PALETTE`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// `#rrggbb` value.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        PALETTE[self.0 as usize]
    }

    /// Looks up a hex string (case-insensitive, `#` optional).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidColorError`] if the value is not a palette entry.
    pub fn parse(value: &str) -> Result<Self, InvalidColorError> {
        let trimmed = value.trim();
        let normalized = if trimmed.starts_with('#') {
            trimmed.to_ascii_lowercase()
        } else {
            format!("#{}", trimmed.to_ascii_lowercase())
        };
        PALETTE
            .iter()
            .position(|hex| *hex == normalized)
            .and_then(Self::from_index)
            .ok_or_else(|| InvalidColorError {
                value: value.to_string(),
            })
    }
}

impl std::fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

impl TryFrom<String> for PaletteColor {
    type Error = InvalidColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PaletteColor> for String {
    fn from(color: PaletteColor) -> Self {
        color.hex().to_string()
    }
}

/// Error returned when a colour is not one of the palette entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColorError {
    /// The rejected value.
    pub value: String,
}

impl std::fmt::Display for InvalidColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "colour {:?} is not in the turf palette", self.value)
    }
}

impl std::error::Error for InvalidColorError {}

/// Deserializes a palette colour, substituting the default for unknown or
/// missing values.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<PaletteColor, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| PaletteColor::parse(&value).ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_sixteen_unique_entries() {
        let mut entries = PALETTE.to_vec();
        entries.sort_unstable();
        entries.dedup();
        assert_eq!(entries.len(), 16);
    }

    #[test]
    fn parse_is_case_insensitive_and_hash_optional() {
        assert_eq!(PaletteColor::parse("EF4444").unwrap().index(), 1);
        assert_eq!(PaletteColor::parse(" #ef4444 ").unwrap().index(), 1);
        assert!(PaletteColor::parse("#000000").is_err());
    }

    #[test]
    fn nth_wraps_around() {
        assert_eq!(PaletteColor::nth(16), PaletteColor::nth(0));
        assert_eq!(PaletteColor::nth(17).hex(), PALETTE[1]);
    }

    #[test]
    fn strict_deserialize_rejects_unknown() {
        let result: Result<PaletteColor, _> = serde_json::from_value(serde_json::json!("#123456"));
        assert!(result.is_err());
    }
}
