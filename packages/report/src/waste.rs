//! Waste overage scenarios and roof complexity classes.

use serde::Serialize;

use crate::round1;

/// `(percent, factor, description)` for each overage scenario.
const WASTE_FACTORS: [(u32, f64, &str); 4] = [
    (5, 1.05, "Minimal waste (simple gable)"),
    (10, 1.10, "Standard waste (moderate complexity)"),
    (15, 1.15, "Above average (hips/valleys)"),
    (20, 1.20, "High waste (complex/cut-up roof)"),
];

/// Shingle bundles per roofing square.
const BUNDLES_PER_SQUARE: f64 = 3.0;

/// Square feet in one roofing square.
const SQFT_PER_SQUARE: f64 = 100.0;

/// One overage scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteRow {
    /// Overage percentage.
    pub waste_pct: u32,
    /// Area multiplier.
    pub factor: f64,
    /// When this overage applies.
    pub description: &'static str,
    /// Area including waste, rounded to whole square feet.
    pub gross_sqft: f64,
    /// Roofing squares, one decimal.
    pub squares: f64,
    /// Bundles to order.
    pub bundles: u32,
}

/// Material needed at 5, 10, 15 and 20 % overage for a true area.
#[must_use]
pub fn waste_table(total_sqft: f64) -> Vec<WasteRow> {
    WASTE_FACTORS
        .iter()
        .map(|&(waste_pct, factor, description)| {
            let gross_sqft = total_sqft * factor;
            let squares = gross_sqft / SQFT_PER_SQUARE;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bundles = (squares * BUNDLES_PER_SQUARE).ceil().max(0.0) as u32;
            WasteRow {
                waste_pct,
                factor,
                description,
                gross_sqft: gross_sqft.round(),
                squares: round1(squares),
                bundles,
            }
        })
        .collect()
}

/// How cut-up a roof is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityClass {
    /// One or two planes, no valleys.
    Simple,
    /// A few planes or hips.
    Moderate,
    /// Several planes with valleys.
    Complex,
    /// Many planes, valleys and mixed pitches.
    VeryComplex,
}

impl ComplexityClass {
    /// Labour and material factor for this class.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Simple => 1.0,
            Self::Moderate => 1.05,
            Self::Complex => 1.10,
            Self::VeryComplex => 1.15,
        }
    }

    /// Suggested waste percentage.
    #[must_use]
    pub const fn waste_pct(self) -> u32 {
        match self {
            Self::Simple => 10,
            Self::Moderate => 12,
            Self::Complex => 14,
            Self::VeryComplex => 15,
        }
    }
}

/// Scores roof structure into a [`ComplexityClass`].
///
/// Planes add up to 3 points, hips 1 each (max 4), valleys 2 each (max 6),
/// and pitch spread over 5° / 10° adds 1 / 2.
#[must_use]
pub fn classify_complexity(
    segment_count: usize,
    hip_count: u32,
    valley_count: u32,
    pitch_variation: f64,
) -> ComplexityClass {
    let mut score = match segment_count {
        0..=2 => 0,
        3..=4 => 1,
        5..=6 => 2,
        _ => 3,
    };

    score += hip_count.min(4);
    score += valley_count.saturating_mul(2).min(6);

    if pitch_variation > 10.0 {
        score += 2;
    } else if pitch_variation > 5.0 {
        score += 1;
    }

    match score {
        0..=2 => ComplexityClass::Simple,
        3..=5 => ComplexityClass::Moderate,
        6..=8 => ComplexityClass::Complex,
        _ => ComplexityClass::VeryComplex,
    }
}
