//! Compass directions for roof facet orientation.

const DIRECTIONS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point cardinal direction for a compass bearing in degrees.
///
/// Any real bearing is accepted; it is normalized into `[0, 360)`.
#[must_use]
pub fn degrees_to_cardinal(degrees: f64) -> &'static str {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % DIRECTIONS.len();
    DIRECTIONS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_points() {
        assert_eq!(degrees_to_cardinal(0.0), "N");
        assert_eq!(degrees_to_cardinal(90.0), "E");
        assert_eq!(degrees_to_cardinal(180.0), "S");
        assert_eq!(degrees_to_cardinal(270.0), "W");
    }

    #[test]
    fn wraps_and_rounds() {
        assert_eq!(degrees_to_cardinal(359.0), "N");
        assert_eq!(degrees_to_cardinal(-90.0), "W");
        assert_eq!(degrees_to_cardinal(720.0 + 45.0), "NE");
        assert_eq!(degrees_to_cardinal(200.0), "SSW");
    }
}
