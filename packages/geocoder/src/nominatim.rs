//! Nominatim / OpenStreetMap reverse geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum on
//! the public instance. Pin placement is paced by a human clicking, so no
//! throttle is applied here.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use roofing_geometry::LatLng;

use crate::{GeocodeError, GeocodingProvider, ReverseGeocoded};

/// Resolves a coordinate using the Nominatim `/reverse` endpoint.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn reverse(
    client: &reqwest::Client,
    base_url: &str,
    point: LatLng,
) -> Result<Option<ReverseGeocoded>, GeocodeError> {
    let lat = point.lat.to_string();
    let lon = point.lng.to_string();

    let resp = client
        .get(base_url)
        .query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("format", "jsonv2"),
            ("zoom", "18"),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim reverse response.
///
/// Nominatim answers `{"error": "Unable to geocode"}` for coordinates with
/// nothing nearby; that is a miss, not a failure.
fn parse_response(body: &serde_json::Value) -> Result<Option<ReverseGeocoded>, GeocodeError> {
    if body.get("error").is_some() {
        return Ok(None);
    }

    let lat = body["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = body["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let Some(display_name) = body["display_name"].as_str() else {
        return Ok(None);
    };

    Ok(Some(ReverseGeocoded {
        latitude: lat,
        longitude: lon,
        address: display_name.to_string(),
        provider: GeocodingProvider::Nominatim,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!({
            "lat": "53.5461",
            "lon": "-113.4938",
            "display_name": "10220, 104 Avenue NW, Edmonton, Alberta, Canada"
        });
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude - 53.5461).abs() < 1e-4);
        assert!((result.longitude - -113.4938).abs() < 1e-4);
        assert_eq!(result.provider, GeocodingProvider::Nominatim);
        assert!(result.address.starts_with("10220"));
    }

    #[test]
    fn unable_to_geocode_is_a_miss() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn missing_coordinates_is_an_error() {
        let body = serde_json::json!({ "display_name": "Somewhere" });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
