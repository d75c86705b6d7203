//! Google Geocoding API reverse lookups (`latlng=`), used to address
//! newly placed pins.
//!
//! See <https://developers.google.com/maps/documentation/geocoding/requests-reverse-geocoding>

use roofing_geometry::LatLng;

use crate::{GeocodeError, GeocodingProvider, ReverseGeocoded};

/// Resolves a coordinate to its best formatted address.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the key is rejected,
/// or the quota is exhausted.
pub async fn reverse(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    point: LatLng,
) -> Result<Option<ReverseGeocoded>, GeocodeError> {
    let latlng = format!("{},{}", point.lat, point.lng);

    let body: serde_json::Value = client
        .get(base_url)
        .query(&[("latlng", latlng.as_str()), ("key", api_key)])
        .send()
        .await?
        .json()
        .await?;

    parse_response(&body)
}

/// Parses a Geocoding API response, taking the first result.
fn parse_response(body: &serde_json::Value) -> Result<Option<ReverseGeocoded>, GeocodeError> {
    match body["status"].as_str() {
        Some("OK") => {}
        Some("ZERO_RESULTS") => return Ok(None),
        Some("OVER_QUERY_LIMIT") => return Err(GeocodeError::RateLimited),
        Some("REQUEST_DENIED") => {
            return Err(GeocodeError::Config {
                message: body["error_message"]
                    .as_str()
                    .unwrap_or("request denied")
                    .to_string(),
            });
        }
        other => {
            return Err(GeocodeError::Parse {
                message: format!("Unexpected Google geocoder status: {other:?}"),
            });
        }
    }

    let Some(first) = body["results"].as_array().and_then(|r| r.first()) else {
        return Ok(None);
    };

    let location = &first["geometry"]["location"];
    let (Some(lat), Some(lng)) = (location["lat"].as_f64(), location["lng"].as_f64()) else {
        return Err(GeocodeError::Parse {
            message: "Missing geometry.location in Google response".to_string(),
        });
    };

    let address = first["formatted_address"]
        .as_str()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing formatted_address in Google response".to_string(),
        })?;

    Ok(Some(ReverseGeocoded {
        latitude: lat,
        longitude: lng,
        address: address.to_string(),
        provider: GeocodingProvider::Google,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_result() {
        let body = serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "formatted_address": "10220 104 Ave NW, Edmonton, AB T5J 0H6, Canada",
                    "geometry": { "location": { "lat": 53.5461, "lng": -113.4938 } }
                },
                {
                    "formatted_address": "Edmonton, AB, Canada",
                    "geometry": { "location": { "lat": 53.54, "lng": -113.49 } }
                }
            ]
        });
        let result = parse_response(&body).unwrap().unwrap();
        assert_eq!(result.provider, GeocodingProvider::Google);
        assert!(result.address.starts_with("10220 104 Ave"));
    }

    #[test]
    fn zero_results_is_a_miss() {
        let body = serde_json::json!({ "status": "ZERO_RESULTS", "results": [] });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn denied_key_is_a_config_error() {
        let body = serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Config { .. })
        ));
    }

    #[test]
    fn quota_is_rate_limited() {
        let body = serde_json::json!({ "status": "OVER_QUERY_LIMIT" });
        assert!(matches!(parse_response(&body), Err(GeocodeError::RateLimited)));
    }
}
