#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response bodies for `/api/d2d/*`.
//!
//! Update requests are partial: a field left as `None` is omitted from the
//! JSON body and the server leaves it untouched. Fields that can be
//! cleared use `Option<Option<T>>`, where `Some(None)` serializes as an
//! explicit `null`.

use roofing_d2d_models::{
    MemberId, PaletteColor, Pin, PinStatus, TeamMember, TeamRole, Turf, TurfId,
};
use roofing_geometry::LatLng;
use serde::{Deserialize, Serialize};

/// `POST /api/d2d/turfs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTurfRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub polygon: Vec<LatLng>,
    pub center: LatLng,
    pub color: PaletteColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<MemberId>,
}

/// `PUT /api/d2d/turfs/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTurfRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<PaletteColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<MemberId>>,
}

impl UpdateTurfRequest {
    /// Whether the request would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.assigned_to.is_none()
    }
}

/// `POST /api/d2d/pins`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePinRequest {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: PinStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turf_id: Option<TurfId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knocked_by: Option<MemberId>,
}

/// `PUT /api/d2d/pins/{id}`
///
/// Status, knocker and notes are independent; none of them touches the
/// pin's turf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePinRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PinStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knocked_by: Option<Option<MemberId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

/// `POST /api/d2d/team`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: TeamRole,
    pub color: PaletteColor,
}

/// `PUT /api/d2d/team/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<TeamRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<PaletteColor>,
}

impl UpdateMemberRequest {
    /// Whether the request would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.color.is_none()
    }
}

/// `GET /api/d2d/turfs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurfListResponse {
    #[serde(default)]
    pub turfs: Vec<Turf>,
}

/// `GET /api/d2d/pins`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinListResponse {
    #[serde(default)]
    pub pins: Vec<Pin>,
}

/// `GET /api/d2d/team`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamListResponse {
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

/// Envelope returned by every `POST`, `PUT` and `DELETE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    /// ID of a created entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationResponse {
    /// The server's reason for a failed mutation.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            Some(self.error.as_deref().unwrap_or("Request was not successful"))
        }
    }
}

/// Error body some endpoints send with a non-2xx status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_turf_serializes_palette_hex_and_skips_absent_fields() {
        let request = CreateTurfRequest {
            name: "North".to_string(),
            description: None,
            polygon: vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 1.0),
                LatLng::new(1.0, 1.0),
            ],
            center: LatLng::new(1.0 / 3.0, 2.0 / 3.0),
            color: PaletteColor::nth(0),
            assigned_to: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "North");
        assert_eq!(value["color"], PaletteColor::nth(0).hex());
        assert_eq!(value["polygon"].as_array().map(Vec::len), Some(3));
        assert!(value.get("description").is_none());
        assert!(value.get("assigned_to").is_none());
    }

    #[test]
    fn partial_update_distinguishes_clear_from_untouched() {
        let request = UpdatePinRequest {
            status: Some(PinStatus::NoAnswer),
            knocked_by: Some(None),
            notes: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "status": "no_answer", "knocked_by": null })
        );
        assert!(UpdateTurfRequest::default().is_empty());
    }

    #[test]
    fn member_update_clearing_email_is_not_empty() {
        assert!(UpdateMemberRequest::default().is_empty());
        let clear_email = UpdateMemberRequest {
            email: Some(None),
            ..UpdateMemberRequest::default()
        };
        assert!(!clear_email.is_empty());
        assert_eq!(
            serde_json::to_value(&clear_email).unwrap(),
            json!({ "email": null })
        );
    }

    #[test]
    fn mutation_response_reports_failure() {
        let ok: MutationResponse = serde_json::from_value(json!({ "success": true, "id": 42 })).unwrap();
        assert_eq!(ok.id, Some(42));
        assert_eq!(ok.failure_message(), None);

        let failed: MutationResponse =
            serde_json::from_value(json!({ "success": false, "error": "Turf name taken" })).unwrap();
        assert_eq!(failed.failure_message(), Some("Turf name taken"));

        let bare: MutationResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(bare.failure_message(), Some("Request was not successful"));
    }

    #[test]
    fn list_responses_tolerate_missing_keys() {
        let turfs: TurfListResponse = serde_json::from_value(json!({})).unwrap();
        assert!(turfs.turfs.is_empty());

        let team: TeamListResponse = serde_json::from_value(json!({
            "members": [{ "id": 1, "name": "Sam", "role": "manager", "color": "#3b82f6" }]
        }))
        .unwrap();
        assert_eq!(team.members[0].role, TeamRole::Manager);
    }
}
