#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Domain types for the door-to-door (D2D) territory manager.
//!
//! A **turf** is a named polygon assigned to a team member, a **pin** is a
//! single address with a knock outcome, and a **team member** is a
//! salesperson or manager. Counters on turfs and members are rollups
//! computed by the backend and refreshed on every reload; they are never
//! maintained client-side.

pub mod palette;

use chrono::{DateTime, Utc};
use roofing_geometry::LatLng;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use palette::{InvalidColorError, PALETTE, PaletteColor};

/// Server-assigned turf identifier.
pub type TurfId = i64;
/// Server-assigned pin identifier.
pub type PinId = i64;
/// Server-assigned team member identifier.
pub type MemberId = i64;

/// Outcome of knocking on a door.
///
/// Transitions are unrestricted: any status may be set from any other.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PinStatus {
    /// Nobody has visited yet.
    #[default]
    NotKnocked,
    /// Homeowner is interested.
    Yes,
    /// Homeowner declined.
    No,
    /// Knocked, nobody answered.
    NoAnswer,
}

impl PinStatus {
    /// Marker colour used on the map.
    #[must_use]
    pub const fn marker_color(self) -> &'static str {
        match self {
            Self::Yes => "#22c55e",
            Self::No => "#ef4444",
            Self::NoAnswer => "#f59e0b",
            Self::NotKnocked => "#9ca3af",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotKnocked => "Not Knocked",
            Self::Yes => "Yes",
            Self::No => "No",
            Self::NoAnswer => "No Answer",
        }
    }

    /// Whether the door has been visited.
    #[must_use]
    pub const fn is_knocked(self) -> bool {
        !matches!(self, Self::NotKnocked)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::NotKnocked, Self::Yes, Self::No, Self::NoAnswer]
    }
}

/// Role of a team member.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TeamRole {
    /// Field canvasser.
    #[default]
    Salesperson,
    /// Assigns turfs and reviews results.
    Manager,
}

/// A named canvassing territory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turf {
    /// Server-assigned ID.
    pub id: TurfId,
    /// Display name.
    pub name: String,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered vertices. Stored by some backends as a JSON-encoded string.
    #[serde(default, deserialize_with = "deserialize_polygon")]
    pub polygon: Vec<LatLng>,
    /// Vertex-mean centre, if the backend stored one.
    #[serde(default)]
    pub center: Option<LatLng>,
    /// Fill and stroke colour.
    #[serde(default, deserialize_with = "palette::deserialize_lenient")]
    pub color: PaletteColor,
    /// Assigned team member.
    #[serde(default)]
    pub assigned_to: Option<MemberId>,
    /// Assigned team member's name, when joined by the backend.
    #[serde(default)]
    pub assigned_name: Option<String>,
    /// Pins in this turf with status `yes`.
    #[serde(default)]
    pub yes_count: u32,
    /// Pins in this turf with status `no`.
    #[serde(default)]
    pub no_count: u32,
    /// Pins in this turf with status `no_answer`.
    #[serde(default)]
    pub no_answer_count: u32,
    /// Pins in this turf with status `not_knocked`.
    #[serde(default)]
    pub not_knocked_count: u32,
}

impl Turf {
    /// Stored centre, falling back to the vertex mean.
    #[must_use]
    pub fn effective_center(&self) -> Option<LatLng> {
        self.center
            .or_else(|| roofing_geometry::centroid(&self.polygon))
    }

    /// Whether the polygon has enough vertices to be drawn.
    #[must_use]
    pub const fn is_drawable(&self) -> bool {
        self.polygon.len() >= 3
    }

    /// Sum of all per-status counters.
    #[must_use]
    pub const fn pin_total(&self) -> u32 {
        self.yes_count + self.no_count + self.no_answer_count + self.not_knocked_count
    }
}

/// A single canvassed address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Server-assigned ID.
    pub id: PinId,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Reverse-geocoded or user-edited address.
    #[serde(default)]
    pub address: Option<String>,
    /// Knock outcome.
    #[serde(default)]
    pub status: PinStatus,
    /// Turf that contained the pin when it was placed.
    #[serde(default)]
    pub turf_id: Option<TurfId>,
    /// Team member who recorded the knock.
    #[serde(default)]
    pub knocked_by: Option<MemberId>,
    /// Free text.
    #[serde(default)]
    pub notes: Option<String>,
    /// Set by the backend when the status leaves `not_knocked`.
    #[serde(default)]
    pub knocked_at: Option<DateTime<Utc>>,
}

impl Pin {
    /// Pin location.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A salesperson or manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Server-assigned ID.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Role.
    #[serde(default)]
    pub role: TeamRole,
    /// Chip colour.
    #[serde(default, deserialize_with = "palette::deserialize_lenient")]
    pub color: PaletteColor,
    /// Turfs assigned to this member.
    #[serde(default)]
    pub turf_count: u32,
    /// Knocks recorded by this member.
    #[serde(default)]
    pub knock_count: u32,
    /// `yes` outcomes recorded by this member.
    #[serde(default)]
    pub yes_count: u32,
}

/// Aggregate numbers shown above the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct D2dStats {
    /// Total pins.
    pub total_pins: u32,
    /// Pins with status `yes`.
    pub yes: u32,
    /// Pins with status `no`.
    pub no: u32,
    /// Pins with status `no_answer`.
    pub no_answer: u32,
    /// Pins with status `not_knocked`.
    pub not_knocked: u32,
    /// Number of turfs.
    pub turf_count: u32,
    /// Number of team members.
    pub team_count: u32,
}

impl D2dStats {
    /// Pins that have been knocked.
    #[must_use]
    pub const fn knocked(&self) -> u32 {
        self.yes + self.no + self.no_answer
    }

    /// Share of knocks that reached somebody (`yes` or `no`).
    #[must_use]
    pub fn contact_rate(&self) -> f64 {
        ratio(self.yes + self.no, self.knocked())
    }

    /// Share of knocks that ended in `yes`.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        ratio(self.yes, self.knocked())
    }
}

/// Per-status counts computed from a pin list.
///
/// Mirrors the backend's stats rollup so the header can be refreshed
/// locally after a status change without another round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PinTally {
    /// Pins with status `yes`.
    pub yes: u32,
    /// Pins with status `no`.
    pub no: u32,
    /// Pins with status `no_answer`.
    pub no_answer: u32,
    /// Pins with status `not_knocked`.
    pub not_knocked: u32,
}

impl PinTally {
    /// Counts statuses across `pins`.
    #[must_use]
    pub fn from_pins<'a, I>(pins: I) -> Self
    where
        I: IntoIterator<Item = &'a Pin>,
    {
        pins.into_iter().fold(Self::default(), |mut tally, pin| {
            match pin.status {
                PinStatus::Yes => tally.yes += 1,
                PinStatus::No => tally.no += 1,
                PinStatus::NoAnswer => tally.no_answer += 1,
                PinStatus::NotKnocked => tally.not_knocked += 1,
            }
            tally
        })
    }

    /// Total pins counted.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.yes + self.no + self.no_answer + self.not_knocked
    }

    /// Converts to stats, filling in turf and team counts.
    #[must_use]
    pub const fn into_stats(self, turf_count: u32, team_count: u32) -> D2dStats {
        D2dStats {
            total_pins: self.total(),
            yes: self.yes,
            no: self.no,
            no_answer: self.no_answer,
            not_knocked: self.not_knocked,
            turf_count,
            team_count,
        }
    }
}

fn ratio(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole)
    }
}

/// Accepts a vertex array, a JSON string holding one, or `null`.
///
/// An unparseable string yields an empty polygon, which is skipped at
/// render time rather than failing the whole turf list.
fn deserialize_polygon<'de, D>(deserializer: D) -> Result<Vec<LatLng>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPolygon {
        Vertices(Vec<LatLng>),
        Encoded(String),
    }

    Ok(match Option::<RawPolygon>::deserialize(deserializer)? {
        Some(RawPolygon::Vertices(vertices)) => vertices,
        Some(RawPolygon::Encoded(text)) => serde_json::from_str(&text).unwrap_or_default(),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_status_round_trips_through_strum_and_serde() {
        assert_eq!("no_answer".parse::<PinStatus>().unwrap(), PinStatus::NoAnswer);
        assert_eq!(PinStatus::NotKnocked.to_string(), "not_knocked");
        assert_eq!(
            serde_json::to_value(PinStatus::Yes).unwrap(),
            serde_json::json!("yes")
        );
    }

    #[test]
    fn marker_colors_are_distinct() {
        let mut colors: Vec<&str> = PinStatus::all().iter().map(|s| s.marker_color()).collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 4);
    }

    #[test]
    fn turf_accepts_json_encoded_polygon() {
        let turf: Turf = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "North Block",
            "polygon": "[{\"lat\":1.0,\"lng\":2.0},{\"lat\":1.0,\"lng\":3.0},{\"lat\":2.0,\"lng\":3.0}]",
            "color": "#22C55E",
            "yes_count": 3
        }))
        .unwrap();

        assert_eq!(turf.polygon.len(), 3);
        assert!(turf.is_drawable());
        assert_eq!(turf.color.hex(), "#22c55e");
        assert_eq!(turf.pin_total(), 3);
        assert!(turf.assigned_to.is_none());
    }

    #[test]
    fn turf_with_garbage_polygon_still_parses() {
        let turf: Turf = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Broken",
            "polygon": "not json",
            "color": "chartreuse"
        }))
        .unwrap();

        assert!(turf.polygon.is_empty());
        assert!(!turf.is_drawable());
        assert_eq!(turf.color, PaletteColor::default());
    }

    #[test]
    fn effective_center_falls_back_to_vertex_mean() {
        let turf: Turf = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "A",
            "polygon": [
                { "lat": 0.0, "lng": 0.0 },
                { "lat": 0.0, "lng": 2.0 },
                { "lat": 2.0, "lng": 2.0 },
                { "lat": 2.0, "lng": 0.0 }
            ]
        }))
        .unwrap();
        assert_eq!(turf.effective_center(), Some(LatLng::new(1.0, 1.0)));
    }

    #[test]
    fn pin_defaults_to_not_knocked() {
        let pin: Pin = serde_json::from_value(serde_json::json!({
            "id": 3, "lat": 53.5, "lng": -113.4
        }))
        .unwrap();
        assert_eq!(pin.status, PinStatus::NotKnocked);
        assert!(pin.turf_id.is_none());
    }

    #[test]
    fn tally_rates() {
        let pins: Vec<Pin> = [
            PinStatus::Yes,
            PinStatus::No,
            PinStatus::NoAnswer,
            PinStatus::NoAnswer,
            PinStatus::NotKnocked,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, status)| Pin {
            id: i64::try_from(i).unwrap(),
            lat: 0.0,
            lng: 0.0,
            address: None,
            status,
            turf_id: None,
            knocked_by: None,
            notes: None,
            knocked_at: None,
        })
        .collect();

        let stats = PinTally::from_pins(&pins).into_stats(2, 1);
        assert_eq!(stats.total_pins, 5);
        assert_eq!(stats.knocked(), 4);
        assert!((stats.contact_rate() - 0.5).abs() < 1e-12);
        assert!((stats.conversion_rate() - 0.25).abs() < 1e-12);
        assert!((D2dStats::default().conversion_rate()).abs() < f64::EPSILON);
    }
}
