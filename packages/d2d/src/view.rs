//! Pure view model for the map and sidebar.
//!
//! Everything here is recomputed from scratch after each state change;
//! nothing is diffed or patched in place.

use roofing_d2d_models::{
    D2dStats, MemberId, PinId, PinStatus, PinTally, TeamRole, Turf, TurfId,
};
use roofing_geometry::{BoundingBox, LatLng};
use serde::Serialize;

use crate::config::D2dConfig;
use crate::drawing::{DrawingSession, MIN_VERTICES};
use crate::state::{D2dState, LoadState};
use crate::tool::Tool;

/// A saved turf drawn as a filled polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurfOverlay {
    pub id: TurfId,
    pub name: String,
    pub color: &'static str,
    pub fill_opacity: f64,
    pub path: Vec<LatLng>,
    /// Where the name label sits.
    pub label_at: LatLng,
    pub assigned_name: Option<String>,
}

/// A pin drawn as a status-coloured marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinMarker {
    pub id: PinId,
    pub position: LatLng,
    pub status: PinStatus,
    pub color: &'static str,
    pub title: String,
}

/// How the camera is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Viewport {
    /// Fit these bounds.
    Fit { bounds: BoundingBox },
    /// Nothing to fit; use the configured default.
    Default { center: LatLng, zoom: u8 },
}

/// A numbered marker for a placed vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VertexMarker {
    /// 1-based.
    pub number: usize,
    pub position: LatLng,
}

/// In-progress polygon decorations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingOverlay {
    pub vertices: Vec<VertexMarker>,
    pub polyline: Vec<LatLng>,
    /// Translucent fill, present from three vertices on.
    pub preview: Option<Vec<LatLng>>,
    pub preview_fill_opacity: f64,
    pub banner: String,
    pub can_finish: bool,
}

/// The whole map surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub turfs: Vec<TurfOverlay>,
    pub pins: Vec<PinMarker>,
    pub viewport: Viewport,
    pub drawing: Option<DrawingOverlay>,
    /// Native double-click zoom; off while drawing.
    pub double_click_zoom: bool,
    pub tool: Tool,
    pub cursor: &'static str,
}

/// Builds the map view from state.
///
/// Turfs with fewer than three vertices are skipped (and logged); they
/// still count towards the fitted viewport.
#[must_use]
pub fn render(
    state: &D2dState,
    drawing: &DrawingSession,
    tool: Tool,
    config: &D2dConfig,
) -> MapView {
    let turfs = state
        .turfs()
        .iter()
        .filter_map(|turf| turf_overlay(turf, config.turf_fill_opacity))
        .collect();

    let pins = state
        .pins()
        .iter()
        .map(|pin| PinMarker {
            id: pin.id,
            position: pin.position(),
            status: pin.status,
            color: pin.status.marker_color(),
            title: pin
                .address
                .clone()
                .unwrap_or_else(|| pin.status.label().to_string()),
        })
        .collect();

    let points = state
        .turfs()
        .iter()
        .flat_map(|turf| turf.polygon.iter().copied())
        .chain(state.pins().iter().map(roofing_d2d_models::Pin::position));

    let viewport = BoundingBox::from_points(points).map_or(
        Viewport::Default {
            center: config.default_center,
            zoom: config.default_zoom,
        },
        |bounds| Viewport::Fit {
            bounds: bounds.padded(config.fit_padding),
        },
    );

    let drawing = drawing
        .is_drawing()
        .then(|| drawing_overlay(drawing.vertices(), config.preview_fill_opacity));

    MapView {
        turfs,
        pins,
        viewport,
        double_click_zoom: drawing.is_none(),
        drawing,
        tool,
        cursor: tool.cursor(),
    }
}

fn turf_overlay(turf: &Turf, fill_opacity: f64) -> Option<TurfOverlay> {
    if !turf.is_drawable() {
        log::warn!(
            "Not drawing turf {} ({}): {} vertices",
            turf.id,
            turf.name,
            turf.polygon.len()
        );
        return None;
    }

    Some(TurfOverlay {
        id: turf.id,
        name: turf.name.clone(),
        color: turf.color.hex(),
        fill_opacity,
        path: turf.polygon.clone(),
        label_at: turf.effective_center()?,
        assigned_name: turf.assigned_name.clone(),
    })
}

fn drawing_overlay(vertices: &[LatLng], preview_fill_opacity: f64) -> DrawingOverlay {
    let count = vertices.len();
    let can_finish = count >= MIN_VERTICES;
    let banner = match count {
        0 => "Click on the map to place the first point of the turf.".to_string(),
        n if n < MIN_VERTICES => format!(
            "{n} point{} placed. Add at least {} more.",
            if n == 1 { "" } else { "s" },
            MIN_VERTICES - n
        ),
        n => format!("{n} points placed. Double-click or press Finish to close the turf."),
    };

    DrawingOverlay {
        vertices: vertices
            .iter()
            .enumerate()
            .map(|(i, &position)| VertexMarker {
                number: i + 1,
                position,
            })
            .collect(),
        polyline: vertices.to_vec(),
        preview: can_finish.then(|| vertices.to_vec()),
        preview_fill_opacity,
        banner,
        can_finish,
    }
}

/// One line of the turf list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurfRow {
    pub id: TurfId,
    pub name: String,
    pub color: &'static str,
    pub assignee: Option<String>,
    pub counts: PinTally,
    pub center: Option<LatLng>,
}

/// One line of the team roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberRow {
    pub id: MemberId,
    pub name: String,
    pub role: TeamRole,
    pub color: &'static str,
    pub turf_count: u32,
    pub knock_count: u32,
    pub yes_count: u32,
}

/// Sidebar beside the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sidebar {
    pub stats: D2dStats,
    pub turfs: Vec<TurfRow>,
    pub team: Vec<MemberRow>,
    #[serde(skip)]
    pub load: LoadState,
}

/// Builds the sidebar from state.
#[must_use]
pub fn render_sidebar(state: &D2dState) -> Sidebar {
    let turfs = state
        .turfs()
        .iter()
        .map(|turf| TurfRow {
            id: turf.id,
            name: turf.name.clone(),
            color: turf.color.hex(),
            assignee: turf.assigned_name.clone().or_else(|| {
                turf.assigned_to
                    .and_then(|id| state.member(id))
                    .map(|member| member.name.clone())
            }),
            counts: PinTally {
                yes: turf.yes_count,
                no: turf.no_count,
                no_answer: turf.no_answer_count,
                not_knocked: turf.not_knocked_count,
            },
            center: turf.effective_center(),
        })
        .collect();

    let team = state
        .team()
        .iter()
        .map(|member| MemberRow {
            id: member.id,
            name: member.name.clone(),
            role: member.role,
            color: member.color.hex(),
            turf_count: member.turf_count,
            knock_count: member.knock_count,
            yes_count: member.yes_count,
        })
        .collect();

    Sidebar {
        stats: *state.stats(),
        turfs,
        team,
        load: state.load_state().clone(),
    }
}

#[cfg(test)]
mod tests {
    use roofing_d2d_models::{PaletteColor, TeamMember};

    use super::*;
    use crate::state::Dataset;
    use crate::state::tests::{pin_at, square_turf};

    fn state_with(dataset: Dataset) -> D2dState {
        let mut state = D2dState::default();
        let ticket = state.begin_load();
        state.apply_load(ticket, Ok(dataset));
        state
    }

    #[test]
    fn empty_state_uses_default_viewport() {
        let config = D2dConfig::default();
        let view = render(
            &D2dState::default(),
            &DrawingSession::default(),
            Tool::Pointer,
            &config,
        );

        assert_eq!(
            view.viewport,
            Viewport::Default {
                center: config.default_center,
                zoom: config.default_zoom,
            }
        );
        assert!(view.turfs.is_empty());
        assert!(view.drawing.is_none());
        assert!(view.double_click_zoom);
    }

    #[test]
    fn fits_turfs_and_pins() {
        let config = D2dConfig {
            fit_padding: 0.0,
            ..D2dConfig::default()
        };
        let state = state_with(Dataset {
            turfs: vec![square_turf(1, 0.0, 0.0, 1.0)],
            pins: vec![pin_at(1, LatLng::new(3.0, -2.0), None)],
            ..Dataset::default()
        });

        let view = render(&state, &DrawingSession::default(), Tool::Pointer, &config);
        assert_eq!(
            view.viewport,
            Viewport::Fit {
                bounds: BoundingBox::new(-2.0, 0.0, 1.0, 3.0),
            }
        );
    }

    #[test]
    fn degenerate_turf_is_skipped() {
        let mut broken = square_turf(2, 0.0, 0.0, 1.0);
        broken.polygon.truncate(2);
        let state = state_with(Dataset {
            turfs: vec![square_turf(1, 0.0, 0.0, 1.0), broken],
            ..Dataset::default()
        });

        let view = render(
            &state,
            &DrawingSession::default(),
            Tool::Pointer,
            &D2dConfig::default(),
        );
        assert_eq!(view.turfs.len(), 1);
        assert_eq!(view.turfs[0].id, 1);
        assert_eq!(view.turfs[0].label_at, LatLng::new(0.5, 0.5));
    }

    #[test]
    fn pins_are_coloured_by_status() {
        let mut yes = pin_at(1, LatLng::new(0.0, 0.0), None);
        yes.status = PinStatus::Yes;
        let state = state_with(Dataset {
            pins: vec![yes, pin_at(2, LatLng::new(1.0, 1.0), None)],
            ..Dataset::default()
        });

        let view = render(
            &state,
            &DrawingSession::default(),
            Tool::Pin,
            &D2dConfig::default(),
        );
        assert_eq!(view.pins[0].color, "#22c55e");
        assert_eq!(view.pins[1].color, "#9ca3af");
        assert_eq!(view.cursor, "crosshair");
    }

    #[test]
    fn drawing_overlay_previews_from_three_vertices() {
        let mut drawing = DrawingSession::default();
        drawing.begin();
        drawing.add_vertex(LatLng::new(0.0, 0.0));
        drawing.add_vertex(LatLng::new(0.0, 1.0));

        let config = D2dConfig::default();
        let view = render(&D2dState::default(), &drawing, Tool::Turf, &config);
        let overlay = view.drawing.as_ref().unwrap();
        assert!(!view.double_click_zoom);
        assert_eq!(overlay.polyline.len(), 2);
        assert!(overlay.preview.is_none());
        assert!(!overlay.can_finish);
        assert_eq!(overlay.vertices[1].number, 2);

        drawing.add_vertex(LatLng::new(1.0, 1.0));
        let view = render(&D2dState::default(), &drawing, Tool::Turf, &config);
        let overlay = view.drawing.unwrap();
        assert_eq!(overlay.preview.map(|p| p.len()), Some(3));
        assert!(overlay.can_finish);
    }

    #[test]
    fn sidebar_resolves_assignee_from_roster() {
        let mut turf = square_turf(1, 0.0, 0.0, 1.0);
        turf.assigned_to = Some(8);
        turf.yes_count = 2;
        let member = TeamMember {
            id: 8,
            name: "Dana".to_string(),
            email: None,
            phone: None,
            role: TeamRole::Salesperson,
            color: PaletteColor::nth(3),
            turf_count: 1,
            knock_count: 5,
            yes_count: 2,
        };
        let state = state_with(Dataset {
            turfs: vec![turf],
            team: vec![member],
            ..Dataset::default()
        });

        let sidebar = render_sidebar(&state);
        assert_eq!(sidebar.turfs[0].assignee.as_deref(), Some("Dana"));
        assert_eq!(sidebar.turfs[0].counts.total(), 2);
        assert_eq!(sidebar.team[0].knock_count, 5);
        assert_eq!(sidebar.load, LoadState::Loaded);
    }
}
