//! Event routing for the D2D map.
//!
//! [`D2dManager`] is a synchronous state machine: the host feeds it
//! [`MapEvent`]s and timer ticks, it answers with [`Effect`]s and exposes a
//! freshly rendered [`MapView`] after every change. It never performs I/O;
//! that is [`crate::controller::D2dController`]'s job.

use std::time::Instant;

use roofing_d2d_models::{MemberId, PinId, TurfId};
use roofing_geometry::LatLng;

use crate::config::D2dConfig;
use crate::debounce::ClickDebouncer;
use crate::drawing::{DrawingSession, DrawnPolygon};
use crate::state::D2dState;
use crate::tool::Tool;
use crate::view::{self, MapView, Sidebar};
use crate::D2dError;

/// Input from the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Click on empty map.
    Click(LatLng),
    /// Double click anywhere on the map.
    DoubleClick(LatLng),
    /// Click landing on a saved turf polygon.
    TurfClick {
        turf_id: TurfId,
        at: LatLng,
    },
    /// Click on a pin marker.
    PinClick {
        pin_id: PinId,
    },
}

/// Something the host should do in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenTurfInfo(TurfId),
    OpenPinInfo(PinId),
    /// Reverse geocode and show the placement form for a new pin.
    RequestPinPlacement(LatLng),
    /// Show the "save turf" form for a closed polygon.
    OpenSaveTurfForm(DrawnPolygon),
    VertexAdded {
        count: usize,
    },
    /// Ask the user to confirm before deleting.
    ConfirmDeletion(DeletionTarget),
    DrawingStarted,
    DrawingEnded,
    ShowError(String),
}

/// An entity awaiting delete confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionTarget {
    Turf(TurfId),
    Pin(PinId),
    Member(MemberId),
}

impl DeletionTarget {
    /// Confirmation prompt text.
    #[must_use]
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Turf(_) => "Delete this turf? All pins inside it will also be removed.",
            Self::Pin(_) => "Delete this pin?",
            Self::Member(_) => "Remove this team member?",
        }
    }
}

/// Owns tool mode, drawing progress, the click debouncer and loaded data.
pub struct D2dManager {
    config: D2dConfig,
    state: D2dState,
    tool: Tool,
    drawing: DrawingSession,
    debouncer: ClickDebouncer<LatLng>,
    pending_turf: Option<DrawnPolygon>,
    pending_deletion: Option<DeletionTarget>,
}

impl Default for D2dManager {
    fn default() -> Self {
        Self::new(D2dConfig::default())
    }
}

impl D2dManager {
    #[must_use]
    pub fn new(config: D2dConfig) -> Self {
        let debouncer = ClickDebouncer::new(config.debounce());
        Self {
            config,
            state: D2dState::default(),
            tool: Tool::default(),
            drawing: DrawingSession::default(),
            debouncer,
            pending_turf: None,
            pending_deletion: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &D2dConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &D2dState {
        &self.state
    }

    pub const fn state_mut(&mut self) -> &mut D2dState {
        &mut self.state
    }

    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    /// Vertices of the polygon being drawn.
    #[must_use]
    pub fn vertices(&self) -> &[LatLng] {
        self.drawing.vertices()
    }

    /// Switches toolbar mode. Selecting the turf tool starts a drawing;
    /// leaving it abandons one.
    pub fn select_tool(&mut self, tool: Tool) -> Vec<Effect> {
        if tool == Tool::Turf {
            return self.start_turf();
        }
        let effects = self.cancel_drawing();
        self.tool = tool;
        log::debug!("Tool changed to {tool:?}");
        effects
    }

    /// Enters drawing mode with no vertices.
    pub fn start_turf(&mut self) -> Vec<Effect> {
        self.debouncer.cancel_pending();
        self.drawing.begin();
        self.tool = Tool::Turf;
        log::debug!("Started drawing a turf");
        vec![Effect::DrawingStarted]
    }

    /// Routes one map event.
    ///
    /// A parked click whose window elapsed before `now` becomes a vertex
    /// first, even if the host has not ticked yet.
    pub fn handle(&mut self, event: MapEvent, now: Instant) -> Vec<Effect> {
        let mut effects = self.tick(now);
        effects.extend(self.route(event, now));
        effects
    }

    fn route(&mut self, event: MapEvent, now: Instant) -> Vec<Effect> {
        match event {
            MapEvent::Click(at) => self.click(at, now),
            MapEvent::DoubleClick(_) => {
                if self.drawing.is_drawing() {
                    self.finish_drawing(now)
                } else {
                    Vec::new()
                }
            }
            MapEvent::TurfClick { turf_id, at } => {
                if self.drawing.is_drawing() || self.tool == Tool::Pin {
                    self.click(at, now)
                } else {
                    vec![Effect::OpenTurfInfo(turf_id)]
                }
            }
            MapEvent::PinClick { pin_id } => match self.tool {
                Tool::Pointer => vec![Effect::OpenPinInfo(pin_id)],
                Tool::Pin | Tool::Turf => Vec::new(),
            },
        }
    }

    fn click(&mut self, at: LatLng, now: Instant) -> Vec<Effect> {
        if self.drawing.is_drawing() {
            if self.debouncer.schedule(at, now).is_some() {
                log::debug!("Superseded a pending vertex click");
            }
            return Vec::new();
        }
        match self.tool {
            Tool::Pin => vec![Effect::RequestPinPlacement(at)],
            Tool::Pointer | Tool::Turf => Vec::new(),
        }
    }

    /// Fires a debounced click whose window has elapsed.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let Some(at) = self.debouncer.fire(now) else {
            return Vec::new();
        };
        self.drawing
            .add_vertex(at)
            .map(|count| vec![Effect::VertexAdded { count }])
            .unwrap_or_default()
    }

    /// When [`Self::tick`] next has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Closes the polygon (Finish button or double click).
    ///
    /// A click whose window has elapsed by `now` is kept as a vertex. One
    /// still inside its window is dropped, so the second half of a double
    /// click never becomes a vertex. With fewer than three vertices the
    /// drawing stays open and an error is surfaced.
    pub fn finish_drawing(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = self.tick(now);
        self.debouncer.cancel_pending();
        match self.drawing.finish() {
            Ok(polygon) => {
                log::info!("Closed turf polygon with {} vertices", polygon.vertices().len());
                self.tool = Tool::Pointer;
                self.pending_turf = Some(polygon.clone());
                effects.extend([Effect::DrawingEnded, Effect::OpenSaveTurfForm(polygon)]);
            }
            Err(D2dError::NotDrawing) => {}
            Err(e) => effects.push(Effect::ShowError(e.to_string())),
        }
        effects
    }

    /// Abandons the drawing without opening a form.
    pub fn cancel_drawing(&mut self) -> Vec<Effect> {
        if !self.drawing.is_drawing() {
            return Vec::new();
        }
        self.debouncer.cancel_pending();
        let discarded = self.drawing.cancel();
        self.tool = Tool::Pointer;
        log::debug!("Cancelled drawing ({discarded} vertices discarded)");
        vec![Effect::DrawingEnded]
    }

    /// The closed polygon awaiting its save form.
    #[must_use]
    pub const fn pending_turf(&self) -> Option<&DrawnPolygon> {
        self.pending_turf.as_ref()
    }

    /// Removes the pending polygon for submission.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::NothingPending`] if no polygon is waiting.
    pub fn take_pending_turf(&mut self) -> Result<DrawnPolygon, D2dError> {
        self.pending_turf
            .take()
            .ok_or(D2dError::NothingPending { what: "turf" })
    }

    /// Puts a polygon back after a failed save so the form can be retried.
    pub fn restore_pending_turf(&mut self, polygon: DrawnPolygon) {
        self.pending_turf = Some(polygon);
    }

    /// Drops the pending polygon (save form cancelled).
    pub fn discard_pending_turf(&mut self) -> bool {
        self.pending_turf.take().is_some()
    }

    /// Holds `target` until confirmed or cancelled.
    pub fn request_deletion(&mut self, target: DeletionTarget) -> Vec<Effect> {
        self.pending_deletion = Some(target);
        vec![Effect::ConfirmDeletion(target)]
    }

    #[must_use]
    pub const fn pending_deletion(&self) -> Option<DeletionTarget> {
        self.pending_deletion
    }

    /// Removes the pending deletion for execution.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::NothingPending`] if nothing awaits confirmation.
    pub fn take_pending_deletion(&mut self) -> Result<DeletionTarget, D2dError> {
        self.pending_deletion
            .take()
            .ok_or(D2dError::NothingPending { what: "deletion" })
    }

    /// Drops the pending deletion.
    pub fn cancel_deletion(&mut self) -> Option<DeletionTarget> {
        self.pending_deletion.take()
    }

    /// Recomputes the map from current state.
    #[must_use]
    pub fn view(&self) -> MapView {
        view::render(&self.state, &self.drawing, self.tool, &self.config)
    }

    /// Recomputes the sidebar from current state.
    #[must_use]
    pub fn sidebar(&self) -> Sidebar {
        view::render_sidebar(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(250);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn place_vertex(manager: &mut D2dManager, at: LatLng, now: Instant) -> Instant {
        assert!(manager.handle(MapEvent::Click(at), now).is_empty());
        let due = now + WINDOW;
        let effects = manager.tick(due);
        assert!(matches!(effects.as_slice(), [Effect::VertexAdded { .. }]));
        due
    }

    #[test]
    fn click_waits_for_debounce_window() {
        let t0 = Instant::now();
        let mut manager = D2dManager::default();
        manager.start_turf();

        manager.handle(MapEvent::Click(LatLng::new(1.0, 1.0)), t0);
        assert!(manager.tick(t0 + ms(100)).is_empty());
        assert_eq!(manager.next_deadline(), Some(t0 + WINDOW));
        assert_eq!(
            manager.tick(t0 + WINDOW),
            vec![Effect::VertexAdded { count: 1 }]
        );
        assert_eq!(manager.vertices(), &[LatLng::new(1.0, 1.0)]);
    }

    #[test]
    fn click_then_double_click_finishes_without_extra_vertex() {
        let mut now = Instant::now();
        let mut manager = D2dManager::default();
        manager.start_turf();
        for (lat, lng) in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            now = place_vertex(&mut manager, LatLng::new(lat, lng), now + ms(10));
        }

        let corner = LatLng::new(1.0, 0.0);
        manager.handle(MapEvent::Click(corner), now + ms(10));
        let effects = manager.handle(MapEvent::DoubleClick(corner), now + ms(60));

        let finished: Vec<_> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::OpenSaveTurfForm(polygon) => Some(polygon),
                _ => None,
            })
            .collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].vertices().len(), 3);
        assert!(!manager.is_drawing());
        assert_eq!(manager.tool(), Tool::Pointer);

        assert!(manager.tick(now + ms(1000)).is_empty());
        assert_eq!(manager.pending_turf().map(|p| p.vertices().len()), Some(3));
    }

    #[test]
    fn double_click_with_too_few_vertices_keeps_drawing() {
        let t0 = Instant::now();
        let mut manager = D2dManager::default();
        manager.start_turf();
        let at = LatLng::new(1.0, 1.0);

        manager.handle(MapEvent::Click(at), t0);
        let effects = manager.handle(MapEvent::DoubleClick(at), t0 + ms(40));

        assert!(matches!(effects.as_slice(), [Effect::ShowError(msg)] if msg.contains('3')));
        assert!(manager.is_drawing());
        assert!(manager.vertices().is_empty());
        assert!(manager.tick(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn late_click_does_not_displace_elapsed_one() {
        let t0 = Instant::now();
        let mut manager = D2dManager::default();
        manager.start_turf();

        manager.handle(MapEvent::Click(LatLng::new(1.0, 1.0)), t0);
        assert_eq!(
            manager.handle(MapEvent::Click(LatLng::new(2.0, 2.0)), t0 + ms(400)),
            vec![Effect::VertexAdded { count: 1 }]
        );
        assert_eq!(
            manager.tick(t0 + ms(1000)),
            vec![Effect::VertexAdded { count: 2 }]
        );
        assert_eq!(
            manager.vertices(),
            &[LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)]
        );
    }

    #[test]
    fn finish_keeps_click_whose_window_elapsed() {
        let mut now = Instant::now();
        let mut manager = D2dManager::default();
        manager.start_turf();
        for (lat, lng) in [(0.0, 0.0), (0.0, 1.0)] {
            now = place_vertex(&mut manager, LatLng::new(lat, lng), now + ms(10));
        }

        manager.handle(MapEvent::Click(LatLng::new(1.0, 1.0)), now + ms(10));
        let effects = manager.finish_drawing(now + ms(500));

        assert!(matches!(
            effects.as_slice(),
            [
                Effect::VertexAdded { count: 3 },
                Effect::DrawingEnded,
                Effect::OpenSaveTurfForm(polygon),
            ] if polygon.vertices().len() == 3
        ));
        assert!(!manager.is_drawing());
    }

    #[test]
    fn turf_clicks_become_vertices_while_drawing() {
        let t0 = Instant::now();
        let mut manager = D2dManager::default();
        manager.start_turf();

        let at = LatLng::new(2.0, 2.0);
        assert!(manager.handle(MapEvent::TurfClick { turf_id: 4, at }, t0).is_empty());
        assert_eq!(manager.tick(t0 + WINDOW), vec![Effect::VertexAdded { count: 1 }]);
    }

    #[test]
    fn pointer_routes_to_info_panels() {
        let mut manager = D2dManager::default();
        let now = Instant::now();
        let at = LatLng::new(0.0, 0.0);

        assert!(manager.handle(MapEvent::Click(at), now).is_empty());
        assert_eq!(
            manager.handle(MapEvent::TurfClick { turf_id: 9, at }, now),
            vec![Effect::OpenTurfInfo(9)]
        );
        assert_eq!(
            manager.handle(MapEvent::PinClick { pin_id: 3 }, now),
            vec![Effect::OpenPinInfo(3)]
        );
    }

    #[test]
    fn pin_tool_requests_placement_and_ignores_pins() {
        let mut manager = D2dManager::default();
        manager.select_tool(Tool::Pin);
        let now = Instant::now();
        let at = LatLng::new(0.5, 0.5);

        assert_eq!(
            manager.handle(MapEvent::Click(at), now),
            vec![Effect::RequestPinPlacement(at)]
        );
        assert_eq!(
            manager.handle(MapEvent::TurfClick { turf_id: 1, at }, now),
            vec![Effect::RequestPinPlacement(at)]
        );
        assert!(manager.handle(MapEvent::PinClick { pin_id: 2 }, now).is_empty());
    }

    #[test]
    fn cancel_restores_pointer_without_form() {
        let t0 = Instant::now();
        let mut manager = D2dManager::default();
        manager.select_tool(Tool::Turf);
        place_vertex(&mut manager, LatLng::new(0.0, 0.0), t0);

        assert_eq!(manager.cancel_drawing(), vec![Effect::DrawingEnded]);
        assert_eq!(manager.tool(), Tool::Pointer);
        assert!(manager.pending_turf().is_none());
        assert!(manager.cancel_drawing().is_empty());
    }

    #[test]
    fn switching_tool_abandons_drawing() {
        let mut manager = D2dManager::default();
        manager.start_turf();
        let effects = manager.select_tool(Tool::Pin);
        assert_eq!(effects, vec![Effect::DrawingEnded]);
        assert_eq!(manager.tool(), Tool::Pin);
        assert!(!manager.is_drawing());
    }

    #[test]
    fn deletion_requires_confirmation() {
        let mut manager = D2dManager::default();
        assert!(manager.take_pending_deletion().is_err());

        let effects = manager.request_deletion(DeletionTarget::Pin(5));
        assert_eq!(effects, vec![Effect::ConfirmDeletion(DeletionTarget::Pin(5))]);
        assert_eq!(manager.cancel_deletion(), Some(DeletionTarget::Pin(5)));
        assert!(manager.take_pending_deletion().is_err());

        manager.request_deletion(DeletionTarget::Turf(1));
        assert_eq!(manager.take_pending_deletion().unwrap(), DeletionTarget::Turf(1));
    }
}
