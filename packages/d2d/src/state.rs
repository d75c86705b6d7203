//! Loaded collections and the load lifecycle.

use roofing_d2d_models::{D2dStats, MemberId, Pin, PinId, TeamMember, Turf, TurfId};
use roofing_geometry::{LatLng, TurfIndex};

/// Where the most recent reload stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A reload is in flight.
    Loading,
    /// The last reload succeeded.
    Loaded,
    /// The last reload failed. Previously loaded data is kept.
    Failed(String),
}

/// Issued by [`D2dState::begin_load`]; a response is only applied if its
/// ticket is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Everything a reload fetches.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub turfs: Vec<Turf>,
    pub pins: Vec<Pin>,
    pub team: Vec<TeamMember>,
    pub stats: D2dStats,
}

/// A pin whose stored turf no longer matches containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleAssignment {
    pub pin_id: PinId,
    /// `turf_id` recorded at placement.
    pub stored: Option<TurfId>,
    /// First turf containing the pin today.
    pub current: Option<TurfId>,
}

/// Page data as last loaded from the backend.
pub struct D2dState {
    turfs: Vec<Turf>,
    pins: Vec<Pin>,
    team: Vec<TeamMember>,
    stats: D2dStats,
    load: LoadState,
    generation: u64,
    index: TurfIndex<TurfId>,
}

impl Default for D2dState {
    fn default() -> Self {
        Self {
            turfs: Vec::new(),
            pins: Vec::new(),
            team: Vec::new(),
            stats: D2dStats::default(),
            load: LoadState::Idle,
            generation: 0,
            index: TurfIndex::build(std::iter::empty::<(TurfId, &[LatLng])>()),
        }
    }
}

impl D2dState {
    /// Starts a reload. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.load = LoadState::Loading;
        LoadTicket(self.generation)
    }

    /// Makes every outstanding ticket stale, e.g. when the page is left.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        if self.load == LoadState::Loading {
            self.load = LoadState::Idle;
        }
    }

    /// Applies a reload result. Returns `false` if the ticket was stale and
    /// the result was dropped.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Dataset, String>) -> bool {
        if ticket.0 != self.generation {
            log::debug!(
                "Discarding stale D2D load (generation {} < {})",
                ticket.0,
                self.generation
            );
            return false;
        }

        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} turfs, {} pins, {} team members",
                    dataset.turfs.len(),
                    dataset.pins.len(),
                    dataset.team.len()
                );
                self.replace(dataset);
                self.load = LoadState::Loaded;
            }
            Err(message) => {
                log::error!("D2D load failed: {message}");
                self.load = LoadState::Failed(message);
            }
        }
        true
    }

    fn replace(&mut self, dataset: Dataset) {
        self.index = TurfIndex::build(
            dataset
                .turfs
                .iter()
                .map(|turf| (turf.id, turf.polygon.as_slice())),
        );
        self.turfs = dataset.turfs;
        self.pins = dataset.pins;
        self.team = dataset.team;
        self.stats = dataset.stats;
    }

    #[must_use]
    pub fn turfs(&self) -> &[Turf] {
        &self.turfs
    }

    #[must_use]
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    #[must_use]
    pub fn team(&self) -> &[TeamMember] {
        &self.team
    }

    #[must_use]
    pub const fn stats(&self) -> &D2dStats {
        &self.stats
    }

    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load
    }

    #[must_use]
    pub fn turf(&self, id: TurfId) -> Option<&Turf> {
        self.turfs.iter().find(|turf| turf.id == id)
    }

    #[must_use]
    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.id == id)
    }

    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&TeamMember> {
        self.team.iter().find(|member| member.id == id)
    }

    /// First turf, in load order, whose polygon strictly contains `point`.
    #[must_use]
    pub fn containing_turf(&self, point: LatLng) -> Option<&Turf> {
        self.index
            .first_containing(point)
            .and_then(|id| self.turf(id))
    }

    /// Pins whose placement-time turf differs from current containment.
    ///
    /// Read-only: stored assignments are never rewritten.
    #[must_use]
    pub fn stale_assignments(&self) -> Vec<StaleAssignment> {
        self.pins
            .iter()
            .filter_map(|pin| {
                let current = self.index.first_containing(pin.position());
                (current != pin.turf_id).then_some(StaleAssignment {
                    pin_id: pin.id,
                    stored: pin.turf_id,
                    current,
                })
            })
            .collect()
    }
}
