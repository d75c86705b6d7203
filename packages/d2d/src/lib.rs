#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Door-to-door (D2D) territory manager.
//!
//! The manager owns a map view model, a three-mode toolbar (pointer, pin,
//! turf) and the turf / pin / team collections loaded from the backend.
//! Input arrives as [`manager::MapEvent`]s, output leaves as
//! [`manager::Effect`]s plus a [`view::MapView`] recomputed from state
//! after every change. [`controller::D2dController`] drives the async
//! side: reloads, reverse geocoding and mutations through a
//! [`D2dBackend`].

pub mod config;
pub mod controller;
pub mod debounce;
pub mod drawing;
pub mod export;
pub mod manager;
pub mod state;
pub mod tool;
pub mod view;

use async_trait::async_trait;
use roofing_api_models::{
    CreateMemberRequest, CreatePinRequest, CreateTurfRequest, UpdateMemberRequest,
    UpdatePinRequest, UpdateTurfRequest,
};
use roofing_d2d_models::{D2dStats, MemberId, Pin, PinId, TeamMember, Turf, TurfId};
use thiserror::Error;

pub use config::D2dConfig;
pub use controller::{D2dController, PinDraft, PinForm, TurfForm};
pub use manager::{D2dManager, DeletionTarget, Effect, MapEvent};
pub use state::{D2dState, Dataset, LoadState};
pub use tool::Tool;
pub use view::{MapView, render, render_sidebar};

/// Failures reported by a [`D2dBackend`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The session token was rejected (HTTP 401/403). The stored token has
    /// already been cleared; the user must log in again.
    #[error("Session expired")]
    SessionExpired,

    /// The backend answered but refused the operation.
    #[error("Rejected by server: {message}")]
    Rejected {
        /// Server-provided reason.
        message: String,
    },

    /// The request did not complete (network error, bad status, bad body).
    #[error("Request failed: {message}")]
    Transport {
        /// Description of what went wrong.
        message: String,
    },
}

/// Errors from D2D manager operations.
#[derive(Debug, Error)]
pub enum D2dError {
    /// A turf polygon needs at least three vertices.
    #[error("A turf needs at least 3 points (have {count})")]
    TooFewVertices {
        /// Vertices placed so far.
        count: usize,
    },

    /// Turf and team member names may not be blank.
    #[error("Name is required")]
    EmptyName,

    /// Finish was requested while not drawing.
    #[error("Not currently drawing a turf")]
    NotDrawing,

    /// Save or confirm was requested with nothing pending.
    #[error("No pending {what}")]
    NothingPending {
        /// What was expected to be pending.
        what: &'static str,
    },

    /// Backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl D2dError {
    /// Whether the caller should route the user back to login.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::Backend(BackendError::SessionExpired))
    }
}

/// The REST collaborator behind the D2D page.
///
/// Every mutation is a discrete call; the caller reloads afterwards.
#[async_trait]
pub trait D2dBackend: Send + Sync {
    /// `GET /api/d2d/turfs`
    async fn list_turfs(&self) -> Result<Vec<Turf>, BackendError>;

    /// `GET /api/d2d/pins`
    async fn list_pins(&self) -> Result<Vec<Pin>, BackendError>;

    /// `GET /api/d2d/team`
    async fn list_team(&self) -> Result<Vec<TeamMember>, BackendError>;

    /// `GET /api/d2d/stats`
    async fn stats(&self) -> Result<D2dStats, BackendError>;

    /// `POST /api/d2d/turfs`, returning the new ID if the server sent one.
    async fn create_turf(&self, turf: &CreateTurfRequest) -> Result<Option<TurfId>, BackendError>;

    /// `PUT /api/d2d/turfs/{id}`
    async fn update_turf(&self, id: TurfId, changes: &UpdateTurfRequest)
    -> Result<(), BackendError>;

    /// `DELETE /api/d2d/turfs/{id}` (the server cascades contained pins).
    async fn delete_turf(&self, id: TurfId) -> Result<(), BackendError>;

    /// `POST /api/d2d/pins`
    async fn create_pin(&self, pin: &CreatePinRequest) -> Result<Option<PinId>, BackendError>;

    /// `PUT /api/d2d/pins/{id}`
    async fn update_pin(&self, id: PinId, changes: &UpdatePinRequest) -> Result<(), BackendError>;

    /// `DELETE /api/d2d/pins/{id}`
    async fn delete_pin(&self, id: PinId) -> Result<(), BackendError>;

    /// `POST /api/d2d/team`
    async fn create_member(
        &self,
        member: &CreateMemberRequest,
    ) -> Result<Option<MemberId>, BackendError>;

    /// `PUT /api/d2d/team/{id}`
    async fn update_member(
        &self,
        id: MemberId,
        changes: &UpdateMemberRequest,
    ) -> Result<(), BackendError>;

    /// `DELETE /api/d2d/team/{id}`
    async fn delete_member(&self, id: MemberId) -> Result<(), BackendError>;
}
