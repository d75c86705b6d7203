//! Async orchestration: reloads, pin placement and mutations.
//!
//! Every mutation is followed by a full reload; rollups on turfs and team
//! members are server-computed and never patched locally.

use roofing_api_models::{
    CreateMemberRequest, CreatePinRequest, CreateTurfRequest, UpdateMemberRequest,
    UpdatePinRequest, UpdateTurfRequest,
};
use roofing_d2d_models::{MemberId, PaletteColor, PinId, PinStatus, TeamRole, TurfId};
use roofing_geocoder::ReverseGeocoder;
use roofing_geometry::LatLng;

use crate::manager::{D2dManager, DeletionTarget};
use crate::state::Dataset;
use crate::{BackendError, D2dBackend, D2dError};

/// What the "drop pin" form is pre-filled with.
#[derive(Debug, Clone, PartialEq)]
pub struct PinDraft {
    pub at: LatLng,
    /// Reverse-geocoded address, if any provider found one.
    pub address: Option<String>,
    /// First turf containing `at`, fixed at placement.
    pub turf_id: Option<TurfId>,
    pub turf_name: Option<String>,
}

/// User input from the "drop pin" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinForm {
    pub status: PinStatus,
    pub notes: Option<String>,
    pub knocked_by: Option<MemberId>,
    /// Replaces the geocoded address when set.
    pub address: Option<String>,
}

/// User input from the "save turf" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurfForm {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the next palette entry.
    pub color: Option<PaletteColor>,
    pub assigned_to: Option<MemberId>,
}

/// User input from the "add team member" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberForm {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: TeamRole,
    pub color: Option<PaletteColor>,
}

/// Fetches turfs, pins, team and stats concurrently.
///
/// # Errors
///
/// Returns the first [`BackendError`] any of the four requests produced.
pub async fn fetch_dataset<B: D2dBackend + ?Sized>(backend: &B) -> Result<Dataset, BackendError> {
    let (turfs, pins, team, stats) = futures::try_join!(
        backend.list_turfs(),
        backend.list_pins(),
        backend.list_team(),
        backend.stats(),
    )?;
    Ok(Dataset {
        turfs,
        pins,
        team,
        stats,
    })
}

/// Couples a [`D2dManager`] with its backend and reverse geocoder.
pub struct D2dController<B, G> {
    backend: B,
    geocoder: G,
    manager: D2dManager,
}

impl<B: D2dBackend, G: ReverseGeocoder> D2dController<B, G> {
    pub const fn new(backend: B, geocoder: G, manager: D2dManager) -> Self {
        Self {
            backend,
            geocoder,
            manager,
        }
    }

    #[must_use]
    pub const fn manager(&self) -> &D2dManager {
        &self.manager
    }

    pub const fn manager_mut(&mut self) -> &mut D2dManager {
        &mut self.manager
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Reloads everything and applies it if no newer load started.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::Backend`] if any request failed. Previously
    /// loaded data stays in place.
    pub async fn reload(&mut self) -> Result<(), D2dError> {
        let ticket = self.manager.state_mut().begin_load();
        match fetch_dataset(&self.backend).await {
            Ok(dataset) => {
                self.manager.state_mut().apply_load(ticket, Ok(dataset));
                Ok(())
            }
            Err(e) => {
                self.manager.state_mut().apply_load(ticket, Err(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Reloads after a write the backend already accepted. A failed reload
    /// is recorded in the load state and logged, never reported as a
    /// failure of the write.
    async fn reload_after_write(&mut self) {
        if let Err(e) = self.reload().await {
            log::warn!("Reload after a successful write failed: {e}");
        }
    }

    /// Resolves the address and containing turf for a new pin at `at`.
    ///
    /// Geocoding failures are logged and leave the address empty; the pin
    /// can still be placed.
    pub async fn prepare_pin(&self, at: LatLng) -> PinDraft {
        let address = match self.geocoder.reverse(at).await {
            Ok(found) => found.map(|g| g.address),
            Err(e) => {
                log::warn!("Reverse geocoding {},{} failed: {e}", at.lat, at.lng);
                None
            }
        };
        let turf = self.manager.state().containing_turf(at);

        PinDraft {
            at,
            address,
            turf_id: turf.map(|t| t.id),
            turf_name: turf.map(|t| t.name.clone()),
        }
    }

    /// Creates a pin from a draft and reloads.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::Backend`] if the create failed.
    pub async fn place_pin(
        &mut self,
        draft: PinDraft,
        form: PinForm,
    ) -> Result<Option<PinId>, D2dError> {
        let request = CreatePinRequest {
            lat: draft.at.lat,
            lng: draft.at.lng,
            address: non_blank(form.address).or(draft.address),
            status: form.status,
            turf_id: draft.turf_id,
            notes: non_blank(form.notes),
            knocked_by: form.knocked_by,
        };
        let id = self.backend.create_pin(&request).await?;
        log::info!("Placed pin {id:?} in turf {:?}", request.turf_id);
        self.reload_after_write().await;
        Ok(id)
    }

    /// Submits the pending polygon as a new turf.
    ///
    /// On failure the polygon stays pending so the form can be resubmitted.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::EmptyName`] for a blank name,
    /// [`D2dError::NothingPending`] if no polygon is waiting, or
    /// [`D2dError::Backend`] if the create failed.
    pub async fn save_turf(&mut self, form: TurfForm) -> Result<Option<TurfId>, D2dError> {
        let name = required_name(&form.name)?;
        let polygon = self.manager.take_pending_turf()?;

        let request = CreateTurfRequest {
            name,
            description: non_blank(form.description),
            polygon: polygon.vertices().to_vec(),
            center: polygon.center(),
            color: form
                .color
                .unwrap_or_else(|| PaletteColor::nth(self.manager.state().turfs().len())),
            assigned_to: form.assigned_to,
        };

        let id = match self.backend.create_turf(&request).await {
            Ok(id) => id,
            Err(e) => {
                log::error!("Saving turf {:?} failed: {e}", request.name);
                self.manager.restore_pending_turf(polygon);
                return Err(e.into());
            }
        };
        log::info!("Saved turf {:?} as {id:?}", request.name);
        self.reload_after_write().await;
        Ok(id)
    }

    /// Throws away the pending polygon.
    pub fn discard_turf(&mut self) -> bool {
        self.manager.discard_pending_turf()
    }

    /// Applies a partial turf edit.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::EmptyName`] if a blank name is supplied, or
    /// [`D2dError::Backend`].
    pub async fn edit_turf(
        &mut self,
        id: TurfId,
        mut changes: UpdateTurfRequest,
    ) -> Result<(), D2dError> {
        if let Some(name) = &changes.name {
            changes.name = Some(required_name(name)?);
        }
        if changes.is_empty() {
            return Ok(());
        }
        self.backend.update_turf(id, &changes).await?;
        self.reload().await
    }

    /// Sets a pin's knock outcome. The pin's turf is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::Backend`].
    pub async fn set_pin_status(&mut self, id: PinId, status: PinStatus) -> Result<(), D2dError> {
        self.update_pin(
            id,
            UpdatePinRequest {
                status: Some(status),
                ..UpdatePinRequest::default()
            },
        )
        .await
    }

    /// Records (or clears) who knocked a pin.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::Backend`].
    pub async fn assign_pin(
        &mut self,
        id: PinId,
        member: Option<MemberId>,
    ) -> Result<(), D2dError> {
        self.update_pin(
            id,
            UpdatePinRequest {
                knocked_by: Some(member),
                ..UpdatePinRequest::default()
            },
        )
        .await
    }

    /// Replaces a pin's notes; blank text clears them.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::Backend`].
    pub async fn set_pin_notes(&mut self, id: PinId, notes: Option<String>) -> Result<(), D2dError> {
        self.update_pin(
            id,
            UpdatePinRequest {
                notes: Some(non_blank(notes)),
                ..UpdatePinRequest::default()
            },
        )
        .await
    }

    async fn update_pin(&mut self, id: PinId, changes: UpdatePinRequest) -> Result<(), D2dError> {
        self.backend.update_pin(id, &changes).await?;
        self.reload().await
    }

    /// Adds a team member.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::EmptyName`] or [`D2dError::Backend`].
    pub async fn add_member(&mut self, form: MemberForm) -> Result<Option<MemberId>, D2dError> {
        let request = CreateMemberRequest {
            name: required_name(&form.name)?,
            email: non_blank(form.email),
            phone: non_blank(form.phone),
            role: form.role,
            color: form
                .color
                .unwrap_or_else(|| PaletteColor::nth(self.manager.state().team().len())),
        };
        let id = self.backend.create_member(&request).await?;
        log::info!("Added team member {:?} as {id:?}", request.name);
        self.reload_after_write().await;
        Ok(id)
    }

    /// Applies a partial team member edit.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::EmptyName`] or [`D2dError::Backend`].
    pub async fn edit_member(
        &mut self,
        id: MemberId,
        mut changes: UpdateMemberRequest,
    ) -> Result<(), D2dError> {
        if let Some(name) = &changes.name {
            changes.name = Some(required_name(name)?);
        }
        if changes.is_empty() {
            return Ok(());
        }
        self.backend.update_member(id, &changes).await?;
        self.reload().await
    }

    /// Issues the DELETE for the pending deletion and reloads.
    ///
    /// # Errors
    ///
    /// Returns [`D2dError::NothingPending`] without a prior request, or
    /// [`D2dError::Backend`] (the deletion stays pending).
    pub async fn confirm_deletion(&mut self) -> Result<DeletionTarget, D2dError> {
        let target = self.manager.take_pending_deletion()?;
        let result = match target {
            DeletionTarget::Turf(id) => self.backend.delete_turf(id).await,
            DeletionTarget::Pin(id) => self.backend.delete_pin(id).await,
            DeletionTarget::Member(id) => self.backend.delete_member(id).await,
        };
        if let Err(e) = result {
            log::error!("Deleting {target:?} failed: {e}");
            self.manager.request_deletion(target);
            return Err(e.into());
        }
        log::info!("Deleted {target:?}");
        self.reload_after_write().await;
        Ok(target)
    }

    /// Drops the pending deletion.
    pub fn cancel_deletion(&mut self) -> Option<DeletionTarget> {
        self.manager.cancel_deletion()
    }
}

fn required_name(name: &str) -> Result<String, D2dError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(D2dError::EmptyName)
    } else {
        Ok(trimmed.to_string())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
