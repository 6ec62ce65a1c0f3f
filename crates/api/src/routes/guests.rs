//! Guest lookup, update and RSVP endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use domain::{
    FieldError, GuestName, PartyMember, RsvpService, SubmitRsvp, UpdateRsvp, ValidationError,
};
use guest_store::{Guest, GuestStore, Rsvp, SecondaryGuest};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: GuestStore> {
    pub rsvp_service: RsvpService<S>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct GuestQuery {
    pub first_name: String,
    pub last_name: String,
}

impl GuestQuery {
    fn name(&self) -> Result<GuestName, ValidationError> {
        GuestName::parse(&self.first_name, &self.last_name)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateGuestRequest {
    pub first_name: String,
    pub last_name: String,
    pub rsvp: Rsvp,
    #[serde(default)]
    pub selection: i64,
}

impl UpdateGuestRequest {
    fn into_command(self) -> Result<UpdateRsvp, ValidationError> {
        UpdateRsvp::parse_at(
            "",
            &self.first_name,
            &self.last_name,
            self.rsvp,
            self.selection,
        )
        .map_err(ValidationError::new)
    }
}

#[derive(Debug, Deserialize)]
pub struct PersonRequest {
    pub first_name: String,
    pub last_name: String,
    pub rsvp: Rsvp,
    #[serde(default)]
    pub selection: i64,
}

impl PersonRequest {
    fn parse_at(&self, prefix: &str) -> Result<PartyMember, Vec<FieldError>> {
        PartyMember::parse_at(
            prefix,
            &self.first_name,
            &self.last_name,
            self.rsvp,
            self.selection,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    pub guest: PersonRequest,
    #[serde(default)]
    pub party: Vec<PersonRequest>,
}

impl RsvpRequest {
    /// Validates every person, collecting all field errors before failing.
    fn into_command(self) -> Result<SubmitRsvp, ValidationError> {
        let mut errors = Vec::new();
        let mut keep = |result: Result<PartyMember, Vec<FieldError>>| match result {
            Ok(member) => Some(member),
            Err(e) => {
                errors.extend(e);
                None
            }
        };

        let guest = keep(self.guest.parse_at("guest"));
        let party: Vec<PartyMember> = self
            .party
            .iter()
            .enumerate()
            .filter_map(|(i, person)| keep(person.parse_at(&format!("party.{i}"))))
            .collect();

        match guest {
            Some(guest) if errors.is_empty() => Ok(SubmitRsvp::new(guest, party)),
            _ => Err(ValidationError::new(errors)),
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct GuestResponse {
    pub guest_id: String,
    pub first_name: String,
    pub last_name: String,
    pub guest_type: String,
    pub avail_guests: i32,
    pub rsvp: Rsvp,
    pub selection: i16,
    pub updated_at: String,
}

impl From<Guest> for GuestResponse {
    fn from(guest: Guest) -> Self {
        Self {
            guest_id: guest.guest_id.to_string(),
            first_name: guest.first_name,
            last_name: guest.last_name,
            guest_type: guest.guest_type,
            avail_guests: guest.avail_guests,
            rsvp: guest.rsvp,
            selection: guest.selection,
            updated_at: guest.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SecondaryGuestResponse {
    pub guest_id: String,
    pub primary_guest_id: String,
    pub first_name: String,
    pub last_name: String,
    pub rsvp: Rsvp,
    pub selection: i16,
    pub created_at: String,
}

impl From<SecondaryGuest> for SecondaryGuestResponse {
    fn from(member: SecondaryGuest) -> Self {
        Self {
            guest_id: member.guest_id.to_string(),
            primary_guest_id: member.primary_guest_id.to_string(),
            first_name: member.first_name,
            last_name: member.last_name,
            rsvp: member.rsvp,
            selection: member.selection,
            created_at: member.created_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// GET /v1/guests — look up a primary guest by name.
#[tracing::instrument(skip(state, query))]
pub async fn get<S: GuestStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<GuestQuery>, QueryRejection>,
) -> Result<Json<GuestResponse>, ApiError> {
    let Query(query) = query?;
    let name = query.name()?;
    let guest = state.rsvp_service.lookup_guest(&name).await?;
    Ok(Json(guest.into()))
}

/// PUT /v1/guests — overwrite a guest's RSVP status.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: GuestStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    req: Result<Json<UpdateGuestRequest>, JsonRejection>,
) -> Result<Json<GuestResponse>, ApiError> {
    let Json(req) = req?;
    let guest = state.rsvp_service.update_rsvp(req.into_command()?).await?;
    Ok(Json(guest.into()))
}

/// POST /v1/guests/rsvp — record a primary guest's RSVP and their party.
#[tracing::instrument(skip(state, req))]
pub async fn submit_rsvp<S: GuestStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    req: Result<Json<RsvpRequest>, JsonRejection>,
) -> Result<Json<GuestResponse>, ApiError> {
    let Json(req) = req?;
    let guest = state.rsvp_service.submit_rsvp(req.into_command()?).await?;
    Ok(Json(guest.into()))
}

/// GET /v1/guests/party — list the party recorded for a primary guest.
#[tracing::instrument(skip(state, query))]
pub async fn party<S: GuestStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<GuestQuery>, QueryRejection>,
) -> Result<Json<Vec<SecondaryGuestResponse>>, ApiError> {
    let Query(query) = query?;
    let name = query.name()?;
    let party = state.rsvp_service.party_for(&name).await?;
    Ok(Json(party.into_iter().map(Into::into).collect()))
}
