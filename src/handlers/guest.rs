use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::guest_identity::{self, ClientIdentity, GuestContactInfo};
use crate::utils::fingerprint::FingerprintSignals;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveSessionRequest {
    /// Whatever the client still has persisted; either may be missing.
    pub guest_id: Option<Uuid>,
    pub fingerprint: Option<String>,
    pub signals: Option<FingerprintSignals>,
}

#[derive(Debug, Serialize)]
pub struct GuestSessionResponse {
    pub guest_id: Option<Uuid>,
    pub fingerprint: Option<String>,
}

/// Resolve (or mint) the caller's anonymous guest identity. Always 200: a
/// null guest_id means "proceed without identity", never a hard error.
pub async fn resolve_session(
    State(state): State<AppState>,
    Json(payload): Json<ResolveSessionRequest>,
) -> AppResult<Json<GuestSessionResponse>> {
    let mut store = ClientIdentity {
        guest_id: payload.guest_id,
        fingerprint: payload.fingerprint,
    };

    let guest_id =
        guest_identity::resolve(&*state.db, &mut store, payload.signals.as_ref()).await;

    Ok(Json(GuestSessionResponse {
        guest_id,
        fingerprint: store.fingerprint,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGuestInfoRequest {
    pub guest_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Upsert contact fields onto the guest record, best-effort.
pub async fn update_guest_info(
    State(state): State<AppState>,
    Json(payload): Json<UpdateGuestInfoRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let updated = guest_identity::update_info(
        &*state.db,
        payload.guest_id,
        GuestContactInfo {
            display_name: payload.display_name,
            phone: payload.phone,
            email: payload.email,
        },
    )
    .await;

    Ok(Json(serde_json::json!({ "updated": updated })))
}

#[derive(Debug, Deserialize)]
pub struct GuestInfoParams {
    pub guest_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct GuestInfoResponse {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// The contact fields stored for a guest, or null when unknown.
pub async fn guest_info(
    State(state): State<AppState>,
    Query(params): Query<GuestInfoParams>,
) -> AppResult<Json<Option<GuestInfoResponse>>> {
    let info = guest_identity::get_info(&*state.db, params.guest_id)
        .await
        .map(|g| GuestInfoResponse {
            id: g.id,
            display_name: g.display_name,
            phone: g.phone,
            email: g.email,
        });

    Ok(Json(info))
}
