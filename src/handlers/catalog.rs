use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{activity, place};
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlaceInfo {
    pub id: Uuid,
    pub activity_id: String,
    pub name: String,
    pub location: String,
    pub price: Option<String>,
    pub is_free: bool,
    pub opening_time: Option<String>,
    pub contact: Option<String>,
    pub is_available: bool,
}

impl From<place::Model> for PlaceInfo {
    fn from(p: place::Model) -> Self {
        PlaceInfo {
            id: p.id,
            activity_id: p.activity_id,
            name: p.name,
            location: p.location,
            price: p.price,
            is_free: p.is_free,
            opening_time: p.opening_time,
            contact: p.contact,
            is_available: p.is_available,
        }
    }
}

/// List the activity catalog
pub async fn list_activities(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<activity::Model>>> {
    let activities = activity::Entity::find().all(&*state.db).await?;
    Ok(Json(activities))
}

/// Get one activity by slug
pub async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> AppResult<Json<activity::Model>> {
    let activity = activity::Entity::find_by_id(activity_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;

    Ok(Json(activity))
}

/// List places for an activity. Unavailable places are included with their
/// flag so the UI can render them greyed out, the way the listing page does.
pub async fn activity_places(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> AppResult<Json<Vec<PlaceInfo>>> {
    let activity = activity::Entity::find_by_id(activity_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;

    let places = place::Entity::find()
        .filter(place::Column::ActivityId.eq(&activity.id))
        .all(&*state.db)
        .await?;

    Ok(Json(places.into_iter().map(PlaceInfo::from).collect()))
}

/// Get one place by id
pub async fn get_place(
    State(state): State<AppState>,
    Path(place_id): Path<Uuid>,
) -> AppResult<Json<PlaceInfo>> {
    let place = place::Entity::find_by_id(place_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Place not found".to_string()))?;

    Ok(Json(place.into()))
}
