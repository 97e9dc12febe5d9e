use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::{activity, place, user};
use crate::error::{AppError, AppResult};
use crate::services::notify;
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Place Management ============

#[derive(Debug, Deserialize)]
pub struct CreatePlaceRequest {
    pub activity_id: String,
    pub name: String,
    pub location: String,
    pub price: Option<String>,
    pub is_free: bool,
    pub opening_time: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaceRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub price: Option<String>,
    pub is_free: Option<bool>,
    pub opening_time: Option<String>,
    pub contact: Option<String>,
}

/// List the places owned by the logged-in provider
pub async fn my_places(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<place::Model>>> {
    let places = place::Entity::find()
        .filter(place::Column::ProviderId.eq(claims.sub))
        .all(&*state.db)
        .await?;

    Ok(Json(places))
}

/// Register a new place under an activity category
pub async fn create_place(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePlaceRequest>,
) -> AppResult<Json<place::Model>> {
    let activity = activity::Entity::find_by_id(payload.activity_id.clone())
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown activity".to_string()))?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Place name is required".to_string()));
    }

    let new_place = place::ActiveModel {
        id: Set(Uuid::new_v4()),
        activity_id: Set(activity.id),
        provider_id: Set(claims.sub),
        name: Set(payload.name),
        location: Set(payload.location),
        price: Set(payload.price),
        is_free: Set(payload.is_free),
        opening_time: Set(payload.opening_time),
        contact: Set(payload.contact),
        is_available: Set(true),
        ..Default::default()
    };

    let place = new_place.insert(&*state.db).await?;
    Ok(Json(place))
}

/// Edit a place. Owner-only.
pub async fn update_place(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(place_id): Path<Uuid>,
    Json(payload): Json<UpdatePlaceRequest>,
) -> AppResult<Json<place::Model>> {
    let place = place::Entity::find_by_id(place_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Place not found".to_string()))?;

    if place.provider_id != claims.sub {
        return Err(AppError::Forbidden(
            "You can only edit your own places".to_string(),
        ));
    }

    let mut am: place::ActiveModel = place.into();
    if let Some(name) = payload.name {
        am.name = Set(name);
    }
    if let Some(location) = payload.location {
        am.location = Set(location);
    }
    if let Some(price) = payload.price {
        am.price = Set(Some(price));
    }
    if let Some(is_free) = payload.is_free {
        am.is_free = Set(is_free);
    }
    if let Some(opening_time) = payload.opening_time {
        am.opening_time = Set(Some(opening_time));
    }
    if let Some(contact) = payload.contact {
        am.contact = Set(Some(contact));
    }

    let updated = am.update(&*state.db).await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub is_available: bool,
}

/// Toggle whether a place accepts bookings. The ownership check lives in the
/// update filter itself, so a non-owner's toggle touches zero rows.
pub async fn set_place_availability(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(place_id): Path<Uuid>,
    Json(payload): Json<SetAvailabilityRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let result = place::Entity::update_many()
        .col_expr(place::Column::IsAvailable, Expr::value(payload.is_available))
        .filter(place::Column::Id.eq(place_id))
        .filter(place::Column::ProviderId.eq(claims.sub))
        .exec(&*state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Place not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "id": place_id,
        "is_available": payload.is_available,
    })))
}

// ============ Booking Queue ============

#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize)]
pub struct ProviderBookingView {
    pub id: Uuid,
    pub place_id: Uuid,
    pub place_name: String,
    pub guest_name: String,
    pub booking_date: NaiveDate,
    pub number_of_people: i32,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

async fn bookings_for_provider(
    state: &AppState,
    provider_id: Uuid,
    status: Option<BookingStatus>,
) -> AppResult<Vec<ProviderBookingView>> {
    let places = place::Entity::find()
        .filter(place::Column::ProviderId.eq(provider_id))
        .all(&*state.db)
        .await?;

    let place_ids: Vec<Uuid> = places.iter().map(|p| p.id).collect();
    if place_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = booking::Entity::find()
        .filter(booking::Column::PlaceId.is_in(place_ids))
        .order_by_asc(booking::Column::BookingDate);
    if let Some(status) = status {
        query = query.filter(booking::Column::Status.eq(status));
    }
    let bookings = query.all(&*state.db).await?;

    let guests = user::Entity::find().all(&*state.db).await?;

    Ok(bookings
        .into_iter()
        .map(|b| {
            let place = places.iter().find(|p| p.id == b.place_id);
            let guest = guests.iter().find(|u| u.id == b.user_id);
            ProviderBookingView {
                id: b.id,
                place_id: b.place_id,
                place_name: place.map(|p| p.name.clone()).unwrap_or_default(),
                guest_name: guest.map(|u| u.display_name.clone()).unwrap_or_default(),
                booking_date: b.booking_date,
                number_of_people: b.number_of_people,
                notes: b.notes,
                status: b.status,
                created_at: b.created_at.with_timezone(&Utc),
            }
        })
        .collect())
}

/// All bookings against the provider's places, optionally filtered by status
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<BookingListParams>,
) -> AppResult<Json<Vec<ProviderBookingView>>> {
    let views = bookings_for_provider(&state, claims.sub, params.status).await?;
    Ok(Json(views))
}

/// The pending queue awaiting a confirm/decline decision
pub async fn pending_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<ProviderBookingView>>> {
    let views =
        bookings_for_provider(&state, claims.sub, Some(BookingStatus::Pending)).await?;
    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
pub struct SetBookingStatusRequest {
    pub status: BookingStatus,
}

/// Confirm or decline a booking against one of the caller's places.
///
/// The prior status is not consulted: setting confirmed twice rewrites the
/// same value, and cancelling after confirming overwrites it. That lenient
/// overwrite is long-standing behavior the dashboard depends on.
pub async fn set_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<SetBookingStatusRequest>,
) -> AppResult<Json<booking::Model>> {
    let verb = match payload.status {
        BookingStatus::Confirmed => "confirmed",
        BookingStatus::Cancelled => "cancelled",
        BookingStatus::Pending => {
            return Err(AppError::BadRequest(
                "Status must be confirmed or cancelled".to_string(),
            ))
        }
    };

    let booking = booking::Entity::find_by_id(booking_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let place = place::Entity::find_by_id(booking.place_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Place not found".to_string()))?;

    if place.provider_id != claims.sub {
        return Err(AppError::Forbidden(
            "You can only manage bookings for your own places".to_string(),
        ));
    }

    let guest_id = booking.user_id;
    let booking_date = booking.booking_date;

    let mut am: booking::ActiveModel = booking.into();
    am.status = Set(payload.status);
    let updated = am.update(&*state.db).await?;

    // Second, independent write: if it fails the status change stands and
    // the guest simply misses the heads-up. Notifications are advisory.
    notify::notify(
        &*state.db,
        guest_id,
        format!(
            "Your booking at {} on {} was {}",
            place.name, booking_date, verb
        ),
        notify::KIND_BOOKING_UPDATE,
    )
    .await;

    Ok(Json(updated))
}
