use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::{activity, place};
use crate::error::{AppError, AppResult};
use crate::services::badges;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub place_id: Uuid,
    pub booking_date: NaiveDate,
    pub number_of_people: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub id: Uuid,
    pub place_id: Uuid,
    pub place_name: String,
    pub location: String,
    pub activity_id: String,
    pub activity_title: String,
    pub booking_date: NaiveDate,
    pub number_of_people: i32,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Create a booking against a place. Starts pending; the provider decides.
///
/// Several bookings may target the same place and date. There is no capacity
/// or double-booking check here, matching how reservations have always
/// worked for this app; providers arbitrate by confirming or declining.
/// The same goes for `is_available`: the flag is advisory for the catalog
/// UI, and a booking against an unavailable place still lands pending.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingView>> {
    if payload.number_of_people < 1 {
        return Err(AppError::BadRequest(
            "Booking must be for at least 1 person".to_string(),
        ));
    }

    if payload.booking_date < Utc::now().date_naive() {
        return Err(AppError::BadRequest(
            "Booking date cannot be in the past".to_string(),
        ));
    }

    let place = place::Entity::find_by_id(payload.place_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Place not found".to_string()))?;

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(claims.sub),
        place_id: Set(place.id),
        activity_id: Set(place.activity_id.clone()),
        booking_date: Set(payload.booking_date),
        number_of_people: Set(payload.number_of_people),
        notes: Set(payload.notes),
        status: Set(BookingStatus::Pending),
        ..Default::default()
    };

    let booking = new_booking.insert(&*state.db).await?;

    // Badge evaluation piggybacks on every booking-count change. Advisory
    // only; never fails the booking.
    if let Err(e) = badges::evaluate(&*state.db, claims.sub).await {
        tracing::warn!(user_id = %claims.sub, "badge evaluation failed: {}", e);
    }

    let activity_title = activity::Entity::find_by_id(place.activity_id.clone())
        .one(&*state.db)
        .await?
        .map(|a| a.title)
        .unwrap_or_default();

    Ok(Json(BookingView {
        id: booking.id,
        place_id: place.id,
        place_name: place.name,
        location: place.location,
        activity_id: place.activity_id,
        activity_title,
        booking_date: booking.booking_date,
        number_of_people: booking.number_of_people,
        notes: booking.notes,
        status: booking.status,
        created_at: booking.created_at.with_timezone(&Utc),
    }))
}

#[derive(Debug, Serialize)]
pub struct MyBookingsResponse {
    pub upcoming: Vec<BookingView>,
    pub past: Vec<BookingView>,
}

/// A booking counts as upcoming while its date has not passed and the
/// provider has not cancelled it. Today's bookings are still upcoming.
pub fn is_upcoming(booking_date: NaiveDate, status: BookingStatus, today: NaiveDate) -> bool {
    booking_date >= today && status != BookingStatus::Cancelled
}

/// List the caller's bookings, date ascending, split into upcoming and past.
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<MyBookingsResponse>> {
    let bookings = booking::Entity::find()
        .filter(booking::Column::UserId.eq(claims.sub))
        .order_by_asc(booking::Column::BookingDate)
        .all(&*state.db)
        .await?;

    let places = place::Entity::find().all(&*state.db).await?;
    let activities = activity::Entity::find().all(&*state.db).await?;

    let today = Utc::now().date_naive();
    let mut upcoming = Vec::new();
    let mut past = Vec::new();

    for b in bookings {
        let place = places.iter().find(|p| p.id == b.place_id);
        let activity = activities.iter().find(|a| a.id == b.activity_id);

        let view = BookingView {
            id: b.id,
            place_id: b.place_id,
            place_name: place.map(|p| p.name.clone()).unwrap_or_default(),
            location: place.map(|p| p.location.clone()).unwrap_or_default(),
            activity_id: b.activity_id.clone(),
            activity_title: activity.map(|a| a.title.clone()).unwrap_or_default(),
            booking_date: b.booking_date,
            number_of_people: b.number_of_people,
            notes: b.notes.clone(),
            status: b.status,
            created_at: b.created_at.with_timezone(&Utc),
        };

        if is_upcoming(b.booking_date, b.status, today) {
            upcoming.push(view);
        } else {
            past.push(view);
        }
    }

    Ok(Json(MyBookingsResponse { upcoming, past }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use crate::Config;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn test_state(db: DatabaseConnection) -> AppState {
        AppState {
            db: std::sync::Arc::new(db),
            config: Config {
                database_url: String::new(),
                jwt_secret: "test-secret".to_string(),
                jwt_expiration_hours: 24,
                server_host: "127.0.0.1".to_string(),
                server_port: 0,
            },
        }
    }

    fn guest_claims(user_id: Uuid) -> Claims {
        Claims {
            sub: user_id,
            email: "guest@example.com".to_string(),
            role: UserRole::Guest,
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        }
    }

    fn place_row(id: Uuid) -> place::Model {
        place::Model {
            id,
            activity_id: "boat-tours".to_string(),
            provider_id: Uuid::new_v4(),
            name: "Lagoon Pier".to_string(),
            location: "West shore".to_string(),
            price: Some("₦5,000".to_string()),
            is_free: false,
            opening_time: Some("9am - 5pm".to_string()),
            contact: None,
            is_available: true,
            created_at: Utc::now().into(),
        }
    }

    fn booking_row(
        user_id: Uuid,
        place_id: Uuid,
        date: NaiveDate,
        status: BookingStatus,
    ) -> booking::Model {
        booking::Model {
            id: Uuid::new_v4(),
            user_id,
            place_id,
            activity_id: "boat-tours".to_string(),
            booking_date: date,
            number_of_people: 2,
            notes: None,
            status,
            created_at: Utc::now().into(),
        }
    }

    fn activity_row() -> activity::Model {
        activity::Model {
            id: "boat-tours".to_string(),
            title: "Boat Tours".to_string(),
            description: "Explore coastal waters".to_string(),
            icon: "🚤".to_string(),
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::from(n))])
    }

    #[test]
    fn test_partition_predicate() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let yesterday = today - Duration::days(1);
        let tomorrow = today + Duration::days(1);

        // tomorrow: upcoming unless cancelled
        assert!(is_upcoming(tomorrow, BookingStatus::Pending, today));
        assert!(is_upcoming(tomorrow, BookingStatus::Confirmed, today));
        assert!(!is_upcoming(tomorrow, BookingStatus::Cancelled, today));

        // today counts as upcoming if not cancelled
        assert!(is_upcoming(today, BookingStatus::Pending, today));
        assert!(is_upcoming(today, BookingStatus::Confirmed, today));
        assert!(!is_upcoming(today, BookingStatus::Cancelled, today));

        // yesterday is always past
        assert!(!is_upcoming(yesterday, BookingStatus::Confirmed, today));
        assert!(!is_upcoming(yesterday, BookingStatus::Pending, today));
    }

    #[tokio::test]
    async fn test_create_booking_rejects_zero_people() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = create_booking(
            State(test_state(db)),
            Extension(guest_claims(Uuid::new_v4())),
            Json(CreateBookingRequest {
                place_id: Uuid::new_v4(),
                booking_date: Utc::now().date_naive(),
                number_of_people: 0,
                notes: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_booking_rejects_past_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = create_booking(
            State(test_state(db)),
            Extension(guest_claims(Uuid::new_v4())),
            Json(CreateBookingRequest {
                place_id: Uuid::new_v4(),
                booking_date: Utc::now().date_naive() - Duration::days(1),
                number_of_people: 2,
                notes: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_booking_starts_pending() {
        let user_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();
        let date = Utc::now().date_naive() + Duration::days(3);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![place_row(place_id)]])
            .append_query_results([vec![booking_row(user_id, place_id, date, BookingStatus::Pending)]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![crate::entities::badge::Model {
                id: Uuid::new_v4(),
                name: "First Wave".to_string(),
                description: String::new(),
                icon: String::new(),
            }]])
            .append_query_results([vec![activity_row()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let Json(view) = create_booking(
            State(test_state(db)),
            Extension(guest_claims(user_id)),
            Json(CreateBookingRequest {
                place_id,
                booking_date: date,
                number_of_people: 2,
                notes: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(view.status, BookingStatus::Pending);
        assert_eq!(view.place_name, "Lagoon Pier");
        assert_eq!(view.activity_title, "Boat Tours");
    }

    #[tokio::test]
    async fn test_same_place_and_date_can_be_booked_twice() {
        // Two guests, one slot: both inserts go through. Capacity arbitration
        // is the provider's job, not the API's.
        let place_id = Uuid::new_v4();
        let date = Utc::now().date_naive() + Duration::days(1);

        for _ in 0..2 {
            let user_id = Uuid::new_v4();
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![place_row(place_id)]])
                .append_query_results([vec![booking_row(
                    user_id,
                    place_id,
                    date,
                    BookingStatus::Pending,
                )]])
                .append_query_results([vec![count_row(1)]])
                .append_query_results([vec![crate::entities::badge::Model {
                    id: Uuid::new_v4(),
                    name: "First Wave".to_string(),
                    description: String::new(),
                    icon: String::new(),
                }]])
                .append_query_results([vec![activity_row()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection();

            let result = create_booking(
                State(test_state(db)),
                Extension(guest_claims(user_id)),
                Json(CreateBookingRequest {
                    place_id,
                    booking_date: date,
                    number_of_people: 2,
                    notes: None,
                }),
            )
            .await;

            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn test_unavailable_place_still_accepts_bookings() {
        // is_available is a catalog hint, not a booking gate.
        let user_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();
        let date = Utc::now().date_naive() + Duration::days(1);

        let mut closed_place = place_row(place_id);
        closed_place.is_available = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![closed_place]])
            .append_query_results([vec![booking_row(
                user_id,
                place_id,
                date,
                BookingStatus::Pending,
            )]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![crate::entities::badge::Model {
                id: Uuid::new_v4(),
                name: "First Wave".to_string(),
                description: String::new(),
                icon: String::new(),
            }]])
            .append_query_results([vec![activity_row()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let Json(view) = create_booking(
            State(test_state(db)),
            Extension(guest_claims(user_id)),
            Json(CreateBookingRequest {
                place_id,
                booking_date: date,
                number_of_people: 2,
                notes: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(view.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_my_bookings_partitions_by_date_and_status() {
        let user_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();
        let today = Utc::now().date_naive();

        let rows = vec![
            booking_row(user_id, place_id, today - Duration::days(1), BookingStatus::Confirmed),
            booking_row(user_id, place_id, today, BookingStatus::Pending),
            booking_row(user_id, place_id, today + Duration::days(1), BookingStatus::Confirmed),
            booking_row(user_id, place_id, today + Duration::days(2), BookingStatus::Cancelled),
        ];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .append_query_results([vec![place_row(place_id)]])
            .append_query_results([vec![activity_row()]])
            .into_connection();

        let Json(response) = my_bookings(
            State(test_state(db)),
            Extension(guest_claims(user_id)),
        )
        .await
        .unwrap();

        // today/pending and tomorrow/confirmed are upcoming; the cancelled
        // future booking and yesterday's land in past.
        assert_eq!(response.upcoming.len(), 2);
        assert_eq!(response.past.len(), 2);
        assert!(response
            .upcoming
            .iter()
            .all(|b| b.status != BookingStatus::Cancelled));
    }
}
