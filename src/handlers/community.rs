use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{activity, photo, review, tip, user};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Reviews ============

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub activity_id: Option<String>,
    pub rating: i32,
    pub comment: String,
}

/// Post a star rating, optionally against a specific activity
pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<review::Model>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    if let Some(activity_id) = &payload.activity_id {
        activity::Entity::find_by_id(activity_id.clone())
            .one(&*state.db)
            .await?
            .ok_or_else(|| AppError::BadRequest("Unknown activity".to_string()))?;
    }

    let new_review = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        reviewer_id: Set(claims.sub),
        activity_id: Set(payload.activity_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        ..Default::default()
    };

    let review = new_review.insert(&*state.db).await?;
    Ok(Json(review))
}

/// List all reviews, newest first
pub async fn list_reviews(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<review::Model>>> {
    let reviews = review::Entity::find()
        .order_by_desc(review::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    Ok(Json(reviews))
}

// ============ Tips ============

#[derive(Debug, Deserialize)]
pub struct CreateTipRequest {
    pub title: String,
    pub category: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TipView {
    pub id: Uuid,
    pub author_name: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Share a piece of advice under a category
pub async fn create_tip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTipRequest>,
) -> AppResult<Json<tip::Model>> {
    if payload.title.trim().is_empty()
        || payload.category.trim().is_empty()
        || payload.content.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Title, category and content are required".to_string(),
        ));
    }

    let new_tip = tip::ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(claims.sub),
        title: Set(payload.title),
        category: Set(payload.category),
        content: Set(payload.content),
        ..Default::default()
    };

    let tip = new_tip.insert(&*state.db).await?;
    Ok(Json(tip))
}

/// List all tips, newest first, with author display names
pub async fn list_tips(State(state): State<AppState>) -> AppResult<Json<Vec<TipView>>> {
    let tips = tip::Entity::find()
        .order_by_desc(tip::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let authors = user::Entity::find().all(&*state.db).await?;

    Ok(Json(
        tips.into_iter()
            .map(|t| {
                let author = authors.iter().find(|u| u.id == t.author_id);
                TipView {
                    id: t.id,
                    author_name: author.map(|u| u.display_name.clone()).unwrap_or_default(),
                    title: t.title,
                    category: t.category,
                    content: t.content,
                    created_at: t.created_at.with_timezone(&Utc),
                }
            })
            .collect(),
    ))
}

// ============ Gallery ============

#[derive(Debug, Deserialize)]
pub struct CreatePhotoRequest {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct PhotoView {
    pub id: Uuid,
    pub author_name: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Add a photo to the gallery. The upload itself happens elsewhere; this
/// records the link and caption.
pub async fn create_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePhotoRequest>,
) -> AppResult<Json<photo::Model>> {
    if payload.title.trim().is_empty() || payload.image_url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Title and image URL are required".to_string(),
        ));
    }

    let new_photo = photo::ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(claims.sub),
        title: Set(payload.title),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        ..Default::default()
    };

    let photo = new_photo.insert(&*state.db).await?;
    Ok(Json(photo))
}

/// List gallery photos, newest first, with author display names
pub async fn list_photos(State(state): State<AppState>) -> AppResult<Json<Vec<PhotoView>>> {
    let photos = photo::Entity::find()
        .order_by_desc(photo::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    let authors = user::Entity::find().all(&*state.db).await?;

    Ok(Json(
        photos
            .into_iter()
            .map(|p| {
                let author = authors.iter().find(|u| u.id == p.author_id);
                PhotoView {
                    id: p.id,
                    author_name: author.map(|u| u.display_name.clone()).unwrap_or_default(),
                    title: p.title,
                    description: p.description,
                    image_url: p.image_url,
                    created_at: p.created_at.with_timezone(&Utc),
                }
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use crate::Config;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

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

    fn user_row(id: Uuid, display_name: &str) -> user::Model {
        user::Model {
            id,
            email: format!("{}@example.com", display_name.to_lowercase()),
            password_hash: String::new(),
            display_name: display_name.to_string(),
            role: UserRole::Guest,
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_review_rejects_out_of_range_rating() {
        for rating in [0, 6, -1] {
            let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
            let result = create_review(
                State(test_state(db)),
                Extension(guest_claims(Uuid::new_v4())),
                Json(CreateReviewRequest {
                    activity_id: None,
                    rating,
                    comment: "Lovely".to_string(),
                }),
            )
            .await;

            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[tokio::test]
    async fn test_review_rejects_unknown_activity() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<activity::Model>::new()])
            .into_connection();

        let result = create_review(
            State(test_state(db)),
            Extension(guest_claims(Uuid::new_v4())),
            Json(CreateReviewRequest {
                activity_id: Some("scuba-golf".to_string()),
                rating: 4,
                comment: "Great".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_review_stores_rating() {
        let user_id = Uuid::new_v4();
        let stored = review::Model {
            id: Uuid::new_v4(),
            reviewer_id: user_id,
            activity_id: None,
            rating: 5,
            comment: "Crystal clear water".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let Json(review) = create_review(
            State(test_state(db)),
            Extension(guest_claims(user_id)),
            Json(CreateReviewRequest {
                activity_id: None,
                rating: 5,
                comment: "Crystal clear water".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(review.rating, 5);
        assert_eq!(review.reviewer_id, user_id);
    }

    #[tokio::test]
    async fn test_create_tip_requires_category() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = create_tip(
            State(test_state(db)),
            Extension(guest_claims(Uuid::new_v4())),
            Json(CreateTipRequest {
                title: "Go early".to_string(),
                category: "  ".to_string(),
                content: "The pier is empty before 8am".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_list_tips_names_authors() {
        let author_id = Uuid::new_v4();
        let tip_row = tip::Model {
            id: Uuid::new_v4(),
            author_id,
            title: "Go early".to_string(),
            category: "Hidden Gems".to_string(),
            content: "The pier is empty before 8am".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tip_row]])
            .append_query_results([vec![user_row(author_id, "Ade")]])
            .into_connection();

        let Json(tips) = list_tips(State(test_state(db))).await.unwrap();

        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].author_name, "Ade");
        assert_eq!(tips[0].category, "Hidden Gems");
    }

    #[tokio::test]
    async fn test_create_photo_requires_image_url() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = create_photo(
            State(test_state(db)),
            Extension(guest_claims(Uuid::new_v4())),
            Json(CreatePhotoRequest {
                title: "Sunset".to_string(),
                description: None,
                image_url: String::new(),
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
