use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::notification;
use crate::error::AppResult;
use crate::utils::jwt::Claims;
use crate::AppState;

/// Unread notifications for the logged-in user, newest first
pub async fn list_unread(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<notification::Model>>> {
    let notifications = notification::Entity::find()
        .filter(notification::Column::RecipientId.eq(claims.sub))
        .filter(notification::Column::Read.eq(false))
        .order_by_desc(notification::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    Ok(Json(notifications))
}

/// Mark a notification read. Idempotent, and filtered to the caller's own
/// rows; dismissal is advisory, so a failed or missed write is logged and
/// the response stays 200.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = notification::Entity::update_many()
        .col_expr(notification::Column::Read, Expr::value(true))
        .filter(notification::Column::Id.eq(notification_id))
        .filter(notification::Column::RecipientId.eq(claims.sub))
        .exec(&*state.db)
        .await;

    if let Err(e) = result {
        tracing::warn!(%notification_id, "failed to dismiss notification: {}", e);
    }

    Ok(Json(serde_json::json!({ "read": true })))
}
