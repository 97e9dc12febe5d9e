//! Notification rows are advisory: they are written best-effort after the
//! event they describe, with no transaction tying the two together. A failed
//! write is logged and swallowed.

use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::notification;

pub const KIND_BOOKING_UPDATE: &str = "booking_update";

/// Record a notification for a recipient. Returns whether the row was
/// written; callers treat false as "user will find out some other way".
pub async fn notify(
    db: &DatabaseConnection,
    recipient_id: Uuid,
    message: String,
    kind: &str,
) -> bool {
    let row = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient_id: Set(recipient_id),
        message: Set(message),
        kind: Set(kind.to_string()),
        read: Set(false),
        created_at: Set(Utc::now().into()),
    };

    match notification::Entity::insert(row).exec_without_returning(db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(%recipient_id, kind, "failed to record notification: {}", e);
            false
        }
    }
}
