//! Anonymous guest resolution.
//!
//! Visitors who never sign in still get a durable per-device identity so
//! the contact details they volunteer survive page reloads. The client
//! persists two values (guest id + fingerprint) and sends whatever it has; this
//! module reconciles them against the `anonymous_guest` table. Everything
//! here is best-effort: a failure resolves to no identity, never an error,
//! and the UI proceeds without one.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::anonymous_guest;
use crate::utils::fingerprint::{generate_fingerprint, FingerprintSignals};

/// Client-side persistence of the two guest identifiers, abstracted so the
/// resolver does not care whether it is a request payload, a cookie jar or a
/// test fixture.
pub trait IdentityStore: Send {
    fn guest_id(&self) -> Option<Uuid>;
    fn fingerprint(&self) -> Option<String>;
    fn remember(&mut self, guest_id: Uuid, fingerprint: Option<String>);
    fn clear(&mut self);
}

/// The identifiers a client sent with its request, echoed back (possibly
/// recovered or freshly minted) for it to persist.
#[derive(Debug, Default, Clone)]
pub struct ClientIdentity {
    pub guest_id: Option<Uuid>,
    pub fingerprint: Option<String>,
}

impl IdentityStore for ClientIdentity {
    fn guest_id(&self) -> Option<Uuid> {
        self.guest_id
    }

    fn fingerprint(&self) -> Option<String> {
        self.fingerprint.clone()
    }

    fn remember(&mut self, guest_id: Uuid, fingerprint: Option<String>) {
        self.guest_id = Some(guest_id);
        if fingerprint.is_some() {
            self.fingerprint = fingerprint;
        }
    }

    fn clear(&mut self) {
        self.guest_id = None;
        self.fingerprint = None;
    }
}

/// Resolve a stable guest id, trying in order:
/// 1. the remembered id, verified against the backing table;
/// 2. the remembered fingerprint, recovering the id it maps to (covers a
///    partially cleared client store);
/// 3. a fresh record keyed by a newly computed fingerprint, when signals
///    are available.
///
/// Returns `None` when no path succeeds.
pub async fn resolve(
    db: &DatabaseConnection,
    store: &mut dyn IdentityStore,
    signals: Option<&FingerprintSignals>,
) -> Option<Uuid> {
    if let Some(guest_id) = store.guest_id() {
        match anonymous_guest::Entity::find_by_id(guest_id).one(db).await {
            Ok(Some(_)) => {
                touch_last_seen(db, guest_id).await;
                return Some(guest_id);
            }
            Ok(None) => {
                tracing::debug!(%guest_id, "remembered guest id has no backing record");
            }
            Err(e) => {
                tracing::warn!(%guest_id, "failed to verify guest id: {}", e);
            }
        }
    }

    if let Some(fp) = store.fingerprint() {
        match anonymous_guest::Entity::find()
            .filter(anonymous_guest::Column::Fingerprint.eq(&fp))
            .one(db)
            .await
        {
            Ok(Some(record)) => {
                store.remember(record.id, Some(fp));
                touch_last_seen(db, record.id).await;
                return Some(record.id);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("failed to look up guest by fingerprint: {}", e);
            }
        }
    }

    let signals = signals?;
    let now = Utc::now();
    let fingerprint = generate_fingerprint(signals, now.timestamp_millis());

    let new_guest = anonymous_guest::ActiveModel {
        id: Set(Uuid::new_v4()),
        fingerprint: Set(fingerprint.clone()),
        display_name: Set(None),
        phone: Set(None),
        email: Set(None),
        last_seen: Set(now.into()),
        created_at: Set(now.into()),
    };

    match new_guest.insert(db).await {
        Ok(created) => {
            store.remember(created.id, Some(fingerprint));
            Some(created.id)
        }
        Err(e) => {
            tracing::warn!("failed to create anonymous guest: {}", e);
            None
        }
    }
}

/// Optional contact fields a guest may volunteer before booking.
#[derive(Debug, Default, Clone)]
pub struct GuestContactInfo {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Upsert contact fields onto the current guest record. Returns false (and
/// logs) instead of erroring when there is no resolved guest or the write
/// fails.
pub async fn update_info(
    db: &DatabaseConnection,
    guest_id: Option<Uuid>,
    info: GuestContactInfo,
) -> bool {
    let Some(guest_id) = guest_id else {
        return false;
    };

    if info.display_name.is_none() && info.phone.is_none() && info.email.is_none() {
        // Nothing to write; the guest record is already current.
        return true;
    }

    let mut update = anonymous_guest::Entity::update_many()
        .filter(anonymous_guest::Column::Id.eq(guest_id));

    if let Some(name) = info.display_name {
        update = update.col_expr(anonymous_guest::Column::DisplayName, Expr::value(name));
    }
    if let Some(phone) = info.phone {
        update = update.col_expr(anonymous_guest::Column::Phone, Expr::value(phone));
    }
    if let Some(email) = info.email {
        update = update.col_expr(anonymous_guest::Column::Email, Expr::value(email));
    }

    match update.exec(db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(%guest_id, "failed to update guest info: {}", e);
            false
        }
    }
}

/// Fetch the stored contact fields, best-effort.
pub async fn get_info(
    db: &DatabaseConnection,
    guest_id: Option<Uuid>,
) -> Option<anonymous_guest::Model> {
    let guest_id = guest_id?;
    match anonymous_guest::Entity::find_by_id(guest_id).one(db).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(%guest_id, "failed to fetch guest info: {}", e);
            None
        }
    }
}

/// A visitor is anonymous iff no authenticated session exists and a guest id
/// is resolved.
pub fn is_anonymous(authenticated: bool, store: &dyn IdentityStore) -> bool {
    !authenticated && store.guest_id().is_some()
}

async fn touch_last_seen(db: &DatabaseConnection, guest_id: Uuid) {
    let result = anonymous_guest::Entity::update_many()
        .col_expr(
            anonymous_guest::Column::LastSeen,
            Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
        )
        .filter(anonymous_guest::Column::Id.eq(guest_id))
        .exec(db)
        .await;

    if let Err(e) = result {
        tracing::warn!(%guest_id, "failed to refresh guest last_seen: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fingerprint::FingerprintSignals;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn guest_row(id: Uuid, fingerprint: &str) -> anonymous_guest::Model {
        anonymous_guest::Model {
            id,
            fingerprint: fingerprint.to_string(),
            display_name: None,
            phone: None,
            email: None,
            last_seen: Utc::now().into(),
            created_at: Utc::now().into(),
        }
    }

    fn signals() -> FingerprintSignals {
        FingerprintSignals {
            user_agent: "Mozilla/5.0".to_string(),
            language: "en-US".to_string(),
            platform: "Linux x86_64".to_string(),
            screen_resolution: "1920x1080".to_string(),
            color_depth: 24,
            timezone: "Africa/Lagos".to_string(),
            canvas: String::new(),
        }
    }

    #[tokio::test]
    async fn test_resolve_is_stable_across_calls() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![guest_row(id, "fp_abc_1")],
                vec![guest_row(id, "fp_abc_1")],
            ])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let mut store = ClientIdentity {
            guest_id: Some(id),
            fingerprint: Some("fp_abc_1".to_string()),
        };

        let first = resolve(&db, &mut store, None).await;
        let second = resolve(&db, &mut store, None).await;

        assert_eq!(first, Some(id));
        assert_eq!(second, Some(id));
    }

    #[tokio::test]
    async fn test_resolve_recovers_id_from_fingerprint() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![guest_row(id, "fp_abc_1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        // Guest id cleared, fingerprint survived
        let mut store = ClientIdentity {
            guest_id: None,
            fingerprint: Some("fp_abc_1".to_string()),
        };

        let resolved = resolve(&db, &mut store, None).await;

        assert_eq!(resolved, Some(id));
        assert_eq!(store.guest_id, Some(id));
        assert_eq!(store.fingerprint.as_deref(), Some("fp_abc_1"));
    }

    #[tokio::test]
    async fn test_resolve_creates_fresh_record() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![guest_row(id, "fp_new_1")]])
            .into_connection();

        let mut store = ClientIdentity::default();
        let resolved = resolve(&db, &mut store, Some(&signals())).await;

        assert_eq!(resolved, Some(id));
        assert_eq!(store.guest_id, Some(id));
        assert!(store.fingerprint.is_some());
    }

    #[tokio::test]
    async fn test_resolve_without_identity_or_signals_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut store = ClientIdentity::default();

        assert_eq!(resolve(&db, &mut store, None).await, None);
    }

    #[tokio::test]
    async fn test_stale_guest_id_falls_through_to_fingerprint() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<anonymous_guest::Model>::new(),
                vec![guest_row(id, "fp_abc_1")],
            ])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let mut store = ClientIdentity {
            guest_id: Some(Uuid::new_v4()), // record no longer exists
            fingerprint: Some("fp_abc_1".to_string()),
        };

        let resolved = resolve(&db, &mut store, None).await;
        assert_eq!(resolved, Some(id));
        assert_eq!(store.guest_id, Some(id));
    }

    #[tokio::test]
    async fn test_update_info_without_guest_id_is_false() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let updated = update_info(&db, None, GuestContactInfo::default()).await;
        assert!(!updated);
    }

    #[test]
    fn test_is_anonymous() {
        let with_id = ClientIdentity {
            guest_id: Some(Uuid::new_v4()),
            fingerprint: None,
        };
        let empty = ClientIdentity::default();

        assert!(is_anonymous(false, &with_id));
        assert!(!is_anonymous(true, &with_id));
        assert!(!is_anonymous(false, &empty));
    }

    #[test]
    fn test_clear_discards_both_identifiers() {
        let mut store = ClientIdentity {
            guest_id: Some(Uuid::new_v4()),
            fingerprint: Some("fp_abc_1".to_string()),
        };
        store.clear();
        assert!(store.guest_id.is_none());
        assert!(store.fingerprint.is_none());
    }
}
