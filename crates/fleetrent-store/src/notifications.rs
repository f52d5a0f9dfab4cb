//! Notification audit storage.
//!
//! Rows are written by the outbound dispatcher after a delivery attempt,
//! outside any reconciliation transaction.

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use fleetrent_types::{DeliveryStatus, NotificationKind, UserId};

use crate::error::{Result, StoreError};
use crate::traits::NotificationStore;
use crate::types::NotificationRecord;
use crate::{column_decode_error, current_timestamp};

/// SQLite-based notification store.
pub struct SqliteNotificationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteNotificationStore {
    /// Create a new notification store with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<NotificationRecord> {
    let kind_raw: u8 = row.get(2)?;
    let kind = NotificationKind::from_u8(kind_raw)
        .ok_or_else(|| column_decode_error(2, format!("unknown notification kind {}", kind_raw)))?;
    let delivery_raw: u8 = row.get(3)?;
    let delivery = DeliveryStatus::from_u8(delivery_raw).ok_or_else(|| {
        column_decode_error(3, format!("unknown delivery status {}", delivery_raw))
    })?;

    Ok(NotificationRecord {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        kind,
        delivery,
        message: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl NotificationStore for SqliteNotificationStore {
    fn record(
        &mut self,
        user: UserId,
        kind: NotificationKind,
        delivery: DeliveryStatus,
        message: &str,
    ) -> Result<NotificationRecord> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        let now = current_timestamp();

        conn.execute(
            "INSERT INTO notifications (user_id, kind, delivery, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user.0, kind as u8, delivery as u8, message, now],
        )?;

        Ok(NotificationRecord {
            id: conn.last_insert_rowid(),
            user_id: user,
            kind,
            delivery,
            message: message.to_string(),
            created_at: now,
        })
    }

    fn list_for_user(&self, user: UserId) -> Result<Vec<NotificationRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, kind, delivery, message, created_at
             FROM notifications WHERE user_id = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([user.0], row_to_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
