//! Payment record storage.
//!
//! One payment row per rental. `external_reference` is the idempotency
//! key shared with the gateway and carries a UNIQUE constraint.

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

use fleetrent_types::{PaymentId, PaymentRecord, PaymentStatus, RentalId};

use crate::error::{Result, StoreError};
use crate::traits::PaymentStore;
use crate::types::NewPayment;
use crate::{column_decode_error, current_timestamp};

/// SQLite-based payment store.
pub struct SqlitePaymentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePaymentStore {
    /// Create a new payment store with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

/// Columns selected for every payment read.
const PAYMENT_COLUMNS: &str = "id, rental_id, invoice_id, external_reference, amount, status, \
     payment_url, payer_email, requires_refund, created_at, updated_at";

/// Deserialize a payment record from a database row.
pub(crate) fn row_to_payment(row: &rusqlite::Row) -> rusqlite::Result<PaymentRecord> {
    let status_raw: u8 = row.get(5)?;
    let status = PaymentStatus::from_u8(status_raw)
        .ok_or_else(|| column_decode_error(5, format!("unknown payment status {}", status_raw)))?;

    Ok(PaymentRecord {
        id: PaymentId(row.get(0)?),
        rental_id: RentalId(row.get(1)?),
        invoice_id: row.get(2)?,
        external_reference: row.get(3)?,
        amount: row.get::<_, i64>(4)? as u64,
        status,
        payment_url: row.get(6)?,
        payer_email: row.get(7)?,
        requires_refund: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl PaymentStore for SqlitePaymentStore {
    fn insert(&mut self, payment: NewPayment) -> Result<PaymentRecord> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        let now = current_timestamp();

        conn.execute(
            "INSERT INTO payments (rental_id, invoice_id, external_reference, amount, status, payment_url, payer_email, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                payment.rental_id.0,
                payment.invoice_id,
                payment.external_reference,
                payment.amount as i64,
                PaymentStatus::Pending as u8,
                payment.payment_url,
                payment.payer_email,
                now,
            ],
        )?;
        let id = PaymentId(conn.last_insert_rowid());

        tracing::debug!(
            payment_id = %id,
            rental_id = %payment.rental_id,
            reference = %payment.external_reference,
            "Payment record inserted"
        );

        Ok(PaymentRecord {
            id,
            rental_id: payment.rental_id,
            invoice_id: payment.invoice_id,
            external_reference: payment.external_reference,
            amount: payment.amount,
            status: PaymentStatus::Pending,
            payment_url: payment.payment_url,
            payer_email: payment.payer_email,
            requires_refund: false,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: PaymentId) -> Result<Option<PaymentRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let payment = conn
            .query_row(
                &format!("SELECT {} FROM payments WHERE id = ?1", PAYMENT_COLUMNS),
                [id.0],
                row_to_payment,
            )
            .optional()?;
        Ok(payment)
    }

    fn get_by_reference(&self, reference: &str) -> Result<Option<PaymentRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        get_by_reference(&conn, reference)
    }

    fn set_status(&mut self, id: PaymentId, status: PaymentStatus) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        set_status(&conn, id, status)
    }
}

// =============================================================================
// Transactional helpers
// =============================================================================

/// Look up a payment by external reference on the caller's connection or
/// open transaction.
pub fn get_by_reference(conn: &Connection, reference: &str) -> Result<Option<PaymentRecord>> {
    let payment = conn
        .query_row(
            &format!(
                "SELECT {} FROM payments WHERE external_reference = ?1",
                PAYMENT_COLUMNS
            ),
            [reference],
            row_to_payment,
        )
        .optional()?;
    Ok(payment)
}

/// Write a payment status on the caller's connection or open transaction.
pub fn set_status(conn: &Connection, id: PaymentId, status: PaymentStatus) -> Result<()> {
    let affected = conn.execute(
        "UPDATE payments SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.0, status as u8, current_timestamp()],
    )?;
    if affected == 0 {
        return Err(StoreError::PaymentNotFound(format!("payment id {}", id)));
    }
    Ok(())
}

/// Flag a payment as needing a manual refund.
///
/// Set when money was collected but the rental could not be activated
/// (stock exhausted between reservation and confirmation).
pub fn flag_refund(conn: &Connection, id: PaymentId) -> Result<()> {
    let affected = conn.execute(
        "UPDATE payments SET requires_refund = 1, updated_at = ?2 WHERE id = ?1",
        params![id.0, current_timestamp()],
    )?;
    if affected == 0 {
        return Err(StoreError::PaymentNotFound(format!("payment id {}", id)));
    }
    Ok(())
}
