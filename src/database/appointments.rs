// ABOUTME: Appointment database operations with transactional slot checking
// ABOUTME: Runs the availability scan and insert inside a single transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

use super::{parse_datetime, parse_uuid, Database};
use crate::booking::availability::{find_conflict, TimeSlot};
use crate::constants::error_messages;
use crate::errors::{AppError, AppResult};
use crate::models::{Appointment, AppointmentStatus};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

impl Database {
    /// Create appointment tables
    pub(super) async fn migrate_appointments(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                customer_id TEXT NOT NULL REFERENCES users(id),
                staff_id TEXT REFERENCES users(id),
                start_time TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'confirmed', 'canceled', 'completed')),
                coupon_id TEXT REFERENCES coupons(id),
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS appointment_services (
                appointment_id TEXT NOT NULL REFERENCES appointments(id),
                service_id TEXT NOT NULL REFERENCES services(id),
                PRIMARY KEY (appointment_id, service_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_appointments_customer ON appointments(customer_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_appointments_staff_status ON appointments(staff_id, status)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist an appointment, verifying staff availability inside the same
    /// transaction. Callers serialize on a per-staff advisory lock so the
    /// conflict scan and insert act as one unit.
    ///
    /// # Errors
    ///
    /// Returns a slot-unavailable conflict error if the staff member already
    /// holds an overlapping live appointment; nothing is persisted in that
    /// case.
    pub async fn create_appointment_checked(&self, appointment: &Appointment) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(staff_id) = appointment.staff_id {
            let rows = sqlx::query(
                r"
                SELECT start_time, duration_minutes
                FROM appointments
                WHERE staff_id = ?1 AND status IN (?2, ?3)
                ",
            )
            .bind(staff_id.to_string())
            .bind(AppointmentStatus::Pending.as_str())
            .bind(AppointmentStatus::Confirmed.as_str())
            .fetch_all(&mut *tx)
            .await?;

            let existing = rows
                .iter()
                .map(row_to_slot)
                .collect::<AppResult<Vec<TimeSlot>>>()?;

            let proposed = TimeSlot::new(appointment.start_time, appointment.duration_minutes);
            if let Some(conflict) = find_conflict(&proposed, &existing) {
                return Err(AppError::slot_unavailable(error_messages::SLOT_UNAVAILABLE)
                    .with_details(serde_json::json!({
                        "staff_id": staff_id,
                        "conflicting_start": conflict.start.to_rfc3339(),
                        "conflicting_end": conflict.end().to_rfc3339(),
                    })));
            }
        }

        sqlx::query(
            r"
            INSERT INTO appointments (id, customer_id, staff_id, start_time, duration_minutes, status, coupon_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(appointment.id.to_string())
        .bind(appointment.customer_id.to_string())
        .bind(appointment.staff_id.map(|id| id.to_string()))
        .bind(appointment.start_time.to_rfc3339())
        .bind(i64::from(appointment.duration_minutes))
        .bind(appointment.status.as_str())
        .bind(appointment.coupon_id.map(|id| id.to_string()))
        .bind(appointment.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for service_id in &appointment.service_ids {
            sqlx::query(
                "INSERT INTO appointment_services (appointment_id, service_id) VALUES (?1, ?2)",
            )
            .bind(appointment.id.to_string())
            .bind(service_id.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get an appointment by ID, including its service set
    pub async fn get_appointment(&self, appointment_id: Uuid) -> AppResult<Option<Appointment>> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?1")
            .bind(appointment_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut appointment = row_to_appointment(&row)?;
        appointment.service_ids = self.appointment_service_ids(appointment_id).await?;
        Ok(Some(appointment))
    }

    /// All appointments booked by a customer, most recent slot first
    pub async fn list_appointments_for_customer(
        &self,
        customer_id: Uuid,
    ) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE customer_id = ?1 ORDER BY start_time DESC",
        )
        .bind(customer_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut appointments = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut appointment = row_to_appointment(row)?;
            appointment.service_ids = self.appointment_service_ids(appointment.id).await?;
            appointments.push(appointment);
        }
        Ok(appointments)
    }

    /// Slots currently held by a staff member (pending or confirmed)
    pub async fn staff_booked_slots(&self, staff_id: Uuid) -> AppResult<Vec<TimeSlot>> {
        let rows = sqlx::query(
            r"
            SELECT start_time, duration_minutes
            FROM appointments
            WHERE staff_id = ?1 AND status IN (?2, ?3)
            ",
        )
        .bind(staff_id.to_string())
        .bind(AppointmentStatus::Pending.as_str())
        .bind(AppointmentStatus::Confirmed.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_slot).collect()
    }

    /// Set an appointment's lifecycle status
    pub async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> AppResult<()> {
        let result = sqlx::query("UPDATE appointments SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(appointment_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Appointment {appointment_id}")));
        }
        Ok(())
    }

    async fn appointment_service_ids(&self, appointment_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query(
            "SELECT service_id FROM appointment_services WHERE appointment_id = ?1",
        )
        .bind(appointment_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("service_id")?;
                parse_uuid(&id, "appointment_services.service_id")
            })
            .collect()
    }
}

fn row_to_slot(row: &SqliteRow) -> AppResult<TimeSlot> {
    let start: String = row.try_get("start_time")?;
    let duration: i64 = row.try_get("duration_minutes")?;

    Ok(TimeSlot::new(
        parse_datetime(&start, "appointments.start_time")?,
        u32::try_from(duration)
            .map_err(|_| AppError::database("negative duration in appointments.duration_minutes"))?,
    ))
}

fn row_to_appointment(row: &SqliteRow) -> AppResult<Appointment> {
    let id: String = row.try_get("id")?;
    let customer_id: String = row.try_get("customer_id")?;
    let staff_id: Option<String> = row.try_get("staff_id")?;
    let start_time: String = row.try_get("start_time")?;
    let duration: i64 = row.try_get("duration_minutes")?;
    let status: String = row.try_get("status")?;
    let coupon_id: Option<String> = row.try_get("coupon_id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Appointment {
        id: parse_uuid(&id, "appointments.id")?,
        customer_id: parse_uuid(&customer_id, "appointments.customer_id")?,
        staff_id: staff_id
            .map(|s| parse_uuid(&s, "appointments.staff_id"))
            .transpose()?,
        start_time: parse_datetime(&start_time, "appointments.start_time")?,
        duration_minutes: u32::try_from(duration)
            .map_err(|_| AppError::database("negative duration in appointments.duration_minutes"))?,
        status: AppointmentStatus::parse(&status),
        coupon_id: coupon_id
            .map(|s| parse_uuid(&s, "appointments.coupon_id"))
            .transpose()?,
        created_at: parse_datetime(&created_at, "appointments.created_at")?,
        service_ids: Vec::new(),
    })
}
