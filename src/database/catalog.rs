// ABOUTME: Catalog database operations for services, coupons, and staff assignments
// ABOUTME: Handles CRUD, paginated listings, and the duplicate-pairing conflict check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Amara Wellness

use super::{parse_datetime, parse_decimal, parse_uuid, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Coupon, Service, StaffAssignment, UserRole};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

impl Database {
    /// Create services, coupons, and staff-assignment tables
    pub(super) async fn migrate_catalog(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS coupons (
                id TEXT PRIMARY KEY,
                code TEXT UNIQUE NOT NULL,
                discount_percent TEXT NOT NULL,
                valid_from TEXT NOT NULL,
                valid_until TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                price TEXT NOT NULL,
                image_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS staff_assignments (
                id TEXT PRIMARY KEY,
                staff_id TEXT NOT NULL REFERENCES users(id),
                service_id TEXT NOT NULL REFERENCES services(id),
                is_primary BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                UNIQUE(staff_id, service_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_coupons_code ON coupons(code)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_staff_assignments_service ON staff_assignments(service_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ================================
    // Services
    // ================================

    /// Create a catalog service
    pub async fn create_service(&self, service: &Service) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO services (id, name, description, duration_minutes, price, image_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
        )
        .bind(service.id.to_string())
        .bind(&service.name)
        .bind(&service.description)
        .bind(i64::from(service.duration_minutes))
        .bind(service.price.to_string())
        .bind(&service.image_url)
        .bind(service.created_at.to_rfc3339())
        .bind(service.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(service.id)
    }

    /// Overwrite a catalog service, bumping its updated timestamp
    pub async fn update_service(&self, service: &Service) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE services
            SET name = ?1, description = ?2, duration_minutes = ?3, price = ?4, image_url = ?5, updated_at = ?6
            WHERE id = ?7
            ",
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(i64::from(service.duration_minutes))
        .bind(service.price.to_string())
        .bind(&service.image_url)
        .bind(Utc::now().to_rfc3339())
        .bind(service.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Service {}", service.id)));
        }
        Ok(())
    }

    /// Get a service by ID
    pub async fn get_service(&self, service_id: Uuid) -> AppResult<Option<Service>> {
        let row = sqlx::query("SELECT * FROM services WHERE id = ?1")
            .bind(service_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_service(&r)).transpose()
    }

    /// Page through the catalog, newest first
    pub async fn list_services(&self, limit: u32, offset: u32) -> AppResult<Vec<Service>> {
        let rows = sqlx::query(
            "SELECT * FROM services ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_service).collect()
    }

    /// Total number of catalog services
    pub async fn count_services(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM services")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    /// Fetch a set of services by ID; missing ids are simply absent from the
    /// result, callers compare lengths to detect unknown services
    pub async fn get_services_by_ids(&self, service_ids: &[Uuid]) -> AppResult<Vec<Service>> {
        if service_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=service_ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT * FROM services WHERE id IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for id in service_ids {
            query = query.bind(id.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_service).collect()
    }

    // ================================
    // Coupons
    // ================================

    /// Create a coupon
    ///
    /// # Errors
    ///
    /// Returns a conflict error if the code is already taken.
    pub async fn create_coupon(&self, coupon: &Coupon) -> AppResult<Uuid> {
        if self.get_coupon_by_code(&coupon.code).await?.is_some() {
            return Err(
                AppError::already_exists(format!("Coupon code {} already exists", coupon.code))
                    .with_resource_id(coupon.code.clone()),
            );
        }

        sqlx::query(
            r"
            INSERT INTO coupons (id, code, discount_percent, valid_from, valid_until, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(coupon.id.to_string())
        .bind(&coupon.code)
        .bind(coupon.discount_percent.to_string())
        .bind(coupon.valid_from.to_rfc3339())
        .bind(coupon.valid_until.to_rfc3339())
        .bind(coupon.created_at.to_rfc3339())
        .bind(coupon.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(coupon.id)
    }

    /// Get a coupon by ID
    pub async fn get_coupon(&self, coupon_id: Uuid) -> AppResult<Option<Coupon>> {
        let row = sqlx::query("SELECT * FROM coupons WHERE id = ?1")
            .bind(coupon_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_coupon(&r)).transpose()
    }

    /// Get a coupon by its redemption code
    pub async fn get_coupon_by_code(&self, code: &str) -> AppResult<Option<Coupon>> {
        let row = sqlx::query("SELECT * FROM coupons WHERE code = ?1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_coupon(&r)).transpose()
    }

    // ================================
    // Staff assignments
    // ================================

    /// Pair a staff member with a service they can perform
    ///
    /// # Errors
    ///
    /// Returns a conflict error if the pairing already exists.
    pub async fn create_staff_assignment(&self, assignment: &StaffAssignment) -> AppResult<Uuid> {
        let existing = sqlx::query(
            "SELECT id FROM staff_assignments WHERE staff_id = ?1 AND service_id = ?2",
        )
        .bind(assignment.staff_id.to_string())
        .bind(assignment.service_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(AppError::already_exists(format!(
                "Staff member {} is already assigned to service {}",
                assignment.staff_id, assignment.service_id
            )));
        }

        sqlx::query(
            r"
            INSERT INTO staff_assignments (id, staff_id, service_id, is_primary, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(assignment.id.to_string())
        .bind(assignment.staff_id.to_string())
        .bind(assignment.service_id.to_string())
        .bind(assignment.is_primary)
        .bind(assignment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(assignment.id)
    }

    /// Assignment candidates for any of the given services, primary pairings
    /// first. The eligible roles are an explicit parameter: staff lookup
    /// never relies on an implicit global filter.
    pub async fn assignments_for_services(
        &self,
        service_ids: &[Uuid],
        eligible_roles: &[UserRole],
    ) -> AppResult<Vec<StaffAssignment>> {
        if service_ids.is_empty() || eligible_roles.is_empty() {
            return Ok(Vec::new());
        }

        let service_placeholders = (1..=service_ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let role_placeholders = (service_ids.len() + 1..=service_ids.len() + eligible_roles.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            r"
            SELECT sa.*
            FROM staff_assignments sa
            JOIN users u ON u.id = sa.staff_id
            WHERE sa.service_id IN ({service_placeholders})
              AND u.role IN ({role_placeholders})
              AND u.is_active = 1
            ORDER BY sa.is_primary DESC, sa.created_at ASC
            "
        );

        let mut query = sqlx::query(&sql);
        for id in service_ids {
            query = query.bind(id.to_string());
        }
        for role in eligible_roles {
            query = query.bind(role.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_assignment).collect()
    }
}

fn row_to_service(row: &SqliteRow) -> AppResult<Service> {
    let id: String = row.try_get("id")?;
    let price: String = row.try_get("price")?;
    let duration: i64 = row.try_get("duration_minutes")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Service {
        id: parse_uuid(&id, "services.id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        duration_minutes: u32::try_from(duration)
            .map_err(|_| AppError::database("negative duration in services.duration_minutes"))?,
        price: parse_decimal(&price, "services.price")?,
        image_url: row.try_get("image_url")?,
        created_at: parse_datetime(&created_at, "services.created_at")?,
        updated_at: parse_datetime(&updated_at, "services.updated_at")?,
    })
}

fn row_to_coupon(row: &SqliteRow) -> AppResult<Coupon> {
    let id: String = row.try_get("id")?;
    let discount: String = row.try_get("discount_percent")?;
    let valid_from: String = row.try_get("valid_from")?;
    let valid_until: String = row.try_get("valid_until")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Coupon {
        id: parse_uuid(&id, "coupons.id")?,
        code: row.try_get("code")?,
        discount_percent: parse_decimal(&discount, "coupons.discount_percent")?,
        valid_from: parse_datetime(&valid_from, "coupons.valid_from")?,
        valid_until: parse_datetime(&valid_until, "coupons.valid_until")?,
        created_at: parse_datetime(&created_at, "coupons.created_at")?,
        updated_at: parse_datetime(&updated_at, "coupons.updated_at")?,
    })
}

fn row_to_assignment(row: &SqliteRow) -> AppResult<StaffAssignment> {
    let id: String = row.try_get("id")?;
    let staff_id: String = row.try_get("staff_id")?;
    let service_id: String = row.try_get("service_id")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(StaffAssignment {
        id: parse_uuid(&id, "staff_assignments.id")?,
        staff_id: parse_uuid(&staff_id, "staff_assignments.staff_id")?,
        service_id: parse_uuid(&service_id, "staff_assignments.service_id")?,
        is_primary: row.try_get("is_primary")?,
        created_at: parse_datetime(&created_at, "staff_assignments.created_at")?,
    })
}
