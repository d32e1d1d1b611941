//! Postgres-backed availability store

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{AvailabilityStore, JobQuery};
use crate::types::{Coordinates, JobStatus, PropertyLocation, ScheduledJob, ServiceDefinition, Technician};

pub struct PgAvailabilityStore {
    pool: PgPool,
}

impl PgAvailabilityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flat job row, technicians aggregated into an array
#[derive(Debug, Clone, sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    technician_ids: Vec<Uuid>,
    property_id: Option<Uuid>,
    lat: Option<f64>,
    lng: Option<f64>,
    address: Option<String>,
    scheduled_at: DateTime<Utc>,
    scheduled_end_at: Option<DateTime<Utc>>,
    status: String,
    actual_duration_minutes: Option<i32>,
}

impl From<JobRow> for ScheduledJob {
    fn from(row: JobRow) -> Self {
        let property = row.property_id.map(|id| PropertyLocation {
            id,
            lat: row.lat,
            lng: row.lng,
            address: row.address,
        });
        ScheduledJob {
            id: row.id,
            technician_ids: row.technician_ids,
            property,
            scheduled_at: row.scheduled_at,
            scheduled_end_at: row.scheduled_end_at,
            status: JobStatus::from(row.status),
            actual_duration_minutes: row.actual_duration_minutes,
        }
    }
}

#[async_trait]
impl AvailabilityStore for PgAvailabilityStore {
    async fn list_active_technicians(&self) -> Result<Vec<Technician>> {
        let technicians = sqlx::query_as::<_, Technician>(
            r#"
            SELECT id, display_name, active
            FROM technicians
            WHERE active
            ORDER BY display_name, id
            "#
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list active technicians")?;

        Ok(technicians)
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<ScheduledJob>> {
        let excluded: Vec<String> = query
            .exclude_statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT
                j.id,
                COALESCE(
                    array_agg(jt.technician_id) FILTER (WHERE jt.technician_id IS NOT NULL),
                    '{}'::uuid[]
                ) AS technician_ids,
                j.property_id,
                p.lat,
                p.lng,
                p.address,
                j.scheduled_at,
                j.scheduled_end_at,
                j.status,
                j.actual_duration_minutes
            FROM scheduled_jobs j
            LEFT JOIN job_technicians jt ON jt.job_id = j.id
            LEFT JOIN properties p ON p.id = j.property_id
            WHERE j.scheduled_at >= $1
              AND j.scheduled_at < $2
              AND NOT (j.status = ANY($3))
              AND (
                  $4::uuid IS NULL
                  OR EXISTS (
                      SELECT 1 FROM job_technicians f
                      WHERE f.job_id = j.id AND f.technician_id = $4
                  )
              )
            GROUP BY j.id, p.id
            ORDER BY j.scheduled_at, j.id
            "#
        )
        .bind(query.range_start)
        .bind(query.range_end)
        .bind(&excluded[..])
        .bind(query.technician_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list scheduled jobs")?;

        debug!(
            "Loaded {} jobs between {} and {}",
            rows.len(),
            query.range_start,
            query.range_end
        );

        Ok(rows.into_iter().map(ScheduledJob::from).collect())
    }

    async fn get_service_definition(&self, service_id: Uuid) -> Result<Option<ServiceDefinition>> {
        let service = sqlx::query_as::<_, ServiceDefinition>(
            r#"
            SELECT id, duration_minutes, min_technicians
            FROM service_definitions
            WHERE id = $1
            "#
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load service definition")?;

        Ok(service)
    }

    async fn get_property_location(&self, property_id: Uuid) -> Result<Option<PropertyLocation>> {
        let property = sqlx::query_as::<_, PropertyLocation>(
            r#"
            SELECT id, lat, lng, address
            FROM properties
            WHERE id = $1
            "#
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load property")?;

        Ok(property)
    }

    async fn update_property_coordinates(&self, property_id: Uuid, coordinates: Coordinates) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE properties
            SET lat = $2, lng = $3, updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(property_id)
        .bind(coordinates.lat)
        .bind(coordinates.lng)
        .execute(&self.pool)
        .await
        .context("Failed to store property coordinates")?;

        Ok(())
    }

    async fn reschedule_job(&self, job_id: Uuid, new_start: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE scheduled_jobs
            SET scheduled_end_at = CASE
                    WHEN scheduled_end_at IS NULL THEN NULL
                    ELSE $2 + (scheduled_end_at - scheduled_at)
                END,
                scheduled_at = $2,
                updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(job_id)
        .bind(new_start)
        .execute(&self.pool)
        .await
        .context("Failed to reschedule job")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("job {} disappeared before it could be rescheduled", job_id);
        }

        Ok(())
    }
}
