use async_trait::async_trait;
use chrono::Utc;
use geocoding::Coordinates;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;

use crate::types::*;

/// Storage for emergencies. Reports are append-only.
#[async_trait]
pub trait EmergencyRepository: Send + Sync {
    /// Stores a new report with status `pending`.
    async fn insert(&self, emergency: NewEmergency) -> Result<Emergency, EmergencyError>;

    /// All reports in creation order.
    async fn list(&self) -> Result<Vec<Emergency>, EmergencyError>;
}

/// PostgreSQL-backed emergency store.
pub struct PgEmergencyRepository {
    pool: PgPool,
}

impl PgEmergencyRepository {
    /// Creates a new instance of `PgEmergencyRepository` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn emergency_from_row(row: &PgRow) -> Result<Emergency, sqlx::Error> {
    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let status: String = row.try_get("status")?;

    Ok(Emergency {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        coordinates: match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        },
        animal: row.try_get("animal")?,
        description: row.try_get("description")?,
        status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(e),
        })?,
        reported_at: row.try_get("reported_at")?,
    })
}

#[async_trait]
impl EmergencyRepository for PgEmergencyRepository {
    async fn insert(&self, emergency: NewEmergency) -> Result<Emergency, EmergencyError> {
        let row = sqlx::query(
            r#"
            INSERT INTO emergencies (
                name, location, latitude, longitude, animal, description, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, name, location, latitude, longitude, animal, description,
                status, reported_at
            "#,
        )
        .bind(&emergency.name)
        .bind(&emergency.location)
        .bind(emergency.coordinates.map(|c| c.latitude))
        .bind(emergency.coordinates.map(|c| c.longitude))
        .bind(&emergency.animal)
        .bind(&emergency.description)
        .bind(EmergencyStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(emergency_from_row(&row)?)
    }

    async fn list(&self) -> Result<Vec<Emergency>, EmergencyError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, name, location, latitude, longitude, animal, description,
                status, reported_at
            FROM emergencies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let emergencies = rows
            .iter()
            .map(emergency_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(emergencies)
    }
}

/// In-memory emergency store.
#[derive(Debug, Default)]
pub struct InMemoryEmergencyRepository {
    emergencies: Mutex<Vec<Emergency>>,
}

impl InMemoryEmergencyRepository {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmergencyRepository for InMemoryEmergencyRepository {
    async fn insert(&self, emergency: NewEmergency) -> Result<Emergency, EmergencyError> {
        let mut emergencies = self.emergencies.lock().await;

        let stored = Emergency {
            id: emergencies.len() as EmergencyId + 1,
            name: emergency.name,
            location: emergency.location,
            coordinates: emergency.coordinates,
            animal: emergency.animal,
            description: emergency.description,
            status: EmergencyStatus::Pending,
            reported_at: Utc::now(),
        };
        emergencies.push(stored.clone());

        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Emergency>, EmergencyError> {
        Ok(self.emergencies.lock().await.clone())
    }
}
