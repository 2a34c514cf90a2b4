use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::db::{
    DbError, PrecipitationReading, StationActivity, TemperatureReading, TemperatureSummary,
};

/// Read-only queries over the measurement table.
///
/// Every method checks one connection out of the pool for the duration of
/// its query and returns it when the call completes, on success or error.
#[derive(Clone)]
pub struct MeasurementRepository {
    pool: SqlitePool,
}

impl MeasurementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Precipitation readings on or after `start_date`, in storage order.
    /// Rows with a null precipitation value are included.
    #[instrument(skip(self))]
    pub async fn find_precipitation_since(
        &self,
        start_date: &str,
    ) -> Result<Vec<PrecipitationReading>, DbError> {
        debug!("Querying precipitation readings from {}", start_date);

        let readings = sqlx::query_as::<_, PrecipitationReading>(
            r#"
            SELECT date, prcp
            FROM measurement
            WHERE date >= ?1
            "#,
        )
        .bind(start_date)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} precipitation readings", readings.len());
        Ok(readings)
    }

    /// Distinct station ids with at least one measurement row. The station
    /// table itself is deliberately not consulted.
    #[instrument(skip(self))]
    pub async fn distinct_station_ids(&self) -> Result<Vec<String>, DbError> {
        debug!("Querying distinct station ids from measurements");

        let station_ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT station_id
            FROM measurement
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} distinct stations", station_ids.len());
        Ok(station_ids)
    }

    /// Measurement row count per station.
    #[instrument(skip(self))]
    pub async fn station_activity(&self) -> Result<Vec<StationActivity>, DbError> {
        debug!("Querying measurement counts per station");

        let activity = sqlx::query_as::<_, StationActivity>(
            r#"
            SELECT station_id, COUNT(station_id) AS measurement_count
            FROM measurement
            GROUP BY station_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Found activity for {} stations", activity.len());
        Ok(activity)
    }

    /// Temperature observations for one station on or after `start_date`,
    /// in storage order.
    #[instrument(skip(self), fields(station_id = %station_id))]
    pub async fn find_temperatures_for_station_since(
        &self,
        station_id: &str,
        start_date: &str,
    ) -> Result<Vec<TemperatureReading>, DbError> {
        debug!("Querying temperature observations from {}", start_date);

        let readings = sqlx::query_as::<_, TemperatureReading>(
            r#"
            SELECT date, tobs
            FROM measurement
            WHERE date >= ?1 AND station_id = ?2
            "#,
        )
        .bind(start_date)
        .bind(station_id)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} temperature observations", readings.len());
        Ok(readings)
    }

    /// Min/max/average temperature over all rows with `date >= start_date`.
    #[instrument(skip(self))]
    pub async fn temperature_summary_since(
        &self,
        start_date: &str,
    ) -> Result<TemperatureSummary, DbError> {
        debug!("Querying temperature summary from {}", start_date);

        let summary = sqlx::query_as::<_, TemperatureSummary>(
            r#"
            SELECT MIN(tobs) AS min_temp, MAX(tobs) AS max_temp, AVG(tobs) AS avg_temp
            FROM measurement
            WHERE date >= ?1
            "#,
        )
        .bind(start_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Min/max/average temperature over rows with
    /// `start_date <= date <= end_date`, both bounds inclusive.
    #[instrument(skip(self))]
    pub async fn temperature_summary_between(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<TemperatureSummary, DbError> {
        debug!(
            "Querying temperature summary from {} to {}",
            start_date, end_date
        );

        let summary = sqlx::query_as::<_, TemperatureSummary>(
            r#"
            SELECT MIN(tobs) AS min_temp, MAX(tobs) AS max_temp, AVG(tobs) AS avg_temp
            FROM measurement
            WHERE date >= ?1 AND date <= ?2
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}
