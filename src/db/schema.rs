use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::db::DbError;

// The store is supplied externally and never written by this service. Instead
// of discovering its layout at runtime, the expected shape is declared here
// and checked once at startup.
pub const STATION_TABLE: &str = "station";
pub const MEASUREMENT_TABLE: &str = "measurement";

const STATION_COLUMNS: &[&str] = &["id"];
const MEASUREMENT_COLUMNS: &[&str] = &["station_id", "date", "prcp", "tobs"];

/// Verify the store matches the declared two-table shape, failing fast with
/// a `SchemaMismatch` so a misconfigured deployment never starts serving.
///
/// Only column presence is checked. SQLite column types are advisory
/// (affinity), so a type comparison would reject otherwise-valid snapshots.
#[instrument(skip(pool))]
pub async fn validate_store(pool: &SqlitePool) -> Result<(), DbError> {
    validate_table(pool, STATION_TABLE, STATION_COLUMNS).await?;
    validate_table(pool, MEASUREMENT_TABLE, MEASUREMENT_COLUMNS).await?;
    debug!("Store matches the declared schema");
    Ok(())
}

async fn validate_table(
    pool: &SqlitePool,
    table: &str,
    required_columns: &[&str],
) -> Result<(), DbError> {
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?1)")
        .bind(table)
        .fetch_all(pool)
        .await?;

    // pragma_table_info returns no rows for a missing table
    if columns.is_empty() {
        return Err(DbError::SchemaMismatch(format!(
            "table '{}' not found in store",
            table
        )));
    }

    for required in required_columns {
        if !columns.iter().any(|column| column == required) {
            return Err(DbError::SchemaMismatch(format!(
                "table '{}' is missing column '{}'",
                table, required
            )));
        }
    }

    debug!("Table '{}' has all {} required columns", table, required_columns.len());
    Ok(())
}
