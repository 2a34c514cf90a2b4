// Tests for MeasurementRepository query behavior against in-memory stores

use climate_query_service::db::MeasurementRepository;
use std::collections::HashMap;

mod repository_test_fixtures {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// Build an in-memory store with the declared two-table schema.
    ///
    /// A single pooled connection that is never recycled: an in-memory
    /// SQLite database lives exactly as long as its connection.
    pub async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory store");

        sqlx::query(
            r#"
            CREATE TABLE station (
                id TEXT PRIMARY KEY,
                name TEXT,
                latitude REAL,
                longitude REAL,
                elevation REAL
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to create station table");

        sqlx::query(
            r#"
            CREATE TABLE measurement (
                station_id TEXT NOT NULL,
                date TEXT NOT NULL,
                prcp REAL,
                tobs REAL
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to create measurement table");

        pool
    }

    pub async fn insert_measurement(
        pool: &SqlitePool,
        station_id: &str,
        date: &str,
        prcp: Option<f64>,
        tobs: Option<f64>,
    ) {
        sqlx::query(
            "INSERT INTO measurement (station_id, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(station_id)
        .bind(date)
        .bind(prcp)
        .bind(tobs)
        .execute(pool)
        .await
        .expect("Failed to insert measurement fixture");
    }
}

#[tokio::test]
async fn test_find_precipitation_since_filters_by_date() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2016-08-21", Some(0.1), None).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2016-08-22", Some(0.2), None).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_B", "2017-03-01", Some(0.3), None).await;

    let readings = repo.find_precipitation_since("2016-08-22").await.unwrap();

    assert_eq!(readings.len(), 2, "the boundary date itself is included");
    assert_eq!(readings[0].date, "2016-08-22");
    assert_eq!(readings[0].prcp, Some(0.2));
    assert_eq!(readings[1].date, "2017-03-01");
    assert_eq!(readings[1].prcp, Some(0.3));
}

#[tokio::test]
async fn test_find_precipitation_since_keeps_null_readings() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-01", None, Some(70.0)).await;

    let readings = repo.find_precipitation_since("2016-08-22").await.unwrap();

    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].prcp, None);
}

#[tokio::test]
async fn test_find_precipitation_since_empty() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    let readings = repo.find_precipitation_since("2016-08-22").await.unwrap();
    assert!(readings.is_empty());
}

#[tokio::test]
async fn test_distinct_station_ids_collapses_duplicates() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-01", Some(0.1), Some(70.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-02", Some(0.1), Some(71.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_B", "2017-01-01", Some(0.2), Some(72.0)).await;

    let mut station_ids = repo.distinct_station_ids().await.unwrap();
    station_ids.sort();

    assert_eq!(station_ids, vec!["STA_A".to_string(), "STA_B".to_string()]);
}

#[tokio::test]
async fn test_station_activity_counts_rows_per_station() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-01", Some(0.1), Some(70.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-02", None, Some(71.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-03", Some(0.0), None).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_B", "2017-01-01", Some(0.2), Some(72.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_B", "2017-01-02", Some(0.3), Some(73.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_C", "2017-01-01", Some(0.4), Some(74.0)).await;

    let activity = repo.station_activity().await.unwrap();
    let counts: HashMap<String, i64> = activity
        .into_iter()
        .map(|station| (station.station_id, station.measurement_count))
        .collect();

    assert_eq!(counts.len(), 3);
    assert_eq!(counts["STA_A"], 3);
    assert_eq!(counts["STA_B"], 2);
    assert_eq!(counts["STA_C"], 1);
}

#[tokio::test]
async fn test_find_temperatures_filters_station_and_date() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2016-08-01", Some(0.1), Some(75.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-01", Some(0.1), Some(70.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-02", None, None).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_B", "2017-01-01", Some(0.2), Some(68.0)).await;

    let readings = repo
        .find_temperatures_for_station_since("STA_A", "2016-08-22")
        .await
        .unwrap();

    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].date, "2017-01-01");
    assert_eq!(readings[0].tobs, Some(70.0));
    assert_eq!(readings[1].date, "2017-01-02");
    assert_eq!(readings[1].tobs, None, "null observations pass through");
}

#[tokio::test]
async fn test_temperature_summary_since_has_no_upper_bound() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2016-12-31", None, Some(60.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-01", None, Some(70.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_B", "2017-06-15", None, Some(80.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_C", "2017-08-23", None, Some(75.0)).await;

    let summary = repo.temperature_summary_since("2017-01-01").await.unwrap();

    assert_eq!(summary.min_temp, Some(70.0));
    assert_eq!(summary.max_temp, Some(80.0));
    assert_eq!(summary.avg_temp, Some(75.0));
}

#[tokio::test]
async fn test_temperature_summary_since_empty_is_all_null() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    let summary = repo.temperature_summary_since("2019-01-01").await.unwrap();

    assert_eq!(summary.min_temp, None);
    assert_eq!(summary.max_temp, None);
    assert_eq!(summary.avg_temp, None);
}

#[tokio::test]
async fn test_temperature_summary_between_includes_both_bounds() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2016-12-31", None, Some(50.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-01", None, Some(65.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-15", None, Some(70.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-31", None, Some(75.0)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-02-01", None, Some(90.0)).await;

    let summary = repo
        .temperature_summary_between("2017-01-01", "2017-01-31")
        .await
        .unwrap();

    assert_eq!(summary.min_temp, Some(65.0));
    assert_eq!(summary.max_temp, Some(75.0));
    assert_eq!(summary.avg_temp, Some(70.0));
}

#[tokio::test]
async fn test_temperature_summary_bounds_ordering() {
    let pool = repository_test_fixtures::setup_test_db().await;
    let repo = MeasurementRepository::new(pool.clone());

    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-01", None, Some(61.2)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-02", None, Some(74.8)).await;
    repository_test_fixtures::insert_measurement(&pool, "STA_A", "2017-01-03", None, Some(69.3)).await;

    let summary = repo
        .temperature_summary_between("2017-01-01", "2017-01-03")
        .await
        .unwrap();

    let min = summary.min_temp.unwrap();
    let max = summary.max_temp.unwrap();
    let avg = summary.avg_temp.unwrap();

    assert!(min <= avg && avg <= max);
    assert_eq!(min, 61.2);
    assert_eq!(max, 74.8);
}
