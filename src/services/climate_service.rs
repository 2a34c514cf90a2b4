use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::db::{DbError, MeasurementRepository, StationActivity, TemperatureSummary};

/// Latest observation date present in the dataset. The store is a fixed
/// historical snapshot, so the one-year lookback anchors here rather than at
/// the current date.
pub const LATEST_OBSERVATION_DATE: &str = "2017-08-23";

/// Length of the lookback window used by the precipitation and
/// temperature-observation endpoints.
pub const LOOKBACK_WINDOW_DAYS: i64 = 366;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
pub struct ClimateService {
    measurement_repo: MeasurementRepository,
}

impl ClimateService {
    pub fn new(measurement_repo: MeasurementRepository) -> Self {
        Self { measurement_repo }
    }

    /// Precipitation readings for the lookback window, one `{date: prcp}`
    /// object per row. Null readings pass through as JSON null.
    pub async fn get_lookback_precipitation(&self) -> Result<Vec<Value>, DbError> {
        let window_start = Self::lookback_window_start();
        let readings = self
            .measurement_repo
            .find_precipitation_since(&window_start)
            .await?;

        Ok(readings
            .into_iter()
            .map(|reading| singleton_entry(reading.date, reading.prcp))
            .collect())
    }

    /// Distinct station ids that have recorded at least one measurement.
    pub async fn get_station_ids(&self) -> Result<Vec<String>, DbError> {
        self.measurement_repo.distinct_station_ids().await
    }

    /// Temperature observations for the most active station within the
    /// lookback window: a label naming the station, then one `{date: tobs}`
    /// object per row.
    pub async fn get_most_active_observations(&self) -> Result<Vec<Value>, DbError> {
        let activity = self.measurement_repo.station_activity().await?;

        let Some(most_active) = select_most_active(&activity) else {
            warn!("Store has no measurements; no most-active station to report");
            return Ok(Vec::new());
        };
        debug!(
            "Most active station is {} with {} measurements",
            most_active.station_id, most_active.measurement_count
        );

        let window_start = Self::lookback_window_start();
        let readings = self
            .measurement_repo
            .find_temperatures_for_station_since(&most_active.station_id, &window_start)
            .await?;

        let mut observations = Vec::with_capacity(readings.len() + 1);
        observations.push(Value::String(format!(
            "Temperature data in the last year for {}",
            most_active.station_id
        )));
        observations.extend(
            readings
                .into_iter()
                .map(|reading| singleton_entry(reading.date, reading.tobs)),
        );

        Ok(observations)
    }

    /// Min/max/average temperature over all rows dated on or after
    /// `start_date`, paired with a label echoing the bound.
    pub async fn get_temperature_summary_since(
        &self,
        start_date: &str,
    ) -> Result<(String, TemperatureSummary), DbError> {
        warn_if_not_iso_date(start_date);

        let summary = self
            .measurement_repo
            .temperature_summary_since(start_date)
            .await?;

        Ok((format!("Temperature data since {}", start_date), summary))
    }

    /// Min/max/average temperature over rows within the inclusive
    /// `start_date..=end_date` range, paired with a label echoing the bounds.
    pub async fn get_temperature_summary_between(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<(String, TemperatureSummary), DbError> {
        warn_if_not_iso_date(start_date);
        warn_if_not_iso_date(end_date);

        let summary = self
            .measurement_repo
            .temperature_summary_between(start_date, end_date)
            .await?;

        Ok((
            format!("Temperature data from {} to {}", start_date, end_date),
            summary,
        ))
    }

    // Business logic helpers (private)

    /// First date inside the lookback window, as yyyy-mm-dd.
    fn lookback_window_start() -> String {
        let latest = NaiveDate::parse_from_str(LATEST_OBSERVATION_DATE, DATE_FORMAT).unwrap();
        (latest - Duration::days(LOOKBACK_WINDOW_DAYS))
            .format(DATE_FORMAT)
            .to_string()
    }
}

/// Pick the station with the strictly largest measurement count. On equal
/// counts the station encountered first keeps the maximum.
fn select_most_active(activity: &[StationActivity]) -> Option<&StationActivity> {
    let mut most_active: Option<&StationActivity> = None;

    for station in activity {
        let current_max = most_active.map(|s| s.measurement_count).unwrap_or(0);
        if station.measurement_count > current_max {
            most_active = Some(station);
        }
    }

    most_active
}

/// One `{date: value}` object, the per-row shape both observation endpoints
/// emit.
fn singleton_entry(date: String, value: Option<f64>) -> Value {
    let mut entry = Map::with_capacity(1);
    entry.insert(date, value.map(Value::from).unwrap_or(Value::Null));
    Value::Object(entry)
}

/// Date parameters are matched against stored text, so a malformed value is
/// served leniently (it simply matches nothing). Log it so the condition is
/// visible to operators.
fn warn_if_not_iso_date(value: &str) {
    if NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
        warn!(
            "Date parameter {:?} is not yyyy-mm-dd; the summary will cover no rows",
            value
        );
    }
}
