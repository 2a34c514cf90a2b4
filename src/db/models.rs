use serde::Serialize;
use sqlx::FromRow;

// Row models for the measurement table. Dates are stored as yyyy-mm-dd text
// in the dataset, so they stay strings all the way through.
#[derive(Debug, Clone, FromRow)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TemperatureReading {
    pub date: String,
    pub tobs: Option<f64>,
}

/// Per-station measurement row count, used to pick the most active station.
#[derive(Debug, Clone, FromRow)]
pub struct StationActivity {
    pub station_id: String,
    pub measurement_count: i64,
}

/// Min/max/average temperature over a date-filtered row set.
///
/// All fields are null when no row matches the filter; SQL aggregates over
/// an empty set return NULL rather than an error.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemperatureSummary {
    #[serde(rename = "Min Temp")]
    pub min_temp: Option<f64>,
    #[serde(rename = "Max Temp")]
    pub max_temp: Option<f64>,
    #[serde(rename = "Avg Temp")]
    pub avg_temp: Option<f64>,
}
