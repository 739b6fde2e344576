use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AirQualityError;

/// Number of readings a historical chart shows.
pub const CHART_WINDOW: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting values outside lat [-90, 90] / lon [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, AirQualityError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(AirQualityError::InvalidInput(format!(
                "coordinates out of range: lat={lat}, lon={lon}"
            )));
        }
        Ok(Self { lat, lon })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl PlaceInfo {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }

    /// "Name, CC", or just the name when the country is unknown.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Pollutant concentrations in µg/m³. Readings the provider omits are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub no: f64,
    #[serde(default)]
    pub nh3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionReading {
    /// Unix seconds.
    pub timestamp: i64,
    /// Provider index on its own 1–5 scale.
    pub aqi_index: u8,
    pub components: Components,
}

impl PollutionReading {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// A non-empty sequence of readings in provider order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutionSeries {
    readings: Vec<PollutionReading>,
}

impl PollutionSeries {
    /// Returns `None` for an empty list; an empty series is never a success.
    pub fn new(readings: Vec<PollutionReading>) -> Option<Self> {
        if readings.is_empty() {
            None
        } else {
            Some(Self { readings })
        }
    }

    pub fn readings(&self) -> &[PollutionReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// First reading in provider order; for a current query, the only one.
    pub fn first(&self) -> &PollutionReading {
        &self.readings[0]
    }

    pub fn latest(&self) -> &PollutionReading {
        self.readings
            .iter()
            .max_by_key(|r| r.timestamp)
            .unwrap_or(&self.readings[0])
    }

    pub fn into_readings(self) -> Vec<PollutionReading> {
        self.readings
    }

    /// The `limit` most recent readings, oldest first.
    ///
    /// Fetches never truncate; this is where chart rendering narrows the window.
    pub fn chart_window(&self, limit: usize) -> Vec<&PollutionReading> {
        let mut recent: Vec<&PollutionReading> = self.readings.iter().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);
        recent.reverse();
        recent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub pressure_hpa: f64,
}

/// Current pollution plus the independently fetched weather, if requested.
#[derive(Debug)]
pub struct Conditions {
    pub pollution: PollutionSeries,
    /// `None` when weather was not requested; `Some(Err(_))` when it failed.
    pub weather: Option<Result<WeatherReading, AirQualityError>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(timestamp: i64) -> PollutionReading {
        PollutionReading { timestamp, aqi_index: 1, components: Components::default() }
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(PollutionSeries::new(Vec::new()).is_none());
    }

    #[test]
    fn chart_window_keeps_most_recent_in_chronological_order() {
        let readings = (0..30).map(|i| reading(1_000 + i * 3600)).collect();
        let series = PollutionSeries::new(readings).expect("non-empty");

        let window = series.chart_window(CHART_WINDOW);
        assert_eq!(window.len(), CHART_WINDOW);
        assert_eq!(window[0].timestamp, 1_000 + 6 * 3600);
        assert_eq!(window[CHART_WINDOW - 1].timestamp, 1_000 + 29 * 3600);
        assert!(window.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

        // Fetch result itself is untouched.
        assert_eq!(series.len(), 30);
    }

    #[test]
    fn chart_window_handles_newest_first_provider_order() {
        let readings = vec![reading(300), reading(200), reading(100)];
        let series = PollutionSeries::new(readings).expect("non-empty");

        let stamps: Vec<i64> = series.chart_window(2).iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![200, 300]);
        assert_eq!(series.latest().timestamp, 300);
    }

    #[test]
    fn coordinates_range_is_validated() {
        assert!(Coordinates::new(-6.2, 106.8).is_ok());
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(AirQualityError::InvalidInput(_))
        ));
        assert!(Coordinates::new(0.0, -180.5).is_err());
    }

    #[test]
    fn place_label_omits_missing_country() {
        let mut place = PlaceInfo { name: "Jakarta".into(), country: "ID".into(), lat: 0.0, lon: 0.0 };
        assert_eq!(place.label(), "Jakarta, ID");
        place.country.clear();
        assert_eq!(place.label(), "Jakarta");
    }
}
