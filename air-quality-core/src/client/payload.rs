//! Wire schemas for the OpenWeather endpoints and their conversion into domain types.

use serde::Deserialize;

use crate::model::{Components, Coordinates, PlaceInfo, PollutionReading, WeatherReading};

/// The provider's own index scale.
const AQI_INDEX_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Deserialize)]
pub(super) struct GeoEntry {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

impl TryFrom<GeoEntry> for PlaceInfo {
    type Error = String;

    fn try_from(entry: GeoEntry) -> Result<Self, Self::Error> {
        let coords = Coordinates::new(entry.lat, entry.lon).map_err(|_| {
            format!("{:?} has coordinates out of range ({}, {})", entry.name, entry.lat, entry.lon)
        })?;

        Ok(PlaceInfo { name: entry.name, country: entry.country, lat: coords.lat, lon: coords.lon })
    }
}

#[derive(Debug, Deserialize)]
struct PollutionMain {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct PollutionEntry {
    dt: i64,
    main: PollutionMain,
    #[serde(default)]
    components: Components,
}

impl TryFrom<PollutionEntry> for PollutionReading {
    type Error = String;

    fn try_from(entry: PollutionEntry) -> Result<Self, Self::Error> {
        if !AQI_INDEX_RANGE.contains(&entry.main.aqi) {
            return Err(format!("aqi index {} at dt={} is outside 1-5", entry.main.aqi, entry.dt));
        }

        let c = &entry.components;
        let fields = [
            ("pm2_5", c.pm2_5),
            ("pm10", c.pm10),
            ("co", c.co),
            ("no2", c.no2),
            ("so2", c.so2),
            ("o3", c.o3),
            ("no", c.no),
            ("nh3", c.nh3),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(format!("component {name}={value} at dt={} is not a concentration", entry.dt));
        }

        Ok(PollutionReading { timestamp: entry.dt, aqi_index: entry.main.aqi, components: entry.components })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PollutionResponse {
    list: Vec<PollutionEntry>,
}

impl PollutionResponse {
    /// Convert every entry; the first out-of-range entry fails the whole response.
    pub(super) fn into_readings(self) -> Result<Vec<PollutionReading>, String> {
        self.list.into_iter().map(PollutionReading::try_from).collect()
    }
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct WeatherResponse {
    main: WeatherMain,
    wind: WeatherWind,
}

impl From<WeatherResponse> for WeatherReading {
    fn from(resp: WeatherResponse) -> Self {
        WeatherReading {
            temperature_c: resp.main.temp,
            humidity_pct: resp.main.humidity,
            wind_speed_ms: resp.wind.speed,
            pressure_hpa: resp.main.pressure,
        }
    }
}
