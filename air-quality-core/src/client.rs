use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{Config, is_usable_key},
    error::AirQualityError,
    model::{Conditions, Coordinates, PlaceInfo, PollutionSeries, WeatherReading},
    transport::{ReqwestTransport, Transport},
};

mod payload;

use payload::{GeoEntry, PollutionResponse, WeatherResponse};

/// Default historical window when no start bound is given.
pub const DEFAULT_HISTORY_SECS: i64 = 7 * 24 * 60 * 60;

/// Stateless access to the geocoding, air pollution and weather endpoints.
///
/// Every network call takes a caller-owned [`CancellationToken`]; one token may
/// be shared by all calls of a session so that cancelling it aborts them all.
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    transport: Arc<dyn Transport>,
    api_key: String,
    base_url: String,
    geo_base_url: String,
}

impl AirQualityClient {
    pub fn from_config(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            api_key: config.api_key().unwrap_or_default().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geo_base_url: config.geo_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Whether a usable API key is present; requests without one are bound to fail.
    pub fn is_configured(&self) -> bool {
        is_usable_key(&self.api_key)
    }

    /// Resolve a free-text place name to its single best geocoding match.
    pub async fn resolve_city(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<PlaceInfo, AirQualityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AirQualityError::InvalidInput("place name is empty".to_string()));
        }

        let url = format!("{}/direct", self.geo_base_url);
        let query = vec![("q", name.to_string()), ("limit", "1".to_string())];

        let matches: Vec<GeoEntry> = self.get_json(&url, query, "geocoding", cancel).await?;

        let entry = matches
            .into_iter()
            .next()
            .ok_or_else(|| AirQualityError::NotFound(name.to_string()))?;
        let place =
            PlaceInfo::try_from(entry).map_err(|detail| invalid_payload("geocoding", detail))?;

        tracing::info!(query = %name, place = %place.label(), "Resolved place");
        Ok(place)
    }

    /// Current pollution at `coords`; the series holds exactly the provider's current reading.
    pub async fn fetch_current_pollution(
        &self,
        coords: Coordinates,
        cancel: &CancellationToken,
    ) -> Result<PollutionSeries, AirQualityError> {
        let url = format!("{}/air_pollution", self.base_url);
        let resp: PollutionResponse =
            self.get_json(&url, coords_query(coords), "air pollution", cancel).await?;

        let series = into_series(resp, coords)?;
        tracing::info!(%coords, aqi_index = series.first().aqi_index, "Fetched current pollution");
        Ok(series)
    }

    /// Pollution readings between `start` and `end` (unix seconds).
    ///
    /// `end` defaults to now and `start` to `end - 7 days`, each independently.
    /// The bounds are not validated locally. The full series is returned; chart
    /// rendering narrows it with [`PollutionSeries::chart_window`].
    pub async fn fetch_historical_pollution(
        &self,
        coords: Coordinates,
        start: Option<i64>,
        end: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<PollutionSeries, AirQualityError> {
        let (start, end) = history_window(start, end, Utc::now().timestamp());

        let url = format!("{}/air_pollution/history", self.base_url);
        let mut query = coords_query(coords);
        query.push(("start", start.to_string()));
        query.push(("end", end.to_string()));

        let resp: PollutionResponse =
            self.get_json(&url, query, "air pollution history", cancel).await?;

        let series = into_series(resp, coords)?;
        tracing::info!(%coords, start, end, readings = series.len(), "Fetched pollution history");
        Ok(series)
    }

    /// Current weather at `coords`, in metric units.
    pub async fn fetch_weather(
        &self,
        coords: Coordinates,
        cancel: &CancellationToken,
    ) -> Result<WeatherReading, AirQualityError> {
        let url = format!("{}/weather", self.base_url);
        let mut query = coords_query(coords);
        query.push(("units", "metric".to_string()));

        let resp: WeatherResponse = self.get_json(&url, query, "weather", cancel).await?;
        let reading = WeatherReading::from(resp);

        tracing::info!(%coords, temp = reading.temperature_c, "Fetched weather");
        Ok(reading)
    }

    /// Current pollution and, if requested, weather, fetched concurrently.
    ///
    /// A weather failure is logged and returned alongside the pollution result;
    /// only a pollution failure fails the whole call.
    pub async fn fetch_conditions(
        &self,
        coords: Coordinates,
        include_weather: bool,
        cancel: &CancellationToken,
    ) -> Result<Conditions, AirQualityError> {
        if !include_weather {
            let pollution = self.fetch_current_pollution(coords, cancel).await?;
            return Ok(Conditions { pollution, weather: None });
        }

        let (pollution, weather) = tokio::join!(
            self.fetch_current_pollution(coords, cancel),
            self.fetch_weather(coords, cancel),
        );

        let pollution = pollution?;

        match &weather {
            Err(AirQualityError::Cancelled) => tracing::debug!("Weather fetch cancelled"),
            Err(err) => tracing::warn!(error = %err, "Weather fetch failed; keeping pollution result"),
            Ok(_) => {}
        }

        Ok(Conditions { pollution, weather: Some(weather) })
    }

    /// Send a GET, racing it against `cancel`, and decode a JSON body of type `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        mut query: Vec<(&'static str, String)>,
        what: &'static str,
        cancel: &CancellationToken,
    ) -> Result<T, AirQualityError> {
        if cancel.is_cancelled() {
            return Err(AirQualityError::Cancelled);
        }

        tracing::debug!(url, "Requesting {what}");
        query.push(("appid", self.api_key.clone()));

        // Dropping the transport future on cancellation aborts the request;
        // nothing from a late response can reach the caller.
        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(url, "Request for {what} cancelled");
                return Err(AirQualityError::Cancelled);
            }
            reply = self.transport.get(url, &query) => reply,
        };
        let reply = reply.map_err(|err| {
            AirQualityError::upstream(None, format!("{what} request failed: {err:#}"))
        })?;

        if !reply.is_success() {
            return Err(AirQualityError::upstream(
                Some(reply.status),
                format!("{what} request rejected: {}", truncate_body(&reply.body)),
            ));
        }

        serde_json::from_str(&reply.body).map_err(|err| {
            AirQualityError::upstream(Some(reply.status), format!("malformed {what} payload: {err}"))
        })
    }
}

fn coords_query(coords: Coordinates) -> Vec<(&'static str, String)> {
    vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
}

/// A payload that parsed but carries values outside their documented ranges.
/// Only reachable after a 2xx reply, hence the fixed status.
fn invalid_payload(what: &str, detail: String) -> AirQualityError {
    AirQualityError::upstream(Some(200), format!("invalid {what} payload: {detail}"))
}

fn into_series(resp: PollutionResponse, coords: Coordinates) -> Result<PollutionSeries, AirQualityError> {
    let readings = resp.into_readings().map_err(|detail| invalid_payload("air pollution", detail))?;
    PollutionSeries::new(readings)
        .ok_or_else(|| AirQualityError::NotFound(format!("pollution data at {coords}")))
}

/// Resolve optional history bounds against `now` (unix seconds).
fn history_window(start: Option<i64>, end: Option<i64>, now: i64) -> (i64, i64) {
    let end = end.unwrap_or(now);
    let start = start.unwrap_or_else(|| end.saturating_sub(DEFAULT_HISTORY_SECS));
    (start, end)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
