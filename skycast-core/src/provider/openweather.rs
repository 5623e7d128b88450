use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{
    config::{API_KEY_VAR, Config},
    error::WeatherError,
    model::{CurrentConditions, DEFAULT_ICON, Forecast, ForecastPoint, LocationCandidate},
    provider::{CURRENT_FETCH_ERROR, FORECAST_FETCH_ERROR, SEARCH_FETCH_ERROR},
};

use super::WeatherApi;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const GEO_RESULT_LIMIT: &str = "5";
const MAX_FORECAST_DAYS: usize = 5;

/// OpenWeather-backed implementation of [`WeatherApi`].
///
/// Base URLs and the API key come from [`Config`] at construction; the key's
/// presence is still verified at the top of every call so a half-configured
/// environment fails identically on each request.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    weather_base: String,
    geocode_base: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            weather_base: config.weather_base_url().to_string(),
            geocode_base: config.geocode_base_url().to_string(),
            http,
        })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(WeatherError::Configuration(API_KEY_VAR))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        message: &'static str,
    ) -> Result<T, WeatherError> {
        let res = self.http.get(url).query(query).send().await.map_err(|e| {
            tracing::warn!(error = %e, url, "provider request failed");
            WeatherError::provider(message, None)
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::warn!(error = %e, url, "failed to read provider response body");
            WeatherError::provider(message, Some(status.as_u16()))
        })?;

        if !status.is_success() {
            tracing::warn!(%status, url, body = %truncate_body(&body), "provider returned error status");
            return Err(WeatherError::provider(message, Some(status.as_u16())));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, url, "failed to parse provider JSON");
            WeatherError::provider(message, None)
        })
    }

    async fn fetch_current(
        &self,
        params: Vec<(&'static str, String)>,
    ) -> Result<CurrentConditions, WeatherError> {
        let key = self.api_key()?;

        let mut query = params;
        query.push(("appid", key.to_string()));
        query.push(("units", "metric".to_string()));

        let url = format!("{}/weather", self.weather_base);
        let parsed: OwCurrentResponse = self.get_json(&url, &query, CURRENT_FETCH_ERROR).await?;

        Ok(map_current(parsed))
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn current_conditions(&self, query: &str) -> Result<CurrentConditions, WeatherError> {
        self.fetch_current(vec![("q", query.to_string())]).await
    }

    async fn current_at(&self, lat: f64, lon: f64) -> Result<CurrentConditions, WeatherError> {
        self.fetch_current(vec![("lat", lat.to_string()), ("lon", lon.to_string())])
            .await
    }

    async fn forecast(&self, query: &str) -> Result<Forecast, WeatherError> {
        let key = self.api_key()?;

        let params = vec![
            ("q", query.to_string()),
            ("appid", key.to_string()),
            ("units", "metric".to_string()),
        ];

        let url = format!("{}/forecast", self.weather_base);
        let parsed: OwForecastResponse = self.get_json(&url, &params, FORECAST_FETCH_ERROR).await?;

        Ok(select_noon_points(&parsed.list))
    }

    async fn search_locations(
        &self,
        query: &str,
    ) -> Result<Vec<LocationCandidate>, WeatherError> {
        let key = self.api_key()?;

        let params = vec![
            ("q", query.to_string()),
            ("limit", GEO_RESULT_LIMIT.to_string()),
            ("appid", key.to_string()),
        ];

        let url = format!("{}/direct", self.geocode_base);
        let parsed: Vec<OwGeoResult> = self.get_json(&url, &params, SEARCH_FETCH_ERROR).await?;

        Ok(parsed
            .into_iter()
            .map(|r| LocationCandidate {
                name: r.name,
                country: r.country.unwrap_or_default(),
                latitude: r.lat,
                longitude: r.lon,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    visibility: Option<u32>,
    #[serde(default)]
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwRangeMain {
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwRangeMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoResult {
    name: String,
    #[serde(default)]
    country: Option<String>,
    lat: f64,
    lon: f64,
}

fn condition_of(weather: &[OwWeather]) -> String {
    weather
        .first()
        .and_then(|w| w.main.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn icon_of(weather: &[OwWeather]) -> String {
    weather
        .first()
        .and_then(|w| w.icon.clone())
        .unwrap_or_else(|| DEFAULT_ICON.to_string())
}

fn map_current(parsed: OwCurrentResponse) -> CurrentConditions {
    let country = parsed.sys.and_then(|s| s.country);
    let display_location = match country {
        Some(c) if !c.is_empty() => format!("{}, {}", parsed.name, c),
        _ => parsed.name,
    };

    let visibility_m = parsed.visibility.unwrap_or(0);

    CurrentConditions {
        temperature_c: parsed.main.temp.round() as i32,
        condition: condition_of(&parsed.weather),
        humidity_pct: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
        visibility_km: (f64::from(visibility_m) / 1000.0).round() as u32,
        icon: icon_of(&parsed.weather),
        display_location,
    }
}

/// Pick the noon sample of each day from the 3-hourly series, at most 5,
/// keeping the provider's chronological order. Entries with an unparseable
/// timestamp are skipped; short series are returned short, never padded.
fn select_noon_points(list: &[OwForecastEntry]) -> Forecast {
    list.iter()
        .filter_map(|entry| {
            let ts = NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S").ok()?;
            let noon = NaiveTime::from_hms_opt(12, 0, 0)?;
            if ts.time() != noon {
                return None;
            }

            Some(ForecastPoint {
                date: ts.date().format("%Y-%m-%d").to_string(),
                temp_min_c: entry.main.temp_min.round() as i32,
                temp_max_c: entry.main.temp_max.round() as i32,
                condition: condition_of(&entry.weather),
                icon: icon_of(&entry.weather),
                humidity_pct: entry.main.humidity,
                wind_speed: entry.wind.speed,
            })
        })
        .take(MAX_FORECAST_DAYS)
        .collect()
}

fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    match body.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
