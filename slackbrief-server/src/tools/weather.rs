//! US National Weather Service tools.

use super::args::{ArgError, Args};
use super::{ToolHandler, ToolOutcome, ToolSpec};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

const ALERT_SEPARATOR: &str = "\n---\n";
const FORECAST_PERIODS: usize = 5;

pub struct NwsApi {
    http: Client,
    base: String,
}

impl NwsApi {
    pub fn new(http: Client, base: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// GET a GeoJSON document; any failure is logged and reported as `None`.
    async fn fetch(&self, url: &str) -> Option<Value> {
        debug!(url, "Requesting NWS data");
        let response = match self
            .http
            .get(url)
            .header(ACCEPT, "application/geo+json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
        {
            Ok(response) => response,
            Err(err) => {
                warn!(url, error = %err, "NWS request failed");
                return None;
            }
        };
        match response.json::<Value>().await {
            Ok(body) => Some(body),
            Err(err) => {
                warn!(url, error = %err, "NWS response was not JSON");
                None
            }
        }
    }
}

fn text_field<'a>(object: &'a Value, key: &str, default: &'a str) -> &'a str {
    object.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn display_field(object: &Value, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "Unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn format_alert(feature: &Value) -> String {
    let props = feature.get("properties").unwrap_or(&Value::Null);
    format!(
        "Event: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}",
        text_field(props, "event", "Unknown"),
        text_field(props, "areaDesc", "Unknown"),
        text_field(props, "severity", "Unknown"),
        text_field(props, "description", "No description available"),
        text_field(props, "instruction", "No specific instructions provided"),
    )
}

pub fn format_period(period: &Value) -> String {
    format!(
        "{}:\nTemperature: {}°{}\nWind: {} {}\nForecast: {}",
        display_field(period, "name"),
        display_field(period, "temperature"),
        text_field(period, "temperatureUnit", ""),
        display_field(period, "windSpeed"),
        text_field(period, "windDirection", ""),
        display_field(period, "detailedForecast"),
    )
}

pub struct GetAlerts {
    api: Arc<NwsApi>,
}

impl GetAlerts {
    pub fn new(api: Arc<NwsApi>) -> Self {
        Self { api }
    }
}

fn state_code(arguments: &Value) -> Result<String, ArgError> {
    let state = Args::new(arguments)?.string("state")?.trim();
    if state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(state.to_ascii_uppercase())
    } else {
        Err(ArgError::new(format!(
            "'state' must be a two-letter US state code, got '{state}'"
        )))
    }
}

#[async_trait]
impl ToolHandler for GetAlerts {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_alerts",
            description: "Get weather alerts for a US state.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "state": {
                        "type": "string",
                        "description": "Two-letter US state code (e.g. CA, NY)"
                    }
                },
                "required": ["state"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> ToolOutcome {
        let state = match state_code(&arguments) {
            Ok(state) => state,
            Err(err) => return err.into(),
        };
        info!(state = %state, "Getting weather alerts");

        let url = self.api.url(&format!("alerts/active/area/{state}"));
        let Some(features) = self
            .api
            .fetch(&url)
            .await
            .and_then(|data| data.get("features").and_then(Value::as_array).cloned())
        else {
            warn!(state = %state, "Unable to fetch alerts or no alerts found");
            return ToolOutcome::Failure("Unable to fetch alerts or no alerts found.".to_string());
        };

        if features.is_empty() {
            info!(state = %state, "No active alerts");
            return ToolOutcome::Success("No active alerts for this state.".to_string());
        }

        info!(state = %state, alerts = features.len(), "Returning alerts");
        let alerts: Vec<String> = features.iter().map(format_alert).collect();
        ToolOutcome::Success(alerts.join(ALERT_SEPARATOR))
    }
}

pub struct GetForecast {
    api: Arc<NwsApi>,
}

impl GetForecast {
    pub fn new(api: Arc<NwsApi>) -> Self {
        Self { api }
    }
}

fn coordinates(arguments: &Value) -> Result<(f64, f64), ArgError> {
    let args = Args::new(arguments)?;
    let latitude = args.number("latitude")?;
    let longitude = args.number("longitude")?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ArgError::new(format!(
            "'latitude' must be between -90 and 90, got {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ArgError::new(format!(
            "'longitude' must be between -180 and 180, got {longitude}"
        )));
    }
    Ok((latitude, longitude))
}

#[async_trait]
impl ToolHandler for GetForecast {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_forecast",
            description: "Get weather forecast for a location.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "latitude": {"type": "number", "description": "Latitude of the location"},
                    "longitude": {"type": "number", "description": "Longitude of the location"}
                },
                "required": ["latitude", "longitude"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> ToolOutcome {
        let (latitude, longitude) = match coordinates(&arguments) {
            Ok(coords) => coords,
            Err(err) => return err.into(),
        };
        info!(latitude, longitude, "Getting weather forecast");

        let points_url = self.api.url(&format!("points/{latitude},{longitude}"));
        let Some(forecast_url) = self.api.fetch(&points_url).await.and_then(|points| {
            points
                .pointer("/properties/forecast")
                .and_then(Value::as_str)
                .map(str::to_string)
        }) else {
            warn!(latitude, longitude, "Unable to fetch forecast data for location");
            return ToolOutcome::Failure("Unable to fetch forecast data for this location.".to_string());
        };

        let Some(periods) = self.api.fetch(&forecast_url).await.and_then(|forecast| {
            forecast
                .pointer("/properties/periods")
                .and_then(Value::as_array)
                .cloned()
        }) else {
            warn!(latitude, longitude, "Unable to fetch detailed forecast");
            return ToolOutcome::Failure("Unable to fetch detailed forecast.".to_string());
        };

        let forecasts: Vec<String> = periods
            .iter()
            .take(FORECAST_PERIODS)
            .map(format_period)
            .collect();
        info!(latitude, longitude, periods = forecasts.len(), "Returning forecast");
        ToolOutcome::Success(forecasts.join(ALERT_SEPARATOR))
    }
}
