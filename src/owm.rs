//! OpenWeatherMap shaped payloads: one "current weather" document and one
//! 5 day / 3 hour "forecast" document.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::weather::{Observation, TemperatureUnit, Timeline};

#[derive(Debug, Deserialize)]
struct Entry {
    dt: Option<i64>,
    #[serde(default)]
    weather: Vec<Condition>,
    main: Option<Main>,
    clouds: Option<Clouds>,
    rain: Option<Volume>,
    snow: Option<Volume>,
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Clouds {
    #[serde(default)]
    all: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Volume {
    #[serde(rename = "3h", default)]
    three_hours: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct Current {
    #[serde(flatten)]
    entry: Entry,
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ForecastList {
    list: Option<Vec<serde_json::Value>>,
}

impl Entry {
    fn into_observation(self, unit: TemperatureUnit) -> Result<Observation> {
        let dt = self.dt.ok_or(Error::MissingField("dt"))?;
        let time = Utc
            .timestamp_opt(dt, 0)
            .single()
            .ok_or(Error::MissingField("dt"))?;
        let condition = self
            .weather
            .first()
            .and_then(|w| w.id)
            .ok_or(Error::MissingField("weather.id"))?;
        let kelvin = self
            .main
            .and_then(|m| m.temp)
            .ok_or(Error::MissingField("main.temp"))?;
        let wind = self.wind.unwrap_or_default();

        Ok(Observation::new(time, unit.from_kelvin(kelvin))
            .with_condition(condition)
            .with_clouds(self.clouds.unwrap_or_default().all)
            .with_rain(self.rain.unwrap_or_default().three_hours)
            .with_snow(self.snow.unwrap_or_default().three_hours)
            .with_wind(wind.speed, wind.deg))
    }
}

/// Builds a timeline from the raw current and forecast documents.
///
/// The current document must be complete. Forecast entries with missing
/// required fields are skipped.
pub fn parse_timeline(
    current: &serde_json::Value,
    forecast: &serde_json::Value,
    unit: TemperatureUnit,
) -> Result<Timeline> {
    let current = Current::deserialize(current)?;
    let offset = current.timezone.and_then(FixedOffset::east_opt);
    let now = current.entry.into_observation(unit)?;

    let list = ForecastList::deserialize(forecast)?.list.unwrap_or_else(|| {
        tracing::warn!("forecast document has no list");
        Vec::new()
    });

    let mut entries = Vec::with_capacity(list.len());
    for (ix, value) in list.into_iter().enumerate() {
        match Entry::deserialize(value)
            .map_err(Error::from)
            .and_then(|e| e.into_observation(unit))
        {
            Ok(o) => entries.push(o),
            Err(e) => tracing::warn!(entry = ix, error = %e, "skipping forecast entry"),
        }
    }

    tracing::debug!(entries = entries.len(), ?offset, "parsed forecast");
    Ok(Timeline::new(now, entries).with_utc_offset(offset))
}

/// Raw payloads as stored in the cache, stamped with their fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix seconds at which the payloads were obtained.
    pub time: f64,
    pub current: serde_json::Value,
    pub forecast: serde_json::Value,
}

impl Snapshot {
    pub fn new(
        fetched: DateTime<Utc>,
        current: serde_json::Value,
        forecast: serde_json::Value,
    ) -> Self {
        Self {
            time: fetched.timestamp() as f64,
            current,
            forecast,
        }
    }

    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - self.time as i64
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl_secs: i64) -> bool {
        self.age_secs(now) < ttl_secs
    }

    pub fn timeline(&self, unit: TemperatureUnit) -> Result<Timeline> {
        parse_timeline(&self.current, &self.forecast, unit)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(b: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(b)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::Forecast;
    use serde_json::json;

    fn current() -> serde_json::Value {
        json!({
            "dt": 1_700_000_000,
            "weather": [{"id": 500}],
            "main": {"temp": 283.15},
            "clouds": {"all": 75},
            "wind": {"speed": 4.5, "deg": 270},
            "timezone": 3600
        })
    }

    #[test]
    fn parses_current_and_forecast() {
        let forecast = json!({"list": [
            {"dt": 1_700_010_800, "weather": [{"id": 800}], "main": {"temp": 285.15},
             "rain": {"3h": 1.25}},
            {"dt": 1_700_003_600, "weather": [{"id": 600}], "main": {"temp": 273.15},
             "snow": {"3h": 0.5}}
        ]});

        let tl = parse_timeline(&current(), &forecast, TemperatureUnit::Celsius).unwrap();
        assert_eq!(tl.len(), 3);

        let now = tl.current().unwrap();
        assert!((now.temperature() - 10.0).abs() < 1e-9);
        assert_eq!(now.clouds(), 75.0);
        assert_eq!(now.wind_speed(), 4.5);
        assert_eq!(now.condition(), 500);
        assert_eq!(tl.utc_offset(), FixedOffset::east_opt(3600));

        let o = tl.observations();
        assert!((o[1].temperature()).abs() < 1e-9);
        assert_eq!(o[1].snow(), 0.5);
        assert_eq!(o[2].rain(), 1.25);
        assert_eq!(o[2].clouds(), 0.0);
    }

    #[test]
    fn fahrenheit_is_converted_at_parse_time() {
        let tl = parse_timeline(&current(), &json!({"list": []}), TemperatureUnit::Fahrenheit)
            .unwrap();
        assert!((tl.current().unwrap().temperature() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_forecast_entries_are_skipped() {
        let forecast = json!({"list": [
            {"dt": 1_700_010_800, "main": {"temp": 285.15}},
            {"weather": [{"id": 800}], "main": {"temp": 285.15}},
            "garbage",
            {"dt": 1_700_021_600, "weather": [{"id": 800}], "main": {"temp": 290.15}}
        ]});
        let tl = parse_timeline(&current(), &forecast, TemperatureUnit::Celsius).unwrap();
        assert_eq!(tl.len(), 2);
    }

    #[test]
    fn missing_list_keeps_current_only() {
        let tl = parse_timeline(&current(), &json!({"cod": "401"}), TemperatureUnit::Celsius)
            .unwrap();
        assert_eq!(tl.len(), 1);
    }

    #[test]
    fn incomplete_current_is_fatal() {
        let bad = json!({"dt": 1_700_000_000, "weather": [{"id": 500}]});
        let err = parse_timeline(&bad, &json!({"list": []}), TemperatureUnit::Celsius);
        assert!(matches!(err, Err(Error::MissingField("main.temp"))));
    }

    #[test]
    fn snapshot_freshness() {
        let fetched = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let snap = Snapshot::new(fetched, current(), json!({"list": []}));
        let bytes = snap.to_bytes().unwrap();
        let snap = Snapshot::from_bytes(&bytes).unwrap();

        assert!(snap.is_fresh(fetched + chrono::Duration::seconds(3599), 3600));
        assert!(!snap.is_fresh(fetched + chrono::Duration::seconds(3600), 3600));
    }
}
