use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::error::Error;

const KELVIN_TO_CELSIUS: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_kelvin(&self, k: f64) -> f64 {
        let c = k - KELVIN_TO_CELSIUS;
        match self {
            TemperatureUnit::Celsius => c,
            TemperatureUnit::Fahrenheit => c * 9.0 / 5.0 + 32.0,
        }
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" | "c" => Ok(TemperatureUnit::Celsius),
            "F" | "f" => Ok(TemperatureUnit::Fahrenheit),
            s => Err(Error::UnknownTemperatureUnit(s.to_owned())),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "C"),
            TemperatureUnit::Fahrenheit => write!(f, "F"),
        }
    }
}

/// A single weather reading, already converted to the requested unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    time: DateTime<Utc>,
    temperature: f64,
    clouds: f64,
    rain: f64,
    snow: f64,
    wind_speed: f64,
    wind_deg: f64,
    condition: u32,
}

impl Observation {
    pub fn new(time: DateTime<Utc>, temperature: f64) -> Self {
        Self {
            time,
            temperature,
            clouds: 0.0,
            rain: 0.0,
            snow: 0.0,
            wind_speed: 0.0,
            wind_deg: 0.0,
            condition: 800,
        }
    }

    pub fn with_clouds(mut self, clouds: f64) -> Self {
        self.clouds = clouds;
        self
    }

    pub fn with_rain(mut self, rain: f64) -> Self {
        self.rain = rain;
        self
    }

    pub fn with_snow(mut self, snow: f64) -> Self {
        self.snow = snow;
        self
    }

    pub fn with_wind(mut self, speed: f64, deg: f64) -> Self {
        self.wind_speed = speed;
        self.wind_deg = deg;
        self
    }

    pub fn with_condition(mut self, condition: u32) -> Self {
        self.condition = condition;
        self
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Cloud coverage in percent.
    pub fn clouds(&self) -> f64 {
        self.clouds
    }

    /// Rain volume over the last 3 hours, mm.
    pub fn rain(&self) -> f64 {
        self.rain
    }

    /// Snow volume over the last 3 hours, mm.
    pub fn snow(&self) -> f64 {
        self.snow
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    /// Meteorological direction the wind blows from, degrees.
    pub fn wind_deg(&self) -> f64 {
        self.wind_deg
    }

    pub fn condition(&self) -> u32 {
        self.condition
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    max: f64,
    min: f64,
}

impl TemperatureRange {
    pub fn new(max: f64, min: f64) -> Self {
        if max >= min {
            Self { max, min }
        } else {
            Self { max: min, min: max }
        }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// The query contract the renderer needs from a weather source.
pub trait Forecast {
    fn current(&self) -> Option<&Observation>;

    /// The first observation strictly after `t`.
    fn at(&self, t: DateTime<Utc>) -> Option<&Observation>;

    /// Max and min over observations at or before `horizon`.
    fn temperature_range(&self, horizon: DateTime<Utc>) -> Option<TemperatureRange>;

    /// UTC offset of the forecast location, if the source reported one.
    fn utc_offset(&self) -> Option<FixedOffset>;
}

/// Ordered observations, the current reading first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeline {
    observations: Vec<Observation>,
    #[serde(skip)]
    utc_offset: Option<FixedOffset>,
}

impl Timeline {
    pub fn new(current: Observation, mut forecast: Vec<Observation>) -> Self {
        forecast.sort_by_key(|o| o.time);
        let mut observations = Vec::with_capacity(forecast.len() + 1);
        observations.push(current);
        observations.extend(forecast);
        Self {
            observations,
            utc_offset: None,
        }
    }

    pub fn with_utc_offset(mut self, offset: Option<FixedOffset>) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl Forecast for Timeline {
    fn current(&self) -> Option<&Observation> {
        self.observations.first()
    }

    fn at(&self, t: DateTime<Utc>) -> Option<&Observation> {
        self.observations.iter().find(|o| o.time > t)
    }

    fn temperature_range(&self, horizon: DateTime<Utc>) -> Option<TemperatureRange> {
        let mut temps = self
            .observations
            .iter()
            .filter(|o| o.time <= horizon)
            .map(|o| o.temperature);
        let first = temps.next()?;
        let (max, min) = temps.fold((first, first), |(max, min), t| (max.max(t), min.min(t)));
        Some(TemperatureRange::new(max, min))
    }

    fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn timeline(temps: &[f64]) -> Timeline {
        let current = Observation::new(t0() - Duration::minutes(5), temps[0]);
        let forecast = temps[1..]
            .iter()
            .enumerate()
            .map(|(i, t)| Observation::new(t0() + Duration::hours(3 * i as i64 + 1), *t))
            .collect();
        Timeline::new(current, forecast)
    }

    #[test]
    fn unit_parsing() {
        assert_eq!("C".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert_eq!("f".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert!(matches!(
            "K".parse::<TemperatureUnit>(),
            Err(Error::UnknownTemperatureUnit(_))
        ));
    }

    #[test]
    fn kelvin_conversion() {
        assert!((TemperatureUnit::Celsius.from_kelvin(273.15)).abs() < 1e-9);
        assert!((TemperatureUnit::Fahrenheit.from_kelvin(373.15) - 212.0).abs() < 1e-9);
    }

    #[test]
    fn at_returns_first_strictly_after() {
        let tl = timeline(&[5.0, 6.0, 7.0]);
        let first = tl.observations()[1].time();
        assert_eq!(tl.at(first - Duration::seconds(1)).unwrap().temperature(), 6.0);
        assert_eq!(tl.at(first).unwrap().temperature(), 7.0);

        let last = tl.observations()[2].time();
        assert!(tl.at(last).is_none());
        assert!(tl.at(last + Duration::hours(10)).is_none());
    }

    #[test]
    fn at_misses_only_past_last_observation() {
        let tl = timeline(&[1.0, 2.0, 3.0, 4.0]);
        let last = tl.observations().last().unwrap().time();
        let mut t = t0() - Duration::hours(2);
        while t < last + Duration::hours(2) {
            let any_after = tl.observations().iter().any(|o| o.time() > t);
            assert_eq!(tl.at(t).is_some(), any_after, "at {}", t);
            t += Duration::minutes(17);
        }
    }

    #[test]
    fn range_respects_horizon() {
        let tl = timeline(&[5.0, -3.0, 12.0, 40.0]);
        let r = tl.temperature_range(t0() + Duration::hours(5)).unwrap();
        assert_eq!(r.max(), 12.0);
        assert_eq!(r.min(), -3.0);
        assert!(r.max() >= r.min());

        assert!(tl
            .temperature_range(t0() - Duration::hours(1))
            .is_none());
    }

    #[test]
    fn forecast_is_sorted_after_current() {
        let current = Observation::new(t0(), 1.0);
        let tl = Timeline::new(
            current,
            vec![
                Observation::new(t0() + Duration::hours(6), 3.0),
                Observation::new(t0() + Duration::hours(3), 2.0),
            ],
        );
        let temps: Vec<f64> = tl.observations().iter().map(|o| o.temperature()).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0]);
    }
}
