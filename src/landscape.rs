//! The render pipeline: one timeline in, one bi-level landscape out.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::canvas::{Canvas, Color};
use crate::curve::{self, TemperatureLine};
use crate::diurnal::{self, LocalClock, Marker};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::mapper::{Layout, TemperatureMapper};
use crate::sprites::{Icon, Sprites};
use crate::sun::{self, SunCalculator, SunEventKind};
use crate::time::{cadence, Bucket, Buckets};
use crate::weather::{Forecast, Observation, TemperatureRange};

/// Rows between the curve and the numerals drawn under it.
const LABEL_DROP: i32 = 10;
/// Column of the current temperature numeral.
const CURRENT_LABEL_X: i32 = 8;

/// Validated inputs for one render.
#[derive(Debug, Clone)]
pub struct Settings {
    location: Location,
    layout: Layout,
    zone: Tz,
    now: DateTime<Utc>,
    sun_days: Option<usize>,
}

impl Settings {
    pub fn new(
        location: Location,
        width: u32,
        height: u32,
        zone: Tz,
        now: DateTime<Utc>,
    ) -> Result<Settings> {
        Ok(Settings {
            location,
            layout: Layout::new(width, height)?,
            zone,
            now,
            sun_days: None,
        })
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Overrides how many days of sunrises and sunsets are scheduled.
    pub fn with_sun_days(mut self, days: Option<usize>) -> Self {
        self.sun_days = days;
        self
    }

    /// Days of sun events, by default enough to reach the horizon.
    pub fn sun_days(&self) -> usize {
        self.sun_days
            .unwrap_or_else(|| sun::days_spanning(self.now, self.horizon()))
    }

    /// End of the window the curve covers.
    pub fn horizon(&self) -> DateTime<Utc> {
        self.now + cadence() * self.layout.bucket_count() as i32
    }
}

/// Output of a render.
pub struct Landscape {
    pub canvas: Canvas,
    pub line: TemperatureLine,
}

impl Landscape {
    /// Renders `forecast` in five fixed passes: current conditions, curve,
    /// sun and moon, per-bucket overlays, then the curve dots.
    pub fn draw<F, S>(settings: &Settings, forecast: &F, sun: &S) -> Result<Landscape>
    where
        F: Forecast,
        S: SunCalculator,
    {
        let layout = settings.layout;
        let now = settings.now;
        let current = forecast.current().ok_or(Error::NoCurrentObservation)?;

        let count = layout.bucket_count();
        let horizon = settings.horizon();
        let range = forecast.temperature_range(horizon).unwrap_or_else(|| {
            TemperatureRange::new(current.temperature(), current.temperature())
        });
        let mapper = TemperatureMapper::new(&layout, range)?;
        tracing::debug!(
            max = range.max(),
            min = range.min(),
            degrees_per_pixel = mapper.degrees_per_pixel(),
            buckets = count,
            "temperature scale"
        );

        let buckets: Vec<(Bucket, Option<&Observation>)> =
            Buckets::new(now, layout.x_start, layout.x_step, count)
                .map(|b| (b, forecast.at(b.start())))
                .collect();

        let sprites = Sprites::new();
        let mut canvas = Canvas::new(layout.width, layout.height);
        let y_clouds = layout.y_clouds();

        // current conditions
        let y0 = mapper.to_pixel_y(current.temperature());
        let samples: Vec<Option<i32>> = buckets
            .iter()
            .map(|(_, o)| o.map(|o| mapper.to_pixel_y(o.temperature())))
            .collect();
        let line = curve::interpolate(&layout, y0, &samples);

        sprites.draw(&mut canvas, Icon::House, 0, 0, y0);
        sprites.draw_int(&mut canvas, current.temperature(), CURRENT_LABEL_X, y0 + LABEL_DROP);
        sprites.draw_cloud(&mut canvas, current.clouds(), 0, y_clouds, layout.x_start);
        sprites.draw_rain(&mut canvas, current.rain(), 0, y_clouds, layout.x_start, &line);
        sprites.draw_snow(&mut canvas, current.snow(), 0, y_clouds, layout.x_start, &line);

        // sun and moon
        let events = sun::schedule(sun, now, settings.sun_days());
        tracing::debug!(events = events.len(), "sun schedule");
        for (bucket, obs) in &buckets {
            if obs.is_none() {
                continue;
            }
            for (kind, x) in sun::placements(&layout, bucket, &events) {
                let icon = match kind {
                    SunEventKind::Sunrise => Icon::Sun,
                    SunEventKind::Sunset => Icon::Moon,
                };
                sprites.draw(&mut canvas, icon, 0, x, layout.y_sunmoon());
            }
        }

        // per-bucket overlays
        let clock = LocalClock::resolve(forecast.utc_offset(), settings.zone);
        let n = layout.ease();
        for (bucket, obs) in &buckets {
            let Some(obs) = obs else {
                tracing::debug!(bucket = bucket.index(), "no forecast for bucket");
                continue;
            };
            let x = bucket.x();
            if let Some(y) = line.get(x + n) {
                sprites.draw_int(&mut canvas, obs.temperature(), x + n, y + LABEL_DROP);
            }

            for (ix, marker) in diurnal::markers(&layout, x, obs, &clock, line.len()) {
                match marker {
                    Marker::DayFlower | Marker::NightFlower => {
                        let variant = if marker == Marker::DayFlower { 1 } else { 0 };
                        if let Some(y) = line.get(ix) {
                            sprites.draw(&mut canvas, Icon::Flower, variant, ix, y);
                        }
                    }
                    Marker::Wind { speed, deg } => {
                        sprites.draw_wind(&mut canvas, speed, deg, ix, &line)
                    }
                }
            }

            sprites.draw_cloud(&mut canvas, obs.clouds(), x, y_clouds, layout.x_step);
            sprites.draw_rain(&mut canvas, obs.rain(), x, y_clouds, layout.x_step, &line);
            sprites.draw_snow(&mut canvas, obs.snow(), x, y_clouds, layout.x_step, &line);
        }

        // the curve itself
        let height = layout.height as i32;
        for x in 0..layout.width as i32 {
            match line.get(x) {
                Some(y) if (0..height).contains(&y) => sprites.dot(&mut canvas, x, y, Color::Dark),
                y => tracing::warn!(x, ?y, max = height, "curve out of range"),
            }
        }

        Ok(Landscape { canvas, line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::Timeline;
    use chrono::{Duration, NaiveDate, TimeZone};

    struct NoSun;

    impl SunCalculator for NoSun {
        fn sunrise(&self, _: NaiveDate) -> Option<DateTime<Utc>> {
            None
        }

        fn sunset(&self, _: NaiveDate) -> Option<DateTime<Utc>> {
            None
        }
    }

    /// Sunrise at noon and sunset at six, every day.
    struct Regular;

    impl SunCalculator for Regular {
        fn sunrise(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
            Some(Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0)?))
        }

        fn sunset(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
            Some(Utc.from_utc_datetime(&day.and_hms_opt(18, 0, 0)?))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 10, 20, 0).unwrap()
    }

    fn settings(width: u32, height: u32) -> Settings {
        Settings::new(
            Location::new(52.38, -2.03).unwrap(),
            width,
            height,
            chrono_tz::UTC,
            now(),
        )
        .unwrap()
    }

    fn timeline(temps: impl Fn(usize) -> f64, n: usize) -> Timeline {
        let current = Observation::new(now() - Duration::minutes(20), temps(0));
        let forecast = (0..n)
            .map(|i| Observation::new(now() + Duration::hours(3 * i as i64 + 1), temps(i)))
            .collect();
        Timeline::new(current, forecast)
    }

    #[test]
    fn constant_temperature_is_flat() {
        let s = settings(512, 128);
        let tl = timeline(|_| 10.0, 12);
        let out = Landscape::draw(&s, &tl, &NoSun).unwrap();
        let rows = &out.line.rows()[..512];
        assert!(rows.iter().all(|&y| y == rows[0]));
        assert_eq!(rows[0], 114);
    }

    #[test]
    fn rising_temperature_climbs() {
        let s = settings(512, 128);
        let tl = timeline(|i| 20.0 * i as f64 / 11.0, 12);
        let out = Landscape::draw(&s, &tl, &NoSun).unwrap();
        let rows = &out.line.rows()[..512];
        assert!(rows.iter().all(|y| (0..128).contains(y)));
        assert!(rows.windows(2).all(|w| w[1] <= w[0]));
        assert!(rows[511] < rows[0]);
    }

    #[test]
    fn missing_current_is_fatal() {
        let s = settings(512, 128);
        let tl = Timeline::default();
        assert!(matches!(
            Landscape::draw(&s, &tl, &NoSun),
            Err(Error::NoCurrentObservation)
        ));
    }

    #[test]
    fn short_timeline_extends_last_plateau() {
        let s = settings(512, 128);
        let tl = timeline(|i| i as f64, 3);
        let out = Landscape::draw(&s, &tl, &NoSun).unwrap();
        let rows = out.line.rows();
        let last = rows[511];
        assert!(rows[200..512].iter().all(|&y| y == last));
    }

    #[test]
    fn curve_is_drawn_in_every_column() {
        let s = settings(300, 100);
        let tl = timeline(|i| (i as f64 * 0.7).sin() * 8.0, 12);
        let out = Landscape::draw(&s, &tl, &NoSun).unwrap();
        for x in 0..300 {
            let y = out.line.get(x).unwrap();
            assert_eq!(out.canvas.get(x, y), Some(Color::Dark), "column {}", x);
        }
    }

    #[test]
    fn out_of_range_columns_are_skipped() {
        let s = settings(512, 128);
        let current = Observation::new(now() - Duration::minutes(20), 10.0);
        let far = Observation::new(now() + Duration::hours(100), -60.0);
        let tl = Timeline::new(current, vec![far]);
        let out = Landscape::draw(&s, &tl, &NoSun).unwrap();

        let mut skipped = 0;
        for x in 0..512 {
            let y = out.line.get(x).unwrap();
            if (0..128).contains(&y) {
                assert_eq!(out.canvas.get(x, y), Some(Color::Dark), "column {}", x);
            } else {
                skipped += 1;
                assert!(
                    (0..128).all(|row| out.canvas.get(x, row) == Some(Color::Light)),
                    "column {}",
                    x
                );
            }
        }
        assert!(skipped > 400, "{} columns skipped", skipped);
    }

    #[test]
    fn sun_days_limit_the_schedule() {
        let tl = timeline(|_| 10.0, 12);
        let s = settings(512, 128);
        assert_eq!(s.sun_days(), 3);

        let none = Landscape::draw(&s, &tl, &NoSun).unwrap();
        let all = Landscape::draw(&s, &tl, &Regular).unwrap();
        assert_ne!(all.canvas.as_bytes(), none.canvas.as_bytes());

        let s = s.with_sun_days(Some(0));
        assert_eq!(s.sun_days(), 0);
        let skipped = Landscape::draw(&s, &tl, &Regular).unwrap();
        assert_eq!(skipped.canvas.as_bytes(), none.canvas.as_bytes());
    }
}
