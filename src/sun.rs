//! Sunrise and sunset times and where they land on the landscape.

use chrono::prelude::*;
use chrono::Duration;

use crate::location::Location;
use crate::mapper::Layout;
use crate::time::{Bucket, Day, CADENCE_HOURS};

const CADENCE_SECS: f64 = (CADENCE_HOURS * 3600) as f64;

/// Source of sunrise and sunset instants for a calendar day.
pub trait SunCalculator {
    fn sunrise(&self, day: NaiveDate) -> Option<DateTime<Utc>>;
    fn sunset(&self, day: NaiveDate) -> Option<DateTime<Utc>>;
}

/// Almanac sunrise equation with the official 90°50′ zenith.
///
/// Returns `None` when the sun stays above or below the horizon all day.
#[derive(Debug, Clone, Copy)]
pub struct Almanac {
    lat: f64,
    lng: f64,
}

const ZENITH: f64 = 90.8;

impl Almanac {
    pub fn new(loc: Location) -> Self {
        Self {
            lat: loc.lat(),
            lng: loc.lng(),
        }
    }

    fn event(&self, day: NaiveDate, rising: bool) -> Option<DateTime<Utc>> {
        let to_rad = std::f64::consts::PI / 180.0;
        let n = day.ordinal() as f64;

        let lng_hour = self.lng / 15.0;
        let t = if rising {
            n + (6.0 - lng_hour) / 24.0
        } else {
            n + (18.0 - lng_hour) / 24.0
        };

        // mean anomaly and true longitude
        let m = 0.9856 * t - 3.289;
        let l = wrap(
            m + 1.916 * (to_rad * m).sin() + 0.020 * (to_rad * 2.0 * m).sin() + 282.634,
            360.0,
        );

        // right ascension, in the same quadrant as l
        let ra = wrap((0.91764 * (to_rad * l).tan()).atan() / to_rad, 360.0);
        let ra = (ra + ((l / 90.0).floor() * 90.0 - (ra / 90.0).floor() * 90.0)) / 15.0;

        let sin_dec = 0.39782 * (to_rad * l).sin();
        let cos_dec = sin_dec.asin().cos();

        let cos_h = ((to_rad * ZENITH).cos() - sin_dec * (to_rad * self.lat).sin())
            / (cos_dec * (to_rad * self.lat).cos());
        if !(-1.0..=1.0).contains(&cos_h) {
            return None;
        }

        let h = if rising {
            360.0 - cos_h.acos() / to_rad
        } else {
            cos_h.acos() / to_rad
        };
        let h = h / 15.0;

        let local_mean = h + ra - 0.06571 * t - 6.622;
        let ut = wrap(local_mean - lng_hour, 24.0);

        let minutes = (ut * 60.0).round() as i64;
        let midnight = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?);
        Some(midnight + Duration::minutes(minutes))
    }
}

fn wrap(v: f64, max: f64) -> f64 {
    v.rem_euclid(max)
}

impl SunCalculator for Almanac {
    fn sunrise(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        self.event(day, true)
    }

    fn sunset(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        self.event(day, false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunEventKind {
    Sunrise,
    Sunset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunEvent {
    pub time: DateTime<Utc>,
    pub kind: SunEventKind,
}

/// Days from the one before `now` through the day containing `horizon`.
pub fn days_spanning(now: DateTime<Utc>, horizon: DateTime<Utc>) -> usize {
    Day::containing(now)
        .prev()
        .through(Day::containing(horizon))
        .count()
}

/// Sunrises, then sunsets, for `days` consecutive days starting the day
/// before `now`.
pub fn schedule<C: SunCalculator>(calc: &C, now: DateTime<Utc>, days: usize) -> Vec<SunEvent> {
    let first = Day::containing(now).prev();
    let last = Day::new(first.date() + Duration::days(days as i64 - 1));

    let rises = first.through(last).filter_map(|d| {
        calc.sunrise(d.date()).map(|time| SunEvent {
            time,
            kind: SunEventKind::Sunrise,
        })
    });
    let sets = first.through(last).filter_map(|d| {
        calc.sunset(d.date()).map(|time| SunEvent {
            time,
            kind: SunEventKind::Sunset,
        })
    });
    rises.chain(sets).collect()
}

/// Horizontal offset of `t` within `bucket`, relative to the bucket's x.
pub fn offset_in_bucket(layout: &Layout, bucket: &Bucket, t: DateTime<Utc>) -> i32 {
    let secs = (t - bucket.start()).num_seconds() as f64;
    (secs * layout.x_step as f64 / CADENCE_SECS) as i32 - layout.half_step()
}

/// Column of every event falling inside `bucket`.
pub fn placements(layout: &Layout, bucket: &Bucket, events: &[SunEvent]) -> Vec<(SunEventKind, i32)> {
    events
        .iter()
        .filter(|e| bucket.contains(e.time))
        .map(|e| (e.kind, bucket.x() + offset_in_bucket(layout, bucket, e.time)))
        .collect()
}
