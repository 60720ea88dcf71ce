//! Hour-by-hour markers along each forecast bucket.

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use chrono_tz::Tz;

use crate::mapper::Layout;
use crate::time::CADENCE_HOURS;
use crate::weather::Observation;

/// How UTC instants are turned into local wall-clock hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalClock {
    /// Offset reported by the weather source.
    Offset(FixedOffset),
    /// Reference zone supplied by the caller.
    Zone(Tz),
}

impl LocalClock {
    /// Prefers the source offset, falling back to `zone`.
    pub fn resolve(offset: Option<FixedOffset>, zone: Tz) -> Self {
        match offset {
            Some(o) => LocalClock::Offset(o),
            None => LocalClock::Zone(zone),
        }
    }

    /// Local hour of `t` rounded to the nearest whole hour, ties to even.
    ///
    /// Not wrapped: half past 23 gives 24, which matches no marker rule.
    pub fn rounded_hour(&self, t: DateTime<Utc>) -> u32 {
        let (h, m, s) = match self {
            LocalClock::Offset(o) => {
                let l = t.with_timezone(o);
                (l.hour(), l.minute(), l.second())
            }
            LocalClock::Zone(z) => {
                let l = t.with_timezone(z);
                (l.hour(), l.minute(), l.second())
            }
        };
        round_half_even(h as f64 + m as f64 / 60.0 + s as f64 / 3600.0) as u32
    }
}

fn round_half_even(v: f64) -> f64 {
    if (v - v.trunc()).abs() == 0.5 {
        2.0 * (v / 2.0).round()
    } else {
        v.round()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker {
    DayFlower,
    NightFlower,
    Wind { speed: f64, deg: f64 },
}

/// Markers for the bucket at column `x` represented by `obs`.
///
/// Walks one hour at a time through the half cadence either side of the
/// observation. Local noon gives a day flower, midnight a night flower and
/// every other third hour a wind marker. Each step matches at most one rule,
/// checked in that order.
pub fn markers(
    layout: &Layout,
    x: i32,
    obs: &Observation,
    clock: &LocalClock,
    line_len: usize,
) -> Vec<(i32, Marker)> {
    let half = Duration::minutes(CADENCE_HOURS * 60 / 2);
    let one_hour = Duration::hours(1);
    let dx = layout.x_step as f64 / CADENCE_HOURS as f64;

    let t1 = obs.time() + half;
    let mut t = obs.time() - half + one_hour;
    let mut hour = clock.rounded_hour(t);
    let mut xx = x as f64;

    let mut out = Vec::new();
    while t <= t1 {
        let ix = round_half_even(xx) as i32;
        if ix >= line_len as i32 {
            break;
        }
        match hour {
            12 => out.push((ix, Marker::DayFlower)),
            0 => out.push((ix, Marker::NightFlower)),
            3 | 6 | 9 | 15 | 18 | 21 => out.push((
                ix,
                Marker::Wind {
                    speed: obs.wind_speed(),
                    deg: obs.wind_deg(),
                },
            )),
            _ => {}
        }
        hour = (hour + 1) % 24;
        t += one_hour;
        xx += dx;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn layout() -> Layout {
        Layout::new(512, 128).unwrap()
    }

    fn obs(h: u32, m: u32) -> Observation {
        Observation::new(Utc.with_ymd_and_hms(2024, 5, 4, h, m, 0).unwrap(), 10.0)
            .with_wind(7.0, 250.0)
    }

    #[test]
    fn noon_bucket_gets_day_flower() {
        let clock = LocalClock::Zone(chrono_tz::UTC);
        let m = markers(&layout(), 100, &obs(12, 0), &clock, 557);
        // steps at 11:30, 12:30, 13:30; 11.5 rounds to even 12
        assert_eq!(m, vec![(100, Marker::DayFlower)]);
    }

    #[test]
    fn half_past_eleven_is_not_midnight() {
        let clock = LocalClock::Zone(chrono_tz::UTC);
        assert_eq!(clock.rounded_hour(obs(23, 30).time()), 24);
        // steps at 23:30, 00:30, 01:30 give hours 24, 1, 2
        let m = markers(&layout(), 100, &obs(0, 0), &clock, 557);
        assert!(m.is_empty());
    }

    #[test]
    fn midnight_reached_by_walking() {
        let clock = LocalClock::Zone(chrono_tz::UTC);
        // steps at 22:30, 23:30, 00:30 give hours 22, 23, 0
        let m = markers(&layout(), 100, &obs(23, 0), &clock, 557);
        assert_eq!(m, vec![(129, Marker::NightFlower)]);
    }

    #[test]
    fn wind_on_third_hours() {
        let clock = LocalClock::Zone(chrono_tz::UTC);
        let m = markers(&layout(), 100, &obs(15, 0), &clock, 557);
        // 14.5 rounds to 14, so the wind lands on the second step
        assert_eq!(
            m,
            vec![(
                115,
                Marker::Wind {
                    speed: 7.0,
                    deg: 250.0
                }
            )]
        );
    }

    #[test]
    fn source_offset_shifts_local_hour() {
        let clock = LocalClock::resolve(FixedOffset::east_opt(3 * 3600), chrono_tz::UTC);
        // 07:30 UTC is 10:30 local, noon falls on the third step
        let m = markers(&layout(), 100, &obs(8, 0), &clock, 557);
        assert_eq!(m, vec![(129, Marker::DayFlower)]);
    }

    #[test]
    fn reference_zone_used_without_offset() {
        let clock = LocalClock::resolve(None, chrono_tz::Asia::Tokyo);
        assert_eq!(clock, LocalClock::Zone(chrono_tz::Asia::Tokyo));
        // 12:30 UTC is 21:30 in Tokyo, midnight falls on the third step
        let m = markers(&layout(), 100, &obs(13, 0), &clock, 557);
        assert_eq!(m, vec![(129, Marker::NightFlower)]);
    }

    #[test]
    fn stops_at_end_of_line() {
        let clock = LocalClock::Zone(chrono_tz::UTC);
        let m = markers(&layout(), 100, &obs(4, 0), &clock, 110);
        // hours 2, 3, 4: the wind step at x=115 is past the line
        assert!(m.is_empty());
    }
}
