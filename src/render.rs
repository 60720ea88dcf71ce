use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use chrono_tz::Tz;

use super::landscape::{Landscape, Settings};
use super::location::Location;
use super::owm::Snapshot;
use super::sun::Almanac;
use super::weather::TemperatureUnit;
use super::{Cache, Data};

/// Where to render, as decimal degrees or a DMS pair.
#[derive(clap::Args, Debug)]
pub struct Place {
    #[clap(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[clap(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// e.g. 52°22′48″N 002°01′48″W
    #[clap(long, conflicts_with_all = ["lat", "lon"])]
    location: Option<String>,
}

impl Place {
    pub fn resolve(&self) -> Result<Location, Box<dyn Error>> {
        match (&self.location, self.lat, self.lon) {
            (Some(dms), _, _) => Ok(dms.parse()?),
            (None, Some(lat), Some(lon)) => Ok(Location::new(lat, lon)?),
            _ => Err("either --location or both --lat and --lon are required".into()),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    place: Place,

    #[clap(long, default_value_t = 512)]
    width: u32,

    #[clap(long, default_value_t = 128)]
    height: u32,

    #[clap(long, default_value_t = String::from("C"))]
    unit: String,

    /// Zone for local hours when the forecast carries no UTC offset.
    #[clap(long, default_value_t = String::from("UTC"))]
    timezone: String,

    /// RFC 3339 instant to render at, defaults to now.
    #[clap(long)]
    now: Option<String>,

    /// Raw current weather document; refreshes the cache.
    #[clap(long, requires = "forecast")]
    current: Option<PathBuf>,

    /// Raw 3 hour forecast document; refreshes the cache.
    #[clap(long, requires = "current")]
    forecast: Option<PathBuf>,

    /// Days of sunrises and sunsets to place, from the day before now.
    #[clap(long)]
    sun_days: Option<usize>,

    #[clap(long, default_value_t = 3600)]
    ttl_secs: i64,

    #[clap(long, default_value_t = String::from("weather_landscape.png"))]
    output: String,
}

/// Reads the cached snapshot for `loc`.
pub fn cached(data: &Data, loc: &Location) -> Result<Snapshot, super::Error> {
    let key = loc.cache_key();
    match data.get(&key)? {
        Some(b) => Snapshot::from_bytes(&b),
        None => Err(super::Error::NotCached(key)),
    }
}

fn read_json<P: AsRef<Path>>(path: P) -> Result<serde_json::Value, Box<dyn Error>> {
    Ok(serde_json::from_slice(&fs::read(path)?)?)
}

pub fn execute(data: &Data, args: &Args) -> Result<(), Box<dyn Error>> {
    let loc = args.place.resolve()?;
    let unit = args.unit.parse::<TemperatureUnit>()?;
    let zone = args
        .timezone
        .parse::<Tz>()
        .map_err(|e| format!("unknown time zone {}: {}", args.timezone, e))?;
    let now = match &args.now {
        Some(s) => DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc),
        None => Utc::now(),
    };
    let settings =
        Settings::new(loc, args.width, args.height, zone, now)?.with_sun_days(args.sun_days);

    let snapshot = match (&args.current, &args.forecast) {
        (Some(current), Some(forecast)) => {
            let snap = Snapshot::new(now, read_json(current)?, read_json(forecast)?);
            data.put(&loc.cache_key(), &snap.to_bytes()?)?;
            tracing::debug!(key = %loc.cache_key(), "stored fresh payloads");
            snap
        }
        _ => {
            let snap = cached(data, &loc)?;
            if !snap.is_fresh(now, args.ttl_secs) {
                return Err(super::Error::StaleCache {
                    key: loc.cache_key(),
                    age_secs: snap.age_secs(now),
                }
                .into());
            }
            tracing::debug!(key = %loc.cache_key(), "using cached payloads");
            snap
        }
    };

    let timeline = snapshot.timeline(unit)?;
    let out = Landscape::draw(&settings, &timeline, &Almanac::new(loc))?;
    out.canvas.save(&args.output)?;

    tracing::info!(
        location = %loc,
        width = args.width,
        height = args.height,
        output = %args.output,
        "rendered landscape"
    );
    Ok(())
}
