use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    lat: f64,
    lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Result<Self, Error> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(Error::InvalidCoordinates { lat, lon: lng });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Cache key for forecasts at this location, rounded to 4 decimals.
    pub fn cache_key(&self) -> String {
        format!("lat={:.4}__lon={:.4}.json", self.lat, self.lng)
    }
}

/// One coordinate as whole degrees, minutes and seconds of arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Arc {
    deg: i64,
    min: i64,
    sec: i64,
    hemi: char,
}

impl Arc {
    fn of(v: f64, pos: char, neg: char) -> Arc {
        let secs = (v.abs() * 3600.0).round() as i64;
        Arc {
            deg: secs / 3600,
            min: secs / 60 % 60,
            sec: secs % 60,
            hemi: if v < 0.0 { neg } else { pos },
        }
    }

    fn value(&self) -> f64 {
        let v = self.deg as f64 + self.min as f64 / 60.0 + self.sec as f64 / 3600.0;
        match self.hemi {
            'S' | 's' | 'W' | 'w' => -v,
            _ => v,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lat = Arc::of(self.lat, 'N', 'S');
        let lng = Arc::of(self.lng, 'E', 'W');
        write!(
            f,
            "{:02}°{:02}′{:02}″{} {:03}°{:02}′{:02}″{}",
            lat.deg, lat.min, lat.sec, lat.hemi, lng.deg, lng.min, lng.sec, lng.hemi
        )
    }
}

impl std::str::FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = regex::Regex::new(
            r#"(\d+)°(\d+)[′'](\d+)[″"]([NSns])\s+(\d+)°(\d+)[′'](\d+)[″"]([EWew])"#,
        )
        .map_err(|e| Error::InvalidLocation(e.to_string()))?;
        let caps = re
            .captures(s)
            .ok_or_else(|| Error::InvalidLocation(format!("not a DMS pair: {}", s)))?;

        let field = |ix: usize| caps.get(ix).map(|m| m.as_str()).unwrap_or_default();
        let arc = |first: usize| -> Result<Arc, Error> {
            let num = |ix: usize| {
                field(ix)
                    .parse::<i64>()
                    .map_err(|e| Error::InvalidLocation(format!("{}: {}", field(ix), e)))
            };
            Ok(Arc {
                deg: num(first)?,
                min: num(first + 1)?,
                sec: num(first + 2)?,
                hemi: field(first + 3).chars().next().unwrap_or('N'),
            })
        };

        Location::new(arc(1)?.value(), arc(5)?.value())
    }
}
