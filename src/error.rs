use thiserror::Error;

/// Errors that abort a render or fail to load its inputs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no current observation available")]
    NoCurrentObservation,

    #[error("coordinates out of range: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("unrecognized temperature unit: {0}")]
    UnknownTemperatureUnit(String),

    /// The vertical band left for the temperature curve is empty.
    #[error("canvas {width}x{height} leaves no drawable band")]
    DegenerateCanvas { width: u32, height: u32 },

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("cached forecast for {key} is {age_secs}s old")]
    StaleCache { key: String, age_secs: i64 },

    #[error("nothing cached for {0}")]
    NotCached(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
