use std::error::Error;
use std::io;

use super::render::{cached, Place};
use super::weather::TemperatureUnit;
use super::Data;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Format {
    Json,
    Csv,
}

#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(flatten)]
    place: Place,

    #[clap(long, default_value_t = String::from("C"))]
    unit: String,

    #[clap(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

pub fn execute(data: &Data, args: &Args) -> Result<(), Box<dyn Error>> {
    let loc = args.place.resolve()?;
    let unit = args.unit.parse::<TemperatureUnit>()?;
    let timeline = cached(data, &loc)?.timeline(unit)?;

    match args.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&timeline)?;
            println!("{}", json);
        }
        Format::Csv => {
            let mut w = csv::Writer::from_writer(io::stdout());
            for o in timeline.observations() {
                w.serialize(o)?;
            }
            w.flush()?;
        }
    }
    Ok(())
}
