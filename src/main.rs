use clap::{Parser, Subcommand};
use std::error::Error;
use tracing_subscriber::EnvFilter;
use weather_landscape::{list_forecast, render, Data};

#[derive(Parser, Debug)]
#[command(name = "weather-landscape")]
#[command(about = "Renders a weather forecast as a pixel-art landscape")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[clap(long, default_value_t = String::from("data"))]
    data_dir: String,

    /// Default filter when RUST_LOG is unset.
    #[clap(long, default_value_t = String::from("info"))]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    Render(render::Args),
    ListForecast(list_forecast::Args),
}

impl Command {
    fn execute(&self, data: &Data) -> Result<(), Box<dyn Error>> {
        match self {
            Command::Render(args) => render::execute(data, args),
            Command::ListForecast(args) => list_forecast::execute(data, args),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let data = Data::from(&args.data_dir)?;
    args.command.execute(&data)?;
    Ok(())
}
