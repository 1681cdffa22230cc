use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};

use statchart::{ChartConfiguration, ChartEngine, DataTable, OutputFormat, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "statchart")]
#[command(about = "Render statistic charts from tabular data", long_about = None)]
struct Args {
    /// Chart configuration as inline JSON, or @path to a JSON file
    config: String,

    /// Read CSV from stdin instead of a JSON array of objects
    #[arg(long)]
    csv: bool,

    /// Output image width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Emit SVG instead of PNG
    #[arg(long)]
    svg: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_json = match args.config.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?,
        None => args.config.clone(),
    };
    let config = ChartConfiguration::from_json(&config_json)
        .context("Failed to parse chart configuration")?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read data from stdin")?;

    let table = if args.csv {
        DataTable::from_csv(input.as_bytes()).context("Failed to parse CSV input")?
    } else {
        let value = serde_json::from_str(&input).context("Input is not valid JSON")?;
        DataTable::from_json(&value).context("Failed to parse JSON records")?
    };

    let options = RenderOptions {
        width: args.width,
        height: args.height,
        format: if args.svg {
            OutputFormat::Svg
        } else {
            OutputFormat::Png
        },
    };

    let mut engine = ChartEngine::new();
    let bytes = engine
        .render(&table, &config, &options)
        .context("Failed to render chart")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(&bytes)
        .context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
