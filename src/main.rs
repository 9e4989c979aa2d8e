//! Command-line front end: resolve a city, fetch its runnable streets,
//! plan a coverage route and write it out as GPX or AML.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use geo::Point;
use log::info;

use waycover_core::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// City to fetch streets for (e.g. "Cambridge, MA")
    #[arg(short, long)]
    city: String,

    /// Home position as "lat,lon"
    #[arg(long)]
    home: String,

    /// Target distance in kilometers
    #[arg(short, long, default_value_t = 5.0)]
    target_km: f64,

    /// Output file path
    #[arg(short, long, default_value = "route.gpx")]
    out: PathBuf,

    /// Output document format
    #[arg(long, value_enum, default_value_t = Format::Gpx)]
    format: Format,

    /// Route construction strategy
    #[arg(long, value_enum, default_value_t = Strategy::Greedy)]
    strategy: Strategy,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Format {
    Gpx,
    Aml,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Strategy {
    /// Greedy coverage tour within the target budget
    Greedy,
    /// Eulerized full-coverage walk of the candidate set
    Euler,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let home = parse_home(&cli.home)?;
    let dataset = fetch_city_dataset(&cli.city)?;
    info!(
        "loaded {} runnable segments for {}",
        dataset.segments.len(),
        cli.city
    );

    let route = match cli.strategy {
        Strategy::Greedy => plan_coverage_route(
            &dataset.segments,
            home,
            cli.target_km,
            Some(&dataset.bounds),
        )?,
        Strategy::Euler => plan_eulerian_route(
            &dataset.segments,
            home,
            cli.target_km,
            Some(&dataset.bounds),
        )?,
    };

    let created = Utc::now();
    let document = match cli.format {
        Format::Gpx => write_gpx(&route, created),
        Format::Aml => write_aml(&route, created),
    };
    fs::write(&cli.out, document)
        .with_context(|| format!("writing {}", cli.out.display()))?;

    println!(
        "{:.2} km over {} streets, {}/{} nodes covered -> {}",
        route.distance_km,
        route.street_ids.len(),
        route.node_ids_covered.len(),
        route.available_nodes.len(),
        cli.out.display()
    );
    if let Some(url) = google_maps_walking_url(&route.points) {
        println!("open in Google Maps: {url}");
    }

    Ok(())
}

fn parse_home(raw: &str) -> Result<Point<f64>> {
    let (lat, lon) = raw
        .split_once(',')
        .context("home must be \"lat,lon\"")?;
    let lat: f64 = lat.trim().parse().context("home latitude is not a number")?;
    let lon: f64 = lon.trim().parse().context("home longitude is not a number")?;
    Ok(Point::new(lon, lat))
}
