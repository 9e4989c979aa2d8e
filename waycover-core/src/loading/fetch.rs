//! Synchronous dataset fetching: Nominatim city resolution followed by
//! Overpass street downloads with endpoint failover.
//!
//! Each request carries its own timeout; on failure the next endpoint,
//! query template or city-name variant is tried before an error
//! naming the last offending host is surfaced. Nothing is committed on
//! failure.

use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;

use super::boundary::retain_within_city;
use super::nominatim::{pick_best_place, NominatimPlace, ResolvedCity};
use super::normalize::segments_from_overpass;
use super::overpass::{
    area_query, around_query, bbox_query, city_name_variants, OverpassPayload, OVERPASS_ENDPOINTS,
};
use crate::model::{CityBoundary, CityBounds, StreetSegment};
use crate::Error;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const NOMINATIM_TIMEOUT: Duration = Duration::from_secs(20);
const OVERPASS_TIMEOUT: Duration = Duration::from_secs(55);
const USER_AGENT: &str = concat!("waycover/", env!("CARGO_PKG_VERSION"));

/// A fully resolved city dataset, ready for planning.
#[derive(Debug)]
pub struct CityDataset {
    pub segments: Vec<StreetSegment>,
    pub bounds: CityBounds,
    pub boundary: Option<CityBoundary>,
}

/// Resolves a city by name and downloads its runnable street network.
pub fn fetch_city_dataset(city: &str) -> Result<CityDataset, Error> {
    let city = city.trim();
    if city.is_empty() {
        return Err(Error::BadCityQuery);
    }

    let variants = city_name_variants(city);
    let resolved = resolve_city(city, &variants)?;
    let payload = fetch_overpass_payload(&variants, &resolved.bounds)?;

    let segments = segments_from_overpass(&payload);
    info!("normalized {} street segments", segments.len());

    let segments = retain_within_city(segments, &resolved.bounds, resolved.boundary.as_ref());
    if segments.is_empty() {
        return Err(Error::NoStreetsInBoundary);
    }
    info!("{} segments inside the city boundary", segments.len());

    Ok(CityDataset {
        segments,
        bounds: resolved.bounds,
        boundary: resolved.boundary,
    })
}

fn resolve_city(city: &str, variants: &[String]) -> Result<ResolvedCity, Error> {
    let client = Client::builder()
        .timeout(NOMINATIM_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::NominatimUnresolved(format!("{city}: {e}")))?;

    for variant in variants {
        let response = client
            .get(NOMINATIM_URL)
            .query(&[
                ("format", "jsonv2"),
                ("limit", "8"),
                ("polygon_geojson", "1"),
                ("q", variant),
            ])
            .send();

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!("nominatim request for '{variant}' failed: {e}");
                continue;
            }
        };
        if !response.status().is_success() {
            warn!("nominatim returned {} for '{variant}'", response.status());
            continue;
        }

        let places: Vec<NominatimPlace> = match response.json() {
            Ok(places) => places,
            Err(e) => {
                warn!("nominatim payload for '{variant}' unparseable: {e}");
                continue;
            }
        };

        if let Some(resolved) = pick_best_place(&places, variant) {
            info!(
                "resolved '{variant}' to bounds {:.4},{:.4} .. {:.4},{:.4}",
                resolved.bounds.south, resolved.bounds.west, resolved.bounds.north,
                resolved.bounds.east
            );
            return Ok(resolved);
        }
    }

    Err(Error::NominatimUnresolved(city.to_owned()))
}

fn fetch_overpass_payload(
    variants: &[String],
    bounds: &CityBounds,
) -> Result<OverpassPayload, Error> {
    let client = Client::builder()
        .timeout(OVERPASS_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::OverpassUnreachable(e.to_string()))?;

    let mut queries: Vec<String> = variants.iter().map(|v| area_query(v)).collect();
    queries.push(bbox_query(bounds));
    queries.push(around_query(bounds));

    let mut last_failure = String::from("no endpoints tried");
    for query in &queries {
        for endpoint in OVERPASS_ENDPOINTS {
            match post_overpass(&client, endpoint, query) {
                Ok(payload) if !payload.elements.is_empty() => {
                    info!("overpass {endpoint} returned {} elements", payload.elements.len());
                    return Ok(payload);
                }
                Ok(_) => {
                    last_failure = format!("{endpoint}: empty result");
                }
                Err(reason) => {
                    warn!("overpass query failed: {reason}");
                    last_failure = reason;
                }
            }
        }
    }

    Err(Error::OverpassUnreachable(last_failure))
}

fn post_overpass(
    client: &Client,
    endpoint: &str,
    query: &str,
) -> Result<OverpassPayload, String> {
    let response = client
        .post(endpoint)
        .header("Content-Type", "text/plain;charset=UTF-8")
        .body(query.to_owned())
        .send()
        .map_err(|e| format!("{endpoint}: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("{endpoint}: status {status}"));
    }

    response.json().map_err(|e| format!("{endpoint}: {e}"))
}
