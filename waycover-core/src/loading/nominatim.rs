//! Nominatim geocoding model and candidate ranking.
//!
//! The search response is scored so that city-like places beat the
//! county/state/country entries that share their name; the winner must
//! carry a valid bounding box.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;

use crate::model::{CityBoundary, CityBounds};

/// One `format=jsonv2` search result.
#[derive(Debug, Default, Deserialize)]
pub struct NominatimPlace {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub addresstype: Option<String>,
    #[serde(rename = "type", default)]
    pub place_type: Option<String>,
    #[serde(default)]
    pub place_rank: Option<i32>,
    /// `[south, north, west, east]`, each as a decimal string.
    #[serde(default)]
    pub boundingbox: Vec<String>,
    #[serde(default)]
    pub geojson: Option<GeoJsonGeometry>,
}

/// The `polygon_geojson=1` geometry; only polygonal shapes are used.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    #[serde(other)]
    Other,
}

const CITY_CLASSES: [&str; 3] = ["city", "town", "municipality"];
const DISTRICT_CLASSES: [&str; 4] = ["village", "borough", "suburb", "hamlet"];
const REGION_CLASSES: [&str; 4] = ["county", "state", "region", "country"];

/// Resolved city: bounding box plus the polygon boundary when available.
#[derive(Debug)]
pub struct ResolvedCity {
    pub bounds: CityBounds,
    pub boundary: Option<CityBoundary>,
}

/// Picks the highest-scoring place with a valid bounding box.
pub fn pick_best_place(places: &[NominatimPlace], query: &str) -> Option<ResolvedCity> {
    let mut best: Option<(f64, ResolvedCity)> = None;

    for place in places {
        let Some(bounds) = parse_bounding_box(&place.boundingbox) else {
            continue;
        };
        let score = score_place(place, query);
        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((
                score,
                ResolvedCity {
                    bounds,
                    boundary: place.geojson.as_ref().and_then(boundary_from_geojson),
                },
            ));
        }
    }

    best.map(|(_, resolved)| resolved)
}

/// Scoring table for one candidate against the queried city name.
pub fn score_place(place: &NominatimPlace, query: &str) -> f64 {
    let mut score = 0.0;

    let display = place.display_name.to_lowercase();
    let token = query.trim().to_lowercase();
    if !token.is_empty() {
        if display.starts_with(&token) {
            score += 42.0;
        } else if display.contains(&token) {
            score += 12.0;
        }
    }

    if let Some(addresstype) = place.addresstype.as_deref() {
        if CITY_CLASSES.contains(&addresstype) {
            score += 120.0;
        } else if DISTRICT_CLASSES.contains(&addresstype) {
            score += 72.0;
        } else if REGION_CLASSES.contains(&addresstype) {
            score -= 130.0;
        }
    }

    if let Some(place_type) = place.place_type.as_deref() {
        if CITY_CLASSES.contains(&place_type) {
            score += 55.0;
        }
    }

    // Cities sit near place_rank 16; drift in either direction decays
    // the bonus down to the -24 floor.
    let rank = place.place_rank.unwrap_or(30);
    score += (22.0 - f64::from((16 - rank).abs()) * 4.0).max(-24.0);

    score
}

fn parse_bounding_box(raw: &[String]) -> Option<CityBounds> {
    if raw.len() != 4 {
        return None;
    }
    let south: f64 = raw[0].parse().ok()?;
    let north: f64 = raw[1].parse().ok()?;
    let west: f64 = raw[2].parse().ok()?;
    let east: f64 = raw[3].parse().ok()?;
    if south >= north || west >= east {
        return None;
    }
    Some(CityBounds {
        south,
        west,
        north,
        east,
    })
}

fn boundary_from_geojson(geometry: &GeoJsonGeometry) -> Option<CityBoundary> {
    let polygons: Vec<Polygon<f64>> = match geometry {
        GeoJsonGeometry::Polygon { coordinates } => polygon_from_rings(coordinates)
            .map(|p| vec![p])
            .unwrap_or_default(),
        GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .filter_map(|rings| polygon_from_rings(rings))
            .collect(),
        GeoJsonGeometry::Other => Vec::new(),
    };

    if polygons.is_empty() {
        None
    } else {
        Some(CityBoundary(MultiPolygon(polygons)))
    }
}

fn polygon_from_rings(rings: &[Vec<[f64; 2]>]) -> Option<Polygon<f64>> {
    let mut iter = rings.iter().map(|ring| {
        LineString::new(
            ring.iter()
                .map(|&[lon, lat]| Coord { x: lon, y: lat })
                .collect(),
        )
    });
    let exterior = iter.next()?;
    if exterior.0.len() < 3 {
        return None;
    }
    Some(Polygon::new(exterior, iter.collect()))
}
