//! Launch URLs for handing a planned route to external map apps.

use geo::Coord;

/// Walking directions in Google Maps: origin, destination and up to 10
/// interior waypoints sampled at a uniform stride.
pub fn google_maps_walking_url(points: &[Coord<f64>]) -> Option<String> {
    let first = points.first()?;
    let last = points.last()?;

    let stride = points.len().div_ceil(10).max(1);
    let waypoints: Vec<String> = points
        .iter()
        .skip(1)
        .take(points.len().saturating_sub(2))
        .step_by(stride)
        .take(10)
        .map(format_latlon)
        .collect();

    Some(format!(
        "https://www.google.com/maps/dir/?api=1&travelmode=walking&origin={}&destination={}&waypoints={}",
        format_latlon(first),
        format_latlon(last),
        waypoints.join("%7C")
    ))
}

/// Walking directions in Apple Maps from the first to the last point.
pub fn apple_maps_walking_url(points: &[Coord<f64>]) -> Option<String> {
    let first = points.first()?;
    let last = points.last()?;
    Some(format!(
        "https://maps.apple.com/?saddr={}&daddr={}&dirflg=w",
        format_latlon(first),
        format_latlon(last)
    ))
}

fn format_latlon(c: &Coord<f64>) -> String {
    format!("{:.6},{:.6}", c.y, c.x)
}
