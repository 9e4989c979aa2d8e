//! Activity imports: extracts track points from GPX and CSV files.

use geo::Point;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::Error;

/// Parses activity track points from a file by extension.
///
/// Supports `.gpx` (trkpt elements) and `.csv` (lat/lon columns).
/// Unrecognized extensions and malformed CSV headers surface as
/// [`Error::UnsupportedImport`]; fewer than 2 usable points as
/// [`Error::EmptyImport`].
pub fn parse_activity_points(file_name: &str, content: &str) -> Result<Vec<Point<f64>>, Error> {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let points = match extension.as_str() {
        "gpx" => parse_gpx_points(content)?,
        "csv" => parse_csv_points(content)?,
        other => {
            return Err(Error::UnsupportedImport(format!(
                "unrecognized file extension '.{other}'"
            )))
        }
    };

    if points.len() < 2 {
        return Err(Error::EmptyImport);
    }
    Ok(points)
}

/// Pulls every `<trkpt lat=".." lon="..">` out of a GPX document.
/// Points with unparseable coordinates are skipped.
pub fn parse_gpx_points(content: &str) -> Result<Vec<Point<f64>>, Error> {
    let mut reader = Reader::from_str(content);
    let mut points = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() != b"trkpt" {
                    continue;
                }
                let mut lat = None;
                let mut lon = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"lat" => lat = value.parse::<f64>().ok(),
                        b"lon" => lon = value.parse::<f64>().ok(),
                        _ => {}
                    }
                }
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    points.push(Point::new(lon, lat));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::UnsupportedImport(format!("malformed GPX: {e}")));
            }
        }
    }

    Ok(points)
}

fn parse_csv_points(content: &str) -> Result<Vec<Point<f64>>, Error> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::UnsupportedImport(format!("malformed CSV header: {e}")))?;

    let lat_idx = find_column(headers, &["lat", "latitude"]);
    let lon_idx = find_column(headers, &["lon", "lng", "longitude"]);
    let (Some(lat_idx), Some(lon_idx)) = (lat_idx, lon_idx) else {
        return Err(Error::UnsupportedImport(
            "CSV is missing lat/lon columns".to_owned(),
        ));
    };

    let mut points = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let lat = record.get(lat_idx).and_then(|v| v.trim().parse::<f64>().ok());
        let lon = record.get(lon_idx).and_then(|v| v.trim().parse::<f64>().ok());
        if let (Some(lat), Some(lon)) = (lat, lon) {
            points.push(Point::new(lon, lat));
        }
    }

    Ok(points)
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
}
