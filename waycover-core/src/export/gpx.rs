//! GPX 1.1 serialization: one track, one segment, 6-decimal trackpoints.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use super::xml::escape_xml;
use crate::planner::SuggestedRoute;

/// Serializes a route as a GPX 1.1 document.
///
/// The creation timestamp is supplied by the caller so serialization
/// stays deterministic.
pub fn write_gpx(route: &SuggestedRoute, created: DateTime<Utc>) -> String {
    let mut doc = String::new();
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    doc.push_str(
        "<gpx version=\"1.1\" creator=\"waycover\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n",
    );

    let _ = writeln!(doc, "  <metadata>");
    let _ = writeln!(doc, "    <name>{}</name>", escape_xml(&route.name));
    let _ = writeln!(
        doc,
        "    <time>{}</time>",
        created.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(doc, "  </metadata>");

    doc.push_str("  <trk>\n");
    let _ = writeln!(doc, "    <name>{}</name>", escape_xml(&route.name));
    doc.push_str("    <trkseg>\n");
    for point in &route.points {
        let _ = writeln!(
            doc,
            "      <trkpt lat=\"{:.6}\" lon=\"{:.6}\"/>",
            point.y, point.x
        );
    }
    doc.push_str("    </trkseg>\n  </trk>\n</gpx>\n");
    doc
}
