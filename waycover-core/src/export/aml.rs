//! AML serialization: the app's own route interchange document.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use super::xml::escape_xml;
use crate::planner::SuggestedRoute;

/// Serializes a route as an AML 1.0 document with 1-based point indices.
pub fn write_aml(route: &SuggestedRoute, created: DateTime<Utc>) -> String {
    let mut doc = String::new();
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    doc.push_str("<aml version=\"1.0\">\n");

    doc.push_str("  <metadata>\n");
    let _ = writeln!(doc, "    <name>{}</name>", escape_xml(&route.name));
    let _ = writeln!(
        doc,
        "    <created>{}</created>",
        created.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(doc, "    <distance_km>{:.3}</distance_km>", route.distance_km);
    let _ = writeln!(
        doc,
        "    <nodes_completed>{}</nodes_completed>",
        route.node_ids_covered.len()
    );
    doc.push_str("  </metadata>\n");

    doc.push_str("  <route>\n");
    for (idx, point) in route.points.iter().enumerate() {
        let _ = writeln!(
            doc,
            "    <point idx=\"{}\" lat=\"{:.6}\" lon=\"{:.6}\"/>",
            idx + 1,
            point.y,
            point.x
        );
    }
    doc.push_str("  </route>\n</aml>\n");
    doc
}
