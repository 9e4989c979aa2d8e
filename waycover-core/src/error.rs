use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("City query is empty")]
    BadCityQuery,
    #[error("All Overpass endpoints failed: {0}")]
    OverpassUnreachable(String),
    #[error("Nominatim returned no usable bounding box for '{0}'")]
    NominatimUnresolved(String),
    #[error("No runnable streets found inside the city boundary")]
    NoStreetsInBoundary,
    #[error("Unsupported import: {0}")]
    UnsupportedImport(String),
    #[error("Import yielded no usable data")]
    EmptyImport,
    #[error("Route planning infeasible: {0}")]
    PlanInfeasible(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
