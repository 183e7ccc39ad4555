//! Resource tables: the in-memory table, the asset loaders, validation and the
//! per-format cache.

pub mod loader;
pub mod registry;
pub mod table;
pub mod validate;

use thiserror::Error;

use crate::config::ConfigError;
use validate::ValidationReport;

pub use loader::{load_table_asset, parse_balls_grid, parse_overs_grid, AssetShape, BallsGridAsset};
pub use registry::{load_table, TableCache};
pub use table::{Granularity, IntegralRow, ResourceRow, ResourceTable, WICKET_COLUMNS};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read resource table '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in resource table '{asset}': {source}")]
    Csv {
        asset: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed JSON in resource table '{asset}': {source}")]
    Json {
        asset: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("resource table '{asset}' failed validation: {}", .report.summary())]
    Invalid {
        asset: String,
        report: ValidationReport,
    },
    #[error("resource table '{asset}' is for {found} overs, expected {expected}")]
    FormatMismatch {
        asset: String,
        found: u32,
        expected: u32,
    },
    #[error("unsupported resource table asset '{0}' (expected .csv or .json)")]
    UnsupportedShape(String),
    #[error("no resource table registered for {0}-over format")]
    UnknownFormat(u32),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
