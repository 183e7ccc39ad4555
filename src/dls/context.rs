use std::sync::Arc;

use crate::data::registry::TableCache;
use crate::data::table::ResourceTable;
use crate::data::TableError;

/// Per-match calculation context: format, G50 and the shared resource table.
/// Cheap to clone; the engine keeps no state between calls.
#[derive(Debug, Clone)]
pub struct MatchResourceContext {
    pub format_overs: u32,
    pub g50: f64,
    pub table: Arc<ResourceTable>,
}

impl MatchResourceContext {
    pub fn new(table: Arc<ResourceTable>, g50: f64) -> Self {
        MatchResourceContext {
            format_overs: table.format_overs(),
            g50,
            table,
        }
    }

    /// Context for `format_overs` from the process-wide table cache.
    pub fn for_format(format_overs: u32) -> Result<Self, TableError> {
        TableCache::global()?.context(format_overs)
    }

    /// Clamp an overs limit into `[0, format_overs]`.
    pub fn clamp_limit(&self, overs_limit: u32) -> u32 {
        overs_limit.min(self.format_overs)
    }
}
