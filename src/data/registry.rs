//! Process-wide resource-table cache.
//!
//! Each registered format gets a load-once slot: concurrent first callers for the
//! same format block on a single parse/validate, later readers share the `Arc`.
//! A failed load leaves the slot empty so the format is not served until the
//! asset is fixed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;

use crate::config::EngineConfig;
use crate::data::loader::load_table_asset;
use crate::data::table::ResourceTable;
use crate::data::TableError;
use crate::dls::context::MatchResourceContext;

type Slot = Arc<OnceCell<Arc<ResourceTable>>>;

static GLOBAL: OnceCell<Arc<TableCache>> = OnceCell::new();

#[derive(Debug)]
pub struct TableCache {
    config: EngineConfig,
    slots: Mutex<HashMap<u32, Slot>>,
}

impl TableCache {
    pub fn new(config: EngineConfig) -> Self {
        TableCache {
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Shared cache built from [`EngineConfig::from_env`] on first use.
    pub fn global() -> Result<Arc<TableCache>, TableError> {
        GLOBAL
            .get_or_try_init(|| EngineConfig::from_env().map(|config| Arc::new(Self::new(config))))
            .map(Arc::clone)
            .map_err(TableError::from)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn slot(&self, format_overs: u32) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(format_overs).or_default())
    }

    /// Table for `format_overs`, loading it on first request.
    pub fn get(&self, format_overs: u32) -> Result<Arc<ResourceTable>, TableError> {
        let entry = self
            .config
            .format(format_overs)
            .ok_or(TableError::UnknownFormat(format_overs))?;
        let path = self.config.table_path(entry);

        self.slot(format_overs)
            .get_or_try_init(|| match load_table_asset(&path, format_overs) {
                Ok(table) => {
                    tracing::info!(
                        format_overs,
                        granularity = table.granularity().as_str(),
                        rows = table.rows().len(),
                        path = %path.display(),
                        "resource table loaded"
                    );
                    Ok(Arc::new(table))
                }
                Err(err) => {
                    tracing::error!(format_overs, error = %err, "resource table rejected");
                    Err(err)
                }
            })
            .map(Arc::clone)
    }

    /// Calculation context for one match in `format_overs`.
    pub fn context(&self, format_overs: u32) -> Result<MatchResourceContext, TableError> {
        let table = self.get(format_overs)?;
        let g50 = self
            .config
            .format(format_overs)
            .map(|entry| entry.g50)
            .ok_or(TableError::UnknownFormat(format_overs))?;
        Ok(MatchResourceContext::new(table, g50))
    }

    /// Formats with a table already in memory.
    pub fn loaded_formats(&self) -> Vec<u32> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut formats: Vec<u32> = slots
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(format, _)| *format)
            .collect();
        formats.sort_unstable();
        formats
    }
}

/// Resource table for `format_overs` from the process-wide cache.
pub fn load_table(format_overs: u32) -> Result<Arc<ResourceTable>, TableError> {
    TableCache::global()?.get(format_overs)
}
