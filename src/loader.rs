use std::path::Path;
use std::sync::OnceLock;

use crate::data::Dataset;
use crate::error::{DashboardError, DashboardResult};

/// Where the dashboard reads its table from, relative to the working directory
pub const DATASET_PATH: &str = "nco2.csv";

static DATASET: DatasetCache = DatasetCache::new(DATASET_PATH);

/// Load the process-wide dataset, reading the file only on first use
pub fn load() -> DashboardResult<&'static Dataset> {
    DATASET.get()
}

/// Init-once cell around a CSV file. Never invalidated.
pub struct DatasetCache {
    path: &'static str,
    cell: OnceLock<Dataset>,
}

impl DatasetCache {
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            cell: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        Path::new(self.path)
    }

    /// Return the cached table, reading it on the first call.
    ///
    /// A failed read leaves the cell empty.
    pub fn get(&self) -> DashboardResult<&Dataset> {
        if let Some(data) = self.cell.get() {
            return Ok(data);
        }

        let data = Dataset::from_path(self.path()).map_err(|source| DashboardError::DataLoad {
            path: self.path().to_path_buf(),
            source,
        })?;
        log::info!("Loaded {} records from {}", data.len(), self.path);

        Ok(self.cell.get_or_init(|| data))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}
