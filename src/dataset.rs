use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::compare::partition::{self, Partition};
use crate::error::{Result, ToolError};
use crate::io::dataset_read::{self, LoadOptions};
use crate::model::ParameterRecord;

/// Read-only handle over a loaded parameter dataset.
///
/// Clones share the records and the memoised [`Partition`], which is derived
/// on first use and never recomputed for the same records.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[ParameterRecord]>,
    partition: Arc<OnceLock<Partition>>,
}

impl Dataset {
    pub fn new(records: Vec<ParameterRecord>) -> Self {
        Self {
            records: records.into(),
            partition: Arc::new(OnceLock::new()),
        }
    }

    /// Loads the dataset stored at `path`.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        Ok(Self::new(dataset_read::load_dataset(path, options)?))
    }

    pub fn records(&self) -> &[ParameterRecord] {
        &self.records
    }

    pub fn partition(&self) -> &Partition {
        self.partition
            .get_or_init(|| partition::partition(&self.records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ParameterRecord>> for Dataset {
    fn from(records: Vec<ParameterRecord>) -> Self {
        Self::new(records)
    }
}

/// Load-once cache keyed on the data source.
///
/// The cached dataset is reused until a different path is requested or the
/// file's modification time changes.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoadOptions,
    entry: Option<CachedDataset>,
}

#[derive(Debug)]
struct CachedDataset {
    path: PathBuf,
    modified: Option<SystemTime>,
    dataset: Dataset,
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entry: None,
        }
    }

    /// Returns the dataset for `path`, loading it only when the source changed.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Dataset> {
        let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok();

        if let Some(entry) = &self.entry {
            if entry.path == path && entry.modified == modified && modified.is_some() {
                debug!(path = %path.display(), "reusing cached dataset");
                return Ok(entry.dataset.clone());
            }
        }

        let dataset = Dataset::load(path, &self.options)?;
        info!(path = %path.display(), records = dataset.len(), "dataset cached");
        self.entry = Some(CachedDataset {
            path: path.to_path_buf(),
            modified,
            dataset: dataset.clone(),
        });
        Ok(dataset)
    }

    /// Drops the cached dataset so the next request reloads it.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
