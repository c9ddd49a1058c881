//! Batch-streaming driver over a declared feature tree.

use std::{collections::BTreeMap, fs, io::BufReader, path::Path};

use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use feat2arrow_arrow::{BatchMaterializer, MaterializeMode, SourceBatch};
use feat2arrow_core::{
    DecodeMetadata, DeriveOptions, DerivedSchema, FeatureFields, Value, derive_schema_with,
};
use log::{debug, info, warn};

use crate::{error::DatasetError, jsonl::jsonl_records, metadata::TaskMetadata};

/// Rows per materialized batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

type CallbackResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A dataset described by a nested feature tree.
///
/// The flat schema is derived from the tree alone, so it is the same for
/// every batch. Each derivation builds a new expansion map and decode
/// metadata.
pub struct FeatureDataset {
    root: FeatureFields,
    options: DeriveOptions,
    mode: MaterializeMode,
    batch_size: usize,
    class_names: Vec<String>,
    misc: BTreeMap<String, serde_json::Value>,
}

/// Builder for configuring [`FeatureDataset`].
pub struct FeatureDatasetBuilder {
    root: FeatureFields,
    options: DeriveOptions,
    mode: MaterializeMode,
    batch_size: usize,
    class_names: Vec<String>,
    misc: BTreeMap<String, serde_json::Value>,
}

impl FeatureDataset {
    /// Create a builder for a dataset over `root`.
    pub fn builder(root: FeatureFields) -> FeatureDatasetBuilder {
        FeatureDatasetBuilder {
            root,
            options: DeriveOptions::default(),
            mode: MaterializeMode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            class_names: Vec::new(),
            misc: BTreeMap::new(),
        }
    }

    /// Dataset over `root` with default settings: no expansion,
    /// throughput-first materialization, 1024 rows per batch.
    pub fn new(root: FeatureFields) -> Self {
        Self::builder(root).build()
    }

    pub fn features(&self) -> &FeatureFields {
        &self.root
    }

    pub fn expansion_depth(&self) -> usize {
        self.options.expansion_depth
    }

    pub fn mode(&self) -> MaterializeMode {
        self.mode
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Derive the flat schema, expansion map and decode metadata.
    pub fn derive_schema(&self) -> Result<DerivedSchema, DatasetError> {
        let derived = derive_schema_with(&self.root, self.options)?;
        debug!(
            "derived {} columns ({} expanded) from {} fields",
            derived.columns.len(),
            derived.expansion_map.len(),
            self.root.len()
        );
        Ok(derived)
    }

    /// Side metadata attached to every produced schema.
    pub fn task_metadata(&self) -> TaskMetadata {
        TaskMetadata {
            class_names: self.class_names.clone(),
            decode_meta: DecodeMetadata::from_features(&self.root),
            misc: self.misc.clone(),
        }
    }

    /// Materializer for this dataset, with [`TaskMetadata`] attached to its
    /// schema.
    pub fn materializer(&self) -> Result<BatchMaterializer, DatasetError> {
        let derived = self.derive_schema()?;
        let metadata = self.task_metadata().to_schema_metadata()?;
        Ok(BatchMaterializer::new(self.root.clone(), derived, self.mode)?.with_metadata(metadata))
    }

    /// Arrow schema of every produced batch.
    pub fn arrow_schema(&self) -> Result<SchemaRef, DatasetError> {
        Ok(self.materializer()?.schema())
    }

    /// Materialize row records and emit one batch per `batch_size` rows.
    ///
    /// An empty record stream emits no batch.
    pub fn for_each_record_batch<I>(
        &self,
        rows: I,
        callback: impl FnMut(RecordBatch) -> CallbackResult,
    ) -> Result<(), DatasetError>
    where
        I: IntoIterator<Item = Value>,
    {
        self.stream_rows(rows.into_iter().map(Ok), callback)
    }

    /// Materialize the records of a JSON-lines file.
    pub fn for_each_jsonl_batch(
        &self,
        path: impl AsRef<Path>,
        callback: impl FnMut(RecordBatch) -> CallbackResult,
    ) -> Result<(), DatasetError> {
        let file = fs::File::open(path.as_ref())?;
        self.stream_rows(jsonl_records(BufReader::new(file)), callback)
    }

    /// Materialize batches that are already in the columnar source layout,
    /// one output batch per input batch.
    pub fn for_each_source_batch<I>(
        &self,
        batches: I,
        mut callback: impl FnMut(RecordBatch) -> CallbackResult,
    ) -> Result<(), DatasetError>
    where
        I: IntoIterator<Item = RecordBatch>,
    {
        let materializer = self.materializer()?;
        info!("materializing source batches ({} mode)", self.mode);

        let mut batch_count = 0;
        let mut row_count = 0;
        for source in batches {
            let batch = materializer.materialize(SourceBatch::Columnar(&[source]))?;
            batch_count += 1;
            row_count += batch.num_rows();
            callback(batch).map_err(DatasetError::Callback)?;
        }

        finish(batch_count, row_count);
        Ok(())
    }

    fn stream_rows<I>(
        &self,
        rows: I,
        mut callback: impl FnMut(RecordBatch) -> CallbackResult,
    ) -> Result<(), DatasetError>
    where
        I: Iterator<Item = Result<Value, DatasetError>>,
    {
        fn flush_batch<F>(
            materializer: &BatchMaterializer,
            rows: &mut Vec<Value>,
            callback: &mut F,
        ) -> Result<usize, DatasetError>
        where
            F: FnMut(RecordBatch) -> CallbackResult,
        {
            if rows.is_empty() {
                return Ok(0);
            }

            let batch = materializer.materialize(SourceBatch::Rows(rows.as_slice()))?;
            let num_rows = batch.num_rows();
            rows.clear();
            callback(batch).map_err(DatasetError::Callback)?;
            Ok(num_rows)
        }

        let materializer = self.materializer()?;
        info!(
            "materializing records ({} mode, batch size {})",
            self.mode, self.batch_size
        );

        let mut pending = Vec::with_capacity(self.batch_size);
        let mut batch_count = 0;
        let mut row_count = 0;
        for row in rows {
            pending.push(row?);
            if pending.len() >= self.batch_size {
                row_count += flush_batch(&materializer, &mut pending, &mut callback)?;
                batch_count += 1;
            }
        }
        if !pending.is_empty() {
            row_count += flush_batch(&materializer, &mut pending, &mut callback)?;
            batch_count += 1;
        }

        finish(batch_count, row_count);
        Ok(())
    }
}

fn finish(batch_count: usize, row_count: usize) {
    if batch_count == 0 {
        warn!("dataset is empty; no batches were produced");
    } else {
        info!("materialized {row_count} rows in {batch_count} batches");
    }
}

impl FeatureDatasetBuilder {
    /// Levels of struct flattening (default: 0). Values above one are
    /// treated as one.
    pub fn with_expansion_depth(mut self, depth: usize) -> Self {
        self.options.expansion_depth = depth;
        self
    }

    /// Also flatten top-level lists of structs when expanding (default: false).
    pub fn with_struct_list_expansion(mut self, enabled: bool) -> Self {
        self.options.expand_struct_lists = enabled;
        self
    }

    /// Select correctness-first materialization when `true` (default: false).
    pub fn with_handle_nested_nulls(mut self, handle_nested_nulls: bool) -> Self {
        self.mode = MaterializeMode::from_handle_nested_nulls(handle_nested_nulls);
        self
    }

    pub fn with_mode(mut self, mode: MaterializeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the number of rows per RecordBatch (default: 1024). Zero is
    /// treated as one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Class names recorded in the [`TaskMetadata`].
    pub fn with_class_names<S, I>(mut self, names: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.class_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Free-form entry recorded under `misc` in the [`TaskMetadata`].
    pub fn with_misc(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.misc.insert(key.into(), value);
        self
    }

    /// Build the dataset.
    pub fn build(self) -> FeatureDataset {
        FeatureDataset {
            root: self.root,
            options: self.options,
            mode: self.mode,
            batch_size: self.batch_size,
            class_names: self.class_names,
            misc: self.misc,
        }
    }
}

impl From<FeatureFields> for FeatureDataset {
    fn from(root: FeatureFields) -> Self {
        Self::new(root)
    }
}

