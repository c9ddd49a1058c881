//! Flat batch materialization from nested source batches.

use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::Arc,
};

use arrow::{
    array::{Array, ArrayRef, BooleanArray, ListArray, StructArray},
    compute::{concat, nullif},
    datatypes::{DataType, Field, SchemaRef},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use feat2arrow_core::{
    ColumnOrigin, DerivedSchema, Expansion, ExpansionKind, FeatureFields, FeatureType, Value,
    ValueTypeError,
};
use log::debug;

use crate::{
    arrow_convert::{records_to_source_batch_with, value_at},
    convert::{MediaFailurePolicy, RawColumn, convert_column},
    error::ConvertError,
    schema_convert::columns_to_arrow_schema,
};

/// How source values are extracted for each target column.
///
/// Both modes apply the same per-type conversion; they differ only in how a
/// null or absent parent struct shows up in its expanded sub-field columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterializeMode {
    /// Vectorized projection over columnar source batches.
    ///
    /// Projecting a sub-field out of a struct column ignores the parent's
    /// validity, so a row whose parent struct is null or absent yields the
    /// sub-field's zero value (`0`, `""`, empty list) instead of null. Media
    /// elements that cannot be resolved are written as null with a warning.
    #[default]
    Throughput,
    /// Per-row traversal of row records.
    ///
    /// Absent and null values, at either the parent or the sub-field level,
    /// both materialize as null. Unresolvable media elements fail the batch.
    Correctness,
}

impl MaterializeMode {
    /// Mode selected by a `handle_nested_nulls` flag.
    pub fn from_handle_nested_nulls(handle_nested_nulls: bool) -> Self {
        if handle_nested_nulls {
            MaterializeMode::Correctness
        } else {
            MaterializeMode::Throughput
        }
    }

    pub fn handles_nested_nulls(&self) -> bool {
        matches!(self, MaterializeMode::Correctness)
    }

    pub fn media_failure_policy(&self) -> MediaFailurePolicy {
        match self {
            MaterializeMode::Throughput => MediaFailurePolicy::NullWithWarning,
            MaterializeMode::Correctness => MediaFailurePolicy::Fail,
        }
    }
}

impl FromStr for MaterializeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "throughput" | "fast" => Ok(MaterializeMode::Throughput),
            "correctness" | "robust" => Ok(MaterializeMode::Correctness),
            _ => Err(format!(
                "unknown materialize mode '{s}' (expected 'throughput' or 'correctness')"
            )),
        }
    }
}

impl Display for MaterializeMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MaterializeMode::Throughput => "throughput",
            MaterializeMode::Correctness => "correctness",
        })
    }
}

/// One incoming batch in either source representation.
#[derive(Debug, Clone, Copy)]
pub enum SourceBatch<'a> {
    /// Row records, each a [`Value::Struct`] mirroring the feature tree.
    Rows(&'a [Value]),
    /// Columnar source layout, possibly split into several chunks.
    Columnar(&'a [RecordBatch]),
}

impl SourceBatch<'_> {
    pub fn num_rows(&self) -> usize {
        match self {
            SourceBatch::Rows(rows) => rows.len(),
            SourceBatch::Columnar(chunks) => chunks.iter().map(RecordBatch::num_rows).sum(),
        }
    }
}

struct ColumnPlan {
    name: String,
    origin: ColumnOrigin,
    /// Feature of the extracted raw column. Struct-list sub-fields are
    /// wrapped in a sequence.
    feature: FeatureType,
    data_type: DataType,
}

/// Builds flat record batches matching a [`DerivedSchema`].
///
/// The schema and expansion map are fixed at construction; each call to
/// [`materialize`](Self::materialize) either returns a complete batch or an
/// error.
pub struct BatchMaterializer {
    root: FeatureFields,
    derived: DerivedSchema,
    mode: MaterializeMode,
    schema: SchemaRef,
    plans: Vec<ColumnPlan>,
}

impl BatchMaterializer {
    /// # Errors
    ///
    /// Returns [`ConvertError::MissingFeature`] if a derived column refers to
    /// a field that `root` does not declare.
    pub fn new(
        root: FeatureFields,
        derived: DerivedSchema,
        mode: MaterializeMode,
    ) -> Result<Self, ConvertError> {
        let schema = Arc::new(columns_to_arrow_schema(&derived.columns));
        let plans = derived
            .columns
            .iter()
            .zip(schema.fields())
            .map(|(column, field)| {
                Ok(ColumnPlan {
                    name: column.name.clone(),
                    origin: column.origin.clone(),
                    feature: origin_feature(&root, &column.origin)?,
                    data_type: field.data_type().clone(),
                })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;

        Ok(Self {
            root,
            derived,
            mode,
            schema,
            plans,
        })
    }

    /// Attach schema-level metadata to every produced batch.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.schema = Arc::new(self.schema.as_ref().clone().with_metadata(metadata));
        self
    }

    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    pub fn derived(&self) -> &DerivedSchema {
        &self.derived
    }

    pub fn features(&self) -> &FeatureFields {
        &self.root
    }

    pub fn mode(&self) -> MaterializeMode {
        self.mode
    }

    /// Materialize one source batch into a flat batch.
    ///
    /// Row input is converted to the columnar layout first in throughput
    /// mode, and columnar input is read back into rows in correctness mode.
    pub fn materialize(&self, source: SourceBatch<'_>) -> Result<RecordBatch, ConvertError> {
        let batch = match (self.mode, source) {
            (MaterializeMode::Correctness, SourceBatch::Rows(rows)) => {
                self.materialize_rows(rows)?
            }
            (MaterializeMode::Correctness, SourceBatch::Columnar(chunks)) => {
                let rows = chunks_to_rows(chunks)?;
                self.materialize_rows(&rows)?
            }
            (MaterializeMode::Throughput, SourceBatch::Columnar(chunks)) => {
                self.materialize_columns(chunks)?
            }
            (MaterializeMode::Throughput, SourceBatch::Rows(rows)) => {
                let policy = self.mode.media_failure_policy();
                let source = records_to_source_batch_with(&self.root, rows, policy)?;
                self.materialize_columns(std::slice::from_ref(&source))?
            }
        };
        debug!(
            "materialized {} rows into {} columns ({} mode)",
            batch.num_rows(),
            batch.num_columns(),
            self.mode
        );
        Ok(batch)
    }

    fn materialize_rows(&self, rows: &[Value]) -> Result<RecordBatch, ConvertError> {
        let policy = self.mode.media_failure_policy();
        let columns = self
            .plans
            .iter()
            .map(|plan| {
                let values = rows
                    .iter()
                    .map(|row| extract_row_value(row, &plan.origin))
                    .collect::<Result<Vec<_>, ConvertError>>()
                    .map_err(|e| e.in_column(&plan.name))?;
                convert_column(
                    RawColumn::Values(values),
                    &plan.feature,
                    &plan.data_type,
                    policy,
                )
                .map_err(|e| e.in_column(&plan.name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.assemble(columns, rows.len())
    }

    fn materialize_columns(&self, chunks: &[RecordBatch]) -> Result<RecordBatch, ConvertError> {
        if chunks.is_empty() {
            return Ok(RecordBatch::new_empty(self.schema()));
        }

        let policy = self.mode.media_failure_policy();
        let num_rows = chunks.iter().map(RecordBatch::num_rows).sum();
        let mut parents: HashMap<&str, ArrayRef> = HashMap::new();
        let mut columns = Vec::with_capacity(self.plans.len());

        for plan in &self.plans {
            let source_name = match &plan.origin {
                ColumnOrigin::Direct(name) => name.as_str(),
                ColumnOrigin::Expanded(e) => e.parent.as_str(),
            };
            let source = match parents.get(source_name) {
                Some(array) => Arc::clone(array),
                None => {
                    let array = concat_column(chunks, source_name)?;
                    parents.insert(source_name, Arc::clone(&array));
                    array
                }
            };
            let raw = match &plan.origin {
                ColumnOrigin::Direct(_) => source,
                ColumnOrigin::Expanded(e) => {
                    project_sub_field(&source, e).map_err(|err| err.in_column(&plan.name))?
                }
            };
            let array =
                convert_column(RawColumn::Array(raw), &plan.feature, &plan.data_type, policy)
                    .map_err(|e| e.in_column(&plan.name))?;
            columns.push(array);
        }

        self.assemble(columns, num_rows)
    }

    fn assemble(
        &self,
        columns: Vec<ArrayRef>,
        num_rows: usize,
    ) -> Result<RecordBatch, ConvertError> {
        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        Ok(RecordBatch::try_new_with_options(self.schema(), columns, &options)?)
    }
}

fn origin_feature(
    root: &FeatureFields,
    origin: &ColumnOrigin,
) -> Result<FeatureType, ConvertError> {
    match origin {
        ColumnOrigin::Direct(name) => root
            .get(name)
            .cloned()
            .ok_or_else(|| ConvertError::MissingFeature(name.clone())),
        ColumnOrigin::Expanded(e) => {
            let subs = match (e.kind, root.get(&e.parent)) {
                (ExpansionKind::Struct, Some(FeatureType::Struct(subs))) => Some(subs),
                (ExpansionKind::StructList, Some(FeatureType::Sequence(inner))) => {
                    match inner.as_ref() {
                        FeatureType::Struct(subs) => Some(subs),
                        _ => None,
                    }
                }
                _ => None,
            };
            let sub = subs
                .and_then(|subs| subs.get(&e.sub))
                .cloned()
                .ok_or_else(|| ConvertError::MissingFeature(format!("{}.{}", e.parent, e.sub)))?;
            Ok(match e.kind {
                ExpansionKind::Struct => sub,
                ExpansionKind::StructList => FeatureType::sequence(sub),
            })
        }
    }
}

/// Raw value of one target column in one row. Absent keys and absent or
/// null parents all read as null.
fn extract_row_value(row: &Value, origin: &ColumnOrigin) -> Result<Value, ConvertError> {
    let Expansion { parent, sub, kind } = match origin {
        ColumnOrigin::Direct(name) => return Ok(row.get(name)?.cloned().unwrap_or(Value::Null)),
        ColumnOrigin::Expanded(e) => e,
    };

    let parent = row.get(parent)?.unwrap_or(&Value::Null);
    match kind {
        ExpansionKind::Struct => Ok(parent.get(sub)?.cloned().unwrap_or(Value::Null)),
        ExpansionKind::StructList => match parent {
            Value::Null => Ok(Value::Null),
            Value::List(items) => items
                .iter()
                .map(|item| Ok(item.get(sub)?.cloned().unwrap_or(Value::Null)))
                .collect::<Result<Vec<_>, ConvertError>>()
                .map(Value::List),
            other => Err(other.type_mismatch("List").into()),
        },
    }
}

/// Source column `name` across all chunks as one contiguous array.
fn concat_column(chunks: &[RecordBatch], name: &str) -> Result<ArrayRef, ConvertError> {
    let mut arrays: Vec<&ArrayRef> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let array = chunk
            .column_by_name(name)
            .ok_or_else(|| ConvertError::MissingColumn(name.to_string()))?;
        arrays.push(array);
    }

    if let [array] = arrays.as_slice() {
        return Ok(Arc::clone(*array));
    }
    let arrays: Vec<&dyn Array> = arrays.into_iter().map(|a| a.as_ref()).collect();
    Ok(concat(&arrays)?)
}

/// Project `expansion.sub` out of a whole parent column.
///
/// Struct children are taken as stored; parent nulls are not propagated.
/// Struct-list children keep the list's offsets and validity.
fn project_sub_field(parent: &ArrayRef, expansion: &Expansion) -> Result<ArrayRef, ConvertError> {
    match expansion.kind {
        ExpansionKind::Struct => struct_child(parent, &expansion.sub),
        ExpansionKind::StructList => {
            let list = parent
                .as_any()
                .downcast_ref::<ListArray>()
                .ok_or_else(|| mismatch("List", parent.data_type()))?;
            let child = struct_child(list.values(), &expansion.sub)?;
            let child = mask_null_elements(list.values(), child)?;
            let item = Arc::new(Field::new("item", child.data_type().clone(), true));
            Ok(Arc::new(ListArray::try_new(
                item,
                list.offsets().clone(),
                child,
                list.nulls().cloned(),
            )?))
        }
    }
}

/// Null out `child` wherever the struct element it was projected from is null.
fn mask_null_elements(elements: &ArrayRef, child: ArrayRef) -> Result<ArrayRef, ConvertError> {
    match elements.logical_nulls() {
        Some(nulls) if nulls.null_count() > 0 => {
            let mask = BooleanArray::new(!nulls.inner(), None);
            Ok(nullif(child.as_ref(), &mask)?)
        }
        _ => Ok(child),
    }
}

fn struct_child(array: &ArrayRef, name: &str) -> Result<ArrayRef, ConvertError> {
    let struct_array = array
        .as_any()
        .downcast_ref::<StructArray>()
        .ok_or_else(|| mismatch("Struct", array.data_type()))?;
    struct_array
        .column_by_name(name)
        .cloned()
        .ok_or_else(|| ConvertError::MissingColumn(name.to_string()))
}

fn mismatch(expected: &str, actual: &DataType) -> ConvertError {
    ValueTypeError::new(expected, actual.to_string()).into()
}

/// Read columnar chunks back into row records keyed by column name.
fn chunks_to_rows(chunks: &[RecordBatch]) -> Result<Vec<Value>, ConvertError> {
    let mut rows = Vec::with_capacity(chunks.iter().map(RecordBatch::num_rows).sum());
    for chunk in chunks {
        let schema = chunk.schema();
        for i in 0..chunk.num_rows() {
            let entries = schema
                .fields()
                .iter()
                .zip(chunk.columns())
                .map(|(field, column)| {
                    Ok((Arc::from(field.name().as_str()), value_at(column.as_ref(), i)?))
                })
                .collect::<Result<Vec<_>, ConvertError>>()?;
            rows.push(Value::Struct(entries));
        }
    }
    Ok(rows)
}
