//! Derivation of the flat column schema from a nested feature tree.

use std::collections::HashSet;

use crate::{
    error::SchemaError,
    feature::{FeatureFields, FeatureType, ScalarKind},
    metadata::DecodeMetadata,
    schema::{
        Column, ColumnField, ColumnOrigin, ColumnType, Columns, Expansion, ExpansionKind,
        ExpansionMap,
    },
};

/// Options controlling [`derive_schema_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeriveOptions {
    /// Levels of struct flattening. Normalized by
    /// [`normalize_expansion_depth`]: any positive value flattens exactly one level.
    pub expansion_depth: usize,
    /// Also flatten top-level `Sequence(Struct)` fields into one list column
    /// per sub-field. Only takes effect when expansion is enabled.
    pub expand_struct_lists: bool,
}

/// Everything produced by one derivation pass. Each call builds a fresh
/// value; callers replace any previous one wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedSchema {
    pub columns: Columns,
    pub expansion_map: ExpansionMap,
    pub decode_metadata: DecodeMetadata,
}

/// Cap the requested expansion depth at one level.
///
/// Deeper structs stay as a single struct-typed column.
pub fn normalize_expansion_depth(depth: usize) -> usize {
    depth.min(1)
}

/// Derive the flat schema of `root` with default options and the given depth.
pub fn derive_schema(
    root: &FeatureFields,
    expansion_depth: usize,
) -> Result<DerivedSchema, SchemaError> {
    derive_schema_with(
        root,
        DeriveOptions {
            expansion_depth,
            ..DeriveOptions::default()
        },
    )
}

/// Derive the flat schema, expansion map and decode metadata of `root`.
///
/// # Errors
///
/// Returns a [`SchemaError`] naming the offending field path when the tree
/// holds an empty struct, an empty label list, duplicate sibling names, or
/// when flattening produces a column name that is already taken. No partial
/// schema is returned.
pub fn derive_schema_with(
    root: &FeatureFields,
    options: DeriveOptions,
) -> Result<DerivedSchema, SchemaError> {
    let expand = normalize_expansion_depth(options.expansion_depth) > 0;
    check_unique_names(root, "")?;

    let mut columns = Vec::with_capacity(root.len());
    let mut expansion_map = ExpansionMap::new();

    for field in root.iter() {
        let struct_list = match &field.feature {
            FeatureType::Sequence(inner) if options.expand_struct_lists => match inner.as_ref() {
                FeatureType::Struct(subs) => Some(subs),
                _ => None,
            },
            _ => None,
        };

        match (&field.feature, struct_list) {
            (FeatureType::Struct(subs), _) if expand => expand_fields(
                &field.name,
                subs,
                ExpansionKind::Struct,
                &mut columns,
                &mut expansion_map,
            )?,
            (_, Some(subs)) if expand => expand_fields(
                &field.name,
                subs,
                ExpansionKind::StructList,
                &mut columns,
                &mut expansion_map,
            )?,
            (feature, _) => {
                columns.push(Column::direct(&field.name, column_type(feature, &field.name)?));
            }
        }
    }

    let mut seen = HashSet::with_capacity(columns.len());
    for column in &columns {
        if !seen.insert(column.name.as_str()) {
            let path = match &column.origin {
                ColumnOrigin::Direct(name) => name.clone(),
                ColumnOrigin::Expanded(e) => format!("{}.{}", e.parent, e.sub),
            };
            return Err(SchemaError::ColumnCollision {
                name: column.name.clone(),
                path,
            });
        }
    }

    Ok(DerivedSchema {
        columns: columns.into(),
        expansion_map,
        decode_metadata: DecodeMetadata::from_features(root),
    })
}

/// Flatten the sub-fields of `parent` into `{parent}_{sub}` columns.
///
/// Depth is exhausted after this level, so each sub-field converts to exactly
/// one column. Struct-list sub-fields become lists of the sub-field type.
fn expand_fields(
    parent: &str,
    subs: &FeatureFields,
    kind: ExpansionKind,
    columns: &mut Vec<Column>,
    expansion_map: &mut ExpansionMap,
) -> Result<(), SchemaError> {
    if subs.is_empty() {
        return Err(SchemaError::EmptyStruct {
            path: parent.to_string(),
        });
    }
    check_unique_names(subs, parent)?;

    for sub in subs.iter() {
        let path = format!("{parent}.{}", sub.name);
        let name = format!("{parent}_{}", sub.name);
        let item = column_type(&sub.feature, &path)?;
        let column_type = match kind {
            ExpansionKind::Struct => item,
            ExpansionKind::StructList => ColumnType::List(Box::new(item)),
        };
        let expansion = Expansion::new(parent, &sub.name, kind);
        expansion_map.insert(name.clone(), expansion.clone());
        columns.push(Column::expanded(name, column_type, expansion));
    }
    Ok(())
}

/// Storage type of a single feature, without any flattening.
fn column_type(feature: &FeatureType, path: &str) -> Result<ColumnType, SchemaError> {
    Ok(match feature {
        FeatureType::MediaBlob(_) => ColumnType::Blob,
        FeatureType::CategoricalLabel(names) => {
            if names.is_empty() {
                return Err(SchemaError::EmptyLabels {
                    path: path.to_string(),
                });
            }
            ColumnType::String
        }
        FeatureType::Scalar(kind) => scalar_column_type(*kind),
        FeatureType::Sequence(inner) => ColumnType::List(Box::new(column_type(inner, path)?)),
        FeatureType::Struct(fields) => {
            if fields.is_empty() {
                return Err(SchemaError::EmptyStruct {
                    path: path.to_string(),
                });
            }
            check_unique_names(fields, path)?;
            let children = fields
                .iter()
                .map(|f| {
                    let child_path = format!("{path}.{}", f.name);
                    Ok(ColumnField::new(&f.name, column_type(&f.feature, &child_path)?))
                })
                .collect::<Result<Vec<_>, SchemaError>>()?;
            ColumnType::Struct(children)
        }
    })
}

fn scalar_column_type(kind: ScalarKind) -> ColumnType {
    match kind {
        ScalarKind::Bool => ColumnType::Bool,
        ScalarKind::Int8 => ColumnType::I8,
        ScalarKind::Int16 => ColumnType::I16,
        ScalarKind::Int32 => ColumnType::I32,
        ScalarKind::Int64 => ColumnType::I64,
        ScalarKind::UInt8 => ColumnType::U8,
        ScalarKind::UInt16 => ColumnType::U16,
        ScalarKind::UInt32 => ColumnType::U32,
        ScalarKind::UInt64 => ColumnType::U64,
        ScalarKind::Float32 => ColumnType::F32,
        ScalarKind::Float64 => ColumnType::F64,
        ScalarKind::String => ColumnType::String,
        ScalarKind::Binary => ColumnType::Bytes,
    }
}

fn check_unique_names(fields: &FeatureFields, parent: &str) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields.iter() {
        if !seen.insert(field.name.as_str()) {
            let path = if parent.is_empty() {
                field.name.clone()
            } else {
                format!("{parent}.{}", field.name)
            };
            return Err(SchemaError::DuplicateField { path });
        }
    }
    Ok(())
}
