use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

/// Arrow-independent storage type of a derived column.
///
/// Every column and every nested child is nullable; absence and null both
/// materialize as null.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    /// Opaque binary payload (resolved media), tagged so storage does not
    /// try to interpret it.
    Blob,
    List(Box<ColumnType>),
    Struct(Vec<ColumnField>),
}

impl ColumnType {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, ColumnType::Struct(_) | ColumnType::List(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::I8 => "i8",
            ColumnType::I16 => "i16",
            ColumnType::I32 => "i32",
            ColumnType::I64 => "i64",
            ColumnType::U8 => "u8",
            ColumnType::U16 => "u16",
            ColumnType::U32 => "u32",
            ColumnType::U64 => "u64",
            ColumnType::F32 => "f32",
            ColumnType::F64 => "f64",
            ColumnType::String => "string",
            ColumnType::Bytes => "bytes",
            ColumnType::Blob => "blob",
            ColumnType::List(_) => "list",
            ColumnType::Struct(_) => "struct",
        }
    }
}

/// Named child of a [`ColumnType::Struct`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnField {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnField {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// How a flattened column relates to its parent field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionKind {
    /// Sub-field of a `Struct` feature.
    Struct,
    /// Sub-field of the element struct of a `Sequence(Struct)` feature; the
    /// column holds one list per row.
    StructList,
}

/// Provenance of a flattened column: `parent.sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub parent: String,
    pub sub: String,
    pub kind: ExpansionKind,
}

impl Expansion {
    pub fn new(parent: impl Into<String>, sub: impl Into<String>, kind: ExpansionKind) -> Self {
        Self {
            parent: parent.into(),
            sub: sub.into(),
            kind,
        }
    }
}

/// Where a column's values come from in the source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOrigin {
    /// Top-level field of the same name.
    Direct(String),
    /// Flattened out of a top-level struct field.
    Expanded(Expansion),
}

/// One column of the flat schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub origin: ColumnOrigin,
}

impl Column {
    pub fn direct(name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        Self {
            origin: ColumnOrigin::Direct(name.clone()),
            name,
            column_type,
        }
    }

    pub fn expanded(
        name: impl Into<String>,
        column_type: ColumnType,
        expansion: Expansion,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            origin: ColumnOrigin::Expanded(expansion),
        }
    }
}

/// Ordered flat schema. Column names are unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Columns(pub Vec<Column>);

impl Columns {
    pub fn new(columns: Vec<Column>) -> Self {
        Self(columns)
    }

    pub fn as_slice(&self) -> &[Column] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.0.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }
}

impl From<Vec<Column>> for Columns {
    fn from(value: Vec<Column>) -> Self {
        Self(value)
    }
}

impl AsRef<[Column]> for Columns {
    fn as_ref(&self) -> &[Column] {
        self.as_slice()
    }
}

impl Deref for Columns {
    type Target = [Column];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl Display for Columns {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = super::format_columns(self.as_slice())?;
        f.write_str(&text)
    }
}

/// Derived column name → [`Expansion`], for flattened columns only.
pub type ExpansionMap = BTreeMap<String, Expansion>;
