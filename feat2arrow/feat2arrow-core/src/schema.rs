//! Arrow-independent flat column schema intermediate representation.

mod format;
mod types;

pub use format::format_columns;
pub use types::{
    Column, ColumnField, ColumnOrigin, ColumnType, Columns, Expansion, ExpansionKind,
    ExpansionMap,
};
