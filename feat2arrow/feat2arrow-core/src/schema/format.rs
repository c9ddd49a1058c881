use std::fmt::{Error, Result, Write as _};

use super::{Column, ColumnField, ColumnOrigin, ColumnType};

/// Format columns in a readable style:
/// primitive columns are rendered in one line, compound columns are
/// pretty-printed. Flattened columns show the field they came from.
pub fn format_columns(columns: impl AsRef<[Column]>) -> std::result::Result<String, Error> {
    let mut out = String::new();

    for column in columns.as_ref() {
        let origin = match &column.origin {
            ColumnOrigin::Direct(_) => None,
            ColumnOrigin::Expanded(e) => Some(format!("{}.{}", e.parent, e.sub)),
        };
        format_labeled_type(&column.name, &column.column_type, origin.as_deref(), 0, &mut out)?;
    }

    Ok(out)
}

fn format_child(field: &ColumnField, indent: usize, out: &mut String) -> Result {
    format_labeled_type(&field.name, &field.column_type, None, indent, out)
}

fn format_compound(column_type: &ColumnType, indent: usize, out: &mut String) -> Result {
    let pad = " ".repeat(indent);
    writeln!(out, "{pad}type: {}", column_type.type_name())?;

    match column_type {
        ColumnType::Struct(fields) => {
            writeln!(out, "{pad}fields:")?;
            for child in fields {
                format_child(child, indent + 4, out)?;
            }
        }
        ColumnType::List(item) => {
            format_labeled_type("item", item, None, indent, out)?;
        }
        _ => unreachable!("{column_type:?} is not a compound type"),
    }

    Ok(())
}

fn format_labeled_type(
    label: &str,
    column_type: &ColumnType,
    origin: Option<&str>,
    indent: usize,
    out: &mut String,
) -> Result {
    let pad = " ".repeat(indent);
    if column_type.is_primitive() {
        let origin = origin.map(|o| format!(", from: {o}")).unwrap_or_default();
        writeln!(out, "{pad}{label}: {{ type: {}{origin} }}", column_type.type_name())?;
    } else {
        writeln!(out, "{pad}{label}:")?;
        if let Some(origin) = origin {
            writeln!(out, "{pad}    from: {origin}")?;
        }
        format_compound(column_type, indent + 4, out)?;
    }
    Ok(())
}
