//! Type mapping from semantic column types to SQL Server declarations.

use crate::core::{ColumnDescriptor, SemanticType, TableSchema};
use crate::error::{Result, TransferError};

/// Map a column to its destination type declaration.
///
/// Fails with [`TransferError::UnsupportedType`] for any type outside the
/// fixed table.
pub fn map_column(column: &ColumnDescriptor) -> Result<String> {
    let decl = match &column.semantic_type {
        SemanticType::Int32 => "INT".to_string(),
        SemanticType::Int64 => "BIGINT".to_string(),
        SemanticType::String => match column.max_length {
            Some(len) if len > 0 => format!("NVARCHAR({})", len),
            _ => "NVARCHAR(MAX)".to_string(),
        },
        SemanticType::DateTime => "DATETIME".to_string(),
        SemanticType::Boolean => "BIT".to_string(),
        // Precision and scale are fixed regardless of the source column.
        SemanticType::Decimal => "DECIMAL(18,2)".to_string(),
        SemanticType::Double => "FLOAT".to_string(),
        SemanticType::Unsupported(type_name) => {
            return Err(TransferError::UnsupportedType {
                column: column.name.clone(),
                type_name: type_name.clone(),
            })
        }
    };

    Ok(decl)
}

/// Map every column of a schema, in order. Stops at the first unsupported
/// column.
pub fn map_schema(schema: &TableSchema) -> Result<Vec<(String, String)>> {
    schema
        .iter()
        .map(|col| Ok((col.name.clone(), map_column(col)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(ty: SemanticType) -> ColumnDescriptor {
        ColumnDescriptor::new("c", ty)
    }

    #[test]
    fn test_fixed_types() {
        assert_eq!(map_column(&col(SemanticType::Int32)).unwrap(), "INT");
        assert_eq!(map_column(&col(SemanticType::Int64)).unwrap(), "BIGINT");
        assert_eq!(map_column(&col(SemanticType::DateTime)).unwrap(), "DATETIME");
        assert_eq!(map_column(&col(SemanticType::Boolean)).unwrap(), "BIT");
        assert_eq!(map_column(&col(SemanticType::Double)).unwrap(), "FLOAT");
    }

    #[test]
    fn test_string_types() {
        let sized = col(SemanticType::String).with_max_length(50);
        assert_eq!(map_column(&sized).unwrap(), "NVARCHAR(50)");

        let unbounded = col(SemanticType::String);
        assert_eq!(map_column(&unbounded).unwrap(), "NVARCHAR(MAX)");

        let zero = col(SemanticType::String).with_max_length(0);
        assert_eq!(map_column(&zero).unwrap(), "NVARCHAR(MAX)");
    }

    #[test]
    fn test_decimal_ignores_source_precision() {
        let mut wide = col(SemanticType::Decimal);
        wide.precision = Some(38);
        wide.scale = Some(10);
        assert_eq!(map_column(&wide).unwrap(), "DECIMAL(18,2)");
    }

    #[test]
    fn test_unsupported_type() {
        let column = ColumnDescriptor::new(
            "row_guid",
            SemanticType::Unsupported("uniqueidentifier".into()),
        );
        match map_column(&column) {
            Err(TransferError::UnsupportedType { column, type_name }) => {
                assert_eq!(column, "row_guid");
                assert_eq!(type_name, "uniqueidentifier");
            }
            other => panic!("expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_map_schema_stops_at_unsupported() {
        let schema = TableSchema::new(vec![
            ColumnDescriptor::new("id", SemanticType::Int32),
            ColumnDescriptor::new("blob", SemanticType::Unsupported("varbinary".into())),
        ]);
        assert!(matches!(
            map_schema(&schema),
            Err(TransferError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_map_schema_preserves_order() {
        let schema = TableSchema::new(vec![
            ColumnDescriptor::new("id", SemanticType::Int32),
            ColumnDescriptor::new("name", SemanticType::String).with_max_length(50),
        ]);
        let mapped = map_schema(&schema).unwrap();
        assert_eq!(
            mapped,
            vec![
                ("id".to_string(), "INT".to_string()),
                ("name".to_string(), "NVARCHAR(50)".to_string()),
            ]
        );
    }
}
