//! Structural comparison of two table schemas.
//!
//! Two schemas are equal when they have the same number of columns and, at
//! every position, the same column name (case-sensitive) and semantic type.
//! Declared length, precision and scale are ignored, so a narrower
//! destination column can truncate values during the bulk load.

use std::fmt;

use crate::core::{SemanticType, TableSchema};

/// First structural difference between a source and destination schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDifference {
    ColumnCount {
        source: usize,
        destination: usize,
    },
    Column {
        /// 1-based position.
        position: usize,
        source_name: String,
        source_type: SemanticType,
        destination_name: String,
        destination_type: SemanticType,
    },
}

impl fmt::Display for SchemaDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDifference::ColumnCount {
                source,
                destination,
            } => write!(
                f,
                "source has {} columns, destination has {}",
                source, destination
            ),
            SchemaDifference::Column {
                position,
                source_name,
                source_type,
                destination_name,
                destination_type,
            } => write!(
                f,
                "column {} is '{}' ({}) in source but '{}' ({}) in destination",
                position, source_name, source_type, destination_name, destination_type
            ),
        }
    }
}

/// Find the first position where two schemas differ.
pub fn first_difference(source: &TableSchema, destination: &TableSchema) -> Option<SchemaDifference> {
    if source.len() != destination.len() {
        return Some(SchemaDifference::ColumnCount {
            source: source.len(),
            destination: destination.len(),
        });
    }

    source
        .iter()
        .zip(destination.iter())
        .enumerate()
        .find(|(_, (s, d))| s.name != d.name || s.semantic_type != d.semantic_type)
        .map(|(idx, (s, d))| SchemaDifference::Column {
            position: idx + 1,
            source_name: s.name.clone(),
            source_type: s.semantic_type.clone(),
            destination_name: d.name.clone(),
            destination_type: d.semantic_type.clone(),
        })
}

/// Structural equality of two schemas.
pub fn schemas_equal(a: &TableSchema, b: &TableSchema) -> bool {
    first_difference(a, b).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColumnDescriptor;

    fn schema(cols: &[(&str, SemanticType)]) -> TableSchema {
        TableSchema::new(
            cols.iter()
                .map(|(name, ty)| ColumnDescriptor::new(*name, ty.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_reflexive() {
        let s = schema(&[("id", SemanticType::Int32), ("name", SemanticType::String)]);
        assert!(schemas_equal(&s, &s));
        assert!(schemas_equal(&TableSchema::default(), &TableSchema::default()));
    }

    #[test]
    fn test_symmetric() {
        let a = schema(&[("id", SemanticType::Int32)]);
        let b = schema(&[("id", SemanticType::Int64)]);
        assert_eq!(schemas_equal(&a, &b), schemas_equal(&b, &a));
        assert!(!schemas_equal(&a, &b));
    }

    #[test]
    fn test_ignores_length_and_precision() {
        let a = TableSchema::new(vec![
            ColumnDescriptor::new("x", SemanticType::String).with_max_length(10)
        ]);
        let mut wide = ColumnDescriptor::new("x", SemanticType::String).with_max_length(9999);
        wide.declared_type = "varchar".to_string();
        let b = TableSchema::new(vec![wide]);
        assert!(schemas_equal(&a, &b));

        let mut d1 = ColumnDescriptor::new("p", SemanticType::Decimal);
        d1.precision = Some(18);
        d1.scale = Some(2);
        let mut d2 = ColumnDescriptor::new("p", SemanticType::Decimal);
        d2.precision = Some(38);
        d2.scale = Some(6);
        assert!(schemas_equal(
            &TableSchema::new(vec![d1]),
            &TableSchema::new(vec![d2])
        ));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let a = schema(&[("Name", SemanticType::String)]);
        let b = schema(&[("name", SemanticType::String)]);
        assert!(!schemas_equal(&a, &b));
    }

    #[test]
    fn test_order_matters() {
        let a = schema(&[("id", SemanticType::Int32), ("name", SemanticType::String)]);
        let b = schema(&[("name", SemanticType::String), ("id", SemanticType::Int32)]);
        assert!(!schemas_equal(&a, &b));
    }

    #[test]
    fn test_column_count_difference() {
        let a = schema(&[("id", SemanticType::Int32)]);
        let b = schema(&[("id", SemanticType::Int32), ("extra", SemanticType::Boolean)]);
        assert_eq!(
            first_difference(&a, &b),
            Some(SchemaDifference::ColumnCount {
                source: 1,
                destination: 2
            })
        );
    }

    #[test]
    fn test_type_difference_message() {
        let a = schema(&[("id", SemanticType::Int32), ("price", SemanticType::Decimal)]);
        let b = schema(&[("id", SemanticType::Int32), ("price", SemanticType::Double)]);
        let diff = first_difference(&a, &b).unwrap();
        assert_eq!(
            diff.to_string(),
            "column 2 is 'price' (Decimal) in source but 'price' (Double) in destination"
        );
    }
}
