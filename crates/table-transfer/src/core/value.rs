//! SQL values and row pages moved between connections.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::schema::SemanticType;

/// Type hint for NULL values so the bulk loader can emit the right column
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlNullType {
    Bool,
    I32,
    I64,
    F64,
    String,
    Decimal,
    DateTime,
}

impl SqlNullType {
    /// NULL hint for a semantic type. Unsupported types have none.
    pub fn for_semantic(ty: &SemanticType) -> Option<Self> {
        match ty {
            SemanticType::Int32 => Some(SqlNullType::I32),
            SemanticType::Int64 => Some(SqlNullType::I64),
            SemanticType::String => Some(SqlNullType::String),
            SemanticType::DateTime => Some(SqlNullType::DateTime),
            SemanticType::Boolean => Some(SqlNullType::Bool),
            SemanticType::Decimal => Some(SqlNullType::Decimal),
            SemanticType::Double => Some(SqlNullType::F64),
            SemanticType::Unsupported(_) => None,
        }
    }
}

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(SqlNullType),
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }
}

/// A row in source column order.
pub type Row = Vec<SqlValue>;

/// A bounded, contiguous slice of a table's rows fetched and loaded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPage {
    pub rows: Vec<Row>,
}

impl RowPage {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
