//! Column and table schema metadata.
//!
//! A [`TableSchema`] is the ordered list of columns exactly as the engine
//! returned them for `SELECT *`. The order is canonical: it drives both the
//! column list of a generated `CREATE TABLE` and positional comparison
//! against an existing destination.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Engine-independent classification of a column's data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    Int32,
    Int64,
    String,
    DateTime,
    Boolean,
    Decimal,
    Double,
    /// Any engine type outside the fixed set above, carrying the engine's
    /// type name.
    Unsupported(String),
}

impl SemanticType {
    /// Classify a SQL Server type name.
    pub fn from_mssql(type_name: &str) -> Self {
        match type_name.to_lowercase().as_str() {
            "int" => SemanticType::Int32,
            "bigint" => SemanticType::Int64,
            "char" | "varchar" | "text" | "nchar" | "nvarchar" | "ntext" | "xml" => {
                SemanticType::String
            }
            "datetime" | "datetime2" | "smalldatetime" | "date" => SemanticType::DateTime,
            "bit" => SemanticType::Boolean,
            // money has no bulk-insert encoding, so it stays outside the set.
            "decimal" | "numeric" => SemanticType::Decimal,
            "float" => SemanticType::Double,
            other => SemanticType::Unsupported(other.to_string()),
        }
    }

    /// Whether the type map can translate this type.
    pub fn is_supported(&self) -> bool {
        !matches!(self, SemanticType::Unsupported(_))
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Int32 => write!(f, "Int32"),
            SemanticType::Int64 => write!(f, "Int64"),
            SemanticType::String => write!(f, "String"),
            SemanticType::DateTime => write!(f, "DateTime"),
            SemanticType::Boolean => write!(f, "Boolean"),
            SemanticType::Decimal => write!(f, "Decimal"),
            SemanticType::Double => write!(f, "Double"),
            SemanticType::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, case preserved as returned by the engine.
    pub name: String,

    /// Semantic type.
    pub semantic_type: SemanticType,

    /// Maximum length in characters for string types. `None` for MAX or
    /// non-string columns.
    pub max_length: Option<u32>,

    /// Declared engine type name (e.g. "nvarchar", "datetime2").
    pub declared_type: String,

    /// Numeric precision, when the engine reports one.
    pub precision: Option<u8>,

    /// Numeric scale, when the engine reports one.
    pub scale: Option<u8>,
}

impl ColumnDescriptor {
    /// Create a descriptor with no declared type details.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        let declared_type = match &semantic_type {
            SemanticType::Int32 => "int",
            SemanticType::Int64 => "bigint",
            SemanticType::String => "nvarchar",
            SemanticType::DateTime => "datetime",
            SemanticType::Boolean => "bit",
            SemanticType::Decimal => "decimal",
            SemanticType::Double => "float",
            SemanticType::Unsupported(name) => name.as_str(),
        }
        .to_string();

        Self {
            name: name.into(),
            semantic_type,
            max_length: None,
            declared_type,
            precision: None,
            scale: None,
        }
    }

    /// Set the maximum character length.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// Ordered column list of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor> {
        self.columns.iter()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl From<Vec<ColumnDescriptor>> for TableSchema {
    fn from(columns: Vec<ColumnDescriptor>) -> Self {
        Self::new(columns)
    }
}
