//! SQL text issued by the transfer engine.
//!
//! Table identifiers are passed through as the operator wrote them, so they
//! may be schema-qualified (`sales.Orders`) or bracketed (`[Order Lines]`).
//! Column names are always bracket-quoted.

/// Quote a column identifier with brackets.
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Quote a Unicode string literal.
pub fn quote_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

/// Zero-row probe whose result set carries the table's column metadata.
pub fn schema_probe_sql(table: &str) -> String {
    format!("SELECT * FROM {} WHERE 1 = 0", table)
}

/// Returns 1 when a user table with this name exists, else 0.
pub fn table_exists_sql(table: &str) -> String {
    format!(
        "SELECT CASE WHEN OBJECT_ID({}, N'U') IS NULL THEN 0 ELSE 1 END",
        quote_literal(table)
    )
}

/// Exact row count.
pub fn row_count_sql(table: &str) -> String {
    format!("SELECT COUNT_BIG(*) FROM {}", table)
}

/// One page of rows. The ordering key is a constant placeholder: the engine
/// may return any consistent order.
pub fn page_sql(table: &str, offset: u64, limit: usize) -> String {
    format!(
        "SELECT * FROM {} ORDER BY (SELECT NULL) OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
        table, offset, limit
    )
}

/// `CREATE TABLE` from `(column name, type declaration)` pairs in order.
pub fn create_table_sql(table: &str, columns: &[(String, String)]) -> String {
    let column_defs: Vec<String> = columns
        .iter()
        .map(|(name, decl)| format!("{} {}", quote_ident(name), decl))
        .collect();

    format!("CREATE TABLE {} ({})", table, column_defs.join(", "))
}
