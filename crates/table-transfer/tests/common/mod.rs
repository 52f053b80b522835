//! In-memory SQL Server stand-in for driving the transfer engine.
//!
//! Understands exactly the statements the engine issues and records every
//! one of them, so tests can assert on what was (and was not) sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use table_transfer::{
    ColumnDescriptor, Connection, Connector, Endpoint, Result, RowPage, SemanticType, SqlValue,
    TableSchema, TransferError,
};

/// A table held by a fake server.
#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub schema: TableSchema,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Everything a fake server knows and has seen.
#[derive(Debug, Default)]
pub struct FakeState {
    pub tables: HashMap<String, FakeTable>,
    /// Every statement in issue order. Bulk loads appear as `BULK <table> <rows>`.
    pub statements: Vec<String>,
    pub opened: usize,
    pub closed: usize,
    pub refuse_connections: bool,
    /// Fail the fetch issued at this offset.
    pub fail_fetch_at: Option<u64>,
    /// Fail this bulk load (1-based call number).
    pub fail_bulk_call: Option<usize>,
    bulk_calls: usize,
}

impl FakeState {
    pub fn fetches(&self) -> Vec<&String> {
        self.statements
            .iter()
            .filter(|s| s.contains(" OFFSET "))
            .collect()
    }

    /// Row counts of every bulk load, in order.
    pub fn bulk_loads(&self) -> Vec<usize> {
        self.statements
            .iter()
            .filter_map(|s| s.strip_prefix("BULK "))
            .filter_map(|s| s.rsplit(' ').next())
            .filter_map(|n| n.parse().ok())
            .collect()
    }

    pub fn creates(&self) -> Vec<&String> {
        self.statements
            .iter()
            .filter(|s| s.starts_with("CREATE TABLE"))
            .collect()
    }

    pub fn counts(&self) -> Vec<&String> {
        self.statements
            .iter()
            .filter(|s| s.starts_with("SELECT COUNT_BIG"))
            .collect()
    }

    pub fn probes(&self) -> Vec<&String> {
        self.statements
            .iter()
            .filter(|s| s.ends_with("WHERE 1 = 0"))
            .collect()
    }
}

/// One fake database server. Clones share state.
#[derive(Debug, Clone)]
pub struct FakeServer {
    endpoint: Endpoint,
    state: Arc<Mutex<FakeState>>,
}

impl FakeServer {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn with_table(self, name: &str, schema: TableSchema, rows: Vec<Vec<SqlValue>>) -> Self {
        self.state()
            .tables
            .insert(name.to_string(), FakeTable { schema, rows });
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn table(&self, name: &str) -> Option<FakeTable> {
        self.state().tables.get(name).cloned()
    }
}

#[async_trait]
impl Connector for FakeServer {
    type Connection = FakeConnection;

    fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    async fn open(&self) -> Result<FakeConnection> {
        let mut state = self.state();
        if state.refuse_connections {
            return Err(TransferError::connection(self.endpoint, "connection refused"));
        }
        state.opened += 1;
        Ok(FakeConnection {
            state: Arc::clone(&self.state),
            closed: false,
        })
    }
}

pub struct FakeConnection {
    state: Arc<Mutex<FakeState>>,
    closed: bool,
}

impl FakeConnection {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn execute_scalar(&mut self, sql: &str) -> Result<i64> {
        let mut state = self.state();
        state.statements.push(sql.to_string());

        if let Some(rest) = sql.strip_prefix("SELECT CASE WHEN OBJECT_ID(N'") {
            let name = rest
                .split("', N'U')")
                .next()
                .unwrap_or_default()
                .replace("''", "'");
            return Ok(state.tables.contains_key(&name) as i64);
        }
        if let Some(table) = sql.strip_prefix("SELECT COUNT_BIG(*) FROM ") {
            return match state.tables.get(table) {
                Some(t) => Ok(t.rows.len() as i64),
                None => Err(invalid_object(table)),
            };
        }
        Err(TransferError::Query(format!("unexpected scalar: {}", sql)))
    }

    async fn execute_non_query(&mut self, sql: &str) -> Result<u64> {
        let mut state = self.state();
        state.statements.push(sql.to_string());

        let rest = sql
            .strip_prefix("CREATE TABLE ")
            .ok_or_else(|| TransferError::Query(format!("unexpected statement: {}", sql)))?;
        let (name, defs) = rest
            .split_once(" (")
            .ok_or_else(|| TransferError::Query(format!("malformed CREATE: {}", sql)))?;
        if state.tables.contains_key(name) {
            return Err(TransferError::Query(format!(
                "There is already an object named '{}' in the database.",
                name
            )));
        }

        let defs = defs.strip_suffix(')').unwrap_or(defs);
        let columns = defs.split(", ").map(parse_column_def).collect();
        state.tables.insert(
            name.to_string(),
            FakeTable {
                schema: TableSchema::new(columns),
                rows: Vec::new(),
            },
        );
        Ok(0)
    }

    async fn query_metadata(&mut self, sql: &str) -> Result<TableSchema> {
        let mut state = self.state();
        state.statements.push(sql.to_string());

        let table = sql
            .strip_prefix("SELECT * FROM ")
            .and_then(|s| s.strip_suffix(" WHERE 1 = 0"))
            .ok_or_else(|| TransferError::Query(format!("unexpected probe: {}", sql)))?;
        state
            .tables
            .get(table)
            .map(|t| t.schema.clone())
            .ok_or_else(|| invalid_object(table))
    }

    async fn fetch_rows(&mut self, sql: &str) -> Result<RowPage> {
        let mut state = self.state();
        state.statements.push(sql.to_string());

        let (table, offset, limit) = parse_page(sql)
            .ok_or_else(|| TransferError::Query(format!("unexpected fetch: {}", sql)))?;
        if state.fail_fetch_at == Some(offset) {
            return Err(TransferError::Query("fetch failed: connection reset".to_string()));
        }

        let rows = state
            .tables
            .get(&table)
            .ok_or_else(|| invalid_object(&table))?
            .rows
            .iter()
            .skip(offset as usize)
            .take(limit)
            .cloned()
            .collect();
        Ok(RowPage::new(rows))
    }

    async fn bulk_load(&mut self, table: &str, page: &RowPage) -> Result<u64> {
        let mut state = self.state();
        state
            .statements
            .push(format!("BULK {} {}", table, page.len()));
        state.bulk_calls += 1;
        if state.fail_bulk_call == Some(state.bulk_calls) {
            return Err(TransferError::Query("bulk load failed: log full".to_string()));
        }

        let target = state
            .tables
            .get_mut(table)
            .ok_or_else(|| invalid_object(table))?;
        target.rows.extend(page.rows.iter().cloned());
        Ok(page.len() as u64)
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.state().closed += 1;
        }
        Ok(())
    }
}

fn invalid_object(name: &str) -> TransferError {
    TransferError::Query(format!("Invalid object name '{}'.", name))
}

/// `[name] DECL` back into a descriptor.
fn parse_column_def(def: &str) -> ColumnDescriptor {
    let (name, decl) = def.rsplit_once("] ").unwrap_or((def, ""));
    let name = name.trim_start_matches('[').replace("]]", "]");

    match decl {
        "INT" => ColumnDescriptor::new(name, SemanticType::Int32),
        "BIGINT" => ColumnDescriptor::new(name, SemanticType::Int64),
        "DATETIME" => ColumnDescriptor::new(name, SemanticType::DateTime),
        "BIT" => ColumnDescriptor::new(name, SemanticType::Boolean),
        "FLOAT" => ColumnDescriptor::new(name, SemanticType::Double),
        "NVARCHAR(MAX)" => ColumnDescriptor::new(name, SemanticType::String),
        d if d.starts_with("DECIMAL") => ColumnDescriptor::new(name, SemanticType::Decimal),
        d if d.starts_with("NVARCHAR(") => {
            let len = d
                .trim_start_matches("NVARCHAR(")
                .trim_end_matches(')')
                .parse()
                .unwrap_or(0);
            ColumnDescriptor::new(name, SemanticType::String).with_max_length(len)
        }
        other => ColumnDescriptor::new(name, SemanticType::Unsupported(other.to_lowercase())),
    }
}

/// `(table, offset, limit)` of a page query.
fn parse_page(sql: &str) -> Option<(String, u64, usize)> {
    let rest = sql.strip_prefix("SELECT * FROM ")?;
    let (table, rest) = rest.split_once(" ORDER BY (SELECT NULL) OFFSET ")?;
    let (offset, rest) = rest.split_once(" ROWS FETCH NEXT ")?;
    let limit = rest.strip_suffix(" ROWS ONLY")?;
    Some((table.to_string(), offset.parse().ok()?, limit.parse().ok()?))
}

// =============================================================================
// Fixtures
// =============================================================================

/// `(id INT, name NVARCHAR(50))`
pub fn people_schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnDescriptor::new("id", SemanticType::Int32),
        ColumnDescriptor::new("name", SemanticType::String).with_max_length(50),
    ])
}

pub fn people_rows(count: usize) -> Vec<Vec<SqlValue>> {
    (0..count)
        .map(|i| {
            vec![
                SqlValue::I32(i as i32),
                SqlValue::String(format!("person {}", i)),
            ]
        })
        .collect()
}

/// A source server holding `table` with `rows` people, and an empty destination server.
pub fn servers(table: &str, rows: usize) -> (FakeServer, FakeServer) {
    let source = FakeServer::new(Endpoint::Source).with_table(table, people_schema(), people_rows(rows));
    let destination = FakeServer::new(Endpoint::Destination);
    (source, destination)
}
