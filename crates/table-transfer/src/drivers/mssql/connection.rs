//! Tiberius-backed connector and connection.

use std::collections::HashMap;

use async_trait::async_trait;
use tiberius::{Client, Config, Query, TokenRow};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use super::convert::{column_data_to_value, describe_column, encode_value, scalar_to_i64};
use crate::core::{Connection, Connector, RowPage, TableSchema};
use crate::dialect;
use crate::error::{Endpoint, Result, TransferError};

/// Describes the first result set of a batch without executing it.
const DESCRIBE_RESULT_SET: &str = r#"
    SELECT
        name,
        TYPE_NAME(system_type_id),
        CAST(ISNULL(max_length, 0) AS INT),
        CAST(ISNULL(precision, 0) AS INT),
        CAST(ISNULL(scale, 0) AS INT),
        error_message
    FROM sys.dm_exec_describe_first_result_set(@P1, NULL, 0)
    WHERE ISNULL(is_hidden, 0) = 0
    ORDER BY column_ordinal
"#;

type TdsClient = Client<Compat<TcpStream>>;

/// Opens SQL Server connections from an ADO.NET or JDBC connection string.
#[derive(Clone)]
pub struct MssqlConnector {
    endpoint: Endpoint,
    config: Config,
}

impl MssqlConnector {
    /// Parse a connection string. `jdbc:sqlserver://...` strings use JDBC
    /// syntax; anything else is read as `Key=Value;...` ADO.NET syntax.
    pub fn new(endpoint: Endpoint, connection_string: &str) -> Result<Self> {
        let conn_str = connection_string.trim();
        let parsed = if conn_str.to_ascii_lowercase().starts_with("jdbc:") {
            Config::from_jdbc_string(conn_str)
        } else {
            Config::from_ado_string(conn_str)
        };
        let config = parsed.map_err(|e| {
            TransferError::connection(endpoint, format!("invalid connection string: {}", e))
        })?;

        Ok(Self { endpoint, config })
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    type Connection = MssqlConnection;

    fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    async fn open(&self) -> Result<MssqlConnection> {
        let config = self.config.clone();
        let addr = config.get_addr();

        let tcp = TcpStream::connect(&addr)
            .await
            .map_err(|e| TransferError::connection(self.endpoint, e))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| TransferError::connection(self.endpoint, e))?;

        info!("Connected to {} database at {}", self.endpoint, addr);
        Ok(MssqlConnection::new(self.endpoint, client))
    }
}

/// An open SQL Server connection.
pub struct MssqlConnection {
    endpoint: Endpoint,
    client: Option<TdsClient>,
    /// Column layout of bulk-load targets, described once per table.
    layouts: HashMap<String, TableSchema>,
}

impl MssqlConnection {
    fn new(endpoint: Endpoint, client: TdsClient) -> Self {
        Self {
            endpoint,
            client: Some(client),
            layouts: HashMap::new(),
        }
    }

    fn client(&mut self) -> Result<&mut TdsClient> {
        let endpoint = self.endpoint;
        self.client
            .as_mut()
            .ok_or_else(|| TransferError::connection(endpoint, "connection is closed"))
    }

    async fn layout(&mut self, table: &str) -> Result<TableSchema> {
        if let Some(layout) = self.layouts.get(table) {
            return Ok(layout.clone());
        }
        let layout = self.query_metadata(&dialect::schema_probe_sql(table)).await?;
        self.layouts.insert(table.to_string(), layout.clone());
        Ok(layout)
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    async fn execute_scalar(&mut self, sql: &str) -> Result<i64> {
        let row = self.client()?.simple_query(sql).await?.into_row().await?;
        let row = row.ok_or_else(|| TransferError::Query(format!("no rows returned by: {}", sql)))?;
        scalar_to_i64(row)
    }

    async fn execute_non_query(&mut self, sql: &str) -> Result<u64> {
        let result = self.client()?.execute(sql, &[]).await?;
        Ok(result.total())
    }

    async fn query_metadata(&mut self, sql: &str) -> Result<TableSchema> {
        let mut query = Query::new(DESCRIBE_RESULT_SET);
        query.bind(sql.to_string());

        let stream = query.query(self.client()?).await?;
        let rows = stream.into_first_result().await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(message) = row.try_get::<&str, _>(5)? {
                return Err(TransferError::Query(message.to_string()));
            }
            let name = row.try_get::<&str, _>(0)?.unwrap_or_default();
            let type_name = row.try_get::<&str, _>(1)?.unwrap_or_default();
            let max_length = row.try_get::<i32, _>(2)?.unwrap_or(0);
            let precision = row.try_get::<i32, _>(3)?.unwrap_or(0);
            let scale = row.try_get::<i32, _>(4)?.unwrap_or(0);

            columns.push(describe_column(name, type_name, max_length, precision, scale));
        }

        Ok(TableSchema::new(columns))
    }

    async fn fetch_rows(&mut self, sql: &str) -> Result<RowPage> {
        let stream = self.client()?.simple_query(sql).await?;
        let rows = stream.into_first_result().await?;

        let mut page = Vec::with_capacity(rows.len());
        for row in rows {
            let values = row
                .into_iter()
                .map(column_data_to_value)
                .collect::<Result<Vec<_>>>()?;
            page.push(values);
        }

        Ok(RowPage::new(page))
    }

    async fn bulk_load(&mut self, table: &str, page: &RowPage) -> Result<u64> {
        if page.is_empty() {
            return Ok(0);
        }

        let layout = self.layout(table).await?;
        let client = self.client()?;
        let mut bulk_load = client
            .bulk_insert(table)
            .await
            .map_err(|e| TransferError::aborted(table, format!("bulk insert init: {}", e)))?;

        for row in &page.rows {
            if row.len() != layout.len() {
                return Err(TransferError::aborted(
                    table,
                    format!(
                        "row has {} values but the table has {} columns",
                        row.len(),
                        layout.len()
                    ),
                ));
            }

            let mut token_row = TokenRow::new();
            for (value, column) in row.iter().zip(layout.iter()) {
                token_row.push(encode_value(value, column)?);
            }
            bulk_load.send(token_row).await.map_err(|e| {
                TransferError::aborted(table, format!("bulk insert send: {}", e))
            })?;
        }

        let result = bulk_load
            .finalize()
            .await
            .map_err(|e| TransferError::aborted(table, format!("bulk insert finalize: {}", e)))?;

        debug!(
            "Bulk inserted {} rows into {} (reported: {})",
            page.len(),
            table,
            result.total()
        );
        Ok(page.len() as u64)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.close().await?;
            debug!("Closed {} connection", self.endpoint);
        }
        Ok(())
    }
}
