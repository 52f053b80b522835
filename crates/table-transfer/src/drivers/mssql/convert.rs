//! Conversions between TDS column data and [`SqlValue`].

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use tiberius::{ColumnData, FromSql, Row};
use tracing::warn;

use crate::core::{ColumnDescriptor, SemanticType, SqlNullType, SqlValue};
use crate::error::{Result, TransferError};

const NANOS_PER_SEC: u64 = 1_000_000_000;
const TICKS_PER_DAY: u64 = 300 * 86_400;
const MINUTES_PER_DAY: u64 = 24 * 60;

/// Build a column descriptor from a `dm_exec_describe_first_result_set` row.
///
/// `max_length` is in bytes as SQL Server reports it, `-1` meaning MAX. The
/// large-object types report their in-row pointer size, so they get no length.
pub(crate) fn describe_column(
    name: &str,
    type_name: &str,
    max_length: i32,
    precision: i32,
    scale: i32,
) -> ColumnDescriptor {
    let declared_type = type_name.to_lowercase();
    let semantic_type = SemanticType::from_mssql(&declared_type);

    let max_length = match (&semantic_type, declared_type.as_str()) {
        (_, "text" | "ntext" | "xml") => None,
        (SemanticType::String, "nchar" | "nvarchar") if max_length > 0 => {
            Some((max_length / 2) as u32)
        }
        (SemanticType::String, _) if max_length > 0 => Some(max_length as u32),
        _ => None,
    };

    let (precision, scale) = match declared_type.as_str() {
        "decimal" | "numeric" => (u8::try_from(precision).ok(), u8::try_from(scale).ok()),
        _ => (None, None),
    };

    ColumnDescriptor {
        name: name.to_string(),
        semantic_type,
        max_length,
        declared_type,
        precision,
        scale,
    }
}

/// Read the first column of a row as an integer.
pub(crate) fn scalar_to_i64(row: Row) -> Result<i64> {
    let value = row
        .into_iter()
        .next()
        .ok_or_else(|| TransferError::Query("scalar query returned no columns".into()))?;

    match value {
        ColumnData::U8(v) => Ok(v.map(i64::from).unwrap_or(0)),
        ColumnData::I16(v) => Ok(v.map(i64::from).unwrap_or(0)),
        ColumnData::I32(v) => Ok(v.map(i64::from).unwrap_or(0)),
        ColumnData::I64(v) => Ok(v.unwrap_or(0)),
        other => Err(TransferError::Query(format!(
            "expected an integer scalar, got {:?}",
            other
        ))),
    }
}

/// Decode one TDS value.
pub(crate) fn column_data_to_value(data: ColumnData<'static>) -> Result<SqlValue> {
    let value = match data {
        ColumnData::Bit(v) => v.map(SqlValue::Bool).unwrap_or(SqlValue::Null(SqlNullType::Bool)),
        ColumnData::I32(v) => v.map(SqlValue::I32).unwrap_or(SqlValue::Null(SqlNullType::I32)),
        ColumnData::I64(v) => v.map(SqlValue::I64).unwrap_or(SqlValue::Null(SqlNullType::I64)),
        ColumnData::F64(v) => v.map(SqlValue::F64).unwrap_or(SqlValue::Null(SqlNullType::F64)),
        ColumnData::String(v) => v
            .map(|s| SqlValue::String(s.into_owned()))
            .unwrap_or(SqlValue::Null(SqlNullType::String)),
        ColumnData::Xml(v) => v
            .map(|xml| SqlValue::String(xml.into_owned().into_string()))
            .unwrap_or(SqlValue::Null(SqlNullType::String)),
        ColumnData::Numeric(v) => match v {
            Some(num) => Decimal::try_from_i128_with_scale(num.value(), u32::from(num.scale()))
                .map(SqlValue::Decimal)
                .map_err(|e| TransferError::Query(format!("decimal out of range: {}", e)))?,
            None => SqlValue::Null(SqlNullType::Decimal),
        },
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(&data)?
                .map(SqlValue::DateTime)
                .unwrap_or(SqlValue::Null(SqlNullType::DateTime))
        }
        ColumnData::Date(_) => NaiveDate::from_sql(&data)?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(SqlValue::DateTime)
            .unwrap_or(SqlValue::Null(SqlNullType::DateTime)),
        other => {
            return Err(TransferError::Query(format!(
                "unsupported column value {:?}",
                other
            )))
        }
    };

    Ok(value)
}

/// Encode a value for bulk insert into a column of the given declared type.
pub(crate) fn encode_value(value: &SqlValue, column: &ColumnDescriptor) -> Result<ColumnData<'static>> {
    let declared = column.declared_type.as_str();

    let data = match value {
        SqlValue::Null(_) => null_for(declared),
        SqlValue::Bool(b) => ColumnData::Bit(Some(*b)),
        SqlValue::I32(i) => ColumnData::I32(Some(*i)),
        SqlValue::I64(i) => ColumnData::I64(Some(*i)),
        SqlValue::F64(f) => {
            if f.is_nan() || f.is_infinite() {
                warn!("Converting F64 NaN/Infinity to NULL for MSSQL compatibility");
                ColumnData::F64(None)
            } else {
                ColumnData::F64(Some(*f))
            }
        }
        SqlValue::String(s) => ColumnData::String(Some(Cow::Owned(s.clone()))),
        SqlValue::Decimal(d) => decimal_to_numeric(*d, column.scale),
        SqlValue::DateTime(dt) => encode_datetime(dt, declared).ok_or_else(|| {
            TransferError::Query(format!(
                "value {} is out of range for {} column {}",
                dt, declared, column.name
            ))
        })?,
    };

    Ok(data)
}

fn null_for(declared: &str) -> ColumnData<'static> {
    match declared {
        "int" => ColumnData::I32(None),
        "bigint" => ColumnData::I64(None),
        "bit" => ColumnData::Bit(None),
        "float" => ColumnData::F64(None),
        "decimal" | "numeric" => ColumnData::Numeric(None),
        "datetime" => ColumnData::DateTime(None),
        "smalldatetime" => ColumnData::SmallDateTime(None),
        "datetime2" => ColumnData::DateTime2(None),
        "date" => ColumnData::Date(None),
        _ => ColumnData::String(None),
    }
}

/// Bulk insert requires the value's scale to match the column's.
fn decimal_to_numeric(mut d: Decimal, scale: Option<u8>) -> ColumnData<'static> {
    if let Some(scale) = scale {
        d.rescale(u32::from(scale));
    }
    ColumnData::Numeric(Some(tiberius::numeric::Numeric::new_with_scale(
        d.mantissa(),
        d.scale() as u8,
    )))
}

fn nanos_since_midnight(time: NaiveTime) -> u64 {
    time.num_seconds_from_midnight() as u64 * NANOS_PER_SEC + time.nanosecond() as u64
}

/// Encode a timestamp for the destination's date/time flavour. Returns
/// `None` when the value is outside that type's range.
fn encode_datetime(dt: &NaiveDateTime, declared: &str) -> Option<ColumnData<'static>> {
    let time_nanos = nanos_since_midnight(dt.time());

    match declared {
        "datetime" => {
            // Days since 1900-01-01, time in 1/300 s ticks rounded to the
            // nearest tick. A full day of ticks rolls into the next day.
            let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?;
            let mut days = (dt.date() - epoch).num_days();
            let mut ticks = (time_nanos * 300 + NANOS_PER_SEC / 2) / NANOS_PER_SEC;
            if ticks >= TICKS_PER_DAY {
                days += 1;
                ticks -= TICKS_PER_DAY;
            }
            let days = i32::try_from(days).ok()?;
            Some(ColumnData::DateTime(Some(tiberius::time::DateTime::new(
                days,
                ticks as u32,
            ))))
        }
        "smalldatetime" => {
            // Days since 1900-01-01, time rounded to the nearest minute.
            let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?;
            let mut days = (dt.date() - epoch).num_days();
            let mut minutes = (time_nanos + 30 * NANOS_PER_SEC) / (60 * NANOS_PER_SEC);
            if minutes >= MINUTES_PER_DAY {
                days += 1;
                minutes -= MINUTES_PER_DAY;
            }
            let days = u16::try_from(days).ok()?;
            Some(ColumnData::SmallDateTime(Some(
                tiberius::time::SmallDateTime::new(days, minutes as u16),
            )))
        }
        "date" => {
            let days = days_since_year_one(dt.date())?;
            Some(ColumnData::Date(Some(tiberius::time::Date::new(days))))
        }
        _ => {
            // datetime2 at scale 7 (100 ns increments).
            let days = days_since_year_one(dt.date())?;
            let date = tiberius::time::Date::new(days);
            let time = tiberius::time::Time::new(time_nanos / 100, 7);
            Some(ColumnData::DateTime2(Some(tiberius::time::DateTime2::new(
                date, time,
            ))))
        }
    }
}

fn days_since_year_one(date: NaiveDate) -> Option<u32> {
    let epoch = NaiveDate::from_ymd_opt(1, 1, 1)?;
    u32::try_from((date - epoch).num_days()).ok()
}
