//! Embedded query engine — a short-lived DuckDB session over Parquet files.
//!
//! Every tool call opens its own in-memory session, registers the files it
//! needs as views, runs its SQL, and closes the session before returning.
//! Nothing is shared between calls.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use serde_json::{Map, Number, Value as JsonValue};
use tracing::{debug, warn};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Rows returned by a statement, with column names in select order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl QueryRows {
    /// Pair each row with the column names.
    pub fn into_records(self) -> Vec<Map<String, JsonValue>> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect()
    }

    /// Render as an aligned plain-text table.
    pub fn render_table(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render_cell).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let format_line = |values: &[String]| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{v:<w$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![format_line(&self.columns)];
        lines.extend(cells.iter().map(|row| format_line(row)));
        lines.join("\n")
    }
}

fn render_cell(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────
// EngineSession
// ─────────────────────────────────────────────

/// An exclusive in-memory DuckDB connection.
///
/// Closed by [`EngineSession::close`] or on drop, whichever comes first.
pub struct EngineSession {
    conn: Option<Connection>,
    views: HashSet<String>,
}

impl EngineSession {
    /// Open a fresh in-memory session.
    pub fn open() -> duckdb::Result<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("engine session opened");
        Ok(Self {
            conn: Some(conn),
            views: HashSet::new(),
        })
    }

    fn conn(&self) -> duckdb::Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| duckdb::Error::InvalidParameterName("session closed".into()))
    }

    /// Register `path` as a view named after `base`, adding `_1`, `_2`, …
    /// when the name is taken. Returns the view name.
    pub fn register_view(&mut self, base: &str, path: &Path) -> duckdb::Result<String> {
        let name = unique_view_name(base, &self.views);
        let sql = format!(
            "CREATE VIEW {} AS SELECT * FROM read_parquet({})",
            quote_ident(&name),
            quote_literal(&path.to_string_lossy())
        );
        self.conn()?.execute_batch(&sql)?;
        debug!(view = %name, path = %path.display(), "registered view");
        self.views.insert(name.to_lowercase());
        Ok(name)
    }

    /// Run `sql` and fetch every row.
    pub fn query(&self, sql: &str) -> duckdb::Result<QueryRows> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        let columns: Vec<String> = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value: Value = row.get(i)?;
                values.push(to_json(value));
            }
            out.push(values);
        }

        Ok(QueryRows { columns, rows: out })
    }

    /// Column names and types of a Parquet file.
    pub fn describe(&self, path: &Path) -> duckdb::Result<QueryRows> {
        let sql = format!(
            "DESCRIBE SELECT * FROM read_parquet({})",
            quote_literal(&path.to_string_lossy())
        );
        self.query(&sql)
    }

    /// Tear the session down.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                warn!(error = %e, "engine session close failed");
            }
            debug!(views = self.views.len(), "engine session closed");
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// `base`, or `base_1`, `base_2`, … — the first not in `taken`.
///
/// `taken` holds lowercase names; DuckDB identifiers are case-insensitive.
pub fn unique_view_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(&base.to_lowercase()) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(&candidate.to_lowercase()))
        .unwrap_or_else(|| base.to_string())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

// ─────────────────────────────────────────────
// Value conversion
// ─────────────────────────────────────────────

/// Convert an engine value to JSON. Temporal values become ISO-8601 strings,
/// including inside lists, structs, and maps.
pub fn to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::TinyInt(n) => JsonValue::from(n),
        Value::SmallInt(n) => JsonValue::from(n),
        Value::Int(n) => JsonValue::from(n),
        Value::BigInt(n) => JsonValue::from(n),
        Value::HugeInt(n) => match i64::try_from(n) {
            Ok(small) => JsonValue::from(small),
            Err(_) => JsonValue::String(n.to_string()),
        },
        Value::UTinyInt(n) => JsonValue::from(n),
        Value::USmallInt(n) => JsonValue::from(n),
        Value::UInt(n) => JsonValue::from(n),
        Value::UBigInt(n) => JsonValue::from(n),
        Value::Float(f) => float_json(f64::from(f)),
        Value::Double(f) => float_json(f),
        Value::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::String(text))
        }
        Value::Text(s) | Value::Enum(s) => JsonValue::String(s),
        Value::Blob(bytes) => JsonValue::String(format!("<{} bytes>", bytes.len())),
        Value::Timestamp(_, i64::MAX) => JsonValue::String("infinity".into()),
        Value::Timestamp(_, raw) if raw == -i64::MAX => JsonValue::String("-infinity".into()),
        Value::Timestamp(unit, raw) => {
            let (secs, nanos) = split_epoch(unit, raw);
            DateTime::from_timestamp(secs, nanos)
                .map(|dt| JsonValue::String(iso_datetime(dt.naive_utc(), nanos)))
                .unwrap_or(JsonValue::Null)
        }
        Value::Date32(i32::MAX) => JsonValue::String("infinity".into()),
        Value::Date32(days) if days == -i32::MAX => JsonValue::String("-infinity".into()),
        Value::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|d| JsonValue::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(JsonValue::Null),
        Value::Time64(unit, raw) => {
            let (secs, nanos) = split_epoch(unit, raw);
            u32::try_from(secs)
                .ok()
                .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, nanos))
                .map(|t| {
                    let fmt = if nanos == 0 { "%H:%M:%S" } else { "%H:%M:%S%.6f" };
                    JsonValue::String(t.format(fmt).to_string())
                })
                .unwrap_or(JsonValue::Null)
        }
        Value::List(items) | Value::Array(items) => {
            JsonValue::Array(items.into_iter().map(to_json).collect())
        }
        Value::Struct(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v.clone())))
                .collect(),
        ),
        Value::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (map_key(k.clone()), to_json(v.clone())))
                .collect(),
        ),
        Value::Union(inner) => to_json(*inner),
        Value::Interval {
            months,
            days,
            nanos,
        } => JsonValue::String(interval_text(months, days, nanos)),
        other => JsonValue::String(format!("{other:?}")),
    }
}

fn float_json(f: f64) -> JsonValue {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn map_key(key: Value) -> String {
    match to_json(key) {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

/// DuckDB's interval text: `1 year 2 months 3 days 04:05:06.5`.
///
/// The clock part is left out when it is zero, unless nothing else is set.
fn interval_text(months: i32, days: i32, nanos: i64) -> String {
    let mut parts = Vec::new();
    let (years, months) = (months / 12, months % 12);
    for (n, unit) in [(years, "year"), (months, "month"), (days, "day")] {
        if n != 0 {
            let plural = if n.abs() == 1 { "" } else { "s" };
            parts.push(format!("{n} {unit}{plural}"));
        }
    }

    if nanos != 0 || parts.is_empty() {
        let sign = if nanos < 0 { "-" } else { "" };
        let micros = nanos.unsigned_abs() / 1_000;
        let secs = micros / 1_000_000;
        let frac = micros % 1_000_000;
        let mut clock = format!(
            "{sign}{:02}:{:02}:{:02}",
            secs / 3_600,
            secs / 60 % 60,
            secs % 60
        );
        if frac != 0 {
            let digits = format!("{frac:06}");
            clock.push('.');
            clock.push_str(digits.trim_end_matches('0'));
        }
        parts.push(clock);
    }

    parts.join(" ")
}

/// Split a raw count in `unit` into whole seconds and nanoseconds.
fn split_epoch(unit: TimeUnit, raw: i64) -> (i64, u32) {
    let per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let secs = raw.div_euclid(per_second);
    let frac = raw.rem_euclid(per_second);
    let nanos = (frac * (1_000_000_000 / per_second)) as u32;
    (secs, nanos)
}

/// `YYYY-MM-DDTHH:MM:SS`, with `.ffffff` only when there is a fraction.
fn iso_datetime(dt: chrono::NaiveDateTime, nanos: u32) -> String {
    if nanos == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Write the result of `select_sql` to a Parquet file (test fixtures).
#[cfg(test)]
pub(crate) fn write_parquet(path: &Path, select_sql: &str) {
    let conn = Connection::open_in_memory().unwrap();
    let sql = format!(
        "COPY ({select_sql}) TO {} (FORMAT PARQUET)",
        quote_literal(&path.to_string_lossy())
    );
    conn.execute_batch(&sql).unwrap();
}


