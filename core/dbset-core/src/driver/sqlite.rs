//! SQLite driver (rusqlite, bundled)
//!
//! Column kinds come from the declared column type using SQLite's affinity
//! rules. Params bind by name (`:name`, `@name`, `$name`) and fall back to the
//! `$N` position, so both native and translated SQL work. A context passed to a
//! call is watched while the statement runs and interrupts it on expiry.

use crate::context::{self, Context};
use crate::dataset::param::ParamDirection;
use crate::driver::{
    BindArg, BufferedCursor, ColumnMeta, Connection, ExecResult, PreparedStatement, RowCursor,
    ScanKind, Session,
};
use crate::error::{DbsetError, DbsetResult};
use crate::sql::Dialect;
use crate::variant::{DATETIME_FORMAT, Variant};
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::types::{Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DRIVER_TARGET: &str = "dbset::sqlite";

/// VM instructions between context checks while a statement runs.
const PROGRESS_OPS: i32 = 1000;

/// Connection settings. `path: None` opens an in-memory database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    pub path: Option<PathBuf>,
    pub log_queries: bool,
    pub dialect: Dialect,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: None,
            log_queries: false,
            dialect: Dialect::Sqlite,
        }
    }
}

impl SqliteConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> DbsetResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DbsetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// A reopenable SQLite connection.
pub struct SqliteConnection {
    config: SqliteConfig,
    conn: Mutex<Option<rusqlite::Connection>>,
}

impl SqliteConnection {
    pub fn open(config: SqliteConfig) -> DbsetResult<Self> {
        let conn = Self::connect(&config)?;
        Ok(Self {
            config,
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn open_in_memory() -> DbsetResult<Self> {
        Self::open(SqliteConfig::in_memory())
    }

    fn connect(config: &SqliteConfig) -> DbsetResult<rusqlite::Connection> {
        let conn = match &config.path {
            Some(path) => rusqlite::Connection::open(path)?,
            None => rusqlite::Connection::open_in_memory()?,
        };
        Ok(conn)
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Drops the underlying connection. Later calls fail with
    /// `ConnectionClosed` until `reopen`.
    pub fn close(&self) {
        self.conn.lock().take();
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Runs one or more statements without params (DDL, fixtures).
    pub fn execute_batch(&self, sql: &str) -> DbsetResult<()> {
        self.with_conn(|conn| Ok(conn.execute_batch(sql)?))
    }

    pub fn begin(&self) -> DbsetResult<SqliteTransaction<'_>> {
        self.execute_batch("BEGIN")?;
        Ok(SqliteTransaction {
            conn: self,
            finished: false,
        })
    }

    fn with_conn<R>(
        &self,
        f: impl FnOnce(&rusqlite::Connection) -> DbsetResult<R>,
    ) -> DbsetResult<R> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(DbsetError::ConnectionClosed)?;
        f(conn)
    }

    fn run_query(
        &self,
        ctx: Option<&Context>,
        sql: &str,
        args: &[BindArg],
    ) -> DbsetResult<BufferedCursor> {
        self.with_conn(|conn| {
            context::check(ctx)?;
            watch_context(conn, ctx, || Self::collect_rows(conn, ctx, sql, args))
        })
    }

    fn collect_rows(
        conn: &rusqlite::Connection,
        ctx: Option<&Context>,
        sql: &str,
        args: &[BindArg],
    ) -> DbsetResult<BufferedCursor> {
        let mut stmt = conn.prepare(sql)?;
        bind_args(&mut stmt, args)?;

        let columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .map(|c| ColumnMeta {
                name: c.name().to_string(),
                scan_kind: scan_kind(c.decl_type()),
                type_name: c.decl_type().map(str::to_string),
            })
            .collect();

        let mut out = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            context::check(ctx)?;
            let mut values = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                values.push(from_sqlite(row.get_ref(i)?, column.scan_kind));
            }
            out.push(values);
        }
        Ok(BufferedCursor::new(columns, out))
    }

    fn run_prepared(
        &self,
        ctx: Option<&Context>,
        sql: &str,
        args: &[BindArg],
    ) -> DbsetResult<ExecResult> {
        self.with_conn(|conn| {
            context::check(ctx)?;
            let changes = watch_context(conn, ctx, || {
                let mut stmt = conn.prepare_cached(sql)?;
                bind_args(&mut stmt, args)?;
                Ok(stmt.raw_execute()?)
            })?;
            Ok(ExecResult {
                rows_affected: Some(changes as u64),
                last_insert_id: Some(conn.last_insert_rowid()),
                outputs: Vec::new(),
            })
        })
    }

    fn prepare_statement(&self, ctx: Option<&Context>, sql: &str) -> DbsetResult<SqlitePrepared<'_>> {
        self.with_conn(|conn| {
            context::check(ctx)?;
            conn.prepare_cached(sql)?;
            Ok(())
        })?;
        Ok(SqlitePrepared {
            conn: self,
            sql: sql.to_string(),
        })
    }
}

impl Session for SqliteConnection {
    fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    fn log_queries(&self) -> bool {
        self.config.log_queries
    }

    fn query(
        &self,
        ctx: Option<&Context>,
        sql: &str,
        args: &[BindArg],
    ) -> DbsetResult<Box<dyn RowCursor + '_>> {
        Ok(Box::new(self.run_query(ctx, sql, args)?))
    }

    fn prepare(
        &self,
        ctx: Option<&Context>,
        sql: &str,
    ) -> DbsetResult<Box<dyn PreparedStatement + '_>> {
        Ok(Box::new(self.prepare_statement(ctx, sql)?))
    }
}

impl Connection for SqliteConnection {
    fn ping(&self, ctx: Option<&Context>) -> DbsetResult<()> {
        self.with_conn(|conn| {
            context::check(ctx)?;
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    fn reopen(&self) -> DbsetResult<()> {
        let conn = Self::connect(&self.config)?;
        *self.conn.lock() = Some(conn);
        tracing::info!(target: DRIVER_TARGET, path = ?self.config.path, "connection reopened");
        Ok(())
    }
}

/// Statement validated at prepare time; executions reuse the connection's
/// statement cache.
pub struct SqlitePrepared<'c> {
    conn: &'c SqliteConnection,
    sql: String,
}

impl PreparedStatement for SqlitePrepared<'_> {
    fn execute(&mut self, ctx: Option<&Context>, args: &[BindArg]) -> DbsetResult<ExecResult> {
        self.conn.run_prepared(ctx, &self.sql, args)
    }
}

/// Open transaction; rolled back on drop unless committed.
pub struct SqliteTransaction<'c> {
    conn: &'c SqliteConnection,
    finished: bool,
}

impl SqliteTransaction<'_> {
    pub fn commit(mut self) -> DbsetResult<()> {
        self.finished = true;
        self.conn.execute_batch("COMMIT")
    }

    pub fn rollback(mut self) -> DbsetResult<()> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished
            && let Err(err) = self.conn.execute_batch("ROLLBACK")
        {
            tracing::warn!(target: DRIVER_TARGET, error = %err, "rollback on drop failed");
        }
    }
}

impl Session for SqliteTransaction<'_> {
    fn dialect(&self) -> Dialect {
        self.conn.dialect()
    }

    fn log_queries(&self) -> bool {
        self.conn.log_queries()
    }

    fn query(
        &self,
        ctx: Option<&Context>,
        sql: &str,
        args: &[BindArg],
    ) -> DbsetResult<Box<dyn RowCursor + '_>> {
        Ok(Box::new(self.conn.run_query(ctx, sql, args)?))
    }

    fn prepare(
        &self,
        ctx: Option<&Context>,
        sql: &str,
    ) -> DbsetResult<Box<dyn PreparedStatement + '_>> {
        Ok(Box::new(self.conn.prepare_statement(ctx, sql)?))
    }
}

/// Runs `f` with a progress handler that interrupts the running statement once
/// `ctx` is cancelled or past its deadline. An interrupted statement surfaces as
/// the context's error, and so does a call that finished after the deadline.
fn watch_context<R>(
    conn: &rusqlite::Connection,
    ctx: Option<&Context>,
    f: impl FnOnce() -> DbsetResult<R>,
) -> DbsetResult<R> {
    let Some(ctx) = ctx else {
        return f();
    };
    let watched = ctx.clone();
    conn.progress_handler(PROGRESS_OPS, Some(move || watched.check().is_err()));
    let result = f();
    conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);

    match (result, ctx.check()) {
        (Err(err), Ok(())) => Err(err),
        (_, Err(ctx_err)) => {
            tracing::debug!(target: DRIVER_TARGET, error = %ctx_err, "statement interrupted");
            Err(ctx_err)
        }
        (Ok(value), Ok(())) => Ok(value),
    }
}

/// Column kind from a declared type, following SQLite's affinity rules.
fn scan_kind(decl_type: Option<&str>) -> ScanKind {
    let Some(decl) = decl_type else {
        return ScanKind::Unknown;
    };
    let decl = decl.to_uppercase();
    let has = |needle: &str| decl.contains(needle);

    if has("BOOL") {
        ScanKind::Bool
    } else if has("INT") {
        ScanKind::Int64
    } else if has("CHAR") || has("CLOB") || has("TEXT") {
        ScanKind::Text
    } else if has("BLOB") {
        ScanKind::Bytes
    } else if has("REAL") || has("FLOA") || has("DOUB") || has("NUMERIC") || has("DECIMAL") {
        ScanKind::Float64
    } else if has("DATE") || has("TIME") {
        ScanKind::Timestamp
    } else {
        ScanKind::Unknown
    }
}

fn from_sqlite(value: ValueRef<'_>, kind: ScanKind) -> Variant {
    match value {
        ValueRef::Null => Variant::Null,
        ValueRef::Integer(i) => match kind {
            ScanKind::Bool => Variant::Bool(i != 0),
            ScanKind::Float64 => Variant::Float64(i as f64),
            _ => Variant::Int64(i),
        },
        ValueRef::Real(f) => Variant::Float64(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if kind == ScanKind::Timestamp
                && let Ok(dt) = NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
            {
                return Variant::DateTime(dt);
            }
            Variant::Text(text)
        }
        ValueRef::Blob(bytes) => Variant::Bytes(bytes.to_vec()),
    }
}

fn to_sqlite(value: &Variant) -> Value {
    match value {
        Variant::Null => Value::Null,
        Variant::Bool(b) => Value::Integer(i64::from(*b)),
        Variant::Int8(v) => Value::Integer(i64::from(*v)),
        Variant::Int16(v) => Value::Integer(i64::from(*v)),
        Variant::Int32(v) => Value::Integer(i64::from(*v)),
        Variant::Int64(v) => Value::Integer(*v),
        Variant::UInt8(v) => Value::Integer(i64::from(*v)),
        Variant::UInt16(v) => Value::Integer(i64::from(*v)),
        Variant::UInt32(v) => Value::Integer(i64::from(*v)),
        Variant::UInt64(v) => match i64::try_from(*v) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Real(*v as f64),
        },
        Variant::Float32(v) => Value::Real(f64::from(*v)),
        Variant::Float64(v) => Value::Real(*v),
        Variant::Text(s) => Value::Text(s.clone()),
        Variant::DateTime(dt) => Value::Text(dt.format(DATETIME_FORMAT).to_string()),
        Variant::Bytes(b) => Value::Blob(b.clone()),
        Variant::List(_) => Value::Text(value.join_list()),
    }
}

/// Binds every non-OUT argument to each placeholder spelling the statement
/// uses for it. Translated SQL can carry `:name` and `$N` for the same param.
fn bind_args(stmt: &mut rusqlite::Statement<'_>, args: &[BindArg]) -> DbsetResult<()> {
    for (i, arg) in args.iter().enumerate() {
        if arg.direction == ParamDirection::Out {
            continue;
        }
        let candidates = [
            format!(":{}", arg.name),
            format!("@{}", arg.name),
            format!("${}", arg.name),
            format!("${}", i + 1),
        ];
        let value = to_sqlite(&arg.value);
        for name in &candidates {
            if let Some(idx) = stmt.parameter_index(name)? {
                stmt.raw_bind_parameter(idx, &value)?;
            }
        }
    }
    Ok(())
}
