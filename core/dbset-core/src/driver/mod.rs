//! Driver seam — what the DataSet needs from a database.
//!
//! A [`Session`] runs parameterized queries and prepares statements; both a
//! connection and an active transaction are sessions. A [`Connection`] can
//! additionally be probed and reopened, which the DataSet uses for its single
//! reconnect-and-retry on query failure.
//!
//! Cursors and prepared statements are boxed handles borrowed from the
//! session; dropping them releases the driver resource.

#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::context::Context;
use crate::dataset::param::ParamDirection;
use crate::error::{DbsetError, DbsetResult};
use crate::sql::Dialect;
use crate::variant::Variant;
use std::collections::VecDeque;

/// Scan type reported by the driver for a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanKind {
    Text,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Timestamp,
    Bool,
    Bytes,
    #[default]
    Unknown,
}

/// Result column metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub scan_kind: ScanKind,
    /// Database type name as declared, if the driver knows it.
    pub type_name: Option<String>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, scan_kind: ScanKind) -> Self {
        Self {
            name: name.into(),
            scan_kind,
            type_name: None,
        }
    }
}

/// Large-object flavour of an input param.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    Clob,
    Blob,
}

/// One driver-bindable argument.
///
/// OUT arguments carry a typed seed value describing the expected output
/// type; INOUT arguments carry the input value, which also types the output.
#[derive(Debug, Clone, PartialEq)]
pub struct BindArg {
    pub name: String,
    pub direction: ParamDirection,
    pub value: Variant,
    pub lob: Option<LobKind>,
}

/// Outcome of a non-query statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecResult {
    pub rows_affected: Option<u64>,
    pub last_insert_id: Option<i64>,
    /// Values the driver wrote into OUT/INOUT arguments, by param name.
    pub outputs: Vec<(String, Variant)>,
}

impl ExecResult {
    pub fn with_rows_affected(rows: u64) -> Self {
        Self {
            rows_affected: Some(rows),
            ..Self::default()
        }
    }

    /// Affected-row count; fails when the driver did not report one.
    pub fn rows_affected(&self) -> DbsetResult<u64> {
        self.rows_affected.ok_or_else(|| DbsetError::InvalidOperation {
            message: "driver did not report affected rows".to_string(),
            context: "ExecResult::rows_affected".to_string(),
        })
    }
}

/// Forward-only result cursor.
pub trait RowCursor {
    fn columns(&self) -> &[ColumnMeta];

    /// Next row's values in column order, `None` when drained.
    fn next_row(&mut self) -> DbsetResult<Option<Vec<Variant>>>;
}

/// Statement prepared once and executed any number of times.
pub trait PreparedStatement {
    fn execute(&mut self, ctx: Option<&Context>, args: &[BindArg]) -> DbsetResult<ExecResult>;
}

/// Query/statement capability shared by connections and transactions.
pub trait Session {
    fn dialect(&self) -> Dialect;

    /// Whether assembled SQL and params are logged at info level.
    fn log_queries(&self) -> bool {
        false
    }

    fn query(
        &self,
        ctx: Option<&Context>,
        sql: &str,
        args: &[BindArg],
    ) -> DbsetResult<Box<dyn RowCursor + '_>>;

    fn prepare(
        &self,
        ctx: Option<&Context>,
        sql: &str,
    ) -> DbsetResult<Box<dyn PreparedStatement + '_>>;
}

/// A session that can be probed for liveness and reopened.
pub trait Connection: Session {
    fn ping(&self, ctx: Option<&Context>) -> DbsetResult<()>;

    fn reopen(&self) -> DbsetResult<()>;
}

/// Cursor over rows already held in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    columns: Vec<ColumnMeta>,
    rows: VecDeque<Vec<Variant>>,
}

impl BufferedCursor {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<Variant>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }
}

impl RowCursor for BufferedCursor {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> DbsetResult<Option<Vec<Variant>>> {
        Ok(self.rows.pop_front())
    }
}
