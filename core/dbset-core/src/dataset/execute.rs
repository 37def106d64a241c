//! Execution: open / exec / exec_batch / delete / close

use super::row::{Row, RowColumns};
use super::{DataSet, Target};
use crate::context::Context;
use crate::driver::{BindArg, ColumnMeta, Connection, ExecResult, RowCursor};
use crate::error::{DbsetError, DbsetResult};
use crate::logging::DATASET_TARGET;
use crate::variant::Variant;
use std::sync::Arc;

/// Reads every row of `cursor`. The cursor is released when this returns.
fn drain(
    mut cursor: Box<dyn RowCursor + '_>,
    ctx: Option<&Context>,
) -> DbsetResult<(Vec<ColumnMeta>, Vec<Vec<Variant>>)> {
    let columns = cursor.columns().to_vec();
    let mut rows = Vec::new();
    while let Some(values) = cursor.next_row()? {
        crate::context::check(ctx)?;
        rows.push(values);
    }
    Ok((columns, rows))
}

/// Retries a failed query once, only when a ping confirms the connection is
/// gone and reopening it succeeds. Otherwise the original error is returned.
fn retry_query<'c>(
    conn: &'c dyn Connection,
    ctx: Option<&Context>,
    sql: &str,
    args: &[BindArg],
    err: DbsetError,
) -> DbsetResult<Box<dyn RowCursor + 'c>> {
    if matches!(err, DbsetError::Cancelled | DbsetError::DeadlineExceeded) {
        return Err(err);
    }
    if conn.ping(ctx).is_ok() {
        return Err(err);
    }

    tracing::warn!(target: DATASET_TARGET, error = %err, "query failed and ping failed, reconnecting");
    if let Err(reopen_err) = conn.reopen() {
        tracing::warn!(target: DATASET_TARGET, error = %reopen_err, "reconnect failed");
        return Err(err);
    }
    conn.query(ctx, sql, args)
}

impl<'a> DataSet<'a> {
    /// Runs the query and loads the whole result set.
    pub fn open(&mut self) -> DbsetResult<()> {
        let ctx = self.ctx.clone();
        self.open_inner(ctx.as_ref())
    }

    pub fn open_with_context(&mut self, ctx: &Context) -> DbsetResult<()> {
        self.open_inner(Some(ctx))
    }

    fn open_inner(&mut self, ctx: Option<&Context>) -> DbsetResult<()> {
        self.rows.clear();
        self.index = 0;
        self.recno = 0;

        let sql = self.sql_master_detail()?;
        let args = self.params.bind_args();
        self.log_statement(&sql);

        let (columns, values) = match self.target {
            Target::Transaction(tx) => drain(tx.query(ctx, &sql, &args)?, ctx)?,
            Target::Connection(conn) => {
                let cursor = match conn.query(ctx, &sql, &args) {
                    Ok(cursor) => cursor,
                    Err(err) => retry_query(conn, ctx, &sql, &args, err)?,
                };
                drain(cursor, ctx)?
            }
        };

        self.fields.refresh_from_columns(&columns);
        let shared = Arc::new(RowColumns::new(columns.iter().map(|c| c.name.as_str())));
        for row in values {
            self.rows.push(Row::new(Arc::clone(&shared), row));
        }
        tracing::debug!(target: DATASET_TARGET, rows = self.rows.len(), "opened");

        self.first();
        Ok(())
    }

    /// Prepares and executes a non-query statement. OUT/INOUT values the
    /// driver reports are written back into their params.
    pub fn exec(&mut self) -> DbsetResult<ExecResult> {
        let ctx = self.ctx.clone();
        self.exec_inner(ctx.as_ref())
    }

    pub fn exec_with_context(&mut self, ctx: &Context) -> DbsetResult<ExecResult> {
        self.exec_inner(Some(ctx))
    }

    fn exec_inner(&mut self, ctx: Option<&Context>) -> DbsetResult<ExecResult> {
        let sql = self.sql();
        let args = self.params.bind_args();
        self.log_statement(&sql);

        let result = {
            let mut stmt = self.session().prepare(ctx, &sql)?;
            stmt.execute(ctx, &args)?
        };
        self.params.apply_outputs(&result.outputs);
        Ok(result)
    }

    /// Prepares once and executes `size` times with the per-index param
    /// values. Stops at the first failing index. Returns the total of
    /// affected rows.
    pub fn exec_batch(&mut self, size: usize) -> DbsetResult<u64> {
        let ctx = self.ctx.clone();
        self.exec_batch_inner(ctx.as_ref(), size)
    }

    pub fn exec_batch_with_context(&mut self, ctx: &Context, size: usize) -> DbsetResult<u64> {
        self.exec_batch_inner(Some(ctx), size)
    }

    fn exec_batch_inner(&mut self, ctx: Option<&Context>, size: usize) -> DbsetResult<u64> {
        let sql = self.sql();
        self.log_statement(&sql);

        let mut stmt = self.session().prepare(ctx, &sql)?;
        let mut affected = 0;
        for i in 0..size {
            let args = self.params.bind_args_at(i);
            let result = stmt.execute(ctx, &args).inspect_err(|err| {
                tracing::warn!(target: DATASET_TARGET, index = i, error = %err, "batch execution failed");
            })?;
            affected += result.rows_affected.unwrap_or(0);
        }
        Ok(affected)
    }

    /// `exec` returning the affected-row count.
    pub fn delete(&mut self) -> DbsetResult<u64> {
        self.exec()?.rows_affected()
    }

    pub fn delete_with_context(&mut self, ctx: &Context) -> DbsetResult<u64> {
        self.exec_with_context(ctx)?.rows_affected()
    }

    /// Discards rows, fields, params, macros and the master link. The SQL
    /// text is kept.
    pub fn close(&mut self) {
        self.rows.clear();
        self.fields.clear();
        self.params.clear();
        self.macros.clear();
        self.master.clear();
        self.index = 0;
        self.recno = 0;
    }

    pub fn close_and_clear_sql(&mut self) {
        self.close();
        self.sql.clear();
    }
}
