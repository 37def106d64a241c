//! DataSet — query object over a connection or a transaction
//!
//! A DataSet owns its SQL text, params, macros, fields and materialized rows.
//! Work is split by concern:
//!
//! - [`assemble`] — SQL assembly pipeline and param discovery
//! - [`execute`] — open / exec / exec_batch / delete
//! - [`cursor`] — navigation over the row store
//! - [`bind`] — copying rows into records

pub mod assemble;
pub mod bind;
pub mod cursor;
pub mod execute;
pub mod field;
pub mod master;
pub mod param;
pub mod row;

use crate::context::Context;
use crate::driver::{Connection, Session};
use crate::error::{DbsetError, DbsetResult};
use crate::sql::{Dialect, Macro, Macros, SqlText};
use crate::variant::Variant;
use field::{FieldRef, Fields};
use master::{MasterRow, MasterSource};
use param::{Param, ParamOut, Params};
use row::{Row, RowStore};
use std::cell::RefCell;
use std::rc::Rc;

/// What a DataSet runs against. A transaction target never reconnects.
#[derive(Clone, Copy)]
pub(crate) enum Target<'a> {
    Connection(&'a dyn Connection),
    Transaction(&'a dyn Session),
}

impl<'a> Target<'a> {
    fn session(self) -> &'a dyn Session {
        match self {
            Target::Connection(conn) => conn,
            Target::Transaction(tx) => tx,
        }
    }
}

pub struct DataSet<'a> {
    target: Target<'a>,
    ctx: Option<Context>,
    sql: SqlText,
    fields: Fields,
    params: Params,
    macros: Macros,
    rows: RowStore,
    /// 0-based position of the current row.
    index: usize,
    /// 1-based record number; 0 before the first row.
    recno: usize,
    master: MasterSource<'a>,
}

impl<'a> DataSet<'a> {
    pub fn new(conn: &'a dyn Connection) -> Self {
        Self::with_target(Target::Connection(conn))
    }

    /// DataSet bound to an open transaction.
    pub fn with_transaction(tx: &'a dyn Session) -> Self {
        Self::with_target(Target::Transaction(tx))
    }

    fn with_target(target: Target<'a>) -> Self {
        Self {
            target,
            ctx: None,
            sql: SqlText::new(),
            fields: Fields::new(),
            params: Params::new(),
            macros: Macros::new(),
            rows: RowStore::new(),
            index: 0,
            recno: 0,
            master: MasterSource::new(),
        }
    }

    /// Context used by `open`, `exec`, `exec_batch` and `delete`.
    pub fn add_context(&mut self, ctx: Context) -> &mut Self {
        self.ctx = Some(ctx);
        self
    }

    pub fn context(&self) -> Option<&Context> {
        self.ctx.as_ref()
    }

    pub fn session(&self) -> &'a dyn Session {
        self.target.session()
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self.target, Target::Transaction(_))
    }

    pub fn dialect(&self) -> Dialect {
        self.session().dialect()
    }

    pub fn add_sql(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.sql.add(fragment);
        self
    }

    pub fn sql_text(&self) -> &SqlText {
        &self.sql
    }

    pub fn sql_text_mut(&mut self) -> &mut SqlText {
        &mut self.sql
    }

    // ===== Params =====

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    pub fn set_input_param(&mut self, name: &str, value: impl Into<Variant>) -> &mut Self {
        self.params.set_input_param(name, value);
        self
    }

    pub fn set_output_param(&mut self, name: &str, value: impl Into<Variant>) -> &mut Self {
        self.params.set_output_param(name, value);
        self
    }

    pub fn set_input_output_param(&mut self, name: &str, value: impl Into<Variant>) -> &mut Self {
        self.params.set_input_output_param(name, value);
        self
    }

    pub fn set_input_param_clob(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.params.set_input_param_clob(name, value);
        self
    }

    pub fn set_input_param_blob(&mut self, name: &str, value: impl Into<Vec<u8>>) -> &mut Self {
        self.params.set_input_param_blob(name, value);
        self
    }

    pub fn set_output_param_slice(&mut self, params: impl IntoIterator<Item = ParamOut>) -> &mut Self {
        self.params.set_output_param_slice(params);
        self
    }

    pub fn set_input_param_batch<T: Into<Variant>>(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.params.set_input_param_batch(name, values);
        self
    }

    pub fn param_by_name(&self, name: &str) -> Option<&Param> {
        self.params.param_by_name(name)
    }

    // ===== Macros =====

    pub fn macros(&self) -> &Macros {
        &self.macros
    }

    pub fn set_macro(&mut self, name: &str, value: impl Into<Variant>) -> &mut Self {
        self.macros.set_macro(name, value);
        self
    }

    pub fn macro_by_name(&self, name: &str) -> Option<&Macro> {
        self.macros.macro_by_name(name)
    }

    // ===== Master-detail =====

    /// Links this DataSet as a detail of `master`. Only a weak reference is
    /// kept; the master must outlive every `open` of the detail.
    pub fn add_master_source<M: MasterRow + 'a>(&mut self, master: &Rc<M>) -> &mut Self {
        let weak = Rc::downgrade(master);
        self.master.set_source(weak);
        self
    }

    pub fn add_master_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.master.add_master_fields(fields);
        self
    }

    pub fn add_detail_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.master.add_detail_fields(fields);
        self
    }

    pub fn clear_master_fields(&mut self) -> &mut Self {
        self.master.clear_master_fields();
        self
    }

    pub fn clear_detail_fields(&mut self) -> &mut Self {
        self.master.clear_detail_fields();
        self
    }

    pub fn master_source(&self) -> &MasterSource<'a> {
        &self.master
    }

    // ===== Fields =====

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    /// Field read through the current row.
    pub fn field_by_name(&self, name: &str) -> DbsetResult<FieldRef<'_>> {
        self.find_field(name)
            .ok_or_else(|| DbsetError::FieldNotFound(name.to_string()))
    }

    pub fn find_field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.fields
            .find(name)
            .map(|field| FieldRef::new(field, self.current_row()))
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    /// Row under the cursor; `None` before the first row or past the last.
    pub fn current_row(&self) -> Option<&Row> {
        if self.recno == 0 {
            return None;
        }
        self.rows.get(self.index)
    }
}

impl MasterRow for DataSet<'_> {
    fn master_value(&self, field: &str) -> DbsetResult<Variant> {
        Ok(self.field_by_name(field)?.as_value())
    }
}

impl MasterRow for RefCell<DataSet<'_>> {
    fn master_value(&self, field: &str) -> DbsetResult<Variant> {
        let ds = self.try_borrow().map_err(|_| DbsetError::InvalidOperation {
            message: "master dataset is mutably borrowed".to_string(),
            context: "MasterRow::master_value".to_string(),
        })?;
        ds.master_value(field)
    }
}
