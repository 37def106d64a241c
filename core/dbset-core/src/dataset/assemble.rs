//! SQL assembly pipeline
//!
//! 1. buffer text with newlines normalized
//! 2. macro substitution
//! 3. master-detail wrapping (query form only)
//! 4. dialect placeholder translation
//!
//! Assembly is recomputed on every call so master-row values stay current.

use super::DataSet;
use super::master::wrap_detail_sql;
use crate::driver::BindArg;
use crate::error::DbsetResult;
use crate::logging::SQL_TARGET;
use crate::sql::{SqlParser, normalize_newlines};
use crate::variant::Variant;
use sqlparser::ast::Statement;

impl<'a> DataSet<'a> {
    /// Buffer text after normalization and macro substitution.
    pub fn expanded_sql(&self) -> String {
        self.macros.apply(&normalize_newlines(&self.sql.text()))
    }

    /// Statement form: no master-detail wrapping.
    pub fn sql(&self) -> String {
        self.translate(&self.expanded_sql())
    }

    /// Query form. Registers one IN param per master-detail filter, valued
    /// from the master's current row.
    pub fn sql_master_detail(&mut self) -> DbsetResult<String> {
        let mut sql = self.expanded_sql();
        if let Some(filters) = self.master.filters()? {
            for filter in &filters {
                self.params
                    .set_input_param(&filter.alias, filter.value.clone());
            }
            sql = wrap_detail_sql(&sql, &filters);
        }
        Ok(self.translate(&sql))
    }

    fn translate(&self, sql: &str) -> String {
        self.dialect().translate(sql, self.params.names())
    }

    pub fn bind_args(&self) -> Vec<BindArg> {
        self.params.bind_args()
    }

    /// Arguments for batch index `index`.
    pub fn bind_args_at(&self, index: usize) -> Vec<BindArg> {
        self.params.bind_args_at(index)
    }

    /// Macros as `(name, value)` pairs in registration order.
    pub fn macro_args(&self) -> Vec<(String, Variant)> {
        self.macros
            .iter()
            .map(|m| (m.name.clone(), m.value.clone()))
            .collect()
    }

    /// Buffer text with every param token replaced by its SQL literal.
    /// Diagnostics only; never executed.
    pub fn sql_with_literals(&self) -> String {
        self.params.render_literals(&self.sql.text())
    }

    pub fn print_params(&self) {
        self.params.log(self.session().log_queries());
    }

    /// Registers `:name` tokens of the expanded SQL that are not params yet
    /// as empty-valued IN params. Returns how many were added.
    pub fn prepare(&mut self) -> DbsetResult<usize> {
        let names = SqlParser::new().discover_params(&self.expanded_sql())?;
        let added = self.params.append_discovered(names);
        if added > 0 {
            tracing::debug!(target: SQL_TARGET, added, "registered discovered params");
        }
        Ok(added)
    }

    /// Pre-declares fields from the SELECT list of the expanded SQL.
    pub fn create_fields(&mut self) -> DbsetResult<usize> {
        let columns = SqlParser::new().discover_columns(&self.expanded_sql())?;
        for name in &columns {
            self.fields.add(name);
        }
        Ok(columns.len())
    }

    pub fn parse_sql(&self) -> DbsetResult<Vec<Statement>> {
        SqlParser::new().parse(&self.expanded_sql())
    }

    /// Logs the assembled SQL and bound params before execution.
    pub(crate) fn log_statement(&self, sql: &str) {
        let verbose = self.session().log_queries();
        if verbose {
            tracing::info!(target: SQL_TARGET, sql = %sql, "executing");
        } else {
            tracing::trace!(target: SQL_TARGET, sql = %sql, "executing");
        }
        self.params.log(verbose);
    }
}
