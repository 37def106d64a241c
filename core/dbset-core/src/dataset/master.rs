//! Master-detail link
//!
//! A detail dataset holds a weak reference to its master and two parallel
//! field lists. At assembly time the detail query is wrapped with one
//! equality filter per pair, fed from the master's current row.

use crate::error::{DbsetError, DbsetResult};
use crate::logging::DATASET_TARGET;
use crate::variant::Variant;
use std::rc::Weak;

/// Source of the master's current-row values.
pub trait MasterRow {
    fn master_value(&self, field: &str) -> DbsetResult<Variant>;
}

/// One filter term of the detail query.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterFilter {
    pub detail_field: String,
    pub alias: String,
    pub value: Variant,
}

#[derive(Default)]
pub struct MasterSource<'a> {
    source: Option<Weak<dyn MasterRow + 'a>>,
    master_fields: Vec<String>,
    detail_fields: Vec<String>,
}

impl<'a> MasterSource<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_source(&mut self, source: Weak<dyn MasterRow + 'a>) {
        self.source = Some(source);
    }

    pub fn is_attached(&self) -> bool {
        self.source.is_some()
    }

    pub fn add_master_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.master_fields.extend(fields.into_iter().map(Into::into));
    }

    pub fn add_detail_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.detail_fields.extend(fields.into_iter().map(Into::into));
    }

    pub fn clear_master_fields(&mut self) {
        self.master_fields.clear();
    }

    pub fn clear_detail_fields(&mut self) {
        self.detail_fields.clear();
    }

    pub fn master_fields(&self) -> &[String] {
        &self.master_fields
    }

    pub fn detail_fields(&self) -> &[String] {
        &self.detail_fields
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.master_fields.clear();
        self.detail_fields.clear();
    }

    /// Filter terms read from the master's current row.
    ///
    /// `Ok(None)` when no master is attached, or when either field list is
    /// empty (a warning is logged). Unequal list lengths and a dropped master
    /// are configuration errors.
    pub fn filters(&self) -> DbsetResult<Option<Vec<MasterFilter>>> {
        let Some(weak) = &self.source else {
            return Ok(None);
        };

        if self.master_fields.is_empty() || self.detail_fields.is_empty() {
            tracing::warn!(
                target: DATASET_TARGET,
                "MasterFields or DetailFields field cannot be empty"
            );
            return Ok(None);
        }

        if self.master_fields.len() != self.detail_fields.len() {
            return Err(DbsetError::Configuration(format!(
                "master fields ({}) and detail fields ({}) differ in length",
                self.master_fields.len(),
                self.detail_fields.len()
            )));
        }

        let master = weak.upgrade().ok_or_else(|| {
            DbsetError::Configuration("master dataset has been dropped".to_string())
        })?;

        self.master_fields
            .iter()
            .zip(&self.detail_fields)
            .enumerate()
            .map(|(i, (master_field, detail_field))| -> DbsetResult<MasterFilter> {
                Ok(MasterFilter {
                    detail_field: detail_field.clone(),
                    alias: format!("{detail_field}{i:04}"),
                    value: master.master_value(master_field)?,
                })
            })
            .collect::<DbsetResult<Vec<_>>>()
            .map(Some)
    }
}

/// `select * from (<sql>) t where d1 = :a1 and d2 = :a2`
pub fn wrap_detail_sql(sql: &str, filters: &[MasterFilter]) -> String {
    if filters.is_empty() {
        return sql.to_string();
    }
    let predicate = filters
        .iter()
        .map(|f| format!("{} = :{}", f.detail_field, f.alias))
        .collect::<Vec<_>>()
        .join(" and ");
    format!("select * from ({sql}) t where {predicate}")
}
