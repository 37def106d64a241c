//! Cursor navigation over the row store.
//!
//! `index` is 0-based, `recno` 1-based. With rows present `recno == index + 1`;
//! `recno == count + 1` marks Eof after stepping past the last row.

use super::DataSet;
use crate::error::{DbsetError, DbsetResult};
use crate::variant::Variant;

impl<'a> DataSet<'a> {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn recno(&self) -> usize {
        self.recno
    }

    pub fn first(&mut self) {
        self.index = 0;
        self.recno = if self.rows.is_empty() { 0 } else { 1 };
    }

    pub fn next(&mut self) {
        if !self.eof() {
            self.index += 1;
            self.recno += 1;
        }
    }

    pub fn previous(&mut self) {
        if !self.bof() {
            self.index -= 1;
            self.recno -= 1;
        }
    }

    pub fn last(&mut self) {
        let count = self.count();
        self.index = count.saturating_sub(1);
        self.recno = count;
    }

    pub fn bof(&self) -> bool {
        self.count() == 0 || self.recno == 1
    }

    pub fn eof(&self) -> bool {
        self.count() == 0 || self.recno > self.count()
    }

    /// Scans from the first row for `field == value`. Parks on the match, or
    /// leaves the cursor at Eof and returns `false`.
    pub fn locate(&mut self, field: &str, value: impl Into<Variant>) -> DbsetResult<bool> {
        let target = value.into();
        if self.fields.find(field).is_none() {
            return Err(DbsetError::FieldNotFound(field.to_string()));
        }

        self.first();
        while !self.eof() {
            if self.field_by_name(field)?.value().matches(&target) {
                return Ok(true);
            }
            self.next();
        }
        Ok(false)
    }
}
