//! Row-to-record binding.

use super::DataSet;
use crate::api::{BindTarget, FromRow, RowView};
use crate::error::{DbsetError, DbsetResult};

impl<'a> DataSet<'a> {
    /// Binds into a single record or a `Vec` of records.
    pub fn bind_to<B: BindTarget>(&mut self, target: &mut B) -> DbsetResult<()> {
        target.bind_from(self)
    }

    /// Binds the current row into `record`. Fields assigned before a failing
    /// field keep their new values.
    pub fn bind_record<T: FromRow>(&self, record: &mut T) -> DbsetResult<()> {
        let row = self.current_row().ok_or_else(|| DbsetError::InvalidOperation {
            message: "no current row".to_string(),
            context: "DataSet::bind_record".to_string(),
        })?;
        record.bind_row(&RowView::new(row))
    }

    /// Appends one record per row from the current position to Eof.
    pub fn bind_remaining<T: FromRow>(&mut self, records: &mut Vec<T>) -> DbsetResult<()> {
        while !self.eof() {
            let mut record = T::default();
            self.bind_record(&mut record)?;
            records.push(record);
            self.next();
        }
        Ok(())
    }

    /// Current row as a new record.
    pub fn current<T: FromRow>(&self) -> DbsetResult<T> {
        let mut record = T::default();
        self.bind_record(&mut record)?;
        Ok(record)
    }

    /// Every row as a record, starting from the first.
    pub fn to_vec<T: FromRow>(&mut self) -> DbsetResult<Vec<T>> {
        let mut records = Vec::with_capacity(self.count());
        self.first();
        self.bind_remaining(&mut records)?;
        Ok(records)
    }
}
