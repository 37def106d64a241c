//! Field set — column metadata and views into the current row.

use crate::dataset::row::Row;
use crate::driver::{ColumnMeta, ScanKind};
use crate::variant::Variant;
use ahash::AHashMap;
use chrono::NaiveDateTime;

static NULL: Variant = Variant::Null;

/// Logical kind of a field, inferred from the driver's scan type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Text,
    Integer,
    Float,
    DateTime,
    Boolean,
}

impl DataKind {
    /// `None` for scan types with no logical kind (bytes, unknown).
    pub fn from_scan_kind(kind: ScanKind) -> Option<Self> {
        match kind {
            ScanKind::Text => Some(DataKind::Text),
            ScanKind::Int8
            | ScanKind::Int16
            | ScanKind::Int32
            | ScanKind::Int64
            | ScanKind::UInt8
            | ScanKind::UInt16
            | ScanKind::UInt32
            | ScanKind::UInt64 => Some(DataKind::Integer),
            ScanKind::Float32 | ScanKind::Float64 => Some(DataKind::Float),
            ScanKind::Timestamp => Some(DataKind::DateTime),
            ScanKind::Bool => Some(DataKind::Boolean),
            ScanKind::Bytes | ScanKind::Unknown => None,
        }
    }
}

/// Column metadata. A field holds no value of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: Option<DataKind>,
    /// 1-based position in the result set.
    pub order: usize,
    /// 0-based position in the result set.
    pub index: usize,
    pub column: Option<ColumnMeta>,
}

impl Field {
    fn new(name: &str, index: usize) -> Self {
        Self {
            name: name.to_string(),
            kind: None,
            order: index + 1,
            index,
            column: None,
        }
    }
}

/// Fields in result-set order, looked up case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    list: Vec<Field>,
    by_name: AHashMap<String, usize>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field; an existing field with the same name is returned as is.
    pub fn add(&mut self, name: &str) -> &mut Field {
        let key = name.to_uppercase();
        let pos = match self.by_name.get(&key) {
            Some(&pos) => pos,
            None => {
                let pos = self.list.len();
                self.list.push(Field::new(name, pos));
                self.by_name.insert(key, pos);
                pos
            }
        };
        &mut self.list[pos]
    }

    pub fn find(&self, name: &str) -> Option<&Field> {
        self.by_name
            .get(&name.to_uppercase())
            .and_then(|&pos| self.list.get(pos))
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.list.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.list.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.list.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn clear(&mut self) {
        self.list.clear();
        self.by_name.clear();
    }

    /// Builds fields from driver metadata when none were declared. Declared
    /// fields are matched to columns by name (case-insensitive) and take the
    /// column's position; unmatched ones keep their declaration position.
    pub fn refresh_from_columns(&mut self, columns: &[ColumnMeta]) {
        if self.list.is_empty() {
            for column in columns {
                let field = self.add(&column.name);
                field.kind = DataKind::from_scan_kind(column.scan_kind);
                field.column = Some(column.clone());
            }
            return;
        }

        for (i, field) in self.list.iter_mut().enumerate() {
            let matched = columns
                .iter()
                .enumerate()
                .find(|(_, c)| c.name.eq_ignore_ascii_case(&field.name));
            match matched {
                Some((pos, column)) => {
                    field.index = pos;
                    field.column = Some(column.clone());
                }
                None => field.index = i,
            }
            field.order = field.index + 1;
        }
    }
}

/// A field read through the dataset's current row.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'r> {
    field: &'r Field,
    row: Option<&'r Row>,
}

impl<'r> FieldRef<'r> {
    pub(crate) fn new(field: &'r Field, row: Option<&'r Row>) -> Self {
        Self { field, row }
    }

    pub fn field(&self) -> &'r Field {
        self.field
    }

    pub fn name(&self) -> &'r str {
        &self.field.name
    }

    pub fn kind(&self) -> Option<DataKind> {
        self.field.kind
    }

    pub fn order(&self) -> usize {
        self.field.order
    }

    pub fn index(&self) -> usize {
        self.field.index
    }

    /// Current value; null when there is no current row.
    pub fn value(&self) -> &'r Variant {
        self.row
            .and_then(|r| r.get(&self.field.name))
            .unwrap_or(&NULL)
    }

    pub fn is_null(&self) -> bool {
        self.value().is_null()
    }

    pub fn is_not_null(&self) -> bool {
        self.value().is_not_null()
    }

    pub fn as_value(&self) -> Variant {
        self.value().clone()
    }

    pub fn as_int(&self) -> i64 {
        self.value().as_int()
    }

    pub fn as_i8(&self) -> i8 {
        self.value().as_i8()
    }

    pub fn as_i16(&self) -> i16 {
        self.value().as_i16()
    }

    pub fn as_i32(&self) -> i32 {
        self.value().as_i32()
    }

    pub fn as_i64(&self) -> i64 {
        self.value().as_i64()
    }

    pub fn as_float32(&self) -> f32 {
        self.value().as_float32()
    }

    pub fn as_float64(&self) -> f64 {
        self.value().as_float64()
    }

    pub fn as_string(&self) -> String {
        self.value().as_string()
    }

    pub fn as_bool(&self) -> bool {
        self.value().as_bool()
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        self.value().as_datetime()
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        self.value().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::row::RowColumns;
    use std::sync::Arc;

    #[test]
    fn scan_kind_mapping() {
        assert_eq!(DataKind::from_scan_kind(ScanKind::Text), Some(DataKind::Text));
        assert_eq!(DataKind::from_scan_kind(ScanKind::Int16), Some(DataKind::Integer));
        assert_eq!(DataKind::from_scan_kind(ScanKind::UInt64), Some(DataKind::Integer));
        assert_eq!(DataKind::from_scan_kind(ScanKind::Float32), Some(DataKind::Float));
        assert_eq!(
            DataKind::from_scan_kind(ScanKind::Timestamp),
            Some(DataKind::DateTime)
        );
        assert_eq!(DataKind::from_scan_kind(ScanKind::Bool), Some(DataKind::Boolean));
        assert_eq!(DataKind::from_scan_kind(ScanKind::Bytes), None);
    }

    #[test]
    fn refresh_builds_from_metadata() {
        let mut fields = Fields::new();
        fields.refresh_from_columns(&[
            ColumnMeta::new("id", ScanKind::Int64),
            ColumnMeta::new("name", ScanKind::Text),
        ]);
        assert_eq!(fields.len(), 2);
        let name = fields.find("NAME").unwrap();
        assert_eq!(name.kind, Some(DataKind::Text));
        assert_eq!(name.order, 2);
        assert_eq!(name.index, 1);
    }

    #[test]
    fn declared_fields_keep_kind() {
        let mut fields = Fields::new();
        fields.add("id");
        fields.refresh_from_columns(&[ColumnMeta::new("id", ScanKind::Int64)]);
        let id = fields.find("id").unwrap();
        assert_eq!(id.kind, None);
        assert_eq!(id.order, 1);
    }

    #[test]
    fn declared_fields_match_columns_by_name() {
        let mut fields = Fields::new();
        fields.add("name");
        fields.add("ID");
        fields.refresh_from_columns(&[
            ColumnMeta::new("id", ScanKind::Int64),
            ColumnMeta::new("extra", ScanKind::Float64),
            ColumnMeta::new("Name", ScanKind::Text),
        ]);

        let name = fields.find("name").unwrap();
        assert_eq!(name.column.as_ref().unwrap().name, "Name");
        assert_eq!(name.column.as_ref().unwrap().scan_kind, ScanKind::Text);
        assert_eq!(name.index, 2);
        assert_eq!(name.order, 3);

        let id = fields.find("id").unwrap();
        assert_eq!(id.column.as_ref().unwrap().scan_kind, ScanKind::Int64);
        assert_eq!(id.index, 0);
    }

    #[test]
    fn unmatched_declared_field_has_no_column() {
        let mut fields = Fields::new();
        fields.add("a");
        fields.add("missing");
        fields.refresh_from_columns(&[ColumnMeta::new("a", ScanKind::Int64)]);
        let missing = fields.find("missing").unwrap();
        assert!(missing.column.is_none());
        assert_eq!(missing.order, 2);
    }

    #[test]
    fn add_is_idempotent() {
        let mut fields = Fields::new();
        fields.add("Code");
        fields.add("CODE");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get(0).unwrap().name, "Code");
    }

    #[test]
    fn field_ref_reads_row() {
        let mut fields = Fields::new();
        fields.add("qty");
        let row = Row::new(
            Arc::new(RowColumns::new(["QTY"])),
            vec![Variant::from("12")],
        );
        let f = FieldRef::new(fields.find("qty").unwrap(), Some(&row));
        assert_eq!(f.as_int(), 12);
        assert_eq!(f.as_string(), "12");

        let empty = FieldRef::new(fields.find("qty").unwrap(), None);
        assert!(empty.is_null());
        assert_eq!(empty.as_int(), 0);
    }
}
